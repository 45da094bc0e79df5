//! Global dense index for every distinct BGR color appearing in the input (SPEC_FULL.md §4.4).

use std::collections::HashMap;

use crate::color::Color15;
use crate::colorset::BITS_PER_PALETTE;
use crate::diagnostics::CompileError;
use crate::normalize::TaggedNormalTile;
use crate::tile::NormalTile;

/// Bidirectional, insertion-ordered mapping between registered colors and their dense index.
#[derive(Debug, Clone, Default)]
pub struct ColorIndex {
    color_to_index: HashMap<Color15, usize>,
    index_to_color: Vec<Color15>,
}

impl ColorIndex {
    pub fn len(&self) -> usize {
        self.index_to_color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_color.is_empty()
    }

    pub fn index_of(&self, color: Color15) -> Option<usize> {
        self.color_to_index.get(&color).copied()
    }

    pub fn color_at(&self, index: usize) -> Color15 {
        self.index_to_color[index]
    }

    /// Registers `color`, assigning the next unused dense index if it isn't already present.
    /// Returns the index either way.
    fn register(&mut self, color: Color15) -> usize {
        if let Some(&idx) = self.color_to_index.get(&color) {
            return idx;
        }
        let idx = self.index_to_color.len();
        self.index_to_color.push(color);
        self.color_to_index.insert(color, idx);
        idx
    }
}

/// Iterates every normalized tile's palette from slot 1 (skipping transparency), in order, and
/// assigns the next unused dense index to any color not yet present. When `seed` is `Some` (a
/// secondary compile), shared colors take identical indices to the paired primary tileset,
/// letting secondary tiles piggy-back on primary palettes.
pub fn build_color_index(
    normalized: &[TaggedNormalTile],
    primers: &[NormalTile],
    seed: Option<&ColorIndex>,
    max_colors: usize,
) -> Result<ColorIndex, CompileError> {
    let mut index = match seed {
        Some(existing) => existing.clone(),
        None => ColorIndex::default(),
    };

    for tagged in normalized {
        for &color in tagged.tile.palette.colors().iter().skip(1) {
            index.register(color);
        }
    }

    for primer in primers {
        for &color in primer.palette.colors().iter().skip(1) {
            index.register(color);
        }
    }

    if index.len() > max_colors {
        return Err(CompileError::TooManyUniqueColorsTotal { budget: max_colors });
    }

    Ok(index)
}

/// `15 * P1` in primary mode, `15 * (P1 + P2)` in secondary mode (SPEC_FULL.md §4.4).
pub fn max_distinct_colors(num_palettes_in_scope: usize) -> usize {
    BITS_PER_PALETTE * num_palettes_in_scope
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::RgbaPixel;
    use crate::diagnostics::ErrorsAndWarnings;
    use crate::input::{DecompiledTileset, PalettePrimers};
    use crate::normalize::{normalize_decompiled};
    use crate::provenance::TileProvenance;
    use crate::tile::RawTile;
    use std::collections::HashMap as Map;

    fn tile(color: RgbaPixel, idx: usize) -> RawTile {
        RawTile::new([color; 64], TileProvenance::Freestanding { index: idx })
    }

    #[test]
    fn dense_indices_are_assigned_in_scan_order() {
        let magenta = RgbaPixel::new(255, 0, 255, 255);
        let mut decompiled = DecompiledTileset::default();
        decompiled.tiles.push(tile(RgbaPixel::new(8, 0, 0, 255), 0));
        decompiled.tiles.push(tile(RgbaPixel::new(0, 8, 0, 255), 1));

        let mut errors = ErrorsAndWarnings::new(Map::new());
        let (normalized, primers) =
            normalize_decompiled(&decompiled, &PalettePrimers::default(), magenta, &mut errors);

        let index = build_color_index(&normalized, &primers, None, 15 * 16).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.index_of(RgbaPixel::new(8, 0, 0, 255).to_bgr15()), Some(0));
        assert_eq!(index.index_of(RgbaPixel::new(0, 8, 0, 255).to_bgr15()), Some(1));
    }

    #[test]
    fn over_budget_is_fatal() {
        let magenta = RgbaPixel::new(255, 0, 255, 255);
        let mut decompiled = DecompiledTileset::default();
        for i in 0..16u8 {
            decompiled
                .tiles
                .push(tile(RgbaPixel::new(i * 8 + 8, 0, 0, 255), i as usize));
        }

        let mut errors = ErrorsAndWarnings::new(Map::new());
        let (normalized, primers) =
            normalize_decompiled(&decompiled, &PalettePrimers::default(), magenta, &mut errors);

        let result = build_color_index(&normalized, &primers, None, 15);
        assert!(result.is_err());
    }
}
