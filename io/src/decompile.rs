//! The decompiler: the inverse of `compile_primary`/`compile_secondary`, reconstructing RGBA tiles
//! from a tile bank, a palette set, and a metatile's `(tile_index, palette_index, h_flip, v_flip)`
//! record (SPEC_FULL.md §4.12). Out-of-range indices are a common symptom of a stale or hand-edited
//! metatile binary, so they're downgraded to warnings with a safe substitute rather than aborting
//! the whole decompile.

use gbatiles_core::color::RgbaPixel;
use gbatiles_core::diagnostics::{ErrorsAndWarnings, WarningKind};
use gbatiles_core::finalized_palette::FinalizedPalette;
use gbatiles_core::provenance::TileProvenance;
use gbatiles_core::tile::{GbaTile, RawTile, TILE_SIDE};

/// Reconstructs one metatile subtile's RGBA pixels. `primary_palettes` and `secondary_palettes`
/// are concatenated in that order to resolve `palette_index`, matching
/// `find_containing_palette`'s concatenation at compile time.
pub fn decompile_tile(
    tile_index: usize,
    palette_index: usize,
    h_flip: bool,
    v_flip: bool,
    tiles: &[GbaTile],
    primary_palettes: &[FinalizedPalette],
    secondary_palettes: &[FinalizedPalette],
    location: TileProvenance,
    errors: &mut ErrorsAndWarnings,
) -> RawTile {
    let tile = tiles.get(tile_index).cloned().unwrap_or_else(|| {
        errors.push_warning(
            WarningKind::TileIndexOutOfRange,
            Some(location.clone()),
            format!("tile index {tile_index} is out of range ({} tiles in bank); substituting the transparent tile", tiles.len()),
        );
        GbaTile::transparent()
    });

    let palette = primary_palettes
        .iter()
        .chain(secondary_palettes.iter())
        .nth(palette_index)
        .copied()
        .unwrap_or_else(|| {
            let total = primary_palettes.len() + secondary_palettes.len();
            errors.push_warning(
                WarningKind::PaletteIndexOutOfRange,
                Some(location.clone()),
                format!("palette index {palette_index} is out of range ({total} palettes available); substituting palette 0"),
            );
            primary_palettes.first().copied().or_else(|| secondary_palettes.first().copied()).unwrap_or_else(|| {
                FinalizedPalette::build(
                    &gbatiles_core::colorset::ColorSet::empty(),
                    &gbatiles_core::color_index::ColorIndex::default(),
                    RgbaPixel::new(255, 0, 255, 255).to_bgr15(),
                )
            })
        });

    let mut pixels = [RgbaPixel::new(0, 0, 0, 0); TILE_SIDE * TILE_SIDE];
    for row in 0..TILE_SIDE {
        for col in 0..TILE_SIDE {
            let src_row = if v_flip { TILE_SIDE - 1 - row } else { row };
            let src_col = if h_flip { TILE_SIDE - 1 - col } else { col };
            let slot = tile.indices[src_row * TILE_SIDE + src_col] as usize;

            pixels[row * TILE_SIDE + col] = if slot == 0 {
                RgbaPixel::new(0, 0, 0, 0)
            } else {
                palette.colors().get(slot).copied().map(gbatiles_core::color::bgr_to_rgba).unwrap_or(RgbaPixel::new(0, 0, 0, 0))
            };
        }
    }

    RawTile::new(pixels, location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbatiles_core::color_index::ColorIndex;
    use gbatiles_core::colorset::ColorSet;

    #[test]
    fn out_of_range_tile_index_substitutes_transparent_and_warns() {
        let mut errors = ErrorsAndWarnings::new(std::collections::HashMap::new());
        let palettes = vec![FinalizedPalette::build(&ColorSet::empty(), &ColorIndex::default(), RgbaPixel::new(255, 0, 255, 255).to_bgr15())];

        let tile = decompile_tile(
            99,
            0,
            false,
            false,
            &[],
            &palettes,
            &[],
            TileProvenance::Metatile { metatile: 0, layer: 0, subtile: 0 },
            &mut errors,
        );

        assert!(tile.get_pixel(0, 0).is_transparent());
        assert_eq!(errors.diagnostics().len(), 1);
    }
}
