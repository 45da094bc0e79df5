//! Tile deduplication and the final tile-index map (SPEC_FULL.md §4.7).

use std::collections::HashMap;

use crate::color::Color15;
use crate::diagnostics::CompileError;
use crate::finalized_palette::FinalizedPalette;
use crate::tile::{GbaTile, TILE_PIXELS};

/// Resolves a normalized tile's local palette indices through a finalized hardware palette,
/// producing the final 0..16 indices a [`GbaTile`] stores.
pub fn resolve_gba_tile(local_indices: &[u8; TILE_PIXELS], local_colors: &[Color15], palette: &FinalizedPalette) -> GbaTile {
    let mut indices = [0u8; TILE_PIXELS];

    for (i, &slot) in local_indices.iter().enumerate() {
        indices[i] = if slot == 0 {
            0
        } else {
            let color = local_colors[slot as usize];
            palette
                .slot_of(color)
                .expect("tile's color must be contained in its resolved palette") as u8
        };
    }

    GbaTile { indices }
}

/// Deduplicates [`GbaTile`] values by structural equality. Index 0 is pre-populated with the
/// transparent tile so every tileset starts with a guaranteed-transparent entry.
pub struct TileBanker {
    bank: Vec<GbaTile>,
    index_of: HashMap<GbaTile, usize>,
}

impl TileBanker {
    pub fn new() -> Self {
        let transparent = GbaTile::transparent();
        let mut index_of = HashMap::new();
        index_of.insert(transparent.clone(), 0);

        TileBanker {
            bank: vec![transparent],
            index_of,
        }
    }

    pub fn transparent_tile(&self) -> &GbaTile {
        &self.bank[0]
    }

    /// Inserts `tile`, returning its (possibly pre-existing) index.
    pub fn insert(&mut self, tile: GbaTile) -> usize {
        if let Some(&idx) = self.index_of.get(&tile) {
            return idx;
        }
        let idx = self.bank.len();
        self.index_of.insert(tile.clone(), idx);
        self.bank.push(tile);
        idx
    }

    pub fn index_of(&self, tile: &GbaTile) -> Option<usize> {
        self.index_of.get(tile).copied()
    }

    pub fn len(&self) -> usize {
        self.bank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bank.is_empty()
    }

    /// Pads the bank with transparent tiles to a multiple of 16, then checks the configured
    /// per-tileset tile budget. Returns the bank alongside its value -> index map.
    pub fn finish(
        mut self,
        tile_budget: usize,
    ) -> Result<(Vec<GbaTile>, HashMap<GbaTile, usize>), CompileError> {
        let remainder = self.bank.len() % 16;
        if remainder != 0 {
            let padding = 16 - remainder;
            for _ in 0..padding {
                self.bank.push(GbaTile::transparent());
            }
        }

        if self.bank.len() > tile_budget {
            return Err(CompileError::TileBudgetExceeded {
                actual: self.bank.len(),
                budget: tile_budget,
            });
        }

        Ok((self.bank, self.index_of))
    }
}

impl Default for TileBanker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_is_transparent_and_reused() {
        let banker = TileBanker::new();
        assert_eq!(banker.len(), 1);
        assert_eq!(banker.transparent_tile(), &GbaTile::transparent());
    }

    #[test]
    fn duplicate_tiles_share_an_index() {
        let mut banker = TileBanker::new();
        let mut tile = GbaTile::transparent();
        tile.indices[0] = 3;

        let a = banker.insert(tile.clone());
        let b = banker.insert(tile);
        assert_eq!(a, b);
        assert_eq!(banker.len(), 2);
    }

    #[test]
    fn finish_pads_to_multiple_of_sixteen() {
        let mut banker = TileBanker::new();
        for i in 1..5u8 {
            let mut tile = GbaTile::transparent();
            tile.indices[0] = i;
            banker.insert(tile);
        }
        let (bank, _) = banker.finish(64).unwrap();
        assert_eq!(bank.len() % 16, 0);
        assert_eq!(bank.len(), 16);
    }

    #[test]
    fn over_budget_bank_is_fatal() {
        let mut banker = TileBanker::new();
        for i in 1..20u8 {
            let mut tile = GbaTile::transparent();
            tile.indices[0] = i;
            tile.indices[1] = i;
            banker.insert(tile);
        }
        let result = banker.finish(8);
        assert!(result.is_err());
    }
}
