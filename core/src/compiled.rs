//! The finished product of one compile: everything `gbatiles-io` needs to emit a tileset
//! (SPEC_FULL.md §3).

use std::collections::HashMap;

use crate::animation::CompiledAnimation;
use crate::color_index::ColorIndex;
use crate::finalized_palette::FinalizedPalette;
use crate::metatile::Assignment;
use crate::tile::GbaTile;

/// Owns every artifact one `compile_primary`/`compile_secondary` call produces. Emission (PNG,
/// JASC-PAL, CSV, assignment cache) lives entirely in `gbatiles-io`; this type never touches the
/// filesystem.
#[derive(Debug, Clone)]
pub struct CompiledTileset {
    /// The deduplicated tile bank, index 0 always the transparent tile, padded to a multiple of 16.
    pub tiles: Vec<GbaTile>,
    /// Parallel to `tiles`: which hardware palette each bank tile was resolved against, for
    /// true-color preview rendering in `gbatiles-io`. This is an index into the *concatenation*
    /// `[primary_palettes, self.palettes]` — the same combined indexing
    /// `metatile::find_containing_palette` produces — not a 0-based index into `self.palettes`
    /// alone, since a secondary tileset's tile may legally resolve against one of the primary's
    /// palettes.
    pub tile_home_palette: Vec<usize>,
    /// This tileset's own hardware palettes (`P1` for primary, `P2` for secondary), in assignment
    /// order.
    pub palettes: Vec<FinalizedPalette>,
    /// One entry per input tile position, in input order.
    pub assignments: Vec<Assignment>,
    /// Compiled animations, in the order they appeared in the decompiled input.
    pub animations: Vec<CompiledAnimation>,
    /// The dense color registry as it stood after this compile (seed for a paired secondary
    /// compile).
    pub color_index: ColorIndex,
    /// Value -> tile-bank-index map, reused by callers that want to look up a tile without
    /// re-deriving it (e.g. the decompiler's inverse path).
    pub tile_index: HashMap<GbaTile, usize>,
}

impl CompiledTileset {
    /// Total number of hardware palettes a metatile's palette index may reference when this
    /// tileset is the secondary half of a pair: `primary_palettes.len() + self.palettes.len()`.
    pub fn palette_count_with(&self, primary_palettes: &[FinalizedPalette]) -> usize {
        primary_palettes.len() + self.palettes.len()
    }
}
