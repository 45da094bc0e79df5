//! Key-frame vs. frame tiles, and the cross-tileset key-tile invariants (SPEC_FULL.md §4.9).

use crate::diagnostics::{CompileError, ErrorsAndWarnings, WarningKind};
use crate::provenance::TileProvenance;
use crate::tile::GbaTile;

/// One non-key frame's resolved tiles, parallel in length to its animation's key frame.
#[derive(Debug, Clone)]
pub struct AnimationFrameTiles {
    pub frame_name: String,
    pub tile_indices: Vec<usize>,
}

/// A compiled animation: the key frame's tiles are ordinary tile-bank entries (referenced by
/// `key_frame_tile_indices`); other frames are cycled in at runtime by swapping those bank slots'
/// contents, which is why they must stay parallel in length and position.
#[derive(Debug, Clone)]
pub struct CompiledAnimation {
    pub name: String,
    pub key_frame_tile_indices: Vec<usize>,
    pub frames: Vec<AnimationFrameTiles>,
}

/// Checks the key-frame invariants enforced at tile-bank-insertion time (SPEC_FULL.md §4.7):
/// a key-frame tile must not be the transparent tile, must not duplicate an earlier key-frame tile
/// in this tileset, and (in secondary mode) must not already exist in the paired primary's tile
/// index.
pub fn check_key_frame_invariants(
    tile: &GbaTile,
    transparent: &GbaTile,
    seen_key_frames: &[GbaTile],
    primary_tile_index: Option<&std::collections::HashMap<GbaTile, usize>>,
    location: TileProvenance,
) -> Result<(), CompileError> {
    if tile == transparent {
        return Err(CompileError::KeyFrameIsTransparent { location });
    }
    if seen_key_frames.contains(tile) {
        return Err(CompileError::DuplicateKeyFrame { location });
    }
    if let Some(primary_index) = primary_tile_index {
        if primary_index.contains_key(tile) {
            return Err(CompileError::KeyFrameMasksPrimary { location });
        }
    }
    Ok(())
}

/// Emits `key-frame-no-matching-tile` for any key-frame tile index never referenced by a regular
/// metatile assignment, once all tiles have been processed.
pub fn warn_unreferenced_key_frames(
    key_frame_tile_indices: &[usize],
    referenced: &std::collections::HashSet<usize>,
    location: TileProvenance,
    errors: &mut ErrorsAndWarnings,
) {
    for &idx in key_frame_tile_indices {
        if !referenced.contains(&idx) {
            errors.push_warning(
                WarningKind::KeyFrameNoMatchingTile,
                Some(location),
                format!("key frame tile at bank index {idx} is never referenced by a metatile"),
            );
        }
    }
}
