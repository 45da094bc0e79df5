//! Emits `CompiledTileset::animations` as the flat `anims` asset SPEC_FULL.md §4.9 describes: each
//! key-frame tile already lives in the regular tile bank, so this asset only needs to record, per
//! animation, the key-frame tile indices plus each non-key frame's own parallel tile indices.

use std::path::Path;

use gbatiles_core::animation::CompiledAnimation;

use crate::error::{IoError, IoResult};

fn write_string(bytes: &mut Vec<u8>, s: &str) {
    bytes.extend_from_slice(&(s.len() as u32).to_le_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

fn write_indices(bytes: &mut Vec<u8>, indices: &[usize]) {
    bytes.extend_from_slice(&(indices.len() as u32).to_le_bytes());
    for &index in indices {
        bytes.extend_from_slice(&(index as u16).to_le_bytes());
    }
}

/// Writes a little-endian binary animation table: an entry count, then per animation its name, its
/// key-frame tile indices, and each non-key frame's name and parallel tile indices.
pub fn write_animations(animations: &[CompiledAnimation], path: &Path) -> IoResult<()> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(animations.len() as u32).to_le_bytes());

    for anim in animations {
        write_string(&mut bytes, &anim.name);
        write_indices(&mut bytes, &anim.key_frame_tile_indices);

        bytes.extend_from_slice(&(anim.frames.len() as u32).to_le_bytes());
        for frame in &anim.frames {
            write_string(&mut bytes, &frame.frame_name);
            write_indices(&mut bytes, &frame.tile_indices);
        }
    }

    std::fs::write(path, bytes).map_err(|source| IoError::Write { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbatiles_core::animation::AnimationFrameTiles;

    #[test]
    fn writes_a_nonempty_file_per_animation() {
        let animations = vec![CompiledAnimation {
            name: "flower".to_string(),
            key_frame_tile_indices: vec![3, 4],
            frames: vec![AnimationFrameTiles {
                frame_name: "flower/1".to_string(),
                tile_indices: vec![10, 11],
            }],
        }];

        let path = std::env::temp_dir().join("gbatiles_io_test_anims.bin");
        write_animations(&animations, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_animation_list_still_writes_a_valid_count_header() {
        let path = std::env::temp_dir().join("gbatiles_io_test_anims_empty.bin");
        write_animations(&[], &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, 0u32.to_le_bytes());

        let _ = std::fs::remove_file(&path);
    }
}
