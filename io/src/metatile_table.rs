//! Metatile entry table: packs each compiled assignment into the flat 2-byte little-endian layout
//! from SPEC_FULL.md §6 (`(tile_index & 0x3FF) | (hflip << 10) | (vflip << 11) | (palette_index <<
//! 12)`) and reads it back for the decompiler.

use std::path::Path;

use gbatiles_core::metatile::Assignment;

use crate::error::{IoError, IoResult};

fn pack_entry(assignment: &Assignment) -> u16 {
    let tile = (assignment.tile_index as u16) & 0x3FF;
    let hflip = (assignment.h_flip as u16) << 10;
    let vflip = (assignment.v_flip as u16) << 11;
    let palette = (assignment.palette_index as u16 & 0xF) << 12;
    tile | hflip | vflip | palette
}

/// Writes one 2-byte little-endian entry per assignment, in input order.
pub fn write_metatile_entries(assignments: &[Assignment], path: &Path) -> IoResult<()> {
    let mut bytes = Vec::with_capacity(assignments.len() * 2);
    for assignment in assignments {
        bytes.extend_from_slice(&pack_entry(assignment).to_le_bytes());
    }
    std::fs::write(path, bytes).map_err(|source| IoError::Write { path: path.to_path_buf(), source })
}

/// One decoded metatile entry: the same four fields `write_metatile_entries` packed, plus whichever
/// `attributes` the caller separately loaded for this position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetatileEntry {
    pub tile_index: usize,
    pub palette_index: usize,
    pub h_flip: bool,
    pub v_flip: bool,
}

fn unpack_entry(raw: u16) -> MetatileEntry {
    MetatileEntry {
        tile_index: (raw & 0x3FF) as usize,
        h_flip: (raw >> 10) & 1 != 0,
        v_flip: (raw >> 11) & 1 != 0,
        palette_index: ((raw >> 12) & 0xF) as usize,
    }
}

/// Reads a metatile entry table back into its decoded entries, in file order. A trailing odd byte
/// (a hand-edited or truncated file) is silently dropped by `chunks_exact`.
pub fn read_metatile_entries(path: &Path) -> IoResult<Vec<MetatileEntry>> {
    let bytes = std::fs::read(path).map_err(|source| IoError::Read { path: path.to_path_buf(), source })?;
    Ok(bytes.chunks_exact(2).map(|chunk| unpack_entry(u16::from_le_bytes([chunk[0], chunk[1]]))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbatiles_core::input::MetatileAttributes;

    #[test]
    fn round_trips_through_write_and_read() {
        let assignments = vec![
            Assignment {
                tile_index: 513,
                palette_index: 7,
                h_flip: true,
                v_flip: false,
                attributes: MetatileAttributes::default(),
            },
            Assignment {
                tile_index: 2,
                palette_index: 0,
                h_flip: false,
                v_flip: true,
                attributes: MetatileAttributes::default(),
            },
        ];

        let path = std::env::temp_dir().join("gbatiles_io_test_metatile_table.bin");
        write_metatile_entries(&assignments, &path).unwrap();

        let entries = read_metatile_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].tile_index, 513);
        assert_eq!(entries[0].palette_index, 7);
        assert!(entries[0].h_flip);
        assert!(!entries[0].v_flip);
        assert_eq!(entries[1].tile_index, 2);
        assert!(entries[1].v_flip);

        let _ = std::fs::remove_file(&path);
    }
}
