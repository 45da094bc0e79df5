//! Fixed-size pixel arrays and small palettes: the value types normalization and tile banking
//! operate on.

use crate::color::{Color15, RgbaPixel};
use crate::provenance::TileProvenance;

pub const TILE_SIDE: usize = 8;
pub const TILE_PIXELS: usize = TILE_SIDE * TILE_SIDE;

/// An 8x8 grid of [`RgbaPixel`], plus where it came from (for diagnostics only).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawTile {
    pixels: [RgbaPixel; TILE_PIXELS],
    pub provenance: TileProvenance,
}

impl RawTile {
    pub fn new(pixels: [RgbaPixel; TILE_PIXELS], provenance: TileProvenance) -> Self {
        RawTile { pixels, provenance }
    }

    pub fn get_pixel(&self, row: usize, col: usize) -> RgbaPixel {
        assert!(row < TILE_SIDE && col < TILE_SIDE, "pixel out of bounds");
        self.pixels[row * TILE_SIDE + col]
    }

    pub fn set_pixel(&mut self, row: usize, col: usize, value: RgbaPixel) {
        assert!(row < TILE_SIDE && col < TILE_SIDE, "pixel out of bounds");
        self.pixels[row * TILE_SIDE + col] = value;
    }
}

/// Sentinel palette-slot value for a pixel that failed to normalize (too many colors, or invalid
/// alpha). Kept out of the valid `0..16` range so any accidental use trips an assertion quickly.
pub const INVALID_PIXEL: u8 = 0xff;

pub const MAX_COLORS_PER_PALETTE: usize = 16;
/// Slot 0 is always the transparency color.
pub const TRANSPARENCY_SLOT: usize = 0;

/// An ordered sequence of up to 16 [`Color15`] values. Slot 0 is transparency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalPalette {
    colors: Vec<Color15>,
}

impl LocalPalette {
    pub fn new(transparency: Color15) -> Self {
        LocalPalette {
            colors: vec![transparency],
        }
    }

    pub fn size(&self) -> usize {
        self.colors.len()
    }

    pub fn is_full(&self) -> bool {
        self.colors.len() == MAX_COLORS_PER_PALETTE
    }

    pub fn colors(&self) -> &[Color15] {
        &self.colors
    }

    pub fn color_at(&self, slot: usize) -> Color15 {
        self.colors[slot]
    }

    pub fn find(&self, color: Color15) -> Option<usize> {
        // Slot 0 (transparency) is intentionally included: a non-transparent pixel whose BGR15
        // value happens to equal the transparency color is collapsed to slot 0 by the normalizer
        // before this is ever consulted.
        self.colors.iter().position(|&c| c == color)
    }

    /// Appends `color` at the next free slot. Caller must have already checked `!is_full()`.
    pub fn push(&mut self, color: Color15) -> usize {
        assert!(!self.is_full(), "palette is full");
        self.colors.push(color);
        self.colors.len() - 1
    }
}

/// A 64-entry array of palette indices (`0..16`, or [`INVALID_PIXEL`]) referencing a
/// [`LocalPalette`], plus the flip orientation this is the canonical form of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalTile {
    pub indices: [u8; TILE_PIXELS],
    pub palette: LocalPalette,
    pub h_flip: bool,
    pub v_flip: bool,
    pub provenance: TileProvenance,
    /// Parallel index arrays for non-key animation frames sharing this tile's palette. Empty for
    /// non-animated tiles and for the key frame itself (whose pixels are `indices`).
    pub extra_frames: Vec<[u8; TILE_PIXELS]>,
}

impl NormalTile {
    pub fn is_fully_transparent(&self) -> bool {
        self.palette.size() == 1
    }

    /// Reconstructs an RGBA pixel array from this tile's indices and palette, using `transparency`
    /// for slot 0. Used by property tests that re-feed a normalized tile back through
    /// normalization to check idempotence.
    pub fn indices_as_rgba(&self, _palette: &LocalPalette) -> [RgbaPixel; TILE_PIXELS] {
        let mut out = [RgbaPixel::new(0, 0, 0, 0); TILE_PIXELS];
        for (i, &slot) in self.indices.iter().enumerate() {
            if slot == 0 {
                out[i] = RgbaPixel::new(0, 0, 0, 0);
            } else {
                let color = self.palette.color_at(slot as usize);
                out[i] = crate::color::bgr_to_rgba(color);
            }
        }
        out
    }
}

/// A fully resolved tile: 64 indices into one specific hardware palette (`0..16`). The unit of
/// tile-bank deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GbaTile {
    pub indices: [u8; TILE_PIXELS],
}

impl GbaTile {
    pub fn transparent() -> Self {
        GbaTile {
            indices: [0; TILE_PIXELS],
        }
    }
}
