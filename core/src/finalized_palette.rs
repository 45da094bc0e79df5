//! The materialized form of a [`crate::palette_assign::HardwarePalette`]: an ordered list of up to
//! 16 [`Color15`] values (slot 0 is transparency), which is what actually gets written out and
//! what tile-bank construction indexes into.

use crate::color::Color15;
use crate::color_index::ColorIndex;
use crate::colorset::ColorSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizedPalette {
    colors: [Color15; 16],
    size: usize,
}

impl FinalizedPalette {
    /// Orders `hardware`'s registered colors by ascending dense index (already a deterministic
    /// order, since dense indices were assigned in scan order) and places them after the
    /// transparency color at slot 0.
    pub fn build(hardware: &ColorSet, index: &ColorIndex, transparency: Color15) -> Self {
        let mut colors = [transparency; 16];
        let mut size = 1;

        for dense_index in 0..index.len() {
            if hardware.get(dense_index) {
                colors[size] = index.color_at(dense_index);
                size += 1;
            }
        }

        FinalizedPalette { colors, size }
    }

    /// Builds a palette directly from 16 already-resolved colors, e.g. read back from a JASC-PAL
    /// file by the decompiler. All 16 slots are treated as populated; unused tail slots a prior
    /// `build()` would have left at the transparency color still compare correctly, since real
    /// pixels never resolve to slot 0 by color alone (they're routed there by alpha).
    pub fn from_colors(colors: [Color15; 16]) -> Self {
        FinalizedPalette { colors, size: 16 }
    }

    pub fn colors(&self) -> &[Color15] {
        &self.colors[..self.size]
    }

    pub fn all_16(&self) -> [Color15; 16] {
        self.colors
    }

    pub fn slot_of(&self, color: Color15) -> Option<usize> {
        self.colors[..self.size].iter().position(|&c| c == color)
    }
}
