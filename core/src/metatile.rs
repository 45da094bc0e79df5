//! Links each input tile to `(tile_index, palette_index, h_flip, v_flip, attributes)`
//! (SPEC_FULL.md §4.8).

use crate::colorset::ColorSet;
use crate::input::MetatileAttributes;
use crate::palette_assign::HardwarePalette;

/// One output entry per input tile position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub tile_index: usize,
    pub palette_index: usize,
    pub h_flip: bool,
    pub v_flip: bool,
    pub attributes: MetatileAttributes,
}

/// Finds the first palette in `primary_palettes ++ assigned_palettes` that contains every color
/// in `color_set`, returning its index into that concatenation. `None` is an internal-error
/// condition: the palette assigner's soundness invariant guarantees a match always exists.
pub fn find_containing_palette(
    color_set: &ColorSet,
    primary_palettes: &[HardwarePalette],
    assigned_palettes: &[HardwarePalette],
) -> Option<usize> {
    primary_palettes
        .iter()
        .chain(assigned_palettes.iter())
        .position(|palette| color_set.is_subset_of(palette))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_matching_palette_in_concatenation() {
        let mut p0 = ColorSet::empty();
        p0.set(0);
        let mut p1 = ColorSet::empty();
        p1.set(1);
        p1.set(2);

        let mut needed = ColorSet::empty();
        needed.set(1);

        let idx = find_containing_palette(&needed, &[p0], &[p1]);
        assert_eq!(idx, Some(1));
    }

    #[test]
    fn no_match_returns_none() {
        let mut p0 = ColorSet::empty();
        p0.set(0);

        let mut needed = ColorSet::empty();
        needed.set(5);

        assert_eq!(find_containing_palette(&needed, &[p0], &[]), None);
    }
}
