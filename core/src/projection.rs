//! Maps each normalized tile's palette to a fixed-width [`ColorSet`] (SPEC_FULL.md §4.5).

use crate::color_index::ColorIndex;
use crate::colorset::ColorSet;
use crate::tile::LocalPalette;

/// Builds a [`ColorSet`] with bits set for every color at slot >= 1 of `palette`, using indices
/// from `index`.
pub fn to_color_set(index: &ColorIndex, palette: &LocalPalette) -> ColorSet {
    let mut set = ColorSet::empty();
    for &color in palette.colors().iter().skip(1) {
        let dense_index = index
            .index_of(color)
            .expect("every palette color must already be registered in the color index");
        set.set(dense_index);
    }
    set
}

/// Order-preserving dedup of a sequence of color-sets, so palette assignment's search input (and
/// therefore its output) is deterministic across runs. Returns the deduplicated list and, for
/// each input position, the index into that list.
pub fn dedup_color_sets(sets: &[ColorSet]) -> (Vec<ColorSet>, Vec<usize>) {
    let mut unique = Vec::new();
    let mut assignment_of = Vec::with_capacity(sets.len());

    for set in sets {
        let existing = unique.iter().position(|u| u == set);
        let index = match existing {
            Some(i) => i,
            None => {
                unique.push(*set);
                unique.len() - 1
            }
        };
        assignment_of.push(index);
    }

    (unique, assignment_of)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_preserves_first_insertion_order() {
        let mut a = ColorSet::empty();
        a.set(1);
        let mut b = ColorSet::empty();
        b.set(2);

        let (unique, assignment_of) = dedup_color_sets(&[a, b, a, a, b]);
        assert_eq!(unique, vec![a, b]);
        assert_eq!(assignment_of, vec![0, 1, 0, 0, 1]);
    }
}
