//! The palette assigner: the algorithmic centerpiece (SPEC_FULL.md §4.6). Partitions a set of
//! per-tile color-sets into `K` hardware palettes of at most 15 non-transparent colors each, via
//! depth-first backtracking or breadth-first search with heuristic branch ordering.

use std::collections::{HashSet, VecDeque};

use crate::colorset::ColorSet;
use crate::context::{AssignAlgorithm, PruneStrategy, SearchParams};

pub const MAX_COLORS_PER_HARDWARE_PALETTE: u32 = 15;

/// A `ColorSet` accumulating which registered colors one physical palette will hold.
pub type HardwarePalette = ColorSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignOutcome {
    Success(Vec<HardwarePalette>),
    ExploreCutoffReached,
    NoSolutionPossible,
}

/// Upper bound on distinct BFS states kept in the visited set before giving up and reporting
/// [`AssignOutcome::ExploreCutoffReached`]; complements the node-count budget (SPEC_FULL.md §9,
/// "BFS visited-set memory growth").
const BFS_VISITED_CAP: usize = 2_000_000;

/// Sorts `unassigned` by ascending popcount (stable): pre-sorting by rarity commits hard
/// constraints first, since the search consumes this list from the back (largest popcount first).
fn prepare_search_order(unassigned: &[ColorSet]) -> Vec<ColorSet> {
    let mut order: Vec<ColorSet> = unassigned.to_vec();
    order.sort_by_key(|c| c.popcount());
    order
}

/// Orders candidate palette slots by descending intersection-size with `to_assign`, then ascending
/// popcount (both stable), keeping only slots that can legally accept `to_assign`.
fn ordered_children(hardware: &[HardwarePalette], to_assign: &ColorSet) -> Vec<usize> {
    let mut candidates: Vec<usize> = (0..hardware.len())
        .filter(|&i| hardware[i].union_popcount(to_assign) <= MAX_COLORS_PER_HARDWARE_PALETTE)
        .collect();

    candidates.sort_by(|&a, &b| {
        let isect_a = hardware[a].intersection_popcount(to_assign);
        let isect_b = hardware[b].intersection_popcount(to_assign);
        isect_b
            .cmp(&isect_a)
            .then_with(|| hardware[a].popcount().cmp(&hardware[b].popcount()))
    });

    candidates
}

/// Applies the configured pruning strategy to an already-ordered children list.
fn apply_prune(
    children: &[usize],
    hardware: &[HardwarePalette],
    to_assign: &ColorSet,
    prune: PruneStrategy,
) -> Vec<usize> {
    match prune {
        PruneStrategy::None => children.to_vec(),
        PruneStrategy::BestBranches(n) => children.iter().take(n).copied().collect(),
        PruneStrategy::SmartPrune { fraction } => {
            let Some(&best) = children.first() else {
                return Vec::new();
            };
            let max_isect = hardware[best].intersection_popcount(to_assign);
            if max_isect == 0 {
                return children.to_vec();
            }
            let threshold = (max_isect as f64 * (1.0 - fraction)).floor() as u32;
            children
                .iter()
                .copied()
                .filter(|&i| hardware[i].intersection_popcount(to_assign) >= threshold)
                .collect()
        }
    }
}

enum StepResult {
    Success,
    Cutoff,
    Fail,
}

struct DfsSearch<'a> {
    primary: &'a [HardwarePalette],
    prune: PruneStrategy,
    cutoff: usize,
    visited_nodes: usize,
}

impl<'a> DfsSearch<'a> {
    fn run(
        &mut self,
        unassigned: &mut Vec<ColorSet>,
        hardware: &mut Vec<HardwarePalette>,
    ) -> StepResult {
        self.visited_nodes += 1;
        if self.visited_nodes > self.cutoff {
            return StepResult::Cutoff;
        }

        let Some(to_assign) = unassigned.pop() else {
            return StepResult::Success;
        };

        if self
            .primary
            .iter()
            .any(|palette| to_assign.is_subset_of(palette))
        {
            match self.run(unassigned, hardware) {
                StepResult::Success => return StepResult::Success,
                StepResult::Cutoff => return StepResult::Cutoff,
                StepResult::Fail => {}
            }
        }

        let ordered = ordered_children(hardware, &to_assign);
        let pruned = apply_prune(&ordered, hardware, &to_assign, self.prune);

        for slot in pruned {
            let backup = hardware[slot];
            hardware[slot].merge_from(&to_assign);

            match self.run(unassigned, hardware) {
                StepResult::Success => return StepResult::Success,
                StepResult::Cutoff => return StepResult::Cutoff,
                StepResult::Fail => hardware[slot] = backup,
            }
        }

        unassigned.push(to_assign);
        StepResult::Fail
    }
}

fn assign_dfs(
    order: Vec<ColorSet>,
    num_palettes: usize,
    primary: &[HardwarePalette],
    params: SearchParams,
) -> AssignOutcome {
    let mut unassigned = order;
    let mut hardware = vec![HardwarePalette::empty(); num_palettes];
    let mut search = DfsSearch {
        primary,
        prune: params.prune,
        cutoff: params.explored_node_cutoff,
        visited_nodes: 0,
    };

    match search.run(&mut unassigned, &mut hardware) {
        StepResult::Success => AssignOutcome::Success(hardware),
        StepResult::Cutoff => AssignOutcome::ExploreCutoffReached,
        StepResult::Fail => AssignOutcome::NoSolutionPossible,
    }
}

#[derive(Clone)]
struct BfsNode {
    hardware: Vec<HardwarePalette>,
    pos: usize,
}

fn assign_bfs(
    order: Vec<ColorSet>,
    num_palettes: usize,
    primary: &[HardwarePalette],
    params: SearchParams,
) -> AssignOutcome {
    let mut primary_fifo: VecDeque<BfsNode> = VecDeque::new();
    let mut low_priority_fifo: VecDeque<BfsNode> = VecDeque::new();
    let mut visited: HashSet<(Vec<HardwarePalette>, usize)> = HashSet::new();

    let initial = BfsNode {
        hardware: vec![HardwarePalette::empty(); num_palettes],
        pos: 0,
    };
    visited.insert((initial.hardware.clone(), initial.pos));
    primary_fifo.push_back(initial);

    let mut visited_nodes = 0usize;

    loop {
        let node = match primary_fifo.pop_front() {
            Some(n) => n,
            None => match low_priority_fifo.pop_front() {
                Some(n) => n,
                None => return AssignOutcome::NoSolutionPossible,
            },
        };

        visited_nodes += 1;
        if visited_nodes > params.explored_node_cutoff {
            return AssignOutcome::ExploreCutoffReached;
        }
        if visited.len() > BFS_VISITED_CAP {
            return AssignOutcome::ExploreCutoffReached;
        }

        if node.pos >= order.len() {
            return AssignOutcome::Success(node.hardware);
        }

        let to_assign = order[node.pos];

        if primary.iter().any(|p| to_assign.is_subset_of(p)) {
            let child = BfsNode {
                hardware: node.hardware.clone(),
                pos: node.pos + 1,
            };
            let key = (child.hardware.clone(), child.pos);
            if visited.insert(key) {
                primary_fifo.push_back(child);
            }
        }

        let ordered = ordered_children(&node.hardware, &to_assign);
        let pruned = apply_prune(&ordered, &node.hardware, &to_assign, params.prune);
        let any_positive = pruned
            .iter()
            .any(|&i| node.hardware[i].intersection_popcount(&to_assign) > 0);

        for slot in pruned {
            let mut new_hardware = node.hardware.clone();
            new_hardware[slot].merge_from(&to_assign);
            let key = (new_hardware.clone(), node.pos + 1);
            if !visited.insert(key) {
                continue;
            }

            let child = BfsNode {
                hardware: new_hardware,
                pos: node.pos + 1,
            };

            let intersection = node.hardware[slot].intersection_popcount(&to_assign);
            if intersection > 0 || !any_positive {
                primary_fifo.push_back(child);
            } else {
                low_priority_fifo.push_back(child);
            }
        }
    }
}

/// Runs the configured search backend once. Callers that want the search-parameter escalation
/// matrix on [`AssignOutcome::ExploreCutoffReached`] live in `gbatiles-cli`/`gbatiles-io`; the core
/// only runs a single attempt per call (SPEC_FULL.md §4.6).
pub fn assign_palettes(
    unassigned: &[ColorSet],
    num_palettes: usize,
    primary: &[HardwarePalette],
    params: SearchParams,
) -> AssignOutcome {
    let order = prepare_search_order(unassigned);

    match params.algorithm {
        AssignAlgorithm::Dfs => assign_dfs(order, num_palettes, primary, params),
        AssignAlgorithm::Bfs => assign_bfs(order, num_palettes, primary, params),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(bits: &[usize]) -> ColorSet {
        let mut s = ColorSet::empty();
        for &b in bits {
            s.set(b);
        }
        s
    }

    fn default_params(algorithm: AssignAlgorithm) -> SearchParams {
        SearchParams {
            algorithm,
            explored_node_cutoff: 1_000_000,
            prune: PruneStrategy::None,
        }
    }

    fn check_soundness(outcome: &AssignOutcome, unassigned: &[ColorSet], primary: &[HardwarePalette]) {
        if let AssignOutcome::Success(palettes) = outcome {
            for p in palettes {
                assert!(p.popcount() <= MAX_COLORS_PER_HARDWARE_PALETTE);
            }
            for c in unassigned {
                let covered = primary
                    .iter()
                    .chain(palettes.iter())
                    .any(|p| c.is_subset_of(p));
                assert!(covered, "every input color-set must be covered by some palette");
            }
        }
    }

    #[test]
    fn scenario_a_two_by_two_tiles_assign_into_two_palettes() {
        // blue-stripe tile and green+red+cyan tiles: two independent color groups, two palettes.
        let blue = set(&[0]);
        let green_red = set(&[1, 2]);
        let green_cyan = set(&[1, 3]);

        let inputs = vec![blue, green_red, green_cyan];
        for algo in [AssignAlgorithm::Dfs, AssignAlgorithm::Bfs] {
            let outcome = assign_palettes(&inputs, 2, &[], default_params(algo));
            check_soundness(&outcome, &inputs, &[]);
            assert!(matches!(outcome, AssignOutcome::Success(_)));
        }
    }

    #[test]
    fn scenario_e_unsolvable_with_one_palette_and_disjoint_fifteens() {
        let a: Vec<usize> = (0..15).collect();
        let b: Vec<usize> = (15..30).collect();
        let inputs = vec![set(&a), set(&b)];

        for algo in [AssignAlgorithm::Dfs, AssignAlgorithm::Bfs] {
            let outcome = assign_palettes(&inputs, 1, &[], default_params(algo));
            assert_eq!(outcome, AssignOutcome::NoSolutionPossible);
        }
    }

    #[test]
    fn scenario_f_cutoff_then_widened_cutoff_succeeds() {
        let a: Vec<usize> = (0..8).collect();
        let b: Vec<usize> = (8..16).collect();
        let c: Vec<usize> = (0..4).chain(16..24).collect();
        let inputs = vec![set(&a), set(&b), set(&c)];

        let tiny_cutoff = SearchParams {
            algorithm: AssignAlgorithm::Dfs,
            explored_node_cutoff: 1,
            prune: PruneStrategy::BestBranches(1),
        };
        let first = assign_palettes(&inputs, 2, &[], tiny_cutoff);
        assert_eq!(first, AssignOutcome::ExploreCutoffReached);

        let widened = SearchParams {
            algorithm: AssignAlgorithm::Dfs,
            explored_node_cutoff: 1_000_000,
            prune: PruneStrategy::None,
        };
        let second = assign_palettes(&inputs, 2, &[], widened);
        check_soundness(&second, &inputs, &[]);
        assert!(matches!(second, AssignOutcome::Success(_)));
    }

    #[test]
    fn secondary_mode_reuses_primary_palette_without_mutating_state() {
        let mut primary_palette = ColorSet::empty();
        primary_palette.set(0);
        primary_palette.set(1);

        let reusable = set(&[0, 1]);
        let inputs = vec![reusable];

        let outcome = assign_palettes(&inputs, 1, &[primary_palette], default_params(AssignAlgorithm::Dfs));
        match outcome {
            AssignOutcome::Success(palettes) => {
                assert!(palettes[0].is_empty(), "fully reused set should not touch secondary palettes");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn dfs_and_bfs_agree_on_success() {
        let a = set(&(0..10).collect::<Vec<_>>());
        let b = set(&(10..20).collect::<Vec<_>>());
        let c = set(&(20..25).chain(0..5).collect::<Vec<_>>());
        let inputs = vec![a, b, c];

        let dfs_outcome = assign_palettes(&inputs, 3, &[], default_params(AssignAlgorithm::Dfs));
        let bfs_outcome = assign_palettes(&inputs, 3, &[], default_params(AssignAlgorithm::Bfs));

        assert!(matches!(dfs_outcome, AssignOutcome::Success(_)));
        assert!(matches!(bfs_outcome, AssignOutcome::Success(_)));
    }
}
