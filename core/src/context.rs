//! Configuration and the per-compile context threaded through the pipeline by `&mut` reference,
//! replacing the source's mutable-global-context pattern (SPEC_FULL.md §4.11, §9).

use crate::color::RgbaPixel;
use crate::diagnostics::ErrorsAndWarnings;

/// Selects which palette-assignment search backend to run (SPEC_FULL.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignAlgorithm {
    Dfs,
    Bfs,
}

/// One of the two optional, configurable pruning strategies applied to a search node's sorted
/// children before iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PruneStrategy {
    None,
    /// Explore only the first N children.
    BestBranches(usize),
    /// Keep children whose intersection-size with the set being assigned lies within `fraction`
    /// of the maximum intersection-size seen among that node's children. Resolves the source's
    /// undocumented "smart prune" stub; see DESIGN.md.
    SmartPrune { fraction: f64 },
}

/// One entry of the search-parameter escalation matrix the caller walks across on
/// `ExploreCutoffReached` (SPEC_FULL.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    pub algorithm: AssignAlgorithm,
    pub explored_node_cutoff: usize,
    pub prune: PruneStrategy,
}

/// `{ transparency_color, triple_layer, primary_assign_algorithm, ... }` from SPEC_FULL.md §6.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub transparency_color: RgbaPixel,
    pub triple_layer: bool,
    pub primary: SearchParams,
    pub secondary: SearchParams,
    pub cache_assign: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        let default_params = SearchParams {
            algorithm: AssignAlgorithm::Dfs,
            explored_node_cutoff: 2_000_000,
            prune: PruneStrategy::None,
        };

        CompilerConfig {
            // Default transparency color: magenta.
            transparency_color: RgbaPixel::new(255, 0, 255, 255),
            triple_layer: false,
            primary: default_params,
            secondary: default_params,
            cache_assign: false,
        }
    }
}

/// `{ num_tiles_in_primary, num_tiles_total, ... }`. Invariant: `*_in_primary <= *_total` on each
/// pair (checked in [`FieldmapConfig::validate`]).
#[derive(Debug, Clone, Copy)]
pub struct FieldmapConfig {
    pub num_tiles_in_primary: usize,
    pub num_tiles_total: usize,
    pub num_metatiles_in_primary: usize,
    pub num_metatiles_total: usize,
    pub num_palettes_in_primary: usize,
    pub num_palettes_total: usize,
    pub num_tiles_per_metatile: usize,
}

impl FieldmapConfig {
    pub fn validate(&self) -> Result<(), String> {
        let pairs = [
            (
                "tiles",
                self.num_tiles_in_primary,
                self.num_tiles_total,
            ),
            (
                "metatiles",
                self.num_metatiles_in_primary,
                self.num_metatiles_total,
            ),
            (
                "palettes",
                self.num_palettes_in_primary,
                self.num_palettes_total,
            ),
        ];

        for (name, primary, total) in pairs {
            if primary > total {
                return Err(format!(
                    "num_{name}_in_primary ({primary}) must not exceed num_{name}_total ({total})"
                ));
            }
        }

        Ok(())
    }

    pub fn num_palettes_in_secondary(&self) -> usize {
        self.num_palettes_total - self.num_palettes_in_primary
    }

    pub fn num_tiles_in_secondary(&self) -> usize {
        self.num_tiles_total - self.num_tiles_in_primary
    }
}

impl Default for FieldmapConfig {
    fn default() -> Self {
        // Pokemon Emerald's stock values.
        FieldmapConfig {
            num_tiles_in_primary: 512,
            num_tiles_total: 1024,
            num_metatiles_in_primary: 512,
            num_metatiles_total: 1024,
            num_palettes_in_primary: 6,
            num_palettes_total: 13,
            num_tiles_per_metatile: 8,
        }
    }
}

/// Which of the two tileset roles is being compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    Primary,
    Secondary,
}

/// Bundles `CompilerConfig`, `FieldmapConfig`, and the diagnostic sink; every core entry point
/// takes this by `&mut` reference instead of reaching for hidden ambient state.
pub struct CompilerContext<'a> {
    pub config: &'a CompilerConfig,
    pub fieldmap: &'a FieldmapConfig,
    pub mode: CompileMode,
    pub errors: &'a mut ErrorsAndWarnings,
}

impl<'a> CompilerContext<'a> {
    pub fn new(
        config: &'a CompilerConfig,
        fieldmap: &'a FieldmapConfig,
        mode: CompileMode,
        errors: &'a mut ErrorsAndWarnings,
    ) -> Self {
        CompilerContext {
            config,
            fieldmap,
            mode,
            errors,
        }
    }

    pub fn search_params(&self) -> SearchParams {
        match self.mode {
            CompileMode::Primary => self.config.primary,
            CompileMode::Secondary => self.config.secondary,
        }
    }

    pub fn num_palettes_in_scope(&self) -> usize {
        match self.mode {
            CompileMode::Primary => self.fieldmap.num_palettes_in_primary,
            CompileMode::Secondary => self.fieldmap.num_palettes_in_secondary(),
        }
    }

    pub fn tile_budget(&self) -> usize {
        match self.mode {
            CompileMode::Primary => self.fieldmap.num_tiles_in_primary,
            CompileMode::Secondary => self.fieldmap.num_tiles_in_secondary(),
        }
    }
}
