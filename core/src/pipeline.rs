//! Top-level orchestration: wires normalization, color indexing, projection, palette assignment,
//! tile banking, metatile linking, and animation compilation into the two public entry points
//! (SPEC_FULL.md §4, §6).

use std::collections::{HashMap, HashSet};

use crate::animation::{check_key_frame_invariants, warn_unreferenced_key_frames, AnimationFrameTiles, CompiledAnimation};
use crate::bank::{resolve_gba_tile, TileBanker};
use crate::color_index::{build_color_index, max_distinct_colors, ColorIndex};
use crate::colorset::ColorSet;
use crate::compiled::CompiledTileset;
use crate::context::CompilerContext;
use crate::diagnostics::{CompileError, Phase};
use crate::finalized_palette::FinalizedPalette;
use crate::input::{AttributesMap, DecompiledTileset, PalettePrimers};
use crate::metatile::{find_containing_palette, Assignment};
use crate::normalize::normalize_decompiled;
use crate::palette_assign::{assign_palettes, AssignOutcome, HardwarePalette};
use crate::projection::{dedup_color_sets, to_color_set};
use crate::provenance::TileProvenance;

/// Compiles a primary tileset: no paired tileset, a fresh color index, and its own full palette
/// budget.
pub fn compile_primary(
    decompiled: &DecompiledTileset,
    primers: &PalettePrimers,
    attributes: &AttributesMap,
    ctx: &mut CompilerContext,
) -> Result<CompiledTileset, CompileError> {
    compile(decompiled, primers, attributes, None, ctx)
}

/// Compiles a secondary tileset, seeding its color index from `primary` so shared colors reuse
/// dense indices, and allowing its tiles to reference `primary`'s hardware palettes directly.
pub fn compile_secondary(
    decompiled: &DecompiledTileset,
    primers: &PalettePrimers,
    attributes: &AttributesMap,
    primary: &CompiledTileset,
    ctx: &mut CompilerContext,
) -> Result<CompiledTileset, CompileError> {
    compile(decompiled, primers, attributes, Some(primary), ctx)
}

fn compile(
    decompiled: &DecompiledTileset,
    primers: &PalettePrimers,
    attributes: &AttributesMap,
    primary: Option<&CompiledTileset>,
    ctx: &mut CompilerContext,
) -> Result<CompiledTileset, CompileError> {
    let transparency = ctx.config.transparency_color;

    let (normalized, primer_tiles) = normalize_decompiled(decompiled, primers, transparency, ctx.errors);
    ctx.errors.check_phase_boundary(Phase::Normalization)?;

    let seed = primary.map(|p| &p.color_index);
    let budget = max_distinct_colors(ctx.num_palettes_in_scope());
    let color_index = build_color_index(&normalized, &primer_tiles, seed, budget)?;

    let primary_finalized = primary.map(|p| p.palettes.as_slice()).unwrap_or(&[]);
    let primary_hardware: Vec<HardwarePalette> = primary_finalized
        .iter()
        .map(|p| hardware_from_finalized(p, &color_index))
        .collect();

    let per_tile_sets: Vec<ColorSet> = normalized
        .iter()
        .map(|t| to_color_set(&color_index, &t.tile.palette))
        .collect();
    let (unique_sets, _assignment_of) = dedup_color_sets(&per_tile_sets);

    let outcome = assign_palettes(&unique_sets, ctx.num_palettes_in_scope(), &primary_hardware, ctx.search_params());
    ctx.errors.check_phase_boundary(Phase::PaletteAssignment)?;

    let hardware = match outcome {
        AssignOutcome::Success(hw) => hw,
        AssignOutcome::ExploreCutoffReached => return Err(CompileError::ExploreCutoffReached),
        AssignOutcome::NoSolutionPossible => return Err(CompileError::NoPossiblePaletteAssignment),
    };

    let palettes: Vec<FinalizedPalette> = hardware
        .iter()
        .map(|hw| FinalizedPalette::build(hw, &color_index, transparency.to_bgr15()))
        .collect();

    let mut banker = TileBanker::new();
    let mut assignments = Vec::with_capacity(normalized.len());
    let mut animations: HashMap<String, CompiledAnimation> = HashMap::new();
    let mut seen_key_frame_tiles = Vec::new();
    let mut referenced: HashSet<usize> = HashSet::new();
    let mut home_palette: HashMap<usize, usize> = HashMap::new();

    for (i, tagged) in normalized.iter().enumerate() {
        let tile = &tagged.tile;
        let color_set = per_tile_sets[i];

        let palette_index = find_containing_palette(&color_set, &primary_hardware, &hardware)
            .ok_or_else(|| CompileError::Internal {
                message: format!("no palette contains {}'s color set after a successful assignment", tile.provenance),
            })?;

        let finalized = combined_palette(palette_index, primary_finalized, &palettes);
        let gba_tile = resolve_gba_tile(&tile.indices, tile.palette.colors(), finalized);

        if tagged.animated {
            check_key_frame_invariants(
                &gba_tile,
                banker.transparent_tile(),
                &seen_key_frame_tiles,
                primary.map(|p| &p.tile_index),
                tile.provenance.clone(),
            )?;
            seen_key_frame_tiles.push(gba_tile.clone());
        }

        let tile_index = banker.insert(gba_tile);
        home_palette.entry(tile_index).or_insert(palette_index);

        if let TileProvenance::Metatile { metatile, .. } = &tile.provenance {
            referenced.insert(tile_index);
            let attrs = attributes.get(*metatile);
            assignments.push(Assignment {
                tile_index,
                palette_index,
                h_flip: tile.h_flip,
                v_flip: tile.v_flip,
                attributes: attrs,
            });
        } else if !tagged.animated {
            assignments.push(Assignment {
                tile_index,
                palette_index,
                h_flip: tile.h_flip,
                v_flip: tile.v_flip,
                attributes: Default::default(),
            });
        }

        if tagged.animated {
            let name = tagged.anim_name.clone().expect("animated tile always carries its animation name");
            let entry = animations.entry(name.clone()).or_insert_with(|| CompiledAnimation {
                name: name.clone(),
                key_frame_tile_indices: Vec::new(),
                frames: frame_shells(decompiled, &name),
            });
            entry.key_frame_tile_indices.push(tile_index);
            for (frame_idx, frame) in entry.frames.iter_mut().enumerate() {
                let frame_tile_index = match tile.extra_frames.get(frame_idx) {
                    Some(frame_pixels) => {
                        let frame_gba_tile = resolve_gba_tile(frame_pixels, tile.palette.colors(), finalized);
                        banker.insert(frame_gba_tile)
                    }
                    None => tile_index,
                };
                frame.tile_indices.push(frame_tile_index);
            }
        }
    }

    for anim in animations.values() {
        warn_unreferenced_key_frames(&anim.key_frame_tile_indices, &referenced, TileProvenance::Freestanding { index: 0 }, ctx.errors);
    }

    let (tiles, tile_index) = banker.finish(ctx.tile_budget())?;
    let tile_home_palette: Vec<usize> = (0..tiles.len())
        .map(|i| home_palette.get(&i).copied().unwrap_or(0))
        .collect();

    let mut compiled_animations: Vec<CompiledAnimation> = animations.into_values().collect();
    compiled_animations.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(CompiledTileset {
        tiles,
        tile_home_palette,
        palettes,
        assignments,
        animations: compiled_animations,
        color_index,
        tile_index,
    })
}

fn hardware_from_finalized(finalized: &FinalizedPalette, index: &ColorIndex) -> HardwarePalette {
    let mut set = ColorSet::empty();
    for &color in finalized.colors().iter().skip(1) {
        if let Some(dense) = index.index_of(color) {
            set.set(dense);
        }
    }
    set
}

fn combined_palette<'a>(
    palette_index: usize,
    primary: &'a [FinalizedPalette],
    secondary: &'a [FinalizedPalette],
) -> &'a FinalizedPalette {
    if palette_index < primary.len() {
        &primary[palette_index]
    } else {
        &secondary[palette_index - primary.len()]
    }
}

/// Seeds a new animation's per-frame shells (name only; tile indices fill in as key frame tiles
/// are banked).
fn frame_shells(decompiled: &DecompiledTileset, name: &str) -> Vec<AnimationFrameTiles> {
    decompiled
        .animations
        .iter()
        .find(|a| a.name == name)
        .map(|a| {
            a.non_key_frames()
                .map(|f| AnimationFrameTiles {
                    frame_name: f.name.clone(),
                    tile_indices: Vec::new(),
                })
                .collect()
        })
        .unwrap_or_default()
}

