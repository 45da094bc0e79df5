mod args;
mod render;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use gbatiles_core::color::bgr_to_rgba;
use gbatiles_core::context::{CompileMode, CompilerContext};
use gbatiles_core::diagnostics::ErrorsAndWarnings;
use gbatiles_core::finalized_palette::FinalizedPalette;
use gbatiles_core::input::{AttributesMap, DecompiledTileset, PalettePrimers};
use gbatiles_core::pipeline::{compile_primary, compile_secondary};
use gbatiles_core::provenance::TileProvenance;
use gbatiles_core::CompiledTileset;

use args::{Args, Command};

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(level).format_timestamp(None).init();
}

/// Assigns each 8x8 grid cell from a raw PNG load a metatile/layer/subtile provenance, given how
/// many tiles make up one metatile (8, or 12 when `triple_layer` is set).
fn metatile_provenance_for(tiles_per_metatile: usize) -> impl Fn(usize, usize) -> TileProvenance {
    move |_row, col| {
        let flat = col;
        TileProvenance::Metatile {
            metatile: flat / tiles_per_metatile,
            layer: ((flat % tiles_per_metatile) / 4) as u8,
            subtile: (flat % 4) as u8,
        }
    }
}

/// Loads a tilesheet PNG, its attributes CSV, and its animation frame directory into the
/// `DecompiledTileset` + `AttributesMap` pair the pipeline consumes.
fn load_decompiled(
    tiles_png: &Path,
    attributes_csv: Option<&Path>,
    anim_dir: Option<&Path>,
    tiles_per_metatile: usize,
    num_metatiles: usize,
    errors: &mut ErrorsAndWarnings,
) -> Result<(DecompiledTileset, AttributesMap)> {
    let raw_tiles = gbatiles_io::png::load_tile_grid(tiles_png, metatile_provenance_for(tiles_per_metatile))
        .context("loading tilesheet PNG")?;

    let animations = match anim_dir {
        Some(dir) => gbatiles_io::png::load_animations(dir).context("loading animation frame sheets")?,
        None => Vec::new(),
    };

    let decompiled = DecompiledTileset { tiles: raw_tiles, animations };

    let attributes = match attributes_csv {
        Some(path) => gbatiles_io::csv_attrs::load_attributes(path, errors).context("loading attributes CSV")?,
        None => AttributesMap::new(),
    };
    gbatiles_io::csv_attrs::warn_missing_attributes(&attributes, num_metatiles, errors);

    Ok((decompiled, attributes))
}

/// Compiles one tileset in memory, without writing anything to disk.
fn compile_only(
    tiles_png: &Path,
    attributes_csv: Option<&Path>,
    anim_dir: Option<&Path>,
    config_path: &Path,
    mode: CompileMode,
    primary: Option<&CompiledTileset>,
) -> Result<(CompiledTileset, ErrorsAndWarnings)> {
    let compiler_config = gbatiles_io::config::load_compiler_config(config_path).context("loading compiler config")?;
    let fieldmap = gbatiles_io::config::load_fieldmap_config(config_path).context("loading fieldmap config")?;

    let mut errors = ErrorsAndWarnings::new(HashMap::new());
    let tiles_per_metatile = if compiler_config.triple_layer { 12 } else { 8 };
    let num_metatiles = match mode {
        CompileMode::Primary => fieldmap.num_metatiles_in_primary,
        CompileMode::Secondary => fieldmap.num_metatiles_total - fieldmap.num_metatiles_in_primary,
    };

    let (decompiled, attributes) =
        load_decompiled(tiles_png, attributes_csv, anim_dir, tiles_per_metatile, num_metatiles, &mut errors)?;

    let mut ctx = CompilerContext::new(&compiler_config, &fieldmap, mode, &mut errors);
    let compiled = match mode {
        CompileMode::Primary => compile_primary(&decompiled, &PalettePrimers::default(), &attributes, &mut ctx),
        CompileMode::Secondary => compile_secondary(
            &decompiled,
            &PalettePrimers::default(),
            &attributes,
            primary.expect("secondary compile always has a primary"),
            &mut ctx,
        ),
    };

    render::render(&errors);
    let compiled = compiled.map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok((compiled, errors))
}

/// Writes a compiled tileset's tile bank PNG, palettes, metatile assignment table, and animation
/// table to `out_dir`. `primary_palettes` is the paired primary's hardware palettes (empty for a
/// primary compile), needed to resolve `tile_home_palette`'s combined indexing for preview
/// rendering.
fn write_compiled(compiled: &CompiledTileset, primary_palettes: &[FinalizedPalette], out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir).context("creating output directory")?;

    let all_palettes: Vec<_> = primary_palettes.iter().chain(compiled.palettes.iter()).copied().collect();

    gbatiles_io::png::write_tile_bank_png(&out_dir.join("tiles.png"), &compiled.tiles, 16, |i| {
        // `tile_home_palette` already indexes into `[primary_palettes, compiled.palettes]` (see
        // CompiledTileset::tile_home_palette's doc comment), matching `all_palettes`'s layout
        // below directly.
        let palette_index = compiled.tile_home_palette[i];
        let colors = all_palettes.get(palette_index).copied().map(|p| p.all_16()).unwrap_or_else(|| {
            log::warn!("tile {i} has out-of-range home palette index {palette_index}; rendering black");
            [gbatiles_core::color::Color15::from_raw(0); 16]
        });
        colors.map(bgr_to_rgba)
    })
    .context("writing tile bank PNG")?;

    for (i, palette) in compiled.palettes.iter().enumerate() {
        let path = out_dir.join(format!("{i}.pal"));
        gbatiles_io::palette_file::write_jasc_pal(&path, &palette.all_16()).context("writing palette file")?;
    }

    gbatiles_io::metatile_table::write_metatile_entries(&compiled.assignments, &out_dir.join("metatiles.bin"))
        .context("writing metatile entry table")?;
    gbatiles_io::anim_table::write_animations(&compiled.animations, &out_dir.join("anims.bin"))
        .context("writing animation table")?;

    Ok(())
}

fn run_decompile(compiled_dir: &Path, primary_dir: Option<&Path>, out_dir: &Path, config_path: &Path) -> Result<()> {
    let compiler_config = gbatiles_io::config::load_compiler_config(config_path).context("loading compiler config")?;
    let tiles_per_metatile = if compiler_config.triple_layer { 12 } else { 8 };

    let primary_palettes = match primary_dir {
        Some(dir) => gbatiles_io::palette_file::read_palette_directory(dir).context("reading primary palette files")?,
        None => Vec::new(),
    };
    let secondary_palettes =
        gbatiles_io::palette_file::read_palette_directory(compiled_dir).context("reading palette files")?;
    let all_palettes: Vec<_> = primary_palettes.iter().chain(secondary_palettes.iter()).copied().collect();

    let tiles = gbatiles_io::png::read_tile_bank_png(&compiled_dir.join("tiles.png"), 16, &all_palettes)
        .context("reading tile bank PNG")?;
    let entries = gbatiles_io::metatile_table::read_metatile_entries(&compiled_dir.join("metatiles.bin"))
        .context("reading metatile entry table")?;

    let mut errors = ErrorsAndWarnings::new(HashMap::new());
    let reconstructed: Vec<_> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let location = TileProvenance::Metatile {
                metatile: i / tiles_per_metatile,
                layer: ((i % tiles_per_metatile) / 4) as u8,
                subtile: (i % 4) as u8,
            };
            gbatiles_io::decompile::decompile_tile(
                entry.tile_index,
                entry.palette_index,
                entry.h_flip,
                entry.v_flip,
                &tiles,
                &primary_palettes,
                &secondary_palettes,
                location,
                &mut errors,
            )
        })
        .collect();

    render::render(&errors);

    std::fs::create_dir_all(out_dir).context("creating output directory")?;
    gbatiles_io::png::write_tile_grid(&out_dir.join("layer.png"), &reconstructed, tiles_per_metatile)
        .context("writing reconstructed layer PNG")?;

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match &args.command {
        Command::CompilePrimary { tiles_png, attributes, anim_dir, out_dir } => {
            compile_only(tiles_png, attributes.as_deref(), anim_dir.as_deref(), &args.config, CompileMode::Primary, None)
                .and_then(|(compiled, _)| write_compiled(&compiled, &[], out_dir))
        }
        Command::CompileSecondary {
            tiles_png,
            attributes,
            anim_dir,
            primary_tiles_png,
            primary_attributes,
            primary_anim_dir,
            out_dir,
        } => compile_only(
            primary_tiles_png,
            primary_attributes.as_deref(),
            primary_anim_dir.as_deref(),
            &args.config,
            CompileMode::Primary,
            None,
        )
        .and_then(|(primary, _)| {
            let primary_palettes = primary.palettes.clone();
            compile_only(tiles_png, attributes.as_deref(), anim_dir.as_deref(), &args.config, CompileMode::Secondary, Some(&primary))
                .and_then(|(compiled, _)| write_compiled(&compiled, &primary_palettes, out_dir))
        }),
        Command::Decompile { compiled_dir, primary_dir, out_dir } => {
            run_decompile(compiled_dir, primary_dir.as_deref(), out_dir, &args.config)
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{}", format!("fatal: {e}").red());
            std::process::exit(1);
        }
    }
}
