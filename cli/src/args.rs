//! Argument parsing (SPEC_FULL.md §4.13), in a `clap`-derive style.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "gbatiles", version, about = "Compiles RGBA tilesheets into GBA-native tile banks and palettes")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the project's gbatiles.toml (compiler config + fieldmap).
    #[arg(long, global = true, default_value = "gbatiles.toml")]
    pub config: PathBuf,

    /// Increase log verbosity; repeat for more (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a primary tileset from a fresh tilesheet.
    CompilePrimary {
        /// Tilesheet PNG, tiles laid out row-major.
        tiles_png: PathBuf,
        /// Metatile attributes CSV.
        #[arg(long)]
        attributes: Option<PathBuf>,
        /// Directory of `<name>/<NN>.png` animation frame sheets.
        #[arg(long)]
        anim_dir: Option<PathBuf>,
        /// Output directory for the tile bank PNG, palettes, and assignment cache.
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
    /// Compile a secondary tileset, paired with a primary compiled in the same invocation.
    CompileSecondary {
        tiles_png: PathBuf,
        #[arg(long)]
        attributes: Option<PathBuf>,
        #[arg(long)]
        anim_dir: Option<PathBuf>,
        /// The paired primary tileset's own source tilesheet, recompiled in-memory to seed this
        /// secondary compile (its color index and hardware palettes aren't recoverable from its
        /// compiled output alone).
        #[arg(long)]
        primary_tiles_png: PathBuf,
        #[arg(long)]
        primary_attributes: Option<PathBuf>,
        #[arg(long)]
        primary_anim_dir: Option<PathBuf>,
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
    /// Reconstruct per-metatile tile images from a previously compiled tile bank.
    Decompile {
        /// Directory containing the compiled tile bank PNG, palette files, and metatile table.
        compiled_dir: PathBuf,
        /// The paired primary's own compiled output directory, needed only when `compiled_dir`
        /// holds a secondary tileset whose metatiles may reference primary palettes.
        #[arg(long)]
        primary_dir: Option<PathBuf>,
        #[arg(long, default_value = "decompiled")]
        out_dir: PathBuf,
    },
}
