//! `gbatiles-core`: normalizes RGBA tilesheets into GBA-native tile banks and hardware palettes.
//!
//! This crate is pure: it does no file I/O and never prints. Everything it needs comes in through
//! [`input`] and [`context`]; everything it produces comes out through [`compiled::CompiledTileset`].
//! Reading images, writing output files, and rendering diagnostics to a terminal are all
//! `gbatiles-io`/`gbatiles-cli`'s job.

pub mod animation;
pub mod bank;
pub mod color;
pub mod color_index;
pub mod colorset;
pub mod compiled;
pub mod context;
pub mod diagnostics;
pub mod finalized_palette;
pub mod input;
pub mod metatile;
pub mod normalize;
pub mod palette_assign;
pub mod pipeline;
pub mod projection;
pub mod provenance;
pub mod tile;

pub use compiled::CompiledTileset;
pub use context::{CompileMode, CompilerConfig, CompilerContext, FieldmapConfig};
pub use diagnostics::{CompileError, ErrorsAndWarnings, WarningKind, WarningMode};
pub use pipeline::{compile_primary, compile_secondary};
