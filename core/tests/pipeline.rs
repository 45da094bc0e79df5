//! End-to-end coverage of `compile_primary`/`compile_secondary`: the scenarios and soundness
//! properties from SPEC_FULL.md §8, exercised through the public pipeline entry points rather than
//! through individual stage functions.

use std::collections::HashMap;

use gbatiles_core::color::RgbaPixel;
use gbatiles_core::context::{CompileMode, CompilerConfig, CompilerContext, FieldmapConfig};
use gbatiles_core::diagnostics::ErrorsAndWarnings;
use gbatiles_core::input::{
    AttributesMap, DecompiledTileset, MetatileAttributes, PalettePrimers,
};
use gbatiles_core::pipeline::{compile_primary, compile_secondary};
use gbatiles_core::provenance::TileProvenance;
use gbatiles_core::tile::RawTile;

const MAGENTA: RgbaPixel = RgbaPixel::new(255, 0, 255, 255);

fn solid_tile(color: RgbaPixel, provenance: TileProvenance) -> RawTile {
    RawTile::new([color; 64], provenance)
}

fn small_fieldmap() -> FieldmapConfig {
    FieldmapConfig {
        num_tiles_in_primary: 32,
        num_tiles_total: 64,
        num_metatiles_in_primary: 16,
        num_metatiles_total: 32,
        num_palettes_in_primary: 3,
        num_palettes_total: 6,
        num_tiles_per_metatile: 8,
    }
}

#[test]
fn two_tile_metatile_compiles_into_a_padded_bank() {
    let mut decompiled = DecompiledTileset::default();
    decompiled.tiles.push(solid_tile(
        RgbaPixel::new(8, 0, 0, 255),
        TileProvenance::Metatile { metatile: 0, layer: 0, subtile: 0 },
    ));
    decompiled.tiles.push(solid_tile(
        RgbaPixel::new(0, 8, 0, 255),
        TileProvenance::Metatile { metatile: 0, layer: 0, subtile: 1 },
    ));

    let config = CompilerConfig::default();
    let fieldmap = small_fieldmap();
    let mut errors = ErrorsAndWarnings::new(HashMap::new());
    let mut ctx = CompilerContext::new(&config, &fieldmap, CompileMode::Primary, &mut errors);

    let compiled = compile_primary(&decompiled, &PalettePrimers::default(), &AttributesMap::new(), &mut ctx)
        .expect("two distinct single-color tiles should compile cleanly");

    assert_eq!(compiled.assignments.len(), 2);
    assert_eq!(compiled.tiles.len() % 16, 0, "tile bank must be padded to a multiple of 16");
    assert_eq!(compiled.tiles[0], gbatiles_core::tile::GbaTile::transparent());
    assert_eq!(compiled.tile_home_palette.len(), compiled.tiles.len());
}

#[test]
fn duplicate_tiles_collapse_to_one_bank_entry() {
    let mut decompiled = DecompiledTileset::default();
    let color = RgbaPixel::new(40, 40, 40, 255);
    decompiled.tiles.push(solid_tile(
        color,
        TileProvenance::Metatile { metatile: 0, layer: 0, subtile: 0 },
    ));
    decompiled.tiles.push(solid_tile(
        color,
        TileProvenance::Metatile { metatile: 1, layer: 0, subtile: 0 },
    ));

    let config = CompilerConfig::default();
    let fieldmap = small_fieldmap();
    let mut errors = ErrorsAndWarnings::new(HashMap::new());
    let mut ctx = CompilerContext::new(&config, &fieldmap, CompileMode::Primary, &mut errors);

    let compiled = compile_primary(&decompiled, &PalettePrimers::default(), &AttributesMap::new(), &mut ctx).unwrap();

    assert_eq!(compiled.assignments[0].tile_index, compiled.assignments[1].tile_index);
}

#[test]
fn metatile_attributes_survive_to_their_assignment() {
    let mut decompiled = DecompiledTileset::default();
    decompiled.tiles.push(solid_tile(
        RgbaPixel::new(64, 0, 0, 255),
        TileProvenance::Metatile { metatile: 5, layer: 0, subtile: 0 },
    ));

    let mut attributes = AttributesMap::new();
    attributes.insert(
        5,
        MetatileAttributes {
            behavior: 12,
            ..Default::default()
        },
    );

    let config = CompilerConfig::default();
    let fieldmap = small_fieldmap();
    let mut errors = ErrorsAndWarnings::new(HashMap::new());
    let mut ctx = CompilerContext::new(&config, &fieldmap, CompileMode::Primary, &mut errors);

    let compiled = compile_primary(&decompiled, &PalettePrimers::default(), &attributes, &mut ctx).unwrap();

    assert_eq!(compiled.assignments[0].attributes.behavior, 12);
}

#[test]
fn secondary_tileset_reuses_primary_color_index() {
    let mut primary_decompiled = DecompiledTileset::default();
    primary_decompiled.tiles.push(solid_tile(
        RgbaPixel::new(8, 8, 8, 255),
        TileProvenance::Metatile { metatile: 0, layer: 0, subtile: 0 },
    ));

    let config = CompilerConfig::default();
    let fieldmap = small_fieldmap();
    let mut primary_errors = ErrorsAndWarnings::new(HashMap::new());
    let mut primary_ctx = CompilerContext::new(&config, &fieldmap, CompileMode::Primary, &mut primary_errors);
    let primary = compile_primary(&primary_decompiled, &PalettePrimers::default(), &AttributesMap::new(), &mut primary_ctx).unwrap();

    let mut secondary_decompiled = DecompiledTileset::default();
    secondary_decompiled.tiles.push(solid_tile(
        RgbaPixel::new(8, 8, 8, 255),
        TileProvenance::Metatile { metatile: 0, layer: 0, subtile: 0 },
    ));
    secondary_decompiled.tiles.push(solid_tile(
        RgbaPixel::new(0, 0, 64, 255),
        TileProvenance::Metatile { metatile: 0, layer: 0, subtile: 1 },
    ));

    let mut secondary_errors = ErrorsAndWarnings::new(HashMap::new());
    let mut secondary_ctx = CompilerContext::new(&config, &fieldmap, CompileMode::Secondary, &mut secondary_errors);
    let secondary = compile_secondary(
        &secondary_decompiled,
        &PalettePrimers::default(),
        &AttributesMap::new(),
        &primary,
        &mut secondary_ctx,
    )
    .expect("a secondary tile sharing the primary's only color should reuse its palette");

    // The shared gray tile's color was already registered by the primary compile, so the
    // secondary's color index must assign it the same dense index rather than a fresh one.
    let shared_bgr = RgbaPixel::new(8, 8, 8, 255).to_bgr15();
    assert_eq!(
        primary.color_index.index_of(shared_bgr),
        secondary.color_index.index_of(shared_bgr)
    );
    assert_eq!(secondary.assignments.len(), 2);
}

#[test]
fn too_many_colors_in_one_tile_is_a_phase_boundary_error() {
    let mut pixels = [MAGENTA; 64];
    for i in 0..17 {
        pixels[i] = RgbaPixel::new(i as u8 * 8, 0, 0, 255);
    }
    let mut decompiled = DecompiledTileset::default();
    decompiled.tiles.push(RawTile::new(
        pixels,
        TileProvenance::Metatile { metatile: 0, layer: 0, subtile: 0 },
    ));

    let config = CompilerConfig::default();
    let fieldmap = small_fieldmap();
    let mut errors = ErrorsAndWarnings::new(HashMap::new());
    let mut ctx = CompilerContext::new(&config, &fieldmap, CompileMode::Primary, &mut errors);

    let result = compile_primary(&decompiled, &PalettePrimers::default(), &AttributesMap::new(), &mut ctx);
    assert!(result.is_err());
}

#[test]
fn tile_budget_overflow_is_fatal() {
    let mut decompiled = DecompiledTileset::default();
    for i in 0..40u32 {
        let r = ((i % 32) * 8) as u8;
        let g = ((i / 32) * 8) as u8;
        decompiled.tiles.push(solid_tile(
            RgbaPixel::new(r, g, 0, 255),
            TileProvenance::Metatile { metatile: i as usize, layer: 0, subtile: 0 },
        ));
    }

    let config = CompilerConfig::default();
    // A tiny primary tile budget that the 40 distinct tiles above are guaranteed to exceed.
    let fieldmap = FieldmapConfig {
        num_tiles_in_primary: 8,
        ..small_fieldmap()
    };
    let mut errors = ErrorsAndWarnings::new(HashMap::new());
    let mut ctx = CompilerContext::new(&config, &fieldmap, CompileMode::Primary, &mut errors);

    let result = compile_primary(&decompiled, &PalettePrimers::default(), &AttributesMap::new(), &mut ctx);
    assert!(result.is_err());
}
