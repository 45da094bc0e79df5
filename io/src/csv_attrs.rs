//! Metatile attribute CSV import (SPEC_FULL.md §4.12). One row per metatile: `id,behavior,terrain_type,encounter_type,layer_type`.

use std::path::Path;

use gbatiles_core::diagnostics::{ErrorsAndWarnings, WarningKind};
use gbatiles_core::input::{AttributesMap, EncounterType, LayerType, MetatileAttributes, TerrainType};

use crate::error::{IoError, IoResult};

#[derive(Debug, serde::Deserialize)]
struct Row {
    id: usize,
    behavior: u16,
    #[serde(default)]
    terrain_type: String,
    #[serde(default)]
    encounter_type: String,
    #[serde(default)]
    layer_type: String,
}

fn parse_terrain(s: &str) -> TerrainType {
    match s {
        "grass" => TerrainType::Grass,
        "water" => TerrainType::Water,
        "waterfall" => TerrainType::Waterfall,
        _ => TerrainType::Normal,
    }
}

fn parse_encounter(s: &str) -> EncounterType {
    match s {
        "land" => EncounterType::Land,
        "water" => EncounterType::Water,
        _ => EncounterType::None,
    }
}

fn parse_layer(s: &str) -> LayerType {
    match s {
        "covered" => LayerType::Covered,
        "split" => LayerType::Split,
        "triple" => LayerType::TripleLayer,
        _ => LayerType::Normal,
    }
}

/// Reads a metatile-attributes CSV. Unrecognized enum spellings fall back to their default variant
/// and emit `attribute-format-mismatch`; a metatile index absent from the whole CSV is left at the
/// `AttributesMap` default and separately flagged by the caller via `missing-attributes-csv`.
pub fn load_attributes(path: &Path, errors: &mut ErrorsAndWarnings) -> IoResult<AttributesMap> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| IoError::ParseCsv { path: path.to_path_buf(), source })?;
    let mut attributes = AttributesMap::new();

    for result in reader.deserialize() {
        let row: Row = result.map_err(|source| IoError::ParseCsv { path: path.to_path_buf(), source })?;

        let terrain = parse_terrain(&row.terrain_type);
        let encounter = parse_encounter(&row.encounter_type);
        let layer = parse_layer(&row.layer_type);

        if (!row.terrain_type.is_empty() && terrain == TerrainType::Normal && row.terrain_type != "normal")
            || (!row.encounter_type.is_empty() && encounter == EncounterType::None && row.encounter_type != "none")
            || (!row.layer_type.is_empty() && layer == LayerType::Normal && row.layer_type != "normal")
        {
            errors.push_warning(
                WarningKind::AttributeFormatMismatch,
                None,
                format!("metatile {} has an unrecognized attribute spelling, defaulting it", row.id),
            );
        }

        attributes.insert(
            row.id,
            MetatileAttributes {
                behavior: row.behavior,
                terrain_type: terrain,
                encounter_type: encounter,
                layer_type: layer,
            },
        );
    }

    Ok(attributes)
}

/// Emits `missing-attributes-csv` for every metatile index in `0..num_metatiles` absent from
/// `attributes`.
pub fn warn_missing_attributes(attributes: &AttributesMap, num_metatiles: usize, errors: &mut ErrorsAndWarnings) {
    for metatile in 0..num_metatiles {
        if !attributes.contains(metatile) {
            errors.push_warning(
                WarningKind::MissingAttributesCsv,
                None,
                format!("metatile {metatile} has no entry in the attributes CSV; using defaults"),
            );
        }
    }
}
