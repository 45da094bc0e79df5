//! TOML project configuration: a `version` field gates format changes so old config files fail
//! loudly instead of silently misparsing (SPEC_FULL.md §4.11).

use std::path::Path;

use serde::de::Error as _;
use serde::Deserialize;

use gbatiles_core::context::{AssignAlgorithm, CompilerConfig, FieldmapConfig, PruneStrategy, SearchParams};

use crate::error::{IoError, IoResult};

#[derive(Debug, Deserialize)]
struct ConfigFileV1 {
    version: String,
    transparency_color: Option<[u8; 3]>,
    triple_layer: Option<bool>,
    cache_assign: Option<bool>,
    primary: Option<SearchParamsFile>,
    secondary: Option<SearchParamsFile>,
    fieldmap: Option<FieldmapFile>,
}

#[derive(Debug, Deserialize)]
struct SearchParamsFile {
    algorithm: Option<String>,
    explored_node_cutoff: Option<usize>,
    prune: Option<String>,
    prune_n: Option<usize>,
    prune_fraction: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FieldmapFile {
    num_tiles_in_primary: Option<usize>,
    num_tiles_total: Option<usize>,
    num_metatiles_in_primary: Option<usize>,
    num_metatiles_total: Option<usize>,
    num_palettes_in_primary: Option<usize>,
    num_palettes_total: Option<usize>,
    num_tiles_per_metatile: Option<usize>,
}

fn parse_search_params(file: Option<SearchParamsFile>, default: SearchParams) -> SearchParams {
    let Some(file) = file else { return default };

    let algorithm = match file.algorithm.as_deref() {
        Some("bfs") => AssignAlgorithm::Bfs,
        Some("dfs") => AssignAlgorithm::Dfs,
        _ => default.algorithm,
    };

    let prune = match file.prune.as_deref() {
        Some("best-branches") => PruneStrategy::BestBranches(file.prune_n.unwrap_or(4)),
        Some("smart") => PruneStrategy::SmartPrune { fraction: file.prune_fraction.unwrap_or(0.2) },
        Some("none") => PruneStrategy::None,
        _ => default.prune,
    };

    SearchParams {
        algorithm,
        explored_node_cutoff: file.explored_node_cutoff.unwrap_or(default.explored_node_cutoff),
        prune,
    }
}

/// Loads `path`, requiring `version = "1"`; future incompatible formats should bump this and add a
/// new `ConfigFileV2` rather than silently reinterpreting old fields.
pub fn load_compiler_config(path: &Path) -> IoResult<CompilerConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read { path: path.to_path_buf(), source })?;
    let parsed: ConfigFileV1 = toml::from_str(&text).map_err(|source| IoError::ParseToml { path: path.to_path_buf(), source })?;

    if parsed.version != "1" {
        return Err(IoError::ParseToml {
            path: path.to_path_buf(),
            source: toml::de::Error::custom(format!("unsupported config version {:?}, expected \"1\"", parsed.version)),
        });
    }

    let default = CompilerConfig::default();
    Ok(CompilerConfig {
        transparency_color: parsed
            .transparency_color
            .map(|[r, g, b]| gbatiles_core::color::RgbaPixel::new(r, g, b, 255))
            .unwrap_or(default.transparency_color),
        triple_layer: parsed.triple_layer.unwrap_or(default.triple_layer),
        primary: parse_search_params(parsed.primary, default.primary),
        secondary: parse_search_params(parsed.secondary, default.secondary),
        cache_assign: parsed.cache_assign.unwrap_or(default.cache_assign),
    })
}

pub fn load_fieldmap_config(path: &Path) -> IoResult<FieldmapConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read { path: path.to_path_buf(), source })?;
    let parsed: ConfigFileV1 = toml::from_str(&text).map_err(|source| IoError::ParseToml { path: path.to_path_buf(), source })?;

    let default = FieldmapConfig::default();
    let fieldmap = match parsed.fieldmap {
        None => default,
        Some(f) => FieldmapConfig {
            num_tiles_in_primary: f.num_tiles_in_primary.unwrap_or(default.num_tiles_in_primary),
            num_tiles_total: f.num_tiles_total.unwrap_or(default.num_tiles_total),
            num_metatiles_in_primary: f.num_metatiles_in_primary.unwrap_or(default.num_metatiles_in_primary),
            num_metatiles_total: f.num_metatiles_total.unwrap_or(default.num_metatiles_total),
            num_palettes_in_primary: f.num_palettes_in_primary.unwrap_or(default.num_palettes_in_primary),
            num_palettes_total: f.num_palettes_total.unwrap_or(default.num_palettes_total),
            num_tiles_per_metatile: f.num_tiles_per_metatile.unwrap_or(default.num_tiles_per_metatile),
        },
    };

    fieldmap.validate().map_err(|message| IoError::ParseToml {
        path: path.to_path_buf(),
        source: toml::de::Error::custom(message),
    })?;

    Ok(fieldmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_version() {
        let path = std::env::temp_dir().join("gbatiles_io_test_config_bad_version.toml");
        std::fs::write(&path, "version = \"99\"\n").unwrap();

        let result = load_compiler_config(&path);
        assert!(result.is_err());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn applies_overrides_on_top_of_defaults() {
        let path = std::env::temp_dir().join("gbatiles_io_test_config_ok.toml");
        std::fs::write(&path, "version = \"1\"\ntriple_layer = true\n").unwrap();

        let config = load_compiler_config(&path).unwrap();
        assert!(config.triple_layer);

        let _ = std::fs::remove_file(&path);
    }
}
