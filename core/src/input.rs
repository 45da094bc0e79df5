//! Inputs consumed by the core (SPEC_FULL.md §6): produced by the importer (`gbatiles-io`), which
//! is an external collaborator that the core never calls into directly.

use std::collections::HashMap;

use crate::tile::RawTile;

/// One frame of an animation: a small grid of tiles, in row-major order.
#[derive(Debug, Clone)]
pub struct AnimationFrame {
    pub name: String,
    pub tiles: Vec<RawTile>,
}

/// A named sequence of frames sharing dimensions; one frame is the designated key frame whose
/// tiles become first-class tile-bank entries (SPEC_FULL.md §4.9).
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: String,
    pub frames: Vec<AnimationFrame>,
    /// Index into `frames` of the key frame.
    pub key_frame: usize,
}

impl Animation {
    pub fn key_frame(&self) -> &AnimationFrame {
        &self.frames[self.key_frame]
    }

    pub fn non_key_frames(&self) -> impl Iterator<Item = &AnimationFrame> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.key_frame)
            .map(|(_, f)| f)
    }
}

/// An ordered vector of freestanding tiles plus an ordered vector of animations.
#[derive(Debug, Clone, Default)]
pub struct DecompiledTileset {
    pub tiles: Vec<RawTile>,
    pub animations: Vec<Animation>,
}

/// Synthetic input tiles contributing colors to palette allocation without appearing in output.
#[derive(Debug, Clone, Default)]
pub struct PalettePrimers {
    pub tiles: Vec<RawTile>,
}

/// `{ behavior: u16, terrain_type, encounter_type, layer_type }` per metatile index. The core
/// never resolves behavior *names*; that translation happens in `gbatiles-io`/`gbatiles-cli`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetatileAttributes {
    pub behavior: u16,
    pub terrain_type: TerrainType,
    pub encounter_type: EncounterType,
    pub layer_type: LayerType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainType {
    #[default]
    Normal,
    Grass,
    Water,
    Waterfall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EncounterType {
    #[default]
    None,
    Land,
    Water,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerType {
    #[default]
    Normal,
    Covered,
    Split,
    TripleLayer,
}

/// Mapping from metatile index to attributes. Default values apply to absent indices.
#[derive(Debug, Clone, Default)]
pub struct AttributesMap {
    entries: HashMap<usize, MetatileAttributes>,
}

impl AttributesMap {
    pub fn new() -> Self {
        AttributesMap::default()
    }

    pub fn insert(&mut self, metatile_index: usize, attrs: MetatileAttributes) {
        self.entries.insert(metatile_index, attrs);
    }

    pub fn get(&self, metatile_index: usize) -> MetatileAttributes {
        self.entries.get(&metatile_index).copied().unwrap_or_default()
    }

    pub fn contains(&self, metatile_index: usize) -> bool {
        self.entries.contains_key(&metatile_index)
    }
}
