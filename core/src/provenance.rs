//! Provenance metadata attached to input tiles, used only for diagnostics.

/// Where a [`crate::tile::RawTile`] came from, for diagnostic messages. Never affects
/// compilation semantics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TileProvenance {
    /// A tile from a freestanding (non-metatile) input sheet, e.g. a primer.
    Freestanding { index: usize },
    /// A tile that is part of a regular metatile layer.
    Metatile {
        metatile: usize,
        layer: u8,
        subtile: u8,
    },
    /// A tile that is a frame of an animation.
    AnimationFrame {
        anim: String,
        frame: usize,
        subtile: u8,
    },
}

impl std::fmt::Display for TileProvenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TileProvenance::Freestanding { index } => write!(f, "tile {index}"),
            TileProvenance::Metatile {
                metatile,
                layer,
                subtile,
            } => write!(f, "metatile {metatile} layer {layer} subtile {subtile}"),
            TileProvenance::AnimationFrame {
                anim,
                frame,
                subtile,
            } => write!(f, "animation '{anim}' frame {frame} subtile {subtile}"),
        }
    }
}
