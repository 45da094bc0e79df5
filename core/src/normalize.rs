//! Per-tile canonicalization over the 4-element flip group (SPEC_FULL.md §4.3).

use std::collections::HashMap;

use crate::color::{Color15, RgbaPixel};
use crate::diagnostics::{ErrorsAndWarnings, RecoverableKind, WarningKind};
use crate::input::{DecompiledTileset, PalettePrimers};
use crate::provenance::TileProvenance;
use crate::tile::{LocalPalette, NormalTile, RawTile, INVALID_PIXEL, TILE_SIDE};

/// Tracks the first RGBA variant seen per [`Color15`], across the whole normalization pass, so a
/// later RGBA that rounds to an already-registered color but isn't byte-identical to the first
/// one can be flagged as lossy (SPEC_FULL.md §4.3).
#[derive(Debug, Default)]
pub struct ColorVariantTracker {
    first_variant: HashMap<Color15, RgbaPixel>,
}

impl ColorVariantTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this RGBA is a precision-losing variant of an already-seen color.
    fn observe(&mut self, bgr: Color15, rgba: RgbaPixel) -> bool {
        match self.first_variant.get(&bgr) {
            None => {
                self.first_variant.insert(bgr, rgba);
                false
            }
            Some(&first) => first != rgba,
        }
    }
}

/// Inserts `rgba` into `palette`, returning its slot index (or [`INVALID_PIXEL`] on error).
/// Mirrors SPEC_FULL.md §4.3's `insert_color` rules exactly.
pub fn insert_color(
    palette: &mut LocalPalette,
    rgba: RgbaPixel,
    transparency: RgbaPixel,
    tracker: &mut ColorVariantTracker,
    errors: &mut ErrorsAndWarnings,
    location: TileProvenance,
    emit_diagnostics: bool,
) -> u8 {
    if rgba.is_transparent() || rgba == transparency {
        return 0;
    }

    if !rgba.is_opaque() {
        if emit_diagnostics {
            errors.push_recoverable(
                RecoverableKind::InvalidAlphaValue,
                Some(location.clone()),
                format!("pixel at {location} has alpha value {}, expected 0 or 255", rgba.a),
            );
        }
        return INVALID_PIXEL;
    }

    let bgr = rgba.to_bgr15();
    let transparency_bgr = transparency.to_bgr15();

    if bgr == transparency_bgr && rgba != transparency {
        if emit_diagnostics {
            errors.push_warning(
                WarningKind::TransparencyCollapse,
                Some(location.clone()),
                format!(
                    "color at {location} is visually distinct from the transparency color but \
                     collapses to the same 15-bit value after quantization"
                ),
            );
        }
        return 0;
    }

    if emit_diagnostics && tracker.observe(bgr, rgba) {
        errors.push_warning(
            WarningKind::ColorPrecisionLoss,
            Some(location.clone()),
            format!(
                "color at {location} loses precision: rounds to the same 15-bit color as an \
                 earlier, different RGBA value"
            ),
        );
    }

    if let Some(slot) = palette.find(bgr) {
        return slot as u8;
    }

    if palette.is_full() {
        if emit_diagnostics {
            errors.push_recoverable(
                RecoverableKind::TooManyUniqueColors,
                Some(location.clone()),
                format!("tile at {location} has more than 16 unique colors"),
            );
        }
        return INVALID_PIXEL;
    }

    palette.push(bgr) as u8
}

/// Reads `tile` with rows/columns optionally reversed and fills a fresh [`LocalPalette`] in scan
/// order via [`insert_color`]. Diagnostics are only emitted when `emit_diagnostics` is set (true
/// only for the identity candidate, by convention of [`normalize`]).
fn candidate(
    tile: &RawTile,
    h_flip: bool,
    v_flip: bool,
    transparency: RgbaPixel,
    tracker: &mut ColorVariantTracker,
    errors: &mut ErrorsAndWarnings,
    emit_diagnostics: bool,
) -> NormalTile {
    let mut palette = LocalPalette::new(transparency.to_bgr15());
    let mut indices = [0u8; 64];

    for row in 0..TILE_SIDE {
        for col in 0..TILE_SIDE {
            let src_row = if v_flip { TILE_SIDE - 1 - row } else { row };
            let src_col = if h_flip { TILE_SIDE - 1 - col } else { col };
            let pixel = tile.get_pixel(src_row, src_col);

            indices[row * TILE_SIDE + col] = insert_color(
                &mut palette,
                pixel,
                transparency,
                tracker,
                errors,
                tile.provenance.clone(),
                emit_diagnostics,
            );
        }
    }

    NormalTile {
        indices,
        palette,
        h_flip,
        v_flip,
        provenance: tile.provenance.clone(),
        extra_frames: Vec::new(),
    }
}

/// Returns whichever of the four flip orientations is lexicographically smallest by its
/// pixel-index array, preferring identity on ties (SPEC_FULL.md §4.3's ordering contract).
pub fn normalize(
    tile: &RawTile,
    transparency: RgbaPixel,
    tracker: &mut ColorVariantTracker,
    errors: &mut ErrorsAndWarnings,
) -> NormalTile {
    let identity = candidate(tile, false, false, transparency, tracker, errors, true);

    if identity.is_fully_transparent() {
        return identity;
    }

    let h = candidate(tile, true, false, transparency, tracker, errors, false);
    let v = candidate(tile, false, true, transparency, tracker, errors, false);
    let hv = candidate(tile, true, true, transparency, tracker, errors, false);

    [identity, h, v, hv]
        .into_iter()
        .min_by(|a, b| a.indices.cmp(&b.indices))
        .expect("non-empty array always has a minimum")
}

/// One entry of the ordered list [`normalize_decompiled`] produces: either an animation key/non-key
/// frame tile, or a regular freestanding tile.
pub struct TaggedNormalTile {
    pub animated: bool,
    pub anim_name: Option<String>,
    pub tile: NormalTile,
}

/// Produces the ordered list of normalized tiles (animation frames first, so key-frame tiles land
/// at stable low tile-bank indices, then regular tiles) plus the normalized primer tiles
/// (SPEC_FULL.md §4.3).
pub fn normalize_decompiled(
    decompiled: &DecompiledTileset,
    primers: &PalettePrimers,
    transparency: RgbaPixel,
    errors: &mut ErrorsAndWarnings,
) -> (Vec<TaggedNormalTile>, Vec<NormalTile>) {
    let mut tracker = ColorVariantTracker::new();
    let mut out = Vec::new();

    for anim in &decompiled.animations {
        let key_frame = anim.key_frame();
        for raw in &key_frame.tiles {
            let mut normal = normalize(raw, transparency, &mut tracker, errors);

            for frame in anim.non_key_frames() {
                // Non-key frames share the key frame's palette and flip orientation: re-derive
                // their indices against that exact palette rather than re-normalizing them
                // independently, which is what keeps them "parallel" to the key frame.
                let idx_in_frame = key_frame
                    .tiles
                    .iter()
                    .position(|t| std::ptr::eq(t, raw))
                    .unwrap_or(0);
                if let Some(frame_tile) = frame.tiles.get(idx_in_frame) {
                    normal
                        .extra_frames
                        .push(reindex_against(frame_tile, &normal, transparency));
                }
            }

            out.push(TaggedNormalTile {
                animated: true,
                anim_name: Some(anim.name.clone()),
                tile: normal,
            });
        }
    }

    for raw in &decompiled.tiles {
        let normal = normalize(raw, transparency, &mut tracker, errors);
        out.push(TaggedNormalTile {
            animated: false,
            anim_name: None,
            tile: normal,
        });
    }

    let primer_tiles = primers
        .tiles
        .iter()
        .map(|raw| normalize(raw, transparency, &mut tracker, errors))
        .collect();

    (out, primer_tiles)
}

/// Re-derives a non-key animation frame's pixel-index array against an already-fixed palette and
/// flip orientation, rather than re-running the full 4-way normalization search on it: an
/// animation's frames must share one palette, so only the key frame chooses it.
fn reindex_against(
    frame_tile: &RawTile,
    key_normal: &NormalTile,
    transparency: RgbaPixel,
) -> [u8; 64] {
    let mut indices = [0u8; 64];

    for row in 0..TILE_SIDE {
        for col in 0..TILE_SIDE {
            let src_row = if key_normal.v_flip { TILE_SIDE - 1 - row } else { row };
            let src_col = if key_normal.h_flip { TILE_SIDE - 1 - col } else { col };
            let pixel = frame_tile.get_pixel(src_row, src_col);

            let slot = if pixel.is_transparent() || pixel == transparency {
                0
            } else {
                key_normal
                    .palette
                    .find(pixel.to_bgr15())
                    .map(|s| s as u8)
                    .unwrap_or(INVALID_PIXEL)
            };

            indices[row * TILE_SIDE + col] = slot;
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::TileProvenance;
    use std::collections::HashMap;

    const MAGENTA: RgbaPixel = RgbaPixel::new(255, 0, 255, 255);

    fn solid_tile(color: RgbaPixel) -> RawTile {
        RawTile::new([color; 64], TileProvenance::Freestanding { index: 0 })
    }

    fn corner_tile() -> RawTile {
        let mut pixels = [MAGENTA; 64];
        let colors = [
            RgbaPixel::new(8, 8, 8, 255),
            RgbaPixel::new(16, 16, 16, 255),
            RgbaPixel::new(24, 24, 24, 255),
            RgbaPixel::new(32, 32, 32, 255),
            RgbaPixel::new(40, 40, 40, 255),
            RgbaPixel::new(48, 48, 48, 255),
            RgbaPixel::new(56, 56, 56, 255),
            RgbaPixel::new(64, 64, 64, 255),
        ];
        // 8 distinct corner-ish positions, each a different color.
        let positions = [
            (0, 0),
            (0, 7),
            (7, 0),
            (7, 7),
            (1, 1),
            (1, 6),
            (6, 1),
            (6, 6),
        ];
        for (pos, color) in positions.iter().zip(colors.iter()) {
            pixels[pos.0 * 8 + pos.1] = *color;
        }
        RawTile::new(pixels, TileProvenance::Freestanding { index: 1 })
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut errors = ErrorsAndWarnings::new(HashMap::new());
        let mut tracker = ColorVariantTracker::new();
        let tile = corner_tile();

        let once = normalize(&tile, MAGENTA, &mut tracker, &mut errors);

        let reapplied_raw = RawTile::new(once.indices_as_rgba(&once.palette), once.provenance);
        let twice = normalize(&reapplied_raw, MAGENTA, &mut tracker, &mut errors);

        assert_eq!(once.indices, twice.indices);
        assert_eq!(once.h_flip, twice.h_flip);
        assert_eq!(once.v_flip, twice.v_flip);
    }

    #[test]
    fn fully_transparent_tile_short_circuits() {
        let mut errors = ErrorsAndWarnings::new(HashMap::new());
        let mut tracker = ColorVariantTracker::new();
        let tile = solid_tile(RgbaPixel::new(0, 0, 0, 0));

        let normal = normalize(&tile, MAGENTA, &mut tracker, &mut errors);
        assert!(normal.is_fully_transparent());
        assert!(!normal.h_flip);
        assert!(!normal.v_flip);
    }

    #[test]
    fn nine_color_corner_tile_prefers_identity() {
        let mut errors = ErrorsAndWarnings::new(HashMap::new());
        let mut tracker = ColorVariantTracker::new();
        let tile = corner_tile();

        let normal = normalize(&tile, MAGENTA, &mut tracker, &mut errors);
        assert_eq!(normal.palette.size(), 9);
        assert!(!normal.h_flip);
        assert!(!normal.v_flip);
    }

    #[test]
    fn too_many_colors_is_recoverable_error() {
        let mut errors = ErrorsAndWarnings::new(HashMap::new());
        let mut tracker = ColorVariantTracker::new();

        let mut pixels = [MAGENTA; 64];
        for i in 0..17 {
            pixels[i] = RgbaPixel::new(i as u8 * 8, 0, 0, 255);
        }
        let tile = RawTile::new(pixels, TileProvenance::Freestanding { index: 2 });

        normalize(&tile, MAGENTA, &mut tracker, &mut errors);
        // 16 distinct non-transparent colors fill the palette; the 16th and 17th each
        // independently hit the full-palette branch in insert_color, so two recoverable errors.
        assert_eq!(errors.recoverable_error_count(), 2);
    }

    #[test]
    fn invalid_alpha_is_recoverable_error() {
        let mut errors = ErrorsAndWarnings::new(HashMap::new());
        let mut tracker = ColorVariantTracker::new();
        let tile = solid_tile(RgbaPixel::new(10, 10, 10, 128));

        normalize(&tile, MAGENTA, &mut tracker, &mut errors);
        assert_eq!(errors.recoverable_error_count(), 64);
    }
}
