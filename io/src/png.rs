//! PNG tilesheet import and paletted PNG emission (SPEC_FULL.md §4.12): open once with the `image`
//! crate, walk pixels, hand back plain values.

use std::path::Path;

use gbatiles_core::color::RgbaPixel;
use gbatiles_core::finalized_palette::FinalizedPalette;
use gbatiles_core::input::{Animation, AnimationFrame};
use gbatiles_core::provenance::TileProvenance;
use gbatiles_core::tile::{GbaTile, RawTile, TILE_PIXELS, TILE_SIDE};

use crate::error::{IoError, IoResult};

fn to_rgba(pixel: image::Rgba<u8>) -> RgbaPixel {
    let [r, g, b, a] = pixel.0;
    RgbaPixel::new(r, g, b, a)
}

/// Loads a PNG tilesheet, slicing it into an 8x8-pixel grid in row-major order. `provenance_for`
/// maps each grid cell to the `TileProvenance` the caller wants attached (freestanding tile index,
/// metatile subtile, or animation frame).
pub fn load_tile_grid(
    path: &Path,
    provenance_for: impl Fn(usize, usize) -> TileProvenance,
) -> IoResult<Vec<RawTile>> {
    let img = image::open(path).map_err(|source| IoError::DecodePng { path: path.to_path_buf(), source })?;
    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);

    if width % TILE_SIDE != 0 || height % TILE_SIDE != 0 {
        return Err(IoError::ImageNotTileAligned {
            path: path.to_path_buf(),
            width: width as u32,
            height: height as u32,
        });
    }

    let tiles_wide = width / TILE_SIDE;
    let tiles_tall = height / TILE_SIDE;
    let mut tiles = Vec::with_capacity(tiles_wide * tiles_tall);

    for tile_row in 0..tiles_tall {
        for tile_col in 0..tiles_wide {
            let mut pixels = [RgbaPixel::new(0, 0, 0, 0); TILE_SIDE * TILE_SIDE];
            for row in 0..TILE_SIDE {
                for col in 0..TILE_SIDE {
                    let x = (tile_col * TILE_SIDE + col) as u32;
                    let y = (tile_row * TILE_SIDE + row) as u32;
                    pixels[row * TILE_SIDE + col] = to_rgba(*rgba.get_pixel(x, y));
                }
            }
            tiles.push(RawTile::new(pixels, provenance_for(tile_row, tile_col)));
        }
    }

    Ok(tiles)
}

/// Decodes one animation frame's tile grid, row-major, tagging each subtile with its flat index
/// (`tile_row * tiles_wide + tile_col`) rather than a caller-supplied closure, since an animation
/// frame's provenance needs the grid's own width up front to number subtiles — unlike
/// `load_tile_grid`, whose callers already know the sheet's metatile layout before loading.
fn load_animation_frame(path: &Path, anim: &str, frame: usize) -> IoResult<(Vec<RawTile>, (usize, usize))> {
    let img = image::open(path).map_err(|source| IoError::DecodePng { path: path.to_path_buf(), source })?;
    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);

    if width % TILE_SIDE != 0 || height % TILE_SIDE != 0 {
        return Err(IoError::ImageNotTileAligned {
            path: path.to_path_buf(),
            width: width as u32,
            height: height as u32,
        });
    }

    let tiles_wide = width / TILE_SIDE;
    let tiles_tall = height / TILE_SIDE;
    let mut tiles = Vec::with_capacity(tiles_wide * tiles_tall);

    for tile_row in 0..tiles_tall {
        for tile_col in 0..tiles_wide {
            let mut pixels = [RgbaPixel::new(0, 0, 0, 0); TILE_SIDE * TILE_SIDE];
            for row in 0..TILE_SIDE {
                for col in 0..TILE_SIDE {
                    let x = (tile_col * TILE_SIDE + col) as u32;
                    let y = (tile_row * TILE_SIDE + row) as u32;
                    pixels[row * TILE_SIDE + col] = to_rgba(*rgba.get_pixel(x, y));
                }
            }
            let subtile = (tile_row * tiles_wide + tile_col) as u8;
            tiles.push(RawTile::new(
                pixels,
                TileProvenance::AnimationFrame { anim: anim.to_string(), frame, subtile },
            ));
        }
    }

    Ok((tiles, (tiles_wide, tiles_tall)))
}

/// Loads every `anim_dir/<name>/<NN>.png` subtree into [`Animation`]s: one subdirectory per
/// animation (sorted by name), one tile-grid PNG per frame (sorted by filename), frame `0` always
/// the key frame — the same `keyFrameIndex() == 0` convention the source uses. All frames of one
/// animation must share the key frame's tile-grid dimensions; a mismatch is a fatal
/// [`IoError::AnimationFrameSizeMismatch`] (SPEC_FULL.md §4.9, §4.12).
pub fn load_animations(anim_dir: &Path) -> IoResult<Vec<Animation>> {
    let mut anim_dirs: Vec<_> = std::fs::read_dir(anim_dir)
        .map_err(|source| IoError::Read { path: anim_dir.to_path_buf(), source })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    anim_dirs.sort();

    let mut animations = Vec::with_capacity(anim_dirs.len());

    for dir in anim_dirs {
        let name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

        let mut frame_paths: Vec<_> = std::fs::read_dir(&dir)
            .map_err(|source| IoError::Read { path: dir.clone(), source })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext.eq_ignore_ascii_case("png")).unwrap_or(false))
            .collect();
        frame_paths.sort();

        let mut frames = Vec::with_capacity(frame_paths.len());
        let mut key_dims: Option<(usize, usize)> = None;

        for (frame_index, path) in frame_paths.iter().enumerate() {
            let (tiles, dims) = load_animation_frame(path, &name, frame_index)?;

            match key_dims {
                None => key_dims = Some(dims),
                Some(expected) if expected != dims => {
                    return Err(IoError::AnimationFrameSizeMismatch { anim: name, frame: frame_index });
                }
                _ => {}
            }

            frames.push(AnimationFrame { name: format!("{name}/{frame_index}"), tiles });
        }

        animations.push(Animation { name, frames, key_frame: 0 });
    }

    Ok(animations)
}

/// Emits a tile bank as an indexed-color preview PNG, `tiles_wide` tiles per row, each tile
/// resolved against `palette_of` (typically [`gbatiles_core::compiled::CompiledTileset::tile_home_palette`]
/// joined with the compiled `palettes`).
pub fn write_tile_bank_png(
    path: &Path,
    tiles: &[gbatiles_core::tile::GbaTile],
    tiles_wide: usize,
    palette_of: impl Fn(usize) -> [RgbaPixel; 16],
) -> IoResult<()> {
    let tiles_tall = tiles.len().div_ceil(tiles_wide);
    let width = (tiles_wide * TILE_SIDE) as u32;
    let height = (tiles_tall * TILE_SIDE) as u32;

    let mut out = image::RgbaImage::new(width, height);

    for (i, tile) in tiles.iter().enumerate() {
        let tile_row = i / tiles_wide;
        let tile_col = i % tiles_wide;
        let colors = palette_of(i);

        for row in 0..TILE_SIDE {
            for col in 0..TILE_SIDE {
                let slot = tile.indices[row * TILE_SIDE + col] as usize;
                let RgbaPixel { r, g, b, a } = colors[slot];
                let x = (tile_col * TILE_SIDE + col) as u32;
                let y = (tile_row * TILE_SIDE + row) as u32;
                out.put_pixel(x, y, image::Rgba([r, g, b, a]));
            }
        }
    }

    out.save(path).map_err(|source| IoError::DecodePng { path: path.to_path_buf(), source })
}

/// Reconstructs a tile bank's [`GbaTile`]s from a preview PNG written by [`write_tile_bank_png`], by
/// brute-force matching each tile's 16 distinct-or-fewer colors against `palettes` in order and
/// taking the first palette every pixel resolves against. A tile matching no palette falls back to
/// [`GbaTile::transparent`] (the file is stale or hand-edited; SPEC_FULL.md §4.12 leaves recovery
/// up to the tool rather than aborting the decompile).
pub fn read_tile_bank_png(path: &Path, tiles_wide: usize, palettes: &[FinalizedPalette]) -> IoResult<Vec<GbaTile>> {
    let img = image::open(path).map_err(|source| IoError::DecodePng { path: path.to_path_buf(), source })?;
    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);

    if width % TILE_SIDE != 0 || height % TILE_SIDE != 0 {
        return Err(IoError::ImageNotTileAligned {
            path: path.to_path_buf(),
            width: width as u32,
            height: height as u32,
        });
    }

    let tiles_tall = height / TILE_SIDE;
    let mut tiles = Vec::with_capacity(tiles_wide * tiles_tall);

    for tile_row in 0..tiles_tall {
        for tile_col in 0..tiles_wide {
            let mut pixels = [RgbaPixel::new(0, 0, 0, 0); TILE_PIXELS];
            for row in 0..TILE_SIDE {
                for col in 0..TILE_SIDE {
                    let x = (tile_col * TILE_SIDE + col) as u32;
                    let y = (tile_row * TILE_SIDE + row) as u32;
                    pixels[row * TILE_SIDE + col] = to_rgba(*rgba.get_pixel(x, y));
                }
            }

            tiles.push(resolve_against_palettes(&pixels, palettes));
        }
    }

    Ok(tiles)
}

fn resolve_against_palettes(pixels: &[RgbaPixel; TILE_PIXELS], palettes: &[FinalizedPalette]) -> GbaTile {
    'palette: for palette in palettes {
        let mut indices = [0u8; TILE_PIXELS];
        for (i, pixel) in pixels.iter().enumerate() {
            if pixel.is_transparent() {
                indices[i] = 0;
                continue;
            }
            match palette.slot_of(pixel.to_bgr15()) {
                Some(slot) => indices[i] = slot as u8,
                None => continue 'palette,
            }
        }
        return GbaTile { indices };
    }
    GbaTile::transparent()
}

/// Writes a plain RGBA tile grid (not palette-indexed), `tiles_wide` tiles per row, used for the
/// decompiler's reconstructed layer output.
pub fn write_tile_grid(path: &Path, tiles: &[RawTile], tiles_wide: usize) -> IoResult<()> {
    let tiles_tall = tiles.len().div_ceil(tiles_wide.max(1));
    let width = (tiles_wide * TILE_SIDE) as u32;
    let height = (tiles_tall * TILE_SIDE) as u32;

    let mut out = image::RgbaImage::new(width, height);

    for (i, tile) in tiles.iter().enumerate() {
        let tile_row = i / tiles_wide;
        let tile_col = i % tiles_wide;

        for row in 0..TILE_SIDE {
            for col in 0..TILE_SIDE {
                let RgbaPixel { r, g, b, a } = tile.get_pixel(row, col);
                let x = (tile_col * TILE_SIDE + col) as u32;
                let y = (tile_row * TILE_SIDE + row) as u32;
                out.put_pixel(x, y, image::Rgba([r, g, b, a]));
            }
        }
    }

    out.save(path).map_err(|source| IoError::DecodePng { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_tile_aligned_dimensions() {
        let img = image::RgbaImage::new(10, 8);
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();

        let dir = std::env::temp_dir().join("gbatiles_io_png_test_not_aligned.png");
        std::fs::write(&dir, buf.into_inner()).unwrap();

        let result = load_tile_grid(&dir, |_, _| TileProvenance::Freestanding { index: 0 });
        assert!(matches!(result, Err(IoError::ImageNotTileAligned { .. })));

        let _ = std::fs::remove_file(&dir);
    }
}
