//! JASC-PAL palette emission (SPEC_FULL.md §4.12, Open Question resolution in DESIGN.md).

use std::path::Path;

use gbatiles_core::color::{bgr_to_rgba, Color15, RgbaPixel};
use gbatiles_core::finalized_palette::FinalizedPalette;

use crate::error::{IoError, IoResult};

/// The line ending the original tool actually emits: CRLF everywhere except when itself compiled
/// for Windows, where it emits plain LF. This is backwards from what most authors would guess, and
/// is preserved here rather than "fixed" (SPEC_FULL.md §9).
fn line_ending() -> &'static str {
    if cfg!(windows) {
        "\n"
    } else {
        "\r\n"
    }
}

/// Writes a 16-color JASC-PAL file (`JASC-PAL`, `0100`, `16`, then one `r g b` line per color).
pub fn write_jasc_pal(path: &Path, colors: &[Color15; 16]) -> IoResult<()> {
    let nl = line_ending();
    let mut out = String::new();
    out.push_str("JASC-PAL");
    out.push_str(nl);
    out.push_str("0100");
    out.push_str(nl);
    out.push_str("16");
    out.push_str(nl);

    for &color in colors {
        let rgba = bgr_to_rgba(color);
        out.push_str(&format!("{} {} {}", rgba.r, rgba.g, rgba.b));
        out.push_str(nl);
    }

    std::fs::write(path, out).map_err(|source| IoError::Write { path: path.to_path_buf(), source })
}

/// Reads a 16-color JASC-PAL file back into hardware colors, the inverse of [`write_jasc_pal`].
/// Tolerant of either line ending; only the three `r g b` columns of each color line matter.
pub fn read_jasc_pal(path: &Path) -> IoResult<[Color15; 16]> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read { path: path.to_path_buf(), source })?;
    let mut colors = [RgbaPixel::new(0, 0, 0, 255).to_bgr15(); 16];

    for (i, line) in text.lines().skip(3).take(16).enumerate() {
        let mut parts = line.split_whitespace();
        let (Some(r), Some(g), Some(b)) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        let (Ok(r), Ok(g), Ok(b)) = (r.parse::<u8>(), g.parse::<u8>(), b.parse::<u8>()) else {
            continue;
        };
        colors[i] = RgbaPixel::new(r, g, b, 255).to_bgr15();
    }

    Ok(colors)
}

/// Reads `0.pal`, `1.pal`, ... out of `dir` in order, stopping at the first index that doesn't
/// exist. Used by the decompiler to recover a compiled tileset's hardware palettes without
/// needing its in-memory `ColorIndex`.
pub fn read_palette_directory(dir: &Path) -> IoResult<Vec<FinalizedPalette>> {
    let mut palettes = Vec::new();
    let mut i = 0;
    loop {
        let path = dir.join(format!("{i}.pal"));
        if !path.exists() {
            break;
        }
        palettes.push(FinalizedPalette::from_colors(read_jasc_pal(&path)?));
        i += 1;
    }
    Ok(palettes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbatiles_core::color::RgbaPixel;

    #[test]
    fn writes_sixteen_color_lines() {
        let colors = [RgbaPixel::new(8, 8, 8, 255).to_bgr15(); 16];
        let path = std::env::temp_dir().join("gbatiles_io_test_palette.pal");
        write_jasc_pal(&path, &colors).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("JASC-PAL"));
        assert_eq!(contents.lines().count(), 19);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn round_trips_through_write_and_read() {
        let mut colors = [RgbaPixel::new(0, 0, 0, 255).to_bgr15(); 16];
        colors[1] = RgbaPixel::new(248, 0, 0, 255).to_bgr15();
        colors[2] = RgbaPixel::new(0, 248, 0, 255).to_bgr15();

        let path = std::env::temp_dir().join("gbatiles_io_test_palette_roundtrip.pal");
        write_jasc_pal(&path, &colors).unwrap();

        let read_back = read_jasc_pal(&path).unwrap();
        assert_eq!(read_back, colors);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn reads_sequential_palette_files_until_a_gap() {
        let dir = std::env::temp_dir().join("gbatiles_io_test_palette_dir");
        std::fs::create_dir_all(&dir).unwrap();

        write_jasc_pal(&dir.join("0.pal"), &[RgbaPixel::new(0, 0, 0, 255).to_bgr15(); 16]).unwrap();
        write_jasc_pal(&dir.join("1.pal"), &[RgbaPixel::new(8, 8, 8, 255).to_bgr15(); 16]).unwrap();

        let palettes = read_palette_directory(&dir).unwrap();
        assert_eq!(palettes.len(), 2);

        let _ = std::fs::remove_file(dir.join("0.pal"));
        let _ = std::fs::remove_file(dir.join("1.pal"));
        let _ = std::fs::remove_dir(&dir);
    }
}
