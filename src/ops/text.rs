use ab_glyph::{point, Font, FontArc, ScaleFont};
use std::path::{Path, PathBuf};

use crate::canvas::{Argb, PixelBuffer};

/// Errors from loading a font file. Callers log these and skip the stamp.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("cannot read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a usable TrueType/OpenType font")]
    InvalidFont(PathBuf),
}

// ============================================================================
// GLYPH BITMAP + STAMPING
// ============================================================================

/// Single-channel ink coverage for a block of rendered text.
///
/// `left`/`top` shift the bitmap relative to the stamp position; they are
/// zero for bitmaps that already start at the text origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
    /// Row-major coverage, `width * height` bytes, 0 = no ink.
    pub ink: Vec<u8>,
}

impl GlyphBitmap {
    /// Bitmap anchored at the stamp position. `None` if `ink` is the wrong size.
    pub fn new(width: u32, height: u32, ink: Vec<u8>) -> Option<Self> {
        if ink.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, left: 0, top: 0, ink })
    }

    pub fn is_blank(&self) -> bool {
        self.ink.iter().all(|&v| v == 0)
    }
}

/// Paint every inked pixel of `bitmap` at `(x, y)` with the flat `color`.
///
/// Coverage is treated as a mask, not blended: any non-zero ink value becomes
/// `color` outright, so anti-aliased edges come out hard. Destinations off the
/// canvas are dropped. Returns the number of pixels written.
pub fn stamp_text(buf: &mut PixelBuffer, x: i32, y: i32, bitmap: &GlyphBitmap, color: Argb) -> usize {
    let mut written = 0;
    let w = bitmap.width as usize;
    if w == 0 {
        return 0;
    }
    for (j, row) in bitmap.ink.chunks_exact(w).enumerate() {
        let dy = y + bitmap.top + j as i32;
        for (i, &ink) in row.iter().enumerate() {
            if ink == 0 {
                continue;
            }
            let dx = x + bitmap.left + i as i32;
            if buf.in_bounds(dx, dy) {
                buf.set(dx, dy, color);
                written += 1;
            }
        }
    }
    written
}

// ============================================================================
// GLYPH RASTERIZATION (ab_glyph)
// ============================================================================

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<FontArc, TextError> {
    let bytes = std::fs::read(path).map_err(|source| TextError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    FontArc::try_from_vec(bytes).map_err(|_| TextError::InvalidFont(path.to_path_buf()))
}

/// Lay out `text` (multi-line via `'\n'`) at `px_size` and render its ink
/// coverage. The layout origin is the top-left of the first line.
///
/// Returns `None` when the text produces no ink at all (empty string, only
/// whitespace, or glyphs missing from the font).
pub fn rasterize_text(font: &FontArc, text: &str, px_size: f32) -> Option<GlyphBitmap> {
    let px_size = px_size.max(1.0);
    let scaled = font.as_scaled(px_size);
    let ascent = scaled.ascent();
    let line_height = scaled.height() + scaled.line_gap();

    let mut outlined = Vec::new();
    for (line_idx, line) in text.split('\n').enumerate() {
        let baseline = ascent + line_idx as f32 * line_height;
        let mut cursor_x = 0.0f32;
        let mut prev = None;
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = prev {
                cursor_x += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(px_size, point(cursor_x, baseline));
            if let Some(o) = font.outline_glyph(glyph) {
                outlined.push(o);
            }
            cursor_x += scaled.h_advance(id);
            prev = Some(id);
        }
    }
    if outlined.is_empty() {
        return None;
    }

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for o in &outlined {
        let b = o.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }
    let left = min_x.floor() as i32;
    let top = min_y.floor() as i32;
    let width = (max_x.ceil() as i32 - left).max(0) as u32;
    let height = (max_y.ceil() as i32 - top).max(0) as u32;
    if width == 0 || height == 0 {
        return None;
    }

    let mut ink = vec![0u8; width as usize * height as usize];
    for o in &outlined {
        let b = o.px_bounds();
        let gx = b.min.x as i32 - left;
        let gy = b.min.y as i32 - top;
        o.draw(|px, py, cov| {
            let ix = gx + px as i32;
            let iy = gy + py as i32;
            if ix < 0 || iy < 0 || ix as u32 >= width || iy as u32 >= height {
                return;
            }
            let idx = iy as usize * width as usize + ix as usize;
            let v = (cov.clamp(0.0, 1.0) * 255.0).round() as u8;
            ink[idx] = ink[idx].max(v);
        });
    }

    let bitmap = GlyphBitmap { width, height, left, top, ink };
    if bitmap.is_blank() { None } else { Some(bitmap) }
}

// ============================================================================
// FONT ENUMERATION (font-kit)
// ============================================================================

/// A selectable font: what the picker shows and where the file lives.
/// Paths are not validated here; a bad one fails later in [`load_font`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Whether the file extension is one [`load_font`] understands.
pub fn is_supported_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf"))
        .unwrap_or(false)
}

/// "Family Style" label, e.g. `DejaVu Sans Bold Italic`.
pub fn font_display_name(family: &str, weight: f32, italic: bool) -> String {
    let weight_name = match weight as u16 {
        0..=149 => "Thin",
        150..=249 => "ExtraLight",
        250..=349 => "Light",
        350..=449 => "Regular",
        450..=549 => "Medium",
        550..=649 => "SemiBold",
        650..=749 => "Bold",
        750..=849 => "ExtraBold",
        _ => "Black",
    };
    let style = match (weight_name, italic) {
        ("Regular", true) => "Italic".to_string(),
        (w, true) => format!("{} Italic", w),
        (w, false) => w.to_string(),
    };
    format!("{} {}", family, style)
}

/// Sort ascending by display name (path breaks ties) and drop exact duplicates.
pub fn sort_fonts(fonts: &mut Vec<FontEntry>) {
    fonts.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    fonts.dedup();
}

/// List installed TrueType/OpenType fonts, sorted by display name.
/// Returns an empty list (and logs) when the system font source is unavailable.
pub fn enumerate_fonts() -> Vec<FontEntry> {
    use font_kit::handle::Handle;
    use font_kit::properties::Style;
    use font_kit::source::SystemSource;

    let handles = match SystemSource::new().all_fonts() {
        Ok(h) => h,
        Err(e) => {
            crate::log_warn!("Could not enumerate system fonts: {:?}", e);
            return Vec::new();
        }
    };

    let mut fonts = Vec::new();
    for handle in handles {
        let path = match &handle {
            Handle::Path { path, .. } => path.clone(),
            Handle::Memory { .. } => continue,
        };
        if !is_supported_font_file(&path) {
            continue;
        }
        let Ok(font) = handle.load() else {
            continue;
        };
        let props = font.properties();
        let italic = matches!(props.style, Style::Italic | Style::Oblique);
        let name = font_display_name(&font.family_name(), props.weight.0, italic);
        fonts.push(FontEntry { name, path });
    }
    sort_fonts(&mut fonts);
    crate::log_info!("Found {} usable fonts", fonts.len());
    fonts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{OPAQUE_BLACK, OPAQUE_WHITE};

    #[test]
    fn stamps_only_inked_pixels_with_flat_color() {
        let mut buf = PixelBuffer::new(5, 5, OPAQUE_WHITE);
        let bitmap = GlyphBitmap::new(3, 2, vec![0, 1, 255, 128, 0, 0]).unwrap();
        let written = stamp_text(&mut buf, 1, 1, &bitmap, OPAQUE_BLACK);
        assert_eq!(written, 3);
        assert_eq!(buf.get(2, 1), OPAQUE_BLACK);
        assert_eq!(buf.get(3, 1), OPAQUE_BLACK);
        assert_eq!(buf.get(1, 2), OPAQUE_BLACK);
        assert_eq!(buf.get(1, 1), OPAQUE_WHITE);
        assert_eq!(buf.get(2, 2), OPAQUE_WHITE);
    }

    #[test]
    fn offscreen_ink_is_dropped() {
        let mut buf = PixelBuffer::new(2, 2, OPAQUE_WHITE);
        let bitmap = GlyphBitmap::new(3, 3, vec![255; 9]).unwrap();
        assert_eq!(stamp_text(&mut buf, 1, -1, &bitmap, OPAQUE_BLACK), 2);
        assert_eq!(buf.get(1, 0), OPAQUE_BLACK);
        assert_eq!(buf.get(1, 1), OPAQUE_BLACK);
        assert_eq!(buf.get(0, 0), OPAQUE_WHITE);
    }

    #[test]
    fn bitmap_offsets_shift_the_stamp() {
        let mut buf = PixelBuffer::new(6, 6, OPAQUE_WHITE);
        let mut bitmap = GlyphBitmap::new(1, 1, vec![9]).unwrap();
        bitmap.left = 2;
        bitmap.top = -1;
        stamp_text(&mut buf, 1, 3, &bitmap, OPAQUE_BLACK);
        assert_eq!(buf.get(3, 2), OPAQUE_BLACK);
    }

    #[test]
    fn mismatched_ink_length_is_rejected() {
        assert!(GlyphBitmap::new(2, 2, vec![0; 3]).is_none());
    }

    #[test]
    fn missing_and_garbage_fonts_fail_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.ttf");
        assert!(matches!(load_font(&missing), Err(TextError::Read { .. })));

        let garbage = dir.path().join("garbage.ttf");
        std::fs::write(&garbage, b"definitely not a font").unwrap();
        assert!(matches!(load_font(&garbage), Err(TextError::InvalidFont(_))));
    }

    #[test]
    fn display_names() {
        assert_eq!(font_display_name("DejaVu Sans", 400.0, false), "DejaVu Sans Regular");
        assert_eq!(font_display_name("DejaVu Sans", 700.0, true), "DejaVu Sans Bold Italic");
        assert_eq!(font_display_name("Noto", 400.0, true), "Noto Italic");
    }

    #[test]
    fn fonts_sort_by_name_and_dedup() {
        let entry = |n: &str, p: &str| FontEntry { name: n.into(), path: p.into() };
        let mut fonts = vec![
            entry("Zeta Regular", "/z.ttf"),
            entry("Alpha Bold", "/a-b.ttf"),
            entry("Alpha Bold", "/a-b.ttf"),
            entry("Alpha Regular", "/a.ttf"),
        ];
        sort_fonts(&mut fonts);
        let names: Vec<_> = fonts.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Alpha Bold", "Alpha Regular", "Zeta Regular"]);
    }

    #[test]
    fn font_extension_filter() {
        assert!(is_supported_font_file(Path::new("/usr/share/fonts/a.TTF")));
        assert!(is_supported_font_file(Path::new("b.otf")));
        assert!(!is_supported_font_file(Path::new("c.pcf.gz")));
        assert!(!is_supported_font_file(Path::new("noext")));
    }

    /// egui ships a few fonts in its default definitions; borrow one so the
    /// rasterizer can be exercised without touching the system font store.
    fn bundled_font() -> FontArc {
        let defs = egui::FontDefinitions::default();
        let data = defs
            .font_data
            .get("Hack")
            .or_else(|| defs.font_data.values().next())
            .expect("egui bundles default fonts");
        FontArc::try_from_vec(data.font.to_vec()).unwrap()
    }

    #[test]
    fn blank_text_rasterizes_to_nothing() {
        let font = bundled_font();
        assert!(rasterize_text(&font, "", 24.0).is_none());
        assert!(rasterize_text(&font, "   ", 24.0).is_none());
        assert!(rasterize_text(&font, "\n \n", 24.0).is_none());
    }

    #[test]
    fn rendered_text_has_ink_and_grows_with_lines() {
        let font = bundled_font();
        let one = rasterize_text(&font, "Hi", 32.0).unwrap();
        assert!(one.width > 0 && one.height > 0);
        assert!(!one.is_blank());
        assert_eq!(one.ink.len(), one.width as usize * one.height as usize);

        let two = rasterize_text(&font, "Hi\nHi", 32.0).unwrap();
        assert!(two.height > one.height);

        let mut buf = PixelBuffer::new(200, 120, OPAQUE_WHITE);
        assert!(stamp_text(&mut buf, 10, 10, &two, OPAQUE_BLACK) > 0);
    }
}
