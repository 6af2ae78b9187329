use std::path::PathBuf;

use crate::canvas::{Argb, format_hex_argb, parse_hex_argb};
use crate::components::colors::Palette;
use crate::components::tools::DEFAULT_MAX_BRUSH;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Settings that persist across sessions.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Canvas size used at startup and as the fallback for bad size input.
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Largest brush radius the +/- keys and the slider allow.
    pub max_brush: i32,
    /// Brush radius at startup.
    pub brush_radius: i32,
    /// Default JPEG quality for exports (1–100).
    pub jpeg_quality: u8,
    /// Default text size in pixels.
    pub font_size: f32,
    pub palette: Palette,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_WIDTH,
            canvas_height: DEFAULT_HEIGHT,
            max_brush: DEFAULT_MAX_BRUSH,
            brush_radius: 1,
            jpeg_quality: 90,
            font_size: 24.0,
            palette: Palette::default(),
        }
    }
}

impl Settings {
    /// Where the settings file lives.
    /// On Linux:   ~/.config/sdraw/sdraw_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\sdraw\sdraw_settings.cfg
    /// On macOS:   ~/Library/Application Support/sdraw/sdraw_settings.cfg
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        let dir = std::env::var("APPDATA").ok().map(|d| PathBuf::from(d).join("sdraw"));
        #[cfg(target_os = "macos")]
        let dir = std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("sdraw"));
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .ok()
            .map(|d| d.join("sdraw"));

        dir.map(|d| d.join("sdraw_settings.cfg"))
    }

    /// Load from the default location; missing or unreadable files give defaults.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::settings_path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &std::path::Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(path, self.to_config_string()) {
            crate::log_warn!("Could not save settings to {}: {}", path.display(), e);
        }
    }

    /// Take over the brush radius and export quality the user settled on.
    /// Returns true when either differs from what is stored, i.e. when the
    /// file needs saving.
    pub fn remember(&mut self, brush_radius: i32, jpeg_quality: u8) -> bool {
        let brush_radius = brush_radius.clamp(1, self.max_brush);
        let jpeg_quality = jpeg_quality.clamp(1, 100);
        if brush_radius == self.brush_radius && jpeg_quality == self.jpeg_quality {
            return false;
        }
        self.brush_radius = brush_radius;
        self.jpeg_quality = jpeg_quality;
        true
    }

    /// Parse `key=value` lines. Unknown keys and bad values keep the default.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "canvas_width" => {
                    if let Some(v) = val.parse().ok().filter(|&v: &u32| v > 0) {
                        s.canvas_width = v;
                    }
                }
                "canvas_height" => {
                    if let Some(v) = val.parse().ok().filter(|&v: &u32| v > 0) {
                        s.canvas_height = v;
                    }
                }
                "max_brush" => {
                    if let Some(v) = val.parse().ok().filter(|&v: &i32| v >= 1) {
                        s.max_brush = v;
                    }
                }
                "brush_radius" => {
                    if let Some(v) = val.parse().ok().filter(|&v: &i32| v >= 1) {
                        s.brush_radius = v;
                    }
                }
                "jpeg_quality" => {
                    if let Ok(v) = val.parse::<u8>() {
                        s.jpeg_quality = v.clamp(1, 100);
                    }
                }
                "font_size" => {
                    if let Some(v) = val.parse().ok().filter(|v: &f32| v.is_finite() && *v >= 1.0) {
                        s.font_size = v;
                    }
                }
                "palette" => {
                    let colors: Vec<Argb> = val.split(',').filter_map(parse_hex_argb).collect();
                    s.palette = Palette::new(colors);
                }
                _ => {}
            }
        }
        s.brush_radius = s.brush_radius.min(s.max_brush);
        s
    }

    pub fn to_config_string(&self) -> String {
        let palette = self
            .palette
            .as_slice()
            .iter()
            .map(|&c| format_hex_argb(c))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "canvas_width={}\n\
             canvas_height={}\n\
             max_brush={}\n\
             brush_radius={}\n\
             jpeg_quality={}\n\
             font_size={}\n\
             palette={}\n",
            self.canvas_width,
            self.canvas_height,
            self.max_brush,
            self.brush_radius,
            self.jpeg_quality,
            self.font_size,
            palette,
        )
    }
}

/// Parse a single canvas dimension, falling back to `default` on anything
/// that is not a positive integer.
pub fn parse_dimension(input: &str, default: u32) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(v) if v > 0 => v,
        _ => {
            crate::log_warn!("Invalid canvas dimension {:?}, using {}", input, default);
            default
        }
    }
}

/// Parse `WIDTHxHEIGHT` (e.g. `1024x768`). Anything malformed yields `default`.
pub fn parse_canvas_size(input: &str, default: (u32, u32)) -> (u32, u32) {
    let parsed = input
        .trim()
        .split_once(['x', 'X'])
        .and_then(|(w, h)| Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?)))
        .filter(|&(w, h)| w > 0 && h > 0);
    match parsed {
        Some(size) => size,
        None => {
            crate::log_warn!("Invalid canvas size {:?}, using {}x{}", input, default.0, default.1);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_known_keys_and_ignores_noise() {
        let s = Settings::parse(
            "# comment\n\
             canvas_width=1024\n\
             canvas_height=abc\n\
             jpeg_quality=250\n\
             palette=#FF112233, #FF445566,bogus\n\
             mystery=1\n\
             no equals sign\n",
        );
        assert_eq!(s.canvas_width, 1024);
        assert_eq!(s.canvas_height, DEFAULT_HEIGHT);
        assert_eq!(s.jpeg_quality, 100);
        assert_eq!(s.palette.as_slice(), &[0xFF11_2233, 0xFF44_5566]);
    }

    #[test]
    fn config_string_parses_back() {
        let mut s = Settings::default();
        s.canvas_width = 320;
        s.max_brush = 8;
        s.brush_radius = 3;
        s.palette = Palette::new(vec![0xFF01_0203]);
        assert_eq!(Settings::parse(&s.to_config_string()), s);
    }

    #[test]
    fn brush_radius_never_exceeds_max() {
        let s = Settings::parse("max_brush=4\nbrush_radius=9\n");
        assert_eq!(s.brush_radius, 4);
    }

    #[test]
    fn save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sdraw_settings.cfg");
        let mut s = Settings::default();
        s.font_size = 40.0;
        s.save_to(&path);
        assert_eq!(Settings::load_from(&path), s);
        assert_eq!(Settings::load_from(&dir.path().join("missing.cfg")), Settings::default());
    }

    #[test]
    fn canvas_size_parsing_falls_back() {
        assert_eq!(parse_canvas_size("1024x768", (800, 600)), (1024, 768));
        assert_eq!(parse_canvas_size(" 10X20 ", (800, 600)), (10, 20));
        assert_eq!(parse_canvas_size("banana", (800, 600)), (800, 600));
        assert_eq!(parse_canvas_size("0x10", (800, 600)), (800, 600));
        assert_eq!(parse_canvas_size("10x", (800, 600)), (800, 600));
        assert_eq!(parse_dimension("42", 7), 42);
        assert_eq!(parse_dimension("-3", 7), 7);
        assert_eq!(parse_dimension("", 7), 7);
    }

    #[test]
    fn remembered_values_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sdraw_settings.cfg");
        let mut s = Settings::default();
        assert!(!s.remember(s.brush_radius, s.jpeg_quality));

        assert!(s.remember(7, 0));
        assert_eq!((s.brush_radius, s.jpeg_quality), (7, 1));
        s.save_to(&path);

        let loaded = Settings::load_from(&path);
        assert_eq!((loaded.brush_radius, loaded.jpeg_quality), (7, 1));
        assert!(!s.remember(7, 1));
    }
}
