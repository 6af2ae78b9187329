use crate::canvas::{Argb, unpack_argb};
use egui::{Color32, Sense, Stroke, Vec2};

// ============================================================================
// Palette: preset colors handed to the controller at construction
// ============================================================================

/// Preset colors, bound in order to keys `1`–`9`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Argb>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                0xFF00_0000, // black
                0xFFFF_FFFF, // white
                0xFFFF_0000, // red
                0xFF00_FF00, // green
                0xFF00_00FF, // blue
            ],
        }
    }
}

impl Palette {
    /// An empty list falls back to the default presets.
    pub fn new(colors: Vec<Argb>) -> Self {
        if colors.is_empty() {
            Self::default()
        } else {
            Self { colors }
        }
    }

    pub fn get(&self, index: usize) -> Option<Argb> {
        self.colors.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn as_slice(&self) -> &[Argb] {
        &self.colors
    }
}

pub fn to_color32(c: Argb) -> Color32 {
    let [r, g, b, a] = unpack_argb(c);
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

pub fn from_color32(c: Color32) -> Argb {
    let [r, g, b, a] = c.to_srgba_unmultiplied();
    crate::canvas::pack_argb(r, g, b, a)
}

// ============================================================================
// Swatch row + custom color button
// ============================================================================

/// Draw the palette as a row of swatches followed by a free color picker.
/// Returns the newly chosen color, if any.
pub fn palette_ui(ui: &mut egui::Ui, palette: &Palette, current: Argb) -> Option<Argb> {
    let mut chosen = None;
    let swatch = Vec2::splat(20.0);

    ui.horizontal(|ui| {
        for (i, &c) in palette.as_slice().iter().enumerate() {
            let (rect, response) = ui.allocate_exact_size(swatch, Sense::click());
            let selected = c == current;
            let stroke = if selected {
                Stroke::new(2.0, ui.visuals().selection.stroke.color)
            } else {
                Stroke::new(1.0, Color32::GRAY)
            };
            ui.painter().rect(rect, 3.0, to_color32(c), stroke);
            if response.on_hover_text(format!("Preset {} ({})", i + 1, crate::canvas::format_hex_argb(c))).clicked() {
                chosen = Some(c);
            }
        }

        ui.separator();
        let mut custom = to_color32(current);
        if ui.color_edit_button_srgba(&mut custom).changed() {
            chosen = Some(from_color32(custom));
        }
    });

    chosen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_palette_falls_back_to_defaults() {
        assert_eq!(Palette::new(Vec::new()), Palette::default());
        assert_eq!(Palette::default().len(), 5);
    }

    #[test]
    fn color32_conversion_keeps_opaque_colors() {
        for c in Palette::default().as_slice() {
            assert_eq!(from_color32(to_color32(*c)), *c);
        }
    }
}
