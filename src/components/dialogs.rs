use std::path::PathBuf;

use crate::components::tools::TextRequest;
use crate::io::SaveFormat;
use crate::ops::text::FontEntry;
use crate::settings::parse_dimension;

/// Shared window chrome: centered, fixed size, no collapse arrow.
fn dialog_window(title: &str) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

/// Enter confirms, Escape cancels.
fn consume_confirm_cancel(ctx: &egui::Context) -> (bool, bool) {
    let enter = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter));
    let esc = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape));
    (enter, esc)
}

// ============================================================================
// TEXT ENTRY
// ============================================================================

/// What the user asked to stamp once the text dialog closes.
#[derive(Clone, Debug, PartialEq)]
pub struct TextSubmission {
    pub request: TextRequest,
    pub text: String,
    pub font_path: PathBuf,
    pub size: f32,
}

pub struct TextDialog {
    request: Option<TextRequest>,
    text: String,
    font_index: usize,
    size: f32,
}

impl TextDialog {
    pub fn new(size: f32) -> Self {
        Self { request: None, text: String::new(), font_index: 0, size }
    }

    pub fn is_open(&self) -> bool {
        self.request.is_some()
    }

    /// Open for a click position handed out by the text tool. Text, font and
    /// size from the previous use are kept.
    pub fn open(&mut self, request: TextRequest) {
        self.request = Some(request);
    }

    pub fn show(&mut self, ctx: &egui::Context, fonts: &[FontEntry]) -> Option<TextSubmission> {
        let request = self.request?;
        let (mut submit, cancel) = consume_confirm_cancel(ctx);
        let mut close = cancel;

        dialog_window("Add Text").show(ctx, |ui| {
            ui.label(format!("At ({}, {})", request.x, request.y));
            ui.add(egui::TextEdit::singleline(&mut self.text).hint_text("Text"));

            if fonts.is_empty() {
                ui.colored_label(ui.visuals().warn_fg_color, "No TrueType fonts found");
            } else {
                self.font_index = self.font_index.min(fonts.len() - 1);
                egui::ComboBox::from_label("Font")
                    .selected_text(fonts[self.font_index].name.as_str())
                    .width(240.0)
                    .show_ui(ui, |ui| {
                        for (i, f) in fonts.iter().enumerate() {
                            ui.selectable_value(&mut self.font_index, i, f.name.as_str());
                        }
                    });
            }
            ui.add(egui::Slider::new(&mut self.size, 4.0..=256.0).text("Size (px)"));

            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    close = true;
                }
                if ui.add_enabled(!fonts.is_empty(), egui::Button::new("Stamp")).clicked() {
                    submit = true;
                }
            });
        });

        let mut result = None;
        if submit && !close {
            if let Some(font) = fonts.get(self.font_index) {
                result = Some(TextSubmission {
                    request,
                    text: self.text.clone(),
                    font_path: font.path.clone(),
                    size: self.size,
                });
            }
            close = true;
        }
        if close {
            self.request = None;
        }
        result
    }
}

// ============================================================================
// CANVAS RESIZE
// ============================================================================

/// Width/height entry. Non-numeric input falls back to the default size.
pub struct ResizeDialog {
    pub open: bool,
    width: String,
    height: String,
}

impl ResizeDialog {
    pub fn new(width: u32, height: u32) -> Self {
        Self { open: false, width: width.to_string(), height: height.to_string() }
    }

    pub fn open_with(&mut self, width: u32, height: u32) {
        self.width = width.to_string();
        self.height = height.to_string();
        self.open = true;
    }

    /// Dimensions the fields currently describe, with the fallback applied.
    pub fn dimensions(&self, default: (u32, u32)) -> (u32, u32) {
        (parse_dimension(&self.width, default.0), parse_dimension(&self.height, default.1))
    }

    pub fn show(&mut self, ctx: &egui::Context, default: (u32, u32)) -> Option<(u32, u32)> {
        if !self.open {
            return None;
        }
        let (mut apply, mut close) = consume_confirm_cancel(ctx);

        dialog_window("New Canvas").show(ctx, |ui| {
            egui::Grid::new("resize_grid").num_columns(2).show(ui, |ui| {
                ui.label("Width");
                ui.text_edit_singleline(&mut self.width);
                ui.end_row();
                ui.label("Height");
                ui.text_edit_singleline(&mut self.height);
                ui.end_row();
            });
            ui.small("The current drawing is discarded.");
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    close = true;
                }
                if ui.button("Create").clicked() {
                    apply = true;
                }
            });
        });

        let result = if apply && !close { Some(self.dimensions(default)) } else { None };
        if apply || close {
            self.open = false;
        }
        result
    }
}

// ============================================================================
// EXPORT
// ============================================================================

pub struct ExportDialog {
    pub open: bool,
    pub format: SaveFormat,
    pub quality: u8,
}

impl ExportDialog {
    pub fn new(quality: u8) -> Self {
        Self { open: false, format: SaveFormat::Jpeg, quality: quality.clamp(1, 100) }
    }

    /// Returns the chosen format and quality when the user presses Export.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<(SaveFormat, u8)> {
        if !self.open {
            return None;
        }
        let (mut export, mut close) = consume_confirm_cancel(ctx);

        dialog_window("Export Image").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for fmt in SaveFormat::all() {
                    ui.selectable_value(&mut self.format, *fmt, fmt.label());
                }
            });
            ui.add_enabled(
                self.format.supports_quality(),
                egui::Slider::new(&mut self.quality, 1..=100).text("Quality"),
            );
            ui.small("Transparency is flattened; the exported image has no alpha channel.");
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    close = true;
                }
                if ui.button("Export…").clicked() {
                    export = true;
                }
            });
        });

        let result = if export && !close { Some((self.format, self.quality)) } else { None };
        if export || close {
            self.open = false;
        }
        result
    }
}
