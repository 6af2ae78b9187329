use egui::{Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions, Vec2};
use std::path::{Path, PathBuf};

use crate::canvas::{Argb, unpack_argb};
use crate::components::colors::palette_ui;
use crate::components::dialogs::{ExportDialog, ResizeDialog, TextDialog, TextSubmission};
use crate::components::tools::{CanvasController, CanvasEvent, Key, PointerButton, Tool};
use crate::io::{SaveFormat, export_image, load_image};
use crate::ops::text::{FontEntry, enumerate_fonts, load_font, rasterize_text};
use crate::settings::Settings;
use crate::{log_err, log_info, log_warn};

/// Keys forwarded to the canvas controller.
const KEY_MAP: &[(egui::Key, Key)] = &[
    (egui::Key::Num1, Key::Digit(1)),
    (egui::Key::Num2, Key::Digit(2)),
    (egui::Key::Num3, Key::Digit(3)),
    (egui::Key::Num4, Key::Digit(4)),
    (egui::Key::Num5, Key::Digit(5)),
    (egui::Key::Num6, Key::Digit(6)),
    (egui::Key::Num7, Key::Digit(7)),
    (egui::Key::Num8, Key::Digit(8)),
    (egui::Key::Num9, Key::Digit(9)),
    (egui::Key::PlusEquals, Key::Plus),
    (egui::Key::Minus, Key::Minus),
    (egui::Key::Escape, Key::Escape),
];

/// Window glue: feeds egui input to the controller and shows its pixels.
pub struct SdrawApp {
    controller: CanvasController,
    settings: Settings,
    texture: Option<TextureHandle>,
    composite: Vec<Argb>,
    dirty: bool,
    /// Enumerated lazily the first time the text tool is used.
    fonts: Option<Vec<FontEntry>>,
    text_dialog: TextDialog,
    resize_dialog: ResizeDialog,
    export_dialog: ExportDialog,
    last_pointer: Option<(i32, i32)>,
    status: String,
}

impl SdrawApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings, size: (u32, u32), open: Option<PathBuf>) -> Self {
        let mut controller = CanvasController::new(size.0, size.1, settings.palette.clone(), settings.max_brush);
        controller.set_brush_radius(settings.brush_radius);

        let mut app = Self {
            controller,
            texture: None,
            composite: Vec::new(),
            dirty: true,
            fonts: None,
            text_dialog: TextDialog::new(settings.font_size),
            resize_dialog: ResizeDialog::new(size.0, size.1),
            export_dialog: ExportDialog::new(settings.jpeg_quality),
            last_pointer: None,
            status: String::new(),
            settings,
        };
        if let Some(path) = open {
            app.open_path(&path);
        }
        app
    }

    fn dialogs_open(&self) -> bool {
        self.text_dialog.is_open() || self.resize_dialog.open || self.export_dialog.open
    }

    // ---- file operations ----------------------------------------------------

    fn open_path(&mut self, path: &Path) {
        match load_image(path) {
            Ok(img) => {
                if self.controller.load_rgba(img.width, img.height, &img.rgba) {
                    self.status = format!("Opened {}", path.display());
                    self.dirty = true;
                }
            }
            Err(e) => {
                log_err!("Opening {} failed: {}", path.display(), e);
                self.status = format!("Could not open {}", path.display());
            }
        }
    }

    fn pick_and_open(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tga"])
            .pick_file();
        if let Some(path) = picked {
            self.open_path(&path);
        }
    }

    fn pick_and_export(&mut self, format: SaveFormat, quality: u8) {
        let picked = rfd::FileDialog::new()
            .add_filter(format.label(), &[format.extension()])
            .set_file_name(format!("untitled.{}", format.extension()))
            .save_file();
        let Some(path) = picked else { return };
        match export_image(self.controller.canvas().base(), &path, format, quality) {
            Ok(()) => {
                log_info!("Exported {} ({}, quality {})", path.display(), format.label(), quality);
                self.status = format!("Exported {}", path.display());
            }
            Err(e) => {
                log_err!("Export to {} failed: {}", path.display(), e);
                self.status = format!("Export failed: {}", e);
            }
        }
    }

    fn apply_text(&mut self, submission: TextSubmission) {
        let font = match load_font(&submission.font_path) {
            Ok(f) => f,
            Err(e) => {
                log_err!("{}", e);
                self.status = "Could not load that font".to_string();
                return;
            }
        };
        match rasterize_text(&font, &submission.text, submission.size) {
            Some(bitmap) => {
                self.dirty |= self.controller.stamp_text(submission.request, &bitmap);
            }
            None => log_warn!("Text {:?} produced no ink, nothing stamped", submission.text),
        }
    }

    /// Save brush radius and export quality whenever the user changes them.
    fn persist_settings(&mut self) {
        let radius = self.controller.state().brush_radius;
        if self.settings.remember(radius, self.export_dialog.quality) {
            self.settings.save();
            log_info!("Settings saved (brush {}, quality {})", radius, self.export_dialog.quality);
        }
    }

    // ---- input --------------------------------------------------------------

    fn forward_keys(&mut self, ctx: &egui::Context) {
        if self.dialogs_open() || ctx.wants_keyboard_input() {
            return;
        }
        for (egui_key, key) in KEY_MAP {
            if ctx.input(|i| i.key_pressed(*egui_key)) {
                self.dirty |= self.controller.handle_event(CanvasEvent::KeyDown(*key)).redraw;
            }
        }
    }

    /// Translate this frame's pointer state into canvas events.
    fn forward_pointer(&mut self, ctx: &egui::Context, canvas_rect: Rect, hovered: bool) {
        let (pressed, released, pos) =
            ctx.input(|i| (i.pointer.primary_pressed(), i.pointer.primary_released(), i.pointer.latest_pos()));
        let Some(pos) = pos else { return };
        let x = (pos.x - canvas_rect.min.x).floor() as i32;
        let y = (pos.y - canvas_rect.min.y).floor() as i32;

        let mut events = Vec::new();
        if pressed && hovered {
            events.push(CanvasEvent::PointerDown { x, y, button: PointerButton::Primary });
        } else if self.last_pointer != Some((x, y)) {
            events.push(CanvasEvent::PointerMove { x, y });
        }
        if released {
            events.push(CanvasEvent::PointerUp { x, y, button: PointerButton::Primary });
        }
        self.last_pointer = Some((x, y));

        for event in events {
            let response = self.controller.handle_event(event);
            self.dirty |= response.redraw;
            if let Some(request) = response.text_request {
                if self.fonts.is_none() {
                    self.fonts = Some(enumerate_fonts());
                }
                self.text_dialog.open(request);
            }
        }
    }

    // ---- drawing ------------------------------------------------------------

    fn upload_texture(&mut self, ctx: &egui::Context) {
        if !self.dirty && self.texture.is_some() {
            return;
        }
        let canvas = self.controller.canvas();
        canvas.composite_into(&mut self.composite);
        let image = ColorImage {
            size: [canvas.width() as usize, canvas.height() as usize],
            pixels: self
                .composite
                .iter()
                .map(|&p| {
                    let [r, g, b, a] = unpack_argb(p);
                    Color32::from_rgba_unmultiplied(r, g, b, a)
                })
                .collect(),
        };
        match &mut self.texture {
            Some(tex) => tex.set(image, TextureOptions::NEAREST),
            None => self.texture = Some(ctx.load_texture("sdraw_canvas", image, TextureOptions::NEAREST)),
        }
        self.dirty = false;
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("New…").clicked() {
                let c = self.controller.canvas();
                self.resize_dialog.open_with(c.width(), c.height());
            }
            if ui.button("Open…").clicked() {
                self.pick_and_open();
            }
            if ui.button("Export…").clicked() {
                self.export_dialog.open = true;
            }
            ui.separator();

            let mut tool = self.controller.state().tool;
            for t in Tool::all() {
                ui.selectable_value(&mut tool, *t, t.label());
            }
            self.controller.set_tool(tool);
        });

        ui.horizontal(|ui| {
            let current = self.controller.state().color;
            if let Some(c) = palette_ui(ui, self.controller.palette(), current) {
                self.controller.set_color(c);
            }
            ui.separator();
            let mut radius = self.controller.state().brush_radius;
            let max = self.controller.max_brush();
            if ui.add(egui::Slider::new(&mut radius, 1..=max).text("Brush")).changed() {
                self.controller.set_brush_radius(radius);
            }
        });
    }
}

impl eframe::App for SdrawApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let c = self.controller.canvas();
                let s = self.controller.state();
                ui.label(format!("{}×{}", c.width(), c.height()));
                ui.separator();
                ui.label(format!("{} · radius {}", s.tool.label(), s.brush_radius));
                ui.separator();
                ui.label(self.status.as_str());
            });
        });

        self.forward_keys(ctx);

        // Dialogs first so they swallow Enter/Escape before the canvas sees them.
        if let Some((w, h)) = self
            .resize_dialog
            .show(ctx, (self.settings.canvas_width, self.settings.canvas_height))
        {
            self.controller.resize(w, h);
            self.texture = None;
            self.dirty = true;
        }
        if let Some((format, quality)) = self.export_dialog.show(ctx) {
            self.pick_and_export(format, quality);
        }
        let fonts = self.fonts.as_deref().unwrap_or(&[]);
        if let Some(submission) = self.text_dialog.show(ctx, fonts) {
            self.apply_text(submission);
        }

        self.upload_texture(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                let c = self.controller.canvas();
                let size = Vec2::new(c.width() as f32, c.height() as f32);
                let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
                if let Some(tex) = &self.texture {
                    let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                    ui.painter().image(tex.id(), rect, uv, Color32::WHITE);
                }
                if !self.dialogs_open() {
                    self.forward_pointer(ui.ctx(), rect, response.hovered());
                }
            });
        });

        self.persist_settings();

        if self.dirty {
            ctx.request_repaint();
        }
    }
}
