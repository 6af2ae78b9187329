use crate::canvas::{Argb, Canvas, OPAQUE_BLACK, OPAQUE_WHITE, PixelBuffer, Target, argb_from_rgba};
use crate::components::colors::Palette;
use crate::ops::fill::flood_fill;
use crate::ops::line::draw_line;
use crate::ops::shapes::{RectRequest, ShapeFillMode, ShapeRequest, draw_shape};
use crate::ops::text::{GlyphBitmap, stamp_text};
use crate::{log_info, log_warn};

/// Upper bound for the brush radius unless settings say otherwise.
pub const DEFAULT_MAX_BRUSH: i32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Brush,
    Bucket,
    Line,
    Text,
    RectOutline,
    RectFill,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Bucket => "Bucket",
            Tool::Line => "Line",
            Tool::Text => "Text",
            Tool::RectOutline => "Rectangle",
            Tool::RectFill => "Filled Rectangle",
        }
    }

    pub fn all() -> &'static [Tool] {
        &[
            Tool::Brush,
            Tool::Bucket,
            Tool::Line,
            Tool::Text,
            Tool::RectOutline,
            Tool::RectFill,
        ]
    }

    /// Tools that rubber-band through the preview overlay while dragging.
    pub fn is_shape(&self) -> bool {
        matches!(self, Tool::Line | Tool::RectOutline | Tool::RectFill)
    }

    /// Tools whose pointer-down starts a drag gesture.
    pub fn drags(&self) -> bool {
        matches!(self, Tool::Brush) || self.is_shape()
    }

    fn shape(&self, anchor: (i32, i32), end: (i32, i32)) -> Option<ShapeRequest> {
        let rect = RectRequest::new(anchor.0, anchor.1, end.0, end.1);
        match self {
            Tool::Line => Some(ShapeRequest::Line { from: anchor, to: end }),
            Tool::RectOutline => Some(ShapeRequest::Rect { rect, mode: ShapeFillMode::Outline }),
            Tool::RectFill => Some(ShapeRequest::Rect { rect, mode: ShapeFillMode::Filled }),
            Tool::Brush | Tool::Bucket | Tool::Text => None,
        }
    }
}

/// Drag phase of the controller. Tool choice is orthogonal to this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Where the gesture started. Shape tools measure from here.
        anchor: (i32, i32),
        /// Most recent in-canvas pointer sample. The brush strokes from here.
        last: (i32, i32),
    },
}

/// Everything the tool palette and the input handler agree on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanvasState {
    pub tool: Tool,
    pub color: Argb,
    pub brush_radius: i32,
    pub drag: DragState,
}

impl CanvasState {
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn anchor(&self) -> Option<(i32, i32)> {
        match self.drag {
            DragState::Dragging { anchor, .. } => Some(anchor),
            DragState::Idle => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Keys the canvas reacts to; everything else is filtered out by the front-end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// `1`–`9`: pick a palette preset.
    Digit(u8),
    /// `=` / `+`: grow the brush.
    Plus,
    /// `-`: shrink the brush.
    Minus,
    /// Abandon an in-progress shape.
    Escape,
}

/// One discrete input event in canvas pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasEvent {
    PointerDown { x: i32, y: i32, button: PointerButton },
    PointerMove { x: i32, y: i32 },
    PointerUp { x: i32, y: i32, button: PointerButton },
    KeyDown(Key),
}

/// The text tool was clicked here; the front-end should collect text, font
/// and size, then hand a rendered bitmap back to [`CanvasController::stamp_text`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextRequest {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub redraw: bool,
    pub text_request: Option<TextRequest>,
}

impl EventResponse {
    fn redraw() -> Self {
        Self { redraw: true, text_request: None }
    }
}

// ============================================================================
// CANVAS CONTROLLER
// ============================================================================

/// Owns the canvas buffers and the tool state, and turns input events into
/// drawing operations.
///
/// Single-threaded: every operation runs to completion inside the call that
/// triggered it. A full-canvas bucket fill is the worst case at
/// `O(width · height)`.
pub struct CanvasController {
    canvas: Canvas,
    state: CanvasState,
    palette: Palette,
    max_brush: i32,
}

impl CanvasController {
    pub fn new(width: u32, height: u32, palette: Palette, max_brush: i32) -> Self {
        Self::with_canvas(Canvas::new(width, height), palette, max_brush)
    }

    pub fn with_canvas(canvas: Canvas, palette: Palette, max_brush: i32) -> Self {
        let color = palette.get(0).unwrap_or(OPAQUE_BLACK);
        Self {
            canvas,
            state: CanvasState {
                tool: Tool::default(),
                color,
                brush_radius: 1,
                drag: DragState::Idle,
            },
            palette,
            max_brush: max_brush.max(1),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn max_brush(&self) -> i32 {
        self.max_brush
    }

    // ---- tool palette -------------------------------------------------------

    /// Switch tools. A gesture in progress is abandoned, not committed.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool == self.state.tool {
            return;
        }
        self.cancel_drag();
        self.state.tool = tool;
        log_info!("Tool: {}", tool.label());
    }

    pub fn set_color(&mut self, color: Argb) {
        self.state.color = color;
    }

    /// Select palette entry `index`. Returns false if there is no such preset.
    pub fn select_preset(&mut self, index: usize) -> bool {
        match self.palette.get(index) {
            Some(c) => {
                self.state.color = c;
                true
            }
            None => false,
        }
    }

    /// Set the brush radius, clamped to `[1, max_brush]`.
    pub fn set_brush_radius(&mut self, radius: i32) {
        self.state.brush_radius = radius.clamp(1, self.max_brush);
    }

    // ---- canvas lifecycle ---------------------------------------------------

    /// Reallocate both buffers at a new size (opaque white).
    ///
    /// Any drag in progress is dropped first so its anchor can never be
    /// replayed against the new buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.state.drag = DragState::Idle;
        self.canvas.reinit(width, height, OPAQUE_WHITE);
        log_info!("Canvas resized to {}×{}", self.canvas.width(), self.canvas.height());
    }

    /// Replace the canvas with an imported RGBA image.
    ///
    /// Returns false, leaving the canvas untouched, when `rgba` does not hold
    /// exactly `width * height` pixels.
    pub fn load_rgba(&mut self, width: u32, height: u32, rgba: &[u8]) -> bool {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            log_warn!(
                "Ignoring image import: {}×{} needs {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            );
            return false;
        }
        let Some(base) = PixelBuffer::from_pixels(width, height, argb_from_rgba(rgba)) else {
            return false;
        };
        self.state.drag = DragState::Idle;
        self.canvas.replace_base(base);
        log_info!("Imported {}×{} image", width, height);
        true
    }

    /// Stamp rendered text at a position the text tool handed out earlier.
    pub fn stamp_text(&mut self, request: TextRequest, bitmap: &GlyphBitmap) -> bool {
        let color = self.state.color;
        stamp_text(self.canvas.buffer_mut(Target::Base), request.x, request.y, bitmap, color) > 0
    }

    /// Abandon the current gesture without committing anything.
    pub fn cancel_drag(&mut self) -> bool {
        if !self.state.is_dragging() {
            return false;
        }
        self.state.drag = DragState::Idle;
        self.canvas.clear_overlay();
        true
    }

    // ---- input --------------------------------------------------------------

    pub fn handle_event(&mut self, event: CanvasEvent) -> EventResponse {
        match event {
            CanvasEvent::PointerDown { x, y, button: PointerButton::Primary } => self.pointer_down(x, y),
            CanvasEvent::PointerMove { x, y } => self.pointer_move(x, y),
            CanvasEvent::PointerUp { x, y, button: PointerButton::Primary } => self.pointer_up(x, y),
            CanvasEvent::PointerDown { .. } | CanvasEvent::PointerUp { .. } => EventResponse::default(),
            CanvasEvent::KeyDown(key) => self.key_down(key),
        }
    }

    fn pointer_down(&mut self, x: i32, y: i32) -> EventResponse {
        if !self.canvas.contains(x, y) {
            return EventResponse::default();
        }
        // A press without a matching release (focus loss, etc.) still commits.
        let mut response = match self.state.drag {
            DragState::Dragging { last, .. } => self.pointer_up(last.0, last.1),
            DragState::Idle => EventResponse::default(),
        };

        let color = self.state.color;
        let radius = self.state.brush_radius;
        match self.state.tool {
            Tool::Bucket => {
                let changed = flood_fill(self.canvas.buffer_mut(Target::Base), x, y, color);
                response.redraw |= changed > 0;
            }
            Tool::Text => {
                response.text_request = Some(TextRequest { x, y });
            }
            Tool::Brush => {
                self.state.drag = DragState::Dragging { anchor: (x, y), last: (x, y) };
                draw_line(self.canvas.buffer_mut(Target::Base), x, y, x, y, radius, color);
                response.redraw = true;
            }
            Tool::Line | Tool::RectOutline | Tool::RectFill => {
                self.state.drag = DragState::Dragging { anchor: (x, y), last: (x, y) };
                self.redraw_preview((x, y), (x, y));
                response.redraw = true;
            }
        }
        response
    }

    fn pointer_move(&mut self, x: i32, y: i32) -> EventResponse {
        let DragState::Dragging { anchor, last } = self.state.drag else {
            return EventResponse::default();
        };
        if !self.canvas.contains(x, y) || (x, y) == last {
            return EventResponse::default();
        }

        if self.state.tool == Tool::Brush {
            let (color, radius) = (self.state.color, self.state.brush_radius);
            draw_line(self.canvas.buffer_mut(Target::Base), last.0, last.1, x, y, radius, color);
        } else {
            self.redraw_preview(anchor, (x, y));
        }
        self.state.drag = DragState::Dragging { anchor, last: (x, y) };
        EventResponse::redraw()
    }

    fn pointer_up(&mut self, x: i32, y: i32) -> EventResponse {
        let DragState::Dragging { anchor, last } = self.state.drag else {
            return EventResponse::default();
        };
        self.state.drag = DragState::Idle;
        let (color, radius) = (self.state.color, self.state.brush_radius);

        if self.state.tool == Tool::Brush {
            if self.canvas.contains(x, y) && (x, y) != last {
                draw_line(self.canvas.buffer_mut(Target::Base), last.0, last.1, x, y, radius, color);
            }
        } else {
            let end = self.clamp_to_canvas(x, y);
            if let Some(shape) = self.state.tool.shape(anchor, end) {
                draw_shape(self.canvas.buffer_mut(Target::Base), &shape, radius, color);
            }
        }
        self.canvas.clear_overlay();
        EventResponse::redraw()
    }

    fn key_down(&mut self, key: Key) -> EventResponse {
        let changed = match key {
            Key::Digit(d @ 1..=9) => self.select_preset(d as usize - 1),
            Key::Digit(_) => false,
            Key::Plus => {
                let before = self.state.brush_radius;
                self.set_brush_radius(before + 1);
                before != self.state.brush_radius
            }
            Key::Minus => {
                let before = self.state.brush_radius;
                self.set_brush_radius(before - 1);
                before != self.state.brush_radius
            }
            Key::Escape => self.cancel_drag(),
        };
        EventResponse { redraw: changed, text_request: None }
    }

    fn redraw_preview(&mut self, anchor: (i32, i32), end: (i32, i32)) {
        self.canvas.clear_overlay();
        if let Some(shape) = self.state.tool.shape(anchor, end) {
            let (color, radius) = (self.state.color, self.state.brush_radius);
            draw_shape(self.canvas.buffer_mut(Target::Overlay), &shape, radius, color);
        }
    }

    fn clamp_to_canvas(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x.clamp(0, self.canvas.width() as i32 - 1),
            y.clamp(0, self.canvas.height() as i32 - 1),
        )
    }
}
