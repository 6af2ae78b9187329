// ============================================================================
// SHAPES: rectangles and straight lines built on the line/fill primitives
// ============================================================================

use crate::canvas::{Argb, PixelBuffer};
use crate::ops::line::draw_line;

/// How a rectangle is painted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeFillMode {
    Outline,
    Filled,
}

/// Two opposite corners of a rectangle, in whatever order the drag produced
/// them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectRequest {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl RectRequest {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// `(min_x, min_y, max_x, max_y)`, inclusive on both ends.
    pub fn normalized(&self) -> (i32, i32, i32, i32) {
        (
            self.x1.min(self.x2),
            self.y1.min(self.y2),
            self.x1.max(self.x2),
            self.y1.max(self.y2),
        )
    }
}

/// A shape a drag gesture can produce. Built fresh per pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeRequest {
    Line { from: (i32, i32), to: (i32, i32) },
    Rect { rect: RectRequest, mode: ShapeFillMode },
}

/// Four strokes along the edges of the normalized rectangle.
pub fn rect_outline(buf: &mut PixelBuffer, rect: RectRequest, radius: i32, color: Argb) {
    let (x0, y0, x1, y1) = rect.normalized();
    draw_line(buf, x0, y0, x1, y0, radius, color);
    draw_line(buf, x1, y0, x1, y1, radius, color);
    draw_line(buf, x1, y1, x0, y1, radius, color);
    draw_line(buf, x0, y1, x0, y0, radius, color);
}

/// Set every cell of the normalized rectangle, clipped to the buffer. O(area).
pub fn rect_fill(buf: &mut PixelBuffer, rect: RectRequest, color: Argb) {
    let (x0, y0, x1, y1) = rect.normalized();
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(buf.width() as i32 - 1);
    let y1 = y1.min(buf.height() as i32 - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            buf.set(x, y, color);
        }
    }
}

/// Rasterize `shape` into `buf`. Previews and commits both go through here,
/// so the rubber band always matches what gets committed.
pub fn draw_shape(buf: &mut PixelBuffer, shape: &ShapeRequest, radius: i32, color: Argb) {
    match *shape {
        ShapeRequest::Line { from, to } => draw_line(buf, from.0, from.1, to.0, to.1, radius, color),
        ShapeRequest::Rect { rect, mode: ShapeFillMode::Outline } => {
            rect_outline(buf, rect, radius, color)
        }
        ShapeRequest::Rect { rect, mode: ShapeFillMode::Filled } => rect_fill(buf, rect, color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::OPAQUE_WHITE;

    const C: Argb = 0xFF00_00FF;

    #[test]
    fn corner_order_does_not_matter() {
        let corners = [(2, 3, 8, 7), (8, 7, 2, 3), (2, 7, 8, 3), (8, 3, 2, 7)];
        let mut outlines = Vec::new();
        let mut fills = Vec::new();
        for (x1, y1, x2, y2) in corners {
            let rect = RectRequest::new(x1, y1, x2, y2);
            let mut o = PixelBuffer::new(12, 12, OPAQUE_WHITE);
            let mut f = PixelBuffer::new(12, 12, OPAQUE_WHITE);
            rect_outline(&mut o, rect, 1, C);
            rect_fill(&mut f, rect, C);
            for (cx, cy) in [(2, 3), (8, 3), (2, 7), (8, 7)] {
                assert_eq!(o.get(cx, cy), C);
                assert_eq!(f.get(cx, cy), C);
            }
            outlines.push(o);
            fills.push(f);
        }
        assert!(outlines.windows(2).all(|w| w[0] == w[1]));
        assert!(fills.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn fill_covers_exactly_the_inclusive_area() {
        let mut buf = PixelBuffer::new(10, 10, OPAQUE_WHITE);
        rect_fill(&mut buf, RectRequest::new(6, 5, 2, 1), C);
        let painted = buf.as_slice().iter().filter(|&&p| p == C).count();
        assert_eq!(painted, 5 * 5);
        assert_eq!(buf.get(1, 1), OPAQUE_WHITE);
        assert_eq!(buf.get(7, 5), OPAQUE_WHITE);
    }

    #[test]
    fn fill_clips_to_canvas() {
        let mut buf = PixelBuffer::new(4, 4, OPAQUE_WHITE);
        rect_fill(&mut buf, RectRequest::new(-5, -5, 1, 100), C);
        let painted = buf.as_slice().iter().filter(|&&p| p == C).count();
        assert_eq!(painted, 2 * 4);
    }

    #[test]
    fn outline_leaves_interior_alone() {
        let mut buf = PixelBuffer::new(12, 12, OPAQUE_WHITE);
        rect_outline(&mut buf, RectRequest::new(1, 1, 9, 9), 1, C);
        assert_eq!(buf.get(5, 5), OPAQUE_WHITE);
        assert_eq!(buf.get(5, 1), C);
        assert_eq!(buf.get(9, 5), C);
    }

    #[test]
    fn draw_shape_line_matches_draw_line() {
        let mut a = PixelBuffer::new(10, 10, OPAQUE_WHITE);
        let mut b = PixelBuffer::new(10, 10, OPAQUE_WHITE);
        draw_shape(&mut a, &ShapeRequest::Line { from: (1, 2), to: (8, 6) }, 2, C);
        draw_line(&mut b, 1, 2, 8, 6, 2, C);
        assert_eq!(a, b);
    }

    #[test]
    fn huge_rectangles_clip_without_overflow() {
        let mut buf = PixelBuffer::new(10, 10, OPAQUE_WHITE);
        rect_outline(&mut buf, RectRequest::new(-2_000_000_000, 0, 2_000_000_000, 5), 1, C);
        for x in 0..10 {
            assert_eq!(buf.get(x, 0), C);
            assert_eq!(buf.get(x, 5), C);
            assert_eq!(buf.get(x, 2), OPAQUE_WHITE);
        }

        let mut filled = PixelBuffer::new(10, 10, OPAQUE_WHITE);
        rect_fill(&mut filled, RectRequest::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX), C);
        assert!(filled.as_slice().iter().all(|&p| p == C));
    }
}
