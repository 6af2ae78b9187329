// ============================================================================
// LINE RASTERIZER: Bresenham with a square brush stamp
// ============================================================================

use crate::canvas::{Argb, PixelBuffer};

/// Stamp a `(2·radius) × (2·radius)` square whose cells span
/// `[cx - radius, cx + radius)` on both axes. Off-canvas cells are skipped.
/// A radius of zero (or less) stamps nothing.
pub fn stamp_square(buf: &mut PixelBuffer, cx: i32, cy: i32, radius: i32, color: Argb) {
    if radius <= 0 {
        return;
    }
    // Clip the stamp to the buffer up front instead of testing every cell.
    let x0 = cx.saturating_sub(radius).max(0);
    let y0 = cy.saturating_sub(radius).max(0);
    let x1 = cx.saturating_add(radius).min(buf.width() as i32);
    let y1 = cy.saturating_add(radius).min(buf.height() as i32);
    for y in y0..y1 {
        for x in x0..x1 {
            buf.set(x, y, color);
        }
    }
}

/// Draw a stroke from `(x1, y1)` to `(x2, y2)`, stamping a square of
/// `radius` at every integer point Bresenham's algorithm visits.
///
/// Endpoints are visited in a canonical order (lexicographically smaller
/// point first), so `draw_line(a, b)` and `draw_line(b, a)` cover exactly
/// the same pixels. Any `i32` endpoints are accepted; only the stretch of the
/// segment whose stamps can reach the buffer is walked.
pub fn draw_line(
    buf: &mut PixelBuffer,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    radius: i32,
    color: Argb,
) {
    if radius <= 0 {
        return;
    }
    let r = radius as i64;
    let points = line_points(x1, y1, x2, y2);
    // A stamp centred on c covers [c - r, c + r), so it reaches the buffer
    // only for c in [1 - r, extent + r - 1] along the major axis.
    let extent = i64::from(if points.x_major { buf.width() } else { buf.height() });
    for (x, y) in points.restrict_major(1 - r, extent + r - 1) {
        stamp_square(buf, x, y, radius, color);
    }
}

/// Integer points on the segment, in canonical order, endpoints included.
///
/// Steps one pixel at a time along the major axis and picks the nearest
/// minor coordinate (ties round away from the start point). All arithmetic
/// is done wide, so extreme endpoints cannot overflow.
pub fn line_points(x1: i32, y1: i32, x2: i32, y2: i32) -> LinePoints {
    let ((x1, y1), (x2, y2)) = if (x1, y1) <= (x2, y2) {
        ((x1, y1), (x2, y2))
    } else {
        ((x2, y2), (x1, y1))
    };
    let dx = x2 as i64 - x1 as i64;
    let dy = y2 as i64 - y1 as i64;
    let x_major = dx.abs() >= dy.abs();
    let (major, minor) = if x_major { (dx, dy) } else { (dy, dx) };
    LinePoints {
        origin: (x1 as i64, y1 as i64),
        x_major,
        major_len: major.abs(),
        minor_len: minor.abs(),
        major_step: if major < 0 { -1 } else { 1 },
        minor_step: if minor < 0 { -1 } else { 1 },
        step: 0,
        last: major.abs(),
    }
}

/// Iterator state for [`line_points`].
#[derive(Clone, Debug)]
pub struct LinePoints {
    origin: (i64, i64),
    x_major: bool,
    major_len: i64,
    minor_len: i64,
    major_step: i64,
    minor_step: i64,
    /// Next step to yield; `last` is inclusive.
    step: i64,
    last: i64,
}

impl LinePoints {
    /// Keep only the steps whose major-axis coordinate lies in `[lo, hi]`.
    fn restrict_major(mut self, lo: i64, hi: i64) -> Self {
        let start = if self.x_major { self.origin.0 } else { self.origin.1 };
        let (first, last) = if self.major_step > 0 {
            (lo - start, hi - start)
        } else {
            (start - hi, start - lo)
        };
        self.step = self.step.max(first);
        self.last = self.last.min(last);
        self
    }

    fn point_at(&self, step: i64) -> (i32, i32) {
        let minor = if self.major_len == 0 {
            0
        } else {
            let num = 2 * step as i128 * self.minor_len as i128 + self.major_len as i128;
            (num / (2 * self.major_len as i128)) as i64
        };
        let (along, across) = (step * self.major_step, minor * self.minor_step);
        let (dx, dy) = if self.x_major { (along, across) } else { (across, along) };
        // Every point lies between the two i32 endpoints.
        ((self.origin.0 + dx) as i32, (self.origin.1 + dy) as i32)
    }
}

impl Iterator for LinePoints {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.step > self.last {
            return None;
        }
        let point = self.point_at(self.step);
        self.step += 1;
        Some(point)
    }
}
