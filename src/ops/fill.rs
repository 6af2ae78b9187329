// ============================================================================
// FLOOD FILL: explicit-stack, 4-connected
// ============================================================================

use crate::canvas::{Argb, PixelBuffer};

/// 4-connected neighbour offsets, in visiting order.
const NEIGHBOURS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, 1), (0, -1)];

/// Recolor the 4-connected region of `(x, y)`'s current color with `color`.
///
/// Returns the number of pixels changed. Seeding outside the buffer, or on a
/// pixel that already has `color`, changes nothing.
///
/// Runs to completion on the caller's thread; the worst case touches every
/// pixel once, so latency is bounded by `O(width · height)`. The work list is
/// a heap `Vec`, never the call stack, so large canvases cannot overflow it.
pub fn flood_fill(buf: &mut PixelBuffer, x: i32, y: i32, color: Argb) -> usize {
    let Some(old) = buf.try_get(x, y) else {
        return 0;
    };
    if old == color {
        return 0;
    }

    let mut stack: Vec<(i32, i32)> = Vec::with_capacity(4096);
    buf.set(x, y, color);
    stack.push((x, y));
    let mut changed = 1usize;

    while let Some((cx, cy)) = stack.pop() {
        for (ox, oy) in NEIGHBOURS {
            let (nx, ny) = (cx + ox, cy + oy);
            // Neighbours are recolored before the push, so a pixel can never
            // be queued twice.
            if buf.try_get(nx, ny) != Some(old) {
                continue;
            }
            buf.set(nx, ny, color);
            stack.push((nx, ny));
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{OPAQUE_BLACK, OPAQUE_WHITE};

    const RED: Argb = 0xFFFF_0000;

    #[test]
    fn fills_whole_white_canvas() {
        let mut buf = PixelBuffer::new(10, 10, OPAQUE_WHITE);
        assert_eq!(flood_fill(&mut buf, 0, 0, OPAQUE_BLACK), 100);
        assert!(buf.as_slice().iter().all(|&p| p == OPAQUE_BLACK));
    }

    #[test]
    fn filling_with_same_color_is_a_no_op() {
        let mut buf = PixelBuffer::new(5, 5, OPAQUE_WHITE);
        let before = buf.clone();
        assert_eq!(flood_fill(&mut buf, 2, 2, OPAQUE_WHITE), 0);
        assert_eq!(buf, before);
    }

    #[test]
    fn stops_at_color_boundaries() {
        // vertical black wall at x = 3 splits the canvas
        let mut buf = PixelBuffer::new(7, 4, OPAQUE_WHITE);
        for y in 0..4 {
            buf.set(3, y, OPAQUE_BLACK);
        }
        assert_eq!(flood_fill(&mut buf, 0, 0, RED), 12);
        for y in 0..4 {
            for x in 0..3 {
                assert_eq!(buf.get(x, y), RED);
            }
            assert_eq!(buf.get(3, y), OPAQUE_BLACK);
            for x in 4..7 {
                assert_eq!(buf.get(x, y), OPAQUE_WHITE);
            }
        }
    }

    #[test]
    fn diagonal_gaps_do_not_leak() {
        // checkerboard: every white cell is isolated under 4-connectivity
        let mut buf = PixelBuffer::new(4, 4, OPAQUE_WHITE);
        for y in 0..4 {
            for x in 0..4 {
                if (x + y) % 2 == 1 {
                    buf.set(x, y, OPAQUE_BLACK);
                }
            }
        }
        assert_eq!(flood_fill(&mut buf, 0, 0, RED), 1);
        assert_eq!(buf.get(1, 1), OPAQUE_WHITE);
    }

    #[test]
    fn seed_outside_canvas_changes_nothing() {
        let mut buf = PixelBuffer::new(3, 3, OPAQUE_WHITE);
        assert_eq!(flood_fill(&mut buf, -1, 0, RED), 0);
        assert_eq!(flood_fill(&mut buf, 0, 3, RED), 0);
        assert!(buf.as_slice().iter().all(|&p| p == OPAQUE_WHITE));
    }

    #[test]
    fn large_canvas_does_not_overflow() {
        let mut buf = PixelBuffer::new(1500, 1500, OPAQUE_WHITE);
        assert_eq!(flood_fill(&mut buf, 750, 750, RED), 1500 * 1500);
    }
}
