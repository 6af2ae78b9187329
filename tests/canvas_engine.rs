//! Engine-level behaviour checked through the public API only.

use sdraw::canvas::{OPAQUE_BLACK, OPAQUE_WHITE, PixelBuffer, TRANSPARENT};
use sdraw::io::{SaveFormat, encode_to_vec, export_image, load_image, load_image_from_memory};
use sdraw::ops::fill::flood_fill;
use sdraw::ops::line::draw_line;
use sdraw::ops::shapes::{RectRequest, rect_fill, rect_outline};

const C: u32 = 0xFF12_34AB;

fn changed_cells(buf: &PixelBuffer, background: u32) -> Vec<(i32, i32)> {
    let mut cells = Vec::new();
    for y in 0..buf.height() as i32 {
        for x in 0..buf.width() as i32 {
            if buf.get(x, y) != background {
                cells.push((x, y));
            }
        }
    }
    cells
}

#[test]
fn bucket_on_white_canvas_turns_every_cell_black() {
    let mut buf = PixelBuffer::new(10, 10, OPAQUE_WHITE);
    flood_fill(&mut buf, 0, 0, OPAQUE_BLACK);
    assert!(buf.as_slice().iter().all(|&p| p == OPAQUE_BLACK));
}

#[test]
fn filled_region_is_uniform_and_border_is_untouched() {
    // white room enclosed by a black ring, with red outside
    let mut buf = PixelBuffer::new(12, 12, 0xFFFF_0000);
    rect_fill(&mut buf, RectRequest::new(2, 2, 9, 9), OPAQUE_WHITE);
    rect_outline(&mut buf, RectRequest::new(2, 2, 9, 9), 1, OPAQUE_BLACK);
    let before = buf.clone();

    let changed = flood_fill(&mut buf, 5, 5, C);
    assert!(changed > 0);
    for y in 0..12 {
        for x in 0..12 {
            let was = before.get(x, y);
            let now = buf.get(x, y);
            if was == OPAQUE_WHITE {
                assert_eq!(now, C, "interior cell ({x}, {y}) not filled");
            } else {
                assert_eq!(now, was, "cell ({x}, {y}) outside the region changed");
            }
        }
    }

    // a second fill with the same color is a no-op
    let after_first = buf.clone();
    assert_eq!(flood_fill(&mut buf, 5, 5, C), 0);
    assert_eq!(buf, after_first);
}

#[test]
fn short_horizontal_stroke_stays_within_its_stamp() {
    let mut buf = PixelBuffer::new(10, 10, OPAQUE_WHITE);
    draw_line(&mut buf, 0, 0, 4, 0, 1, C);
    for x in 0..=4 {
        assert_eq!(buf.get(x, 0), C);
    }
    for (x, y) in changed_cells(&buf, OPAQUE_WHITE) {
        assert!(x <= 4, "cell ({x}, {y}) beyond the end of the line");
    }
}

#[test]
fn lines_are_symmetric_in_their_endpoints() {
    for (x1, y1, x2, y2) in [(0, 0, 9, 3), (4, 8, 1, 0), (0, 9, 9, 0), (5, 5, 6, 9)] {
        let mut a = PixelBuffer::new(10, 10, OPAQUE_WHITE);
        let mut b = PixelBuffer::new(10, 10, OPAQUE_WHITE);
        draw_line(&mut a, x1, y1, x2, y2, 1, C);
        draw_line(&mut b, x2, y2, x1, y1, 1, C);
        assert_eq!(a, b);
    }
}

#[test]
fn out_of_bounds_access_is_silent() {
    let mut buf = PixelBuffer::new(3, 3, OPAQUE_WHITE);
    buf.set(-1, -1, C);
    buf.set(3, 0, C);
    assert_eq!(buf.get(99, 99), TRANSPARENT);
    assert!(buf.as_slice().iter().all(|&p| p == OPAQUE_WHITE));
}

#[test]
fn export_then_reimport_keeps_size_and_drops_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let mut buf = PixelBuffer::new(6, 4, OPAQUE_WHITE);
    buf.set(1, 1, 0x80FF_0000);

    for format in SaveFormat::all() {
        let path = dir.path().join(format!("out.{}", format.extension()));
        export_image(&buf, &path, *format, 95).unwrap();
        let img = load_image(&path).unwrap();
        assert_eq!((img.width, img.height), (6, 4), "{}", format.label());
        assert_eq!(img.channels, 3, "{} kept an alpha channel", format.label());
    }

    let png = encode_to_vec(&buf, SaveFormat::Png, 1).unwrap();
    let img = load_image_from_memory(&png).unwrap();
    // half-transparent red is written as plain red
    assert_eq!(&img.rgba[(6 + 1) * 4..(6 + 1) * 4 + 4], &[255, 0, 0, 255]);
}
