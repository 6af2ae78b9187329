//! Pointer/key sequences driven through `CanvasController::handle_event`.

use sdraw::canvas::{OPAQUE_WHITE, TRANSPARENT};
use sdraw::components::tools::{CanvasEvent, DEFAULT_MAX_BRUSH, Key, PointerButton};
use sdraw::{CanvasController, DragState, Palette, Tool};

const RED: u32 = 0xFFFF_0000;

fn controller(w: u32, h: u32) -> CanvasController {
    let mut c = CanvasController::new(w, h, Palette::default(), DEFAULT_MAX_BRUSH);
    c.set_color(RED);
    c
}

fn down(x: i32, y: i32) -> CanvasEvent {
    CanvasEvent::PointerDown { x, y, button: PointerButton::Primary }
}

fn up(x: i32, y: i32) -> CanvasEvent {
    CanvasEvent::PointerUp { x, y, button: PointerButton::Primary }
}

fn mv(x: i32, y: i32) -> CanvasEvent {
    CanvasEvent::PointerMove { x, y }
}

#[test]
fn importing_a_two_by_two_image() {
    let mut c = controller(8, 8);
    let rgba = [255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 255, 255, 255, 255];
    assert!(c.load_rgba(2, 2, &rgba));
    assert_eq!(c.canvas().base().as_slice(), &[0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF, 0xFFFF_FFFF]);
    assert_eq!((c.canvas().overlay().width(), c.canvas().overlay().height()), (2, 2));
    assert!(c.canvas().overlay().is_clear());
}

#[test]
fn resize_mid_drag_resets_to_idle() {
    let mut c = controller(50, 50);
    c.set_tool(Tool::RectFill);
    c.handle_event(down(3, 3));
    c.handle_event(mv(20, 20));
    assert!(c.state().is_dragging());

    c.resize(30, 30);
    assert_eq!(c.state().drag, DragState::Idle);
    assert_eq!((c.canvas().width(), c.canvas().height()), (30, 30));

    // the stale gesture can no longer commit
    c.handle_event(mv(10, 10));
    c.handle_event(up(10, 10));
    assert!(c.canvas().base().as_slice().iter().all(|&p| p == OPAQUE_WHITE));
    assert!(c.canvas().overlay().is_clear());
}

#[test]
fn overlay_is_empty_after_every_release() {
    for tool in [Tool::Line, Tool::RectOutline, Tool::RectFill, Tool::Brush] {
        let mut c = controller(16, 16);
        c.set_tool(tool);
        c.handle_event(down(2, 2));
        c.handle_event(mv(9, 5));
        c.handle_event(mv(12, 11));
        c.handle_event(up(12, 11));
        assert_eq!(c.state().drag, DragState::Idle, "{}", tool.label());
        assert!(c.canvas().overlay().is_clear(), "{}", tool.label());
        assert_eq!(c.canvas().base().get(12, 11), RED, "{}", tool.label());
    }
}

#[test]
fn preview_never_touches_the_base() {
    let mut c = controller(16, 16);
    c.set_tool(Tool::RectOutline);
    c.handle_event(down(1, 1));
    for i in 2..14 {
        c.handle_event(mv(i, i));
        assert!(c.canvas().base().as_slice().iter().all(|&p| p == OPAQUE_WHITE));
        assert_ne!(c.canvas().overlay().get(i, i), TRANSPARENT);
    }
}

#[test]
fn filled_rect_commits_the_normalized_area() {
    let mut c = controller(10, 10);
    c.set_tool(Tool::RectFill);
    c.handle_event(down(7, 6));
    c.handle_event(up(2, 3));
    let painted = c.canvas().base().as_slice().iter().filter(|&&p| p == RED).count();
    assert_eq!(painted, 6 * 4);
}

#[test]
fn keyboard_changes_color_and_brush() {
    let mut c = controller(4, 4);
    c.handle_event(CanvasEvent::KeyDown(Key::Digit(2)));
    assert_eq!(c.state().color, OPAQUE_WHITE);
    for _ in 0..3 {
        c.handle_event(CanvasEvent::KeyDown(Key::Plus));
    }
    assert_eq!(c.state().brush_radius, 4);
}
