//! sdraw: a small raster paint program.
//!
//! The library is the canvas engine: pixel buffers with a live preview
//! overlay ([`canvas`]), the drawing primitives ([`ops`]) and the controller
//! that turns pointer and key events into pixel writes
//! ([`components::tools`]). File import/export lives in [`io`]; the eframe
//! front-end in [`app`] is thin glue on top.

#![allow(clippy::too_many_arguments)]

pub mod logger;

pub mod app;
pub mod canvas;
pub mod cli;
pub mod components;
pub mod io;
pub mod ops;
pub mod settings;

pub use canvas::{Argb, Canvas, PixelBuffer, Target};
pub use components::colors::Palette;
pub use components::tools::{CanvasController, CanvasEvent, CanvasState, DragState, Tool};
