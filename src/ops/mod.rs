pub mod fill;
pub mod line;
pub mod shapes;
pub mod text;
