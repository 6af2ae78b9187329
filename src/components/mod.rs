pub mod colors;
pub mod dialogs;
pub mod tools;
