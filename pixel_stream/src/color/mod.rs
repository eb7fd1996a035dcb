mod argb;
mod index_palette;
mod color_interpreter;

pub use argb::*;
pub use index_palette::*;
pub use color_interpreter::*;
