pub mod format;
mod render;

pub use render::draw;
