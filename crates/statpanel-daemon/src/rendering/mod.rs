//! Rendering of layout screens into frames.

mod canvas;
mod color;
mod renderer;
mod text;

pub use renderer::ScreenRenderer;
