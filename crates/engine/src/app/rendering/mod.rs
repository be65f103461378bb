mod canvas;
mod font;
mod renderer;
mod sprites;

pub use canvas::{Canvas, Color, PixelRect};
pub use font::{line_height, text_width};
pub use renderer::Renderer;
pub use sprites::{draw_placeholder, FrameRef, SpriteCache, SpriteImage};
