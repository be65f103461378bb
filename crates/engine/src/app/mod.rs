mod frame_stats;
mod geometry;
mod input;
mod loop_runner;
mod rendering;
mod scene;

pub use geometry::{Rect, Vec2};
pub use input::{InputAction, TextInput};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    draw_placeholder, line_height, text_width, Canvas, Color, FrameRef, PixelRect, Renderer,
    SpriteCache, SpriteImage,
};
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneKey};
