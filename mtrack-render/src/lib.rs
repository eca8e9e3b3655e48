pub mod render;
pub mod text;

pub use render::{RenderError, SkiaSink};
pub use text::PromptFont;
