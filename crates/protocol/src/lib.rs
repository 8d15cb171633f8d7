pub mod commands;
pub mod theme;
pub mod types;

pub use commands::{Dash, RenderCommand, TextAlign};
pub use theme::{Paint, ThemeToken};
pub use types::{Color, Point, Rect, Viewport};
