use serde::{Deserialize, Serialize};

use crate::theme::{Paint, ThemeToken};
use crate::types::{Point, Rect};

/// A single, stateless render instruction.
///
/// The core emits a `Vec<RenderCommand>` per frame. Renderers consume the
/// list sequentially; each command carries all the data it needs apart from
/// the transform/group stack opened by earlier commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
    },

    /// Draw a text string anchored at a position, optionally rotated about
    /// that position (degrees, clockwise).
    DrawText {
        position: Point,
        text: String,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
        rotation: f64,
    },

    /// Draw a line segment.
    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
        dash: Option<Dash>,
    },

    /// Draw an unfilled open path through the points in order.
    DrawPolyline {
        points: Vec<Point>,
        color: ThemeToken,
        width: f64,
    },

    /// Draw a filled circle. `key` identifies the data point the circle
    /// stands for, for hit-testing by hosts.
    DrawCircle {
        center: Point,
        radius: f64,
        fill: Paint,
        key: Option<String>,
    },

    /// Translate all subsequent commands until the matching `PopTransform`.
    PushTransform { translate: Point },

    /// Pop the most recent transform.
    PopTransform,

    /// Begin a logical group. `opacity` applies to everything inside it.
    BeginGroup { id: String, opacity: f64 },

    /// End the current group.
    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Dash pattern in pixels: `dash` drawn, then `gap` skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dash {
    pub dash: f64,
    pub gap: f64,
}

impl Dash {
    pub fn new(dash: f64, gap: f64) -> Self {
        Self { dash, gap }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_externally_tagged() {
        let cmd = RenderCommand::DrawCircle {
            center: Point::new(1.0, 2.0),
            radius: 4.0,
            fill: Paint::Token(ThemeToken::Marker),
            key: Some("a1".into()),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["DrawCircle"]["radius"], 4.0);
        assert_eq!(json["DrawCircle"]["fill"]["Token"], "Marker");
        assert_eq!(json["DrawCircle"]["key"], "a1");
    }
}
