use trail_chart_protocol::{Point, RenderCommand, TextAlign, ThemeToken};

use crate::scale::LinearScale;

pub const TICK_COUNT: usize = 4;

const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;
const FONT_SIZE: f64 = 10.0;

/// `"<n> miles"`, with `n` printed without trailing zeros.
pub fn format_distance_label(value: f64) -> String {
    format!("{value} miles")
}

/// Render the left (distance) axis in graph coordinates.
pub fn render_value_axis(scale: &LinearScale) -> Vec<RenderCommand> {
    let (r0, r1) = scale.range();
    let mut commands = Vec::with_capacity(20);
    commands.push(RenderCommand::BeginGroup {
        id: "y-axis".into(),
        opacity: 1.0,
    });

    for (from, to) in [
        ((-TICK_SIZE, r0), (0.0, r0)),
        ((0.0, r0), (0.0, r1)),
        ((0.0, r1), (-TICK_SIZE, r1)),
    ] {
        commands.push(RenderCommand::DrawLine {
            from: Point::new(from.0, from.1),
            to: Point::new(to.0, to.1),
            color: ThemeToken::AxisLine,
            width: 1.0,
            dash: None,
        });
    }

    let (d0, d1) = scale.domain();
    // A zero-height domain has nothing to label.
    if d0 != d1 {
        for value in scale.ticks(TICK_COUNT) {
            let y = scale.map(value);
            commands.push(RenderCommand::DrawLine {
                from: Point::new(-TICK_SIZE, y),
                to: Point::new(0.0, y),
                color: ThemeToken::AxisLine,
                width: 1.0,
                dash: None,
            });
            commands.push(RenderCommand::DrawText {
                position: Point::new(-(TICK_SIZE + TICK_PADDING), y + FONT_SIZE * 0.32),
                text: format_distance_label(value),
                color: ThemeToken::AxisText,
                font_size: FONT_SIZE,
                align: TextAlign::Right,
                rotation: 0.0,
            });
        }
    }

    commands.push(RenderCommand::EndGroup);
    commands
}
