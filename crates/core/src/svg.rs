//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use trail_chart_protocol::{RenderCommand, TextAlign, ThemeToken, Viewport};

/// Render a list of commands as an SVG document string.
///
/// Transforms and groups become nested `<g>` elements, so the output keeps
/// the layering of the command list.
pub fn render_svg(commands: &[RenderCommand], viewport: Viewport) -> String {
    let Viewport { width, height } = viewport;
    let mut svg = String::with_capacity(commands.len() * 120);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:sans-serif">"#,
    ));

    for cmd in commands {
        write_command(&mut svg, cmd);
    }

    svg.push_str("</svg>");
    svg
}

fn write_command(svg: &mut String, cmd: &RenderCommand) {
    match cmd {
        RenderCommand::DrawRect {
            rect,
            color,
            border_color,
        } => {
            svg.push_str(&format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                rect.x,
                rect.y,
                rect.w,
                rect.h,
                hex(*color),
            ));
            if let Some(border) = border_color {
                svg.push_str(&format!(r#" stroke="{}""#, hex(*border)));
            }
            svg.push_str("/>");
        }
        RenderCommand::DrawLine {
            from,
            to,
            color,
            width,
            dash,
        } => {
            svg.push_str(&format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{width}""#,
                from.x,
                from.y,
                to.x,
                to.y,
                hex(*color),
            ));
            if let Some(dash) = dash {
                svg.push_str(&format!(
                    r#" stroke-dasharray="{}px {}px""#,
                    dash.dash, dash.gap
                ));
            }
            svg.push_str("/>");
        }
        RenderCommand::DrawPolyline {
            points,
            color,
            width,
        } => {
            let d: String = points
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let op = if i == 0 { 'M' } else { 'L' };
                    format!("{op}{},{}", p.x, p.y)
                })
                .collect();
            svg.push_str(&format!(
                r#"<path d="{d}" fill="none" stroke="{}" stroke-width="{width}"/>"#,
                hex(*color),
            ));
        }
        RenderCommand::DrawCircle {
            center,
            radius,
            fill,
            key,
        } => {
            svg.push_str(&format!(
                r#"<circle cx="{}" cy="{}" r="{radius}" fill="{}""#,
                center.x,
                center.y,
                fill.resolve().to_hex(),
            ));
            if let Some(key) = key {
                svg.push_str(&format!(r#" data-key="{}""#, escape_xml(key)));
            }
            svg.push_str("/>");
        }
        RenderCommand::DrawText {
            position,
            text,
            color,
            font_size,
            align,
            rotation,
        } => {
            let anchor = match align {
                TextAlign::Left => "start",
                TextAlign::Center => "middle",
                TextAlign::Right => "end",
            };
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}""#,
                position.x,
                position.y,
                hex(*color),
            ));
            if *rotation != 0.0 {
                svg.push_str(&format!(
                    r#" transform="rotate({rotation} {} {})""#,
                    position.x, position.y
                ));
            }
            svg.push_str(&format!(">{}</text>", escape_xml(text)));
        }
        RenderCommand::PushTransform { translate } => {
            svg.push_str(&format!(
                r#"<g transform="translate({}, {})">"#,
                translate.x, translate.y
            ));
        }
        RenderCommand::BeginGroup { id, opacity } => {
            svg.push_str(&format!(
                r#"<g class="{}" opacity="{opacity}">"#,
                escape_xml(id)
            ));
        }
        RenderCommand::PopTransform | RenderCommand::EndGroup => svg.push_str("</g>"),
    }
}

fn hex(token: ThemeToken) -> String {
    token.color().to_hex()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
