use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{
        Block, Borders, Paragraph,
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
    },
};
use trail_chart_core::{ChangeFeed, ChartController};
use trail_chart_protocol::{Paint, Point, RenderCommand, ThemeToken};

/// Delay between replayed batches while not paused.
const BATCH_INTERVAL: Duration = Duration::from_millis(800);

fn theme_to_rgb(token: ThemeToken) -> (u8, u8, u8) {
    match token {
        ThemeToken::Background => (0, 0, 0),
        ThemeToken::ChartLine | ThemeToken::Marker => (176, 176, 140),
        ThemeToken::MarkerHover => (224, 138, 90),
        ThemeToken::GuideLine => (110, 110, 96),
        ThemeToken::AxisLine => (150, 150, 150),
        ThemeToken::AxisText => (230, 230, 230),
    }
}

fn theme_to_color(token: ThemeToken) -> Color {
    let (r, g, b) = theme_to_rgb(token);
    Color::Rgb(r, g, b)
}

fn paint_to_color(paint: Paint) -> Color {
    match paint {
        Paint::Token(token) => theme_to_color(token),
        Paint::Blend { from, to, t } => {
            let (a, b) = (theme_to_rgb(from), theme_to_rgb(to));
            let mix = |x: u8, y: u8| {
                (f64::from(x) + (f64::from(y) - f64::from(x)) * t.clamp(0.0, 1.0)).round() as u8
            };
            Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
        }
    }
}

/// A shape in canvas coordinates, ready to draw.
#[derive(Debug, Clone, PartialEq)]
enum CanvasShape {
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: Color,
    },
    Circle {
        center: (f64, f64),
        radius: f64,
        color: Color,
    },
    Label {
        at: (f64, f64),
        text: String,
        color: Color,
    },
}

/// Flatten a command list into canvas shapes: transforms are accumulated,
/// shapes inside zero-opacity groups are dropped, and y is flipped since
/// canvas y grows upwards.
fn canvas_shapes(commands: &[RenderCommand], surface_height: f64) -> Vec<CanvasShape> {
    let mut shapes = Vec::new();
    let mut offsets = vec![Point::new(0.0, 0.0)];
    let mut hidden: Vec<bool> = Vec::new();
    let flip = |p: Point, off: Point| (p.x + off.x, surface_height - (p.y + off.y));

    for cmd in commands {
        let off = offsets.last().copied().unwrap_or(Point::new(0.0, 0.0));
        match cmd {
            RenderCommand::BeginGroup { opacity, .. } => hidden.push(*opacity <= 0.0),
            RenderCommand::EndGroup => {
                hidden.pop();
            }
            RenderCommand::PushTransform { translate } => {
                offsets.push(Point::new(off.x + translate.x, off.y + translate.y));
            }
            RenderCommand::PopTransform => {
                if offsets.len() > 1 {
                    offsets.pop();
                }
            }
            _ if hidden.iter().any(|h| *h) => {}
            RenderCommand::DrawLine {
                from, to, color, ..
            } => shapes.push(CanvasShape::Line {
                from: flip(*from, off),
                to: flip(*to, off),
                color: theme_to_color(*color),
            }),
            RenderCommand::DrawPolyline { points, color, .. } => {
                for pair in points.windows(2) {
                    shapes.push(CanvasShape::Line {
                        from: flip(pair[0], off),
                        to: flip(pair[1], off),
                        color: theme_to_color(*color),
                    });
                }
            }
            RenderCommand::DrawCircle {
                center,
                radius,
                fill,
                ..
            } => shapes.push(CanvasShape::Circle {
                center: flip(*center, off),
                radius: *radius,
                color: paint_to_color(*fill),
            }),
            RenderCommand::DrawText {
                position,
                text,
                color,
                ..
            } => shapes.push(CanvasShape::Label {
                at: flip(*position, off),
                text: text.clone(),
                color: theme_to_color(*color),
            }),
            // The terminal background already is the chart background.
            RenderCommand::DrawRect { .. } => {}
        }
    }
    shapes
}

fn paint_shapes(ctx: &mut Context<'_>, shapes: &[CanvasShape]) {
    for shape in shapes {
        match shape {
            CanvasShape::Line { from, to, color } => {
                ctx.draw(&CanvasLine::new(from.0, from.1, to.0, to.1, *color));
            }
            CanvasShape::Circle {
                center,
                radius,
                color,
            } => ctx.draw(&Circle {
                x: center.0,
                y: center.1,
                radius: *radius,
                color: *color,
            }),
            CanvasShape::Label { at, text, color } => {
                ctx.print(
                    at.0,
                    at.1,
                    Span::styled(text.clone(), Style::default().fg(*color)),
                );
            }
        }
    }
}

/// Map a terminal cell inside `area` to a chart surface position.
fn cell_to_surface(area: Rect, col: u16, row: u16, width: f64, height: f64) -> Option<Point> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    if col < area.x || row < area.y || col >= area.x + area.width || row >= area.y + area.height {
        return None;
    }
    let fx = (f64::from(col - area.x) + 0.5) / f64::from(area.width);
    let fy = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
    Some(Point::new(fx * width, fy * height))
}

/// Interactive live view: applies one batch per tick, redraws on every
/// change, and drives hover from the mouse or the arrow keys.
pub fn render_live(controller: &mut ChartController, feed: &mut dyn ChangeFeed) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let clock = Instant::now();
    let mut last_batch: Option<Instant> = None;
    let mut paused = false;
    let mut step_once = false;
    let mut feed_done = false;
    let mut batches = 0usize;
    let mut status = String::from("waiting for changes");
    let mut selected: Option<usize> = None;
    let mut chart_area = Rect::default();

    loop {
        let now_ms = clock.elapsed().as_secs_f64() * 1000.0;

        let due = last_batch.is_none_or(|t| t.elapsed() >= BATCH_INTERVAL);
        if !feed_done && ((!paused && due) || step_once) {
            step_once = false;
            last_batch = Some(Instant::now());
            match feed.next_batch() {
                Some(Ok(batch)) => {
                    let report = controller.apply_batch(batch);
                    batches += 1;
                    status = format!(
                        "batch {batches}: +{} ~{} -{} ignored {} rejected {}",
                        report.added, report.modified, report.removed, report.ignored, report.rejected
                    );
                }
                Some(Err(err)) => {
                    tracing::warn!(%err, "change feed failed");
                    status = format!("feed error: {err}");
                    feed_done = true;
                }
                None => {
                    status = format!("feed drained after {batches} batches");
                    feed_done = true;
                }
            }
        }

        let viewport = controller.viewport();
        let shapes = canvas_shapes(&controller.frame(now_ms), viewport.height);
        let plotted = controller.chart().points().len();
        let activity = controller.chart().activity().to_string();
        let store_len = controller.store().len();

        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let header = Paragraph::new(format!(
                " trail-chart | {activity}: {plotted} of {store_len} | {status} | Tab activity  ←→ hover  space pause  n step  q quit "
            ))
            .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let content = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!(" {activity} distance "));
            chart_area = block.inner(content);

            let canvas = Canvas::default()
                .block(block)
                .background_color(Color::Black)
                .marker(symbols::Marker::Braille)
                .x_bounds([0.0, viewport.width])
                .y_bounds([0.0, viewport.height])
                .paint(|ctx| paint_shapes(ctx, &shapes));
            frame.render_widget(canvas, content);
        })?;

        let poll = if controller.is_animating(now_ms) {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };
        if event::poll(poll)? {
            let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char(' ') => paused = !paused,
                    KeyCode::Char('n') => step_once = true,
                    KeyCode::Tab => {
                        let next = {
                            let activities = controller.store().activities();
                            let current = activities.iter().position(|a| *a == activity);
                            let idx = current.map_or(0, |i| (i + 1) % activities.len().max(1));
                            activities.get(idx).map(|a| a.to_string())
                        };
                        if let Some(next) = next {
                            controller.select_activity(next);
                            selected = None;
                        }
                    }
                    KeyCode::Left => {
                        selected = match selected {
                            Some(i) if i > 0 => Some(i - 1),
                            Some(i) => Some(i),
                            None => plotted.checked_sub(1),
                        };
                        controller.hover_index(selected, now_ms);
                    }
                    KeyCode::Right => {
                        selected = match selected {
                            Some(i) if i + 1 < plotted => Some(i + 1),
                            Some(i) => Some(i),
                            None if plotted > 0 => Some(0),
                            None => None,
                        };
                        controller.hover_index(selected, now_ms);
                    }
                    _ => {}
                },
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Moved => {
                    match cell_to_surface(
                        chart_area,
                        mouse.column,
                        mouse.row,
                        viewport.width,
                        viewport.height,
                    ) {
                        Some(point) => {
                            controller.pointer_moved(point, now_ms);
                        }
                        None => controller.pointer_left(now_ms),
                    }
                    selected = None;
                }
                _ => {}
            }
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
