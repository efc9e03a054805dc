// Topology canvas rendering module
//
// Replays the engine's recorded display list on a Braille canvas. The
// engine works in surface pixels with y growing downward; one terminal cell
// holds 2x4 Braille dots, so the surface is (cols * 2) x (rows * 4) and y is
// flipped into the canvas coordinate system here.

use crate::app::AppState;
use crate::engine::{DisplayList, Paint, PixelPoint, Shape, Surface, TickOutcome};
use crate::theme::{fade, BACKGROUND, BONE_WHITE, NEON_PURPLE, TOXIC_GREEN};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points},
        Block, BorderType, Borders,
    },
    Frame,
};
use std::time::Instant;
use unicode_width::UnicodeWidthStr;

/// Braille dots per terminal cell
pub const DOTS_PER_CELL_X: f64 = 2.0;
pub const DOTS_PER_CELL_Y: f64 = 4.0;

/// Smallest inner canvas (cells) worth drawing into
const MIN_CANVAS_COLS: u16 = 8;
const MIN_CANVAS_ROWS: u16 = 4;

/// Halo radius relative to the shape radius, and its opacity
const GLOW_SPREAD: f64 = 0.6;
const GLOW_ALPHA: f64 = 0.35;

/// Surface size in dots for a bordered canvas occupying `area`
///
/// `None` when the area is too small to hold a drawing; the frame loop then
/// idles until the terminal grows again.
pub fn surface_size(area: Rect) -> Option<(f64, f64)> {
    let cols = area.width.saturating_sub(2);
    let rows = area.height.saturating_sub(2);
    if cols < MIN_CANVAS_COLS || rows < MIN_CANVAS_ROWS {
        return None;
    }
    Some((
        f64::from(cols) * DOTS_PER_CELL_X,
        f64::from(rows) * DOTS_PER_CELL_Y,
    ))
}

/// Surface point -> canvas coordinates (y up)
fn to_canvas(point: PixelPoint, height: f64) -> (f64, f64) {
    (point.x, height - point.y)
}

pub fn render_topology(f: &mut Frame, area: Rect, app: &mut AppState, now: Instant) {
    let attached = match surface_size(area) {
        Some((width, height)) => {
            app.display.set_size(width, height);
            true
        }
        None => false,
    };
    let outcome = app.render_frame(now, attached);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(NEON_PURPLE))
        .title(title_line(app))
        .title_bottom(counters_line(app, outcome).alignment(Alignment::Right));

    let display = &app.display;
    let (width, height) = display.size();
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .background_color(BACKGROUND)
        .x_bounds([0.0, width.max(1.0)])
        .y_bounds([0.0, height.max(1.0)])
        .paint(move |ctx| {
            if attached {
                paint_display_list(ctx, display);
            }
        });

    f.render_widget(canvas, area);
}

fn title_line(app: &AppState) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            " ◉ MQTT topology ",
            Style::default().fg(NEON_PURPLE).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("│ {} ", app.feed_label()), Style::default().fg(BONE_WHITE)),
    ];

    if let Some(message) = app.last_message() {
        let sender = message.sender().unwrap_or("?");
        let mut text = format!("│ {} {}", message.kind.as_str(), sender);
        if let Some(topic) = &message.topic {
            text.push_str(&format!(" {topic}"));
        }
        text.push(' ');
        spans.push(Span::styled(text, Style::default().fg(TOXIC_GREEN)));
    }
    Line::from(spans)
}

fn counters_line(app: &AppState, outcome: TickOutcome) -> Line<'static> {
    let report = app.frame_loop.last_report();
    let counts = app.frame_loop.token_counts();

    let state = match outcome {
        TickOutcome::Scheduled(_) => format!("{:.0} fps", app.fps()),
        TickOutcome::Idle => "idle".to_string(),
        TickOutcome::Stopped => "stopped".to_string(),
    };

    Line::from(vec![Span::styled(
        format!(
            " nodes {} ({} up) │ pkt {} ack {} pulse {} │ msgs {} │ {} ",
            report.nodes,
            report.connected,
            counts.packets,
            counts.acks,
            counts.pulses,
            app.messages_seen,
            state
        ),
        Style::default().fg(BONE_WHITE),
    )])
}

/// Replay every recorded shape in order
///
/// Lines and circles are rasterized into separate canvas layers whenever the
/// shape kind changes, so later glyphs cover earlier links instead of
/// blending dot by dot. Text always lands on top.
pub fn paint_display_list(ctx: &mut Context, display: &DisplayList) {
    let (_, height) = display.size();
    let mut last_kind: Option<std::mem::Discriminant<Shape>> = None;

    for shape in display.shapes() {
        let kind = std::mem::discriminant(shape);
        if last_kind.is_some_and(|last| last != kind) {
            ctx.layer();
        }
        last_kind = Some(kind);

        match shape {
            Shape::Line { from, to, paint } => draw_line(ctx, height, *from, *to, paint),
            Shape::Circle {
                center,
                radius,
                paint,
            } => draw_circle(ctx, height, *center, *radius, paint),
            Shape::Text { at, text, paint } => draw_text(ctx, height, *at, text, paint),
        }
    }
}

fn draw_line(ctx: &mut Context, height: f64, from: PixelPoint, to: PixelPoint, paint: &Paint) {
    let color = fade(paint.color, paint.alpha);
    let (x1, y1) = to_canvas(from, height);
    let (x2, y2) = to_canvas(to, height);
    ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));

    // Thick strokes get one parallel line per extra dot of width
    let (dx, dy) = (x2 - x1, y2 - y1);
    let length = (dx * dx + dy * dy).sqrt();
    if length > 0.0 {
        let (nx, ny) = (-dy / length, dx / length);
        let extra = (paint.width - 1.0).max(0.0).round() as usize;
        for step in 1..=extra {
            let offset = step as f64;
            ctx.draw(&CanvasLine::new(
                x1 + nx * offset,
                y1 + ny * offset,
                x2 + nx * offset,
                y2 + ny * offset,
                color,
            ));
        }
    }
}

fn draw_circle(ctx: &mut Context, height: f64, center: PixelPoint, radius: f64, paint: &Paint) {
    let (x, y) = to_canvas(center, height);
    let color = fade(paint.color, paint.alpha);

    if paint.glow {
        let halo = fade(paint.color, paint.alpha * GLOW_ALPHA);
        ctx.draw(&Circle {
            x,
            y,
            radius: radius + (radius * GLOW_SPREAD).max(1.0),
            color: halo,
        });
    }

    if paint.fill {
        // Concentric rings one dot apart fill the disc at Braille resolution
        let mut r = radius;
        while r > 0.5 {
            ctx.draw(&Circle {
                x,
                y,
                radius: r,
                color,
            });
            r -= 1.0;
        }
        ctx.draw(&Points {
            coords: &[(x, y)],
            color,
        });
    } else {
        let rings = paint.width.max(1.0).round() as usize;
        for ring in 0..rings {
            let r = radius - ring as f64;
            if r <= 0.0 {
                break;
            }
            ctx.draw(&Circle {
                x,
                y,
                radius: r,
                color,
            });
        }
    }
}

fn draw_text(ctx: &mut Context, height: f64, at: PixelPoint, text: &str, paint: &Paint) {
    let (x, y) = to_canvas(at, height);
    let half_width = text.width() as f64 * DOTS_PER_CELL_X / 2.0;
    ctx.print(
        (x - half_width).max(0.0),
        y,
        Span::styled(
            text.to_string(),
            Style::default().fg(fade(paint.color, paint.alpha)),
        ),
    );
}
