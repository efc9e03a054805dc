// Sidebar rendering module
//
// Right-hand panels next to the topology canvas: broker statistics, the
// node list with connectivity, and the scrolling MQTT message log.

use crate::app::{AppState, LoggedMessage};
use crate::engine::{MessageKind, Node};
use crate::theme::{message_color, protocol_color, BONE_WHITE, NEON_PURPLE, OFFLINE_RED, TOXIC_GREEN};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};

pub fn render_sidebar(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),      // Stats
            Constraint::Percentage(40), // Nodes
            Constraint::Min(0),         // Message log
        ])
        .split(area);

    render_stats(f, chunks[0], app, now);
    render_node_list(f, chunks[1], app.nodes());
    render_message_log(f, chunks[2], app);
}

fn panel(title: String) -> Block<'static> {
    Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(NEON_PURPLE).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(NEON_PURPLE))
}

// ============================================================================
// Statistics
// ============================================================================

/// Compact uptime: `42s`, `1m35s`, `2h05m`
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    match secs {
        0..=59 => format!("{secs}s"),
        60..=3599 => format!("{}m{:02}s", secs / 60, secs % 60),
        _ => format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60),
    }
}

fn stat(label: &'static str, value: String) -> [Span<'static>; 2] {
    [
        Span::styled(label, Style::default().fg(BONE_WHITE)),
        Span::styled(
            value,
            Style::default().fg(TOXIC_GREEN).add_modifier(Modifier::BOLD),
        ),
    ]
}

fn stats_lines(app: &AppState, now: Instant) -> Vec<Line<'static>> {
    let nodes = app.nodes();
    let active = nodes.iter().filter(|node| node.connected).count();

    let mut first = Vec::with_capacity(4);
    first.extend(stat(" Messages ", app.total_messages().to_string()));
    first.extend(stat("  Active ", format!("{active}/{}", nodes.len())));

    let mut second = Vec::with_capacity(4);
    second.extend(stat(" Uptime ", format_uptime(app.uptime(now))));
    second.extend(stat("  Subscribers ", app.subscribers().to_string()));

    vec![Line::from(first), Line::from(second)]
}

fn render_stats(f: &mut Frame, area: Rect, app: &AppState, now: Instant) {
    let stats = Paragraph::new(stats_lines(app, now)).block(panel(" Statistics ".to_string()));
    f.render_widget(stats, area);
}

// ============================================================================
// Node list
// ============================================================================

fn node_item(node: &Node) -> ListItem<'static> {
    let (status, color) = if node.connected {
        ("Connected", TOXIC_GREEN)
    } else {
        ("Disconnected", OFFLINE_RED)
    };
    ListItem::new(Line::from(vec![
        Span::styled(" ● ", Style::default().fg(protocol_color(node.protocol))),
        Span::styled(
            node.id.clone(),
            Style::default().fg(BONE_WHITE).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({}) ", node.protocol.tag()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(status, Style::default().fg(color)),
    ]))
}

fn render_node_list(f: &mut Frame, area: Rect, nodes: &[Node]) {
    let items: Vec<ListItem> = nodes.iter().map(node_item).collect();
    let list = List::new(items).block(panel(format!(" Nodes ({}) ", nodes.len())));
    f.render_widget(list, area);
}

// ============================================================================
// Message log
// ============================================================================

/// One log row: arrival time, kind, sender and the kind's details
pub fn log_line(entry: &LoggedMessage) -> Line<'static> {
    let message = &entry.message;
    let secs = entry.at.as_secs();
    let sender = message.sender().unwrap_or("?");

    let detail = match message.kind {
        MessageKind::Publish => {
            let mut detail = message.topic.clone().unwrap_or_default();
            if let Some(payload) = &message.payload {
                detail.push_str(&format!(" = {payload}"));
            }
            detail.push_str(&format!(" q{}", message.qos));
            detail
        }
        MessageKind::Subscribe => format!(
            "{} q{}",
            message.topic.as_deref().unwrap_or_default(),
            message.qos
        ),
        _ => message.topic.clone().unwrap_or_default(),
    };

    Line::from(vec![
        Span::styled(
            format!(" {:02}:{:02} ", secs / 60, secs % 60),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{} ", message.kind.as_str()),
            Style::default()
                .fg(message_color(message.kind))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{sender} "), Style::default().fg(BONE_WHITE)),
        Span::styled(detail, Style::default().fg(Color::Gray)),
    ])
}

fn render_message_log(f: &mut Frame, area: Rect, app: &AppState) {
    // Newest at the bottom; only as many rows as fit
    let rows = area.height.saturating_sub(2) as usize;
    let skip = app.message_log.len().saturating_sub(rows);
    let items: Vec<ListItem> = app
        .message_log
        .iter()
        .skip(skip)
        .map(|entry| ListItem::new(log_line(entry)))
        .collect();

    let title = format!(" MQTT Message Log ({}) ", app.message_log.len());
    f.render_widget(List::new(items).block(panel(title)), area);
}
