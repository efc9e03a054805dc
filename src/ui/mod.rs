// UI rendering module
//
// This module contains all UI rendering components for brokerscope.
// The main draw() function lays out the topology canvas and the sidebar
// above the status bar and drives one engine frame per draw.

mod sidebar;
mod status_bar;
mod topology;

use crate::app::AppState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};
use std::time::Instant;

use sidebar::render_sidebar;
use status_bar::render_status_bar;
use topology::render_topology;

/// Narrower terminals give the whole body to the canvas
const SIDEBAR_MIN_WIDTH: u16 = 100;

/// Screen regions for one draw
struct Regions {
    canvas: Rect,
    sidebar: Option<Rect>,
    status: Rect,
}

fn split(area: Rect) -> Regions {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    if area.width < SIDEBAR_MIN_WIDTH {
        return Regions {
            canvas: chunks[0],
            sidebar: None,
            status: chunks[1],
        };
    }

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(68), // Topology canvas
            Constraint::Percentage(32), // Stats, nodes, message log
        ])
        .split(chunks[0]);

    Regions {
        canvas: body_chunks[0],
        sidebar: Some(body_chunks[1]),
        status: chunks[1],
    }
}

/// Main UI drawing function
pub fn draw(f: &mut Frame, app: &mut AppState, now: Instant) {
    let regions = split(f.area());

    render_topology(f, regions.canvas, app, now);
    if let Some(sidebar) = regions.sidebar {
        render_sidebar(f, sidebar, app, now);
    }
    render_status_bar(f, regions.status, app);
}
