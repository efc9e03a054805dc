// Status Bar rendering module
//
// Renders the bottom status bar with keyboard shortcuts and toggle indicators.

use crate::app::AppState;
use crate::theme::{BONE_WHITE, NEON_PURPLE, TOXIC_GREEN};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    // Calculate available width for hints (subtract borders and icon)
    let available_width = area.width.saturating_sub(4);

    // Define all hints with priority levels
    struct Hint {
        priority: u8,
        key: &'static str,
        desc: &'static str,
        color: Color,
    }

    let hints = [
        Hint {
            priority: 1,
            key: "Q:",
            desc: "Quit | ",
            color: Color::Red,
        },
        Hint {
            priority: 1,
            key: "A:",
            desc: "Anim | ",
            color: NEON_PURPLE,
        },
        Hint {
            priority: 2,
            key: "L:",
            desc: "Labels | ",
            color: NEON_PURPLE,
        },
        Hint {
            priority: 2,
            key: "D:",
            desc: "Distance | ",
            color: NEON_PURPLE,
        },
        Hint {
            priority: 2,
            key: "G:",
            desc: "Glow | ",
            color: NEON_PURPLE,
        },
        Hint {
            priority: 3,
            key: "R:",
            desc: "Reset | ",
            color: NEON_PURPLE,
        },
    ];

    let mut spans = vec![Span::styled(" ◉ ", Style::default().fg(NEON_PURPLE))];
    let mut current_length = 3;

    // Process hints by priority, adding until we run out of space
    for priority in 1..=3 {
        for hint in hints.iter().filter(|hint| hint.priority == priority) {
            let hint_length = hint.key.len() + hint.desc.len();
            if current_length + hint_length <= available_width as usize {
                spans.push(Span::styled(
                    hint.key,
                    Style::default().fg(hint.color).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(hint.desc));
                current_length += hint_length;
            }
        }
    }

    // Toggle status indicators (always shown)
    spans.push(Span::raw(" "));
    spans.extend(build_toggle_indicators(app));

    if app.feed_exhausted() {
        spans.push(Span::styled(
            " feed ended",
            Style::default().fg(BONE_WHITE).add_modifier(Modifier::ITALIC),
        ));
    }

    let status_bar = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(NEON_PURPLE)),
        )
        .alignment(Alignment::Left);

    f.render_widget(status_bar, area);
}

/// One `[K:ON]` / `[K:OFF]` indicator
/// Toxic Green for ON, Bone White for OFF
fn toggle_indicator(key: &'static str, enabled: bool) -> [Span<'static>; 3] {
    let (state, color) = if enabled {
        ("ON", TOXIC_GREEN)
    } else {
        ("OFF", BONE_WHITE)
    };
    [
        Span::styled(format!("[{key}:"), Style::default().fg(BONE_WHITE)),
        Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled("] ", Style::default().fg(BONE_WHITE)),
    ]
}

/// Build toggle status indicator spans for the status bar
/// Shows [A:..] [L:..] [D:..] [G:..] for the engine's visual settings
pub fn build_toggle_indicators(app: &AppState) -> Vec<Span<'static>> {
    let settings = app.frame_loop.settings();
    let mut spans = Vec::with_capacity(12);
    spans.extend(toggle_indicator("A", settings.animations_enabled));
    spans.extend(toggle_indicator("L", settings.labels_enabled));
    spans.extend(toggle_indicator("D", settings.distance_labels_enabled));
    spans.extend(toggle_indicator("G", settings.glow_enabled));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ScriptedFeed;
    use std::time::Duration;

    fn indicator_text(spans: &[Span<'_>]) -> String {
        spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_toggle_indicators_reflect_settings() {
        let mut app = AppState::with_feed(
            Box::new(ScriptedFeed::new(Vec::new())),
            Duration::from_millis(16),
        );
        assert_eq!(
            indicator_text(&build_toggle_indicators(&app)),
            "[A:ON] [L:ON] [D:ON] [G:ON] "
        );

        app.frame_loop.settings_mut().glow_enabled = false;
        app.frame_loop.set_animations_enabled(false);
        assert_eq!(
            indicator_text(&build_toggle_indicators(&app)),
            "[A:OFF] [L:ON] [D:ON] [G:OFF] "
        );
    }
}
