// Per-frame topology renderer
//
// Draws the static topology (broker links, distance labels, broker glyph,
// node glyphs and labels) and then the live animation tokens on top.

use super::config::{
    EngineConfig, EngineSettings, BROKER_LABEL, BROKER_RADIUS, EMPTY_CAPTION, NODE_LABEL_OFFSET,
    NODE_RADIUS, PROTOCOL_LABEL_OFFSET,
};
use super::layout::NodeLayout;
use super::mapper::{CoordinateMapper, PixelPoint};
use super::model::{Node, PlanePoint};
use super::overlay::{Evictions, OverlayManager};
use super::surface::{Paint, Surface};
use crate::theme::{
    protocol_color, BONE_WHITE, BROKER_OUTLINE, BROKER_RED, LABEL_MUTED, LABEL_TEXT,
    LINK_CONNECTED, LINK_IDLE, OUTLINE_CONNECTED, OUTLINE_DISCONNECTED,
};

/// Everything one engine instance draws from
///
/// Owned by the frame loop and lent to the render pass each frame.
#[derive(Debug)]
pub struct EngineState {
    pub mapper: CoordinateMapper,
    pub nodes: Vec<Node>,
    pub broker: PlanePoint,
    pub overlay: OverlayManager,
}

impl EngineState {
    pub fn new(config: &EngineConfig) -> Self {
        let center = config.plane_extent / 2.0;
        Self {
            mapper: CoordinateMapper::new(config.plane_extent),
            nodes: Vec::new(),
            broker: PlanePoint::new(center, center),
            overlay: OverlayManager::new(),
        }
    }
}

/// What a render pass did, for the status bar and logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub nodes: usize,
    pub connected: usize,
    pub evicted: Evictions,
    /// The empty-snapshot caption was drawn instead of a topology
    pub placeholder: bool,
}

/// Draw one frame of `state` onto `surface`
///
/// Order: clear, advance + evict tokens, then either the empty caption or
/// links, broker, nodes, and finally the token overlay.
pub fn render_frame(
    state: &mut EngineState,
    surface: &mut dyn Surface,
    config: &EngineConfig,
    settings: &EngineSettings,
) -> FrameReport {
    surface.clear();

    let layout = NodeLayout::resolve(&state.nodes, state.broker, &state.mapper, config);
    let evicted = state.overlay.advance(&layout);

    let mut report = FrameReport {
        nodes: state.nodes.len(),
        connected: state.nodes.iter().filter(|n| n.connected).count(),
        evicted,
        placeholder: false,
    };

    if state.nodes.is_empty() {
        draw_placeholder(surface, &state.mapper);
        report.placeholder = true;
        return report;
    }

    draw_links(surface, &state.nodes, &layout, settings);
    draw_broker(surface, layout.broker(), config);
    draw_nodes(surface, &state.nodes, &layout, config, settings);

    if settings.animations_enabled {
        state.overlay.draw(surface, &layout, config, settings);
    }

    report
}

fn draw_placeholder(surface: &mut dyn Surface, mapper: &CoordinateMapper) {
    let center = PixelPoint::new(mapper.width() / 2.0, mapper.height() / 2.0);
    surface.text(center, EMPTY_CAPTION, Paint::fill(BONE_WHITE));
}

/// Broker -> node lines, thicker for connected nodes, with the distance
/// label at the midpoint
fn draw_links(
    surface: &mut dyn Surface,
    nodes: &[Node],
    layout: &NodeLayout,
    settings: &EngineSettings,
) {
    let broker = layout.broker();
    for (index, node) in nodes.iter().enumerate() {
        let Some(position) = layout.at(index) else {
            continue;
        };

        let paint = if node.connected {
            Paint::stroke(LINK_CONNECTED, 2.0)
        } else {
            Paint::stroke(LINK_IDLE, 1.0).with_alpha(0.5)
        };
        surface.line(broker, position, paint);

        if settings.distance_labels_enabled {
            if let Some(distance) = node.distance {
                surface.text(
                    broker.midpoint(position),
                    &format_distance(distance),
                    Paint::fill(LABEL_MUTED),
                );
            }
        }
    }
}

fn draw_broker(surface: &mut dyn Surface, center: PixelPoint, config: &EngineConfig) {
    let radius = config.scaled(BROKER_RADIUS);
    surface.circle(center, radius, Paint::fill(BROKER_RED));
    surface.circle(center, radius, Paint::stroke(BROKER_OUTLINE, 3.0));
    surface.text(center, BROKER_LABEL, Paint::fill(LABEL_TEXT));
}

fn draw_nodes(
    surface: &mut dyn Surface,
    nodes: &[Node],
    layout: &NodeLayout,
    config: &EngineConfig,
    settings: &EngineSettings,
) {
    let radius = config.scaled(NODE_RADIUS);
    for (index, node) in nodes.iter().enumerate() {
        let Some(center) = layout.at(index) else {
            continue;
        };

        let outline = if node.connected {
            OUTLINE_CONNECTED
        } else {
            OUTLINE_DISCONNECTED
        };
        surface.circle(center, radius, Paint::fill(protocol_color(node.protocol)));
        surface.circle(center, radius, Paint::stroke(outline, 3.0));

        if settings.labels_enabled {
            let id_at = PixelPoint::new(center.x, center.y + config.scaled(NODE_LABEL_OFFSET));
            let tag_at = PixelPoint::new(center.x, center.y + config.scaled(PROTOCOL_LABEL_OFFSET));
            surface.text(id_at, node.short_id(), Paint::fill(LABEL_TEXT));
            surface.text(tag_at, node.protocol.tag(), Paint::fill(LABEL_MUTED));
        }
    }
}

/// Distance label, e.g. `12.3m`
pub fn format_distance(meters: f64) -> String {
    format!("{:.1}m", meters.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::{MessageEvent, MessageKind, Protocol};
    use crate::engine::overlay::TokenKind;
    use crate::engine::surface::{DisplayList, Shape};
    use std::time::Instant;

    fn state_800(nodes: Vec<Node>) -> EngineState {
        let config = EngineConfig::default();
        let mut state = EngineState::new(&config);
        state.mapper.resize(800.0, 800.0);
        state.nodes = nodes;
        state
    }

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::new("ble_node_1", Protocol::Ble).with_distance(12.34),
            Node::new("wifi_node_2", Protocol::WiFi).disconnected(),
            Node::new("wifi_node_3", Protocol::WiFi).with_position(200.0, 300.0),
        ]
    }

    #[test]
    fn test_empty_snapshot_draws_only_caption() {
        let config = EngineConfig::default();
        let mut state = state_800(Vec::new());
        let mut surface = DisplayList::new(800.0, 800.0);

        let report = render_frame(&mut state, &mut surface, &config, &EngineSettings::default());

        assert!(report.placeholder);
        assert_eq!(surface.shapes().len(), 1);
        assert_eq!(
            surface.texts().next(),
            Some((PixelPoint::new(400.0, 400.0), EMPTY_CAPTION))
        );
    }

    #[test]
    fn test_empty_snapshot_still_evicts_tokens() {
        let config = EngineConfig::default();
        let mut state = state_800(sample_nodes());
        state
            .overlay
            .ingest(&MessageEvent::new(MessageKind::Publish, "ble_node_1"), Instant::now(), &config);
        state.nodes.clear();

        let mut surface = DisplayList::new(800.0, 800.0);
        let report = render_frame(&mut state, &mut surface, &config, &EngineSettings::default());
        assert_eq!(report.evicted.orphaned, 2);
    }

    #[test]
    fn test_links_drawn_first_with_connectivity_style() {
        let config = EngineConfig::default();
        let mut state = state_800(sample_nodes());
        let mut surface = DisplayList::new(800.0, 800.0);

        render_frame(&mut state, &mut surface, &config, &EngineSettings::default());

        assert!(matches!(surface.shapes()[0], Shape::Line { .. }));
        let lines: Vec<_> = surface.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].0, PixelPoint::new(400.0, 400.0));
        assert_eq!(lines[0].2.width, 2.0);
        assert_eq!(lines[1].2.width, 1.0);
        assert!(lines[1].2.alpha < 1.0);
        assert_eq!(lines[2].1, PixelPoint::new(160.0, 240.0));
    }

    #[test]
    fn test_distance_label_at_link_midpoint() {
        let config = EngineConfig::default();
        let mut state = state_800(sample_nodes());
        let mut surface = DisplayList::new(800.0, 800.0);

        render_frame(&mut state, &mut surface, &config, &EngineSettings::default());

        // ble_node_1 is index 0 of 3 -> (400, 120); midpoint (400, 260)
        let label = surface.texts().find(|(_, text)| *text == "12.3m");
        let (at, _) = label.expect("distance label drawn");
        assert!((at.x - 400.0).abs() < 1e-9);
        assert!((at.y - 260.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_labels_can_be_disabled() {
        let config = EngineConfig::default();
        let mut state = state_800(sample_nodes());
        let mut surface = DisplayList::new(800.0, 800.0);
        let settings = EngineSettings {
            distance_labels_enabled: false,
            ..EngineSettings::default()
        };

        render_frame(&mut state, &mut surface, &config, &settings);
        assert!(surface.texts().all(|(_, text)| text != "12.3m"));
    }

    #[test]
    fn test_broker_and_node_labels() {
        let config = EngineConfig::default();
        let mut state = state_800(sample_nodes());
        let mut surface = DisplayList::new(800.0, 800.0);

        render_frame(&mut state, &mut surface, &config, &EngineSettings::default());

        let texts: Vec<&str> = surface.texts().map(|(_, text)| text).collect();
        assert!(texts.contains(&BROKER_LABEL));
        assert!(texts.contains(&"1"));
        assert!(texts.contains(&"2"));
        assert!(texts.contains(&"3"));
        assert_eq!(texts.iter().filter(|t| **t == "WiFi").count(), 2);
        assert_eq!(texts.iter().filter(|t| **t == "BLE").count(), 1);
    }

    #[test]
    fn test_node_glyph_colored_by_protocol_outlined_by_connectivity() {
        let config = EngineConfig::default();
        let mut state = state_800(sample_nodes());
        let mut surface = DisplayList::new(800.0, 800.0);

        render_frame(&mut state, &mut surface, &config, &EngineSettings::default());

        let node_circles: Vec<_> = surface
            .circles()
            .filter(|(_, radius, _)| *radius == NODE_RADIUS)
            .collect();
        assert_eq!(node_circles.len(), 6);
        assert_eq!(node_circles[0].2.color, protocol_color(Protocol::Ble));
        assert_eq!(node_circles[1].2.color, OUTLINE_CONNECTED);
        assert_eq!(node_circles[2].2.color, protocol_color(Protocol::WiFi));
        assert_eq!(node_circles[3].2.color, OUTLINE_DISCONNECTED);
    }

    #[test]
    fn test_overlay_drawn_last() {
        let config = EngineConfig::default();
        let mut state = state_800(sample_nodes());
        state
            .overlay
            .ingest(&MessageEvent::new(MessageKind::Publish, "ble_node_1"), Instant::now(), &config);
        let mut surface = DisplayList::new(800.0, 800.0);

        render_frame(&mut state, &mut surface, &config, &EngineSettings::default());

        let shapes = surface.shapes();
        let last_two = &shapes[shapes.len() - 2..];
        assert!(last_two
            .iter()
            .all(|shape| matches!(shape, Shape::Circle { .. })));
        // packet first, pulse last
        if let Shape::Circle { radius, .. } = &last_two[0] {
            assert_eq!(*radius, TokenKind::Packet.radius(0.0));
        }
        if let Shape::Circle { radius, .. } = &last_two[1] {
            assert!((radius - TokenKind::Pulse.radius(0.02)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_identical_snapshot_identical_geometry() {
        let config = EngineConfig::default();
        let mut state = state_800(sample_nodes());
        let mut first = DisplayList::new(800.0, 800.0);
        let mut second = DisplayList::new(800.0, 800.0);

        render_frame(&mut state, &mut first, &config, &EngineSettings::default());
        state.nodes = sample_nodes();
        render_frame(&mut state, &mut second, &config, &EngineSettings::default());

        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_surface_does_not_panic() {
        let config = EngineConfig::default();
        let mut state = EngineState::new(&config);
        state.nodes = sample_nodes();
        let mut surface = DisplayList::new(0.0, 0.0);

        let report = render_frame(&mut state, &mut surface, &config, &EngineSettings::default());
        assert_eq!(report.nodes, 3);
        assert_eq!(report.connected, 2);
        assert!(surface
            .lines()
            .all(|(from, to, _)| from == PixelPoint::default() && to == PixelPoint::default()));
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0.0m");
        assert_eq!(format_distance(7.26), "7.3m");
        assert_eq!(format_distance(-3.0), "0.0m");
    }
}
