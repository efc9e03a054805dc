// Engine configuration types
//
// This module contains the constants and configuration structs for:
// - The simulation plane and layout
// - Token advance rates, radii and the ack spawn delay
// - Runtime visual toggles

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Logical extent of the simulation plane on both axes
pub const PLANE_EXTENT: f64 = 1000.0;

/// Fallback circle radius as a fraction of min(W, H)
pub const LAYOUT_RADIUS_FACTOR: f64 = 0.35;

/// Delay between a message arriving and its ack token appearing
pub const ACK_DELAY: Duration = Duration::from_millis(300);

/// Progress added per frame to message pulses
pub const PULSE_RATE: f64 = 0.02;

/// Progress added per frame to node -> broker packets
pub const PACKET_RATE: f64 = 0.025;

/// Progress added per frame to broker -> node acks
pub const ACK_RATE: f64 = 0.03;

/// Pulse radius at progress 0 and progress 1
pub const PULSE_RADIUS_START: f64 = 30.0;
pub const PULSE_RADIUS_END: f64 = 50.0;

pub const PACKET_RADIUS: f64 = 10.0;
pub const ACK_RADIUS: f64 = 9.0;

/// Broker and node glyph radii
pub const BROKER_RADIUS: f64 = 35.0;
pub const NODE_RADIUS: f64 = 22.0;

/// Label offsets below a node glyph (short id, then protocol tag)
pub const NODE_LABEL_OFFSET: f64 = 36.0;
pub const PROTOCOL_LABEL_OFFSET: f64 = 50.0;

/// Fixed broker caption
pub const BROKER_LABEL: &str = "MQTT Broker";

/// Caption shown while the snapshot holds no nodes
pub const EMPTY_CAPTION: &str = "No nodes yet. Add nodes to the simulation to see the topology.";

// ============================================================================
// Configuration Structs
// ============================================================================

/// Fixed engine parameters
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub plane_extent: f64,
    pub layout_radius_factor: f64,
    pub ack_delay: Duration,
    pub pulse_rate: f64,
    pub packet_rate: f64,
    pub ack_rate: f64,

    /// Multiplier applied to every glyph radius and label offset
    /// 1.0 on pixel surfaces, smaller on Braille terminals
    pub glyph_scale: f64,
}

impl EngineConfig {
    /// Configuration for a Braille terminal canvas (2x4 dots per cell)
    pub fn terminal() -> Self {
        Self {
            glyph_scale: 0.2,
            ..Self::default()
        }
    }

    /// Scale a nominal pixel size by `glyph_scale`
    pub fn scaled(&self, size: f64) -> f64 {
        size * self.glyph_scale
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            plane_extent: PLANE_EXTENT,
            layout_radius_factor: LAYOUT_RADIUS_FACTOR,
            ack_delay: ACK_DELAY,
            pulse_rate: PULSE_RATE,
            packet_rate: PACKET_RATE,
            ack_rate: ACK_RATE,
            glyph_scale: 1.0,
        }
    }
}

/// Visual toggles that can change while the engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Spawn and draw animation tokens (toggle with 'a' key)
    pub animations_enabled: bool,

    /// Draw node id and protocol labels (toggle with 'l' key)
    pub labels_enabled: bool,

    /// Draw distance labels on broker links (toggle with 'd' key)
    pub distance_labels_enabled: bool,

    /// Draw the glow halo on packets and acks (toggle with 'g' key)
    pub glow_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            animations_enabled: true,
            labels_enabled: true,
            distance_labels_enabled: true,
            glow_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_config_only_changes_scale() {
        let term = EngineConfig::terminal();
        let default = EngineConfig::default();
        assert!(term.glyph_scale < default.glyph_scale);
        assert_eq!(term.ack_delay, default.ack_delay);
        assert_eq!(term.packet_rate, default.packet_rate);
    }

    #[test]
    fn test_scaled() {
        let config = EngineConfig {
            glyph_scale: 0.5,
            ..EngineConfig::default()
        };
        assert_eq!(config.scaled(NODE_RADIUS), 11.0);
    }
}
