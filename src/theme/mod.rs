// Theme module - Color constants and theme re-exports
//
// This module provides the color palette used by the topology canvas and
// the status bar. Node colors follow the dashboard convention: BLE blue,
// WiFi green, broker red.

pub mod default;

use ratatui::style::Color;

/// Canvas background; alpha is simulated by blending toward it
/// RGB: (22, 22, 30)
pub const BACKGROUND: Color = Color::Rgb(22, 22, 30);

/// Primary accent color - borders, titles, key hints
/// RGB: (187, 154, 247)
pub const NEON_PURPLE: Color = Color::Rgb(187, 154, 247);

/// Neutral text
/// RGB: (169, 177, 214)
pub const BONE_WHITE: Color = Color::Rgb(169, 177, 214);

/// Active/healthy indicator
/// RGB: (158, 206, 106)
pub const TOXIC_GREEN: Color = Color::Rgb(158, 206, 106);

/// Offline/disconnected indicator
/// RGB: (247, 118, 142)
pub const OFFLINE_RED: Color = Color::Rgb(247, 118, 142);

/// Broker glyph fill
/// RGB: (220, 38, 38)
pub const BROKER_RED: Color = Color::Rgb(220, 38, 38);

/// Broker glyph outline
/// RGB: (153, 27, 27)
pub const BROKER_OUTLINE: Color = Color::Rgb(153, 27, 27);

/// BLE node fill
/// RGB: (37, 99, 235)
pub const BLE_BLUE: Color = Color::Rgb(37, 99, 235);

/// WiFi node fill
/// RGB: (22, 163, 74)
pub const WIFI_GREEN: Color = Color::Rgb(22, 163, 74);

/// Outline of a connected node
/// RGB: (229, 231, 235)
pub const OUTLINE_CONNECTED: Color = Color::Rgb(229, 231, 235);

/// Outline of a disconnected node
/// RGB: (107, 114, 128)
pub const OUTLINE_DISCONNECTED: Color = Color::Rgb(107, 114, 128);

/// Broker link of a connected node
/// RGB: (156, 163, 175)
pub const LINK_CONNECTED: Color = Color::Rgb(156, 163, 175);

/// Broker link of a disconnected node
/// RGB: (75, 85, 99)
pub const LINK_IDLE: Color = Color::Rgb(75, 85, 99);

/// Label text under nodes and on links
/// RGB: (209, 213, 219)
pub const LABEL_TEXT: Color = Color::Rgb(209, 213, 219);

/// Secondary label text (protocol tag, distances)
/// RGB: (156, 163, 175)
pub const LABEL_MUTED: Color = Color::Rgb(156, 163, 175);

/// Node -> broker packet tokens
/// RGB: (245, 158, 11)
pub const PACKET_AMBER: Color = Color::Rgb(245, 158, 11);

/// Broker -> node ack tokens
/// RGB: (34, 211, 238)
pub const ACK_CYAN: Color = Color::Rgb(34, 211, 238);

// Re-export theme functions for convenient access
pub use default::*;
