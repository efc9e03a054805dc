// Theme functions
//
// Color lookups for protocols and message kinds, plus the blending helpers
// the terminal painter uses to emulate alpha.

use ratatui::style::Color;

use super::{BACKGROUND, BLE_BLUE, BONE_WHITE, NEON_PURPLE, TOXIC_GREEN, WIFI_GREEN};
use crate::engine::{MessageKind, Protocol};

/// Fill color of a node glyph
pub fn protocol_color(protocol: Protocol) -> Color {
    match protocol {
        Protocol::Ble => BLE_BLUE,
        Protocol::WiFi => WIFI_GREEN,
    }
}

/// Color of the pulse spawned for a message kind
pub fn message_color(kind: MessageKind) -> Color {
    match kind {
        MessageKind::Publish => Color::Rgb(245, 158, 11),
        MessageKind::Subscribe => NEON_PURPLE,
        MessageKind::Received => Color::Rgb(59, 130, 246),
        MessageKind::Puback => Color::Rgb(34, 211, 238),
        MessageKind::Connect => TOXIC_GREEN,
        MessageKind::System | MessageKind::Unknown => BONE_WHITE,
    }
}

/// Interpolate between two RGB colors based on a ratio (0.0 ~ 1.0)
///
/// # Arguments
/// * `color1` - Starting color as (r, g, b) tuple
/// * `color2` - Ending color as (r, g, b) tuple
/// * `ratio` - Interpolation ratio (0.0 = color1, 1.0 = color2)
///
/// # Returns
/// Interpolated Color::Rgb value
pub fn interpolate_color(color1: (u8, u8, u8), color2: (u8, u8, u8), ratio: f32) -> Color {
    let ratio = ratio.clamp(0.0, 1.0);
    let r = (color1.0 as f32 + (color2.0 as f32 - color1.0 as f32) * ratio) as u8;
    let g = (color1.1 as f32 + (color2.1 as f32 - color1.1 as f32) * ratio) as u8;
    let b = (color1.2 as f32 + (color2.2 as f32 - color1.2 as f32) * ratio) as u8;
    Color::Rgb(r, g, b)
}

/// Emulate `alpha` on a terminal by blending `color` toward the background
///
/// Non-RGB colors have no channels to blend; they are returned as-is above
/// half opacity and replaced by the background below it.
pub fn fade(color: Color, alpha: f64) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    match (color, BACKGROUND) {
        (Color::Rgb(r, g, b), Color::Rgb(br, bg, bb)) => {
            interpolate_color((br, bg, bb), (r, g, b), alpha as f32)
        }
        _ if alpha >= 0.5 => color,
        _ => BACKGROUND,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_color_endpoints() {
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 0.0), Color::Rgb(0, 0, 0));
        assert_eq!(
            interpolate_color((0, 0, 0), (200, 100, 50), 1.0),
            Color::Rgb(200, 100, 50)
        );
        assert_eq!(
            interpolate_color((0, 0, 0), (200, 100, 50), 0.5),
            Color::Rgb(100, 50, 25)
        );
    }

    #[test]
    fn test_fade_full_and_zero_alpha() {
        assert_eq!(fade(BLE_BLUE, 1.0), BLE_BLUE);
        assert_eq!(fade(BLE_BLUE, 0.0), BACKGROUND);
    }

    #[test]
    fn test_fade_named_color() {
        assert_eq!(fade(Color::Red, 0.9), Color::Red);
        assert_eq!(fade(Color::Red, 0.1), BACKGROUND);
    }

    #[test]
    fn test_protocol_colors_differ() {
        assert_ne!(protocol_color(Protocol::Ble), protocol_color(Protocol::WiFi));
    }

    #[test]
    fn test_publish_and_connect_pulse_colors_differ() {
        assert_ne!(
            message_color(MessageKind::Publish),
            message_color(MessageKind::Connect)
        );
    }
}
