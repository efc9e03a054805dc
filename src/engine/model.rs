// Topology snapshot types
//
// Nodes, broker position and message events as handed to the engine by the
// simulation feed. The engine never creates or deletes nodes; it renders
// whatever snapshot it was given last.

use serde::Deserialize;
use std::fmt;

/// A point on the simulation plane (logical units, 0..=1000 on both axes)
///
/// Deserializes from the `[x, y]` pair used by the dashboard wire format.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[f64; 2]")]
pub struct PlanePoint {
    pub x: f64,
    pub y: f64,
}

impl PlanePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates into `[0, extent]`
    pub fn clamped(self, extent: f64) -> Self {
        Self {
            x: self.x.clamp(0.0, extent),
            y: self.y.clamp(0.0, extent),
        }
    }

    /// Euclidean distance to another plane point
    pub fn distance(&self, other: &PlanePoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<[f64; 2]> for PlanePoint {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Radio protocol a node uses to reach the broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Protocol {
    Ble,
    WiFi,
}

impl Protocol {
    /// Short tag drawn under the node glyph
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ble => "BLE",
            Self::WiFi => "WiFi",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl TryFrom<String> for Protocol {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "ble" => Ok(Self::Ble),
            "wifi" | "wi-fi" => Ok(Self::WiFi),
            other => Err(format!("unknown protocol {other:?}")),
        }
    }
}

/// One peer node as reported by the simulation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    /// Identifier, unique among the currently visible nodes
    pub id: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub connected: bool,
    /// Explicit simulation-plane position; circular fallback when absent
    #[serde(default)]
    pub position: Option<PlanePoint>,
    /// Distance to the broker in meters, only used for the link label
    #[serde(default, rename = "distance_to_broker")]
    pub distance: Option<f64>,
}

impl Node {
    pub fn new(id: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            id: id.into(),
            protocol,
            connected: true,
            position: None,
            distance: None,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(PlanePoint::new(x, y));
        self
    }

    #[cfg(test)]
    pub(crate) fn with_distance(mut self, meters: f64) -> Self {
        self.distance = Some(meters);
        self
    }

    #[cfg(test)]
    pub(crate) fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    /// Suffix after the last separator, e.g. `ble_sensor_3` -> `3`
    pub fn short_id(&self) -> &str {
        self.id
            .rsplit(['_', '-', '/', ':'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(self.id.as_str())
    }
}

/// MQTT operation carried by a message event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    Publish,
    Subscribe,
    Received,
    Puback,
    Connect,
    System,
    /// Anything the feed sent that this engine does not know about
    #[serde(other)]
    Unknown,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "PUBLISH",
            Self::Subscribe => "SUBSCRIBE",
            Self::Received => "RECEIVED",
            Self::Puback => "PUBACK",
            Self::Connect => "CONNECT",
            Self::System => "SYSTEM",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// A single protocol event observed on the broker
#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub kind: MessageKind,
    pub from: Option<String>,
    pub to: Option<String>,
    /// Seconds since the epoch, as stamped by the producer
    pub timestamp: f64,
    pub topic: Option<String>,
    pub payload: Option<String>,
    pub qos: u8,
}

impl MessageEvent {
    pub fn new(kind: MessageKind, from: impl Into<String>) -> Self {
        Self {
            kind,
            from: Some(from.into()),
            to: None,
            timestamp: 0.0,
            topic: None,
            payload: None,
            qos: 0,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Sender identifier, ignoring empty strings
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether this event should spawn animation tokens at all
    pub fn is_animatable(&self) -> bool {
        self.kind != MessageKind::Unknown && self.sender().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id_takes_last_segment() {
        assert_eq!(Node::new("ble_sensor_3", Protocol::Ble).short_id(), "3");
        assert_eq!(Node::new("wifi-cam-12", Protocol::WiFi).short_id(), "12");
        assert_eq!(Node::new("gateway", Protocol::WiFi).short_id(), "gateway");
    }

    #[test]
    fn test_short_id_trailing_separator_keeps_full_id() {
        assert_eq!(Node::new("node_", Protocol::Ble).short_id(), "node_");
    }

    #[test]
    fn test_protocol_parse_case_insensitive() {
        assert_eq!(Protocol::try_from("BLE".to_string()), Ok(Protocol::Ble));
        assert_eq!(Protocol::try_from("WIFI".to_string()), Ok(Protocol::WiFi));
        assert_eq!(Protocol::try_from("WiFi".to_string()), Ok(Protocol::WiFi));
        assert!(Protocol::try_from("zigbee".to_string()).is_err());
    }

    #[test]
    fn test_node_deserializes_wire_shape() {
        let node: Node = serde_json::from_str(
            r#"{"id":"ble_node_1","protocol":"BLE","connected":true,
                "position":[200.0,300.0],"distance_to_broker":42.5,"battery":97}"#,
        )
        .unwrap();
        assert_eq!(node.id, "ble_node_1");
        assert_eq!(node.protocol, Protocol::Ble);
        assert!(node.connected);
        assert_eq!(node.position, Some(PlanePoint::new(200.0, 300.0)));
        assert_eq!(node.distance, Some(42.5));
    }

    #[test]
    fn test_node_optional_fields_default() {
        let node: Node = serde_json::from_str(r#"{"id":"w","protocol":"wifi"}"#).unwrap();
        assert!(!node.connected);
        assert_eq!(node.position, None);
        assert_eq!(node.distance, None);
    }

    #[test]
    fn test_message_kind_unknown_variant() {
        let kind: MessageKind = serde_json::from_str(r#""FAILOVER""#).unwrap();
        assert_eq!(kind, MessageKind::Unknown);
        let kind: MessageKind = serde_json::from_str(r#""PUBACK""#).unwrap();
        assert_eq!(kind, MessageKind::Puback);
    }

    #[test]
    fn test_message_without_sender_is_not_animatable() {
        let mut msg = MessageEvent::new(MessageKind::Publish, "");
        assert!(!msg.is_animatable());
        msg.from = None;
        assert!(!msg.is_animatable());
        let msg = MessageEvent::new(MessageKind::Unknown, "node_1");
        assert!(!msg.is_animatable());
        let msg = MessageEvent::new(MessageKind::Connect, "node_1");
        assert!(msg.is_animatable());
    }

    #[test]
    fn test_plane_point_clamped() {
        let p = PlanePoint::new(-5.0, 1200.0).clamped(1000.0);
        assert_eq!(p, PlanePoint::new(0.0, 1000.0));
    }
}
