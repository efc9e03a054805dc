// Replay feed
//
// Plays back a recorded dashboard session stored as newline-delimited JSON,
// one wire record per line, releasing lines at a fixed rate.

use super::{BrokerStats, Feed, FeedError, FeedUpdate};
use crate::engine::{MessageEvent, MessageKind, Node, PlanePoint};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Fastest accepted replay speed, in records per second
pub const MAX_REPLAY_RATE: f64 = 10_000.0;

/// One line of the dashboard wire format
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireRecord {
    Init(WireSnapshot),
    Update(WireSnapshot),
    Message(WireMessage),
    BrokerMoved { position: PlanePoint },
}

#[derive(Debug, Deserialize)]
struct WireSnapshot {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    broker_position: Option<PlanePoint>,
    #[serde(default)]
    stats: Option<WireStats>,
}

/// Dashboard stats block; `total_subscriptions` counts subscriber nodes
#[derive(Debug, Deserialize)]
struct WireStats {
    #[serde(default)]
    total_messages: Option<u64>,
    #[serde(default)]
    total_subscriptions: usize,
    /// Seconds since the simulation started
    #[serde(default)]
    uptime: Option<u64>,
}

impl From<WireStats> for BrokerStats {
    fn from(wire: WireStats) -> Self {
        BrokerStats {
            total_messages: wire.total_messages,
            subscribers: wire.total_subscriptions,
            uptime: wire.uptime.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    msg_type: MessageKind,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    payload: Option<serde_json::Value>,
    #[serde(default)]
    qos: u8,
    #[serde(default)]
    timestamp: f64,
}

impl From<WireMessage> for MessageEvent {
    fn from(wire: WireMessage) -> Self {
        let payload = wire.payload.and_then(|value| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Some(text),
            other => Some(other.to_string()),
        });
        MessageEvent {
            kind: wire.msg_type,
            from: wire.from,
            to: wire.to.filter(|to| !to.is_empty()),
            timestamp: wire.timestamp,
            topic: wire.topic.filter(|topic| !topic.is_empty()),
            payload,
            qos: wire.qos,
        }
    }
}

/// Parse one wire record into engine updates
///
/// Blank lines yield nothing. `line` is 1-based and only used for errors.
pub fn parse_record(line: usize, text: &str) -> Result<Vec<FeedUpdate>, FeedError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let record: WireRecord =
        serde_json::from_str(text).map_err(|source| FeedError::Parse { line, source })?;

    Ok(match record {
        WireRecord::Init(snapshot) | WireRecord::Update(snapshot) => {
            let mut updates = Vec::with_capacity(3);
            if let Some(position) = snapshot.broker_position {
                updates.push(FeedUpdate::Broker(position));
            }
            updates.push(FeedUpdate::Nodes(snapshot.nodes));
            if let Some(stats) = snapshot.stats {
                updates.push(FeedUpdate::Stats(stats.into()));
            }
            updates
        }
        WireRecord::Message(message) => vec![FeedUpdate::Message(message.into())],
        WireRecord::BrokerMoved { position } => vec![FeedUpdate::Broker(position)],
    })
}

/// Recorded session played back at `rate` lines per second
///
/// The first line is released on the first poll; the clock starts there.
#[derive(Debug)]
pub struct ReplayFeed {
    name: String,
    lines: Vec<String>,
    cursor: usize,
    rate: f64,
    started: Option<Instant>,
    skipped: usize,
}

impl ReplayFeed {
    pub fn open(path: &Path, rate: f64) -> Result<Self, FeedError> {
        let text = std::fs::read_to_string(path).map_err(|source| FeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let feed = Self::from_text(name, &text, rate)?;
        if feed.is_empty() {
            tracing::warn!(path = %path.display(), "replay file has no records");
        }
        tracing::info!(path = %path.display(), lines = feed.lines.len(), rate, "replay loaded");
        Ok(feed)
    }

    pub fn from_text(name: impl Into<String>, text: &str, rate: f64) -> Result<Self, FeedError> {
        if !(rate.is_finite() && rate > 0.0 && rate <= MAX_REPLAY_RATE) {
            return Err(FeedError::Invalid {
                message: format!("replay rate must be in (0, {MAX_REPLAY_RATE}], got {rate}"),
            });
        }
        Ok(Self {
            name: name.into(),
            lines: text.lines().map(str::to_owned).collect(),
            cursor: 0,
            rate,
            started: None,
            skipped: 0,
        })
    }

    /// Lines released so far, including skipped ones
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Malformed lines dropped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// How many lines should have been released by `now`
    fn due(&self, started: Instant, now: Instant) -> usize {
        let total = self.lines.len();
        let elapsed = now.saturating_duration_since(started).as_secs_f64();
        // Clamp before the cast so a long session can never overflow the count
        let released = (elapsed * self.rate).floor().min(total as f64);
        (released as usize).saturating_add(1).min(total)
    }
}

impl Feed for ReplayFeed {
    fn poll(&mut self, now: Instant) -> Vec<FeedUpdate> {
        let started = *self.started.get_or_insert(now);
        let due = self.due(started, now);

        let mut updates = Vec::new();
        while self.cursor < due {
            let line = self.cursor + 1;
            match parse_record(line, &self.lines[self.cursor]) {
                Ok(parsed) => updates.extend(parsed),
                Err(err) => {
                    self.skipped += 1;
                    tracing::warn!(line, error = %err, "skipping malformed replay record");
                }
            }
            self.cursor += 1;
        }

        if self.is_exhausted() && !updates.is_empty() {
            tracing::info!(skipped = self.skipped(), "replay finished");
        }
        updates
    }

    fn label(&self) -> String {
        format!("replay {} ({}/{})", self.name, self.position(), self.len())
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.lines.len()
    }
}
