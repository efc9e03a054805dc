// Topology feeds
//
// A feed is whatever produces node snapshots, broker moves and message
// events for the engine: a recorded dashboard session or the built-in demo
// simulation. The app polls the active feed once per loop iteration.

pub mod demo;
pub mod replay;

use crate::engine::{MessageEvent, Node, PlanePoint};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

pub use demo::{DemoConfig, DemoFeed};
pub use replay::ReplayFeed;

/// One change handed from a feed to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    /// Full replacement of the node snapshot
    Nodes(Vec<Node>),
    /// A message observed on the broker; ingest exactly once
    Message(MessageEvent),
    /// The broker moved on the simulation plane
    Broker(PlanePoint),
    /// Broker-wide counters, replacing the previous ones
    Stats(BrokerStats),
}

/// Counters a feed knows about the broker as a whole
///
/// Fields the source does not report stay `None`; the app falls back to
/// its own counts for those.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokerStats {
    pub total_messages: Option<u64>,
    /// Nodes acting as subscribers
    pub subscribers: usize,
    pub uptime: Option<Duration>,
}

/// Source of topology updates
pub trait Feed {
    /// Everything that became available up to `now`, in order
    fn poll(&mut self, now: Instant) -> Vec<FeedUpdate>;

    /// Short description for the status bar
    fn label(&self) -> String;

    /// No further updates will ever arrive
    fn is_exhausted(&self) -> bool {
        false
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Cannot read replay file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Record errors ────────────────────────────────────────────────
    #[error("Malformed record on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid feed setting: {message}")]
    Invalid { message: String },
}
