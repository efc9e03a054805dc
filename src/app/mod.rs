// Application state management
//
// This module contains the main AppState struct: the frame loop, the active
// feed, the recorded frame the UI paints, the message log and broker stats
// shown in the sidebar, and frame timing. Configuration types live in the
// config submodule.

pub mod config;
pub mod event;

pub use config::{AppConfig, FeedSource};

use crate::engine::{
    DisplayList, EngineConfig, FrameLoop, MessageEvent, Node, Surface, TickOutcome,
};
use crate::feed::{BrokerStats, DemoFeed, Feed, FeedError, FeedUpdate, ReplayFeed};
use config::{
    FPS_WINDOW, FRAME_TIME_THRESHOLD_MS, MESSAGE_LOG_CAPACITY, SLOW_FRAME_COUNT_THRESHOLD,
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One message as it arrived, for the sidebar log
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedMessage {
    /// Time since the first feed poll
    pub at: Duration,
    pub message: MessageEvent,
}

/// Main application state
pub struct AppState {
    /// Whether the application is running
    pub running: bool,

    /// Engine driver; owns the topology snapshot and the animation overlay
    pub frame_loop: FrameLoop,

    /// Source of snapshots and messages
    feed: Box<dyn Feed>,

    /// Last frame as recorded by the engine, painted by the UI
    pub display: DisplayList,

    /// Outcome of the most recent tick
    pub last_outcome: Option<TickOutcome>,

    /// Most recent messages, oldest first, capped at `MESSAGE_LOG_CAPACITY`
    pub message_log: VecDeque<LoggedMessage>,

    /// Total messages received from the feed
    pub messages_seen: u64,

    /// Latest broker counters from the feed, if it reports any
    pub stats: Option<BrokerStats>,

    /// First feed poll; uptime is measured from here
    started_at: Option<Instant>,

    /// Timestamp of the last drawn frame
    last_frame_time: Option<Instant>,

    /// Recent frame durations for the FPS readout
    frame_times: VecDeque<Duration>,

    /// Counter for consecutive slow frames (frame time > 100ms)
    slow_frame_count: u32,

    /// Whether glow was auto-disabled because frames were too slow
    pub glow_reduced: bool,
}

impl AppState {
    /// Create the app with the feed described by `config`
    pub fn new(config: &AppConfig) -> Result<Self, FeedError> {
        let feed: Box<dyn Feed> = match &config.feed {
            FeedSource::Demo(demo) => Box::new(DemoFeed::new(demo.clone())?),
            FeedSource::Replay { path, rate } => Box::new(ReplayFeed::open(path, *rate)?),
        };
        Ok(Self::with_feed(feed, config.frame_interval()))
    }

    pub fn with_feed(feed: Box<dyn Feed>, frame_interval: Duration) -> Self {
        let frame_loop =
            FrameLoop::new(EngineConfig::terminal()).with_frame_interval(frame_interval);
        Self {
            running: true,
            frame_loop,
            feed,
            display: DisplayList::default(),
            last_outcome: None,
            message_log: VecDeque::with_capacity(MESSAGE_LOG_CAPACITY),
            messages_seen: 0,
            stats: None,
            started_at: None,
            last_frame_time: None,
            frame_times: VecDeque::with_capacity(FPS_WINDOW),
            slow_frame_count: 0,
            glow_reduced: false,
        }
    }

    /// Pull everything the feed has for `now` into the engine
    ///
    /// Node snapshots replace the previous one wholesale; each message is
    /// handed to the engine exactly once. Returns the number of updates.
    pub fn pump_feed(&mut self, now: Instant) -> usize {
        if self.frame_loop.is_stopped() {
            return 0;
        }

        let started = *self.started_at.get_or_insert(now);
        let updates = self.feed.poll(now);
        let count = updates.len();
        for update in updates {
            match update {
                FeedUpdate::Nodes(nodes) => self.frame_loop.set_nodes(nodes),
                FeedUpdate::Broker(position) => self.frame_loop.set_broker_position(position),
                FeedUpdate::Stats(stats) => self.stats = Some(stats),
                FeedUpdate::Message(message) => {
                    self.messages_seen += 1;
                    self.frame_loop.observe_message(&message, now);
                    self.log_message(message, now.saturating_duration_since(started));
                }
            }
        }
        count
    }

    fn log_message(&mut self, message: MessageEvent, at: Duration) {
        if self.message_log.len() == MESSAGE_LOG_CAPACITY {
            self.message_log.pop_front();
        }
        self.message_log.push_back(LoggedMessage { at, message });
    }

    /// Most recent message ingested, shown in the canvas title
    pub fn last_message(&self) -> Option<&MessageEvent> {
        self.message_log.back().map(|entry| &entry.message)
    }

    /// Current node snapshot
    pub fn nodes(&self) -> &[Node] {
        self.frame_loop.nodes()
    }

    /// Uptime as reported by the feed, else time since the first poll
    pub fn uptime(&self, now: Instant) -> Duration {
        if let Some(uptime) = self.stats.and_then(|stats| stats.uptime) {
            return uptime;
        }
        self.started_at
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or_default()
    }

    /// Message total as reported by the feed, else the messages seen here
    pub fn total_messages(&self) -> u64 {
        self.stats
            .and_then(|stats| stats.total_messages)
            .unwrap_or(self.messages_seen)
    }

    pub fn subscribers(&self) -> usize {
        self.stats.map(|stats| stats.subscribers).unwrap_or_default()
    }

    /// Run one engine tick against the recorded display list
    ///
    /// `attached` is false when the canvas has no drawable area; the loop
    /// then goes idle instead of drawing.
    pub fn render_frame(&mut self, now: Instant, attached: bool) -> TickOutcome {
        let surface = if attached {
            Some(&mut self.display as &mut dyn Surface)
        } else {
            None
        };
        let outcome = self.frame_loop.tick(now, surface);
        if matches!(outcome, TickOutcome::Scheduled(_)) {
            self.update_frame_time(now);
        }
        self.last_outcome = Some(outcome);
        outcome
    }

    /// Stop the engine and leave the main loop
    pub fn quit(&mut self) {
        self.frame_loop.stop();
        self.running = false;
    }

    pub fn feed_label(&self) -> String {
        self.feed.label()
    }

    pub fn feed_exhausted(&self) -> bool {
        self.feed.is_exhausted()
    }

    /// Average frames per second over the recent window
    pub fn fps(&self) -> f64 {
        let total: Duration = self.frame_times.iter().sum();
        if total.is_zero() {
            return 0.0;
        }
        self.frame_times.len() as f64 / total.as_secs_f64()
    }

    /// Track frame time and drop glow if frames keep running slow
    ///
    /// Glow doubles the circles drawn per token, so it is the first thing
    /// to go when the terminal cannot keep up.
    pub fn update_frame_time(&mut self, now: Instant) {
        let Some(last) = self.last_frame_time.replace(now) else {
            return;
        };
        let frame_time = now.saturating_duration_since(last);

        if self.frame_times.len() == FPS_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);

        let frame_ms = frame_time.as_millis();
        if frame_ms > FRAME_TIME_THRESHOLD_MS {
            self.slow_frame_count += 1;

            if self.slow_frame_count >= SLOW_FRAME_COUNT_THRESHOLD && !self.glow_reduced {
                self.glow_reduced = true;
                self.frame_loop.settings_mut().glow_enabled = false;
                tracing::info!(
                    frame_time_ms = frame_ms,
                    slow_frame_count = self.slow_frame_count,
                    "Disabling glow due to slow frame times"
                );
            }
        } else if !self.glow_reduced {
            self.slow_frame_count = 0;
        }
    }

    /// Forget the automatic glow reduction (after a manual toggle)
    pub fn reset_glow_reduction(&mut self) {
        self.glow_reduced = false;
        self.slow_frame_count = 0;
    }
}

/// Feed that hands out a fixed list of batches, one batch per poll
#[cfg(test)]
pub(crate) struct ScriptedFeed {
    batches: VecDeque<Vec<FeedUpdate>>,
}

#[cfg(test)]
impl ScriptedFeed {
    pub(crate) fn new(batches: Vec<Vec<FeedUpdate>>) -> Self {
        Self {
            batches: batches.into(),
        }
    }
}

#[cfg(test)]
impl Feed for ScriptedFeed {
    fn poll(&mut self, _now: Instant) -> Vec<FeedUpdate> {
        self.batches.pop_front().unwrap_or_default()
    }

    fn label(&self) -> String {
        "scripted".to_string()
    }

    fn is_exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}
