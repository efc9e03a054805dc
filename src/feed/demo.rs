// Demo feed
//
// A small synthetic broker network for running the visualizer without a
// recording. Everything is drawn from a seeded StdRng, so a given seed and
// poll schedule always produce the same session.

use super::{BrokerStats, Feed, FeedError, FeedUpdate};
use crate::engine::{MessageEvent, MessageKind, Node, PlanePoint, Protocol};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// Number of simulated nodes, alternating BLE and WiFi
    pub nodes: usize,
    pub seed: u64,

    /// How often node positions and connectivity are re-sampled
    pub snapshot_interval: Duration,

    /// How often a connected node sends something
    pub message_interval: Duration,

    /// How often the broker moves to a new spot
    pub relocation_interval: Duration,

    /// Every `dropout_every` snapshots the last node vanishes for
    /// `dropout_len` snapshots
    pub dropout_every: u32,
    pub dropout_len: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            nodes: 6,
            seed: 7,
            snapshot_interval: Duration::from_millis(500),
            message_interval: Duration::from_millis(400),
            relocation_interval: Duration::from_secs(20),
            dropout_every: 16,
            dropout_len: 6,
        }
    }
}

/// Per-step probability that a connected node drops off
const DISCONNECT_CHANCE: f64 = 0.04;

/// Per-step probability that a disconnected node comes back
const RECONNECT_CHANCE: f64 = 0.3;

/// Largest random-walk step per snapshot, plane units
const WALK_STEP: f64 = 12.0;

/// Nodes and the broker stay inside this band of the plane
const PLANE_MARGIN: f64 = 100.0;
const BROKER_MARGIN: f64 = 300.0;

const PLANE_EXTENT: f64 = crate::engine::config::PLANE_EXTENT;

// ============================================================================
// Simulation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DemoEvent {
    Snapshot,
    Message,
    Relocation,
}

#[derive(Debug)]
pub struct DemoFeed {
    config: DemoConfig,
    rng: StdRng,
    nodes: Vec<Node>,
    broker: PlanePoint,
    step: u32,
    clock: Option<DemoClock>,

    /// Messages sent so far and the nodes that have subscribed
    sent: u64,
    subscribers: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy)]
struct DemoClock {
    started: Instant,
    next_snapshot: Instant,
    next_message: Instant,
    next_relocation: Instant,
}

impl DemoClock {
    /// Earliest scheduled event due at or before `now`
    fn due(&self, now: Instant) -> Option<DemoEvent> {
        [
            (self.next_snapshot, DemoEvent::Snapshot),
            (self.next_message, DemoEvent::Message),
            (self.next_relocation, DemoEvent::Relocation),
        ]
        .into_iter()
        .filter(|(at, _)| *at <= now)
        .min_by_key(|(at, _)| *at)
        .map(|(_, event)| event)
    }
}

impl DemoFeed {
    pub fn new(config: DemoConfig) -> Result<Self, FeedError> {
        let intervals = [
            config.snapshot_interval,
            config.message_interval,
            config.relocation_interval,
        ];
        if intervals.iter().any(Duration::is_zero) {
            return Err(FeedError::Invalid {
                message: "demo intervals must be non-zero".to_string(),
            });
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let nodes = (0..config.nodes)
            .map(|i| {
                let (prefix, protocol) = if i % 2 == 0 {
                    ("ble_node", Protocol::Ble)
                } else {
                    ("wifi_node", Protocol::WiFi)
                };
                let x = rng.gen_range(PLANE_MARGIN..PLANE_EXTENT - PLANE_MARGIN);
                let y = rng.gen_range(PLANE_MARGIN..PLANE_EXTENT - PLANE_MARGIN);
                Node::new(format!("{prefix}_{}", i + 1), protocol).with_position(x, y)
            })
            .collect();

        let center = PLANE_EXTENT / 2.0;
        let mut feed = Self {
            config,
            rng,
            nodes,
            broker: PlanePoint::new(center, center),
            step: 0,
            clock: None,
            sent: 0,
            subscribers: BTreeSet::new(),
        };
        feed.update_distances();
        Ok(feed)
    }

    /// Nodes currently shown, honoring the periodic dropout
    fn visible_nodes(&self) -> Vec<Node> {
        let mut visible = self.nodes.clone();
        if self.in_dropout() {
            visible.pop();
        }
        visible
    }

    fn in_dropout(&self) -> bool {
        let every = self.config.dropout_every;
        every > 0 && self.step >= every && self.step % every < self.config.dropout_len
    }

    fn update_distances(&mut self) {
        let broker = self.broker;
        for node in &mut self.nodes {
            node.distance = node.position.map(|p| p.distance(&broker));
        }
    }

    /// Random-walk positions and flip connectivity; returns CONNECT events
    /// for nodes that came back
    fn step_snapshot(&mut self) -> Vec<MessageEvent> {
        self.step += 1;
        let hidden = self
            .in_dropout()
            .then(|| self.nodes.len().saturating_sub(1));
        let mut reconnected = Vec::new();

        for (index, node) in self.nodes.iter_mut().enumerate() {
            if let Some(position) = node.position.as_mut() {
                position.x = (position.x + self.rng.gen_range(-WALK_STEP..=WALK_STEP))
                    .clamp(PLANE_MARGIN, PLANE_EXTENT - PLANE_MARGIN);
                position.y = (position.y + self.rng.gen_range(-WALK_STEP..=WALK_STEP))
                    .clamp(PLANE_MARGIN, PLANE_EXTENT - PLANE_MARGIN);
            }

            if node.connected {
                if self.rng.gen_bool(DISCONNECT_CHANCE) {
                    node.connected = false;
                    tracing::debug!(node = %node.id, "demo node disconnected");
                }
            } else if self.rng.gen_bool(RECONNECT_CHANCE) {
                node.connected = true;
                if hidden != Some(index) {
                    reconnected.push(MessageEvent::new(MessageKind::Connect, node.id.clone()));
                }
            }
        }

        self.update_distances();
        reconnected
    }

    /// A PUBLISH or SUBSCRIBE from a random visible, connected node
    fn next_message(&mut self, timestamp: f64) -> Option<MessageEvent> {
        let candidates: Vec<Node> = self
            .visible_nodes()
            .into_iter()
            .filter(|node| node.connected)
            .collect();
        let sender = candidates.choose(&mut self.rng)?;

        let mut message = if self.rng.gen_bool(0.8) {
            let reading: f64 = self.rng.gen_range(18.0..28.0);
            let mut message = MessageEvent::new(MessageKind::Publish, sender.id.clone())
                .with_topic(format!("sensors/{}/temperature", sender.id));
            message.payload = Some(format!("{reading:.1}"));
            message.qos = 1;
            message
        } else {
            MessageEvent::new(MessageKind::Subscribe, sender.id.clone()).with_topic("sensors/#")
        };
        message.timestamp = timestamp;
        self.sent += 1;
        if message.kind == MessageKind::Subscribe {
            self.subscribers.insert(sender.id.clone());
        }
        Some(message)
    }

    fn stats(&self) -> BrokerStats {
        BrokerStats {
            total_messages: Some(self.sent),
            subscribers: self.subscribers.len(),
            uptime: None,
        }
    }

    fn relocate_broker(&mut self) -> PlanePoint {
        let x = self.rng.gen_range(BROKER_MARGIN..PLANE_EXTENT - BROKER_MARGIN);
        let y = self.rng.gen_range(BROKER_MARGIN..PLANE_EXTENT - BROKER_MARGIN);
        self.broker = PlanePoint::new(x, y);
        self.update_distances();
        tracing::info!(x, y, "demo broker relocated");
        self.broker
    }
}

impl Feed for DemoFeed {
    fn poll(&mut self, now: Instant) -> Vec<FeedUpdate> {
        let mut updates = Vec::new();

        let mut clock = match self.clock {
            Some(clock) => clock,
            None => {
                updates.push(FeedUpdate::Broker(self.broker));
                updates.push(FeedUpdate::Nodes(self.visible_nodes()));
                DemoClock {
                    started: now,
                    next_snapshot: now + self.config.snapshot_interval,
                    next_message: now + self.config.message_interval,
                    next_relocation: now + self.config.relocation_interval,
                }
            }
        };

        while let Some(event) = clock.due(now) {
            match event {
                DemoEvent::Snapshot => {
                    let reconnected = self.step_snapshot();
                    updates.push(FeedUpdate::Nodes(self.visible_nodes()));
                    updates.push(FeedUpdate::Stats(self.stats()));
                    updates.extend(reconnected.into_iter().map(FeedUpdate::Message));
                    clock.next_snapshot += self.config.snapshot_interval;
                }
                DemoEvent::Message => {
                    let elapsed = (clock.next_message - clock.started).as_secs_f64();
                    if let Some(message) = self.next_message(elapsed) {
                        updates.push(FeedUpdate::Message(message));
                    }
                    clock.next_message += self.config.message_interval;
                }
                DemoEvent::Relocation => {
                    let position = self.relocate_broker();
                    updates.push(FeedUpdate::Broker(position));
                    updates.push(FeedUpdate::Nodes(self.visible_nodes()));
                    clock.next_relocation += self.config.relocation_interval;
                }
            }
        }

        self.clock = Some(clock);
        updates
    }

    fn label(&self) -> String {
        format!("demo seed={} nodes={}", self.config.seed, self.config.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(feed: &mut DemoFeed, seconds: u64) -> Vec<FeedUpdate> {
        let t0 = Instant::now();
        let mut updates = Vec::new();
        for tick in 0..=(seconds * 10) {
            updates.extend(feed.poll(t0 + Duration::from_millis(tick * 100)));
        }
        updates
    }

    #[test]
    fn test_first_poll_emits_broker_and_nodes() {
        let mut feed = DemoFeed::new(DemoConfig::default()).unwrap();
        let updates = feed.poll(Instant::now());

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0], FeedUpdate::Broker(PlanePoint::new(500.0, 500.0)));
        let FeedUpdate::Nodes(nodes) = &updates[1] else {
            panic!("expected a node snapshot");
        };
        assert_eq!(nodes.len(), 6);
        assert_eq!(nodes[0].protocol, Protocol::Ble);
        assert_eq!(nodes[1].protocol, Protocol::WiFi);
        assert_eq!(nodes[1].id, "wifi_node_2");
        assert!(nodes.iter().all(|n| n.position.is_some() && n.distance.is_some()));
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = DemoFeed::new(DemoConfig::default()).unwrap();
        let mut b = DemoFeed::new(DemoConfig::default()).unwrap();
        let run_a = run(&mut a, 30);
        let run_b = run(&mut b, 30);

        // Message timestamps are relative to the first poll, so runs compare equal
        assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_messages_come_from_visible_connected_nodes() {
        let mut feed = DemoFeed::new(DemoConfig::default()).unwrap();
        let mut snapshot: Vec<Node> = Vec::new();
        let mut messages = 0;

        for update in run(&mut feed, 30) {
            match update {
                FeedUpdate::Nodes(nodes) => snapshot = nodes,
                FeedUpdate::Message(message) => {
                    messages += 1;
                    let sender = message.sender().unwrap();
                    let node = snapshot.iter().find(|n| n.id == sender);
                    assert!(node.is_some_and(|n| n.connected), "{sender} not visible/connected");
                }
                FeedUpdate::Broker(_) | FeedUpdate::Stats(_) => {}
            }
        }
        assert!(messages > 10);
    }

    #[test]
    fn test_stats_count_messages_and_subscribers() {
        let mut feed = DemoFeed::new(DemoConfig::default()).unwrap();
        let updates = run(&mut feed, 30);

        let mut sent = 0u64;
        let mut subscribers = BTreeSet::new();
        let mut last_stats = None;
        for update in &updates {
            match update {
                FeedUpdate::Message(message) if message.kind != MessageKind::Connect => {
                    sent += 1;
                    if message.kind == MessageKind::Subscribe {
                        subscribers.insert(message.sender().unwrap().to_string());
                    }
                }
                FeedUpdate::Stats(stats) => last_stats = Some(*stats),
                _ => {}
            }
        }

        let stats = last_stats.unwrap();
        // The last snapshot can trail the last few messages
        assert!(stats.total_messages.unwrap() <= sent);
        assert!(stats.total_messages.unwrap() + 3 >= sent);
        assert!(stats.subscribers <= subscribers.len());
        assert_eq!(stats.uptime, None);
        assert_eq!(feed.stats().total_messages, Some(sent));
        assert_eq!(feed.stats().subscribers, subscribers.len());
    }

    #[test]
    fn test_last_node_drops_out_and_returns() {
        let mut feed = DemoFeed::new(DemoConfig::default()).unwrap();
        let sizes: Vec<usize> = run(&mut feed, 30)
            .into_iter()
            .filter_map(|update| match update {
                FeedUpdate::Nodes(nodes) => Some(nodes.len()),
                _ => None,
            })
            .collect();

        let first_drop = sizes.iter().position(|&n| n == 5).unwrap();
        assert!(sizes[first_drop..].contains(&6));
    }

    #[test]
    fn test_broker_relocates_within_band() {
        let config = DemoConfig {
            relocation_interval: Duration::from_secs(5),
            ..DemoConfig::default()
        };
        let mut feed = DemoFeed::new(config).unwrap();
        let moves: Vec<PlanePoint> = run(&mut feed, 12)
            .into_iter()
            .filter_map(|update| match update {
                FeedUpdate::Broker(position) => Some(position),
                _ => None,
            })
            .collect();

        // initial + two relocations
        assert_eq!(moves.len(), 3);
        for position in &moves[1..] {
            assert!((BROKER_MARGIN..=PLANE_EXTENT - BROKER_MARGIN).contains(&position.x));
            assert!((BROKER_MARGIN..=PLANE_EXTENT - BROKER_MARGIN).contains(&position.y));
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = DemoConfig {
            message_interval: Duration::ZERO,
            ..DemoConfig::default()
        };
        assert!(matches!(DemoFeed::new(config), Err(FeedError::Invalid { .. })));
    }

    #[test]
    fn test_zero_nodes_emits_no_messages() {
        let config = DemoConfig {
            nodes: 0,
            ..DemoConfig::default()
        };
        let mut feed = DemoFeed::new(config).unwrap();
        assert!(run(&mut feed, 5)
            .iter()
            .all(|update| !matches!(update, FeedUpdate::Message(_))));
    }
}
