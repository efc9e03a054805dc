// Frame loop driver
//
// Owns the engine state and decides, one tick at a time, whether another
// frame is due. The host (terminal UI, tests) supplies the clock and the
// surface; the loop never sleeps or spawns anything itself.

use super::config::{EngineConfig, EngineSettings};
use super::model::{MessageEvent, Node, PlanePoint};
use super::overlay::TokenCounts;
use super::render::{render_frame, EngineState, FrameReport};
use super::surface::Surface;
use std::time::{Duration, Instant};

/// Target interval between frames (~60 FPS)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Loop lifecycle; `Stopped` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// What the host should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was drawn; call `tick` again at the given instant
    Scheduled(Instant),
    /// No surface is attached; nothing drawn, nothing scheduled
    Idle,
    /// The loop was stopped; nothing will ever be drawn again
    Stopped,
}

#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    engine: EngineState,
    config: EngineConfig,
    settings: EngineSettings,
    frame_interval: Duration,
    next_deadline: Option<Instant>,
    last_report: FrameReport,
    frames: u64,
}

impl FrameLoop {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: LoopState::Running,
            engine: EngineState::new(&config),
            config,
            settings: EngineSettings::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            next_deadline: None,
            last_report: FrameReport::default(),
            frames: 0,
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Replace the node snapshot drawn from the next frame on
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        if self.is_stopped() {
            return;
        }
        self.engine.nodes = nodes;
    }

    pub fn set_broker_position(&mut self, position: PlanePoint) {
        if self.is_stopped() {
            return;
        }
        self.engine.broker = position.clamped(self.config.plane_extent);
    }

    /// Feed one message event to the overlay
    ///
    /// Ignored once stopped and while animations are disabled. Returns
    /// whether tokens were spawned.
    pub fn observe_message(&mut self, message: &MessageEvent, now: Instant) -> bool {
        if self.is_stopped() || !self.settings.animations_enabled {
            return false;
        }
        self.engine.overlay.ingest(message, now, &self.config)
    }

    /// Run one frame if the loop is running and a surface is present
    ///
    /// Order within a frame: remap to the surface's current size, fire due
    /// acks, then render. Resizes between two ticks collapse into the one
    /// size the surface reports here.
    pub fn tick(&mut self, now: Instant, surface: Option<&mut dyn Surface>) -> TickOutcome {
        if self.is_stopped() {
            return TickOutcome::Stopped;
        }
        let Some(surface) = surface else {
            if self.next_deadline.take().is_some() {
                tracing::debug!("surface detached, frame loop idle");
            }
            return TickOutcome::Idle;
        };

        let (width, height) = surface.size();
        if self.engine.mapper.resize(width, height) {
            tracing::debug!(width, height, "surface resized");
        }

        self.engine.overlay.drain_due(now, &self.config);
        self.last_report = render_frame(&mut self.engine, surface, &self.config, &self.settings);
        self.frames += 1;
        let evicted = self.last_report.evicted;
        if evicted.total() > 0 {
            tracing::trace!(
                expired = evicted.expired,
                orphaned = evicted.orphaned,
                "tokens evicted"
            );
        }

        let deadline = now + self.frame_interval;
        self.next_deadline = Some(deadline);
        TickOutcome::Scheduled(deadline)
    }

    /// Stop for good: drop the scheduled frame and every pending ack spawn
    pub fn stop(&mut self) {
        if self.is_stopped() {
            return;
        }
        self.state = LoopState::Stopped;
        self.next_deadline = None;
        let cancelled = self.engine.overlay.cancel_pending();
        tracing::info!(frames = self.frames, cancelled_acks = cancelled, "frame loop stopped");
    }

    /// Turning animations off clears every token and pending ack
    pub fn set_animations_enabled(&mut self, enabled: bool) {
        self.settings.animations_enabled = enabled;
        if !enabled {
            self.engine.overlay.clear();
        }
    }

    /// Drop all live tokens and pending acks
    pub fn reset_overlay(&mut self) {
        self.engine.overlay.clear();
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Mutable access for the label and glow toggles; use
    /// `set_animations_enabled` for the animation switch
    pub fn settings_mut(&mut self) -> &mut EngineSettings {
        &mut self.settings
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state == LoopState::Stopped
    }

    #[cfg(test)]
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.next_deadline
    }

    pub fn token_counts(&self) -> TokenCounts {
        self.engine.overlay.counts()
    }

    pub fn last_report(&self) -> FrameReport {
        self.last_report
    }

    #[cfg(test)]
    pub(crate) fn frames(&self) -> u64 {
        self.frames
    }

    /// Node snapshot drawn by the next frame
    pub fn nodes(&self) -> &[Node] {
        &self.engine.nodes
    }

    #[cfg(test)]
    pub(crate) fn surface_size(&self) -> (f64, f64) {
        self.engine.mapper.size()
    }

    #[cfg(test)]
    pub(crate) fn overlay(&self) -> &super::overlay::OverlayManager {
        &self.engine.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::BROKER_LABEL;
    use crate::engine::model::{MessageKind, Protocol};
    use crate::engine::overlay::TokenKind;
    use crate::engine::surface::DisplayList;
    use proptest::prelude::*;

    fn two_nodes() -> Vec<Node> {
        vec![
            Node::new("ble_node_1", Protocol::Ble),
            Node::new("wifi_node_2", Protocol::WiFi),
        ]
    }

    fn running_loop() -> FrameLoop {
        let mut frame_loop = FrameLoop::new(EngineConfig::default());
        frame_loop.set_nodes(two_nodes());
        frame_loop
    }

    fn publish(from: &str) -> MessageEvent {
        MessageEvent::new(MessageKind::Publish, from)
    }

    #[test]
    fn test_tick_schedules_next_frame() {
        let mut frame_loop = running_loop();
        let mut surface = DisplayList::new(800.0, 600.0);
        let now = Instant::now();

        let outcome = frame_loop.tick(now, Some(&mut surface));

        assert_eq!(outcome, TickOutcome::Scheduled(now + DEFAULT_FRAME_INTERVAL));
        assert_eq!(frame_loop.frames(), 1);
        assert_eq!(frame_loop.surface_size(), (800.0, 600.0));
        assert!(surface.texts().any(|(_, text)| text == BROKER_LABEL));
    }

    #[test]
    fn test_missing_surface_is_idle_and_schedules_nothing() {
        let mut frame_loop = running_loop();
        let now = Instant::now();
        let mut surface = DisplayList::new(800.0, 600.0);
        frame_loop.tick(now, Some(&mut surface));

        assert_eq!(frame_loop.tick(now, None), TickOutcome::Idle);
        assert_eq!(frame_loop.next_deadline(), None);
        assert_eq!(frame_loop.frames(), 1);
        assert_eq!(frame_loop.state(), LoopState::Running);
    }

    #[test]
    fn test_stop_is_terminal() {
        let mut frame_loop = running_loop();
        let mut surface = DisplayList::new(800.0, 600.0);
        let now = Instant::now();
        frame_loop.tick(now, Some(&mut surface));

        frame_loop.stop();
        let before = surface.clone();

        assert_eq!(frame_loop.tick(now, Some(&mut surface)), TickOutcome::Stopped);
        assert_eq!(frame_loop.next_deadline(), None);
        assert_eq!(surface, before);

        // Still stopped after a second stop and further input
        frame_loop.stop();
        surface.set_size(10.0, 10.0);
        assert!(!frame_loop.observe_message(&publish("ble_node_1"), now));
        assert_eq!(frame_loop.tick(now, Some(&mut surface)), TickOutcome::Stopped);
    }

    #[test]
    fn test_no_ack_after_stop() {
        let mut frame_loop = running_loop();
        let mut surface = DisplayList::new(800.0, 600.0);
        let t0 = Instant::now();
        frame_loop.tick(t0, Some(&mut surface));
        assert!(frame_loop.observe_message(&publish("ble_node_1"), t0));

        frame_loop.stop();

        assert_eq!(frame_loop.token_counts().pending_acks, 0);
        let later = t0 + Duration::from_millis(400);
        assert_eq!(frame_loop.tick(later, Some(&mut surface)), TickOutcome::Stopped);
        assert!(frame_loop.overlay().tokens(TokenKind::Ack).is_empty());
    }

    #[test]
    fn test_ack_spawns_on_first_frame_after_delay() {
        let mut frame_loop = running_loop();
        let mut surface = DisplayList::new(800.0, 600.0);
        let t0 = Instant::now();
        frame_loop.observe_message(&publish("ble_node_1"), t0);

        frame_loop.tick(t0 + Duration::from_millis(299), Some(&mut surface));
        assert_eq!(frame_loop.token_counts().acks, 0);

        frame_loop.tick(t0 + Duration::from_millis(300), Some(&mut surface));
        let counts = frame_loop.token_counts();
        assert_eq!(counts.acks, 1);
        assert_eq!(counts.pending_acks, 0);
        assert_eq!(
            frame_loop.overlay().tokens(TokenKind::Ack)[0].anchor(),
            "ble_node_1"
        );
    }

    #[test]
    fn test_resize_last_size_wins() {
        let mut frame_loop = running_loop();
        let mut surface = DisplayList::new(800.0, 600.0);
        let now = Instant::now();
        frame_loop.tick(now, Some(&mut surface));

        // Several resizes between two frames: only the last one is mapped
        surface.set_size(300.0, 300.0);
        surface.set_size(640.0, 480.0);
        surface.set_size(500.0, 400.0);
        frame_loop.tick(now + DEFAULT_FRAME_INTERVAL, Some(&mut surface));
        assert_eq!(frame_loop.surface_size(), (500.0, 400.0));
    }

    #[test]
    fn test_resize_remaps_on_very_next_frame() {
        let mut frame_loop = FrameLoop::new(EngineConfig::default());
        frame_loop.set_nodes(vec![Node::new("ble_node_1", Protocol::Ble).with_position(200.0, 300.0)]);
        let mut surface = DisplayList::new(800.0, 800.0);
        let now = Instant::now();
        frame_loop.tick(now, Some(&mut surface));
        assert!(surface
            .circles()
            .any(|(center, _, _)| center == crate::engine::PixelPoint::new(160.0, 240.0)));

        surface.set_size(400.0, 400.0);
        frame_loop.tick(now + DEFAULT_FRAME_INTERVAL, Some(&mut surface));
        assert!(surface
            .circles()
            .any(|(center, _, _)| center == crate::engine::PixelPoint::new(80.0, 120.0)));
    }

    #[test]
    fn test_removed_node_tokens_gone_next_frame() {
        let mut frame_loop = running_loop();
        let mut surface = DisplayList::new(800.0, 800.0);
        let t0 = Instant::now();
        frame_loop.observe_message(&publish("wifi_node_2"), t0);
        frame_loop.tick(t0, Some(&mut surface));
        assert_eq!(frame_loop.token_counts().packets, 1);

        frame_loop.set_nodes(vec![Node::new("ble_node_1", Protocol::Ble)]);
        frame_loop.tick(t0 + DEFAULT_FRAME_INTERVAL, Some(&mut surface));

        let counts = frame_loop.token_counts();
        assert_eq!(counts.pulses + counts.packets + counts.acks, 0);
        assert_eq!(frame_loop.last_report().evicted.orphaned, 2);
    }

    #[test]
    fn test_disabling_animations_clears_and_ignores() {
        let mut frame_loop = running_loop();
        let now = Instant::now();
        frame_loop.observe_message(&publish("ble_node_1"), now);

        frame_loop.set_animations_enabled(false);
        assert_eq!(frame_loop.token_counts(), TokenCounts::default());
        assert!(!frame_loop.observe_message(&publish("ble_node_1"), now));

        frame_loop.set_animations_enabled(true);
        assert!(frame_loop.observe_message(&publish("ble_node_1"), now));
    }

    #[test]
    fn test_broker_position_is_clamped() {
        let mut frame_loop = running_loop();
        frame_loop.set_broker_position(PlanePoint::new(-50.0, 1200.0));
        let mut surface = DisplayList::new(1000.0, 1000.0);
        frame_loop.tick(Instant::now(), Some(&mut surface));

        let (at, _) = surface
            .texts()
            .find(|(_, text)| *text == BROKER_LABEL)
            .expect("broker label");
        assert_eq!((at.x, at.y), (0.0, 1000.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Whatever happens before stop, nothing is drawn after it
        #[test]
        fn prop_nothing_drawn_after_stop(
            messages in 0usize..10,
            frames_before in 0usize..20,
            frames_after in 1usize..20,
        ) {
            let mut frame_loop = running_loop();
            let mut surface = DisplayList::new(400.0, 400.0);
            let t0 = Instant::now();
            for _ in 0..messages {
                frame_loop.observe_message(&publish("ble_node_1"), t0);
            }
            let mut now = t0;
            for _ in 0..frames_before {
                now += DEFAULT_FRAME_INTERVAL;
                frame_loop.tick(now, Some(&mut surface));
            }

            frame_loop.stop();
            let frozen = surface.clone();
            let frames = frame_loop.frames();

            for _ in 0..frames_after {
                now += Duration::from_millis(100);
                prop_assert_eq!(frame_loop.tick(now, Some(&mut surface)), TickOutcome::Stopped);
            }
            prop_assert_eq!(&surface, &frozen);
            prop_assert_eq!(frame_loop.frames(), frames);
            prop_assert_eq!(frame_loop.token_counts().pending_acks, 0);
        }
    }
}
