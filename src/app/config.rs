// Application configuration types
//
// This module contains constants and configuration structs for:
// - Frame pacing and idle polling
// - Slow-frame detection
// - Message log retention
// - Feed selection (demo simulation or replay file)

use crate::feed::DemoConfig;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default target frame rate
pub const DEFAULT_FPS: u32 = 60;

/// Accepted frame rate range for `--fps`
pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 120;

/// Input poll timeout while no frame is scheduled (loop idle)
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Default replay speed in records per second
pub const DEFAULT_REPLAY_RATE: f64 = 20.0;

/// Frame time threshold for auto-disabling glow (100ms)
/// If frame time consistently exceeds this, glow halos are dropped
pub const FRAME_TIME_THRESHOLD_MS: u128 = 100;

/// Number of consecutive slow frames before glow is disabled
pub const SLOW_FRAME_COUNT_THRESHOLD: u32 = 5;

/// Number of frame durations averaged for the FPS readout
pub const FPS_WINDOW: usize = 30;

/// Messages kept for the sidebar log; older entries are dropped first
pub const MESSAGE_LOG_CAPACITY: usize = 150;

// ============================================================================
// Enums
// ============================================================================

/// Where topology updates come from
#[derive(Debug, Clone, PartialEq)]
pub enum FeedSource {
    /// Built-in synthetic network
    Demo(DemoConfig),
    /// Recorded NDJSON session, `rate` records per second
    Replay { path: PathBuf, rate: f64 },
}

impl Default for FeedSource {
    fn default() -> Self {
        Self::Demo(DemoConfig::default())
    }
}

// ============================================================================
// Configuration Structs
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub feed: FeedSource,

    /// Target frames per second, clamped to [MIN_FPS, MAX_FPS]
    pub fps: u32,
}

impl AppConfig {
    pub fn frame_interval(&self) -> Duration {
        frame_interval_for_fps(self.fps)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedSource::default(),
            fps: DEFAULT_FPS,
        }
    }
}

/// Convert a frame rate into the interval between frames
pub fn frame_interval_for_fps(fps: u32) -> Duration {
    let fps = fps.clamp(MIN_FPS, MAX_FPS);
    Duration::from_micros(1_000_000 / u64::from(fps))
}
