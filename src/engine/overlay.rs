// Animation overlay management
//
// Three independent token collections (message pulses, packets to the
// broker, acks back from the broker) plus the queue of ack spawns that are
// still waiting out their delay. Every frame runs two passes per
// collection: advance + evict, then draw.

use super::config::{
    EngineConfig, EngineSettings, ACK_RADIUS, PACKET_RADIUS, PULSE_RADIUS_END, PULSE_RADIUS_START,
};
use super::layout::NodeLayout;
use super::mapper::PixelPoint;
use super::model::{MessageEvent, MessageKind};
use super::surface::{Paint, Surface};
use crate::theme::{message_color, ACK_CYAN, PACKET_AMBER};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

/// Which collection a token lives in, and how it moves and looks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Expanding ring at the sender
    Pulse,
    /// Sender -> broker
    Packet,
    /// Broker -> sender
    Ack,
}

impl TokenKind {
    pub fn advance_rate(&self, config: &EngineConfig) -> f64 {
        match self {
            Self::Pulse => config.pulse_rate,
            Self::Packet => config.packet_rate,
            Self::Ack => config.ack_rate,
        }
    }

    /// Nominal radius in pixels before `glyph_scale`
    pub fn radius(&self, progress: f64) -> f64 {
        match self {
            Self::Pulse => PULSE_RADIUS_START + (PULSE_RADIUS_END - PULSE_RADIUS_START) * progress,
            Self::Packet => PACKET_RADIUS,
            Self::Ack => ACK_RADIUS,
        }
    }

    pub fn alpha(&self, progress: f64) -> f64 {
        match self {
            Self::Pulse => 1.0 - progress,
            Self::Packet | Self::Ack => 0.9 - 0.3 * progress,
        }
    }

    pub fn has_glow(&self) -> bool {
        !matches!(self, Self::Pulse)
    }
}

/// One in-flight animation
///
/// Only `progress` ever changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    anchor: String,
    progress: f64,
    rate: f64,
    message: MessageKind,
}

impl Token {
    pub fn new(kind: TokenKind, anchor: impl Into<String>, message: MessageKind, rate: f64) -> Self {
        Self {
            kind,
            anchor: anchor.into(),
            progress: 0.0,
            rate,
            message,
        }
    }

    #[cfg(test)]
    pub(crate) fn anchor(&self) -> &str {
        &self.anchor
    }

    #[cfg(test)]
    pub(crate) fn progress(&self) -> f64 {
        self.progress
    }

    /// Interpolated draw position, or `None` when the anchor is gone
    ///
    /// Pulses stay on the anchor, packets travel anchor -> broker and acks
    /// travel broker -> anchor.
    pub fn position(&self, layout: &NodeLayout) -> Option<PixelPoint> {
        let anchor = layout.position_of(&self.anchor)?;
        let broker = layout.broker();
        Some(match self.kind {
            TokenKind::Pulse => anchor,
            TokenKind::Packet => anchor.lerp(broker, self.progress),
            TokenKind::Ack => broker.lerp(anchor, self.progress),
        })
    }

    /// Paint for the current progress
    pub fn paint(&self, glow_enabled: bool) -> Paint {
        let color = match self.kind {
            TokenKind::Pulse => message_color(self.message),
            TokenKind::Packet => PACKET_AMBER,
            TokenKind::Ack => ACK_CYAN,
        };
        let paint = match self.kind {
            TokenKind::Pulse => Paint::stroke(color, 2.0),
            TokenKind::Packet | TokenKind::Ack => Paint::fill(color),
        };
        paint
            .with_alpha(self.kind.alpha(self.progress))
            .with_glow(glow_enabled && self.kind.has_glow())
    }

    #[cfg(test)]
    pub(crate) fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }
}

/// Why a token left its collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evictions {
    /// Progress passed 1.0
    pub expired: usize,
    /// Anchor node no longer in the snapshot
    pub orphaned: usize,
}

impl Evictions {
    pub fn total(&self) -> usize {
        self.expired + self.orphaned
    }
}

/// Live token counts per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenCounts {
    pub pulses: usize,
    pub packets: usize,
    pub acks: usize,
    pub pending_acks: usize,
}

/// An ack spawn waiting for its fire time
///
/// Ordered so that `BinaryHeap` pops the earliest fire time first, ties
/// broken by scheduling order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DeferredAck {
    fire_at: Instant,
    seq: u64,
    anchor: String,
    message: MessageKind,
}

impl Ord for DeferredAck {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for DeferredAck {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Owner of all token collections
#[derive(Debug, Default)]
pub struct OverlayManager {
    pulses: Vec<Token>,
    packets: Vec<Token>,
    acks: Vec<Token>,
    pending_acks: BinaryHeap<DeferredAck>,
    next_seq: u64,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn tokens for a newly observed message
    ///
    /// A pulse and a packet appear at once; the ack is queued to fire
    /// `config.ack_delay` after `now`. Events without a sender or of an
    /// unknown kind spawn nothing. Returns whether anything was spawned.
    pub fn ingest(&mut self, message: &MessageEvent, now: Instant, config: &EngineConfig) -> bool {
        if !message.is_animatable() {
            tracing::debug!(kind = message.kind.as_str(), "ignoring message without animation");
            return false;
        }
        let Some(sender) = message.sender() else {
            return false;
        };

        self.pulses.push(Token::new(
            TokenKind::Pulse,
            sender,
            message.kind,
            TokenKind::Pulse.advance_rate(config),
        ));
        self.packets.push(Token::new(
            TokenKind::Packet,
            sender,
            message.kind,
            TokenKind::Packet.advance_rate(config),
        ));

        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending_acks.push(DeferredAck {
            fire_at: now + config.ack_delay,
            seq,
            anchor: sender.to_string(),
            message: message.kind,
        });

        true
    }

    /// Move every due ack spawn into the ack collection
    ///
    /// Returns how many acks appeared.
    pub fn drain_due(&mut self, now: Instant, config: &EngineConfig) -> usize {
        let mut spawned = 0;
        while self
            .pending_acks
            .peek()
            .is_some_and(|pending| pending.fire_at <= now)
        {
            if let Some(pending) = self.pending_acks.pop() {
                self.acks.push(Token::new(
                    TokenKind::Ack,
                    pending.anchor,
                    pending.message,
                    TokenKind::Ack.advance_rate(config),
                ));
                spawned += 1;
            }
        }
        spawned
    }

    /// Advance every token by its rate, then evict expired and orphaned ones
    pub fn advance(&mut self, layout: &NodeLayout) -> Evictions {
        let mut evictions = Evictions::default();
        for collection in [&mut self.pulses, &mut self.packets, &mut self.acks] {
            advance_collection(collection, layout, &mut evictions);
        }
        evictions
    }

    /// Draw live tokens: packets, then acks, then pulses on top
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        layout: &NodeLayout,
        config: &EngineConfig,
        settings: &EngineSettings,
    ) {
        for token in self.packets.iter().chain(&self.acks).chain(&self.pulses) {
            // Orphans were evicted by advance(); a missing anchor here
            // means the snapshot changed in between, so skip the token.
            let Some(center) = token.position(layout) else {
                continue;
            };
            let radius = config.scaled(token.kind.radius(token.progress));
            surface.circle(center, radius, token.paint(settings.glow_enabled));
        }
    }

    /// Drop every live token and every pending ack spawn
    pub fn clear(&mut self) {
        self.pulses.clear();
        self.packets.clear();
        self.acks.clear();
        self.cancel_pending();
    }

    /// Forget ack spawns that have not fired yet
    pub fn cancel_pending(&mut self) -> usize {
        let cancelled = self.pending_acks.len();
        self.pending_acks.clear();
        cancelled
    }

    #[cfg(test)]
    pub(crate) fn tokens(&self, kind: TokenKind) -> &[Token] {
        match kind {
            TokenKind::Pulse => &self.pulses,
            TokenKind::Packet => &self.packets,
            TokenKind::Ack => &self.acks,
        }
    }

    pub fn counts(&self) -> TokenCounts {
        TokenCounts {
            pulses: self.pulses.len(),
            packets: self.packets.len(),
            acks: self.acks.len(),
            pending_acks: self.pending_acks.len(),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.pulses.is_empty()
            && self.packets.is_empty()
            && self.acks.is_empty()
            && self.pending_acks.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, token: Token) {
        match token.kind {
            TokenKind::Pulse => self.pulses.push(token),
            TokenKind::Packet => self.packets.push(token),
            TokenKind::Ack => self.acks.push(token),
        }
    }
}

fn advance_collection(tokens: &mut Vec<Token>, layout: &NodeLayout, evictions: &mut Evictions) {
    tokens.retain_mut(|token| {
        token.progress += token.rate;
        if token.progress > 1.0 {
            evictions.expired += 1;
            false
        } else if !layout.contains(&token.anchor) {
            evictions.orphaned += 1;
            false
        } else {
            true
        }
    });
}
