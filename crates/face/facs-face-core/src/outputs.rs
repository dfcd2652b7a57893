//! Per-tick outputs of the face engine.
//!
//! Weight changes go straight into the host buffer; what comes back here is the
//! frame that was applied (if any) and a list of semantic events for hosts
//! that want to observe or log engine activity.

use serde::{Deserialize, Serialize};

use crate::error::Degradation;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpressionKind {
    Wink,
    Smile,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MicroKind {
    Smile,
    CheekSquint,
    NoseSneer,
}

/// Discrete signals emitted while commanding or ticking the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum FaceEvent {
    CapabilitiesLoaded { bound: usize, missing: usize },
    TalkingStarted { frames: usize, duration_ms: f32 },
    /// Playback reached the requested duration.
    TalkingFinished,
    /// Playback was interrupted by the host or replaced by a new request.
    TalkingStopped,
    BlinkStarted { at_ms: f64 },
    IdleExpression { kind: ExpressionKind },
    MicroExpression { kind: MicroKind },
    Degraded(Degradation),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    /// Talking frame applied on this tick.
    #[serde(default)]
    pub frame: Option<usize>,
    #[serde(default)]
    pub events: Vec<FaceEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.frame = None;
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: FaceEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frame.is_none() && self.events.is_empty()
    }
}
