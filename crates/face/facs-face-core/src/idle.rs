//! Idle behaviour engine: blinking, idle expressions, gaze/brow drift and
//! micro-expressions layered onto the shared weight buffer every tick.
//!
//! All timer state lives in the engine instance (one per face). Multi-step
//! animations are queued on an [`ActionQueue`] and replayed from the host's
//! `now_ms`, so a test can drive the engine with synthetic timestamps.
//!
//! Tick order:
//! 1. arm timers on the first tick
//! 2. blink trigger check (queues the blink curve)
//! 3. idle-expression interval counter (may write + queue a revert)
//! 4. drain due deferred actions
//! 5. smile floor, gaze drift, brow drift, micro-expression

use serde::Serialize;

use crate::buffer::WeightBuffer;
use crate::config::{DriftConfig, IdleConfig};
use crate::outputs::{ExpressionKind, FaceEvent, MicroKind, Outputs};
use crate::resolver::CapabilityMap;
use crate::rng::RandomSource;
use crate::scheduler::{ActionQueue, Behavior, DeferredAction};

pub const GAZE_CHANNELS: [&str; 8] = [
    "eyeLookUpLeft",
    "eyeLookUpRight",
    "eyeLookDownLeft",
    "eyeLookDownRight",
    "eyeLookInLeft",
    "eyeLookInRight",
    "eyeLookOutLeft",
    "eyeLookOutRight",
];

pub const BROW_CHANNELS: [&str; 3] = ["browInnerUp", "browOuterUpLeft", "browOuterUpRight"];

const BLINK_LEFT: &str = "eyeBlinkLeft";
const BLINK_RIGHT: &str = "eyeBlinkRight";
const SQUINT_LEFT: &str = "eyeSquintLeft";
const SQUINT_RIGHT: &str = "eyeSquintRight";
const SMILE_LEFT: &str = "mouthSmileLeft";
const SMILE_RIGHT: &str = "mouthSmileRight";
const CHEEK_LEFT: &str = "cheekSquintLeft";
const CHEEK_RIGHT: &str = "cheekSquintRight";

const MICRO_EXPRESSIONS: [(MicroKind, [&str; 2]); 3] = [
    (MicroKind::Smile, [SMILE_LEFT, SMILE_RIGHT]),
    (MicroKind::CheekSquint, [CHEEK_LEFT, CHEEK_RIGHT]),
    (MicroKind::NoseSneer, ["noseSneerLeft", "noseSneerRight"]),
];

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BlinkState {
    pub last_blink_at_ms: f64,
    pub next_delay_ms: f64,
    pub is_blinking: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExpressionState {
    /// Intervals elapsed since the last expression fired.
    pub interval_count: u32,
    pub last_interval_at_ms: f64,
    pub last_triggered_at_ms: Option<f64>,
    /// Expression waiting for its revert.
    pub active: Option<ExpressionKind>,
}

#[derive(Debug)]
pub struct IdleEngine {
    cfg: IdleConfig,
    armed: bool,
    blink: BlinkState,
    expression: ExpressionState,
    queue: ActionQueue,
}

impl IdleEngine {
    pub fn new(cfg: IdleConfig) -> Self {
        Self {
            cfg,
            armed: false,
            blink: BlinkState::default(),
            expression: ExpressionState::default(),
            queue: ActionQueue::new(),
        }
    }

    pub fn config(&self) -> &IdleConfig {
        &self.cfg
    }

    pub fn blink_state(&self) -> &BlinkState {
        &self.blink
    }

    pub fn expression_state(&self) -> &ExpressionState {
        &self.expression
    }

    pub fn pending(&self) -> &ActionQueue {
        &self.queue
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Start the blink and expression clocks at `now_ms`.
    pub fn arm(&mut self, now_ms: f64, rng: &mut dyn RandomSource) {
        self.blink.last_blink_at_ms = now_ms;
        self.blink.next_delay_ms = self.draw_blink_delay(rng);
        self.expression.last_interval_at_ms = now_ms;
        self.armed = true;
    }

    /// Drop the queued actions of one behaviour and clear its in-flight flag.
    pub fn cancel_behavior(&mut self, owner: Behavior) -> usize {
        let dropped = self.queue.cancel_owner(owner);
        match owner {
            Behavior::Blink => self.blink.is_blinking = false,
            Behavior::IdleExpression => self.expression.active = None,
        }
        if dropped > 0 {
            log::debug!("idle: cancelled {dropped} pending {owner:?} actions");
        }
        dropped
    }

    /// Drop every queued action and clear in-flight flags.
    pub fn cancel_pending(&mut self) -> usize {
        self.cancel_behavior(Behavior::Blink) + self.cancel_behavior(Behavior::IdleExpression)
    }

    fn draw_blink_delay(&self, rng: &mut dyn RandomSource) -> f64 {
        let b = &self.cfg.blink;
        b.min_delay_ms + (b.max_delay_ms - b.min_delay_ms) * rng.next_f32() as f64
    }

    /// Queue a full blink starting at `now_ms`. Returns false while one is in flight.
    pub fn trigger_blink(&mut self, now_ms: f64, rng: &mut dyn RandomSource) -> bool {
        if self.blink.is_blinking {
            return false;
        }
        self.blink.is_blinking = true;
        self.blink.last_blink_at_ms = now_ms;
        self.blink.next_delay_ms = self.draw_blink_delay(rng);
        for step in 0..self.cfg.blink.curve.len() {
            self.queue.schedule(
                now_ms + step as f64 * self.cfg.blink.step_ms,
                Behavior::Blink,
                DeferredAction::BlinkStep { step },
            );
        }
        true
    }

    /// Advance every idle behaviour to `now_ms`, writing into `buffer`.
    pub fn tick(
        &mut self,
        now_ms: f64,
        buffer: &mut [f32],
        caps: &CapabilityMap,
        rng: &mut dyn RandomSource,
        out: &mut Outputs,
    ) {
        if caps.is_empty() {
            return;
        }
        if !self.armed {
            self.arm(now_ms, rng);
        }
        let mut buf = WeightBuffer::new(buffer, caps);

        if !self.blink.is_blinking
            && now_ms - self.blink.last_blink_at_ms > self.blink.next_delay_ms
            && self.trigger_blink(now_ms, rng)
        {
            out.push_event(FaceEvent::BlinkStarted { at_ms: now_ms });
        }

        self.update_expression(now_ms, &mut buf, rng, out);
        self.run_due(now_ms, &mut buf, rng);

        let floor = &self.cfg.smile_floor;
        if floor.enabled && buf.has(SMILE_LEFT) && buf.has(SMILE_RIGHT) {
            buf.raise_to(SMILE_LEFT, floor.value);
            buf.raise_to(SMILE_RIGHT, floor.value);
        }

        drift(&mut buf, &GAZE_CHANNELS, &self.cfg.gaze, rng);
        drift(&mut buf, &BROW_CHANNELS, &self.cfg.brow, rng);

        if let Some(kind) = self.micro_expression(&mut buf, rng) {
            out.push_event(FaceEvent::MicroExpression { kind });
        }
    }

    fn update_expression(
        &mut self,
        now_ms: f64,
        buf: &mut WeightBuffer<'_>,
        rng: &mut dyn RandomSource,
        out: &mut Outputs,
    ) {
        let e = &self.cfg.expression;
        if now_ms - self.expression.last_interval_at_ms <= e.interval_ms {
            return;
        }
        self.expression.interval_count += 1;
        self.expression.last_interval_at_ms = now_ms;
        if self.expression.interval_count < e.every {
            return;
        }
        self.expression.interval_count = 0;

        if let Some(active) = self.expression.active {
            log::debug!("idle: {active:?} still active, skipping expression");
            return;
        }
        let kind = if rng.next_f32() >= 0.5 {
            ExpressionKind::Wink
        } else {
            ExpressionKind::Smile
        };
        if let Some(kind) = self.start_expression(kind, now_ms, buf) {
            out.push_event(FaceEvent::IdleExpression { kind });
        }
    }

    fn start_expression(
        &mut self,
        kind: ExpressionKind,
        now_ms: f64,
        buf: &mut WeightBuffer<'_>,
    ) -> Option<ExpressionKind> {
        let e = &self.cfg.expression;
        let (channels, duration) = match kind {
            ExpressionKind::Wink => {
                if !buf.set(BLINK_RIGHT, 1.0) {
                    return None;
                }
                let mut channels = vec![BLINK_RIGHT];
                if buf.set(SMILE_RIGHT, e.wink_smile) {
                    channels.push(SMILE_RIGHT);
                }
                (channels, e.wink_ms)
            }
            ExpressionKind::Smile => {
                if !(buf.has(SMILE_LEFT) && buf.has(SMILE_RIGHT)) {
                    return None;
                }
                buf.set(SMILE_LEFT, e.smile);
                buf.set(SMILE_RIGHT, e.smile);
                let mut channels = vec![SMILE_LEFT, SMILE_RIGHT];
                if buf.has(CHEEK_LEFT) && buf.has(CHEEK_RIGHT) {
                    buf.set(CHEEK_LEFT, e.cheek_squint);
                    buf.set(CHEEK_RIGHT, e.cheek_squint);
                    channels.extend([CHEEK_LEFT, CHEEK_RIGHT]);
                }
                (channels, e.smile_ms)
            }
        };
        self.queue.schedule(
            now_ms + duration,
            Behavior::IdleExpression,
            DeferredAction::Revert { channels },
        );
        self.expression.active = Some(kind);
        self.expression.last_triggered_at_ms = Some(now_ms);
        log::debug!("idle: {kind:?} at {now_ms} ms");
        Some(kind)
    }

    fn run_due(&mut self, now_ms: f64, buf: &mut WeightBuffer<'_>, rng: &mut dyn RandomSource) {
        for due in self.queue.drain_due(now_ms) {
            match due.action {
                DeferredAction::BlinkStep { step } => self.apply_blink_step(step, buf, rng),
                DeferredAction::Revert { channels } => {
                    for ch in channels {
                        buf.set(ch, 0.0);
                    }
                    self.expression.active = None;
                }
            }
        }
    }

    fn apply_blink_step(
        &mut self,
        step: usize,
        buf: &mut WeightBuffer<'_>,
        rng: &mut dyn RandomSource,
    ) {
        let b = &self.cfg.blink;
        let Some(&value) = b.curve.get(step) else {
            self.blink.is_blinking = false;
            return;
        };
        for eye in [BLINK_LEFT, BLINK_RIGHT] {
            if buf.has(eye) {
                let jitter = 1.0 + rng.range(-b.asymmetry, b.asymmetry);
                buf.set_clamped(eye, value * jitter);
            }
        }
        for squint in [SQUINT_LEFT, SQUINT_RIGHT] {
            buf.set(squint, value * b.squint_ratio);
        }
        if step + 1 >= b.curve.len() {
            self.blink.is_blinking = false;
        }
    }

    fn micro_expression(
        &self,
        buf: &mut WeightBuffer<'_>,
        rng: &mut dyn RandomSource,
    ) -> Option<MicroKind> {
        let m = &self.cfg.micro;
        if !rng.chance(m.chance) {
            return None;
        }
        let (kind, channels) = MICRO_EXPRESSIONS[rng.index(MICRO_EXPRESSIONS.len())];
        let intensity = match kind {
            MicroKind::Smile => m.smile_intensity,
            MicroKind::CheekSquint => m.cheek_intensity,
            MicroKind::NoseSneer => m.sneer_intensity,
        };
        for ch in channels {
            if buf.has(ch) {
                buf.set(ch, rng.range(0.0, intensity));
            }
        }
        Some(kind)
    }
}

/// Random-walk each available channel with probability `cfg.chance`, clamped to `[0, cfg.max]`.
fn drift(
    buf: &mut WeightBuffer<'_>,
    channels: &[&str],
    cfg: &DriftConfig,
    rng: &mut dyn RandomSource,
) {
    for ch in channels {
        let Some(current) = buf.get(ch) else {
            continue;
        };
        if rng.chance(cfg.chance) {
            let next = (current + rng.range(-cfg.step, cfg.step)).clamp(0.0, cfg.max);
            buf.set(ch, next);
        }
    }
}
