//! Engine configuration. Every constant of the animation model is a default here.

use serde::{Deserialize, Serialize};

use crate::error::FaceError;

/// Top-level configuration for one face.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceConfig {
    pub synth: SynthConfig,
    pub idle: IdleConfig,
    /// Seed for the engine's random source; `None` seeds from entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Output frames per second of synthesized sequences.
    pub frame_rate: f32,
    /// Linear blend into and out of each viseme.
    pub transition_ms: f32,
    /// Segment length is drawn from `[hold_min_ms, hold_max_ms)`.
    pub hold_min_ms: f32,
    pub hold_max_ms: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            transition_ms: 50.0,
            hold_min_ms: 100.0,
            hold_max_ms: 250.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub blink: BlinkConfig,
    pub expression: ExpressionConfig,
    pub gaze: DriftConfig,
    pub brow: DriftConfig,
    pub micro: MicroConfig,
    /// Resting smile; raises but never lowers the current smile weight.
    pub smile_floor: SmileFloor,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            blink: BlinkConfig::default(),
            expression: ExpressionConfig::default(),
            gaze: DriftConfig::default(),
            brow: DriftConfig::brow(),
            micro: MicroConfig::default(),
            smile_floor: SmileFloor::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    pub min_delay_ms: f64,
    pub max_delay_ms: f64,
    pub step_ms: f64,
    pub curve: Vec<f32>,
    /// Per-eye multiplier is drawn from `1 ± asymmetry`.
    pub asymmetry: f32,
    pub squint_ratio: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 2000.0,
            max_delay_ms: 6000.0,
            step_ms: 50.0,
            curve: vec![0.0, 0.5, 1.0, 0.5, 0.0],
            asymmetry: 0.1,
            squint_ratio: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    pub interval_ms: f64,
    /// Fire on every n-th elapsed interval.
    pub every: u32,
    pub wink_ms: f64,
    pub wink_smile: f32,
    pub smile_ms: f64,
    pub smile: f32,
    pub cheek_squint: f32,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            interval_ms: 15_000.0,
            every: 4,
            wink_ms: 400.0,
            wink_smile: 0.3,
            smile_ms: 2000.0,
            smile: 0.3,
            cheek_squint: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Per-tick, per-channel nudge probability.
    pub chance: f32,
    pub step: f32,
    pub max: f32,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            chance: 0.02,
            step: 0.05,
            max: 0.2,
        }
    }
}

impl DriftConfig {
    pub fn brow() -> Self {
        Self {
            chance: 0.03,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroConfig {
    pub chance: f32,
    pub smile_intensity: f32,
    pub cheek_intensity: f32,
    pub sneer_intensity: f32,
}

impl Default for MicroConfig {
    fn default() -> Self {
        Self {
            chance: 0.01,
            smile_intensity: 0.1,
            cheek_intensity: 0.05,
            sneer_intensity: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmileFloor {
    pub enabled: bool,
    pub value: f32,
}

impl Default for SmileFloor {
    fn default() -> Self {
        Self {
            enabled: true,
            value: 0.1,
        }
    }
}

fn check_probability(label: &str, p: f32) -> Result<(), FaceError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(FaceError::InvalidConfig(format!(
            "{label} must be a probability in [0,1], got {p}"
        )))
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    label: &str,
    lo: T,
    hi: T,
) -> Result<(), FaceError> {
    if lo <= hi {
        Ok(())
    } else {
        Err(FaceError::InvalidConfig(format!(
            "{label}: lower bound {lo} exceeds upper bound {hi}"
        )))
    }
}

impl FaceConfig {
    /// Parse a (possibly partial) JSON config; absent fields take defaults.
    pub fn from_json(s: &str) -> Result<Self, FaceError> {
        let cfg: FaceConfig =
            serde_json::from_str(s).map_err(|e| FaceError::ConfigParse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), FaceError> {
        let s = &self.synth;
        if !(s.frame_rate.is_finite() && s.frame_rate > 0.0) {
            return Err(FaceError::InvalidConfig(format!(
                "synth.frame_rate must be positive, got {}",
                s.frame_rate
            )));
        }
        if !(s.transition_ms.is_finite() && s.transition_ms > 0.0) {
            return Err(FaceError::InvalidConfig(format!(
                "synth.transition_ms must be positive, got {}",
                s.transition_ms
            )));
        }
        check_range("synth.hold", s.hold_min_ms, s.hold_max_ms)?;
        let frame_ms = 1000.0 / s.frame_rate;
        if !(s.hold_min_ms >= frame_ms) {
            return Err(FaceError::InvalidConfig(format!(
                "synth.hold_min_ms ({}) must be at least one frame ({frame_ms} ms)",
                s.hold_min_ms
            )));
        }
        if s.hold_min_ms < 2.0 * s.transition_ms {
            return Err(FaceError::InvalidConfig(format!(
                "synth.hold_min_ms ({}) must cover both transitions ({} ms each)",
                s.hold_min_ms, s.transition_ms
            )));
        }

        let i = &self.idle;
        check_range("idle.blink.delay", i.blink.min_delay_ms, i.blink.max_delay_ms)?;
        if i.blink.curve.is_empty() {
            return Err(FaceError::InvalidConfig("idle.blink.curve is empty".into()));
        }
        if i.expression.every == 0 {
            return Err(FaceError::InvalidConfig(
                "idle.expression.every must be at least 1".into(),
            ));
        }
        check_probability("idle.gaze.chance", i.gaze.chance)?;
        check_probability("idle.brow.chance", i.brow.chance)?;
        check_probability("idle.micro.chance", i.micro.chance)?;
        Ok(())
    }
}
