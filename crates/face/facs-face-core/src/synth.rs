//! Talking timeline synthesis.
//!
//! Model:
//! - A cursor walks `[0, duration)`. Each step picks a viseme and a hold length
//!   drawn from `[hold_min_ms, hold_max_ms)`.
//! - Inside each segment: a linear transition-in from the previous weight-set
//!   to the viseme target, a hold at the target, and a linear transition-out
//!   toward zero. Transitions live inside the segment; the cursor advances by
//!   the hold length only.
//! - Events map to frame `floor(time / frame_ms)`; the last write to an index wins.
//! - Indices with no event copy the previous frame (catalog defaults at the start).
//!
//! Weights are not clamped here; the compositor clamps against the catalog.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::SynthConfig;
use crate::rng::RandomSource;
use crate::sequence::{Frame, Sequence, Weights};
use crate::visemes::{viseme_for_phoneme, VisemeLibrary};

/// Guards frame indexing against float error at exact frame boundaries.
const FRAME_EPS: f32 = 1e-3;

#[inline]
fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Channel-wise lerp over the union of both weight-sets; absent channels read as 0.
fn lerp_weights(from: &Weights, to: &Weights, p: f32) -> Weights {
    let mut out = Weights::with_capacity(from.len().max(to.len()));
    for (name, a) in from {
        let b = to.get(name).copied().unwrap_or(0.0);
        out.insert(name.clone(), lerp_f32(*a, b, p));
    }
    for (name, b) in to {
        if !from.contains_key(name) {
            out.insert(name.clone(), lerp_f32(0.0, *b, p));
        }
    }
    out
}

#[inline]
fn frame_index(time_ms: f32, frame_ms: f32) -> usize {
    (time_ms / frame_ms + FRAME_EPS).floor().max(0.0) as usize
}

/// `ceil(duration_ms / 1000 * frame_rate)`, evaluated in f64 so integral
/// products are not pushed over by f32 rounding.
#[inline]
pub fn frame_count(duration_ms: f32, frame_rate: f32) -> usize {
    (duration_ms as f64 * frame_rate as f64 / 1000.0).ceil() as usize
}

/// Chooses the viseme for each segment. Implementations may use timing data
/// (e.g. phoneme alignments); the default draws uniformly.
pub trait VisemeSelector {
    /// Index into `library` for the segment starting at `cursor_ms`.
    fn select(
        &mut self,
        library: &VisemeLibrary,
        cursor_ms: f32,
        rng: &mut dyn RandomSource,
    ) -> usize;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct UniformSelector;

impl VisemeSelector for UniformSelector {
    fn select(
        &mut self,
        library: &VisemeLibrary,
        _cursor_ms: f32,
        rng: &mut dyn RandomSource,
    ) -> usize {
        rng.index(library.len())
    }
}

/// A phoneme occupying `[start_ms, end_ms)` of the utterance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhonemeTiming {
    pub phoneme: String,
    pub start_ms: f32,
    pub end_ms: f32,
}

/// Picks the viseme of the phoneme active at the cursor. Gaps in the timing
/// data, unknown phonemes and visemes missing from the library fall back to
/// uniform selection.
#[derive(Clone, Debug, Default)]
pub struct PhonemeTrackSelector {
    timings: Vec<PhonemeTiming>,
}

impl PhonemeTrackSelector {
    pub fn new(mut timings: Vec<PhonemeTiming>) -> Self {
        timings.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));
        Self { timings }
    }

    fn active(&self, cursor_ms: f32) -> Option<&PhonemeTiming> {
        self.timings
            .iter()
            .find(|p| cursor_ms >= p.start_ms && cursor_ms < p.end_ms)
    }
}

impl VisemeSelector for PhonemeTrackSelector {
    fn select(
        &mut self,
        library: &VisemeLibrary,
        cursor_ms: f32,
        rng: &mut dyn RandomSource,
    ) -> usize {
        self.active(cursor_ms)
            .and_then(|p| viseme_for_phoneme(&p.phoneme))
            .and_then(|id| library.find(id))
            .map(|(i, _)| i)
            .unwrap_or_else(|| rng.index(library.len()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Synthesizer {
    cfg: SynthConfig,
    library: VisemeLibrary,
    catalog: Catalog,
}

impl Synthesizer {
    pub fn new(cfg: SynthConfig, library: VisemeLibrary) -> Self {
        Self {
            cfg,
            library,
            catalog: Catalog::arkit(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &SynthConfig {
        &self.cfg
    }

    pub fn library(&self) -> &VisemeLibrary {
        &self.library
    }

    /// Synthesize with uniform viseme selection.
    pub fn synthesize(
        &self,
        duration_ms: f32,
        utterance: Option<&str>,
        rng: &mut dyn RandomSource,
    ) -> Sequence {
        self.synthesize_with(duration_ms, utterance, &mut UniformSelector, rng)
    }

    /// Synthesize with a caller-provided selector.
    ///
    /// `utterance` is accepted for hosts that pass it along but is not parsed;
    /// phoneme-driven timing comes in through `selector` (see [`PhonemeTrackSelector`]).
    pub fn synthesize_with(
        &self,
        duration_ms: f32,
        utterance: Option<&str>,
        selector: &mut dyn VisemeSelector,
        rng: &mut dyn RandomSource,
    ) -> Sequence {
        let frame_rate = self.cfg.frame_rate;
        if !(duration_ms.is_finite() && duration_ms > 0.0) || !(frame_rate > 0.0) {
            log::debug!("synthesize: rejecting duration {duration_ms} ms");
            return Sequence::empty(frame_rate);
        }
        if let Some(text) = utterance {
            log::debug!("synthesize: {} ms for {} chars of text", duration_ms, text.len());
        }

        let total = frame_count(duration_ms, frame_rate);
        let frame_ms = 1000.0 / frame_rate;
        let transition_frames = ((self.cfg.transition_ms / frame_ms).round() as usize).max(1);
        let transition_ms = self.cfg.transition_ms;

        let mut slots: Vec<Option<Frame>> = vec![None; total];
        let mut emit = |time_ms: f32, weights: Weights| {
            let idx = frame_index(time_ms, frame_ms);
            if let Some(slot) = slots.get_mut(idx) {
                *slot = Some(Frame {
                    time_ms,
                    weights,
                    filled: false,
                });
            }
        };

        if !self.library.is_empty() {
            let zero = Weights::new();
            let mut from = Weights::new();
            let mut t = 0.0f32;
            while t < duration_ms {
                let pick = selector.select(&self.library, t, rng);
                let Some(viseme) = self
                    .library
                    .get(pick)
                    .or_else(|| self.library.get(0))
                else {
                    break;
                };
                let target = &viseme.weights;
                let hold = rng.range(self.cfg.hold_min_ms, self.cfg.hold_max_ms);

                for i in 0..transition_frames {
                    let p = i as f32 / transition_frames as f32;
                    emit(t + i as f32 * frame_ms, lerp_weights(&from, target, p));
                }

                let hold_start = t + transition_frames as f32 * frame_ms;
                let out_start = t + hold - transition_ms;
                if hold_start < out_start {
                    emit(hold_start, target.clone());
                }

                let mut tail = target.clone();
                for i in 0..transition_frames {
                    let p = i as f32 / transition_frames as f32;
                    tail = lerp_weights(target, &zero, p);
                    emit(out_start + i as f32 * frame_ms, tail.clone());
                }

                from = tail;
                // Always advance at least one frame.
                t += hold.max(frame_ms);
            }
        }

        let defaults = self.catalog.defaults();
        let mut frames: Vec<Frame> = Vec::with_capacity(total);
        for (i, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(frame) => frames.push(frame),
                None => {
                    let weights = frames
                        .last()
                        .map(|f| f.weights.clone())
                        .unwrap_or_else(|| defaults.clone());
                    frames.push(Frame {
                        time_ms: i as f32 * frame_ms,
                        weights,
                        filled: true,
                    });
                }
            }
        }

        Sequence {
            frame_rate,
            duration_ms,
            frames,
        }
    }
}

/// Synthesize a talking sequence with the standard viseme library and default timing.
pub fn synthesize(
    duration_ms: f32,
    frame_rate: f32,
    utterance: Option<&str>,
    rng: &mut dyn RandomSource,
) -> Sequence {
    let cfg = SynthConfig {
        frame_rate,
        ..SynthConfig::default()
    };
    Synthesizer::new(cfg, VisemeLibrary::standard()).synthesize(duration_ms, utterance, rng)
}
