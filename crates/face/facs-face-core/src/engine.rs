//! Engine: per-face ownership of capabilities, the active talking sequence,
//! idle state and the random source.
//!
//! Methods:
//! - new / try_new, with_random, with_library
//! - load_capabilities (resolver), start_talking (synth), stop_talking
//! - on_tick (compositor → idle), shutdown

use crate::catalog::Catalog;
use crate::compositor::{apply_frame, reset_speech_channels};
use crate::config::FaceConfig;
use crate::error::{Degradation, FaceError};
use crate::idle::IdleEngine;
use crate::outputs::{FaceEvent, Outputs};
use crate::resolver::{resolve, CapabilityMap, MorphDictionary};
use crate::rng::{RandomSource, StdRandom};
use crate::sequence::Sequence;
use crate::synth::{Synthesizer, UniformSelector, VisemeSelector};
use crate::visemes::VisemeLibrary;

/// The talking sequence currently being played back.
#[derive(Clone, Debug)]
pub struct Talking {
    pub sequence: Sequence,
    pub started_at_ms: f64,
    pub duration_ms: f32,
}

impl Talking {
    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.started_at_ms
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.elapsed_ms(now_ms) >= self.duration_ms as f64
    }
}

pub struct FaceEngine {
    cfg: FaceConfig,
    catalog: Catalog,
    caps: CapabilityMap,
    synth: Synthesizer,
    idle: IdleEngine,
    talking: Option<Talking>,
    rng: Box<dyn RandomSource>,
    /// Events raised by commands between ticks; flushed into the next tick's outputs.
    pending_events: Vec<FaceEvent>,
    outputs: Outputs,
    shut_down: bool,
}

impl FaceEngine {
    /// Build an engine from `cfg`. A configured seed gives a reproducible session.
    pub fn new(cfg: FaceConfig) -> Self {
        let rng: Box<dyn RandomSource> = match cfg.seed {
            Some(seed) => Box::new(StdRandom::seeded(seed)),
            None => Box::new(StdRandom::from_entropy()),
        };
        let catalog = Catalog::arkit();
        Self {
            synth: Synthesizer::new(cfg.synth.clone(), VisemeLibrary::standard())
                .with_catalog(catalog),
            idle: IdleEngine::new(cfg.idle.clone()),
            caps: CapabilityMap::empty(catalog),
            catalog,
            cfg,
            talking: None,
            rng,
            pending_events: Vec::new(),
            outputs: Outputs::default(),
            shut_down: false,
        }
    }

    /// Validate `cfg` before building the engine.
    pub fn try_new(cfg: FaceConfig) -> Result<Self, FaceError> {
        cfg.validate()?;
        Ok(Self::new(cfg))
    }

    /// Replace the random source (deterministic tests, host-provided generators).
    pub fn with_random(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    /// Use a custom viseme library. Channels unknown to the catalog are reported.
    pub fn with_library(mut self, library: VisemeLibrary) -> Self {
        for issue in library.validate(&self.catalog) {
            log::warn!("viseme library: {issue:?}");
            self.pending_events.push(FaceEvent::Degraded(issue));
        }
        self.synth = Synthesizer::new(self.cfg.synth.clone(), library).with_catalog(self.catalog);
        self
    }

    pub fn config(&self) -> &FaceConfig {
        &self.cfg
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    pub fn capabilities(&self) -> &CapabilityMap {
        &self.caps
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synth
    }

    pub fn idle(&self) -> &IdleEngine {
        &self.idle
    }

    pub fn talking(&self) -> Option<&Talking> {
        self.talking.as_ref()
    }

    pub fn is_talking(&self) -> bool {
        self.talking.is_some()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Bind the catalog against a freshly loaded asset's morph dictionary.
    ///
    /// Pending deferred actions are dropped first: they captured channel
    /// writes against the previous asset's indices.
    pub fn load_capabilities<D: MorphDictionary + ?Sized>(
        &mut self,
        dictionary: &D,
    ) -> &CapabilityMap {
        self.idle.cancel_pending();
        self.caps = resolve(self.catalog, dictionary);
        let bound = self.caps.len();
        let missing = self.catalog.len() - bound;
        self.pending_events
            .push(FaceEvent::CapabilitiesLoaded { bound, missing });
        if self.caps.is_empty() {
            log::warn!("no catalog channels resolved; face will not animate");
            self.pending_events
                .push(FaceEvent::Degraded(Degradation::NoCapabilitiesResolved));
        } else {
            log::debug!("capabilities loaded: {bound} bound, {missing} missing");
        }
        &self.caps
    }

    /// Synthesize and start a talking sequence at `now_ms`.
    ///
    /// Returns false (and reports a degradation) when nothing is resolved or
    /// the duration is not positive. A sequence already playing is replaced.
    pub fn start_talking(
        &mut self,
        now_ms: f64,
        duration_ms: f32,
        utterance: Option<&str>,
    ) -> bool {
        self.start_talking_with(now_ms, duration_ms, utterance, &mut UniformSelector)
    }

    pub fn start_talking_with(
        &mut self,
        now_ms: f64,
        duration_ms: f32,
        utterance: Option<&str>,
        selector: &mut dyn VisemeSelector,
    ) -> bool {
        if self.caps.is_empty() {
            log::warn!("start_talking ignored: no capabilities resolved");
            self.pending_events
                .push(FaceEvent::Degraded(Degradation::NoCapabilitiesResolved));
            return false;
        }
        if !(duration_ms.is_finite() && duration_ms > 0.0) {
            log::warn!("start_talking ignored: duration {duration_ms} ms");
            self.pending_events
                .push(FaceEvent::Degraded(Degradation::InvalidRequest { duration_ms }));
            return false;
        }

        let sequence = self
            .synth
            .synthesize_with(duration_ms, utterance, selector, self.rng.as_mut());
        if self.talking.is_some() {
            self.pending_events.push(FaceEvent::TalkingStopped);
        }
        self.pending_events.push(FaceEvent::TalkingStarted {
            frames: sequence.len(),
            duration_ms,
        });
        log::debug!("talking: {} frames over {duration_ms} ms", sequence.len());
        self.talking = Some(Talking {
            sequence,
            started_at_ms: now_ms,
            duration_ms,
        });
        true
    }

    /// Zero every mouth/jaw channel and drop the active sequence.
    pub fn stop_talking(&mut self, buffer: &mut [f32]) {
        reset_speech_channels(buffer, &self.caps);
        if self.talking.take().is_some() {
            self.pending_events.push(FaceEvent::TalkingStopped);
        }
    }

    /// Advance one render frame: talking frame first, then idle behaviours.
    pub fn on_tick(&mut self, now_ms: f64, buffer: &mut [f32]) -> &Outputs {
        self.outputs.clear();
        if self.shut_down {
            return &self.outputs;
        }
        self.outputs.events.append(&mut self.pending_events);

        let finished = self
            .talking
            .as_ref()
            .map(|t| t.is_finished(now_ms))
            .unwrap_or(false);
        if finished {
            reset_speech_channels(buffer, &self.caps);
            self.talking = None;
            self.outputs.push_event(FaceEvent::TalkingFinished);
        } else if let Some(talking) = &self.talking {
            let elapsed = talking.elapsed_ms(now_ms) as f32;
            if let Some(index) = talking.sequence.index_at(elapsed) {
                if let Some(frame) = talking.sequence.get(index) {
                    apply_frame(buffer, &self.caps, frame);
                    self.outputs.frame = Some(index);
                }
            }
        }

        self.idle
            .tick(now_ms, buffer, &self.caps, self.rng.as_mut(), &mut self.outputs);
        &self.outputs
    }

    /// Cancel every pending deferred action and stop ticking.
    pub fn shutdown(&mut self) {
        let dropped = self.idle.cancel_pending();
        self.talking = None;
        self.pending_events.clear();
        self.shut_down = true;
        log::debug!("face engine shut down ({dropped} pending actions dropped)");
    }
}
