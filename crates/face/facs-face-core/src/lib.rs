//! FACS Face Core (engine-agnostic)
//!
//! Procedural facial animation for blendshape-driven 3D faces: resolves the
//! ARKit catalog against an asset's morph dictionary, synthesizes viseme
//! talking timelines, runs idle behaviours (blink, expressions, drift) and
//! composites both into a host-owned weight buffer once per tick.
//!
//! The host owns the clock: every time-dependent call takes `now_ms`, so the
//! whole engine can be driven with synthetic timestamps.

pub mod buffer;
pub mod catalog;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod idle;
pub mod ids;
pub mod outputs;
pub mod resolver;
pub mod rng;
pub mod scheduler;
pub mod sequence;
pub mod synth;
pub mod visemes;

// Re-exports for consumers (adapters)
pub use buffer::WeightBuffer;
pub use catalog::{BlendshapeDef, Catalog, Group, ARKIT_BLENDSHAPES};
pub use compositor::{apply_frame, reset_speech_channels};
pub use config::{
    BlinkConfig, DriftConfig, ExpressionConfig, FaceConfig, IdleConfig, MicroConfig, SmileFloor,
    SynthConfig,
};
pub use engine::{FaceEngine, Talking};
pub use error::{Degradation, FaceError};
pub use host::estimate_speech_duration_ms;
pub use idle::{BlinkState, ExpressionState, IdleEngine};
pub use ids::ActionId;
pub use outputs::{ExpressionKind, FaceEvent, MicroKind, Outputs};
pub use resolver::{
    parse_dictionary_json, resolve, resolve_with, AliasTable, Binding, CapabilityMap,
    MorphDictionary,
};
pub use rng::{RandomSource, ScriptedRandom, StdRandom};
pub use scheduler::{ActionQueue, Behavior, DeferredAction, ScheduledAction};
pub use sequence::{Frame, Sequence, Weights};
pub use synth::{
    synthesize, PhonemeTiming, PhonemeTrackSelector, Synthesizer, UniformSelector, VisemeSelector,
};
pub use visemes::{
    legacy_patterns, viseme_for_phoneme, Keyframe, TalkingPattern, VisemeDef, VisemeLibrary,
};
