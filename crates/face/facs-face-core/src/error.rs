//! Error and degradation types.
//!
//! Nothing in the animation path fails hard. [`FaceError`] is returned only by
//! parsing/validation entry points; runtime problems are reported as
//! [`Degradation`] values and the engine animates whatever it still can.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceError {
    #[error("config parse error: {0}")]
    ConfigParse(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("capability dictionary parse error: {0}")]
    DictionaryParse(String),
}

/// Non-fatal conditions. Each one degrades to "animate nothing" for the
/// affected channel or request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// A catalog or viseme channel has no index on the loaded asset.
    MissingCapability { name: String },
    /// Talking was requested with a non-positive or non-finite duration.
    InvalidRequest { duration_ms: f32 },
    /// The loaded asset exposes none of the catalog channels.
    NoCapabilitiesResolved,
}
