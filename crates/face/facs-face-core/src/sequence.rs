//! Frame-indexed talking timelines produced by the synthesizer.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Blendshape name -> weight.
pub type Weights = HashMap<String, f32>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub time_ms: f32,
    pub weights: Weights,
    /// True when no event landed on this index and the weights were carried forward.
    #[serde(default)]
    pub filled: bool,
}

/// Fixed-rate sequence of frames; index `i` covers `[i, i+1) * 1000 / frame_rate` ms.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub frame_rate: f32,
    pub duration_ms: f32,
    pub frames: Vec<Frame>,
}

impl Sequence {
    pub fn empty(frame_rate: f32) -> Self {
        Self {
            frame_rate,
            duration_ms: 0.0,
            frames: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn frame_ms(&self) -> f32 {
        1000.0 / self.frame_rate
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Frame index covering `elapsed_ms` of playback, if it falls inside the sequence.
    pub fn index_at(&self, elapsed_ms: f32) -> Option<usize> {
        if !elapsed_ms.is_finite() || elapsed_ms < 0.0 || self.frame_rate <= 0.0 {
            return None;
        }
        let idx = (elapsed_ms / self.frame_ms()).floor() as usize;
        (idx < self.frames.len()).then_some(idx)
    }

    pub fn frame_at(&self, elapsed_ms: f32) -> Option<&Frame> {
        self.index_at(elapsed_ms).and_then(|i| self.frames.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}
