//! Blendshape catalog: every facial-control channel the engine knows about.
//!
//! Names follow the ARKit face-tracking convention (51 channels). The table is
//! process-wide and immutable; per-asset availability lives in
//! [`CapabilityMap`](crate::resolver::CapabilityMap), never here.

use serde::{Deserialize, Serialize};

use crate::sequence::Weights;

/// Semantic region a channel belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Eyes,
    Brow,
    Cheek,
    Nose,
    Mouth,
    Jaw,
}

impl Group {
    /// Mouth and jaw channels are owned by speech and reset on every talking frame.
    #[inline]
    pub fn is_speech(self) -> bool {
        matches!(self, Group::Mouth | Group::Jaw)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct BlendshapeDef {
    pub name: &'static str,
    pub group: Group,
    /// Weight ceiling applied by the compositor.
    pub max: f32,
    pub default: f32,
}

const fn def(name: &'static str, group: Group) -> BlendshapeDef {
    BlendshapeDef {
        name,
        group,
        max: 1.0,
        default: 0.0,
    }
}

pub static ARKIT_BLENDSHAPES: [BlendshapeDef; 51] = [
    // Eyes
    def("eyeBlinkLeft", Group::Eyes),
    def("eyeBlinkRight", Group::Eyes),
    def("eyeSquintLeft", Group::Eyes),
    def("eyeSquintRight", Group::Eyes),
    def("eyeWideLeft", Group::Eyes),
    def("eyeWideRight", Group::Eyes),
    def("eyeLookUpLeft", Group::Eyes),
    def("eyeLookUpRight", Group::Eyes),
    def("eyeLookDownLeft", Group::Eyes),
    def("eyeLookDownRight", Group::Eyes),
    def("eyeLookInLeft", Group::Eyes),
    def("eyeLookInRight", Group::Eyes),
    def("eyeLookOutLeft", Group::Eyes),
    def("eyeLookOutRight", Group::Eyes),
    // Brow
    def("browDownLeft", Group::Brow),
    def("browDownRight", Group::Brow),
    def("browInnerUp", Group::Brow),
    def("browOuterUpLeft", Group::Brow),
    def("browOuterUpRight", Group::Brow),
    // Cheek
    def("cheekPuff", Group::Cheek),
    def("cheekSquintLeft", Group::Cheek),
    def("cheekSquintRight", Group::Cheek),
    // Nose
    def("noseSneerLeft", Group::Nose),
    def("noseSneerRight", Group::Nose),
    // Mouth
    def("mouthLeft", Group::Mouth),
    def("mouthRight", Group::Mouth),
    def("mouthFunnel", Group::Mouth),
    def("mouthPucker", Group::Mouth),
    def("mouthRollUpper", Group::Mouth),
    def("mouthRollLower", Group::Mouth),
    def("mouthShrugUpper", Group::Mouth),
    def("mouthShrugLower", Group::Mouth),
    def("mouthClose", Group::Mouth),
    def("mouthSmileLeft", Group::Mouth),
    def("mouthSmileRight", Group::Mouth),
    def("mouthFrownLeft", Group::Mouth),
    def("mouthFrownRight", Group::Mouth),
    def("mouthDimpleLeft", Group::Mouth),
    def("mouthDimpleRight", Group::Mouth),
    def("mouthUpperUpLeft", Group::Mouth),
    def("mouthUpperUpRight", Group::Mouth),
    def("mouthLowerDownLeft", Group::Mouth),
    def("mouthLowerDownRight", Group::Mouth),
    def("mouthPressLeft", Group::Mouth),
    def("mouthPressRight", Group::Mouth),
    def("mouthStretchLeft", Group::Mouth),
    def("mouthStretchRight", Group::Mouth),
    // Jaw
    def("jawOpen", Group::Jaw),
    def("jawForward", Group::Jaw),
    def("jawLeft", Group::Jaw),
    def("jawRight", Group::Jaw),
];

/// Read-only view over a static blendshape table.
#[derive(Copy, Clone, Debug)]
pub struct Catalog {
    entries: &'static [BlendshapeDef],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::arkit()
    }
}

impl Catalog {
    pub fn arkit() -> Self {
        Self {
            entries: &ARKIT_BLENDSHAPES,
        }
    }

    pub fn from_static(entries: &'static [BlendshapeDef]) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&'static BlendshapeDef> {
        self.entries.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static BlendshapeDef> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weight-set holding every channel at its default.
    pub fn defaults(&self) -> Weights {
        self.entries
            .iter()
            .map(|d| (d.name.to_string(), d.default))
            .collect()
    }
}
