//! Viseme and talking-pattern tables.
//!
//! The canonical speech model is a library of visemes (mouth shapes), each a
//! sparse set of target weights on mouth/jaw channels. The older fixed
//! keyframe patterns are kept as data and fold into the same library: a
//! pattern becomes a single viseme whose target is its strongest keyframe.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::Degradation;
use crate::sequence::Weights;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisemeDef {
    pub id: String,
    pub weights: Weights,
}

impl VisemeDef {
    pub fn new(id: impl Into<String>, weights: &[(&str, f32)]) -> Self {
        Self {
            id: id.into(),
            weights: weights.iter().map(|(n, w)| (n.to_string(), *w)).collect(),
        }
    }
}

type VisemeRow = (&'static str, &'static [(&'static str, f32)]);

/// Standard viseme set (silence + 14 articulations).
pub const STANDARD_VISEMES: &[VisemeRow] = &[
    ("sil", &[("jawOpen", 0.02), ("mouthClose", 0.1)]),
    (
        "PP",
        &[
            ("jawOpen", 0.05),
            ("mouthClose", 0.4),
            ("mouthPressLeft", 0.3),
            ("mouthPressRight", 0.3),
            ("mouthRollLower", 0.2),
        ],
    ),
    (
        "FF",
        &[
            ("jawOpen", 0.1),
            ("mouthRollLower", 0.5),
            ("mouthUpperUpLeft", 0.2),
            ("mouthUpperUpRight", 0.2),
            ("mouthFunnel", 0.1),
        ],
    ),
    (
        "TH",
        &[
            ("jawOpen", 0.15),
            ("mouthRollUpper", 0.1),
            ("mouthStretchLeft", 0.1),
            ("mouthStretchRight", 0.1),
        ],
    ),
    (
        "DD",
        &[
            ("jawOpen", 0.2),
            ("mouthShrugUpper", 0.1),
            ("mouthStretchLeft", 0.15),
            ("mouthStretchRight", 0.15),
        ],
    ),
    (
        "kk",
        &[
            ("jawOpen", 0.25),
            ("mouthStretchLeft", 0.2),
            ("mouthStretchRight", 0.2),
        ],
    ),
    (
        "CH",
        &[
            ("jawOpen", 0.15),
            ("mouthFunnel", 0.4),
            ("mouthPucker", 0.3),
            ("mouthShrugUpper", 0.2),
        ],
    ),
    (
        "SS",
        &[
            ("jawOpen", 0.1),
            ("mouthSmileLeft", 0.2),
            ("mouthSmileRight", 0.2),
            ("mouthStretchLeft", 0.3),
            ("mouthStretchRight", 0.3),
        ],
    ),
    (
        "nn",
        &[
            ("jawOpen", 0.15),
            ("mouthClose", 0.1),
            ("mouthStretchLeft", 0.1),
            ("mouthStretchRight", 0.1),
        ],
    ),
    (
        "RR",
        &[("jawOpen", 0.15), ("mouthPucker", 0.4), ("mouthFunnel", 0.2)],
    ),
    (
        "aa",
        &[
            ("jawOpen", 0.7),
            ("mouthLowerDownLeft", 0.3),
            ("mouthLowerDownRight", 0.3),
            ("mouthStretchLeft", 0.2),
            ("mouthStretchRight", 0.2),
        ],
    ),
    (
        "E",
        &[
            ("jawOpen", 0.3),
            ("mouthSmileLeft", 0.4),
            ("mouthSmileRight", 0.4),
            ("mouthStretchLeft", 0.3),
            ("mouthStretchRight", 0.3),
        ],
    ),
    (
        "I",
        &[
            ("jawOpen", 0.2),
            ("mouthSmileLeft", 0.3),
            ("mouthSmileRight", 0.3),
            ("mouthStretchLeft", 0.4),
            ("mouthStretchRight", 0.4),
        ],
    ),
    (
        "O",
        &[("jawOpen", 0.4), ("mouthPucker", 0.7), ("mouthFunnel", 0.3)],
    ),
    (
        "U",
        &[("jawOpen", 0.2), ("mouthPucker", 0.8), ("mouthFunnel", 0.5)],
    ),
];

/// ARPAbet phoneme -> viseme id. Lookups ignore case and stress digits.
pub const PHONEME_TO_VISEME: &[(&str, &str)] = &[
    ("SIL", "sil"),
    ("SP", "sil"),
    ("AA", "aa"),
    ("AE", "aa"),
    ("AH", "aa"),
    ("AO", "O"),
    ("AW", "aa"),
    ("AY", "aa"),
    ("B", "PP"),
    ("CH", "CH"),
    ("D", "DD"),
    ("DH", "TH"),
    ("EH", "E"),
    ("ER", "RR"),
    ("EY", "E"),
    ("F", "FF"),
    ("G", "kk"),
    ("HH", "kk"),
    ("IH", "I"),
    ("IY", "I"),
    ("JH", "CH"),
    ("K", "kk"),
    ("L", "nn"),
    ("M", "PP"),
    ("N", "nn"),
    ("NG", "kk"),
    ("OW", "O"),
    ("OY", "O"),
    ("P", "PP"),
    ("R", "RR"),
    ("S", "SS"),
    ("SH", "CH"),
    ("T", "DD"),
    ("TH", "TH"),
    ("UH", "U"),
    ("UW", "U"),
    ("V", "FF"),
    ("W", "U"),
    ("Y", "I"),
    ("Z", "SS"),
    ("ZH", "CH"),
];

pub fn viseme_for_phoneme(phoneme: &str) -> Option<&'static str> {
    let key = phoneme.trim().trim_end_matches(|c: char| c.is_ascii_digit());
    PHONEME_TO_VISEME
        .iter()
        .find(|(p, _)| p.eq_ignore_ascii_case(key))
        .map(|(_, v)| *v)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time_offset_ms: f32,
    pub weights: Weights,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TalkingPattern {
    pub id: String,
    pub keyframes: Vec<Keyframe>,
}

impl TalkingPattern {
    pub fn duration_ms(&self) -> f32 {
        self.keyframes.last().map(|k| k.time_offset_ms).unwrap_or(0.0)
    }

    /// Keyframe with the largest summed weight, ties resolved to the earliest.
    pub fn peak(&self) -> Option<&Keyframe> {
        let energy = |k: &Keyframe| k.weights.values().sum::<f32>();
        self.keyframes.iter().fold(None, |best: Option<&Keyframe>, k| match best {
            Some(b) if energy(b) >= energy(k) => Some(b),
            _ => Some(k),
        })
    }

    pub fn to_viseme(&self) -> Option<VisemeDef> {
        self.peak().map(|k| VisemeDef {
            id: self.id.clone(),
            weights: k.weights.clone(),
        })
    }
}

type PatternRow = (&'static str, &'static [(f32, &'static [(&'static str, f32)])]);

const LEGACY_PATTERNS: &[PatternRow] = &[
    (
        "vowel-a",
        &[
            (0.0, &[("jawOpen", 0.0), ("mouthClose", 0.0)]),
            (
                100.0,
                &[
                    ("jawOpen", 0.7),
                    ("mouthClose", 0.0),
                    ("mouthStretchLeft", 0.2),
                    ("mouthStretchRight", 0.2),
                ],
            ),
            (
                400.0,
                &[
                    ("jawOpen", 0.7),
                    ("mouthClose", 0.0),
                    ("mouthStretchLeft", 0.2),
                    ("mouthStretchRight", 0.2),
                ],
            ),
            (500.0, &[("jawOpen", 0.1), ("mouthClose", 0.1)]),
        ],
    ),
    (
        "vowel-e",
        &[
            (
                0.0,
                &[
                    ("jawOpen", 0.0),
                    ("mouthClose", 0.0),
                    ("mouthSmileLeft", 0.0),
                    ("mouthSmileRight", 0.0),
                ],
            ),
            (
                100.0,
                &[
                    ("jawOpen", 0.2),
                    ("mouthClose", 0.0),
                    ("mouthSmileLeft", 0.4),
                    ("mouthSmileRight", 0.4),
                    ("mouthStretchLeft", 0.3),
                    ("mouthStretchRight", 0.3),
                ],
            ),
            (
                300.0,
                &[
                    ("jawOpen", 0.3),
                    ("mouthClose", 0.0),
                    ("mouthSmileLeft", 0.4),
                    ("mouthSmileRight", 0.4),
                    ("mouthStretchLeft", 0.3),
                    ("mouthStretchRight", 0.3),
                ],
            ),
            (
                400.0,
                &[
                    ("jawOpen", 0.1),
                    ("mouthClose", 0.1),
                    ("mouthSmileLeft", 0.1),
                    ("mouthSmileRight", 0.1),
                ],
            ),
        ],
    ),
    (
        "vowel-o",
        &[
            (
                0.0,
                &[("jawOpen", 0.0), ("mouthClose", 0.0), ("mouthPucker", 0.0)],
            ),
            (
                100.0,
                &[
                    ("jawOpen", 0.3),
                    ("mouthClose", 0.0),
                    ("mouthPucker", 0.7),
                    ("mouthFunnel", 0.3),
                ],
            ),
            (
                300.0,
                &[
                    ("jawOpen", 0.4),
                    ("mouthClose", 0.0),
                    ("mouthPucker", 0.7),
                    ("mouthFunnel", 0.3),
                ],
            ),
            (
                400.0,
                &[("jawOpen", 0.1), ("mouthClose", 0.1), ("mouthPucker", 0.1)],
            ),
        ],
    ),
    (
        "consonant-m",
        &[
            (
                0.0,
                &[
                    ("jawOpen", 0.1),
                    ("mouthClose", 0.3),
                    ("mouthPressLeft", 0.2),
                    ("mouthPressRight", 0.2),
                ],
            ),
            (
                200.0,
                &[
                    ("jawOpen", 0.1),
                    ("mouthClose", 0.3),
                    ("mouthPressLeft", 0.2),
                    ("mouthPressRight", 0.2),
                ],
            ),
            (300.0, &[("jawOpen", 0.0), ("mouthClose", 0.0)]),
        ],
    ),
];

/// The four vowel/consonant keyframe patterns of the pattern-based generator.
pub fn legacy_patterns() -> Vec<TalkingPattern> {
    LEGACY_PATTERNS
        .iter()
        .map(|(id, keys)| TalkingPattern {
            id: id.to_string(),
            keyframes: keys
                .iter()
                .map(|(t, w)| Keyframe {
                    time_offset_ms: *t,
                    weights: w.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
                })
                .collect(),
        })
        .collect()
}

/// Ordered set of visemes the synthesizer draws from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisemeLibrary {
    visemes: Vec<VisemeDef>,
}

impl Default for VisemeLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

impl VisemeLibrary {
    pub fn new(visemes: Vec<VisemeDef>) -> Self {
        Self { visemes }
    }

    pub fn standard() -> Self {
        Self::new(
            STANDARD_VISEMES
                .iter()
                .map(|(id, w)| VisemeDef::new(*id, w))
                .collect(),
        )
    }

    /// One viseme per pattern, targeting the pattern's peak keyframe.
    pub fn from_patterns(patterns: &[TalkingPattern]) -> Self {
        Self::new(patterns.iter().filter_map(TalkingPattern::to_viseme).collect())
    }

    pub fn get(&self, index: usize) -> Option<&VisemeDef> {
        self.visemes.get(index)
    }

    pub fn find(&self, id: &str) -> Option<(usize, &VisemeDef)> {
        self.visemes.iter().enumerate().find(|(_, v)| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.visemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visemes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisemeDef> {
        self.visemes.iter()
    }

    /// Channels referenced by any viseme that the catalog does not define.
    pub fn validate(&self, catalog: &Catalog) -> Vec<Degradation> {
        let mut unknown: Vec<String> = self
            .visemes
            .iter()
            .flat_map(|v| v.weights.keys())
            .filter(|name| !catalog.contains(name))
            .cloned()
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
            .into_iter()
            .map(|name| Degradation::MissingCapability { name })
            .collect()
    }
}
