//! Host-side helpers. The engine never calls these; hosts use them when the
//! real spoken-audio duration is unavailable.

pub const BASE_DURATION_MS: f32 = 1000.0;
pub const PER_WORD_MS: f32 = 200.0;

/// Fallback talking duration for `text`: `1000 + words * 200` ms.
pub fn estimate_speech_duration_ms(text: &str) -> f32 {
    BASE_DURATION_MS + text.split_whitespace().count() as f32 * PER_WORD_MS
}
