use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use facs_face_core::{
    estimate_speech_duration_ms, FaceConfig, FaceEngine, PhonemeTiming, PhonemeTrackSelector,
};

#[wasm_bindgen]
pub struct FacsFace {
    core: FaceEngine,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Morph dictionaries arrive either as `{ name: index }` (three.js
/// `morphTargetDictionary`) or as an ordered list of names.
#[derive(Deserialize)]
#[serde(untagged)]
enum DictionaryInput {
    Map(HashMap<String, usize>),
    List(Vec<String>),
}

#[wasm_bindgen]
impl FacsFace {
    /// Create a face engine. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new FacsFace({ seed: 7, synth: { frame_rate: 30 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FacsFace, JsError> {
        console_error_panic_hook::set_once();

        let cfg: FaceConfig = if jsvalue_is_undefined_or_null(&config) {
            FaceConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let core = FaceEngine::try_new(cfg).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(FacsFace { core })
    }

    /// Bind the blendshape catalog to a loaded asset's morph dictionary.
    /// Returns the resolved `{ catalogName: index }` map.
    #[wasm_bindgen(js_name = load_capabilities)]
    pub fn load_capabilities(&mut self, dictionary: JsValue) -> Result<JsValue, JsError> {
        if jsvalue_is_undefined_or_null(&dictionary) {
            return Err(JsError::new("load_capabilities: dictionary is null/undefined"));
        }
        let input: DictionaryInput = swb::from_value(dictionary)
            .map_err(|e| JsError::new(&format!("load_capabilities parse error: {e}")))?;
        let caps = match &input {
            DictionaryInput::Map(map) => self.core.load_capabilities(map),
            DictionaryInput::List(names) => self.core.load_capabilities(names),
        };
        caps.to_index_map()
            .serialize(&swb::Serializer::json_compatible())
            .map_err(|e| JsError::new(&format!("capabilities error: {e}")))
    }

    /// Start talking for `duration_ms` from `now_ms`. Returns false when the
    /// request was ignored (nothing resolved or non-positive duration).
    #[wasm_bindgen(js_name = start_talking)]
    pub fn start_talking(&mut self, now_ms: f64, duration_ms: f32, text: Option<String>) -> bool {
        self.core.start_talking(now_ms, duration_ms, text.as_deref())
    }

    /// Start talking with externally timed phonemes
    /// (`[{ phoneme: "AA1", start_ms: 0, end_ms: 120 }, ...]`).
    #[wasm_bindgen(js_name = start_talking_phonemes)]
    pub fn start_talking_phonemes(
        &mut self,
        now_ms: f64,
        duration_ms: f32,
        phonemes: JsValue,
    ) -> Result<bool, JsError> {
        let timings: Vec<PhonemeTiming> = swb::from_value(phonemes)
            .map_err(|e| JsError::new(&format!("phoneme timing parse error: {e}")))?;
        let mut selector = PhonemeTrackSelector::new(timings);
        Ok(self
            .core
            .start_talking_with(now_ms, duration_ms, None, &mut selector))
    }

    /// Zero every mouth/jaw weight in `weights` and drop the active sequence.
    #[wasm_bindgen(js_name = stop_talking)]
    pub fn stop_talking(&mut self, weights: &mut [f32]) {
        self.core.stop_talking(weights);
    }

    /// Advance one render frame, writing into `weights` (the mesh's
    /// `morphTargetInfluences`). Returns `{ frame, events }`.
    pub fn tick(&mut self, now_ms: f64, weights: &mut [f32]) -> Result<JsValue, JsError> {
        let out = self.core.on_tick(now_ms, weights);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Catalog channels the loaded asset does not expose.
    #[wasm_bindgen(js_name = missing_capabilities)]
    pub fn missing_capabilities(&self) -> js_sys::Array {
        self.core
            .capabilities()
            .missing()
            .map(JsValue::from_str)
            .collect()
    }

    #[wasm_bindgen(js_name = is_talking)]
    pub fn is_talking(&self) -> bool {
        self.core.is_talking()
    }

    /// Cancel pending blink/expression actions; the face stops animating.
    pub fn shutdown(&mut self) {
        self.core.shutdown();
    }
}

/// Fallback speech duration for hosts without real audio timing.
#[wasm_bindgen]
pub fn estimate_duration_ms(text: &str) -> f32 {
    estimate_speech_duration_ms(text)
}

/// Route `log` records to the browser console. `level` defaults to "info".
#[wasm_bindgen]
pub fn init_logging(level: Option<String>) -> Result<(), JsError> {
    let level = match level.as_deref() {
        Some(l) => log::Level::from_str(l).map_err(|e| JsError::new(&format!("log level: {e}")))?,
        None => log::Level::Info,
    };
    console_log::init_with_level(level).map_err(|e| JsError::new(&format!("init_logging: {e}")))
}

#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
