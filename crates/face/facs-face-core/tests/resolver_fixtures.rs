use facs_face_core::{
    catalog::Catalog,
    config::FaceConfig,
    error::FaceError,
    resolver::{parse_dictionary_json, resolve, resolve_with, AliasTable},
};
use facs_test_fixtures::{capabilities, configs};

#[test]
fn exact_names_bind_every_channel() {
    let dict = capabilities::dictionary("arkit-exact").expect("load arkit-exact");
    let caps = resolve(Catalog::arkit(), &dict);
    assert_eq!(caps.len(), 51);
    assert!(caps.bindings().all(|b| b.via == "exact"));
    assert_eq!(caps.index("eyeBlinkLeft"), Some(0));
    assert_eq!(caps.index("jawRight"), Some(50));
    assert_eq!(caps.missing().count(), 0);
}

#[test]
fn snake_case_dictionary_resolves_through_alias() {
    let dict = capabilities::dictionary("snake-case").expect("load snake-case");
    let caps = resolve(Catalog::arkit(), &dict);
    assert_eq!(caps.len(), 51);
    let b = caps.binding("mouthSmileLeft").expect("mouthSmileLeft bound");
    assert_eq!(b.via, "snake_case");
    assert_eq!(b.index, dict["mouth_smile_left"]);
}

#[test]
fn prefixed_dictionary_resolves_past_unrelated_entries() {
    let json = capabilities::json("arkit-prefixed").expect("load arkit-prefixed");
    let dict = parse_dictionary_json(&json).expect("parse dictionary");
    let caps = resolve(Catalog::arkit(), &dict);
    assert_eq!(caps.len(), 51);
    assert_eq!(caps.index("eyeBlinkLeft"), Some(1));
    assert_eq!(caps.binding("jawOpen").map(|b| b.via), Some("arkit_prefix"));
}

#[test]
fn exact_match_wins_over_prefixed_alias() {
    let dict = capabilities::dictionary("exact-and-prefixed").expect("load fixture");
    let caps = resolve(Catalog::arkit(), &dict);
    assert_eq!(caps.index("jawOpen"), Some(1));
    assert_eq!(caps.binding("jawOpen").map(|b| b.via), Some("exact"));
    assert_eq!(caps.index("eyeBlinkLeft"), Some(2));
    assert_eq!(caps.len(), 2);
}

#[test]
fn partial_asset_reports_missing_channels() {
    let dict = capabilities::dictionary("partial").expect("load partial");
    let caps = resolve(Catalog::arkit(), &dict);
    assert_eq!(caps.len(), 8);
    assert_eq!(caps.missing().count(), 43);
    assert!(caps.missing().any(|n| n == "eyeSquintLeft"));
    assert!(!caps.contains("viseme_aa"));

    let exported = caps.to_index_map();
    assert_eq!(exported.get("jawOpen"), Some(&9));
}

#[test]
fn unrelated_dictionary_resolves_nothing() {
    let dict = capabilities::dictionary("unrelated").expect("load unrelated");
    assert!(resolve(Catalog::arkit(), &dict).is_empty());
}

fn blender_dot(name: &str) -> String {
    format!("Face.{name}")
}

#[test]
fn custom_alias_rule_extends_resolution() {
    let dict: Vec<String> = vec!["Face.jawOpen".into(), "jawForward".into()];
    let mut table = AliasTable::standard();
    table.push("blender_dot", blender_dot);
    let caps = resolve_with(Catalog::arkit(), &dict, &table);
    assert_eq!(caps.binding("jawOpen").map(|b| (b.index, b.via)), Some((0, "blender_dot")));
    assert_eq!(caps.binding("jawForward").map(|b| b.via), Some("exact"));
}

#[test]
fn config_fixtures_parse_and_validate() {
    let cfg = FaceConfig::from_json(&configs::json("seeded-30fps").unwrap()).expect("valid config");
    assert_eq!(cfg.seed, Some(42));
    assert_eq!(cfg.synth.frame_rate, 30.0);
    assert_eq!(cfg.synth.transition_ms, 50.0);

    let err = FaceConfig::from_json(&configs::json("invalid-hold").unwrap()).unwrap_err();
    assert!(matches!(err, FaceError::InvalidConfig(_)), "{err}");
}
