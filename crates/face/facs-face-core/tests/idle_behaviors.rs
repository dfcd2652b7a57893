use facs_face_core::{
    catalog::Catalog,
    config::IdleConfig,
    idle::{IdleEngine, GAZE_CHANNELS},
    outputs::{ExpressionKind, FaceEvent, MicroKind, Outputs},
    resolver::{resolve, CapabilityMap},
    rng::ScriptedRandom,
    scheduler::{Behavior, DeferredAction},
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn caps(names: &[&str]) -> CapabilityMap {
    let dict: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    resolve(Catalog::arkit(), &dict)
}

fn value(buffer: &[f32], caps: &CapabilityMap, name: &str) -> f32 {
    buffer[caps.index(name).expect("bound channel")]
}

/// Idle config with automatic blinking pushed out of reach.
fn no_auto_blink() -> IdleConfig {
    let mut cfg = IdleConfig::default();
    cfg.blink.min_delay_ms = 1.0e9;
    cfg.blink.max_delay_ms = 1.0e9 + 1.0;
    cfg
}

const EYES: [&str; 4] = ["eyeBlinkLeft", "eyeBlinkRight", "eyeSquintLeft", "eyeSquintRight"];

#[test]
fn blink_plays_five_steps_then_returns_to_idle() {
    let caps = caps(&EYES);
    let mut idle = IdleEngine::new(IdleConfig::default());
    // 0.5 gives zero asymmetry jitter and never passes the micro-expression roll.
    let mut rng = ScriptedRandom::constant(0.5);
    let mut out = Outputs::default();
    let mut buffer = vec![0.0f32; 4];

    idle.arm(0.0, &mut rng);
    assert!(idle.trigger_blink(1000.0, &mut rng));
    let scheduled: Vec<(f64, usize)> = idle
        .pending()
        .iter()
        .map(|a| match a.action {
            DeferredAction::BlinkStep { step } => (a.fire_at_ms, step),
            _ => panic!("unexpected action {:?}", a.action),
        })
        .collect();
    assert_eq!(
        scheduled,
        vec![(1000.0, 0), (1050.0, 1), (1100.0, 2), (1150.0, 3), (1200.0, 4)]
    );

    let expected = [0.0, 0.5, 1.0, 0.5, 0.0];
    for (i, want) in expected.iter().enumerate() {
        assert!(idle.blink_state().is_blinking);
        idle.tick(1000.0 + 50.0 * i as f64, &mut buffer, &caps, &mut rng, &mut out);
        approx(value(&buffer, &caps, "eyeBlinkLeft"), *want, 1e-6);
        approx(value(&buffer, &caps, "eyeBlinkRight"), *want, 1e-6);
        approx(value(&buffer, &caps, "eyeSquintLeft"), want * 0.3, 1e-6);
        approx(value(&buffer, &caps, "eyeSquintRight"), want * 0.3, 1e-6);
    }
    assert!(!idle.blink_state().is_blinking);
    assert!(idle.pending().is_empty());
}

#[test]
fn blink_asymmetry_stays_within_ten_percent() {
    let caps = caps(&EYES);
    let mut idle = IdleEngine::new(IdleConfig::default());
    let mut out = Outputs::default();
    let mut buffer = vec![0.0f32; 4];
    // Left eye jitter at the low end, right eye at the high end.
    let mut rng = ScriptedRandom::new(vec![0.0, 0.999_999]);
    idle.arm(0.0, &mut rng);
    idle.trigger_blink(0.0, &mut rng);
    idle.tick(50.0, &mut buffer, &caps, &mut rng, &mut out);
    let left = value(&buffer, &caps, "eyeBlinkLeft");
    let right = value(&buffer, &caps, "eyeBlinkRight");
    assert!(left >= 0.45 - 1e-6 && left <= 0.55 + 1e-6, "{left}");
    assert!(right >= 0.45 - 1e-6 && right <= 0.55 + 1e-6, "{right}");
    assert!(left < right);
}

#[test]
fn blink_triggers_after_delay_and_never_overlaps() {
    let caps = caps(&EYES);
    let mut idle = IdleEngine::new(IdleConfig::default());
    let mut rng = ScriptedRandom::constant(0.5);
    let mut buffer = vec![0.0f32; 4];

    let mut out = Outputs::default();
    idle.tick(0.0, &mut buffer, &caps, &mut rng, &mut out);
    // Delay drawn at arm time: 2000 + 4000 * 0.5.
    assert_eq!(idle.blink_state().next_delay_ms, 4000.0);

    out.clear();
    idle.tick(4000.0, &mut buffer, &caps, &mut rng, &mut out);
    assert!(out.events.is_empty());

    out.clear();
    idle.tick(4000.5, &mut buffer, &caps, &mut rng, &mut out);
    assert_eq!(out.events, vec![FaceEvent::BlinkStarted { at_ms: 4000.5 }]);
    assert_eq!(idle.pending().pending_for(Behavior::Blink), 4);

    // Still past the delay, but the first blink is in flight.
    out.clear();
    idle.tick(4100.0, &mut buffer, &caps, &mut rng, &mut out);
    assert!(out.events.is_empty());
    assert_eq!(idle.pending().pending_for(Behavior::Blink), 3);

    // A late tick drains the rest in order.
    idle.tick(9000.0, &mut buffer, &caps, &mut rng, &mut out);
    assert!(!idle.blink_state().is_blinking);
    assert_eq!(value(&buffer, &caps, "eyeBlinkLeft"), 0.0);
    assert_eq!(idle.blink_state().last_blink_at_ms, 4000.5);
}

fn expression_events(out: &Outputs) -> Vec<ExpressionKind> {
    out.events
        .iter()
        .filter_map(|e| match e {
            FaceEvent::IdleExpression { kind } => Some(*kind),
            _ => None,
        })
        .collect()
}

const EXPRESSION_CHANNELS: [&str; 5] = [
    "eyeBlinkRight",
    "mouthSmileLeft",
    "mouthSmileRight",
    "cheekSquintLeft",
    "cheekSquintRight",
];

#[test]
fn expression_fires_on_every_fourth_interval() {
    let caps = caps(&EXPRESSION_CHANNELS);
    let mut idle = IdleEngine::new(no_auto_blink());
    let mut rng = ScriptedRandom::constant(0.5);
    let mut buffer = vec![0.0f32; 5];
    let mut out = Outputs::default();
    idle.tick(0.0, &mut buffer, &caps, &mut rng, &mut out);

    let mut fired = Vec::new();
    for k in 1..=12u32 {
        out.clear();
        idle.tick(k as f64 * 15_001.0, &mut buffer, &caps, &mut rng, &mut out);
        if !expression_events(&out).is_empty() {
            fired.push(k);
        }
        assert_eq!(idle.expression_state().interval_count, k % 4);
    }
    assert_eq!(fired, vec![4, 8, 12]);
}

#[test]
fn wink_sets_one_side_and_reverts() {
    let caps = caps(&EXPRESSION_CHANNELS);
    let mut idle = IdleEngine::new(no_auto_blink());
    // >= 0.5 chooses the wink.
    let mut rng = ScriptedRandom::constant(0.5);
    let mut buffer = vec![0.0f32; 5];
    let mut out = Outputs::default();
    idle.tick(0.0, &mut buffer, &caps, &mut rng, &mut out);
    for k in 1..=3 {
        idle.tick(k as f64 * 15_001.0, &mut buffer, &caps, &mut rng, &mut out);
    }

    out.clear();
    let fire_at = 4.0 * 15_001.0;
    idle.tick(fire_at, &mut buffer, &caps, &mut rng, &mut out);
    assert_eq!(expression_events(&out), vec![ExpressionKind::Wink]);
    assert_eq!(value(&buffer, &caps, "eyeBlinkRight"), 1.0);
    approx(value(&buffer, &caps, "mouthSmileRight"), 0.3, 1e-6);
    // Smile floor on the other side.
    approx(value(&buffer, &caps, "mouthSmileLeft"), 0.1, 1e-6);
    assert_eq!(idle.expression_state().active, Some(ExpressionKind::Wink));

    idle.tick(fire_at + 399.0, &mut buffer, &caps, &mut rng, &mut out);
    assert_eq!(value(&buffer, &caps, "eyeBlinkRight"), 1.0);
    idle.tick(fire_at + 400.0, &mut buffer, &caps, &mut rng, &mut out);
    assert_eq!(value(&buffer, &caps, "eyeBlinkRight"), 0.0);
    approx(value(&buffer, &caps, "mouthSmileRight"), 0.1, 1e-6);
    assert_eq!(idle.expression_state().active, None);
}

#[test]
fn smile_sets_both_sides_with_cheeks_and_reverts() {
    let caps = caps(&EXPRESSION_CHANNELS);
    let mut cfg = no_auto_blink();
    cfg.expression.every = 1;
    let mut idle = IdleEngine::new(cfg);
    // < 0.5 chooses the smile.
    let mut rng = ScriptedRandom::constant(0.2);
    let mut buffer = vec![0.0f32; 5];
    let mut out = Outputs::default();
    idle.tick(0.0, &mut buffer, &caps, &mut rng, &mut out);

    out.clear();
    idle.tick(15_001.0, &mut buffer, &caps, &mut rng, &mut out);
    assert_eq!(expression_events(&out), vec![ExpressionKind::Smile]);
    for name in ["mouthSmileLeft", "mouthSmileRight"] {
        approx(value(&buffer, &caps, name), 0.3, 1e-6);
    }
    for name in ["cheekSquintLeft", "cheekSquintRight"] {
        approx(value(&buffer, &caps, name), 0.2, 1e-6);
    }

    idle.tick(17_001.0, &mut buffer, &caps, &mut rng, &mut out);
    approx(value(&buffer, &caps, "mouthSmileLeft"), 0.1, 1e-6);
    assert_eq!(value(&buffer, &caps, "cheekSquintRight"), 0.0);
}

#[test]
fn active_expression_blocks_the_next_one() {
    let caps = caps(&EXPRESSION_CHANNELS);
    let mut cfg = no_auto_blink();
    cfg.expression.every = 1;
    cfg.expression.wink_ms = 20_000.0;
    let mut idle = IdleEngine::new(cfg);
    let mut rng = ScriptedRandom::constant(0.5);
    let mut buffer = vec![0.0f32; 5];
    let mut out = Outputs::default();
    idle.tick(0.0, &mut buffer, &caps, &mut rng, &mut out);

    let mut fired = Vec::new();
    for k in 1..=4u32 {
        out.clear();
        idle.tick(k as f64 * 15_001.0, &mut buffer, &caps, &mut rng, &mut out);
        if !expression_events(&out).is_empty() {
            fired.push(k);
        }
    }
    // Revert lands at 35_001, after the third interval check has already been skipped.
    assert_eq!(fired, vec![1, 4]);
}

#[test]
fn gaze_drift_checks_availability_before_rolling() {
    let caps = caps(&GAZE_CHANNELS);
    let mut idle = IdleEngine::new(IdleConfig::default());
    let mut script = vec![0.5];
    for _ in 0..GAZE_CHANNELS.len() {
        // chance passes, delta = -0.05 + 0.1 * 0.75
        script.extend([0.0, 0.75]);
    }
    script.push(0.5);
    let mut rng = ScriptedRandom::new(script);
    let mut buffer = vec![0.0f32; 8];
    let mut out = Outputs::default();
    idle.tick(0.0, &mut buffer, &caps, &mut rng, &mut out);

    for name in GAZE_CHANNELS {
        approx(value(&buffer, &caps, name), 0.025, 1e-6);
    }
    // arm + 8 * (roll + delta) + micro roll; brow channels are absent.
    assert_eq!(rng.drawn(), 18);
}

#[test]
fn micro_expression_sets_pair_within_intensity() {
    let caps = caps(&["noseSneerLeft", "noseSneerRight"]);
    let mut idle = IdleEngine::new(IdleConfig::default());
    let mut rng = ScriptedRandom::new(vec![0.5, 0.0, 0.9, 0.5, 0.5]);
    let mut buffer = vec![0.0f32; 2];
    let mut out = Outputs::default();
    idle.tick(0.0, &mut buffer, &caps, &mut rng, &mut out);

    assert_eq!(
        out.events,
        vec![FaceEvent::MicroExpression {
            kind: MicroKind::NoseSneer
        }]
    );
    approx(buffer[0], 0.025, 1e-6);
    approx(buffer[1], 0.025, 1e-6);
}

#[test]
fn smile_floor_never_lowers() {
    let caps = caps(&["mouthSmileLeft", "mouthSmileRight"]);
    let mut idle = IdleEngine::new(IdleConfig::default());
    let mut rng = ScriptedRandom::constant(0.5);
    let mut buffer = vec![0.0f32, 0.4];
    let mut out = Outputs::default();
    idle.tick(0.0, &mut buffer, &caps, &mut rng, &mut out);
    approx(buffer[0], 0.1, 1e-6);
    approx(buffer[1], 0.4, 1e-6);
}

#[test]
fn engines_keep_independent_state() {
    let mut a = IdleEngine::new(IdleConfig::default());
    let b = IdleEngine::new(IdleConfig::default());
    let mut rng = ScriptedRandom::constant(0.5);
    a.trigger_blink(0.0, &mut rng);
    assert!(a.blink_state().is_blinking);
    assert!(!b.blink_state().is_blinking);
    assert!(b.pending().is_empty());
}
