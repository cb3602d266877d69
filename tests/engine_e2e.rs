use std::time::{Duration, Instant};

use polarcraft::{
    AchievedSet, EngineConfig, EngineRuntime, PolarizationEngine, Position, SceneElement,
};

fn at(x: f64) -> Position {
    Position::new(x, 0.0, 0.0)
}

fn waveplate_scene(fast_axis: f64) -> Vec<SceneElement> {
    vec![
        SceneElement::light_source("src", at(0.0), 1.0),
        SceneElement::waveplate("q", at(1.0), 90.0, fast_axis),
    ]
}

fn ids(report: &polarcraft::TickReport) -> Vec<&str> {
    report
        .newly_achieved
        .iter()
        .map(|ev| ev.discovery_id.as_str())
        .collect()
}

#[test]
fn session_walks_through_waveplate_discoveries() {
    let mut engine = PolarizationEngine::new(EngineConfig::default()).unwrap();
    let t0 = Instant::now();

    engine.update_scene(waveplate_scene(0.0), t0);
    for (i, angle) in [0.0, 20.0, 45.0].into_iter().enumerate() {
        engine.record_rotation("q", angle, t0 + Duration::from_millis(10 * i as u64));
    }
    engine.update_scene(waveplate_scene(45.0), t0 + Duration::from_millis(30));

    let committed = engine.tick(t0 + Duration::from_millis(30));
    assert!(committed.segments_committed);
    assert!(committed.newly_achieved.is_empty());

    // Discovery pass: one per firing, circular comes before tuning.
    let first = engine.tick(t0 + Duration::from_millis(230));
    assert_eq!(ids(&first), vec!["circular-polarization"]);

    engine.record_rotation("q", 45.0, t0 + Duration::from_millis(240));
    let second = engine.tick(t0 + Duration::from_millis(440));
    assert_eq!(ids(&second), vec!["waveplate-tuning"]);

    // Encoding pass fires once, a second after the last scene edit.
    let encoding = engine.tick(t0 + Duration::from_millis(1030));
    assert!(encoding.encoding_pass_ran);
    // Circular light has no orientation, so both segments share a hue.
    assert_eq!(ids(&encoding), vec!["encoding-shape"]);
    assert!(!engine.achieved().contains("encoding-color"));
}

#[test]
fn persisted_achievements_survive_new_session() {
    let mut first = PolarizationEngine::new(EngineConfig::default()).unwrap();
    first.achieve("circular-polarization");
    first.achieve("half-wave-rotation");
    let saved = serde_json::to_string(first.achieved()).unwrap();

    let restored: AchievedSet = serde_json::from_str(&saved).unwrap();
    let mut second = PolarizationEngine::new(EngineConfig::default())
        .unwrap()
        .with_achieved(restored);
    assert!(second.achieve("half-wave-rotation").is_none());

    second.achieve("waveplate-tuning");
    let report = second.tick(Instant::now());
    assert_eq!(ids(&report), vec!["waveplate-mastery"]);
    assert_eq!(second.active_connections().len(), 2);
}

#[test]
fn config_from_json_drives_debounce() {
    let cfg = EngineConfig::from_json(r#"{"discovery_debounce_ms": 50}"#).unwrap();
    assert_eq!(cfg.encoding_debounce_ms, 1000);

    let mut engine = PolarizationEngine::new(cfg).unwrap();
    let t0 = Instant::now();
    engine.update_scene(waveplate_scene(45.0), t0);
    engine.tick(t0);
    assert!(engine.tick(t0 + Duration::from_millis(50)).discovery_pass_ran);
}

#[test]
fn runtime_serializes_commands_from_threads() {
    let rt = EngineRuntime::start(
        PolarizationEngine::new(EngineConfig {
            discovery_debounce_ms: 10,
            encoding_debounce_ms: 10,
            ..EngineConfig::default()
        })
        .unwrap(),
    )
    .unwrap();

    std::thread::scope(|s| {
        s.spawn(|| rt.update_scene(waveplate_scene(45.0)).unwrap());
        s.spawn(|| rt.achieve("sky-polarization").unwrap());
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = Vec::new();
    while Instant::now() < deadline && !seen.iter().any(|id: &String| id == "circular-polarization")
    {
        if let Ok(ev) = rt.events().recv_timeout(Duration::from_millis(100)) {
            seen.push(ev.discovery_id);
        }
    }
    assert!(seen.iter().any(|id| id == "sky-polarization"));
    assert!(seen.iter().any(|id| id == "circular-polarization"));

    let snap = rt.snapshot().unwrap();
    assert_eq!(snap.segments.len(), 2);
    assert!(snap.achieved.contains("sky-polarization"));
    assert_eq!(rt.dropped_events(), 0);
}
