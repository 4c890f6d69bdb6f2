use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = RaceConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, RaceConfig::default());
    assert_eq!(cfg.transition(), Duration::from_millis(750));
    assert_eq!(cfg.swap(), Duration::from_millis(300));
    assert_eq!(cfg.dwell(), Duration::from_millis(100));
    assert_eq!(cfg.rank_strategy, RankStrategy::AdjacentSwap);
    assert_eq!(cfg.hold_after_settle(), None);
    assert_eq!(cfg.plot_rect(), Rect::new(100.0, 30.0, 770.0, 340.0));
    cfg.validate().unwrap();
}

#[test]
fn partial_document_overrides_fields() {
    let cfg = RaceConfig::from_reader(
        r#"{
            "transition_ms": 400,
            "ease": "linear",
            "rank_strategy": "precomputed",
            "entity_transition_ms": {"B": 900},
            "hold_after_settle_ms": 250
        }"#
        .as_bytes(),
    )
    .unwrap();
    assert_eq!(cfg.ease, Ease::Linear);
    assert_eq!(cfg.rank_strategy, RankStrategy::Precomputed);
    assert_eq!(cfg.transition_for("A"), Duration::from_millis(400));
    assert_eq!(cfg.transition_for("B"), Duration::from_millis(900));
    assert_eq!(cfg.hold_after_settle(), Some(Duration::from_millis(250)));
    assert_eq!(cfg.canvas, Canvas::default());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = RaceConfig::from_reader("{\"fps\": 3".as_bytes()).unwrap_err();
    assert!(matches!(err, RaceError::Serde(_)));
}

#[test]
fn validate_rejects_degenerate_geometry() {
    let zero = RaceConfig {
        canvas: Canvas {
            width: 0,
            height: 400,
        },
        ..RaceConfig::default()
    };
    assert!(zero.validate().is_err());

    let cramped = RaceConfig {
        canvas: Canvas {
            width: 120,
            height: 80,
        },
        ..RaceConfig::default()
    };
    assert!(cramped.validate().is_err());

    let negative = RaceConfig {
        padding: Padding {
            top: -1.0,
            ..Padding::default()
        },
        ..RaceConfig::default()
    };
    assert!(negative.validate().is_err());

    let no_fps = RaceConfig {
        fps: Fps { num: 0, den: 1 },
        ..RaceConfig::default()
    };
    assert!(no_fps.validate().is_err());
}

#[test]
fn missing_file_reports_path() {
    let err = RaceConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("not/here.json"));
}
