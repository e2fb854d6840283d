use super::*;

#[test]
fn empty_document_uses_defaults() {
    let cfg = EffectsConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, EffectsConfig::default());
    assert_eq!(cfg.reveal.decay_rate, 0.015);
    assert!(cfg.parallax.enabled);
    assert_eq!(cfg.reveal.lifetime_frames(), 67);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let cfg = EffectsConfig::from_json_str(
        r#"{ "reveal": { "brush_base_width": 40 }, "parallax": { "intensity": 35, "settle_ease": "linear" } }"#,
    )
    .unwrap();
    assert_eq!(cfg.reveal.brush_base_width, 40.0);
    assert_eq!(cfg.reveal.glow_radius, 15);
    assert_eq!(cfg.parallax.intensity, 35.0);
    assert_eq!(cfg.parallax.settle_ease, Ease::Linear);
    assert_eq!(cfg.parallax.track_ease, Ease::OutQuad);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = EffectsConfig::from_json_str(r#"{ "reveal": { "decay": 0.1 } }"#).unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
}

#[test]
fn out_of_range_values_fail_validation() {
    for doc in [
        r#"{ "reveal": { "decay_rate": 0 } }"#,
        r#"{ "reveal": { "decay_rate": 1.5 } }"#,
        r#"{ "reveal": { "brush_base_width": -1 } }"#,
        r#"{ "reveal": { "glow_radius": 4, "glow_sigma": 0 } }"#,
        r#"{ "parallax": { "track_ms": -5 } }"#,
        r#"{ "parallax": { "track_ms": 700, "settle_ms": 600 } }"#,
    ] {
        let err = EffectsConfig::from_json_str(doc).unwrap_err();
        assert!(err.to_string().contains("validation error:"), "{doc}");
    }
}

#[test]
fn transitions_follow_config() {
    let cfg = ParallaxConfig::default();
    assert!(cfg.settle_transition().duration_ms > cfg.track_transition().duration_ms);
    assert_eq!(cfg.track_transition().ease, Ease::OutQuad);
}
