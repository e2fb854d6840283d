use super::*;
use crate::{
    assets::loader::MemoryImageLoader,
    foundation::core::Point,
    host::{manual::ManualHost, mount::EffectMount},
    parallax::depth::{DepthBuffer, NEUTRAL_DEPTH},
};

fn approx(a: Vec2, b: Vec2) -> bool {
    (a - b).hypot() < 1e-9
}

fn split_depth() -> DepthSampler {
    // Left column far, right column near.
    let buf = DepthBuffer::new(2, 2, vec![0, 255, 0, 255]).unwrap();
    DepthSampler::from_buffer("depth.png", buf)
}

fn square() -> Rect {
    Rect::new(0.0, 0.0, 100.0, 100.0)
}

fn at(ms: f64) -> FrameTick {
    FrameTick {
        index: 0,
        time_ms: ms,
    }
}

fn mounted(cfg: ParallaxConfig) -> EffectMount<DepthParallax, ManualHost> {
    EffectMount::mount(
        DepthParallax::with_sampler(cfg, split_depth()).unwrap(),
        ManualHost::new(square()),
    )
}

#[test]
fn offset_scales_with_depth() {
    let pos = NormPoint::new(0.8, 0.3);
    let near = parallax_offset(pos, 0.9, 20.0);
    let far = parallax_offset(pos, 0.2, 20.0);
    assert!(near.hypot() > far.hypot());
    assert!(approx(parallax_offset(NormPoint::CENTER, 1.0, 20.0), Vec2::ZERO));
    assert!(approx(parallax_offset(pos, 0.0, 20.0), Vec2::ZERO));
}

#[test]
fn split_depth_scenario() {
    let mut p = DepthParallax::with_sampler(ParallaxConfig::default(), split_depth()).unwrap();

    let near = p.sample_at(NormPoint::new(0.9, 0.1));
    assert_eq!(near.depth, 1.0);
    assert!(approx(near.offset, Vec2::new(8.0, -8.0)));

    let far = p.sample_at(NormPoint::new(0.1, 0.1));
    assert_eq!(far.depth, 0.0);
    assert!(approx(far.offset, Vec2::ZERO));
}

#[test]
fn out_of_range_position_is_clamped_to_container() {
    let mut p = DepthParallax::with_sampler(ParallaxConfig::default(), split_depth()).unwrap();

    let s = p.sample_at(NormPoint::new(5.0, -3.0));
    assert_eq!((s.pos.x, s.pos.y), (1.0, 0.0));
    assert_eq!(s.depth, 1.0);
    assert!(approx(s.offset, Vec2::new(10.0, -10.0)));

    let s = p.sample_at(NormPoint::new(f64::NAN, 0.5));
    assert_eq!((s.pos.x, s.pos.y), (0.0, 0.5));
    assert_eq!(s.depth, 0.0);
    assert!(s.offset.x.is_finite() && s.offset.y.is_finite());
}

#[test]
fn invalid_config_is_rejected() {
    let slow_track = ParallaxConfig {
        track_ms: 600.0,
        settle_ms: 600.0,
        ..ParallaxConfig::default()
    };
    let nan_intensity = ParallaxConfig {
        intensity: f64::NAN,
        ..ParallaxConfig::default()
    };
    for cfg in [slow_track, nan_intensity] {
        assert!(DepthParallax::with_sampler(cfg.clone(), split_depth()).is_err());
        let loader = Arc::new(MemoryImageLoader::new());
        assert!(DepthParallax::new(cfg, loader, "depth.png").is_err());
    }
}

#[test]
fn pointer_moves_are_throttled_to_one_computation_per_frame() {
    let mut m = mounted(ParallaxConfig::default());
    assert_eq!(m.host().stats().frames_requested, 0);

    for x in [10.0, 30.0, 50.0, 70.0, 90.0] {
        m.dispatch(HostEvent::PointerMove {
            client: Point::new(x, 10.0),
        });
    }
    assert_eq!(m.host().stats().frames_requested, 1);
    assert_eq!(m.effect().computations(), 0);

    assert!(m.advance(at(0.0)));
    assert_eq!(m.effect().computations(), 1);
    let last = m.effect().last_sample().unwrap();
    assert!(approx(
        Vec2::new(last.pos.x, last.pos.y),
        Vec2::new(0.9, 0.1)
    ));
    assert!(approx(m.effect().target(), Vec2::new(8.0, -8.0)));

    // Nothing new arrived, so the next frame only animates.
    assert!(m.advance(at(16.0)));
    assert_eq!(m.effect().computations(), 1);
}

#[test]
fn tracking_eases_toward_target_then_stops_requesting_frames() {
    let mut m = mounted(ParallaxConfig::default());
    m.dispatch(HostEvent::TouchMove {
        client: Point::new(90.0, 10.0),
    });
    m.advance(at(0.0));

    let mid = m.effect().translation_at(50.0);
    assert!(mid.x > 0.0 && mid.x < 8.0);
    assert_eq!(m.effect().transition().duration_ms, 100.0);

    assert!(m.advance(at(200.0)));
    assert!(approx(m.effect().translation(), Vec2::new(8.0, -8.0)));
    assert_eq!(m.host().due_frames(), 0);
}

#[test]
fn leaving_settles_back_to_origin_slowly() {
    let mut m = mounted(ParallaxConfig::default());
    m.dispatch(HostEvent::PointerMove {
        client: Point::new(90.0, 10.0),
    });
    m.advance(at(0.0));
    m.advance(at(200.0));

    m.dispatch(HostEvent::PointerLeave);
    assert!(m.advance(at(300.0)));
    assert!(approx(m.effect().target(), Vec2::ZERO));
    assert_eq!(m.effect().transition().duration_ms, 600.0);
    assert!(approx(m.effect().translation(), Vec2::new(8.0, -8.0)));

    let half = m.effect().translation_at(600.0);
    assert!(half.x > 0.0 && half.x < 8.0);
    assert!(approx(m.effect().translation_at(900.0), Vec2::ZERO));
    // Leaving does not count as an offset computation.
    assert_eq!(m.effect().computations(), 1);
}

#[test]
fn leave_after_move_in_same_frame_wins() {
    let mut m = mounted(ParallaxConfig::default());
    m.dispatch(HostEvent::PointerMove {
        client: Point::new(90.0, 10.0),
    });
    m.dispatch(HostEvent::PointerLeave);
    m.advance(at(0.0));
    assert_eq!(m.effect().computations(), 0);
    assert!(approx(m.effect().target(), Vec2::ZERO));
}

#[test]
fn disabled_mapper_is_inert() {
    let cfg = ParallaxConfig {
        enabled: false,
        ..ParallaxConfig::default()
    };
    let loader = Arc::new(MemoryImageLoader::new());
    let p = DepthParallax::new(cfg, loader, "depth.png").unwrap();
    assert!(!p.is_enabled());
    assert!(p.sampler().is_none());

    let mut m = EffectMount::mount(p, ManualHost::new(square()));
    assert_eq!(m.host().active_listeners(), 0);

    m.dispatch(HostEvent::PointerMove {
        client: Point::new(90.0, 10.0),
    });
    assert_eq!(m.host().stats().frames_requested, 0);

    let direct = m.effect_mut().on_event(
        &HostEvent::PointerMove {
            client: Point::new(90.0, 10.0),
        },
        square(),
    );
    assert_eq!(direct, FrameRequest::Idle);
    assert!(!m.effect_mut().set_depth_url("other.png"));
    assert_eq!(m.effect().computations(), 0);
    assert_eq!(m.effect().translation(), Vec2::ZERO);
}

#[test]
fn undecoded_depth_samples_neutral() {
    let loader = Arc::new(MemoryImageLoader::new());
    let mut p = DepthParallax::new(ParallaxConfig::default(), loader, "missing.png").unwrap();
    let s = p.sample_at(NormPoint::new(1.0, 0.5));
    assert_eq!(s.depth, NEUTRAL_DEPTH);
    assert!(approx(s.offset, Vec2::new(5.0, 0.0)));
}

#[test]
fn depth_url_changes_trigger_a_new_decode_only_when_different() {
    let loader = Arc::new(MemoryImageLoader::new());
    let mut p = DepthParallax::new(ParallaxConfig::default(), loader, "a.png").unwrap();
    assert!(!p.set_depth_url("a.png"));
    assert!(p.set_depth_url("b.png"));
    assert_eq!(p.sampler().map(|s| s.url()), Some("b.png"));
}

#[test]
fn sampler_without_loader_keeps_its_source() {
    let mut p = DepthParallax::with_sampler(ParallaxConfig::default(), split_depth()).unwrap();
    assert!(p.is_enabled());
    assert!(!p.set_depth_url("elsewhere.png"));
    assert_eq!(p.sampler().map(|s| s.url()), Some("depth.png"));
}

#[test]
fn unmount_drops_pending_pointer() {
    let mut m = mounted(ParallaxConfig::default());
    m.dispatch(HostEvent::PointerMove {
        client: Point::new(90.0, 10.0),
    });
    m.unmount();
    assert_eq!(m.host().due_frames(), 0);
    assert_eq!(m.host().active_listeners(), 0);
    assert!(!m.advance(at(0.0)));
    assert_eq!(m.effect().computations(), 0);
}
