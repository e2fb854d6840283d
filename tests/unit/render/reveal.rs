use std::sync::Arc;

use super::*;
use crate::{
    assets::slot::SlotStatus,
    foundation::error::RevealError,
    host::{manual::ManualHost, mount::EffectMount},
    render::stroke::StrokeDab,
};

#[derive(Default)]
struct Spy {
    canvas: Canvas,
    clears: usize,
    painted: Vec<usize>,
    composites: usize,
    fail_paint: bool,
    fail_composite: bool,
}

impl MaskBackend for Spy {
    fn resize(&mut self, canvas: Canvas) -> RevealResult<()> {
        self.canvas = canvas;
        Ok(())
    }

    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn paint_trail(&mut self, dabs: &[StrokeDab]) -> RevealResult<()> {
        if self.fail_paint {
            return Err(RevealError::evaluation("spy paint failure"));
        }
        self.painted.push(dabs.len());
        Ok(())
    }

    fn composite_in(&mut self, _image: &PreparedImage) -> RevealResult<()> {
        if self.fail_composite {
            return Err(RevealError::evaluation("spy composite failure"));
        }
        self.composites += 1;
        Ok(())
    }

    fn readback(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: Vec::new(),
            premultiplied: true,
        }
    }
}

fn red(width: u32, height: u32) -> PreparedImage {
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new([255, 0, 0, 255].repeat((width * height) as usize)),
    }
}

fn bounds() -> Rect {
    Rect::new(10.0, 20.0, 210.0, 120.0)
}

fn spy_reveal(image: AssetSlot<PreparedImage>) -> LiquidReveal<Spy> {
    LiquidReveal::with_backend(RevealConfig::default(), image, Spy::default()).unwrap()
}

#[test]
fn out_of_range_decay_is_rejected() {
    for decay_rate in [0.0, -0.1, 1.5, f64::NAN] {
        let cfg = RevealConfig {
            decay_rate,
            ..RevealConfig::default()
        };
        let spy = LiquidReveal::with_backend(cfg.clone(), AssetSlot::failed("x"), Spy::default());
        assert!(spy.is_err(), "decay_rate {decay_rate} accepted");
        let cpu = LiquidReveal::new(cfg, AssetSlot::failed("x"));
        assert!(cpu.is_err(), "decay_rate {decay_rate} accepted");
    }
    let full = RevealConfig {
        decay_rate: 1.0,
        ..RevealConfig::default()
    };
    assert!(LiquidReveal::with_backend(full, AssetSlot::failed("x"), Spy::default()).is_ok());
}

#[test]
fn cpu_backend_takes_glow_from_config() {
    let cfg = RevealConfig {
        glow_radius: 4,
        glow_sigma: 2.0,
        ..RevealConfig::default()
    };
    let r = LiquidReveal::new(cfg, AssetSlot::failed("x")).unwrap();
    assert_eq!(
        r.backend().glow(),
        GlowOpts {
            radius: 4,
            sigma: 2.0
        }
    );
}

#[test]
fn empty_trail_clears_without_compositing() {
    let mut r = spy_reveal(AssetSlot::ready("reveal.png", red(2, 2)));
    for _ in 0..5 {
        assert_eq!(r.render_frame(), FrameOutcome::Cleared);
    }
    assert_eq!(r.backend().clears, 5);
    assert!(r.backend().painted.is_empty());
    assert_eq!(r.backend().composites, 0);
    assert_eq!(r.stats().frames, 5);
    assert_eq!(r.stats().composites, 0);
}

#[test]
fn unready_image_skips_drawing() {
    let mut r = spy_reveal(AssetSlot::failed("missing.png"));
    r.record(Point::new(50.0, 50.0), bounds());
    assert_eq!(r.render_frame(), FrameOutcome::Cleared);
    assert!(r.backend().painted.is_empty());
    assert_eq!(r.backend().composites, 0);
    // The trail still ages while the image is missing.
    assert!(r.trail().points()[0].age < 1.0);
}

#[test]
fn ready_image_paints_then_composites() {
    let mut r = spy_reveal(AssetSlot::ready("reveal.png", red(2, 2)));
    r.record(Point::new(50.0, 50.0), bounds());
    r.record(Point::new(60.0, 55.0), bounds());
    r.record(Point::new(70.0, 60.0), bounds());

    assert_eq!(r.render_frame(), FrameOutcome::Revealed { points: 3 });
    assert_eq!(r.backend().painted, vec![2]);
    assert_eq!(r.backend().composites, 1);
    assert_eq!(r.stats().strokes, 1);
    assert_eq!(r.stats().composites, 1);
}

#[test]
fn trail_drains_within_lifetime() {
    let mut r = spy_reveal(AssetSlot::ready("reveal.png", red(2, 2)));
    r.record(Point::new(50.0, 50.0), bounds());

    let lifetime = r.config().lifetime_frames();
    for _ in 0..lifetime - 2 {
        r.render_frame();
    }
    assert_eq!(r.trail().len(), 1);
    for _ in 0..3 {
        r.render_frame();
    }
    assert!(r.trail().is_empty());
    assert_eq!(r.stats().pruned, 1);
    assert_eq!(r.render_frame(), FrameOutcome::Cleared);
}

#[test]
fn backend_failure_degrades_to_clear() {
    let mut r = LiquidReveal::with_backend(
        RevealConfig::default(),
        AssetSlot::ready("reveal.png", red(2, 2)),
        Spy {
            fail_paint: true,
            ..Spy::default()
        },
    )
    .unwrap();
    r.record(Point::new(50.0, 50.0), bounds());
    assert_eq!(r.render_frame(), FrameOutcome::Cleared);
    assert_eq!(r.stats().errors, 1);
    assert_eq!(r.backend().composites, 0);
    // Cleared at frame start and again after the failure.
    assert_eq!(r.backend().clears, 2);
}

#[test]
fn composite_failure_counts_no_stroke() {
    let mut r = LiquidReveal::with_backend(
        RevealConfig::default(),
        AssetSlot::ready("reveal.png", red(2, 2)),
        Spy {
            fail_composite: true,
            ..Spy::default()
        },
    )
    .unwrap();
    r.record(Point::new(50.0, 50.0), bounds());
    assert_eq!(r.render_frame(), FrameOutcome::Cleared);
    assert_eq!(r.backend().painted, vec![1]);
    assert_eq!(r.stats().strokes, 0);
    assert_eq!(r.stats().composites, 0);
    assert_eq!(r.stats().errors, 1);
}

#[test]
fn swapped_image_is_revealed_once_ready() {
    let mut r = spy_reveal(AssetSlot::failed("old.png"));
    r.record(Point::new(50.0, 50.0), bounds());
    assert_eq!(r.render_frame(), FrameOutcome::Cleared);
    assert_eq!(r.image().status(), SlotStatus::Failed);

    r.set_image(AssetSlot::ready("new.png", red(2, 2)));
    assert_eq!(r.image().url(), "new.png");
    assert_eq!(r.image().status(), SlotStatus::Ready);
    assert_eq!(r.render_frame(), FrameOutcome::Revealed { points: 1 });
    assert_eq!(r.backend().composites, 1);
}

#[test]
fn mounted_reveal_records_relative_to_container() {
    let host = ManualHost::new(bounds());
    let mut m = EffectMount::mount(spy_reveal(AssetSlot::failed("x.png")), host);

    assert_eq!(
        m.effect().backend().canvas(),
        Canvas {
            width: 200,
            height: 100
        }
    );
    assert!(m.pending_frame().is_some());
    assert!(m.host().is_listening(ListenerKind::Resize));
    assert!(!m.host().is_listening(ListenerKind::PointerLeave));

    m.dispatch(HostEvent::PointerMove {
        client: Point::new(60.0, 70.0),
    });
    m.dispatch(HostEvent::TouchMove {
        client: Point::new(15.0, 25.0),
    });
    let pts = m.effect().trail().points();
    assert_eq!(pts.len(), 2);
    assert_eq!((pts[0].x, pts[0].y), (50.0, 50.0));
    assert_eq!((pts[1].x, pts[1].y), (5.0, 5.0));

    // Moves never add frame requests on top of the running loop.
    assert_eq!(m.host().stats().frames_requested, 1);
}

#[test]
fn resize_event_follows_container() {
    let host = ManualHost::new(bounds());
    let mut m = EffectMount::mount(spy_reveal(AssetSlot::failed("x.png")), host);
    m.host_mut()
        .set_bounds(Some(Rect::new(0.0, 0.0, 64.5, 31.2)));
    m.dispatch(HostEvent::Resize);
    assert_eq!(
        m.effect().backend().canvas(),
        Canvas {
            width: 65,
            height: 31
        }
    );
}

#[test]
fn frame_loop_keeps_running_until_unmount() {
    let host = ManualHost::new(bounds());
    let mut m = EffectMount::mount(spy_reveal(AssetSlot::ready("r.png", red(2, 2))), host);
    m.dispatch(HostEvent::PointerMove {
        client: Point::new(60.0, 70.0),
    });

    assert_eq!(m.run_frames(0, 10, 60.0), 10);
    assert_eq!(m.effect().stats().frames, 10);
    assert_eq!(m.effect().stats().composites, 10);
    assert_eq!(m.host().due_frames(), 1);

    m.unmount();
    assert!(m.effect().trail().is_empty());
    assert_eq!(m.host().due_frames(), 0);
    assert_eq!(m.host().stats().frames_cancelled, 1);
}

#[test]
fn cpu_reveal_shows_image_under_the_pointer_only() {
    let mut r = LiquidReveal::new(
        RevealConfig::default(),
        AssetSlot::ready("reveal.png", red(4, 2)),
    )
    .unwrap();
    r.resize(Rect::new(0.0, 0.0, 200.0, 100.0));
    r.record(Point::new(50.0, 50.0), Rect::new(0.0, 0.0, 200.0, 100.0));

    assert_eq!(r.render_frame(), FrameOutcome::Revealed { points: 1 });
    let f = r.frame();
    let [cr, cg, cb, ca] = f.pixel(50, 50).unwrap();
    assert!(ca > 240, "center alpha {ca}");
    assert_eq!((cr, cg, cb), (ca, 0, 0));
    assert_eq!(f.pixel(190, 90), Some([0, 0, 0, 0]));
}
