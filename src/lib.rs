//! revealfx renders two pointer-driven visual effects on the CPU.
//!
//! - [`LiquidReveal`]: a decaying pointer trail painted as a soft blob, used as a mask that
//!   reveals an image under the pointer.
//! - [`DepthParallax`]: a layer translation proportional to the pointer's offset from the
//!   container center, scaled by a grayscale depth map.
//!
//! Both are [`Effect`]s driven by an [`EffectMount`], which owns listener registration and
//! the single outstanding animation-frame request against a [`Host`]. [`ManualHost`] drives
//! them deterministically in tests and offline tools.
#![forbid(unsafe_code)]

mod animation;
mod assets;
mod config;
mod foundation;
mod host;
mod parallax;
mod render;
mod trail;

pub use crate::animation::ease::Ease;
pub use crate::animation::layer::{LayerAnimator, Transition};
pub use crate::assets::decode::{
    PreparedImage, decode_depth_map, decode_image, prepare_depth_map, prepare_image,
    unpremultiply_rgba8_in_place,
};
pub use crate::assets::loader::{
    FsImageLoader, ImageLoader, MemoryImageLoader, normalize_url_path,
};
pub use crate::assets::slot::{AssetSlot, SlotStatus};
pub use crate::config::model::{EffectsConfig, ParallaxConfig, RevealConfig};
pub use crate::foundation::core::{
    Affine, BezPath, Canvas, FrameTick, NormPoint, Point, Rect, Vec2,
};
pub use crate::foundation::error::{RevealError, RevealResult};
pub use crate::host::event::{
    FrameHandle, FrameRequest, Host, HostEvent, ListenerId, ListenerKind,
};
pub use crate::host::manual::{HostStats, ManualHost};
pub use crate::host::mount::{Effect, EffectMount, MountPhase};
pub use crate::parallax::depth::{DepthBuffer, DepthSampler, NEUTRAL_DEPTH};
pub use crate::parallax::mapper::{DepthParallax, ParallaxSample, parallax_offset};
pub use crate::render::backend::{FrameRGBA, MaskBackend};
pub use crate::render::blur::blur_rgba8_premul;
pub use crate::render::composite::{
    PremulRgba8, over, over_in_place, source_in, source_in_in_place,
};
pub use crate::render::cpu::{CpuMaskBackend, GlowOpts, render_cover};
pub use crate::render::fit::CoverFit;
pub use crate::render::reveal::{FrameOutcome, LiquidReveal, RevealStats};
pub use crate::render::stroke::{StrokeDab, trail_dabs};
pub use crate::trail::buffer::{FULL_AGE, TrailBuffer, TrailPoint};
pub use crate::trail::recorder::{record, surface_point};
