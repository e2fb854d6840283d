use std::sync::Arc;

use crate::{
    assets::decode::PreparedImage,
    foundation::{
        core::{Affine, BezPath, Canvas, Point},
        error::{RevealError, RevealResult},
    },
    render::{
        backend::{FrameRGBA, MaskBackend},
        blur::blur_rgba8_premul,
        composite::{over_in_place, source_in_in_place},
        fit::CoverFit,
        stroke::StrokeDab,
    },
};

/// Gaussian glow applied under the sharp trail so neighbouring segments melt together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowOpts {
    /// Kernel radius in pixels; 0 disables the glow.
    pub radius: u32,
    /// Kernel sigma.
    pub sigma: f32,
}

impl Default for GlowOpts {
    fn default() -> Self {
        Self {
            radius: 15,
            sigma: 7.5,
        }
    }
}

/// CPU mask backend powered by `vello_cpu`.
pub struct CpuMaskBackend {
    glow: GlowOpts,
    canvas: Canvas,
    surface: Option<vello_cpu::Pixmap>,
    cover: Option<CoverCache>,
}

// The cover-fitted image only changes with the image or the canvas, so it is rasterized once.
struct CoverCache {
    source: Arc<Vec<u8>>,
    canvas: Canvas,
    rgba8_premul: Vec<u8>,
}

impl CpuMaskBackend {
    /// Backend with an empty surface; call [`MaskBackend::resize`] before drawing.
    pub fn new(glow: GlowOpts) -> Self {
        Self {
            glow,
            canvas: Canvas::default(),
            surface: None,
            cover: None,
        }
    }

    /// Glow settings.
    pub fn glow(&self) -> GlowOpts {
        self.glow
    }
}

impl MaskBackend for CpuMaskBackend {
    fn resize(&mut self, canvas: Canvas) -> RevealResult<()> {
        if canvas == self.canvas && self.surface.is_some() {
            clear_pixmap_opt(self.surface.as_mut());
            return Ok(());
        }
        self.cover = None;
        if canvas.is_empty() {
            self.canvas = canvas;
            self.surface = None;
            return Ok(());
        }
        let (w, h) = canvas.to_u16()?;
        self.canvas = canvas;
        self.surface = Some(vello_cpu::Pixmap::new(w, h));
        tracing::debug!(width = w, height = h, "reveal surface allocated");
        Ok(())
    }

    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn clear(&mut self) {
        clear_pixmap_opt(self.surface.as_mut());
    }

    fn paint_trail(&mut self, dabs: &[StrokeDab]) -> RevealResult<()> {
        let glow = self.glow;
        let Some(pixmap) = self.surface.as_mut() else {
            return Ok(());
        };
        let (w, h) = self.canvas.to_u16()?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for dab in dabs {
            if dab.opacity <= 0.0 {
                continue;
            }
            let pieces = dab.outline();
            if pieces.is_empty() {
                continue;
            }
            let layered = dab.opacity < 1.0;
            if layered {
                ctx.push_opacity_layer(dab.opacity);
            }
            for piece in &pieces {
                ctx.fill_path(&bezpath_to_cpu(piece));
            }
            if layered {
                ctx.pop_layer();
            }
        }
        ctx.flush();
        ctx.render_to_pixmap(pixmap);

        if glow.radius > 0 {
            let sharp = pixmap.data_as_u8_slice().to_vec();
            let mut soft = blur_rgba8_premul(
                &sharp,
                u32::from(w),
                u32::from(h),
                glow.radius,
                glow.sigma,
            )?;
            over_in_place(&mut soft, &sharp, 1.0)?;
            pixmap.data_as_u8_slice_mut().copy_from_slice(&soft);
        }
        Ok(())
    }

    fn composite_in(&mut self, image: &PreparedImage) -> RevealResult<()> {
        if self.surface.is_none() {
            return Ok(());
        }
        let canvas = self.canvas;
        let stale = match &self.cover {
            Some(c) => !Arc::ptr_eq(&c.source, &image.rgba8_premul) || c.canvas != canvas,
            None => true,
        };
        if stale {
            self.cover = Some(CoverCache {
                source: image.rgba8_premul.clone(),
                canvas,
                rgba8_premul: render_cover(image, canvas)?,
            });
        }

        let (Some(pixmap), Some(cover)) = (self.surface.as_mut(), self.cover.as_ref()) else {
            return Ok(());
        };
        source_in_in_place(pixmap.data_as_u8_slice_mut(), &cover.rgba8_premul)
    }

    fn readback(&self) -> FrameRGBA {
        let data = match &self.surface {
            Some(p) => p.data_as_u8_slice().to_vec(),
            None => Vec::new(),
        };
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
            premultiplied: true,
        }
    }
}

/// Rasterize `image` cover-fitted onto a transparent `canvas`-sized buffer.
pub fn render_cover(image: &PreparedImage, canvas: Canvas) -> RevealResult<Vec<u8>> {
    if canvas.is_empty() {
        return Ok(Vec::new());
    }
    let (w, h) = canvas.to_u16()?;
    let mut out = vello_cpu::Pixmap::new(w, h);
    let Some(fit) = CoverFit::compute(image.width, image.height, canvas.width, canvas.height)
    else {
        return Ok(out.data_as_u8_slice().to_vec());
    };

    let pixmap =
        image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(affine_to_cpu(fit.to_affine()));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(image.width),
        f64::from(image.height),
    ));
    ctx.flush();
    ctx.render_to_pixmap(&mut out);
    Ok(out.data_as_u8_slice().to_vec())
}

fn clear_pixmap_opt(pixmap: Option<&mut vello_cpu::Pixmap>) {
    if let Some(p) = pixmap {
        p.data_as_u8_slice_mut().fill(0);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> RevealResult<vello_cpu::Pixmap> {
    let (w, h) = Canvas { width, height }.to_u16()?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(RevealError::evaluation(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
