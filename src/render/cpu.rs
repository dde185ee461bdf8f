use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::store::PreparedImage,
    effects::{
        blur::blur_rgba8_premul, color::apply_color_matrix_in_place, composite::over_in_place,
        filter::PassFx,
    },
    foundation::core::{Affine, Canvas, Rect, Rgba8Premul},
    foundation::error::{FrameshotError, FrameshotResult},
    render::backend::{FrameRGBA, RenderBackend},
    render::passes::PassBackend,
    render::plan::{
        CompositeOp, CompositePass, DrawOp, OffscreenPass, RenderPlan, ScenePass, SurfaceDesc,
        SurfaceId,
    },
};

/// CPU backend: `vello_cpu` for scene drawing, in-crate kernels for filters and compositing.
#[derive(Default)]
pub struct CpuBackend {
    image_cache: HashMap<usize, CachedPaint>,
    surfaces: HashMap<SurfaceId, CpuSurface>,
}

struct CachedPaint {
    // Holds the pixel buffer alive so its address stays a valid key.
    _pixels: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
}

struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl CpuBackend {
    /// Backend with no surfaces allocated yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn image_paint_for(&mut self, image: &PreparedImage) -> FrameshotResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&image.rgba8_premul) as usize;
        if let Some(cached) = self.image_cache.get(&key) {
            return Ok(cached.paint.clone());
        }

        let pixmap = image_premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(
            key,
            CachedPaint {
                _pixels: Arc::clone(&image.rgba8_premul),
                paint: paint.clone(),
            },
        );
        Ok(paint)
    }

    fn surface(&self, id: SurfaceId) -> FrameshotResult<&CpuSurface> {
        self.surfaces
            .get(&id)
            .ok_or_else(|| FrameshotError::render(format!("surface {id:?} was not initialized")))
    }

    fn surface_mut(&mut self, id: SurfaceId) -> FrameshotResult<&mut CpuSurface> {
        self.surfaces
            .get_mut(&id)
            .ok_or_else(|| FrameshotError::render(format!("surface {id:?} was not initialized")))
    }
}

impl PassBackend for CpuBackend {
    fn ensure_surface(&mut self, id: SurfaceId, desc: &SurfaceDesc) -> FrameshotResult<()> {
        let width: u16 = desc
            .width
            .try_into()
            .map_err(|_| FrameshotError::render("surface width exceeds u16"))?;
        let height: u16 = desc
            .height
            .try_into()
            .map_err(|_| FrameshotError::render("surface height exceeds u16"))?;

        let surface = self.surfaces.entry(id).or_insert_with(|| CpuSurface {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        });
        if surface.width != width || surface.height != height {
            *surface = CpuSurface {
                width,
                height,
                pixmap: vello_cpu::Pixmap::new(width, height),
            };
        }
        clear_pixmap(&mut surface.pixmap, desc.clear);
        Ok(())
    }

    fn exec_scene(&mut self, pass: &ScenePass) -> FrameshotResult<()> {
        let (width, height) = {
            let s = self.surface(pass.target)?;
            (s.width, s.height)
        };

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        for op in &pass.ops {
            draw_op(self, &mut ctx, op)?;
        }
        ctx.flush();

        let mut layer = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut layer);

        let target = self.surface_mut(pass.target)?;
        over_in_place(
            target.pixmap.data_as_u8_slice_mut(),
            layer.data_as_u8_slice(),
            1.0,
        )
    }

    fn exec_offscreen(&mut self, pass: &OffscreenPass) -> FrameshotResult<()> {
        let input = self.surface(pass.input)?;
        let (w, h) = (u32::from(input.width), u32::from(input.height));
        let mut bytes = input.pixmap.data_as_u8_slice().to_vec();

        match &pass.fx {
            PassFx::Blur { radius_px, sigma } => {
                bytes = blur_rgba8_premul(&bytes, w, h, *radius_px, *sigma)?;
            }
            PassFx::Color(matrix) => apply_color_matrix_in_place(&mut bytes, matrix)?,
        }

        let output = self.surface_mut(pass.output)?;
        if (u32::from(output.width), u32::from(output.height)) != (w, h) {
            return Err(FrameshotError::render(
                "offscreen input/output surface size mismatch",
            ));
        }
        output.pixmap.data_as_u8_slice_mut().copy_from_slice(&bytes);
        Ok(())
    }

    fn exec_composite(&mut self, pass: &CompositePass) -> FrameshotResult<()> {
        for op in &pass.ops {
            match *op {
                CompositeOp::Over { src, opacity } => {
                    let src_bytes = self.surface(src)?.pixmap.data_as_u8_slice().to_vec();
                    let target = self.surface_mut(pass.target)?;
                    over_in_place(target.pixmap.data_as_u8_slice_mut(), &src_bytes, opacity)?;
                }
            }
        }
        Ok(())
    }

    fn readback_rgba8(
        &mut self,
        surface: SurfaceId,
        plan: &RenderPlan,
    ) -> FrameshotResult<FrameRGBA> {
        let s = self.surface(surface)?;
        let (width, height) = (u32::from(s.width), u32::from(s.height));
        if (width, height) != (plan.canvas.width, plan.canvas.height) {
            return Err(FrameshotError::render(
                "final surface does not match the plan canvas",
            ));
        }
        Ok(FrameRGBA {
            width,
            height,
            data: s.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

impl RenderBackend for CpuBackend {}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, color: Rgba8Premul) {
    let rgba = color.to_array();
    for px in pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn draw_op(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
) -> FrameshotResult<()> {
    match op {
        DrawOp::FillRect { rect, rgba } => {
            let [r, g, b, a] = *rgba;
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&rect_to_cpu(*rect));
        }
        DrawOp::Image {
            image,
            transform,
            clip,
        } => {
            let paint = backend.image_paint_for(image)?;
            let bounds = Rect::new(0.0, 0.0, f64::from(image.width), f64::from(image.height));
            match clip {
                None => {
                    ctx.set_transform(affine_to_cpu(*transform));
                    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(paint);
                    ctx.fill_rect(&rect_to_cpu(bounds));
                }
                Some(clip) => {
                    // Axis-aligned transforms only: fill the clipped destination rect in surface
                    // space and let the paint transform place the pixels.
                    let dest = transform.transform_rect_bbox(bounds).intersect(*clip);
                    if dest.width() <= 0.0 || dest.height() <= 0.0 {
                        return Ok(());
                    }
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint_transform(affine_to_cpu(*transform));
                    ctx.set_paint(paint);
                    ctx.fill_rect(&rect_to_cpu(dest));
                }
            }
        }
    }
    Ok(())
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> FrameshotResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FrameshotError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FrameshotError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != Canvas::new(width, height)?.rgba8_len()? {
        return Err(FrameshotError::render("prepared image byte length mismatch"));
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
