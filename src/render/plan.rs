use crate::{
    assets::store::{PreparedImage, PreparedResources},
    effects::filter::PassFx,
    foundation::core::{Affine, Canvas, Rect, Rgba8Premul, Vec2},
    foundation::error::{FrameshotError, FrameshotResult},
    frame::device::DeviceFrame,
    render::backend::RasterOpts,
    style::derive::{RenderStyle, ScaleTransform},
};

#[derive(Clone, Debug)]
/// Backend-agnostic render plan for one image.
///
/// A plan consists of:
/// - surface declarations (`surfaces`), indexed by [`SurfaceId`]
/// - a sequence of passes (`passes`)
/// - a declared final surface (`final_surface`)
pub struct RenderPlan {
    /// Output dimensions.
    pub canvas: Canvas,
    /// Surfaces used by the passes.
    pub surfaces: Vec<SurfaceDesc>,
    /// Passes in execution order.
    pub passes: Vec<Pass>,
    /// Surface read back as the result.
    pub final_surface: SurfaceId,
}

#[derive(Clone, Debug)]
/// A single pass in a [`RenderPlan`].
pub enum Pass {
    /// Draw operations into a surface.
    Scene(ScenePass),
    /// Full-surface filter kernel.
    Offscreen(OffscreenPass),
    /// Surface-over-surface compositing.
    Composite(CompositePass),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Identifier for a render surface declared in [`RenderPlan::surfaces`].
pub struct SurfaceId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
/// Surface declaration. Surfaces are premultiplied RGBA8 and start filled with `clear`.
pub struct SurfaceDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Initial contents.
    pub clear: Rgba8Premul,
}

#[derive(Clone, Debug)]
/// Draw operations composited over a surface.
pub struct ScenePass {
    /// Target surface.
    pub target: SurfaceId,
    /// Operations in painter's order.
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug)]
/// Run a filter kernel from `input` into `output`.
pub struct OffscreenPass {
    /// Source surface.
    pub input: SurfaceId,
    /// Destination surface; may equal `input`.
    pub output: SurfaceId,
    /// Kernel.
    pub fx: PassFx,
}

#[derive(Clone, Debug)]
/// Composite surfaces into a target surface.
pub struct CompositePass {
    /// Target surface.
    pub target: SurfaceId,
    /// Operations in order.
    pub ops: Vec<CompositeOp>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// A compositing operation between surfaces.
pub enum CompositeOp {
    /// Source-over with a uniform opacity.
    Over {
        /// Source surface.
        src: SurfaceId,
        /// Opacity multiplier in `[0, 1]`.
        opacity: f32,
    },
}

#[derive(Clone, Debug)]
/// Draw operation emitted by the compiler.
pub enum DrawOp {
    /// Draw an image whose pixel rect `(0, 0, width, height)` is mapped by `transform`.
    Image {
        /// Pixels to draw.
        image: PreparedImage,
        /// Image space to surface space.
        transform: Affine,
        /// Surface-space clip rectangle.
        clip: Option<Rect>,
    },
    /// Solid axis-aligned rectangle in surface space.
    FillRect {
        /// Area to fill.
        rect: Rect,
        /// Straight-alpha fill color.
        rgba: [u8; 4],
    },
}

/// Surface holding the final image.
pub const FINAL_SURFACE: SurfaceId = SurfaceId(0);
/// Surface holding the filtered content layer.
pub const CONTENT_SURFACE: SurfaceId = SurfaceId(1);

/// Transform that scales an `image_w` x `image_h` image to cover `area`, centered.
pub fn cover_transform(image_w: f64, image_h: f64, area: Rect) -> Affine {
    let scale = (area.width() / image_w).max(area.height() / image_h);
    centered(image_w, image_h, area, scale)
}

/// Transform that fits an image inside `area` without upscaling, centered, then applies `zoom`
/// about the center of `area`.
pub fn contain_transform(image_w: f64, image_h: f64, area: Rect, zoom: ScaleTransform) -> Affine {
    let fit = (area.width() / image_w)
        .min(area.height() / image_h)
        .min(1.0);
    zoom.to_affine(area.center()) * centered(image_w, image_h, area, fit)
}

fn centered(image_w: f64, image_h: f64, area: Rect, scale: f64) -> Affine {
    Affine::translate(area.center().to_vec2())
        * Affine::scale(scale)
        * Affine::translate(Vec2::new(-image_w / 2.0, -image_h / 2.0))
}

/// The four bars of a `border` wide ring just inside `canvas`.
pub fn bezel_rects(canvas: Canvas, border: u32) -> Vec<Rect> {
    if border == 0 {
        return Vec::new();
    }
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let b = f64::from(border).min(w / 2.0).min(h / 2.0);
    vec![
        Rect::new(0.0, 0.0, w, b),
        Rect::new(0.0, h - b, w, h),
        Rect::new(0.0, b, b, h - b),
        Rect::new(w - b, b, w, h - b),
    ]
}

fn premul(rgba: Option<[u8; 4]>) -> Rgba8Premul {
    rgba.map(|[r, g, b, a]| Rgba8Premul::from_straight_rgba(r, g, b, a))
        .unwrap_or_else(Rgba8Premul::transparent)
}

fn check_image(image: &PreparedImage, what: &str) -> FrameshotResult<()> {
    if image.width == 0 || image.height == 0 {
        return Err(FrameshotError::render(format!("{what} image is empty")));
    }
    Ok(())
}

/// Compile the export plan for `frame` at its canonical resolution.
///
/// Layout: background covers the content box, the screenshot is contain-fit and zoomed inside
/// it, both clipped to the content box. The filter runs over that content layer, which is then
/// composited over the cleared final surface. The bezel is drawn last, unfiltered.
pub fn compile_plan(
    frame: DeviceFrame,
    style: &RenderStyle,
    resources: &PreparedResources,
    opts: &RasterOpts,
) -> FrameshotResult<RenderPlan> {
    let canvas = frame.canvas();
    let content = frame.content_rect();
    let fx = style.fx()?;

    let mut scene = Vec::with_capacity(2);
    if let Some(bg) = &resources.background {
        check_image(bg, "background")?;
        let (w, h) = bg.size();
        scene.push(DrawOp::Image {
            image: bg.clone(),
            transform: cover_transform(w, h, content),
            clip: Some(content),
        });
    }
    check_image(&resources.screenshot, "screenshot")?;
    let (w, h) = resources.screenshot.size();
    scene.push(DrawOp::Image {
        image: resources.screenshot.clone(),
        transform: contain_transform(w, h, content, style.content_transform),
        clip: Some(content),
    });

    let surface = |clear| SurfaceDesc {
        width: canvas.width,
        height: canvas.height,
        clear,
    };
    let mut passes = vec![Pass::Scene(ScenePass {
        target: CONTENT_SURFACE,
        ops: scene,
    })];
    passes.extend(fx.passes.iter().map(|p| {
        Pass::Offscreen(OffscreenPass {
            input: CONTENT_SURFACE,
            output: CONTENT_SURFACE,
            fx: p.clone(),
        })
    }));
    passes.push(Pass::Composite(CompositePass {
        target: FINAL_SURFACE,
        ops: vec![CompositeOp::Over {
            src: CONTENT_SURFACE,
            opacity: fx.inline.opacity_mul.clamp(0.0, 1.0),
        }],
    }));

    if let Some(rgba) = opts.bezel_rgba {
        let ops: Vec<DrawOp> = bezel_rects(canvas, frame.border_width())
            .into_iter()
            .map(|rect| DrawOp::FillRect { rect, rgba })
            .collect();
        if !ops.is_empty() {
            passes.push(Pass::Scene(ScenePass {
                target: FINAL_SURFACE,
                ops,
            }));
        }
    }

    Ok(RenderPlan {
        canvas,
        surfaces: vec![
            surface(premul(opts.clear_rgba)),
            surface(Rgba8Premul::transparent()),
        ],
        passes,
        final_surface: FINAL_SURFACE,
    })
}

/// Compile a plan drawing an already rendered frame into a `container` canvas, scaled by
/// `frame_transform` about the container center.
pub fn compile_preview_plan(
    rendered: &PreparedImage,
    container: Canvas,
    frame_transform: ScaleTransform,
) -> FrameshotResult<RenderPlan> {
    check_image(rendered, "frame")?;
    let (w, h) = rendered.size();
    let center = container.center();
    let transform = frame_transform.to_affine(center)
        * Affine::translate(Vec2::new(center.x - w / 2.0, center.y - h / 2.0));

    Ok(RenderPlan {
        canvas: container,
        surfaces: vec![SurfaceDesc {
            width: container.width,
            height: container.height,
            clear: Rgba8Premul::transparent(),
        }],
        passes: vec![Pass::Scene(ScenePass {
            target: FINAL_SURFACE,
            ops: vec![DrawOp::Image {
                image: rendered.clone(),
                transform,
                clip: None,
            }],
        })],
        final_surface: FINAL_SURFACE,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
