use super::*;
use crate::effects::filter::{Filter, color_matrix_for};
use crate::foundation::core::Canvas;
use crate::render::passes::execute_plan;
use crate::render::plan::Pass;

fn surface(w: u32, h: u32, clear: Rgba8Premul) -> SurfaceDesc {
    SurfaceDesc {
        width: w,
        height: h,
        clear,
    }
}

fn white() -> Rgba8Premul {
    Rgba8Premul::from_straight_rgba(255, 255, 255, 255)
}

fn near(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= 2)
}

fn solid_image(w: u32, h: u32, px: [u8; 4]) -> PreparedImage {
    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(px.repeat((w * h) as usize)),
    }
}

#[test]
fn surfaces_start_cleared() {
    let plan = RenderPlan {
        canvas: Canvas::new(3, 2).unwrap(),
        surfaces: vec![surface(3, 2, white())],
        passes: vec![],
        final_surface: SurfaceId(0),
    };
    let frame = execute_plan(&mut CpuBackend::new(), &plan).unwrap();
    assert!(frame.premultiplied);
    assert!(frame.data.iter().all(|&b| b == 255));
}

#[test]
fn fill_rect_draws_over_the_surface() {
    let plan = RenderPlan {
        canvas: Canvas::new(8, 8).unwrap(),
        surfaces: vec![surface(8, 8, white())],
        passes: vec![Pass::Scene(ScenePass {
            target: SurfaceId(0),
            ops: vec![DrawOp::FillRect {
                rect: Rect::new(0.0, 0.0, 4.0, 8.0),
                rgba: [255, 0, 0, 255],
            }],
        })],
        final_surface: SurfaceId(0),
    };
    let frame = CpuBackend::new().render_plan(&plan).unwrap();
    assert!(near(frame.pixel(1, 1).unwrap(), [255, 0, 0, 255]));
    assert_eq!(frame.pixel(6, 1).unwrap(), [255, 255, 255, 255]);
}

#[test]
fn clipped_image_stays_inside_clip() {
    let plan = RenderPlan {
        canvas: Canvas::new(8, 8).unwrap(),
        surfaces: vec![surface(8, 8, Rgba8Premul::transparent())],
        passes: vec![Pass::Scene(ScenePass {
            target: SurfaceId(0),
            ops: vec![DrawOp::Image {
                image: solid_image(2, 2, [0, 255, 0, 255]),
                transform: Affine::scale(4.0),
                clip: Some(Rect::new(0.0, 0.0, 4.0, 8.0)),
            }],
        })],
        final_surface: SurfaceId(0),
    };
    let frame = CpuBackend::new().render_plan(&plan).unwrap();
    assert!(near(frame.pixel(1, 4).unwrap(), [0, 255, 0, 255]));
    assert_eq!(frame.pixel(6, 4).unwrap()[3], 0);
}

#[test]
fn offscreen_and_composite_passes_use_cpu_kernels() {
    let invert = color_matrix_for(&Filter::Invert(1.0)).unwrap();
    let plan = RenderPlan {
        canvas: Canvas::new(2, 2).unwrap(),
        surfaces: vec![
            surface(2, 2, Rgba8Premul::from_straight_rgba(0, 0, 0, 255)),
            surface(2, 2, white()),
        ],
        passes: vec![
            Pass::Offscreen(OffscreenPass {
                input: SurfaceId(1),
                output: SurfaceId(1),
                fx: PassFx::Color(invert),
            }),
            Pass::Offscreen(OffscreenPass {
                input: SurfaceId(1),
                output: SurfaceId(1),
                fx: PassFx::Color(invert),
            }),
            Pass::Composite(CompositePass {
                target: SurfaceId(0),
                ops: vec![CompositeOp::Over {
                    src: SurfaceId(1),
                    opacity: 1.0,
                }],
            }),
        ],
        final_surface: SurfaceId(0),
    };
    let frame = CpuBackend::new().render_plan(&plan).unwrap();
    assert!(frame.data.iter().all(|&b| b == 255));
}

#[test]
fn oversized_surface_is_rejected() {
    let plan = RenderPlan {
        canvas: Canvas::new(70_000, 1).unwrap(),
        surfaces: vec![surface(70_000, 1, white())],
        passes: vec![],
        final_surface: SurfaceId(0),
    };
    assert!(CpuBackend::new().render_plan(&plan).is_err());
}

#[test]
fn image_bytes_must_match_their_dimensions() {
    assert!(image_premul_bytes_to_pixmap(&[0; 16], 2, 2).is_ok());
    assert!(image_premul_bytes_to_pixmap(&[0; 12], 2, 2).is_err());
    assert!(image_premul_bytes_to_pixmap(&[], 0, 2).is_err());
}
