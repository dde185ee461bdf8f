use std::sync::Arc;

use super::*;
use crate::foundation::core::Point;
use crate::frame::device::{DeviceKind, resolve};

fn image(w: u32, h: u32) -> PreparedImage {
    PreparedImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(vec![255; (w * h * 4) as usize]),
    }
}

fn style_with_filter(filter: &str, zoom: f64) -> RenderStyle {
    RenderStyle {
        filter_expression: filter.to_string(),
        content_transform: ScaleTransform { scale: zoom },
        ..RenderStyle::default()
    }
}

#[test]
fn cover_fills_area_and_centers() {
    let t = cover_transform(100.0, 50.0, Rect::new(0.0, 0.0, 200.0, 200.0));
    assert_eq!(t * Point::new(0.0, 0.0), Point::new(-100.0, 0.0));
    assert_eq!(t * Point::new(100.0, 50.0), Point::new(300.0, 200.0));
}

#[test]
fn contain_never_upscales_before_zoom() {
    let area = Rect::new(0.0, 0.0, 200.0, 100.0);
    let t = contain_transform(50.0, 50.0, area, ScaleTransform::IDENTITY);
    assert_eq!(t * Point::new(0.0, 0.0), Point::new(75.0, 25.0));

    let zoomed = contain_transform(50.0, 50.0, area, ScaleTransform { scale: 2.0 });
    assert_eq!(zoomed * Point::new(0.0, 0.0), Point::new(50.0, 0.0));
    assert_eq!(zoomed * Point::new(25.0, 25.0), Point::new(100.0, 50.0));

    let shrunk = contain_transform(400.0, 100.0, area, ScaleTransform::IDENTITY);
    assert_eq!(shrunk * Point::new(0.0, 0.0), Point::new(0.0, 25.0));
    assert_eq!(shrunk * Point::new(400.0, 100.0), Point::new(200.0, 75.0));
}

#[test]
fn bezel_ring_covers_the_border_exactly() {
    let frame = resolve(DeviceKind::Desktop);
    let rects = bezel_rects(frame.canvas(), frame.border_width());
    assert_eq!(rects.len(), 4);
    let area: f64 = rects.iter().map(|r| r.area()).sum();
    let inner = frame.content_rect().area();
    assert_eq!(area + inner, 1024.0 * 768.0);
    assert!(bezel_rects(frame.canvas(), 0).is_empty());
}

#[test]
fn export_plan_layers_content_filter_and_bezel() {
    let frame = resolve(DeviceKind::Mobile);
    let resources = PreparedResources {
        screenshot: image(10, 20),
        background: Some(image(4, 4)),
    };
    let plan = compile_plan(
        frame,
        &style_with_filter("blur(2px) grayscale(1) opacity(0.5)", 1.0),
        &resources,
        &RasterOpts::default(),
    )
    .unwrap();

    assert_eq!(plan.canvas, frame.canvas());
    assert_eq!(plan.surfaces.len(), 2);
    assert_eq!(plan.surfaces[0].clear, Rgba8Premul::from_straight_rgba(255, 255, 255, 255));
    assert_eq!(plan.surfaces[1].clear, Rgba8Premul::transparent());
    assert_eq!(plan.final_surface, FINAL_SURFACE);

    let kinds: Vec<&str> = plan
        .passes
        .iter()
        .map(|p| match p {
            Pass::Scene(_) => "scene",
            Pass::Offscreen(_) => "offscreen",
            Pass::Composite(_) => "composite",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["scene", "offscreen", "offscreen", "composite", "scene"]
    );

    let Pass::Scene(content) = &plan.passes[0] else {
        panic!("expected scene pass");
    };
    assert_eq!(content.target, CONTENT_SURFACE);
    assert_eq!(content.ops.len(), 2);
    for op in &content.ops {
        let DrawOp::Image { clip, .. } = op else {
            panic!("expected image op");
        };
        assert_eq!(*clip, Some(frame.content_rect()));
    }

    let Pass::Composite(comp) = &plan.passes[3] else {
        panic!("expected composite pass");
    };
    assert_eq!(
        comp.ops,
        vec![CompositeOp::Over {
            src: CONTENT_SURFACE,
            opacity: 0.5
        }]
    );
}

#[test]
fn plan_without_background_or_bezel() {
    let resources = PreparedResources {
        screenshot: image(2, 2),
        background: None,
    };
    let opts = RasterOpts {
        bezel_rgba: None,
        ..RasterOpts::default()
    };
    let plan = compile_plan(
        resolve(DeviceKind::Tablet),
        &style_with_filter("none", 1.0),
        &resources,
        &opts,
    )
    .unwrap();
    assert_eq!(plan.passes.len(), 2);
    let Pass::Scene(content) = &plan.passes[0] else {
        panic!("expected scene pass");
    };
    assert_eq!(content.ops.len(), 1);
}

#[test]
fn bad_filter_fails_compilation() {
    let resources = PreparedResources {
        screenshot: image(2, 2),
        background: None,
    };
    assert!(
        compile_plan(
            resolve(DeviceKind::Desktop),
            &style_with_filter("wobble(3)", 1.0),
            &resources,
            &RasterOpts::default(),
        )
        .is_err()
    );
}

#[test]
fn preview_plan_centers_the_scaled_frame() {
    let container = Canvas::new(600, 400).unwrap();
    let plan =
        compile_preview_plan(&image(1024, 768), container, ScaleTransform { scale: 0.5 }).unwrap();
    assert_eq!(plan.canvas, container);
    let Pass::Scene(scene) = &plan.passes[0] else {
        panic!("expected scene pass");
    };
    let DrawOp::Image { transform, .. } = &scene.ops[0] else {
        panic!("expected image op");
    };
    assert_eq!(*transform * Point::new(512.0, 384.0), Point::new(300.0, 200.0));
    assert_eq!(*transform * Point::new(0.0, 0.0), Point::new(44.0, 8.0));
}
