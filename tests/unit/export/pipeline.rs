use std::io::Cursor;

use super::*;
use crate::assets::resolve::MemoryResolver;
use crate::catalog::table::Background;
use crate::composition::state::CompositionState;
use crate::export::sink::InMemorySink;
use crate::frame::device::DeviceKind;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn near(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= 2)
}

fn mobile_with_red_square() -> CompositionState {
    let mut s = CompositionState::new();
    s.set_frame(DeviceKind::Mobile);
    s.set_screenshot(&png_bytes(100, 100, [255, 0, 0, 255])).unwrap();
    s
}

#[test]
fn export_without_screenshot_is_refused() {
    let err = export(
        &CompositionState::new().snapshot(),
        &MemoryResolver::new(),
        &RasterOpts::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::NoScreenshot));
}

#[test]
fn frame_layers_bezel_content_and_clear_color() {
    let s = mobile_with_red_square();
    let frame =
        render_frame(&s.snapshot(), &MemoryResolver::new(), &RasterOpts::default()).unwrap();
    assert_eq!((frame.width, frame.height), (375, 667));

    assert!(near(frame.pixel(2, 2).unwrap(), [0x1f, 0x29, 0x37, 255]));
    assert!(near(frame.pixel(187, 333).unwrap(), [255, 0, 0, 255]));
    assert!(near(frame.pixel(20, 20).unwrap(), [255, 255, 255, 255]));
    assert!(near(frame.pixel(97, 333).unwrap(), [255, 255, 255, 255]));
}

#[test]
fn zoom_scales_the_screenshot_about_the_content_center() {
    let mut s = mobile_with_red_square();
    s.set_zoom(2.0);
    let frame =
        render_frame(&s.snapshot(), &MemoryResolver::new(), &RasterOpts::default()).unwrap();
    assert!(near(frame.pixel(97, 333).unwrap(), [255, 0, 0, 255]));
    assert!(near(frame.pixel(20, 20).unwrap(), [255, 255, 255, 255]));
}

#[test]
fn background_covers_content_box() {
    let mut s = mobile_with_red_square();
    s.set_background(Some(Arc::new(Background {
        id: 0,
        name: "blue".to_string(),
        url: "blue.png".to_string(),
    })));
    let mut r = MemoryResolver::new();
    r.insert("blue.png", png_bytes(8, 8, [0, 0, 255, 255]));

    let frame = render_frame(&s.snapshot(), &r, &RasterOpts::default()).unwrap();
    assert!(near(frame.pixel(20, 20).unwrap(), [0, 0, 255, 255]));
    assert!(near(frame.pixel(187, 333).unwrap(), [255, 0, 0, 255]));
    assert!(near(frame.pixel(2, 2).unwrap(), [0x1f, 0x29, 0x37, 255]));
}

#[test]
fn export_is_idempotent_and_ignores_viewport_scale() {
    let mut s = mobile_with_red_square();
    let opts = RasterOpts::default();
    let r = MemoryResolver::new();
    let first = export(&s.snapshot(), &r, &opts).unwrap();
    let second = export(&s.snapshot(), &r, &opts).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.name, "screenshot.png");

    s.set_container(ContainerSize::new(100.0, 100.0).unwrap());
    assert!(s.viewport_scale() < 1.0);
    let scaled = export(&s.snapshot(), &r, &opts).unwrap();
    assert_eq!(scaled, first);

    let decoded = image::load_from_memory(&scaled.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (375, 667));
}

#[test]
fn export_to_hands_the_blob_to_the_sink() {
    let s = mobile_with_red_square();
    let mut sink = InMemorySink::new();
    let blob = export_to(
        &s.snapshot(),
        &MemoryResolver::new(),
        &RasterOpts::default(),
        &mut sink,
    )
    .unwrap();
    assert_eq!(sink.blobs, vec![blob]);
}

#[test]
fn preview_fits_the_frame_into_the_container() {
    let s = mobile_with_red_square();
    let container = ContainerSize::new(400.0, 333.5).unwrap();
    let preview = render_preview(
        &s.snapshot(),
        container,
        &MemoryResolver::new(),
        &RasterOpts::default(),
    )
    .unwrap();
    assert_eq!((preview.width, preview.height), (400, 334));
    assert!(near(preview.pixel(200, 166).unwrap(), [255, 0, 0, 255]));
    assert_eq!(preview.pixel(5, 166).unwrap()[3], 0);
}

#[test]
fn very_tall_screenshot_still_exports() {
    let mut s = CompositionState::new();
    s.set_frame(DeviceKind::Mobile);
    s.set_screenshot(&png_bytes(2, 70_000, [255, 0, 0, 255])).unwrap();
    assert!(s.snapshot().can_export());

    let blob = export(&s.snapshot(), &MemoryResolver::new(), &RasterOpts::default()).unwrap();
    let decoded = image::load_from_memory(&blob.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (375, 667));
}
