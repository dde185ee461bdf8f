use std::io::Cursor;

use super::*;
use crate::catalog::table::Catalog;
use crate::foundation::error::FrameshotError;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn fresh_state_has_session_defaults() {
    let s = CompositionState::new();
    assert!(s.screenshot().is_none());
    assert!(s.background().is_none());
    assert!(s.effect().is_none());
    assert_eq!(s.frame().kind(), DeviceKind::Desktop);
    assert_eq!(s.zoom(), 1.0);
    assert_eq!(s.viewport_scale(), 1.0);
    assert_eq!(s.revision(), 0);

    let snap = s.snapshot();
    assert!(!snap.can_export());
    assert!(!snap.zoom_control_visible());
}

#[test]
fn zoom_is_clamped() {
    let mut s = CompositionState::new();
    assert_eq!(s.set_zoom(5.0), 2.0);
    assert_eq!(s.zoom(), 2.0);
    assert_eq!(s.set_zoom(0.1), 0.5);
    assert_eq!(s.zoom(), 0.5);
    assert_eq!(s.set_zoom(1.3), 1.3);
}

#[test]
fn zoom_steps_snap_to_the_grid_and_clamp() {
    let mut s = CompositionState::new();
    assert_eq!(s.step_zoom(1), 1.1);
    assert_eq!(s.step_zoom(-2), 0.9);

    s.set_zoom(1.23);
    assert_eq!(s.step_zoom(-1), 1.1);
    assert_eq!(s.step_zoom(-20), MIN_ZOOM);
    assert_eq!(s.step_zoom(100), MAX_ZOOM);
    assert_eq!(ZOOM_STEP, 0.1);
}

#[test]
fn non_finite_zoom_is_ignored() {
    let mut s = CompositionState::new();
    s.set_zoom(1.5);
    let rev = s.revision();
    assert_eq!(s.set_zoom(f64::NAN), 1.5);
    assert_eq!(s.set_zoom(f64::INFINITY), 1.5);
    assert_eq!(s.revision(), rev);
}

#[test]
fn frame_change_refits_known_container() {
    let mut s = CompositionState::new();
    s.set_frame(DeviceKind::Tablet);
    assert_eq!(s.viewport_scale(), 1.0);

    s.set_container(ContainerSize::new(512.0, 512.0).unwrap());
    assert_eq!(s.viewport_scale(), 0.5);

    s.set_frame(DeviceKind::Desktop);
    assert_eq!(s.viewport_scale(), 0.5);

    s.set_frame(DeviceKind::Mobile);
    let expected = (512.0f64 / 375.0).min(512.0 / 667.0);
    assert!((s.viewport_scale() - expected).abs() < 1e-12);
}

#[test]
fn failed_upload_keeps_previous_screenshot() {
    let mut s = CompositionState::new();
    s.set_screenshot(&png_bytes(4, 2, [10, 20, 30, 255])).unwrap();
    let fp = s.screenshot().unwrap().fingerprint();
    let rev = s.revision();

    let err = s.set_screenshot(b"definitely not an image").unwrap_err();
    assert!(matches!(err, FrameshotError::Decode(_)));
    assert_eq!(s.screenshot().unwrap().fingerprint(), fp);
    assert_eq!(s.screenshot().unwrap().width(), 4);
    assert_eq!(s.revision(), rev);
    assert!(s.snapshot().can_export());
}

#[test]
fn snapshot_is_detached_from_later_mutations() {
    let mut s = CompositionState::new();
    s.set_background(Catalog::builtin().background(0));
    let snap = s.snapshot();

    s.set_background(None);
    s.set_zoom(2.0);

    assert_eq!(snap.background.as_ref().unwrap().id, 0);
    assert_eq!(snap.zoom, 1.0);
    assert!(s.background().is_none());
}

#[test]
fn every_successful_mutation_bumps_revision() {
    let mut s = CompositionState::new();
    s.set_effect(Catalog::builtin().effect(3));
    s.set_background(None);
    s.set_frame(DeviceKind::Mobile);
    s.set_zoom(1.1);
    s.set_container(ContainerSize::new(100.0, 100.0).unwrap());
    assert_eq!(s.revision(), 5);
}
