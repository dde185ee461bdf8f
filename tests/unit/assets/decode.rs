use std::io::Cursor;

use super::*;

const RED_SQUARE: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2">
  <rect width="4" height="2" fill="#ff0000"/>
</svg>"##;

#[test]
fn decode_png_premultiplies() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let prepared = decode_image(&buf).unwrap();
    assert_eq!((prepared.width, prepared.height), (1, 1));
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn garbage_is_a_decode_error() {
    let err = decode_image(b"not an image").unwrap_err();
    assert!(matches!(err, FrameshotError::Decode(_)));
    assert!(parse_svg(b"<svg").is_err());
}

#[test]
fn svg_sniffing() {
    assert!(looks_like_svg(RED_SQUARE));
    assert!(looks_like_svg(
        b"\n  <?xml version=\"1.0\"?><svg xmlns=\"http://www.w3.org/2000/svg\"/>"
    ));
    assert!(!looks_like_svg(b"\x89PNG\r\n\x1a\n"));
    assert!(!looks_like_svg(b"<html></html>"));
    assert!(!looks_like_svg(b""));
}

#[test]
fn svg_rasterizes_at_requested_scale() {
    let svg = parse_svg(RED_SQUARE).unwrap();
    let img = rasterize_svg(&svg, 2.0).unwrap();
    assert_eq!((img.width, img.height), (8, 4));
    let center = ((2 * img.width + 4) * 4) as usize;
    assert_eq!(&img.rgba8_premul[center..center + 4], &[255, 0, 0, 255]);

    assert!(rasterize_svg(&svg, 0.0).is_err());
    assert!(rasterize_svg(&svg, 1e9).is_err());
}
