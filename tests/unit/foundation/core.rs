use super::*;

#[test]
fn canvas_rejects_empty_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(4, 3).unwrap();
    assert_eq!(c.rgba8_len().unwrap(), 48);
    assert_eq!(c.center(), Point::new(2.0, 1.5));
}

#[test]
fn premultiply_rounds_to_nearest() {
    let p = Rgba8Premul::from_straight_rgba(100, 50, 200, 128);
    assert_eq!(
        p.to_array(),
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
    assert_eq!(Rgba8Premul::transparent().to_array(), [0, 0, 0, 0]);
}

#[test]
fn hex_colors_parse_with_and_without_alpha() {
    assert_eq!(parse_hex_rgba("#1f2937").unwrap(), [0x1f, 0x29, 0x37, 255]);
    assert_eq!(parse_hex_rgba("ffffff80").unwrap(), [255, 255, 255, 0x80]);
    assert!(parse_hex_rgba("#fff").is_err());
    assert!(parse_hex_rgba("#gg0000").is_err());
}
