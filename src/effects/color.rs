use crate::effects::filter::ColorMatrix;
use crate::foundation::error::{FrameshotError, FrameshotResult};

/// Apply a color matrix to a premultiplied RGBA8 buffer in place.
///
/// The matrix operates on straight-alpha values; alpha itself is left untouched.
pub fn apply_color_matrix_in_place(buf: &mut [u8], m: &ColorMatrix) -> FrameshotResult<()> {
    if !buf.len().is_multiple_of(4) {
        return Err(FrameshotError::render(
            "apply_color_matrix_in_place expects an rgba8 buffer",
        ));
    }

    for px in buf.chunks_exact_mut(4) {
        let a = px[3];
        if a == 0 {
            continue;
        }
        let af = f32::from(a) / 255.0;
        let straight = [
            (f32::from(px[0]) / 255.0 / af).min(1.0),
            (f32::from(px[1]) / 255.0 / af).min(1.0),
            (f32::from(px[2]) / 255.0 / af).min(1.0),
        ];
        let [r, g, b] = m.apply(straight);
        px[0] = to_premul_u8(r, af);
        px[1] = to_premul_u8(g, af);
        px[2] = to_premul_u8(b, af);
    }
    Ok(())
}

fn to_premul_u8(c: f32, a: f32) -> u8 {
    (c * a * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color.rs"]
mod tests;
