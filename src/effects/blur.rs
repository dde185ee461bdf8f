use crate::foundation::error::{FrameshotError, FrameshotResult};

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Separable Gaussian blur over a premultiplied RGBA8 buffer.
///
/// Edges are clamped, so a constant image stays constant. Weights are Q16 fixed point and sum to
/// exactly `1 << 16`, which keeps the result bit-exact across runs.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> FrameshotResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FrameshotError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(FrameshotError::render(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];
    convolve_axis(src, &mut tmp, width, height, &kernel, Axis::Horizontal);
    convolve_axis(&tmp, &mut out, width, height, &kernel, Axis::Vertical);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FrameshotResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FrameshotError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(FrameshotError::render("gaussian kernel sum is zero"));
    }

    const ONE: i64 = 1 << 16;
    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|w| ((w / sum) * ONE as f64).round().clamp(0.0, ONE as f64) as u32)
        .collect();

    // Rounding drift goes to the center tap so the kernel stays normalized.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + (ONE - acc)).clamp(0, ONE) as u32;

    Ok(weights)
}

fn convolve_axis(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (i64::from(width), i64::from(height));
    let index = |x: i64, y: i64| ((y * w + x) as usize) * 4;

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i64 - radius;
                let idx = match axis {
                    Axis::Horizontal => index((x + d).clamp(0, w - 1), y),
                    Axis::Vertical => index(x, (y + d).clamp(0, h - 1)),
                };
                for (c, slot) in acc.iter_mut().enumerate() {
                    *slot += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = index(x, y);
            for (c, v) in acc.iter().enumerate() {
                dst[out + c] = q16_to_u8(*v);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
