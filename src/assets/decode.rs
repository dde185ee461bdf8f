use std::sync::Arc;

use crate::{
    assets::store::{PreparedImage, PreparedSvg},
    foundation::error::{FrameshotError, FrameshotResult},
    foundation::math::premultiply_rgba8_in_place,
};

/// Largest raster edge produced from an SVG.
pub const MAX_SVG_RASTER_DIM: u32 = 16_384;

/// Decode raster bytes (PNG, JPEG, WebP, ...) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> FrameshotResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FrameshotError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(FrameshotError::decode("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG markup into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> FrameshotResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| FrameshotError::decode(format!("parse svg tree: {e}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Cheap sniff for SVG markup. Raster formats never start with `<`.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let head = &bytes[start..bytes.len().min(start + 4096)];
    head.first() == Some(&b'<') && head.windows(4).any(|w| w == b"<svg")
}

/// Rasterize an SVG at `scale` times its intrinsic size.
pub fn rasterize_svg(svg: &PreparedSvg, scale: f64) -> FrameshotResult<PreparedImage> {
    let size = svg.tree.size();
    let (w, h) = (f64::from(size.width()), f64::from(size.height()));
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(FrameshotError::decode("svg has invalid width/height"));
    }
    if !(scale.is_finite() && scale > 0.0) {
        return Err(FrameshotError::render(format!(
            "svg raster scale must be finite and > 0, got {scale}"
        )));
    }

    let width = (w * scale).ceil().max(1.0);
    let height = (h * scale).ceil().max(1.0);
    let max = f64::from(MAX_SVG_RASTER_DIM);
    if width > max || height > max {
        return Err(FrameshotError::render(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_RASTER_DIM}x{MAX_SVG_RASTER_DIM})"
        )));
    }
    let (width, height) = (width as u32, height as u32);

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| FrameshotError::render("failed to allocate svg pixmap"))?;
    let sx = width as f32 / size.width();
    let sy = height as f32 / size.height();
    resvg::render(
        &svg.tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
