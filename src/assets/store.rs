use std::sync::Arc;

use crate::{
    assets::decode::{decode_image, looks_like_svg, parse_svg, rasterize_svg},
    assets::resolve::ResourceResolver,
    composition::state::{CompositionSnapshot, MAX_ZOOM},
    foundation::core::Rect,
    foundation::error::{ExportError, FrameshotError, FrameshotResult},
    style::derive::RenderStyle,
};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Intrinsic size as floating point.
    pub fn size(&self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }
}

#[derive(Clone, Debug)]
/// Prepared SVG asset represented as a parsed `usvg` tree.
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

#[derive(Clone, Debug)]
/// Everything a render needs, fetched and decoded up front so rendering does no IO.
pub struct PreparedResources {
    /// Decoded screenshot.
    pub screenshot: PreparedImage,
    /// Decoded background, when one is selected.
    pub background: Option<PreparedImage>,
}

impl PreparedResources {
    /// Resolve and decode the resources referenced by `snapshot` and its `style`.
    ///
    /// A background that `origin` may not read back fails with [`ExportError::TaintedCanvas`].
    #[tracing::instrument(skip(snapshot, style, resolver))]
    pub fn prepare(
        snapshot: &CompositionSnapshot,
        style: &RenderStyle,
        resolver: &dyn ResourceResolver,
        origin: &str,
    ) -> Result<Self, ExportError> {
        let content = snapshot.frame.content_rect();
        let shot = snapshot
            .screenshot
            .as_ref()
            .ok_or(ExportError::NoScreenshot)?
            .image();
        // Contain-fit never upscales, so nothing larger than the zoomed content box is sampled.
        let screenshot = downsample_to_fit(
            shot,
            content.width() * MAX_ZOOM,
            content.height() * MAX_ZOOM,
        )?;

        let background = match style.background.url() {
            None => None,
            Some(url) => {
                let fetched = resolver.fetch(url, origin)?;
                if !fetched.cors_readable {
                    tracing::warn!(url, origin, "background is not cors-readable");
                    return Err(ExportError::TaintedCanvas {
                        url: url.to_string(),
                    });
                }
                Some(decode_background(&fetched.bytes, content)?)
            }
        };

        Ok(Self {
            screenshot,
            background,
        })
    }
}

/// Decode background bytes; SVG is rasterized at the scale it will be drawn at when covering
/// `area`.
pub fn decode_background(bytes: &[u8], area: Rect) -> FrameshotResult<PreparedImage> {
    if !looks_like_svg(bytes) {
        let image = decode_image(bytes)?;
        let (w, h) = image.size();
        let cover = (area.width() / w).max(area.height() / h);
        let visible = crop_centered(
            &image,
            centered_span(image.width, area.width() / cover),
            centered_span(image.height, area.height() / cover),
        )?;
        let (vw, vh) = visible.size();
        let cover = (area.width() / vw).max(area.height() / vh);
        return downsample_to_fit(&visible, (vw * cover).ceil(), (vh * cover).ceil());
    }
    let svg = parse_svg(bytes)?;
    let size = svg.tree.size();
    let scale = (area.width() / f64::from(size.width()))
        .max(area.height() / f64::from(size.height()));
    rasterize_svg(&svg, scale)
}

// Span of `len` covering `needed` pixels plus a one pixel margin on each side, with the same
// parity as `len` so cropping it keeps the exact center.
fn centered_span(len: u32, needed: f64) -> u32 {
    let mut span = (needed.ceil().max(0.0) as u32).saturating_add(2);
    if (len.saturating_sub(span)) % 2 == 1 {
        span += 1;
    }
    span.min(len)
}

fn crop_centered(image: &PreparedImage, width: u32, height: u32) -> FrameshotResult<PreparedImage> {
    if width >= image.width && height >= image.height {
        return Ok(image.clone());
    }
    let src = to_rgba_image(image)?;
    let (x, y) = ((image.width - width) / 2, (image.height - height) / 2);
    let out = image::imageops::crop_imm(&src, x, y, width, height).to_image();
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(out.into_raw()),
    })
}

fn to_rgba_image(image: &PreparedImage) -> FrameshotResult<image::RgbaImage> {
    image::RgbaImage::from_raw(
        image.width,
        image.height,
        image.rgba8_premul.as_ref().clone(),
    )
    .ok_or_else(|| FrameshotError::decode("prepared image byte length mismatch"))
}

/// Shrink `image` to fit inside `max_w` x `max_h`, keeping its aspect ratio.
///
/// Images already within bounds are returned as-is (sharing their pixel buffer).
pub fn downsample_to_fit(
    image: &PreparedImage,
    max_w: f64,
    max_h: f64,
) -> FrameshotResult<PreparedImage> {
    let (w, h) = image.size();
    let scale = (max_w / w).min(max_h / h);
    if scale.is_nan() || scale >= 1.0 {
        return Ok(image.clone());
    }

    let width = ((w * scale).round() as u32).max(1);
    let height = ((h * scale).round() as u32).max(1);
    let src = to_rgba_image(image)?;
    let out = image::imageops::resize(&src, width, height, image::imageops::FilterType::Triangle);
    tracing::debug!(
        from_w = image.width,
        from_h = image.height,
        width,
        height,
        "image downsampled"
    );

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(out.into_raw()),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
