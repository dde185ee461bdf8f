use std::io::Cursor;

use anyhow::Context;

use crate::{
    foundation::error::{FrameshotError, FrameshotResult},
    foundation::math::unpremultiply_rgba8_in_place,
    render::backend::FrameRGBA,
};

/// File name every export is saved under.
pub const EXPORT_FILE_NAME: &str = "screenshot.png";
/// MIME type of exported files.
pub const PNG_MIME: &str = "image/png";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Encoded export ready to hand to a save collaborator.
pub struct FileBlob {
    /// Suggested file name.
    pub name: String,
    /// MIME type of `bytes`.
    pub mime: String,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl FileBlob {
    /// Wrap PNG bytes under the standard export name.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            name: EXPORT_FILE_NAME.to_string(),
            mime: PNG_MIME.to_string(),
            bytes,
        }
    }
}

/// Encode a frame as a straight-alpha RGBA8 PNG.
pub fn encode_png(frame: &FrameRGBA) -> FrameshotResult<Vec<u8>> {
    let mut rgba = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba).ok_or_else(|| {
        FrameshotError::render(format!(
            "frame buffer does not match {}x{}",
            frame.width, frame.height
        ))
    })?;

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
