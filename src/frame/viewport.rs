use crate::foundation::error::{FrameshotError, FrameshotResult};
use crate::frame::device::DeviceFrame;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// On-screen area available to the frame preview, in CSS-like pixels.
pub struct ContainerSize {
    /// Available width.
    pub width: f64,
    /// Available height.
    pub height: f64,
}

impl ContainerSize {
    /// Build a container size; both dimensions must be finite and positive.
    pub fn new(width: f64, height: f64) -> FrameshotResult<Self> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(FrameshotError::validation(format!(
                "container size must be finite and > 0, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

/// Uniform scale that fits `frame` into a `container_width` x `container_height` box.
///
/// The frame is only ever shrunk: the result is capped at `1.0`. Degenerate containers yield the
/// smallest positive scale instead of zero or NaN.
pub fn compute_scale(container_width: f64, container_height: f64, frame: DeviceFrame) -> f64 {
    let scale_x = container_width / f64::from(frame.width());
    let scale_y = container_height / f64::from(frame.height());
    let scale = scale_x.min(scale_y).min(1.0);
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        f64::MIN_POSITIVE
    }
}

/// [`compute_scale`] for a validated [`ContainerSize`].
pub fn scale_for(container: ContainerSize, frame: DeviceFrame) -> f64 {
    compute_scale(container.width, container.height, frame)
}

#[cfg(test)]
#[path = "../../tests/unit/frame/viewport.rs"]
mod tests;
