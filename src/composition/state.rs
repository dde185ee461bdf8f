use std::sync::Arc;

use crate::{
    assets::{decode::decode_image, store::PreparedImage},
    catalog::table::{Background, Effect},
    foundation::error::FrameshotResult,
    foundation::math::Fnv1a64,
    frame::device::{DeviceFrame, DeviceKind, resolve},
    frame::viewport::{ContainerSize, scale_for},
};

/// Smallest zoom factor accepted by [`CompositionState::set_zoom`].
pub const MIN_ZOOM: f64 = 0.5;
/// Largest zoom factor accepted by [`CompositionState::set_zoom`].
pub const MAX_ZOOM: f64 = 2.0;
/// Increment used by stepped zoom controls.
pub const ZOOM_STEP: f64 = 0.1;
/// Zoom of a fresh session.
pub const DEFAULT_ZOOM: f64 = 1.0;

#[derive(Clone, Debug)]
/// Decoded upload together with a fingerprint of its raw bytes.
pub struct Screenshot {
    image: PreparedImage,
    fingerprint: u64,
}

impl Screenshot {
    /// Decode uploaded bytes. Any format the `image` crate understands is accepted.
    pub fn decode(bytes: &[u8]) -> FrameshotResult<Self> {
        let image = decode_image(bytes)?;
        let mut hasher = Fnv1a64::new_default();
        hasher.write_bytes(bytes);
        Ok(Self {
            image,
            fingerprint: hasher.finish(),
        })
    }

    /// Decoded pixels.
    pub fn image(&self) -> &PreparedImage {
        &self.image
    }

    /// FNV-1a hash of the uploaded bytes.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Intrinsic width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width
    }

    /// Intrinsic height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height
    }
}

/// Immutable copy of every [`CompositionState`] field.
///
/// Cloning is cheap: pixel data and catalog entries are `Arc`-shared. Export works from a
/// snapshot so nothing can change underneath a capture.
#[derive(Clone, Debug)]
pub struct CompositionSnapshot {
    /// Uploaded screenshot, if any.
    pub screenshot: Option<Screenshot>,
    /// Selected background.
    pub background: Option<Arc<Background>>,
    /// Selected effect.
    pub effect: Option<Arc<Effect>>,
    /// Active device frame.
    pub frame: DeviceFrame,
    /// Screenshot magnification, within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
    /// Fit-to-container shrink factor, within `(0, 1]`.
    pub viewport_scale: f64,
    /// Last known container, if any.
    pub container: Option<ContainerSize>,
}

impl Default for CompositionSnapshot {
    fn default() -> Self {
        Self {
            screenshot: None,
            background: None,
            effect: None,
            frame: DeviceFrame::default(),
            zoom: DEFAULT_ZOOM,
            viewport_scale: 1.0,
            container: None,
        }
    }
}

impl CompositionSnapshot {
    /// Export requires a screenshot.
    pub fn can_export(&self) -> bool {
        self.screenshot.is_some()
    }

    /// The zoom control is only meaningful once there is something to zoom.
    pub fn zoom_control_visible(&self) -> bool {
        self.screenshot.is_some()
    }
}

impl AsRef<CompositionSnapshot> for CompositionSnapshot {
    fn as_ref(&self) -> &CompositionSnapshot {
        self
    }
}

#[derive(Clone, Debug, Default)]
/// The single mutable aggregate behind an editing session.
pub struct CompositionState {
    current: CompositionSnapshot,
    revision: u64,
}

impl CompositionState {
    /// Fresh state: desktop frame, zoom 1, no screenshot, background or effect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap immutable copy for export.
    pub fn snapshot(&self) -> CompositionSnapshot {
        self.current.clone()
    }

    /// Counter bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Uploaded screenshot, if any.
    pub fn screenshot(&self) -> Option<&Screenshot> {
        self.current.screenshot.as_ref()
    }

    /// Selected background.
    pub fn background(&self) -> Option<&Arc<Background>> {
        self.current.background.as_ref()
    }

    /// Selected effect.
    pub fn effect(&self) -> Option<&Arc<Effect>> {
        self.current.effect.as_ref()
    }

    /// Active device frame.
    pub fn frame(&self) -> DeviceFrame {
        self.current.frame
    }

    /// Current zoom.
    pub fn zoom(&self) -> f64 {
        self.current.zoom
    }

    /// Current viewport scale.
    pub fn viewport_scale(&self) -> f64 {
        self.current.viewport_scale
    }

    /// Last known container.
    pub fn container(&self) -> Option<ContainerSize> {
        self.current.container
    }

    /// Decode and install a screenshot. On failure the previous screenshot stays in place.
    pub fn set_screenshot(&mut self, bytes: &[u8]) -> FrameshotResult<()> {
        match Screenshot::decode(bytes) {
            Ok(shot) => {
                tracing::debug!(
                    width = shot.width(),
                    height = shot.height(),
                    fingerprint = shot.fingerprint(),
                    "screenshot loaded"
                );
                self.current.screenshot = Some(shot);
                self.bump();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, len = bytes.len(), "screenshot decode failed");
                Err(err)
            }
        }
    }

    /// Replace the background selection.
    pub fn set_background(&mut self, background: Option<Arc<Background>>) {
        self.current.background = background;
        self.bump();
    }

    /// Replace the effect selection.
    pub fn set_effect(&mut self, effect: Option<Arc<Effect>>) {
        self.current.effect = effect;
        self.bump();
    }

    /// Switch device frame and refit it to the known container.
    pub fn set_frame(&mut self, kind: DeviceKind) {
        self.current.frame = resolve(kind);
        self.refit();
        self.bump();
    }

    /// Set the zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Returns the zoom now in effect.
    ///
    /// Non-finite input is ignored.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if !zoom.is_finite() {
            tracing::warn!(zoom, "ignoring non-finite zoom");
            return self.current.zoom;
        }
        self.current.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.bump();
        self.current.zoom
    }

    /// Move the zoom by `steps` increments of [`ZOOM_STEP`], snapping to the step grid first.
    /// Returns the zoom now in effect.
    pub fn step_zoom(&mut self, steps: i32) -> f64 {
        let per_unit = (1.0 / ZOOM_STEP).round();
        let index = (self.current.zoom * per_unit).round() + f64::from(steps);
        self.set_zoom(index / per_unit)
    }

    /// Record the container size and recompute the viewport scale.
    pub fn set_container(&mut self, size: ContainerSize) {
        self.current.container = Some(size);
        self.refit();
        self.bump();
    }

    fn refit(&mut self) {
        if let Some(container) = self.current.container {
            self.current.viewport_scale = scale_for(container, self.current.frame);
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl AsRef<CompositionSnapshot> for CompositionState {
    fn as_ref(&self) -> &CompositionSnapshot {
        &self.current
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/state.rs"]
mod tests;
