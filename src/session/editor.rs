use std::sync::Arc;

use crate::{
    assets::resolve::ResourceResolver,
    catalog::table::Catalog,
    composition::state::{CompositionSnapshot, CompositionState},
    export::pipeline::{export, export_to, render_preview},
    export::png::FileBlob,
    export::sink::SaveSink,
    foundation::error::{ExportError, FrameshotError, FrameshotResult},
    frame::device::DeviceKind,
    frame::viewport::ContainerSize,
    render::backend::{FrameRGBA, RasterOpts},
    style::derive::{RenderStyle, derive_style},
};

#[derive(Clone, Debug, PartialEq)]
/// User action applied through [`Editor::dispatch`].
pub enum EditorEvent {
    /// Bytes of one uploaded image.
    Upload(Vec<u8>),
    /// Pick a background by catalog id, or clear it.
    SelectBackground(Option<u32>),
    /// Pick an effect by catalog id, or clear it.
    SelectEffect(Option<u32>),
    /// Switch device frame.
    SetFrame(DeviceKind),
    /// Set zoom; clamped to the supported range.
    SetZoom(f64),
    /// Nudge zoom by whole zoom steps (negative zooms out).
    StepZoom(i32),
}

/// Registration of the editor's container-size listener.
///
/// Only the most recently attached listener is live; resize events from an older one are
/// rejected. Hand it back through [`Editor::detach_viewport`] when the view goes away.
#[must_use = "a viewport listener must be detached with Editor::detach_viewport"]
#[derive(Debug, PartialEq, Eq)]
pub struct ViewportListener {
    generation: u64,
}

/// Editing session: owns the composition, keeps its render style current and drives export.
#[derive(Debug)]
pub struct Editor {
    state: CompositionState,
    style: RenderStyle,
    catalog: Arc<Catalog>,
    live_listener: Option<u64>,
    next_generation: u64,
}

impl Editor {
    /// Session backed by `catalog`.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let state = CompositionState::new();
        let style = derive_style(&state);
        Self {
            state,
            style,
            catalog,
            live_listener: None,
            next_generation: 0,
        }
    }

    /// Session backed by [`Catalog::builtin`].
    pub fn with_builtin_catalog() -> Self {
        Self::new(Arc::new(Catalog::builtin().clone()))
    }

    /// Current composition.
    pub fn state(&self) -> &CompositionState {
        &self.state
    }

    /// Immutable copy of the current composition.
    pub fn snapshot(&self) -> CompositionSnapshot {
        self.state.snapshot()
    }

    /// Style derived from the current composition.
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Catalog selections are resolved against.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Whether export is currently possible.
    pub fn can_export(&self) -> bool {
        self.state.as_ref().can_export()
    }

    /// Whether a zoom control should be shown.
    pub fn zoom_control_visible(&self) -> bool {
        self.state.as_ref().zoom_control_visible()
    }

    /// Apply one user action and re-derive the style.
    ///
    /// Unknown catalog ids and undecodable uploads leave the composition untouched.
    pub fn dispatch(&mut self, event: EditorEvent) -> FrameshotResult<()> {
        let result = self.apply(event);
        self.style = derive_style(&self.state);
        result
    }

    fn apply(&mut self, event: EditorEvent) -> FrameshotResult<()> {
        match event {
            EditorEvent::Upload(bytes) => self.state.set_screenshot(&bytes)?,
            EditorEvent::SelectBackground(None) => self.state.set_background(None),
            EditorEvent::SelectBackground(Some(id)) => {
                let bg = self.catalog.background(id).ok_or_else(|| {
                    FrameshotError::validation(format!("unknown background id {id}"))
                })?;
                self.state.set_background(Some(bg));
            }
            EditorEvent::SelectEffect(None) => self.state.set_effect(None),
            EditorEvent::SelectEffect(Some(id)) => {
                let fx = self
                    .catalog
                    .effect(id)
                    .ok_or_else(|| FrameshotError::validation(format!("unknown effect id {id}")))?;
                self.state.set_effect(Some(fx));
            }
            EditorEvent::SetFrame(kind) => self.state.set_frame(kind),
            EditorEvent::SetZoom(zoom) => {
                self.state.set_zoom(zoom);
            }
            EditorEvent::StepZoom(steps) => {
                self.state.step_zoom(steps);
            }
        }
        Ok(())
    }

    /// Start listening to container-size changes, seeded with the current size.
    ///
    /// Any previously attached listener becomes stale.
    pub fn attach_viewport(&mut self, size: ContainerSize) -> ViewportListener {
        self.next_generation += 1;
        let generation = self.next_generation;
        if let Some(old) = self.live_listener.replace(generation) {
            tracing::debug!(old, generation, "viewport listener superseded");
        }
        self.apply_container(size);
        ViewportListener { generation }
    }

    /// Container-size event delivered through `listener`.
    pub fn resize(
        &mut self,
        listener: &ViewportListener,
        size: ContainerSize,
    ) -> FrameshotResult<()> {
        if self.live_listener != Some(listener.generation) {
            return Err(FrameshotError::validation(
                "resize delivered through a stale viewport listener",
            ));
        }
        self.apply_container(size);
        Ok(())
    }

    /// Stop listening. The last known viewport scale is kept.
    pub fn detach_viewport(&mut self, listener: ViewportListener) {
        if self.live_listener == Some(listener.generation) {
            self.live_listener = None;
        }
    }

    /// Whether a viewport listener is live.
    pub fn has_viewport_listener(&self) -> bool {
        self.live_listener.is_some()
    }

    fn apply_container(&mut self, size: ContainerSize) {
        self.state.set_container(size);
        self.style = derive_style(&self.state);
    }

    /// Export the current composition as `screenshot.png`.
    pub fn export(
        &self,
        resolver: &dyn ResourceResolver,
        opts: &RasterOpts,
    ) -> Result<FileBlob, ExportError> {
        if !self.can_export() {
            return Err(ExportError::NoScreenshot);
        }
        export(&self.state.snapshot(), resolver, opts)
    }

    /// Export and hand the file to `sink`.
    pub fn export_to(
        &self,
        resolver: &dyn ResourceResolver,
        opts: &RasterOpts,
        sink: &mut dyn SaveSink,
    ) -> Result<FileBlob, ExportError> {
        if !self.can_export() {
            return Err(ExportError::NoScreenshot);
        }
        export_to(&self.state.snapshot(), resolver, opts, sink)
    }

    /// Render the on-screen preview for the last known container.
    pub fn preview(
        &self,
        resolver: &dyn ResourceResolver,
        opts: &RasterOpts,
    ) -> Result<FrameRGBA, ExportError> {
        let container = self.state.container().ok_or_else(|| {
            FrameshotError::validation("preview needs a container size; attach a viewport first")
        })?;
        render_preview(&self.state.snapshot(), container, resolver, opts)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
