use std::sync::Arc;

use crate::{
    assets::resolve::ResourceResolver,
    assets::store::{PreparedImage, PreparedResources},
    composition::state::CompositionSnapshot,
    export::png::{FileBlob, encode_png},
    export::sink::SaveSink,
    foundation::core::Canvas,
    foundation::error::ExportError,
    frame::viewport::{ContainerSize, scale_for},
    render::backend::{FrameRGBA, RasterOpts, RenderBackend},
    render::cpu::CpuBackend,
    render::plan::{compile_plan, compile_preview_plan},
    style::derive::{ScaleTransform, derive_style},
};

/// Render `snapshot` at its frame's canonical resolution.
///
/// The style is derived before anything is fetched, and nothing here reads the viewport scale:
/// output dimensions always equal the frame's canonical size.
#[tracing::instrument(skip(snapshot, resolver, opts), fields(frame = %snapshot.frame.kind()))]
pub fn render_frame(
    snapshot: &CompositionSnapshot,
    resolver: &dyn ResourceResolver,
    opts: &RasterOpts,
) -> Result<FrameRGBA, ExportError> {
    if snapshot.screenshot.is_none() {
        return Err(ExportError::NoScreenshot);
    }
    let style = derive_style(snapshot);
    let resources = PreparedResources::prepare(snapshot, &style, resolver, &opts.origin)?;
    let plan = compile_plan(snapshot.frame, &style, &resources, opts)?;
    tracing::debug!(passes = plan.passes.len(), style = %style, "plan compiled");

    let mut backend = CpuBackend::new();
    Ok(backend.render_plan(&plan)?)
}

/// Capture `snapshot` as a PNG named `screenshot.png`.
///
/// Same snapshot, resolver contents and options produce byte-identical output.
pub fn export(
    snapshot: &CompositionSnapshot,
    resolver: &dyn ResourceResolver,
    opts: &RasterOpts,
) -> Result<FileBlob, ExportError> {
    let frame = render_frame(snapshot, resolver, opts)?;
    let blob = FileBlob::png(encode_png(&frame)?);
    tracing::info!(
        width = frame.width,
        height = frame.height,
        len = blob.bytes.len(),
        "export encoded"
    );
    Ok(blob)
}

/// [`export`], then hand the blob to `sink`.
pub fn export_to(
    snapshot: &CompositionSnapshot,
    resolver: &dyn ResourceResolver,
    opts: &RasterOpts,
    sink: &mut dyn SaveSink,
) -> Result<FileBlob, ExportError> {
    let blob = export(snapshot, resolver, opts)?;
    sink.save(&blob)?;
    Ok(blob)
}

/// Render the frame as it appears on screen: scaled by the viewport scale for `container`,
/// centered in a container-sized canvas.
///
/// When `container` is the snapshot's own container this is exactly the style's
/// `frame_transform`.
#[tracing::instrument(skip(snapshot, resolver, opts))]
pub fn render_preview(
    snapshot: &CompositionSnapshot,
    container: ContainerSize,
    resolver: &dyn ResourceResolver,
    opts: &RasterOpts,
) -> Result<FrameRGBA, ExportError> {
    let frame = render_frame(snapshot, resolver, opts)?;
    let canvas = Canvas::new(
        container.width.ceil() as u32,
        container.height.ceil() as u32,
    )?;
    let frame_transform = ScaleTransform {
        scale: scale_for(container, snapshot.frame),
    };

    let rendered = PreparedImage {
        width: frame.width,
        height: frame.height,
        rgba8_premul: Arc::new(frame.data),
    };
    let plan = compile_preview_plan(&rendered, canvas, frame_transform)?;
    let mut backend = CpuBackend::new();
    backend.render_plan(&plan).map_err(ExportError::from)
}

#[cfg(test)]
#[path = "../../tests/unit/export/pipeline.rs"]
mod tests;
