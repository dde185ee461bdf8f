//! Frameshot composes a screenshot into a device mockup and exports it as a PNG.
//!
//! A composition is one uploaded screenshot, an optional background, an optional CSS-like
//! filter effect, a device frame (mobile, tablet or desktop) and a zoom factor. The same
//! composition always exports to the same bytes, at the frame's canonical resolution,
//! regardless of how large the on-screen preview happens to be.
//!
//! # Pipeline overview
//!
//! 1. **Edit**: [`Editor`] applies [`EditorEvent`]s to a [`CompositionState`]
//! 2. **Derive**: `CompositionSnapshot -> RenderStyle` via [`derive_style`]
//! 3. **Prepare**: resources are fetched through a [`ResourceResolver`] and decoded up front
//! 4. **Compile**: [`compile_plan`] lowers the style into a backend-agnostic [`RenderPlan`]
//! 5. **Render**: [`CpuBackend`] executes the plan into premultiplied [`FrameRGBA`]
//! 6. **Encode**: [`encode_png`] produces a `screenshot.png` [`FileBlob`] for a [`SaveSink`]
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No IO in renderers**: fetching and decoding happen before the plan is compiled.
//! - **Premultiplied RGBA8** end-to-end until PNG encoding.
//! - **CORS-aware**: a background whose response does not permit the export origin fails the
//!   export with [`ExportError::TaintedCanvas`] instead of producing a partial image.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod assets;
mod catalog;
mod composition;
mod effects;
mod export;
mod foundation;
mod frame;
mod render;
mod session;
mod style;

pub use assets::decode::{MAX_SVG_RASTER_DIM, decode_image, parse_svg, rasterize_svg};
#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub use assets::http::{DEFAULT_TIMEOUT, HttpResolver};
pub use assets::resolve::{
    FetchedResource, FsResolver, MemoryResolver, ResourceResolver, cors_permits, is_remote_url,
    normalize_rel_path,
};
pub use assets::store::{
    PreparedImage, PreparedResources, PreparedSvg, decode_background, downsample_to_fit,
};
pub use catalog::table::{Background, Catalog, Effect};
pub use composition::state::{
    CompositionSnapshot, CompositionState, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM, Screenshot, ZOOM_STEP,
};
pub use effects::blur::blur_rgba8_premul;
pub use effects::color::apply_color_matrix_in_place;
pub use effects::composite::{PremulRgba8, over, over_in_place};
pub use effects::filter::{
    ColorMatrix, Filter, FxPipeline, InlineFx, MAX_BLUR_RADIUS_PX, PassFx, blur_radius_for_sigma,
    color_matrix_for, compile_filter, normalize_filters, parse_filter,
};
pub use export::pipeline::{export, export_to, render_frame, render_preview};
pub use export::png::{EXPORT_FILE_NAME, FileBlob, PNG_MIME, encode_png};
pub use export::sink::{DirSink, InMemorySink, SaveSink};
pub use foundation::core::{Affine, Canvas, Point, Rect, Rgba8Premul, Vec2, parse_hex_rgba};
pub use foundation::error::{ExportError, FrameshotError, FrameshotResult};
pub use frame::device::{DeviceFrame, DeviceKind, resolve, resolve_name, try_resolve_name};
pub use frame::viewport::{ContainerSize, compute_scale, scale_for};
pub use render::backend::{
    ENV_BEZEL_RGBA, ENV_CLEAR_RGBA, ENV_ORIGIN, FrameRGBA, RasterOpts, RenderBackend,
};
pub use render::cpu::CpuBackend;
pub use render::passes::{PassBackend, execute_plan};
pub use render::plan::{
    CONTENT_SURFACE, CompositeOp, CompositePass, DrawOp, FINAL_SURFACE, OffscreenPass, Pass,
    RenderPlan, ScenePass, SurfaceDesc, SurfaceId, bezel_rects, compile_plan,
    compile_preview_plan, contain_transform, cover_transform,
};
pub use session::editor::{Editor, EditorEvent, ViewportListener};
pub use style::derive::{BackgroundPaint, RenderStyle, ScaleTransform, derive_style};
