use std::fmt;

use crate::{
    composition::state::CompositionSnapshot,
    effects::filter::{FxPipeline, compile_filter},
    foundation::core::{Affine, Point},
    foundation::error::FrameshotResult,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
/// How the frame background is painted.
pub enum BackgroundPaint {
    /// No background image.
    #[default]
    None,
    /// Image scaled to cover the content box, centered, not repeated.
    Cover {
        /// Image reference.
        url: String,
    },
}

impl BackgroundPaint {
    /// Referenced image, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Cover { url } => Some(url),
        }
    }
}

impl fmt::Display for BackgroundPaint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("background: none"),
            Self::Cover { url } => {
                write!(f, "background: url(\"{url}\") center / cover no-repeat")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Uniform scale about the center of whatever box it is applied to.
pub struct ScaleTransform {
    /// Scale factor.
    pub scale: f64,
}

impl ScaleTransform {
    /// Identity transform.
    pub const IDENTITY: Self = Self { scale: 1.0 };

    /// Affine scaling by `self.scale` about `center`.
    pub fn to_affine(self, center: Point) -> Affine {
        Affine::translate(center.to_vec2())
            * Affine::scale(self.scale)
            * Affine::translate(-center.to_vec2())
    }
}

impl Default for ScaleTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for ScaleTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scale({})", self.scale)
    }
}

/// Presentation derived from a composition. Recomputed after every state change.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderStyle {
    /// Frame background.
    pub background: BackgroundPaint,
    /// Filter applied to the whole frame, `"none"` when no effect is selected.
    pub filter_expression: String,
    /// Zoom applied to the screenshot about the content center.
    pub content_transform: ScaleTransform,
    /// Viewport scale applied to the whole frame about its center. Presentation only.
    pub frame_transform: ScaleTransform,
}

impl Default for RenderStyle {
    fn default() -> Self {
        derive_style(&CompositionSnapshot::default())
    }
}

impl RenderStyle {
    /// Parse and normalize [`RenderStyle::filter_expression`].
    pub fn fx(&self) -> FrameshotResult<FxPipeline> {
        compile_filter(&self.filter_expression)
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; filter: {}; transform: {} /* content */; transform: {} /* frame */",
            self.background, self.filter_expression, self.content_transform, self.frame_transform
        )
    }
}

/// Map a composition to its render style. Pure.
pub fn derive_style<S: AsRef<CompositionSnapshot>>(state: &S) -> RenderStyle {
    let state = state.as_ref();
    RenderStyle {
        background: state
            .background
            .as_ref()
            .map(|bg| BackgroundPaint::Cover {
                url: bg.url.clone(),
            })
            .unwrap_or_default(),
        filter_expression: state
            .effect
            .as_ref()
            .map(|fx| fx.filter_expression.clone())
            .unwrap_or_else(|| "none".to_string()),
        content_transform: ScaleTransform { scale: state.zoom },
        frame_transform: ScaleTransform {
            scale: state.viewport_scale,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/derive.rs"]
mod tests;
