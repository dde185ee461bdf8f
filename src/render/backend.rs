use crate::{
    foundation::core::parse_hex_rgba,
    foundation::error::FrameshotResult,
    render::passes::{PassBackend, execute_plan},
    render::plan::RenderPlan,
};

/// Env var overriding [`RasterOpts::clear_rgba`] (`#rrggbb[aa]` or `none`).
pub const ENV_CLEAR_RGBA: &str = "FRAMESHOT_CLEAR_RGBA";
/// Env var overriding [`RasterOpts::bezel_rgba`] (`#rrggbb[aa]` or `none`).
pub const ENV_BEZEL_RGBA: &str = "FRAMESHOT_BEZEL_RGBA";
/// Env var overriding [`RasterOpts::origin`].
pub const ENV_ORIGIN: &str = "FRAMESHOT_ORIGIN";

#[derive(Clone, Debug, PartialEq, Eq)]
/// Rendered RGBA8 frame.
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 bytes.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Rasterization options. Straight-alpha colors; `None` disables the layer.
pub struct RasterOpts {
    /// Color the final surface is cleared to before the composition is drawn.
    pub clear_rgba: Option<[u8; 4]>,
    /// Color of the device bezel ring.
    pub bezel_rgba: Option<[u8; 4]>,
    /// Origin presented to resource resolvers for cross-origin checks.
    pub origin: String,
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            clear_rgba: Some([255, 255, 255, 255]),
            bezel_rgba: Some([0x1f, 0x29, 0x37, 0xff]),
            origin: "null".to_string(),
        }
    }
}

impl RasterOpts {
    /// Defaults overlaid with `FRAMESHOT_*` environment variables.
    pub fn from_env() -> FrameshotResult<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`, keyed by the `ENV_*` names.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> FrameshotResult<Self> {
        if let Some(v) = lookup(ENV_CLEAR_RGBA) {
            self.clear_rgba = parse_optional_color(&v)?;
        }
        if let Some(v) = lookup(ENV_BEZEL_RGBA) {
            self.bezel_rgba = parse_optional_color(&v)?;
        }
        if let Some(v) = lookup(ENV_ORIGIN) {
            let v = v.trim();
            if !v.is_empty() {
                self.origin = v.to_string();
            }
        }
        Ok(self)
    }
}

fn parse_optional_color(s: &str) -> FrameshotResult<Option<[u8; 4]>> {
    if s.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_hex_rgba(s).map(Some)
}

/// A [`PassBackend`] that can run a whole plan.
pub trait RenderBackend: PassBackend {
    /// Execute `plan` and read back its final surface.
    fn render_plan(&mut self, plan: &RenderPlan) -> FrameshotResult<FrameRGBA> {
        execute_plan(self, plan)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
