use std::{fmt, str::FromStr};

use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::{FrameshotError, FrameshotResult};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
/// Device class a composition is framed for.
pub enum DeviceKind {
    /// Phone-sized portrait canvas.
    Mobile,
    /// Tablet-sized portrait canvas.
    Tablet,
    /// Desktop landscape canvas. This is the session default.
    #[default]
    Desktop,
}

impl DeviceKind {
    /// All device kinds in presentation order.
    pub const ALL: [DeviceKind; 3] = [DeviceKind::Mobile, DeviceKind::Tablet, DeviceKind::Desktop];

    /// Lowercase identifier used in catalogs, scene files and the CLI.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceKind::Mobile => "mobile",
            DeviceKind::Tablet => "tablet",
            DeviceKind::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = FrameshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(DeviceKind::Mobile),
            "tablet" => Ok(DeviceKind::Tablet),
            "desktop" => Ok(DeviceKind::Desktop),
            other => Err(FrameshotError::validation(format!(
                "unknown device kind '{other}' (expected mobile, tablet or desktop)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
/// Canonical device frame: fixed pixel size and bezel thickness for a [`DeviceKind`].
///
/// Values only come out of [`resolve`], so a `DeviceFrame` is always one of the three canonical
/// frames.
pub struct DeviceFrame {
    kind: DeviceKind,
    width: u32,
    height: u32,
    border_width: u32,
}

impl DeviceFrame {
    /// Device class of this frame.
    pub fn kind(self) -> DeviceKind {
        self.kind
    }

    /// Canonical width in pixels.
    pub fn width(self) -> u32 {
        self.width
    }

    /// Canonical height in pixels.
    pub fn height(self) -> u32 {
        self.height
    }

    /// Bezel thickness in pixels.
    pub fn border_width(self) -> u32 {
        self.border_width
    }

    /// Raster canvas at the canonical resolution.
    pub fn canvas(self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Area inside the bezel where content is laid out.
    pub fn content_rect(self) -> Rect {
        let b = f64::from(self.border_width);
        self.canvas().rect().inset(-b)
    }
}

impl Default for DeviceFrame {
    fn default() -> Self {
        resolve(DeviceKind::default())
    }
}

/// Resolve a device kind to its canonical frame.
pub fn resolve(kind: DeviceKind) -> DeviceFrame {
    let (width, height, border_width) = match kind {
        DeviceKind::Mobile => (375, 667, 8),
        DeviceKind::Tablet => (768, 1024, 12),
        DeviceKind::Desktop => (1024, 768, 16),
    };
    DeviceFrame {
        kind,
        width,
        height,
        border_width,
    }
}

/// Resolve a device identifier, coercing anything unrecognized to the desktop frame.
pub fn resolve_name(name: &str) -> DeviceFrame {
    match name.parse::<DeviceKind>() {
        Ok(kind) => resolve(kind),
        Err(_) => {
            tracing::warn!(name, "unrecognized device kind, falling back to desktop");
            resolve(DeviceKind::Desktop)
        }
    }
}

/// Strict variant of [`resolve_name`] for callers that must report bad input.
pub fn try_resolve_name(name: &str) -> FrameshotResult<DeviceFrame> {
    Ok(resolve(name.parse()?))
}

#[cfg(test)]
#[path = "../../tests/unit/frame/device.rs"]
mod tests;
