use crate::foundation::error::{FrameshotError, FrameshotResult};

/// Largest blur kernel radius the CPU backend accepts.
pub const MAX_BLUR_RADIUS_PX: u32 = 256;

#[derive(Clone, Debug, PartialEq)]
/// One function of a CSS-like filter expression.
pub enum Filter {
    /// Gaussian blur with standard deviation `sigma` in pixels.
    Blur {
        /// Standard deviation in pixels.
        sigma: f32,
    },
    /// Desaturate towards luminance; amount in `[0, 1]`.
    Grayscale(f32),
    /// Sepia tone; amount in `[0, 1]`.
    Sepia(f32),
    /// Saturation multiplier; `>= 0`.
    Saturate(f32),
    /// Color inversion; amount in `[0, 1]`.
    Invert(f32),
    /// Alpha multiplier; amount in `[0, 1]`.
    Opacity(f32),
    /// Linear brightness multiplier; `>= 0`.
    Brightness(f32),
    /// Contrast around mid-grey; `>= 0`.
    Contrast(f32),
}

/// 3x4 affine color transform on straight-alpha RGB in `[0, 1]`.
///
/// Each row is `[r, g, b, offset]` for the red, green and blue outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorMatrix(pub [f32; 12]);

impl ColorMatrix {
    fn channel_mix(rows: [[f32; 3]; 3]) -> Self {
        let [r, g, b] = rows;
        Self([
            r[0], r[1], r[2], 0.0, g[0], g[1], g[2], 0.0, b[0], b[1], b[2], 0.0,
        ])
    }

    fn linear(slope: f32, intercept: f32) -> Self {
        Self([
            slope, 0.0, 0.0, intercept, 0.0, slope, 0.0, intercept, 0.0, 0.0, slope, intercept,
        ])
    }

    /// Apply to one straight-alpha RGB triple, clamping the result to `[0, 1]`.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let m = &self.0;
        let row = |i: usize| {
            (m[i] * rgb[0] + m[i + 1] * rgb[1] + m[i + 2] * rgb[2] + m[i + 3]).clamp(0.0, 1.0)
        };
        [row(0), row(4), row(8)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Filter work folded into the final composite instead of a separate pass.
pub struct InlineFx {
    /// Multiplier applied to the layer opacity when compositing.
    pub opacity_mul: f32,
}

impl Default for InlineFx {
    fn default() -> Self {
        Self { opacity_mul: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Filter work that needs a full-surface pass, in expression order.
pub enum PassFx {
    /// Separable Gaussian blur.
    Blur {
        /// Kernel radius in pixels.
        radius_px: u32,
        /// Standard deviation in pixels.
        sigma: f32,
    },
    /// Per-pixel color transform.
    Color(ColorMatrix),
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Normalized filter pipeline ready for execution.
pub struct FxPipeline {
    /// Folded inline parameters.
    pub inline: InlineFx,
    /// Ordered surface passes.
    pub passes: Vec<PassFx>,
}

impl FxPipeline {
    /// Whether applying this pipeline leaves pixels unchanged.
    pub fn is_identity(&self) -> bool {
        self.inline.opacity_mul == 1.0 && self.passes.is_empty()
    }
}

/// Parse a filter expression such as `blur(4px) grayscale(50%)`.
///
/// `none` and the empty string parse to an empty list.
pub fn parse_filter(expr: &str) -> FrameshotResult<Vec<Filter>> {
    let src = expr.trim();
    if src.is_empty() || src.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    let mut rest = src;
    while !rest.is_empty() {
        let open = rest.find('(').ok_or_else(|| {
            FrameshotError::validation(format!("filter '{expr}': expected '(' after function name"))
        })?;
        let close = rest[open..].find(')').map(|i| open + i).ok_or_else(|| {
            FrameshotError::validation(format!("filter '{expr}': missing ')'"))
        })?;

        let name = rest[..open].trim().to_ascii_lowercase();
        let arg = rest[open + 1..close].trim();
        out.push(parse_function(expr, &name, arg)?);
        rest = rest[close + 1..].trim_start();
    }
    Ok(out)
}

fn parse_function(expr: &str, name: &str, arg: &str) -> FrameshotResult<Filter> {
    match name {
        "blur" => {
            let sigma = parse_length_px(expr, arg)?;
            if blur_radius_for_sigma(sigma) > MAX_BLUR_RADIUS_PX {
                return Err(FrameshotError::validation(format!(
                    "filter '{expr}': blur radius exceeds {MAX_BLUR_RADIUS_PX}px"
                )));
            }
            Ok(Filter::Blur { sigma })
        }
        "grayscale" => Ok(Filter::Grayscale(parse_amount(expr, arg)?.min(1.0))),
        "sepia" => Ok(Filter::Sepia(parse_amount(expr, arg)?.min(1.0))),
        "invert" => Ok(Filter::Invert(parse_amount(expr, arg)?.min(1.0))),
        "opacity" => Ok(Filter::Opacity(parse_amount(expr, arg)?.min(1.0))),
        "saturate" => Ok(Filter::Saturate(parse_amount(expr, arg)?)),
        "brightness" => Ok(Filter::Brightness(parse_amount(expr, arg)?)),
        "contrast" => Ok(Filter::Contrast(parse_amount(expr, arg)?)),
        "" => Err(FrameshotError::validation(format!(
            "filter '{expr}': missing function name"
        ))),
        other => Err(FrameshotError::validation(format!(
            "filter '{expr}': unknown function '{other}'"
        ))),
    }
}

fn parse_number(expr: &str, s: &str) -> FrameshotResult<f32> {
    let v: f32 = s.trim().parse().map_err(|_| {
        FrameshotError::validation(format!("filter '{expr}': '{s}' is not a number"))
    })?;
    if !v.is_finite() || v < 0.0 {
        return Err(FrameshotError::validation(format!(
            "filter '{expr}': '{s}' must be finite and >= 0"
        )));
    }
    Ok(v)
}

fn parse_amount(expr: &str, arg: &str) -> FrameshotResult<f32> {
    if arg.is_empty() {
        return Ok(1.0);
    }
    match arg.strip_suffix('%') {
        Some(pct) => Ok(parse_number(expr, pct)? / 100.0),
        None => parse_number(expr, arg),
    }
}

fn parse_length_px(expr: &str, arg: &str) -> FrameshotResult<f32> {
    if arg.is_empty() {
        return Ok(0.0);
    }
    match arg.strip_suffix("px") {
        Some(n) => parse_number(expr, n),
        None => {
            let v = parse_number(expr, arg)?;
            if v != 0.0 {
                return Err(FrameshotError::validation(format!(
                    "filter '{expr}': blur length '{arg}' needs a px unit"
                )));
            }
            Ok(0.0)
        }
    }
}

/// Kernel radius covering three standard deviations.
pub fn blur_radius_for_sigma(sigma: f32) -> u32 {
    if sigma <= 0.0 {
        return 0;
    }
    (sigma * 3.0).ceil() as u32
}

/// Color transform for a color filter, or `None` for filters that are not color matrices.
pub fn color_matrix_for(filter: &Filter) -> Option<ColorMatrix> {
    match *filter {
        Filter::Grayscale(a) => {
            let k = 1.0 - a;
            Some(ColorMatrix::channel_mix([
                [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
                [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
                [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
            ]))
        }
        Filter::Sepia(a) => {
            let k = 1.0 - a;
            Some(ColorMatrix::channel_mix([
                [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
                [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
                [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
            ]))
        }
        Filter::Saturate(s) => Some(ColorMatrix::channel_mix([
            [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
            [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
        ])),
        Filter::Invert(a) => Some(ColorMatrix::linear(1.0 - 2.0 * a, a)),
        Filter::Brightness(b) => Some(ColorMatrix::linear(b, 0.0)),
        Filter::Contrast(c) => Some(ColorMatrix::linear(c, 0.5 - 0.5 * c)),
        Filter::Blur { .. } | Filter::Opacity(_) => None,
    }
}

fn is_noop(filter: &Filter) -> bool {
    match *filter {
        Filter::Blur { sigma } => blur_radius_for_sigma(sigma) == 0,
        Filter::Grayscale(a) | Filter::Sepia(a) | Filter::Invert(a) => a == 0.0,
        Filter::Saturate(v) | Filter::Brightness(v) | Filter::Contrast(v) | Filter::Opacity(v) => {
            v == 1.0
        }
    }
}

/// Fold opacity into the inline stage, drop no-ops and keep the remaining passes in order.
pub fn normalize_filters(filters: &[Filter]) -> FxPipeline {
    let mut inline = InlineFx::default();
    let mut passes = Vec::<PassFx>::new();

    for f in filters.iter().filter(|f| !is_noop(f)) {
        match *f {
            Filter::Opacity(v) => inline.opacity_mul *= v,
            Filter::Blur { sigma } => passes.push(PassFx::Blur {
                radius_px: blur_radius_for_sigma(sigma),
                sigma,
            }),
            _ => {
                if let Some(m) = color_matrix_for(f) {
                    passes.push(PassFx::Color(m));
                }
            }
        }
    }

    if !inline.opacity_mul.is_finite() || inline.opacity_mul < 0.0 {
        inline.opacity_mul = 0.0;
    }

    FxPipeline { inline, passes }
}

/// Parse and normalize in one step.
pub fn compile_filter(expr: &str) -> FrameshotResult<FxPipeline> {
    Ok(normalize_filters(&parse_filter(expr)?))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
