use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CoreError;

pub const MIN_SCALE: f64 = 0.01;
pub const MAX_SCALE: f64 = 1.0;
pub const DEFAULT_SCALE: f64 = 1.0;
pub const DEFAULT_THRESHOLD: u8 = 0;
pub const MAX_MOVEMENT_GATE: f64 = 100.0;
pub const DEFAULT_MOVEMENT_GATE: f64 = 0.0;

/// Sanitized comparison settings.
///
/// Fields are private so that every value has passed through the policy
/// functions below; construct with [`CompareParams::new`] or
/// [`RawCompareParams::sanitize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompareParams {
    scale: f64,
    threshold: u8,
    is_normalized: bool,
}

impl Default for CompareParams {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            threshold: DEFAULT_THRESHOLD,
            is_normalized: false,
        }
    }
}

impl CompareParams {
    pub fn new(scale: f64, threshold: f64, is_normalized: bool) -> Self {
        Self {
            scale: sanitize_scale(Some(scale)),
            threshold: sanitize_threshold(Some(threshold)),
            is_normalized,
        }
    }

    /// Strict constructor: rejects what [`CompareParams::new`] would clamp.
    ///
    /// Scale must be finite and within `[0.01, 1.0]`, threshold a finite
    /// whole number within `[0, 255]`.
    pub fn try_new(scale: f64, threshold: f64, is_normalized: bool) -> Result<Self, CoreError> {
        if !scale.is_finite() || !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
            return Err(CoreError::InvalidParams {
                name: "scale",
                reason: format!("{scale} is not within {MIN_SCALE}-{MAX_SCALE}"),
            });
        }
        if !threshold.is_finite() || !(0.0..=u8::MAX as f64).contains(&threshold) {
            return Err(CoreError::InvalidParams {
                name: "threshold",
                reason: format!("{threshold} is not within 0-255"),
            });
        }
        if threshold.fract() != 0.0 {
            return Err(CoreError::InvalidParams {
                name: "threshold",
                reason: format!("{threshold} is not a whole number"),
            });
        }
        Ok(Self {
            scale,
            threshold: threshold as u8,
            is_normalized,
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn is_normalized(&self) -> bool {
        self.is_normalized
    }

    pub fn with_scale(self, scale: f64) -> Self {
        Self {
            scale: sanitize_scale(Some(scale)),
            ..self
        }
    }

    pub fn with_threshold(self, threshold: f64) -> Self {
        Self {
            threshold: sanitize_threshold(Some(threshold)),
            ..self
        }
    }

    pub fn with_normalized(self, is_normalized: bool) -> Self {
        Self {
            is_normalized,
            ..self
        }
    }
}

/// Unvalidated comparison settings as they arrive from a config file or CLI.
///
/// `None` means "use default". `rounding` is accepted as another name for
/// `threshold`.
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
pub struct RawCompareParams {
    /// Resampling factor applied to both images (0.01-1.0)
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    /// Minimum per-channel delta counted as a difference (0-255)
    #[arg(long, visible_alias = "rounding")]
    #[serde(default, alias = "rounding", skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,

    /// Binarize every nonzero delta to full intensity (any truthy value)
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = parse_flag)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<Flag>,
}

/// A loosely typed on/off value, read by truthiness.
///
/// Config files may say `normalized = true`, `1`, `0.0` or `"yes"`; the CLI
/// and environment hand over strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Flag {
    fn from(v: bool) -> Self {
        Flag::Bool(v)
    }
}

impl FromStr for Flag {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(b) = trimmed.parse::<bool>() {
            return Ok(Flag::Bool(b));
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(Flag::Int(i));
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Ok(Flag::Float(f));
        }
        Ok(Flag::Text(s.to_string()))
    }
}

fn parse_flag(s: &str) -> Result<Flag, Infallible> {
    s.parse()
}

impl RawCompareParams {
    /// Overlay non-None fields from `other` onto self.
    pub fn merge(&mut self, other: &RawCompareParams) {
        if other.scale.is_some() {
            self.scale = other.scale;
        }
        if other.threshold.is_some() {
            self.threshold = other.threshold;
        }
        if other.normalized.is_some() {
            self.normalized = other.normalized.clone();
        }
    }

    pub fn sanitize(&self) -> CompareParams {
        CompareParams {
            scale: sanitize_scale(self.scale),
            threshold: sanitize_threshold(self.threshold),
            is_normalized: sanitize_normalized(self.normalized.as_ref()),
        }
    }
}

/// Clamp a resampling factor into `[0.01, 1.0]`.
/// Absent or non-finite input falls back to 1.0.
pub fn sanitize_scale(raw: Option<f64>) -> f64 {
    let Some(v) = raw else {
        return DEFAULT_SCALE;
    };
    if !v.is_finite() {
        warn!(value = v, default = DEFAULT_SCALE, "scale is not a finite number, using default");
        return DEFAULT_SCALE;
    }
    let clamped = v.clamp(MIN_SCALE, MAX_SCALE);
    if clamped != v {
        warn!(value = v, clamped, "scale out of range");
    }
    clamped
}

/// Round and clamp a threshold into `[0, 255]`.
/// Absent or non-finite input falls back to 0.
pub fn sanitize_threshold(raw: Option<f64>) -> u8 {
    let Some(v) = raw else {
        return DEFAULT_THRESHOLD;
    };
    if !v.is_finite() {
        warn!(value = v, default = DEFAULT_THRESHOLD, "threshold is not a finite number, using default");
        return DEFAULT_THRESHOLD;
    }
    let clamped = v.round().clamp(0.0, u8::MAX as f64);
    if clamped != v {
        warn!(value = v, clamped, "threshold rounded or clamped");
    }
    clamped as u8
}

/// Coerce any input into a normalization flag by its truthiness.
pub fn sanitize_normalized<T: Truthy>(raw: Option<T>) -> bool {
    raw.is_some_and(|v| v.truthy())
}

/// Clamp a movement gate percentage into `[0, 100]`.
/// Absent or non-finite input falls back to 0.
pub fn sanitize_movement_gate(raw: Option<f64>) -> f64 {
    let Some(v) = raw else {
        return DEFAULT_MOVEMENT_GATE;
    };
    if !v.is_finite() {
        warn!(value = v, "movement gate is not a finite number, using default");
        return DEFAULT_MOVEMENT_GATE;
    }
    let clamped = v.clamp(0.0, MAX_MOVEMENT_GATE);
    if clamped != v {
        warn!(value = v, clamped, "movement gate out of range");
    }
    clamped
}

/// Loose boolean coercion: zero, NaN, empty and the usual "off" words are
/// false, everything else is true.
pub trait Truthy {
    fn truthy(&self) -> bool;
}

impl Truthy for bool {
    fn truthy(&self) -> bool {
        *self
    }
}

impl Truthy for i64 {
    fn truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for f64 {
    fn truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for str {
    fn truthy(&self) -> bool {
        let s = self.trim();
        !(s.is_empty()
            || s == "0"
            || s.eq_ignore_ascii_case("false")
            || s.eq_ignore_ascii_case("no")
            || s.eq_ignore_ascii_case("off"))
    }
}

impl Truthy for String {
    fn truthy(&self) -> bool {
        self.as_str().truthy()
    }
}

impl Truthy for Flag {
    fn truthy(&self) -> bool {
        match self {
            Flag::Bool(v) => v.truthy(),
            Flag::Int(v) => v.truthy(),
            Flag::Float(v) => v.truthy(),
            Flag::Text(v) => v.truthy(),
        }
    }
}

impl<T: Truthy + ?Sized> Truthy for &T {
    fn truthy(&self) -> bool {
        (**self).truthy()
    }
}
