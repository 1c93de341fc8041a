//! Axis model and the position mapping the engine ticks against.
//!
//! The range is finalized by the caller before ticking; the engine only ever
//! reads it. Positions are expressed as fractions in `[0, 1]` along the axis.

use serde::Serialize;

use crate::error::{TickError, TickResult};

const DEFAULT_LENGTH: f64 = 10.0;
const DEFAULT_SEP_MAJOR: f64 = 2.0;
const DEFAULT_SEP_MINOR: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum AxisScale {
    Linear,
    Log { base: f64 },
}

/// One plotted dimension with a finalized numeric range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    min: f64,
    max: f64,
    scale: AxisScale,
    format: Option<String>,
    length: f64,
    tick_sep_major: f64,
    tick_sep_minor: f64,
    unit_multiplier: f64,
}

impl Axis {
    pub fn linear(min: f64, max: f64) -> TickResult<Self> {
        Self::new(min, max, AxisScale::Linear)
    }

    pub fn log(min: f64, max: f64, base: f64) -> TickResult<Self> {
        if !base.is_finite() || base <= 1.0 {
            return Err(TickError::InvalidAxis(format!(
                "log base must be finite and > 1, got {base}"
            )));
        }
        if min <= 0.0 || max <= 0.0 {
            return Err(TickError::InvalidAxis(
                "log axis range must be strictly positive".to_owned(),
            ));
        }
        Self::new(min, max, AxisScale::Log { base })
    }

    fn new(min: f64, max: f64, scale: AxisScale) -> TickResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(TickError::InvalidAxis("axis range must be finite".to_owned()));
        }
        if min == max {
            return Err(TickError::InvalidAxis(format!(
                "axis range is degenerate: min == max == {min}"
            )));
        }

        Ok(Self {
            min: min.min(max),
            max: min.max(max),
            scale,
            format: None,
            length: DEFAULT_LENGTH,
            tick_sep_major: DEFAULT_SEP_MAJOR,
            tick_sep_minor: DEFAULT_SEP_MINOR,
            unit_multiplier: 1.0,
        })
    }

    /// Sets the physical axis length and the minimum separations between
    /// major and minor ticks, all in the same physical units.
    pub fn with_geometry(
        mut self,
        length: f64,
        tick_sep_major: f64,
        tick_sep_minor: f64,
    ) -> TickResult<Self> {
        if !length.is_finite() || length <= 0.0 {
            return Err(TickError::InvalidAxis(format!(
                "axis length must be finite and > 0, got {length}"
            )));
        }
        if !tick_sep_major.is_finite()
            || !tick_sep_minor.is_finite()
            || tick_sep_major <= 0.0
            || tick_sep_minor <= 0.0
        {
            return Err(TickError::InvalidAxis(
                "tick separations must be finite and > 0".to_owned(),
            ));
        }

        self.length = length;
        self.tick_sep_major = tick_sep_major;
        self.tick_sep_minor = tick_sep_minor.min(tick_sep_major);
        Ok(self)
    }

    /// Attaches a user-supplied label-format expression.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Scalar applied to raw axis values before they are displayed.
    pub fn with_unit_multiplier(mut self, unit_multiplier: f64) -> TickResult<Self> {
        if !unit_multiplier.is_finite() || unit_multiplier == 0.0 {
            return Err(TickError::InvalidAxis(format!(
                "unit multiplier must be finite and non-zero, got {unit_multiplier}"
            )));
        }
        self.unit_multiplier = unit_multiplier;
        Ok(self)
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    #[must_use]
    pub fn scale(&self) -> AxisScale {
        self.scale
    }

    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[must_use]
    pub fn tick_sep_major(&self) -> f64 {
        self.tick_sep_major
    }

    #[must_use]
    pub fn tick_sep_minor(&self) -> f64 {
        self.tick_sep_minor
    }

    #[must_use]
    pub fn unit_multiplier(&self) -> f64 {
        self.unit_multiplier
    }

    /// Inverse position map: the axis value at a fraction in `[0, 1]`.
    #[must_use]
    pub fn value_at_fraction(&self, fraction: f64) -> f64 {
        match self.scale {
            AxisScale::Linear => self.min + fraction * (self.max - self.min),
            AxisScale::Log { .. } => self.min * (self.max / self.min).powf(fraction),
        }
    }

    /// Position map: the fraction in `[0, 1]` at which `value` sits.
    #[must_use]
    pub fn fraction_of_value(&self, value: f64) -> f64 {
        match self.scale {
            AxisScale::Linear => (value - self.min) / (self.max - self.min),
            AxisScale::Log { .. } => {
                if value <= 0.0 {
                    return f64::NAN;
                }
                (value / self.min).ln() / (self.max / self.min).ln()
            }
        }
    }
}

/// One drawn tick: an axis fraction plus its label (empty for minor ticks).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickEntry {
    pub fraction: f64,
    pub label: String,
}

/// The engine's output: parallel major and minor tick lists.
///
/// Major fractions are strictly increasing and lie in `[0, 1]`; the same
/// holds for minors, and no minor coincides with a major.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickSet {
    pub major: Vec<TickEntry>,
    pub minor: Vec<TickEntry>,
}
