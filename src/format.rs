//! Built-in numeric tick labels.
//!
//! Used whenever the axis has no custom label format, and as the safety net
//! when a custom format fails to render. Values are rounded to a fixed
//! number of significant figures; magnitudes outside a configurable window
//! switch to a `mantissa×base^exponent` form, dropping the mantissa when it
//! rounds to one.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericFormat {
    pub significant_figures: u32,
    /// Smallest magnitude rendered as a plain decimal.
    pub plain_min_abs: f64,
    /// Magnitudes at or above this render in scientific form.
    pub plain_max_abs: f64,
}

impl Default for NumericFormat {
    fn default() -> Self {
        Self {
            significant_figures: 8,
            plain_min_abs: 1e-3,
            plain_max_abs: 1e5,
        }
    }
}

impl NumericFormat {
    /// Formats one tick value against the axis numbering base.
    #[must_use]
    pub fn format(&self, value: f64, base: f64) -> String {
        if !value.is_finite() {
            return format!("{value}");
        }

        let magnitude = value.abs();
        if magnitude < f64::MIN_POSITIVE * 100.0 {
            return "0".to_owned();
        }
        if magnitude >= self.plain_min_abs && magnitude < self.plain_max_abs {
            return self.significant(value);
        }

        let sign = if value < 0.0 { "-" } else { "" };
        let mut exponent = (magnitude.ln() / base.ln()).floor();
        let mut mantissa = magnitude / base.powf(exponent);
        // Guard against log slipping just below an exact power of the base.
        if mantissa >= base - 1e-9 {
            exponent += 1.0;
            mantissa = 1.0;
        }

        let base_text = display_base(base);
        let exponent_text = self.significant(exponent);
        let unit_margin = 10f64.powi(1 - self.significant_figures as i32).max(1e-15);
        if (mantissa - 1.0).abs() <= unit_margin {
            format!("{sign}{base_text}^{exponent_text}")
        } else {
            let mantissa_text = self.significant(mantissa);
            format!("{sign}{mantissa_text}\u{d7}{base_text}^{exponent_text}")
        }
    }

    /// Rounds to the configured number of significant figures and trims
    /// trailing zeros.
    fn significant(&self, value: f64) -> String {
        if value == 0.0 {
            return "0".to_owned();
        }

        let magnitude = value.abs().log10().floor() as i32;
        let decimals = (self.significant_figures as i32 - 1 - magnitude).clamp(0, 17) as usize;
        let text = format!("{value:.decimals$}");
        trim_trailing_zeros(text)
    }
}

fn display_base(base: f64) -> String {
    if base.fract() == 0.0 && base.abs() < 1e15 {
        format!("{}", base as i64)
    } else {
        format!("{base}")
    }
}

fn trim_trailing_zeros(mut text: String) -> String {
    if !text.contains('.') {
        return text;
    }
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" { "0".to_owned() } else { text }
}
