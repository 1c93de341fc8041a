//! Uniform fallback ticks.
//!
//! When sampling, selection or refinement fails for any reason, the axis
//! still gets usable ticks: evenly spaced majors, as many as the physical
//! major separation allows, and no minors.

use tracing::warn;

use crate::axis::{Axis, TickEntry, TickSet};
use crate::engine::TickEngineConfig;
use crate::eval::Evaluator;

const MIN_FALLBACK_TICKS: usize = 3;
const MAX_FALLBACK_TICKS: usize = 100;

pub(crate) fn uniform_ticks(
    axis: &Axis,
    evaluator: &dyn Evaluator,
    config: &TickEngineConfig,
) -> TickSet {
    let count = (1.0 + axis.length() / axis.tick_sep_major()) as usize;
    let count = count.clamp(MIN_FALLBACK_TICKS, MAX_FALLBACK_TICKS);
    let denominator = (count - 1) as f64;

    let base = match axis.scale() {
        crate::axis::AxisScale::Log { base } => base,
        crate::axis::AxisScale::Linear => 10.0,
    };

    let major = (0..count)
        .map(|j| {
            let fraction = j as f64 / denominator;
            let value = axis.value_at_fraction(fraction);
            let label = match axis.format() {
                Some(format) => evaluator
                    .render_label(format, value, axis.unit_multiplier())
                    .unwrap_or_else(|error| {
                        warn!(fraction, %error, "fallback label render failed");
                        config.numeric_format.format(value * axis.unit_multiplier(), base)
                    }),
                None => config.numeric_format.format(value * axis.unit_multiplier(), base),
            };
            TickEntry { fraction, label }
        })
        .collect();

    TickSet {
        major,
        minor: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::uniform_ticks;
    use crate::axis::Axis;
    use crate::engine::TickEngineConfig;
    use crate::eval::NoEvaluator;

    #[test]
    fn tick_count_follows_the_major_separation() {
        let axis = Axis::linear(0.0, 1.0)
            .and_then(|a| a.with_geometry(10.0, 2.0, 0.7))
            .expect("valid axis");
        let set = uniform_ticks(&axis, &NoEvaluator, &TickEngineConfig::default());
        assert_eq!(set.major.len(), 6);
        assert!(set.minor.is_empty());
        assert_eq!(set.major.first().map(|t| t.fraction), Some(0.0));
        assert_eq!(set.major.last().map(|t| t.fraction), Some(1.0));
    }

    #[test]
    fn tiny_axes_still_get_three_ticks() {
        let axis = Axis::linear(0.0, 1.0)
            .and_then(|a| a.with_geometry(0.5, 2.0, 0.7))
            .expect("valid axis");
        let set = uniform_ticks(&axis, &NoEvaluator, &TickEngineConfig::default());
        assert_eq!(set.major.len(), 3);
    }
}
