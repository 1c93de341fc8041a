//! Position refinement and label rendering.
//!
//! The selector works on half-sample position estimates; this pass narrows
//! every chosen tick to its exact axis fraction by bisecting the sample
//! interval that brackets it, then renders major-tick labels through the
//! evaluator (custom formats) or the built-in numeric formatter (bare axis
//! values). Identity-argument ticks carry an exact target value, so their
//! position comes straight from the axis position map.

use tracing::warn;

use crate::axis::{Axis, TickEntry, TickSet};
use crate::engine::TickEngineConfig;
use crate::engine::candidates::{CandidateTick, Edge, SchemeTag};
use crate::engine::sampler::{ArgSpec, ArgumentProbe, SampleGrid, SampledArgument};
use crate::engine::selector::SelectedScheme;
use crate::error::{TickError, TickResult};
use crate::eval::Evaluator;

/// Consecutive unevaluable midpoints tolerated before a bracket is abandoned.
const MAX_BAD_EVALUATIONS: usize = 8;
/// Refined positions closer than this collapse to one tick.
const POSITION_EPS: f64 = 1e-9;

pub(crate) fn refine_scheme(
    axis: &Axis,
    probe: &ArgumentProbe<'_>,
    grid: &SampleGrid<'_>,
    candidates: &[CandidateTick],
    scheme: &SelectedScheme,
    evaluator: &dyn Evaluator,
    config: &TickEngineConfig,
) -> TickResult<TickSet> {
    let mut major = Vec::with_capacity(scheme.majors.len());
    for &id in &scheme.majors {
        let candidate = &candidates[id];
        let arg = &grid.args[candidate.arg_index];
        let fraction = refined_fraction(axis, probe, grid, arg, candidate, config);
        let label = major_label(axis, grid, arg, candidate, fraction, evaluator, config)?;
        major.push(TickEntry { fraction, label });
    }

    let mut minor = Vec::with_capacity(scheme.minors.len());
    for &id in &scheme.minors {
        let candidate = &candidates[id];
        let arg = &grid.args[candidate.arg_index];
        let fraction = refined_fraction(axis, probe, grid, arg, candidate, config);
        minor.push(TickEntry {
            fraction,
            label: String::new(),
        });
    }

    finalize(major, minor)
}

/// Sorts, deduplicates and range-checks both lists; a scheme that refines
/// down to no major ticks is not viable.
fn finalize(mut major: Vec<TickEntry>, mut minor: Vec<TickEntry>) -> TickResult<TickSet> {
    major.retain(|tick| (0.0..=1.0).contains(&tick.fraction));
    major.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
    major.dedup_by(|current, previous| (current.fraction - previous.fraction).abs() <= POSITION_EPS);
    if major.is_empty() {
        return Err(TickError::NoViableScheme);
    }

    minor.retain(|tick| {
        (0.0..=1.0).contains(&tick.fraction)
            && !major
                .iter()
                .any(|m| (m.fraction - tick.fraction).abs() <= POSITION_EPS)
    });
    minor.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
    minor.dedup_by(|current, previous| (current.fraction - previous.fraction).abs() <= POSITION_EPS);

    Ok(TickSet { major, minor })
}

fn refined_fraction(
    axis: &Axis,
    probe: &ArgumentProbe<'_>,
    grid: &SampleGrid<'_>,
    arg: &SampledArgument<'_>,
    candidate: &CandidateTick,
    config: &TickEngineConfig,
) -> f64 {
    // Identity targets are exact axis values; invert the position map
    // instead of searching.
    if matches!(arg.spec, ArgSpec::Identity) && candidate.target.is_finite() {
        let value = if arg.log_space {
            grid.base.powf(candidate.target)
        } else {
            candidate.target
        };
        let fraction = axis.fraction_of_value(value);
        if fraction.is_finite() {
            return fraction.clamp(0.0, 1.0);
        }
    }

    match candidate.edge {
        Edge::Start => return 0.0,
        Edge::End => return 1.0,
        Edge::None => {}
    }

    let denominator = (grid.n_samples - 1) as f64;
    let lo = (candidate.interval - 1) as f64 / denominator;
    let hi = candidate.interval as f64 / denominator;

    match &arg.series {
        crate::engine::sampler::SampleSeries::Numeric(values) => {
            bisect_numeric(probe, arg, candidate, values, lo, hi, config)
        }
        crate::engine::sampler::SampleSeries::Text(values) => {
            bisect_text(probe, arg, &values[candidate.interval], lo, hi, config)
        }
    }
}

/// Bisects for the earliest fraction at which the crossing condition holds.
/// Continuous arguments cross a numeric target with a known local slope;
/// discrete ones switch to the target value exactly.
fn bisect_numeric(
    probe: &ArgumentProbe<'_>,
    arg: &SampledArgument<'_>,
    candidate: &CandidateTick,
    values: &[f64],
    lo: f64,
    hi: f64,
    config: &TickEngineConfig,
) -> f64 {
    let target = candidate.target;
    let slope = values[candidate.interval] - values[candidate.interval - 1];
    let crossed = |value: f64| -> bool {
        if matches!(candidate.tag, SchemeTag::DiscreteChange) {
            value == target
        } else if slope >= 0.0 {
            value >= target
        } else {
            value <= target
        }
    };

    let (mut lo, mut hi) = (lo, hi);
    let mut bad_evaluations = 0usize;
    for _ in 0..config.refine_iterations {
        if hi - lo <= f64::EPSILON * 4.0 {
            break;
        }
        let mid = 0.5 * (lo + hi);
        let value = probe.numeric_at(&arg.spec, mid);
        if value.is_nan() {
            bad_evaluations += 1;
            if bad_evaluations > MAX_BAD_EVALUATIONS {
                let fraction = 0.5 * (lo + hi);
                let failure = TickError::ConvergenceFailure { fraction };
                warn!("{failure}");
                return fraction;
            }
            lo = mid;
            continue;
        }
        bad_evaluations = 0;
        if crossed(value) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

fn bisect_text(
    probe: &ArgumentProbe<'_>,
    arg: &SampledArgument<'_>,
    new_value: &str,
    lo: f64,
    hi: f64,
    config: &TickEngineConfig,
) -> f64 {
    let (mut lo, mut hi) = (lo, hi);
    for _ in 0..config.refine_iterations {
        if hi - lo <= f64::EPSILON * 4.0 {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if probe.text_at(&arg.spec, mid) == new_value {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    hi
}

/// Renders one major-tick label.
///
/// Custom formats go through the evaluator at the tick's axis value; for
/// discrete arguments the bracketing sample on the far side of the change is
/// used, since the refined fraction sits exactly on the boundary. Bare axes
/// format the exact target value, so `10^3` never prints as `999.9996`.
fn major_label(
    axis: &Axis,
    grid: &SampleGrid<'_>,
    arg: &SampledArgument<'_>,
    candidate: &CandidateTick,
    fraction: f64,
    evaluator: &dyn Evaluator,
    config: &TickEngineConfig,
) -> TickResult<String> {
    if let Some(format) = axis.format() {
        let label_fraction = if arg.continuous {
            fraction
        } else {
            candidate.interval as f64 / (grid.n_samples - 1) as f64
        };
        let value = axis.value_at_fraction(label_fraction);
        return Ok(evaluator.render_label(format, value, axis.unit_multiplier())?);
    }

    let value = if arg.log_space {
        grid.base.powf(candidate.target)
    } else {
        candidate.target
    };
    Ok(config
        .numeric_format
        .format(value * axis.unit_multiplier(), grid.base))
}

#[cfg(test)]
mod tests {
    use super::finalize;
    use crate::axis::TickEntry;
    use crate::error::TickError;

    fn tick(fraction: f64) -> TickEntry {
        TickEntry {
            fraction,
            label: String::new(),
        }
    }

    #[test]
    fn finalize_orders_and_deduplicates() {
        let set = finalize(
            vec![tick(0.8), tick(0.2), tick(0.2 + 1e-12)],
            vec![tick(0.5), tick(0.8), tick(1.5)],
        )
        .expect("majors survive");

        let majors: Vec<f64> = set.major.iter().map(|t| t.fraction).collect();
        assert_eq!(majors, vec![0.2, 0.8]);
        // The minor on a major and the out-of-range minor are both gone.
        let minors: Vec<f64> = set.minor.iter().map(|t| t.fraction).collect();
        assert_eq!(minors, vec![0.5]);
    }

    #[test]
    fn finalize_rejects_empty_major_lists() {
        let result = finalize(vec![tick(-0.5)], Vec::new());
        assert!(matches!(result, Err(TickError::NoViableScheme)));
    }
}
