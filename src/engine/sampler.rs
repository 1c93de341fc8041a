//! Argument classifier and sampler.
//!
//! Every substitution argument is evaluated at N evenly spaced fractions
//! along the axis. The sampled series decides whether the argument is
//! numeric or textual, continuous or discrete, and records the statistics
//! (value throw, factor lists, change count) the candidate generator and
//! scheme selector work from. Evaluator failures poison single samples,
//! never the pass.

use smallvec::SmallVec;

use crate::axis::{Axis, AxisScale};
use crate::error::{TickError, TickResult};
use crate::eval::{EvalValue, Evaluator};
use crate::engine::scratch::ScratchBudget;
use crate::engine::TickEngineConfig;

/// Factorisation above this spread is pointless: divide-base schemes cover
/// wide ranges and trial division would dominate the runtime.
const FACTORISE_LIMIT: i64 = 1_000_000;
const MAX_THROW_FACTORS: usize = 32;
const MAX_SUBTICK_DIVISORS: usize = 16;

/// What to evaluate for one substitution argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ArgSpec<'a> {
    /// The bare axis variable, used when the axis has no custom format.
    /// Sampled in log space on logarithmic axes so decade structure shows
    /// up as unit steps.
    Identity,
    /// One expression slice of the decomposed label format.
    Custom { index: usize, expr: &'a str },
}

/// Evaluates an argument at an arbitrary axis fraction.
///
/// Shared by the sampler and the refiner so both see identical values.
pub(crate) struct ArgumentProbe<'a> {
    axis: &'a Axis,
    evaluator: &'a dyn Evaluator,
    log_base: Option<f64>,
}

impl<'a> ArgumentProbe<'a> {
    pub(crate) fn new(axis: &'a Axis, evaluator: &'a dyn Evaluator) -> Self {
        let log_base = match axis.scale() {
            AxisScale::Log { base } => Some(base),
            AxisScale::Linear => None,
        };
        Self {
            axis,
            evaluator,
            log_base,
        }
    }

    pub(crate) fn numeric_at(&self, spec: &ArgSpec<'_>, fraction: f64) -> f64 {
        let value = self.axis.value_at_fraction(fraction);
        match spec {
            ArgSpec::Identity => match self.log_base {
                Some(base) => value.ln() / base.ln(),
                None => value,
            },
            ArgSpec::Custom { index, expr } => {
                match self
                    .evaluator
                    .evaluate(expr, *index, value, self.axis.unit_multiplier())
                {
                    Ok(EvalValue::Number(number)) => number,
                    Ok(EvalValue::Text(_)) | Err(_) => f64::NAN,
                }
            }
        }
    }

    pub(crate) fn text_at(&self, spec: &ArgSpec<'_>, fraction: f64) -> String {
        let ArgSpec::Custom { index, expr } = spec else {
            return String::new();
        };
        let value = self.axis.value_at_fraction(fraction);
        match self
            .evaluator
            .evaluate(expr, *index, value, self.axis.unit_multiplier())
        {
            Ok(EvalValue::Text(text)) => text,
            Ok(EvalValue::Number(_)) | Err(_) => String::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) enum SampleSeries {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

#[derive(Debug)]
pub(crate) struct SampledArgument<'a> {
    pub spec: ArgSpec<'a>,
    pub series: SampleSeries,
    pub changes: usize,
    pub continuous: bool,
    pub vetoed: bool,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    /// `ceil(max - min)` of the sampled values; zero when unknown.
    pub throw: f64,
    pub throw_factors: SmallVec<[i64; 16]>,
    /// Identity argument of a logarithmic axis: values are exponents, and
    /// only whole-exponent steps are meaningful.
    pub log_space: bool,
}

impl SampledArgument<'_> {
    pub(crate) fn numeric_samples(&self) -> Option<&[f64]> {
        match &self.series {
            SampleSeries::Numeric(values) => Some(values),
            SampleSeries::Text(_) => None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct SampleGrid<'a> {
    pub n_samples: usize,
    pub args: Vec<SampledArgument<'a>>,
    /// Numbering base of the axis (10 unless the axis is logarithmic with
    /// another base).
    pub base: f64,
    /// Small divisors of base^2 usable as sub-tick partitions, capped by how
    /// many minor ticks physically fit; empty when base^2 is too large to
    /// factorise.
    pub base_subfactors: SmallVec<[i64; 16]>,
}

/// Fewer samples than this cannot resolve tick structure at all.
const MIN_SAMPLES: usize = 16;

pub(crate) fn sample_count(axis: &Axis, config: &TickEngineConfig) -> usize {
    let raw = config.duplication_factor as f64 * (2.0 + axis.length() / axis.tick_sep_major());
    // A configured ceiling below the floor is raised to it rather than
    // inverting the clamp bounds.
    (raw.round() as usize).clamp(MIN_SAMPLES, config.max_samples.max(MIN_SAMPLES))
}

pub(crate) fn sample_arguments<'a>(
    axis: &Axis,
    probe: &ArgumentProbe<'_>,
    specs: &[ArgSpec<'a>],
    config: &TickEngineConfig,
    scratch: &mut ScratchBudget,
) -> TickResult<SampleGrid<'a>> {
    let n = sample_count(axis, config);
    let base = match axis.scale() {
        AxisScale::Log { base } => base,
        AxisScale::Linear => 10.0,
    };

    let mut args = Vec::with_capacity(specs.len());
    for spec in specs {
        args.push(sample_one(axis, probe, *spec, n, config, scratch)?);
    }

    let minor_fit = (axis.length() / axis.tick_sep_minor()).floor().max(1.0) as i64;
    let base_squared = (base * base).round() as i64;
    // Same bound as throw factorisation: past it, trial division costs more
    // than any sub-tick partition could ever pay back.
    let base_subfactors = if base_squared <= FACTORISE_LIMIT {
        divisors_capped(
            base_squared,
            minor_fit.min(base_squared - 1),
            MAX_SUBTICK_DIVISORS,
            false,
        )
    } else {
        SmallVec::new()
    };

    Ok(SampleGrid {
        n_samples: n,
        args,
        base,
        base_subfactors,
    })
}

fn sample_one<'a>(
    axis: &Axis,
    probe: &ArgumentProbe<'_>,
    spec: ArgSpec<'a>,
    n: usize,
    config: &TickEngineConfig,
    scratch: &mut ScratchBudget,
) -> TickResult<SampledArgument<'a>> {
    let numeric = classify_kind(probe, &spec)?;
    let denominator = (n - 1) as f64;

    let mut changes = 0usize;
    let mut min_value: Option<f64> = None;
    let mut max_value: Option<f64> = None;

    let series = if numeric {
        scratch.charge_slots::<f64>(n)?;
        let mut values = Vec::with_capacity(n);
        for j in 0..n {
            let value = probe.numeric_at(&spec, j as f64 / denominator);
            // NaN never compares equal, so evaluator gaps register as
            // changes, which keeps noisy arguments classified as such.
            if j > 0 && value != values[j - 1] {
                changes += 1;
            }
            if value.is_finite() {
                min_value = Some(min_value.map_or(value, |m: f64| m.min(value)));
                max_value = Some(max_value.map_or(value, |m: f64| m.max(value)));
            }
            values.push(value);
        }
        SampleSeries::Numeric(values)
    } else {
        scratch.charge_slots::<[u8; 48]>(n)?;
        let mut values: Vec<String> = Vec::with_capacity(n);
        for j in 0..n {
            let value = probe.text_at(&spec, j as f64 / denominator);
            if j > 0 && value != values[j - 1] {
                changes += 1;
            }
            values.push(value);
        }
        SampleSeries::Text(values)
    };

    let continuous = changes > n / 4;
    let noisy_discrete = !continuous && changes > n / config.duplication_factor.max(1);
    // Continuous textual output cannot be ticked numerically at all.
    let vetoed = noisy_discrete || (continuous && !numeric);

    let throw = match (min_value, max_value) {
        (Some(min), Some(max)) if max > min => (max - min).ceil(),
        _ => 0.0,
    };
    let throw_factors = if numeric && throw >= 1.0 && throw <= FACTORISE_LIMIT as f64 {
        divisors_capped(throw as i64, i64::MAX, MAX_THROW_FACTORS, true)
    } else {
        SmallVec::new()
    };

    Ok(SampledArgument {
        spec,
        series,
        changes,
        continuous,
        vetoed,
        min_value,
        max_value,
        throw,
        throw_factors,
        log_space: matches!(spec, ArgSpec::Identity) && matches!(axis.scale(), AxisScale::Log { .. }),
    })
}

/// Decides numeric vs textual by probing a few fractions; an argument that
/// never evaluates anywhere means the format itself is unusable.
fn classify_kind(probe: &ArgumentProbe<'_>, spec: &ArgSpec<'_>) -> TickResult<bool> {
    let ArgSpec::Custom { index, expr } = spec else {
        return Ok(true);
    };

    for fraction in [0.5, 0.25, 0.75, 0.0, 1.0] {
        let value = probe.axis.value_at_fraction(fraction);
        match probe
            .evaluator
            .evaluate(expr, *index, value, probe.axis.unit_multiplier())
        {
            Ok(EvalValue::Number(_)) => return Ok(true),
            Ok(EvalValue::Text(_)) => return Ok(false),
            Err(_) => continue,
        }
    }
    Err(TickError::FormatExpression(format!(
        "argument {index} ('{expr}') never evaluates"
    )))
}

/// Ascending divisors of `n` no larger than `max_value`.
///
/// `include_trivial` keeps 1 and `n` themselves (wanted for throw factors,
/// not for sub-tick partitions). When more than `max_count` divisors exist,
/// an evenly strided subset keeping the extremes is returned so coarse and
/// fine schemes both survive.
pub(crate) fn divisors_capped(
    n: i64,
    max_value: i64,
    max_count: usize,
    include_trivial: bool,
) -> SmallVec<[i64; 16]> {
    let mut divisors: SmallVec<[i64; 16]> = SmallVec::new();
    if n < 1 {
        return divisors;
    }

    let mut low: SmallVec<[i64; 16]> = SmallVec::new();
    let mut high: SmallVec<[i64; 16]> = SmallVec::new();
    let mut d = 1i64;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            low.push(d);
            if d != n / d {
                high.push(n / d);
            }
        }
        d += 1;
    }
    for value in low.into_iter().chain(high.into_iter().rev()) {
        let trivial = value == 1 || value == n;
        if trivial && !include_trivial {
            continue;
        }
        if value <= max_value {
            divisors.push(value);
        }
    }
    divisors.sort_unstable();

    if divisors.len() > max_count && max_count >= 2 {
        let last = divisors.len() - 1;
        let mut thinned: SmallVec<[i64; 16]> = SmallVec::new();
        for k in 0..max_count {
            let position = (k as f64 / (max_count - 1) as f64 * last as f64).round() as usize;
            let value = divisors[position.min(last)];
            if thinned.last() != Some(&value) {
                thinned.push(value);
            }
        }
        return thinned;
    }
    divisors
}

#[cfg(test)]
mod tests {
    use super::{divisors_capped, sample_count};
    use crate::axis::Axis;
    use crate::engine::TickEngineConfig;

    #[test]
    fn sample_ceiling_below_the_floor_is_raised() {
        let axis = Axis::linear(0.0, 10.0).expect("valid axis");
        let config = TickEngineConfig {
            max_samples: 8,
            ..TickEngineConfig::default()
        };
        assert_eq!(sample_count(&axis, &config), 16);
    }

    #[test]
    fn divisors_of_ten_include_trivial_when_asked() {
        let with = divisors_capped(10, i64::MAX, 32, true);
        assert_eq!(with.as_slice(), &[1, 2, 5, 10]);

        let without = divisors_capped(10, i64::MAX, 32, false);
        assert_eq!(without.as_slice(), &[2, 5]);
    }

    #[test]
    fn divisors_respect_the_value_cap() {
        let capped = divisors_capped(100, 14, 32, false);
        assert_eq!(capped.as_slice(), &[2, 4, 5, 10]);
    }

    #[test]
    fn oversized_divisor_sets_keep_extremes() {
        let thinned = divisors_capped(720_720, i64::MAX, 8, true);
        assert!(thinned.len() <= 8);
        assert_eq!(thinned.first(), Some(&1));
        assert_eq!(thinned.last(), Some(&720_720));
    }
}
