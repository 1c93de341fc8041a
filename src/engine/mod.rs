//! The automatic ticking pipeline.
//!
//! `place_ticks` runs five stages over an axis: decompose the label format
//! into substitution arguments, sample each argument along the axis,
//! generate candidate tick positions, select the best major/minor scheme
//! under the physical spacing limits, and refine the winners to exact
//! fractions with rendered labels. Any stage failing routes the axis to the
//! uniform fallback, so the caller always receives a usable [`TickSet`].

pub(crate) mod candidates;
pub(crate) mod fallback;
pub(crate) mod format_args;
pub(crate) mod refine;
pub(crate) mod sampler;
pub(crate) mod scratch;
pub(crate) mod selector;

use tracing::{debug, warn};

use crate::axis::{Axis, TickSet};
use crate::error::{TickError, TickResult};
use crate::eval::{Evaluator, NoEvaluator};
use crate::format::NumericFormat;
use candidates::CandidateTick;
use sampler::ArgSpec;

/// Tuning knobs of the ticking pass.
///
/// The defaults match a vector-graphics page: lengths and separations in
/// centimetres, sampling dense enough that no tick-worthy feature falls
/// between two samples.
#[derive(Debug, Clone)]
pub struct TickEngineConfig {
    /// Sampling density multiplier; an argument repeating values more often
    /// than one change per this many samples is too noisy to tick.
    pub duplication_factor: usize,
    /// Hard ceiling on samples per argument; ceilings below the 16-sample
    /// floor are raised to it.
    pub max_samples: usize,
    /// Hard ceiling on generated tick candidates.
    pub max_candidates: usize,
    /// Hard ceiling on accepted ticks, majors and minors combined.
    pub max_ticks: usize,
    /// Bisection iteration limit per tick during refinement.
    pub refine_iterations: usize,
    /// Formatter for bare numeric labels.
    pub numeric_format: NumericFormat,
    /// Overrides the computed scratch budget when set.
    pub scratch_limit_bytes: Option<usize>,
}

impl Default for TickEngineConfig {
    fn default() -> Self {
        Self {
            duplication_factor: 100,
            max_samples: 20_000,
            max_candidates: 4_096,
            max_ticks: 256,
            refine_iterations: 200,
            numeric_format: NumericFormat::default(),
            scratch_limit_bytes: None,
        }
    }
}

/// Places ticks on an axis without a custom label format, or with one the
/// host cannot evaluate.
#[must_use]
pub fn place_ticks(axis: &Axis) -> TickSet {
    place_ticks_with(axis, &NoEvaluator, &TickEngineConfig::default())
}

/// Places ticks using the host's expression evaluator.
///
/// Never fails: every internal error is logged and answered with evenly
/// spaced fallback ticks.
#[must_use]
pub fn place_ticks_with(
    axis: &Axis,
    evaluator: &dyn Evaluator,
    config: &TickEngineConfig,
) -> TickSet {
    match auto_ticks(axis, evaluator, config) {
        Ok(set) => set,
        Err(error) => {
            warn!(axis_range = ?axis.range(), %error, "automatic ticking failed; using uniform fallback");
            fallback::uniform_ticks(axis, evaluator, config)
        }
    }
}

fn auto_ticks(
    axis: &Axis,
    evaluator: &dyn Evaluator,
    config: &TickEngineConfig,
) -> TickResult<TickSet> {
    let specs: Vec<ArgSpec<'_>> = match axis.format() {
        Some(format) => format_args::decompose_format(format)?
            .into_iter()
            .enumerate()
            .map(|(index, expr)| ArgSpec::Custom { index, expr })
            .collect(),
        None => vec![ArgSpec::Identity],
    };

    let n_samples = sampler::sample_count(axis, config);
    let mut scratch = scratch::ScratchBudget::for_run(
        specs.len(),
        n_samples,
        4,
        config
            .max_candidates
            .saturating_mul(size_of::<CandidateTick>()),
        config.scratch_limit_bytes,
    );

    let probe = sampler::ArgumentProbe::new(axis, evaluator);
    let grid = sampler::sample_arguments(axis, &probe, &specs, config, &mut scratch)?;
    let candidates = candidates::generate_candidates(axis, &grid, config, &mut scratch)?;
    debug!(
        n_samples = grid.n_samples,
        n_args = grid.args.len(),
        n_candidates = candidates.len(),
        "sampling complete"
    );

    let scheme = selector::select_scheme(
        &grid,
        &candidates,
        axis.length(),
        axis.tick_sep_major(),
        axis.tick_sep_minor(),
        config,
    )
    .ok_or(TickError::NoViableScheme)?;

    refine::refine_scheme(axis, &probe, &grid, &candidates, &scheme, evaluator, config)
}
