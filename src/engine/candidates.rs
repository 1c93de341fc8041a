//! Candidate tick generation.
//!
//! Walks the sampled grid and emits every semantically distinct position
//! where a tick could plausibly go: discrete value changes, equal divisions
//! of an argument's throw, leading-digit events per order of magnitude,
//! sub-factor partitions, forced zero crossings and on-boundary axis ends.
//! Nothing is chosen here; the selector decides what survives.

use tracing::warn;

use crate::axis::Axis;
use crate::error::{TickError, TickResult};
use crate::engine::sampler::{SampleGrid, SampleSeries, SampledArgument};
use crate::engine::scratch::ScratchBudget;
use crate::engine::TickEngineConfig;

/// At most this many orders of magnitude are scanned per argument.
const MAX_ORDER_SPAN: i32 = 12;
/// Steps finer than this many sample intervals change on almost every
/// boundary and can never satisfy spacing.
const MIN_STEP_INTERVALS: f64 = 4.0;
/// Bases past this get no mantissa minors: a run of base−2 ticks per decade
/// cannot fit any axis, and enumerating them scales with the base.
const MAX_MANTISSA_BASE: f64 = 64.0;
const EDGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum SchemeTag {
    /// A discrete argument changed value across this boundary.
    DiscreteChange,
    /// Boundary of a throw division; the index points into the argument's
    /// factor list.
    ThrowDivision { factor_index: usize },
    /// `floor(value / base^order)` changed: a new leading digit.
    DigitBoundary { order: i32 },
    /// `floor(value / (base^order / subfactor))` changed; the index points
    /// into the grid's base sub-factor list.
    SubFactor { order: i32, sub_index: usize },
    /// Forced candidate where a continuous argument crosses zero.
    ZeroCrossing { order: i32 },
    /// Mantissa boundary `m x base^k` of a logarithmic axis, offered to the
    /// selector as a minor-tick scheme.
    LogMantissa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edge {
    None,
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CandidateTick {
    pub arg_index: usize,
    pub tag: SchemeTag,
    /// Target value in argument space; NaN for textual arguments, whose
    /// target is the sample on the far side of the boundary.
    pub target: f64,
    /// Sample interval bracketing the crossing, in `[1, N-1]`.
    pub interval: usize,
    pub edge: Edge,
}

impl CandidateTick {
    /// Position estimate used for spacing checks before refinement.
    pub(crate) fn est_fraction(&self, n_samples: usize) -> f64 {
        let denominator = (n_samples - 1) as f64;
        match self.edge {
            Edge::Start => (self.interval - 1) as f64 / denominator,
            Edge::End => self.interval as f64 / denominator,
            Edge::None => (self.interval as f64 - 0.5) / denominator,
        }
    }
}

/// Fixed-capacity candidate store; overflow is recorded, not fatal.
struct CandidateBuffer {
    items: Vec<CandidateTick>,
    capacity: usize,
    generated: usize,
}

impl CandidateBuffer {
    fn push(&mut self, candidate: CandidateTick) {
        self.generated += 1;
        if self.items.len() < self.capacity {
            self.items.push(candidate);
        }
    }
}

pub(crate) fn generate_candidates(
    axis: &Axis,
    grid: &SampleGrid<'_>,
    config: &TickEngineConfig,
    scratch: &mut ScratchBudget,
) -> TickResult<Vec<CandidateTick>> {
    scratch.charge_slots::<CandidateTick>(config.max_candidates)?;
    let mut buffer = CandidateBuffer {
        items: Vec::with_capacity(config.max_candidates.min(1024)),
        capacity: config.max_candidates,
        generated: 0,
    };

    for (arg_index, arg) in grid.args.iter().enumerate() {
        if arg.vetoed {
            continue;
        }
        if arg.continuous {
            generate_continuous(arg_index, arg, grid, &mut buffer);
        } else {
            generate_discrete(arg_index, arg, &mut buffer);
        }
    }

    if buffer.generated > buffer.items.len() {
        // Earliest-generated candidates are kept; truncation is deterministic.
        let overflow = TickError::CandidateOverflow {
            kept: buffer.items.len(),
            generated: buffer.generated,
        };
        warn!(axis_range = ?axis.range(), "{overflow}");
    }

    Ok(buffer.items)
}

fn generate_discrete(arg_index: usize, arg: &SampledArgument<'_>, buffer: &mut CandidateBuffer) {
    match &arg.series {
        SampleSeries::Numeric(values) => {
            for j in 1..values.len() {
                if values[j] != values[j - 1] && values[j].is_finite() {
                    buffer.push(CandidateTick {
                        arg_index,
                        tag: SchemeTag::DiscreteChange,
                        target: values[j],
                        interval: j,
                        edge: Edge::None,
                    });
                }
            }
        }
        SampleSeries::Text(values) => {
            for j in 1..values.len() {
                if values[j] != values[j - 1] {
                    buffer.push(CandidateTick {
                        arg_index,
                        tag: SchemeTag::DiscreteChange,
                        target: f64::NAN,
                        interval: j,
                        edge: Edge::None,
                    });
                }
            }
        }
    }
}

fn generate_continuous(
    arg_index: usize,
    arg: &SampledArgument<'_>,
    grid: &SampleGrid<'_>,
    buffer: &mut CandidateBuffer,
) {
    let Some(values) = arg.numeric_samples() else {
        return;
    };
    let (Some(min), Some(max)) = (arg.min_value, arg.max_value) else {
        return;
    };
    if arg.throw <= 0.0 {
        return;
    }

    let base = grid.base;
    let span = max - min;
    let min_step = span * MIN_STEP_INTERVALS / grid.n_samples as f64;

    // (a) Equal divisions of the throw, anchored at an order-of-magnitude
    // rounded origin so divisions land on round absolute values.
    let anchor_unit = base.powf((arg.throw.ln() / base.ln()).ceil());
    let origin = (min / anchor_unit).floor() * anchor_unit;
    for (factor_index, factor) in arg.throw_factors.iter().enumerate() {
        let step = arg.throw / *factor as f64;
        if step < min_step || (arg.log_space && step.fract() != 0.0) {
            continue;
        }
        emit_floor_crossings(
            arg_index,
            values,
            origin,
            step,
            SchemeTag::ThrowDivision { factor_index },
            buffer,
        );
    }

    // (b) Leading-digit events and (c) sub-factor partitions per order of
    // magnitude, most significant first.
    let max_abs = min.abs().max(max.abs());
    if max_abs > 0.0 {
        let order_top = (max_abs.ln() / base.ln()).floor() as i32;
        let order_bottom =
            ((arg.throw.ln() / base.ln()).floor() as i32 - 1).max(order_top - MAX_ORDER_SPAN + 1);
        for order in (order_bottom..=order_top).rev() {
            let decade = base.powi(order);
            if decade >= min_step && !(arg.log_space && decade.fract() != 0.0) {
                emit_floor_crossings(
                    arg_index,
                    values,
                    0.0,
                    decade,
                    SchemeTag::DigitBoundary { order },
                    buffer,
                );
            }
            for (sub_index, subfactor) in grid.base_subfactors.iter().enumerate() {
                let step = decade / *subfactor as f64;
                if step < min_step || (arg.log_space && step.fract() != 0.0) {
                    continue;
                }
                emit_floor_crossings(
                    arg_index,
                    values,
                    0.0,
                    step,
                    SchemeTag::SubFactor { order, sub_index },
                    buffer,
                );
            }
        }

        // Zero must never be skipped when the range brackets it.
        emit_zero_crossing(arg_index, values, min, max, order_top, buffer);
    }

    if arg.log_space {
        emit_log_mantissas(arg_index, min, max, grid, buffer);
    }
}

/// Emits one candidate per sample interval where `floor((v - origin) / step)`
/// changes, plus forced candidates when an axis end sits exactly on a
/// division boundary.
fn emit_floor_crossings(
    arg_index: usize,
    values: &[f64],
    origin: f64,
    step: f64,
    tag: SchemeTag,
    buffer: &mut CandidateBuffer,
) {
    let n = values.len();
    let mut last_emitted: Option<(usize, f64)> = None;

    let start_boundary = on_boundary(values[0], origin, step);
    if let Some(target) = start_boundary {
        buffer.push(CandidateTick {
            arg_index,
            tag,
            target,
            interval: 1,
            edge: Edge::Start,
        });
    }

    for j in 1..n {
        let previous = values[j - 1];
        let current = values[j];
        if !previous.is_finite() || !current.is_finite() {
            continue;
        }
        let k_prev = ((previous - origin) / step).floor();
        let k_cur = ((current - origin) / step).floor();
        if k_prev == k_cur || !k_prev.is_finite() || !k_cur.is_finite() {
            continue;
        }
        // The boundary nearest the entry side, should sampling be coarse
        // enough to jump several divisions at once.
        let crossed = if k_cur > k_prev { k_prev + 1.0 } else { k_prev };
        let target = origin + step * crossed;
        buffer.push(CandidateTick {
            arg_index,
            tag,
            target,
            interval: j,
            edge: Edge::None,
        });
        last_emitted = Some((j, target));
    }

    if let Some(target) = on_boundary(values[n - 1], origin, step) {
        let already = matches!(
            last_emitted,
            Some((interval, emitted))
                if interval == n - 1 && (emitted - target).abs() <= step * EDGE_TOLERANCE
        );
        if !already && start_boundary.is_none_or(|start| (start - target).abs() > step * 0.5) {
            buffer.push(CandidateTick {
                arg_index,
                tag,
                target,
                interval: n - 1,
                edge: Edge::End,
            });
        }
    }
}

fn on_boundary(value: f64, origin: f64, step: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let ratio = (value - origin) / step;
    if (ratio - ratio.round()).abs() <= EDGE_TOLERANCE * ratio.abs().max(1.0) {
        Some(origin + step * ratio.round())
    } else {
        None
    }
}

fn emit_zero_crossing(
    arg_index: usize,
    values: &[f64],
    min: f64,
    max: f64,
    order_top: i32,
    buffer: &mut CandidateBuffer,
) {
    let tag = SchemeTag::ZeroCrossing { order: order_top };
    if values[0] == 0.0 {
        buffer.push(CandidateTick {
            arg_index,
            tag,
            target: 0.0,
            interval: 1,
            edge: Edge::Start,
        });
        return;
    }
    if min >= 0.0 || max <= 0.0 {
        return;
    }
    for j in 1..values.len() {
        let previous = values[j - 1];
        let current = values[j];
        if !previous.is_finite() || !current.is_finite() {
            continue;
        }
        if (previous < 0.0 && current >= 0.0) || (previous > 0.0 && current <= 0.0) {
            buffer.push(CandidateTick {
                arg_index,
                tag,
                target: 0.0,
                interval: j,
                edge: Edge::None,
            });
            return;
        }
    }
}

/// Mantissa boundaries `m x base^k` for the identity argument of a log axis;
/// values are exponents, so the boundary positions are exact.
fn emit_log_mantissas(
    arg_index: usize,
    exp_min: f64,
    exp_max: f64,
    grid: &SampleGrid<'_>,
    buffer: &mut CandidateBuffer,
) {
    let base = grid.base;
    if base > MAX_MANTISSA_BASE {
        return;
    }
    let mantissa_top = base.round() as i64;
    let denominator = (grid.n_samples - 1) as f64;
    for k in (exp_min.floor() as i64)..=(exp_max.floor() as i64) {
        for m in 2..mantissa_top {
            let exponent = (m as f64).ln() / base.ln() + k as f64;
            if exponent < exp_min - EDGE_TOLERANCE || exponent > exp_max + EDGE_TOLERANCE {
                continue;
            }
            let fraction = ((exponent - exp_min) / (exp_max - exp_min)).clamp(0.0, 1.0);
            let interval = ((fraction * denominator).ceil() as usize).clamp(1, grid.n_samples - 1);
            buffer.push(CandidateTick {
                arg_index,
                tag: SchemeTag::LogMantissa,
                target: exponent,
                interval,
                edge: Edge::None,
            });
        }
    }
}
