//! Scheme selection.
//!
//! Takes the candidate pool and decides which family of candidates becomes
//! major ticks and which becomes minors. Arguments are tried in priority
//! order (cleanly discrete ones first, then continuous ones slowest-moving
//! first), and each argument's winning scheme folds into a shared accepted
//! set that every later argument must keep clear of. For a continuous
//! argument two strategies compete: equal divisions of the argument's
//! throw, and per-order divisions of the numbering base, each grown as
//! dense as the physical spacing limits allow. The winner is the scheme
//! with the most majors, then the most minors.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::engine::TickEngineConfig;
use crate::engine::candidates::{CandidateTick, SchemeTag};
use crate::engine::sampler::{SampleGrid, SampledArgument};

/// Spacing comparisons forgive rounding at the last ulp of a gap.
const SPACING_SLACK: f64 = 1.0 - 1e-6;

#[derive(Debug)]
pub(crate) struct SelectedScheme {
    /// Candidate indices in position order.
    pub majors: Vec<usize>,
    pub minors: Vec<usize>,
}

/// Ticks already claimed by higher-priority arguments.
#[derive(Debug, Default)]
struct AcceptedTicks {
    majors: Vec<usize>,
    minors: Vec<usize>,
}

impl AcceptedTicks {
    fn is_empty(&self) -> bool {
        self.majors.is_empty() && self.minors.is_empty()
    }

    fn len(&self) -> usize {
        self.majors.len() + self.minors.len()
    }
}

/// All candidates of one argument, bucketed by scheme.
#[derive(Debug, Default)]
struct ArgBuckets {
    discrete: Vec<usize>,
    zero: Vec<usize>,
    throw_divisions: BTreeMap<usize, Vec<usize>>,
    digits: BTreeMap<i32, Vec<usize>>,
    subfactors: BTreeMap<(i32, usize), Vec<usize>>,
    mantissas: Vec<usize>,
}

pub(crate) fn select_scheme(
    grid: &SampleGrid<'_>,
    candidates: &[CandidateTick],
    length: f64,
    sep_major: f64,
    sep_minor: f64,
    config: &TickEngineConfig,
) -> Option<SelectedScheme> {
    let check = SpacingCheck {
        candidates,
        n_samples: grid.n_samples,
        length,
        sep_major,
        sep_minor,
        max_ticks: config.max_ticks,
        coincide_eps: 1.0 / (grid.n_samples - 1) as f64,
    };
    let buckets = bucket_candidates(candidates, grid.args.len());

    // Each argument folds its best scheme into the shared accepted set, so
    // later arguments must keep their distance from earlier winners. An
    // argument with no workable scheme contributes nothing and blocks
    // nothing.
    let mut accepted = AcceptedTicks::default();
    for arg_index in argument_priority(&grid.args) {
        let arg = &grid.args[arg_index];
        let selected = if arg.continuous {
            select_continuous(
                &check,
                &accepted,
                arg,
                &buckets[arg_index],
                &grid.base_subfactors,
            )
        } else {
            check
                .try_majors(&accepted, buckets[arg_index].discrete.clone())
                .map(|majors| (majors, Vec::new()))
        };
        if let Some((majors, minors)) = selected {
            debug!(
                arg_index,
                majors = majors.len(),
                minors = minors.len(),
                "argument scheme accepted"
            );
            accepted.majors.extend(majors);
            accepted.minors.extend(minors);
        }
    }

    if accepted.majors.is_empty() {
        return None;
    }
    let by_position = |&a: &usize, &b: &usize| check.fraction(a).total_cmp(&check.fraction(b));
    accepted.majors.sort_by(by_position);
    accepted.minors.sort_by(by_position);
    Some(SelectedScheme {
        majors: accepted.majors,
        minors: accepted.minors,
    })
}

/// Discrete arguments first, fewest changes first; then continuous
/// arguments, slowest total drift first. Vetoed and constant arguments are
/// never offered.
fn argument_priority(args: &[SampledArgument<'_>]) -> Vec<usize> {
    let mut discrete: Vec<usize> = (0..args.len())
        .filter(|&j| !args[j].vetoed && !args[j].continuous && args[j].changes > 0)
        .collect();
    discrete.sort_by_key(|&j| args[j].changes);

    let mut continuous: Vec<usize> = (0..args.len())
        .filter(|&j| !args[j].vetoed && args[j].continuous)
        .collect();
    continuous.sort_by(|&a, &b| drift_score(&args[a]).total_cmp(&drift_score(&args[b])));

    discrete.extend(continuous);
    discrete
}

fn drift_score(arg: &SampledArgument<'_>) -> f64 {
    let Some(values) = arg.numeric_samples() else {
        return f64::MAX;
    };
    if arg.throw <= 0.0 {
        return f64::MAX;
    }
    let mut total = 0.0;
    for pair in values.windows(2) {
        if pair[0].is_finite() && pair[1].is_finite() {
            total += (pair[1] - pair[0]).abs();
        }
    }
    total / arg.throw
}

fn bucket_candidates(candidates: &[CandidateTick], n_args: usize) -> Vec<ArgBuckets> {
    let mut buckets: Vec<ArgBuckets> = (0..n_args).map(|_| ArgBuckets::default()).collect();
    for (id, candidate) in candidates.iter().enumerate() {
        let bucket = &mut buckets[candidate.arg_index];
        match candidate.tag {
            SchemeTag::DiscreteChange => bucket.discrete.push(id),
            SchemeTag::ThrowDivision { factor_index } => {
                bucket.throw_divisions.entry(factor_index).or_default().push(id);
            }
            SchemeTag::DigitBoundary { order } => {
                bucket.digits.entry(order).or_default().push(id);
            }
            SchemeTag::SubFactor { order, sub_index } => {
                bucket.subfactors.entry((order, sub_index)).or_default().push(id);
            }
            SchemeTag::ZeroCrossing { .. } => bucket.zero.push(id),
            SchemeTag::LogMantissa => bucket.mantissas.push(id),
        }
    }
    buckets
}

fn select_continuous(
    check: &SpacingCheck<'_>,
    accepted: &AcceptedTicks,
    arg: &SampledArgument<'_>,
    buckets: &ArgBuckets,
    subfactors: &[i64],
) -> Option<(Vec<usize>, Vec<usize>)> {
    let throw_scheme = divide_throw_trial(check, accepted, arg, buckets);
    let base_scheme = divide_base_trial(check, accepted, buckets, subfactors);

    let mut chosen = match (throw_scheme, base_scheme) {
        (Some(throw), Some(base)) => {
            // Ties go to the throw division: it aligns with the data range.
            if (base.0.len(), base.1.len()) > (throw.0.len(), throw.1.len()) {
                base
            } else {
                throw
            }
        }
        (Some(throw), None) => throw,
        (None, Some(base)) => base,
        (None, None) => return None,
    };

    // Logarithmic axes whose scheme produced no minors get one more chance:
    // mantissa boundaries within each division of the base.
    if arg.log_space && chosen.1.is_empty() && !buckets.mantissas.is_empty()
        && let Some(kept) = check.try_minors(accepted, &chosen.0, buckets.mantissas.clone())
        && !kept.is_empty()
    {
        chosen.1 = kept;
    }
    Some(chosen)
}

/// Equal divisions of the throw: finest factor that still satisfies major
/// spacing wins; minors come from the finest compatible multiple of it.
fn divide_throw_trial(
    check: &SpacingCheck<'_>,
    accepted: &AcceptedTicks,
    arg: &SampledArgument<'_>,
    buckets: &ArgBuckets,
) -> Option<(Vec<usize>, Vec<usize>)> {
    let factor_count = arg.throw_factors.len();
    for factor_index in (0..factor_count).rev() {
        let Some(ids) = buckets.throw_divisions.get(&factor_index) else {
            continue;
        };
        let trial: Vec<usize> = buckets.zero.iter().chain(ids.iter()).copied().collect();
        let Some(majors) = check.try_majors(accepted, trial) else {
            continue;
        };

        let factor = arg.throw_factors[factor_index];
        let mut minors = Vec::new();
        for finer_index in ((factor_index + 1)..factor_count).rev() {
            if arg.throw_factors[finer_index] % factor != 0 {
                continue;
            }
            let Some(minor_ids) = buckets.throw_divisions.get(&finer_index) else {
                continue;
            };
            if let Some(kept) = check.try_minors(accepted, &majors, minor_ids.clone())
                && !kept.is_empty()
            {
                minors = kept;
                break;
            }
        }
        return Some((majors, minors));
    }
    None
}

/// Divisions of the numbering base, order by order from the most
/// significant. Each order runs two sub-strategies and keeps the better;
/// descent to a less significant order continues only while it yields
/// strictly more ticks in total.
fn divide_base_trial(
    check: &SpacingCheck<'_>,
    accepted: &AcceptedTicks,
    buckets: &ArgBuckets,
    subfactors: &[i64],
) -> Option<(Vec<usize>, Vec<usize>)> {
    let orders: BTreeSet<i32> = buckets
        .digits
        .keys()
        .copied()
        .chain(buckets.subfactors.keys().map(|&(order, _)| order))
        .collect();

    let mut best: Option<(Vec<usize>, Vec<usize>)> = None;
    for &order in orders.iter().rev() {
        let incremental = order_trial_incremental(check, accepted, buckets, order, subfactors.len());
        let partition = order_trial_partition(check, accepted, buckets, order, subfactors);
        let trial = match (incremental, partition) {
            (Some(a), Some(b)) => {
                if (b.0.len(), b.1.len()) > (a.0.len(), a.1.len()) {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (a, b) => a.or(b),
        };

        match (&best, trial) {
            (None, Some(found)) => best = Some(found),
            (Some(current), Some(found)) => {
                if found.0.len() + found.1.len() > current.0.len() + current.1.len() {
                    best = Some(found);
                } else {
                    break;
                }
            }
            (Some(_), None) => break,
            (None, None) => {}
        }
    }
    best
}

/// Grows the major set group by group (zero, whole divisions of this order,
/// then sub-factor partitions fine to finer) until spacing fails; groups
/// past that point are offered as minors until those fail too.
fn order_trial_incremental(
    check: &SpacingCheck<'_>,
    accepted: &AcceptedTicks,
    buckets: &ArgBuckets,
    order: i32,
    subfactor_count: usize,
) -> Option<(Vec<usize>, Vec<usize>)> {
    let mut groups: Vec<&[usize]> = vec![&buckets.zero];
    if let Some(ids) = buckets.digits.get(&order) {
        groups.push(ids);
    }
    for sub_index in 0..subfactor_count {
        if let Some(ids) = buckets.subfactors.get(&(order, sub_index)) {
            groups.push(ids);
        }
    }

    let mut majors: Vec<usize> = Vec::new();
    let mut minors: Vec<usize> = Vec::new();
    let mut promoting = true;
    for ids in groups {
        if ids.is_empty() {
            continue;
        }
        if promoting {
            let trial: Vec<usize> = majors.iter().chain(ids.iter()).copied().collect();
            if let Some(kept) = check.try_majors(accepted, trial) {
                majors = kept;
                continue;
            }
            promoting = false;
        }
        if majors.is_empty() {
            return None;
        }
        let trial: Vec<usize> = minors.iter().chain(ids.iter()).copied().collect();
        match check.try_minors(accepted, &majors, trial) {
            Some(kept) => minors = kept,
            None => break,
        }
    }

    if majors.is_empty() { None } else { Some((majors, minors)) }
}

/// Whole partitions only: the finest sub-factor partition of this order
/// that passes major spacing becomes the majors, with minors from the
/// finest refinement of it (a partition whose count the major count
/// divides, so every major stays on a minor boundary).
fn order_trial_partition(
    check: &SpacingCheck<'_>,
    accepted: &AcceptedTicks,
    buckets: &ArgBuckets,
    order: i32,
    subfactors: &[i64],
) -> Option<(Vec<usize>, Vec<usize>)> {
    // Partitions finest first, ending with the bare whole-division group.
    let mut partitions: Vec<(i64, &[usize])> = Vec::new();
    for (sub_index, &subfactor) in subfactors.iter().enumerate().rev() {
        if let Some(ids) = buckets.subfactors.get(&(order, sub_index)) {
            partitions.push((subfactor, ids));
        }
    }
    if let Some(ids) = buckets.digits.get(&order) {
        partitions.push((1, ids));
    }

    for (position, &(subfactor, ids)) in partitions.iter().enumerate() {
        let trial: Vec<usize> = buckets.zero.iter().chain(ids.iter()).copied().collect();
        let Some(majors) = check.try_majors(accepted, trial) else {
            continue;
        };
        let mut minors = Vec::new();
        for &(finer, finer_ids) in &partitions[..position] {
            if finer % subfactor != 0 {
                continue;
            }
            if let Some(kept) = check.try_minors(accepted, &majors, finer_ids.to_vec())
                && !kept.is_empty()
            {
                minors = kept;
                break;
            }
        }
        return Some((majors, minors));
    }
    None
}

struct SpacingCheck<'a> {
    candidates: &'a [CandidateTick],
    n_samples: usize,
    length: f64,
    sep_major: f64,
    sep_minor: f64,
    max_ticks: usize,
    /// Candidates within one sample width of each other are one tick.
    coincide_eps: f64,
}

impl SpacingCheck<'_> {
    fn fraction(&self, id: usize) -> f64 {
        self.candidates[id].est_fraction(self.n_samples)
    }

    fn sorted_dedup(&self, ids: Vec<usize>) -> Vec<usize> {
        let mut list = ids;
        list.sort_by(|&a, &b| self.fraction(a).total_cmp(&self.fraction(b)));
        list.dedup_by(|current, previous| {
            (self.fraction(*current) - self.fraction(*previous)).abs() <= self.coincide_eps
        });
        list
    }

    fn coincides_with_accepted(&self, id: usize, accepted: &AcceptedTicks) -> bool {
        accepted
            .majors
            .iter()
            .chain(accepted.minors.iter())
            .any(|&other| (self.fraction(other) - self.fraction(id)).abs() <= self.coincide_eps)
    }

    /// Accepts a major trial when every adjacent major gap meets the major
    /// separation and no tick sits inside an accepted minor's separation.
    /// Coinciding trial members collapse to one; trial members landing on a
    /// tick an earlier argument already claimed are dropped as overlays.
    fn try_majors(&self, accepted: &AcceptedTicks, ids: Vec<usize>) -> Option<Vec<usize>> {
        let kept: Vec<usize> = self
            .sorted_dedup(ids)
            .into_iter()
            .filter(|&id| !self.coincides_with_accepted(id, accepted))
            .collect();
        if kept.is_empty() {
            // An all-overlay trial adds nothing but violates nothing.
            return if accepted.is_empty() { None } else { Some(kept) };
        }
        if accepted.len() + kept.len() > self.max_ticks {
            return None;
        }

        // Estimates are accurate to half a sample, so grant one sample of
        // grace: a gap exactly at the separation limit must not be rejected.
        let major_limit = self.sep_major / self.length * SPACING_SLACK - self.coincide_eps;
        let mut majors: Vec<f64> = accepted
            .majors
            .iter()
            .chain(kept.iter())
            .map(|&id| self.fraction(id))
            .collect();
        majors.sort_by(f64::total_cmp);
        for pair in majors.windows(2) {
            if pair[1] - pair[0] < major_limit {
                return None;
            }
        }

        if !accepted.minors.is_empty() {
            let minor_limit = self.sep_minor / self.length * SPACING_SLACK - self.coincide_eps;
            let mut all: Vec<f64> = accepted
                .minors
                .iter()
                .map(|&id| self.fraction(id))
                .collect();
            all.extend(majors);
            all.sort_by(f64::total_cmp);
            for pair in all.windows(2) {
                if pair[1] - pair[0] < minor_limit {
                    return None;
                }
            }
        }
        Some(kept)
    }

    /// Accepts a minor trial when the combined list meets the minor
    /// separation. Minors coinciding with a major or an accepted tick are
    /// dropped silently; only spacing violations reject the trial.
    fn try_minors(
        &self,
        accepted: &AcceptedTicks,
        majors: &[usize],
        ids: Vec<usize>,
    ) -> Option<Vec<usize>> {
        let minors: Vec<usize> = self
            .sorted_dedup(ids)
            .into_iter()
            .filter(|&id| {
                !self.coincides_with_accepted(id, accepted)
                    && !majors.iter().any(|&major| {
                        (self.fraction(major) - self.fraction(id)).abs() <= self.coincide_eps
                    })
            })
            .collect();

        if accepted.len() + majors.len() + minors.len() > self.max_ticks {
            return None;
        }
        let mut fractions: Vec<f64> = accepted
            .majors
            .iter()
            .chain(accepted.minors.iter())
            .chain(majors.iter())
            .chain(minors.iter())
            .map(|&id| self.fraction(id))
            .collect();
        fractions.sort_by(f64::total_cmp);
        let limit = self.sep_minor / self.length * SPACING_SLACK - self.coincide_eps;
        for pair in fractions.windows(2) {
            if pair[1] - pair[0] < limit {
                return None;
            }
        }
        Some(minors)
    }
}
