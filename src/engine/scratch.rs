//! Call-scoped scratch accounting.
//!
//! The reference implementation parked all intermediate state in a nested
//! memory-context stack and tore the whole context down on exit. Here every
//! sub-step charges its allocations against one budget owned by the ticking
//! call; exceeding it is a recoverable error that routes the axis to the
//! uniform fallback. Actual storage is ordinary owned `Vec`s, released on
//! return along every path.

use crate::error::{TickError, TickResult};

/// Conservative per-sample footprint: one numeric slot plus string overhead.
const SAMPLE_SLOT_BYTES: usize = 48;
const FIXED_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug)]
pub(crate) struct ScratchBudget {
    limit_bytes: usize,
    used_bytes: usize,
}

impl ScratchBudget {
    /// Computes the upper bound ahead of any allocation:
    /// O(NArguments x NSamples x MaxTicksPerInterval) plus fixed overhead.
    pub(crate) fn for_run(
        n_args: usize,
        n_samples: usize,
        max_ticks_per_interval: usize,
        candidate_bytes: usize,
        limit_override: Option<usize>,
    ) -> Self {
        let computed = n_args
            .max(1)
            .saturating_mul(n_samples)
            .saturating_mul(SAMPLE_SLOT_BYTES.saturating_mul(max_ticks_per_interval.max(1)))
            .saturating_add(candidate_bytes)
            .saturating_add(FIXED_OVERHEAD_BYTES);

        Self {
            limit_bytes: limit_override.unwrap_or(computed),
            used_bytes: 0,
        }
    }

    pub(crate) fn charge(&mut self, bytes: usize) -> TickResult<()> {
        let remaining = self.limit_bytes.saturating_sub(self.used_bytes);
        if bytes > remaining {
            return Err(TickError::AllocationFailure {
                requested: bytes,
                remaining,
            });
        }
        self.used_bytes += bytes;
        Ok(())
    }

    pub(crate) fn charge_slots<T>(&mut self, slots: usize) -> TickResult<()> {
        self.charge(slots.saturating_mul(size_of::<T>()))
    }

    #[cfg(test)]
    pub(crate) fn used_bytes(&self) -> usize {
        self.used_bytes
    }
}
