use thiserror::Error;

use crate::eval::EvalError;

pub type TickResult<T> = Result<T, TickError>;

/// Failure modes of the automatic ticking pass.
///
/// None of these abort a render: the top-level entry point recovers from
/// every variant by switching to the uniform fallback for the whole axis.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("invalid axis: {0}")]
    InvalidAxis(String),

    #[error("scratch budget exceeded: requested {requested} bytes, {remaining} remaining")]
    AllocationFailure { requested: usize, remaining: usize },

    #[error("label format cannot be decomposed: {0}")]
    FormatExpression(String),

    #[error("evaluator failed: {0}")]
    Evaluation(#[from] EvalError),

    #[error("candidate buffer overflow: kept {kept} of {generated} candidates")]
    CandidateOverflow { kept: usize, generated: usize },

    #[error("bracket failed to converge near axis fraction {fraction:.6}")]
    ConvergenceFailure { fraction: f64 },

    #[error("no tick scheme satisfied the spacing constraints")]
    NoViableScheme,
}
