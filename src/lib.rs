//! tickplan: automatic axis tick placement for scientific vector plots.
//!
//! Given a finalized axis range (linear or logarithmic) and an optional
//! label-format expression, the engine decides which positions deserve a
//! labelled major tick, which deserve an unlabelled minor tick, and what
//! text each major tick shows. It is a pure function of the axis parameters
//! and an injected expression [`Evaluator`]; rendering, range finalisation
//! and the format mini-language itself live with the caller.

pub mod axis;
pub mod engine;
pub mod error;
pub mod eval;
pub mod format;
pub mod telemetry;

pub use axis::{Axis, AxisScale, TickEntry, TickSet};
pub use engine::{TickEngineConfig, place_ticks, place_ticks_with};
pub use error::{TickError, TickResult};
pub use eval::{EvalError, EvalValue, Evaluator, NoEvaluator};
pub use format::NumericFormat;
