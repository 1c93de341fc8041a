//! The seam between the ticking engine and the host's expression language.
//!
//! The engine never parses substitution-argument expressions; it hands each
//! expression slice back to the host through [`Evaluator`] together with the
//! axis value to bind. A failing call poisons one sample, never the pass.

use thiserror::Error;

/// Result of evaluating one substitution argument at one axis value.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Evaluator for hosts without an expression language.
///
/// Every evaluation fails, so axes with a custom label format fall back to
/// uniform ticks while bare axes tick normally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvaluator;

impl Evaluator for NoEvaluator {
    fn evaluate(
        &self,
        expression: &str,
        _arg_index: usize,
        _value: f64,
        _unit: f64,
    ) -> Result<EvalValue, EvalError> {
        Err(EvalError::new(format!(
            "no evaluator installed for '{expression}'"
        )))
    }
}

/// Host-supplied expression evaluator.
///
/// Implementations must be idempotent: the engine calls them many times per
/// axis (sampling, refinement, labelling) and expects identical answers for
/// identical inputs.
pub trait Evaluator {
    /// Evaluates one substitution-argument expression with the axis variable
    /// bound to `value` and the display unit multiplier `unit`.
    fn evaluate(
        &self,
        expression: &str,
        arg_index: usize,
        value: f64,
        unit: f64,
    ) -> Result<EvalValue, EvalError>;

    /// Renders the complete label-format string at one axis value.
    ///
    /// The default implementation evaluates the whole format as a single
    /// expression, which suits hosts whose evaluator already performs the
    /// substitution itself.
    fn render_label(&self, format: &str, value: f64, unit: f64) -> Result<String, EvalError> {
        match self.evaluate(format, 0, value, unit)? {
            EvalValue::Text(text) => Ok(text),
            EvalValue::Number(number) => {
                Ok(crate::format::NumericFormat::default().format(number, 10.0))
            }
        }
    }
}
