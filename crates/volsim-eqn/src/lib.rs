#![deny(missing_docs)]
#![doc = "Array equation evaluator used by volsim result properties."]

mod eval;
mod lexer;
mod parser;

use tracing::trace;
use volsim_core::errors::{ErrorInfo, VolError};
use volsim_core::{Bindings, EquationEvaluator};

pub use eval::{CONSTANTS, FUNCTIONS};

use eval::Value;

/// Evaluates equations elementwise over equally sized sample arrays.
///
/// A scalar outcome (an equation with no bound arrays) is broadcast to the
/// common length of the supplied bindings, or returned as a single value when
/// there are none.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayEvaluator;

impl ArrayEvaluator {
    /// Creates the evaluator.
    pub fn new() -> Self {
        Self
    }
}

impl EquationEvaluator for ArrayEvaluator {
    fn evaluate(&self, text: &str, bindings: &Bindings) -> Result<Vec<f64>, VolError> {
        let expr = parser::parse(text)?;
        let values = match eval::eval(&expr, bindings)? {
            Value::Array(values) => values,
            Value::Scalar(value) => vec![value; broadcast_len(bindings)?],
        };
        trace!(equation = text, samples = values.len(), "equation evaluated");
        Ok(values)
    }

    fn variables(&self, text: &str) -> Result<Vec<String>, VolError> {
        let expr = parser::parse(text)?;
        let mut names = Vec::new();
        expr.collect_idents(&mut names);
        Ok(names)
    }
}

fn broadcast_len(bindings: &Bindings) -> Result<usize, VolError> {
    let mut lengths = bindings.values().map(Vec::len);
    let Some(first) = lengths.next() else {
        return Ok(1);
    };
    if lengths.any(|len| len != first) {
        return Err(VolError::Evaluation(ErrorInfo::new(
            "length-mismatch",
            "bindings hold different numbers of samples",
        )));
    }
    Ok(first)
}

/// Evaluates `text` with the default [`ArrayEvaluator`].
pub fn evaluate(text: &str, bindings: &Bindings) -> Result<Vec<f64>, VolError> {
    ArrayEvaluator.evaluate(text, bindings)
}

/// Lists identifiers referenced by `text`, in first-use order.
pub fn variables(text: &str) -> Result<Vec<String>, VolError> {
    ArrayEvaluator.variables(text)
}

/// True when `name` resolves to a built-in constant in the absence of a binding.
pub fn is_constant(name: &str) -> bool {
    CONSTANTS.contains(&name)
}
