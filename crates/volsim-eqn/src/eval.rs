//! Elementwise evaluation of an [`Expr`] over bound sample arrays.

use std::f64::consts;

use volsim_core::errors::{ErrorInfo, VolError};
use volsim_core::Bindings;

use crate::parser::{BinOp, Expr};

/// Names resolved to constants when no binding shadows them.
pub const CONSTANTS: [&str; 2] = ["pi", "e"];

/// Functions callable from equation text.
pub const FUNCTIONS: [&str; 9] = [
    "exp", "ln", "log", "log10", "sqrt", "abs", "min", "max", "pow",
];

/// Intermediate result: either a scalar or one value per trial.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Value {
    Scalar(f64),
    Array(Vec<f64>),
}

impl Value {
    fn map(self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(x) => Value::Scalar(f(x)),
            Value::Array(mut xs) => {
                xs.iter_mut().for_each(|x| *x = f(*x));
                Value::Array(xs)
            }
        }
    }

    fn zip(self, other: Value, f: impl Fn(f64, f64) -> f64) -> Result<Value, VolError> {
        Ok(match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(f(a, b)),
            (Value::Array(mut xs), Value::Scalar(b)) => {
                xs.iter_mut().for_each(|x| *x = f(*x, b));
                Value::Array(xs)
            }
            (Value::Scalar(a), Value::Array(mut ys)) => {
                ys.iter_mut().for_each(|y| *y = f(a, *y));
                Value::Array(ys)
            }
            (Value::Array(xs), Value::Array(ys)) => {
                if xs.len() != ys.len() {
                    return Err(VolError::Evaluation(
                        ErrorInfo::new(
                            "length-mismatch",
                            "operands hold different numbers of samples",
                        )
                        .with_context("lhs", xs.len().to_string())
                        .with_context("rhs", ys.len().to_string()),
                    ));
                }
                Value::Array(xs.iter().zip(&ys).map(|(&a, &b)| f(a, b)).collect())
            }
        })
    }
}

pub(crate) fn eval(expr: &Expr, bindings: &Bindings) -> Result<Value, VolError> {
    match expr {
        Expr::Number(value) => Ok(Value::Scalar(*value)),
        Expr::Ident(name) => lookup(name, bindings),
        Expr::Neg(inner) => Ok(eval(inner, bindings)?.map(|x| -x)),
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs, bindings)?;
            let rhs = eval(rhs, bindings)?;
            match op {
                BinOp::Add => lhs.zip(rhs, |a, b| a + b),
                BinOp::Sub => lhs.zip(rhs, |a, b| a - b),
                BinOp::Mul => lhs.zip(rhs, |a, b| a * b),
                BinOp::Div => lhs.zip(rhs, |a, b| a / b),
                BinOp::Pow => lhs.zip(rhs, f64::powf),
            }
        }
        Expr::Call(name, args) => call(name, args, bindings),
    }
}

fn lookup(name: &str, bindings: &Bindings) -> Result<Value, VolError> {
    if let Some(values) = bindings.get(name) {
        return Ok(Value::Array(values.clone()));
    }
    match name {
        "pi" => Ok(Value::Scalar(consts::PI)),
        "e" => Ok(Value::Scalar(consts::E)),
        _ => Err(VolError::Evaluation(
            ErrorInfo::new("unknown-identifier", format!("`{name}` is not bound"))
                .with_context("identifier", name)
                .with_hint("reference a property variable defined earlier in the region"),
        )),
    }
}

fn call(name: &str, args: &[Expr], bindings: &Bindings) -> Result<Value, VolError> {
    let arity = match name {
        "exp" | "ln" | "log" | "log10" | "sqrt" | "abs" => 1,
        "min" | "max" | "pow" => 2,
        _ => {
            return Err(VolError::Evaluation(
                ErrorInfo::new("unknown-function", format!("no function named `{name}`"))
                    .with_context("function", name)
                    .with_hint(format!("available: {}", FUNCTIONS.join(", "))),
            ))
        }
    };
    if args.len() != arity {
        return Err(VolError::Evaluation(
            ErrorInfo::new(
                "arity",
                format!("`{name}` takes {arity} argument(s), got {}", args.len()),
            )
            .with_context("function", name),
        ));
    }

    let mut values = args
        .iter()
        .map(|arg| eval(arg, bindings))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter();
    let (Some(first), second) = (values.next(), values.next()) else {
        return Err(VolError::Evaluation(ErrorInfo::new(
            "arity",
            format!("`{name}` called without arguments"),
        )));
    };

    match (name, second) {
        ("exp", None) => Ok(first.map(f64::exp)),
        ("ln" | "log", None) => Ok(first.map(f64::ln)),
        ("log10", None) => Ok(first.map(f64::log10)),
        ("sqrt", None) => Ok(first.map(f64::sqrt)),
        ("abs", None) => Ok(first.map(f64::abs)),
        ("min", Some(second)) => first.zip(second, f64::min),
        ("max", Some(second)) => first.zip(second, f64::max),
        ("pow", Some(second)) => first.zip(second, f64::powf),
        _ => Err(VolError::Evaluation(
            ErrorInfo::new("arity", format!("bad argument list for `{name}`"))
                .with_context("function", name),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn run(text: &str, bindings: &Bindings) -> Result<Value, VolError> {
        eval(&parse(text)?, bindings)
    }

    #[test]
    fn scalars_broadcast_over_arrays() {
        let mut bindings = Bindings::new();
        bindings.insert("a".into(), vec![1.0, 2.0, 3.0]);
        assert_eq!(
            run("2 * a + 1", &bindings).unwrap(),
            Value::Array(vec![3.0, 5.0, 7.0])
        );
    }

    #[test]
    fn bindings_shadow_constants() {
        let mut bindings = Bindings::new();
        assert_eq!(run("pi", &bindings).unwrap(), Value::Scalar(consts::PI));
        bindings.insert("e".into(), vec![4.0]);
        assert_eq!(run("e", &bindings).unwrap(), Value::Array(vec![4.0]));
    }

    #[test]
    fn arity_is_checked() {
        let err = run("max(1)", &Bindings::new()).unwrap_err();
        assert_eq!(err.info().code, "arity");
        let err = run("sqrt(1, 2)", &Bindings::new()).unwrap_err();
        assert_eq!(err.info().code, "arity");
    }

    #[test]
    fn unknown_function_lists_alternatives() {
        let err = run("tanh(1)", &Bindings::new()).unwrap_err();
        assert_eq!(err.info().code, "unknown-function");
        assert!(err.info().hint.as_deref().unwrap_or("").contains("log10"));
    }
}
