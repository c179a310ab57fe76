//! Eager elementwise arithmetic between properties and scalars.
//!
//! The composed property is a result whose equation records the operation
//! over the operand variables, but its values are computed here, directly
//! from the operands' arrays.

use std::fmt;

use volsim_core::errors::{ErrorInfo, VolError};

use crate::property::Property;
use crate::stats::Stats;

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
}

impl BinaryOp {
    /// Operator symbol used in composed names and equations.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Subtract => a - b,
            BinaryOp::Multiply => a * b,
            BinaryOp::Divide => a / b,
        }
    }
}

/// One side of a composition.
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// An evaluated property.
    Property(&'a Property),
    /// A constant applied to every sample.
    Scalar(f64),
}

impl<'a> From<&'a Property> for Operand<'a> {
    fn from(property: &'a Property) -> Self {
        Operand::Property(property)
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Property(property) => f.write_str(property.name()),
            Operand::Scalar(value) => write!(f, "{value}"),
        }
    }
}

impl<'a> Operand<'a> {
    fn term(&self) -> String {
        match self {
            Operand::Property(property) => property.variable().to_string(),
            Operand::Scalar(value) => value.to_string(),
        }
    }

    fn values(&self) -> Result<Option<&'a [f64]>, VolError> {
        match *self {
            Operand::Property(property) if property.values().is_empty() => {
                Err(VolError::InvalidInput(
                    ErrorInfo::new("not-evaluated", "operand has no values to combine")
                        .with_context("property", property.name())
                        .with_hint("run the property's calculation first"),
                ))
            }
            Operand::Property(property) => Ok(Some(property.values())),
            Operand::Scalar(_) => Ok(None),
        }
    }
}

/// Combines two operands elementwise into a new result property.
///
/// With a property on the left the variable is `{lhs}_{rhs}`; a reflected
/// composition (scalar on the left) keeps the property's variable first.
pub fn compose(op: BinaryOp, lhs: Operand<'_>, rhs: Operand<'_>) -> Result<Property, VolError> {
    let values = match (lhs.values()?, rhs.values()?, lhs, rhs) {
        (Some(a), Some(b), _, _) => {
            if a.len() != b.len() {
                return Err(VolError::InvalidInput(
                    ErrorInfo::new("length-mismatch", "operands hold different numbers of samples")
                        .with_context("lhs", a.len().to_string())
                        .with_context("rhs", b.len().to_string()),
                ));
            }
            a.iter().zip(b).map(|(&x, &y)| op.apply(x, y)).collect()
        }
        (Some(a), None, _, Operand::Scalar(s)) => a.iter().map(|&x| op.apply(x, s)).collect(),
        (None, Some(b), Operand::Scalar(s), _) => b.iter().map(|&y| op.apply(s, y)).collect(),
        _ => {
            return Err(VolError::InvalidInput(ErrorInfo::new(
                "no-property-operand",
                "at least one operand must be a property",
            )))
        }
    };

    let variable = match (lhs, rhs) {
        (Operand::Scalar(_), Operand::Property(property)) => {
            format!("{}_{}", property.variable(), lhs.term())
        }
        _ => format!("{}_{}", lhs.term(), rhs.term()),
    };
    let name = format!("({lhs} {} {rhs})", op.symbol());
    let equation = format!("({} {} {})", lhs.term(), op.symbol(), rhs.term());
    Ok(evaluated(Property::result(name, variable, equation), values))
}

/// Negates a property elementwise; the variable is kept.
pub fn negate(property: &Property) -> Result<Property, VolError> {
    let values = Operand::Property(property)
        .values()?
        .unwrap_or_default()
        .iter()
        .map(|x| -x)
        .collect();
    let composed = Property::result(
        format!("(-{})", property.name()),
        property.variable(),
        format!("(-{})", property.variable()),
    );
    Ok(evaluated(composed, values))
}

fn evaluated(mut property: Property, values: Vec<f64>) -> Property {
    property.stats = Some(Stats::from_values(&values));
    property.values = values;
    property
}

impl Property {
    /// `self + rhs`
    pub fn add<'a>(&'a self, rhs: impl Into<Operand<'a>>) -> Result<Property, VolError> {
        compose(BinaryOp::Add, Operand::Property(self), rhs.into())
    }

    /// `self - rhs`
    pub fn subtract<'a>(&'a self, rhs: impl Into<Operand<'a>>) -> Result<Property, VolError> {
        compose(BinaryOp::Subtract, Operand::Property(self), rhs.into())
    }

    /// `self * rhs`
    pub fn multiply<'a>(&'a self, rhs: impl Into<Operand<'a>>) -> Result<Property, VolError> {
        compose(BinaryOp::Multiply, Operand::Property(self), rhs.into())
    }

    /// `self / rhs`
    pub fn divide<'a>(&'a self, rhs: impl Into<Operand<'a>>) -> Result<Property, VolError> {
        compose(BinaryOp::Divide, Operand::Property(self), rhs.into())
    }

    /// `lhs <op> self` for a scalar on the left.
    pub fn reflected(&self, op: BinaryOp, lhs: f64) -> Result<Property, VolError> {
        compose(op, Operand::Scalar(lhs), Operand::Property(self))
    }

    /// `-self`
    pub fn negate(&self) -> Result<Property, VolError> {
        negate(self)
    }
}
