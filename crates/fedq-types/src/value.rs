//! Comparable values
//!
//! A [`Value`] is a [`Scalar`] primitive, a list of scalars, or `Missing`.
//! Comparisons only make sense between scalars of the same kind; anything
//! else is type confusion and reported as a [`ValueError`]. Lists only serve
//! as candidate sets for membership tests.

use crate::error::{ValueError, ValueResult};
use crate::truth::TruthValue;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The kind of a scalar, used in error messages and type checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Int,
    Float,
    String,
    Bool,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
        }
    }

    /// Whether `plus`/`minus` are defined for this kind
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Int(_) => ScalarKind::Int,
            Self::Float(_) => ScalarKind::Float,
            Self::String(_) => ScalarKind::String,
            Self::Bool(_) => ScalarKind::Bool,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Order two scalars of the same kind.
    ///
    /// Returns `Ok(None)` for incomparable floats (NaN).
    pub fn compare(&self, other: &Scalar) -> ValueResult<Option<Ordering>> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(Some(a.cmp(b))),
            (Self::Float(a), Self::Float(b)) => Ok(a.partial_cmp(b)),
            (Self::String(a), Self::String(b)) => Ok(Some(a.cmp(b))),
            (Self::Bool(_), Self::Bool(_)) => Err(ValueError::Unordered { kind: ScalarKind::Bool }),
            _ => Err(ValueError::type_mismatch("less", self.kind(), other.kind())),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "'{}'", s),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// A field value: a primitive, a list of primitives, or the explicit
/// absence of one.
///
/// `Missing` means a provider was asked and confirmed the field does not
/// apply. It absorbs through every operation: comparisons yield
/// `TruthValue::Undefined`, arithmetic yields `Missing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Primitive(Scalar),
    List(Vec<Scalar>),
    Missing,
}

impl Value {
    pub fn int(value: i64) -> Self {
        Self::Primitive(Scalar::Int(value))
    }

    pub fn float(value: f64) -> Self {
        Self::Primitive(Scalar::Float(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Primitive(Scalar::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::Primitive(Scalar::Bool(value))
    }

    pub fn list<S: Into<Scalar>>(items: impl IntoIterator<Item = S>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// True unless missing
    pub fn exists(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// The underlying scalar, if any
    pub fn raw(&self) -> Option<&Scalar> {
        match self {
            Self::Primitive(s) => Some(s),
            Self::List(_) | Self::Missing => None,
        }
    }

    /// Both operands as scalars, `None` when either is missing
    fn scalars<'a>(&'a self, other: &'a Value, operation: &'static str) -> ValueResult<Option<(&'a Scalar, &'a Scalar)>> {
        match (self, other) {
            (Self::Missing, _) | (_, Self::Missing) => Ok(None),
            (Self::Primitive(a), Self::Primitive(b)) => Ok(Some((a, b))),
            _ => Err(ValueError::ListOperand { operation }),
        }
    }

    pub fn kind(&self) -> Option<ScalarKind> {
        self.raw().map(Scalar::kind)
    }

    /// Three-valued equality
    pub fn equal(&self, other: &Value) -> ValueResult<TruthValue> {
        let Some((a, b)) = self.scalars(other, "equal")? else {
            return Ok(TruthValue::Undefined);
        };

        if a.kind() != b.kind() {
            return Err(ValueError::type_mismatch("equal", a.kind(), b.kind()));
        }

        Ok(TruthValue::from(a == b))
    }

    /// Three-valued strict ordering (`self < other`)
    pub fn less(&self, other: &Value) -> ValueResult<TruthValue> {
        let Some((a, b)) = self.scalars(other, "less")? else {
            return Ok(TruthValue::Undefined);
        };

        match a.compare(b)? {
            Some(ordering) => Ok(TruthValue::from(ordering == Ordering::Less)),
            None => Ok(TruthValue::Undefined),
        }
    }

    /// Numeric addition
    pub fn plus(&self, other: &Value) -> ValueResult<Value> {
        self.arithmetic(other, "plus", i64::checked_add, |a, b| a + b)
    }

    /// Numeric subtraction
    pub fn minus(&self, other: &Value) -> ValueResult<Value> {
        self.arithmetic(other, "minus", i64::checked_sub, |a, b| a - b)
    }

    fn arithmetic(
        &self,
        other: &Value,
        operation: &'static str,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> ValueResult<Value> {
        let Some((a, b)) = self.scalars(other, operation)? else {
            return Ok(Value::Missing);
        };

        match (a, b) {
            (Scalar::Int(x), Scalar::Int(y)) => int_op(*x, *y)
                .map(Value::int)
                .ok_or(ValueError::Overflow { operation }),
            (Scalar::Float(x), Scalar::Float(y)) => Ok(Value::float(float_op(*x, *y))),
            _ if a.kind() != b.kind() => Err(ValueError::type_mismatch(operation, a.kind(), b.kind())),
            _ => Err(ValueError::unsupported(operation, a.kind())),
        }
    }
}

impl From<Scalar> for Value {
    fn from(value: Scalar) -> Self {
        Self::Primitive(value)
    }
}

impl From<Option<Scalar>> for Value {
    fn from(value: Option<Scalar>) -> Self {
        value.map_or(Self::Missing, Self::Primitive)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(s) => write!(f, "{}", s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Missing => write!(f, "missing"),
        }
    }
}
