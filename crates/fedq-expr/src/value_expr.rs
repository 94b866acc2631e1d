//! Value-producing expressions

use crate::error::{ExprResult, Resolution};
use fedq_types::{Entity, EntityId, FieldName, Value};
use std::fmt;

/// An expression producing a [`Value`] for an entity
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// A named entity field
    Field(FieldName),
    /// A constant
    Const(Value),
    /// `a + b`
    Sum(Box<ValueExpr>, Box<ValueExpr>),
    /// `a - b`
    Difference(Box<ValueExpr>, Box<ValueExpr>),
}

impl ValueExpr {
    pub fn field(name: impl Into<FieldName>) -> Self {
        Self::Field(name.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Const(value.into())
    }

    pub fn sum(a: ValueExpr, b: ValueExpr) -> Self {
        Self::Sum(Box::new(a), Box::new(b))
    }

    pub fn difference(a: ValueExpr, b: ValueExpr) -> Self {
        Self::Difference(Box::new(a), Box::new(b))
    }

    /// Evaluate against an entity.
    ///
    /// A field is resolvable once present, including present-but-missing.
    pub fn resolve<Id: EntityId>(&self, entity: &Entity<Id>) -> ExprResult<Resolution<Value>> {
        match self {
            Self::Field(name) => Ok(match entity.get(name) {
                Some(value) => Resolution::Resolved(value.clone()),
                None => Resolution::Unresolvable,
            }),
            Self::Const(value) => Ok(Resolution::Resolved(value.clone())),
            Self::Sum(a, b) => Self::resolve_binary(a, b, entity, Value::plus),
            Self::Difference(a, b) => Self::resolve_binary(a, b, entity, Value::minus),
        }
    }

    fn resolve_binary<Id: EntityId>(
        a: &ValueExpr,
        b: &ValueExpr,
        entity: &Entity<Id>,
        op: fn(&Value, &Value) -> fedq_types::ValueResult<Value>,
    ) -> ExprResult<Resolution<Value>> {
        let (Resolution::Resolved(va), Resolution::Resolved(vb)) = (a.resolve(entity)?, b.resolve(entity)?) else {
            return Ok(Resolution::Unresolvable);
        };
        Ok(Resolution::Resolved(op(&va, &vb)?))
    }

    pub fn is_resolvable<Id: EntityId>(&self, entity: &Entity<Id>) -> bool {
        match self {
            Self::Field(name) => entity.is_present(name),
            Self::Const(_) => true,
            Self::Sum(a, b) | Self::Difference(a, b) => {
                a.is_resolvable(entity) && b.is_resolvable(entity)
            }
        }
    }

    /// Fields this expression depends on, in order of appearance
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_field_names(&mut names);
        names
    }

    pub(crate) fn collect_field_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Field(name) => names.push(name),
            Self::Const(_) => {}
            Self::Sum(a, b) | Self::Difference(a, b) => {
                a.collect_field_names(names);
                b.collect_field_names(names);
            }
        }
    }

    pub fn is_const(&self) -> bool {
        match self {
            Self::Field(_) => false,
            Self::Const(_) => true,
            Self::Sum(a, b) | Self::Difference(a, b) => a.is_const() && b.is_const(),
        }
    }

    /// The field name when this is a bare field reference
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_field(&self, name: &str) -> bool {
        self.as_field() == Some(name)
    }

    /// Fold a constant expression.
    ///
    /// Returns `Ok(None)` when the expression depends on a field.
    pub fn const_value(&self) -> ExprResult<Option<Value>> {
        if !self.is_const() {
            return Ok(None);
        }
        Ok(self.resolve(&Entity::new(()))?.resolved())
    }
}

impl From<Value> for ValueExpr {
    fn from(value: Value) -> Self {
        Self::Const(value)
    }
}

impl fmt::Display for ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "@{}", name),
            Self::Const(value) => write!(f, "{}", value),
            Self::Sum(a, b) => write!(f, "({} + {})", a, b),
            Self::Difference(a, b) => write!(f, "({} - {})", a, b),
        }
    }
}
