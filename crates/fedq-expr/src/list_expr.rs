//! Candidate lists for membership tests

use crate::error::{ExprResult, Resolution};
use crate::value_expr::ValueExpr;
use fedq_types::{Entity, EntityId, FieldName, Value, ValueError};
use std::fmt;

/// The right-hand side of `In`/`NotIn`
#[derive(Debug, Clone, PartialEq)]
pub enum ListExpr {
    /// An inline list of value expressions
    Items(Vec<ValueExpr>),
    /// A field holding a list of scalars
    Field(FieldName),
}

impl ListExpr {
    pub fn items(items: impl IntoIterator<Item = ValueExpr>) -> Self {
        Self::Items(items.into_iter().collect())
    }

    pub fn field(name: impl Into<FieldName>) -> Self {
        Self::Field(name.into())
    }

    /// Resolve each candidate against an entity.
    ///
    /// A list field that is still absent yields a single unresolvable
    /// candidate. A list field recorded as missing yields no candidates.
    pub fn candidates<Id: EntityId>(&self, entity: &Entity<Id>) -> ExprResult<Vec<Resolution<Value>>> {
        match self {
            Self::Items(items) => items.iter().map(|item| item.resolve(entity)).collect(),
            Self::Field(name) => match entity.get(name) {
                None => Ok(vec![Resolution::Unresolvable]),
                Some(Value::Missing) => Ok(Vec::new()),
                Some(Value::List(values)) => Ok(values
                    .iter()
                    .map(|value| Resolution::Resolved(Value::Primitive(value.clone())))
                    .collect()),
                Some(Value::Primitive(scalar)) => Err(ValueError::NotAList {
                    field: name.clone(),
                    kind: scalar.kind(),
                }
                .into()),
            },
        }
    }

    pub(crate) fn collect_field_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Items(items) => {
                for item in items {
                    item.collect_field_names(names);
                }
            }
            Self::Field(name) => names.push(name),
        }
    }

    pub fn is_const(&self) -> bool {
        match self {
            Self::Items(items) => items.iter().all(ValueExpr::is_const),
            Self::Field(_) => false,
        }
    }

    /// Whether some candidate can be produced from `available` fields
    pub fn any_available(&self, available: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Self::Items(items) => items
                .iter()
                .any(|item| item.field_names().into_iter().all(available)),
            Self::Field(name) => available(name),
        }
    }

    /// Whether every candidate can be produced from `available` fields
    pub fn all_available(&self, available: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Self::Items(items) => items
                .iter()
                .all(|item| item.field_names().into_iter().all(available)),
            Self::Field(name) => available(name),
        }
    }
}

impl From<Vec<ValueExpr>> for ListExpr {
    fn from(items: Vec<ValueExpr>) -> Self {
        Self::Items(items)
    }
}

impl fmt::Display for ListExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Items(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Field(name) => write!(f, "@{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExprError;

    fn tagged() -> Entity<u32> {
        Entity::new(1)
            .with_field("tags", Value::list(["fragile", "cold"]))
            .with_field("labels", Value::Missing)
            .with_field("status", Value::string("open"))
    }

    #[test]
    fn test_list_field_candidates() {
        let e = tagged();
        assert_eq!(
            ListExpr::field("tags").candidates(&e),
            Ok(vec![
                Resolution::Resolved(Value::string("fragile")),
                Resolution::Resolved(Value::string("cold")),
            ])
        );
        assert_eq!(ListExpr::field("labels").candidates(&e), Ok(vec![]));
        assert_eq!(ListExpr::field("zones").candidates(&e), Ok(vec![Resolution::Unresolvable]));
    }

    #[test]
    fn test_scalar_field_is_not_a_list() {
        let err = ListExpr::field("status").candidates(&tagged()).unwrap_err();
        assert!(matches!(err, ExprError::Value(ValueError::NotAList { ref field, .. }) if field == "status"));
    }

    #[test]
    fn test_availability() {
        let available = |f: &str| f == "tags";
        let mixed = ListExpr::items([ValueExpr::field("zones"), ValueExpr::constant(Value::int(1))]);
        assert!(mixed.any_available(&available));
        assert!(!mixed.all_available(&available));
        assert!(ListExpr::field("tags").all_available(&available));
        assert!(!ListExpr::field("zones").any_available(&available));
    }

    #[test]
    fn test_display() {
        assert_eq!(ListExpr::field("tags").to_string(), "@tags");
        assert_eq!(ListExpr::items([ValueExpr::constant(Value::int(1))]).to_string(), "[1]");
    }
}
