//! JSON query DSL
//!
//! A query document is a single comparison node or an array of nodes,
//! read as their conjunction:
//!
//! ```json
//! [
//!   {"range": {"value": "@amount", "from": 5, "to": 20}},
//!   {"in": {"value": "@status", "values": ["open", "held"]}},
//!   {"in": {"value": "fragile", "values": "@tags"}},
//!   {"not": {"exists": "@cancelled_at"}}
//! ]
//! ```
//!
//! Membership candidates are an inline array, or a field holding a list.
//!
//! Operands are bare JSON scalars (constants, or fields when a string starts
//! with `@`), `null` for a missing constant, or one of the object forms
//! `field`, `const`, `time`, `sum` and `difference`.

use crate::error::{DslError, DslResult};
use chrono::{DateTime, Utc};
use fedq_expr::{Comparison, ListExpr, ValueExpr};
use fedq_types::{FieldName, Scalar, ScalarKind, Value};
use indexmap::IndexSet;
use serde::Deserialize;

/// Prefix marking a bare string operand as a field reference
pub const FIELD_PREFIX: char = '@';

/// Parse a query document with default options
pub fn parse_query(text: &str) -> DslResult<Comparison> {
    QueryParser::new().parse_str(text)
}

/// Turns JSON query documents into [`Comparison`] trees
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    clock: Option<DateTime<Utc>>,
    known_fields: Option<IndexSet<FieldName>>,
}

impl QueryParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the instant `time` operands are relative to
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    /// Reject references to fields outside this set
    pub fn with_known_fields<F: Into<FieldName>>(mut self, fields: impl IntoIterator<Item = F>) -> Self {
        self.known_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn parse_str(&self, text: &str) -> DslResult<Comparison> {
        let document: serde_json::Value = serde_json::from_str(text)?;
        self.parse_value(document)
    }

    pub fn parse_value(&self, document: serde_json::Value) -> DslResult<Comparison> {
        match document {
            serde_json::Value::Array(nodes) => {
                let terms = nodes
                    .into_iter()
                    .map(|node| {
                        let node: NodeDto = serde_json::from_value(node)?;
                        self.comparison(node)
                    })
                    .collect::<DslResult<Vec<_>>>()?;
                Ok(Comparison::and(terms))
            }
            other => {
                let node: NodeDto = serde_json::from_value(other)?;
                self.comparison(node)
            }
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.unwrap_or_else(Utc::now)
    }

    fn comparison(&self, node: NodeDto) -> DslResult<Comparison> {
        Ok(match node {
            NodeDto::Equal(pair) => {
                let (a, b) = self.pair(pair)?;
                Comparison::equal(a, b)
            }
            NodeDto::NotEqual(pair) => {
                let (a, b) = self.pair(pair)?;
                Comparison::not_equal(a, b)
            }
            NodeDto::Less(pair) => {
                let (a, b) = self.pair(pair)?;
                Comparison::less(a, b)
            }
            NodeDto::GreaterEqual(pair) => {
                let (a, b) = self.pair(pair)?;
                Comparison::greater_equal(a, b)
            }
            NodeDto::Range(range) => self.range(range)?,
            NodeDto::In(membership) => {
                let (value, candidates) = self.membership(membership)?;
                Comparison::in_list(value, candidates)
            }
            NodeDto::NotIn(membership) => {
                let (value, candidates) = self.membership(membership)?;
                Comparison::not_in(value, candidates)
            }
            NodeDto::Exists(reference) => Comparison::exists(self.field_name(&reference)?),
            NodeDto::NotExists(reference) => Comparison::not_exists(self.field_name(&reference)?),
            NodeDto::And(nodes) => Comparison::and(self.comparisons(nodes)?),
            NodeDto::Or(nodes) => Comparison::or(self.comparisons(nodes)?),
            NodeDto::Not(node) => Comparison::not(self.comparison(*node)?),
        })
    }

    fn comparisons(&self, nodes: Vec<NodeDto>) -> DslResult<Vec<Comparison>> {
        nodes.into_iter().map(|node| self.comparison(node)).collect()
    }

    fn pair(&self, pair: PairDto) -> DslResult<(ValueExpr, ValueExpr)> {
        Ok((self.value(pair.left)?, self.value(pair.right)?))
    }

    fn membership(&self, membership: MembershipDto) -> DslResult<(ValueExpr, ListExpr)> {
        let value = self.value(membership.value)?;
        let candidates = match membership.values {
            ListDto::Items(items) => ListExpr::Items(
                items
                    .into_iter()
                    .map(|candidate| self.value(candidate))
                    .collect::<DslResult<Vec<_>>>()?,
            ),
            ListDto::Field(reference) => match self.value(*reference)? {
                ValueExpr::Field(name) => ListExpr::Field(name),
                other => return Err(DslError::invalid_field(other.to_string())),
            },
        };
        Ok((value, candidates))
    }

    /// `from <= value < to`, with either bound optional. `from` is
    /// inclusive (`GreaterEqual`), `to` is exclusive.
    fn range(&self, range: RangeDto) -> DslResult<Comparison> {
        let value = self.value(range.value)?;
        let lower = range
            .from
            .map(|from| self.value(from))
            .transpose()?
            .map(|from| Comparison::greater_equal(value.clone(), from));
        let upper = range
            .to
            .map(|to| self.value(to))
            .transpose()?
            .map(|to| Comparison::less(value.clone(), to));

        match (lower, upper) {
            (Some(lower), Some(upper)) => Ok(Comparison::and(vec![lower, upper])),
            (Some(bound), None) | (None, Some(bound)) => Ok(bound),
            (None, None) => Err(DslError::EmptyRange),
        }
    }

    fn value(&self, node: ValueDto) -> DslResult<ValueExpr> {
        match node {
            ValueDto::Field(FieldNode { field }) => {
                let name = match field {
                    FieldRefDto::Name(name) => name,
                    FieldRefDto::Named { name } => name,
                };
                Ok(ValueExpr::field(self.field_name(&name)?))
            }
            ValueDto::Const(ConstNode { constant }) => Ok(ValueExpr::constant(constant.into_value()?)),
            ValueDto::Time(TimeNode { time }) => {
                let base = time.value.unwrap_or_else(|| self.now().timestamp());
                let offset = time.offset.unwrap_or(0);
                let seconds = base
                    .checked_add(offset)
                    .ok_or_else(|| DslError::invalid_const("time", format!("{base} + {offset}")))?;
                Ok(ValueExpr::constant(Value::int(seconds)))
            }
            ValueDto::Sum(SumNode { sum }) => {
                let (a, b) = self.operands("sum", sum)?;
                Ok(ValueExpr::sum(a, b))
            }
            ValueDto::Difference(DifferenceNode { difference }) => {
                let (a, b) = self.operands("difference", difference)?;
                Ok(ValueExpr::difference(a, b))
            }
            ValueDto::Scalar(None) => Ok(ValueExpr::constant(Value::Missing)),
            ValueDto::Scalar(Some(Scalar::String(text))) if text.starts_with(FIELD_PREFIX) => {
                Ok(ValueExpr::field(self.field_name(&text)?))
            }
            ValueDto::Scalar(Some(scalar)) => Ok(ValueExpr::constant(scalar)),
        }
    }

    fn operands(&self, node: &'static str, operands: Vec<ValueDto>) -> DslResult<(ValueExpr, ValueExpr)> {
        let count = operands.len();
        let mut operands = operands.into_iter();
        match (operands.next(), operands.next(), operands.next()) {
            (Some(a), Some(b), None) => Ok((self.value(a)?, self.value(b)?)),
            _ => Err(DslError::Arity { node, count }),
        }
    }

    /// Strip the `@` prefix and check the name against the known fields
    fn field_name(&self, reference: &str) -> DslResult<FieldName> {
        let name = reference.strip_prefix(FIELD_PREFIX).unwrap_or(reference);
        if name.is_empty() {
            return Err(DslError::invalid_field(reference));
        }
        if let Some(known) = &self.known_fields {
            if !known.contains(name) {
                return Err(DslError::unknown_field(name));
            }
        }
        Ok(name.to_string())
    }
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NodeDto {
    Equal(PairDto),
    NotEqual(PairDto),
    Less(PairDto),
    GreaterEqual(PairDto),
    Range(RangeDto),
    In(MembershipDto),
    NotIn(MembershipDto),
    Exists(String),
    NotExists(String),
    And(Vec<NodeDto>),
    Or(Vec<NodeDto>),
    Not(Box<NodeDto>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PairDto {
    #[serde(alias = "value_a")]
    left: ValueDto,
    #[serde(alias = "value_b")]
    right: ValueDto,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RangeDto {
    value: ValueDto,
    #[serde(default)]
    from: Option<ValueDto>,
    #[serde(default)]
    to: Option<ValueDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MembershipDto {
    value: ValueDto,
    values: ListDto,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListDto {
    Items(Vec<ValueDto>),
    Field(Box<ValueDto>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueDto {
    Field(FieldNode),
    Const(ConstNode),
    Time(TimeNode),
    Sum(SumNode),
    Difference(DifferenceNode),
    Scalar(Option<Scalar>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldNode {
    field: FieldRefDto,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldRefDto {
    Name(String),
    Named { name: String },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstNode {
    #[serde(rename = "const")]
    constant: ConstDto,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConstDto {
    #[serde(rename = "type")]
    kind: ScalarKind,
    value: serde_json::Value,
}

impl ConstDto {
    /// Typed constants accept their value as a JSON scalar or as text
    fn into_value(self) -> DslResult<Value> {
        use serde_json::Value as Json;

        let invalid = |value: &Json| DslError::invalid_const(self.kind.name(), value);
        let scalar = match (self.kind, &self.value) {
            (ScalarKind::Int, Json::Number(n)) => n.as_i64().map(Scalar::Int),
            (ScalarKind::Int, Json::String(s)) => s.trim().parse().ok().map(Scalar::Int),
            (ScalarKind::Float, Json::Number(n)) => n.as_f64().map(Scalar::Float),
            (ScalarKind::Float, Json::String(s)) => s.trim().parse().ok().map(Scalar::Float),
            (ScalarKind::String, Json::String(s)) => Some(Scalar::String(s.clone())),
            (ScalarKind::String, Json::Number(n)) => Some(Scalar::String(n.to_string())),
            (ScalarKind::String, Json::Bool(b)) => Some(Scalar::String(b.to_string())),
            (ScalarKind::Bool, Json::Bool(b)) => Some(Scalar::Bool(*b)),
            (ScalarKind::Bool, Json::String(s)) => s.trim().parse().ok().map(Scalar::Bool),
            _ => None,
        };
        scalar.map(Value::from).ok_or_else(|| invalid(&self.value))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeNode {
    time: TimeDto,
}

/// Unix seconds: `value` (or now) shifted by `offset`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TimeDto {
    #[serde(default)]
    value: Option<i64>,
    #[serde(default)]
    offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SumNode {
    sum: Vec<ValueDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DifferenceNode {
    difference: Vec<ValueDto>,
}
