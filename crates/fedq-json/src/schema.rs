//! Result templates
//!
//! A template maps output labels to field names, or to nested templates:
//!
//! ```json
//! {"id": "@order_id", "driver": {"name": "@driver_name"}}
//! ```
//!
//! The leading `@` is optional. Rendering copies each field's value under
//! its label; fields that are missing or were never retrieved are omitted.

use crate::error::{DslError, DslResult};
use crate::query::FIELD_PREFIX;
use fedq_types::{Entities, Entity, EntityId, FieldName, Scalar, Value};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};

/// A template node: a field reference or a nested group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateNode {
    Field(String),
    Group(ResultTemplate),
}

/// Output shape for resolved entities
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTemplate {
    nodes: IndexMap<String, TemplateNode>,
}

impl ResultTemplate {
    pub fn parse_str(text: &str) -> DslResult<Self> {
        let template: Self = serde_json::from_str(text)?;
        template.validate()?;
        Ok(template)
    }

    /// A flat template labelling each field with its own name
    pub fn from_fields<F: Into<FieldName>>(fields: impl IntoIterator<Item = F>) -> Self {
        let nodes = fields
            .into_iter()
            .map(|field| {
                let field = field.into();
                (field.clone(), TemplateNode::Field(field))
            })
            .collect();
        Self { nodes }
    }

    pub fn nodes(&self) -> &IndexMap<String, TemplateNode> {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Distinct referenced fields in document order
    pub fn fields(&self) -> Vec<FieldName> {
        let mut fields = IndexSet::new();
        self.collect_fields(&mut fields);
        fields.into_iter().collect()
    }

    fn collect_fields(&self, fields: &mut IndexSet<FieldName>) {
        for node in self.nodes.values() {
            match node {
                TemplateNode::Field(reference) => {
                    fields.insert(field_name(reference).to_string());
                }
                TemplateNode::Group(group) => group.collect_fields(fields),
            }
        }
    }

    fn validate(&self) -> DslResult<()> {
        for (label, node) in &self.nodes {
            match node {
                TemplateNode::Field(reference) if field_name(reference).is_empty() => {
                    return Err(DslError::EmptyTemplateField { label: label.clone() });
                }
                TemplateNode::Field(_) => {}
                TemplateNode::Group(group) => group.validate()?,
            }
        }
        Ok(())
    }

    /// Render one entity. Groups are always emitted, possibly empty.
    pub fn render<Id: EntityId>(&self, entity: &Entity<Id>) -> Json {
        let mut object = Map::new();
        for (label, node) in &self.nodes {
            match node {
                TemplateNode::Field(reference) => {
                    match entity.get(field_name(reference)) {
                        Some(Value::Primitive(scalar)) => {
                            object.insert(label.clone(), scalar_to_json(scalar));
                        }
                        Some(Value::List(items)) => {
                            object.insert(label.clone(), Json::Array(items.iter().map(scalar_to_json).collect()));
                        }
                        Some(Value::Missing) | None => {}
                    }
                }
                TemplateNode::Group(group) => {
                    object.insert(label.clone(), group.render(entity));
                }
            }
        }
        Json::Object(object)
    }

    /// Render every entity, in result order
    pub fn render_all<Id: EntityId>(&self, entities: &Entities<Id>) -> Json {
        Json::Array(entities.values().map(|entity| self.render(entity)).collect())
    }
}

fn field_name(reference: &str) -> &str {
    reference.strip_prefix(FIELD_PREFIX).unwrap_or(reference)
}

fn scalar_to_json(scalar: &Scalar) -> Json {
    match scalar {
        Scalar::Int(n) => Json::Number((*n).into()),
        // Non-finite floats have no JSON form
        Scalar::Float(x) => Number::from_f64(*x).map_or(Json::Null, Json::Number),
        Scalar::String(s) => Json::String(s.clone()),
        Scalar::Bool(b) => Json::Bool(*b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_fields_are_distinct_and_ordered() {
        let template = ResultTemplate::parse_str(
            r#"{"a": "@amount", "driver": {"name": "driver_name", "again": "@amount"}, "b": "@status"}"#,
        )
        .unwrap();

        assert_eq!(template.fields(), vec!["amount", "driver_name", "status"]);
    }

    #[test]
    fn test_render_omits_missing_and_absent() {
        let template = ResultTemplate::parse_str(r#"{"a": "@amount", "d": {"n": "@driver_name"}, "s": "@status"}"#).unwrap();
        let entity = Entity::new(1u32)
            .with_field("amount", Value::float(2.5))
            .with_field("driver_name", Value::Missing);

        assert_eq!(template.render(&entity), json!({"a": 2.5, "d": {}}));
    }

    #[test]
    fn test_render_list_as_array() {
        let template = ResultTemplate::from_fields(["tags"]);
        let entity = Entity::new(1u32).with_field("tags", Value::list(["cold", "fragile"]));

        assert_eq!(template.render(&entity), json!({"tags": ["cold", "fragile"]}));
    }

    #[test]
    fn test_empty_reference_is_rejected() {
        let err = ResultTemplate::parse_str(r#"{"x": {"y": "@"}}"#).unwrap_err();
        assert!(matches!(err, DslError::EmptyTemplateField { label } if label == "y"));
    }
}
