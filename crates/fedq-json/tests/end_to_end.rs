//! Queries resolved against fixture sources and rendered through templates

use fedq_engine::Resolver;
use fedq_json::{ResultTemplate, load_source_refs, parse_query};
use pretty_assertions::assert_eq;
use serde_json::json;

const FIXTURE: &str = r#"{
  "sources": [
    {
      "name": "orders",
      "fields": ["amount", "status"],
      "mode": "seed",
      "records": {
        "o1": {"amount": 10, "status": "open"},
        "o2": {"amount": 3, "status": "held"},
        "o3": {"amount": 25, "status": "open"}
      }
    },
    {
      "name": "drivers",
      "fields": ["driver_name", "rating"],
      "records": {
        "o1": {"driver_name": "ana", "rating": 4.5},
        "o3": {"driver_name": "bo", "rating": null}
      }
    }
  ]
}"#;

fn resolver() -> Resolver<String> {
    Resolver::new(load_source_refs(FIXTURE).unwrap(), Default::default())
}

#[tokio::test]
async fn test_resolve_and_render() {
    let query = parse_query(
        r#"[
          {"range": {"value": "@amount", "from": 5, "to": 30}},
          {"equal": {"left": "@status", "right": "open"}}
        ]"#,
    )
    .unwrap();
    let template =
        ResultTemplate::parse_str(r#"{"total": "@amount", "driver": {"name": "@driver_name", "rating": "@rating"}}"#)
            .unwrap();

    let result = resolver().process_query(&query, &template.fields()).await.unwrap();

    assert!(result.fully_solved);
    assert_eq!(
        template.render_all(&result.entities),
        json!([
            {"total": 10, "driver": {"name": "ana", "rating": 4.5}},
            {"total": 25, "driver": {"name": "bo"}}
        ])
    );
}

#[tokio::test]
async fn test_missing_rating_excludes_entity() {
    let query = parse_query(r#"{"exists": "@rating"}"#).unwrap();
    let template = ResultTemplate::from_fields(["driver_name"]);

    // o2 has no driver record and o3 records its rating as null.
    let result = resolver().process_query(&query, &template.fields()).await.unwrap();

    assert!(result.fully_solved);
    assert_eq!(template.render_all(&result.entities), json!([{"driver_name": "ana"}]));
}

#[tokio::test]
async fn test_query_on_unserved_field_is_unsolvable() {
    let query = parse_query(r#"{"equal": {"left": "@warehouse", "right": "north"}}"#).unwrap();

    let err = resolver().process_query(&query, &["amount"]).await.unwrap_err();
    assert!(err.is_unsolvable());
}

#[tokio::test]
async fn test_membership_in_list_field() {
    let fixture = r#"{
      "sources": [
        {"name": "shipments", "fields": ["weight"], "mode": "seed",
         "records": {"s1": {"weight": 4}, "s2": {"weight": 12}, "s3": {"weight": 7}}},
        {"name": "handling", "fields": ["tags"],
         "records": {"s1": {"tags": ["cold", "fragile"]}, "s2": {"tags": ["fragile"]}, "s3": {"tags": null}}}
      ]
    }"#;
    let resolver = Resolver::new(load_source_refs(fixture).unwrap(), Default::default());

    let fragile = parse_query(r#"{"in": {"value": "fragile", "values": "@tags"}}"#).unwrap();
    let result = resolver.process_query(&fragile, &["weight", "tags"]).await.unwrap();
    assert!(result.fully_solved);
    assert_eq!(result.ids().map(String::as_str).collect::<Vec<_>>(), vec!["s1", "s2"]);

    // A missing list holds nothing, so s3 is not cold.
    let not_cold = parse_query(r#"{"not_in": {"value": "cold", "values": "@tags"}}"#).unwrap();
    let result = resolver.process_query(&not_cold, &["weight"]).await.unwrap();
    assert_eq!(result.ids().map(String::as_str).collect::<Vec<_>>(), vec!["s2", "s3"]);
}
