//! Query DSL parsing

use chrono::{TimeZone, Utc};
use fedq_expr::{Comparison, ListExpr, ValueExpr};
use fedq_json::{DslError, QueryParser, parse_query};
use fedq_types::Value;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn field(name: &str) -> ValueExpr {
    ValueExpr::field(name)
}

fn int(value: i64) -> ValueExpr {
    ValueExpr::constant(Value::int(value))
}

#[rstest]
#[case::equal(
    r#"{"equal": {"left": "@status", "right": "open"}}"#,
    Comparison::equal(field("status"), ValueExpr::constant(Value::string("open")))
)]
#[case::legacy_operand_names(
    r#"{"not_equal": {"value_a": "@amount", "value_b": 3}}"#,
    Comparison::not_equal(field("amount"), int(3))
)]
#[case::less(
    r#"{"less": {"left": {"field": "amount"}, "right": {"const": {"type": "int", "value": "20"}}}}"#,
    Comparison::less(field("amount"), int(20))
)]
#[case::field_object_with_name(
    r#"{"greater_equal": {"left": {"field": {"name": "amount"}}, "right": 1.5}}"#,
    Comparison::greater_equal(field("amount"), ValueExpr::constant(Value::float(1.5)))
)]
#[case::null_is_missing(
    r#"{"equal": {"left": "@rating", "right": null}}"#,
    Comparison::equal(field("rating"), ValueExpr::constant(Value::Missing))
)]
#[case::range(
    r#"{"range": {"value": "@amount", "from": 5, "to": 20}}"#,
    Comparison::and(vec![
        Comparison::greater_equal(field("amount"), int(5)),
        Comparison::less(field("amount"), int(20)),
    ])
)]
#[case::open_range(
    r#"{"range": {"value": "@amount", "to": 20}}"#,
    Comparison::less(field("amount"), int(20))
)]
#[case::membership(
    r#"{"not_in": {"value": "@amount", "values": [1, "@limit"]}}"#,
    Comparison::not_in(field("amount"), vec![int(1), field("limit")])
)]
#[case::list_field_membership(
    r#"{"in": {"value": "@tag", "values": "@tags"}}"#,
    Comparison::in_list(field("tag"), ListExpr::field("tags"))
)]
#[case::presence(
    r#"{"or": [{"exists": "@rating"}, {"not": {"not_exists": "score"}}]}"#,
    Comparison::or(vec![
        Comparison::exists("rating"),
        Comparison::not(Comparison::not_exists("score")),
    ])
)]
#[case::arithmetic(
    r#"{"less": {"left": {"sum": ["@a", 1]}, "right": {"difference": ["@b", "@c"]}}}"#,
    Comparison::less(
        ValueExpr::sum(field("a"), int(1)),
        ValueExpr::difference(field("b"), field("c")),
    )
)]
#[case::array_root_is_conjunction(
    r#"[{"exists": "@a"}, {"exists": "@b"}]"#,
    Comparison::and(vec![Comparison::exists("a"), Comparison::exists("b")])
)]
fn test_parse(#[case] text: &str, #[case] expected: Comparison) {
    assert_eq!(parse_query(text).unwrap(), expected);
}

#[test]
fn test_time_is_relative_to_clock() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let parser = QueryParser::new().with_clock(now);

    let query = parser
        .parse_str(r#"{"less": {"left": "@created_at", "right": {"time": {"offset": -3600}}}}"#)
        .unwrap();
    assert_eq!(query, Comparison::less(field("created_at"), int(now.timestamp() - 3600)));

    let query = parser
        .parse_str(r#"{"less": {"left": "@created_at", "right": {"time": {"value": 100, "offset": 5}}}}"#)
        .unwrap();
    assert_eq!(query, Comparison::less(field("created_at"), int(105)));
}

#[rstest]
#[case::empty_range(r#"{"range": {"value": "@amount"}}"#)]
#[case::short_sum(r#"{"equal": {"left": {"sum": ["@a"]}, "right": 1}}"#)]
#[case::bad_const(r#"{"equal": {"left": "@a", "right": {"const": {"type": "int", "value": "ten"}}}}"#)]
#[case::bare_prefix(r#"{"exists": "@"}"#)]
#[case::unknown_node(r#"{"between": {"value": "@a"}}"#)]
#[case::not_json("{equal")]
fn test_rejects(#[case] text: &str) {
    assert!(parse_query(text).is_err());
}

#[test]
fn test_error_kinds() {
    assert!(matches!(
        parse_query(r#"{"range": {"value": "@amount"}}"#),
        Err(DslError::EmptyRange)
    ));
    assert!(matches!(
        parse_query(r#"{"equal": {"left": {"difference": [1, 2, 3]}, "right": 1}}"#),
        Err(DslError::Arity { node: "difference", count: 3 })
    ));
    assert!(matches!(parse_query("{equal"), Err(DslError::Json(_))));
}

#[test]
fn test_known_fields_are_enforced() {
    let parser = QueryParser::new().with_known_fields(["amount", "status"]);

    assert!(parser.parse_str(r#"{"exists": "@amount"}"#).is_ok());
    match parser.parse_str(r#"{"equal": {"left": "@amout", "right": 1}}"#) {
        Err(DslError::UnknownField { name }) => assert_eq!(name, "amout"),
        other => panic!("expected an unknown field, got {other:?}"),
    }
}
