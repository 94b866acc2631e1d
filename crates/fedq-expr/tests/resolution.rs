//! Resolution contract for connectives evaluated against partial entities

use fedq_expr::{Comparison, ExprError, Resolution, ValueExpr};
use fedq_types::{Entity, TruthValue, Value, ValueError};
use rstest::rstest;

/// `t` is true, `f` is false, `u` is undefined (missing), `x` is absent
fn entity() -> Entity<&'static str> {
    Entity::new("e")
        .with_field("t", Value::bool(true))
        .with_field("f", Value::bool(false))
        .with_field("u", Value::Missing)
}

fn term(name: &str) -> Comparison {
    Comparison::equal(ValueExpr::field(name), ValueExpr::constant(Value::bool(true)))
}

fn terms(names: &[&str]) -> Vec<Comparison> {
    names.iter().map(|name| term(name)).collect()
}

// ============================================================================
// And / Or / Not
// ============================================================================

#[rstest]
#[case(&["t", "t"], Some(TruthValue::True))]
#[case(&["t", "f"], Some(TruthValue::False))]
#[case(&["x", "f"], Some(TruthValue::False))]
#[case(&["f", "x"], Some(TruthValue::False))]
#[case(&["t", "x"], None)]
#[case(&["u", "x"], None)]
#[case(&["t", "u"], Some(TruthValue::Undefined))]
#[case(&["u", "f"], Some(TruthValue::False))]
#[case(&[], Some(TruthValue::True))]
fn test_and(#[case] names: &[&str], #[case] expected: Option<TruthValue>) {
    let q = Comparison::and(terms(names));
    let e = entity();
    assert_eq!(q.resolve(&e).unwrap().resolved(), expected);
    assert_eq!(q.is_resolvable(&e), expected.is_some());
}

#[rstest]
#[case(&["f", "f"], Some(TruthValue::False))]
#[case(&["t", "f"], Some(TruthValue::True))]
#[case(&["x", "t"], Some(TruthValue::True))]
#[case(&["t", "x"], Some(TruthValue::True))]
#[case(&["f", "x"], None)]
#[case(&["u", "x"], None)]
#[case(&["f", "u"], Some(TruthValue::Undefined))]
#[case(&["u", "t"], Some(TruthValue::True))]
#[case(&[], Some(TruthValue::False))]
fn test_or(#[case] names: &[&str], #[case] expected: Option<TruthValue>) {
    let q = Comparison::or(terms(names));
    let e = entity();
    assert_eq!(q.resolve(&e).unwrap().resolved(), expected);
    assert_eq!(q.is_resolvable(&e), expected.is_some());
}

#[rstest]
#[case("t", Some(TruthValue::False))]
#[case("f", Some(TruthValue::True))]
#[case("u", Some(TruthValue::Undefined))]
#[case("x", None)]
fn test_not(#[case] name: &str, #[case] expected: Option<TruthValue>) {
    let q = Comparison::not(term(name));
    assert_eq!(q.resolve(&entity()).unwrap().resolved(), expected);
}

#[test]
fn test_nested_decision_through_unresolvable_branch() {
    // (x ∨ t) ∧ ¬(x ∧ f) is decided even though x never arrives
    let q = Comparison::and(vec![
        Comparison::or(terms(&["x", "t"])),
        Comparison::not(Comparison::and(terms(&["x", "f"]))),
    ]);
    assert_eq!(q.resolve(&entity()), Ok(Resolution::Resolved(TruthValue::True)));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_type_confusion_surfaces_through_connectives() {
    let q = Comparison::or(vec![
        term("f"),
        Comparison::less(ValueExpr::field("t"), ValueExpr::constant(Value::bool(false))),
    ]);
    assert_eq!(
        q.resolve(&entity()),
        Err(ExprError::Value(ValueError::Unordered {
            kind: fedq_types::ScalarKind::Bool
        }))
    );
}

#[test]
fn test_require_names_the_expression() {
    let q = term("x");
    let err = q.resolve(&entity()).unwrap().require(&q).unwrap_err();
    assert_eq!(err.to_string(), "Tried to resolve an unresolvable expression: @x = true");
}
