//! Property tests for the normal-form rewriters.
//!
//! Random comparison trees over three integer fields are evaluated against
//! random partial entities before and after rewriting.

use fedq_expr::{Comparison, Resolution, ValueExpr, to_dnf, to_nnf};
use fedq_types::{Entity, Value};
use proptest::prelude::*;

const FIELDS: [&str; 3] = ["a", "b", "c"];

// ============================================================================
// Generators
// ============================================================================

fn arb_field_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(FIELDS.to_vec())
}

fn arb_field() -> impl Strategy<Value = ValueExpr> {
    arb_field_name().prop_map(|name| ValueExpr::field(name))
}

/// Small integers, so that equal/less hit both outcomes, plus Missing
fn arb_constant() -> impl Strategy<Value = ValueExpr> {
    prop_oneof![
        4 => (0i64..3).prop_map(|v| ValueExpr::constant(Value::int(v))),
        1 => Just(ValueExpr::constant(Value::Missing)),
    ]
}

fn arb_operand() -> impl Strategy<Value = ValueExpr> {
    prop_oneof![arb_constant(), arb_field()]
}

fn arb_leaf() -> impl Strategy<Value = Comparison> {
    prop_oneof![
        (arb_field(), arb_operand()).prop_map(|(a, b)| Comparison::equal(a, b)),
        (arb_field(), arb_operand()).prop_map(|(a, b)| Comparison::not_equal(a, b)),
        (arb_field(), arb_operand()).prop_map(|(a, b)| Comparison::less(a, b)),
        (arb_operand(), arb_field()).prop_map(|(a, b)| Comparison::greater_equal(a, b)),
        (arb_field(), prop::collection::vec(arb_operand(), 0..3))
            .prop_map(|(a, xs)| Comparison::in_list(a, xs)),
        (arb_field(), prop::collection::vec(arb_operand(), 0..3))
            .prop_map(|(a, xs)| Comparison::not_in(a, xs)),
        arb_field_name().prop_map(|name| Comparison::exists(name)),
        arb_field_name().prop_map(|name| Comparison::not_exists(name)),
    ]
}

fn arb_comparison() -> impl Strategy<Value = Comparison> {
    arb_leaf().prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(Comparison::And),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Comparison::Or),
            inner.prop_map(Comparison::not),
        ]
    })
}

/// Absent, present-but-missing, or a value
fn arb_slot() -> impl Strategy<Value = Option<Value>> {
    prop_oneof![
        1 => Just(None),
        1 => Just(Some(Value::Missing)),
        3 => (0i64..3).prop_map(|v| Some(Value::int(v))),
    ]
}

fn build_entity(slots: Vec<Option<Value>>) -> Entity<u32> {
    let mut entity = Entity::new(1);
    for (name, slot) in FIELDS.iter().zip(slots) {
        if let Some(value) = slot {
            entity.add_field(*name, value);
        }
    }
    entity
}

fn arb_entity() -> impl Strategy<Value = Entity<u32>> {
    prop::collection::vec(arb_slot(), FIELDS.len()).prop_map(build_entity)
}

/// An entity where every field is present
fn arb_complete_entity() -> impl Strategy<Value = Entity<u32>> {
    prop::collection::vec(arb_slot().prop_filter("present", Option::is_some), FIELDS.len())
        .prop_map(build_entity)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// NNF is negation-free and agrees with the input on every entity,
    /// including which nodes are still unresolvable.
    #[test]
    fn nnf_preserves_resolution(q in arb_comparison(), e in arb_entity()) {
        let nnf = to_nnf(&q);
        prop_assert!(nnf.is_negation_free());
        prop_assert_eq!(q.resolve(&e), nnf.resolve(&e));
    }

    #[test]
    fn nnf_is_idempotent(q in arb_comparison()) {
        let once = to_nnf(&q);
        prop_assert_eq!(to_nnf(&once), once);
    }

    /// Every DNF clause is a flat conjunction of comparators.
    #[test]
    fn dnf_is_flat(q in arb_comparison()) {
        for clause in to_dnf(&q).clauses() {
            prop_assert!(clause.terms().iter().all(|t| !t.is_compound()));
        }
    }

    /// On complete entities both forms always resolve, to the same value.
    #[test]
    fn dnf_equivalent_on_complete_entities(q in arb_comparison(), e in arb_complete_entity()) {
        let dnf = to_dnf(&q).to_comparison();
        let before = q.resolve(&e).unwrap();
        let after = dnf.resolve(&e).unwrap();
        prop_assert!(before.is_resolved());
        prop_assert_eq!(before, after);
    }

    /// On partial entities the forms agree whenever both are decided.
    #[test]
    fn dnf_equivalent_when_resolved(q in arb_comparison(), e in arb_entity()) {
        let dnf = to_dnf(&q).to_comparison();
        if let (Resolution::Resolved(before), Resolution::Resolved(after)) =
            (q.resolve(&e).unwrap(), dnf.resolve(&e).unwrap())
        {
            prop_assert_eq!(before, after);
        }
    }

    #[test]
    fn dnf_is_idempotent(q in arb_comparison()) {
        let once = to_dnf(&q);
        let twice = to_dnf(&once.to_comparison());
        prop_assert_eq!(twice, once);
    }
}
