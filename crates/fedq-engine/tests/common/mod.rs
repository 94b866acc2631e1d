//! Common test utilities for resolver tests
//!
//! - Fixture sources built on `MemorySource`
//! - Mock sources that stall, fail, sleep or rendezvous
//! - Expression shorthands

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use fedq_engine::MemorySource;
use fedq_expr::{Comparison, ValueExpr};
use fedq_types::Value;

pub fn field(name: &str) -> ValueExpr {
    ValueExpr::field(name)
}

pub fn int(value: i64) -> ValueExpr {
    ValueExpr::constant(Value::int(value))
}

pub fn text(value: &str) -> ValueExpr {
    ValueExpr::constant(Value::string(value))
}

pub fn amount_below(limit: i64) -> Comparison {
    Comparison::less(field("amount"), int(limit))
}

/// Seeds orders 1..=3 with amounts 10, 3 and 25
pub fn orders() -> MemorySource<u32> {
    MemorySource::seeding("orders", ["amount"])
        .with_record(1, [("amount", Value::int(10))])
        .with_record(2, [("amount", Value::int(3))])
        .with_record(3, [("amount", Value::int(25))])
}

/// Knows drivers for orders 1 and 3 only
pub fn drivers() -> MemorySource<u32> {
    MemorySource::decorating("drivers", ["driver_name"])
        .with_record(1, [("driver_name", Value::string("ana"))])
        .with_record(3, [("driver_name", Value::string("bo"))])
}
