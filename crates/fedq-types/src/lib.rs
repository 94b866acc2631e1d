//! fedq value model
//!
//! This crate defines the leaf types shared by every fedq layer:
//! - `TruthValue`: Kleene three-valued logic (true, false, undefined)
//! - `Scalar` / `Value`: comparable primitives, scalar lists and an explicit `Missing`
//! - `Entity` / `Entities`: partial records keyed by an opaque identity
//!
//! # Missing data
//!
//! Missing data never raises an error. Comparing against `Value::Missing`
//! yields `TruthValue::Undefined` and arithmetic with it yields
//! `Value::Missing`. Errors are reserved for type confusion, such as
//! comparing an integer with a string.

pub mod entity;
pub mod error;
pub mod truth;
pub mod value;

pub use entity::{Entities, Entity, EntityId, FieldName, FieldState};
pub use error::{ValueError, ValueResult};
pub use truth::TruthValue;
pub use value::{Scalar, ScalarKind, Value};
