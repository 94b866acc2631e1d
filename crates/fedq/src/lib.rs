//! Federated query resolution for Rust
//!
//! fedq answers boolean queries over entities whose fields are spread
//! across several data sources:
//! - Kleene three-valued logic with an explicit missing value
//! - Comparison trees with negation and disjunctive normal forms
//! - A fixed-point resolver that asks sources in rounds until every
//!   clause is decided or no source can make progress
//! - A JSON query DSL, result templates and fixture-backed sources
//!
//! # Example
//!
//! ```ignore
//! use fedq::{Comparison, MemorySource, Resolver, ValueExpr, Value};
//!
//! let orders = MemorySource::seeding("orders", ["amount"])
//!     .with_record(1u32, [("amount", Value::int(10))]);
//! let resolver = Resolver::builder().source(orders).build();
//!
//! let query = Comparison::less(ValueExpr::field("amount"), ValueExpr::constant(Value::int(20)));
//! let result = resolver.process_query(&query, &["amount"]).await?;
//! assert!(result.fully_solved);
//! ```

// Re-export all public APIs from internal crates
pub use fedq_engine as engine;
pub use fedq_expr as expr;
pub use fedq_json as json;
pub use fedq_types as types;

// Convenience re-exports
pub use fedq_engine::{
    CancellationToken, DataSource, MemorySource, QueryResult, ResolveError, ResolveResult, Resolver,
    ResolverBuilder, ResolverConfig, Retrieval, SourceError, SourceMode, SourceRef,
};
pub use fedq_expr::{Clause, Comparison, Dnf, ExprError, ListExpr, Resolution, ValueExpr, to_dnf, to_nnf};
pub use fedq_json::{DslError, QueryParser, ResultTemplate, parse_query};
pub use fedq_types::{Entities, Entity, EntityId, FieldName, Scalar, TruthValue, Value, ValueError};
