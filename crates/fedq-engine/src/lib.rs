//! fedq resolution engine
//!
//! The [`Resolver`] answers a [`Comparison`](fedq_expr::Comparison) query by
//! repeatedly asking a set of [`DataSource`]s for fields until no source can
//! add anything new. No single source needs to understand the whole query.
//!
//! ```ignore
//! let resolver = Resolver::builder()
//!     .source(MemorySource::seeding("orders", ["amount"]).with_record(1, [("amount", Value::int(10))]))
//!     .build();
//! let result = resolver.process_query(&query, &["amount"]).await?;
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod memory;
pub mod resolver;
pub mod source;

pub use cancel::CancellationToken;
pub use config::{DEFAULT_MAX_ROUNDS, ResolverConfig};
pub use error::{ResolveError, ResolveResult};
pub use memory::{MemorySource, SourceMode};
pub use resolver::{QueryResult, Resolver, ResolverBuilder};
pub use source::{DataSource, Retrieval, SourceError, SourceRef};
