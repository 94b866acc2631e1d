//! JSON collaborators for fedq
//!
//! - [`query`]: a JSON query DSL parsed into `Comparison` trees
//! - [`schema`]: result templates that pick and nest resolved fields
//! - [`source`]: fixture documents loaded as in-memory sources
//!
//! # Example
//!
//! ```ignore
//! use fedq_engine::Resolver;
//! use fedq_json::{QueryParser, ResultTemplate, load_source_refs};
//!
//! let query = QueryParser::new().parse_str(r#"{"less": {"left": "@amount", "right": 20}}"#)?;
//! let template = ResultTemplate::parse_str(r#"{"total": "@amount"}"#)?;
//! let resolver = Resolver::new(load_source_refs(&fixture)?, Default::default());
//!
//! let result = resolver.process_query(&query, &template.fields()).await?;
//! println!("{}", template.render_all(&result.entities));
//! ```

pub mod error;
pub mod query;
pub mod schema;
pub mod source;

pub use error::{DslError, DslResult};
pub use query::{FIELD_PREFIX, QueryParser, parse_query};
pub use schema::{ResultTemplate, TemplateNode};
pub use source::{load_source_refs, load_sources, load_sources_from_path};
