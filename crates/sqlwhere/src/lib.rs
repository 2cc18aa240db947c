//! # sqlwhere
//!
//! Build parameterized SQL WHERE clauses from nested condition shapes.
//!
//! ## Features
//!
//! - **Shapes, not strings**: mappings are AND-joined, lists are OR-joined,
//!   raw fragments pass through with their own values
//! - **Django-style keys**: `"amount__gte"`, `"name__icontains"`, `"id__in"`, ...
//! - **Pluggable operators**: extend or replace the [`OperatorRegistry`]
//! - **Custom conditions**: per-key hooks that expand into any condition shape
//! - **Strict or lenient**: surface the first invalid fragment, or drop it
//! - **Dialect quoting**: PostgreSQL, MySQL and SQLite identifiers
//! - **tokio-postgres ready**: [`Value`] implements `ToSql`, and `?`
//!   placeholders can be rendered as `$n`
//!
//! ## Quick start
//!
//! ```ignore
//! use sqlwhere::{fields, values, where_};
//!
//! let plan = where_(fields! { "amount__gte" => 1000, "status" => "active" }, vec![])
//!     .or("archived_at > ?", values!["2024-01-01"]);
//!
//! let sql = format!("SELECT * FROM orders WHERE {}", plan.to_numbered_sql());
//! let rows = client.query(&sql, &plan.params_ref()).await?;
//! ```
//!
//! ## Single pass
//!
//! ```ignore
//! use sqlwhere::{Config, fields, normalize_and_reduce};
//!
//! let built = normalize_and_reduce(
//!     vec![fields! { "a" => 1 }, fields! { "b" => 2 }],
//!     vec![],
//!     false,
//!     &Config::new(),
//! );
//! assert_eq!(built.sql, r#"(("a" = ?) OR ("b" = ?))"#);
//! ```

pub mod clause;
pub mod coerce;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod ident;
pub mod operator;
pub mod plan;
pub mod value;

pub use clause::Clause;
pub use condition::{Built, Fields, Halted, Input, Node, normalize, normalize_and_reduce};
pub use config::{AliasMode, Config, CustomConditionFn, DEFAULT_SEPARATOR, Settings};
pub use dialect::Dialect;
pub use error::{WhereError, WhereResult};
pub use operator::{Operator, OperatorRegistry};
pub use plan::{Plan, where_, where_mysql, where_postgres, with_config};
pub use value::Value;
