//! Column identifier resolution.
//!
//! A logical column name from a mapping key goes through three steps:
//!
//! 1. alias substitution (`Config::column_aliases`)
//! 2. dialect quoting, segment by segment (`users.name` → `"users"."name"`)
//! 3. table qualification when the result has no dot and `Config::table` is set
//!
//! # Example
//! ```ignore
//! use sqlwhere::{Config, ident::resolve_column};
//!
//! let cfg = Config::new().with_table("users");
//! assert_eq!(resolve_column("name", &cfg), r#""users"."name""#);
//! ```

use crate::config::Config;

/// Resolve a logical column name into a quoted, possibly qualified identifier.
pub fn resolve_column(name: &str, cfg: &Config) -> String {
    let name = cfg
        .column_aliases
        .get(name)
        .map(String::as_str)
        .unwrap_or(name);
    let column = cfg.dialect.quote_identifier(name);

    match cfg.table.as_deref() {
        Some(table) if !table.is_empty() && !column.contains('.') => {
            let mut out = cfg.dialect.quote_identifier(table);
            out.push('.');
            out.push_str(&column);
            out
        }
        _ => column,
    }
}
