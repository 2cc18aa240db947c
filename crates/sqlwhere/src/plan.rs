//! Fluent WHERE clause builder.
//!
//! A [`Plan`] accumulates conditions into a top-level conjunction and reduces
//! them on demand. The result is cached until the plan is changed again.
//!
//! # Example
//! ```ignore
//! use sqlwhere::{fields, values, where_};
//!
//! let plan = where_(fields! { "status" => "active" }, vec![])
//!     .or("deleted_at > ?", values!["2024-01-01"]);
//! assert_eq!(plan.sql(), r#"((("status" = ?)) OR (deleted_at > ?))"#);
//! ```

use crate::clause::{Clause, number_placeholders};
use crate::condition::{Built, Input, Node, normalize, normalize_and_reduce};
use crate::config::{AliasMode, Config};
use crate::dialect::Dialect;
use crate::error::{WhereError, WhereResult};
use crate::value::Value;
use std::cell::OnceCell;
use std::collections::HashMap;
use tokio_postgres::types::ToSql;

/// Accumulated conditions plus the configuration they are built with.
#[derive(Debug, Clone)]
pub struct Plan {
    config: Config,
    root: Node,
    /// Error recorded while adding a condition (strict mode only).
    error: Option<WhereError>,
    built: OnceCell<Built>,
    numbered: OnceCell<Clause>,
}

impl Plan {
    /// An empty plan.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            root: Node::bare(),
            error: None,
            built: OnceCell::new(),
            numbered: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The condition tree built so far.
    pub fn root(&self) -> &Node {
        &self.root
    }

    // ==================== Conditions ====================

    /// Add a condition joined with AND.
    pub fn and(mut self, cond: impl Into<Input>, values: Vec<Value>) -> Self {
        if let Some(node) = self.to_node(cond.into(), values, false) {
            self.root.push_child(node);
            self.invalidate();
        }
        self
    }

    /// Wrap everything added so far and the new condition in an OR group.
    pub fn or(mut self, cond: impl Into<Input>, values: Vec<Value>) -> Self {
        if let Some(node) = self.to_node(cond.into(), values, false) {
            let mut previous = std::mem::replace(&mut self.root, Node::bare());
            if let Node::And { bare, .. } = &mut previous {
                *bare = false;
            }
            self.root.push_child(Node::or([previous, node]));
            self.invalidate();
        }
        self
    }

    /// Add a negated condition joined with AND.
    pub fn not(mut self, cond: impl Into<Input>, values: Vec<Value>) -> Self {
        if let Some(node) = self.to_node(cond.into(), values, true) {
            self.root.push_child(node);
            self.invalidate();
        }
        self
    }

    /// Normalize a top-level condition. Invalid input is not added; in strict
    /// mode the error is kept on the plan.
    fn to_node(&mut self, cond: Input, values: Vec<Value>, negate: bool) -> Option<Node> {
        match normalize(cond, values, negate) {
            Ok(node) => Some(node),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "sqlwhere", error = %err, "ignoring invalid condition");
                if self.config.strict {
                    self.error = Some(err);
                    self.invalidate();
                }
                None
            }
        }
    }

    // ==================== Configuration ====================

    /// Qualify unqualified columns with `table`.
    pub fn set_table(mut self, table: impl Into<String>) -> Self {
        self.config.table = Some(table.into());
        self.invalidate();
        self
    }

    pub fn set_column_aliases(mut self, aliases: HashMap<String, String>, mode: AliasMode) -> Self {
        self.config.set_column_aliases(aliases, mode);
        self.invalidate();
        self
    }

    /// Register a hook that handles mapping entries with the key `name`.
    pub fn set_custom_condition<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&str, &Value, &Config) -> Option<Input> + Send + Sync + 'static,
    {
        self.config.set_custom_condition(name, hook);
        self.invalidate();
        self
    }

    fn invalidate(&mut self) {
        self.built.take();
        self.numbered.take();
    }

    // ==================== Output ====================

    /// Reduce the conditions, reusing the previous result when nothing changed.
    pub fn build(&self) -> &Built {
        self.built
            .get_or_init(|| normalize_and_reduce(self.root.clone(), Vec::new(), false, &self.config))
    }

    /// The clause with `?` placeholders, without the `WHERE` keyword.
    pub fn sql(&self) -> &str {
        &self.build().sql
    }

    /// Values for the placeholders, in order.
    pub fn values(&self) -> &[Value] {
        &self.build().values
    }

    /// The first error recorded while adding conditions or building.
    pub fn error(&self) -> Option<&WhereError> {
        self.error.as_ref().or(self.build().error.as_ref())
    }

    /// The clause rendered for PostgreSQL: `$n` placeholders, with lists
    /// bound to `IN (?)` expanded into one parameter per item.
    pub fn numbered(&self) -> &Clause {
        self.numbered
            .get_or_init(|| number_placeholders(self.sql(), self.values(), 0))
    }

    /// The clause with PostgreSQL `$n` placeholders.
    pub fn to_numbered_sql(&self) -> &str {
        &self.numbered().sql
    }

    /// Parameter references for tokio-postgres, matching
    /// [`to_numbered_sql`](Plan::to_numbered_sql).
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.numbered().params_ref()
    }

    /// The built clause, or the first error.
    pub fn into_clause(self) -> WhereResult<Clause> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let built = match self.built.into_inner() {
            Some(built) => built,
            None => normalize_and_reduce(self.root, Vec::new(), false, &self.config),
        };
        built.into_result()
    }
}

impl Default for Plan {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// An empty plan using `config`.
pub fn with_config(config: Config) -> Plan {
    Plan::new(config)
}

/// A plan with one condition and the default configuration.
pub fn where_(cond: impl Into<Input>, values: Vec<Value>) -> Plan {
    Plan::default().and(cond, values)
}

/// A plan with one condition, quoting identifiers for MySQL.
pub fn where_mysql(cond: impl Into<Input>, values: Vec<Value>) -> Plan {
    with_config(Config::new().with_dialect(Dialect::MySql)).and(cond, values)
}

/// A plan with one condition, quoting identifiers for PostgreSQL.
pub fn where_postgres(cond: impl Into<Input>, values: Vec<Value>) -> Plan {
    with_config(Config::new().with_dialect(Dialect::Postgres)).and(cond, values)
}
