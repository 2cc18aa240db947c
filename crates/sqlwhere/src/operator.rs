//! Operator catalog for `column__operator` mapping keys.
//!
//! An [`Operator`] turns a quoted column and a value into a [`Clause`]. It
//! either fills a template (`"{column} {operator} ?"` by default) with an
//! optionally transformed value, delegates to a custom builder, or points at
//! another operator by name.
//!
//! # Example
//! ```ignore
//! use sqlwhere::{Config, Operator, OperatorRegistry};
//!
//! let ops = OperatorRegistry::builtin()
//!     .with("ne", Operator::alias_of("notexact"))
//!     .with("regex", Operator::symbol("~"));
//! let cfg = Config::new().with_operators(ops);
//! ```

use crate::clause::Clause;
use crate::coerce::{to_date_text, to_list, to_range_bound, to_text, to_wire};
use crate::config::Config;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Template used when an operator does not set one.
pub const DEFAULT_TEMPLATE: &str = "{column} {operator} ?";
/// Symbol used when an operator does not set one.
pub const DEFAULT_SYMBOL: &str = "=";

/// Maximum number of alias hops followed before giving up.
const MAX_ALIAS_DEPTH: usize = 16;

const LOWER_TEMPLATE: &str = "LOWER({column}) {operator} LOWER(?)";

/// Builds the whole clause for an operator: `(quoted column, raw value, config)`.
pub type CustomBuildFn = Arc<dyn Fn(&str, &Value, &Config) -> Clause + Send + Sync>;

/// Rewrites the value before it is bound by the template path.
pub type ModValueFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A rule for turning `(column, value)` into a comparison fragment.
#[derive(Clone, Default)]
pub struct Operator {
    alias_of: Option<String>,
    symbol: Option<String>,
    template: Option<String>,
    custom_build: Option<CustomBuildFn>,
    mod_value: Option<ModValueFn>,
}

static DEFAULT_OPERATOR: Operator = Operator {
    alias_of: None,
    symbol: None,
    template: None,
    custom_build: None,
    mod_value: None,
};

impl Operator {
    /// Plain `column = ?` operator.
    pub fn new() -> Self {
        Self::default()
    }

    /// `column <symbol> ?` operator.
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    /// Operator that resolves to another registered operator.
    pub fn alias_of(name: impl Into<String>) -> Self {
        Self {
            alias_of: Some(name.into()),
            ..Self::default()
        }
    }

    /// Operator with a fully custom builder. Symbol, template and value
    /// transform are ignored.
    pub fn custom<F>(build: F) -> Self
    where
        F: Fn(&str, &Value, &Config) -> Clause + Send + Sync + 'static,
    {
        Self {
            custom_build: Some(Arc::new(build)),
            ..Self::default()
        }
    }

    /// Set the clause template. It must contain `{column}`, `{operator}` and
    /// exactly one `?`.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Transform the value before binding it.
    pub fn with_mod_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.mod_value = Some(Arc::new(f));
        self
    }

    /// Name of the operator this one points at, if it is an alias.
    pub fn aliased(&self) -> Option<&str> {
        self.alias_of.as_deref()
    }

    /// Build the clause for a quoted column and a raw value.
    pub fn build(&self, column: &str, value: &Value, cfg: &Config) -> Clause {
        if let Some(build) = &self.custom_build {
            return build(column, value, cfg);
        }

        let symbol = self.symbol.as_deref().unwrap_or(DEFAULT_SYMBOL);
        let template = self.template.as_deref().unwrap_or(DEFAULT_TEMPLATE);
        let value = match &self.mod_value {
            Some(f) => f(value),
            None => value.clone(),
        };

        let sql = template
            .replace("{operator}", symbol)
            .replace("{column}", column);
        Clause::new(sql, vec![to_wire(&value)])
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operator")
            .field("alias_of", &self.alias_of)
            .field("symbol", &self.symbol)
            .field("template", &self.template)
            .field("custom_build", &self.custom_build.is_some())
            .field("mod_value", &self.mod_value.is_some())
            .finish()
    }
}

// ==================== Built-in operators ====================

fn like(template: Option<&str>, pattern: fn(String) -> String) -> Operator {
    let op = Operator::symbol("LIKE").with_mod_value(move |v| Value::Text(pattern(to_text(v))));
    match template {
        Some(t) => op.with_template(t),
        None => op,
    }
}

/// Take the first two endpoints of a range value.
fn range_endpoints(value: &Value) -> Option<(&Value, &Value)> {
    match value.as_list()? {
        [from, to, ..] => Some((from, to)),
        _ => None,
    }
}

fn between(column: &str, value: &Value, _cfg: &Config) -> Clause {
    match range_endpoints(value) {
        Some((from, to)) => Clause::new(
            format!("{column} BETWEEN ? AND ?"),
            vec![to_range_bound(from), to_range_bound(to)],
        ),
        None => Clause::empty(),
    }
}

fn date_between(column: &str, value: &Value, _cfg: &Config) -> Clause {
    match range_endpoints(value) {
        Some((from, to)) => Clause::new(
            format!("DATE({column}) BETWEEN ? AND ?"),
            vec![
                Value::Text(to_date_text(from)),
                Value::Text(to_date_text(to)),
            ],
        ),
        None => Clause::empty(),
    }
}

fn is_null(column: &str, value: &Value, _cfg: &Config) -> Clause {
    let test = match value.as_bool() {
        Some(false) => "IS NOT NULL",
        _ => "IS NULL",
    };
    Clause::new(format!("{column} {test}"), Vec::new())
}

/// Named catalog of operators.
#[derive(Clone)]
pub struct OperatorRegistry {
    ops: HashMap<String, Operator>,
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

impl OperatorRegistry {
    /// A registry without any operators.
    pub fn empty() -> Self {
        Self {
            ops: HashMap::new(),
        }
    }

    /// The built-in operators.
    pub fn builtin() -> Self {
        Self::empty()
            .with("exact", Operator::new())
            .with("iexact", Operator::new().with_template(LOWER_TEMPLATE))
            .with("notexact", Operator::symbol("<>"))
            .with(
                "inotexact",
                Operator::symbol("<>").with_template(LOWER_TEMPLATE),
            )
            .with("gt", Operator::symbol(">"))
            .with("lt", Operator::symbol("<"))
            .with("gte", Operator::symbol(">="))
            .with("lte", Operator::symbol("<="))
            .with("startswith", like(None, |s| format!("{s}%")))
            .with("istartswith", like(Some(LOWER_TEMPLATE), |s| format!("{s}%")))
            .with("endswith", like(None, |s| format!("%{s}")))
            .with("iendswith", like(Some(LOWER_TEMPLATE), |s| format!("%{s}")))
            .with("contains", like(None, |s| format!("%{s}%")))
            .with("icontains", like(Some(LOWER_TEMPLATE), |s| format!("%{s}%")))
            .with(
                "in",
                Operator::symbol("IN")
                    .with_template("{column} {operator} (?)")
                    .with_mod_value(to_list),
            )
            .with(
                "date",
                Operator::new()
                    .with_template("DATE({column}) {operator} ?")
                    .with_mod_value(|v| Value::Text(to_date_text(v))),
            )
            .with("between", Operator::custom(between))
            .with("datebetween", Operator::custom(date_between))
            .with("isnull", Operator::custom(is_null))
    }

    /// Add or replace an operator, builder style.
    pub fn with(mut self, name: impl Into<String>, op: Operator) -> Self {
        self.insert(name, op);
        self
    }

    /// Add or replace an operator.
    pub fn insert(&mut self, name: impl Into<String>, op: Operator) {
        self.ops.insert(name.into(), op);
    }

    /// Remove an operator, returning it if present.
    pub fn remove(&mut self, name: &str) -> Option<Operator> {
        self.ops.remove(name)
    }

    /// Merge another registry into this one; its operators win on conflicts.
    pub fn merge(mut self, other: OperatorRegistry) -> Self {
        self.ops.extend(other.ops);
        self
    }

    /// Registered operator names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Look up an operator by name, following aliases.
    ///
    /// An alias whose target is not registered resolves to the alias entry
    /// itself, which builds as plain `=` unless it sets its own symbol or
    /// template. Returns `None` for unknown names and for alias chains deeper
    /// than the supported limit (which includes cycles).
    pub fn get(&self, name: &str) -> Option<&Operator> {
        let mut op = self.ops.get(name)?;
        for _ in 0..=MAX_ALIAS_DEPTH {
            let Some(target) = op.alias_of.as_deref() else {
                return Some(op);
            };
            match self.ops.get(target) {
                Some(next) => op = next,
                None => return Some(op),
            }
        }
        #[cfg(feature = "tracing")]
        tracing::warn!(
            target: "sqlwhere",
            operator = name,
            max_depth = MAX_ALIAS_DEPTH,
            "operator alias chain too deep (cycle?), treating as unknown",
        );
        None
    }

    /// Pick an operator from the shape of a value: `isnull` for null, `in`
    /// for lists, and `exact` otherwise.
    pub fn infer(&self, value: &Value) -> Option<&Operator> {
        match value {
            Value::Null => self.get("isnull"),
            Value::List(_) => self.get("in"),
            _ => Some(self.get("exact").unwrap_or(&DEFAULT_OPERATOR)),
        }
    }
}
