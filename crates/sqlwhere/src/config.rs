//! Resolution context threaded through normalization and reduction.

use crate::condition::Input;
use crate::dialect::Dialect;
use crate::operator::OperatorRegistry;
use crate::value::Value;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Default separator between a column and its operator name: `field__operator`.
pub const DEFAULT_SEPARATOR: &str = "__";

/// Hook that takes over clause generation for a mapping key.
///
/// It receives the key, its value and the active config, and returns any
/// condition shape accepted by the normalizer. Returning `None` drops the key.
pub type CustomConditionFn = Arc<dyn Fn(&str, &Value, &Config) -> Option<Input> + Send + Sync>;

/// How [`Config::set_column_aliases`] combines new aliases with existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AliasMode {
    /// Replace the whole alias table.
    Overwrite,
    /// Only add aliases whose key is not present yet.
    #[default]
    Append,
    /// Add new aliases and replace existing ones with the same key.
    Write,
}

/// Configuration for building WHERE clauses.
///
/// Read-only while a clause is being built; share it freely across threads.
#[derive(Clone)]
pub struct Config {
    /// Separator between column and operator in mapping keys. Defaults to `"__"`.
    pub separator: String,
    /// Identifier quoting rules. Defaults to PostgreSQL.
    pub dialect: Dialect,
    /// Report malformed fragments instead of silently skipping them.
    pub strict: bool,
    /// Table name prefixed to unqualified columns, e.g. `"users"."name"`.
    pub table: Option<String>,
    /// Column renames applied before quoting, e.g. `{"name": "u.name"}`.
    pub column_aliases: HashMap<String, String>,
    /// Per-key hooks with full control over the generated condition.
    pub custom_conditions: HashMap<String, CustomConditionFn>,
    /// Operators available as key suffixes.
    pub operators: OperatorRegistry,
    /// Visit mapping keys in sorted order (deterministic output for tests and debugging).
    pub sort_keys: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            dialect: Dialect::default(),
            strict: false,
            table: None,
            column_aliases: HashMap::new(),
            custom_conditions: HashMap::new(),
            operators: OperatorRegistry::builtin(),
            sort_keys: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<&String> = self.custom_conditions.keys().collect();
        hooks.sort();
        f.debug_struct("Config")
            .field("separator", &self.separator)
            .field("dialect", &self.dialect)
            .field("strict", &self.strict)
            .field("table", &self.table)
            .field("column_aliases", &self.column_aliases)
            .field("custom_conditions", &hooks)
            .field("operators", &self.operators)
            .field("sort_keys", &self.sort_keys)
            .finish()
    }
}

impl Config {
    /// Create a configuration with defaults (PostgreSQL, `"__"`, lenient).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the column/operator separator. An empty separator is ignored.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        if !separator.is_empty() {
            self.separator = separator;
        }
        self
    }

    /// Set the dialect used for identifier quoting.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Enable or disable strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Qualify unqualified columns with this table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Resolve `column` to `target` (e.g. `"name"` to `"u.name"`) before quoting.
    pub fn with_column_alias(mut self, column: impl Into<String>, target: impl Into<String>) -> Self {
        self.column_aliases.insert(column.into(), target.into());
        self
    }

    /// Register a custom condition hook for a mapping key.
    pub fn with_custom_condition<F>(mut self, key: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&str, &Value, &Config) -> Option<Input> + Send + Sync + 'static,
    {
        self.custom_conditions.insert(key.into(), Arc::new(hook));
        self
    }

    /// Replace the operator registry.
    pub fn with_operators(mut self, operators: OperatorRegistry) -> Self {
        self.operators = operators;
        self
    }

    /// Visit mapping keys in sorted order.
    pub fn with_sorted_keys(mut self, sort: bool) -> Self {
        self.sort_keys = sort;
        self
    }

    /// Combine `aliases` with the current alias table according to `mode`.
    pub fn set_column_aliases(&mut self, aliases: HashMap<String, String>, mode: AliasMode) {
        match mode {
            AliasMode::Overwrite => self.column_aliases = aliases,
            AliasMode::Append => {
                for (key, val) in aliases {
                    self.column_aliases.entry(key).or_insert(val);
                }
            }
            AliasMode::Write => self.column_aliases.extend(aliases),
        }
    }

    /// Insert or replace a custom condition hook.
    pub fn set_custom_condition<F>(&mut self, key: impl Into<String>, hook: F)
    where
        F: Fn(&str, &Value, &Config) -> Option<Input> + Send + Sync + 'static,
    {
        self.custom_conditions.insert(key.into(), Arc::new(hook));
    }
}

/// Serializable subset of [`Config`], suitable for config files.
///
/// Hooks and custom operators are code, so they are registered on the
/// resulting [`Config`] instead.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub separator: Option<String>,
    pub dialect: Dialect,
    pub strict: bool,
    pub table: Option<String>,
    pub column_aliases: HashMap<String, String>,
}

impl From<Settings> for Config {
    fn from(settings: Settings) -> Self {
        let mut config = Config::new()
            .with_dialect(settings.dialect)
            .with_strict(settings.strict);
        if let Some(separator) = settings.separator {
            config = config.with_separator(separator);
        }
        config.table = settings.table.filter(|t| !t.is_empty());
        config.column_aliases = settings.column_aliases;
        config
    }
}
