//! Condition trees: normalization of caller input and reduction to SQL.
//!
//! Input shapes ([`Input`]) are normalized into a [`Node`] tree, which is then
//! reduced into a [`Clause`] with positional `?` placeholders. The polarity is
//! fixed: keys inside one mapping are joined with AND, while items of a list
//! are joined with OR.
//!
//! # Example
//! ```ignore
//! use sqlwhere::{Config, condition::normalize_and_reduce, fields};
//!
//! let built = normalize_and_reduce(
//!     fields! { "amount__gte" => 1000, "status" => "active" },
//!     vec![],
//!     false,
//!     &Config::new(),
//! );
//! assert_eq!(built.sql, r#"("amount" >= ? AND "status" = ?)"#);
//! ```

mod input;
mod node;
mod normalize;
mod reduce;

#[cfg(test)]
mod tests;

pub use input::{Fields, Input};
pub use node::Node;
pub use normalize::normalize;
pub use reduce::Halted;

use crate::clause::Clause;
use crate::config::Config;
use crate::error::{WhereError, WhereResult};
use crate::value::Value;

/// Output of a full normalize + reduce pass.
///
/// On failure (strict mode only) `sql`/`values` hold whatever was built
/// before the failing fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Built {
    pub sql: String,
    pub values: Vec<Value>,
    pub error: Option<WhereError>,
}

impl Built {
    fn from_result(result: Result<Clause, Halted>) -> Self {
        match result {
            Ok(Clause { sql, values }) => Self {
                sql,
                values,
                error: None,
            },
            Err(Halted { partial, error }) => Self {
                sql: partial.sql,
                values: partial.values,
                error: Some(error),
            },
        }
    }

    /// The clause, or the error if the pass failed.
    pub fn into_result(self) -> WhereResult<Clause> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Clause::new(self.sql, self.values)),
        }
    }
}

/// Normalize `input` and reduce it in one pass.
///
/// In lenient mode an input that cannot be normalized yields an empty clause;
/// in strict mode it is reported through [`Built::error`].
pub fn normalize_and_reduce(
    input: impl Into<Input>,
    values: Vec<Value>,
    negate: bool,
    cfg: &Config,
) -> Built {
    let built = match normalize(input.into(), values, negate) {
        Ok(node) => Built::from_result(node.reduce(cfg)),
        Err(error) if cfg.strict => Built {
            error: Some(error),
            ..Built::default()
        },
        Err(_error) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "sqlwhere", error = %_error, "skipping invalid condition");
            Built::default()
        }
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(
        target: "sqlwhere",
        sql = %built.sql,
        param_count = built.values.len(),
        failed = built.error.is_some(),
        "built condition",
    );
    built
}
