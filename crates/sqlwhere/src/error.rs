//! Error types for sqlwhere

use crate::condition::Input;
use crate::value::Value;
use thiserror::Error;

/// Result type alias for sqlwhere operations
pub type WhereResult<T> = Result<T, WhereError>;

/// Error types for condition building
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WhereError {
    /// The condition (or one of its fragments) has a shape or operator that
    /// cannot be turned into SQL.
    #[error("Invalid condition: {input:?} {values:?}")]
    InvalidCondition {
        /// The offending input.
        input: Input,
        /// Values that accompanied the input, if any.
        values: Option<Vec<Value>>,
    },
}

impl WhereError {
    /// Create an invalid condition error without accompanying values
    pub fn invalid(input: impl Into<Input>) -> Self {
        Self::InvalidCondition {
            input: input.into(),
            values: None,
        }
    }

    /// Create an invalid condition error carrying the values that came with it
    pub fn invalid_with(input: impl Into<Input>, values: Vec<Value>) -> Self {
        Self::InvalidCondition {
            input: input.into(),
            values: Some(values),
        }
    }

    /// Check if this is an invalid condition error
    pub fn is_invalid_condition(&self) -> bool {
        matches!(self, Self::InvalidCondition { .. })
    }
}
