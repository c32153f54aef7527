//! Kernel-level error type
//!
//! Wraps the amount and date failures and reports malformed identifiers.

use thiserror::Error;
use crate::money::MoneyError;
use crate::temporal::TemporalError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// Text that is not a `<PREFIX>-<uuid>` or bare uuid identifier
    #[error("invalid {prefix} identifier '{value}'")]
    InvalidIdentifier {
        prefix: &'static str,
        value: String,
    },
}

impl CoreError {
    pub fn invalid_identifier(prefix: &'static str, value: impl Into<String>) -> Self {
        CoreError::InvalidIdentifier {
            prefix,
            value: value.into(),
        }
    }

    /// True for failures caused by caller input rather than arithmetic
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::Temporal(_) | CoreError::InvalidIdentifier { .. }
        )
    }
}
