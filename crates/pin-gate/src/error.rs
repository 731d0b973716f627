//! Error types for the PIN gate

use std::fmt;

use thiserror::Error;

use crate::policy::ValidationOutcome;
use crate::store::StoreError;

/// Result type alias for gate operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// The user-facing flow an error terminated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// First-time PIN setup
    Setup,
    /// PIN change with old-PIN confirmation
    Reset,
    /// PIN or biometric authentication
    Authentication,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Setup => f.write_str("PIN setup"),
            Flow::Reset => f.write_str("PIN reset"),
            Flow::Authentication => f.write_str("Authentication"),
        }
    }
}

/// Errors that terminate a gate operation
///
/// Validation problems (empty input, mismatches, wrong old PIN) never show up
/// here: they are recovered by re-prompting.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The user cancelled a prompt or the biometric sheet
    #[error("{0} process has been cancelled.")]
    Cancelled(Flow),

    /// Verification failed on every allowed round
    #[error("Attempt limit exceeded.")]
    LimitExceeded,

    /// The stored PIN disappeared while a verification was running
    #[error("PIN hasn't been set up yet.")]
    PinNotSetUp,

    /// The secret store rejected a write or delete
    #[error("Secure store failure: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// The abstract outcome this error reports
    pub fn outcome(&self) -> ValidationOutcome {
        match self {
            AuthError::Cancelled(_) => ValidationOutcome::Cancelled,
            AuthError::LimitExceeded => ValidationOutcome::LimitExceeded,
            AuthError::PinNotSetUp | AuthError::Store(_) => ValidationOutcome::StoreFailure,
        }
    }

    /// True when the user backed out rather than failing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AuthError::Cancelled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_messages() {
        assert_eq!(
            AuthError::Cancelled(Flow::Setup).to_string(),
            "PIN setup process has been cancelled."
        );
        assert_eq!(
            AuthError::Cancelled(Flow::Reset).to_string(),
            "PIN reset process has been cancelled."
        );
        assert_eq!(
            AuthError::Cancelled(Flow::Authentication).to_string(),
            "Authentication process has been cancelled."
        );
    }

    #[test]
    fn test_outcomes() {
        assert_eq!(
            AuthError::Cancelled(Flow::Reset).outcome(),
            ValidationOutcome::Cancelled
        );
        assert_eq!(AuthError::LimitExceeded.outcome(), ValidationOutcome::LimitExceeded);
        assert_eq!(AuthError::PinNotSetUp.outcome(), ValidationOutcome::StoreFailure);
        assert_eq!(
            AuthError::from(StoreError::Status(-34018)).outcome(),
            ValidationOutcome::StoreFailure
        );
        assert!(AuthError::Cancelled(Flow::Setup).is_cancelled());
        assert!(!AuthError::LimitExceeded.is_cancelled());
    }
}
