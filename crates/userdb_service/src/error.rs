//! Error types for the service layer.

use thiserror::Error;
use userdb_core::StoreError;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by [`UserService`](crate::UserService).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// A request field failed validation. The store was not touched.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Creates an invalid input error.
    pub fn invalid_input(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidInput { field, reason }
    }

    /// Returns true if the targeted user does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }

    /// Returns true if the request was rejected by validation.
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use userdb_core::UserId;

    #[test]
    fn display() {
        let err = ServiceError::invalid_input("name", "must not be empty");
        assert_eq!(err.to_string(), "invalid name: must not be empty");

        let err = ServiceError::from(StoreError::not_found(UserId::new(3)));
        assert_eq!(err.to_string(), "user not found: user:3");
        assert!(err.is_not_found());
        assert!(!err.is_invalid_input());
    }
}
