//! Error types for the user store.

use crate::types::UserId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
///
/// Input validation (empty names, non-positive ids) belongs to the calling
/// layer; the store treats every submitted user as well formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The targeted user does not exist.
    #[error("user not found: {id}")]
    NotFound {
        /// The id that was not found.
        id: UserId,
    },
}

impl StoreError {
    /// Creates a not found error.
    pub fn not_found(id: UserId) -> Self {
        Self::NotFound { id }
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
