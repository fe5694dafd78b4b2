//! Core type definitions for UserDB.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for a user.
///
/// User IDs are positive, assigned by the store, monotonically increasing
/// and never reused. `0` marks a user that has not been stored yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub u64);

impl UserId {
    /// Placeholder id carried by users that were never inserted.
    pub const UNASSIGNED: Self = Self(0);

    /// Creates a new user ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next user ID, saturating at `u64::MAX`.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns true if this id was assigned by a store.
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Milliseconds since the UNIX epoch.
#[must_use]
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_ordering() {
        let a = UserId::new(1);
        let b = a.next();
        assert!(a < b);
        assert_eq!(b.as_u64(), 2);
    }

    #[test]
    fn unassigned_is_zero() {
        assert!(!UserId::UNASSIGNED.is_assigned());
        assert!(UserId::new(1).is_assigned());
        assert_eq!(UserId::default(), UserId::UNASSIGNED);
    }

    #[test]
    fn next_saturates() {
        assert_eq!(UserId::new(u64::MAX).next(), UserId::new(u64::MAX));
    }

    #[test]
    fn user_id_display() {
        assert_eq!(format!("{}", UserId::new(42)), "user:42");
    }
}
