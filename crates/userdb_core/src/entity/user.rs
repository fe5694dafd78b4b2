//! The user record.

use crate::types::{unix_millis, UserId};

/// A user stored by id.
///
/// Timestamps are milliseconds since the UNIX epoch. The id is assigned by
/// the store on insert; a freshly built user carries [`UserId::UNASSIGNED`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Creation time.
    pub created_at: u64,
    /// Last modification time.
    pub updated_at: u64,
}

impl User {
    /// Creates an unsaved user stamped with the current time.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = unix_millis();
        Self {
            id: UserId::UNASSIGNED,
            name: name.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy of this user carrying `id`.
    #[must_use]
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    /// Replaces name and email and bumps the modification time.
    pub fn update_info(&mut self, name: impl Into<String>, email: impl Into<String>) {
        self.name = name.into();
        self.email = email.into();
        self.touch();
    }

    /// Bumps the modification time.
    pub fn touch(&mut self) {
        // Never move backwards if the wall clock did.
        self.updated_at = unix_millis().max(self.updated_at);
    }
}
