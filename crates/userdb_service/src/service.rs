//! User service.

use crate::error::{ServiceError, ServiceResult};
use std::sync::Arc;
use tracing::debug;
use userdb_core::{EntityStore, StatsSnapshot, StoreError, User, UserId};

/// Validating facade over a shared [`EntityStore`].
///
/// Ids are accepted as signed integers, the way they arrive from a parsed
/// request path, and mapped to [`UserId`] only once they are known to be
/// positive.
#[derive(Debug, Clone)]
pub struct UserService {
    store: Arc<EntityStore>,
}

impl UserService {
    /// Creates a service over `store`.
    pub fn new(store: Arc<EntityStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// Returns every user.
    pub fn list_users(&self) -> Vec<User> {
        self.store.get_all()
    }

    /// Returns the user with `id`. Non-positive ids are never found.
    pub fn get_user(&self, id: i64) -> Option<User> {
        let id = positive_id(id).ok()?;
        self.store.get_by_id(id)
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] if `name` or `email` is blank.
    pub fn create_user(&self, name: &str, email: &str) -> ServiceResult<User> {
        validate_fields(name, email)?;
        let user = User::new(name, email);
        let id = self.store.create(user.clone());
        debug!(%id, "user created");
        Ok(user.with_id(id))
    }

    /// Creates several users with contiguous ids.
    ///
    /// Every pair is validated first; if any is rejected nothing is created.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for the first blank field.
    pub fn create_users<N, E>(&self, entries: &[(N, E)]) -> ServiceResult<Vec<User>>
    where
        N: AsRef<str>,
        E: AsRef<str>,
    {
        for (name, email) in entries {
            validate_fields(name.as_ref(), email.as_ref())?;
        }

        let users: Vec<User> = entries
            .iter()
            .map(|(name, email)| User::new(name.as_ref(), email.as_ref()))
            .collect();
        let ids = self.store.bulk_create(users.clone());

        Ok(users
            .into_iter()
            .zip(ids)
            .map(|(user, id)| user.with_id(id))
            .collect())
    }

    /// Changes a user's name and email, keeping its creation time.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for a non-positive id or blank
    /// field, and a not found store error if the user does not exist.
    pub fn update_user(&self, id: i64, name: &str, email: &str) -> ServiceResult<User> {
        let id = positive_id(id)?;
        validate_fields(name, email)?;

        let mut user = self
            .store
            .get_by_id(id)
            .ok_or(StoreError::not_found(id))?;
        user.update_info(name, email);
        self.store.update(user.clone())?;
        Ok(user)
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidInput`] for a non-positive id and a not
    /// found store error if the user does not exist.
    pub fn delete_user(&self, id: i64) -> ServiceResult<()> {
        let id = positive_id(id)?;
        self.store.delete(id)?;
        Ok(())
    }

    /// Returns the users matching `predicate`.
    pub fn search_users<F>(&self, predicate: F) -> Vec<User>
    where
        F: Fn(&User) -> bool,
    {
        self.store.search_by_condition(predicate)
    }

    /// Returns the users whose email is at `domain`, ignoring case.
    pub fn find_by_email_domain(&self, domain: &str) -> Vec<User> {
        let suffix = format!("@{}", domain.trim_start_matches('@').to_ascii_lowercase());
        self.store
            .search_by_condition(|user| user.email.to_ascii_lowercase().ends_with(&suffix))
    }

    /// Returns store usage statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.store.stats()
    }
}

fn positive_id(id: i64) -> ServiceResult<UserId> {
    u64::try_from(id)
        .ok()
        .filter(|raw| *raw > 0)
        .map(UserId::new)
        .ok_or(ServiceError::invalid_input("id", "must be positive"))
}

fn validate_fields(name: &str, email: &str) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::invalid_input("name", "must not be empty"));
    }
    if email.trim().is_empty() {
        return Err(ServiceError::invalid_input("email", "must not be empty"));
    }
    Ok(())
}
