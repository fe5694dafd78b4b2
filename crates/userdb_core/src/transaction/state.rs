//! Transaction state.

use crate::entity::User;
use crate::error::{StoreError, StoreResult};
use crate::types::UserId;
use std::collections::{HashMap, HashSet};

/// A detached, mutable snapshot of the store.
///
/// Holds its own copy of every user plus the id counter as observed when it
/// was begun. Operations mirror [`EntityStore`](crate::EntityStore) and run
/// without any locking. Hand it to
/// [`EntityStore::commit`](crate::EntityStore::commit) to merge or
/// [`EntityStore::rollback`](crate::EntityStore::rollback) to discard;
/// dropping it is equivalent to a rollback.
#[derive(Debug, Clone)]
#[must_use = "a transaction does nothing unless committed"]
pub struct Transaction {
    /// Private copy of the users.
    users: HashMap<UserId, User>,
    /// Ids deleted in this transaction, removed from the live store on commit.
    deleted: HashSet<UserId>,
    /// Next id to allocate, continuing from the captured counter.
    next_id: UserId,
}

impl Transaction {
    pub(crate) fn new(users: HashMap<UserId, User>, next_id: UserId) -> Self {
        Self {
            users,
            deleted: HashSet::new(),
            next_id,
        }
    }

    /// Returns all users in the transaction's copy.
    #[must_use]
    pub fn get_all(&self) -> Vec<User> {
        self.users.values().cloned().collect()
    }

    /// Iterates over the users without cloning.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Returns the user with `id`, if present.
    #[must_use]
    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Returns a mutable reference to the user with `id`, if present.
    pub fn get_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    /// Inserts a user under the next id and returns it.
    pub fn create(&mut self, mut user: User) -> UserId {
        let id = self.allocate();
        user.id = id;
        self.users.insert(id, user);
        id
    }

    /// Inserts users under contiguous ids in input order.
    pub fn bulk_create<I>(&mut self, users: I) -> Vec<UserId>
    where
        I: IntoIterator<Item = User>,
    {
        users.into_iter().map(|user| self.create(user)).collect()
    }

    /// Replaces an existing user wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no user with `user.id` exists in
    /// this transaction.
    pub fn update(&mut self, user: User) -> StoreResult<()> {
        match self.users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(StoreError::not_found(user.id)),
        }
    }

    /// Deletes a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no user with `id` exists in this
    /// transaction.
    pub fn delete(&mut self, id: UserId) -> StoreResult<()> {
        if self.users.remove(&id).is_none() {
            return Err(StoreError::not_found(id));
        }
        self.deleted.insert(id);
        Ok(())
    }

    /// Returns the users matching `predicate`.
    pub fn search<F>(&self, predicate: F) -> Vec<User>
    where
        F: Fn(&User) -> bool,
    {
        self.users
            .values()
            .filter(|user| predicate(user))
            .cloned()
            .collect()
    }

    /// Returns true if a user with `id` exists in this transaction.
    #[must_use]
    pub fn contains(&self, id: UserId) -> bool {
        self.users.contains_key(&id)
    }

    /// Returns the number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns true if the transaction holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Returns the next id this transaction would allocate.
    #[must_use]
    pub fn next_id(&self) -> UserId {
        self.next_id
    }

    /// Returns the number of users deleted in this transaction.
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.deleted.len()
    }

    pub(crate) fn into_parts(self) -> (HashMap<UserId, User>, HashSet<UserId>, UserId) {
        (self.users, self.deleted, self.next_id)
    }

    fn allocate(&mut self) -> UserId {
        let id = self.next_id;
        self.next_id = id.next();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_txn() -> Transaction {
        Transaction::new(HashMap::new(), UserId::new(1))
    }

    #[test]
    fn create_allocates_from_captured_counter() {
        let mut txn = Transaction::new(HashMap::new(), UserId::new(10));

        let id = txn.create(User::new("Alice", "alice@example.com"));

        assert_eq!(id, UserId::new(10));
        assert_eq!(txn.next_id(), UserId::new(11));
        assert_eq!(txn.get(id).map(|u| u.id), Some(id));
    }

    #[test]
    fn bulk_create_is_contiguous() {
        let mut txn = create_txn();
        let ids = txn.bulk_create(vec![
            User::new("P", "p@x.com"),
            User::new("Q", "q@x.com"),
            User::new("R", "r@x.com"),
        ]);
        assert_eq!(ids, vec![UserId::new(1), UserId::new(2), UserId::new(3)]);
        assert_eq!(txn.len(), 3);
    }

    #[test]
    fn update_missing_is_not_found() {
        let mut txn = create_txn();
        let err = txn
            .update(User::new("X", "x@x.com").with_id(UserId::new(5)))
            .unwrap_err();
        assert_eq!(err, StoreError::not_found(UserId::new(5)));
        assert!(txn.is_empty());
    }

    #[test]
    fn update_replaces_wholesale() {
        let mut txn = create_txn();
        let id = txn.create(User::new("Alice", "alice@example.com"));

        txn.update(User::new("Alicia", "alicia@example.com").with_id(id))
            .unwrap();

        let user = txn.get(id).unwrap();
        assert_eq!(user.name, "Alicia");
        assert_eq!(user.email, "alicia@example.com");
    }

    #[test]
    fn delete_tracks_tombstone() {
        let mut txn = create_txn();
        let id = txn.create(User::new("Alice", "alice@example.com"));

        txn.delete(id).unwrap();

        assert!(!txn.contains(id));
        assert_eq!(txn.delete_count(), 1);
        assert!(txn.delete(id).unwrap_err().is_not_found());
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut txn = create_txn();
        let id = txn.create(User::new("Alice", "alice@example.com"));

        if let Some(user) = txn.get_mut(id) {
            user.update_info("Al", "al@example.com");
        }

        assert_eq!(txn.get(id).unwrap().name, "Al");
    }

    #[test]
    fn search_filters() {
        let mut txn = create_txn();
        txn.create(User::new("Alice", "alice@example.com"));
        txn.create(User::new("Bob", "bob@other.org"));

        let found = txn.search(|u| u.email.ends_with("@example.com"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Alice");
        assert_eq!(txn.iter().count(), 2);
    }
}
