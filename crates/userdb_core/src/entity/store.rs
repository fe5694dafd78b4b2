//! Entity store for CRUD operations.

use crate::config::StoreConfig;
use crate::entity::User;
use crate::error::{StoreError, StoreResult};
use crate::lock::LockManager;
use crate::stats::{StatsSnapshot, StoreStats};
use crate::transaction::Transaction;
use crate::types::UserId;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace};

/// One stored user. The map owns the slot, the cell guards the value.
type UserCell = Arc<RwLock<User>>;

/// Users plus the id counter, guarded together by the whole-map lock.
#[derive(Debug)]
struct StoreState {
    users: HashMap<UserId, UserCell>,
    /// Strictly greater than every id ever issued.
    next_id: UserId,
}

impl StoreState {
    fn cell(&self, id: UserId) -> Option<UserCell> {
        self.users.get(&id).map(Arc::clone)
    }

    fn insert(&mut self, id: UserId, user: User) {
        self.users.insert(id, Arc::new(RwLock::new(user)));
    }
}

/// Concurrent in-memory user store.
///
/// ## Locking
///
/// Two tiers, both private:
/// - The whole-map lock guards the map's structure and id allocation. It
///   is held shared by `get_all` and `search_by_condition`, exclusively by
///   `create`, `bulk_create`, `delete` and `commit`.
/// - A per-user lock orders every `get_by_id`, `update` and `delete` on the
///   same id without blocking other ids. `get_by_id` and `update` take the
///   whole-map lock shared, and only long enough to find the user's cell.
///
/// Each stored value sits in its own cell lock, so an update rewrites one
/// user while scans of the map keep running.
///
/// Lock order is per-user lock, then whole-map lock, then value cell, then
/// lock registry.
///
/// `get_all` is not ordered against per-user writes on other ids and may
/// observe a mix of old and new values. Use a [`Transaction`] when a fully
/// consistent view is needed.
#[derive(Debug)]
pub struct EntityStore {
    state: RwLock<StoreState>,
    locks: LockManager,
    stats: StoreStats,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Creates an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            state: RwLock::new(StoreState {
                users: HashMap::with_capacity(config.initial_capacity),
                next_id: config.effective_first_id(),
            }),
            locks: LockManager::new(),
            stats: StoreStats::new(config.track_stats),
        }
    }

    /// Returns every user, in no particular order.
    pub fn get_all(&self) -> Vec<User> {
        let start = Instant::now();
        let state = self.state.read();
        let waited = start.elapsed();

        let users: Vec<User> = state.users.values().map(|cell| cell.read().clone()).collect();
        drop(state);

        self.stats.record_read(waited);
        trace!(count = users.len(), "get_all");
        users
    }

    /// Returns the user with `id`, or `None` if absent.
    pub fn get_by_id(&self, id: UserId) -> Option<User> {
        let start = Instant::now();
        let lock = self.locks.get(id);
        let _guard = lock.read();
        let state = self.state.read();
        let waited = start.elapsed();

        let cell = state.cell(id);
        drop(state);
        let user = cell.map(|cell| cell.read().clone());

        self.stats.record_read(waited);
        trace!(%id, found = user.is_some(), "get_by_id");
        user
    }

    /// Inserts a user under the next id and returns that id.
    ///
    /// Any id the caller put on `user` is overwritten.
    pub fn create(&self, mut user: User) -> UserId {
        let start = Instant::now();
        let mut state = self.state.write();
        let waited = start.elapsed();

        let id = state.next_id;
        state.next_id = id.next();
        user.id = id;
        state.insert(id, user);
        self.locks.ensure([id]);
        drop(state);

        self.stats.record_write(waited);
        debug!(%id, "created user");
        id
    }

    /// Replaces an existing user wholesale. Last writer wins.
    ///
    /// Only the user's own locks are held exclusively; scans and
    /// operations on other ids are not blocked.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `user.id` is not present; the
    /// store is left unchanged.
    pub fn update(&self, user: User) -> StoreResult<()> {
        let id = user.id;
        let start = Instant::now();
        let lock = self.locks.get(id);
        let _guard = lock.write();
        let state = self.state.read();
        let waited = start.elapsed();

        let cell = state.cell(id);
        drop(state);

        let result = match cell {
            Some(cell) => {
                *cell.write() = user;
                Ok(())
            }
            None => Err(StoreError::not_found(id)),
        };

        self.stats.record_write(waited);
        debug!(%id, ok = result.is_ok(), "update");
        result
    }

    /// Deletes a user.
    ///
    /// The user's lock entry stays in the registry until
    /// [`cleanup`](Self::cleanup) runs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` is not present.
    pub fn delete(&self, id: UserId) -> StoreResult<()> {
        let start = Instant::now();
        let lock = self.locks.get(id);
        let _guard = lock.write();
        let mut state = self.state.write();
        let waited = start.elapsed();

        let result = match state.users.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(id)),
        };
        drop(state);

        self.stats.record_write(waited);
        debug!(%id, ok = result.is_ok(), "delete");
        result
    }

    /// Inserts users under one exclusive acquisition.
    ///
    /// The returned ids are contiguous and match the input order.
    pub fn bulk_create<I>(&self, users: I) -> Vec<UserId>
    where
        I: IntoIterator<Item = User>,
    {
        let users = users.into_iter();
        let start = Instant::now();
        let mut state = self.state.write();
        let waited = start.elapsed();

        let mut ids = Vec::with_capacity(users.size_hint().0);
        for mut user in users {
            let id = state.next_id;
            state.next_id = id.next();
            user.id = id;
            state.insert(id, user);
            ids.push(id);
        }
        self.locks.ensure(ids.iter().copied());
        drop(state);

        self.stats.record_write(waited);
        debug!(count = ids.len(), "bulk created users");
        ids
    }

    /// Returns every user for which `predicate` is true.
    ///
    /// The predicate runs under the whole-map shared lock and must not call
    /// back into this store.
    pub fn search_by_condition<F>(&self, predicate: F) -> Vec<User>
    where
        F: Fn(&User) -> bool,
    {
        let start = Instant::now();
        let state = self.state.read();
        let waited = start.elapsed();

        let matches: Vec<User> = state
            .users
            .values()
            .filter_map(|cell| {
                let user = cell.read();
                predicate(&user).then(|| user.clone())
            })
            .collect();
        drop(state);

        self.stats.record_read(waited);
        trace!(matches = matches.len(), "search_by_condition");
        matches
    }

    /// Removes lock entries for users that no longer exist.
    ///
    /// Entries whose handle is still held by an in-flight operation are
    /// kept. Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let state = self.state.read();
        let removed = self
            .locks
            .remove_unused(|id| state.users.contains_key(&id));
        drop(state);

        self.stats.record_cleanup();
        debug!(removed, remaining = self.locks.len(), "lock cleanup");
        removed
    }

    /// Takes a detached copy of every user and the id counter.
    pub fn begin_transaction(&self) -> Transaction {
        let state = self.state.read();
        let users = state
            .users
            .iter()
            .map(|(id, cell)| (*id, cell.read().clone()))
            .collect();
        let txn = Transaction::new(users, state.next_id);
        drop(state);

        self.stats.record_transaction_begin();
        trace!(users = txn.len(), "transaction begun");
        txn
    }

    /// Merges a transaction into the live store.
    ///
    /// Every user in the transaction's copy is inserted or replaced, every
    /// user it deleted is removed, and the id counter becomes the larger of
    /// the live and transaction counters. No conflict detection is done:
    /// live changes made since the transaction began are overwritten.
    pub fn commit(&self, txn: Transaction) {
        let (users, deleted, txn_next_id) = txn.into_parts();
        let written = users.len();

        let mut state = self.state.write();
        for id in &deleted {
            state.users.remove(id);
        }
        for (id, user) in users {
            // Write through existing cells so an update racing the commit
            // never lands in a cell the map no longer holds.
            match state.users.entry(id) {
                Entry::Occupied(slot) => *slot.get().write() = user,
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(RwLock::new(user)));
                }
            }
        }
        // Never lower the counter, or ids issued meanwhile could be reused.
        state.next_id = state.next_id.max(txn_next_id);
        drop(state);

        self.stats.record_transaction_commit();
        debug!(written, deleted = deleted.len(), "transaction committed");
    }

    /// Discards a transaction. The live store is not touched.
    pub fn rollback(&self, txn: Transaction) {
        drop(txn);
        self.stats.record_transaction_rollback();
        trace!("transaction rolled back");
    }

    /// Runs `f` inside a transaction.
    ///
    /// If `f` returns `Ok`, the transaction is committed.
    /// If it returns `Err`, the transaction is rolled back and the error
    /// is returned unchanged.
    pub fn transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction) -> Result<T, E>,
    {
        let mut txn = self.begin_transaction();
        match f(&mut txn) {
            Ok(result) => {
                self.commit(txn);
                Ok(result)
            }
            Err(e) => {
                self.rollback(txn);
                Err(e)
            }
        }
    }

    /// Returns true if a user with `id` exists.
    pub fn contains(&self, id: UserId) -> bool {
        self.state.read().users.contains_key(&id)
    }

    /// Returns the number of users.
    pub fn len(&self) -> usize {
        self.state.read().users.len()
    }

    /// Returns true if the store holds no users.
    pub fn is_empty(&self) -> bool {
        self.state.read().users.is_empty()
    }

    /// Returns the id the next insert will receive.
    pub fn next_id(&self) -> UserId {
        self.state.read().next_id
    }

    /// Returns a snapshot of the usage statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    #[cfg(test)]
    pub(crate) fn lock_count(&self) -> usize {
        self.locks.len()
    }

    #[cfg(test)]
    pub(crate) fn has_lock(&self, id: UserId) -> bool {
        self.locks.contains(id)
    }
}
