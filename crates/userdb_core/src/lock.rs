//! Per-user lock registry.

use crate::types::UserId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared handle to a single user's reader-writer lock.
pub(crate) type UserLock = Arc<RwLock<()>>;

/// Lazily creates and hands out one reader-writer lock per user id.
///
/// At most one lock handle exists per id at any time, including under
/// concurrent first access. Entries may outlive their user and are
/// reclaimed by [`remove_unused`](Self::remove_unused).
///
/// Handles are reference counted: an entry is only ever removed while the
/// registry itself is the sole owner, so a caller holding (or waiting on)
/// a handle can never race a later caller onto a different lock object for
/// the same id.
#[derive(Debug, Default)]
pub(crate) struct LockManager {
    locks: RwLock<HashMap<UserId, UserLock>>,
}

impl LockManager {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `id`, creating it on first access.
    pub(crate) fn get(&self, id: UserId) -> UserLock {
        if let Some(lock) = self.locks.read().get(&id) {
            return Arc::clone(lock);
        }

        // Re-check under the exclusive guard: another caller may have
        // installed the lock since the shared lookup.
        let mut locks = self.locks.write();
        Arc::clone(locks.entry(id).or_insert_with(|| Arc::new(RwLock::new(()))))
    }

    /// Makes sure a lock exists for every id, keeping existing handles.
    pub(crate) fn ensure<I>(&self, ids: I)
    where
        I: IntoIterator<Item = UserId>,
    {
        let mut locks = self.locks.write();
        for id in ids {
            locks.entry(id).or_insert_with(|| Arc::new(RwLock::new(())));
        }
    }

    /// Removes entries whose id is not live and whose handle nobody holds.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn remove_unused<F>(&self, is_live: F) -> usize
    where
        F: Fn(UserId) -> bool,
    {
        let mut locks = self.locks.write();
        let before = locks.len();
        locks.retain(|id, lock| is_live(*id) || Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    /// Returns true if a lock entry exists for `id`.
    #[cfg(test)]
    pub(crate) fn contains(&self, id: UserId) -> bool {
        self.locks.read().contains_key(&id)
    }

    /// Returns the number of lock entries.
    pub(crate) fn len(&self) -> usize {
        self.locks.read().len()
    }
}
