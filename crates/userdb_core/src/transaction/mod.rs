//! Snapshot transactions.
//!
//! A transaction is a detached copy of the store taken at
//! [`begin_transaction`](crate::EntityStore::begin_transaction):
//! - **Isolation**: later live writes are invisible to it and vice versa
//! - **Commit**: an unconditional merge, last writer wins per user
//! - **Rollback**: the copy is dropped, the live store is never touched
//!
//! There is no conflict detection. Two transactions that touch the same
//! user both commit; the later commit's value survives.

mod state;

pub use state::Transaction;
