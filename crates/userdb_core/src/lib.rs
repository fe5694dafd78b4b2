//! # UserDB Core
//!
//! Concurrent in-memory user store.
//!
//! This crate provides:
//! - [`EntityStore`]: CRUD, bulk insert and predicate search over users
//! - Two-tier locking: a whole-map lock plus lazily created per-user locks
//! - [`Transaction`]: detached snapshots merged back on commit
//! - [`StatsSnapshot`]: read/write counters and average lock wait
//!
//! ## Usage
//!
//! ```rust
//! use userdb_core::{EntityStore, User};
//!
//! let store = EntityStore::new();
//! let id = store.create(User::new("Alice", "alice@example.com"));
//! assert_eq!(store.get_by_id(id).unwrap().name, "Alice");
//!
//! let mut tx = store.begin_transaction();
//! tx.delete(id).unwrap();
//! store.commit(tx);
//! assert!(store.get_by_id(id).is_none());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entity;
mod error;
mod lock;
mod stats;
mod transaction;
mod types;

pub use config::{StoreConfig, MAX_FIRST_ID};
pub use entity::{EntityStore, User};
pub use error::{StoreError, StoreResult};
pub use stats::StatsSnapshot;
pub use transaction::Transaction;
pub use types::{unix_millis, UserId};
