//! # UserDB Service
//!
//! Business rules over [`userdb_core::EntityStore`].
//!
//! The store accepts any well-formed value; this layer owns validation:
//! - names and emails must be non-empty
//! - ids arriving from the outside must be positive
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use userdb_core::EntityStore;
//! use userdb_service::UserService;
//!
//! let service = UserService::new(Arc::new(EntityStore::new()));
//! let alice = service.create_user("Alice", "alice@example.com").unwrap();
//! assert_eq!(service.get_user(1).map(|u| u.id), Some(alice.id));
//! assert!(service.create_user("", "nobody@example.com").is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod service;

pub use error::{ServiceError, ServiceResult};
pub use service::UserService;
