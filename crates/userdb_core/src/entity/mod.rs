//! User records and the store that owns them.

mod store;
mod user;

pub use store::EntityStore;
pub use user::User;
