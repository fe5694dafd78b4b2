//! CLI command implementations.

pub mod demo;
pub mod workload;

use serde::Serialize;
use userdb_core::{StatsSnapshot, User};

/// Serializable view of a user.
#[derive(Debug, Serialize)]
pub struct UserView {
    /// User id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Contact address.
    pub email: String,
    /// Creation time, milliseconds since the UNIX epoch.
    pub created_at: u64,
    /// Last modification time, milliseconds since the UNIX epoch.
    pub updated_at: u64,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_u64(),
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Serializable view of store statistics.
#[derive(Debug, Serialize)]
pub struct StatsView {
    /// Read operations.
    pub reads: u64,
    /// Write operations.
    pub writes: u64,
    /// Average lock wait in microseconds.
    pub avg_lock_wait_us: u128,
    /// Transactions begun.
    pub transactions_begun: u64,
    /// Transactions committed.
    pub transactions_committed: u64,
    /// Transactions rolled back.
    pub transactions_rolled_back: u64,
    /// Lock cleanup runs.
    pub cleanups: u64,
}

impl From<StatsSnapshot> for StatsView {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            reads: stats.reads,
            writes: stats.writes,
            avg_lock_wait_us: stats.avg_lock_wait.as_micros(),
            transactions_begun: stats.transactions_begun,
            transactions_committed: stats.transactions_committed,
            transactions_rolled_back: stats.transactions_rolled_back,
            cleanups: stats.cleanups,
        }
    }
}

fn print_stats(stats: &StatsView) {
    println!("Reads: {}", stats.reads);
    println!("Writes: {}", stats.writes);
    println!("Average lock wait: {}us", stats.avg_lock_wait_us);
    println!(
        "Transactions: {} begun, {} committed, {} rolled back",
        stats.transactions_begun, stats.transactions_committed, stats.transactions_rolled_back
    );
    println!("Lock cleanups: {}", stats.cleanups);
}
