//! Demo command implementation.

use super::{print_stats, StatsView, UserView};
use crate::Format;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use userdb_core::{EntityStore, StoreConfig};
use userdb_service::UserService;

/// One step of the walkthrough.
#[derive(Debug, Serialize)]
pub struct DemoStep {
    /// What was done.
    pub action: String,
    /// What came back.
    pub outcome: String,
}

/// Demo result.
#[derive(Debug, Serialize)]
pub struct DemoReport {
    /// Steps in execution order.
    pub steps: Vec<DemoStep>,
    /// Users left in the store, ordered by id.
    pub users: Vec<UserView>,
    /// Final statistics.
    pub stats: StatsView,
}

impl DemoReport {
    fn step(&mut self, action: impl Into<String>, outcome: impl Into<String>) {
        self.steps.push(DemoStep {
            action: action.into(),
            outcome: outcome.into(),
        });
    }
}

/// Runs the demo command.
pub fn run(format: Format) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(EntityStore::with_config(StoreConfig::new().initial_capacity(16)));
    let service = UserService::new(Arc::clone(&store));
    let mut report = DemoReport {
        steps: Vec::new(),
        users: Vec::new(),
        stats: store.stats().into(),
    };

    info!("running demo");

    let alice = service.create_user("Alice", "alice@example.com")?;
    report.step("create Alice", format!("id {}", alice.id.as_u64()));
    let bob = service.create_user("Bob", "bob@example.com")?;
    report.step("create Bob", format!("id {}", bob.id.as_u64()));

    match service.create_user("", "nobody@example.com") {
        Ok(user) => report.step("create with empty name", format!("id {}", user.id.as_u64())),
        Err(e) => report.step("create with empty name", format!("rejected: {e}")),
    }

    let missing = service.get_user(99);
    report.step("get 99", if missing.is_some() { "found" } else { "absent" });

    match service.update_user(5, "X", "x@example.com") {
        Ok(_) => report.step("update 5", "ok"),
        Err(e) => report.step("update 5", format!("failed: {e}")),
    }

    let bulk = service.create_users(&[
        ("Pat", "pat@other.org"),
        ("Quinn", "quinn@example.com"),
        ("Rae", "rae@other.org"),
    ])?;
    let ids: Vec<String> = bulk.iter().map(|u| u.id.as_u64().to_string()).collect();
    report.step("bulk create Pat, Quinn, Rae", format!("ids {}", ids.join(", ")));

    let found = service.find_by_email_domain("example.com");
    report.step("search @example.com", format!("{} users", found.len()));

    let mut txn = store.begin_transaction();
    txn.delete(alice.id)?;
    store.rollback(txn);
    let still_there = service.get_user(1).is_some();
    report.step(
        "delete Alice in transaction, roll back",
        if still_there { "Alice present" } else { "Alice absent" },
    );

    let mut txn = store.begin_transaction();
    txn.delete(alice.id)?;
    store.commit(txn);
    let gone = service.get_user(1).is_none();
    report.step(
        "delete Alice in transaction, commit",
        if gone { "Alice absent" } else { "Alice present" },
    );

    let removed = store.cleanup();
    report.step("cleanup", format!("{removed} lock entries removed"));

    let mut users = service.list_users();
    users.sort_by_key(|u| u.id);
    report.users = users.into_iter().map(UserView::from).collect();
    report.stats = store.stats().into();

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Text => {
            print_text_output(&report);
        }
    }

    Ok(())
}

fn print_text_output(report: &DemoReport) {
    println!("UserDB Demo");
    println!("===========");
    for (i, step) in report.steps.iter().enumerate() {
        println!("{:>2}. {:<42} {}", i + 1, step.action, step.outcome);
    }

    println!();
    println!("Users");
    println!("-----");
    for user in &report.users {
        println!("{:>4}  {:<8} {}", user.id, user.name, user.email);
    }

    println!();
    println!("Stats");
    println!("-----");
    print_stats(&report.stats);
}
