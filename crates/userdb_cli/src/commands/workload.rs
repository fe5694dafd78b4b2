//! Workload command implementation.
//!
//! Drives a shared store from several threads with a deterministic mix of
//! reads (lookups, scans, searches) and writes (creates, updates, deletes),
//! then runs a lock cleanup and reports throughput and store statistics.

use super::{print_stats, StatsView};
use crate::Format;
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use userdb_core::{EntityStore, StoreConfig, User, UserId};

/// Configuration for a workload run.
#[derive(Debug, Clone)]
pub struct WorkloadConfig {
    /// Number of worker threads.
    pub threads: usize,
    /// Operations each thread performs.
    pub ops_per_thread: usize,
    /// Share of operations that are reads.
    pub read_ratio: f64,
    /// Users inserted before the run.
    pub seed_users: usize,
}

/// Per-thread tally.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    succeeded: usize,
    not_found: usize,
}

/// Result of a workload run.
#[derive(Debug, Serialize)]
pub struct WorkloadResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Operations that succeeded (absent reads included).
    pub successful_ops: usize,
    /// Updates and deletes that hit a missing user.
    pub not_found_ops: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u128,
    /// Operations per second.
    pub ops_per_second: f64,
    /// Users left at the end.
    pub final_users: usize,
    /// Lock entries reclaimed by the final cleanup.
    pub locks_reclaimed: usize,
    /// Store statistics.
    pub stats: StatsView,
}

impl WorkloadResult {
    fn new(tally: Tally, duration: Duration, store: &EntityStore, locks_reclaimed: usize) -> Self {
        let total = tally.succeeded + tally.not_found;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: tally.succeeded,
            not_found_ops: tally.not_found,
            duration_ms: duration.as_millis(),
            ops_per_second,
            final_users: store.len(),
            locks_reclaimed,
            stats: store.stats().into(),
        }
    }
}

/// Runs the workload command.
pub fn run(config: &WorkloadConfig, format: Format) -> Result<(), Box<dyn std::error::Error>> {
    if config.threads == 0 {
        return Err("thread count must be positive".into());
    }
    if !(0.0..=1.0).contains(&config.read_ratio) {
        return Err(format!(
            "read ratio must be within 0.0..=1.0, got {}",
            config.read_ratio
        )
        .into());
    }

    let capacity = config.seed_users + config.threads * config.ops_per_thread;
    let store = Arc::new(EntityStore::with_config(
        StoreConfig::new().initial_capacity(capacity),
    ));
    store.bulk_create(
        (0..config.seed_users)
            .map(|i| User::new(format!("seed-{i}"), format!("seed-{i}@example.com"))),
    );

    info!(
        threads = config.threads,
        ops = config.ops_per_thread,
        read_ratio = config.read_ratio,
        "starting workload"
    );

    let read_percent = (config.read_ratio * 100.0).round() as usize;
    let start = Instant::now();
    let handles: Vec<_> = (0..config.threads)
        .map(|worker| {
            let store = Arc::clone(&store);
            let ops = config.ops_per_thread;
            thread::spawn(move || run_worker(&store, worker, ops, read_percent))
        })
        .collect();

    let mut tally = Tally::default();
    for handle in handles {
        let t = handle.join().map_err(|_| "workload thread panicked")?;
        tally.succeeded += t.succeeded;
        tally.not_found += t.not_found;
    }
    let duration = start.elapsed();

    let reclaimed = store.cleanup();
    let result = WorkloadResult::new(tally, duration, &store, reclaimed);

    match format {
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Format::Text => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn run_worker(store: &EntityStore, worker: usize, ops: usize, read_percent: usize) -> Tally {
    let mut tally = Tally::default();

    for i in 0..ops {
        // Cheap deterministic spread over the id space and the op mix.
        let mix = (i * 37 + worker * 11) % 100;
        let span = store.next_id().as_u64().saturating_sub(1).max(1);
        let target = UserId::new((i as u64 * 7919 + worker as u64 * 104_729) % span + 1);

        let ok = if mix < read_percent {
            match mix % 10 {
                0 => {
                    store.get_all();
                    true
                }
                1 => {
                    let domain = if worker % 2 == 0 { "@example.com" } else { "@other.org" };
                    store.search_by_condition(|u| u.email.ends_with(domain));
                    true
                }
                _ => {
                    store.get_by_id(target);
                    true
                }
            }
        } else {
            match mix % 4 {
                0 => {
                    let name = format!("w{worker}-{i}");
                    let email = format!("{name}@other.org");
                    store.create(User::new(name, email));
                    true
                }
                1 => store.delete(target).is_ok(),
                _ => match store.get_by_id(target) {
                    Some(mut user) => {
                        let email = user.email.clone();
                        user.update_info(format!("w{worker}-{i}"), email);
                        store.update(user).is_ok()
                    }
                    None => false,
                },
            }
        };

        if ok {
            tally.succeeded += 1;
        } else {
            tally.not_found += 1;
        }
    }

    debug!(worker, succeeded = tally.succeeded, "worker finished");
    tally
}

fn print_text_output(result: &WorkloadResult) {
    println!("UserDB Workload");
    println!("===============");
    println!("Total operations: {}", result.total_ops);
    println!("Successful: {}", result.successful_ops);
    println!("Not found: {}", result.not_found_ops);
    println!("Duration: {}ms", result.duration_ms);
    println!("Throughput: {:.2} ops/sec", result.ops_per_second);
    println!("Final users: {}", result.final_users);
    println!("Locks reclaimed: {}", result.locks_reclaimed);
    println!();
    print_stats(&result.stats);
}
