//! Multi-threaded tests for the user store.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use userdb_core::{EntityStore, StoreError, User, UserId};

const THREADS: usize = 8;

fn spawn_all<F, T>(threads: usize, f: F) -> Vec<T>
where
    F: Fn(usize) -> T + Send + Sync + 'static,
    T: Send + 'static,
{
    let f = Arc::new(f);
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let f = Arc::clone(&f);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                f(i)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn concurrent_creates_get_unique_ids() {
    let store = Arc::new(EntityStore::new());
    let per_thread = 200;

    let s = Arc::clone(&store);
    let ids: Vec<Vec<UserId>> = spawn_all(THREADS, move |t| {
        (0..per_thread)
            .map(|i| s.create(User::new(format!("u{t}-{i}"), format!("u{t}-{i}@x.com"))))
            .collect()
    });

    let all: Vec<UserId> = ids.into_iter().flatten().collect();
    let unique: HashSet<UserId> = all.iter().copied().collect();
    assert_eq!(unique.len(), THREADS * per_thread);

    let next = store.next_id();
    assert!(all.iter().all(|id| *id < next));
    assert_eq!(store.len(), THREADS * per_thread);
}

#[test]
fn concurrent_bulk_creates_are_contiguous() {
    let store = Arc::new(EntityStore::new());

    let s = Arc::clone(&store);
    let batches: Vec<Vec<UserId>> = spawn_all(THREADS, move |t| {
        let users = (0..50).map(|i| User::new(format!("b{t}-{i}"), "b@x.com"));
        s.bulk_create(users)
    });

    for batch in &batches {
        assert_eq!(batch.len(), 50);
        for pair in batch.windows(2) {
            assert_eq!(pair[1], pair[0].next());
        }
    }
    assert_eq!(store.len(), THREADS * 50);
}

#[test]
fn readers_never_see_torn_values() {
    let store = Arc::new(EntityStore::new());
    // Name and email always carry the same generation number.
    let id = store.create(User::new("gen-0", "gen-0@x.com"));
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = Arc::clone(&store);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for generation in 1..=2_000 {
                let user = User::new(format!("gen-{generation}"), format!("gen-{generation}@x.com"))
                    .with_id(id);
                store.update(user).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                while !done.load(Ordering::SeqCst) {
                    let user = store.get_by_id(id).unwrap();
                    assert_eq!(format!("{}@x.com", user.name), user.email);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
}

#[test]
fn update_on_other_id_runs_during_long_search() {
    let store = Arc::new(EntityStore::new());
    let slow = store.create(User::new("Slow", "slow@x.com"));
    let other = store.create(User::new("Other", "other@x.com"));
    let scanning = Arc::new(Barrier::new(2));

    let s = Arc::clone(&store);
    let b = Arc::clone(&scanning);
    let search = thread::spawn(move || {
        s.search_by_condition(|u| {
            if u.id == slow {
                b.wait();
                thread::sleep(Duration::from_millis(400));
            }
            true
        })
    });

    scanning.wait();
    let start = Instant::now();
    store
        .update(User::new("Changed", "changed@x.com").with_id(other))
        .unwrap();
    assert_eq!(store.get_by_id(other).unwrap().name, "Changed");
    let elapsed = start.elapsed();

    let found = search.join().unwrap();
    assert_eq!(found.len(), 2);
    assert!(
        elapsed < Duration::from_millis(200),
        "update of {other} waited {elapsed:?} behind a scan"
    );
}

#[test]
fn concurrent_deletes_succeed_exactly_once() {
    let store = Arc::new(EntityStore::new());
    let id = store.create(User::new("Alice", "a@x.com"));

    let s = Arc::clone(&store);
    let results: Vec<Result<(), StoreError>> = spawn_all(THREADS, move |_| s.delete(id));

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(StoreError::is_not_found));
    assert!(store.get_by_id(id).is_none());
}

#[test]
fn cleanup_during_traffic_keeps_live_locks_and_data() {
    let store = Arc::new(EntityStore::new());
    let ids = store.bulk_create((0..100).map(|i| User::new(format!("u{i}"), "u@x.com")));
    let ids = Arc::new(ids);

    let s = Arc::clone(&store);
    let ids_for_workers = Arc::clone(&ids);
    spawn_all(THREADS, move |t| {
        for (i, id) in ids_for_workers.iter().enumerate() {
            match (i + t) % 4 {
                0 => {
                    let _ = s.delete(*id);
                }
                1 => {
                    s.cleanup();
                }
                2 => {
                    s.get_by_id(UserId::new(id.as_u64() + 1_000));
                }
                _ => {
                    if let Some(mut user) = s.get_by_id(*id) {
                        user.touch();
                        let _ = s.update(user);
                    }
                }
            }
        }
    });

    store.cleanup();
    let survivors = store.get_all();
    assert!(survivors.iter().all(|u| ids.contains(&u.id)));
    for user in survivors {
        assert_eq!(store.get_by_id(user.id).map(|u| u.id), Some(user.id));
    }
}

#[test]
fn stats_account_exactly_under_contention() {
    let store = Arc::new(EntityStore::new());
    let id = store.create(User::new("Alice", "a@x.com"));

    let s = Arc::clone(&store);
    spawn_all(THREADS, move |_| {
        for _ in 0..100 {
            s.get_by_id(id);
            s.get_all();
            s.create(User::new("Bob", "b@x.com"));
        }
    });

    let stats = store.stats();
    assert_eq!(stats.reads, (THREADS * 200) as u64);
    assert_eq!(stats.writes, (THREADS * 100 + 1) as u64);
}

#[test]
fn concurrent_transactions_merge_without_losing_creates() {
    let store = Arc::new(EntityStore::new());

    let s = Arc::clone(&store);
    spawn_all(THREADS, move |t| {
        s.transaction(|txn| {
            txn.create(User::new(format!("tx{t}"), "t@x.com"));
            Ok::<_, StoreError>(())
        })
        .unwrap();
    });

    // Transactions that overlapped may have allocated the same id; the
    // merge keeps the last committed value for it.
    assert!(store.len() >= 1 && store.len() <= THREADS);
    assert_eq!(store.stats().transactions_committed, THREADS as u64);
    let next = store.next_id();
    assert!(store.get_all().iter().all(|u| u.id < next));
}
