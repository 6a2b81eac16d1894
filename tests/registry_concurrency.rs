// Registry and context-map behavior under concurrent transport threads.
use std::sync::{Arc, Barrier};
use std::thread;

use wirebox::api::{CallContextMap, CallIdRegistry, ContextHandle, ErrorKind, Xid, check_reply};

const THREADS: u64 = 8;
const CALLS_PER_THREAD: u64 = 200;

#[test]
fn concurrent_add_remove_keeps_registry_consistent() {
    let registry = Arc::new(CallIdRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for call in 0..CALLS_PER_THREAD {
                    let id = Xid::from_call_number(worker * CALLS_PER_THREAD + call);
                    assert!(registry.add(id.clone()));
                    assert!(!registry.add(id.clone()));
                    if call % 2 == 0 {
                        registry.complete(&id).expect("complete");
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker");
    }

    assert_eq!(registry.len() as u64, THREADS * CALLS_PER_THREAD / 2);
    for number in 0..THREADS * CALLS_PER_THREAD {
        let id = Xid::from_call_number(number);
        assert_eq!(registry.contains(&id), number % 2 == 1, "call {number}");
    }
}

#[test]
fn shared_call_ids_race_to_a_single_winner() {
    let registry = Arc::new(CallIdRegistry::new());
    let id = Xid::from_call_number(77);
    registry.add(id.clone());

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            thread::spawn(move || registry.complete(&id).is_ok())
        })
        .collect();
    let winners = workers
        .into_iter()
        .map(|worker| worker.join().expect("worker"))
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(
        check_reply(&registry, &id).unwrap_err().kind(),
        ErrorKind::InvalidCallState
    );
}

#[test]
fn reply_fan_out_reaches_every_waiting_context() {
    let contexts: Arc<CallContextMap> = Arc::new(CallContextMap::new());
    let id = Xid::from_call_number(5);

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let contexts = Arc::clone(&contexts);
            let id = id.clone();
            thread::spawn(move || {
                contexts.add(id.clone(), ContextHandle(worker));
                contexts.add(id, ContextHandle(worker));
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker");
    }

    assert_eq!(contexts.handles(&id).len(), THREADS as usize);
    let mut released = contexts.take(&id);
    released.sort();
    assert_eq!(released, (0..THREADS).map(ContextHandle).collect::<Vec<_>>());
    assert_eq!(contexts.to_debug_string(), "-- empty --");
}

#[test]
fn add_racing_remove_settles_on_a_defined_state() {
    let registry = Arc::new(CallIdRegistry::new());
    let contexts: Arc<CallContextMap> = Arc::new(CallContextMap::new());
    let barrier = Arc::new(Barrier::new(THREADS as usize));
    let id = Xid::from_call_number(99);
    let handle = ContextHandle(0x99);

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            let contexts = Arc::clone(&contexts);
            let barrier = Arc::clone(&barrier);
            let id = id.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..CALLS_PER_THREAD {
                    if worker % 2 == 0 {
                        registry.add(id.clone());
                        contexts.add(id.clone(), handle);
                    } else {
                        registry.remove(&id);
                        contexts.remove(&id, &handle);
                    }
                    let handles = contexts.handles(&id);
                    assert!(handles.len() <= 1, "duplicate handles {handles:?}");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker");
    }

    assert!(registry.len() <= 1);
    assert_eq!(registry.contains(&id), registry.snapshot() == vec![id.clone()]);
    let handles = contexts.handles(&id);
    assert!(handles.len() <= 1);
    assert_eq!(contexts.contains(&id), handles == vec![handle]);
    if !contexts.contains(&id) {
        assert_eq!(contexts.to_debug_string(), "-- empty --");
    }
}
