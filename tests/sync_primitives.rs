/*!
 * Synchronization Primitives Integration Tests
 *
 * Mutual exclusion, wait/signal, acquire/release publication and
 * exactly-once initialization under real thread contention
 */

use lsm_port::{AtomicPointer, ConditionVariable, Mutex, OnceControl, OnceState, WakeResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn test_mutex_exclusion_under_stress() {
    const THREADS: usize = 8;
    const ITERATIONS: usize = 2_000;

    let mu = Arc::new(Mutex::new(Vec::<usize>::new()));
    let occupancy = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let mu = mu.clone();
            let occupancy = occupancy.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(id as u64);
                barrier.wait();
                for _ in 0..ITERATIONS {
                    let mut log = mu.lock();
                    let inside = occupancy.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(inside, 0, "two threads inside");
                    log.push(id);
                    if rng.gen_ratio(1, 64) {
                        thread::yield_now();
                    }
                    occupancy.fetch_sub(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let log = mu.lock();
    assert_eq!(log.len(), THREADS * ITERATIONS);
    for id in 0..THREADS {
        assert_eq!(log.iter().filter(|v| **v == id).count(), ITERATIONS);
    }
}

#[test]
fn test_wait_returns_with_flag_set() {
    // Thread A: lock, wait. Thread B: lock, set flag, signal, unlock.
    let mu = Arc::new(Mutex::new(false));
    let cv = Arc::new(ConditionVariable::new(mu.clone()));

    let thread_a = {
        let (mu, cv) = (mu.clone(), cv.clone());
        thread::spawn(move || {
            let mut flag = mu.lock();
            while !*flag {
                cv.wait(&mut flag);
            }
            mu.assert_held();
            *flag
        })
    };

    while cv.waiter_count() == 0 {
        thread::sleep(Duration::from_millis(1));
    }

    let thread_b = {
        let (mu, cv) = (mu.clone(), cv.clone());
        thread::spawn(move || {
            let mut flag = mu.lock();
            *flag = true;
            cv.signal()
        })
    };

    assert_eq!(thread_b.join().unwrap(), WakeResult::Woken(1));
    assert!(thread_a.join().unwrap());
    assert!(!mu.is_locked());
}

#[test]
fn test_no_lost_wakeups_producer_consumer() {
    const ITEMS: u64 = 5_000;

    #[derive(Default)]
    struct Queue {
        items: Vec<u64>,
        closed: bool,
    }

    let mu = Arc::new(Mutex::new(Queue::default()));
    let cv = Arc::new(ConditionVariable::new(mu.clone()));
    let total = Arc::new(AtomicU64::new(0));

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let (mu, cv, total) = (mu.clone(), cv.clone(), total.clone());
            thread::spawn(move || loop {
                let mut queue = mu.lock();
                cv.wait_while(&mut queue, |q| q.items.is_empty() && !q.closed);
                match queue.items.pop() {
                    Some(item) => {
                        drop(queue);
                        total.fetch_add(item, Ordering::Relaxed);
                    }
                    None => return,
                }
            })
        })
        .collect();

    for item in 1..=ITEMS {
        let mut queue = mu.lock();
        queue.items.push(item);
        cv.signal();
    }
    {
        let mut queue = mu.lock();
        queue.closed = true;
        cv.signal_all();
    }

    for consumer in consumers {
        consumer.join().unwrap();
    }
    assert_eq!(total.load(Ordering::Relaxed), ITEMS * (ITEMS + 1) / 2);
}

#[test]
fn test_acquire_release_visibility() {
    const ROUNDS: usize = 10_000;

    struct Payload {
        ready: AtomicBool,
        value: usize,
    }

    // Companion data is written before the release store and checked after
    // the acquire load.
    let slot = Arc::new(AtomicPointer::<Payload>::null());
    let done = Arc::new(AtomicBool::new(false));

    let subscriber = {
        let (slot, done) = (slot.clone(), done.clone());
        thread::spawn(move || {
            let mut observed = 0usize;
            while !done.load(Ordering::Acquire) || observed < ROUNDS {
                let p = slot.acquire_load();
                if p.is_null() {
                    continue;
                }
                // SAFETY: payloads are leaked for the duration of the test.
                let payload = unsafe { &*p };
                assert!(payload.ready.load(Ordering::Relaxed));
                assert!(payload.value >= observed);
                observed = payload.value;
            }
        })
    };

    for value in 1..=ROUNDS {
        let payload = Box::new(Payload {
            ready: AtomicBool::new(false),
            value,
        });
        payload.ready.store(true, Ordering::Relaxed);
        slot.release_store(Box::leak(payload));
    }
    done.store(true, Ordering::Release);

    subscriber.join().unwrap();
}

#[test]
fn test_no_barrier_access_under_mutex() {
    let mu = Arc::new(Mutex::new(()));
    let slot = Arc::new(AtomicPointer::<u64>::null());
    let values: &'static [u64] = Box::leak(vec![0u64; 16].into_boxed_slice());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let (mu, slot) = (mu.clone(), slot.clone());
            thread::spawn(move || {
                for i in 0..500 {
                    let _held = mu.lock();
                    let idx = (t * 4 + i) % values.len();
                    let ptr = &values[idx] as *const u64 as *mut u64;
                    slot.no_barrier_store(ptr);
                    assert_eq!(slot.no_barrier_load(), ptr);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_ten_threads_run_once_counter() {
    let control = Arc::new(OnceControl::new());
    let counter = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(10));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let (control, counter, barrier) = (control.clone(), counter.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                control
                    .run_once(|| {
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
                counter.load(Ordering::SeqCst)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(control.state(), OnceState::Done);
}

#[test]
fn test_run_once_callers_see_completed_initialization() {
    const CALLERS: usize = 16;

    // A multi-field "table" built slowly; no caller may see it half-built
    let control = Arc::new(OnceControl::new());
    let table = Arc::new((0..64).map(|_| AtomicU64::new(0)).collect::<Vec<_>>());
    let barrier = Arc::new(Barrier::new(CALLERS));

    let handles: Vec<_> = (0..CALLERS)
        .map(|_| {
            let (control, table, barrier) = (control.clone(), table.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                control
                    .run_once(|| {
                        for (i, slot) in table.iter().enumerate() {
                            slot.store(i as u64 * 7 + 1, Ordering::Relaxed);
                            if i % 16 == 0 {
                                thread::sleep(Duration::from_millis(2));
                            }
                        }
                    })
                    .unwrap();
                table
                    .iter()
                    .enumerate()
                    .all(|(i, slot)| slot.load(Ordering::Relaxed) == i as u64 * 7 + 1)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_run_once_idempotent_after_done() {
    static CONTROL: OnceControl = OnceControl::new();
    static CALLS: AtomicUsize = AtomicUsize::new(0);

    for _ in 0..10_000 {
        CONTROL
            .run_once(|| {
                CALLS.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
    }
    assert_eq!(CALLS.load(Ordering::Relaxed), 1);
    assert!(CONTROL.is_done());
}
