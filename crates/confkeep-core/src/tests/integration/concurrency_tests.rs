#![cfg(test)]

use std::collections::HashSet;
use std::thread;

use rand::Rng;

use super::common::{register_document, TestEnvironment, ALL_FORMATS};
use crate::handle::Setting;

const THREADS: usize = 8;
const ITERATIONS: usize = 100;

#[test]
fn test_concurrent_readers_never_see_unwritten_values() {
    for format in ALL_FORMATS {
        let env = TestEnvironment::new();
        register_document(&env.manager, format);
        let counter = env.manager.register_scalar("Settings", "Counter", "stress.counter", -1i64).unwrap();
        let batch = env.manager.register_list::<i64>("Settings", "Batch", "stress.batch", vec![]).unwrap();

        // Every value a writer may store: thread id * ITERATIONS + step
        let written: HashSet<i64> = (0..(THREADS * ITERATIONS) as i64).collect();

        thread::scope(|scope| {
            for id in 0..THREADS {
                let manager = &env.manager;
                let counter = &counter;
                let batch = &batch;
                let written = &written;
                scope.spawn(move || {
                    let mut rng = rand::thread_rng();
                    for step in 0..ITERATIONS {
                        let value = (id * ITERATIONS + step) as i64;
                        if rng.gen_bool(0.5) {
                            counter.write(manager, &value);
                            // Whole lists are replaced under the lock, so no mix is visible
                            batch.write(manager, &vec![value; 3]);
                        } else {
                            let seen = counter.read(manager);
                            assert!(seen == -1 || written.contains(&seen), "{} read unwritten {}", format, seen);

                            let items = batch.read(manager);
                            assert!(items.is_empty() || items.len() == 3, "{} torn list {:?}", format, items);
                            assert!(items.windows(2).all(|w| w[0] == w[1]), "{} mixed list {:?}", format, items);
                        }
                    }
                });
            }
        });

        let last = counter.read(&env.manager);
        assert!(written.contains(&last) || last == -1);
    }
}

#[test]
fn test_concurrent_transactions_on_separate_documents() {
    let env = TestEnvironment::new();
    for name in ["Left", "Right"] {
        env.manager
            .register_document(crate::registry::DocumentDescriptor::new(
                name,
                crate::tree::Format::Json,
                format!("{}.json", name.to_lowercase()),
            ))
            .unwrap();
    }
    let left = env.manager.register_scalar("Left", "Total", "total", 0u64).unwrap();
    let right = env.manager.register_scalar("Right", "Total", "total", 0u64).unwrap();

    thread::scope(|scope| {
        for (document, setting) in [("Left", &left), ("Right", &right)] {
            let manager = &env.manager;
            scope.spawn(move || {
                for _ in 0..10 {
                    manager.begin(document);
                    for _ in 0..5 {
                        let current = setting.read(manager);
                        setting.write(manager, &(current + 1));
                    }
                    assert!(manager.is_pending(document));
                    manager.commit(document);
                }
            });
        }
    });

    assert_eq!(left.read(&env.manager), 50);
    assert_eq!(right.read(&env.manager), 50);
    assert!(env.read_file("left.json").contains("\"50\""));
    assert!(env.read_file("right.json").contains("\"50\""));
}
