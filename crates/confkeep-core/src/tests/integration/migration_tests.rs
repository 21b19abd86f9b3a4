#![cfg(test)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use super::common::TestEnvironment;
use crate::engine::{AccessMode, SettingsManager};
use crate::handle::Setting;
use crate::registry::DocumentDescriptor;
use crate::tree::Format;

fn counting_hook(calls: &Arc<AtomicUsize>, answer: bool) -> impl Fn(u32, u32) -> bool + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move |_, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        answer
    }
}

#[test]
fn test_migration_bumps_version_once() {
    let env = TestEnvironment::new();
    env.write_file("settings.json", r#"{ "version": "1", "speed": "4" }"#);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(parking_lot::Mutex::new(None));
    let seen_in_hook = Arc::clone(&seen);
    let count_in_hook = counting_hook(&calls, true);

    env.manager
        .register_document(
            DocumentDescriptor::new("Settings", Format::Json, "settings.json")
                .with_schema_version(2)
                .with_migration_hook(move |old, new| {
                    *seen_in_hook.lock() = Some((old, new));
                    count_in_hook(old, new)
                }),
        )
        .unwrap();
    let speed = env.manager.register_scalar("Settings", "Speed", "speed", 0i32).unwrap();

    assert_eq!(speed.read(&env.manager), 4);
    assert_eq!(speed.read(&env.manager), 4);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock(), Some((1, 2)));

    let value: serde_json::Value = serde_json::from_str(&env.read_file("settings.json")).unwrap();
    assert_eq!(value["version"], "2");
    assert_eq!(value["speed"], "4");

    // A fresh manager finds the declared version and does not ask again
    let restarted = env.restart();
    let calls_after_restart = Arc::new(AtomicUsize::new(0));
    restarted
        .register_document(
            DocumentDescriptor::new("Settings", Format::Json, "settings.json")
                .with_schema_version(2)
                .with_migration_hook(counting_hook(&calls_after_restart, true)),
        )
        .unwrap();
    let speed = restarted.register_scalar("Settings", "Speed", "speed", 0i32).unwrap();
    assert_eq!(speed.read(&restarted), 4);
    assert_eq!(calls_after_restart.load(Ordering::SeqCst), 0);
}

#[test]
fn test_declined_migration_leaves_file_alone() {
    let env = TestEnvironment::new();
    let calls = Arc::new(AtomicUsize::new(0));
    env.manager
        .register_document(
            DocumentDescriptor::new("Settings", Format::Xml, "settings.xml")
                .with_schema_version(3)
                .with_migration_hook(counting_hook(&calls, false)),
        )
        .unwrap();
    let speed = env.manager.register_scalar("Settings", "Speed", "speed", 1i32).unwrap();

    assert_eq!(speed.read(&env.manager), 1);
    assert_eq!(speed.read(&env.manager), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "the hook runs once per load");
    assert!(!env.file("settings.xml").exists());
}

#[test]
fn test_migration_without_hook_is_ignored() {
    let env = TestEnvironment::new();
    env.write_file("settings.ini", "version=1\nspeed=2\n");
    env.manager
        .register_document(DocumentDescriptor::new("Settings", Format::Ini, "settings.ini").with_schema_version(5))
        .unwrap();
    let speed = env.manager.register_scalar("Settings", "Speed", "speed", 0i32).unwrap();

    assert_eq!(speed.read(&env.manager), 2);
    assert_eq!(env.provider.writes(), 0);
}

#[test]
fn test_missing_version_counts_as_zero() {
    let env = TestEnvironment::new();
    let calls = Arc::new(AtomicUsize::new(0));
    env.manager
        .register_document(
            DocumentDescriptor::new("Settings", Format::Json, "settings.json")
                .with_schema_version(0)
                .with_migration_hook(counting_hook(&calls, true)),
        )
        .unwrap();
    env.manager.register_scalar("Settings", "Speed", "speed", 0i32).unwrap().read(&env.manager);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_migration_persists_even_when_access_opens_a_transaction() {
    let env = TestEnvironment::new();
    env.manager
        .register_document(
            DocumentDescriptor::new("Settings", Format::Json, "settings.json")
                .with_schema_version(1)
                .with_migration_hook(|_, _| true),
        )
        .unwrap();
    let speed = env.manager.register_scalar("Settings", "Speed", "speed", 0i32).unwrap();

    // The first access happens inside begin
    env.manager.begin("Settings");
    speed.write(&env.manager, &8);
    let on_disk = env.read_file("settings.json");
    assert!(on_disk.contains("\"version\": \"1\""), "{}", on_disk);
    assert!(!on_disk.contains("speed"), "{}", on_disk);
    env.manager.abort("Settings");
}

#[test]
fn test_hook_may_reenter_the_same_document() {
    let env = TestEnvironment::new();
    let manager = Arc::new(env.restart());
    let slot: Arc<OnceLock<Weak<SettingsManager>>> = Arc::new(OnceLock::new());
    let hook_slot = Arc::clone(&slot);

    manager
        .register_document(
            DocumentDescriptor::new("Settings", Format::Xml, "settings.xml")
                .with_schema_version(2)
                .with_migration_hook(move |old, _| {
                    if let Some(manager) = hook_slot.get().and_then(Weak::upgrade) {
                        manager.with_document("Settings", AccessMode::Write, |guard| {
                            guard.tree_mut().put_value("migrated_from", old.to_string());
                        });
                    }
                    true
                }),
        )
        .unwrap();
    let _ = slot.set(Arc::downgrade(&manager));
    let migrated = manager.register_scalar("Settings", "MigratedFrom", "migrated_from", 99u32).unwrap();

    assert_eq!(migrated.read(&manager), 0);
    let text = env.read_file("settings.xml");
    assert!(text.contains("<migrated_from>0</migrated_from>"), "{}", text);
    assert!(text.contains("<version>2</version>"), "{}", text);
}
