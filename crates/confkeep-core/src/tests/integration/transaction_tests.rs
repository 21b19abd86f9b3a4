#![cfg(test)]

use super::common::{register_document, TestEnvironment};
use crate::handle::{ScalarSetting, Setting};
use crate::tree::Format;

fn setup(format: Format) -> (TestEnvironment, ScalarSetting<i32>, ScalarSetting<i32>) {
    let env = TestEnvironment::new();
    register_document(&env.manager, format);
    let a = env.manager.register_scalar("Settings", "A", "values.a", 0).unwrap();
    let b = env.manager.register_scalar("Settings", "B", "values.b", 0).unwrap();
    (env, a, b)
}

#[test]
fn test_commit_persists_all_writes_at_once() {
    let (env, a, b) = setup(Format::Json);
    a.write(&env.manager, &1);
    let writes_before = env.provider.writes();

    env.manager.begin("Settings");
    assert!(env.manager.is_pending("Settings"));
    a.write(&env.manager, &10);
    b.write(&env.manager, &20);

    // Reads see the in-progress values, the file does not
    assert_eq!(a.read(&env.manager), 10);
    assert_eq!(b.read(&env.manager), 20);
    assert_eq!(env.provider.writes(), writes_before);
    assert!(!env.read_file("settings.json").contains("20"));

    env.manager.commit("Settings");
    assert!(!env.manager.is_pending("Settings"));
    assert_eq!(env.provider.writes(), writes_before + 1);

    let restarted = env.restart();
    register_document(&restarted, Format::Json);
    let a = restarted.register_scalar("Settings", "A", "values.a", 0).unwrap();
    let b = restarted.register_scalar("Settings", "B", "values.b", 0).unwrap();
    assert_eq!(a.read(&restarted), 10);
    assert_eq!(b.read(&restarted), 20);
}

#[test]
fn test_abort_restores_the_snapshot() {
    let (env, a, b) = setup(Format::Xml);
    a.write(&env.manager, &1);
    let on_disk = env.read_file("settings.xml");

    env.manager.begin("Settings");
    a.write(&env.manager, &100);
    b.write(&env.manager, &200);
    env.manager.abort("Settings");

    assert!(!env.manager.is_pending("Settings"));
    assert_eq!(a.read(&env.manager), 1);
    assert_eq!(b.read(&env.manager), 0);
    assert_eq!(env.read_file("settings.xml"), on_disk);

    // Writes after the abort persist immediately again
    b.write(&env.manager, &2);
    assert!(env.read_file("settings.xml").contains("<b>2</b>"));
}

#[test]
fn test_nested_begin_joins_the_outer_transaction() {
    let (env, a, _b) = setup(Format::Ini);

    env.manager.begin("Settings");
    a.write(&env.manager, &1);
    env.manager.begin("Settings");
    a.write(&env.manager, &2);
    env.manager.abort("Settings");

    // A single abort rolls back to the state before the first begin
    assert_eq!(a.read(&env.manager), 0);
    assert!(!env.manager.is_pending("Settings"));
    assert_eq!(env.provider.writes(), 0);
}

#[test]
fn test_out_of_order_calls_are_no_ops() {
    let (env, a, _b) = setup(Format::Json);
    env.manager.commit("Settings");
    env.manager.abort("Settings");
    assert!(!env.manager.is_pending("Settings"));
    assert_eq!(env.provider.writes(), 0);

    a.write(&env.manager, &3);
    env.manager.abort("Settings");
    assert_eq!(a.read(&env.manager), 3);
}

#[test]
fn test_document_handle_transactions() {
    let env = TestEnvironment::new();
    let document = env
        .manager
        .register_document(crate::registry::DocumentDescriptor::new("Settings", Format::Json, "settings.json"))
        .unwrap();
    let a = env.manager.register_scalar("Settings", "A", "a", 0u64).unwrap();

    document.begin(&env.manager);
    assert!(document.is_pending(&env.manager));
    a.write(&env.manager, &9);
    document.commit(&env.manager);

    assert!(!document.is_pending(&env.manager));
    assert!(env.read_file("settings.json").contains("\"9\""));
}

#[test]
fn test_commit_without_changes_still_writes() {
    let (env, _a, _b) = setup(Format::Json);
    env.manager.begin("Settings");
    env.manager.commit("Settings");
    assert_eq!(env.provider.writes(), 1);
    assert!(env.file("settings.json").exists());
}
