#![cfg(test)]

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::common::TestEnvironment;
use crate::handle::Setting;
use crate::registry::DocumentDescriptor;
use crate::tree::Format;

#[test]
fn test_read_and_write_linked_variables() {
    let env = TestEnvironment::new();
    let document = env
        .manager
        .register_document(DocumentDescriptor::new("Settings", Format::Json, "settings.json"))
        .unwrap();
    let speed = env.manager.register_scalar("Settings", "Speed", "speed", 1.5f64).unwrap();
    let tags = env.manager.register_list::<String>("Settings", "Tags", "tags", vec![]).unwrap();
    let limits = env.manager.register_map::<i32>("Settings", "Limits", "limits", BTreeMap::new()).unwrap();

    let speed_var = Arc::new(Mutex::new(0.0));
    let tags_var = Arc::new(Mutex::new(Vec::new()));
    let limits_var = Arc::new(Mutex::new(BTreeMap::new()));
    speed.link(&env.manager, Arc::clone(&speed_var));
    tags.link(&env.manager, Arc::clone(&tags_var));
    limits.link(&env.manager, Arc::clone(&limits_var));

    speed.write(&env.manager, &3.5);
    tags.write(&env.manager, &vec!["red".to_string()]);
    document.read_linked(&env.manager);
    assert_eq!(*speed_var.lock(), 3.5);
    assert_eq!(*tags_var.lock(), vec!["red".to_string()]);
    assert!(limits_var.lock().is_empty());

    let writes_before = env.provider.writes();
    *speed_var.lock() = 9.0;
    tags_var.lock().push("blue".to_string());
    limits_var.lock().insert("max".to_string(), 3);
    document.write_linked(&env.manager);

    assert_eq!(env.provider.writes(), writes_before + 1, "all pushes land in one write");
    assert_eq!(speed.read(&env.manager), 9.0);
    assert_eq!(tags.read(&env.manager), vec!["red", "blue"]);
    assert_eq!(limits.get(&env.manager, "max"), Some(3));
}

#[test]
fn test_later_link_replaces_earlier_one() {
    let env = TestEnvironment::new();
    env.manager
        .register_document(DocumentDescriptor::new("Settings", Format::Ini, "settings.ini"))
        .unwrap();
    let count = env.manager.register_scalar("Settings", "Count", "main.count", 4u32).unwrap();

    let first = Arc::new(Mutex::new(0));
    let second = Arc::new(Mutex::new(0));
    count.link(&env.manager, Arc::clone(&first));
    count.link(&env.manager, Arc::clone(&second));

    env.manager.read_linked("Settings");
    assert_eq!(*first.lock(), 0);
    assert_eq!(*second.lock(), 4);
}

#[test]
fn test_write_linked_inside_transaction_defers_to_commit() {
    let env = TestEnvironment::new();
    env.manager
        .register_document(DocumentDescriptor::new("Settings", Format::Xml, "settings.xml"))
        .unwrap();
    let level = env.manager.register_scalar("Settings", "Level", "app.level", 1u8).unwrap();
    let level_var = Arc::new(Mutex::new(7u8));
    level.link(&env.manager, Arc::clone(&level_var));

    env.manager.begin("Settings");
    env.manager.write_linked("Settings");
    assert!(env.manager.is_pending("Settings"));
    assert_eq!(env.provider.writes(), 0);

    env.manager.commit("Settings");
    assert!(env.read_file("settings.xml").contains("<level>7</level>"));
}
