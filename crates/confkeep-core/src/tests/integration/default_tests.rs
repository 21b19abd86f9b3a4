#![cfg(test)]

use std::collections::BTreeMap;

use super::common::{register_document, TestEnvironment, ALL_FORMATS};
use crate::engine::DefaultMode;
use crate::handle::Setting;
use crate::tree::Format;

#[test]
fn test_never_written_values_read_their_default() {
    for format in ALL_FORMATS {
        let env = TestEnvironment::new();
        register_document(&env.manager, format);
        let speed = env.manager.register_scalar("Settings", "Speed", "machine.speed", 1.25f32).unwrap();
        let items = env.manager.register_list("Settings", "Items", "machine.items", vec!['a', 'b']).unwrap();
        let limits = env
            .manager
            .register_map("Settings", "Limits", "machine.limits", BTreeMap::from([("max".to_string(), 10i8)]))
            .unwrap();

        assert_eq!(speed.read(&env.manager), 1.25);
        assert_eq!(items.read(&env.manager), vec!['a', 'b']);
        assert_eq!(limits.read(&env.manager).get("max"), Some(&10));
        assert!(speed.is_default(&env.manager));
        assert!(items.is_default(&env.manager));
        assert!(limits.is_default(&env.manager));

        // Reading never creates the file
        assert!(!env.file(&super::common::file_name(format)).exists(), "{}", format);
    }
}

#[test]
fn test_reset_when_default_means_absent() {
    let env = TestEnvironment::new();
    register_document(&env.manager, Format::Json);
    let speed = env.manager.register_scalar("Settings", "Speed", "machine.speed", 1u8).unwrap();
    let items = env.manager.register_list("Settings", "Items", "machine.items", vec![1u8]).unwrap();

    // Writing the default value still counts as not default in this mode
    speed.write(&env.manager, &1);
    items.write(&env.manager, &vec![2, 3]);
    assert!(!speed.is_default(&env.manager));
    assert!(!items.is_default(&env.manager));

    speed.reset(&env.manager);
    items.reset(&env.manager);
    assert!(speed.is_default(&env.manager));
    assert!(items.is_default(&env.manager));
    assert_eq!(items.read(&env.manager), vec![1]);

    let text = env.read_file("settings.json");
    assert!(!text.contains("speed"), "{}", text);
    assert!(!text.contains("items"), "{}", text);
}

#[test]
fn test_reset_when_default_is_written_in_file() {
    let env = TestEnvironment::new();
    env.manager.set_default_mode(DefaultMode::DefaultValueWrittenInFile);
    register_document(&env.manager, Format::Xml);
    let speed = env.manager.register_scalar("Settings", "Speed", "machine.speed", 7u32).unwrap();
    let ports = env
        .manager
        .register_map("Settings", "Ports", "machine.ports", BTreeMap::from([("http".to_string(), 80u16)]))
        .unwrap();

    assert!(speed.is_default(&env.manager));
    speed.write(&env.manager, &7);
    assert!(speed.is_default(&env.manager), "stored value equals the default");

    speed.write(&env.manager, &8);
    ports.set(&env.manager, "https", &443);
    assert!(!speed.is_default(&env.manager));
    assert!(!ports.is_default(&env.manager));

    speed.reset(&env.manager);
    ports.reset(&env.manager);
    assert!(speed.is_default(&env.manager));
    assert!(ports.is_default(&env.manager));

    let text = env.read_file("settings.xml");
    assert!(text.contains("<speed>7</speed>"), "{}", text);
    assert!(text.contains("<http>80</http>"), "{}", text);
    assert!(!text.contains("https"), "{}", text);
}

#[test]
fn test_scalar_write_keeps_children() {
    let env = TestEnvironment::new();
    env.write_file("settings.xml", r#"<machine><speed unit="m/s">1</speed></machine>"#);
    register_document(&env.manager, Format::Xml);
    let speed = env.manager.register_scalar("Settings", "Speed", "machine.speed", 0i32).unwrap();

    speed.write(&env.manager, &5);
    let text = env.read_file("settings.xml");
    assert!(text.contains(r#"<speed unit="m/s">5</speed>"#), "{}", text);
}
