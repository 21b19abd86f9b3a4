//! Typed handles returned by registration.
//!
//! A handle is a small, cloneable description of where a value lives. All
//! operations take the [`SettingsManager`] the handle was registered with.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::codec::SettingValue;
use crate::engine::{AccessMode, DefaultMode, LinkBinding, SettingsManager};
use crate::error::Result;
use crate::registry::DocumentDescriptor;

/// Operations shared by scalar, list and map values
pub trait Setting: Clone + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + 'static;

    fn document(&self) -> &str;

    fn name(&self) -> &str;

    fn key_path(&self) -> &str;

    fn default_value(&self) -> &Self::Value;

    /// Stored value, or `None` when the key path is absent
    fn stored(&self, manager: &SettingsManager) -> Option<Self::Value>;

    fn write(&self, manager: &SettingsManager, value: &Self::Value);

    /// Stored value, falling back to the declared default
    fn read(&self, manager: &SettingsManager) -> Self::Value {
        self.stored(manager).unwrap_or_else(|| self.default_value().clone())
    }

    fn reset(&self, manager: &SettingsManager) {
        match manager.default_mode() {
            DefaultMode::DefaultValueIfAbsentFromFile => {
                manager.with_document(self.document(), AccessMode::Write, |guard| {
                    guard.tree_mut().erase(self.key_path());
                });
            }
            DefaultMode::DefaultValueWrittenInFile => self.write(manager, self.default_value()),
        }
    }

    fn is_default(&self, manager: &SettingsManager) -> bool {
        match manager.default_mode() {
            DefaultMode::DefaultValueIfAbsentFromFile => !manager
                .with_document(self.document(), AccessMode::Read, |guard| guard.tree().contains(self.key_path()))
                .unwrap_or(false),
            DefaultMode::DefaultValueWrittenInFile => self.read(manager) == *self.default_value(),
        }
    }

    /// Bind `target` to this value. `read_linked` on the document copies the
    /// stored value into it and `write_linked` stores it back. Replaces any
    /// earlier binding of the same value.
    fn link(&self, manager: &SettingsManager, target: Arc<Mutex<Self::Value>>) {
        let pull = (self.clone(), Arc::clone(&target));
        let push = (self.clone(), target);
        manager.bind_link(
            self.document(),
            self.name(),
            LinkBinding::new(
                move |manager| {
                    let value = pull.0.read(manager);
                    *pull.1.lock() = value;
                },
                move |manager| {
                    let value = push.1.lock().clone();
                    push.0.write(manager, &value);
                },
            ),
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Location {
    document: String,
    name: String,
    key_path: String,
}

impl Location {
    fn new(document: &str, name: &str, key_path: &str) -> Self {
        Self { document: document.to_string(), name: name.to_string(), key_path: key_path.to_string() }
    }
}

/// A single primitive value
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSetting<T> {
    location: Location,
    default: T,
}

impl<T: SettingValue> ScalarSetting<T> {
    pub(crate) fn new(document: &str, name: &str, key_path: &str, default: T) -> Self {
        Self { location: Location::new(document, name, key_path), default }
    }
}

impl<T: SettingValue> Setting for ScalarSetting<T> {
    type Value = T;

    fn document(&self) -> &str {
        &self.location.document
    }

    fn name(&self) -> &str {
        &self.location.name
    }

    fn key_path(&self) -> &str {
        &self.location.key_path
    }

    fn default_value(&self) -> &T {
        &self.default
    }

    fn stored(&self, manager: &SettingsManager) -> Option<T> {
        manager
            .with_document(self.document(), AccessMode::Read, |guard| {
                manager.codec(guard.format()).read_scalar(&guard.tree(), self.key_path())
            })
            .flatten()
    }

    fn write(&self, manager: &SettingsManager, value: &T) {
        manager.with_document(self.document(), AccessMode::Write, |guard| {
            let codec = manager.codec(guard.format());
            codec.write_scalar(&mut guard.tree_mut(), self.key_path(), value);
        });
    }
}

/// An ordered sequence of primitive values
#[derive(Debug, Clone, PartialEq)]
pub struct ListSetting<T> {
    location: Location,
    default: Vec<T>,
}

impl<T: SettingValue> ListSetting<T> {
    pub(crate) fn new(document: &str, name: &str, key_path: &str, default: Vec<T>) -> Self {
        Self { location: Location::new(document, name, key_path), default }
    }

    /// Append one element without rewriting the others
    pub fn add(&self, manager: &SettingsManager, value: &T) {
        manager.with_document(self.document(), AccessMode::Write, |guard| {
            let codec = manager.codec(guard.format());
            codec.add_to_list(&mut guard.tree_mut(), self.key_path(), value);
        });
    }
}

impl<T: SettingValue> Setting for ListSetting<T> {
    type Value = Vec<T>;

    fn document(&self) -> &str {
        &self.location.document
    }

    fn name(&self) -> &str {
        &self.location.name
    }

    fn key_path(&self) -> &str {
        &self.location.key_path
    }

    fn default_value(&self) -> &Vec<T> {
        &self.default
    }

    fn stored(&self, manager: &SettingsManager) -> Option<Vec<T>> {
        manager
            .with_document(self.document(), AccessMode::Read, |guard| {
                manager.codec(guard.format()).read_list(&guard.tree(), self.key_path())
            })
            .flatten()
    }

    fn write(&self, manager: &SettingsManager, value: &Vec<T>) {
        manager.with_document(self.document(), AccessMode::Write, |guard| {
            let codec = manager.codec(guard.format());
            codec.write_list(&mut guard.tree_mut(), self.key_path(), value);
        });
    }
}

/// String-keyed primitive values, iterated in key order
#[derive(Debug, Clone, PartialEq)]
pub struct MapSetting<T> {
    location: Location,
    default: BTreeMap<String, T>,
}

impl<T: SettingValue> MapSetting<T> {
    pub(crate) fn new(document: &str, name: &str, key_path: &str, default: BTreeMap<String, T>) -> Self {
        Self { location: Location::new(document, name, key_path), default }
    }

    /// Create or replace one entry, leaving the others untouched
    pub fn set(&self, manager: &SettingsManager, key: &str, value: &T) {
        manager.with_document(self.document(), AccessMode::Write, |guard| {
            let codec = manager.codec(guard.format());
            codec.set_map_entry(&mut guard.tree_mut(), self.key_path(), key, value);
        });
    }

    /// One entry of the map as read by [`Setting::read`]
    pub fn get(&self, manager: &SettingsManager, key: &str) -> Option<T> {
        self.read(manager).remove(key)
    }
}

impl<T: SettingValue> Setting for MapSetting<T> {
    type Value = BTreeMap<String, T>;

    fn document(&self) -> &str {
        &self.location.document
    }

    fn name(&self) -> &str {
        &self.location.name
    }

    fn key_path(&self) -> &str {
        &self.location.key_path
    }

    fn default_value(&self) -> &BTreeMap<String, T> {
        &self.default
    }

    fn stored(&self, manager: &SettingsManager) -> Option<BTreeMap<String, T>> {
        manager
            .with_document(self.document(), AccessMode::Read, |guard| {
                manager.codec(guard.format()).read_map(&guard.tree(), self.key_path())
            })
            .flatten()
    }

    fn write(&self, manager: &SettingsManager, value: &BTreeMap<String, T>) {
        manager.with_document(self.document(), AccessMode::Write, |guard| {
            let codec = manager.codec(guard.format());
            codec.write_map(&mut guard.tree_mut(), self.key_path(), value);
        });
    }
}

/// A registered document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDocument {
    name: String,
}

impl SettingsDocument {
    pub(crate) fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self, manager: &SettingsManager) -> Option<DocumentDescriptor> {
        manager.get_document(&self.name)
    }

    pub fn path(&self, manager: &SettingsManager) -> Option<PathBuf> {
        manager.document_path(&self.name)
    }

    pub fn begin(&self, manager: &SettingsManager) {
        manager.begin(&self.name);
    }

    pub fn commit(&self, manager: &SettingsManager) {
        manager.commit(&self.name);
    }

    pub fn abort(&self, manager: &SettingsManager) {
        manager.abort(&self.name);
    }

    pub fn is_pending(&self, manager: &SettingsManager) -> bool {
        manager.is_pending(&self.name)
    }

    pub fn backup(&self, manager: &SettingsManager, folder: &Path) -> Result<()> {
        manager.backup_document_to(&self.name, folder)
    }

    pub fn restore(&self, manager: &SettingsManager, folder: &Path) -> Result<()> {
        manager.restore_document_from(&self.name, folder)
    }

    pub fn read_linked(&self, manager: &SettingsManager) {
        manager.read_linked(&self.name);
    }

    pub fn write_linked(&self, manager: &SettingsManager) {
        manager.write_linked(&self.name);
    }
}
