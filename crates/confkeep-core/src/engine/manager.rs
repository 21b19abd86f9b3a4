use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::{Mutex, RwLock};

use super::document::{DocumentCell, DocumentState};
use super::guard::{AccessMode, TreeGuard};
use super::link::LinkBinding;
use super::migration::LoadSpec;
use super::options::{DefaultMode, SettingsOptions};
use super::transaction;
use crate::codec::{Codec, SettingValue};
use crate::error::Result;
use crate::handle::{ListSetting, MapSetting, ScalarSetting, SettingsDocument};
use crate::registry::{DocumentDescriptor, Registry, RegistryError, ValueDescriptor, ValueKind};
use crate::storage::{StorageProvider, StorageSystemError};
use crate::tree::{Format, Tree};

/// Document states keyed both by document name and by resolved path.
/// Two documents resolving to the same file share one state.
#[derive(Default)]
struct DocumentCache {
    by_name: HashMap<String, Arc<DocumentCell>>,
    by_path: HashMap<PathBuf, Arc<DocumentCell>>,
}

/// Entry point of the settings engine.
///
/// Owns the document and value registries, the document state cache, the
/// path placeholders, the engine options and the linked-variable bindings.
/// Every typed handle operation takes the manager it was registered with.
pub struct SettingsManager {
    provider: Arc<dyn StorageProvider>,
    options: RwLock<SettingsOptions>,
    placeholders: RwLock<HashMap<String, String>>,
    registry: RwLock<Registry>,
    cache: Mutex<DocumentCache>,
    links: Mutex<HashMap<(String, String), LinkBinding>>,
}

impl fmt::Debug for SettingsManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsManager")
            .field("provider", &self.provider)
            .field("options", &*self.options.read())
            .field("registry", &*self.registry.read())
            .finish_non_exhaustive()
    }
}

impl SettingsManager {
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self::with_options(provider, SettingsOptions::default())
    }

    pub fn with_options(provider: Arc<dyn StorageProvider>, options: SettingsOptions) -> Self {
        debug!("Creating settings manager over {} storage", provider.name());
        Self {
            provider,
            options: RwLock::new(options),
            placeholders: RwLock::new(HashMap::new()),
            registry: RwLock::new(Registry::new()),
            cache: Mutex::new(DocumentCache::default()),
            links: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    pub fn options(&self) -> SettingsOptions {
        self.options.read().clone()
    }

    /// Rename the reserved version key. Call before registering values.
    pub fn set_version_key_name(&self, name: impl Into<String>) {
        self.options.write().version_key = name.into();
    }

    pub fn set_xml_list_element_name(&self, name: impl Into<String>) {
        self.options.write().xml_list_element = name.into();
    }

    pub fn set_default_mode(&self, mode: DefaultMode) {
        self.options.write().default_mode = mode;
    }

    pub fn default_mode(&self) -> DefaultMode {
        self.options.read().default_mode
    }

    /// Codec for `format` using the current options
    pub fn codec(&self, format: Format) -> Codec {
        Codec::new(format, self.options.read().xml_list_element.clone())
    }

    // --- Placeholders ---

    /// Define `@{name}`. Only documents first accessed afterwards see it.
    pub fn set_placeholder(&self, name: impl Into<String>, value: impl Into<String>) {
        self.placeholders.write().insert(name.into(), value.into());
    }

    /// Substitute every known `@{name}` token in `template`
    pub fn resolve_path(&self, template: &str) -> String {
        let placeholders = self.placeholders.read();
        let mut resolved = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("@{") {
            resolved.push_str(&rest[..start]);
            let token = &rest[start..];
            let Some(end) = token.find('}') else {
                resolved.push_str(token);
                rest = "";
                break;
            };
            let name = &token[2..end];
            match placeholders.get(name) {
                Some(value) => resolved.push_str(value),
                None => {
                    debug!("Unknown placeholder '{}' left in path '{}'", name, template);
                    resolved.push_str(&token[..=end]);
                }
            }
            rest = &token[end + 1..];
        }
        resolved.push_str(rest);
        resolved
    }

    // --- Registration ---

    pub fn register_document(&self, descriptor: DocumentDescriptor) -> Result<SettingsDocument> {
        let handle = SettingsDocument::new(descriptor.name());
        debug!("Registering document '{}' ({})", descriptor.name(), descriptor.format());
        self.registry.write().register_document(descriptor)?;
        Ok(handle)
    }

    pub fn register_value(&self, descriptor: ValueDescriptor) -> Result<()> {
        let version_key = self.options.read().version_key.clone();
        self.registry.write().register_value(descriptor, &version_key)?;
        Ok(())
    }

    fn codec_for_document(&self, document: &str) -> Result<Codec> {
        let format = self
            .registry
            .read()
            .lookup_document(document)
            .map(DocumentDescriptor::format)
            .ok_or_else(|| RegistryError::UnknownDocument { document: document.to_string() })?;
        Ok(self.codec(format))
    }

    pub fn register_scalar<T: SettingValue>(
        &self,
        document: &str,
        name: &str,
        key_path: &str,
        default: T,
    ) -> Result<ScalarSetting<T>> {
        let encoded = self.codec_for_document(document)?.encode_scalar(&default);
        self.register_value(ValueDescriptor::new(
            document,
            name,
            ValueKind::Scalar,
            T::type_name(),
            key_path,
            encoded,
        ))?;
        Ok(ScalarSetting::new(document, name, key_path, default))
    }

    pub fn register_list<T: SettingValue>(
        &self,
        document: &str,
        name: &str,
        key_path: &str,
        default: Vec<T>,
    ) -> Result<ListSetting<T>> {
        let encoded = self.codec_for_document(document)?.encode_list(&default);
        self.register_value(ValueDescriptor::new(
            document,
            name,
            ValueKind::List,
            T::type_name(),
            key_path,
            encoded,
        ))?;
        Ok(ListSetting::new(document, name, key_path, default))
    }

    pub fn register_map<T: SettingValue>(
        &self,
        document: &str,
        name: &str,
        key_path: &str,
        default: BTreeMap<String, T>,
    ) -> Result<MapSetting<T>> {
        let encoded = self.codec_for_document(document)?.encode_map(&default);
        self.register_value(ValueDescriptor::new(
            document,
            name,
            ValueKind::Map,
            T::type_name(),
            key_path,
            encoded,
        ))?;
        Ok(MapSetting::new(document, name, key_path, default))
    }

    // --- Introspection ---

    pub fn list_document_names(&self) -> Vec<String> {
        self.registry.read().list_documents()
    }

    pub fn list_value_names(&self, document: &str) -> Vec<String> {
        self.registry.read().list_values(document)
    }

    pub fn get_document(&self, name: &str) -> Option<DocumentDescriptor> {
        self.registry.read().lookup_document(name).cloned()
    }

    pub fn get_value(&self, document: &str, name: &str) -> Option<ValueDescriptor> {
        self.registry.read().lookup_value(document, name).cloned()
    }

    /// Resolved path of `document`, fixing its placeholders if not done yet
    pub fn document_path(&self, document: &str) -> Option<PathBuf> {
        let (cell, _) = self.open(document)?;
        let state = cell.lock();
        let path = state.borrow().path().to_path_buf();
        Some(path)
    }

    // --- Document access ---

    fn open(&self, document: &str) -> Option<(Arc<DocumentCell>, LoadSpec)> {
        let Some(descriptor) = self.get_document(document) else {
            debug!("Document '{}' is not registered", document);
            return None;
        };
        let spec = LoadSpec {
            version_key: self.options.read().version_key.clone(),
            schema_version: descriptor.schema_version(),
            migration_hook: descriptor.migration_hook().cloned(),
        };

        let cached = self.cache.lock().by_name.get(document).cloned();
        if let Some(cell) = cached {
            return Some((cell, spec));
        }

        let path = PathBuf::from(self.resolve_path(descriptor.path_template()));
        let mut cache = self.cache.lock();
        if let Some(cell) = cache.by_name.get(document) {
            return Some((Arc::clone(cell), spec));
        }
        let cell = cache
            .by_path
            .entry(path.clone())
            .or_insert_with(|| {
                debug!("Document '{}' resolved to {}", document, path.display());
                Arc::new(DocumentCell::new(DocumentState::new(document, path.clone(), descriptor.format())))
            })
            .clone();
        cache.by_name.insert(document.to_string(), Arc::clone(&cell));
        Some((cell, spec))
    }

    /// Run `f` with the document locked and loaded.
    ///
    /// Returns `None` for unknown documents. With [`AccessMode::Write`] the
    /// tree is persisted afterwards unless a transaction is pending. `f` may
    /// call back into the manager, including for the same document, as long
    /// as it does not hold a tree borrow while doing so.
    pub fn with_document<R>(&self, document: &str, mode: AccessMode, f: impl FnOnce(&TreeGuard<'_>) -> R) -> Option<R> {
        let (cell, spec) = self.open(document)?;
        let guard = TreeGuard::acquire(&cell, self.provider.as_ref(), mode, &spec);
        Some(f(&guard))
    }

    // --- Transactions ---

    pub fn begin(&self, document: &str) {
        self.with_document(document, AccessMode::Read, transaction::begin);
    }

    pub fn commit(&self, document: &str) {
        self.with_document(document, AccessMode::Read, transaction::commit);
    }

    pub fn abort(&self, document: &str) {
        self.with_document(document, AccessMode::Read, transaction::abort);
    }

    pub fn is_pending(&self, document: &str) -> bool {
        self.with_document(document, AccessMode::Read, |guard| guard.is_pending())
            .unwrap_or(false)
    }

    // --- Backup / restore ---

    fn unknown_document(document: &str) -> crate::error::Error {
        RegistryError::UnknownDocument { document: document.to_string() }.into()
    }

    fn backup_location(source: &Path, folder: &Path) -> Result<PathBuf> {
        let file_name = source.file_name().ok_or_else(|| StorageSystemError::InvalidPath {
            path: source.to_path_buf(),
            reason: "document path has no file name".to_string(),
        })?;
        Ok(folder.join(file_name))
    }

    /// Copy the document's file into `folder`, keeping its file name
    pub fn backup_document_to(&self, document: &str, folder: &Path) -> Result<()> {
        let (cell, spec) = self.open(document).ok_or_else(|| Self::unknown_document(document))?;
        let guard = TreeGuard::acquire(&cell, self.provider.as_ref(), AccessMode::Read, &spec);
        let source = guard.path();
        let target = Self::backup_location(&source, folder)?;
        self.provider.copy(&source, &target)?;
        debug!("Backed up document '{}' to {}", document, target.display());
        Ok(())
    }

    /// Copy a backup from `folder` over the document's file and reload it.
    /// Any pending transaction is discarded.
    pub fn restore_document_from(&self, document: &str, folder: &Path) -> Result<()> {
        let (cell, spec) = self.open(document).ok_or_else(|| Self::unknown_document(document))?;
        let guard = TreeGuard::acquire(&cell, self.provider.as_ref(), AccessMode::Read, &spec);
        let target = guard.path();
        let source = Self::backup_location(&target, folder)?;
        self.provider.copy(&source, &target)?;
        if guard.is_pending() {
            warn!("Restoring document '{}' discards its pending transaction", document);
        }
        guard.reload(&spec);
        debug!("Restored document '{}' from {}", document, source.display());
        Ok(())
    }

    // --- Type-erased value access ---

    /// Stored value rendered for display, or the declared default
    pub fn read_value_string(&self, document: &str, name: &str) -> Option<String> {
        let descriptor = self.get_value(document, name)?;
        let stored = self
            .with_document(document, AccessMode::Read, |guard| {
                guard.tree().get(descriptor.key_path()).map(Tree::to_display_string)
            })
            .flatten();
        Some(stored.unwrap_or_else(|| descriptor.default_tree().to_display_string()))
    }

    /// Whether the value is at its default under the current [`DefaultMode`]
    pub fn is_default_value(&self, document: &str, name: &str) -> Option<bool> {
        let descriptor = self.get_value(document, name)?;
        let mode = self.default_mode();
        self.with_document(document, AccessMode::Read, |guard| {
            let tree = guard.tree();
            let stored = tree.get(descriptor.key_path());
            match mode {
                DefaultMode::DefaultValueIfAbsentFromFile => stored.is_none(),
                DefaultMode::DefaultValueWrittenInFile => {
                    stored.is_none_or(|node| matches_default(&descriptor, node))
                }
            }
        })
    }

    /// Reset the value under the current [`DefaultMode`]. Returns false for
    /// unknown values.
    pub fn reset_value(&self, document: &str, name: &str) -> bool {
        let Some(descriptor) = self.get_value(document, name) else {
            return false;
        };
        let mode = self.default_mode();
        self.with_document(document, AccessMode::Write, |guard| {
            let mut tree = guard.tree_mut();
            match mode {
                DefaultMode::DefaultValueIfAbsentFromFile => {
                    tree.erase(descriptor.key_path());
                }
                DefaultMode::DefaultValueWrittenInFile => match descriptor.kind() {
                    ValueKind::Scalar => tree.put_value(descriptor.key_path(), descriptor.default_tree().data()),
                    ValueKind::List | ValueKind::Map => {
                        tree.put(descriptor.key_path(), descriptor.default_tree().clone());
                    }
                },
            }
        })
        .is_some()
    }

    // --- Linked variables ---

    pub(crate) fn bind_link(&self, document: &str, name: &str, binding: LinkBinding) {
        let previous = self.links.lock().insert((document.to_string(), name.to_string()), binding);
        if previous.is_some() {
            debug!("Replaced link binding of '{}.{}'", document, name);
        }
    }

    fn bindings_of(&self, document: &str) -> Vec<LinkBinding> {
        let names = self.list_value_names(document);
        let links = self.links.lock();
        names
            .into_iter()
            .filter_map(|name| links.get(&(document.to_string(), name)).cloned())
            .collect()
    }

    /// Copy every linked value of `document` into its bound variable
    pub fn read_linked(&self, document: &str) {
        let bindings = self.bindings_of(document);
        self.with_document(document, AccessMode::Read, |_| {
            for binding in &bindings {
                (binding.pull)(self);
            }
        });
    }

    /// Store every bound variable of `document` and write the file once
    pub fn write_linked(&self, document: &str) {
        let bindings = self.bindings_of(document);
        self.with_document(document, AccessMode::Read, |guard| {
            let opened = guard.state_mut().begin_transaction();
            for binding in &bindings {
                (binding.push)(self);
            }
            if opened {
                guard.state_mut().end_transaction();
                guard.flush(false);
            }
        });
    }
}

fn matches_default(descriptor: &ValueDescriptor, stored: &Tree) -> bool {
    let default = descriptor.default_tree();
    match descriptor.kind() {
        ValueKind::Scalar => stored.data() == default.data(),
        ValueKind::List | ValueKind::Map => stored
            .value_children()
            .map(|(key, node)| (key, node.data()))
            .eq(default.value_children().map(|(key, node)| (key, node.data()))),
    }
}
