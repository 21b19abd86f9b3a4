//! Schema version check run once per document load.
use log::{debug, info};

use super::guard::TreeGuard;
use crate::registry::MigrationHook;
use crate::tree::Tree;

/// What a guard needs to know about a document to load it
#[derive(Clone)]
pub(crate) struct LoadSpec {
    pub version_key: String,
    pub schema_version: u32,
    pub migration_hook: Option<MigrationHook>,
}

/// Version stored in `tree`; 0 when absent or not a number
pub fn stored_version(tree: &Tree, version_key: &str) -> u32 {
    tree.get(version_key)
        .and_then(|node| node.data().trim().parse().ok())
        .unwrap_or(0)
}

pub(crate) fn run(guard: &TreeGuard<'_>, spec: &LoadSpec) {
    let stored = stored_version(&guard.tree(), &spec.version_key);
    let declared = spec.schema_version;
    if stored == declared {
        return;
    }

    let Some(hook) = spec.migration_hook.as_ref() else {
        debug!("Stored version {} differs from declared {} and no migration hook is set", stored, declared);
        return;
    };

    // No borrow is held here: the hook may read or write the same document
    if hook(stored, declared) {
        info!("Migrated document at {} from version {} to {}", guard.path().display(), stored, declared);
        guard.tree_mut().put_value(&spec.version_key, declared.to_string());
        guard.flush(true);
    } else {
        debug!("Migration hook declined to bump version {} to {}", stored, declared);
    }
}
