use std::fmt;
use std::sync::Arc;

use super::manager::SettingsManager;

pub(crate) type LinkAction = Arc<dyn Fn(&SettingsManager) + Send + Sync>;

/// Copies a stored value into a bound variable (`pull`) and back (`push`)
#[derive(Clone)]
pub(crate) struct LinkBinding {
    pub pull: LinkAction,
    pub push: LinkAction,
}

impl LinkBinding {
    pub(crate) fn new<P, Q>(pull: P, push: Q) -> Self
    where
        P: Fn(&SettingsManager) + Send + Sync + 'static,
        Q: Fn(&SettingsManager) + Send + Sync + 'static,
    {
        Self { pull: Arc::new(pull), push: Arc::new(push) }
    }
}

impl fmt::Debug for LinkBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkBinding").finish_non_exhaustive()
    }
}
