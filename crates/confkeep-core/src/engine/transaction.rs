//! Begin/commit/abort on an acquired document.
//!
//! While a transaction is pending, dropping a write guard does not persist
//! the tree. Out-of-order calls are no-ops and a nested `begin` joins the
//! transaction already open.
use log::debug;

use super::guard::TreeGuard;

pub(crate) fn begin(guard: &TreeGuard<'_>) {
    if guard.state_mut().begin_transaction() {
        debug!("Transaction opened on {}", guard.path().display());
    }
}

pub(crate) fn commit(guard: &TreeGuard<'_>) {
    let ended = guard.state_mut().end_transaction();
    if ended {
        debug!("Transaction committed on {}", guard.path().display());
        guard.flush(true);
    }
}

pub(crate) fn abort(guard: &TreeGuard<'_>) {
    if guard.state_mut().rollback_transaction() {
        debug!("Transaction aborted on {}", guard.path().display());
    }
}
