use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy::primitives::{Address, B256, U256};

use sbt_mint_core::{DisplayPort, MintControlState, StatusMessage};

/// Everything the widget renders, captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub status: Option<StatusMessage>,
    pub control: MintControlState,
    pub total_supply: Option<U256>,
    pub owned_count: Option<U256>,
    pub account: Option<Address>,
    pub last_transaction: Option<B256>,
    /// Bumped on every write so renderers can skip unchanged frames.
    pub revision: u64,
}

/// Display port backed by a shared snapshot; clones observe the same view.
#[derive(Debug, Clone, Default)]
pub struct SharedView {
    inner: Arc<Mutex<ViewSnapshot>>,
}

impl SharedView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.lock().clone()
    }

    // Poisoning is recovered from.
    fn lock(&self) -> MutexGuard<'_, ViewSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut ViewSnapshot)) {
        let mut view = self.lock();
        f(&mut view);
        view.revision = view.revision.wrapping_add(1);
    }
}

impl DisplayPort for SharedView {
    fn show_status(&self, status: StatusMessage) {
        self.update(|v| v.status = Some(status));
    }

    fn set_mint_control(&self, state: MintControlState) {
        self.update(|v| v.control = state);
    }

    fn set_total_supply(&self, supply: U256) {
        self.update(|v| v.total_supply = Some(supply));
    }

    fn set_owned_count(&self, count: Option<U256>) {
        self.update(|v| v.owned_count = count);
    }

    fn set_account(&self, account: Option<Address>) {
        self.update(|v| v.account = account);
    }

    fn set_last_transaction(&self, tx_hash: Option<B256>) {
        self.update(|v| v.last_transaction = tx_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_snapshot() {
        let view = SharedView::new();
        let handle = view.clone();
        handle.show_status(StatusMessage::error("Mint failed: Unknown error"));
        handle.set_mint_control(MintControlState::Connected);

        let snap = view.snapshot();
        assert_eq!(snap.control, MintControlState::Connected);
        assert!(snap.status.expect("status").is_error());
        assert_eq!(snap.revision, 2);
    }
}
