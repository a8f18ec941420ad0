//! Host save lifecycle.
//!
//! The host editor announces when it starts and finishes saving. A
//! [`SaveLifecycleObserver`] is handed to the host and receives those
//! events; the [`Store`] implementation commits pending edits when a save
//! starts and marks renderers as saving until it ends.

use crate::action::Action;
use crate::store::Store;

/// Receives the host's save and autosave events.
pub trait SaveLifecycleObserver {
    fn on_save_start(&mut self) {}
    fn on_save_end(&mut self) {}
    fn on_autosave_start(&mut self) {}
    fn on_autosave_end(&mut self) {}
}

impl SaveLifecycleObserver for Store {
    /// Commits every block with pending changes or removes.
    fn on_save_start(&mut self) {
        self.saving = true;
        let pending: Vec<String> = self
            .state()
            .blocks()
            .filter(|(_, block)| block.has_changes() || block.has_removes())
            .map(|(id, _)| id.to_string())
            .collect();

        log::debug!("Save started: committing {} blocks", pending.len());
        for id in pending {
            if let Err(e) = self.dispatch(Action::SaveBlock { id }) {
                log::warn!("Failed to commit block on save: {e}");
            }
        }
    }

    fn on_save_end(&mut self) {
        log::debug!("Save finished");
        self.saving = false;
    }

    fn on_autosave_start(&mut self) {
        self.autosaving = true;
    }

    fn on_autosave_end(&mut self) {
        self.autosaving = false;
    }
}
