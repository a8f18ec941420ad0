//! Actions and state transitions.
//!
//! Every mutation of [`ViewportState`] is an [`Action`]. [`reduce`] is the
//! pure transition `(state, action) -> state`; [`ViewportState::apply`]
//! performs the same transition in place and reports which parts of the
//! state changed.

use bitflags::bitflags;
use serde_json::Value;
use vcss::Viewport;
use vcss::object::StylePath;

use crate::breakpoints::Breakpoints;
use crate::error::Result;
use crate::state::{BlockId, BlockState, ViewportState, style_root};

bitflags! {
    /// Parts of a block's state touched by an action.
    ///
    /// ```
    /// use viewport::StateChanges;
    ///
    /// let changes = StateChanges::CHANGES | StateChanges::VALIDS;
    /// assert!(changes.contains(StateChanges::VALIDS));
    /// assert!(!changes.contains(StateChanges::SAVES));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StateChanges: u8 {
        const SAVES   = 0b0000_0001;
        const CHANGES = 0b0000_0010;
        const REMOVES = 0b0000_0100;
        const VALIDS  = 0b0000_1000;
        /// A block was registered or removed.
        const BLOCKS  = 0b0001_0000;
    }
}

impl StateChanges {
    /// Compares two states of the same block.
    pub fn between(before: &BlockState, after: &BlockState) -> Self {
        let mut changes = Self::empty();
        changes.set(Self::SAVES, before.saves != after.saves);
        changes.set(Self::CHANGES, before.changes != after.changes);
        changes.set(Self::REMOVES, before.removes != after.removes);
        changes.set(Self::VALIDS, before.valids != after.valids);
        changes
    }
}

/// A state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A block was mounted. Its attributes seed the block's saves; an
    /// existing block with the same id is replaced.
    RegisterBlockInit { id: BlockId, attributes: Value },
    /// The block's style attribute changed while previewing `viewport`.
    UpdateBlockChanges {
        id: BlockId,
        attributes: Value,
        viewport: Viewport,
    },
    /// The block was unmounted or deleted.
    RemoveBlock { id: BlockId },
    /// Unset saved properties at `viewport` (all of them when `paths` is `None`).
    RemoveBlockSaves {
        id: BlockId,
        viewport: Viewport,
        paths: Option<Vec<StylePath>>,
    },
    /// Undo removes at `viewport` (all of them when `paths` is `None`).
    RestoreBlockSaves {
        id: BlockId,
        viewport: Viewport,
        paths: Option<Vec<StylePath>>,
    },
    /// Commit pending changes and removes into saves.
    SaveBlock { id: BlockId },
}

impl Action {
    pub fn block_id(&self) -> &str {
        match self {
            Action::RegisterBlockInit { id, .. }
            | Action::UpdateBlockChanges { id, .. }
            | Action::RemoveBlock { id }
            | Action::RemoveBlockSaves { id, .. }
            | Action::RestoreBlockSaves { id, .. }
            | Action::SaveBlock { id } => id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::RegisterBlockInit { .. } => "registerBlockInit",
            Action::UpdateBlockChanges { .. } => "updateBlockChanges",
            Action::RemoveBlock { .. } => "removeBlock",
            Action::RemoveBlockSaves { .. } => "removeBlockSaves",
            Action::RestoreBlockSaves { .. } => "restoreBlockSaves",
            Action::SaveBlock { .. } => "saveBlock",
        }
    }
}

/// Pure transition: returns the state after `action`, leaving `state` as is.
pub fn reduce(state: &ViewportState, action: Action) -> Result<ViewportState> {
    let mut next = state.clone();
    next.apply(action)?;
    Ok(next)
}

impl ViewportState {
    /// Applies `action` in place.
    ///
    /// Fails with [`StoreError::UnknownBlock`](crate::StoreError::UnknownBlock)
    /// when the action targets a block that was never registered; the state
    /// is unchanged in that case.
    pub fn apply(&mut self, action: Action) -> Result<StateChanges> {
        log::debug!("{} '{}'", action.name(), action.block_id());

        match action {
            Action::RegisterBlockInit { id, attributes } => {
                let mut block = BlockState::from_attributes(&attributes);
                block.settle(self.breakpoints());
                let changes = match self.block(&id) {
                    Some(previous) => StateChanges::between(previous, &block),
                    None => StateChanges::all(),
                };
                self.insert_block(id, block);
                Ok(changes)
            }
            Action::UpdateBlockChanges {
                id,
                attributes,
                viewport,
            } => {
                let incoming = style_root(&attributes);
                self.mutate_block(&id, |block, breakpoints| {
                    block.update_changes(&incoming, viewport, breakpoints)
                })
            }
            Action::RemoveBlock { id } => {
                self.try_block(&id)?;
                self.remove_block(&id);
                Ok(StateChanges::all())
            }
            Action::RemoveBlockSaves {
                id,
                viewport,
                paths,
            } => self.mutate_block(&id, |block, breakpoints| {
                block.remove_saves(viewport, paths.as_deref(), breakpoints)
            }),
            Action::RestoreBlockSaves {
                id,
                viewport,
                paths,
            } => self.mutate_block(&id, |block, breakpoints| {
                block.restore_saves(viewport, paths.as_deref(), breakpoints)
            }),
            Action::SaveBlock { id } => {
                self.mutate_block(&id, |block, breakpoints| block.commit(breakpoints))
            }
        }
    }

    fn mutate_block<F>(&mut self, id: &str, mutate: F) -> Result<StateChanges>
    where
        F: FnOnce(&mut BlockState, &Breakpoints),
    {
        let breakpoints = self.breakpoints().clone();
        let block = self.block_mut(id)?;
        let before = block.clone();
        mutate(block, &breakpoints);
        let changes = StateChanges::between(&before, block);
        log::trace!("'{}' changed: {:?}", id, changes);
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use crate::testing::breakpoints;
    use serde_json::json;

    fn register(state: &mut ViewportState, id: &str, style: Value) -> StateChanges {
        state
            .apply(Action::RegisterBlockInit {
                id: id.to_string(),
                attributes: json!({ "style": style }),
            })
            .unwrap()
    }

    #[test]
    fn test_reduce_leaves_input_untouched() {
        let state = ViewportState::new(breakpoints());
        let next = reduce(
            &state,
            Action::RegisterBlockInit {
                id: "b1".into(),
                attributes: json!({ "style": { "width": "1px" } }),
            },
        )
        .unwrap();
        assert!(state.is_empty());
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn test_unknown_block_is_an_error() {
        let mut state = ViewportState::new(breakpoints());
        let result = state.apply(Action::SaveBlock { id: "missing".into() });
        assert!(matches!(result, Err(StoreError::UnknownBlock(id)) if id == "missing"));
        assert!(matches!(
            state.apply(Action::RemoveBlock { id: "missing".into() }),
            Err(StoreError::UnknownBlock(_))
        ));
    }

    #[test]
    fn test_reported_changes() {
        let mut state = ViewportState::new(breakpoints());
        assert_eq!(register(&mut state, "b1", json!({ "width": "1px" })), StateChanges::all());

        let changes = state
            .apply(Action::UpdateBlockChanges {
                id: "b1".into(),
                attributes: json!({ "style": { "width": "2px" } }),
                viewport: 768,
            })
            .unwrap();
        assert_eq!(changes, StateChanges::CHANGES | StateChanges::VALIDS);

        let changes = state
            .apply(Action::UpdateBlockChanges {
                id: "b1".into(),
                attributes: json!({ "style": { "width": "2px" } }),
                viewport: 768,
            })
            .unwrap();
        assert!(changes.is_empty());

        let changes = state.apply(Action::SaveBlock { id: "b1".into() }).unwrap();
        assert_eq!(changes, StateChanges::SAVES | StateChanges::CHANGES);
    }

    #[test]
    fn test_remove_block_drops_all_state() {
        let mut state = ViewportState::new(breakpoints());
        register(&mut state, "b1", json!({ "width": "1px" }));
        state.apply(Action::RemoveBlock { id: "b1".into() }).unwrap();
        assert!(state.block("b1").is_none());
    }
}
