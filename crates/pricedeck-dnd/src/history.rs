#![forbid(unsafe_code)]

//! Undo/redo of committed moves.
//!
//! Records locate the item by id rather than by index, so an undo still
//! lands correctly after unrelated reorders in other tiers. Reorders are
//! stored as same-tier transfers, which keeps replay uniform.

use std::collections::VecDeque;

use pricedeck_core::{ContainerId, ItemId, Registry, Result};
use serde::{Deserialize, Serialize};

use crate::executor::MoveOutcome;

/// One committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub item: ItemId,
    pub from: ContainerId,
    pub from_index: usize,
    pub to: ContainerId,
    pub to_index: usize,
}

impl MoveRecord {
    /// Record for an applied outcome; `None` for no-ops.
    #[must_use]
    pub fn from_outcome(outcome: &MoveOutcome) -> Option<Self> {
        match outcome {
            MoveOutcome::Unchanged { .. } => None,
            MoveOutcome::Reordered {
                container,
                item,
                from,
                to,
            } => Some(Self {
                item: item.clone(),
                from: container.clone(),
                from_index: *from,
                to: container.clone(),
                to_index: *to,
            }),
            MoveOutcome::Transferred {
                item,
                from,
                from_index,
                to,
                to_index,
            } => Some(Self {
                item: item.clone(),
                from: from.clone(),
                from_index: *from_index,
                to: to.clone(),
                to_index: *to_index,
            }),
        }
    }

    fn revert(&self, registry: &mut Registry) -> Result<()> {
        registry
            .transfer(&self.to, &self.item, &self.from, self.from_index)
            .map(drop)
    }

    fn replay(&self, registry: &mut Registry) -> Result<()> {
        registry
            .transfer(&self.from, &self.item, &self.to, self.to_index)
            .map(drop)
    }
}

/// Bounded undo stack plus redo stack.
#[derive(Debug, Clone)]
pub struct MoveHistory {
    undo: VecDeque<MoveRecord>,
    redo: Vec<MoveRecord>,
    limit: usize,
}

impl Default for MoveHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

/// Undo depth used when none is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

impl MoveHistory {
    /// History keeping at most `limit` undo steps. `0` disables recording.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            redo: Vec::new(),
            limit,
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Record a fresh commit. Clears the redo stack and evicts the oldest
    /// record past the limit.
    pub fn record(&mut self, record: MoveRecord) {
        self.redo.clear();
        if self.limit == 0 {
            return;
        }
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(record);
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Revert the most recent move. `Ok(None)` when there is nothing to undo.
    ///
    /// A record that no longer applies is dropped and its error returned; the
    /// registry is untouched in that case.
    pub fn undo(&mut self, registry: &mut Registry) -> Result<Option<MoveRecord>> {
        let Some(record) = self.undo.pop_back() else {
            return Ok(None);
        };
        record.revert(registry)?;
        self.redo.push(record.clone());
        Ok(Some(record))
    }

    /// Re-apply the most recently undone move.
    pub fn redo(&mut self, registry: &mut Registry) -> Result<Option<MoveRecord>> {
        let Some(record) = self.redo.pop() else {
            return Ok(None);
        };
        record.replay(registry)?;
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(record.clone());
        Ok(Some(record))
    }
}
