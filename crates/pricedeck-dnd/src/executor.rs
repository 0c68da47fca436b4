#![forbid(unsafe_code)]

//! Move execution: turn a closed drag session into a registry mutation.
//!
//! Planning and applying are split so a plan can be inspected (or logged)
//! before the registry is touched.
//!
//! # Decision table
//!
//! | candidate                         | plan                                  |
//! |-----------------------------------|---------------------------------------|
//! | none                              | no-op                                 |
//! | the source item itself            | no-op                                 |
//! | other item, same tier             | reorder to that item's index          |
//! | empty space, same tier            | reorder to the last index             |
//! | item, other tier                  | transfer before that item             |
//! | empty space, other tier           | transfer appending                    |
//! | unknown tier                      | no-op (logged)                        |
//!
//! A candidate item that is no longer in its tier (stale reference) is
//! treated as empty space in that tier.

use pricedeck_core::{ContainerId, ItemId, ItemRef, Registry, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::session::ClosedSession;

/// Why a release produced no change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveNoopReason {
    /// Released with nothing under the pointer.
    NoCandidate,
    /// Released over the dragged item's own slot.
    DroppedOnSelf,
    /// The computed destination equals the current position.
    AlreadyInPlace,
    /// The candidate tier does not exist.
    UnknownTarget,
    /// A contract violation was recovered as a snap-back.
    Rejected,
}

/// A resolved move, not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePlan {
    Noop(MoveNoopReason),
    Reorder {
        container: ContainerId,
        item: ItemId,
        from: usize,
        to: usize,
    },
    Transfer {
        source: ItemRef,
        from_index: usize,
        target: ContainerId,
        index: usize,
    },
}

/// What an applied plan did to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveOutcome {
    Unchanged {
        reason: MoveNoopReason,
    },
    Reordered {
        container: ContainerId,
        item: ItemId,
        from: usize,
        to: usize,
    },
    Transferred {
        item: ItemId,
        from: ContainerId,
        from_index: usize,
        to: ContainerId,
        to_index: usize,
    },
}

impl MoveOutcome {
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }

    #[must_use]
    pub const fn unchanged(reason: MoveNoopReason) -> Self {
        Self::Unchanged { reason }
    }
}

/// Stateless planner/applier for closed sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveExecutor;

impl MoveExecutor {
    /// Work out what releasing `session` over its last candidate means.
    ///
    /// Fails only when the source item itself is gone; everything else
    /// degrades to a no-op or an append.
    pub fn plan(session: &ClosedSession, registry: &Registry) -> Result<MovePlan> {
        let source = &session.source;
        let from = registry.position_of(&source.container, &source.item)?;

        let Some(candidate) = session.candidate.as_ref() else {
            return Ok(MovePlan::Noop(MoveNoopReason::NoCandidate));
        };
        if candidate.is_item(source) {
            return Ok(MovePlan::Noop(MoveNoopReason::DroppedOnSelf));
        }
        let Ok(target_items) = registry.get(&candidate.container) else {
            warn!(
                source = %source,
                target = %candidate.container,
                "drop target tier no longer exists; ignoring release"
            );
            return Ok(MovePlan::Noop(MoveNoopReason::UnknownTarget));
        };

        let anchor = match candidate.item.as_ref() {
            Some(item) => {
                let found = target_items.iter().position(|entry| &entry.id == item);
                if found.is_none() {
                    warn!(
                        source = %source,
                        target = %candidate.container,
                        stale = %item,
                        "drop candidate item is stale; appending instead"
                    );
                }
                found
            }
            None => None,
        };

        if candidate.container == source.container {
            // Empty space in the own tier means "move to the end".
            let to = anchor.unwrap_or(target_items.len().saturating_sub(1));
            if to == from {
                return Ok(MovePlan::Noop(MoveNoopReason::AlreadyInPlace));
            }
            return Ok(MovePlan::Reorder {
                container: source.container.clone(),
                item: source.item.clone(),
                from,
                to,
            });
        }

        Ok(MovePlan::Transfer {
            source: source.clone(),
            from_index: from,
            target: candidate.container.clone(),
            index: anchor.unwrap_or(target_items.len()),
        })
    }

    /// Apply a plan. Either the whole move happens or nothing does.
    pub fn apply(plan: MovePlan, registry: &mut Registry) -> Result<MoveOutcome> {
        match plan {
            MovePlan::Noop(reason) => Ok(MoveOutcome::unchanged(reason)),
            MovePlan::Reorder {
                container,
                item,
                from,
                to,
            } => {
                registry.move_within(&container, from, to)?;
                Ok(MoveOutcome::Reordered {
                    container,
                    item,
                    from,
                    to,
                })
            }
            MovePlan::Transfer {
                source,
                from_index,
                target,
                index,
            } => {
                let to_index =
                    registry.transfer(&source.container, &source.item, &target, index)?;
                Ok(MoveOutcome::Transferred {
                    item: source.item,
                    from: source.container,
                    from_index,
                    to: target,
                    to_index,
                })
            }
        }
    }

    /// Plan and apply in one step.
    pub fn execute(session: &ClosedSession, registry: &mut Registry) -> Result<MoveOutcome> {
        let plan = Self::plan(session, registry)?;
        Self::apply(plan, registry)
    }
}
