#![forbid(unsafe_code)]

//! The item registry: every tier of the ladder and the items it holds.
//!
//! # Invariants
//!
//! 1. Tier ids are unique; tiers keep their display order.
//! 2. Item ids are unique within a tier (composite identity).
//! 3. Every mutating operation validates all of its preconditions before
//!    touching any tier, so a failed call leaves the registry unchanged.
//! 4. `move_within` and `transfer` preserve the total item count and the
//!    relative order of every item they do not move.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::item::{ContainerId, Item, ItemId, ItemRef, SortOrder, Tier};

/// Ordered collection of tiers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct Registry {
    tiers: Vec<Tier>,
}

impl TryFrom<Vec<Tier>> for Registry {
    type Error = EngineError;

    fn try_from(tiers: Vec<Tier>) -> Result<Self> {
        Self::new(tiers)
    }
}

impl From<Registry> for Vec<Tier> {
    fn from(registry: Registry) -> Self {
        registry.tiers
    }
}

impl Registry {
    /// Build a registry, rejecting duplicate tier ids and duplicate item ids
    /// within a tier.
    pub fn new(tiers: Vec<Tier>) -> Result<Self> {
        {
            let mut seen = AHashSet::with_capacity(tiers.len());
            for tier in &tiers {
                if !seen.insert(&tier.id) {
                    return Err(EngineError::DuplicateContainer {
                        container: tier.id.clone(),
                    });
                }
                ensure_unique_ids(&tier.id, &tier.items)?;
            }
        }
        Ok(Self { tiers })
    }

    /// All tiers in display order.
    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Look up a tier.
    pub fn tier(&self, container: &ContainerId) -> Result<&Tier> {
        self.tiers
            .iter()
            .find(|tier| &tier.id == container)
            .ok_or_else(|| EngineError::not_found(container))
    }

    /// Ordered items of a tier.
    pub fn get(&self, container: &ContainerId) -> Result<&[Item]> {
        self.tier(container).map(|tier| tier.items.as_slice())
    }

    /// Index of `item` within `container`.
    pub fn position_of(&self, container: &ContainerId, item: &ItemId) -> Result<usize> {
        self.tier(container)?
            .position(item)
            .ok_or_else(|| EngineError::item_not_found(container, item))
    }

    /// Resolve a composite reference to the item it names.
    pub fn locate(&self, item_ref: &ItemRef) -> Result<&Item> {
        let tier = self.tier(&item_ref.container)?;
        tier.items
            .iter()
            .find(|item| item.id == item_ref.item)
            .ok_or_else(|| EngineError::item_not_found(&item_ref.container, &item_ref.item))
    }

    /// Total number of items across all tiers.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.tiers.iter().map(Tier::len).sum()
    }

    /// Every item reference in traversal order (tier order, then item order).
    pub fn item_refs(&self) -> impl Iterator<Item = ItemRef> + '_ {
        self.tiers.iter().flat_map(|tier| {
            tier.items.iter().map(move |item| ItemRef {
                container: tier.id.clone(),
                item: item.id.clone(),
            })
        })
    }

    /// Atomically swap one tier's contents, returning the previous sequence.
    pub fn replace(&mut self, container: &ContainerId, items: Vec<Item>) -> Result<Vec<Item>> {
        let index = self.require_tier(container)?;
        ensure_unique_ids(container, &items)?;
        Ok(std::mem::replace(&mut self.tiers[index].items, items))
    }

    /// Remove the item at `from` and reinsert it at `to`, shifting the items
    /// in between by one. `from == to` is a no-op.
    pub fn move_within(&mut self, container: &ContainerId, from: usize, to: usize) -> Result<()> {
        let index = self.require_tier(container)?;
        let items = &mut self.tiers[index].items;
        let len = items.len();
        for position in [from, to] {
            if position >= len {
                return Err(EngineError::IndexOutOfRange {
                    container: container.clone(),
                    index: position,
                    len,
                });
            }
        }
        if from == to {
            return Ok(());
        }
        let item = items.remove(from);
        items.insert(to, item);
        Ok(())
    }

    /// Move `item` out of `source` and insert it into `target` at
    /// `target_index` (clamped to the target's length). Returns the index the
    /// item landed at.
    ///
    /// When `source == target` this degenerates to a reorder whose index is
    /// interpreted against the tier with the item already removed.
    pub fn transfer(
        &mut self,
        source: &ContainerId,
        item: &ItemId,
        target: &ContainerId,
        target_index: usize,
    ) -> Result<usize> {
        let source_index = self.require_tier(source)?;
        let target_tier = self.require_tier(target)?;
        let from = self.tiers[source_index]
            .position(item)
            .ok_or_else(|| EngineError::item_not_found(source, item))?;
        if source_index != target_tier && self.tiers[target_tier].position(item).is_some() {
            return Err(EngineError::DuplicateItem {
                container: target.clone(),
                item: item.clone(),
            });
        }

        let moved = self.tiers[source_index].items.remove(from);
        let destination = &mut self.tiers[target_tier].items;
        let landed = target_index.min(destination.len());
        destination.insert(landed, moved);
        Ok(landed)
    }

    /// Stable-sort one tier. Returns `true` if the order changed.
    pub fn sort_tier(&mut self, container: &ContainerId, order: SortOrder) -> Result<bool> {
        let index = self.require_tier(container)?;
        let items = &mut self.tiers[index].items;
        let before: Vec<ItemId> = items.iter().map(|item| item.id.clone()).collect();
        items.sort_by(|a, b| order.compare(a, b));
        Ok(items.iter().map(|item| &item.id).ne(before.iter()))
    }

    fn tier_index(&self, container: &ContainerId) -> Option<usize> {
        self.tiers.iter().position(|tier| &tier.id == container)
    }

    fn require_tier(&self, container: &ContainerId) -> Result<usize> {
        self.tier_index(container)
            .ok_or_else(|| EngineError::not_found(container))
    }
}

fn ensure_unique_ids(container: &ContainerId, items: &[Item]) -> Result<()> {
    let mut seen = AHashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(&item.id) {
            return Err(EngineError::DuplicateItem {
                container: container.clone(),
                item: item.id.clone(),
            });
        }
    }
    Ok(())
}
