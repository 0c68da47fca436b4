//! Property-based invariant tests for the item registry.
//!
//! 1. Total item count never changes under move_within / transfer
//! 2. No composite id appears twice
//! 3. Items that are not moved keep their relative order
//! 4. Failed operations leave the registry untouched

use pricedeck_core::{ContainerId, Item, ItemId, PricePayload, Registry, Tier};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    MoveWithin { tier: usize, from: usize, to: usize },
    Transfer { source: usize, pick: usize, target: usize, index: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4, 0usize..8, 0usize..8).prop_map(|(tier, from, to)| Op::MoveWithin {
            tier,
            from,
            to
        }),
        (0usize..4, 0usize..8, 0usize..4, 0usize..10).prop_map(
            |(source, pick, target, index)| Op::Transfer {
                source,
                pick,
                target,
                index
            }
        ),
    ]
}

fn tier_id(index: usize) -> ContainerId {
    ContainerId::new(format!("tier{index}"))
}

/// Build `tiers` tiers with globally unique ids so order checks are simple.
fn build_registry(sizes: &[usize]) -> Registry {
    let mut next = 0u32;
    let tiers = sizes
        .iter()
        .enumerate()
        .map(|(index, &size)| {
            let items = (0..size).map(|_| {
                next += 1;
                Item::new(
                    ItemId::new(format!("p{next}")),
                    PricePayload::new("brand", next * 10, "COOKIES"),
                )
            });
            Tier::new(tier_id(index), format!("Tier {index}")).with_items(items.collect::<Vec<_>>())
        })
        .collect();
    Registry::new(tiers).expect("generated ids are unique")
}

fn apply(registry: &mut Registry, op: &Op) -> Option<String> {
    match *op {
        Op::MoveWithin { tier, from, to } => {
            let container = tier_id(tier);
            let moved = registry
                .get(&container)
                .ok()
                .and_then(|items| items.get(from))
                .map(|item| item.id.to_string());
            registry.move_within(&container, from, to).ok().and(moved)
        }
        Op::Transfer {
            source,
            pick,
            target,
            index,
        } => {
            let source = tier_id(source);
            let item = registry
                .get(&source)
                .ok()
                .and_then(|items| items.get(pick))
                .map(|item| item.id.clone())?;
            registry
                .transfer(&source, &item, &tier_id(target), index)
                .ok()
                .map(|_| item.to_string())
        }
    }
}

fn flatten(registry: &Registry) -> Vec<String> {
    registry
        .tiers()
        .iter()
        .flat_map(|tier| tier.items.iter().map(|item| item.id.to_string()))
        .collect()
}

/// Order of every id except `moved`, per tier-agnostic relative order within
/// each tier the id stayed in.
fn pairwise_order(registry: &Registry, moved: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for tier in registry.tiers() {
        let ids: Vec<&str> = tier
            .items
            .iter()
            .map(|item| item.id.as_str())
            .filter(|id| *id != moved)
            .collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                pairs.push(((*a).to_string(), (*b).to_string()));
            }
        }
    }
    pairs
}

proptest! {
    #[test]
    fn count_is_invariant_under_any_sequence(
        sizes in prop::collection::vec(0usize..6, 1..4),
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let mut registry = build_registry(&sizes);
        let initial = registry.total_items();
        for op in &ops {
            apply(&mut registry, op);
            prop_assert_eq!(registry.total_items(), initial);
        }
    }

    #[test]
    fn no_id_is_ever_duplicated(
        sizes in prop::collection::vec(0usize..6, 1..4),
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let mut registry = build_registry(&sizes);
        for op in &ops {
            apply(&mut registry, op);
        }
        let mut ids = flatten(&registry);
        let len = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), len);
    }

    #[test]
    fn untouched_items_keep_relative_order(
        sizes in prop::collection::vec(1usize..6, 2..4),
        op in op_strategy(),
    ) {
        let mut registry = build_registry(&sizes);
        let snapshot = registry.clone();
        if let Some(moved) = apply(&mut registry, &op) {
            let before = pairwise_order(&snapshot, &moved);
            let after = pairwise_order(&registry, &moved);
            prop_assert_eq!(before, after);
        } else {
            prop_assert_eq!(&registry, &snapshot, "failed op must not mutate");
        }
    }
}
