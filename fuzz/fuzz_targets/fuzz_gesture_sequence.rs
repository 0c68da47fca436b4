#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pricedeck_core::{ContainerId, Item, ItemId, ItemRef, Point, PricePayload, Registry, Tier};
use pricedeck_dnd::{
    CollisionPolicy, ContractPolicy, DropSurfaces, EngineConfig, ReorderEngine, StackedLayout,
    TargetResolver,
};

#[derive(Debug, Arbitrary)]
enum Gesture {
    PickUp { tier: u8, item: u8 },
    Hover { tier: u8, item: Option<u8> },
    HoverAt { x: i16, y: i16, within: bool },
    Release,
    Cancel,
    Undo,
    Redo,
}

#[derive(Debug, Arbitrary)]
struct Input {
    sizes: [u8; 3],
    gestures: Vec<Gesture>,
}

fuzz_target!(|input: Input| {
    let mut next = 0u32;
    let tiers = input
        .sizes
        .iter()
        .enumerate()
        .map(|(tier, &size)| {
            let items: Vec<Item> = (0..size % 6)
                .map(|_| {
                    next += 1;
                    Item::new(
                        ItemId::new(format!("p{next}")),
                        PricePayload::new("brand", next, "COOKIES"),
                    )
                })
                .collect();
            Tier::new(ContainerId::new(format!("tier{tier}")), "tier").with_items(items)
        })
        .collect();
    let Ok(registry) = Registry::new(tiers) else {
        return;
    };
    let total = registry.total_items();
    let layout = StackedLayout::default();
    let mut engine = ReorderEngine::with_config(
        registry,
        EngineConfig::default().with_contract_policy(ContractPolicy::Recover),
    );

    for gesture in input.gestures.iter().take(256) {
        let result = match gesture {
            Gesture::PickUp { tier, item } => engine.on_pick_up(ItemRef::new(
                ContainerId::new(format!("tier{}", tier % 4)),
                ItemId::new(format!("p{item}")),
            )),
            Gesture::Hover { tier, item } => engine.on_hover(
                ContainerId::new(format!("tier{}", tier % 4)),
                item.map(|item| ItemId::new(format!("p{item}"))),
            ),
            Gesture::HoverAt { x, y, within } => {
                let surfaces = DropSurfaces::stacked(engine.registry(), &layout);
                let policy = if *within {
                    CollisionPolicy::PointerWithin
                } else {
                    CollisionPolicy::ClosestCenter
                };
                engine
                    .hover_at(
                        Point::new(i32::from(*x), i32::from(*y)),
                        &surfaces,
                        &TargetResolver::new(policy),
                    )
                    .map(drop)
            }
            Gesture::Release => engine.on_release().map(drop),
            Gesture::Cancel => engine.on_cancel(),
            Gesture::Undo => engine.undo().map(drop),
            Gesture::Redo => engine.redo().map(drop),
        };

        // Gesture intake never fails under Recover; undo/redo only refuse
        // while a drag is open.
        if let Err(err) = result {
            assert!(
                matches!(gesture, Gesture::Undo | Gesture::Redo),
                "unexpected error {err} for {gesture:?}"
            );
            assert!(engine.is_dragging(), "history refused while idle: {err}");
        }
        assert_eq!(engine.registry().total_items(), total, "item count changed");
    }
});
