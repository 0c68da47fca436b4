#![no_main]

use libfuzzer_sys::fuzz_target;
use pricedeck_core::{Item, PricePayload, Registry, Tier};
use pricedeck_dnd::{ContractPolicy, EngineConfig, ReorderEngine, StackedLayout};
use pricedeck_web::{PointerCaptureAdapter, PointerCaptureConfig, dispatch_host_json, parse_registry};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Arbitrary ladders must either decode into a valid registry or fail cleanly.
    let _ = parse_registry(text);

    let item = |id: &str| Item::new(id, PricePayload::new("brand", 100, "COOKIES"));
    let Ok(registry) = Registry::new(vec![
        Tier::new("tierA", "A").with_items([item("p1"), item("p2"), item("p3")]),
        Tier::new("tierB", "B").with_items([item("p4")]),
    ]) else {
        return;
    };
    let engine = ReorderEngine::with_config(
        registry,
        EngineConfig::default().with_contract_policy(ContractPolicy::Recover),
    );
    let mut adapter = PointerCaptureAdapter::stacked(
        engine,
        StackedLayout::default(),
        PointerCaptureConfig::default(),
    );

    // One JSON event per line.
    for line in text.lines().take(128) {
        let _ = dispatch_host_json(&mut adapter, line);
        assert_eq!(
            adapter.engine().is_dragging(),
            adapter.active_pointer_id().is_some() && !adapter.is_armed(),
            "adapter and engine disagree about the drag"
        );
    }
    assert_eq!(adapter.engine().registry().total_items(), 4);
});
