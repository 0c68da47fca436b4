#![forbid(unsafe_code)]

use criterion::{Criterion, criterion_group, criterion_main};
use pricedeck_core::{Item, Point, PricePayload, Registry, Tier};
use pricedeck_dnd::{ContractPolicy, EngineConfig, ReorderEngine, StackedLayout};
use pricedeck_web::{PointerButton, PointerCaptureAdapter, PointerCaptureConfig, dispatch_host_json};
use std::hint::black_box;

fn registry() -> Registry {
    let tiers = (0..3)
        .map(|tier| {
            let items: Vec<Item> = (0..6)
                .map(|row| {
                    Item::new(
                        format!("t{tier}-{row}").as_str(),
                        PricePayload::new("brand", 250 + row, "COOKIES"),
                    )
                })
                .collect();
            Tier::new(format!("tier{tier}").as_str(), format!("Tier {tier}")).with_items(items)
        })
        .collect();
    Registry::new(tiers).expect("bench ids are unique")
}

fn adapter(registry: &Registry) -> PointerCaptureAdapter {
    let engine = ReorderEngine::with_config(
        registry.clone(),
        EngineConfig::default().with_contract_policy(ContractPolicy::Recover),
    );
    PointerCaptureAdapter::stacked(engine, StackedLayout::default(), PointerCaptureConfig::default())
}

fn bench_pointer_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("web/pointer/lifecycle");
    let registry = registry();

    group.bench_function("down_ack_move_32_up", |b| {
        b.iter(|| {
            let mut adapter = adapter(&registry);
            let down = adapter.pointer_down(11, PointerButton::Primary, Point::new(40, 80));
            black_box(down.log.sequence);
            black_box(adapter.capture_acquired(11).log.outcome);
            for step in 0..32 {
                let dispatch = adapter.pointer_move(11, Point::new(40 + step * 16, 80 + step * 8));
                black_box(dispatch.effect);
            }
            let up = adapter.pointer_up(11, PointerButton::Primary, Point::new(552, 336));
            black_box(up.effect);
        });
    });

    group.bench_function("down_ack_blur", |b| {
        b.iter(|| {
            let mut adapter = adapter(&registry);
            black_box(adapter.pointer_down(31, PointerButton::Primary, Point::new(40, 80)));
            black_box(adapter.capture_acquired(31));
            black_box(adapter.blur().capture_command);
        });
    });

    group.bench_function("json_down_move_up", |b| {
        b.iter(|| {
            let mut adapter = adapter(&registry);
            for json in [
                r#"{"kind":"pointerdown","pointerId":5,"button":0,"x":40,"y":80}"#,
                r#"{"kind":"pointermove","pointerId":5,"x":300,"y":90}"#,
                r#"{"kind":"pointerup","pointerId":5,"button":0,"x":300,"y":90}"#,
            ] {
                black_box(dispatch_host_json(&mut adapter, json).ok());
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pointer_lifecycle);
criterion_main!(benches);
