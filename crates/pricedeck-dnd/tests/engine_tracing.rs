//! Structured logging emitted by the reorder engine.
//!
//! Events are captured with a `tracing_subscriber::Layer` installed as the
//! thread default for the duration of each test.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pricedeck_core::{Item, ItemRef, PricePayload, Registry, Tier};
use pricedeck_dnd::{ContractPolicy, EngineConfig, ReorderEngine};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Capture infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    message: Option<String>,
    fields: HashMap<String, String>,
    parent_span_name: Option<String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned();
        let parent_span_name = ctx.event_span(event).map(|span| span.name().to_string());
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields,
            parent_span_name,
        });
    }
}

fn with_capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn engine(policy: ContractPolicy) -> ReorderEngine {
    let item = |id: &str| Item::new(id, PricePayload::new("brand", 199, "COOKIES"));
    let registry = Registry::new(vec![
        Tier::new("tierA", "A").with_items([item("p1"), item("p2"), item("p3")]),
        Tier::new("tierB", "B").with_items([item("p4")]),
    ])
    .unwrap();
    ReorderEngine::with_config(
        registry,
        EngineConfig::default().with_contract_policy(policy),
    )
}

fn messages(events: &[CapturedEvent], level: Level) -> Vec<String> {
    events
        .iter()
        .filter(|event| event.level == level)
        .filter_map(|event| event.message.clone())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn committed_move_logs_inside_release_span() {
    let events = with_capture(|| {
        let mut engine = engine(ContractPolicy::Strict);
        engine.on_pick_up(ItemRef::new("tierA", "p2")).unwrap();
        engine.on_hover("tierB".into(), None).unwrap();
        engine.on_release().unwrap();
    });

    let debug = messages(&events, Level::DEBUG);
    assert!(debug.contains(&"drag session started".to_string()));

    let commit = events
        .iter()
        .find(|event| event.message.as_deref() == Some("move committed"))
        .expect("commit event");
    assert_eq!(commit.level, Level::DEBUG);
    assert_eq!(commit.parent_span_name.as_deref(), Some("release"));
    assert_eq!(commit.fields.get("item").map(String::as_str), Some("p2"));
    assert_eq!(commit.fields.get("to").map(String::as_str), Some("tierB"));
    assert_eq!(commit.fields.get("to_index").map(String::as_str), Some("1"));
}

#[test]
fn candidate_changes_are_traced() {
    let events = with_capture(|| {
        let mut engine = engine(ContractPolicy::Strict);
        engine.on_pick_up(ItemRef::new("tierA", "p1")).unwrap();
        engine.on_hover("tierA".into(), Some("p3".into())).unwrap();
        // Same candidate again: no new event.
        engine.on_hover("tierA".into(), Some("p3".into())).unwrap();
        engine.on_cancel().unwrap();
    });

    assert_eq!(
        messages(&events, Level::TRACE),
        vec!["drop candidate changed".to_string()]
    );
    assert!(messages(&events, Level::DEBUG).contains(&"drag session cancelled".to_string()));
}

#[test]
fn recovered_violation_logs_warning() {
    let events = with_capture(|| {
        let mut engine = engine(ContractPolicy::Recover);
        engine.on_release().unwrap();
    });

    let warning = events
        .iter()
        .find(|event| event.level == Level::WARN)
        .expect("warn event");
    assert_eq!(
        warning.message.as_deref(),
        Some("contract violation recovered as no-op")
    );
    assert_eq!(
        warning.fields.get("operation").map(String::as_str),
        Some("release")
    );
    assert_eq!(
        warning.fields.get("kind").map(String::as_str),
        Some("InvalidState")
    );
}

#[test]
fn strict_violation_does_not_warn() {
    let events = with_capture(|| {
        let mut engine = engine(ContractPolicy::Strict);
        assert!(engine.on_release().is_err());
    });
    assert!(messages(&events, Level::WARN).is_empty());
}

#[test]
fn stale_candidate_logs_fallback() {
    let events = with_capture(|| {
        let mut engine = engine(ContractPolicy::Strict);
        engine.on_pick_up(ItemRef::new("tierA", "p1")).unwrap();
        engine.on_hover("tierB".into(), Some("vanished".into())).unwrap();
        engine.on_release().unwrap();
    });
    assert_eq!(
        messages(&events, Level::WARN),
        vec!["drop candidate item is stale; appending instead".to_string()]
    );
}
