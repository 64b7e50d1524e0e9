//! Span and event capture for recomposition and teardown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tilework_core::geometry::{Rect, Size};
use tilework_tile::{RecordingHost, SplitAxis, StaticSurface, Tile, WindowContext, Workbench};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

#[derive(Default)]
struct Captured {
    spans: Mutex<Vec<CapturedSpan>>,
    events: Mutex<Vec<CapturedEvent>>,
}

struct SpanCapture(Arc<Captured>);

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

impl<S> tracing_subscriber::Layer<S> for SpanCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.0.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.0.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<F>(f: F) -> Arc<Captured>
where
    F: FnOnce(),
{
    let captured = Arc::new(Captured::default());
    let subscriber = tracing_subscriber::registry().with(SpanCapture(Arc::clone(&captured)));
    tracing::subscriber::with_default(subscriber, f);
    captured
}

fn surface(key: &str) -> StaticSurface {
    StaticSurface::new(key, Size::new(10, 10))
}

#[test]
fn recomposition_emits_span_and_summary() {
    let captured = with_captured_tracing(|| {
        let mut host = RecordingHost::new();
        let mut tile =
            Tile::new(&mut host, WindowContext::new(Rect::from_size(300, 200)), surface("A"))
                .expect("mount");
        tile.split_vertical(&mut host).expect("orient");
        tile.split(&mut host, surface("B")).expect("split");
    });

    let spans = captured.spans.lock().unwrap();
    let recompose: Vec<_> = spans.iter().filter(|s| s.name == "tile.recompose").collect();
    assert_eq!(recompose.len(), 2);
    assert_eq!(recompose[0].fields.get("axis").map(String::as_str), Some("Vertical"));
    assert_eq!(recompose[0].fields.get("surface").map(String::as_str), Some("A"));

    let events = captured.events.lock().unwrap();
    let summaries: Vec<_> = events
        .iter()
        .filter(|e| e.target == "tilework.tile" && e.fields.contains_key("released"))
        .collect();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[1].fields.get("created").map(String::as_str), Some("5"));
    assert_eq!(summaries[1].level, tracing::Level::DEBUG);
}

#[test]
fn rollback_is_logged_as_warning() {
    let captured = with_captured_tracing(|| {
        let mut host = RecordingHost::new();
        let mut tile =
            Tile::new(&mut host, WindowContext::new(Rect::from_size(300, 200)), surface("A"))
                .expect("mount");
        host.fail_after(2);
        tile.split_horizontal(&mut host).expect_err("host refuses");
    });

    let events = captured.events.lock().unwrap();
    let warning = events
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("rollback warning");
    assert_eq!(warning.target, "tilework.compositor");
    assert_eq!(warning.fields.get("rolled_back").map(String::as_str), Some("2"));
    assert_eq!(
        warning.fields.get("kind").map(String::as_str),
        Some("Divider(Horizontal)")
    );
}

#[test]
fn close_emits_teardown_span_per_tile() {
    let captured = with_captured_tracing(|| {
        let mut host = RecordingHost::new();
        let mut tile =
            Tile::new(&mut host, WindowContext::new(Rect::from_size(300, 200)), surface("A"))
                .expect("mount");
        tile.split_horizontal(&mut host).expect("orient");
        tile.split(&mut host, surface("B")).expect("split");
        tile.close(&mut host);
    });

    let spans = captured.spans.lock().unwrap();
    let teardown: Vec<_> = spans
        .iter()
        .filter(|s| s.name == "tile.teardown")
        .filter_map(|s| s.fields.get("surface").cloned())
        .collect();
    assert_eq!(teardown, ["A", "B"]);
}

#[test]
fn undersized_window_is_logged() {
    let captured = with_captured_tracing(|| {
        let mut bench = Workbench::open(
            RecordingHost::new(),
            WindowContext::new(Rect::from_size(300, 200)),
            surface("A"),
        )
        .expect("open");
        bench.push_pane(SplitAxis::Horizontal, surface("B")).expect("push");
        bench.resize(Rect::from_size(300, 200));
        bench.resize(Rect::from_size(20, 20));
    });

    let events = captured.events.lock().unwrap();
    let warnings: Vec<_> = events
        .iter()
        .filter(|e| e.level == tracing::Level::WARN && e.target == "tilework.workbench")
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].fields.contains_key("min"));
}
