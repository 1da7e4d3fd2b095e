//! A `tracing` layer that keeps every closed span and emitted event in memory
//! so tests can assert on instrumentation.
//!
//! Field values are stored as strings: `Display` for strings and numbers,
//! `Debug` for everything else.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Field name to rendered value.
pub type Fields = HashMap<String, String>;

/// A closed span with the fields it was created or later recorded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRecord {
    /// Span name from its metadata.
    pub name: String,
    /// Rendered span fields.
    pub fields: Fields,
}

/// An emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event level.
    pub level: Level,
    /// Event target, usually the emitting module path.
    pub target: String,
    /// Rendered event fields, including `message`.
    pub fields: Fields,
}

#[derive(Debug, Default)]
struct Journal {
    spans: Vec<SpanRecord>,
    events: Vec<EventRecord>,
}

/// Records spans on close and events on emission.
///
/// Clones share one journal, so a test keeps a clone and hands the other to
/// the subscriber.
///
/// # Examples
/// ```
/// use opforest_test_support::tracing::RecordingLayer;
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let layer = RecordingLayer::default();
/// let subscriber = tracing_subscriber::registry().with(layer.clone());
/// tracing::subscriber::with_default(subscriber, || {
///     let _span = tracing::info_span!("opf.fit", samples = 3).entered();
///     tracing::info!(classes = 2, "opf training completed");
/// });
///
/// let span = layer.span_named("opf.fit").expect("span closed");
/// assert_eq!(span.fields["samples"], "3");
/// assert_eq!(
///     layer.events_with_message(tracing::Level::INFO, "opf training completed").len(),
///     1,
/// );
/// ```
#[derive(Clone, Default)]
pub struct RecordingLayer {
    journal: Arc<Mutex<Journal>>,
}

impl RecordingLayer {
    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Closed spans in completion order.
    #[must_use]
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.journal().spans.clone()
    }

    /// Emitted events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        self.journal().events.clone()
    }

    /// Events at `level` whose `message` field equals `message`.
    #[must_use]
    pub fn events_with_message(&self, level: Level, message: &str) -> Vec<EventRecord> {
        self.journal()
            .events
            .iter()
            .filter(|event| {
                event.level == level
                    && event.fields.get("message").map(String::as_str) == Some(message)
            })
            .cloned()
            .collect()
    }

    /// The first closed span called `name`.
    #[must_use]
    pub fn span_named(&self, name: &str) -> Option<SpanRecord> {
        self.journal()
            .spans
            .iter()
            .find(|span| span.name == name)
            .cloned()
    }
}

/// Span fields accumulated between creation and close.
struct PendingFields(Fields);

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = Fields::new();
        attrs.record(&mut Renderer(&mut fields));
        span.extensions_mut().insert(PendingFields(fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if let Some(PendingFields(fields)) = span.extensions_mut().get_mut::<PendingFields>() {
            values.record(&mut Renderer(fields));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let fields = span
            .extensions_mut()
            .remove::<PendingFields>()
            .map(|PendingFields(fields)| fields)
            .unwrap_or_default();
        self.journal().spans.push(SpanRecord {
            name: span.name().to_owned(),
            fields,
        });
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::new();
        event.record(&mut Renderer(&mut fields));
        let metadata = event.metadata();
        self.journal().events.push(EventRecord {
            level: *metadata.level(),
            target: metadata.target().to_owned(),
            fields,
        });
    }
}

struct Renderer<'a>(&'a mut Fields);

impl Renderer<'_> {
    fn put(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_owned(), value);
    }
}

impl Visit for Renderer<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_owned());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}
