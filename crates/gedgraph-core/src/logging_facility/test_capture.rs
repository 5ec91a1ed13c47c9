//! In-memory event capture for log assertions in tests

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use gedgraph_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_COMPONENT, FIELD_EVENT, FIELD_OP,
};

/// One recorded event with every field rendered as text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    fn is(&self, op: &str, event: &str) -> bool {
        self.op.as_deref() == Some(op) && self.event.as_deref() == Some(event)
    }
}

// Strings are recorded without Debug quoting; numbers and bools fall
// through to `record_debug`, which renders them the same as Display.
struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldRecorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

type EventLog = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    log: EventLog,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldRecorder(&mut fields));
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            component: fields.get(FIELD_COMPONENT).cloned(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        };
        if let Ok(mut log) = self.log.lock() {
            log.push(captured);
        }
    }
}

/// Shared handle on the captured event log
///
/// Tests run in parallel against the same log, so queries always filter by
/// operation name.
#[derive(Clone)]
pub struct TestCapture {
    log: EventLog,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Events of one operation, in emission order
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op.as_deref() == Some(op))
            .collect()
    }

    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics when no `op`/`event` pair was captured.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        assert!(
            events.iter().any(|e| e.is(op, event)),
            "Expected event op={op} event={event} not found in {} captured events",
            events.len()
        );
    }

    /// # Panics
    ///
    /// Panics when no `op`/`event` pair carries `key == value`.
    pub fn assert_event_field(&self, op: &str, event: &str, key: &str, value: &str) {
        let found = self
            .events_for_op(op)
            .iter()
            .any(|e| e.is(op, event) && e.field(key) == Some(value));
        assert!(found, "Expected event op={op} event={event} with {key}={value} not found");
    }

    /// Check that every start of `op` was closed by exactly one end or
    /// end_error event
    ///
    /// Only meaningful for operation names no other test emits concurrently.
    ///
    /// # Panics
    ///
    /// Panics when the counts differ or nothing was captured.
    pub fn assert_op_bracketed(&self, op: &str) {
        let events = self.events_for_op(op);
        let count = |name: &str| events.iter().filter(|e| e.is(op, name)).count();
        let starts = count(EVENT_START);
        let closes = count(EVENT_END) + count(EVENT_END_ERROR);
        assert!(starts > 0, "No start event captured for op={op}");
        assert_eq!(starts, closes, "op={op} has {starts} start and {closes} closing events");
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber on first use
///
/// ```
/// use gedgraph_core::logging_facility::test_capture::init_test_capture;
/// use gedgraph_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example_op");
/// capture.assert_event_exists("doc_example_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let log = EventLog::default();
            let layer = CaptureLayer { log: Arc::clone(&log) };
            // a subscriber installed earlier keeps ownership of the process
            let _ = tracing_subscriber::registry().with(layer).try_init();
            TestCapture { log }
        })
        .clone()
}
