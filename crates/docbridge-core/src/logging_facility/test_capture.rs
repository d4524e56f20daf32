//! In-memory log capture for tests
//!
//! [`init_test_capture`] installs a global subscriber whose only layer keeps
//! every event in a shared buffer. Tests in one binary share that buffer, so
//! lookups are keyed by request id.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use docbridge_core_types::schema::{
    is_terminal_event, FIELD_EVENT, FIELD_OP, FIELD_REQUEST_ID,
};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event: its level plus every field rendered as text
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn op(&self) -> Option<&str> {
        self.field(FIELD_OP)
    }

    pub fn event(&self) -> Option<&str> {
        self.field(FIELD_EVENT)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.field(FIELD_REQUEST_ID)
    }

    pub fn is_terminal(&self) -> bool {
        self.event().is_some_and(is_terminal_event)
    }
}

struct FieldText<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldText<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    buffer: Buffer,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldText(&mut fields));
        let captured = CapturedEvent {
            level: *event.metadata().level(),
            fields,
        };
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(captured);
        }
    }
}

/// Read handle on the capture buffer
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Events logged for one request, in emission order
    pub fn events_for_request(&self, request_id: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.request_id() == Some(request_id))
            .collect()
    }

    /// The `event` values logged for one request, e.g. `["start", "end"]`
    pub fn bracket(&self, request_id: &str) -> Vec<String> {
        self.events_for_request(request_id)
            .iter()
            .filter_map(|e| e.event().map(str::to_string))
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
    /// Panics unless some event has the given `op` and `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let found = self.count_events(|e| e.op() == Some(op) && e.event() == Some(event));
        assert!(found > 0, "no captured event with op={} event={}", op, event);
    }
}

static CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture subscriber (first call only) and return its handle
///
/// # Example
///
/// ```
/// use docbridge_core::log_op_start;
/// use docbridge_core::logging_facility::init_test_capture;
///
/// let capture = init_test_capture();
/// log_op_start!("doc-example", request_id = "doc-req");
/// assert_eq!(capture.bracket("doc-req"), vec!["start".to_string()]);
/// ```
pub fn init_test_capture() -> TestCapture {
    CAPTURE
        .get_or_init(|| {
            let buffer = Buffer::default();
            let layer = CaptureLayer {
                buffer: buffer.clone(),
            };
            tracing_subscriber::registry().with(layer).init();
            TestCapture { buffer }
        })
        .clone()
}
