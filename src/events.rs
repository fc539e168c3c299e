//! Structured run notifications.
//!
//! The optimizer, the DE engine and objectives report what happens through
//! an [`EventSink`]. Every [`Event`] has a symbolic tag, a small payload
//! map, a human-readable message and an `important` flag. Important events
//! (start, end, new best) must never be dropped by rate-limiting sinks.
//!
//! | Tag | Emitted when |
//! |---|---|
//! | [`tags::OPTIMIZATION_START`] | `Optimizer::optimize` begins |
//! | [`tags::STEP`] | a step completed |
//! | [`tags::NEW_BEST`] | the driver's best candidate changed |
//! | [`tags::TRIAL_BETTER`] | a DE trial replaced its target |
//! | [`tags::NEW_EXTREME`] | an objective tightened a global min/max |
//! | [`tags::OPTIMIZATION_END`] | the loop stopped (normally or on error) |
//! | [`tags::OPTIMIZATION_ABORTED`] | the loop unwound because of a panic |

use core::time::Duration;
use std::collections::BTreeMap;
use std::time::Instant;

use parking_lot::Mutex;

/// Event tags emitted by this crate.
pub mod tags {
    /// Optimization started.
    pub const OPTIMIZATION_START: &str = "optimizer.start";
    /// One optimization step finished.
    pub const STEP: &str = "optimizer.step";
    /// A new best candidate was found.
    pub const NEW_BEST: &str = "optimizer.new_best";
    /// Optimization finished, normally or with an error.
    pub const OPTIMIZATION_END: &str = "optimizer.end";
    /// Optimization unwound because of a panic.
    pub const OPTIMIZATION_ABORTED: &str = "optimizer.aborted";
    /// A DE trial vector beat its target.
    pub const TRIAL_BETTER: &str = "de.trial_better";
    /// An objective found a new global extreme for a goal.
    pub const NEW_EXTREME: &str = "objective.new_extreme";
}

/// A payload value.
#[derive(Clone, Debug, PartialEq)]
pub enum EventValue {
    /// An unsigned counter.
    Count(u64),
    /// A real number.
    Float(f64),
    /// Free text.
    Text(String),
    /// A real vector, typically candidate coordinates.
    Vector(Vec<f64>),
}

impl From<u64> for EventValue {
    fn from(v: u64) -> Self {
        Self::Count(v)
    }
}

impl From<usize> for EventValue {
    fn from(v: usize) -> Self {
        Self::Count(v as u64)
    }
}

impl From<f64> for EventValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for EventValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for EventValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<Vec<f64>> for EventValue {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<&[f64]> for EventValue {
    fn from(v: &[f64]) -> Self {
        Self::Vector(v.to_vec())
    }
}

/// One structured notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Symbolic tag, one of [`tags`].
    pub tag: &'static str,
    /// Named payload values.
    pub payload: BTreeMap<&'static str, EventValue>,
    /// Human-readable description.
    pub message: String,
    /// Important events bypass rate limiting.
    pub important: bool,
}

impl Event {
    /// Start a non-important event.
    #[must_use]
    pub fn new(tag: &'static str, message: impl Into<String>) -> Self {
        Self {
            tag,
            payload: BTreeMap::new(),
            message: message.into(),
            important: false,
        }
    }

    /// Mark the event important.
    #[must_use]
    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }

    /// Attach a payload entry.
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<EventValue>) -> Self {
        self.payload.insert(key, value.into());
        self
    }

    /// Look up a payload entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EventValue> {
        self.payload.get(key)
    }
}

/// Receiver of [`Event`]s.
///
/// Sinks are shared (`Arc<dyn EventSink>`) between the optimizer and
/// objectives, hence `Send + Sync` and `&self`.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: Event);
}

/// Discards everything. The default sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: Event) {}
}

/// Keeps every event in memory.
///
/// # Examples
///
/// ```
/// use diffevo::events::{Event, EventSink, MemorySink};
///
/// let sink = MemorySink::new();
/// sink.record(Event::new("custom", "hello").important());
/// assert_eq!(sink.count("custom"), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of all recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Number of recorded events with `tag`.
    #[must_use]
    pub fn count(&self, tag: &str) -> usize {
        self.events.lock().iter().filter(|e| e.tag == tag).count()
    }

    /// The most recent event with `tag`.
    #[must_use]
    pub fn last(&self, tag: &str) -> Option<Event> {
        self.events
            .lock()
            .iter()
            .rev()
            .find(|e| e.tag == tag)
            .cloned()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: Event) {
        self.events.lock().push(event);
    }
}

/// Forwards at most one non-important event per interval to an inner sink.
///
/// Important events are always forwarded immediately.
pub struct ThrottledSink<S> {
    inner: S,
    min_interval: Duration,
    last_emitted: Mutex<Option<Instant>>,
}

impl<S: EventSink> ThrottledSink<S> {
    /// Wrap `inner`, letting through one routine event per `min_interval`.
    pub fn new(inner: S, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_emitted: Mutex::new(None),
        }
    }

    /// The wrapped sink.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: EventSink> EventSink for ThrottledSink<S> {
    fn record(&self, event: Event) {
        if !event.important {
            let now = Instant::now();
            let mut last = self.last_emitted.lock();
            if last.is_some_and(|t| now.duration_since(t) < self.min_interval) {
                return;
            }
            *last = Some(now);
        }
        self.inner.record(event);
    }
}

/// Emits events through `tracing`: important ones at `INFO`, the rest at `DEBUG`.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl EventSink for TracingSink {
    fn record(&self, event: Event) {
        let payload = format!("{:?}", event.payload);
        if event.important {
            tracing::info!(tag = event.tag, payload = %payload, "{}", event.message);
        } else {
            tracing::debug!(tag = event.tag, payload = %payload, "{}", event.message);
        }
    }
}

/// The sink used when the caller asks for verbose output.
pub(crate) fn verbose_sink() -> std::sync::Arc<dyn EventSink> {
    #[cfg(feature = "tracing")]
    {
        std::sync::Arc::new(TracingSink)
    }
    #[cfg(not(feature = "tracing"))]
    {
        std::sync::Arc::new(NullSink)
    }
}
