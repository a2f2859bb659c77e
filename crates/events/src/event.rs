use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **named** with a stable type identifier
/// - timestamped with the time the change was committed
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "stock.received").
    fn event_type(&self) -> &'static str;

    /// When the event occurred (commit time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
