use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Common surface of domain events.
///
/// Events represent facts that happened in the domain: they are immutable,
/// carry the identity of the aggregate they belong to, and are serialized
/// to JSON when written to the outbox. Anything implementing this trait
/// must own its data (`'static`) and cross thread boundaries freely, since
/// outbox rows are drained on a different task than the one that wrote
/// them.
pub trait DomainEvent: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "product.created").
    ///
    /// Lowercase, dot-separated, never changed once events of the type
    /// have been persisted — consumers route and filter on it.
    fn event_type(&self) -> &'static str;

    /// Identifier of the aggregate the event belongs to.
    fn aggregate_id(&self) -> Uuid;

    /// When the event occurred (business time, UTC).
    ///
    /// Distinct from the outbox row's `created_at`, which is the storage
    /// layer's commit timestamp and orders rows across transactions.
    fn occurred_at(&self) -> DateTime<Utc>;
}
