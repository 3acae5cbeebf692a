//! Domain event surface and the outbox row type it is persisted through.

pub mod event;
pub mod outbox;

pub use event::DomainEvent;
pub use outbox::{OutboxEvent, OutboxStatus};
