//! Repositories: queries return aggregates, mutation builders return
//! opaque mutations without executing them. The split is what lets a use
//! case compose writes to several tables into one commit plan.

pub mod outbox;
pub mod price_history;
pub mod product;

pub use outbox::OutboxRepository;
pub use price_history::PriceHistoryRepository;
pub use product::ProductRepository;
