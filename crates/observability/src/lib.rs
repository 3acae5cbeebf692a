//! Process-wide observability wiring.

pub mod tracing;

pub use self::tracing::{init, init_with_default};
