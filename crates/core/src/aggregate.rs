//! Aggregate root trait for state-stored domain models.

/// Aggregate root marker + minimal interface.
///
/// Intentionally small: the aggregate decides how it models state
/// transitions; this only pins down the identity and the version the
/// optimistic-lock protocol checks against.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Starts at 0 for a freshly created aggregate and increments by
    /// exactly one per committed mutation.
    fn version(&self) -> u64;
}
