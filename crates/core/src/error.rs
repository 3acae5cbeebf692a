//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a sentinel kind callers match on; messages add detail
/// but never carry the identity. Keep this focused on deterministic
/// business failures — storage concerns live in the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Aggregate lookup failed (domain-level).
    #[error("product not found")]
    NotFound,

    /// Product name rejected (empty or otherwise malformed).
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Product category rejected.
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// Monetary value rejected (non-positive price, bad denominator,
    /// division by zero).
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Discount period rejected (ordering, span, or missing bounds).
    #[error("invalid discount period: {0}")]
    InvalidDiscountPeriod(String),

    /// Discount percentage outside [0, 100].
    #[error("invalid discount percent: {0}")]
    InvalidDiscountPercent(String),

    /// Discounts attach to active products only.
    #[error("cannot apply a discount to an inactive product")]
    CannotApplyDiscountToInactive,

    /// A discount is already attached to the product.
    #[error("a discount is already attached")]
    DiscountAlreadyActive,

    /// Idempotent-operation signal: the product is already active.
    #[error("product is already active")]
    AlreadyActive,

    /// Idempotent-operation signal: the product is already inactive.
    #[error("product is already inactive")]
    AlreadyInactive,

    /// Idempotent-operation signal: the product is already archived.
    #[error("product is already archived")]
    AlreadyArchived,

    /// Terminal-state guard: archived products accept no further commands.
    #[error("archived products cannot be modified")]
    CannotModifyArchived,

    /// A rational value no longer fits the int64 storage range after
    /// reduction to lowest terms.
    #[error("monetary value exceeds the storable range")]
    MoneyOverflow,

    /// An update was requested but no updatable field changed.
    #[error("no updatable fields were changed")]
    EmptyUpdate,

    /// An identifier failed to parse at the boundary.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Self::InvalidName(msg.into())
    }

    pub fn invalid_category(msg: impl Into<String>) -> Self {
        Self::InvalidCategory(msg.into())
    }

    pub fn invalid_price(msg: impl Into<String>) -> Self {
        Self::InvalidPrice(msg.into())
    }

    pub fn invalid_discount_period(msg: impl Into<String>) -> Self {
        Self::InvalidDiscountPeriod(msg.into())
    }

    pub fn invalid_discount_percent(msg: impl Into<String>) -> Self {
        Self::InvalidDiscountPercent(msg.into())
    }
}
