//! Shared kernel: identifiers, the domain error model, and the monetary
//! value objects the write path is built on.

pub mod aggregate;
pub mod discount;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::AggregateRoot;
pub use discount::Discount;
pub use error::{DomainError, DomainResult};
pub use id::ProductId;
pub use money::Money;
pub use value_object::ValueObject;
