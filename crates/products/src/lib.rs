//! Product aggregate: lifecycle state machine, pricing invariants, dirty
//! tracking, and the domain events every command records.

pub mod changeset;
pub mod events;
pub mod product;

pub use changeset::{ChangeSet, Field};
pub use events::{
    BasePriceChanged, DiscountApplied, DiscountRemoved, ProductActivated, ProductArchived,
    ProductCreated, ProductDeactivated, ProductEvent, ProductUpdated,
};
pub use product::{Product, ProductStatus};
