//! Storage mutations, the commit plan that batches them, and the
//! committer backends that apply a plan atomically.

pub mod in_memory;
pub mod mutation;
pub mod plan;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCommitter;
pub use mutation::{
    DiscountColumns, Mutation, OutboxInsert, PriceHistoryInsert, ProductInsert, ProductUpdate,
};
pub use plan::CommitPlan;
pub use postgres::PostgresCommitter;
pub use r#trait::{
    Committer, OutboxRow, PriceHistoryRow, ProductQueries, ProductRow, StorageError,
};
