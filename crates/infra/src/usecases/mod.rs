//! Use-case interactors.
//!
//! Every command follows the same skeleton: validate the request, load
//! (or construct) the aggregate, invoke domain commands, build a commit
//! plan from repository mutations plus one outbox mutation per pending
//! event, commit — with the optimistic version check for anything that
//! mutates an existing product — and clear the aggregate's events only
//! after the commit succeeded.

pub mod activate_product;
pub mod apply_discount;
pub mod archive_product;
pub mod create_product;
pub mod deactivate_product;
pub mod remove_discount;
pub mod update_price;
pub mod update_product;

pub use activate_product::{ActivateProduct, ActivateProductRequest, ActivateProductResponse};
pub use apply_discount::{ApplyDiscount, ApplyDiscountRequest, ApplyDiscountResponse};
pub use archive_product::{ArchiveProduct, ArchiveProductRequest, ArchiveProductResponse};
pub use create_product::{CreateProduct, CreateProductRequest, CreateProductResponse};
pub use deactivate_product::{
    DeactivateProduct, DeactivateProductRequest, DeactivateProductResponse,
};
pub use remove_discount::{RemoveDiscount, RemoveDiscountRequest, RemoveDiscountResponse};
pub use update_price::{UpdatePrice, UpdatePriceRequest, UpdatePriceResponse};
pub use update_product::{UpdateProduct, UpdateProductRequest, UpdateProductResponse};

use thiserror::Error;
use uuid::Uuid;

use procat_core::DomainError;
use procat_products::Product;

use crate::config::VersionPolicy;
use crate::repository::OutboxRepository;
use crate::storage::r#trait::{Committer, StorageError};
use crate::storage::{CommitPlan, Mutation};

/// Error surface of the command layer.
///
/// Domain errors pass through transparently so sentinel matching keeps
/// working; storage conflicts and missing rows are lifted into their own
/// variants so callers can tell a retryable conflict from invalid input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The product does not exist.
    #[error("product not found")]
    NotFound,

    /// Optimistic lock conflict: re-read, re-decide, re-submit. The
    /// service itself does not retry.
    #[error("optimistic lock conflict: expected version {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    /// Domain invariant violation, surfaced unwrapped.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request-level validation failure (missing or malformed fields).
    #[error("invalid request: {0}")]
    Validation(String),

    /// An event payload failed to serialize.
    #[error("failed to serialize event payload: {0}")]
    Serialize(String),

    /// Opaque persistence failure.
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for CommandError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound => CommandError::NotFound,
            StorageError::Conflict { expected, found } => {
                CommandError::Conflict { expected, found }
            }
            other => CommandError::Storage(other),
        }
    }
}

/// One outbox insert mutation per pending event, in recording order.
pub(crate) fn outbox_mutations(product: &Product) -> Result<Vec<Mutation>, CommandError> {
    let outbox = OutboxRepository::new();
    product
        .pending_events()
        .iter()
        .map(|event| {
            let enriched = outbox
                .enrich(event)
                .map_err(|e| CommandError::Serialize(e.to_string()))?;
            Ok(outbox.insert_mutation(&enriched))
        })
        .collect()
}

/// Commit a plan for a mutation of an existing product.
///
/// Under the strict policy the version check always runs. Under the
/// permissive policy a caller-supplied version of 0 bypasses it — the
/// backwards-compatibility path, unprotected against lost updates.
pub(crate) async fn commit_existing<S: Committer>(
    store: &S,
    policy: VersionPolicy,
    product_id: Uuid,
    expected_version: u64,
    plan: CommitPlan,
) -> Result<(), CommandError> {
    match policy {
        VersionPolicy::Permissive if expected_version == 0 => store.apply(plan).await?,
        _ => {
            store
                .apply_with_version_check(product_id, expected_version, plan)
                .await?
        }
    }
    Ok(())
}
