//! Committer and query traits implemented by the storage backends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::plan::CommitPlan;

/// Storage-layer error.
///
/// `NotFound` and `Conflict` are part of the optimistic-lock contract and
/// are matched on by the use-case layer; everything else is opaque and
/// non-retryable at this level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The product row the version check keyed on does not exist.
    #[error("product row not found")]
    NotFound,

    /// Concurrent modification detected: someone committed between the
    /// caller's read and this commit.
    #[error("optimistic lock conflict: expected version {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },

    /// Opaque persistence failure.
    #[error("storage failure in {operation}: {message}")]
    Database { operation: String, message: String },
}

impl StorageError {
    pub fn database(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Product row as stored.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
    pub discount_percent: Option<Decimal>,
    pub discount_start_at: Option<DateTime<Utc>>,
    pub discount_end_at: Option<DateTime<Utc>>,
    pub status: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

/// Outbox row as stored. Read back by tests and the (external) drainer.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OutboxRow {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_id: Uuid,
    pub payload: JsonValue,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub retry_count: i32,
    pub error_message: Option<String>,
}

/// Price-history row as stored. Append-only.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PriceHistoryRow {
    pub product_id: Uuid,
    pub history_id: Uuid,
    pub old_price_numerator: Option<i64>,
    pub old_price_denominator: Option<i64>,
    pub new_price_numerator: i64,
    pub new_price_denominator: i64,
    pub changed_by: String,
    pub changed_reason: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// Applies commit plans atomically.
///
/// Both methods are all-or-nothing: on success every mutation in the plan
/// is persisted, on failure none is. Empty plans succeed without opening
/// a transaction.
#[async_trait]
pub trait Committer: Send + Sync {
    /// Apply a plan with no concurrency guard. Used for creations, where
    /// no prior version exists to check.
    async fn apply(&self, plan: CommitPlan) -> Result<(), StorageError>;

    /// Apply a plan guarded by the optimistic lock.
    ///
    /// Within the same transaction that applies the mutations: read the
    /// current version of the product row (locking it against concurrent
    /// writers), fail with `NotFound` if the row is absent, fail with
    /// `Conflict` if it differs from `expected_version`, otherwise apply
    /// everything and commit.
    async fn apply_with_version_check(
        &self,
        product_id: Uuid,
        expected_version: u64,
        plan: CommitPlan,
    ) -> Result<(), StorageError>;
}

/// Read side used by repositories and the read model.
#[async_trait]
pub trait ProductQueries: Send + Sync {
    async fn fetch_product(&self, product_id: Uuid) -> Result<Option<ProductRow>, StorageError>;

    async fn product_exists(&self, product_id: Uuid) -> Result<bool, StorageError>;
}

#[async_trait]
impl<T: Committer + ?Sized> Committer for Arc<T> {
    async fn apply(&self, plan: CommitPlan) -> Result<(), StorageError> {
        (**self).apply(plan).await
    }

    async fn apply_with_version_check(
        &self,
        product_id: Uuid,
        expected_version: u64,
        plan: CommitPlan,
    ) -> Result<(), StorageError> {
        (**self)
            .apply_with_version_check(product_id, expected_version, plan)
            .await
    }
}

#[async_trait]
impl<T: ProductQueries + ?Sized> ProductQueries for Arc<T> {
    async fn fetch_product(&self, product_id: Uuid) -> Result<Option<ProductRow>, StorageError> {
        (**self).fetch_product(product_id).await
    }

    async fn product_exists(&self, product_id: Uuid) -> Result<bool, StorageError> {
        (**self).product_exists(product_id).await
    }
}
