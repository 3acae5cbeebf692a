//! Postgres-backed committer.
//!
//! All writes of one plan run in a single transaction. The optimistic
//! lock takes a row-level write lock (`SELECT ... FOR UPDATE`) on the
//! product row before comparing versions, so no other transaction can
//! commit an update to the same row between the check and this commit.
//!
//! ## Error mapping
//!
//! sqlx errors are collapsed into `StorageError::Database` with the
//! failing operation name; the Postgres error code is included in the
//! message when present. Version mismatches and missing rows are detected
//! explicitly and never leave the transaction committed.
//!
//! ## Timestamps
//!
//! `created_at`/`updated_at`/outbox `created_at` are written with `now()`,
//! Postgres's transaction timestamp: every row of one plan carries the
//! same value, so a drainer ordering by `created_at ASC` sees events in
//! transaction-commit order.

use sqlx::{PgPool, Postgres, QueryBuilder, Row, Transaction};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use super::mutation::{
    Mutation, OutboxInsert, PriceHistoryInsert, ProductInsert, ProductUpdate,
};
use super::plan::CommitPlan;
use super::r#trait::{Committer, ProductQueries, ProductRow, StorageError};

/// Committer over a shared sqlx connection pool.
///
/// Cloneable and thread-safe; one instance serves the whole process.
#[derive(Debug, Clone)]
pub struct PostgresCommitter {
    pool: Arc<PgPool>,
}

impl PostgresCommitter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn apply_mutation(
        tx: &mut Transaction<'_, Postgres>,
        mutation: &Mutation,
    ) -> Result<(), StorageError> {
        match mutation {
            Mutation::InsertProduct(insert) => Self::insert_product(tx, insert).await,
            Mutation::UpdateProduct(update) => Self::update_product(tx, update).await,
            Mutation::InsertOutbox(insert) => Self::insert_outbox(tx, insert).await,
            Mutation::InsertPriceHistory(insert) => Self::insert_price_history(tx, insert).await,
        }
    }

    async fn insert_product(
        tx: &mut Transaction<'_, Postgres>,
        insert: &ProductInsert,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                product_id,
                name,
                description,
                category,
                base_price_numerator,
                base_price_denominator,
                discount_percent,
                discount_start_at,
                discount_end_at,
                status,
                version,
                archived_at,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, now(), now())
            "#,
        )
        .bind(insert.product_id)
        .bind(&insert.name)
        .bind(&insert.description)
        .bind(&insert.category)
        .bind(insert.base_price_numerator)
        .bind(insert.base_price_denominator)
        .bind(insert.discount.as_ref().map(|d| d.percent))
        .bind(insert.discount.as_ref().map(|d| d.start_at))
        .bind(insert.discount.as_ref().map(|d| d.end_at))
        .bind(&insert.status)
        .bind(insert.version)
        .bind(insert.archived_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    async fn update_product(
        tx: &mut Transaction<'_, Postgres>,
        update: &ProductUpdate,
    ) -> Result<(), StorageError> {
        // Dirty columns only; version and updated_at move on every update.
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE products SET version = version + 1, updated_at = now()");

        if let Some(name) = &update.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &update.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(category) = &update.category {
            qb.push(", category = ").push_bind(category);
        }
        if let Some((numerator, denominator)) = update.base_price {
            qb.push(", base_price_numerator = ").push_bind(numerator);
            qb.push(", base_price_denominator = ").push_bind(denominator);
        }
        if let Some(discount) = &update.discount {
            qb.push(", discount_percent = ")
                .push_bind(discount.as_ref().map(|d| d.percent));
            qb.push(", discount_start_at = ")
                .push_bind(discount.as_ref().map(|d| d.start_at));
            qb.push(", discount_end_at = ")
                .push_bind(discount.as_ref().map(|d| d.end_at));
        }
        if let Some(status) = &update.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(archived_at) = &update.archived_at {
            qb.push(", archived_at = ").push_bind(*archived_at);
        }

        qb.push(" WHERE product_id = ").push_bind(update.product_id);

        let result = qb
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("update_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn insert_outbox(
        tx: &mut Transaction<'_, Postgres>,
        insert: &OutboxInsert,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO outbox_events (
                event_id,
                event_type,
                aggregate_id,
                payload,
                status,
                retry_count,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, now())
            "#,
        )
        .bind(insert.event_id)
        .bind(&insert.event_type)
        .bind(insert.aggregate_id)
        .bind(&insert.payload)
        .bind(&insert.status)
        .bind(insert.retry_count)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_outbox", e))?;
        Ok(())
    }

    async fn insert_price_history(
        tx: &mut Transaction<'_, Postgres>,
        insert: &PriceHistoryInsert,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO price_history (
                product_id,
                history_id,
                old_price_numerator,
                old_price_denominator,
                new_price_numerator,
                new_price_denominator,
                changed_by,
                changed_reason,
                changed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(insert.product_id)
        .bind(insert.history_id)
        .bind(insert.old_price.map(|(n, _)| n))
        .bind(insert.old_price.map(|(_, d)| d))
        .bind(insert.new_price.0)
        .bind(insert.new_price.1)
        .bind(&insert.changed_by)
        .bind(insert.changed_reason.as_deref())
        .bind(insert.changed_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_price_history", e))?;
        Ok(())
    }

    /// Read the current row version while locking the row for the rest of
    /// the transaction.
    async fn lock_current_version(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
    ) -> Result<Option<u64>, StorageError> {
        let row = sqlx::query("SELECT version FROM products WHERE product_id = $1 FOR UPDATE")
            .bind(product_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("lock_current_version", e))?;

        match row {
            Some(row) => {
                let version: i64 = row
                    .try_get("version")
                    .map_err(|e| map_sqlx_error("lock_current_version", e))?;
                Ok(Some(version as u64))
            }
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl Committer for PostgresCommitter {
    #[instrument(skip(self, plan), fields(mutation_count = plan.len()), err)]
    async fn apply(&self, plan: CommitPlan) -> Result<(), StorageError> {
        if plan.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for mutation in plan.mutations() {
            Self::apply_mutation(&mut tx, mutation).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(
        skip(self, plan),
        fields(product_id = %product_id, expected = expected_version, mutation_count = plan.len()),
        err
    )]
    async fn apply_with_version_check(
        &self,
        product_id: Uuid,
        expected_version: u64,
        plan: CommitPlan,
    ) -> Result<(), StorageError> {
        if plan.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let current = Self::lock_current_version(&mut tx, product_id)
            .await?
            .ok_or(StorageError::NotFound)?;

        if current != expected_version {
            // Dropping the transaction rolls it back.
            return Err(StorageError::Conflict {
                expected: expected_version,
                found: current,
            });
        }

        for mutation in plan.mutations() {
            Self::apply_mutation(&mut tx, mutation).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

#[async_trait::async_trait]
impl ProductQueries for PostgresCommitter {
    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn fetch_product(&self, product_id: Uuid) -> Result<Option<ProductRow>, StorageError> {
        sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT
                product_id,
                name,
                description,
                category,
                base_price_numerator,
                base_price_denominator,
                discount_percent,
                discount_start_at,
                discount_end_at,
                status,
                version,
                created_at,
                updated_at,
                archived_at
            FROM products
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_product", e))
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM products WHERE product_id = $1)")
            .bind(product_id)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("product_exists", e))?;
        row.try_get::<bool, _>(0)
            .map_err(|e| map_sqlx_error("product_exists", e))
    }
}

/// Collapse sqlx errors into the opaque storage kind, keeping the failing
/// operation and any Postgres error code for diagnostics.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StorageError {
    let message = match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => format!("[{code}] {}", db_err.message()),
            None => db_err.message().to_string(),
        },
        sqlx::Error::PoolClosed => "connection pool closed".to_string(),
        other => other.to_string(),
    };
    StorageError::database(operation, message)
}
