//! PostgreSQL implementation of QuoteRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    ClientId, DomainError, ErrorCode, Money, QuoteId, Timestamp, UserId,
};
use crate::domain::quote::{Quote, QuoteStatus};
use crate::ports::{DeleteWrite, QuoteRepository, StatusWrite};

/// PostgreSQL implementation of the QuoteRepository port.
///
/// Status updates and deletions are conditional single-statement writes;
/// the row's stored status is the authority, not any value the caller
/// read earlier.
pub struct PostgresQuoteRepository {
    pool: PgPool,
}

impl PostgresQuoteRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_status(&self, id: QuoteId) -> Result<Option<QuoteStatus>, DomainError> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM quotes WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_error("current_status", e))?;
        status.as_deref().map(QuoteStatus::from_stored).transpose()
    }
}

/// Database row representation of a quote.
#[derive(Debug, sqlx::FromRow)]
struct QuoteRow {
    id: Uuid,
    client_id: Uuid,
    client_name: String,
    vendor_id: String,
    status: String,
    total_amount: Decimal,
    total_cost: Decimal,
    event_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<QuoteRow> for Quote {
    type Error = DomainError;

    fn try_from(row: QuoteRow) -> Result<Self, Self::Error> {
        Ok(Quote {
            id: QuoteId::from_uuid(row.id),
            client_id: ClientId::from_uuid(row.client_id),
            client_name: row.client_name,
            vendor_id: UserId::new(row.vendor_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid vendor_id: {}", e))
            })?,
            status: QuoteStatus::from_stored(&row.status)?,
            total_amount: Money::new(row.total_amount),
            total_cost: Money::new(row.total_cost),
            event_date: Timestamp::from_datetime(row.event_date),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn storage_error(operation: &'static str, error: sqlx::Error) -> DomainError {
    tracing::error!(operation, error = %error, "quote repository query failed");
    DomainError::database(operation)
}

#[async_trait]
impl QuoteRepository for PostgresQuoteRepository {
    async fn insert(&self, quote: &Quote) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO quotes (
                id, client_id, client_name, vendor_id, status,
                total_amount, total_cost, event_date, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(quote.id.as_uuid())
        .bind(quote.client_id.as_uuid())
        .bind(&quote.client_name)
        .bind(quote.vendor_id.as_str())
        .bind(quote.status.as_str())
        .bind(quote.total_amount.as_decimal())
        .bind(quote.total_cost.as_decimal())
        .bind(quote.event_date.as_datetime())
        .bind(quote.created_at.as_datetime())
        .bind(quote.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("insert_quote", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<Quote>, DomainError> {
        let row: Option<QuoteRow> = sqlx::query_as("SELECT * FROM quotes WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find_quote", e))?;
        row.map(Quote::try_from).transpose()
    }

    async fn list(&self, vendor_id: Option<&UserId>) -> Result<Vec<Quote>, DomainError> {
        let rows: Vec<QuoteRow> = sqlx::query_as(
            r#"
            SELECT * FROM quotes
            WHERE ($1::text IS NULL OR vendor_id = $1)
            ORDER BY created_at
            "#,
        )
        .bind(vendor_id.map(UserId::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list_quotes", e))?;
        rows.into_iter().map(Quote::try_from).collect()
    }

    async fn update_status(
        &self,
        id: QuoteId,
        expected_from: QuoteStatus,
        to: QuoteStatus,
    ) -> Result<StatusWrite, DomainError> {
        // Compare-and-swap: zero affected rows means the stored status
        // moved on since the caller read it.
        let result = sqlx::query(
            r#"
            UPDATE quotes SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(expected_from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("update_quote_status", e))?;

        if result.rows_affected() == 1 {
            return Ok(StatusWrite::Applied);
        }

        match self.current_status(id).await? {
            Some(current) => Ok(StatusWrite::Conflict { current }),
            None => Ok(StatusWrite::NotFound),
        }
    }

    async fn update_total(&self, id: QuoteId, new_total: Money) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE quotes SET total_amount = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(new_total.as_decimal())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("update_quote_total", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::QuoteNotFound, "Quote not found")
                .with_detail("quote_id", id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, id: QuoteId) -> Result<DeleteWrite, DomainError> {
        // Conditional on the stored status still being deletable.
        let result = sqlx::query(
            "DELETE FROM quotes WHERE id = $1 AND status IN ('draft', 'pending')",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("delete_quote", e))?;

        if result.rows_affected() == 1 {
            return Ok(DeleteWrite::Deleted);
        }

        match self.current_status(id).await? {
            Some(current) => Ok(DeleteWrite::Blocked { current }),
            None => Ok(DeleteWrite::NotFound),
        }
    }
}
