//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, Money, PaymentId, QuoteId, Timestamp, UserId,
};
use crate::domain::payment::{PartialPayment, PaymentMethod};
use crate::ports::{CancelWrite, PaymentInsert, PaymentRepository};

/// PostgreSQL implementation of the PaymentRepository port.
///
/// `register` runs inside one transaction that locks the quote row,
/// recomputes the balance from non-cancelled payments, and inserts.
/// Two concurrent registrations against the same quote serialize on the
/// row lock, so their combined total can never overshoot.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

const CANCEL_SQL: &str = r#"
    UPDATE partial_payments
    SET is_cancelled = TRUE, cancellation_reason = $2, updated_at = now()
    WHERE id = $1 AND NOT is_cancelled
"#;

impl PostgresPaymentRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a partial payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    quote_id: Uuid,
    amount: Decimal,
    payment_date: DateTime<Utc>,
    payment_method: String,
    reference_number: Option<String>,
    notes: Option<String>,
    is_cancelled: bool,
    cancellation_reason: Option<String>,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PartialPayment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(PartialPayment {
            id: PaymentId::from_uuid(row.id),
            quote_id: QuoteId::from_uuid(row.quote_id),
            amount: Money::new(row.amount),
            payment_date: Timestamp::from_datetime(row.payment_date),
            payment_method: PaymentMethod::from_stored(&row.payment_method)?,
            reference_number: row.reference_number,
            notes: row.notes,
            is_cancelled: row.is_cancelled,
            cancellation_reason: row.cancellation_reason,
            created_by: UserId::new(row.created_by).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid created_by: {}", e))
            })?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn storage_error(operation: &'static str, error: sqlx::Error) -> DomainError {
    tracing::error!(operation, error = %error, "payment repository query failed");
    DomainError::database(operation)
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn register(&self, payment: &PartialPayment) -> Result<PaymentInsert, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("register_payment", e))?;

        // Lock the quote row for the duration of the balance check.
        let total: Option<Decimal> =
            sqlx::query_scalar("SELECT total_amount FROM quotes WHERE id = $1 FOR UPDATE")
                .bind(payment.quote_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| storage_error("register_payment", e))?;

        let total = match total {
            Some(total) => Money::new(total),
            None => return Ok(PaymentInsert::QuoteNotFound),
        };

        let paid: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM partial_payments
            WHERE quote_id = $1 AND NOT is_cancelled
            "#,
        )
        .bind(payment.quote_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| storage_error("register_payment", e))?;

        let balance = total.saturating_sub(Money::new(paid));
        if payment.amount > balance {
            // Dropping the transaction rolls it back.
            return Ok(PaymentInsert::BalanceExceeded { balance });
        }

        sqlx::query(
            r#"
            INSERT INTO partial_payments (
                id, quote_id, amount, payment_date, payment_method,
                reference_number, notes, is_cancelled, cancellation_reason,
                created_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.quote_id.as_uuid())
        .bind(payment.amount.as_decimal())
        .bind(payment.payment_date.as_datetime())
        .bind(payment.payment_method.as_str())
        .bind(&payment.reference_number)
        .bind(&payment.notes)
        .bind(payment.is_cancelled)
        .bind(&payment.cancellation_reason)
        .bind(payment.created_by.as_str())
        .bind(payment.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("register_payment", e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error("register_payment", e))?;

        Ok(PaymentInsert::Inserted {
            remaining_balance: balance - payment.amount,
        })
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<PartialPayment>, DomainError> {
        let row: Option<PaymentRow> =
            sqlx::query_as("SELECT * FROM partial_payments WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_error("find_payment", e))?;
        row.map(PartialPayment::try_from).transpose()
    }

    async fn cancel(
        &self,
        id: PaymentId,
        reason: Option<String>,
    ) -> Result<CancelWrite, DomainError> {
        // Conditional on the flag not being set yet; a second cancel
        // affects zero rows and is reported as a conflict.
        let result = sqlx::query(CANCEL_SQL)
            .bind(id.as_uuid())
            .bind(&reason)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("cancel_payment", e))?;

        if result.rows_affected() == 1 {
            return Ok(CancelWrite::Cancelled);
        }

        let cancelled: Option<bool> =
            sqlx::query_scalar("SELECT is_cancelled FROM partial_payments WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage_error("cancel_payment", e))?;

        match cancelled {
            Some(_) => Ok(CancelWrite::AlreadyCancelled),
            None => Ok(CancelWrite::NotFound),
        }
    }

    async fn list_for_quote(&self, quote_id: QuoteId) -> Result<Vec<PartialPayment>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(
            "SELECT * FROM partial_payments WHERE quote_id = $1 ORDER BY payment_date",
        )
        .bind(quote_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list_payments", e))?;
        rows.into_iter().map(PartialPayment::try_from).collect()
    }

    async fn list_for_quotes(
        &self,
        quote_ids: &[QuoteId],
    ) -> Result<Vec<PartialPayment>, DomainError> {
        if quote_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = quote_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<PaymentRow> = sqlx::query_as(
            "SELECT * FROM partial_payments WHERE quote_id = ANY($1) ORDER BY payment_date",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list_payments", e))?;
        rows.into_iter().map(PartialPayment::try_from).collect()
    }
}
