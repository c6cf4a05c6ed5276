use async_trait::async_trait;
use rahhal_common::{AppError, PaymentOutcome, TripStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// Field set applied to a trip row in a single conditional update. `None`
/// fields leave the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripPaymentUpdate {
    pub payment_status: PaymentOutcome,
    pub trip_status: Option<TripStatus>,
    pub payment_id: Option<String>,
}

/// Field set applied to a booking row by the Stripe webhook path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingPaymentUpdate {
    Completed { payment_intent_id: String },
    Failed { payment_error: Option<String> },
}

/// Conditional-update surface of the booking store. Updates are keyed by
/// record id equality only; there is no version token, so concurrent
/// notifications for the same record are last-write-wins.
#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    async fn update_trip_payment(
        &self,
        trip_id: &str,
        update: TripPaymentUpdate,
    ) -> Result<(), AppError>;

    async fn update_booking_payment(
        &self,
        booking_id: &str,
        update: BookingPaymentUpdate,
    ) -> Result<(), AppError>;
}

pub struct PgReconciliationStore {
    pool: PgPool,
}

impl PgReconciliationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_record_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|e| AppError::Validation(format!("Invalid record id '{}': {}", id, e)))
}

#[async_trait]
impl ReconciliationStore for PgReconciliationStore {
    async fn update_trip_payment(
        &self,
        trip_id: &str,
        update: TripPaymentUpdate,
    ) -> Result<(), AppError> {
        let id = parse_record_id(trip_id)?;

        let result = sqlx::query(
            "UPDATE trips
             SET payment_status = $1,
                 status = COALESCE($2, status),
                 payment_id = COALESCE($3, payment_id),
                 updated_at = now()
             WHERE id = $4",
        )
        .bind(update.payment_status.as_str())
        .bind(update.trip_status.map(|s| s.as_str()))
        .bind(update.payment_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            tracing::warn!(trip_id = %id, "payment update matched no trip");
        }
        Ok(())
    }

    async fn update_booking_payment(
        &self,
        booking_id: &str,
        update: BookingPaymentUpdate,
    ) -> Result<(), AppError> {
        let id = parse_record_id(booking_id)?;

        let result = match update {
            BookingPaymentUpdate::Completed { payment_intent_id } => {
                sqlx::query(
                    "UPDATE bookings
                     SET payment_status = 'completed',
                         payment_intent_id = $1,
                         completed_at = now(),
                         updated_at = now()
                     WHERE id = $2",
                )
                .bind(payment_intent_id)
                .bind(id)
                .execute(&self.pool)
                .await
            }
            BookingPaymentUpdate::Failed { payment_error } => {
                sqlx::query(
                    "UPDATE bookings
                     SET payment_status = 'failed',
                         payment_error = $1,
                         updated_at = now()
                     WHERE id = $2",
                )
                .bind(payment_error)
                .bind(id)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            tracing::warn!(booking_id = %id, "payment update matched no booking");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_uuid_record_id() {
        let err = parse_record_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.error_code(), "invalid-argument");
    }

    #[test]
    fn accepts_uuid_record_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_record_id(&id.to_string()).unwrap(), id);
    }
}
