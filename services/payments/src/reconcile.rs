use std::sync::Arc;

use rahhal_database::{BookingPaymentUpdate, ReconciliationStore, TripPaymentUpdate};

/// Applies canonical outcomes to the booking store. Persistence failures are
/// logged and swallowed: acknowledging a webhook is never blocked on a
/// successful write, and redelivery is the gateway's responsibility.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn ReconciliationStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn ReconciliationStore>) -> Self {
        Self { store }
    }

    pub async fn apply_trip_update(&self, trip_id: &str, update: TripPaymentUpdate) {
        let payment_status = update.payment_status;
        match self.store.update_trip_payment(trip_id, update).await {
            Ok(()) => tracing::info!(
                trip_id = %trip_id,
                payment_status = payment_status.as_str(),
                "trip payment reconciled"
            ),
            Err(e) => tracing::error!(trip_id = %trip_id, error = %e, "failed to update trip"),
        }
    }

    pub async fn apply_booking_update(&self, booking_id: &str, update: BookingPaymentUpdate) {
        match self.store.update_booking_payment(booking_id, update).await {
            Ok(()) => tracing::info!(booking_id = %booking_id, "booking payment reconciled"),
            Err(e) => {
                tracing::error!(booking_id = %booking_id, error = %e, "failed to update booking")
            }
        }
    }
}
