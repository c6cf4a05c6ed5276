use rahhal_common::{AppError, PaymentOutcome};
use rahhal_database::TripPaymentUpdate;
use serde::Deserialize;

use super::{Correlation, WebhookPayload};

#[derive(Debug, Clone, Deserialize)]
pub struct MoyasarPayment {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<MoyasarMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoyasarMetadata {
    #[serde(rename = "bookingId", default)]
    pub booking_id: Option<String>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

impl WebhookPayload for MoyasarPayment {
    const GATEWAY: &'static str = "moyasar";

    fn parse(raw: &str) -> Result<Self, AppError> {
        let payment: MoyasarPayment = serde_json::from_str(raw)
            .map_err(|e| AppError::Validation(format!("Invalid payload: {}", e)))?;
        if payment.id.is_empty() {
            return Err(AppError::Validation("Invalid payload: empty payment id".to_string()));
        }
        Ok(payment)
    }

    fn correlation(&self) -> Option<Correlation> {
        let metadata = self.metadata.as_ref()?;
        match (&metadata.booking_id, &metadata.user_id) {
            (Some(booking_id), Some(user_id)) => Some(Correlation {
                booking_id: booking_id.clone(),
                user_id: user_id.clone(),
            }),
            _ => None,
        }
    }
}

impl MoyasarPayment {
    /// Moyasar reports terminal statuses as plain strings; `cancelled` is
    /// folded into `failed`. Anything else is a transient state this
    /// service does not track.
    pub fn outcome(&self) -> Option<PaymentOutcome> {
        match self.status.as_deref() {
            Some("paid") => Some(PaymentOutcome::Paid),
            Some("failed") | Some("cancelled") => Some(PaymentOutcome::Failed),
            _ => None,
        }
    }

    /// The trip update for this notification, or `None` when the status is
    /// outside the mapped set (acknowledged, nothing written). Only a paid
    /// notification records the gateway transaction id; failure callbacks
    /// do not carry one worth keeping.
    pub fn trip_update(&self) -> Option<TripPaymentUpdate> {
        let outcome = self.outcome()?;
        let payment_id = (outcome == PaymentOutcome::Paid).then(|| self.id.clone());
        Some(TripPaymentUpdate {
            payment_status: outcome,
            trip_status: None,
            payment_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(status: &str) -> MoyasarPayment {
        MoyasarPayment {
            id: "pay_1".to_string(),
            status: Some(status.to_string()),
            metadata: None,
        }
    }

    #[test]
    fn paid_maps_to_paid_with_payment_id() {
        let update = payment("paid").trip_update().unwrap();
        assert_eq!(update.payment_status, PaymentOutcome::Paid);
        assert_eq!(update.trip_status, None);
        assert_eq!(update.payment_id.as_deref(), Some("pay_1"));
    }

    #[test]
    fn failed_and_cancelled_both_map_to_failed_without_payment_id() {
        for status in ["failed", "cancelled"] {
            let update = payment(status).trip_update().unwrap();
            assert_eq!(update.payment_status, PaymentOutcome::Failed);
            assert_eq!(update.payment_id, None);
        }
    }

    #[test]
    fn unmapped_status_produces_no_update() {
        assert!(payment("authorized").trip_update().is_none());
        let no_status = MoyasarPayment {
            id: "pay_1".to_string(),
            status: None,
            metadata: None,
        };
        assert!(no_status.trip_update().is_none());
    }

    #[test]
    fn parse_requires_a_payment_id() {
        assert!(MoyasarPayment::parse(r#"{"status": "paid"}"#).is_err());
        assert!(MoyasarPayment::parse(r#"{"id": "", "status": "paid"}"#).is_err());
        assert!(MoyasarPayment::parse("not json").is_err());
        assert!(MoyasarPayment::parse(r#"{"id": "pay_1"}"#).is_ok());
    }

    #[test]
    fn correlation_requires_both_identifiers() {
        let mut payment = payment("paid");
        assert_eq!(payment.correlation(), None);

        payment.metadata = Some(MoyasarMetadata {
            booking_id: Some("bk_1".to_string()),
            user_id: None,
        });
        assert_eq!(payment.correlation(), None);

        payment.metadata = Some(MoyasarMetadata {
            booking_id: Some("bk_1".to_string()),
            user_id: Some("u_1".to_string()),
        });
        let correlation = payment.correlation().unwrap();
        assert_eq!(correlation.booking_id, "bk_1");
        assert_eq!(correlation.user_id, "u_1");
    }
}
