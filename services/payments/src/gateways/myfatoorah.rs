use std::fmt;

use rahhal_common::{AppError, PaymentOutcome, TripStatus};
use rahhal_database::TripPaymentUpdate;
use serde::Deserialize;

use super::{Correlation, WebhookPayload};

/// Myfatoorah is inconsistent about field casing and status typing across
/// its callback variants, so every field is matched by alias and the status
/// is an untagged union of integer code and string label.
#[derive(Debug, Clone, Deserialize)]
pub struct MyfatoorahPayment {
    #[serde(alias = "InvoiceId", alias = "invoiceId", default)]
    pub invoice_id: Option<InvoiceReference>,
    #[serde(
        alias = "InvoiceStatus",
        alias = "paymentStatus",
        alias = "transactionStatus",
        default
    )]
    pub status: Option<InvoiceStatus>,
    #[serde(rename = "CustomFields", default)]
    pub custom_fields: CustomFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InvoiceReference {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for InvoiceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceReference::Numeric(id) => write!(f, "{}", id),
            InvoiceReference::Text(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InvoiceStatus {
    Code(i64),
    Label(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomFields {
    #[serde(rename = "bookingId", default)]
    pub booking_id: Option<String>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

impl WebhookPayload for MyfatoorahPayment {
    const GATEWAY: &'static str = "myfatoorah";

    fn parse(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw).map_err(|e| AppError::Validation(format!("Invalid payload: {}", e)))
    }

    fn correlation(&self) -> Option<Correlation> {
        match (&self.custom_fields.booking_id, &self.custom_fields.user_id) {
            (Some(booking_id), Some(user_id)) => Some(Correlation {
                booking_id: booking_id.clone(),
                user_id: user_id.clone(),
            }),
            _ => None,
        }
    }
}

/// Myfatoorah status codes: 1 = Paid, 2 = Pending, 3 = Failed, 4 = Cancelled.
/// Unrecognized values fall back to pending rather than rejecting the
/// webhook, since the gateway adds transient statuses over time.
pub fn normalize(status: Option<&InvoiceStatus>) -> (PaymentOutcome, TripStatus) {
    match status {
        Some(InvoiceStatus::Code(1)) => (PaymentOutcome::Paid, TripStatus::Confirmed),
        Some(InvoiceStatus::Code(3)) => (PaymentOutcome::Failed, TripStatus::Cancelled),
        Some(InvoiceStatus::Code(4)) => (PaymentOutcome::Cancelled, TripStatus::Cancelled),
        Some(InvoiceStatus::Label(label)) => match label.as_str() {
            "Paid" | "Success" => (PaymentOutcome::Paid, TripStatus::Confirmed),
            "Failed" | "failure" => (PaymentOutcome::Failed, TripStatus::Cancelled),
            "Cancelled" => (PaymentOutcome::Cancelled, TripStatus::Cancelled),
            _ => (PaymentOutcome::Pending, TripStatus::Pending),
        },
        _ => (PaymentOutcome::Pending, TripStatus::Pending),
    }
}

impl MyfatoorahPayment {
    pub fn invoice_id(&self) -> Option<String> {
        self.invoice_id.as_ref().map(|id| id.to_string())
    }

    /// Unlike Moyasar, every recognized notification writes: unknown
    /// statuses still land as pending/pending, and the invoice id is
    /// recorded whenever present.
    pub fn trip_update(&self) -> TripPaymentUpdate {
        let (outcome, trip_status) = normalize(self.status.as_ref());
        TripPaymentUpdate {
            payment_status: outcome,
            trip_status: Some(trip_status),
            payment_id: self.invoice_id(),
        }
    }
}
