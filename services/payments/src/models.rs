use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Acknowledgment body returned to a gateway webhook. Once the payload
/// parses, the webhook is acknowledged with 200 no matter what happened
/// downstream; `success: false` reports an internal fault without inviting
/// the gateway to retry.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    #[serde(rename = "paymentId", skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(rename = "invoiceId", skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(rename = "paymentStatus", skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self {
            success: true,
            payment_id: None,
            invoice_id: None,
            payment_status: None,
            error: None,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            payment_id: None,
            invoice_id: None,
            payment_status: None,
            error: Some(message),
        }
    }

    pub fn with_payment_id(mut self, payment_id: String) -> Self {
        self.payment_id = Some(payment_id);
        self
    }

    pub fn with_invoice(mut self, invoice_id: Option<String>, payment_status: &'static str) -> Self {
        self.invoice_id = invoice_id;
        self.payment_status = Some(payment_status);
        self
    }
}

/// Error body for requests rejected before any side effect (wrong method,
/// unparseable payload).
#[derive(Debug, Serialize)]
pub struct WebhookRejection {
    pub error: &'static str,
}

/// Stripe only wants to know the event was received.
#[derive(Debug, Serialize)]
pub struct StripeAck {
    pub received: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentIntentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "bookingId")]
    pub booking_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentIntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: Option<String>,
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
}
