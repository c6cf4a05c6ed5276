use std::collections::HashMap;

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use rahhal_common::{AppError, AppResult};
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use sha2::Sha256;

use crate::config::StripeConfig;

type HmacSha256 = Hmac<Sha256>;

pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: StripePaymentIntent,
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub last_payment_error: Option<StripePaymentError>,
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentError {
    #[serde(default)]
    pub message: Option<String>,
}

pub fn parse_event(raw: &str) -> AppResult<StripeEvent> {
    serde_json::from_str(raw).map_err(|e| AppError::Validation(format!("invalid event payload: {}", e)))
}

/// Verify the `stripe-signature` header against the raw request body. The
/// header carries `t=<unix ts>,v1=<hex hmac>`; the signed payload is
/// `"{t}.{body}"` keyed with the endpoint's webhook secret.
pub fn verify_signature(secret: &str, signature_header: &str, payload: &str) -> Result<(), AppError> {
    let mut timestamp = None;
    let mut candidate = None;
    for part in signature_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(v) = part.strip_prefix("v1=") {
            candidate = Some(v);
        }
    }
    let (timestamp, candidate) = match (timestamp, candidate) {
        (Some(t), Some(v)) => (t, v),
        _ => {
            return Err(AppError::Validation(
                "missing timestamp or signature".to_string(),
            ))
        }
    };

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal("invalid webhook secret".to_string()))?;
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if constant_time_eq(expected.as_bytes(), candidate.as_bytes()) {
        Ok(())
    } else {
        Err(AppError::Validation("signature mismatch".to_string()))
    }
}

// Constant-time comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Convert a decimal currency amount to Stripe's integer minor units,
/// rounding halves away from zero.
pub fn to_minor_units(amount: Decimal) -> AppResult<i64> {
    (amount * Decimal::new(100, 0))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::Validation("Amount out of range".to_string()))
}

#[derive(Debug, Clone)]
pub struct PaymentIntentParams {
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub user_id: String,
    pub booking_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    error: StripeApiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeApiErrorDetails {
    message: String,
}

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

impl StripeClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn auth_header(&self) -> String {
        let credentials = format!("{}:", self.config.secret_key);
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {}", encoded)
    }

    /// Create a payment intent carrying the booking correlation as opaque
    /// metadata, so the later webhook can find its way back to the booking.
    pub async fn create_payment_intent(
        &self,
        params: PaymentIntentParams,
    ) -> AppResult<PaymentIntent> {
        let amount = to_minor_units(params.amount)?;

        let mut form = HashMap::new();
        form.insert("amount", amount.to_string());
        form.insert("currency", params.currency.to_lowercase());
        form.insert("metadata[userId]", params.user_id);
        form.insert("metadata[bookingId]", params.booking_id);
        form.insert("metadata[type]", "booking_payment".to_string());
        if let Some(description) = params.description {
            form.insert("description", description);
        }

        let response = self
            .client
            .post(format!("{}/payment_intents", self.config.base_url))
            .header("Authorization", self.auth_header())
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Stripe request failed: {}", e)))?;

        if response.status().is_success() {
            response
                .json::<PaymentIntent>()
                .await
                .map_err(|e| AppError::Gateway(format!("invalid Stripe response: {}", e)))
        } else {
            let status = response.status();
            match response.json::<StripeApiError>().await {
                Ok(api_error) => Err(AppError::Gateway(api_error.error.message)),
                Err(_) => Err(AppError::Gateway(format!("Stripe returned HTTP {}", status))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, timestamp: &str, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn minor_unit_conversion_rounds_half_up() {
        assert_eq!(to_minor_units("19.999".parse().unwrap()).unwrap(), 2000);
        assert_eq!(to_minor_units("10.005".parse().unwrap()).unwrap(), 1001);
        assert_eq!(to_minor_units("10".parse().unwrap()).unwrap(), 1000);
        assert_eq!(to_minor_units("0.004".parse().unwrap()).unwrap(), 0);
    }

    #[test]
    fn accepts_a_valid_signature() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let header = sign("whsec_test", "1712000000", payload);
        assert!(verify_signature("whsec_test", &header, payload).is_ok());
    }

    #[test]
    fn rejects_a_tampered_body() {
        let header = sign("whsec_test", "1712000000", r#"{"amount":100}"#);
        let result = verify_signature("whsec_test", &header, r#"{"amount":999}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_the_wrong_secret() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let header = sign("whsec_other", "1712000000", payload);
        assert!(verify_signature("whsec_test", &header, payload).is_err());
    }

    #[test]
    fn rejects_a_malformed_header() {
        assert!(verify_signature("whsec_test", "", "{}").is_err());
        assert!(verify_signature("whsec_test", "t=1712000000", "{}").is_err());
        assert!(verify_signature("whsec_test", "v1=deadbeef", "{}").is_err());
    }

    #[test]
    fn parses_an_intent_event() {
        let event = parse_event(
            r#"{
                "type": "payment_intent.payment_failed",
                "data": {"object": {
                    "id": "pi_1",
                    "metadata": {"bookingId": "bk_1", "userId": "u_1"},
                    "last_payment_error": {"message": "card_declined"}
                }}
            }"#,
        )
        .unwrap();
        assert_eq!(event.event_type, EVENT_PAYMENT_FAILED);
        assert_eq!(event.data.object.id, "pi_1");
        assert_eq!(
            event.data.object.metadata.get("bookingId").map(String::as_str),
            Some("bk_1")
        );
        assert_eq!(
            event.data.object.last_payment_error.unwrap().message.as_deref(),
            Some("card_declined")
        );
    }
}
