use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Gateway-independent payment result. Raw gateway vocabulary (string
/// statuses, integer codes, event types) is normalized into this enum at the
/// parsing boundary and never leaks past it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Paid,
    Failed,
    Cancelled,
    Pending,
}

impl PaymentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOutcome::Paid => "paid",
            PaymentOutcome::Failed => "failed",
            PaymentOutcome::Cancelled => "cancelled",
            PaymentOutcome::Pending => "pending",
        }
    }
}

/// Trip lifecycle status, written alongside the payment status by gateways
/// that carry trip-level semantics (Myfatoorah).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Confirmed,
    Cancelled,
    Pending,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Confirmed => "confirmed",
            TripStatus::Cancelled => "cancelled",
            TripStatus::Pending => "pending",
        }
    }
}

// Common response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PaymentOutcome::Paid).unwrap(),
            "\"paid\""
        );
        assert_eq!(PaymentOutcome::Cancelled.as_str(), "cancelled");
        assert_eq!(TripStatus::Confirmed.as_str(), "confirmed");
    }
}
