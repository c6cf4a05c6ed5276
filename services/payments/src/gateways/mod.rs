pub mod moyasar;
pub mod myfatoorah;
pub mod stripe;

use rahhal_common::AppError;

/// Correlation metadata a gateway attaches to a notification so it can be
/// traced back to a booking and the user who paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correlation {
    pub booking_id: String,
    pub user_id: String,
}

/// Capability set each gateway adapter implements: parse the raw POST body
/// into a typed notification and expose its correlation data. Status
/// normalization lives inside the gateway module, so raw gateway vocabulary
/// never crosses this boundary.
pub trait WebhookPayload: Sized {
    const GATEWAY: &'static str;

    fn parse(raw: &str) -> Result<Self, AppError>;

    /// Both identifiers must be present for any write to be attempted;
    /// notifications without them are acknowledged and discarded.
    fn correlation(&self) -> Option<Correlation>;
}
