use axum::routing::{get, post};
use axum::Router;

use crate::{handlers, AppState};

/// The gateway callback routes are open endpoints: Moyasar and Myfatoorah do
/// not sign their notifications today, so anyone who knows a booking id can
/// post a forged status update. Stripe is the only verified webhook. Known
/// gap until those gateways support a shared-secret check.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Gateway callbacks (server-to-server, POST only)
        .route(
            "/moyasar-webhook",
            post(handlers::moyasar_webhook).fallback(handlers::method_not_allowed),
        )
        .route(
            "/myfatoorah-webhook",
            post(handlers::myfatoorah_webhook).fallback(handlers::method_not_allowed),
        )
        .route(
            "/stripe-webhook",
            post(handlers::stripe_webhook).fallback(handlers::method_not_allowed),
        )
        // Authenticated client RPC
        .route("/payments/intent", post(handlers::create_payment_intent))
}
