use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;

use rahhal_auth::Claims;
use rahhal_common::{ApiResponse, AppError, AppResult};
use rahhal_database::BookingPaymentUpdate;

use crate::gateways::moyasar::MoyasarPayment;
use crate::gateways::myfatoorah::MyfatoorahPayment;
use crate::gateways::stripe::{self, PaymentIntentParams, EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED};
use crate::gateways::WebhookPayload;
use crate::models::{
    CreatePaymentIntentRequest, CreatePaymentIntentResponse, StripeAck, WebhookAck,
    WebhookRejection,
};
use crate::AppState;

/// Gateways only ever POST their callbacks; anything else is rejected before
/// any downstream effect.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(WebhookRejection {
            error: "Method not allowed",
        }),
    )
        .into_response()
}

fn invalid_payload() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(WebhookRejection {
            error: "Invalid payload",
        }),
    )
        .into_response()
}

/// Parse a gateway body, mapping failure to the 400 rejection. Nothing has
/// been written at this point.
fn parse_webhook<P: WebhookPayload>(raw: &str) -> Result<P, Response> {
    P::parse(raw).map_err(|e| {
        tracing::warn!(gateway = P::GATEWAY, error = %e, "rejecting unparseable webhook");
        invalid_payload()
    })
}

fn acknowledge(ack: WebhookAck) -> Response {
    (StatusCode::OK, Json(ack)).into_response()
}

/// Convert a processing failure into a 200 acknowledgment. Returning a
/// non-2xx here would make the gateway redeliver the same notification
/// indefinitely; the failure is reported in the body instead.
fn acknowledge_fault(gateway: &'static str, error: AppError) -> Response {
    tracing::error!(gateway, error = %error, "webhook processing failed");
    acknowledge(WebhookAck::failure(error.to_string()))
}

pub async fn moyasar_webhook(State(state): State<AppState>, body: String) -> Response {
    let payment = match parse_webhook::<MoyasarPayment>(&body) {
        Ok(payment) => payment,
        Err(rejection) => return rejection,
    };
    tracing::info!(payment_id = %payment.id, status = ?payment.status, "Moyasar webhook received");

    match process_moyasar(&state, payment).await {
        Ok(ack) => acknowledge(ack),
        Err(e) => acknowledge_fault(MoyasarPayment::GATEWAY, e),
    }
}

async fn process_moyasar(state: &AppState, payment: MoyasarPayment) -> AppResult<WebhookAck> {
    let Some(correlation) = payment.correlation() else {
        tracing::warn!(payment_id = %payment.id, "Moyasar webhook missing booking metadata; discarding");
        return Ok(WebhookAck::received());
    };

    if let Some(update) = payment.trip_update() {
        state
            .reconciler
            .apply_trip_update(&correlation.booking_id, update)
            .await;
    }

    Ok(WebhookAck::received().with_payment_id(payment.id))
}

pub async fn myfatoorah_webhook(State(state): State<AppState>, body: String) -> Response {
    let payment = match parse_webhook::<MyfatoorahPayment>(&body) {
        Ok(payment) => payment,
        Err(rejection) => return rejection,
    };
    tracing::info!(invoice_id = ?payment.invoice_id(), "Myfatoorah webhook received");

    match process_myfatoorah(&state, payment).await {
        Ok(ack) => acknowledge(ack),
        Err(e) => acknowledge_fault(MyfatoorahPayment::GATEWAY, e),
    }
}

async fn process_myfatoorah(state: &AppState, payment: MyfatoorahPayment) -> AppResult<WebhookAck> {
    let Some(correlation) = payment.correlation() else {
        tracing::warn!(
            invoice_id = ?payment.invoice_id(),
            "Myfatoorah webhook missing custom fields; discarding"
        );
        return Ok(WebhookAck::received());
    };

    let update = payment.trip_update();
    let outcome = update.payment_status;
    state
        .reconciler
        .apply_trip_update(&correlation.booking_id, update)
        .await;

    Ok(WebhookAck::received().with_invoice(payment.invoice_id(), outcome.as_str()))
}

/// The only webhook with signature verification: the other gateways do not
/// sign their callbacks, so those routes stay open endpoints.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if let Err(e) = stripe::verify_signature(&state.config.stripe.webhook_secret, signature, &body)
    {
        tracing::error!(error = %e, "Stripe webhook signature verification failed");
        return (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", e)).into_response();
    }

    let event = match stripe::parse_event(&body) {
        Ok(event) => event,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", e)).into_response()
        }
    };

    let intent = event.data.object;
    match event.event_type.as_str() {
        EVENT_PAYMENT_SUCCEEDED => match intent.metadata.get("bookingId") {
            Some(booking_id) => {
                tracing::info!(booking_id = %booking_id, intent_id = %intent.id, "payment succeeded");
                state
                    .reconciler
                    .apply_booking_update(
                        booking_id,
                        BookingPaymentUpdate::Completed {
                            payment_intent_id: intent.id.clone(),
                        },
                    )
                    .await;
            }
            None => {
                tracing::warn!(intent_id = %intent.id, "succeeded intent carries no booking metadata")
            }
        },
        EVENT_PAYMENT_FAILED => match intent.metadata.get("bookingId") {
            Some(booking_id) => {
                tracing::info!(booking_id = %booking_id, intent_id = %intent.id, "payment failed");
                let payment_error = intent.last_payment_error.and_then(|e| e.message);
                state
                    .reconciler
                    .apply_booking_update(booking_id, BookingPaymentUpdate::Failed { payment_error })
                    .await;
            }
            None => {
                tracing::warn!(intent_id = %intent.id, "failed intent carries no booking metadata")
            }
        },
        other => tracing::debug!(event_type = other, "ignoring Stripe event"),
    }

    (StatusCode::OK, Json(StripeAck { received: true })).into_response()
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    claims: Claims,
    Json(request): Json<CreatePaymentIntentRequest>,
) -> Result<Json<CreatePaymentIntentResponse>, AppError> {
    if request.amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "Amount must be greater than 0".to_string(),
        ));
    }

    tracing::info!(
        user = %claims.sub,
        booking_id = %request.booking_id,
        amount = %request.amount,
        "creating payment intent"
    );

    let intent = state
        .stripe
        .create_payment_intent(PaymentIntentParams {
            amount: request.amount,
            currency: request.currency.unwrap_or_else(|| "usd".to_string()),
            description: request.description,
            user_id: request.user_id,
            booking_id: request.booking_id,
        })
        .await?;

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
        payment_intent_id: intent.id,
    }))
}

pub async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::success("Payments service is healthy".to_string()))
}
