mod config;
mod gateways;
mod handlers;
mod models;
mod reconcile;
mod routes;

use std::sync::Arc;

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::response::Json;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rahhal_auth::JwtService;
use rahhal_common::ApiResponse;
use rahhal_database::{create_pool, run_migrations, PgReconciliationStore};

use crate::config::PaymentsConfig;
use crate::gateways::stripe::StripeClient;
use crate::reconcile::Reconciler;

#[derive(Clone)]
pub struct AppState {
    pub config: PaymentsConfig,
    pub reconciler: Reconciler,
    pub stripe: StripeClient,
    pub jwt: JwtService,
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rahhal_payments=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = PaymentsConfig::from_env()?;

    // Create database connection pool and bring the schema up to date
    let db_pool = create_pool(&config.database).await?;
    run_migrations(&db_pool).await?;

    // Clients are constructed once here and shared across requests; the
    // store and the Stripe HTTP client are stateless and need no teardown.
    let store = Arc::new(PgReconciliationStore::new(db_pool));
    let app_state = AppState {
        reconciler: Reconciler::new(store),
        stripe: StripeClient::new(config.stripe.clone()),
        jwt: JwtService::new(&config.jwt.secret),
        config: config.clone(),
    };

    // Build the application
    let app = routes::create_routes()
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
        .fallback(handler_404);

    // Start the server
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))
            .await?;

    tracing::info!(
        "Payments service listening on {}:{}",
        config.server.host,
        config.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}

async fn handler_404() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Endpoint not found".to_string())),
    )
}
