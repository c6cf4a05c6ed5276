use rahhal_common::{DatabaseConfig, JwtConfig, ServerConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub stripe: StripeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub base_url: String,
}

impl PaymentsConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            server: ServerConfig {
                host: std::env::var("PAYMENTS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PAYMENTS_PORT")
                    .unwrap_or_else(|_| "8005".to_string())
                    .parse()
                    .unwrap_or(8005),
            },
            database: DatabaseConfig {
                host: std::env::var("DATABASE_HOST").unwrap_or_else(|_| "localhost".to_string()),
                port: std::env::var("DATABASE_PORT")
                    .unwrap_or_else(|_| "5432".to_string())
                    .parse()
                    .unwrap_or(5432),
                username: std::env::var("DATABASE_USERNAME")
                    .unwrap_or_else(|_| "rahhal_user".to_string()),
                password: std::env::var("DATABASE_PASSWORD")
                    .unwrap_or_else(|_| "rahhal_password".to_string()),
                database: std::env::var("DATABASE_NAME").unwrap_or_else(|_| "rahhal".to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            jwt: JwtConfig {
                secret: std::env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "dev-secret-key-change-in-production".to_string()),
                expiration_hours: std::env::var("JWT_EXPIRATION_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .unwrap_or(24),
                issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "rahhal".to_string()),
            },
            stripe: StripeConfig {
                secret_key: std::env::var("STRIPE_SECRET_KEY")
                    .unwrap_or_else(|_| "sk_test_stripe_key".to_string()),
                webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET")
                    .unwrap_or_else(|_| "whsec_stripe_webhook_secret".to_string()),
                base_url: std::env::var("STRIPE_BASE_URL")
                    .unwrap_or_else(|_| "https://api.stripe.com/v1".to_string()),
            },
        })
    }
}
