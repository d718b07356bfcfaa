use std::env;

/// Paddle-side configuration: webhook verification secret, API credentials,
/// and the (provider-specific) header names carrying signature material.
#[derive(Debug, Clone)]
pub struct PaddleConfig {
    /// Shared secret for webhook signature verification.
    /// None = verification always fails closed (webhooks rejected).
    pub webhook_secret: Option<String>,
    pub api_key: Option<String>,
    pub api_base_url: String,
    /// Header carrying the hex HMAC signature.
    pub signature_header: String,
    /// Header carrying the signing timestamp.
    pub timestamp_header: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub paddle: PaddleConfig,
    /// Service key required on portal routes (stand-in for the hosted
    /// identity provider's session check, which fronts this service).
    pub portal_api_key: Option<String>,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("KEYMINT_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "keymint.db".to_string()),
            paddle: PaddleConfig {
                webhook_secret: env::var("PADDLE_WEBHOOK_SECRET").ok(),
                api_key: env::var("PADDLE_API_KEY").ok(),
                api_base_url: env::var("PADDLE_API_BASE_URL")
                    .unwrap_or_else(|_| "https://sandbox-api.paddle.com".to_string()),
                signature_header: env::var("WEBHOOK_SIGNATURE_HEADER")
                    .unwrap_or_else(|_| "paddle-signature".to_string()),
                timestamp_header: env::var("WEBHOOK_TIMESTAMP_HEADER")
                    .unwrap_or_else(|_| "paddle-timestamp".to_string()),
            },
            portal_api_key: env::var("PORTAL_API_KEY").ok(),
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
