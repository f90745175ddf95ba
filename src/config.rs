//! Environment-driven configuration.

use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub base_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    pub webhook_secret: String,
    pub nats_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);
        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));
        let jwt_secret = match std::env::var("JWT_SECRET_KEY") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!("JWT_SECRET_KEY not set, using insecure dev secret");
                "dev-secret".to_string()
            }
        };
        let jwt_expires_in_days = std::env::var("JWT_EXPIRES_IN_DAYS")
            .ok()
            .and_then(|d| d.parse().ok())
            .unwrap_or(90);
        let webhook_secret = match std::env::var("WEBHOOK_SIGNING_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!("WEBHOOK_SIGNING_SECRET not set, using insecure dev secret");
                "dev-webhook-secret".to_string()
            }
        };
        let nats_url = std::env::var("NATS_URL").ok();

        Ok(Self {
            port,
            base_url,
            jwt_secret,
            jwt_expires_in_days,
            webhook_secret,
            nats_url,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expires_in_days: 90,
            webhook_secret: "test-webhook-secret".to_string(),
            nats_url: None,
        }
    }
}
