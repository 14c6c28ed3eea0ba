use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    pub api_base: String,
    /// When unset the simulated client is used instead of the HTTP client.
    pub api_key: Option<String>,
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub payments: PaymentsConfig,
    /// Reservation hold duration in minutes.
    pub hold_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "rescate-fresco".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "rescate-fresco-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let payments = PaymentsConfig {
            api_base: std::env::var("PAYMENTS_API_BASE")
                .unwrap_or_else(|_| "https://api.pagos-simulados.test".into()),
            api_key: std::env::var("PAYMENTS_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            webhook_secret: std::env::var("PAYMENTS_WEBHOOK_SECRET")?,
        };
        let hold_minutes = std::env::var("HOLD_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(15);
        Ok(Self {
            database_url,
            jwt,
            payments,
            hold_minutes,
        })
    }
}
