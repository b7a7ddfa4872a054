use dotenvy::dotenv;
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable '{0}'")]
    Missing(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// HS256 key for access tokens.
    pub secret: String,
    pub token_ttl_hours: i64,
    /// Password given to the seeded `admin` and `user` accounts.
    pub seed_password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let optional =
            |name: &str, default: &str| env::var(name).unwrap_or_else(|_| default.to_owned());

        let secret = env::var("SECRET").map_err(|_| ConfigError::Missing("SECRET"))?;
        if secret.is_empty() {
            return Err(ConfigError::Invalid {
                name: "SECRET",
                reason: "must not be empty".into(),
            });
        }

        let token_ttl_hours = optional("TOKEN_TTL_HOURS", "24")
            .parse::<i64>()
            .map_err(|err| ConfigError::Invalid {
                name: "TOKEN_TTL_HOURS",
                reason: err.to_string(),
            })?;

        Ok(Self {
            database_url: optional("DATABASE_URL", "sqlite://baranki.db?mode=rwc"),
            bind_addr: optional("BIND_ADDR", "0.0.0.0:3000"),
            secret,
            token_ttl_hours,
            seed_password: optional("SEED_PASSWORD", "Secret15"),
        })
    }
}
