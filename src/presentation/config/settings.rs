use serde::Deserialize;

use super::Environment;
use crate::application::services::BillingRates;

/// Process-wide configuration, built once at startup from the environment
/// and passed into components. Nothing reads ambient env vars after this.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub environment: Environment,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub session: SessionSettings,
    pub client: ClientSettings,
    pub google: GoogleSettings,
    pub transcription: TranscriptionSettings,
    pub billing: BillingSettings,
    pub email: EmailSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// Frontend origin; also the base of the post-login and failure
    /// redirect destinations.
    pub origin: String,
    pub dev_origin: Option<String>,
}

impl ClientSettings {
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![self.origin.clone()];
        if let Some(dev) = &self.dev_origin {
            origins.push(dev.clone());
        }
        origins
    }

    pub fn post_login_redirect(&self) -> String {
        format!("{}/home", self.origin)
    }

    pub fn failure_redirect(&self) -> String {
        format!("{}/", self.origin)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    /// This service's public origin; the OAuth callback is
    /// `{server_origin}/auth/google/callback`.
    pub server_origin: String,
}

impl GoogleSettings {
    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/google/callback", self.server_origin)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingSettings {
    pub unit_cost_per_minute: f64,
    pub fx_rate: f64,
    pub markup: f64,
}

impl BillingSettings {
    pub fn rates(&self) -> BillingRates {
        BillingRates {
            unit_cost_per_minute: self.unit_cost_per_minute,
            fx_rate: self.fx_rate,
            markup: self.markup,
        }
    }
}

/// Delivery is optional; with no API configured the service degrades to a
/// no-op mailer and the OTP-echo rule takes over outside production.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub staging_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub enable_json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::try_from(env_or("APP_ENV", "development"))
            .map_err(|e| ConfigError::InvalidVar("APP_ENV", e))?;

        Ok(Self {
            environment,
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parse("SERVER_PORT", 5000)?,
            },
            database: DatabaseSettings {
                url: require("DATABASE_URL")?,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            session: SessionSettings {
                cookie_name: env_or("SESSION_COOKIE_NAME", "sid"),
                ttl_hours: env_parse("SESSION_TTL_HOURS", 24)?,
            },
            client: ClientSettings {
                origin: env_or("CLIENT_ORIGIN", "http://localhost:5173"),
                dev_origin: std::env::var("CLIENT_ORIGIN_DEV").ok(),
            },
            google: GoogleSettings {
                client_id: env_or("GOOGLE_CLIENT_ID", ""),
                client_secret: env_or("GOOGLE_CLIENT_SECRET", ""),
                server_origin: env_or("SERVER_ORIGIN", "http://localhost:5000"),
            },
            transcription: TranscriptionSettings {
                api_key: env_or("OPENAI_API_KEY", ""),
                base_url: std::env::var("WHISPER_BASE_URL").ok(),
                model: std::env::var("WHISPER_MODEL").ok(),
            },
            billing: BillingSettings {
                unit_cost_per_minute: env_parse("BILLING_UNIT_COST_PER_MINUTE", 0.006)?,
                fx_rate: env_parse("BILLING_FX_RATE", 84.0)?,
                markup: env_parse("BILLING_MARKUP", 1.5)?,
            },
            email: EmailSettings {
                api_url: std::env::var("EMAIL_API_URL").ok(),
                api_key: std::env::var("EMAIL_API_KEY").ok(),
                from: std::env::var("EMAIL_FROM").ok(),
            },
            storage: StorageSettings {
                staging_dir: env_or("STAGING_DIR", "uploads"),
            },
            logging: LoggingSettings {
                enable_json: env_or("LOG_FORMAT", "text").to_lowercase() == "json",
            },
        })
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingVar(key))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidVar(key, raw)),
        Err(_) => Ok(default),
    }
}
