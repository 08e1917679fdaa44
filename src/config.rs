use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_TRIAL_DAYS: i64 = 30;
const DEV_DEFAULT_JWT_SECRET: &str =
    "this_is_a_development_secret_key_that_is_at_least_64_characters_long_for_testing";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT secret key (minimum 64 characters)
    #[validate(length(min = 64))]
    pub jwt_secret: String,

    /// JWT expiration time in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// CORS: comma-separated list of allowed origins (production)
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB timeouts (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Length of the free trial granted on registration (days)
    #[serde(default = "default_trial_days")]
    pub trial_days: i64,

    /// Monthly subscription price charged through the payment processor
    #[serde(default = "default_subscription_price")]
    pub subscription_price: f64,

    /// Mercado Pago access token for preference creation and payment lookup
    #[serde(default)]
    pub mercadopago_access_token: Option<String>,

    /// Webhook secret for verifying inbound payment notifications
    #[serde(default)]
    pub mercadopago_webhook_secret: Option<String>,

    /// Webhook timestamp tolerance (seconds)
    #[serde(default)]
    pub mercadopago_webhook_tolerance_secs: Option<u64>,

    /// Public base URL used for payment back_urls and notification_url
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Comma-separated allow-list of admin emails for /admin routes
    #[serde(default)]
    pub admin_emails: Option<String>,
}

fn default_jwt_expiration() -> u64 {
    3600
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_trial_days() -> i64 {
    DEFAULT_TRIAL_DAYS
}
fn default_subscription_price() -> f64 {
    9999.0
}
fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
            || self.environment.eq_ignore_ascii_case("dev")
            || self.environment.eq_ignore_ascii_case("test")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Parsed admin email allow-list (lowercased, trimmed).
    pub fn admin_email_list(&self) -> Vec<String> {
        self.admin_emails
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|e| {
                let trimmed = e.trim().to_ascii_lowercase();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            })
            .collect()
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let target = email.trim().to_ascii_lowercase();
        self.admin_email_list().iter().any(|e| *e == target)
    }
}

/// Loads configuration from files and environment variables.
///
/// Order of precedence (lowest to highest):
/// 1. `config/default.toml`
/// 2. `config/{environment}.toml`
/// 3. Environment variables prefixed with `APP__`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder()
        .set_default("environment", environment.clone())?
        .add_source(File::from(Path::new(CONFIG_DIR).join("default")).required(false))
        .add_source(File::from(Path::new(CONFIG_DIR).join(&environment)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    // A development-only JWT secret keeps local bootstrapping friction-free.
    // Production must supply its own; validation below rejects short secrets.
    if environment == DEFAULT_ENV || environment == "test" {
        builder = builder.set_default("jwt_secret", DEV_DEFAULT_JWT_SECRET)?;
        builder = builder.set_default("database_url", "sqlite::memory:")?;
    }

    let config: AppConfig = builder.build()?.try_deserialize()?;

    config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    if !config.is_development() && config.mercadopago_access_token.is_none() {
        info!("Mercado Pago access token not configured; payment endpoints will reject requests");
    }

    Ok(config)
}

/// Initializes the tracing subscriber with an env-filter honoring RUST_LOG.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            jwt_secret: DEV_DEFAULT_JWT_SECRET.into(),
            jwt_expiration: 3600,
            host: default_host(),
            port: DEFAULT_PORT,
            environment: "test".into(),
            log_level: DEFAULT_LOG_LEVEL.into(),
            log_json: false,
            auto_migrate: true,
            cors_allowed_origins: None,
            db_max_connections: 10,
            db_min_connections: 1,
            db_connect_timeout_secs: 30,
            db_idle_timeout_secs: 600,
            db_acquire_timeout_secs: 8,
            trial_days: 30,
            subscription_price: 9999.0,
            mercadopago_access_token: None,
            mercadopago_webhook_secret: None,
            mercadopago_webhook_tolerance_secs: None,
            site_url: default_site_url(),
            admin_emails: Some("Admin@tienda360.app, owner@tienda360.app".into()),
        }
    }

    #[test]
    fn admin_email_list_is_normalized() {
        let cfg = base_config();
        assert_eq!(
            cfg.admin_email_list(),
            vec!["admin@tienda360.app", "owner@tienda360.app"]
        );
        assert!(cfg.is_admin_email("ADMIN@tienda360.app"));
        assert!(!cfg.is_admin_email("cliente@tienda360.app"));
    }

    #[test]
    fn short_jwt_secret_fails_validation() {
        let mut cfg = base_config();
        cfg.jwt_secret = "short".into();
        assert!(cfg.validate().is_err());
    }
}
