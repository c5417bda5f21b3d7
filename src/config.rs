use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub notify: NotifyConfig,
}

/// Database connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// Notification channel configuration.
///
/// Each channel block is optional as a whole: when absent the channel stays
/// unconfigured for the lifetime of the process and every send through it
/// reports a configuration failure instead of reaching a provider.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub whatsapp: Option<WhatsAppGatewayConfig>,
    pub smtp: Option<SmtpConfig>,
    /// Upper bound for a single provider call on either channel
    pub send_timeout: Duration,
}

/// WhatsApp Business gateway credentials
#[derive(Debug, Clone)]
pub struct WhatsAppGatewayConfig {
    pub api_url: String,
    pub access_token: String,
    /// Phone number id the gateway sends from
    pub sender_id: String,
}

/// SMTP relay settings for the email channel
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            database: DatabaseConfig::from_env()?,
            notify: NotifyConfig::from_env(),
        })
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            acquire_timeout: Duration::from_secs(
                env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            ),
            idle_timeout: Duration::from_secs(
                env::var("DATABASE_IDLE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .unwrap_or(600),
            ),
            max_lifetime: Duration::from_secs(
                env::var("DATABASE_MAX_LIFETIME_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse()
                    .unwrap_or(1800),
            ),
        })
    }
}

impl NotifyConfig {
    /// Load notification configuration from environment variables.
    ///
    /// An incomplete channel block disables that channel with a warning
    /// rather than failing startup; status transitions must keep working
    /// even when no provider is reachable.
    pub fn from_env() -> Self {
        Self {
            whatsapp: WhatsAppGatewayConfig::from_env(),
            smtp: SmtpConfig::from_env(),
            send_timeout: Duration::from_secs(
                env::var("NOTIFY_SEND_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            ),
        }
    }
}

impl WhatsAppGatewayConfig {
    /// Load the WhatsApp gateway block; `None` leaves the channel disabled
    pub fn from_env() -> Option<Self> {
        let api_url = env::var("WHATSAPP_API_URL").ok().filter(|v| !v.is_empty())?;

        let valid_scheme = url::Url::parse(&api_url)
            .map(|u| u.scheme() == "http" || u.scheme() == "https")
            .unwrap_or(false);
        if !valid_scheme {
            log::warn!("WHATSAPP_API_URL is not a valid http(s) URL; WhatsApp channel disabled");
            return None;
        }

        let access_token = match env::var("WHATSAPP_ACCESS_TOKEN") {
            Ok(v) if !v.is_empty() => v,
            _ => {
                log::warn!(
                    "WHATSAPP_API_URL is set but WHATSAPP_ACCESS_TOKEN is missing; \
                     WhatsApp channel disabled"
                );
                return None;
            }
        };

        let sender_id = match env::var("WHATSAPP_SENDER_ID") {
            Ok(v) if !v.is_empty() => v,
            _ => {
                log::warn!(
                    "WHATSAPP_API_URL is set but WHATSAPP_SENDER_ID is missing; \
                     WhatsApp channel disabled"
                );
                return None;
            }
        };

        Some(Self {
            api_url,
            access_token,
            sender_id,
        })
    }
}

impl SmtpConfig {
    /// Load the SMTP block; `None` leaves the email channel disabled
    pub fn from_env() -> Option<Self> {
        let host = env::var("SMTP_HOST").ok().filter(|v| !v.is_empty())?;

        Some(Self {
            host,
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").ok().filter(|v| !v.is_empty()),
            password: env::var("SMTP_PASSWORD").ok().filter(|v| !v.is_empty()),
            from_address: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "repairs@servitrak.local".to_string()),
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    MissingDatabaseUrl,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL environment variable is required")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
