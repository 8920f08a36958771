//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kakao: KakaoConfig,
    pub toss: TossConfig,
    pub access: AccessConfig,
    pub admin: AdminConfig,
    pub registration: RegistrationConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Public origin used to build OAuth redirect URLs
    pub public_url: String,
    /// Key rate limits on `x-forwarded-for`; only behind a proxy that sets it
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    /// Lifetime of a signup session
    pub ttl_seconds: u64,
}

/// Kakao OAuth configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KakaoConfig {
    pub rest_api_key: String,
    pub auth_url: String,
    pub api_url: String,
    pub timeout_seconds: u64,
}

/// Toss Payments configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TossConfig {
    pub secret_key: String,
    pub client_key: String,
    pub api_url: String,
    pub timeout_seconds: u64,
}

/// Event password gate configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessConfig {
    pub event_password: String,
    pub token_secret: String,
    pub pass_ttl_seconds: u64,
    pub max_attempts: u32,
    pub window_seconds: u64,
    pub burst_allowance: u32,
}

/// Admin API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdminConfig {
    pub token: String,
}

/// Bank account shown on the bank transfer step
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BankAccountConfig {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

/// Registration lifecycle configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistrationConfig {
    /// Decrement gender counters on cancellation even when the user was
    /// never counted as a participant.
    pub legacy_cancel_accounting: bool,
    pub bank_account: BankAccountConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
    pub json: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("PARTYGATE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::PartyGateError> {
        super::validation::validate_settings(self)
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Redirect URI registered with Kakao
    pub fn kakao_redirect_uri(&self) -> String {
        format!("{}/api/auth/kakao/callback", self.server.public_url.trim_end_matches('/'))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                public_url: "http://localhost:3000".to_string(),
                trust_forwarded_for: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/partygate".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "partygate:".to_string(),
                ttl_seconds: 3600,
            },
            kakao: KakaoConfig {
                rest_api_key: String::new(),
                auth_url: "https://kauth.kakao.com".to_string(),
                api_url: "https://kapi.kakao.com".to_string(),
                timeout_seconds: 10,
            },
            toss: TossConfig {
                secret_key: String::new(),
                client_key: String::new(),
                api_url: "https://api.tosspayments.com".to_string(),
                timeout_seconds: 30,
            },
            access: AccessConfig {
                event_password: String::new(),
                token_secret: String::new(),
                pass_ttl_seconds: 6 * 3600,
                max_attempts: 5,
                window_seconds: 60,
                burst_allowance: 2,
            },
            admin: AdminConfig {
                token: String::new(),
            },
            registration: RegistrationConfig {
                legacy_cancel_accounting: false,
                bank_account: BankAccountConfig {
                    bank_name: String::new(),
                    account_number: String::new(),
                    account_holder: String::new(),
                },
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "logs".to_string(),
                json: false,
            },
        }
    }
}
