//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{PartyGateError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_redis_config(&settings.redis)?;
    validate_kakao_config(&settings.kakao)?;
    validate_toss_config(&settings.toss)?;
    validate_access_config(&settings.access)?;
    validate_admin_config(&settings.admin)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate HTTP server configuration
fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.port == 0 {
        return Err(PartyGateError::Config(
            "Server port must be greater than 0".to_string()
        ));
    }

    url::Url::parse(&config.public_url)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(PartyGateError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(PartyGateError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(PartyGateError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(PartyGateError::Config(
            "Redis URL is required".to_string()
        ));
    }

    if config.ttl_seconds < 60 {
        return Err(PartyGateError::Config(
            "Signup session TTL must be at least 60 seconds".to_string()
        ));
    }

    Ok(())
}

/// Validate Kakao OAuth configuration
fn validate_kakao_config(config: &super::KakaoConfig) -> Result<()> {
    if config.rest_api_key.is_empty() {
        return Err(PartyGateError::Config(
            "Kakao REST API key is required".to_string()
        ));
    }

    url::Url::parse(&config.auth_url)?;
    url::Url::parse(&config.api_url)?;

    if config.timeout_seconds == 0 {
        return Err(PartyGateError::Config(
            "Kakao timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate Toss Payments configuration
fn validate_toss_config(config: &super::TossConfig) -> Result<()> {
    if config.secret_key.is_empty() {
        return Err(PartyGateError::Config(
            "Toss secret key is required".to_string()
        ));
    }

    if !config.client_key.is_empty()
        && config.client_key.starts_with("test_") != config.secret_key.starts_with("test_")
    {
        return Err(PartyGateError::Config(
            "Toss client and secret keys must both be test keys or both be live keys".to_string()
        ));
    }

    url::Url::parse(&config.api_url)?;

    if config.timeout_seconds == 0 {
        return Err(PartyGateError::Config(
            "Toss timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate event password gate configuration
fn validate_access_config(config: &super::AccessConfig) -> Result<()> {
    if config.event_password.is_empty() {
        return Err(PartyGateError::Config(
            "Event password is required".to_string()
        ));
    }

    if config.token_secret.len() < 32 {
        return Err(PartyGateError::Config(
            "Gate pass token secret must be at least 32 bytes".to_string()
        ));
    }

    if config.max_attempts == 0 || config.window_seconds == 0 {
        return Err(PartyGateError::Config(
            "Password attempt limit and window must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate admin configuration
fn validate_admin_config(config: &super::AdminConfig) -> Result<()> {
    if config.token.len() < 16 {
        return Err(PartyGateError::Config(
            "Admin token must be at least 16 characters".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(PartyGateError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(PartyGateError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
