use std::env;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub token_secret: String,
    pub token_ttl_secs: u64,
    pub geocoder_url: String,
    pub geocoder_timeout_secs: u64,
    pub empty_query_is_error: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            token_secret: env::var("TOKEN_SECRET")
                .unwrap_or_else(|_| "insecure-dev-secret".to_string()),
            token_ttl_secs: parse_or_default("TOKEN_TTL_SECS", 3600)?,
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            geocoder_timeout_secs: parse_or_default("GEOCODER_TIMEOUT_SECS", 5)?,
            // Finder endpoints treat an empty result set as an error. Unusual,
            // but callers depend on it; flip this knob to get empty lists.
            empty_query_is_error: parse_or_default("EMPTY_QUERY_IS_ERROR", true)?,
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
