use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub app_env: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    /// Timezone used to derive attendance dates and weekends.
    pub business_timezone: Tz,
    pub store_timeout: Duration,
    pub db_max_connections: u32,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            access_token_ttl: parse_or("ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parse_or("REFRESH_TOKEN_TTL", 604_800)?, // 7 days

            business_timezone: parse_timezone(
                &env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "Asia/Jakarta".to_string()),
            )?,
            store_timeout: Duration::from_millis(parse_or("STORE_TIMEOUT_MS", 3000)?),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,

            rate_login_per_min: parse_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parse_or("RATE_REGISTER_PER_MIN", 30)?,
            rate_refresh_per_min: parse_or("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/v1".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("{key} has invalid value {raw:?}: {e}"))
}

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow!("BUSINESS_TIMEZONE {name:?} is not a known timezone: {e}"))
}
