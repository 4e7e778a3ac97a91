//! Configuration for surge
//!
//! Explicit defaults, startup validation, environment-variable loading.
//!
//! Configuration is read once at process startup; a running sale never
//! reloads it, and `reset` does not reread it. Invalid values abort startup
//! rather than degrade at runtime.
//!
//! When no sale window is configured, the defaults open the sale 60 seconds
//! after the config is loaded and close it an hour later. Production
//! deployments must set `SALE_START_TIME` / `SALE_END_TIME` explicitly.

use crate::constants::*;
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// Immutable process configuration
#[derive(Debug, Clone, Serialize)]
pub struct SaleConfig {
    /// HTTP bind address
    pub host: String,

    /// HTTP listen port
    pub port: u16,

    /// Allowed CORS origin (None = allow any)
    pub cors_origin: Option<String>,

    /// Maximum requests per rate-limit window (enforced by outer plumbing)
    pub rate_limit_max: u32,

    /// Rate-limit window in seconds
    pub rate_limit_window_secs: u64,

    /// Instant the sale opens (inclusive)
    pub starts_at: DateTime<Utc>,

    /// Instant the sale closes (inclusive)
    pub ends_at: DateTime<Utc>,

    /// Total units available for the sale
    pub total_stock: u64,

    /// Product name shown in sale status
    pub product_name: String,

    /// Product price shown in sale status
    pub product_price: f64,
}

impl SaleConfig {
    /// Load configuration from environment variables
    ///
    /// Reads: `HOST`, `PORT`, `CORS_ORIGIN`, `RATE_LIMIT_MAX`,
    /// `RATE_LIMIT_WINDOW_SECS`, `SALE_START_TIME`, `SALE_END_TIME`,
    /// `TOTAL_STOCK`, `PRODUCT_NAME`, `PRODUCT_PRICE`.
    /// Empty values are treated as unset.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfiguration` on unparseable or out-of-range
    /// values; the process should fail to start.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::defaults_at(Utc::now());

        if let Some(host) = env_var("HOST") {
            config.host = host;
        }
        if let Some(raw) = env_var("PORT") {
            config.port = parse_value("PORT", &raw)?;
        }
        config.cors_origin = env_var("CORS_ORIGIN");
        if let Some(raw) = env_var("RATE_LIMIT_MAX") {
            config.rate_limit_max = parse_value("RATE_LIMIT_MAX", &raw)?;
        }
        if let Some(raw) = env_var("RATE_LIMIT_WINDOW_SECS") {
            config.rate_limit_window_secs = parse_value("RATE_LIMIT_WINDOW_SECS", &raw)?;
        }
        if let Some(raw) = env_var("SALE_START_TIME") {
            config.starts_at = parse_timestamp("SALE_START_TIME", &raw)?;
        }
        if let Some(raw) = env_var("SALE_END_TIME") {
            config.ends_at = parse_timestamp("SALE_END_TIME", &raw)?;
        }
        if let Some(raw) = env_var("TOTAL_STOCK") {
            config.total_stock = parse_stock("TOTAL_STOCK", &raw)?;
        }
        if let Some(name) = env_var("PRODUCT_NAME") {
            config.product_name = name;
        }
        if let Some(raw) = env_var("PRODUCT_PRICE") {
            config.product_price = parse_value("PRODUCT_PRICE", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Default configuration with the sale window anchored at `now`
    pub fn defaults_at(now: DateTime<Utc>) -> Self {
        Self {
            host: HOST_DEFAULT.to_string(),
            port: PORT_DEFAULT,
            cors_origin: None,
            rate_limit_max: RATE_LIMIT_COUNT_DEFAULT,
            rate_limit_window_secs: RATE_LIMIT_WINDOW_SECS_DEFAULT,
            starts_at: now + Duration::seconds(SALE_START_DELAY_SECS_DEFAULT),
            ends_at: now + Duration::seconds(SALE_DURATION_SECS_DEFAULT),
            total_stock: STOCK_COUNT_DEFAULT,
            product_name: PRODUCT_NAME_DEFAULT.to_string(),
            product_price: PRODUCT_PRICE_DEFAULT,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.starts_at > self.ends_at {
            return Err(Error::InvalidConfiguration {
                field: "SALE_END_TIME".into(),
                reason: format!(
                    "sale ends ({}) before it starts ({})",
                    self.ends_at.to_rfc3339(),
                    self.starts_at.to_rfc3339()
                ),
            });
        }

        if self.port == 0 {
            return Err(Error::InvalidConfiguration {
                field: "PORT".into(),
                reason: "must be non-zero".into(),
            });
        }

        if !self.product_price.is_finite() || self.product_price < 0.0 {
            return Err(Error::InvalidConfiguration {
                field: "PRODUCT_PRICE".into(),
                reason: format!("must be a non-negative number, got {}", self.product_price),
            });
        }

        if self.rate_limit_window_secs == 0 {
            return Err(Error::InvalidConfiguration {
                field: "RATE_LIMIT_WINDOW_SECS".into(),
                reason: "must be non-zero".into(),
            });
        }

        Ok(())
    }

    /// The `host:port` address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read an environment variable, treating empty values as unset
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_value<T>(field: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e| Error::InvalidConfiguration {
        field: field.into(),
        reason: format!("invalid value '{}': {}", raw, e),
    })
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::InvalidConfiguration {
            field: field.into(),
            reason: format!("invalid RFC 3339 timestamp '{}': {}", raw, e),
        })
}

/// Stock is parsed signed so that an explicit negative value is rejected
/// rather than wrapped.
fn parse_stock(field: &str, raw: &str) -> Result<u64> {
    let count: i64 = parse_value(field, raw)?;
    if count < 0 {
        return Err(Error::InvalidConfiguration {
            field: field.into(),
            reason: format!("must be non-negative, got {}", count),
        });
    }
    Ok(count as u64)
}
