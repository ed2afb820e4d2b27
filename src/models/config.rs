//! Runtime configuration
//!
//! Built once at startup and handed to the components that need it.
//! Nothing in the crate reads the environment after this point.

use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult};
use crate::utils::constants::{
    DEFAULT_BASE_MINUTES, DEFAULT_FEE_PER_KM, DEFAULT_GEOCODER_TIMEOUT_MS, DEFAULT_GEOCODER_URL,
    DEFAULT_HOST, DEFAULT_MINUTES_PER_KM, DEFAULT_MINUTES_PER_QUEUED_ORDER, DEFAULT_MIN_FEE,
    DEFAULT_PORT, DEFAULT_RATE_LIMIT_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECS, DEFAULT_USER_AGENT,
    BASE_MINUTES_FLOOR, MIN_FEE_FLOOR,
};

/// Business parameters of the delivery price and ETA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig {
    /// Fee per rounded kilometer
    pub fee_per_km: f64,
    /// Fee floor
    pub min_fee: f64,
    /// Fixed preparation allowance (minutes)
    pub base_minutes: f64,
    /// Travel minutes per rounded kilometer
    pub minutes_per_km: f64,
    /// Minutes added per order already in preparation
    pub minutes_per_queued_order: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fee_per_km: DEFAULT_FEE_PER_KM,
            min_fee: DEFAULT_MIN_FEE,
            base_minutes: DEFAULT_BASE_MINUTES,
            minutes_per_km: DEFAULT_MINUTES_PER_KM,
            minutes_per_queued_order: DEFAULT_MINUTES_PER_QUEUED_ORDER,
        }
    }
}

/// Geocoding collaborator settings
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    /// Search endpoint
    pub base_url: String,
    /// User-Agent sent with every lookup
    pub user_agent: String,
    /// Per-lookup timeout
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_millis(DEFAULT_GEOCODER_TIMEOUT_MS),
        }
    }
}

/// Rate limiter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: DEFAULT_RATE_LIMIT_REQUESTS,
            window_duration: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub geocoder: GeocoderConfig,
    pub pricing: PricingConfig,
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            geocoder: GeocoderConfig::default(),
            pricing: PricingConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Missing keys fall back to defaults; present but unparsable keys are
    /// an error.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("DELIVERY_HOST").unwrap_or(defaults.host);
        // Hosting platforms inject PORT; DELIVERY_PORT is for local runs
        let port = match lookup("PORT").or_else(|| lookup("DELIVERY_PORT")) {
            Some(raw) => parse_value("PORT", &raw)?,
            None => defaults.port,
        };

        let timeout_ms: u64 = parse_or(
            &lookup,
            "GEOCODER_TIMEOUT_MS",
            defaults.geocoder.timeout.as_millis() as u64,
        )?;
        if timeout_ms == 0 {
            return Err(AppError::invalid_config("GEOCODER_TIMEOUT_MS", "0"));
        }

        let geocoder = GeocoderConfig {
            base_url: lookup("GEOCODER_URL").unwrap_or(defaults.geocoder.base_url),
            user_agent: lookup("GEOCODER_USER_AGENT").unwrap_or(defaults.geocoder.user_agent),
            timeout: Duration::from_millis(timeout_ms),
        };

        let pricing = PricingConfig {
            fee_per_km: parse_non_negative(&lookup, "DELIVERY_FEE_PER_KM", defaults.pricing.fee_per_km)?,
            min_fee: parse_at_least(
                &lookup,
                "DELIVERY_MIN_FEE",
                defaults.pricing.min_fee,
                MIN_FEE_FLOOR,
            )?,
            base_minutes: parse_at_least(
                &lookup,
                "DELIVERY_BASE_MINUTES",
                defaults.pricing.base_minutes,
                BASE_MINUTES_FLOOR,
            )?,
            minutes_per_km: parse_non_negative(
                &lookup,
                "DELIVERY_MINUTES_PER_KM",
                defaults.pricing.minutes_per_km,
            )?,
            minutes_per_queued_order: parse_non_negative(
                &lookup,
                "DELIVERY_MINUTES_PER_ORDER",
                defaults.pricing.minutes_per_queued_order,
            )?,
        };

        let rate_limit = RateLimitConfig {
            requests_per_window: parse_or(
                &lookup,
                "RATE_LIMIT_REQUESTS",
                defaults.rate_limit.requests_per_window,
            )?,
            window_duration: Duration::from_secs(parse_or(
                &lookup,
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit.window_duration.as_secs(),
            )?),
        };

        Ok(Self {
            host,
            port,
            geocoder,
            pricing,
            rate_limit,
        })
    }

    /// Log the effective configuration
    pub fn log_summary(&self) {
        info!(
            geocoder = %self.geocoder.base_url,
            timeout_ms = self.geocoder.timeout.as_millis() as u64,
            "Geocoder configured"
        );
        info!(
            fee_per_km = self.pricing.fee_per_km,
            min_fee = self.pricing.min_fee,
            base_minutes = self.pricing.base_minutes,
            minutes_per_km = self.pricing.minutes_per_km,
            minutes_per_queued_order = self.pricing.minutes_per_queued_order,
            "Pricing configured"
        );
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::invalid_config(key, raw))
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_non_negative<F>(lookup: &F, key: &str, default: f64) -> AppResult<f64>
where
    F: Fn(&str) -> Option<String>,
{
    parse_at_least(lookup, key, default, 0.0)
}

/// Finite value no lower than `floor`
fn parse_at_least<F>(lookup: &F, key: &str, default: f64, floor: f64) -> AppResult<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_or(lookup, key, default)?;
    if !value.is_finite() || value < floor {
        return Err(AppError::invalid_config(key, &value.to_string()));
    }
    Ok(value)
}
