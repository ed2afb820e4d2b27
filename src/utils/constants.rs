//! Constants Module - Single Source of Truth
//!
//! Defaults for every tunable value live here; `AppConfig` overrides them
//! from the environment at startup.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "DeliveryEstimator";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default User-Agent for geocoder requests (Nominatim rejects anonymous clients)
pub const DEFAULT_USER_AGENT: &str = concat!("DeliveryEstimator/", env!("CARGO_PKG_VERSION"));

// ============================================
// SERVER
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// ============================================
// GEOCODER
// ============================================

/// Public Nominatim search endpoint
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Per-lookup timeout (milliseconds)
pub const DEFAULT_GEOCODER_TIMEOUT_MS: u64 = 6000;

/// Candidates requested per search; only the first one is used
pub const GEOCODER_RESULT_LIMIT: u32 = 5;

/// Mean Earth radius used by the haversine formula (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ============================================
// PRICING
// ============================================

/// Fee charged per (rounded-up) kilometer
pub const DEFAULT_FEE_PER_KM: f64 = 0.5;

/// Fee floor in currency units
pub const DEFAULT_MIN_FEE: f64 = 1.0;

/// Fixed preparation allowance in minutes
pub const DEFAULT_BASE_MINUTES: f64 = 30.0;

/// Travel minutes per (rounded-up) kilometer
pub const DEFAULT_MINUTES_PER_KM: f64 = 1.5;

/// Delay added for every order already in preparation
pub const DEFAULT_MINUTES_PER_QUEUED_ORDER: f64 = 5.0;

/// Lowest minimum fee a deployment may configure
pub const MIN_FEE_FLOOR: f64 = 1.0;

/// Lowest base ETA a deployment may configure
pub const BASE_MINUTES_FLOOR: f64 = 30.0;

// ============================================
// API LIMITS
// ============================================

pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Maximum items in one batch estimate request
pub const MAX_BATCH_ESTIMATES: usize = 20;

/// Upper bound for batch estimate concurrency
pub const MAX_BATCH_CONCURRENCY: usize = 10;

/// Default batch estimate concurrency
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;
