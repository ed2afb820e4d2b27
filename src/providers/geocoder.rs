//! Geocoder Port
//!
//! Narrow interface over the external address-resolution service so the
//! estimator can run against the real HTTP client or a deterministic fake.

use async_trait::async_trait;

use crate::models::{AppResult, GeoPoint};

/// Resolves a free-text address to coordinates.
///
/// Implementations fail with `GEOCODE_NOT_FOUND` when nothing matches and
/// with `GEOCODE_UPSTREAM` / `GEOCODE_TIMEOUT` when the service misbehaves.
/// They must not retry.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str, language: Option<&str>) -> AppResult<GeoPoint>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "geocoder"
    }
}
