//! Delivery Estimator
//!
//! Resolves both addresses concurrently, then prices the delivery from the
//! great-circle distance and the restaurant's preparation queue.
//!
//! Failure semantics:
//! - empty addresses are rejected before any lookup is issued
//! - each lookup has its own timeout; the first failing lookup fails the
//!   estimate and the sibling lookup is dropped
//! - nothing is retried

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::geo::estimate_between;
use crate::models::{
    AppError, AppResult, DeliveryEstimateRequest, DeliveryEstimateResult, GeoPoint, PricingConfig,
};
use crate::providers::Geocoder;
use crate::utils::constants::DEFAULT_GEOCODER_TIMEOUT_MS;

/// Stateless delivery estimator; cheap to clone and share
#[derive(Clone)]
pub struct DeliveryEstimator {
    geocoder: Arc<dyn Geocoder>,
    pricing: PricingConfig,
    lookup_timeout: Duration,
}

impl DeliveryEstimator {
    pub fn new(geocoder: Arc<dyn Geocoder>, pricing: PricingConfig) -> Self {
        Self {
            geocoder,
            pricing,
            lookup_timeout: Duration::from_millis(DEFAULT_GEOCODER_TIMEOUT_MS),
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Estimate fee and delivery minutes
    pub async fn estimate(&self, request: &DeliveryEstimateRequest) -> AppResult<DeliveryEstimateResult> {
        let start = Instant::now();

        let restaurant = request.restaurant_address.trim();
        let destination = request.delivery_address.trim();
        if restaurant.is_empty() {
            return Err(AppError::validation("restaurantAddress must not be empty"));
        }
        if destination.is_empty() {
            return Err(AppError::validation("deliveryAddress must not be empty"));
        }
        let language = request.language.as_deref();

        let (from, to) = tokio::try_join!(
            self.resolve(restaurant, language),
            self.resolve(destination, language),
        )?;

        let result = estimate_between(from, to, request.preparation_count, &self.pricing);

        info!(
            distance_km = result.distance_km,
            rounded_km = result.rounded_km,
            preparation_count = request.preparation_count,
            fee = result.fee,
            minutes = result.minutes,
            latency_ms = start.elapsed().as_millis() as u64,
            "Delivery estimated"
        );

        Ok(result)
    }

    /// One bounded lookup
    async fn resolve(&self, address: &str, language: Option<&str>) -> AppResult<GeoPoint> {
        let lookup = self.geocoder.geocode(address, language);
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(point)) => {
                debug!(geocoder = self.geocoder.name(), lat = point.lat, lng = point.lng, "Address resolved");
                Ok(point)
            }
            Ok(Err(e)) => {
                warn!(geocoder = self.geocoder.name(), code = e.code_str(), error = %e, "Geocoding failed");
                Err(e)
            }
            Err(_) => {
                let timeout_ms = self.lookup_timeout.as_millis() as u64;
                warn!(geocoder = self.geocoder.name(), timeout_ms, "Geocoding timed out");
                Err(AppError::geocode_timeout(timeout_ms))
            }
        }
    }
}
