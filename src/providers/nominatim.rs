//! Nominatim Geocoding Client
//!
//! API: GET {base_url}?format=jsonv2&addressdetails=1&limit=5&q={address}
//! Response is a JSON array of candidates ordered by relevance; only the
//! first candidate's `lat`/`lon` strings are used.
//!
//! Free, no API key required, but a User-Agent is mandatory.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::geocoder::Geocoder;
use crate::models::{AppError, AppResult, ErrorCode, GeoPoint, GeocoderConfig};
use crate::utils::constants::GEOCODER_RESULT_LIMIT;

/// A search candidate from Nominatim
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub importance: Option<f64>,
}

impl NominatimPlace {
    /// Parse the string coordinates Nominatim returns
    pub fn to_point(&self) -> AppResult<GeoPoint> {
        let lat: f64 = self.lat.trim().parse().map_err(|_| {
            AppError::geocode_upstream(format!("Unparsable latitude '{}'", self.lat))
        })?;
        let lng: f64 = self.lon.trim().parse().map_err(|_| {
            AppError::geocode_upstream(format!("Unparsable longitude '{}'", self.lon))
        })?;
        if !lat.is_finite() || lat.abs() > 90.0 {
            return Err(AppError::geocode_upstream(format!("Latitude out of range '{}'", self.lat)));
        }
        if !lng.is_finite() || lng.abs() > 180.0 {
            return Err(AppError::geocode_upstream(format!("Longitude out of range '{}'", self.lon)));
        }
        Ok(GeoPoint { lat, lng })
    }
}

/// Nominatim API client
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|_| AppError::invalid_config("GEOCODER_USER_AGENT", &config.user_agent))?;
        headers.insert(USER_AGENT, agent);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .gzip(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorCode::ConfigInvalidValue,
                    "Failed to build geocoder HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        })
    }

    /// Query parameters for one lookup
    fn query_params(address: &str, language: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "jsonv2".to_string()),
            ("addressdetails", "1".to_string()),
            ("limit", GEOCODER_RESULT_LIMIT.to_string()),
            ("q", address.to_string()),
        ];
        if let Some(lang) = language.filter(|l| !l.trim().is_empty()) {
            params.push(("accept-language", lang.trim().to_string()));
        }
        params
    }

    /// Fetch all candidates for an address
    pub async fn search(&self, address: &str, language: Option<&str>) -> AppResult<Vec<NominatimPlace>> {
        debug!(address = %address, "Nominatim: searching");

        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::query_params(address, language))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::geocode_timeout(self.timeout.as_millis() as u64)
                } else {
                    AppError::from(e)
                }
            })?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Nominatim returned an error status");
            return Err(AppError::geocode_upstream(format!(
                "Nominatim API error: {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AppError::geocode_timeout(self.timeout.as_millis() as u64)
            } else {
                AppError::with_source(
                    ErrorCode::GeocodeUpstream,
                    "Failed to parse Nominatim response",
                    e,
                )
            }
        })?;

        debug!(candidates = places.len(), "Nominatim: search complete");
        Ok(places)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str, language: Option<&str>) -> AppResult<GeoPoint> {
        let places = self.search(address, language).await?;
        let best = places
            .first()
            .ok_or_else(|| AppError::geocode_not_found(address))?;
        best.to_point()
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}
