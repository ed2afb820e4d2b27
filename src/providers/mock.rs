//! # Mock Geocoder
//!
//! Deterministic stand-in for the geocoding service.
//!
//! Addresses are matched after trimming and lower-casing. Unknown addresses
//! resolve to `GEOCODE_NOT_FOUND`, scripted failures and delays can be
//! attached per address.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::geocoder::Geocoder;
use crate::models::{AppError, AppResult, ErrorCode, GeoPoint};

#[derive(Clone)]
enum Scripted {
    Point(GeoPoint),
    Fail(ErrorCode),
}

/// In-memory geocoder with call counting
#[derive(Clone, Default)]
pub struct StaticGeocoder {
    entries: HashMap<String, Scripted>,
    delays: HashMap<String, Duration>,
    calls: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(address: &str) -> String {
        address.trim().to_lowercase()
    }

    /// Resolve `address` to `point`
    pub fn with_point(mut self, address: &str, point: GeoPoint) -> Self {
        self.entries.insert(Self::key(address), Scripted::Point(point));
        self
    }

    /// Make lookups of `address` fail with `code`
    pub fn with_failure(mut self, address: &str, code: ErrorCode) -> Self {
        self.entries.insert(Self::key(address), Scripted::Fail(code));
        self
    }

    /// Delay the answer for `address`
    pub fn with_delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(Self::key(address), delay);
        self
    }

    /// Number of lookups started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of lookups that ran to completion (not cancelled)
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str, _language: Option<&str>) -> AppResult<GeoPoint> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = Self::key(address);

        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        match self.entries.get(&key) {
            Some(Scripted::Point(point)) => Ok(*point),
            Some(Scripted::Fail(code)) => Err(AppError::new(
                *code,
                format!("scripted failure for '{}'", address),
            )),
            None => Err(AppError::geocode_not_found(address)),
        }
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
