//! Delivery Estimator Library
//!
//! Backend pieces of a food-ordering service:
//! - Delivery fee and ETA estimation from two geocoded addresses
//! - Geocoding through a Nominatim-compatible search API
//! - Restaurant/order REST API that prices every new order

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod store;
pub mod utils;

pub use crate::core::{estimate_between, haversine_km, price_delivery, DeliveryEstimator};
pub use models::{
    AppConfig, AppError, AppResult, DeliveryEstimateRequest, DeliveryEstimateResult, ErrorCode,
    GeoPoint, Order, OrderStatus, PricingConfig, Restaurant,
};
pub use providers::{Geocoder, NominatimGeocoder, StaticGeocoder};
pub use store::{MemoryStore, OrderStore};
pub use utils::telemetry::{TelemetryCollector, TelemetryStats};
