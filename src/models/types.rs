//! Core data structures shared by the estimator, the store and the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resolved coordinate pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Input of a single delivery estimate
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryEstimateRequest {
    pub restaurant_address: String,
    pub delivery_address: String,
    /// Orders currently in preparation at the restaurant
    pub preparation_count: u32,
    /// Preferred language for the geocoder
    pub language: Option<String>,
}

impl DeliveryEstimateRequest {
    pub fn new(
        restaurant_address: impl Into<String>,
        delivery_address: impl Into<String>,
        preparation_count: u32,
    ) -> Self {
        Self {
            restaurant_address: restaurant_address.into(),
            delivery_address: delivery_address.into(),
            preparation_count,
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Delivery price and ETA
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEstimateResult {
    /// Always at least the configured minimum fee
    pub fee: f64,
    /// Base allowance + travel minutes + queue delay
    pub minutes: f64,
    /// Raw great-circle distance
    pub distance_km: f64,
    /// Distance rounded up to a whole kilometer
    pub rounded_km: f64,
}

// ============================================
// Restaurants & Orders
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl Restaurant {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            address: address.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparation,
    Delivering,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparation => "preparation",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether an order may move from `self` to `next`
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Preparation)
                | (Pending, Cancelled)
                | (Preparation, Delivering)
                | (Preparation, Cancelled)
                | (Delivering, Delivered)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub customer_name: String,
    pub items: Vec<OrderItem>,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub items_total: f64,
    pub delivery_fee: f64,
    /// Items plus delivery fee
    pub grand_total: f64,
    pub expected_minutes: f64,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Build a pending order priced with `estimate`
    pub fn new(
        restaurant_id: Uuid,
        customer_name: String,
        items: Vec<OrderItem>,
        delivery_address: String,
        estimate: &DeliveryEstimateResult,
    ) -> Self {
        let items_total: f64 = items
            .iter()
            .map(|item| item.unit_price * item.quantity as f64)
            .sum();

        Self {
            id: Uuid::new_v4(),
            restaurant_id,
            customer_name,
            items,
            delivery_address,
            status: OrderStatus::Pending,
            items_total,
            delivery_fee: estimate.fee,
            grand_total: items_total + estimate.fee,
            expected_minutes: estimate.minutes,
            created_at: Utc::now(),
        }
    }
}
