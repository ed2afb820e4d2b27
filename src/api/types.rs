//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::{AppError, DeliveryEstimateRequest, DeliveryEstimateResult, OrderItem, OrderStatus};
use crate::utils::constants::DEFAULT_BATCH_CONCURRENCY;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "API_RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.public_message(),
            details: None,
        }
    }
}

// ============================================
// Health & Stats
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

// ============================================
// Delivery Estimate
// ============================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequestBody {
    #[serde(default)]
    pub restaurant_address: String,
    #[serde(default)]
    pub delivery_address: String,
    /// Signed on the wire; negative or missing means an empty queue
    #[serde(default)]
    pub preparation_count: Option<i64>,
    #[serde(default)]
    pub language: Option<String>,
}

impl EstimateRequestBody {
    pub fn into_request(self) -> DeliveryEstimateRequest {
        DeliveryEstimateRequest {
            restaurant_address: self.restaurant_address,
            delivery_address: self.delivery_address,
            preparation_count: normalize_preparation_count(self.preparation_count),
            language: self.language,
        }
    }
}

/// Clamp a client-supplied queue length into the estimator's domain
pub fn normalize_preparation_count(raw: Option<i64>) -> u32 {
    raw.unwrap_or(0).clamp(0, u32::MAX as i64) as u32
}

#[derive(Debug, Deserialize)]
pub struct BatchEstimateRequest {
    pub items: Vec<EstimateRequestBody>,
    #[serde(default = "default_batch_concurrency")]
    pub concurrency: usize,
}

fn default_batch_concurrency() -> usize {
    DEFAULT_BATCH_CONCURRENCY
}

#[derive(Debug, Serialize)]
pub struct BatchItemResult {
    pub index: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DeliveryEstimateResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize)]
pub struct BatchEstimateData {
    pub results: Vec<BatchItemResult>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

// ============================================
// Restaurants & Orders
// ============================================

#[derive(Debug, Deserialize)]
pub struct CreateRestaurantRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub language: Option<String>,
}

impl CreateOrderRequest {
    /// Payload checks that need no collaborator
    pub fn validate(&self) -> Result<(), AppError> {
        if self.customer_name.trim().is_empty() {
            return Err(AppError::bad_request("customerName must not be empty"));
        }
        if self.delivery_address.trim().is_empty() {
            return Err(AppError::bad_request("deliveryAddress must not be empty"));
        }
        if self.items.is_empty() {
            return Err(AppError::bad_request("items must not be empty"));
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(AppError::bad_request(format!("items[{}].name must not be empty", i)));
            }
            if item.quantity == 0 {
                return Err(AppError::bad_request(format!("items[{}].quantity must be at least 1", i)));
            }
            if !item.unit_price.is_finite() || item.unit_price < 0.0 {
                return Err(AppError::bad_request(format!(
                    "items[{}].unitPrice must be a non-negative number",
                    i
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}
