//! API Request Handlers

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::estimator::DeliveryEstimator;
use crate::models::{
    AppError, AppResult, DeliveryEstimateRequest, DeliveryEstimateResult, Order, OrderStatus,
    RateLimitConfig, Restaurant,
};
use crate::store::OrderStore;
use crate::utils::constants::{MAX_BATCH_CONCURRENCY, MAX_BATCH_ESTIMATES};
use crate::utils::telemetry::{TelemetryCollector, TelemetryStats};

/// Error half of every handler result
pub type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub estimator: DeliveryEstimator,
    pub store: Arc<dyn OrderStore>,
    pub telemetry: Arc<TelemetryCollector>,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        estimator: DeliveryEstimator,
        store: Arc<dyn OrderStore>,
        telemetry: Arc<TelemetryCollector>,
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self {
            estimator,
            store,
            telemetry,
            rate_limiter: Arc::new(RateLimiter::new(rate_limit)),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Run the estimator and record the outcome
    pub async fn estimate(&self, request: &DeliveryEstimateRequest) -> AppResult<DeliveryEstimateResult> {
        let start = Instant::now();
        match self.estimator.estimate(request).await {
            Ok(result) => {
                self.telemetry.record_estimate(start.elapsed().as_millis() as u64);
                Ok(result)
            }
            Err(e) => {
                self.telemetry.record_failure(e.code);
                Err(e)
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Turn an `AppError` into the JSON error envelope
fn failure(err: &AppError, start: Instant) -> ApiFailure {
    if err.code.is_upstream() || err.code.http_status() >= 500 {
        error!(code = err.code_str(), error = %err, "Request failed");
    } else {
        warn!(code = err.code_str(), error = %err, "Request rejected");
    }

    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(err.into(), elapsed_ms(start))))
}

// ============================================
// Health Check & Stats
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<TelemetryStats>> {
    let start = Instant::now();
    Json(ApiResponse::success(state.telemetry.get_stats(), elapsed_ms(start)))
}

// ============================================
// Delivery Estimate
// ============================================

pub async fn estimate_delivery(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EstimateRequestBody>,
) -> Result<Json<ApiResponse<DeliveryEstimateResult>>, ApiFailure> {
    let start = Instant::now();
    let request = req.into_request();

    let result = state
        .estimate(&request)
        .await
        .map_err(|e| failure(&e, start))?;

    Ok(Json(ApiResponse::success(result, elapsed_ms(start))))
}

pub async fn batch_estimate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchEstimateRequest>,
) -> Result<Json<ApiResponse<BatchEstimateData>>, ApiFailure> {
    let start = Instant::now();

    if req.items.is_empty() {
        return Err(failure(&AppError::bad_request("items array cannot be empty"), start));
    }
    if req.items.len() > MAX_BATCH_ESTIMATES {
        return Err(failure(
            &AppError::bad_request(format!(
                "Maximum {} estimates per batch request",
                MAX_BATCH_ESTIMATES
            )),
            start,
        ));
    }

    let concurrency = req.concurrency.clamp(1, MAX_BATCH_CONCURRENCY);
    let total = req.items.len();
    let semaphore = Arc::new(Semaphore::new(concurrency));
    // Dropping the set (client gone) aborts every lookup still in flight
    let mut tasks = JoinSet::new();

    for (index, body) in req.items.into_iter().enumerate() {
        let sem = semaphore.clone();
        let state = state.clone();
        let request = body.into_request();
        tasks.spawn(async move {
            let outcome = match sem.acquire().await {
                Ok(_permit) => state.estimate(&request).await,
                Err(_) => Err(AppError::internal("Batch semaphore closed")),
            };
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<AppResult<DeliveryEstimateResult>>> =
        (0..total).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(e) => warn!(error = %e, "Batch task failed to join"),
        }
    }

    let results: Vec<BatchItemResult> = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| {
            match outcome.unwrap_or_else(|| Err(AppError::internal("Batch task aborted"))) {
                Ok(data) => BatchItemResult { index, success: true, data: Some(data), error: None },
                Err(e) => BatchItemResult {
                    index,
                    success: false,
                    data: None,
                    error: Some(ApiError::from(&e)),
                },
            }
        })
        .collect();

    let succeeded = results.iter().filter(|r| r.success).count();
    info!(total, succeeded, concurrency, "Batch estimate complete");

    Ok(Json(ApiResponse::success(
        BatchEstimateData { results, total, succeeded, failed: total - succeeded },
        elapsed_ms(start),
    )))
}

// ============================================
// Restaurants
// ============================================

pub async fn create_restaurant(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Restaurant>>), ApiFailure> {
    let start = Instant::now();

    let name = req.name.trim();
    let address = req.address.trim();
    if name.is_empty() || address.is_empty() {
        return Err(failure(&AppError::bad_request("name and address are required"), start));
    }

    let restaurant = state
        .store
        .insert_restaurant(Restaurant::new(name, address))
        .await
        .map_err(|e| failure(&e, start))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(restaurant, elapsed_ms(start)))))
}

pub async fn get_restaurant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Restaurant>>, ApiFailure> {
    let start = Instant::now();
    let restaurant = load_restaurant(&state, id).await.map_err(|e| failure(&e, start))?;
    Ok(Json(ApiResponse::success(restaurant, elapsed_ms(start))))
}

async fn load_restaurant(state: &AppState, id: Uuid) -> AppResult<Restaurant> {
    state
        .store
        .get_restaurant(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {} not found", id)))
}

// ============================================
// Orders
// ============================================

/// Create an order priced by the delivery estimator.
///
/// The order is stored only after a successful estimate.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<Uuid>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiFailure> {
    let start = Instant::now();

    req.validate().map_err(|e| failure(&e, start))?;
    let restaurant = load_restaurant(&state, restaurant_id)
        .await
        .map_err(|e| failure(&e, start))?;

    let preparation_count = state
        .store
        .count_orders_with_status(restaurant.id, OrderStatus::Preparation)
        .await
        .map_err(|e| failure(&e, start))?;

    let request = DeliveryEstimateRequest {
        restaurant_address: restaurant.address.clone(),
        delivery_address: req.delivery_address.clone(),
        preparation_count,
        language: req.language.clone(),
    };

    let estimate = match state.estimate(&request).await {
        Ok(estimate) => estimate,
        Err(e) => {
            state.telemetry.record_order_rejected();
            return Err(failure(&e, start));
        }
    };

    let order = Order::new(
        restaurant.id,
        req.customer_name.trim().to_string(),
        req.items,
        req.delivery_address.trim().to_string(),
        &estimate,
    );
    let order = state
        .store
        .insert_order(order)
        .await
        .map_err(|e| failure(&e, start))?;
    state.telemetry.record_order_created();

    info!(
        order_id = %order.id,
        restaurant_id = %restaurant.id,
        delivery_fee = order.delivery_fee,
        expected_minutes = order.expected_minutes,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::success(order, elapsed_ms(start)))))
}

pub async fn list_restaurant_orders(
    State(state): State<Arc<AppState>>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiFailure> {
    let start = Instant::now();

    load_restaurant(&state, restaurant_id)
        .await
        .map_err(|e| failure(&e, start))?;
    let orders = state
        .store
        .list_orders(restaurant_id)
        .await
        .map_err(|e| failure(&e, start))?;

    Ok(Json(ApiResponse::success(orders, elapsed_ms(start))))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Order>>, ApiFailure> {
    let start = Instant::now();

    let order = state
        .store
        .get_order(id)
        .await
        .map_err(|e| failure(&e, start))?
        .ok_or_else(|| failure(&AppError::not_found(format!("Order {} not found", id)), start))?;

    Ok(Json(ApiResponse::success(order, elapsed_ms(start))))
}

pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, ApiFailure> {
    let start = Instant::now();

    let order = state
        .store
        .update_order_status(id, req.status)
        .await
        .map_err(|e| failure(&e, start))?;

    info!(order_id = %order.id, status = order.status.as_str(), "Order status changed");
    Ok(Json(ApiResponse::success(order, elapsed_ms(start))))
}
