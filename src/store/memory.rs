//! In-memory order store
//!
//! Thread-safe without explicit locking: DashMap shards its own locks, and
//! status updates hold the entry guard for the whole check-and-set.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::OrderStore;
use crate::models::{AppError, AppResult, Order, OrderStatus, Restaurant};

#[derive(Clone, Default)]
pub struct MemoryStore {
    restaurants: Arc<DashMap<Uuid, Restaurant>>,
    orders: Arc<DashMap<Uuid, Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_restaurant(&self, restaurant: Restaurant) -> AppResult<Restaurant> {
        self.restaurants.insert(restaurant.id, restaurant.clone());
        info!(restaurant_id = %restaurant.id, name = %restaurant.name, "Restaurant stored");
        Ok(restaurant)
    }

    async fn get_restaurant(&self, id: Uuid) -> AppResult<Option<Restaurant>> {
        Ok(self.restaurants.get(&id).map(|r| r.value().clone()))
    }

    async fn insert_order(&self, order: Order) -> AppResult<Order> {
        if !self.restaurants.contains_key(&order.restaurant_id) {
            return Err(AppError::not_found(format!(
                "Restaurant {} not found",
                order.restaurant_id
            )));
        }
        self.orders.insert(order.id, order.clone());
        info!(order_id = %order.id, restaurant_id = %order.restaurant_id, "Order stored");
        Ok(order)
    }

    async fn get_order(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.orders.get(&id).map(|o| o.value().clone()))
    }

    async fn list_orders(&self, restaurant_id: Uuid) -> AppResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.restaurant_id == restaurant_id)
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    async fn count_orders_with_status(&self, restaurant_id: Uuid, status: OrderStatus) -> AppResult<u32> {
        let count = self
            .orders
            .iter()
            .filter(|entry| entry.restaurant_id == restaurant_id && entry.status == status)
            .count();
        Ok(count as u32)
    }

    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        let mut entry = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;

        let current = entry.status;
        if current.is_terminal() {
            return Err(AppError::conflict(format!(
                "Order {} is already {}",
                id,
                current.as_str()
            )));
        }
        if !current.can_transition_to(status) {
            return Err(AppError::conflict(format!(
                "Cannot move order from {} to {}",
                current.as_str(),
                status.as_str()
            )));
        }

        entry.status = status;
        debug!(order_id = %id, from = current.as_str(), to = status.as_str(), "Order status updated");
        Ok(entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeliveryEstimateResult, ErrorCode, OrderItem};

    fn estimate() -> DeliveryEstimateResult {
        DeliveryEstimateResult { fee: 1.0, minutes: 33.0, distance_km: 1.7, rounded_km: 2.0 }
    }

    fn order_for(restaurant_id: Uuid) -> Order {
        Order::new(
            restaurant_id,
            "Marco".to_string(),
            vec![OrderItem { name: "Carbonara".to_string(), quantity: 1, unit_price: 11.0 }],
            "Via Nazionale 5, Roma".to_string(),
            &estimate(),
        )
    }

    #[tokio::test]
    async fn test_restaurant_roundtrip() {
        let store = MemoryStore::new();
        let restaurant = store
            .insert_restaurant(Restaurant::new("Da Enzo", "Via dei Vascellari 29, Roma"))
            .await
            .unwrap();

        let loaded = store.get_restaurant(restaurant.id).await.unwrap();
        assert_eq!(loaded, Some(restaurant));
        assert_eq!(store.get_restaurant(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_order_requires_restaurant() {
        let store = MemoryStore::new();
        let err = store.insert_order(order_for(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ApiNotFound);
        assert!(store.orders.is_empty());
    }

    #[tokio::test]
    async fn test_preparation_count_is_per_restaurant() {
        let store = MemoryStore::new();
        let a = store.insert_restaurant(Restaurant::new("A", "Addr A")).await.unwrap();
        let b = store.insert_restaurant(Restaurant::new("B", "Addr B")).await.unwrap();

        let a1 = store.insert_order(order_for(a.id)).await.unwrap();
        let a2 = store.insert_order(order_for(a.id)).await.unwrap();
        store.insert_order(order_for(a.id)).await.unwrap();
        let b1 = store.insert_order(order_for(b.id)).await.unwrap();

        for id in [a1.id, a2.id, b1.id] {
            store.update_order_status(id, OrderStatus::Preparation).await.unwrap();
        }

        assert_eq!(store.count_orders_with_status(a.id, OrderStatus::Preparation).await.unwrap(), 2);
        assert_eq!(store.count_orders_with_status(a.id, OrderStatus::Pending).await.unwrap(), 1);
        assert_eq!(store.count_orders_with_status(b.id, OrderStatus::Preparation).await.unwrap(), 1);
        assert_eq!(store.list_orders(a.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_illegal_transition_conflicts() {
        let store = MemoryStore::new();
        let r = store.insert_restaurant(Restaurant::new("R", "Addr")).await.unwrap();
        let order = store.insert_order(order_for(r.id)).await.unwrap();

        let err = store
            .update_order_status(order.id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApiConflict);

        let updated = store
            .update_order_status(order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Cancelled);

        let err = store
            .update_order_status(order.id, OrderStatus::Preparation)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApiConflict);
        assert!(err.message.ends_with("is already cancelled"));

        let err = store
            .update_order_status(Uuid::new_v4(), OrderStatus::Preparation)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApiNotFound);
    }
}
