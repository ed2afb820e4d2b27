//! Store Module - Persistence Port
//!
//! The document database is an external collaborator. The API talks to it
//! through [`OrderStore`]; [`MemoryStore`] backs tests and local runs.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{AppResult, Order, OrderStatus, Restaurant};

pub use memory::MemoryStore;

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_restaurant(&self, restaurant: Restaurant) -> AppResult<Restaurant>;

    async fn get_restaurant(&self, id: Uuid) -> AppResult<Option<Restaurant>>;

    async fn insert_order(&self, order: Order) -> AppResult<Order>;

    async fn get_order(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Orders of a restaurant, oldest first
    async fn list_orders(&self, restaurant_id: Uuid) -> AppResult<Vec<Order>>;

    /// Number of the restaurant's orders currently in `status`
    async fn count_orders_with_status(&self, restaurant_id: Uuid, status: OrderStatus) -> AppResult<u32>;

    /// Move an order to `status`, enforcing the lifecycle.
    ///
    /// Fails with `API_NOT_FOUND` for unknown ids and `API_CONFLICT` for
    /// transitions the lifecycle forbids.
    async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> AppResult<Order>;
}
