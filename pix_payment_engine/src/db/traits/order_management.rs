use thiserror::Error;

use crate::{
    db_types::{Order, OrderId, OrderItem},
    ppe_api::order_objects::OrderQueryFilter,
};

#[derive(Debug, Clone, Error)]
pub enum OrderQueryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

/// Read-side access to the order store, used by the payment-check flow and the back-office screens.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError>;

    async fn fetch_order_by_charge_id(&self, charge_id: &str) -> Result<Option<Order>, OrderQueryError>;

    async fn fetch_order_items(&self, order: &Order) -> Result<Vec<OrderItem>, OrderQueryError>;

    /// Fetches orders according to the criteria specified in the `OrderQueryFilter`, newest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError>;
}
