use log::*;
use ppg_common::Centavos;

use crate::{
    db::traits::{OrderManagement, OrderQueryError},
    db_types::{Order, OrderId},
    ppe_api::order_objects::{OrderQueryFilter, OrderResult, OrderWithItems},
};

/// The `OrderQueryApi` provides read-only access to the order store. It backs the storefront's payment-check lookups
/// and the back-office order screens.
#[derive(Debug, Clone)]
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    pub async fn fetch_order_by_charge_id(&self, charge_id: &str) -> Result<Option<Order>, OrderQueryError> {
        self.db.fetch_order_by_charge_id(charge_id).await
    }

    /// Fetches an order together with its line item snapshots. Returns `None` when the order does not exist.
    pub async fn fetch_order_with_items(&self, order_id: &OrderId) -> Result<Option<OrderWithItems>, OrderQueryError> {
        let Some(order) = self.db.fetch_order_by_order_id(order_id).await? else {
            return Ok(None);
        };
        let items = self.db.fetch_order_items(&order).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// Runs a filtered order search, newest first, and totals the matching order amounts.
    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<OrderResult, OrderQueryError> {
        trace!("🔍️ Searching orders: {query}");
        let orders = self.db.search_orders(query).await?;
        let total_orders = orders.iter().map(|o| o.total_amount).sum::<Centavos>();
        Ok(OrderResult { total_orders, orders })
    }
}
