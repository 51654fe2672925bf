use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use crate::{
    db::{
        common::PaymentOutcome,
        sqlite::{new_pool, orders, SqliteDatabaseError},
        traits::{OrderManagement, OrderQueryError, PaymentGatewayDatabase, PaymentGatewayError},
    },
    db_types::{
        ChargeDetails,
        NewOrder,
        NewOrderItem,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        PaymentReceived,
    },
    ppe_api::order_objects::OrderQueryFilter,
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any outstanding schema migrations. Called once at server startup and by the test harness.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order {} has been saved in the DB with id {}", order.order_id, order.id);
        Ok(order)
    }

    async fn insert_order_items(
        &self,
        order: &Order,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let items = orders::insert_order_items(order.id, items, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        debug!("🗃️ {} line items saved for order {}", items.len(), order.order_id);
        Ok(items)
    }

    async fn attach_charge_to_order(
        &self,
        order_id: &OrderId,
        charge: &ChargeDetails,
    ) -> Result<Order, PaymentGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let updated = orders::attach_charge(order_id, charge, &mut tx).await?;
        if updated == 0 {
            // Distinguish a missing order from a double attach before rolling back
            let existing = orders::fetch_order_by_order_id(order_id, &mut tx).await?;
            return match existing {
                Some(_) => Err(PaymentGatewayError::ChargeAlreadyAttached(order_id.clone())),
                None => Err(PaymentGatewayError::OrderNotFound(order_id.clone())),
            };
        }
        let order = orders::fetch_order_by_order_id(order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        debug!("🗃️ Charge {} attached to order {}", charge.charge_id, order.order_id);
        Ok(order)
    }

    async fn mark_order_paid_by_charge_id(
        &self,
        charge_id: &str,
        payment: &PaymentReceived,
    ) -> Result<Option<PaymentOutcome>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let Some(order) = orders::fetch_order_by_charge_id(charge_id, &mut tx).await? else {
            return Ok(None);
        };
        let previous_status = order.status;
        let outcome = match previous_status {
            OrderStatusType::Cancelled => {
                warn!(
                    "🗃️ Payment received for charge {charge_id}, but order {} is cancelled. Leaving it untouched.",
                    order.order_id
                );
                PaymentOutcome::NotPayable(order)
            },
            _ => {
                if previous_status == OrderStatusType::Expired {
                    warn!(
                        "🗃️ Payment received for charge {charge_id} after order {} expired. The provider's \
                         confirmation is authoritative, so the order is being marked as paid anyway.",
                        order.order_id
                    );
                }
                // Fields the confirmation path could not know fall back to what the order already recorded
                let resolved = PaymentReceived {
                    amount: Some(payment.amount.unwrap_or(order.total_amount)),
                    fee: payment.fee,
                    method: payment.method,
                    dev_mode: Some(payment.dev_mode.unwrap_or(order.dev_mode)),
                };
                orders::apply_payment(charge_id, &resolved, &mut tx).await?;
                let updated = orders::fetch_order_by_charge_id(charge_id, &mut tx)
                    .await?
                    .ok_or_else(|| PaymentGatewayError::ChargeNotFound(charge_id.to_string()))?;
                match previous_status {
                    OrderStatusType::Paid => PaymentOutcome::AlreadyPaid(updated),
                    _ => PaymentOutcome::NewlyPaid(updated),
                }
            },
        };
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(Some(outcome))
    }

    async fn expire_pending_orders_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Order>, PaymentGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let mut expirable = orders::fetch_expirable_orders(cutoff, &mut tx).await?;
        if !expirable.is_empty() {
            orders::expire_orders(cutoff, &mut tx).await?;
        }
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        for order in &mut expirable {
            order.status = OrderStatusType::Expired;
        }
        Ok(expirable)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_charge_id(&self, charge_id: &str) -> Result<Option<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let order = orders::fetch_order_by_charge_id(charge_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order: &Order) -> Result<Vec<OrderItem>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let items = orders::fetch_order_items(order.id, &mut conn).await?;
        Ok(items)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let orders = orders::search_orders(query, &mut conn).await?;
        Ok(orders)
    }
}
