use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db::common::PaymentOutcome,
    db_types::{ChargeDetails, NewOrder, NewOrderItem, Order, OrderId, OrderItem, PaymentReceived},
};

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No order matches charge id {0}")]
    ChargeNotFound(String),
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),
    #[error("Order {0} already has a charge attached")]
    ChargeAlreadyAttached(OrderId),
}

/// The write-side behaviour a backend must provide to support the payment gateway's order flow:
/// * creating pending orders and their line item snapshots,
/// * linking a provider charge to an order,
/// * applying provider payment confirmations idempotently,
/// * sweeping abandoned pending orders.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Inserts a new order in `Pending` status and returns the stored row.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;

    /// Inserts the line item snapshots for the given order, atomically, and returns the stored rows.
    async fn insert_order_items(&self, order: &Order, items: &[NewOrderItem])
        -> Result<Vec<OrderItem>, PaymentGatewayError>;

    /// Persists the provider charge id, payment method and charge metadata onto the order. Fails with
    /// [`PaymentGatewayError::ChargeAlreadyAttached`] if the order already carries a charge (one active charge per
    /// order), or [`PaymentGatewayError::OrderNotFound`] if the order does not exist.
    async fn attach_charge_to_order(&self, order_id: &OrderId, charge: &ChargeDetails)
        -> Result<Order, PaymentGatewayError>;

    /// Applies a provider payment confirmation to the order matching `charge_id`, setting absolute values so that
    /// duplicate deliveries converge. Returns `None` when no order carries that charge id. Never moves an order out
    /// of `Paid` or resurrects a `Cancelled` order.
    async fn mark_order_paid_by_charge_id(
        &self,
        charge_id: &str,
        payment: &PaymentReceived,
    ) -> Result<Option<PaymentOutcome>, PaymentGatewayError>;

    /// Marks every `Pending` order created on or before `cutoff` as `Expired` and returns the swept orders.
    async fn expire_pending_orders_older_than(&self, cutoff: DateTime<Utc>)
        -> Result<Vec<Order>, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}
