use std::fmt::Display;

use chrono::{DateTime, Utc};
use ppg_common::Centavos;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    db::traits::OrderQueryError,
    db_types::{CustomerInfo, NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType},
};

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
}

/// Validates a cart and folds it into a [`NewOrder`] plus its line item snapshots.
///
/// Every line must carry a strictly positive unit price and quantity, and the cart must not be empty. The order
/// total is computed server-side from the validated lines. Any total a client sends is ignored.
pub fn new_order_from_cart(
    customer: CustomerInfo,
    items: Vec<NewOrderItem>,
) -> Result<(NewOrder, Vec<NewOrderItem>), CartError> {
    if items.is_empty() {
        return Err(CartError::EmptyCart);
    }
    let mut total = Centavos::from(0);
    for item in &items {
        if !item.unit_amount.is_positive() {
            return Err(CartError::InvalidAmount(format!("{} has a unit price of {}", item.name, item.unit_amount)));
        }
        if item.quantity <= 0 {
            return Err(CartError::InvalidQuantity(format!("{} has a quantity of {}", item.name, item.quantity)));
        }
        // Prices and quantities are client input, so the running total must not wrap
        total = item
            .unit_amount
            .checked_mul(item.quantity)
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| CartError::InvalidAmount(format!("The cart total overflows at {}", item.name)))?;
    }
    let order = NewOrder::new(total, customer);
    Ok((order, items))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub total_orders: Centavos,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub order_id: Option<OrderId>,
    pub charge_id: Option<String>,
    pub customer_email: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub statuses: Vec<OrderStatusType>,
    pub limit: Option<i64>,
}

impl OrderQueryFilter {
    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_charge_id(mut self, charge_id: String) -> Self {
        self.charge_id = Some(charge_id);
        self
    }

    pub fn with_customer_email(mut self, email: String) -> Self {
        self.customer_email = Some(email);
        self
    }

    pub fn since<T>(mut self, since: T) -> Result<Self, OrderQueryError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = since.try_into().map_err(|e| OrderQueryError::QueryError(e.to_string()))?;
        self.since = Some(dt);
        Ok(self)
    }

    pub fn until<T>(mut self, until: T) -> Result<Self, OrderQueryError>
    where
        T: TryInto<DateTime<Utc>>,
        T::Error: Display,
    {
        let dt = until.try_into().map_err(|e| OrderQueryError::QueryError(e.to_string()))?;
        self.until = Some(dt);
        Ok(self)
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() &&
            self.charge_id.is_none() &&
            self.customer_email.is_none() &&
            self.since.is_none() &&
            self.until.is_none() &&
            self.statuses.is_empty() &&
            self.limit.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(order_id) = &self.order_id {
            write!(f, "order_id: {order_id}. ")?;
        }
        if let Some(charge_id) = &self.charge_id {
            write!(f, "charge_id: {charge_id}. ")?;
        }
        if let Some(email) = &self.customer_email {
            write!(f, "customer_email: {email}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        if !self.statuses.is_empty() {
            let statuses = self.statuses.iter().map(|s| s.to_string()).collect::<Vec<String>>().join(",");
            write!(f, "statuses: [{statuses}]. ")?;
        }
        if let Some(limit) = self.limit {
            write!(f, "limit: {limit}. ")?;
        }
        Ok(())
    }
}
