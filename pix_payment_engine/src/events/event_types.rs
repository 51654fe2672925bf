use serde::{Deserialize, Serialize};

use crate::db_types::Order;

/// Fired exactly once per order, when its status first transitions to `Paid`. Duplicate payment confirmations
/// (webhook replays, the status poller racing the webhook) do not re-fire this event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPaidEvent {
    pub order: Order,
}

impl OrderPaidEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Fired when the expiry sweep moves a pending order to `Expired`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderExpiredEvent {
    pub order: Order,
}

impl OrderExpiredEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}
