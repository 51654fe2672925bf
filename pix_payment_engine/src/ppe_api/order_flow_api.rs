use std::fmt::Debug;

use chrono::{Duration, Utc};
use log::*;

use crate::{
    db::common::PaymentOutcome,
    db_types::{ChargeDetails, NewOrder, NewOrderItem, Order, OrderId, PaymentReceived},
    events::{EventProducers, OrderExpiredEvent, OrderPaidEvent},
    db::traits::{PaymentGatewayDatabase, PaymentGatewayError},
    ppe_api::order_objects::OrderWithItems,
};

/// `OrderFlowApi` is the primary API for the order lifecycle: creating pending orders from a validated cart,
/// linking provider charges to them, applying provider payment confirmations, and sweeping abandoned orders.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: PaymentGatewayDatabase
{
    /// Persists a brand-new order and its line item snapshots. The order starts out `Pending` with no charge
    /// attached. Validation of the cart happens before this call, in
    /// [`new_order_from_cart`](crate::ppe_api::order_objects::new_order_from_cart).
    pub async fn create_pending_order(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<OrderWithItems, PaymentGatewayError> {
        let order = self.db.insert_order(order).await?;
        let items = self.db.insert_order_items(&order, &items).await?;
        debug!("🔄️📦️ Order {} created with {} line items, totalling {}", order.order_id, items.len(), order.total_amount);
        Ok(OrderWithItems { order, items })
    }

    /// Records the provider charge against the order. An order can carry at most one charge; a second attach attempt
    /// fails with [`PaymentGatewayError::ChargeAlreadyAttached`].
    pub async fn attach_charge(&self, order_id: &OrderId, charge: ChargeDetails) -> Result<Order, PaymentGatewayError> {
        let order = self.db.attach_charge_to_order(order_id, &charge).await?;
        debug!("🔄️📦️ Charge {} recorded against order {order_id}", charge.charge_id);
        Ok(order)
    }

    /// Applies a provider payment confirmation for the given charge id.
    ///
    /// Returns `None` when no order carries that charge id. The order-paid hook fires only when the order actually
    /// transitions to `Paid` here; webhook redeliveries and poller/webhook races re-apply the same absolute values
    /// without re-firing the hook.
    pub async fn confirm_payment(
        &self,
        charge_id: &str,
        payment: PaymentReceived,
    ) -> Result<Option<PaymentOutcome>, PaymentGatewayError> {
        trace!("🔄️💰️ Payment confirmation received for charge {charge_id}");
        let outcome = self.db.mark_order_paid_by_charge_id(charge_id, &payment).await?;
        match &outcome {
            Some(PaymentOutcome::NewlyPaid(order)) => {
                info!(
                    "🔄️💰️ Order {} is paid ({} received)",
                    order.order_id,
                    order.paid_amount.unwrap_or(order.total_amount)
                );
                self.call_order_paid_hook(order).await;
            },
            Some(PaymentOutcome::AlreadyPaid(order)) => {
                debug!("🔄️💰️ Duplicate confirmation for order {}. Nothing more to do.", order.order_id);
            },
            Some(PaymentOutcome::NotPayable(order)) => {
                warn!("🔄️💰️ Confirmation for charge {charge_id} landed on cancelled order {}", order.order_id);
            },
            None => {
                debug!("🔄️💰️ No order matches charge {charge_id}");
            },
        }
        Ok(outcome)
    }

    /// Sweeps `Pending` orders older than `max_age` into `Expired` and fires the order-expired hook for each.
    pub async fn expire_old_orders(&self, max_age: Duration) -> Result<Vec<Order>, PaymentGatewayError> {
        let cutoff = Utc::now() - max_age;
        let expired = self.db.expire_pending_orders_older_than(cutoff).await?;
        if !expired.is_empty() {
            info!("🔄️🕰️ {} unpaid orders older than {}h have been expired", expired.len(), max_age.num_hours());
            self.call_order_expired_hook(&expired).await;
        }
        Ok(expired)
    }

    async fn call_order_paid_hook(&self, order: &Order) {
        for emitter in &self.producers.order_paid_producer {
            debug!("🔄️📦️ Notifying order paid hook subscribers");
            let event = OrderPaidEvent::new(order.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_order_expired_hook(&self, expired: &[Order]) {
        for emitter in &self.producers.order_expired_producer {
            debug!("🔄️🕰️ Notifying order expired hook subscribers");
            for order in expired {
                let event = OrderExpiredEvent::new(order.clone());
                emitter.publish_event(event).await;
            }
        }
    }

    /// Returns a reference to the database backend.
    pub fn db(&self) -> &B {
        &self.db
    }
}
