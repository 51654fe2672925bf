use chrono::Duration;
use log::*;
use pix_payment_engine::{db_types::Order, events::EventProducers, OrderFlowApi, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Every minute, `Pending` orders older than `unpaid_expiry` are swept into `Expired`. This also bounds the leak of
/// orphaned pending orders left behind when checkout fails between the order insert and the charge creation.
pub fn start_expiry_worker(db: SqliteDatabase, producers: EventProducers, unpaid_expiry: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(std::time::Duration::from_secs(60));
        let api = OrderFlowApi::new(db, producers);
        info!("🕰️ Unpaid order expiry worker started");
        loop {
            timer.tick().await;
            trace!("🕰️ Running unpaid order expiry job");
            match api.expire_old_orders(unpaid_expiry).await {
                Ok(expired) => {
                    if !expired.is_empty() {
                        info!("🕰️ {} orders expired", expired.len());
                        debug!("🕰️ Expired unpaid orders: {}", order_list(&expired));
                    }
                },
                Err(e) => {
                    error!("🕰️ Error running unpaid order expiry job: {e}");
                },
            }
        }
    })
}

fn order_list(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("[{}] order_id: {} total: {}", o.id, o.order_id, o.total_amount))
        .collect::<Vec<String>>()
        .join(", ")
}
