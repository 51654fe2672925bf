use chrono::{DateTime, Utc};
use log::trace;
use sqlx::{types::Json, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{ChargeDetails, NewOrder, NewOrderItem, Order, OrderId, OrderItem, OrderStatusType, PaymentReceived},
    ppe_api::order_objects::OrderQueryFilter,
};

const ORDER_COLUMNS: &str = "id, order_id, status, total_amount, paid_amount, fee, payment_method, charge_id, \
                             customer_name, customer_email, customer_phone, customer_tax_id, dev_mode, metadata, \
                             created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, name, unit_amount, quantity, total_amount";

/// Inserts a new order into the database using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, SqliteDatabaseError> {
    let NewOrder { order_id, total_amount, customer, dev_mode, metadata } = order;
    let sql = format!(
        "INSERT INTO orders (order_id, status, total_amount, customer_name, customer_email, customer_phone, \
         customer_tax_id, dev_mode, metadata) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {ORDER_COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(order_id)
        .bind(OrderStatusType::Pending)
        .bind(total_amount)
        .bind(customer.name)
        .bind(customer.email)
        .bind(customer.phone)
        .bind(customer.tax_id)
        .bind(dev_mode)
        .bind(metadata.map(Json))
        .fetch_one(conn)
        .await?;
    Ok(order)
}

/// Inserts the line item snapshots for an order. Wrap in a transaction for atomicity.
pub async fn insert_order_items(
    order_db_id: i64,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, SqliteDatabaseError> {
    let sql = format!(
        "INSERT INTO order_items (order_id, product_id, name, unit_amount, quantity, total_amount) VALUES ($1, $2, \
         $3, $4, $5, $6) RETURNING {ITEM_COLUMNS}"
    );
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as::<_, OrderItem>(&sql)
            .bind(order_db_id)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.unit_amount)
            .bind(item.quantity)
            .bind(item.total())
            .fetch_one(&mut *conn)
            .await?;
        result.push(row);
    }
    Ok(result)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_charge_id(
    charge_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE charge_id = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(charge_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_items(
    order_db_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, SqliteDatabaseError> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id");
    let items = sqlx::query_as::<_, OrderItem>(&sql).bind(order_db_id).fetch_all(conn).await?;
    Ok(items)
}

/// Links a provider charge to the order. The `charge_id IS NULL` guard enforces one active charge per order.
/// Returns the number of rows updated (0 means the order is missing or already carries a charge).
pub async fn attach_charge(
    order_id: &OrderId,
    charge: &ChargeDetails,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query(
        "UPDATE orders SET charge_id = $1, payment_method = $2, dev_mode = $3, metadata = $4 WHERE order_id = $5 \
         AND charge_id IS NULL",
    )
    .bind(&charge.charge_id)
    .bind(charge.payment_method)
    .bind(charge.dev_mode)
    .bind(Json(charge.metadata.clone()))
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

/// Applies a payment confirmation as absolute values. `fee` and `payment_method` only overwrite when the
/// confirmation carries them, so a fee-less poller confirmation arriving after the webhook never erases data.
/// Cancelled orders are excluded; re-applying to a `Paid` order converges on the same row.
pub async fn apply_payment(
    charge_id: &str,
    payment: &PaymentReceived,
    conn: &mut SqliteConnection,
) -> Result<u64, SqliteDatabaseError> {
    let result = sqlx::query(
        "UPDATE orders SET status = $1, paid_amount = $2, fee = COALESCE($3, fee), payment_method = COALESCE($4, \
         payment_method), dev_mode = $5 WHERE charge_id = $6 AND status != $7",
    )
    .bind(OrderStatusType::Paid)
    .bind(payment.amount)
    .bind(payment.fee)
    .bind(payment.method)
    .bind(payment.dev_mode)
    .bind(charge_id)
    .bind(OrderStatusType::Cancelled)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn fetch_expirable_orders(
    cutoff: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 AND datetime(created_at) <= datetime($2) ORDER BY id"
    );
    let orders =
        sqlx::query_as::<_, Order>(&sql).bind(OrderStatusType::Pending).bind(cutoff).fetch_all(conn).await?;
    Ok(orders)
}

pub async fn expire_orders(cutoff: DateTime<Utc>, conn: &mut SqliteConnection) -> Result<u64, SqliteDatabaseError> {
    let result =
        sqlx::query("UPDATE orders SET status = $1 WHERE status = $2 AND datetime(created_at) <= datetime($3)")
            .bind(OrderStatusType::Expired)
            .bind(OrderStatusType::Pending)
            .bind(cutoff)
            .execute(conn)
            .await?;
    Ok(result.rows_affected())
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`, newest first.
pub async fn search_orders(
    query: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
    let mut first = true;
    let mut clause = |builder: &mut QueryBuilder<Sqlite>| {
        if first {
            builder.push(" WHERE ");
            first = false;
        } else {
            builder.push(" AND ");
        }
    };
    if let Some(order_id) = query.order_id {
        clause(&mut builder);
        builder.push("order_id = ").push_bind(order_id);
    }
    if let Some(charge_id) = query.charge_id {
        clause(&mut builder);
        builder.push("charge_id = ").push_bind(charge_id);
    }
    if let Some(email) = query.customer_email {
        clause(&mut builder);
        builder.push("customer_email = ").push_bind(email);
    }
    if let Some(since) = query.since {
        clause(&mut builder);
        builder.push("datetime(created_at) >= datetime(").push_bind(since).push(")");
    }
    if let Some(until) = query.until {
        clause(&mut builder);
        builder.push("datetime(created_at) <= datetime(").push_bind(until).push(")");
    }
    if !query.statuses.is_empty() {
        clause(&mut builder);
        builder.push("status IN (");
        let mut separated = builder.separated(", ");
        for status in query.statuses {
            separated.push_bind(status);
        }
        builder.push(")");
    }
    builder.push(" ORDER BY id DESC");
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ").push_bind(limit);
    }
    trace!("🗃️ Order query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}
