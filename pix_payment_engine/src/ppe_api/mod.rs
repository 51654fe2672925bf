//! # PIX payment engine public API
//!
//! The `ppe_api` module exposes the programmatic API for the payment engine. The API is modular, so that clients can
//! pick and choose the functionality they want:
//!
//! * [`order_flow_api`] is the primary API for the order lifecycle: creating pending orders from a validated cart,
//!   linking provider charges, applying payment confirmations and sweeping abandoned orders.
//! * [`order_query_api`] provides the read side: fetching single orders, their line items, and filtered order
//!   searches for the back office.
//!
//! The pattern for using the APIs is the same. An API instance is created by supplying a database backend that
//! implements the specific backend traits required by the API.
//!
//! ```rust,ignore
//! use pix_payment_engine::{OrderQueryApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements OrderManagement
//! let api = OrderQueryApi::new(db);
//! let order = api.fetch_order_by_order_id(&order_id).await?;
//! ```

pub mod order_flow_api;
pub mod order_objects;
pub mod order_query_api;
