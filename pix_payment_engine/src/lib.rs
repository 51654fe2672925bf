//! PIX Payment Engine
//!
//! The engine owns the order store and the order/payment reconciliation logic for the storefront payment gateway.
//! It is provider-agnostic: nothing in this crate knows about AbacatePay wire formats, only about charges by id.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to access
//!    the database directly; use the public API instead. The exception is the data types used in the database, which
//!    are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@ppe_api`]): order creation, charge linking, payment confirmation, order expiry and
//!    the back-office order queries. Backends implement the traits in [`mod@db`] to drive these APIs.
//!
//! The engine also emits events when orders are paid or expired. A small hook system lets the server (or anything
//! else) subscribe and react to these asynchronously.
mod db;

pub mod db_types;
pub mod events;
mod ppe_api;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase};
pub use db::{
    common::PaymentOutcome,
    traits::{OrderManagement, OrderQueryError, PaymentGatewayDatabase, PaymentGatewayError},
};
pub use ppe_api::{
    order_flow_api::OrderFlowApi,
    order_objects::{new_order_from_cart, CartError, OrderQueryFilter, OrderResult, OrderWithItems},
    order_query_api::OrderQueryApi,
};
