//! # PIX payment server
//! This crate hosts the HTTP surface of the payment gateway. It is responsible for:
//! * Turning storefront checkout requests into pending orders and PIX charges.
//! * Letting the storefront poll a charge's status while the customer pays.
//! * Listening for incoming payment webhook notifications from AbacatePay.
//! * Serving the back-office order queries.
//! * Running the background sweep that expires abandoned pending orders.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/checkout`: Creates a pending order and its PIX charge.
//! * `/payment/check`: Polls the provider for a charge's status.
//! * `/webhook/abacatepay`: The webhook route for receiving payment events from AbacatePay.
//! * `/api/orders`, `/api/orders/{order_id}`: Back-office order queries, guarded by a shared API key.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod helpers;
pub mod routes;
pub mod server;
