//! AbacatePay PIX client
//!
//! A thin HTTP client for the AbacatePay PIX QR code endpoints. The provider's response shapes differ between its
//! billing and PIX endpoint families, so everything is normalized behind the [`PixGateway`] trait and the data
//! objects in this crate; provider-specific JSON never leaks past this boundary.

mod api;
mod config;
mod data_objects;
mod error;

pub use api::{AbacatePayApi, PixGateway};
pub use config::AbacatePayConfig;
pub use data_objects::{ChargeCustomer, ChargeStatus, NewPixCharge, PixCharge, PixChargeStatus, CHARGE_SOURCE};
pub use error::AbacatePayApiError;
