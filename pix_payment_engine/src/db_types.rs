use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use ppg_common::Centavos;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{types::Json, FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The public, locally generated identifier for an order. Distinct from the database row id so that the value handed
/// to customers and to the payment provider carries no information about order volumes.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// Generates a fresh random order id. Collisions are guarded by the unique constraint on the column.
    pub fn random() -> Self {
        Self(format!("ord_{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order is newly created and no payment has been confirmed.
    Pending,
    /// The payment provider has confirmed payment in full.
    Paid,
    /// The order has been cancelled by an operator.
    Cancelled,
    /// The order sat unpaid past the configured timeout and was swept by the expiry worker.
    Expired,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Paid => write!(f, "Paid"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
            OrderStatusType::Expired => write!(f, "Expired"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Cancelled" => Ok(Self::Cancelled),
            "Expired" => Ok(Self::Expired),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Pending");
            OrderStatusType::Pending
        })
    }
}

//--------------------------------------    PaymentMethod      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Pix,
    Card,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Pix => write!(f, "PIX"),
            PaymentMethod::Card => write!(f, "CARD"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PIX" => Ok(Self::Pix),
            "CARD" => Ok(Self::Card),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------    CustomerInfo       -------------------------------------------------------
/// Contact details captured at checkout. All fields are optional; anonymous checkouts are allowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub status: OrderStatusType,
    /// The sum of the line item totals at creation time. Never changes after creation.
    pub total_amount: Centavos,
    pub paid_amount: Option<Centavos>,
    pub fee: Option<Centavos>,
    pub payment_method: Option<PaymentMethod>,
    /// The provider-assigned charge id. Unique when present; the webhook reconciles against this.
    pub charge_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_tax_id: Option<String>,
    /// True when the charge was created against the provider sandbox.
    pub dev_mode: bool,
    /// Opaque provider response fragments (brCode, brCodeBase64, expiry) kept for redisplay.
    pub metadata: Option<Json<Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewOrder         -------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    /// The total price of the order, equal to the sum of the line item totals.
    pub total_amount: Centavos,
    pub customer: CustomerInfo,
    pub dev_mode: bool,
    pub metadata: Option<Value>,
}

impl NewOrder {
    pub fn new(total_amount: Centavos, customer: CustomerInfo) -> Self {
        Self { order_id: OrderId::random(), total_amount, customer, dev_mode: false, metadata: None }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

//--------------------------------------     OrderItem         -------------------------------------------------------
/// A line item snapshot. Immutable once created; later catalog price changes never affect a placed order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    /// The row id of the owning order.
    pub order_id: i64,
    pub product_id: Option<String>,
    pub name: String,
    pub unit_amount: Centavos,
    pub quantity: i64,
    pub total_amount: Centavos,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: Option<String>,
    pub name: String,
    pub unit_amount: Centavos,
    pub quantity: i64,
}

impl NewOrderItem {
    pub fn new<S: Into<String>>(name: S, unit_amount: Centavos, quantity: i64) -> Self {
        Self { product_id: None, name: name.into(), unit_amount, quantity }
    }

    pub fn total(&self) -> Centavos {
        self.unit_amount * self.quantity
    }
}

//--------------------------------------    ChargeDetails      -------------------------------------------------------
/// The subset of a provider charge that gets persisted onto the order after charge creation.
#[derive(Debug, Clone)]
pub struct ChargeDetails {
    pub charge_id: String,
    pub payment_method: PaymentMethod,
    /// Whether the charge was created against the provider's sandbox.
    pub dev_mode: bool,
    /// Merged metadata for the order (payment code, expiry and whatever was there before).
    pub metadata: Value,
}

//--------------------------------------   PaymentReceived     -------------------------------------------------------
/// Payment details from a provider confirmation, applied to the order as absolute values so that duplicate
/// deliveries converge on the same row. Fields the confirmation path does not know (the status poller learns
/// neither the amount nor the sandbox flag) are `None` and resolve against the stored order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceived {
    pub amount: Option<Centavos>,
    pub fee: Option<Centavos>,
    pub method: Option<PaymentMethod>,
    pub dev_mode: Option<bool>,
}
