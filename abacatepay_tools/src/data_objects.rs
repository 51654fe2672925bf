use std::fmt::Display;

use chrono::{DateTime, Utc};
use ppg_common::Centavos;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AbacatePayApiError;

/// The metadata source tag attached to every charge created by this gateway.
pub const CHARGE_SOURCE: &str = "web_app";

//--------------------------------------    ChargeStatus    ----------------------------------------------------------
/// The provider's view of a charge's lifecycle. Anything the provider adds in future API versions lands in
/// `Unknown` rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
    Pending,
    Paid,
    Expired,
    Cancelled,
    Refunded,
    #[serde(other)]
    Unknown,
}

impl Display for ChargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChargeStatus::Pending => "PENDING",
            ChargeStatus::Paid => "PAID",
            ChargeStatus::Expired => "EXPIRED",
            ChargeStatus::Cancelled => "CANCELLED",
            ChargeStatus::Refunded => "REFUNDED",
            ChargeStatus::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

//--------------------------------------   ChargeCustomer   ----------------------------------------------------------
/// Customer contact details forwarded to the provider when creating a charge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeCustomer {
    pub name: String,
    pub cellphone: String,
    pub email: String,
    #[serde(rename = "taxId")]
    pub tax_id: String,
}

//--------------------------------------    NewPixCharge    ----------------------------------------------------------
/// A request for a new PIX charge, in gateway terms. [`crate::AbacatePayApi`] translates this into the provider's
/// wire format.
#[derive(Debug, Clone)]
pub struct NewPixCharge {
    pub amount: Centavos,
    pub description: String,
    pub customer: ChargeCustomer,
    /// The local order id, echoed back by the provider so out-of-band notifications can be correlated.
    pub external_id: String,
}

//--------------------------------------     PixCharge      ----------------------------------------------------------
/// A PIX charge as returned by the provider's create endpoint, with the renderable payment code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixCharge {
    pub id: String,
    pub amount: Centavos,
    pub status: ChargeStatus,
    #[serde(default)]
    pub dev_mode: bool,
    pub br_code: String,
    pub br_code_base64: String,
    #[serde(default)]
    pub platform_fee: Option<Centavos>,
    pub expires_at: DateTime<Utc>,
}

//--------------------------------------   PixChargeStatus  ----------------------------------------------------------
/// The subset of charge fields returned by the provider's status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixChargeStatus {
    pub status: ChargeStatus,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

//--------------------------------------    Wire formats    ----------------------------------------------------------

/// Every AbacatePay response wraps its payload in a `{data, error}` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the envelope, converting a provider-reported error or a missing payload into the matching error.
    pub fn into_data(self) -> Result<T, AbacatePayApiError> {
        if let Some(err) = self.error {
            if !err.is_null() {
                let message = err.as_str().map(String::from).unwrap_or_else(|| err.to_string());
                return Err(AbacatePayApiError::ProviderError(message));
            }
        }
        self.data.ok_or(AbacatePayApiError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePixQrCodeRequest {
    pub amount: i64,
    pub description: String,
    pub expires_in: u32,
    pub customer: ChargeCustomer,
    pub metadata: ChargeMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChargeMetadata {
    pub external_id: String,
    pub source: String,
}

impl CreatePixQrCodeRequest {
    pub fn new(charge: NewPixCharge, expires_in: u32) -> Self {
        Self {
            amount: charge.amount.value(),
            description: charge.description,
            expires_in,
            customer: charge.customer,
            metadata: ChargeMetadata { external_id: charge.external_id, source: CHARGE_SOURCE.to_string() },
        }
    }
}
