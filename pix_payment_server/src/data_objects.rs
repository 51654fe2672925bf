use abacatepay_tools::{ChargeCustomer, ChargeStatus};
use chrono::{DateTime, Utc};
use pix_payment_engine::db_types::{CustomerInfo, NewOrderItem, OrderId};
use ppg_common::Centavos;
use serde::{Deserialize, Serialize};

//--------------------------------------      Checkout      ----------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub customer: Option<CheckoutCustomer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default)]
    pub product_id: Option<String>,
    pub name: String,
    pub quantity: i64,
    /// Unit price in centavos.
    pub unit_amount: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutCustomer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// The storefront sends this as `cpf`; older clients use `taxId`.
    #[serde(default, alias = "cpf", alias = "taxId")]
    pub tax_id: Option<String>,
}

impl CheckoutRequest {
    pub fn into_parts(self) -> (CustomerInfo, Vec<NewOrderItem>) {
        let customer = self.customer.unwrap_or_default();
        let customer = CustomerInfo {
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            tax_id: customer.tax_id,
        };
        let items = self
            .items
            .into_iter()
            .map(|i| NewOrderItem {
                product_id: i.product_id,
                name: i.name,
                unit_amount: Centavos::from(i.unit_amount),
                quantity: i.quantity,
            })
            .collect();
        (customer, items)
    }
}

/// The provider wants plain strings for the customer block, so absent contact fields go over the wire empty.
pub fn charge_customer(info: &CustomerInfo) -> ChargeCustomer {
    ChargeCustomer {
        name: info.name.clone().unwrap_or_default(),
        cellphone: info.phone.clone().unwrap_or_default(),
        email: info.email.clone().unwrap_or_default(),
        tax_id: info.tax_id.clone().unwrap_or_default(),
    }
}

/// Everything the storefront needs to render the PIX payment screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub pix_id: String,
    pub br_code: String,
    pub br_code_base64: String,
    pub amount: Centavos,
    pub order_id: OrderId,
    pub expires_at: DateTime<Utc>,
}

//--------------------------------------    Payment check   ----------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCheckRequest {
    #[serde(default)]
    pub pix_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCheckResponse {
    pub status: ChargeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub pix_id: String,
}

//--------------------------------------      Webhook       ----------------------------------------------------------
/// The provider's `billing.paid` notification. Every field the reconciliation does not strictly need is optional, so
/// that benign payload evolution never bounces a webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
    #[serde(default)]
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookData {
    #[serde(default)]
    pub payment: Option<WebhookPayment>,
    #[serde(default)]
    pub billing: Option<WebhookBilling>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayment {
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub fee: Option<i64>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookBilling {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub paid_amount: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookQuery {
    #[serde(default, rename = "webhookSecret")]
    pub webhook_secret: Option<String>,
}
