//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the backend and gateway traits so the endpoint tests can substitute mocks; the server
//! registers them with the concrete `SqliteDatabase` / `AbacatePayApi` types in [`crate::server`].
use abacatepay_tools::{ChargeStatus, NewPixCharge, PixGateway, CHARGE_SOURCE};
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use pix_payment_engine::{
    db_types::{ChargeDetails, OrderId, OrderStatusType, PaymentMethod, PaymentReceived},
    new_order_from_cart,
    OrderFlowApi,
    OrderManagement,
    OrderQueryApi,
    OrderQueryFilter,
    PaymentGatewayDatabase,
    PaymentOutcome,
};
use ppg_common::Centavos;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::ServerConfig,
    data_objects::{
        charge_customer,
        CheckoutRequest,
        CheckoutResponse,
        PaymentCheckRequest,
        PaymentCheckResponse,
        WebhookPayload,
        WebhookQuery,
    },
    errors::ServerError,
    helpers::get_remote_ip,
};

/// How many times checkout retries recording a freshly created charge against its order before giving up and
/// returning the charge anyway.
const MAX_ATTACH_ATTEMPTS: usize = 3;

#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//--------------------------------------      Checkout      ----------------------------------------------------------

/// Route handler for the checkout endpoint.
///
/// Validates the cart, creates a `Pending` order with its line item snapshots, asks the provider for a PIX charge
/// over the computed total, and records the charge against the order. The response carries everything the
/// storefront needs to render the payment screen.
///
/// A provider failure aborts the request with a 502 and leaves the pending order behind for the expiry sweep. If the
/// charge was created but could not be recorded locally, the charge is still returned to the caller so the customer
/// can pay; reconciliation of that order is manual.
pub async fn checkout<B: PaymentGatewayDatabase, P: PixGateway>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<P>,
) -> Result<HttpResponse, ServerError> {
    let (customer, items) = body.into_inner().into_parts();
    let (new_order, items) = new_order_from_cart(customer.clone(), items)?;
    let new_order = new_order.with_metadata(json!({ "source": CHARGE_SOURCE }));
    let created = api.create_pending_order(new_order, items).await?;
    let order_id = created.order.order_id.clone();
    debug!("💻️ Checkout created order {order_id} for {}", created.order.total_amount);

    let charge_request = NewPixCharge {
        amount: created.order.total_amount,
        description: format!("Pedido {}", order_id.as_str()),
        customer: charge_customer(&customer),
        external_id: order_id.as_str().to_string(),
    };
    let charge = gateway.create_charge(charge_request).await.map_err(|e| {
        warn!("💻️ Could not create a PIX charge for order {order_id}. {e}");
        ServerError::from(e)
    })?;

    let details = ChargeDetails {
        charge_id: charge.id.clone(),
        payment_method: PaymentMethod::Pix,
        dev_mode: charge.dev_mode,
        metadata: json!({
            "source": CHARGE_SOURCE,
            "brCode": charge.br_code,
            "brCodeBase64": charge.br_code_base64,
            "expiresAt": charge.expires_at,
        }),
    };
    let mut attached = false;
    for attempt in 1..=MAX_ATTACH_ATTEMPTS {
        match api.attach_charge(&order_id, details.clone()).await {
            Ok(_) => {
                attached = true;
                break;
            },
            Err(e) => {
                warn!("💻️ Attempt {attempt}/{MAX_ATTACH_ATTEMPTS} to record charge {} on order {order_id} failed. {e}", charge.id);
            },
        }
    }
    if !attached {
        error!(
            "💻️ Charge {} was created at the provider but could NOT be recorded against order {order_id}. The \
             customer can still pay. This order needs manual reconciliation.",
            charge.id
        );
    }

    let response = CheckoutResponse {
        pix_id: charge.id,
        br_code: details.metadata["brCode"].as_str().unwrap_or_default().to_string(),
        br_code_base64: details.metadata["brCodeBase64"].as_str().unwrap_or_default().to_string(),
        amount: created.order.total_amount,
        order_id,
        expires_at: charge.expires_at,
    };
    Ok(HttpResponse::Ok().json(response))
}

//--------------------------------------    Payment check   ----------------------------------------------------------

/// Route handler for the payment status poll.
///
/// The storefront calls this while the customer stares at the QR code. It asks the provider for the charge's current
/// status; when the provider says `PAID`, the local order is marked paid through the same idempotent update the
/// webhook uses, so whichever of the two lands first wins and the other converges.
pub async fn payment_check<B: PaymentGatewayDatabase, P: PixGateway>(
    body: web::Json<PaymentCheckRequest>,
    api: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<P>,
) -> Result<HttpResponse, ServerError> {
    let pix_id = body.into_inner().pix_id;
    if pix_id.trim().is_empty() {
        return Err(ServerError::InvalidRequest("pixId is required".to_string()));
    }
    debug!("💻️ Payment check for charge {pix_id}");
    let charge = gateway.get_charge(&pix_id).await.map_err(|e| {
        debug!("💻️ Could not fetch charge {pix_id} from the provider. {e}");
        ServerError::from(e)
    })?;
    if charge.status == ChargeStatus::Paid {
        let payment =
            PaymentReceived { amount: None, fee: None, method: Some(PaymentMethod::Pix), dev_mode: None };
        match api.confirm_payment(&pix_id, payment).await? {
            Some(_) => {},
            None => warn!("💻️ Provider reports charge {pix_id} as paid, but no local order carries it."),
        }
    }
    let response = PaymentCheckResponse { status: charge.status, expires_at: charge.expires_at, pix_id };
    Ok(HttpResponse::Ok().json(response))
}

//--------------------------------------      Webhook       ----------------------------------------------------------

/// Route handler for AbacatePay's payment notifications.
///
/// The provider appends the shared secret as a `?webhookSecret=` query parameter. No secret configured server-side
/// means every call is rejected (fail closed). Only `billing.paid` events carry side effects; everything else is
/// acknowledged and ignored. Redeliveries converge on the same row and are acknowledged as successes.
pub async fn webhook<B: PaymentGatewayDatabase>(
    req: HttpRequest,
    query: web::Query<WebhookQuery>,
    body: web::Json<WebhookPayload>,
    api: web::Data<OrderFlowApi<B>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    let remote_ip = get_remote_ip(&req, config.use_x_forwarded_for, config.use_forwarded);
    let expected = config
        .webhook_secret
        .as_ref()
        .ok_or_else(|| ServerError::Misconfigured("No webhook secret has been configured".to_string()))?;
    let supplied = query.into_inner().webhook_secret.unwrap_or_default();
    if &supplied != expected.reveal() {
        warn!("💻️ Webhook call from {remote_ip:?} with a missing or invalid secret");
        return Err(ServerError::Unauthorized("Invalid webhook secret".to_string()));
    }

    let payload = body.into_inner();
    if payload.event != "billing.paid" {
        debug!("💻️ Ignoring webhook event {} from {remote_ip:?}", payload.event);
        return Ok(HttpResponse::Ok().json(json!({ "received": true, "ignored": true })));
    }

    let billing = payload.data.billing.unwrap_or_default();
    let charge_id = billing
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ServerError::MalformedPayload("billing.paid event carries no billing id".to_string()))?;
    let payment_info = payload.data.payment.unwrap_or_default();
    let payment = PaymentReceived {
        amount: payment_info.amount.or(billing.paid_amount).map(Centavos::from),
        fee: payment_info.fee.map(Centavos::from),
        method: payment_info.method.as_deref().and_then(|m| m.parse().ok()),
        dev_mode: Some(payload.dev_mode),
    };
    info!("💻️ Payment notification for charge {charge_id} from {remote_ip:?}");
    let outcome = api.confirm_payment(&charge_id, payment).await?.ok_or_else(|| {
        error!("💻️ Payment notification for charge {charge_id}, but no order carries that charge. This needs a human.");
        ServerError::OrderNotFound(format!("No order for charge {charge_id}"))
    })?;
    let (order, status) = match outcome {
        PaymentOutcome::NewlyPaid(o) | PaymentOutcome::AlreadyPaid(o) => (o, "paid"),
        PaymentOutcome::NotPayable(o) => (o, "cancelled"),
    };
    Ok(HttpResponse::Ok().json(json!({ "received": true, "orderId": order.order_id, "status": status })))
}

//--------------------------------------    Admin queries   ----------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminOrderParams {
    /// Comma-separated list of statuses to include, e.g. `Pending,Paid`.
    pub status: Option<String>,
    pub customer_email: Option<String>,
    pub limit: Option<i64>,
}

fn check_admin_key(req: &HttpRequest, config: &ServerConfig) -> Result<(), ServerError> {
    let expected = config
        .admin_api_key
        .as_ref()
        .ok_or_else(|| ServerError::Misconfigured("No admin API key has been configured".to_string()))?;
    let supplied = req.headers().get("X-Api-Key").and_then(|v| v.to_str().ok()).unwrap_or_default();
    if supplied != expected.reveal() {
        return Err(ServerError::Unauthorized("Invalid API key".to_string()));
    }
    Ok(())
}

/// Back-office order search. Guarded by the `X-Api-Key` header.
pub async fn orders_search<B: OrderManagement>(
    req: HttpRequest,
    params: web::Query<AdminOrderParams>,
    api: web::Data<OrderQueryApi<B>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    check_admin_key(&req, config.as_ref())?;
    let params = params.into_inner();
    let mut query = OrderQueryFilter::default();
    if let Some(statuses) = params.status {
        for status in statuses.split(',').filter(|s| !s.trim().is_empty()) {
            let status = status
                .trim()
                .parse::<OrderStatusType>()
                .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
            query = query.with_status(status);
        }
    }
    if let Some(email) = params.customer_email {
        query = query.with_customer_email(email);
    }
    if let Some(limit) = params.limit {
        query = query.with_limit(limit);
    }
    debug!("💻️ GET orders with filter: {query}");
    let result = api.search_orders(query).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Back-office single-order fetch, with line items. Guarded by the `X-Api-Key` header.
pub async fn order_by_id<B: OrderManagement>(
    req: HttpRequest,
    path: web::Path<OrderId>,
    api: web::Data<OrderQueryApi<B>>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError> {
    check_admin_key(&req, config.as_ref())?;
    let order_id = path.into_inner();
    debug!("💻️ GET order_by_id({order_id})");
    let result = api
        .fetch_order_with_items(&order_id)
        .await?
        .ok_or_else(|| ServerError::OrderNotFound(order_id.to_string()))?;
    Ok(HttpResponse::Ok().json(result))
}
