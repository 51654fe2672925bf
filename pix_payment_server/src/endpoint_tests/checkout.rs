use abacatepay_tools::{AbacatePayApiError, ChargeStatus, PixCharge};
use actix_web::{http::StatusCode, test::TestRequest, web};
use chrono::{TimeZone, Utc};
use pix_payment_engine::{
    db_types::{OrderItem, PaymentMethod},
    events::EventProducers,
    OrderFlowApi,
    PaymentGatewayError,
};
use ppg_common::Centavos;
use serde_json::{json, Value};

use super::{
    helpers::{sample_order, send_request},
    mocks::{MockGateway, MockPaymentBackend},
};
use crate::routes::checkout;

fn checkout_request(items: Value) -> TestRequest {
    TestRequest::post().uri("/checkout").set_json(json!({
        "items": items,
        "customer": {"name": "Ana", "email": "ana@example.com", "cpf": "12345678900"}
    }))
}

fn sample_charge() -> PixCharge {
    PixCharge {
        id: "pix_char_123".to_string(),
        amount: Centavos::from(2580),
        status: ChargeStatus::Pending,
        dev_mode: true,
        br_code: "00020126580014br.gov.bcb.pix".to_string(),
        br_code_base64: "iVBORw0KGgo=".to_string(),
        platform_fee: Some(Centavos::from(80)),
        expires_at: Utc.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap(),
    }
}

fn register(backend: MockPaymentBackend, gateway: MockGateway) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(OrderFlowApi::new(backend, EventProducers::default())))
            .app_data(web::Data::new(gateway))
            .service(
                web::resource("/checkout")
                    .route(web::post().to(checkout::<MockPaymentBackend, MockGateway>)),
            );
    }
}

#[actix_web::test]
async fn empty_carts_are_rejected() {
    let _ = env_logger::try_init().ok();
    let req = checkout_request(json!([]));
    let (status, body) = send_request(req, register(MockPaymentBackend::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid cart"), "unexpected body: {body}");
}

#[actix_web::test]
async fn non_positive_quantities_are_rejected() {
    let _ = env_logger::try_init().ok();
    let req = checkout_request(json!([{"name": "Açaí 500ml", "quantity": 0, "unitAmount": 1290}]));
    let (status, body) = send_request(req, register(MockPaymentBackend::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid cart"), "unexpected body: {body}");
}

#[actix_web::test]
async fn checkout_returns_the_payment_code() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_insert_order().returning(|order| {
        let mut stored = sample_order();
        stored.order_id = order.order_id.clone();
        stored.total_amount = order.total_amount;
        Ok(stored)
    });
    backend.expect_insert_order_items().returning(|order, items| {
        let result = items
            .iter()
            .enumerate()
            .map(|(i, item)| OrderItem {
                id: i as i64 + 1,
                order_id: order.id,
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                unit_amount: item.unit_amount,
                quantity: item.quantity,
                total_amount: item.total(),
            })
            .collect();
        Ok(result)
    });
    backend.expect_attach_charge_to_order().times(1).returning(|order_id, charge| {
        let mut stored = sample_order();
        stored.order_id = order_id.clone();
        stored.charge_id = Some(charge.charge_id.clone());
        stored.payment_method = Some(PaymentMethod::Pix);
        Ok(stored)
    });
    let mut gateway = MockGateway::new();
    gateway.expect_create_charge().times(1).returning(|charge| {
        assert_eq!(charge.amount, Centavos::from(2580));
        assert_eq!(charge.customer.name, "Ana");
        Ok(sample_charge())
    });

    let req = checkout_request(json!([{"name": "Açaí 500ml", "quantity": 2, "unitAmount": 1290}]));
    let (status, body) = send_request(req, register(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["pixId"], "pix_char_123");
    assert_eq!(response["amount"], 2580);
    assert_eq!(response["brCode"], "00020126580014br.gov.bcb.pix");
    assert!(response["orderId"].as_str().unwrap().starts_with("ord_"));
}

#[actix_web::test]
async fn provider_failures_are_bad_gateway() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_insert_order().returning(|order| {
        let mut stored = sample_order();
        stored.order_id = order.order_id.clone();
        Ok(stored)
    });
    backend.expect_insert_order_items().returning(|_, _| Ok(vec![]));
    backend.expect_attach_charge_to_order().never();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_charge()
        .returning(|_| Err(AbacatePayApiError::QueryError { status: 500, message: "boom".to_string() }));

    let req = checkout_request(json!([{"name": "Açaí 500ml", "quantity": 2, "unitAmount": 1290}]));
    let (status, body) = send_request(req, register(backend, gateway)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY, "unexpected body: {body}");
}

#[actix_web::test]
async fn a_charge_that_cannot_be_recorded_is_still_returned() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_insert_order().returning(|order| {
        let mut stored = sample_order();
        stored.order_id = order.order_id.clone();
        Ok(stored)
    });
    backend.expect_insert_order_items().returning(|_, _| Ok(vec![]));
    backend
        .expect_attach_charge_to_order()
        .times(3)
        .returning(|_, _| Err(PaymentGatewayError::DatabaseError("disk full".to_string())));
    let mut gateway = MockGateway::new();
    gateway.expect_create_charge().returning(|_| Ok(sample_charge()));

    let req = checkout_request(json!([{"name": "Açaí 500ml", "quantity": 2, "unitAmount": 1290}]));
    let (status, body) = send_request(req, register(backend, gateway)).await;
    // Degraded success: the customer can still pay, reconciliation is manual
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["pixId"], "pix_char_123");
}

#[actix_web::test]
async fn checkout_ignores_client_supplied_totals() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_insert_order().returning(|order| {
        // Total is recomputed server-side from the lines
        assert_eq!(order.total_amount, Centavos::from(3870));
        let mut stored = sample_order();
        stored.order_id = order.order_id.clone();
        stored.total_amount = order.total_amount;
        Ok(stored)
    });
    backend.expect_insert_order_items().returning(|_, _| Ok(vec![]));
    backend.expect_attach_charge_to_order().returning(|order_id, _| {
        let mut stored = sample_order();
        stored.order_id = order_id.clone();
        Ok(stored)
    });
    let mut gateway = MockGateway::new();
    gateway.expect_create_charge().returning(|_| Ok(sample_charge()));

    let req = TestRequest::post().uri("/checkout").set_json(json!({
        "items": [{"name": "Açaí 500ml", "quantity": 3, "unitAmount": 1290}],
        "total": 1
    }));
    let (status, _) = send_request(req, register(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK);
}
