use actix_web::{http::StatusCode, test::TestRequest, web};
use pix_payment_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    OrderFlowApi,
    PaymentOutcome,
};
use ppg_common::Centavos;
use serde_json::{json, Value};

use super::{
    helpers::{sample_order, send_request, test_config, TEST_WEBHOOK_SECRET},
    mocks::MockPaymentBackend,
};
use crate::{config::ServerConfig, routes::webhook};

fn paid_event(billing_id: &str) -> Value {
    json!({
        "event": "billing.paid",
        "data": {
            "payment": {"amount": 2580, "fee": 80, "method": "PIX"},
            "billing": {"id": billing_id, "paidAmount": 2580}
        },
        "devMode": false
    })
}

fn webhook_request(secret: Option<&str>, body: Value) -> TestRequest {
    let uri = match secret {
        Some(s) => format!("/webhook/abacatepay?webhookSecret={s}"),
        None => "/webhook/abacatepay".to_string(),
    };
    TestRequest::post().uri(&uri).set_json(body)
}

fn register(backend: MockPaymentBackend, config: ServerConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(OrderFlowApi::new(backend, EventProducers::default())))
            .app_data(web::Data::new(config))
            .service(web::resource("/webhook/abacatepay").route(web::post().to(webhook::<MockPaymentBackend>)));
    }
}

#[actix_web::test]
async fn an_unconfigured_webhook_fails_closed() {
    let _ = env_logger::try_init().ok();
    let backend = MockPaymentBackend::new();
    let req = webhook_request(Some(TEST_WEBHOOK_SECRET), paid_event("pix_char_123"));
    let (status, _) = send_request(req, register(backend, ServerConfig::default())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn a_missing_or_wrong_secret_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let req = webhook_request(None, paid_event("pix_char_123"));
    let (status, _) = send_request(req, register(MockPaymentBackend::new(), test_config())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = webhook_request(Some("wrong"), paid_event("pix_char_123"));
    let (status, _) = send_request(req, register(MockPaymentBackend::new(), test_config())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn other_events_are_acknowledged_and_ignored() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_mark_order_paid_by_charge_id().never();
    let body = json!({"event": "billing.created", "data": {}, "devMode": false});
    let req = webhook_request(Some(TEST_WEBHOOK_SECRET), body);
    let (status, body) = send_request(req, register(backend, test_config())).await;
    assert_eq!(status, StatusCode::OK);
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["received"], true);
    assert_eq!(response["ignored"], true);
}

#[actix_web::test]
async fn a_paid_event_without_a_billing_id_is_malformed() {
    let _ = env_logger::try_init().ok();
    let body = json!({"event": "billing.paid", "data": {"payment": {"amount": 2580}}, "devMode": false});
    let req = webhook_request(Some(TEST_WEBHOOK_SECRET), body);
    let (status, body) = send_request(req, register(MockPaymentBackend::new(), test_config())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected body: {body}");
}

#[actix_web::test]
async fn an_unmatched_charge_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_mark_order_paid_by_charge_id().times(1).returning(|_, _| Ok(None));
    let req = webhook_request(Some(TEST_WEBHOOK_SECRET), paid_event("pix_char_void"));
    let (status, _) = send_request(req, register(backend, test_config())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn a_paid_event_marks_the_order_paid() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_mark_order_paid_by_charge_id().times(1).returning(|charge_id, payment| {
        assert_eq!(charge_id, "pix_char_123");
        assert_eq!(payment.amount, Some(Centavos::from(2580)));
        assert_eq!(payment.fee, Some(Centavos::from(80)));
        let mut order = sample_order();
        order.status = OrderStatusType::Paid;
        order.paid_amount = payment.amount;
        order.charge_id = Some(charge_id.to_string());
        Ok(Some(PaymentOutcome::NewlyPaid(order)))
    });
    let req = webhook_request(Some(TEST_WEBHOOK_SECRET), paid_event("pix_char_123"));
    let (status, body) = send_request(req, register(backend, test_config())).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["received"], true);
    assert_eq!(response["status"], "paid");
    assert!(response["orderId"].as_str().unwrap().starts_with("ord_"));
}

#[actix_web::test]
async fn redeliveries_are_acknowledged_as_successes() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_mark_order_paid_by_charge_id().times(1).returning(|charge_id, payment| {
        let mut order = sample_order();
        order.status = OrderStatusType::Paid;
        order.paid_amount = payment.amount;
        order.charge_id = Some(charge_id.to_string());
        Ok(Some(PaymentOutcome::AlreadyPaid(order)))
    });
    let req = webhook_request(Some(TEST_WEBHOOK_SECRET), paid_event("pix_char_123"));
    let (status, body) = send_request(req, register(backend, test_config())).await;
    assert_eq!(status, StatusCode::OK);
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["status"], "paid");
}

#[actix_web::test]
async fn cancelled_orders_are_not_resurrected() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_mark_order_paid_by_charge_id().times(1).returning(|charge_id, _| {
        let mut order = sample_order();
        order.status = OrderStatusType::Cancelled;
        order.charge_id = Some(charge_id.to_string());
        Ok(Some(PaymentOutcome::NotPayable(order)))
    });
    let req = webhook_request(Some(TEST_WEBHOOK_SECRET), paid_event("pix_char_123"));
    let (status, body) = send_request(req, register(backend, test_config())).await;
    assert_eq!(status, StatusCode::OK);
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["status"], "cancelled");
}
