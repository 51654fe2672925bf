use abacatepay_tools::{AbacatePayApiError, ChargeStatus, PixChargeStatus};
use actix_web::{http::StatusCode, test::TestRequest, web};
use chrono::{TimeZone, Utc};
use pix_payment_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    OrderFlowApi,
    PaymentOutcome,
};
use serde_json::{json, Value};

use super::{
    helpers::{sample_order, send_request},
    mocks::{MockGateway, MockPaymentBackend},
};
use crate::routes::payment_check;

fn register(backend: MockPaymentBackend, gateway: MockGateway) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(OrderFlowApi::new(backend, EventProducers::default())))
            .app_data(web::Data::new(gateway))
            .service(
                web::resource("/payment/check")
                    .route(web::post().to(payment_check::<MockPaymentBackend, MockGateway>)),
            );
    }
}

fn check_request(pix_id: &str) -> TestRequest {
    TestRequest::post().uri("/payment/check").set_json(json!({ "pixId": pix_id }))
}

#[actix_web::test]
async fn a_missing_pix_id_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(check_request(""), register(MockPaymentBackend::new(), MockGateway::new())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("pixId is required"), "unexpected body: {body}");
}

#[actix_web::test]
async fn provider_failures_are_bad_gateway() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_get_charge()
        .returning(|_| Err(AbacatePayApiError::RestResponseError("connection reset".to_string())));
    let (status, _) = send_request(check_request("pix_char_123"), register(MockPaymentBackend::new(), gateway)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn a_pending_charge_does_not_touch_the_store() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_mark_order_paid_by_charge_id().never();
    let mut gateway = MockGateway::new();
    let expires = Utc.with_ymd_and_hms(2026, 3, 14, 13, 0, 0).unwrap();
    gateway
        .expect_get_charge()
        .returning(move |_| Ok(PixChargeStatus { status: ChargeStatus::Pending, expires_at: Some(expires) }));

    let (status, body) = send_request(check_request("pix_char_123"), register(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["status"], "PENDING");
    assert_eq!(response["pixId"], "pix_char_123");
}

#[actix_web::test]
async fn a_paid_charge_marks_the_local_order_paid() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_mark_order_paid_by_charge_id().times(1).returning(|charge_id, payment| {
        assert_eq!(charge_id, "pix_char_123");
        // The poller knows neither the amount nor the fee
        assert_eq!(payment.amount, None);
        assert_eq!(payment.fee, None);
        let mut order = sample_order();
        order.status = OrderStatusType::Paid;
        order.charge_id = Some(charge_id.to_string());
        Ok(Some(PaymentOutcome::NewlyPaid(order)))
    });
    let mut gateway = MockGateway::new();
    gateway
        .expect_get_charge()
        .returning(|_| Ok(PixChargeStatus { status: ChargeStatus::Paid, expires_at: None }));

    let (status, body) = send_request(check_request("pix_char_123"), register(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["status"], "PAID");
}

#[actix_web::test]
async fn a_paid_charge_with_no_local_order_still_reports_the_status() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockPaymentBackend::new();
    backend.expect_mark_order_paid_by_charge_id().times(1).returning(|_, _| Ok(None));
    let mut gateway = MockGateway::new();
    gateway
        .expect_get_charge()
        .returning(|_| Ok(PixChargeStatus { status: ChargeStatus::Paid, expires_at: None }));

    let (status, body) = send_request(check_request("pix_char_orphan"), register(backend, gateway)).await;
    assert_eq!(status, StatusCode::OK);
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["status"], "PAID");
}
