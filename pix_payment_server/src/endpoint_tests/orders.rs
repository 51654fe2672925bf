use actix_web::{http::StatusCode, test::TestRequest, web};
use pix_payment_engine::{
    db_types::{OrderItem, OrderStatusType},
    OrderQueryApi,
};
use ppg_common::Centavos;
use serde_json::Value;

use super::{
    helpers::{sample_order, send_request, test_config, TEST_ADMIN_KEY},
    mocks::MockOrderQueryBackend,
};
use crate::{
    config::ServerConfig,
    routes::{order_by_id, orders_search},
};

fn register(backend: MockOrderQueryBackend, config: ServerConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(OrderQueryApi::new(backend)))
            .app_data(web::Data::new(config))
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/orders").route(web::get().to(orders_search::<MockOrderQueryBackend>)),
                    )
                    .service(
                        web::resource("/orders/{order_id}")
                            .route(web::get().to(order_by_id::<MockOrderQueryBackend>)),
                    ),
            );
    }
}

fn get(path: &str, api_key: Option<&str>) -> TestRequest {
    let mut req = TestRequest::get().uri(path);
    if let Some(key) = api_key {
        req = req.insert_header(("X-Api-Key", key));
    }
    req
}

#[actix_web::test]
async fn unconfigured_admin_endpoints_fail_closed() {
    let _ = env_logger::try_init().ok();
    let req = get("/api/orders", Some(TEST_ADMIN_KEY));
    let (status, _) = send_request(req, register(MockOrderQueryBackend::new(), ServerConfig::default())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn a_missing_or_wrong_api_key_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let req = get("/api/orders", None);
    let (status, _) = send_request(req, register(MockOrderQueryBackend::new(), test_config())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = get("/api/orders", Some("wrong"));
    let (status, _) = send_request(req, register(MockOrderQueryBackend::new(), test_config())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn order_searches_pass_the_filters_through() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockOrderQueryBackend::new();
    backend.expect_search_orders().times(1).returning(|query| {
        assert_eq!(query.statuses, vec![OrderStatusType::Pending, OrderStatusType::Paid]);
        assert_eq!(query.limit, Some(10));
        let mut paid = sample_order();
        paid.status = OrderStatusType::Paid;
        Ok(vec![sample_order(), paid])
    });
    let req = get("/api/orders?status=Pending,Paid&limit=10", Some(TEST_ADMIN_KEY));
    let (status, body) = send_request(req, register(backend, test_config())).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["orders"].as_array().unwrap().len(), 2);
    assert_eq!(response["total_orders"], 5160);
}

#[actix_web::test]
async fn an_invalid_status_filter_is_rejected() {
    let _ = env_logger::try_init().ok();
    let req = get("/api/orders?status=Banana", Some(TEST_ADMIN_KEY));
    let (status, _) = send_request(req, register(MockOrderQueryBackend::new(), test_config())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn single_orders_come_with_their_items() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockOrderQueryBackend::new();
    backend.expect_fetch_order_by_order_id().times(1).returning(|order_id| {
        let mut order = sample_order();
        order.order_id = order_id.clone();
        Ok(Some(order))
    });
    backend.expect_fetch_order_items().times(1).returning(|order| {
        Ok(vec![OrderItem {
            id: 1,
            order_id: order.id,
            product_id: None,
            name: "Açaí 500ml".to_string(),
            unit_amount: Centavos::from(1290),
            quantity: 2,
            total_amount: Centavos::from(2580),
        }])
    });
    let req = get("/api/orders/ord_0123456789abcdef0123456789abcdef", Some(TEST_ADMIN_KEY));
    let (status, body) = send_request(req, register(backend, test_config())).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {body}");
    let response = serde_json::from_str::<Value>(&body).unwrap();
    assert_eq!(response["order"]["customer_email"], "ana@example.com");
    assert_eq!(response["items"][0]["name"], "Açaí 500ml");
}

#[actix_web::test]
async fn a_missing_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut backend = MockOrderQueryBackend::new();
    backend.expect_fetch_order_by_order_id().times(1).returning(|_| Ok(None));
    let req = get("/api/orders/ord_doesnotexist", Some(TEST_ADMIN_KEY));
    let (status, _) = send_request(req, register(backend, test_config())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
