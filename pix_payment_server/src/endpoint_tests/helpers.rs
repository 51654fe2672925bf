use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use pix_payment_engine::db_types::{Order, OrderId, OrderStatusType};
use ppg_common::{Centavos, Secret};

use crate::config::ServerConfig;

pub const TEST_WEBHOOK_SECRET: &str = "hook-s3cret";
pub const TEST_ADMIN_KEY: &str = "admin-s3cret";

/// A server config with both shared secrets set, for testing the guarded endpoints.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        webhook_secret: Some(Secret::new(TEST_WEBHOOK_SECRET.to_string())),
        admin_api_key: Some(Secret::new(TEST_ADMIN_KEY.to_string())),
        ..ServerConfig::default()
    }
}

/// Builds an app from the given service configuration, fires the request at it, and returns status and body.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    let (_, res) = test::call_service(&service, req.to_request()).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

/// A stored order as the backend would return it.
pub fn sample_order() -> Order {
    let ts = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
    Order {
        id: 1,
        order_id: OrderId("ord_0123456789abcdef0123456789abcdef".to_string()),
        status: OrderStatusType::Pending,
        total_amount: Centavos::from(2580),
        paid_amount: None,
        fee: None,
        payment_method: None,
        charge_id: None,
        customer_name: Some("Ana".to_string()),
        customer_email: Some("ana@example.com".to_string()),
        customer_phone: None,
        customer_tax_id: None,
        dev_mode: false,
        metadata: None,
        created_at: ts,
        updated_at: ts,
    }
}
