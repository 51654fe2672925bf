use std::{future::Future, pin::Pin, time::Duration};

use abacatepay_tools::AbacatePayApi;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use pix_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers, OrderPaidEvent},
    OrderFlowApi,
    OrderQueryApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    routes::{checkout, health, order_by_id, orders_search, payment_check, webhook},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;

    let mut hooks = EventHooks::default();
    hooks.on_order_paid(|ev: OrderPaidEvent| {
        Box::pin(async move {
            info!("💸️ Order {} has been paid in full", ev.order.order_id);
        }) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    let handlers = EventHandlers::new(25, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let _expiry_handle = start_expiry_worker(db.clone(), producers.clone(), config.unpaid_order_timeout);

    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let gateway = AbacatePayApi::new(config.abacatepay.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let flow_api = OrderFlowApi::new(db.clone(), producers.clone());
        let query_api = OrderQueryApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pps::access_log"))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(query_api))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(config.clone()));
        let admin_scope = web::scope("/api")
            .service(
                web::resource("/orders").route(web::get().to(orders_search::<SqliteDatabase>)),
            )
            .service(
                web::resource("/orders/{order_id}").route(web::get().to(order_by_id::<SqliteDatabase>)),
            );
        app.service(health)
            .service(
                web::resource("/checkout")
                    .route(web::post().to(checkout::<SqliteDatabase, AbacatePayApi>)),
            )
            .service(
                web::resource("/payment/check")
                    .route(web::post().to(payment_check::<SqliteDatabase, AbacatePayApi>)),
            )
            .service(
                web::resource("/webhook/abacatepay").route(web::post().to(webhook::<SqliteDatabase>)),
            )
            .service(admin_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
