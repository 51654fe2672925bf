use abacatepay_tools::{AbacatePayApiError, NewPixCharge, PixCharge, PixChargeStatus, PixGateway};
use chrono::{DateTime, Utc};
use mockall::mock;
use pix_payment_engine::{
    db_types::{ChargeDetails, NewOrder, NewOrderItem, Order, OrderId, OrderItem, PaymentReceived},
    OrderManagement,
    OrderQueryError,
    OrderQueryFilter,
    PaymentGatewayDatabase,
    PaymentGatewayError,
    PaymentOutcome,
};

mock! {
    pub PaymentBackend {}
    impl PaymentGatewayDatabase for PaymentBackend {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, PaymentGatewayError>;
        async fn insert_order_items(&self, order: &Order, items: &[NewOrderItem]) -> Result<Vec<OrderItem>, PaymentGatewayError>;
        async fn attach_charge_to_order(&self, order_id: &OrderId, charge: &ChargeDetails) -> Result<Order, PaymentGatewayError>;
        async fn mark_order_paid_by_charge_id(&self, charge_id: &str, payment: &PaymentReceived) -> Result<Option<PaymentOutcome>, PaymentGatewayError>;
        async fn expire_pending_orders_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>, PaymentGatewayError>;
        async fn close(&mut self) -> Result<(), PaymentGatewayError>;
    }
}

mock! {
    pub OrderQueryBackend {}
    impl OrderManagement for OrderQueryBackend {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_order_by_charge_id(&self, charge_id: &str) -> Result<Option<Order>, OrderQueryError>;
        async fn fetch_order_items(&self, order: &Order) -> Result<Vec<OrderItem>, OrderQueryError>;
        async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError>;
    }
}

mock! {
    pub Gateway {}
    impl PixGateway for Gateway {
        async fn create_charge(&self, charge: NewPixCharge) -> Result<PixCharge, AbacatePayApiError>;
        async fn get_charge(&self, charge_id: &str) -> Result<PixChargeStatus, AbacatePayApiError>;
    }
}
