mod order_management;
mod payment_gateway_database;

pub use order_management::{OrderManagement, OrderQueryError};
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError};
