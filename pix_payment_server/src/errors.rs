use abacatepay_tools::AbacatePayApiError;
use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use pix_payment_engine::{CartError, OrderQueryError, PaymentGatewayError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Invalid cart. {0}")]
    InvalidCart(#[from] CartError),
    #[error("Invalid request. {0}")]
    InvalidRequest(String),
    #[error("Malformed payload. {0}")]
    MalformedPayload(String),
    #[error("Unauthorized. {0}")]
    Unauthorized(String),
    #[error("The order was not found. {0}")]
    OrderNotFound(String),
    #[error("Invalid server configuration. {0}")]
    Misconfigured(String),
    #[error("An error occurred on the backend of the server. {0}")]
    PersistenceError(String),
    #[error("The payment provider could not be reached. {0}")]
    PaymentGateway(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCart(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::OrderNotFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::OrderNotFound(id) => Self::OrderNotFound(id.to_string()),
            PaymentGatewayError::ChargeNotFound(id) => Self::OrderNotFound(format!("No order for charge {id}")),
            e => Self::PersistenceError(e.to_string()),
        }
    }
}

impl From<OrderQueryError> for ServerError {
    fn from(e: OrderQueryError) -> Self {
        match e {
            OrderQueryError::QueryError(msg) => Self::InvalidRequest(msg),
            OrderQueryError::DatabaseError(msg) => Self::PersistenceError(msg),
        }
    }
}

impl From<AbacatePayApiError> for ServerError {
    fn from(e: AbacatePayApiError) -> Self {
        match e {
            AbacatePayApiError::Initialization(msg) => Self::InitializeError(msg),
            e => Self::PaymentGateway(e.to_string()),
        }
    }
}
