use thiserror::Error;

use crate::db::traits::{OrderQueryError, PaymentGatewayError};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Database query error: {0}")]
    QueryError(String),
    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

impl From<SqliteDatabaseError> for PaymentGatewayError {
    fn from(e: SqliteDatabaseError) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}

impl From<SqliteDatabaseError> for OrderQueryError {
    fn from(e: SqliteDatabaseError) -> Self {
        OrderQueryError::DatabaseError(e.to_string())
    }
}
