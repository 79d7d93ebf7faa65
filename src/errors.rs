use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

use crate::domain::errors::{OrderError, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Out of stock")]
    OutOfStock(Vec<String>),

    #[error("{0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::InvalidInput(_) => AppError::BadRequest(e.to_string()),
            OrderError::AccountNotFound(_) | OrderError::ProductNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            OrderError::OutOfStock(ids) => AppError::OutOfStock(ids),
            OrderError::StockLedgerUnavailable(_)
            | OrderError::RepositoryUnavailable(_)
            | OrderError::CatalogUnavailable(_) => AppError::Unavailable(e.to_string()),
            OrderError::OrderPersistFailed(msg) => AppError::Internal(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidInput(msg) => AppError::BadRequest(msg),
            StoreError::Unavailable(msg) => AppError::Unavailable(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::OutOfStock(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::OutOfStock(ids) => json!({
                "error": self.to_string(),
                "out_of_stock": ids
            }),
            AppError::Unavailable(_) => json!({
                "error": "Service temporarily unavailable",
                "retryable": true
            }),
            AppError::Internal(_) => json!({
                "error": "Internal server error",
                "retryable": true
            }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
