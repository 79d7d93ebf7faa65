use thiserror::Error;

/// Outcome of a failed order placement or order read.
///
/// Domain kinds (`AccountNotFound`, `OutOfStock`, `ProductNotFound`,
/// `InvalidInput`) will fail again on retry with the same input. The
/// remaining kinds come from infrastructure and may succeed on retry.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Products out of stock: {}", .0.join(", "))]
    OutOfStock(Vec<String>),

    #[error("Products not found: {}", .0.join(", "))]
    ProductNotFound(Vec<String>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Could not persist order: {0}")]
    OrderPersistFailed(String),

    #[error("Stock ledger unavailable: {0}")]
    StockLedgerUnavailable(String),

    #[error("Order repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

impl OrderError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OrderError::OrderPersistFailed(_)
                | OrderError::StockLedgerUnavailable(_)
                | OrderError::RepositoryUnavailable(_)
                | OrderError::CatalogUnavailable(_)
        )
    }
}

/// Failure reported by the stock ledger or the order repository.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a remote collaborator (account or catalog service).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Not found")]
    NotFound,
    #[error("Request timed out")]
    Timeout,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Unexpected response status {0}")]
    Status(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_stock_display_lists_ids() {
        let err = OrderError::OutOfStock(vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(err.to_string(), "Products out of stock: p1, p2");
    }

    #[test]
    fn domain_errors_are_not_retryable() {
        assert!(!OrderError::AccountNotFound("a".to_string()).is_retryable());
        assert!(!OrderError::OutOfStock(vec![]).is_retryable());
        assert!(!OrderError::ProductNotFound(vec![]).is_retryable());
        assert!(!OrderError::InvalidInput("x".to_string()).is_retryable());
    }

    #[test]
    fn infrastructure_errors_are_retryable() {
        assert!(OrderError::StockLedgerUnavailable("down".to_string()).is_retryable());
        assert!(OrderError::RepositoryUnavailable("down".to_string()).is_retryable());
        assert!(OrderError::OrderPersistFailed("down".to_string()).is_retryable());
        assert!(OrderError::CatalogUnavailable("down".to_string()).is_retryable());
    }
}
