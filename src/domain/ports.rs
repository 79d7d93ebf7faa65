use async_trait::async_trait;

use super::errors::{ClientError, StoreError};
use super::order::{Account, Order, Product};
use super::stock::AdjustmentBatch;

/// Durable storage of order aggregates. Implementations block; async callers
/// run them on the blocking pool.
pub trait OrderRepository: Send + Sync + 'static {
    /// Writes the header and every line item in one transaction.
    fn put_order(&self, order: &Order) -> Result<(), StoreError>;

    /// All orders of `account_id`, ordered by order id ascending. Line items
    /// carry only product id and quantity.
    fn orders_for_account(&self, account_id: &str) -> Result<Vec<Order>, StoreError>;
}

/// Authoritative per-product stock counters.
#[async_trait]
pub trait StockLedger: Send + Sync + 'static {
    /// Applies `batch` atomically with respect to every other caller.
    ///
    /// Returns the ids of decrements that would drive their counter below
    /// zero, in batch order. When that list is non-empty nothing in the batch
    /// was applied. Restock entries are never rejected.
    async fn adjust_stock(&self, batch: &AdjustmentBatch) -> Result<Vec<String>, StoreError>;

    /// Current counters in input order; unknown products read as zero.
    async fn check_stock(&self, product_ids: &[String]) -> Result<Vec<i64>, StoreError>;
}

#[async_trait]
pub trait AccountDirectory: Send + Sync + 'static {
    async fn get_account(&self, id: &str) -> Result<Account, ClientError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync + 'static {
    /// Products matching `ids`. Unknown ids are omitted, not reported.
    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>, ClientError>;

    async fn get_products(&self, skip: u64, take: u64) -> Result<Vec<Product>, ClientError>;

    async fn search_products(
        &self,
        query: &str,
        skip: u64,
        take: u64,
    ) -> Result<Vec<Product>, ClientError>;
}
