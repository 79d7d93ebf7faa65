use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::{ClientError, OrderError, StoreError};
use crate::domain::order::{Order, OrderedProduct, Product, ProductQuantity};
use crate::domain::ports::{AccountDirectory, OrderRepository, ProductCatalog, StockLedger};
use crate::domain::stock::AdjustmentBatch;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(3);

/// Most distinct products one order may hold. Keeps the line insert under
/// the Postgres bind-parameter limit.
pub const MAX_ORDER_LINES: usize = 1000;

/// Largest quantity one line may carry; the repository stores it as `INTEGER`.
pub const MAX_LINE_QUANTITY: u32 = i32::MAX as u32;

/// Places orders and reads them back.
///
/// Holds no mutable state of its own; every collaborator is injected. Each
/// placement runs the steps below and stops at the first failure:
///
/// 1. the account must exist,
/// 2. stock for every product is reserved in one all-or-nothing batch,
/// 3. prices are resolved from the catalog,
/// 4. line items are assembled and the total computed,
/// 5. the order is persisted.
///
/// Nothing is compensated. Stock reserved in step 2 stays reserved if step 3
/// or later fails, and a retried request places a second order.
#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    ledger: Arc<dyn StockLedger>,
    accounts: Arc<dyn AccountDirectory>,
    catalog: Arc<dyn ProductCatalog>,
    call_timeout: Duration,
}

impl OrderService {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        ledger: Arc<dyn StockLedger>,
        accounts: Arc<dyn AccountDirectory>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> Self {
        Self {
            repo,
            ledger,
            accounts,
            catalog,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Upper bound for each account, ledger and catalog call.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub async fn place_order(
        &self,
        account_id: &str,
        requested: Vec<ProductQuantity>,
    ) -> Result<Order, OrderError> {
        let requested = coalesce(requested)?;

        // 1. Validate account
        if let Err(e) = self.bounded(self.accounts.get_account(account_id)).await {
            log::warn!("order rejected, account '{}' lookup failed: {}", account_id, e);
            return Err(OrderError::AccountNotFound(account_id.to_string()));
        }

        // 2. Reserve stock
        let batch = AdjustmentBatch::reservation(
            requested
                .iter()
                .map(|r| (r.product_id.as_str(), r.quantity)),
        )
        .map_err(|e| OrderError::InvalidInput(e.to_string()))?;

        let rejected = self
            .bounded_store(self.ledger.adjust_stock(&batch))
            .await
            .map_err(|e| {
                log::error!("stock reservation failed: {}", e);
                OrderError::StockLedgerUnavailable(e.to_string())
            })?;
        if !rejected.is_empty() {
            log::warn!("order rejected, out of stock: {:?}", rejected);
            return Err(OrderError::OutOfStock(rejected));
        }
        log::debug!("reserved {} products for account '{}'", batch.len(), account_id);

        // 3. Resolve pricing
        let ids: Vec<String> = requested.iter().map(|r| r.product_id.clone()).collect();
        let resolved = self
            .bounded(self.catalog.get_products_by_ids(&ids))
            .await
            .map_err(|e| {
                log::error!("price lookup failed after reservation: {}", e);
                OrderError::CatalogUnavailable(e.to_string())
            })?;
        let by_id: HashMap<&str, &Product> =
            resolved.iter().map(|p| (p.id.as_str(), p)).collect();

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !by_id.contains_key(id.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            log::warn!("order rejected, unknown products: {:?}", missing);
            return Err(OrderError::ProductNotFound(missing));
        }

        // 4. Assemble line items
        let lines: Vec<OrderedProduct> = requested
            .iter()
            .filter(|r| r.quantity > 0)
            .filter_map(|r| {
                by_id.get(r.product_id.as_str()).map(|p| OrderedProduct {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    description: p.description.clone(),
                    price: p.price,
                    quantity: r.quantity,
                })
            })
            .collect();
        if lines.is_empty() {
            return Err(OrderError::ProductNotFound(ids));
        }

        // 5. Compute total, then persist
        let order = Order::place(account_id, lines);
        let repo = Arc::clone(&self.repo);
        let to_store = order.clone();
        tokio::task::spawn_blocking(move || repo.put_order(&to_store))
            .await
            .map_err(|e| OrderError::OrderPersistFailed(e.to_string()))?
            .map_err(|e| {
                log::error!("persisting order {} failed: {}", order.id, e);
                OrderError::OrderPersistFailed(e.to_string())
            })?;

        log::info!(
            "placed order {} for account '{}' ({} lines, total {})",
            order.id,
            order.account_id,
            order.products.len(),
            order.total_price
        );
        Ok(order)
    }

    /// Orders of `account_id` with line items resolved against the current
    /// catalog. Products the catalog no longer knows keep empty descriptive
    /// fields and a zero price.
    pub async fn orders_for_account(&self, account_id: &str) -> Result<Vec<Order>, OrderError> {
        let repo = Arc::clone(&self.repo);
        let owner = account_id.to_string();
        let mut orders = tokio::task::spawn_blocking(move || repo.orders_for_account(&owner))
            .await
            .map_err(|e| OrderError::RepositoryUnavailable(e.to_string()))?
            .map_err(|e| {
                log::error!("loading orders of '{}' failed: {}", account_id, e);
                OrderError::RepositoryUnavailable(e.to_string())
            })?;

        let ids: Vec<String> = orders
            .iter()
            .flat_map(|o| o.products.iter().map(|p| p.id.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(orders);
        }

        let products = self
            .bounded(self.catalog.get_products_by_ids(&ids))
            .await
            .map_err(|e| OrderError::CatalogUnavailable(e.to_string()))?;
        let by_id: HashMap<&str, &Product> =
            products.iter().map(|p| (p.id.as_str(), p)).collect();

        for line in orders.iter_mut().flat_map(|o| o.products.iter_mut()) {
            match by_id.get(line.id.as_str()) {
                Some(product) => line.resolve_from(product),
                None => log::debug!("product '{}' no longer in catalog", line.id),
            }
        }

        Ok(orders)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .unwrap_or(Err(ClientError::Timeout))
    }

    async fn bounded_store<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.call_timeout, call)
            .await
            .unwrap_or_else(|_| Err(StoreError::Unavailable("stock ledger timed out".to_string())))
    }
}

/// Merges repeated product ids by summing quantities; first occurrence keeps
/// its position. Rejects what the repository could not store, before any
/// stock is reserved.
fn coalesce(requested: Vec<ProductQuantity>) -> Result<Vec<ProductQuantity>, OrderError> {
    if requested.is_empty() {
        return Err(OrderError::InvalidInput(
            "an order needs at least one product".to_string(),
        ));
    }

    let mut merged: Vec<ProductQuantity> = Vec::with_capacity(requested.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    for item in requested {
        match index.get(&item.product_id) {
            Some(&i) => {
                merged[i].quantity = merged[i].quantity.checked_add(item.quantity).ok_or_else(
                    || {
                        OrderError::InvalidInput(format!(
                            "quantity of product '{}' overflows",
                            item.product_id
                        ))
                    },
                )?;
            }
            None => {
                index.insert(item.product_id.clone(), merged.len());
                merged.push(item);
            }
        }
    }

    if merged.len() > MAX_ORDER_LINES {
        return Err(OrderError::InvalidInput(format!(
            "an order holds at most {} distinct products, got {}",
            MAX_ORDER_LINES,
            merged.len()
        )));
    }
    if let Some(line) = merged.iter().find(|r| r.quantity > MAX_LINE_QUANTITY) {
        return Err(OrderError::InvalidInput(format!(
            "quantity {} of product '{}' exceeds {}",
            line.quantity, line.product_id, MAX_LINE_QUANTITY
        )));
    }
    Ok(merged)
}
