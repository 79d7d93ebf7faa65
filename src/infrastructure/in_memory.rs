//! Process-local adapters, used by tests and for running the service without
//! Postgres or Redis.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::order::Order;
use crate::domain::ports::{OrderRepository, StockLedger};
use crate::domain::stock::{AdjustmentBatch, MAX_STOCK};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable("in-memory store poisoned".to_string()))
}

/// Stock ledger holding counters in a map. A whole batch is checked and
/// applied under one lock acquisition.
#[derive(Default)]
pub struct InMemoryStockLedger {
    counters: Mutex<HashMap<String, i64>>,
}

impl InMemoryStockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stock<I, S>(stock: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            counters: Mutex::new(stock.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn adjust_stock(&self, batch: &AdjustmentBatch) -> Result<Vec<String>, StoreError> {
        let mut counters = lock(&self.counters)?;

        let mut rejected = Vec::new();
        for entry in batch.entries() {
            let current = counters.get(&entry.product_id).copied().unwrap_or(0);
            let next = current.checked_add(entry.delta);
            if !entry.is_restock() && next.map_or(true, |n| n < 0) {
                rejected.push(entry.product_id.clone());
            } else if entry.delta > 0 && next.map_or(true, |n| n > MAX_STOCK) {
                return Err(StoreError::InvalidInput(format!(
                    "stock of '{}' would exceed {}",
                    entry.product_id, MAX_STOCK
                )));
            }
        }

        if rejected.is_empty() {
            for entry in batch.entries().iter().filter(|e| e.delta != 0) {
                *counters.entry(entry.product_id.clone()).or_insert(0) += entry.delta;
            }
        }

        Ok(rejected)
    }

    async fn check_stock(&self, product_ids: &[String]) -> Result<Vec<i64>, StoreError> {
        let counters = lock(&self.counters)?;
        Ok(product_ids
            .iter()
            .map(|id| counters.get(id).copied().unwrap_or(0))
            .collect())
    }
}

/// Order repository keeping aggregates in insertion order.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn put_order(&self, order: &Order) -> Result<(), StoreError> {
        if order.products.is_empty() {
            return Err(StoreError::InvalidInput(
                "an order needs at least one line item".to_string(),
            ));
        }

        // Same shape as the SQL store: only id and quantity survive.
        let mut stored = order.clone();
        for p in &mut stored.products {
            p.name.clear();
            p.description.clear();
            p.price = 0.0;
        }

        lock(&self.orders)?.push(stored);
        Ok(())
    }

    fn orders_for_account(&self, account_id: &str) -> Result<Vec<Order>, StoreError> {
        let mut found: Vec<Order> = lock(&self.orders)?
            .iter()
            .filter(|o| o.account_id == account_id)
            .cloned()
            .collect();
        found.sort_by_key(|o| o.id);
        Ok(found)
    }
}
