use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};

use crate::domain::errors::StoreError;
use crate::domain::ports::StockLedger;
use crate::domain::stock::{stock_key, AdjustmentBatch, MAX_STOCK};

const KEY_PREFIX: &str = "inventory:";
const OVERFLOW_CODE: &str = "OVERFLOW";

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Stock ledger backed by Redis counters under `inventory:<product_id>`.
///
/// Batches run inside a single Lua script, which Redis executes without
/// interleaving any other command, so a check and its decrement can never be
/// split by a concurrent reservation.
#[derive(Clone)]
pub struct RedisStockLedger {
    conn: ConnectionManager,
    script: Script,
}

impl RedisStockLedger {
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self::new(conn))
    }

    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            script: Script::new(include_str!("adjust_stock.lua")),
        }
    }
}

#[async_trait]
impl StockLedger for RedisStockLedger {
    async fn adjust_stock(&self, batch: &AdjustmentBatch) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();

        let mut invocation = self.script.prepare_invoke();
        for entry in batch.entries() {
            invocation.key(stock_key(&entry.product_id)).arg(entry.delta);
        }
        invocation.arg(MAX_STOCK);

        // EVALSHA, falling back to EVAL when the script is not cached yet.
        let rejected_keys: Vec<String> = match invocation.invoke_async(&mut conn).await {
            Ok(keys) => keys,
            Err(e) if e.code() == Some(OVERFLOW_CODE) => {
                return Err(StoreError::InvalidInput(format!(
                    "stock of '{}' would exceed {}",
                    e.detail()
                        .map(|key| key.strip_prefix(KEY_PREFIX).unwrap_or(key))
                        .unwrap_or_default(),
                    MAX_STOCK
                )));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(rejected_keys
            .into_iter()
            .map(|key| match key.strip_prefix(KEY_PREFIX) {
                Some(id) => id.to_string(),
                None => key,
            })
            .collect())
    }

    async fn check_stock(&self, product_ids: &[String]) -> Result<Vec<i64>, StoreError> {
        if product_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut conn = self.conn.clone();
        let keys: Vec<String> = product_ids.iter().map(|id| stock_key(id)).collect();

        let values: Vec<Option<i64>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        Ok(values.into_iter().map(|v| v.unwrap_or(0)).collect())
    }
}
