use std::collections::HashSet;

use super::errors::StoreError;

/// Largest counter value and largest absolute delta a ledger accepts. Redis
/// scripts see numbers as doubles, which are exact only up to 2^53 - 1.
pub const MAX_STOCK: i64 = (1 << 53) - 1;

/// A signed change to one product's stock counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: String,
    pub delta: i64,
}

impl StockAdjustment {
    pub fn new(product_id: impl Into<String>, delta: i64) -> Self {
        Self {
            product_id: product_id.into(),
            delta,
        }
    }

    pub fn is_restock(&self) -> bool {
        self.delta >= 0
    }
}

/// A non-empty batch of adjustments over distinct product ids, applied by a
/// ledger as one atomic unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentBatch {
    entries: Vec<StockAdjustment>,
}

impl AdjustmentBatch {
    pub fn new(entries: Vec<StockAdjustment>) -> Result<Self, StoreError> {
        if entries.is_empty() {
            return Err(StoreError::InvalidInput(
                "adjustment batch must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !(-MAX_STOCK..=MAX_STOCK).contains(&entry.delta) {
                return Err(StoreError::InvalidInput(format!(
                    "delta {} for product '{}' is out of range",
                    entry.delta, entry.product_id
                )));
            }
            if !seen.insert(entry.product_id.as_str()) {
                return Err(StoreError::InvalidInput(format!(
                    "product '{}' appears more than once in the batch",
                    entry.product_id
                )));
            }
        }

        Ok(Self { entries })
    }

    /// A reservation takes `quantity` units of each product.
    pub fn reservation<'a, I>(items: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        Self::new(
            items
                .into_iter()
                .map(|(id, quantity)| StockAdjustment::new(id, -i64::from(quantity)))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[StockAdjustment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key under which a ledger stores the counter of `product_id`.
pub fn stock_key(product_id: &str) -> String {
    format!("inventory:{}", product_id)
}
