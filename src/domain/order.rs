use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// One requested product in a `PlaceOrder` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuantity {
    pub product_id: String,
    pub quantity: u32,
}

impl ProductQuantity {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A line item of an order.
///
/// Only `id` and `quantity` are stored. `name`, `description` and `price` are
/// resolved from the catalog: at placement time they are the snapshot the
/// total was computed from, on later reads they are whatever the catalog
/// returns now (live line pricing). A historical order may therefore display
/// line prices that no longer add up to its `total_price`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u32,
}

impl OrderedProduct {
    /// A line item whose descriptive fields are not resolved yet.
    pub fn unresolved(id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
            ..Self::default()
        }
    }

    pub fn resolve_from(&mut self, product: &Product) {
        self.name = product.name.clone();
        self.description = product.description.clone();
        self.price = product.price;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub account_id: String,
    pub total_price: f64,
    pub products: Vec<OrderedProduct>,
}

impl Order {
    /// Builds a new order with a fresh time-sortable id and the total fixed
    /// from the given line prices.
    pub fn place(account_id: impl Into<String>, products: Vec<OrderedProduct>) -> Self {
        Self {
            id: Uuid::now_v7(),
            // Postgres keeps microseconds; truncating keeps reads equal to writes.
            created_at: Utc::now().trunc_subsecs(6),
            account_id: account_id.into(),
            total_price: total_price(&products),
            products,
        }
    }
}

/// `Σ price × quantity` in double precision. No rounding is applied.
pub fn total_price(products: &[OrderedProduct]) -> f64 {
    products
        .iter()
        .fold(0.0, |acc, p| acc + p.price * f64::from(p.quantity))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
}
