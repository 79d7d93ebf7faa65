pub mod clients;
pub mod in_memory;
pub mod models;
pub mod order_repo;
pub mod stock_ledger;
