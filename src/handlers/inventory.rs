use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::StockLedger;
use crate::domain::stock::{AdjustmentBatch, StockAdjustment};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct StockAdjustmentRequest {
    pub product_id: String,
    /// Positive to restock, negative to take stock.
    pub delta: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    pub adjustments: Vec<StockAdjustmentRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustStockResponse {
    /// Products whose counter would have gone negative. When non-empty,
    /// nothing in the batch was applied.
    pub rejected: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CheckStockParams {
    /// Comma-separated product ids.
    pub ids: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StockLevel {
    pub product_id: String,
    pub quantity: i64,
}

/// POST /inventory/adjustments
#[utoipa::path(
    post,
    path = "/inventory/adjustments",
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Batch evaluated", body = AdjustStockResponse),
        (status = 400, description = "Empty batch, repeated product id or counter out of range"),
        (status = 503, description = "Stock ledger unavailable"),
    ),
    tag = "inventory"
)]
pub async fn adjust_stock(
    ledger: web::Data<dyn StockLedger>,
    body: web::Json<AdjustStockRequest>,
) -> Result<HttpResponse, AppError> {
    let entries: Vec<StockAdjustment> = body
        .into_inner()
        .adjustments
        .into_iter()
        .map(|a| StockAdjustment::new(a.product_id, a.delta))
        .collect();

    // Validate the full request first, then drop no-op entries.
    AdjustmentBatch::new(entries.clone())?;
    let effective: Vec<StockAdjustment> = entries.into_iter().filter(|e| e.delta != 0).collect();
    if effective.is_empty() {
        return Ok(HttpResponse::Ok().json(AdjustStockResponse { rejected: vec![] }));
    }

    let rejected = ledger.adjust_stock(&AdjustmentBatch::new(effective)?).await?;
    if !rejected.is_empty() {
        log::info!("stock adjustment rejected for {:?}", rejected);
    }

    Ok(HttpResponse::Ok().json(AdjustStockResponse { rejected }))
}

/// GET /inventory?ids=a,b
#[utoipa::path(
    get,
    path = "/inventory",
    params(CheckStockParams),
    responses(
        (status = 200, description = "Stock levels in request order", body = [StockLevel]),
        (status = 503, description = "Stock ledger unavailable"),
    ),
    tag = "inventory"
)]
pub async fn check_stock(
    ledger: web::Data<dyn StockLedger>,
    query: web::Query<CheckStockParams>,
) -> Result<HttpResponse, AppError> {
    let ids: Vec<String> = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    let quantities = ledger.check_stock(&ids).await?;

    let body: Vec<StockLevel> = ids
        .into_iter()
        .zip(quantities)
        .map(|(product_id, quantity)| StockLevel {
            product_id,
            quantity,
        })
        .collect();
    Ok(HttpResponse::Ok().json(body))
}
