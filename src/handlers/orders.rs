use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::domain::order::{Order, OrderedProduct, ProductQuantity};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderProductRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub account_id: String,
    pub products: Vec<OrderProductRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderedProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Catalog price: the placement-time snapshot on `POST /orders`, the
    /// current catalog price when listing.
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub created_at: String,
    pub account_id: String,
    /// Fixed when the order was placed.
    pub total_price: f64,
    pub products: Vec<OrderedProductResponse>,
}

impl From<OrderedProduct> for OrderedProductResponse {
    fn from(p: OrderedProduct) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            quantity: p.quantity,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            created_at: o.created_at.to_rfc3339(),
            account_id: o.account_id,
            total_price: o.total_price,
            products: o.products.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Validates the account, reserves stock, prices the order from the catalog
/// and stores it. Retrying a request places a new order.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Empty or malformed order"),
        (status = 404, description = "Account or product not found"),
        (status = 409, description = "One or more products out of stock"),
        (status = 503, description = "A dependency is unavailable"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    service: web::Data<OrderService>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let requested = body
        .products
        .into_iter()
        .map(|p| ProductQuantity::new(p.product_id, p.quantity))
        .collect();

    let order = service.place_order(&body.account_id, requested).await?;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /accounts/{account_id}/orders
///
/// Orders sorted by id, line items resolved from the current catalog.
#[utoipa::path(
    get,
    path = "/accounts/{account_id}/orders",
    params(
        ("account_id" = String, Path, description = "Owning account"),
    ),
    responses(
        (status = 200, description = "Orders of the account", body = [OrderResponse]),
        (status = 503, description = "A dependency is unavailable"),
    ),
    tag = "orders"
)]
pub async fn list_orders_for_account(
    service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let account_id = path.into_inner();

    let orders = service.orders_for_account(&account_id).await?;

    let body: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}
