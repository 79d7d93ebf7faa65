pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::order_service::OrderService;
pub use db::{create_pool, DbPool};
use domain::ports::StockLedger;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::place_order,
        handlers::orders::list_orders_for_account,
        handlers::inventory::adjust_stock,
        handlers::inventory::check_stock,
    ),
    components(schemas(
        handlers::orders::PlaceOrderRequest,
        handlers::orders::OrderProductRequest,
        handlers::orders::OrderResponse,
        handlers::orders::OrderedProductResponse,
        handlers::inventory::AdjustStockRequest,
        handlers::inventory::StockAdjustmentRequest,
        handlers::inventory::AdjustStockResponse,
        handlers::inventory::StockLevel,
    )),
    tags(
        (name = "orders", description = "Order placement and history"),
        (name = "inventory", description = "Stock ledger"),
    )
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

/// Registers the order and inventory routes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/orders", web::post().to(handlers::orders::place_order))
        .route(
            "/accounts/{account_id}/orders",
            web::get().to(handlers::orders::list_orders_for_account),
        )
        .service(
            web::scope("/inventory")
                .route("", web::get().to(handlers::inventory::check_stock))
                .route(
                    "/adjustments",
                    web::post().to(handlers::inventory::adjust_stock),
                ),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    service: OrderService,
    ledger: Arc<dyn StockLedger>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    let ledger: web::Data<dyn StockLedger> = web::Data::from(ledger);

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(ledger.clone())
            .wrap(Logger::default())
            .configure(routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
