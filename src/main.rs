use std::sync::Arc;

use dotenvy::dotenv;
use order_saga::config::Settings;
use order_saga::infrastructure::clients::{HttpAccountDirectory, HttpProductCatalog};
use order_saga::infrastructure::order_repo::DieselOrderRepository;
use order_saga::infrastructure::stock_ledger::RedisStockLedger;
use order_saga::{build_server, create_pool, run_migrations, OrderService};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[actix_web::main]
async fn main() -> Result<(), BoxError> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env()?;

    let pool = create_pool(&settings.database_url)?;
    run_migrations(&pool)?;

    let ledger = Arc::new(RedisStockLedger::connect(&settings.redis_url).await?);
    let accounts = HttpAccountDirectory::new(
        &settings.account_service_url,
        settings.collaborator_timeout,
    )?;
    let catalog = HttpProductCatalog::new(
        &settings.catalog_service_url,
        settings.collaborator_timeout,
    )?;

    let service = OrderService::new(
        Arc::new(DieselOrderRepository::new(pool)),
        ledger.clone(),
        Arc::new(accounts),
        Arc::new(catalog),
    )
    .with_call_timeout(settings.collaborator_timeout);

    log::info!(
        "Starting server at http://{}:{}",
        settings.host,
        settings.port
    );

    build_server(service, ledger, &settings.host, settings.port)?.await?;
    Ok(())
}
