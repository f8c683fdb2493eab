//! Syncs the demo catalog: `cargo run --bin seed`

use jersey_arena::{
    config::Config,
    database::{create_pool, run_migrations},
    services::CatalogSeeder,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;
    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;

    log::info!("Starting jersey seeding and sync");
    let report = CatalogSeeder::new(pool).sync().await?;
    log::info!(
        "Catalog synced: {} categories, {} products, {} SKUs created, {} SKUs updated",
        report.categories_created,
        report.products_created,
        report.skus_created,
        report.skus_updated
    );

    Ok(())
}
