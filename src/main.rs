use actix_web::{App, HttpServer, middleware::Logger};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use jersey_arena::{
    AppServices,
    config::Config,
    database::{create_pool, run_migrations},
    external::StripeService,
    middlewares::{AuthMiddleware, create_cors},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;

    if config.stripe.secret_key.is_empty() {
        log::warn!("STRIPE_SECRET_KEY is empty, hosted checkout calls will fail");
    }
    let gateway = Arc::new(StripeService::new(&config.stripe));
    let services = AppServices::new(pool, &config, gateway);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let client = config.client.clone();
    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(AuthMiddleware::new(services.jwt_service.clone()))
            .wrap(create_cors(&client))
            .wrap(Logger::default())
            .configure(|cfg| services.configure(cfg))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
