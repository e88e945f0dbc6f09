use actix::Actor;
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;

use tripsplit::config::{AppConfig, CorsConfig};
use tripsplit::routes;
use tripsplit::store::GroupStore;

fn cors(config: &CorsConfig) -> Cors {
    if config.allowed_origins.is_empty() {
        return Cors::permissive();
    }
    config
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .expose_headers(["etag"])
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    info!(
        "Listening on {}:{} (allowed origins: {:?})",
        config.server.host, config.server.port, config.cors.allowed_origins
    );

    let store = GroupStore::default().start();
    let cors_config = config.cors.clone();

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors(&cors_config))
            .app_data(web::Data::new(store.clone()))
            .configure(routes::configure)
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }
    server
        .bind((config.server.host.as_str(), config.server.port))
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?
        .run()
        .await
        .context("Server stopped unexpectedly")
}
