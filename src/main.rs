use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use std::sync::Arc;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod service;
mod store;
mod utils;

use config::{Config, StoreBackend};
use db::init_db;

use crate::docs::ApiDoc;
use crate::service::{clock::SystemClock, portal::AttendancePortal};
use crate::store::{AttendanceStore, mysql::MySqlStore, sheet::SheetStore};
use crate::utils::shift_cache::ShiftCache;
use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn AttendanceStore>> {
    let store: Arc<dyn AttendanceStore> = match config.store_backend {
        StoreBackend::Mysql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set for the mysql backend")?;
            let pool = init_db(url).await.context("Failed to connect to database")?;
            Arc::new(MySqlStore::new(pool))
        }
        StoreBackend::Sheet => Arc::new(
            SheetStore::open(&config.sheet_dir)
                .with_context(|| format!("Failed to load sheets from {}", config.sheet_dir.display()))?,
        ),
    };
    Ok(store)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = ?config.store_backend, offset = %config.utc_offset, "Server starting...");

    let store = open_store(&config).await?;

    let shifts = ShiftCache::new(config.shift_cache_ttl);
    if let Err(e) = shifts.warmup(store.as_ref()).await {
        warn!(error = %e, "Failed to warmup shift cache");
    }

    let portal = Data::new(AttendancePortal::new(
        store,
        shifts,
        Arc::new(SystemClock),
        config.utc_offset,
    ));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(portal.clone())
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
