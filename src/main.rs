// src/main.rs
mod config;
mod handlers;
mod models;
mod status;
mod storage;
mod utils;

use std::net::IpAddr;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{clock::DefaultClock, RateLimiter};
use log::{info, warn};

use crate::config::Config;
use crate::status::cache::{spawn_refresh_loop, StatusCache};
use crate::status::prober::StatusProber;
use crate::storage::json::ContentStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger only once at the start
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    dotenv::dotenv().ok();

    let config = Config::from_env();
    if config.admin_password_hash.is_empty() {
        warn!("ADMIN_PASSWORD_HASH is not set; admin endpoints will reject every request");
    }

    // Get bind address and port from environment or use defaults
    let bind_address = std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let bind = format!("{}:{}", bind_address, port);

    let store = ContentStore::load(std::path::Path::new(&config.data_dir)).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to load content store: {}", e),
        )
    })?;
    let store = web::Data::new(store);

    // The status cache is fed by a single background probe task and read by
    // every /status request.
    let cache = Arc::new(StatusCache::new());
    let prober = StatusProber::new(
        config.status_host.clone(),
        config.status_port,
        config.status_timeout(),
    );
    let _refresh = spawn_refresh_loop(Arc::clone(&cache), prober, config.status_interval());
    info!(
        "Status prober targeting {}:{}, refreshing every {}s",
        config.status_host, config.status_port, config.status_interval_secs
    );

    // Set up rate limiter for /auth using config
    let auth_rate_limiter: web::Data<
        RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>,
    > = web::Data::new(RateLimiter::keyed(config.auth_quota()));

    let cache = web::Data::from(cache);
    let config = web::Data::new(config);

    info!("Starting server on {}", bind);
    HttpServer::new(move || {
        let cors = if config.allowed_origin == "*" {
            Cors::default().allow_any_origin()
        } else {
            Cors::default().allowed_origin(&config.allowed_origin)
        }
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(config.clone())
            .app_data(store.clone())
            .app_data(cache.clone())
            .app_data(auth_rate_limiter.clone())
            .route("/", web::get().to(handlers::index::index))
            .route("/health", web::get().to(handlers::index::index))
            .route("/status", web::get().to(handlers::status::get_status))
            .route("/auth", web::post().to(handlers::auth::handle_auth))
            .route("/news", web::get().to(handlers::news::list_news))
            .route("/news", web::post().to(handlers::news::create_news))
            .route("/news/{id}", web::put().to(handlers::news::update_news))
            .route("/news/{id}", web::delete().to(handlers::news::delete_news))
            .route("/docs", web::get().to(handlers::docs::list_docs))
            .route("/docs", web::post().to(handlers::docs::create_doc))
            .route("/docs/{id}", web::put().to(handlers::docs::update_doc))
            .route("/docs/{id}", web::delete().to(handlers::docs::delete_doc))
    })
    .bind(&bind)?
    .run()
    .await
}
