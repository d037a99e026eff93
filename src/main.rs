use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use kindred_discovery::config::{LoggingSettings, Settings};
use kindred_discovery::routes::{
    self, handle_json_payload_error, handle_query_payload_error, AppState,
};
use kindred_discovery::services::{CacheManager, PostgresClient};
use std::env;
use std::io;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    let logging = logging.overridden(env::var("LOG_LEVEL").ok(), env::var("LOG_FORMAT").ok());
    // RUST_LOG wins over every other level source
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_tracing(&settings.logging);

    info!("Starting Kindred discovery service...");
    info!("Configuration loaded successfully");

    // Cache is optional: without Redis the service keeps an in-process tier
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(86_400);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);
    let cache = Arc::new(
        CacheManager::connect_or_local(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl)
            .await,
    );

    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, shared tier: {})",
        l1_cache_size,
        cache_ttl,
        cache.has_shared_tier()
    );

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string())
        })?,
    );

    info!("PostgreSQL client initialized");

    let ranker = settings.ranker();

    info!(
        "Ranker initialized with weights {:?}, must-have policy {:?}",
        settings.scoring.weights,
        ranker.must_have_policy()
    );

    let app_state = AppState {
        postgres,
        cache,
        ranker,
        discovery: settings.discovery.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
