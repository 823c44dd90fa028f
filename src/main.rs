use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use restaurant_search::config::Settings;
use restaurant_search::core::Searcher;
use restaurant_search::routes::{self, AppState};
use restaurant_search::services::{ElasticsearchClient, SearchBackend};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration before logging so the configured level applies
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Initialize logging; LOG_LEVEL / LOG_FORMAT override the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting restaurant search service...");
    info!("Configuration loaded successfully");

    // One client per process, shared by every worker
    let client = ElasticsearchClient::new(settings.elasticsearch.client_options()).map_err(|e| {
        error!("Failed to create Elasticsearch client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let backend: Arc<dyn SearchBackend> = Arc::new(client);

    if backend.ping().await {
        info!("Connected to Elasticsearch at {}", settings.elasticsearch.url);
    } else {
        error!("Elasticsearch at {} is not reachable yet, searches will return 503 until it is", settings.elasticsearch.url);
    }

    let searcher = Searcher::new(backend, settings.elasticsearch.index.clone())
        .with_search_timeout(settings.elasticsearch.search_timeout.clone());

    info!("Searcher initialized for index {}", searcher.index());

    let app_state = AppState { searcher };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
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
