use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use promatch::config::Settings;
use promatch::core::{EmbeddingProvider, MatchingEngine};
use promatch::routes::{self, handle_path_error, handle_query_payload_error, AppState};
use promatch::services::PostgresClient;
use std::io;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration comes first so the log level can be read from it
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_tracing(&settings.logging.level, &settings.logging.format);

    info!("Starting promatch recommendation service...");
    info!("Configuration loaded successfully");

    // The embedding model is loaded lazily on first use unless warmup is enabled
    let embeddings = EmbeddingProvider::shared(&settings.embedding)
        .map_err(|e| startup_error("Invalid embedding configuration", e))?;

    if settings.embedding.warmup {
        let provider = Arc::clone(&embeddings);
        match web::block(move || provider.warmup()).await {
            Ok(Ok(())) => info!("Embedding backend '{}' warmed up", settings.embedding.backend),
            Ok(Err(e)) => warn!("Embedding warmup failed, will retry on first request: {}", e),
            Err(e) => warn!("Embedding warmup task failed: {}", e),
        }
    }

    let engine = MatchingEngine::new(
        settings.scoring.weights(),
        settings.matching.max_distance_km,
        embeddings,
    )
    .map_err(|e| startup_error("Invalid matching configuration", e))?;

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        Some(db_min_conn),
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?;

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let app_state = AppState {
        repository: Arc::new(postgres),
        engine,
        matching: settings.matching.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
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
