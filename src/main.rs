use ceidg_lookup_api::config::Config;
use ceidg_lookup_api::handlers::AppState;
use ceidg_lookup_api::routes::build_app;
use ceidg_lookup_api::services::RegistryLookupService;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The CEIDG lookup service (HTTP client, lookup cache, circuit breaker).
/// - HTTP routes and middleware (auth, CORS, rate limiting, Swagger UI).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ceidg_lookup_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Lookup cache: 1 hour TTL, capacity from config
    let lookup = RegistryLookupService::new(&config)?;
    tracing::info!(
        "CEIDG lookup service initialized: {} (cache capacity {})",
        config.ceidg_api_url,
        config.cache_max_capacity
    );

    let port = config.port;
    let app_state = Arc::new(AppState { config, lookup });
    let app = build_app(app_state, true)?;

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
