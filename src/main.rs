// src/main.rs

use article_hub::ai::OpenAiClient;
use article_hub::config::Config;
use article_hub::db::{self, RetryPolicy};
use article_hub::routes;
use article_hub::state::AppState;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Connect to MongoDB with retry
    let database = match db::connect(
        &config.mongo_uri,
        config.mongo_database.as_deref(),
        &RetryPolicy::default(),
    )
    .await
    {
        Ok(database) => database,
        Err(e) => {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Connected to MongoDB!");

    db::ensure_indexes(&database).await;

    let assistant = match OpenAiClient::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        config.openai_timeout,
    ) {
        Ok(assistant) => assistant,
        Err(e) => {
            tracing::error!("Failed to build OpenAI client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; token endpoints will fail");
    }

    let port = config.port;
    let state = AppState::from_database(&database, assistant, config);

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Listening on {}", addr);

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Error starting server: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
