use dotenvy::dotenv;
use stock_insight_api::{config::AppConfig, routes::register_routes, state::AppState};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };
    let port = config.app_server_port;

    let state = AppState::bootstrap(config).await;
    let refresher = state.price_cache.start_background_task();

    let app = register_routes(state);
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(port, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(port, "Listening");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
    }

    refresher.abort();
    info!("Shut down");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
