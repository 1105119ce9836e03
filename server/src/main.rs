use server::config::GatewayConfig;
use server::{routes, state};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env().expect("invalid gateway configuration");
    match &config.backend_url {
        Some(url) => tracing::info!(backend = %url, "backend configured"),
        None => tracing::warn!("BACKEND_URL not set; every proxied request will answer 503"),
    }

    let state = state::AppState::new(&config).expect("http client init failed");
    let app = routes::app(state);
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "gateway listening");
    axum::serve(listener, app).await.expect("server failed");
}
