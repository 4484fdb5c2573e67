mod api;
mod config;
mod error;
mod relay;

use std::sync::Arc;
use warp::Filter;

use config::Config;
use relay::RelayServer;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let server = Arc::new(RelayServer::new());

    let routes = api::routes::signaling_route(server.clone())
        .or(api::routes::health_route(server))
        .or(api::routes::config_route());

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting proctoring signaling relay"
    );

    warp::serve(routes).run(config.bind_address()).await;
}
