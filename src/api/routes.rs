use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

use super::websocket::{self, ConnectQuery};
use crate::relay::RelayServer;

/// WebSocket signaling endpoint. Connection metadata (role, exam, identity)
/// arrives as query parameters on the upgrade request.
pub fn signaling_route(
    server: Arc<RelayServer>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("ws")
        .and(warp::ws())
        .and(warp::query::<ConnectQuery>())
        .and(with_server(server))
        .map(|ws: warp::ws::Ws, query: ConnectQuery, server: Arc<RelayServer>| {
            ws.on_upgrade(move |websocket| {
                websocket::handle_signaling_socket(websocket, query, server)
            })
        })
}

pub fn health_route(
    server: Arc<RelayServer>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("health")
        .and(warp::get())
        .and(with_server(server))
        .and_then(|server: Arc<RelayServer>| async move {
            let connections = server.registry().connection_count().await;
            Ok::<_, warp::Rejection>(warp::reply::json(&serde_json::json!({
                "status": "healthy",
                "service": "proctor-relay",
                "version": env!("CARGO_PKG_VERSION"),
                "connections": connections,
            })))
        })
}

/// Client bootstrap settings, so browser clients fetch ICE configuration
/// instead of hardcoding it.
pub fn config_route() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("config").and(warp::get()).map(|| {
        use std::env;

        let config = serde_json::json!({
            "SIGNALING_WEBSOCKET_URL": env::var("SIGNALING_WEBSOCKET_URL").ok(),
            "STUN_SERVER_URL": env::var("STUN_SERVER_URL").ok(),
        });

        warp::reply::json(&config)
    })
}

fn with_server(
    server: Arc<RelayServer>,
) -> impl Filter<Extract = (Arc<RelayServer>,), Error = Infallible> + Clone {
    warp::any().map(move || server.clone())
}
