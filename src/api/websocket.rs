use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use rand::Rng;
use serde::Deserialize;
use tokio::sync::mpsc;
use warp::ws::{Message, WebSocket};

use crate::relay::{ClientMessage, ConnectionMeta, RelayServer, Role};

/// Connection-time metadata carried as query parameters on the upgrade
/// request. Identity is assumed to be resolved upstream; these values are
/// used for routing only.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    role: Option<String>,
    #[serde(rename = "examId", default)]
    exam_id: Option<String>,
    #[serde(rename = "studentId", default)]
    student_id: Option<String>,
    #[serde(rename = "tutorId", default)]
    tutor_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl ConnectQuery {
    fn into_meta(self) -> ConnectionMeta {
        let role = self
            .role
            .as_deref()
            .map(Role::from_query)
            .unwrap_or(Role::Unknown);

        let participant_id = match role {
            Role::Tutor => self.tutor_id,
            Role::Student => self.student_id,
            Role::Unknown => self.student_id.or(self.tutor_id),
        };

        ConnectionMeta {
            role,
            exam_id: self.exam_id,
            participant_id,
            display_name: self.name,
        }
    }
}

/// Opaque id assigned at upgrade time, stable for the connection's lifetime
/// and never reused.
fn generate_connection_id() -> String {
    let mut rng = rand::thread_rng();
    format!("conn-{:016x}", rng.gen::<u64>())
}

pub async fn handle_signaling_socket(
    websocket: WebSocket,
    query: ConnectQuery,
    server: Arc<RelayServer>,
) {
    let connection_id = generate_connection_id();
    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    if let Err(e) = server.on_connect(&connection_id, query.into_meta(), tx).await {
        tracing::error!(
            connection_id = %connection_id,
            error = %e,
            "Refusing signaling connection"
        );
        return;
    }

    // Drain the outbound channel into the socket so routing never blocks on
    // a slow client.
    let sender_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = ws_sender.send(message).await {
                tracing::debug!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(message) => handle_frame(&server, &connection_id, message).await,
            Err(e) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    error = %e,
                    "WebSocket error, closing connection"
                );
                break;
            }
        }
    }

    server.on_disconnect(&connection_id, "socket closed").await;
    sender_task.abort();
}

async fn handle_frame(server: &Arc<RelayServer>, connection_id: &str, message: Message) {
    let Ok(text) = message.to_str() else {
        // Ping/pong/close frames are the transport's business.
        return;
    };

    match serde_json::from_str::<ClientMessage>(text) {
        Ok(client_message) => {
            server.handle_message(connection_id, client_message).await;
        }
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                error = %e,
                raw_message = %text,
                "Dropping malformed signaling message"
            );
        }
    }
}
