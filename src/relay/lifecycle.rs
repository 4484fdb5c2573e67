use std::sync::Arc;
use tokio::sync::mpsc;
use warp::ws::Message;

use super::messages::ServerMessage;
use super::registry::{ConnectionMeta, ConnectionRegistry};
use super::router::RoomRouter;
use crate::error::RelayError;

/// Connect/disconnect bookkeeping: registers connections, tears them down,
/// and tells the room when someone leaves.
pub struct SessionLifecycle {
    registry: Arc<ConnectionRegistry>,
    router: RoomRouter,
}

impl SessionLifecycle {
    pub fn new(registry: Arc<ConnectionRegistry>, router: RoomRouter) -> Self {
        Self { registry, router }
    }

    pub async fn on_connect(
        &self,
        connection_id: &str,
        meta: ConnectionMeta,
        sender: mpsc::UnboundedSender<Message>,
    ) -> Result<(), RelayError> {
        if meta.exam_id.is_none() {
            tracing::warn!(
                connection_id = %connection_id,
                role = meta.role.as_str(),
                "Connection declared no exam id, will not join a room"
            );
        }

        tracing::info!(
            connection_id = %connection_id,
            role = meta.role.as_str(),
            exam_id = meta.exam_id.as_deref().unwrap_or("-"),
            participant_id = meta.participant_id.as_deref().unwrap_or("-"),
            "Client connected"
        );

        self.registry.register(connection_id, meta, sender).await
    }

    /// Remove the connection and notify its room. Safe to call more than once
    /// per connection: the transport can report a disconnect through several
    /// code paths, and only the first call finds an entry to remove, so the
    /// departure notification goes out exactly once.
    pub async fn on_disconnect(&self, connection_id: &str, reason: &str) {
        let Some(meta) = self.registry.unregister(connection_id).await else {
            tracing::debug!(
                connection_id = %connection_id,
                "Disconnect for already-removed connection, ignoring"
            );
            return;
        };

        tracing::info!(
            connection_id = %connection_id,
            role = meta.role.as_str(),
            reason = %reason,
            "Client disconnected"
        );

        if let Some(exam_id) = meta.exam_id.as_deref() {
            let notification = ServerMessage::ParticipantDisconnected {
                participant_id: meta.participant_id.clone(),
                connection_id: connection_id.to_string(),
                name: meta.label(),
            };

            if let Err(e) = self
                .router
                .broadcast_to_room(exam_id, &notification, None)
                .await
            {
                tracing::error!(
                    connection_id = %connection_id,
                    exam_id = %exam_id,
                    error = %e,
                    "Failed to broadcast departure notification"
                );
            }
        }
    }
}
