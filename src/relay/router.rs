use std::sync::Arc;
use warp::ws::Message;

use super::messages::ServerMessage;
use super::registry::ConnectionRegistry;
use crate::error::RelayError;

/// Outcome of a point-to-point delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The target disconnected between lookup and send. An expected race
    /// during negotiation, not an error.
    NotFound,
}

/// Delivers signaling messages to rooms or to individual connections.
/// Membership is resolved through the registry on every call; the router
/// itself holds no state.
#[derive(Clone)]
pub struct RoomRouter {
    registry: Arc<ConnectionRegistry>,
}

impl RoomRouter {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Fan a message out to every current member of a room, optionally
    /// skipping the sender. An empty room is a silent no-op. Returns how many
    /// connections the message was handed to.
    pub async fn broadcast_to_room(
        &self,
        exam_id: &str,
        message: &ServerMessage,
        exclude: Option<&str>,
    ) -> Result<usize, RelayError> {
        let text = serde_json::to_string(message)?;
        let members = self.registry.members_with_senders(exam_id, exclude).await;

        let mut delivered = 0;
        for (connection_id, sender) in members {
            if sender.send(Message::text(text.clone())).is_ok() {
                delivered += 1;
            } else {
                // Channel already closed; lifecycle cleanup will follow.
                tracing::debug!(
                    connection_id = %connection_id,
                    exam_id = %exam_id,
                    "Skipping broadcast to closing connection"
                );
            }
        }

        Ok(delivered)
    }

    /// Deliver a message to one specific connection.
    pub async fn send_to_connection(
        &self,
        connection_id: &str,
        message: &ServerMessage,
    ) -> Result<Delivery, RelayError> {
        let text = serde_json::to_string(message)?;

        match self.registry.sender_of(connection_id).await {
            Some(sender) if sender.send(Message::text(text)).is_ok() => Ok(Delivery::Delivered),
            _ => Ok(Delivery::NotFound),
        }
    }
}
