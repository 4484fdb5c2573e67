use std::sync::Arc;
use tokio::sync::mpsc;
use warp::ws::Message;

use super::integrity::IntegrityRelay;
use super::lifecycle::SessionLifecycle;
use super::messages::ClientMessage;
use super::registry::{ConnectionMeta, ConnectionRegistry};
use super::router::RoomRouter;
use super::signaling::SignalingHandler;
use crate::error::RelayError;

/// Composition root for the signaling relay. One instance owns the registry
/// and wires the router, protocol handler, integrity relay, and lifecycle
/// manager around it. Constructed once per process, or fresh per test.
pub struct RelayServer {
    registry: Arc<ConnectionRegistry>,
    signaling: SignalingHandler,
    integrity: IntegrityRelay,
    lifecycle: SessionLifecycle,
}

impl RelayServer {
    pub fn new() -> Self {
        let registry = ConnectionRegistry::new();
        let router = RoomRouter::new(registry.clone());

        Self {
            signaling: SignalingHandler::new(router.clone()),
            integrity: IntegrityRelay::new(router.clone()),
            lifecycle: SessionLifecycle::new(registry.clone(), router),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub async fn on_connect(
        &self,
        connection_id: &str,
        meta: ConnectionMeta,
        sender: mpsc::UnboundedSender<Message>,
    ) -> Result<(), RelayError> {
        self.lifecycle.on_connect(connection_id, meta, sender).await
    }

    pub async fn on_disconnect(&self, connection_id: &str, reason: &str) {
        self.lifecycle.on_disconnect(connection_id, reason).await;
    }

    /// Dispatch one inbound message. Protocol errors (missing routing
    /// targets and the like) are logged and the message dropped; nothing a
    /// client sends can close its own connection or touch another room.
    pub async fn handle_message(&self, connection_id: &str, message: ClientMessage) {
        let result = match message {
            ClientMessage::TutorJoinedOrRefreshed { exam_id } => {
                self.signaling
                    .handle_tutor_joined(connection_id, &exam_id)
                    .await
            }
            ClientMessage::StudentStarted {
                exam_id,
                student_id,
                name,
            } => {
                self.signaling
                    .handle_student_started(connection_id, &exam_id, student_id, name)
                    .await
            }
            ClientMessage::Offer {
                exam_id,
                student_id,
                offer,
                name,
            } => {
                self.signaling
                    .handle_offer(connection_id, &exam_id, student_id, offer, name)
                    .await
            }
            ClientMessage::Answer {
                to_connection_id,
                answer,
            } => {
                self.signaling
                    .handle_answer(connection_id, &to_connection_id, answer)
                    .await
            }
            ClientMessage::IceCandidate {
                exam_id,
                candidate,
                target_role,
                to_connection_id,
                student_id,
            } => {
                self.signaling
                    .handle_ice_candidate(
                        connection_id,
                        exam_id,
                        candidate,
                        target_role,
                        to_connection_id,
                        student_id,
                    )
                    .await
            }
            ClientMessage::CheatEvent {
                exam_id,
                student_id,
                kind,
                message,
                time,
                name,
            } => {
                self.integrity
                    .relay_cheat_event(
                        connection_id,
                        &exam_id,
                        student_id,
                        kind,
                        message,
                        time,
                        name,
                    )
                    .await
            }
        };

        if let Err(e) = result {
            tracing::warn!(
                connection_id = %connection_id,
                error = %e,
                "Dropping unroutable signaling message"
            );
        }
    }
}

impl Default for RelayServer {
    fn default() -> Self {
        Self::new()
    }
}
