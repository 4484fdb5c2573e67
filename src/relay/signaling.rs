use serde_json::Value;

use super::messages::{ServerMessage, TargetRole};
use super::router::{Delivery, RoomRouter};
use crate::error::RelayError;

/// Implements the offer/answer/ICE exchange and the presence events.
///
/// The handler is stateless per message: negotiation state (offer sent,
/// awaiting answer, retry timers, candidate buffering) lives entirely in the
/// clients. The relay only routes, which is what keeps a malformed or raced
/// message from ever wedging another session.
pub struct SignalingHandler {
    router: RoomRouter,
}

impl SignalingHandler {
    pub fn new(router: RoomRouter) -> Self {
        Self { router }
    }

    /// A tutor page load destroys its local negotiation state but leaves the
    /// student connections intact, so every student in the room is told to
    /// restart negotiation from scratch. Idempotent: a fresh offer simply
    /// supersedes the previous one.
    pub async fn handle_tutor_joined(
        &self,
        from_connection_id: &str,
        exam_id: &str,
    ) -> Result<(), RelayError> {
        let requested = self
            .router
            .broadcast_to_room(
                exam_id,
                &ServerMessage::RequestStudentOffer {
                    exam_id: exam_id.to_string(),
                },
                Some(from_connection_id),
            )
            .await?;

        tracing::info!(
            connection_id = %from_connection_id,
            exam_id = %exam_id,
            students_notified = requested,
            "Tutor joined or refreshed, requested student offers"
        );
        Ok(())
    }

    /// Informational presence event so tutor UIs can show a pending tile
    /// before media negotiation completes.
    pub async fn handle_student_started(
        &self,
        from_connection_id: &str,
        exam_id: &str,
        student_id: String,
        name: Option<String>,
    ) -> Result<(), RelayError> {
        tracing::info!(
            connection_id = %from_connection_id,
            exam_id = %exam_id,
            student_id = %student_id,
            "Student started exam"
        );

        self.router
            .broadcast_to_room(
                exam_id,
                &ServerMessage::StudentStarted {
                    student_id,
                    name,
                    from_connection_id: from_connection_id.to_string(),
                },
                Some(from_connection_id),
            )
            .await?;
        Ok(())
    }

    /// Student offer, fanned out to the rest of the room with the sender's
    /// connection id attached so the tutor can address its answer.
    pub async fn handle_offer(
        &self,
        from_connection_id: &str,
        exam_id: &str,
        student_id: String,
        offer: Value,
        name: Option<String>,
    ) -> Result<(), RelayError> {
        tracing::info!(
            connection_id = %from_connection_id,
            exam_id = %exam_id,
            student_id = %student_id,
            "Relaying offer to room"
        );

        self.router
            .broadcast_to_room(
                exam_id,
                &ServerMessage::Offer {
                    offer,
                    student_id,
                    name,
                    from_connection_id: from_connection_id.to_string(),
                },
                Some(from_connection_id),
            )
            .await?;
        Ok(())
    }

    /// Tutor answer, addressed to the originating student's connection.
    /// A vanished target means the student already disconnected; the answer
    /// is dropped and the tutor learns nothing beyond the departure
    /// notification it already received.
    pub async fn handle_answer(
        &self,
        from_connection_id: &str,
        to_connection_id: &str,
        answer: Value,
    ) -> Result<(), RelayError> {
        let outcome = self
            .router
            .send_to_connection(
                to_connection_id,
                &ServerMessage::Answer {
                    answer,
                    from_connection_id: from_connection_id.to_string(),
                },
            )
            .await?;

        match outcome {
            Delivery::Delivered => {
                tracing::debug!(
                    from = %from_connection_id,
                    to = %to_connection_id,
                    "Relayed answer"
                );
            }
            Delivery::NotFound => {
                tracing::debug!(
                    from = %from_connection_id,
                    to = %to_connection_id,
                    "Answer target already disconnected, dropping"
                );
            }
        }
        Ok(())
    }

    /// Role-directed candidate routing: candidates for the tutor are
    /// broadcast to the room, candidates for a student go point-to-point.
    /// No buffering and no replay happen here; candidates that arrive before
    /// a client is ready are the client's problem to queue.
    pub async fn handle_ice_candidate(
        &self,
        from_connection_id: &str,
        exam_id: Option<String>,
        candidate: Value,
        target_role: TargetRole,
        to_connection_id: Option<String>,
        student_id: Option<String>,
    ) -> Result<(), RelayError> {
        match target_role {
            TargetRole::Tutor => {
                let exam_id = exam_id.ok_or(RelayError::MissingTarget(
                    "ICE candidate for tutor carries no examId",
                ))?;

                self.router
                    .broadcast_to_room(
                        &exam_id,
                        &ServerMessage::IceCandidate {
                            candidate,
                            from_connection_id: from_connection_id.to_string(),
                            student_id,
                        },
                        Some(from_connection_id),
                    )
                    .await?;
            }
            TargetRole::Student => {
                let to_connection_id = to_connection_id.ok_or(RelayError::MissingTarget(
                    "ICE candidate for student carries no toConnectionId",
                ))?;

                self.router
                    .send_to_connection(
                        &to_connection_id,
                        &ServerMessage::IceCandidate {
                            candidate,
                            from_connection_id: from_connection_id.to_string(),
                            student_id: None,
                        },
                    )
                    .await?;
            }
        }
        Ok(())
    }
}
