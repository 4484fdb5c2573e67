use serde_json::Value;

use super::messages::ServerMessage;
use super::router::RoomRouter;
use crate::error::RelayError;

/// Forwards integrity violation events from a student to the tutor side of
/// the room, independent of the negotiation protocol.
///
/// Deliberately a thin, stateless forwarder: no deduplication, no rate
/// limiting, no persistence. Debouncing repeats is the sending client's job,
/// and durable storage happens through the student's own HTTP call to the
/// backend, not through this relay.
pub struct IntegrityRelay {
    router: RoomRouter,
}

impl IntegrityRelay {
    pub fn new(router: RoomRouter) -> Self {
        Self { router }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn relay_cheat_event(
        &self,
        from_connection_id: &str,
        exam_id: &str,
        student_id: String,
        kind: String,
        message: String,
        time: Option<Value>,
        name: Option<String>,
    ) -> Result<(), RelayError> {
        tracing::warn!(
            connection_id = %from_connection_id,
            exam_id = %exam_id,
            student_id = %student_id,
            kind = %kind,
            "Cheat event reported, relaying to room"
        );

        self.router
            .broadcast_to_room(
                exam_id,
                &ServerMessage::CheatEvent {
                    student_id,
                    kind,
                    message,
                    time,
                    name,
                },
                Some(from_connection_id),
            )
            .await?;
        Ok(())
    }
}
