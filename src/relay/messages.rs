use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which side of the negotiation an ICE candidate is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetRole {
    Tutor,
    Student,
}

/// Messages accepted from clients over the signaling socket.
///
/// SDP and ICE payloads are carried as opaque JSON; the relay routes them
/// without inspecting their contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {

    #[serde(rename = "tutor-joined-or-refreshed", rename_all = "camelCase")]
    TutorJoinedOrRefreshed {
        exam_id: String,
    },

    #[serde(rename = "student-started", rename_all = "camelCase")]
    StudentStarted {
        exam_id: String,
        student_id: String,
        name: Option<String>,
    },

    #[serde(rename = "webrtc:offer", rename_all = "camelCase")]
    Offer {
        exam_id: String,
        student_id: String,
        offer: Value,
        name: Option<String>,
    },

    #[serde(rename = "webrtc:answer", rename_all = "camelCase")]
    Answer {
        to_connection_id: String,
        answer: Value,
    },

    #[serde(rename = "webrtc:ice-candidate", rename_all = "camelCase")]
    IceCandidate {
        exam_id: Option<String>,
        candidate: Value,
        target_role: TargetRole,
        to_connection_id: Option<String>,
        student_id: Option<String>,
    },

    #[serde(rename = "cheat-event", rename_all = "camelCase")]
    CheatEvent {
        exam_id: String,
        student_id: String,
        kind: String,
        message: String,
        time: Option<Value>,
        name: Option<String>,
    },
}

/// Messages the relay delivers to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {

    #[serde(rename = "request-student-offer", rename_all = "camelCase")]
    RequestStudentOffer {
        exam_id: String,
    },

    #[serde(rename = "student-started", rename_all = "camelCase")]
    StudentStarted {
        student_id: String,
        name: Option<String>,
        from_connection_id: String,
    },

    #[serde(rename = "webrtc:offer", rename_all = "camelCase")]
    Offer {
        offer: Value,
        student_id: String,
        name: Option<String>,
        from_connection_id: String,
    },

    #[serde(rename = "webrtc:answer", rename_all = "camelCase")]
    Answer {
        answer: Value,
        from_connection_id: String,
    },

    #[serde(rename = "webrtc:ice-candidate", rename_all = "camelCase")]
    IceCandidate {
        candidate: Value,
        from_connection_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        student_id: Option<String>,
    },

    #[serde(rename = "cheat-event", rename_all = "camelCase")]
    CheatEvent {
        student_id: String,
        kind: String,
        message: String,
        time: Option<Value>,
        name: Option<String>,
    },

    #[serde(rename = "participant-disconnected", rename_all = "camelCase")]
    ParticipantDisconnected {
        participant_id: Option<String>,
        connection_id: String,
        name: Option<String>,
    },
}
