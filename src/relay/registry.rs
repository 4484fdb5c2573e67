use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use warp::ws::Message;

use crate::error::RelayError;

/// Role a client declares at connect time. Untrusted; used only for routing
/// policy, never for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Tutor,
    Student,
    Unknown,
}

impl Role {
    pub fn from_query(raw: &str) -> Self {
        match raw {
            "tutor" => Role::Tutor,
            "student" => Role::Student,
            _ => Role::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tutor => "tutor",
            Role::Student => "student",
            Role::Unknown => "unknown",
        }
    }
}

/// Metadata declared when a connection opens. Immutable for the lifetime of
/// the connection.
#[derive(Debug, Clone)]
pub struct ConnectionMeta {
    pub role: Role,
    pub exam_id: Option<String>,
    pub participant_id: Option<String>,
    pub display_name: Option<String>,
}

impl ConnectionMeta {
    /// UI label: display name when declared, participant id otherwise.
    pub fn label(&self) -> Option<String> {
        self.display_name
            .clone()
            .or_else(|| self.participant_id.clone())
    }
}

struct ConnectionEntry {
    meta: ConnectionMeta,
    sender: mpsc::UnboundedSender<Message>,
}

/// Owns every live connection and its declared metadata. Rooms are not stored
/// anywhere; membership is always derived from the entries sharing an exam id,
/// so the registry is the single source of truth for who is connected.
pub struct ConnectionRegistry {
    entries: RwLock<HashMap<String, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
        })
    }

    /// Register a new connection. The transport layer guarantees unique ids,
    /// so a duplicate here is a programming-error signal, not a recoverable
    /// condition.
    pub async fn register(
        &self,
        connection_id: &str,
        meta: ConnectionMeta,
        sender: mpsc::UnboundedSender<Message>,
    ) -> Result<(), RelayError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(connection_id) {
            return Err(RelayError::DuplicateConnection(connection_id.to_string()));
        }
        entries.insert(connection_id.to_string(), ConnectionEntry { meta, sender });
        Ok(())
    }

    pub async fn lookup(&self, connection_id: &str) -> Option<ConnectionMeta> {
        let entries = self.entries.read().await;
        entries.get(connection_id).map(|e| e.meta.clone())
    }

    /// Remove a connection, returning its metadata so the caller can build the
    /// departure notification. Removing an absent id is a no-op returning
    /// `None`, which is what makes disconnect handling idempotent.
    pub async fn unregister(&self, connection_id: &str) -> Option<ConnectionMeta> {
        let mut entries = self.entries.write().await;
        entries.remove(connection_id).map(|e| e.meta)
    }

    /// Current members of a room, recomputed on each call.
    pub async fn members_of(&self, exam_id: &str) -> Vec<String> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|(_, e)| e.meta.exam_id.as_deref() == Some(exam_id))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Room members with their outbound senders, minus an optional excluded
    /// connection. Derived under the same lock that register/unregister take,
    /// so a connection mid-removal is never observed.
    pub(crate) async fn members_with_senders(
        &self,
        exam_id: &str,
        exclude: Option<&str>,
    ) -> Vec<(String, mpsc::UnboundedSender<Message>)> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|(id, e)| {
                e.meta.exam_id.as_deref() == Some(exam_id) && Some(id.as_str()) != exclude
            })
            .map(|(id, e)| (id.clone(), e.sender.clone()))
            .collect()
    }

    pub(crate) async fn sender_of(
        &self,
        connection_id: &str,
    ) -> Option<mpsc::UnboundedSender<Message>> {
        let entries = self.entries.read().await;
        entries.get(connection_id).map(|e| e.sender.clone())
    }

    pub async fn connection_count(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }
}
