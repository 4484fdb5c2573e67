use thiserror::Error;

/// Error taxonomy for the signaling relay.
///
/// Only conditions the relay itself can hit live here. Vanished delivery
/// targets are not errors (see `relay::Delivery::NotFound`), and nothing is
/// ever reported back to a remote client over the wire.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The transport layer guarantees unique connection ids, so this firing
    /// means a broken invariant, not a recoverable condition.
    #[error("Connection {0} already registered")]
    DuplicateConnection(String),

    /// A message that needs a routing target arrived without one. Logged and
    /// dropped; the sending client keeps its connection.
    #[error("Missing routing target: {0}")]
    MissingTarget(&'static str),

    #[error("Failed to serialize message: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
