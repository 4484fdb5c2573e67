mod integrity;
mod lifecycle;
mod messages;
mod registry;
mod router;
mod server;
mod signaling;

pub use messages::{ClientMessage, ServerMessage, TargetRole};
pub use registry::{ConnectionMeta, ConnectionRegistry, Role};
pub use router::{Delivery, RoomRouter};
pub use server::RelayServer;
