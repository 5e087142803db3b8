//! Per-connection handles held by a table.

use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::GameMessage;
use crate::game::entities::Username;

pub type ClientId = Uuid;

/// A table's side of one connection: who it is and where to push outbound
/// envelopes. The table holds the only sender, so dropping the handle closes
/// the connection's outbound queue.
#[derive(Debug)]
pub struct ClientHandle {
    pub id: ClientId,
    pub username: Username,
    pub outbound: mpsc::Sender<GameMessage>,
}

impl ClientHandle {
    /// Creates a handle with a fresh id and a bounded outbound queue. The
    /// receiver goes to whoever writes to the transport.
    pub fn new(username: Username, capacity: usize) -> (Self, mpsc::Receiver<GameMessage>) {
        let (outbound, receiver) = mpsc::channel(capacity);
        let handle = Self {
            id: Uuid::new_v4(),
            username,
            outbound,
        };
        (handle, receiver)
    }
}
