//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between a front-end and the API
//! server. The socket is a push channel for store changes; all mutations go
//! through the REST endpoints.

use fact_tutor_core::{StoreEvent, StoreState};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client TO the Server
//=========================================================================================

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Asks for a fresh full snapshot, e.g. after the client fell behind.
    Resync,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client
//=========================================================================================

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The full store state. Sent on connect and on `Resync`.
    Snapshot { state: Box<StoreState> },

    /// A single store change, in the order the store applied it.
    Event { event: StoreEvent },

    /// The client was too slow and missed events; it should resync.
    Lagged { skipped: u64 },

    /// Reports a protocol problem to the client.
    Error { message: String },
}
