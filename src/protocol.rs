//! Client/server wire protocol.
//!
//! Messages are JSON objects, one per line, tagged by a `"type"` field.
//! Raw JSON never crosses this module boundary: the engine only sees
//! [`Command`](crate::engine::Command)s and emits
//! [`Event`](crate::engine::Event)s.

mod codec;
mod messages;

pub use codec::{decode, encode, read_message, write_message, MAX_LINE_LEN};
pub use messages::{
    AreaInfo, AreaState, BattleResult, BattleSide, ClientMessage, ServerMessage,
};
