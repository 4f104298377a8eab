//! Per-client reader threads.
//!
//! Each connection parses one message at a time and forwards it into the
//! single inbound channel consumed by the session loop.

use std::io::{BufRead, BufReader};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::engine::Command;
use crate::error::{ConnectionLost, ProtocolError};
use crate::game::PlayerId;
use crate::protocol::{read_message, ClientMessage};

/// What a client sent, or that it went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundKind {
    /// A game command.
    Command(Command),
    /// The connection closed or was dropped for a protocol error.
    Disconnected(ConnectionLost),
}

/// One entry on the inbound channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inbound {
    /// Sender.
    pub player: PlayerId,
    /// Payload.
    pub kind: InboundKind,
}

impl Inbound {
    /// A command from `player`.
    #[must_use]
    pub const fn command(player: PlayerId, command: Command) -> Self {
        Self {
            player,
            kind: InboundKind::Command(command),
        }
    }

    /// `player`'s connection is gone.
    #[must_use]
    pub const fn disconnected(player: PlayerId) -> Self {
        Self {
            player,
            kind: InboundKind::Disconnected(ConnectionLost { player }),
        }
    }
}

/// Forward messages from `reader` until the stream ends or misbehaves.
///
/// Always finishes by sending [`InboundKind::Disconnected`]. Returns the
/// protocol error that ended the loop, if any.
pub fn read_loop<R: BufRead>(
    player: PlayerId,
    reader: &mut R,
    inbound: &Sender<Inbound>,
) -> Option<ProtocolError> {
    let error = loop {
        let message = match read_message::<_, ClientMessage>(reader) {
            Ok(message) => message,
            Err(ProtocolError::Closed) => break None,
            Err(e) => break Some(e),
        };

        let Some(command) = message.to_command() else {
            break Some(ProtocolError::Unexpected {
                expected: "battle or end_turn",
                got: message.kind(),
            });
        };
        if inbound.send(Inbound::command(player, command)).is_err() {
            // Session is gone
            return None;
        }
    };

    let _ = inbound.send(Inbound::disconnected(player));
    error
}

/// Spawn the reader thread of a registered client.
pub fn spawn_reader(
    player: PlayerId,
    mut reader: BufReader<TcpStream>,
    inbound: Sender<Inbound>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("reader-{player}"))
        .spawn(move || {
            match read_loop(player, &mut reader, &inbound) {
                Some(e) => {
                    warn!(player, error = %e, "dropping connection");
                    let _ = reader.get_ref().shutdown(Shutdown::Both);
                }
                None => debug!(player, "connection closed"),
            }
        })
}
