//! TCP game server.
//!
//! Threading model:
//! - the calling thread accepts clients, performs handshakes, then runs the
//!   [`Session`] loop, which alone owns the engine;
//! - every registered client gets a reader thread that forwards parsed
//!   commands into one `mpsc` channel;
//! - writes go straight to the sockets through an [`Outbox`] with a write
//!   timeout, so a stuck client cannot stall the others for long.

mod connection;
mod outbox;
mod session;

use std::io::BufReader;
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use tracing::{info, instrument, warn};

pub use connection::{read_loop, spawn_reader, Inbound, InboundKind};
pub use outbox::{Outbox, RecordingOutbox, TcpOutbox};
pub use session::Session;

use crate::config::{GameConfig, ServerConfig};
use crate::engine::Engine;
use crate::error::{ProtocolError, ServerError};
use crate::game::GameSummary;
use crate::protocol::{read_message, ClientMessage};

/// Bind the configured address and play one game.
///
/// # Errors
///
/// See [`serve`].
pub fn run(server: &ServerConfig, game: GameConfig) -> Result<GameSummary, ServerError> {
    let listener = TcpListener::bind(server.listen)?;
    serve(&listener, server, game)
}

/// Play one game on an already bound listener.
///
/// Accepts exactly the configured number of players, starts the game and
/// runs it to the end. The summary is written to the report file, if one is
/// configured.
///
/// # Errors
///
/// Returns an error if the listener fails, the engine rejects the
/// configuration, or a registered client leaves before the game starts.
#[instrument(skip_all, fields(addr = ?listener.local_addr().ok()))]
pub fn serve(listener: &TcpListener, server: &ServerConfig, game: GameConfig) -> Result<GameSummary, ServerError> {
    let players = game.players;
    let mut engine = Engine::new(game)?;
    let (tx, rx) = mpsc::channel();
    let mut outbox = TcpOutbox::new();

    info!(players, "waiting for players");
    while engine.state().players.len() < players {
        let (stream, peer) = listener.accept()?;
        if let Err(e) = check_forming(&rx) {
            outbox.close();
            return Err(e);
        }

        let (nickname, reader) = match handshake(&stream, server) {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(%peer, error = %e, "handshake failed, dropping connection");
                continue;
            }
        };

        let player = engine.join(&nickname)?;
        stream.set_write_timeout(Some(server.write_timeout))?;
        outbox.register(player, stream);
        spawn_reader(player, reader, tx.clone())?;
        info!(player, %peer, nickname, "client registered");
    }
    drop(tx);
    if let Err(e) = check_forming(&rx) {
        outbox.close();
        return Err(e);
    }

    let start_events = engine.start()?;
    let (summary, _) = Session::new(engine, outbox, rx).run(&start_events);

    if let Some(path) = &server.report {
        summary.save(path)?;
        info!(path = %path.display(), "summary written");
    }
    Ok(summary)
}

/// Read the `client_desc` handshake.
fn handshake(
    stream: &TcpStream,
    server: &ServerConfig,
) -> Result<(String, BufReader<TcpStream>), ProtocolError> {
    stream.set_read_timeout(Some(server.handshake_timeout))?;
    let mut reader = BufReader::new(stream.try_clone()?);

    match read_message(&mut reader)? {
        ClientMessage::ClientDesc { nickname } => {
            stream.set_read_timeout(None)?;
            Ok((nickname, reader))
        }
        other => Err(ProtocolError::Unexpected {
            expected: "client_desc",
            got: other.kind(),
        }),
    }
}

/// Abort forming if a registered client already left.
///
/// Commands sent before the game starts are dropped.
fn check_forming(inbound: &Receiver<Inbound>) -> Result<(), ServerError> {
    loop {
        match inbound.try_recv() {
            Ok(Inbound {
                kind: InboundKind::Disconnected(lost),
                ..
            }) => return Err(ServerError::FormingAborted(lost)),
            Ok(Inbound { player, .. }) => {
                warn!(player, "command before game start ignored");
            }
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(()),
        }
    }
}
