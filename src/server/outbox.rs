//! Outbound fan-out.
//!
//! Delivery is best effort per client: a failed write marks that client dead
//! and never affects the others.
//!
//! Writes happen one client after another on the session thread. A peer that
//! stops reading stalls the recipients after it for at most the socket write
//! timeout ([`ServerConfig::write_timeout`](crate::config::ServerConfig)),
//! after which it is dropped like any other failed client.

use std::collections::BTreeMap;
use std::io::Write;
use std::net::{Shutdown, TcpStream};

use tracing::{debug, warn};

use crate::game::PlayerId;
use crate::protocol::{encode, ServerMessage};

/// Destination for server messages.
pub trait Outbox {
    /// Send a message to one player.
    fn send(&mut self, player: PlayerId, message: &ServerMessage);

    /// Send a message to every connected player.
    fn broadcast(&mut self, message: &ServerMessage);

    /// Stop sending to a player.
    fn disconnect(&mut self, player: PlayerId);

    /// Close every connection.
    fn close(&mut self);
}

/// [`Outbox`] over TCP sockets.
#[derive(Debug, Default)]
pub struct TcpOutbox {
    clients: BTreeMap<PlayerId, TcpStream>,
}

impl TcpOutbox {
    /// Create an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client's write half.
    pub fn register(&mut self, player: PlayerId, stream: TcpStream) {
        self.clients.insert(player, stream);
    }

    /// Players still reachable.
    #[must_use]
    pub fn connected(&self) -> Vec<PlayerId> {
        self.clients.keys().copied().collect()
    }

    fn write(&mut self, player: PlayerId, line: &[u8]) {
        let Some(stream) = self.clients.get_mut(&player) else {
            return;
        };
        if let Err(e) = stream.write_all(line).and_then(|()| stream.flush()) {
            warn!(player, error = %e, "write failed, dropping client");
            self.disconnect(player);
        }
    }
}

impl Outbox for TcpOutbox {
    fn send(&mut self, player: PlayerId, message: &ServerMessage) {
        match encode(message) {
            Ok(line) => self.write(player, &line),
            Err(e) => warn!(error = %e, kind = message.kind(), "failed to encode message"),
        }
    }

    fn broadcast(&mut self, message: &ServerMessage) {
        let line = match encode(message) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, kind = message.kind(), "failed to encode message");
                return;
            }
        };
        for player in self.connected() {
            self.write(player, &line);
        }
    }

    fn disconnect(&mut self, player: PlayerId) {
        if let Some(stream) = self.clients.remove(&player) {
            debug!(player, "closing connection");
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    fn close(&mut self) {
        for player in self.connected() {
            self.disconnect(player);
        }
    }
}

/// [`Outbox`] that records everything, for driving a session without sockets.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingOutbox {
    /// Messages in send order, with their recipient.
    pub sent: Vec<(PlayerId, ServerMessage)>,
    /// Players that can still receive messages.
    pub connected: Vec<PlayerId>,
    /// Whether [`Outbox::close`] was called.
    pub closed: bool,
}

impl RecordingOutbox {
    /// Outbox with the given players connected.
    #[must_use]
    pub fn new(players: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            sent: Vec::new(),
            connected: players.into_iter().collect(),
            closed: false,
        }
    }

    /// Messages received by one player.
    #[must_use]
    pub fn received(&self, player: PlayerId) -> Vec<&ServerMessage> {
        self.sent
            .iter()
            .filter(|(to, _)| *to == player)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Outbox for RecordingOutbox {
    fn send(&mut self, player: PlayerId, message: &ServerMessage) {
        if self.connected.contains(&player) {
            self.sent.push((player, message.clone()));
        }
    }

    fn broadcast(&mut self, message: &ServerMessage) {
        for &player in &self.connected {
            self.sent.push((player, message.clone()));
        }
    }

    fn disconnect(&mut self, player: PlayerId) {
        self.connected.retain(|&p| p != player);
    }

    fn close(&mut self) {
        self.connected.clear();
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Read};
    use std::net::TcpListener;

    use super::*;
    use crate::protocol::read_message;

    #[test]
    fn test_recording_outbox_respects_disconnects() {
        let mut outbox = RecordingOutbox::new([1, 2]);
        outbox.broadcast(&ServerMessage::GameEnd { winner: None });
        outbox.disconnect(2);
        outbox.send(2, &ServerMessage::GameEnd { winner: None });
        outbox.broadcast(&ServerMessage::GameEnd { winner: Some(1) });

        assert_eq!(outbox.received(1).len(), 2);
        assert_eq!(outbox.received(2).len(), 1);
    }

    #[test]
    fn test_tcp_outbox_delivers_and_closes() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server_side, _) = listener.accept().unwrap();

        let mut outbox = TcpOutbox::new();
        outbox.register(1, server_side);
        outbox.broadcast(&ServerMessage::GameEnd { winner: Some(1) });
        outbox.close();
        assert!(outbox.connected().is_empty());

        let mut reader = BufReader::new(client);
        let msg: ServerMessage = read_message(&mut reader).unwrap();
        assert_eq!(msg, ServerMessage::GameEnd { winner: Some(1) });

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn test_dead_client_does_not_block_others() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let _dead_peer = TcpStream::connect(addr).unwrap();
        let (dead, _) = listener.accept().unwrap();
        let live_peer = TcpStream::connect(addr).unwrap();
        let (live, _) = listener.accept().unwrap();

        // Writes to a shut-down socket fail at once
        dead.shutdown(Shutdown::Write).unwrap();
        let mut outbox = TcpOutbox::new();
        outbox.register(1, dead);
        outbox.register(2, live);

        outbox.broadcast(&ServerMessage::GameEnd { winner: None });
        outbox.send(1, &ServerMessage::GameEnd { winner: Some(1) });
        outbox.broadcast(&ServerMessage::GameEnd { winner: Some(2) });
        assert_eq!(outbox.connected(), vec![2]);

        outbox.close();
        let mut reader = BufReader::new(live_peer);
        let first: ServerMessage = read_message(&mut reader).unwrap();
        let second: ServerMessage = read_message(&mut reader).unwrap();
        assert_eq!(first, ServerMessage::GameEnd { winner: None });
        assert_eq!(second, ServerMessage::GameEnd { winner: Some(2) });
    }
}
