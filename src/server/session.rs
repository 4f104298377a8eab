//! The game loop.
//!
//! A [`Session`] owns the engine and is the only consumer of the inbound
//! channel. It prompts the current player, waits for a command until the turn
//! deadline, applies it and broadcasts what happened. The loop needs no
//! sockets: any [`Outbox`] and any channel will do.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::engine::{Engine, Event};
use crate::error::TurnTimeout;
use crate::game::{GameSummary, PlayerId};
use crate::protocol::ServerMessage;
use crate::server::{Inbound, InboundKind, Outbox};

/// A started game together with its clients.
#[derive(Debug)]
pub struct Session<O: Outbox> {
    engine: Engine,
    outbox: O,
    inbound: Receiver<Inbound>,
    turn_timeout: Duration,
}

impl<O: Outbox> Session<O> {
    /// Wrap an engine whose game has started.
    pub fn new(engine: Engine, outbox: O, inbound: Receiver<Inbound>) -> Self {
        let turn_timeout = engine.config().turn_timeout;
        Self {
            engine,
            outbox,
            inbound,
            turn_timeout,
        }
    }

    /// Read access to the engine.
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Play the game to the end.
    ///
    /// `start_events` are the events returned by [`Engine::start`]. Returns the
    /// summary and the outbox, which is closed by then.
    #[instrument(skip_all)]
    pub fn run(mut self, start_events: &[Event]) -> (GameSummary, O) {
        let state = self.engine.state();
        for player in state.players.iter().map(|p| p.id) {
            let message = ServerMessage::game_start(state, player);
            self.outbox.send(player, &message);
        }
        self.broadcast(start_events);

        while let Some(current) = self.engine.current_player() {
            self.play_turn(current);
        }

        // Anything still queued is stale
        let dropped = self.inbound.try_iter().count();
        if dropped > 0 {
            debug!(dropped, "discarded pending messages");
        }
        self.outbox.close();

        let summary = self.engine.summary();
        info!(winner = ?summary.winner, battles = summary.battles, "session finished");
        (summary, self.outbox)
    }

    /// Prompt `current` and handle input until control moves on.
    fn play_turn(&mut self, current: PlayerId) {
        let timeout_ms = u64::try_from(self.turn_timeout.as_millis()).unwrap_or(u64::MAX);
        self.outbox.send(
            current,
            &ServerMessage::TurnPrompt {
                current_player: current,
                timeout_ms,
            },
        );
        let deadline = Instant::now() + self.turn_timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let events = match self.inbound.recv_timeout(remaining) {
                Ok(Inbound {
                    player,
                    kind: InboundKind::Command(command),
                }) => match self.engine.apply(player, command) {
                    Ok(events) => events,
                    Err(violation) => {
                        debug!(player, %violation, "command rejected");
                        self.outbox.send(
                            player,
                            &ServerMessage::Error {
                                reason: violation.to_string(),
                            },
                        );
                        continue;
                    }
                },
                Ok(Inbound {
                    player,
                    kind: InboundKind::Disconnected(lost),
                }) => {
                    info!(%lost, "client gone");
                    self.outbox.disconnect(player);
                    let events = self.engine.disconnect(player);
                    if player != current && !self.engine.is_finished() {
                        self.broadcast(&events);
                        continue;
                    }
                    events
                }
                Err(RecvTimeoutError::Timeout) => {
                    let expired = TurnTimeout {
                        player: current,
                        timeout_ms,
                    };
                    warn!(%expired, "turn expired");
                    self.engine.timeout(current)
                }
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("all clients gone");
                    self.abandon()
                }
            };

            self.broadcast(&events);
            return;
        }
    }

    /// Forfeit everyone still in play.
    fn abandon(&mut self) -> Vec<Event> {
        let players: Vec<PlayerId> = self.engine.state().players.iter().map(|p| p.id).collect();
        let mut events = Vec::new();
        for player in players {
            events.extend(self.engine.disconnect(player));
        }
        events
    }

    fn broadcast(&mut self, events: &[Event]) {
        for message in events.iter().filter_map(ServerMessage::from_event) {
            self.outbox.broadcast(&message);
        }
    }
}
