//! Blocking client and a local mirror of the game.
//!
//! [`ClientBoard`] rebuilds a [`Board`] from `game_start` and keeps it in
//! step with the `battle` and `end_turn` broadcasts, so an agent can run the
//! same queries as the server ([`regions_of`](crate::game::regions_of),
//! [`possible_attacks`]) on its own copy.

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufReader;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::ProtocolError;
use crate::game::{possible_attacks, Area, AreaId, Board, PlayerId};
use crate::protocol::{read_message, write_message, AreaInfo, BattleSide, ClientMessage, ServerMessage};

/// What a client knows about the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientBoard {
    /// This client's player id.
    pub player: PlayerId,
    /// Mirrored board.
    pub board: Board,
    /// Turn order.
    pub order: Vec<PlayerId>,
    /// Player who moves now.
    pub current_player: PlayerId,
    /// Nickname of every player.
    pub nicknames: BTreeMap<PlayerId, String>,
    /// Last announced scores.
    pub scores: BTreeMap<PlayerId, u32>,
    /// Last announced reserves.
    pub reserves: BTreeMap<PlayerId, u32>,
    /// Players out of the rotation.
    pub eliminated: BTreeSet<PlayerId>,
    /// Set once `game_end` arrived.
    pub finished: bool,
    /// Winner from `game_end`.
    pub winner: Option<PlayerId>,
}

impl ClientBoard {
    /// Build the mirror from a `game_start` message.
    ///
    /// Returns `None` for any other message.
    #[must_use]
    pub fn from_game_start(message: &ServerMessage) -> Option<Self> {
        let ServerMessage::GameStart {
            player,
            current_player,
            order,
            nicknames,
            board,
            ..
        } = message
        else {
            return None;
        };

        let areas = board.iter().map(|(&id, info)| mirror_area(id, info));
        Some(Self {
            player: *player,
            board: Board::from_areas(areas),
            order: order.clone(),
            current_player: *current_player,
            nicknames: nicknames.clone(),
            scores: order.iter().map(|&p| (p, 0)).collect(),
            reserves: order.iter().map(|&p| (p, 0)).collect(),
            eliminated: BTreeSet::new(),
            finished: false,
            winner: None,
        })
    }

    /// Fold a broadcast into the mirror.
    pub fn apply(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::GameStart { .. } => {
                if let Some(fresh) = Self::from_game_start(message) {
                    *self = fresh;
                }
            }
            ServerMessage::TurnPrompt { current_player, .. } => {
                self.current_player = *current_player;
            }
            ServerMessage::Battle { result, score } => {
                self.set_side(&result.atk);
                self.set_side(&result.def);
                self.scores.clone_from(score);
            }
            ServerMessage::EndTurn {
                areas,
                current_player,
                reserves,
            } => {
                for (&id, state) in areas {
                    if let Some(area) = self.board.get_mut(id) {
                        area.owner = state.owner;
                        area.dice = state.dice;
                    }
                }
                self.current_player = *current_player;
                self.reserves.clone_from(reserves);
            }
            ServerMessage::PlayerEliminated { player, .. } => {
                self.eliminated.insert(*player);
            }
            ServerMessage::Error { .. } => {}
            ServerMessage::GameEnd { winner } => {
                self.finished = true;
                self.winner = *winner;
            }
        }
    }

    /// Whether this client is expected to move.
    #[must_use]
    pub fn is_my_turn(&self) -> bool {
        !self.finished && self.current_player == self.player
    }

    /// Attacks this client could make now.
    #[must_use]
    pub fn possible_attacks(&self) -> Vec<(AreaId, AreaId)> {
        possible_attacks(&self.board, self.player)
    }

    fn set_side(&mut self, side: &BattleSide) {
        if let Some(area) = self.board.get_mut(side.name) {
            area.owner = side.owner;
            area.dice = side.dice;
        }
    }
}

fn mirror_area(id: AreaId, info: &AreaInfo) -> Area {
    let mut area = Area::new(id, info.hexes.clone());
    area.owner = info.owner;
    area.dice = info.dice;
    area.neighbors = info.neighbours.iter().copied().filter(|&n| n != id).collect();
    area
}

/// A connected player.
#[derive(Debug)]
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    mirror: Option<ClientBoard>,
}

impl Client {
    /// Connect and send the handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the handshake write fails.
    pub fn connect(addr: impl ToSocketAddrs, nickname: &str) -> Result<Self, ProtocolError> {
        let writer = TcpStream::connect(addr)?;
        let reader = BufReader::new(writer.try_clone()?);
        let mut client = Self {
            reader,
            writer,
            mirror: None,
        };
        client.send(&ClientMessage::ClientDesc {
            nickname: nickname.to_string(),
        })?;
        Ok(client)
    }

    /// Limit how long [`Client::recv`] blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket rejects the timeout.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<(), ProtocolError> {
        self.writer.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Wait for the next server message and fold it into the mirror.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Closed`] once the server hung up, or any
    /// read or decode error.
    pub fn recv(&mut self) -> Result<ServerMessage, ProtocolError> {
        let message: ServerMessage = read_message(&mut self.reader)?;
        debug!(kind = message.kind(), "received");
        match &mut self.mirror {
            Some(mirror) => mirror.apply(&message),
            None => self.mirror = ClientBoard::from_game_start(&message),
        }
        Ok(message)
    }

    /// Send any client message.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn send(&mut self, message: &ClientMessage) -> Result<(), ProtocolError> {
        write_message(&mut self.writer, message)
    }

    /// Attack `target` from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn attack(&mut self, source: AreaId, target: AreaId) -> Result<(), ProtocolError> {
        self.send(&ClientMessage::Battle {
            attacker: source,
            defender: target,
        })
    }

    /// End the turn.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn end_turn(&mut self) -> Result<(), ProtocolError> {
        self.send(&ClientMessage::EndTurn)
    }

    /// The mirror, once `game_start` arrived.
    #[must_use]
    pub const fn mirror(&self) -> Option<&ClientBoard> {
        self.mirror.as_ref()
    }

    /// This client's player id, once `game_start` arrived.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        self.mirror.as_ref().map(|m| m.player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{regions_of, Hex};
    use crate::protocol::{AreaState, BattleResult};

    fn start_message() -> ServerMessage {
        let info = |owner, dice, neighbours: Vec<AreaId>| AreaInfo {
            owner,
            dice,
            neighbours,
            hexes: vec![Hex::new(0, 0)],
        };
        ServerMessage::GameStart {
            player: 1,
            no_players: 2,
            current_player: 1,
            order: vec![1, 2],
            nicknames: BTreeMap::from([(1, "a".to_string()), (2, "b".to_string())]),
            board: BTreeMap::from([
                (1, info(1, 4, vec![2])),
                (2, info(2, 2, vec![1, 3])),
                (3, info(1, 1, vec![2])),
            ]),
        }
    }

    #[test]
    fn test_mirror_from_game_start() {
        let mirror = ClientBoard::from_game_start(&start_message()).unwrap();
        assert_eq!(mirror.board.len(), 3);
        assert!(mirror.board.is_symmetric());
        assert!(mirror.is_my_turn());
        assert_eq!(mirror.possible_attacks(), vec![(1, 2)]);
        assert_eq!(regions_of(&mirror.board, 1, None).len(), 2);

        assert!(ClientBoard::from_game_start(&ServerMessage::GameEnd { winner: None }).is_none());
    }

    #[test]
    fn test_battle_and_end_turn_deltas() {
        let mut mirror = ClientBoard::from_game_start(&start_message()).unwrap();
        mirror.apply(&ServerMessage::Battle {
            result: BattleResult {
                atk: BattleSide {
                    name: 1,
                    dice: 1,
                    owner: 1,
                },
                def: BattleSide {
                    name: 2,
                    dice: 3,
                    owner: 1,
                },
                atk_roll: vec![6, 6, 6, 6],
                def_roll: vec![1, 1],
            },
            score: BTreeMap::from([(1, 1), (2, 0)]),
        });
        assert_eq!(mirror.board.get(2).unwrap().owner, 1);
        assert_eq!(mirror.board.get(1).unwrap().dice, 1);
        assert_eq!(mirror.scores[&1], 1);
        assert_eq!(regions_of(&mirror.board, 1, None).len(), 1);

        mirror.apply(&ServerMessage::EndTurn {
            areas: BTreeMap::from([(1, AreaState { owner: 1, dice: 5 })]),
            current_player: 2,
            reserves: BTreeMap::from([(1, 2), (2, 0)]),
        });
        assert_eq!(mirror.board.get(1).unwrap().dice, 5);
        assert_eq!(mirror.reserves[&1], 2);
        assert!(!mirror.is_my_turn());
    }

    #[test]
    fn test_elimination_and_game_end() {
        let mut mirror = ClientBoard::from_game_start(&start_message()).unwrap();
        mirror.apply(&ServerMessage::PlayerEliminated {
            player: 2,
            reason: crate::game::EliminationReason::Conquered,
        });
        mirror.apply(&ServerMessage::GameEnd { winner: Some(1) });

        assert!(mirror.eliminated.contains(&2));
        assert!(mirror.finished);
        assert_eq!(mirror.winner, Some(1));
        assert!(!mirror.is_my_turn());
    }

    #[test]
    fn test_unknown_area_in_delta_ignored() {
        let mut mirror = ClientBoard::from_game_start(&start_message()).unwrap();
        let before = mirror.board.clone();
        mirror.apply(&ServerMessage::EndTurn {
            areas: BTreeMap::from([(99, AreaState { owner: 2, dice: 8 })]),
            current_player: 2,
            reserves: BTreeMap::new(),
        });
        assert_eq!(mirror.board, before);
    }
}
