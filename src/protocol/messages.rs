//! Wire messages.
//!
//! Both directions are closed tagged enums: the `"type"` field selects the
//! variant, every other field belongs to it. Maps keyed by area or player id
//! use JSON string keys (`{"3": ...}`).

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::{Command, Event};
use crate::game::{
    AreaId, AreaSnapshot, BattleOutcome, EliminationReason, GameState, Hex, PlayerId,
};

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Handshake, sent once right after connecting.
    ClientDesc {
        /// Name to show to other players.
        nickname: String,
    },
    /// Attack `defender` from `attacker`.
    Battle {
        /// Attacking area.
        attacker: AreaId,
        /// Attacked area.
        defender: AreaId,
    },
    /// End the turn.
    EndTurn,
}

impl ClientMessage {
    /// Tag of this message, for error reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ClientDesc { .. } => "client_desc",
            Self::Battle { .. } => "battle",
            Self::EndTurn => "end_turn",
        }
    }

    /// The game command this message carries, if any.
    #[must_use]
    pub const fn to_command(&self) -> Option<Command> {
        match *self {
            Self::ClientDesc { .. } => None,
            Self::Battle { attacker, defender } => Some(Command::Attack {
                source: attacker,
                target: defender,
            }),
            Self::EndTurn => Some(Command::EndTurn),
        }
    }
}

impl From<Command> for ClientMessage {
    fn from(command: Command) -> Self {
        match command {
            Command::Attack { source, target } => Self::Battle {
                attacker: source,
                defender: target,
            },
            Command::EndTurn => Self::EndTurn,
        }
    }
}

/// Full description of one area, sent at game start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaInfo {
    /// Owning player.
    pub owner: PlayerId,
    /// Dice on the area.
    pub dice: u8,
    /// Adjacent area ids.
    pub neighbours: Vec<AreaId>,
    /// Grid cells of the area.
    pub hexes: Vec<Hex>,
}

/// Owner and dice of an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaState {
    /// Owning player.
    pub owner: PlayerId,
    /// Dice on the area.
    pub dice: u8,
}

/// One side of a battle, after the battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSide {
    /// Area id.
    pub name: AreaId,
    /// Dice on the area.
    pub dice: u8,
    /// Owning player.
    pub owner: PlayerId,
}

impl From<AreaSnapshot> for BattleSide {
    fn from(area: AreaSnapshot) -> Self {
        Self {
            name: area.id,
            dice: area.dice,
            owner: area.owner,
        }
    }
}

/// Result block of a `battle` broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    /// Attacking area.
    pub atk: BattleSide,
    /// Attacked area.
    pub def: BattleSide,
    /// Attacker dice faces.
    pub atk_roll: Vec<u8>,
    /// Defender dice faces.
    pub def_roll: Vec<u8>,
}

impl From<&BattleOutcome> for BattleResult {
    fn from(outcome: &BattleOutcome) -> Self {
        Self {
            atk: outcome.source.into(),
            def: outcome.target.into(),
            atk_roll: outcome.attacker_rolls.clone(),
            def_roll: outcome.defender_rolls.clone(),
        }
    }
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Initial state, one per client.
    GameStart {
        /// The receiving client's player id.
        player: PlayerId,
        /// Number of players.
        no_players: usize,
        /// First player to move.
        current_player: PlayerId,
        /// Turn order.
        order: Vec<PlayerId>,
        /// Nickname of every player.
        #[serde(deserialize_with = "int_keys")]
        nicknames: BTreeMap<PlayerId, String>,
        /// Every area.
        #[serde(deserialize_with = "int_keys")]
        board: BTreeMap<AreaId, AreaInfo>,
    },
    /// Sent to the current player when a command is expected.
    TurnPrompt {
        /// The prompted player.
        current_player: PlayerId,
        /// Time left to answer.
        timeout_ms: u64,
    },
    /// A battle was resolved.
    Battle {
        /// Areas and rolls.
        result: BattleResult,
        /// Score of every player.
        #[serde(deserialize_with = "int_keys")]
        score: BTreeMap<PlayerId, u32>,
    },
    /// A turn ended.
    EndTurn {
        /// Areas that received reinforcements.
        #[serde(deserialize_with = "int_keys")]
        areas: BTreeMap<AreaId, AreaState>,
        /// Player who moves next.
        current_player: PlayerId,
        /// Reserve dice of every player.
        #[serde(deserialize_with = "int_keys")]
        reserves: BTreeMap<PlayerId, u32>,
    },
    /// A player left the rotation.
    PlayerEliminated {
        /// The player.
        player: PlayerId,
        /// Why they left.
        reason: EliminationReason,
    },
    /// The last command was rejected.
    Error {
        /// Human-readable reason.
        reason: String,
    },
    /// The game is over; the connection closes after this.
    GameEnd {
        /// Winning player.
        winner: Option<PlayerId>,
    },
}

impl ServerMessage {
    /// Tag of this message, for error reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::GameStart { .. } => "game_start",
            Self::TurnPrompt { .. } => "turn_prompt",
            Self::Battle { .. } => "battle",
            Self::EndTurn { .. } => "end_turn",
            Self::PlayerEliminated { .. } => "player_eliminated",
            Self::Error { .. } => "error",
            Self::GameEnd { .. } => "game_end",
        }
    }

    /// Build the `game_start` message for one player.
    #[must_use]
    pub fn game_start(state: &GameState, player: PlayerId) -> Self {
        Self::GameStart {
            player,
            no_players: state.players.len(),
            current_player: state.current_player().unwrap_or(0),
            order: state.turn_order.players().to_vec(),
            nicknames: state
                .players
                .iter()
                .map(|p| (p.id, p.nickname.clone()))
                .collect(),
            board: state
                .board
                .areas()
                .map(|a| {
                    (
                        a.id,
                        AreaInfo {
                            owner: a.owner,
                            dice: a.dice,
                            neighbours: a.neighbors.iter().copied().collect(),
                            hexes: a.hexes.clone(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// The broadcast for an engine event.
    ///
    /// [`Event::GameStarted`] has none; `game_start` is per player.
    #[must_use]
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::GameStarted { .. } => None,
            Event::Battle { outcome, scores } => Some(Self::Battle {
                result: outcome.into(),
                score: scores.clone(),
            }),
            Event::TurnEnded {
                areas,
                current_player,
                reserves,
                ..
            } => Some(Self::EndTurn {
                areas: areas
                    .iter()
                    .map(|a| {
                        (
                            a.id,
                            AreaState {
                                owner: a.owner,
                                dice: a.dice,
                            },
                        )
                    })
                    .collect(),
                current_player: *current_player,
                reserves: reserves.clone(),
            }),
            Event::PlayerEliminated { player, reason } => Some(Self::PlayerEliminated {
                player: *player,
                reason: *reason,
            }),
            Event::GameOver { winner } => Some(Self::GameEnd { winner: *winner }),
        }
    }
}

/// Deserialize a map whose integer keys arrive as JSON strings.
fn int_keys<'de, D, K, V>(deserializer: D) -> Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: FromStr + Ord,
    V: Deserialize<'de>,
{
    BTreeMap::<String, V>::deserialize(deserializer)?
        .into_iter()
        .map(|(key, value)| {
            key.parse()
                .map(|key| (key, value))
                .map_err(|_| D::Error::custom(format!("invalid map key {key:?}")))
        })
        .collect()
}
