//! Game state management.

use crate::game::{Board, GameSummary, Player, PlayerId};

/// Maximum number of players in a game.
pub const MAX_PLAYERS: usize = 8;

/// Upper bound on dice a player can keep in reserve.
pub const MAX_RESERVE: u32 = 64;

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for players to join.
    Forming,
    /// Turns are being played.
    InProgress,
    /// The game is over.
    Finished {
        /// Winning player, `None` if nobody was left.
        winner: Option<PlayerId>,
    },
}

/// Fixed cyclic turn order.
///
/// Players are never removed; inactive entries are skipped when advancing,
/// so the full order stays available for auditing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnOrder {
    order: Vec<PlayerId>,
    position: usize,
}

impl TurnOrder {
    /// Create a turn order starting at its first entry.
    #[must_use]
    pub const fn new(order: Vec<PlayerId>) -> Self {
        Self { order, position: 0 }
    }

    /// All players in turn order.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.order
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn current(&self) -> Option<PlayerId> {
        self.order.get(self.position).copied()
    }

    /// Move to the next player accepted by `is_active`.
    ///
    /// Looks at most one full cycle ahead, wrapping back to the current
    /// player last. Returns `None` (and stays put) if nobody qualifies.
    pub fn advance(&mut self, is_active: impl Fn(PlayerId) -> bool) -> Option<PlayerId> {
        let len = self.order.len();
        for step in 1..=len {
            let candidate = (self.position + step) % len;
            if is_active(self.order[candidate]) {
                self.position = candidate;
                return Some(self.order[candidate]);
            }
        }
        None
    }
}

/// Complete game state.
#[derive(Debug, Clone)]
pub struct GameState {
    /// The playing field.
    pub board: Board,
    /// All players, indexed by `id - 1`.
    pub players: Vec<Player>,
    /// Cyclic order of play.
    pub turn_order: TurnOrder,
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Attacks made by the current player this turn.
    pub attacks_this_turn: u32,
    /// Battles resolved since the game started.
    pub battles: u64,
    /// Turns completed since the game started.
    pub turns: u32,
}

impl GameState {
    /// Create a forming game on the given board.
    #[must_use]
    pub const fn new(board: Board) -> Self {
        Self {
            board,
            players: Vec::new(),
            turn_order: TurnOrder {
                order: Vec::new(),
                position: 0,
            },
            phase: Phase::Forming,
            attacks_this_turn: 0,
            battles: 0,
            turns: 0,
        }
    }

    /// Get a player by ID.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        let index = usize::from(id).checked_sub(1)?;
        self.players.get(index)
    }

    /// Get a mutable player by ID.
    #[must_use]
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        let index = usize::from(id).checked_sub(1)?;
        self.players.get_mut(index)
    }

    /// Whether a player exists and still takes turns.
    #[must_use]
    pub fn is_active(&self, id: PlayerId) -> bool {
        self.player(id).is_some_and(Player::is_active)
    }

    /// Players still taking turns.
    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_active())
    }

    /// The player whose turn it is, while the game is in progress.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::InProgress => self.turn_order.current(),
            _ => None,
        }
    }

    /// Whether the game is over.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    /// Winner of a finished game.
    #[must_use]
    pub const fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::Finished { winner } => winner,
            _ => None,
        }
    }

    /// Durable record of the game so far.
    #[must_use]
    pub const fn summary(&self) -> GameSummary {
        GameSummary {
            winner: self.winner(),
            battles: self.battles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::EliminationReason;

    fn create_test_game() -> GameState {
        let mut state = GameState::new(Board::default());
        state.players = (1..=3).map(|id| Player::new(id, format!("p{id}"))).collect();
        state.turn_order = TurnOrder::new(vec![2, 3, 1]);
        state.phase = Phase::InProgress;
        state
    }

    #[test]
    fn test_game_state_creation() {
        let state = GameState::new(Board::default());
        assert_eq!(state.phase, Phase::Forming);
        assert_eq!(state.current_player(), None);
        assert!(state.player(1).is_none());
        assert!(state.player(0).is_none());
    }

    #[test]
    fn test_turn_order_wraps() {
        let mut state = create_test_game();
        assert_eq!(state.current_player(), Some(2));
        assert_eq!(state.turn_order.advance(|_| true), Some(3));
        assert_eq!(state.turn_order.advance(|_| true), Some(1));
        assert_eq!(state.turn_order.advance(|_| true), Some(2));
    }

    #[test]
    fn test_turn_order_skips_inactive() {
        let mut state = create_test_game();
        if let Some(p) = state.player_mut(3) {
            p.eliminate(EliminationReason::Conquered);
        }
        let players = state.players.clone();
        let active = |id: PlayerId| players[usize::from(id) - 1].is_active();

        assert_eq!(state.turn_order.advance(active), Some(1));
        assert_eq!(state.turn_order.advance(active), Some(2));
        assert_eq!(state.turn_order.players(), &[2, 3, 1]);
    }

    #[test]
    fn test_turn_order_nobody_active() {
        let mut order = TurnOrder::new(vec![1, 2]);
        assert_eq!(order.advance(|_| false), None);
        assert_eq!(order.current(), Some(1));
    }

    #[test]
    fn test_summary_reflects_phase() {
        let mut state = create_test_game();
        state.battles = 9;
        assert_eq!(state.summary().winner, None);

        state.phase = Phase::Finished { winner: Some(1) };
        assert!(state.is_finished());
        assert_eq!(state.current_player(), None);
        assert_eq!(
            state.summary(),
            GameSummary {
                winner: Some(1),
                battles: 9
            }
        );
    }
}
