//! The authoritative turn state machine.
//!
//! [`Engine`] owns the [`GameState`] and is the only code that mutates it.
//! Callers feed it commands, timeouts and disconnects; every call returns the
//! [`Event`]s that resulted, in order, ready to be broadcast.
//!
//! Illegal commands are rejected with a [`RuleViolation`] before anything is
//! touched, so a rejected command never changes the state or the turn.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::error::{EngineError, RuleViolation};
use crate::game::invariants::assert_invariants;
use crate::game::{
    assign_dice, assign_ownership, generate_board, has_legal_attack, largest_region_size,
    resolve_battle, validate_attack, AreaId, AreaSnapshot, BattleOutcome, Board,
    EliminationReason, GameState, GameSummary, Phase, Player, PlayerId, TurnOrder, MAX_DICE, MAX_RESERVE,
};
use crate::rng::Rng;

/// A move submitted by the current player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Attack `target` from `source`.
    Attack {
        /// Attacking area, owned by the current player.
        source: AreaId,
        /// Adjacent area owned by someone else.
        target: AreaId,
    },
    /// Finish the turn and collect reinforcements.
    EndTurn,
}

/// Something that happened as the result of an engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The game left the forming phase.
    GameStarted {
        /// Fixed turn order.
        order: Vec<PlayerId>,
        /// First player to move.
        current_player: PlayerId,
    },
    /// A battle was resolved.
    Battle {
        /// Rolls and resulting areas.
        outcome: BattleOutcome,
        /// Score of every player after the battle.
        scores: BTreeMap<PlayerId, u32>,
    },
    /// A turn ended and control passed on.
    TurnEnded {
        /// Player whose turn ended.
        player: PlayerId,
        /// Areas that received reinforcements.
        areas: Vec<AreaSnapshot>,
        /// Player who moves next.
        current_player: PlayerId,
        /// Reserve of every player.
        reserves: BTreeMap<PlayerId, u32>,
    },
    /// A player left the rotation.
    PlayerEliminated {
        /// The player.
        player: PlayerId,
        /// Why they left.
        reason: EliminationReason,
    },
    /// The game finished.
    GameOver {
        /// Winning player.
        winner: Option<PlayerId>,
    },
}

/// Authoritative game engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: GameConfig,
    state: GameState,
    /// Turn order, dice rolls and reinforcement.
    rng: Rng,
}

impl Engine {
    /// Validate the configuration and generate the board.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or no board could be
    /// generated from the board seed.
    pub fn new(config: GameConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let board = generate_board(config.seeds.board, &config.shape)?;
        info!(
            areas = board.len(),
            players = config.players,
            "board generated"
        );

        Ok(Self {
            rng: Rng::new(config.seeds.fixed),
            state: GameState::new(board),
            config,
        })
    }

    /// Current game state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.state.board
    }

    /// Configuration the engine was built with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The player whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        self.state.current_player()
    }

    /// Whether the game is over.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// End-of-game record.
    #[must_use]
    pub const fn summary(&self) -> GameSummary {
        self.state.summary()
    }

    /// Register a player. Ids are handed out in join order starting at 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the game already started or every slot is taken.
    pub fn join(&mut self, nickname: &str) -> Result<PlayerId, EngineError> {
        if self.state.phase != Phase::Forming {
            return Err(EngineError::AlreadyStarted);
        }
        if self.state.players.len() >= self.config.players {
            return Err(EngineError::LobbyFull(self.config.players));
        }

        let id = PlayerId::try_from(self.state.players.len() + 1)
            .map_err(|_| EngineError::LobbyFull(self.config.players))?;
        self.state.players.push(Player::new(id, nickname));
        info!(player = id, nickname, "player joined");
        Ok(id)
    }

    /// Start the game once every player has joined.
    ///
    /// Shuffles the turn order, assigns areas and starting dice.
    ///
    /// # Errors
    ///
    /// Returns an error if the game already started or players are missing.
    pub fn start(&mut self) -> Result<Vec<Event>, EngineError> {
        if self.state.phase != Phase::Forming {
            return Err(EngineError::AlreadyStarted);
        }
        let missing = self.config.players - self.state.players.len();
        if missing > 0 {
            return Err(EngineError::NotEnoughPlayers { missing });
        }

        let mut order: Vec<PlayerId> = self.state.players.iter().map(|p| p.id).collect();
        self.rng.shuffle(&mut order);

        let seeds = self.config.seeds;
        assign_ownership(&mut self.state.board, &order, &mut Rng::new(seeds.ownership));
        assign_dice(&mut self.state.board, &order, &mut Rng::new(seeds.strength));

        self.state.turn_order = TurnOrder::new(order.clone());
        self.state.phase = Phase::InProgress;
        let current_player = order[0];
        info!(?order, "game started");

        let mut events = vec![Event::GameStarted {
            order,
            current_player,
        }];
        self.skip_stuck_players(&mut events);

        assert_invariants(&self.state);
        Ok(events)
    }

    /// Apply a command from `player`.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleViolation`] if the command is illegal. The state is
    /// unchanged in that case.
    pub fn apply(&mut self, player: PlayerId, command: Command) -> Result<Vec<Event>, RuleViolation> {
        let current = self
            .state
            .current_player()
            .ok_or(RuleViolation::GameNotInProgress)?;
        if current != player {
            return Err(RuleViolation::NotYourTurn { player });
        }

        let mut events = Vec::new();
        match command {
            Command::Attack { source, target } => {
                self.check_attack(player, source, target)?;
                self.reset_timeouts(player);
                self.attack(player, source, target, &mut events);
            }
            Command::EndTurn => {
                self.reset_timeouts(player);
                self.end_turn(true, &mut events);
                self.skip_stuck_players(&mut events);
            }
        }

        assert_invariants(&self.state);
        Ok(events)
    }

    /// Handle an expired turn timer for `player`.
    ///
    /// Ignored unless `player` is the current player. Below the configured
    /// limit the turn simply ends; at the limit the player forfeits.
    pub fn timeout(&mut self, player: PlayerId) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state.current_player() != Some(player) {
            return events;
        }

        let limit = self.config.max_consecutive_timeouts;
        let count = self.state.player_mut(player).map_or(0, |p| {
            p.consecutive_timeouts += 1;
            p.consecutive_timeouts
        });

        if count >= limit {
            warn!(player, count, "too many timeouts, player forfeits");
            self.forfeit(player, &mut events);
        } else {
            debug!(player, count, "turn timed out");
            self.end_turn(true, &mut events);
            self.skip_stuck_players(&mut events);
        }

        assert_invariants(&self.state);
        events
    }

    /// Handle a lost connection. The player forfeits if still in play.
    pub fn disconnect(&mut self, player: PlayerId) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state.phase == Phase::InProgress && self.state.is_active(player) {
            warn!(player, "player disconnected");
            self.forfeit(player, &mut events);
            assert_invariants(&self.state);
        }
        events
    }

    fn check_attack(
        &self,
        player: PlayerId,
        source: AreaId,
        target: AreaId,
    ) -> Result<(), RuleViolation> {
        let area = self
            .state
            .board
            .get(source)
            .ok_or(RuleViolation::UnknownArea(source))?;
        if area.owner != player {
            return Err(RuleViolation::NotYourArea(source));
        }
        let attacks = self.state.attacks_this_turn;
        if let Some(max) = self.config.max_attacks_per_turn.filter(|&max| attacks >= max) {
            return Err(RuleViolation::AttackLimitReached(max));
        }
        validate_attack(&self.state.board, source, target)
    }

    fn reset_timeouts(&mut self, player: PlayerId) {
        if let Some(p) = self.state.player_mut(player) {
            p.consecutive_timeouts = 0;
        }
    }

    /// Resolve a validated attack and everything that follows from it.
    fn attack(&mut self, player: PlayerId, source: AreaId, target: AreaId, events: &mut Vec<Event>) {
        let outcome = match resolve_battle(&mut self.state.board, source, target, &mut self.rng) {
            Ok(outcome) => outcome,
            Err(violation) => {
                // Already validated
                warn!(%violation, "battle rejected after validation");
                return;
            }
        };

        self.state.attacks_this_turn += 1;
        self.state.battles += 1;
        if let Some(p) = self.state.player_mut(player).filter(|_| outcome.attacker_won) {
            p.score += 1;
        }
        debug!(
            player,
            source,
            target,
            attacker_sum = outcome.attacker_sum,
            defender_sum = outcome.defender_sum,
            won = outcome.attacker_won,
            "battle"
        );

        let defender = outcome.defender;
        let conquered = outcome.attacker_won;
        events.push(Event::Battle {
            outcome,
            scores: self.state.players.iter().map(|p| (p.id, p.score)).collect(),
        });

        if conquered {
            self.eliminate_if_empty(defender, events);
            if self.check_winner(None, events) {
                return;
            }
        }

        if !has_legal_attack(&self.state.board, player) {
            debug!(player, "no legal attack left, ending turn");
            self.end_turn(true, events);
            self.skip_stuck_players(events);
        }
    }

    fn eliminate_if_empty(&mut self, player: PlayerId, events: &mut Vec<Event>) {
        if self.state.board.count_owned(player) > 0 {
            return;
        }
        let Some(p) = self.state.player_mut(player) else {
            return;
        };
        if p.eliminated {
            return;
        }
        let was_active = p.is_active();
        p.eliminate(EliminationReason::Conquered);
        if was_active {
            info!(player, "player eliminated");
            events.push(Event::PlayerEliminated {
                player,
                reason: EliminationReason::Conquered,
            });
        }
    }

    fn forfeit(&mut self, player: PlayerId, events: &mut Vec<Event>) {
        let was_current = self.state.current_player() == Some(player);
        if let Some(p) = self.state.player_mut(player) {
            p.eliminate(EliminationReason::Forfeited);
        }
        events.push(Event::PlayerEliminated {
            player,
            reason: EliminationReason::Forfeited,
        });

        if self.check_winner(Some(player), events) {
            return;
        }
        if was_current {
            self.end_turn(false, events);
            self.skip_stuck_players(events);
        }
    }

    /// Finish the game if at most one player is left.
    ///
    /// `last_out` wins when nobody at all is left.
    fn check_winner(&mut self, last_out: Option<PlayerId>, events: &mut Vec<Event>) -> bool {
        let active: Vec<PlayerId> = self.state.active_players().map(|p| p.id).collect();
        let winner = match active.as_slice() {
            [winner] => Some(*winner),
            [] => last_out,
            _ => return false,
        };

        self.state.phase = Phase::Finished { winner };
        info!(?winner, battles = self.state.battles, "game over");
        events.push(Event::GameOver { winner });
        true
    }

    /// End the current turn and pass control to the next active player.
    fn end_turn(&mut self, reinforce: bool, events: &mut Vec<Event>) {
        let Some(player) = self.state.turn_order.current() else {
            return;
        };

        let areas = if reinforce && self.state.is_active(player) {
            self.reinforce(player)
        } else {
            Vec::new()
        };
        self.state.turns += 1;
        self.state.attacks_this_turn = 0;

        let players = &self.state.players;
        let next = self
            .state
            .turn_order
            .advance(|id| is_active_in(players, id));
        let Some(current_player) = next else {
            self.check_winner(Some(player), events);
            return;
        };

        events.push(Event::TurnEnded {
            player,
            areas,
            current_player,
            reserves: self.state.players.iter().map(|p| (p.id, p.reserve)).collect(),
        });
    }

    /// Automatically end turns until the current player has a legal attack.
    ///
    /// Every skipped turn reinforces, so the board fills up and some border
    /// area reaches two dice. The cap only guards boards where no two players
    /// touch.
    fn skip_stuck_players(&mut self, events: &mut Vec<Event>) {
        let cap = (self.state.board.len() * usize::from(MAX_DICE) + 1) * self.state.players.len();
        for _ in 0..cap {
            let Some(current) = self.state.current_player() else {
                return;
            };
            if has_legal_attack(&self.state.board, current) {
                return;
            }
            debug!(player = current, "no legal attack, skipping turn");
            self.end_turn(true, events);
        }
        warn!(skipped = cap, "no player can attack");
    }

    /// Hand out end-of-turn dice. Returns the areas that changed.
    ///
    /// The player gets their largest region size plus their reserve, placed
    /// one die at a time on random areas that are not full. What does not fit
    /// goes back to the reserve.
    fn reinforce(&mut self, player: PlayerId) -> Vec<AreaSnapshot> {
        let earned = largest_region_size(&self.state.board, player);
        let reserve = self.state.player(player).map_or(0, |p| p.reserve);
        let mut dice = u32::try_from(earned).unwrap_or(u32::MAX).saturating_add(reserve);

        let mut open: Vec<AreaId> = self
            .state
            .board
            .owned_by(player)
            .filter(|a| a.can_reinforce())
            .map(|a| a.id)
            .collect();
        let mut changed = BTreeSet::new();

        while dice > 0 && !open.is_empty() {
            let slot = self.rng.below(open.len());
            let id = open[slot];
            let Some(area) = self.state.board.get_mut(id) else {
                open.swap_remove(slot);
                continue;
            };
            area.dice += 1;
            dice -= 1;
            changed.insert(id);
            if !area.can_reinforce() {
                open.swap_remove(slot);
            }
        }

        if let Some(p) = self.state.player_mut(player) {
            p.reserve = dice.min(MAX_RESERVE);
        }
        debug!(player, earned, placed = changed.len(), reserve = dice.min(MAX_RESERVE), "reinforced");

        changed
            .into_iter()
            .filter_map(|id| {
                self.state.board.get(id).map(|a| AreaSnapshot {
                    id,
                    owner: a.owner,
                    dice: a.dice,
                })
            })
            .collect()
    }
}

fn is_active_in(players: &[Player], id: PlayerId) -> bool {
    usize::from(id)
        .checked_sub(1)
        .and_then(|i| players.get(i))
        .is_some_and(Player::is_active)
}
