#![no_main]

use arbitrary::Arbitrary;
use dicewars::game::invariants::check_invariants;
use dicewars::game::{BoardShape, MAX_DICE};
use dicewars::{Command, Engine, GameConfig, Seeds};
use libfuzzer_sys::fuzz_target;

/// One thing that can happen to a running game.
#[derive(Arbitrary, Debug)]
enum Action {
    /// A command from some player, legal or not.
    Command { player: u8, source: u16, target: u16, end_turn: bool },
    /// The current player ran out of time.
    Timeout,
    /// Some player's connection dropped.
    Disconnect { player: u8 },
}

/// Structured input for engine fuzzing.
#[derive(Arbitrary, Debug)]
struct EngineInput {
    /// Seed for every random stream.
    seed: u64,
    /// Number of players, folded into 2..=4.
    players: u8,
    /// Optional attack cap.
    max_attacks: Option<u8>,
    /// What happens, in order.
    actions: Vec<Action>,
}

fuzz_target!(|input: EngineInput| {
    let players = usize::from(input.players % 3) + 2;
    let config = GameConfig {
        players,
        shape: BoardShape {
            width: 12,
            height: 10,
            areas: 10,
            min_area_size: 3,
            max_area_size: 40,
        },
        seeds: Seeds::from_seed(input.seed),
        max_consecutive_timeouts: 2,
        max_attacks_per_turn: input.max_attacks.map(|n| u32::from(n.max(1))),
        ..GameConfig::default()
    };

    // Some seeds cannot produce a board for the shape
    let Ok(mut engine) = Engine::new(config) else {
        return;
    };
    for i in 0..players {
        engine.join(&format!("p{i}")).unwrap();
    }
    engine.start().unwrap();

    // Cap to keep runs short
    for action in input.actions.into_iter().take(512) {
        let before = engine.state().board.clone();
        match action {
            Action::Command {
                player,
                source,
                target,
                end_turn,
            } => {
                let command = if end_turn {
                    Command::EndTurn
                } else {
                    Command::Attack { source, target }
                };
                if engine.apply(player, command).is_err() {
                    assert_eq!(engine.state().board, before, "rejected command changed the board");
                }
            }
            Action::Timeout => {
                if let Some(player) = engine.current_player() {
                    engine.timeout(player);
                }
            }
            Action::Disconnect { player } => {
                engine.disconnect(player);
            }
        }

        let violations = check_invariants(engine.state());
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
        assert!(engine.board().areas().all(|a| (1..=MAX_DICE).contains(&a.dice)));

        if engine.is_finished() {
            break;
        }
    }
});
