//! Battle resolution.
//!
//! Both sides roll one d6 per die on their area and compare sums. Ties go to
//! the defender. A winning attacker moves all but one die into the conquered
//! area; a losing attacker keeps a single die. The defender never loses dice
//! on a successful defence.

use serde::Serialize;

use crate::error::RuleViolation;
use crate::game::{AreaId, Board, PlayerId, MAX_DICE};
use crate::rng::Rng;

/// Owner and dice of an area at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AreaSnapshot {
    /// Area identifier.
    pub id: AreaId,
    /// Owner after the battle.
    pub owner: PlayerId,
    /// Dice after the battle.
    pub dice: u8,
}

/// Full record of one battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleOutcome {
    /// Attacking area after the battle.
    pub source: AreaSnapshot,
    /// Attacked area after the battle.
    pub target: AreaSnapshot,
    /// Player who attacked.
    pub attacker: PlayerId,
    /// Owner of the target before the battle.
    pub defender: PlayerId,
    /// Individual attacker dice.
    pub attacker_rolls: Vec<u8>,
    /// Individual defender dice.
    pub defender_rolls: Vec<u8>,
    /// Sum of `attacker_rolls`.
    pub attacker_sum: u32,
    /// Sum of `defender_rolls`.
    pub defender_sum: u32,
    /// Whether the target changed hands.
    pub attacker_won: bool,
}

/// Check that `source` may attack `target`.
///
/// Ownership of `source` by the current player is the engine's concern; this
/// only looks at the board.
///
/// # Errors
///
/// Returns the first rule the attack breaks.
pub fn validate_attack(board: &Board, source: AreaId, target: AreaId) -> Result<(), RuleViolation> {
    let src = board.get(source).ok_or(RuleViolation::UnknownArea(source))?;
    let dst = board.get(target).ok_or(RuleViolation::UnknownArea(target))?;

    if !src.borders(target) {
        return Err(RuleViolation::NotAdjacent {
            source_area: source,
            target,
        });
    }
    if !src.can_attack() {
        return Err(RuleViolation::InsufficientDice(source));
    }
    if src.owner == dst.owner {
        return Err(RuleViolation::SelfAttack(target));
    }
    Ok(())
}

/// Roll a battle and apply its consequences to the board.
///
/// The attacker's dice are rolled first, then the defender's.
///
/// # Errors
///
/// Returns a [`RuleViolation`] and leaves the board unchanged if the attack
/// is not legal.
pub fn resolve_battle(
    board: &mut Board,
    source: AreaId,
    target: AreaId,
    rng: &mut Rng,
) -> Result<BattleOutcome, RuleViolation> {
    validate_attack(board, source, target)?;

    let (attacker, attack_dice) = board
        .get(source)
        .map(|a| (a.owner, a.dice))
        .ok_or(RuleViolation::UnknownArea(source))?;
    let (defender, defend_dice) = board
        .get(target)
        .map(|a| (a.owner, a.dice))
        .ok_or(RuleViolation::UnknownArea(target))?;

    let attacker_rolls: Vec<u8> = (0..attack_dice).map(|_| rng.roll_d6()).collect();
    let defender_rolls: Vec<u8> = (0..defend_dice).map(|_| rng.roll_d6()).collect();
    let attacker_sum: u32 = attacker_rolls.iter().map(|&r| u32::from(r)).sum();
    let defender_sum: u32 = defender_rolls.iter().map(|&r| u32::from(r)).sum();
    let attacker_won = attacker_sum > defender_sum;

    if let Some(area) = board.get_mut(target).filter(|_| attacker_won) {
        area.owner = attacker;
        area.dice = attack_dice - 1;
    }
    if let Some(area) = board.get_mut(source) {
        area.dice = 1;
    }

    let snapshot = |id: AreaId| {
        board.get(id).map_or(
            AreaSnapshot {
                id,
                owner: 0,
                dice: 0,
            },
            |a| AreaSnapshot {
                id,
                owner: a.owner,
                dice: a.dice,
            },
        )
    };

    Ok(BattleOutcome {
        source: snapshot(source),
        target: snapshot(target),
        attacker,
        defender,
        attacker_rolls,
        defender_rolls,
        attacker_sum,
        defender_sum,
        attacker_won,
    })
}

/// Number of ways `n` six-sided dice can produce each sum.
///
/// Index `s` holds the count for sum `s`; the vector has length `6n + 1`.
#[must_use]
pub fn dice_sum_distribution(n: u8) -> Vec<u64> {
    let mut counts = vec![1u64];
    for _ in 0..n {
        let mut next = vec![0u64; counts.len() + 6];
        for (sum, &ways) in counts.iter().enumerate() {
            if ways == 0 {
                continue;
            }
            for face in 1..=6 {
                next[sum + face] += ways;
            }
        }
        counts = next;
    }
    counts
}

/// Exact probability that the attacker wins.
///
/// Counts the outcome pairs where the attacker's sum is strictly greater and
/// divides by `6^(a+d)`. Dice counts are clamped to `1..=8`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn win_probability(attacker_dice: u8, defender_dice: u8) -> f64 {
    let a = attacker_dice.clamp(1, MAX_DICE);
    let d = defender_dice.clamp(1, MAX_DICE);

    let attack = dice_sum_distribution(a);
    let defend = dice_sum_distribution(d);

    let mut favourable: u64 = 0;
    for (a_sum, &a_ways) in attack.iter().enumerate() {
        for (d_sum, &d_ways) in defend.iter().enumerate() {
            if a_sum > d_sum {
                favourable += a_ways * d_ways;
            }
        }
    }

    let total = 6u64.pow(u32::from(a) + u32::from(d));
    favourable as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Area;

    /// Two adjacent areas: 1 (player 1) and 2 (player 2).
    fn duel(attack: u8, defend: u8) -> Board {
        let mut a = Area::new(1, vec![]);
        a.owner = 1;
        a.dice = attack;
        let mut b = Area::new(2, vec![]);
        b.owner = 2;
        b.dice = defend;
        let mut board = Board::from_areas([a, b, Area::new(3, vec![])]);
        board.connect(1, 2);
        board
    }

    /// Brute-force win probability for tiny dice counts.
    #[allow(clippy::cast_precision_loss)]
    fn enumerate(a: u32, d: u32) -> f64 {
        fn sums(n: u32) -> Vec<u32> {
            (0..6u32.pow(n))
                .map(|mut code| {
                    let mut sum = 0;
                    for _ in 0..n {
                        sum += code % 6 + 1;
                        code /= 6;
                    }
                    sum
                })
                .collect()
        }
        let (atk, def) = (sums(a), sums(d));
        let wins = atk
            .iter()
            .flat_map(|x| def.iter().map(move |y| x > y))
            .filter(|&w| w)
            .count();
        wins as f64 / (atk.len() * def.len()) as f64
    }

    #[test]
    fn test_two_vs_one_matches_enumeration() {
        let exact = win_probability(2, 1);
        assert!((exact - enumerate(2, 1)).abs() < 1e-12);
        // 181 of 216 outcomes favour the attacker
        assert!((exact - 181.0 / 216.0).abs() < 1e-12);
    }

    #[test]
    fn test_distribution_shape() {
        let two = dice_sum_distribution(2);
        assert_eq!(two.len(), 13);
        assert_eq!(two[7], 6);
        assert_eq!(two.iter().sum::<u64>(), 36);
        assert_eq!(dice_sum_distribution(0), vec![1]);
    }

    #[test]
    fn test_clamped_inputs() {
        assert!((win_probability(0, 1) - win_probability(1, 1)).abs() < 1e-12);
        assert!((win_probability(12, 3) - win_probability(8, 3)).abs() < 1e-12);
        assert!((win_probability(1, 1) - 15.0 / 36.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_attack() {
        let board = duel(3, 2);
        assert_eq!(validate_attack(&board, 1, 2), Ok(()));
        assert_eq!(
            validate_attack(&board, 1, 3),
            Err(RuleViolation::NotAdjacent {
                source_area: 1,
                target: 3
            })
        );
        assert_eq!(
            validate_attack(&board, 1, 99),
            Err(RuleViolation::UnknownArea(99))
        );

        let weak = duel(1, 2);
        assert_eq!(
            validate_attack(&weak, 1, 2),
            Err(RuleViolation::InsufficientDice(1))
        );

        let mut own = duel(3, 2);
        if let Some(area) = own.get_mut(2) {
            area.owner = 1;
        }
        assert_eq!(validate_attack(&own, 1, 2), Err(RuleViolation::SelfAttack(2)));
    }

    #[test]
    fn test_illegal_battle_leaves_board() {
        let mut board = duel(1, 4);
        let before = board.clone();
        assert!(resolve_battle(&mut board, 1, 2, &mut Rng::new(1)).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_five_vs_three_scripted() {
        for seed in [1, 2, 3, 17, 1234, 98765] {
            let mut board = duel(5, 3);
            let mut replay = Rng::new(seed);
            let expected_atk: Vec<u8> = (0..5).map(|_| replay.roll_d6()).collect();
            let expected_def: Vec<u8> = (0..3).map(|_| replay.roll_d6()).collect();

            let outcome = resolve_battle(&mut board, 1, 2, &mut Rng::new(seed)).unwrap();

            assert_eq!(outcome.attacker_rolls, expected_atk);
            assert_eq!(outcome.defender_rolls, expected_def);
            assert_eq!(outcome.attacker, 1);
            assert_eq!(outcome.defender, 2);

            let atk_sum: u32 = expected_atk.iter().map(|&r| u32::from(r)).sum();
            let def_sum: u32 = expected_def.iter().map(|&r| u32::from(r)).sum();
            assert_eq!(outcome.attacker_won, atk_sum > def_sum);

            let src = board.get(1).unwrap();
            let dst = board.get(2).unwrap();
            assert_eq!(src.dice, 1);
            assert_eq!(src.owner, 1);
            if outcome.attacker_won {
                assert_eq!((dst.owner, dst.dice), (1, 4));
                assert_eq!(board.total_dice(), 5);
            } else {
                assert_eq!((dst.owner, dst.dice), (2, 3));
                assert_eq!(board.total_dice(), 4);
            }
            assert_eq!(outcome.source.dice, src.dice);
            assert_eq!(outcome.target.owner, dst.owner);
        }
    }

    #[test]
    fn test_two_vs_one_frequency() {
        let mut rng = Rng::new(2024);
        let trials = 20_000;
        let mut wins = 0;
        for _ in 0..trials {
            let mut board = duel(2, 1);
            if resolve_battle(&mut board, 1, 2, &mut rng).unwrap().attacker_won {
                wins += 1;
            }
        }
        let observed = f64::from(wins) / f64::from(trials);
        assert!(
            (observed - win_probability(2, 1)).abs() < 0.02,
            "observed {observed}"
        );
    }

    #[test]
    fn test_ties_go_to_defender() {
        let mut found = false;
        for seed in 1..500 {
            let mut board = duel(2, 2);
            let outcome = resolve_battle(&mut board, 1, 2, &mut Rng::new(seed)).unwrap();
            if outcome.attacker_sum == outcome.defender_sum {
                assert!(!outcome.attacker_won);
                assert_eq!(board.get(2).unwrap().owner, 2);
                found = true;
                break;
            }
        }
        assert!(found, "no tie in 500 seeds");
    }
}
