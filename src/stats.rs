//! Character statistics
//!
//! Ability bonuses, 4d6-drop-lowest stat generation, point-buy costs and
//! rolled hit points. Everything that rolls takes an explicit RNG.

use rand::Rng;
use thiserror::Error;

use crate::combat::{die, roll_dice_with};

/// Point-buy cost of ability scores 9 through 18
const ABILITY_COSTS: [u32; 10] = [1, 2, 3, 4, 5, 6, 8, 10, 13, 16];

/// Lowest score with a point-buy cost; anything below is free
const MIN_COSTED_SCORE: u32 = 9;

/// Highest score in the point-buy table
pub const MAX_ABILITY_SCORE: u32 = 18;

/// Ability scores in a rolled set
pub const ABILITY_COUNT: usize = 6;

/// Stat sets `roll_cool_stats` tries before giving up
pub const MAX_REROLLS: u32 = 100_000;

/// Stat generation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatError {
    #[error("ability score {0} is above the point-buy table (max {MAX_ABILITY_SCORE})")]
    ScoreOutOfRange(u32),

    #[error("minimum point-buy cost {minimum} can never be rolled (max {max})")]
    UnreachableMinimum { minimum: u32, max: u32 },

    #[error("no stat set worth {minimum} points in {attempts} rolls")]
    TooManyRerolls { minimum: u32, attempts: u32 },
}

/// Ability modifier: (stat - 10) / 2, rounded down
pub fn bonus(stat: i32) -> i32 {
    (stat - 10).div_euclid(2)
}

/// Render a modifier with an explicit sign ("+2", "+0", "-1")
pub fn signed(value: i32) -> String {
    format!("{:+}", value)
}

/// Roll one ability score: 4d6, drop the lowest
pub fn stat_roll<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    let mut dice: [u32; 4] = std::array::from_fn(|_| die(rng, 6));
    dice.sort_unstable();
    dice[1..].iter().sum()
}

/// Roll seven ability scores, drop the lowest, return the rest ascending
pub fn roll_stats<R: Rng + ?Sized>(rng: &mut R) -> Vec<u32> {
    let mut stats: Vec<u32> = (0..=ABILITY_COUNT).map(|_| stat_roll(rng)).collect();
    stats.sort_unstable();
    stats.remove(0);
    stats
}

/// Point-buy cost of a single ability score
pub fn ability_cost(stat: u32) -> Result<u32, StatError> {
    if stat < MIN_COSTED_SCORE {
        return Ok(0);
    }
    ABILITY_COSTS
        .get((stat - MIN_COSTED_SCORE) as usize)
        .copied()
        .ok_or(StatError::ScoreOutOfRange(stat))
}

/// Total point-buy cost of a set of ability scores
pub fn abilities_cost(stats: &[u32]) -> Result<u32, StatError> {
    stats.iter().map(|&s| ability_cost(s)).sum()
}

/// Highest point-buy cost a rolled set can reach (all 18s)
pub fn max_abilities_cost() -> u32 {
    ABILITY_COSTS[ABILITY_COSTS.len() - 1] * ABILITY_COUNT as u32
}

/// Reroll stat sets until one is worth at least `minimum` points.
///
/// Gives up after [`MAX_REROLLS`] sets; minimums near the top of the table
/// are possible but practically never rolled.
pub fn roll_cool_stats<R: Rng + ?Sized>(rng: &mut R, minimum: u32) -> Result<Vec<u32>, StatError> {
    let max = max_abilities_cost();
    if minimum > max {
        return Err(StatError::UnreachableMinimum { minimum, max });
    }

    for _ in 0..MAX_REROLLS {
        let stats = roll_stats(rng);
        if abilities_cost(&stats)? >= minimum {
            return Ok(stats);
        }
    }

    Err(StatError::TooManyRerolls {
        minimum,
        attempts: MAX_REROLLS,
    })
}

/// Roll hit points for a character.
///
/// The first hit die is maxed, the rest are rolled, and the constitution
/// bonus applies per level. A cleric (d8) with 14 constitution at level 3:
/// `random_hit_points(rng, 8, 14, 3)`.
pub fn random_hit_points<R: Rng + ?Sized>(rng: &mut R, hit_die: u32, constitution: i32, level: u32) -> i32 {
    level as i32 * bonus(constitution)
        + hit_die as i32
        + roll_dice_with(rng, level.saturating_sub(1), hit_die, 0)
}

/// Render a stat block: one "%2d [+b]" line per score, then the point-buy cost
pub fn stat_block(stats: &[u32]) -> Result<String, StatError> {
    let mut lines: Vec<String> = stats
        .iter()
        .map(|&stat| format!("{:2} [{}]", stat, signed(bonus(stat as i32))))
        .collect();
    lines.push(String::new());
    lines.push(format!("Cost: {}", abilities_cost(stats)?));
    Ok(lines.join("\n"))
}
