//! Dice rolling system
//!
//! Parses and rolls dice notation like "2d6+3", "1d20", "4d6-2".
//! Every roll has a `_with` variant taking an explicit RNG so callers
//! (and tests) can supply a seeded generator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Most dice a single notation may roll
pub const MAX_DICE: u32 = 1000;

/// Largest die a notation may name
pub const MAX_SIDES: u32 = 1_000_000;

/// Dice notation parse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("missing 'd' in dice notation: {0:?}")]
    MissingSeparator(String),

    #[error("invalid dice count: {0:?}")]
    InvalidCount(String),

    #[error("invalid die sides: {0:?}")]
    InvalidSides(String),

    #[error("invalid modifier: {0:?}")]
    InvalidModifier(String),

    #[error("dice count must be at least 1")]
    ZeroCount,

    #[error("die sides must be at least 1")]
    ZeroSides,

    #[error("at most {MAX_DICE} dice per roll, got {0}")]
    TooManyDice(u32),

    #[error("dice may have at most {MAX_SIDES} sides, got {0}")]
    TooManySides(u32),
}

/// A parsed dice roll specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    /// Create a new dice roll
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self { count, sides, modifier }
    }

    /// A single die with no modifier, e.g. `DiceRoll::die(20)` is "1d20"
    pub fn die(sides: u32) -> Self {
        Self::new(1, sides, 0)
    }

    /// Roll the dice and return the total
    pub fn roll(&self) -> i32 {
        self.roll_with(&mut rand::rng())
    }

    /// Roll using the supplied generator
    pub fn roll_with<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        roll_dice_with(rng, self.count, self.sides, self.modifier)
    }

    /// Roll and return individual die results plus total
    pub fn roll_detailed(&self) -> (Vec<u32>, i32) {
        self.roll_detailed_with(&mut rand::rng())
    }

    /// Detailed roll using the supplied generator
    pub fn roll_detailed_with<R: Rng + ?Sized>(&self, rng: &mut R) -> (Vec<u32>, i32) {
        let results: Vec<u32> = (0..self.count).map(|_| die(rng, self.sides)).collect();

        let sum: i64 = results.iter().map(|&r| i64::from(r)).sum();
        let total = saturate(sum + i64::from(self.modifier));

        (results, total)
    }

    /// Get the minimum possible result
    pub fn min(&self) -> i32 {
        saturate(i64::from(self.count) + i64::from(self.modifier))
    }

    /// Get the maximum possible result
    pub fn max(&self) -> i32 {
        saturate(i64::from(self.count) * i64::from(self.sides) + i64::from(self.modifier))
    }

    /// Get the expected average (rounded down)
    pub fn average(&self) -> i32 {
        let avg_per_die = (1.0 + self.sides as f64) / 2.0;
        (self.count as f64 * avg_per_die + self.modifier as f64) as i32
    }
}

impl FromStr for DiceRoll {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl TryFrom<String> for DiceRoll {
    type Error = DiceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        parse_dice(&s)
    }
}

impl From<DiceRoll> for String {
    fn from(roll: DiceRoll) -> Self {
        roll.to_string()
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Parse a dice notation string like "2d6+3"
pub fn parse_dice(notation: &str) -> Result<DiceRoll, DiceError> {
    let notation = notation.trim().to_lowercase();

    let (count_str, rest) = notation
        .split_once('d')
        .ok_or_else(|| DiceError::MissingSeparator(notation.clone()))?;

    // "d6" means "1d6"
    let count: u32 = if count_str.is_empty() {
        1
    } else {
        count_str
            .parse()
            .map_err(|_| DiceError::InvalidCount(count_str.to_string()))?
    };

    if count == 0 {
        return Err(DiceError::ZeroCount);
    }
    if count > MAX_DICE {
        return Err(DiceError::TooManyDice(count));
    }

    let (sides_str, modifier) = if let Some((sides, mod_str)) = rest.split_once('+') {
        let modifier: i32 = mod_str
            .parse()
            .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
        (sides, modifier)
    } else if let Some(minus_pos) = rest.rfind('-').filter(|&pos| pos > 0) {
        // keep the sign with the modifier
        let mod_str = &rest[minus_pos..];
        let modifier: i32 = mod_str
            .parse()
            .map_err(|_| DiceError::InvalidModifier(mod_str.to_string()))?;
        (&rest[..minus_pos], modifier)
    } else {
        (rest, 0)
    };

    let sides: u32 = sides_str
        .parse()
        .map_err(|_| DiceError::InvalidSides(sides_str.to_string()))?;

    if sides == 0 {
        return Err(DiceError::ZeroSides);
    }
    if sides > MAX_SIDES {
        return Err(DiceError::TooManySides(sides));
    }

    Ok(DiceRoll { count, sides, modifier })
}

/// Roll one die with the given number of sides
pub fn die<R: Rng + ?Sized>(rng: &mut R, sides: u32) -> u32 {
    rng.random_range(1..=sides.max(1))
}

/// Roll dice with the given parameters
pub fn roll_dice(count: u32, sides: u32, modifier: i32) -> i32 {
    roll_dice_with(&mut rand::rng(), count, sides, modifier)
}

/// Roll `count` dice of `sides` plus `modifier` using the supplied generator
pub fn roll_dice_with<R: Rng + ?Sized>(rng: &mut R, count: u32, sides: u32, modifier: i32) -> i32 {
    let mut total: i64 = 0;

    for _ in 0..count {
        total += i64::from(die(rng, sides));
    }

    saturate(total + i64::from(modifier))
}

/// Clamp a widened total back into `i32`
fn saturate(total: i64) -> i32 {
    total.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Roll a single d20
pub fn roll_d20() -> u32 {
    die(&mut rand::rng(), 20)
}

/// Check if a d20 roll is a natural 20 (critical hit)
pub fn is_critical(roll: u32) -> bool {
    roll == 20
}

/// Check if a d20 roll is a natural 1 (critical fail)
pub fn is_fumble(roll: u32) -> bool {
    roll == 1
}

/// Opposed d20 check: each side rolls d20 and adds its bonus.
///
/// Returns `(a_total, b_total)`; interpreting the comparison is up to the caller.
pub fn opposed_check<R: Rng + ?Sized>(rng: &mut R, bonus_a: i32, bonus_b: i32) -> (i32, i32) {
    let a = die(rng, 20) as i32 + bonus_a;
    let b = die(rng, 20) as i32 + bonus_b;
    (a, b)
}
