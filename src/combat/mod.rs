//! Combat system module
//!
//! Implements tabletop combat with:
//! - Dice rolling (e.g., "2d6+3")
//! - Attack rolls with threat ranges
//! - Vitality/wound damage with armor damage reduction
//! - Initiative order and round tracking

mod combatant;
mod damage;
mod dice;
mod initiative;

pub use combatant::{AttackRoll, Combatant, Participant, DEFAULT_THREAT_RANGE};
pub use damage::{DamageResult, DamageTrack, DEATH_THRESHOLD, DEFAULT_CRITICAL_MULTIPLIER};
pub use dice::{
    die, is_critical, is_fumble, opposed_check, parse_dice, roll_d20, roll_dice, roll_dice_with,
    DiceError, DiceRoll, MAX_DICE, MAX_SIDES,
};
pub use initiative::{
    CombatantId, Cursor, DuplicatePolicy, Initiative, InitiativeTracker, SnapshotEntry,
    TrackerError, TrackerSnapshot,
};
