//! Combatants
//!
//! A combatant is anyone taking turns in an encounter. The initiative
//! tracker only needs the [`Participant`] view of it (a display name and a
//! one-line summary); attack and damage resolution live on [`Combatant`].

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::damage::{DamageResult, DamageTrack, DEFAULT_CRITICAL_MULTIPLIER};
use super::dice::{die, DiceRoll};

/// Default threat range: only a natural 20 threatens a critical
pub const DEFAULT_THREAT_RANGE: u32 = 20;

/// What the initiative tracker needs to know about a combatant
pub trait Participant {
    /// Display name, used for lookups and the "whose action" header
    fn name(&self) -> &str;

    /// One-line summary used in the initiative listing
    fn summary(&self) -> String {
        self.name().to_string()
    }
}

impl Participant for String {
    fn name(&self) -> &str {
        self
    }
}

impl Participant for &str {
    fn name(&self) -> &str {
        self
    }
}

/// Result of an attack roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttackRoll {
    /// The natural d20
    pub roll: u32,
    /// Roll plus attack bonus
    pub attack_total: i32,
    /// Damage rolled for the attack
    pub damage: i32,
    /// Whether the natural roll fell in the threat range
    pub threat: bool,
}

/// A single combatant with a vitality/wound track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    /// Display name
    pub name: String,
    /// Vitality, wounds and armor
    #[serde(flatten)]
    pub track: DamageTrack,
    /// Bonus added to the d20 attack roll
    pub attack_bonus: i32,
    /// Damage dice rolled on every attack
    pub damage: DiceRoll,
    /// Lowest natural d20 that threatens a critical (19 for 19-20, etc.)
    #[serde(default = "default_threat_range")]
    pub threat_range: u32,
}

fn default_threat_range() -> u32 {
    DEFAULT_THREAT_RANGE
}

impl Combatant {
    /// Create a combatant.
    ///
    /// Wounds start at `constitution`; `armor` is the damage reduction.
    pub fn new(
        name: impl Into<String>,
        vitality: i32,
        constitution: i32,
        armor: i32,
        attack_bonus: i32,
        damage: DiceRoll,
    ) -> Self {
        Self {
            name: name.into(),
            track: DamageTrack::new(vitality, constitution, armor),
            attack_bonus,
            damage,
            threat_range: DEFAULT_THREAT_RANGE,
        }
    }

    /// Set the threat range
    pub fn with_threat_range(mut self, threat_range: u32) -> Self {
        self.threat_range = threat_range;
        self
    }

    /// Current vitality
    pub fn vitality(&self) -> i32 {
        self.track.vitality
    }

    /// Current wounds
    pub fn wounds(&self) -> i32 {
        self.track.wounds
    }

    /// Check if combatant is dead
    pub fn is_dead(&self) -> bool {
        self.track.is_dead()
    }

    /// Roll damage for one hit
    pub fn roll_damage<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        self.damage.roll_with(rng)
    }

    /// Roll a d20 attack and its damage
    pub fn attack<R: Rng + ?Sized>(&self, rng: &mut R) -> AttackRoll {
        let roll = die(rng, 20);
        let attack = AttackRoll {
            roll,
            attack_total: roll as i32 + self.attack_bonus,
            damage: self.roll_damage(rng),
            threat: roll >= self.threat_range,
        };

        info!(
            "{} rolled {} for {} damage{}",
            self.name,
            attack.attack_total,
            attack.damage,
            if attack.threat { " (threat)" } else { "" }
        );

        attack
    }

    /// Inflict wounds directly, ignoring vitality; returns the amount soaked by armor
    pub fn inflict_wounds(&mut self, damage: i32) -> i32 {
        self.track.inflict_wounds(damage)
    }

    /// Take an ordinary hit
    pub fn take_damage(&mut self, damage: i32) -> DamageResult {
        let result = self.track.take_damage(damage);
        self.log_damage(&result);
        result
    }

    /// Take a critical hit with the default multiplier
    pub fn take_critical(&mut self, damage: i32) -> DamageResult {
        self.take_critical_with(damage, DEFAULT_CRITICAL_MULTIPLIER)
    }

    /// Take a critical hit with an explicit multiplier
    pub fn take_critical_with(&mut self, damage: i32, multiplier: i32) -> DamageResult {
        let result = self.track.take_critical(damage, multiplier);
        self.log_damage(&result);
        result
    }

    fn log_damage(&self, result: &DamageResult) {
        if result.dead {
            warn!("{} is dead ({})", self.name, self.summary());
        } else {
            info!("{} took {} damage: {}", self.name, result.base_damage, self.summary());
        }
    }
}

impl Participant for Combatant {
    fn name(&self) -> &str {
        &self.name
    }

    fn summary(&self) -> String {
        format!(
            "{} <vit={}, wounds={}>",
            self.name, self.track.vitality, self.track.wounds
        )
    }
}

impl std::fmt::Display for Combatant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
