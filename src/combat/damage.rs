//! Vitality and wound damage model
//!
//! Handles damage calculation with:
//! - Vitality points absorbing ordinary hits first
//! - Wounds (starting at constitution) taking the overflow
//! - Armor damage reduction applied to anything that reaches wounds
//! - Critical hits that go straight to wounds
//! - Death once wounds fall to -10

use serde::{Deserialize, Serialize};

/// Wound total at or below which a combatant is dead
pub const DEATH_THRESHOLD: i32 = -10;

/// Default multiplier applied to soaked damage on a critical hit
pub const DEFAULT_CRITICAL_MULTIPLIER: i32 = 2;

/// Result of applying damage to a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DamageResult {
    /// Damage as rolled, before vitality/armor
    pub base_damage: i32,
    /// Vitality remaining after the hit
    pub vitality: i32,
    /// Wounds remaining after the hit
    pub wounds: i32,
    /// Whether the hit was fatal
    pub dead: bool,
}

/// Vitality/wound track for one combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageTrack {
    /// Vitality points, lost before wounds
    pub vitality: i32,
    /// Wound points, start at the constitution score
    pub wounds: i32,
    /// Armor damage reduction
    pub damage_reduction: i32,
}

impl DamageTrack {
    /// Create a new track from starting vitality, constitution and armor
    pub fn new(vitality: i32, constitution: i32, damage_reduction: i32) -> Self {
        Self {
            vitality,
            wounds: constitution,
            damage_reduction,
        }
    }

    /// Check if the track has dropped to death
    pub fn is_dead(&self) -> bool {
        self.wounds <= DEATH_THRESHOLD
    }

    /// Inflict wounds directly, ignoring vitality.
    ///
    /// Armor soaks up to its damage reduction. Returns the amount soaked:
    /// all of `damage` if it does not exceed the armor, otherwise the armor's
    /// damage reduction (the rest comes off wounds).
    pub fn inflict_wounds(&mut self, damage: i32) -> i32 {
        let damage = damage.max(0);
        if damage < self.damage_reduction {
            return damage;
        }
        self.wounds -= damage - self.damage_reduction;
        self.damage_reduction
    }

    /// Apply an ordinary hit: vitality first, overflow to wounds
    pub fn take_damage(&mut self, damage: i32) -> DamageResult {
        let damage = damage.max(0);
        self.vitality -= damage;
        if self.vitality < 0 {
            let overflow = -self.vitality;
            self.vitality = 0;
            self.inflict_wounds(overflow);
        }
        self.result(damage)
    }

    /// Apply a critical hit: wounds take the blow, then vitality takes the
    /// soaked portion times `multiplier`
    pub fn take_critical(&mut self, damage: i32, multiplier: i32) -> DamageResult {
        let soaked = self.inflict_wounds(damage);
        let mut result = self.take_damage(soaked * multiplier);
        result.base_damage = damage.max(0);
        result
    }

    fn result(&self, base_damage: i32) -> DamageResult {
        DamageResult {
            base_damage,
            vitality: self.vitality,
            wounds: self.wounds,
            dead: self.is_dead(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vitality_absorbs_first() {
        let mut track = DamageTrack::new(30, 14, 4);
        let result = track.take_damage(12);
        assert_eq!(result.vitality, 18);
        assert_eq!(result.wounds, 14);
        assert!(!result.dead);
    }

    #[test]
    fn test_overflow_goes_to_wounds_through_armor() {
        let mut track = DamageTrack::new(10, 14, 4);

        // 10 vitality, 10 overflow, 4 soaked by armor
        let result = track.take_damage(20);
        assert_eq!(result.vitality, 0);
        assert_eq!(result.wounds, 8);
    }

    #[test]
    fn test_armor_soaks_small_overflow() {
        let mut track = DamageTrack::new(5, 14, 7);
        let result = track.take_damage(8);
        assert_eq!(result.vitality, 0);
        assert_eq!(result.wounds, 14);
    }

    #[test]
    fn test_inflict_wounds_returns_soaked() {
        let mut track = DamageTrack::new(0, 15, 3);
        assert_eq!(track.inflict_wounds(2), 2);
        assert_eq!(track.wounds, 15);

        assert_eq!(track.inflict_wounds(10), 3);
        assert_eq!(track.wounds, 8);
    }

    #[test]
    fn test_critical() {
        let mut track = DamageTrack::new(40, 16, 4);

        // 10 damage: 6 to wounds, 4 soaked, 8 to vitality
        let result = track.take_critical(10, DEFAULT_CRITICAL_MULTIPLIER);
        assert_eq!(result.base_damage, 10);
        assert_eq!(result.wounds, 10);
        assert_eq!(result.vitality, 32);
    }

    #[test]
    fn test_death_threshold() {
        let mut track = DamageTrack::new(0, 5, 0);
        assert!(!track.take_damage(14).dead);
        assert_eq!(track.wounds, -9);
        let result = track.take_damage(1);
        assert!(result.dead);
        assert!(track.is_dead());
    }

    #[test]
    fn test_negative_damage_is_ignored() {
        let mut track = DamageTrack::new(10, 10, 2);
        let result = track.take_damage(-5);
        assert_eq!(result.vitality, 10);
        assert_eq!(result.base_damage, 0);
    }
}
