//! Encounter rosters
//!
//! Loads the combatants of an encounter, with their initiative, from TOML:
//!
//! ```toml
//! [[combatant]]
//! name = "Kwahu"
//! initiative = 18
//! vitality = 52
//! wounds = 14
//! damage_reduction = 7
//! attack_bonus = 10
//! damage = "1d12+8"
//! ```

use std::path::Path;

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::combat::{Combatant, InitiativeTracker, TrackerError};

/// Roster loading errors
#[derive(Debug, Error)]
pub enum EncounterError {
    #[error("failed to read roster: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid roster: {0}")]
    Parse(#[from] figment::Error),

    #[error("cannot seat {name}: {source}")]
    Tracker {
        name: String,
        #[source]
        source: TrackerError,
    },
}

/// A roster line: a combatant and the initiative they rolled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub initiative: f64,
    #[serde(flatten)]
    pub combatant: Combatant,
}

/// All combatants in an encounter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default, rename = "combatant")]
    pub combatants: Vec<RosterEntry>,
}

impl Roster {
    /// Parse a roster from TOML text
    pub fn from_toml(text: &str) -> Result<Self, EncounterError> {
        Ok(Figment::from(Toml::string(text)).extract()?)
    }

    /// Load a roster file
    pub fn load(path: &Path) -> Result<Self, EncounterError> {
        let text = std::fs::read_to_string(path)?;
        let roster = Self::from_toml(&text)?;
        debug!("loaded {} combatants from {}", roster.combatants.len(), path.display());
        Ok(roster)
    }

    /// Seat everyone in `tracker`, in roster order
    pub fn seat(self, tracker: &mut InitiativeTracker<Combatant>) -> Result<(), EncounterError> {
        for entry in self.combatants {
            let name = entry.combatant.name.clone();
            tracker
                .add(entry.combatant, entry.initiative)
                .map_err(|source| EncounterError::Tracker { name, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{DiceRoll, DuplicatePolicy, Participant};

    const ROSTER: &str = r#"
[[combatant]]
name = "Kwahu"
initiative = 18
vitality = 52
wounds = 14
damage_reduction = 7
attack_bonus = 10
damage = "1d12+8"

[[combatant]]
name = "Jarek"
initiative = 16.5
vitality = 32
wounds = 15
damage_reduction = 1
attack_bonus = 3
damage = "d8"
threat_range = 19
"#;

    #[test]
    fn test_parse_roster() {
        let roster = Roster::from_toml(ROSTER).unwrap();
        assert_eq!(roster.combatants.len(), 2);

        let kwahu = &roster.combatants[0];
        assert_eq!(kwahu.initiative, 18.0);
        assert_eq!(
            kwahu.combatant,
            Combatant::new("Kwahu", 52, 14, 7, 10, DiceRoll::new(1, 12, 8))
        );

        let jarek = &roster.combatants[1];
        assert_eq!(jarek.initiative, 16.5);
        assert_eq!(jarek.combatant.threat_range, 19);
        assert_eq!(jarek.combatant.damage, DiceRoll::die(8));
    }

    #[test]
    fn test_seat_roster() {
        let mut tracker = InitiativeTracker::new();
        Roster::from_toml(ROSTER).unwrap().seat(&mut tracker).unwrap();

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.advance().unwrap().name(), "Kwahu");
        assert_eq!(tracker.advance().unwrap().name(), "Jarek");
    }

    #[test]
    fn test_seat_duplicate_rejected() {
        let text = r#"
[[combatant]]
name = "A"
initiative = 10
vitality = 1
wounds = 1
damage_reduction = 0
attack_bonus = 0
damage = "1d4"

[[combatant]]
name = "B"
initiative = 10
vitality = 1
wounds = 1
damage_reduction = 0
attack_bonus = 0
damage = "1d4"
"#;
        let mut tracker = InitiativeTracker::with_policy(DuplicatePolicy::Reject);
        let err = Roster::from_toml(text).unwrap().seat(&mut tracker).unwrap_err();
        assert!(matches!(err, EncounterError::Tracker { ref name, .. } if name == "B"));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_bad_dice_notation() {
        let text = r#"
[[combatant]]
name = "A"
initiative = 10
vitality = 1
wounds = 1
damage_reduction = 0
attack_bonus = 0
damage = "lots"
"#;
        assert!(matches!(
            Roster::from_toml(text),
            Err(EncounterError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_roster() {
        let roster = Roster::from_toml("").unwrap();
        assert!(roster.combatants.is_empty());
    }
}
