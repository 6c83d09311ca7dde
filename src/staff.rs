//! Magic staff pricing
//!
//! Prices a staff from the spells stored in it:
//! - The highest-level spell pays full price, the next 3/4, the rest 1/2
//! - Spell price scales with the staff's minimum caster level (at least 8)
//! - Charges divide the per-use cost of each spell
//! - Creation cost is half the base price plus materials, with XP and days

use std::fmt;
use std::path::Path;

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base price factor for the most expensive spell
const BASE_PRICE: f64 = 375.0;

/// Minimum caster level of any staff
const MIN_STAFF_CASTER_LEVEL: u32 = 8;

/// Gold per point of a spell's material component
const MATERIAL_FACTOR: f64 = 50.0;

/// Staff pricing errors
#[derive(Debug, Error)]
pub enum StaffError {
    #[error("spell {0:?} must have at least one charge")]
    ZeroCharges(String),

    #[error("failed to read staff definition: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid staff definition: {0}")]
    Parse(#[from] figment::Error),
}

/// A spell that can be stored in a staff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    pub level: u32,
    /// Material component cost
    #[serde(default)]
    pub material: u32,
    /// Focus component cost
    #[serde(default)]
    pub focus: u32,
    /// XP component cost
    #[serde(default)]
    pub xp: u32,
}

impl Spell {
    /// A spell with no component costs
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level,
            material: 0,
            focus: 0,
            xp: 0,
        }
    }

    /// Set the material component cost
    pub fn with_material(mut self, material: u32) -> Self {
        self.material = material;
        self
    }

    /// Lowest caster level able to cast this spell
    pub fn minimum_caster_level(&self) -> u32 {
        (self.level * 2).saturating_sub(1)
    }
}

impl fmt::Display for Spell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.level)
    }
}

/// A spell stored in a staff with its charge cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSpell {
    #[serde(flatten)]
    pub spell: Spell,
    /// Charges expended per casting
    #[serde(default = "default_charges")]
    pub charges: u32,
}

fn default_charges() -> u32 {
    1
}

/// Gold cost of one stored spell: (base price, material cost)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpellCost {
    pub base: f64,
    pub material: f64,
}

impl SpellCost {
    /// Base plus material
    pub fn total(&self) -> f64 {
        self.base + self.material
    }
}

/// What it takes to craft a staff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreationCost {
    pub gold: f64,
    pub xp: f64,
    pub days: f64,
}

impl CreationCost {
    /// Creation cost from a base price and material cost
    pub fn new(base_price: f64, material: f64) -> Self {
        Self {
            gold: base_price / 2.0 + material,
            xp: (base_price / 25.0).ceil(),
            days: (base_price / 1000.0).ceil(),
        }
    }
}

impl fmt::Display for CreationCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} GP; {} XP; {} days",
            self.gold as i64, self.xp as i64, self.days as i64
        )
    }
}

/// A staff holding several spells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub name: String,
    #[serde(default, rename = "spell")]
    spells: Vec<StoredSpell>,
}

impl Staff {
    /// Create an empty staff
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spells: Vec::new(),
        }
    }

    /// Load a staff definition from a TOML file
    pub fn load(path: &Path) -> Result<Self, StaffError> {
        let text = std::fs::read_to_string(path)?;
        let raw: Staff = Figment::from(Toml::string(&text)).extract()?;

        let mut staff = Staff::new(raw.name);
        for stored in raw.spells {
            staff.add(stored.spell, stored.charges)?;
        }
        Ok(staff)
    }

    /// Store a spell using `charges` charges per casting.
    ///
    /// Adding the exact same spell and charge count twice has no effect.
    pub fn add(&mut self, spell: Spell, charges: u32) -> Result<(), StaffError> {
        if charges == 0 {
            return Err(StaffError::ZeroCharges(spell.name));
        }
        let stored = StoredSpell { spell, charges };
        if !self.spells.contains(&stored) {
            self.spells.push(stored);
        }
        Ok(())
    }

    /// Stored spells, highest level first
    pub fn spells(&self) -> Vec<&StoredSpell> {
        let mut spells: Vec<&StoredSpell> = self.spells.iter().collect();
        spells.sort_by(|a, b| {
            b.spell
                .level
                .cmp(&a.spell.level)
                .then_with(|| a.spell.name.cmp(&b.spell.name))
        });
        spells
    }

    /// Caster level the staff is built at
    pub fn minimum_caster_level(&self) -> u32 {
        self.spells
            .iter()
            .map(|s| s.spell.minimum_caster_level())
            .fold(MIN_STAFF_CASTER_LEVEL, u32::max)
    }

    /// Price multiplier for each spell, in `spells()` order
    pub fn multipliers(&self) -> Vec<f64> {
        (0..self.spells.len())
            .map(|i| match i {
                0 => BASE_PRICE,
                1 => 0.75 * BASE_PRICE,
                _ => 0.5 * BASE_PRICE,
            })
            .collect()
    }

    /// Unscaled per-charge cost of one stored spell
    pub fn spell_cost(&self, stored: &StoredSpell) -> SpellCost {
        let charges = f64::from(stored.charges);
        SpellCost {
            base: f64::from(self.minimum_caster_level() * stored.spell.level) / charges,
            material: MATERIAL_FACTOR * f64::from(stored.spell.material) / charges,
        }
    }

    /// Priced cost of every spell, in `spells()` order
    pub fn costs(&self) -> Vec<SpellCost> {
        self.spells()
            .into_iter()
            .zip(self.multipliers())
            .map(|(stored, multiplier)| {
                let cost = self.spell_cost(stored);
                SpellCost {
                    base: cost.base * multiplier,
                    material: cost.material,
                }
            })
            .collect()
    }

    /// Total (base price, material cost)
    pub fn cost(&self) -> SpellCost {
        self.costs().iter().fold(
            SpellCost {
                base: 0.0,
                material: 0.0,
            },
            |acc, c| SpellCost {
                base: acc.base + c.base,
                material: acc.material + c.material,
            },
        )
    }

    /// Market price in gold
    pub fn market_price(&self) -> f64 {
        self.cost().total()
    }

    /// Crafting cost
    pub fn creation_cost(&self) -> CreationCost {
        let cost = self.cost();
        CreationCost::new(cost.base, cost.material)
    }
}

impl fmt::Display for Staff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .spells()
            .into_iter()
            .zip(self.costs())
            .map(|(stored, cost)| {
                format!(
                    "{} ({}) -- {} GP",
                    stored.spell, stored.charges, cost.total() as i64
                )
            })
            .collect();

        write!(
            f,
            "Staff of {}\n--\n{}\n--\nMarket Price: {}GP\nCreation cost: {}",
            self.name,
            lines.join("\n"),
            self.market_price() as i64,
            self.creation_cost()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn luck_staff() -> Staff {
        let mut staff = Staff::new("Luck");
        staff.add(Spell::new("Mislead", 6), 1).unwrap();
        staff.add(Spell::new("Break Enchantment", 5), 1).unwrap();
        staff.add(Spell::new("Prayer", 3), 1).unwrap();
        staff
    }

    #[test]
    fn test_minimum_caster_level() {
        assert_eq!(Spell::new("Heal", 6).minimum_caster_level(), 11);
        assert_eq!(Spell::new("Detect Undead", 1).minimum_caster_level(), 1);
        assert_eq!(Staff::new("Empty").minimum_caster_level(), 8);
        assert_eq!(luck_staff().minimum_caster_level(), 11);
    }

    #[test]
    fn test_spells_sorted_by_level() {
        let staff = luck_staff();
        let levels: Vec<u32> = staff.spells().iter().map(|s| s.spell.level).collect();
        assert_eq!(levels, vec![6, 5, 3]);
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(luck_staff().multipliers(), vec![375.0, 281.25, 187.5]);
    }

    #[test]
    fn test_costs() {
        let staff = luck_staff();
        let costs = staff.costs();

        // 11 * 6 * 375, 11 * 5 * 281.25, 11 * 3 * 187.5
        assert_eq!(costs[0].base, 24750.0);
        assert_eq!(costs[1].base, 15468.75);
        assert_eq!(costs[2].base, 6187.5);
        assert_eq!(staff.market_price(), 46406.25);
    }

    #[test]
    fn test_charges_and_material() {
        let mut staff = Staff::new("Piracy");
        staff.add(Spell::new("Control Weather", 7), 2).unwrap();
        staff
            .add(Spell::new("Consecrate", 2).with_material(50), 1)
            .unwrap();

        let costs = staff.costs();
        // mcl 13: 13 * 7 / 2 * 375
        assert_eq!(costs[0].base, 17062.5);
        // 13 * 2 * 281.25, plus 50 * 50 material
        assert_eq!(costs[1].base, 7312.5);
        assert_eq!(costs[1].material, 2500.0);
    }

    #[test]
    fn test_creation_cost() {
        let cost = CreationCost::new(24750.0, 100.0);
        assert_eq!(cost.gold, 12475.0);
        assert_eq!(cost.xp, 990.0);
        assert_eq!(cost.days, 25.0);
        assert_eq!(cost.to_string(), "12475 GP; 990 XP; 25 days");
    }

    #[test]
    fn test_zero_charges_rejected() {
        let mut staff = Staff::new("Broken");
        assert!(matches!(
            staff.add(Spell::new("Shield", 1), 0),
            Err(StaffError::ZeroCharges(name)) if name == "Shield"
        ));
    }

    #[test]
    fn test_duplicate_spell_ignored() {
        let mut staff = luck_staff();
        staff.add(Spell::new("Prayer", 3), 1).unwrap();
        assert_eq!(staff.spells().len(), 3);
        staff.add(Spell::new("Prayer", 3), 2).unwrap();
        assert_eq!(staff.spells().len(), 4);
    }

    #[test]
    fn test_empty_staff() {
        let staff = Staff::new("Nothing");
        assert_eq!(staff.market_price(), 0.0);
        assert_eq!(staff.creation_cost().to_string(), "0 GP; 0 XP; 0 days");
    }

    #[test]
    fn test_display() {
        let mut staff = Staff::new("Fire");
        staff.add(Spell::new("Fireball", 3), 1).unwrap();
        staff.add(Spell::new("Burning Hands", 1), 1).unwrap();

        // mcl 8: 8 * 3 * 375 = 9000, 8 * 1 * 281.25 = 2250
        assert_eq!(
            staff.to_string(),
            "Staff of Fire\n--\n\
             Fireball 3 (1) -- 9000 GP\n\
             Burning Hands 1 (1) -- 2250 GP\n\
             --\n\
             Market Price: 11250GP\n\
             Creation cost: 5625 GP; 450 XP; 12 days"
        );
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
name = "Piracy"

[[spell]]
name = "Control Weather"
level = 7
charges = 2

[[spell]]
name = "Fog Cloud"
level = 2
"#
        )
        .unwrap();

        let staff = Staff::load(file.path()).unwrap();
        assert_eq!(staff.name, "Piracy");
        let spells = staff.spells();
        assert_eq!(spells.len(), 2);
        assert_eq!(spells[0].charges, 2);
        assert_eq!(spells[1].charges, 1);
        assert_eq!(spells[1].spell.material, 0);
    }

    #[test]
    fn test_load_ignores_repeated_spell() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
name = "Devotion"

[[spell]]
name = "Prayer"
level = 3

[[spell]]
name = "Prayer"
level = 3
"#
        )
        .unwrap();

        let loaded = Staff::load(file.path()).unwrap();

        let mut built = Staff::new("Devotion");
        built.add(Spell::new("Prayer", 3), 1).unwrap();
        built.add(Spell::new("Prayer", 3), 1).unwrap();

        assert_eq!(loaded.spells().len(), 1);
        assert_eq!(loaded, built);
        assert_eq!(loaded.market_price(), built.market_price());
    }

    #[test]
    fn test_load_rejects_zero_charges() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "name = \"Bad\"\n[[spell]]\nname = \"Shield\"\nlevel = 1\ncharges = 0"
        )
        .unwrap();

        assert!(matches!(
            Staff::load(file.path()),
            Err(StaffError::ZeroCharges(_))
        ));
    }
}
