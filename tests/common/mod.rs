//! Common test utilities - a small adventuring party and roster files

use std::io::Write;

use gmkit::combat::{Combatant, DiceRoll};
use tempfile::NamedTempFile;

/// The party used across encounter tests
pub fn party() -> Vec<Combatant> {
    vec![
        Combatant::new("Kwahu", 52, 14, 7, 10, DiceRoll::new(1, 12, 8)),
        Combatant::new("Jarek", 32, 15, 1, 3, DiceRoll::die(8)).with_threat_range(19),
        Combatant::new("Zane", 40, 16, 4, 6, DiceRoll::new(1, 6, 3)).with_threat_range(17),
        Combatant::new("Blue Fox", 59, 16, 4, 11, DiceRoll::new(1, 8, 3)),
    ]
}

/// Write `contents` to a temporary file that lives as long as the handle
pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}
