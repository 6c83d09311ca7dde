//! gmkit - tabletop game master's toolkit
//!
//! Dice, character stats, an initiative tracker for combat, and magic
//! staff pricing.

pub mod combat;
pub mod config;
pub mod encounter;
pub mod staff;
pub mod stats;

pub use combat::{Combatant, InitiativeTracker, TrackerError};
pub use config::Settings;
