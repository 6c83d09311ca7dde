//! Initiative tracking
//!
//! Keeps turn order for an encounter:
//! - Entries keyed by initiative score, highest acts first
//! - A cursor holding the initiative currently on the clock
//! - Round counting, wrapping from the lowest score back to the highest
//!
//! Entries live in an ordered map keyed by initiative, so finding the next
//! actor is a predecessor lookup below the cursor. Scores are expected to be
//! unique; what happens when they are not is governed by [`DuplicatePolicy`].

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::combatant::{Combatant, Participant};

/// Initiative tracker errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    #[error("combatant not found: {0}")]
    NotFound(String),

    #[error("there is no combatant at {0}")]
    NoActor(Cursor),

    #[error("{count} combatants share initiative {initiative}; initiative must be unique")]
    AmbiguousActor { initiative: Initiative, count: usize },

    #[error("cannot advance an empty initiative order")]
    EmptyTracker,

    #[error("initiative {initiative} is already held by {holder}")]
    DuplicateInitiative { initiative: Initiative, holder: String },

    #[error("initiative must be a finite number, got {0}")]
    InvalidInitiative(f64),
}

/// What to do when two entries would share an initiative score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Accept duplicates; the clash surfaces as `AmbiguousActor` when the
    /// cursor reaches that score
    #[default]
    Defer,
    /// Refuse duplicates at `add` / `change_initiative` time
    Reject,
}

/// An initiative score.
///
/// Any finite number; fractional scores ("16.1", "16.9") settle ties by hand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Initiative(f64);

impl Initiative {
    /// Create a score, rejecting NaN and infinities
    pub fn new(value: f64) -> Result<Self, TrackerError> {
        if !value.is_finite() {
            return Err(TrackerError::InvalidInitiative(value));
        }
        // -0.0 and 0.0 are the same score
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    /// The raw score
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Initiative {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Initiative {}

impl PartialOrd for Initiative {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Initiative {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<i32> for Initiative {
    fn from(value: i32) -> Self {
        Self(f64::from(value))
    }
}

impl TryFrom<f64> for Initiative {
    type Error = TrackerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Initiative> for f64 {
    fn from(initiative: Initiative) -> Self {
        initiative.0
    }
}

impl fmt::Display for Initiative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64 Display already drops ".0" for whole numbers
        write!(f, "{}", self.0)
    }
}

/// Stable identity for an entry, issued by [`InitiativeTracker::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CombatantId(u64);

impl CombatantId {
    /// The raw id
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The initiative currently on the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "initiative", rename_all = "lowercase")]
pub enum Cursor {
    /// Above every score: nobody has acted yet this round
    #[default]
    Idle,
    /// Someone at this initiative is acting
    At(Initiative),
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Idle => write!(f, "the top of the order (combat has not advanced)"),
            Cursor::At(initiative) => write!(f, "initiative {}", initiative),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot<C> {
    combatant: C,
    initiative: Initiative,
}

/// Turn order for one encounter
#[derive(Debug, Clone)]
pub struct InitiativeTracker<C = Combatant> {
    /// Combatants by id, iterated in insertion order
    roster: BTreeMap<CombatantId, Slot<C>>,
    /// Ids by initiative; ties kept in insertion order
    order: BTreeMap<Initiative, Vec<CombatantId>>,
    round: u32,
    cursor: Cursor,
    policy: DuplicatePolicy,
    next_id: u64,
}

impl<C> Default for InitiativeTracker<C> {
    fn default() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }
}

impl<C: Participant> InitiativeTracker<C> {
    /// Create an empty tracker at round 0 with deferred duplicate checking
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C> InitiativeTracker<C> {
    /// Create an empty tracker with the given duplicate policy
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            roster: BTreeMap::new(),
            order: BTreeMap::new(),
            round: 0,
            cursor: Cursor::Idle,
            policy,
            next_id: 1,
        }
    }

    /// Current round (0 until the first `advance`)
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Initiative currently on the clock
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Duplicate policy in force
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    /// Get a combatant by id
    pub fn get(&self, id: CombatantId) -> Option<&C> {
        self.roster.get(&id).map(|slot| &slot.combatant)
    }

    /// Get a combatant by id for mutation (e.g. applying damage)
    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut C> {
        self.roster.get_mut(&id).map(|slot| &mut slot.combatant)
    }

    /// Initiative of a combatant
    pub fn initiative_of(&self, id: CombatantId) -> Option<Initiative> {
        self.roster.get(&id).map(|slot| slot.initiative)
    }

    /// Entries in turn order: initiative descending, ties in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (Initiative, CombatantId, &C)> + '_ {
        self.order.iter().rev().flat_map(move |(&initiative, ids)| {
            ids.iter()
                .filter_map(move |id| self.get(*id).map(|c| (initiative, *id, c)))
        })
    }

    /// Id of the combatant whose action it is
    pub fn current_id(&self) -> Result<CombatantId, TrackerError> {
        let Cursor::At(initiative) = self.cursor else {
            return Err(TrackerError::NoActor(self.cursor));
        };

        match self.order.get(&initiative).map(Vec::as_slice) {
            None | Some([]) => Err(TrackerError::NoActor(self.cursor)),
            Some([id]) => Ok(*id),
            Some(ids) => Err(TrackerError::AmbiguousActor {
                initiative,
                count: ids.len(),
            }),
        }
    }

    /// The combatant whose action it is.
    ///
    /// Fails with `NoActor` before the first `advance` or once the acting
    /// combatant has been removed, and with `AmbiguousActor` when several
    /// entries share the cursor's initiative.
    pub fn current_combatant(&self) -> Result<&C, TrackerError> {
        let id = self.current_id()?;
        self.get(id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    /// Drop a combatant from the order
    pub fn remove(&mut self, id: CombatantId) -> Result<C, TrackerError> {
        let slot = self
            .roster
            .remove(&id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;
        self.unlink(id, slot.initiative);
        Ok(slot.combatant)
    }

    /// Holder of `initiative` other than `except`, if any
    fn holder_of(&self, initiative: Initiative, except: Option<CombatantId>) -> Option<CombatantId> {
        self.order
            .get(&initiative)?
            .iter()
            .copied()
            .find(|id| Some(*id) != except)
    }

    fn link(&mut self, id: CombatantId, initiative: Initiative) {
        self.order.entry(initiative).or_default().push(id);
    }

    fn unlink(&mut self, id: CombatantId, initiative: Initiative) {
        if let Some(ids) = self.order.get_mut(&initiative) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.order.remove(&initiative);
            }
        }
    }
}

impl<C: Participant> InitiativeTracker<C> {
    /// Add a combatant at the given initiative.
    ///
    /// Under [`DuplicatePolicy::Defer`] the caller is responsible for
    /// picking a score nobody else holds.
    pub fn add(
        &mut self,
        combatant: C,
        initiative: impl Into<f64>,
    ) -> Result<CombatantId, TrackerError> {
        let initiative = Initiative::new(initiative.into())?;
        self.check_duplicate(initiative, None)?;

        let id = CombatantId(self.next_id);
        self.next_id += 1;

        debug!("added {} ({}) at initiative {}", combatant.name(), id, initiative);
        self.roster.insert(id, Slot { combatant, initiative });
        self.link(id, initiative);
        Ok(id)
    }

    /// Move a combatant to a new initiative (readied actions, delays).
    ///
    /// The old entry is replaced only once the new one is known to be valid.
    pub fn change_initiative(
        &mut self,
        id: CombatantId,
        initiative: impl Into<f64>,
    ) -> Result<(), TrackerError> {
        let initiative = Initiative::new(initiative.into())?;
        let old = self
            .initiative_of(id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;
        self.check_duplicate(initiative, Some(id))?;

        self.unlink(id, old);
        self.link(id, initiative);
        if let Some(slot) = self.roster.get_mut(&id) {
            slot.initiative = initiative;
        }

        debug!("moved {} from initiative {} to {}", id, old, initiative);
        Ok(())
    }

    /// Find the first combatant (in insertion order) with this display name
    pub fn lookup(&self, name: &str) -> Result<(CombatantId, &C), TrackerError> {
        self.roster
            .iter()
            .find(|(_, slot)| slot.combatant.name() == name)
            .map(|(id, slot)| (*id, &slot.combatant))
            .ok_or_else(|| TrackerError::NotFound(name.to_string()))
    }

    /// Hand the turn to the next combatant and return them.
    ///
    /// Moves the cursor to the highest initiative below it. When nobody is
    /// left below, a new round starts at the top of the order.
    pub fn advance(&mut self) -> Result<&C, TrackerError> {
        let top = match self.order.keys().next_back() {
            Some(top) => *top,
            None => return Err(TrackerError::EmptyTracker),
        };

        let below = match self.cursor {
            Cursor::Idle => None,
            Cursor::At(current) => self.order.range(..current).next_back().map(|(k, _)| *k),
        };

        let next = match below {
            Some(next) => next,
            None => {
                self.round += 1;
                info!("new round: round #{}", self.round);
                top
            }
        };
        self.cursor = Cursor::At(next);

        let current = self.current_combatant()?;
        debug!("round #{}, {}: {}'s action", self.round, next, current.name());
        Ok(current)
    }

    /// Point-in-time view of the encounter
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            round: self.round,
            actor: self.current_combatant().ok().map(|c| c.name().to_string()),
            entries: self
                .entries()
                .map(|(initiative, id, c)| SnapshotEntry {
                    id,
                    initiative,
                    name: c.name().to_string(),
                    summary: c.summary(),
                })
                .collect(),
        }
    }

    /// Human-readable summary of the encounter
    pub fn describe(&self) -> String {
        self.snapshot().to_string()
    }

    fn check_duplicate(
        &self,
        initiative: Initiative,
        except: Option<CombatantId>,
    ) -> Result<(), TrackerError> {
        if self.policy == DuplicatePolicy::Defer {
            return Ok(());
        }
        match self.holder_of(initiative, except) {
            Some(holder) => Err(TrackerError::DuplicateInitiative {
                initiative,
                holder: self
                    .get(holder)
                    .map(|c| c.name().to_string())
                    .unwrap_or_else(|| holder.to_string()),
            }),
            None => Ok(()),
        }
    }
}

impl<C: Participant> fmt::Display for InitiativeTracker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}

/// One line of a [`TrackerSnapshot`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotEntry {
    pub id: CombatantId,
    pub initiative: Initiative,
    pub name: String,
    pub summary: String,
}

/// Serializable view of a tracker, rendered by [`InitiativeTracker::describe`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub round: u32,
    /// Name of the acting combatant, if the cursor resolves to exactly one
    pub actor: Option<String>,
    pub entries: Vec<SnapshotEntry>,
}

impl fmt::Display for TrackerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actor {
            Some(actor) => write!(f, "Round #{}, {}'s action", self.round, actor)?,
            None => write!(f, "Round #{}, no current actor", self.round)?,
        }
        for entry in &self.entries {
            write!(f, "\n{}:\t{}", entry.initiative, entry.summary)?;
        }
        Ok(())
    }
}
