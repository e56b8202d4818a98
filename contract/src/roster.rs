//! Runner roster: the team whose types and stats feed runner conditions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of runner slots on a roster.
pub const ROSTER_SLOTS: usize = 3;

/// Invalid runner slot assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("runner slot {0} out of range (0..{max})", max = ROSTER_SLOTS)]
    SlotOutOfRange(usize),
    #[error("duplicate runner slot {0}")]
    DuplicateSlot(usize),
}

/// Runner archetype. `Empty` marks an unfilled slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RunnerType {
    #[default]
    Empty,
    Face,
    Muscle,
    Hacker,
    Ninja,
}

impl RunnerType {
    pub const ALL: [RunnerType; 5] = [
        RunnerType::Empty,
        RunnerType::Face,
        RunnerType::Muscle,
        RunnerType::Hacker,
        RunnerType::Ninja,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RunnerType::Empty => "Empty",
            RunnerType::Face => "Face",
            RunnerType::Muscle => "Muscle",
            RunnerType::Hacker => "Hacker",
            RunnerType::Ninja => "Ninja",
        }
    }
}

impl fmt::Display for RunnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunnerType {
    type Err = ();

    /// Case-insensitive match on the type name.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
            .ok_or(())
    }
}

/// One of the four runner stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RunnerStat {
    Face,
    Muscle,
    Hacker,
    Ninja,
}

impl RunnerStat {
    pub const ALL: [RunnerStat; 4] = [
        RunnerStat::Face,
        RunnerStat::Muscle,
        RunnerStat::Hacker,
        RunnerStat::Ninja,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RunnerStat::Face => "Face",
            RunnerStat::Muscle => "Muscle",
            RunnerStat::Hacker => "Hacker",
            RunnerStat::Ninja => "Ninja",
        }
    }
}

impl fmt::Display for RunnerStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunnerStat {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|stat| stat.as_str().eq_ignore_ascii_case(raw))
            .ok_or(())
    }
}

/// A team member occupying one roster slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Runner {
    pub slot: usize,
    #[serde(rename = "type")]
    pub kind: RunnerType,
    pub face: u32,
    pub muscle: u32,
    pub hacker: u32,
    pub ninja: u32,
}

impl Runner {
    pub fn empty(slot: usize) -> Self {
        Self {
            slot,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == RunnerType::Empty
    }

    /// Raw stat value, regardless of runner type.
    pub fn stat(&self, stat: RunnerStat) -> u32 {
        match stat {
            RunnerStat::Face => self.face,
            RunnerStat::Muscle => self.muscle,
            RunnerStat::Hacker => self.hacker,
            RunnerStat::Ninja => self.ninja,
        }
    }
}

/// The full team. Always holds exactly [`ROSTER_SLOTS`] runners, ordered by slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Runner>", into = "Vec<Runner>")]
pub struct Roster {
    runners: Vec<Runner>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            runners: (0..ROSTER_SLOTS).map(Runner::empty).collect(),
        }
    }
}

impl Roster {
    /// Build a roster from runner records. Missing slots are filled with
    /// `Empty` runners; duplicate or out-of-range slots are rejected.
    pub fn new(runners: Vec<Runner>) -> Result<Self, RosterError> {
        let mut roster = Roster::default();
        let mut seen = [false; ROSTER_SLOTS];
        for runner in runners {
            if runner.slot >= ROSTER_SLOTS {
                return Err(RosterError::SlotOutOfRange(runner.slot));
            }
            if seen[runner.slot] {
                return Err(RosterError::DuplicateSlot(runner.slot));
            }
            seen[runner.slot] = true;
            let slot = runner.slot;
            roster.runners[slot] = runner;
        }
        Ok(roster)
    }

    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    /// Runners that count toward conditions (type is not `Empty`).
    pub fn active(&self) -> impl Iterator<Item = &Runner> {
        self.runners.iter().filter(|runner| !runner.is_empty())
    }

    /// Replace the runner in `runner.slot`.
    pub fn set(&mut self, runner: Runner) -> Result<(), RosterError> {
        let slot = runner.slot;
        let target = self
            .runners
            .get_mut(slot)
            .ok_or(RosterError::SlotOutOfRange(slot))?;
        *target = runner;
        Ok(())
    }

    pub fn has_type(&self, kind: RunnerType) -> bool {
        self.active().any(|runner| runner.kind == kind)
    }

    /// Sum of `stat` over non-Empty runners.
    pub fn stat_total(&self, stat: RunnerStat) -> i64 {
        self.active().map(|runner| i64::from(runner.stat(stat))).sum()
    }
}

impl TryFrom<Vec<Runner>> for Roster {
    type Error = RosterError;

    fn try_from(runners: Vec<Runner>) -> Result<Self, Self::Error> {
        Roster::new(runners)
    }
}

impl From<Roster> for Vec<Runner> {
    fn from(roster: Roster) -> Self {
        roster.runners
    }
}
