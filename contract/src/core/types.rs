//! Shared deterministic types for the engine core.
//!
//! These types are the values passed between core components and handed back
//! to callers. They carry no references to external state.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::EngineError;

/// One of the five resource pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stat {
    Damage,
    Risk,
    Money,
    Grit,
    Veil,
}

impl Stat {
    pub const ALL: [Stat; 5] = [Stat::Damage, Stat::Risk, Stat::Money, Stat::Grit, Stat::Veil];

    pub fn as_str(self) -> &'static str {
        match self {
            Stat::Damage => "Damage",
            Stat::Risk => "Risk",
            Stat::Money => "Money",
            Stat::Grit => "Grit",
            Stat::Veil => "Veil",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stat {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|stat| stat.as_str().eq_ignore_ascii_case(raw))
            .ok_or(())
    }
}

/// The five signed pool totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pools {
    pub damage: i64,
    pub risk: i64,
    pub money: i64,
    pub grit: i64,
    pub veil: i64,
}

impl Pools {
    pub fn get(&self, stat: Stat) -> i64 {
        match stat {
            Stat::Damage => self.damage,
            Stat::Risk => self.risk,
            Stat::Money => self.money,
            Stat::Grit => self.grit,
            Stat::Veil => self.veil,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut i64 {
        match stat {
            Stat::Damage => &mut self.damage,
            Stat::Risk => &mut self.risk,
            Stat::Money => &mut self.money,
            Stat::Grit => &mut self.grit,
            Stat::Veil => &mut self.veil,
        }
    }
}

/// Availability state of a node for the current selection and roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Available,
    Selected,
    Unavailable,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeState::Available => "available",
            NodeState::Selected => "selected",
            NodeState::Unavailable => "unavailable",
        })
    }
}

/// Per-node availability, keyed (and therefore iterated) by node id.
pub type Availability = BTreeMap<String, NodeState>;

/// What happened to a single effect during a pool pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EffectOutcome {
    /// The condition held and the pool moved from `before` to `after`.
    Applied { stat: Stat, before: i64, after: i64 },
    ConditionNotMet,
    /// The effect failed to parse or evaluate and was excluded from the sums.
    Failed { error: EngineError },
}

/// One trace line: a single effect slot of a selected node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub node_id: String,
    /// 1 for `effect1`, 2 for `effect2`.
    pub slot: u8,
    pub raw: String,
    #[serde(flatten)]
    pub outcome: EffectOutcome,
}

/// How much Damage/Risk the Grit/Veil pools prevented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PreventionBreakdown {
    pub damage_prevented: i64,
    pub grit_consumed: i64,
    /// Grit left after consumption.
    pub grit_remaining: i64,
    pub risk_prevented: i64,
    pub veil_consumed: i64,
    /// Veil left after consumption.
    pub veil_remaining: i64,
}

/// Output of a full pool recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolReport {
    /// Sums before prevention.
    pub raw: Pools,
    /// Final totals. Grit and Veil show the accumulated (pre-consumption) values.
    pub pools: Pools,
    pub prevention: PreventionBreakdown,
    pub trace: Vec<TraceEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_parses_case_insensitively() {
        assert_eq!("money".parse::<Stat>(), Ok(Stat::Money));
        assert_eq!("VEIL".parse::<Stat>(), Ok(Stat::Veil));
        assert!("Gold".parse::<Stat>().is_err());
    }

    #[test]
    fn pools_get_mut_targets_named_stat() {
        let mut pools = Pools::default();
        *pools.get_mut(Stat::Grit) += 4;
        assert_eq!(pools.get(Stat::Grit), 4);
        assert_eq!(pools.grit, 4);
        assert_eq!(pools.damage, 0);
    }
}
