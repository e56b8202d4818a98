//! Test-only helpers for constructing contracts, rosters and selections.

use crate::core::selection::Selection;
use crate::graph::{Contract, NodeColor, NodeKind, NodeRecord};
use crate::roster::{Roster, Runner, RunnerType};

/// Create a node record with no effects and the given outgoing connections.
pub fn node(id: &str, kind: NodeKind, color: NodeColor, connections: &[&str]) -> NodeRecord {
    NodeRecord {
        id: id.to_string(),
        kind,
        color,
        effect1: None,
        effect2: None,
        gate: None,
        connections: connections.iter().map(|id| id.to_string()).collect(),
    }
}

/// Create a Gate node record carrying `rule`.
pub fn gate_node(id: &str, rule: &str, connections: &[&str]) -> NodeRecord {
    NodeRecord {
        gate: Some(rule.to_string()),
        ..node(id, NodeKind::Gate, NodeColor::Grey, connections)
    }
}

/// Build a contract, panicking on structural errors.
pub fn contract(records: Vec<NodeRecord>) -> Contract {
    Contract::new("test", records).expect("test contract")
}

/// Create a runner with zeroed stats.
pub fn runner(slot: usize, kind: RunnerType) -> Runner {
    Runner {
        slot,
        kind,
        ..Runner::default()
    }
}

/// Build a roster, panicking on bad slots.
pub fn roster(runners: Vec<Runner>) -> Roster {
    Roster::new(runners).expect("test roster")
}

pub fn selection(ids: &[&str]) -> Selection {
    ids.iter().copied().collect()
}
