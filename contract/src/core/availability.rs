//! Node availability and selection transitions.
//!
//! A node is *unlocked* when it is a Start node or has an edge from a selected
//! node, and, if it is a Gate node, its gate rule holds. The effective
//! selection is the least fixed point of "requested and unlocked", built up
//! from Start nodes, so a requested node only survives if a chain of surviving
//! selections reaches it. Cycles cannot keep each other alive.
//!
//! Every call recomputes from the inputs; nothing is cached between calls.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::gate::evaluate_gate;
use crate::core::selection::Selection;
use crate::core::types::{Availability, NodeState};
use crate::graph::{Contract, Node, NodeKind};
use crate::roster::Roster;

/// Selected node ids that remain valid for `contract` and `roster`, in id order.
pub fn effective_selection(
    contract: &Contract,
    selection: &Selection,
    roster: &Roster,
) -> BTreeSet<String> {
    let requested: Vec<&Node> = selection
        .to_set()
        .iter()
        .filter_map(|id| contract.node(id))
        .collect();

    let mut retained = BTreeSet::new();
    loop {
        let mut changed = false;
        for node in &requested {
            if retained.contains(&node.id) {
                continue;
            }
            if is_unlocked(contract, node, &retained, roster) {
                retained.insert(node.id.clone());
                changed = true;
            }
        }
        if !changed {
            return retained;
        }
    }
}

/// True if `node` may be selected given the already-selected ids.
pub fn is_unlocked(
    contract: &Contract,
    node: &Node,
    selected: &BTreeSet<String>,
    roster: &Roster,
) -> bool {
    if node.kind == NodeKind::Gate {
        let gate_holds = match node.active_gate() {
            Some(Ok(rule)) => evaluate_gate(rule, roster, selected),
            Some(Err(_)) | None => false,
        };
        if !gate_holds {
            return false;
        }
    }
    node.kind == NodeKind::Start
        || contract
            .predecessors(&node.id)
            .iter()
            .any(|pred| selected.contains(pred))
}

/// State of every node in the contract.
pub fn recompute_availability(
    contract: &Contract,
    selection: &Selection,
    roster: &Roster,
) -> Availability {
    let selected = effective_selection(contract, selection, roster);
    contract
        .nodes()
        .map(|node| {
            let state = if selected.contains(&node.id) {
                NodeState::Selected
            } else if is_unlocked(contract, node, &selected, roster) {
                NodeState::Available
            } else {
                NodeState::Unavailable
            };
            (node.id.clone(), state)
        })
        .collect()
}

/// Rejected selection transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("unknown node '{0}'")]
    UnknownNode(String),
    #[error("node '{id}' is {state}, not available")]
    NotAvailable { id: String, state: NodeState },
    #[error("node '{0}' is not selected")]
    NotSelected(String),
}

/// Selection after a transition, plus the nodes dropped along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionUpdate {
    pub selection: Selection,
    /// Previously selected ids that no longer hold, in id order.
    pub demoted: Vec<String>,
}

/// Drop every selected node that is no longer unlocked, transitively.
///
/// Call after a roster change: a runner gate may have stopped holding.
pub fn prune_selection(contract: &Contract, selection: &Selection, roster: &Roster) -> SelectionUpdate {
    let retained = effective_selection(contract, selection, roster);
    let mut pruned = selection.clone();
    pruned.retain(|id| retained.contains(id));
    let mut demoted: Vec<String> = selection
        .iter()
        .filter(|id| !retained.contains(*id))
        .map(str::to_string)
        .collect();
    demoted.sort();
    SelectionUpdate {
        selection: pruned,
        demoted,
    }
}

/// Select an `Available` node.
pub fn select_node(
    contract: &Contract,
    selection: &Selection,
    roster: &Roster,
    id: &str,
) -> Result<SelectionUpdate, TransitionError> {
    let node = contract
        .node(id)
        .ok_or_else(|| TransitionError::UnknownNode(id.to_string()))?;
    let mut update = prune_selection(contract, selection, roster);
    let selected = update.selection.to_set();
    if selected.contains(id) {
        return Err(TransitionError::NotAvailable {
            id: id.to_string(),
            state: NodeState::Selected,
        });
    }
    if !is_unlocked(contract, node, &selected, roster) {
        return Err(TransitionError::NotAvailable {
            id: id.to_string(),
            state: NodeState::Unavailable,
        });
    }
    update.selection.insert(id);
    Ok(update)
}

/// Deselect a `Selected` node and cascade demotion through its dependents.
pub fn deselect_node(
    contract: &Contract,
    selection: &Selection,
    roster: &Roster,
    id: &str,
) -> Result<SelectionUpdate, TransitionError> {
    if contract.node(id).is_none() {
        return Err(TransitionError::UnknownNode(id.to_string()));
    }
    if !effective_selection(contract, selection, roster).contains(id) {
        return Err(TransitionError::NotSelected(id.to_string()));
    }
    let mut remaining = selection.clone();
    remaining.remove(id);
    Ok(prune_selection(contract, &remaining, roster))
}
