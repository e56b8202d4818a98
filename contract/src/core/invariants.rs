//! Semantic checks on a built contract.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;

use crate::core::gate::GateParams;
use crate::graph::{Contract, Node, NodeKind};

/// Validation findings, in node id order.
///
/// Errors block the offending node (it can never be selected or its effect
/// never applies). Warnings flag data that is ignored or can never matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ContractReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check semantic invariants the loader cannot express:
/// - effect and gate strings parse
/// - Gate nodes carry a gate rule and no effects
/// - `Node` gates reference existing nodes and can be satisfied
/// - at least one Start node exists and every node is reachable from one
pub fn validate_contract(contract: &Contract) -> ContractReport {
    let mut report = ContractReport::default();

    if !contract.nodes().any(|node| node.kind == NodeKind::Start) {
        report.errors.push("contract has no start node".to_string());
    }

    let reachable = reachable_from_starts(contract);
    for node in contract.nodes() {
        validate_node(contract, node, &mut report);
        if !reachable.contains(node.id.as_str()) {
            report
                .warnings
                .push(format!("{}: unreachable from any start node", node.id));
        }
    }

    report
}

fn validate_node(contract: &Contract, node: &Node, report: &mut ContractReport) {
    for slot in &node.effects {
        if let Err(err) = &slot.parsed {
            report.errors.push(format!(
                "{}: effect{} '{}': {}",
                node.id, slot.slot, slot.raw, err
            ));
        }
    }

    if node.kind != NodeKind::Gate {
        if let Some(gate) = &node.gate {
            report.warnings.push(format!(
                "{}: gate rule '{}' ignored on {:?} node",
                node.id, gate.raw, node.kind
            ));
        }
        if node.kind == NodeKind::End && !node.connections.is_empty() {
            report
                .warnings
                .push(format!("{}: end node has outgoing connections", node.id));
        }
        return;
    }

    if !node.effects.is_empty() {
        report
            .errors
            .push(format!("{}: gate node must not carry effects", node.id));
    }

    let gate = match &node.gate {
        Some(gate) => gate,
        None => {
            report
                .errors
                .push(format!("{}: gate node has no gate rule", node.id));
            return;
        }
    };
    let rule = match &gate.parsed {
        Ok(rule) => rule,
        Err(err) => {
            report
                .errors
                .push(format!("{}: gate '{}': {}", node.id, gate.raw, err));
            return;
        }
    };

    if let GateParams::Node(ids) = &rule.params {
        for id in ids {
            if contract.node(id).is_none() {
                report.errors.push(format!(
                    "{}: gate references unknown node '{}'",
                    node.id, id
                ));
            }
        }
        if rule.threshold as usize > ids.len() {
            report.warnings.push(format!(
                "{}: gate threshold {} exceeds {} listed nodes and can never hold",
                node.id,
                rule.threshold,
                ids.len()
            ));
        }
    }
}

fn reachable_from_starts(contract: &Contract) -> BTreeSet<&str> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut queue: VecDeque<&Node> = contract
        .nodes()
        .filter(|node| node.kind == NodeKind::Start)
        .collect();
    while let Some(node) = queue.pop_front() {
        if !seen.insert(node.id.as_str()) {
            continue;
        }
        for next in node.connections.iter().filter_map(|id| contract.node(id)) {
            if !seen.contains(next.id.as_str()) {
                queue.push_back(next);
            }
        }
    }
    seen
}
