//! Contract graph: nodes, their parsed effects and gates, and edges.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::effect::{Effect, parse_effect};
use crate::core::error::{EffectParseError, InvalidGateCondition};
use crate::core::gate::{GateRule, parse_gate};

static NODE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// True if `id` is a well-formed node identifier.
pub fn is_valid_node_id(id: &str) -> bool {
    NODE_ID_RE.is_match(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    Normal,
    Synergy,
    Start,
    End,
    Gate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum NodeColor {
    Red,
    Yellow,
    Green,
    Blue,
    Purple,
    #[default]
    #[serde(alias = "Gray")]
    Grey,
}

impl NodeColor {
    pub const ALL: [NodeColor; 6] = [
        NodeColor::Red,
        NodeColor::Yellow,
        NodeColor::Green,
        NodeColor::Blue,
        NodeColor::Purple,
        NodeColor::Grey,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeColor::Red => "Red",
            NodeColor::Yellow => "Yellow",
            NodeColor::Green => "Green",
            NodeColor::Blue => "Blue",
            NodeColor::Purple => "Purple",
            NodeColor::Grey => "Grey",
        }
    }
}

impl fmt::Display for NodeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeColor {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("Gray") {
            return Ok(NodeColor::Grey);
        }
        Self::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(raw))
            .ok_or(())
    }
}

/// A node as handed over by the contract loader, with unparsed rule strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeRecord {
    pub id: String,
    pub kind: NodeKind,
    pub color: NodeColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    pub connections: Vec<String>,
}

/// One effect slot of a node. Parse failures stay attached to the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectSlot {
    /// 1 or 2.
    pub slot: u8,
    pub raw: String,
    pub parsed: Result<Effect, EffectParseError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSlot {
    pub raw: String,
    pub parsed: Result<GateRule, InvalidGateCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub color: NodeColor,
    pub effects: Vec<EffectSlot>,
    pub gate: Option<GateSlot>,
    /// Outgoing edges, in record order.
    pub connections: Vec<String>,
}

impl Node {
    fn from_record(record: NodeRecord) -> Self {
        let effects = [(1u8, record.effect1), (2u8, record.effect2)]
            .into_iter()
            .filter_map(|(slot, raw)| {
                let raw = non_blank(raw)?;
                let parsed = parse_effect(&raw);
                Some(EffectSlot { slot, raw, parsed })
            })
            .collect();
        let gate = non_blank(record.gate).map(|raw| GateSlot {
            parsed: parse_gate(&raw),
            raw,
        });
        Self {
            id: record.id,
            kind: record.kind,
            color: record.color,
            effects,
            gate,
            connections: record.connections,
        }
    }

    /// The gate rule that governs this node, if it is a Gate node with a
    /// parseable rule. Gate strings on other node kinds are ignored.
    pub fn active_gate(&self) -> Option<&Result<GateRule, InvalidGateCondition>> {
        if self.kind != NodeKind::Gate {
            return None;
        }
        self.gate.as_ref().map(|gate| &gate.parsed)
    }

    pub fn to_record(&self) -> NodeRecord {
        let effect = |slot: u8| {
            self.effects
                .iter()
                .find(|effect| effect.slot == slot)
                .map(|effect| effect.raw.clone())
        };
        NodeRecord {
            id: self.id.clone(),
            kind: self.kind,
            color: self.color,
            effect1: effect(1),
            effect2: effect(2),
            gate: self.gate.as_ref().map(|gate| gate.raw.clone()),
            connections: self.connections.clone(),
        }
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Structural problems that prevent building a contract at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("invalid node id '{0}' (expected [A-Za-z0-9_-]+)")]
    InvalidNodeId(String),
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),
    #[error("node '{from}' connects to unknown node '{to}'")]
    DanglingConnection { from: String, to: String },
}

/// An immutable contract graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    name: String,
    nodes: BTreeMap<String, Node>,
    predecessors: BTreeMap<String, Vec<String>>,
}

impl Contract {
    /// Build a contract from loader records.
    ///
    /// Effect and gate strings that fail to parse are kept on their node and
    /// reported by [`crate::core::invariants::validate_contract`]; only
    /// structural errors are returned here.
    pub fn new(name: impl Into<String>, records: Vec<NodeRecord>) -> Result<Self, ContractError> {
        let mut nodes = BTreeMap::new();
        for record in records {
            if !is_valid_node_id(&record.id) {
                return Err(ContractError::InvalidNodeId(record.id));
            }
            if nodes.contains_key(&record.id) {
                return Err(ContractError::DuplicateNode(record.id));
            }
            nodes.insert(record.id.clone(), Node::from_record(record));
        }

        let mut predecessors: BTreeMap<String, Vec<String>> =
            nodes.keys().map(|id| (id.clone(), Vec::new())).collect();
        for node in nodes.values() {
            for target in &node.connections {
                let incoming =
                    predecessors
                        .get_mut(target)
                        .ok_or_else(|| ContractError::DanglingConnection {
                            from: node.id.clone(),
                            to: target.clone(),
                        })?;
                if !incoming.contains(&node.id) {
                    incoming.push(node.id.clone());
                }
            }
        }

        Ok(Self {
            name: name.into(),
            nodes,
            predecessors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of nodes with an edge into `id`, in id order.
    pub fn predecessors(&self, id: &str) -> &[String] {
        self.predecessors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn records(&self) -> Vec<NodeRecord> {
        self.nodes.values().map(Node::to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::node;

    #[test]
    fn node_id_pattern() {
        assert!(is_valid_node_id("A-1_b"));
        assert!(!is_valid_node_id(""));
        assert!(!is_valid_node_id("a b"));
        assert!(!is_valid_node_id("a.b"));
    }

    #[test]
    fn color_accepts_gray_spelling() {
        assert_eq!("gray".parse::<NodeColor>(), Ok(NodeColor::Grey));
        assert_eq!("Purple".parse::<NodeColor>(), Ok(NodeColor::Purple));
    }

    #[test]
    fn builds_predecessor_index() {
        let contract = Contract::new(
            "c",
            vec![
                node("s", NodeKind::Start, NodeColor::Grey, &["b", "a"]),
                node("a", NodeKind::Normal, NodeColor::Red, &["b"]),
                node("b", NodeKind::End, NodeColor::Red, &[]),
            ],
        )
        .expect("contract");

        assert_eq!(contract.predecessors("b"), ["a".to_string(), "s".to_string()]);
        assert!(contract.predecessors("s").is_empty());
        assert_eq!(contract.len(), 3);
    }

    /// Bad rule strings stay on the node instead of failing the contract.
    #[test]
    fn keeps_parse_errors_per_slot() {
        let mut record = node("a", NodeKind::Normal, NodeColor::Red, &[]);
        record.effect1 = Some("None;+;5;Money".to_string());
        record.effect2 = Some("None;+;x;Money".to_string());
        let contract = Contract::new("c", vec![record]).expect("contract");
        let node = contract.node("a").expect("node");

        assert_eq!(node.effects.len(), 2);
        assert!(node.effects[0].parsed.is_ok());
        assert!(node.effects[1].parsed.is_err());
    }

    #[test]
    fn blank_effect_strings_are_absent() {
        let mut record = node("a", NodeKind::Normal, NodeColor::Red, &[]);
        record.effect1 = Some("   ".to_string());
        let contract = Contract::new("c", vec![record]).expect("contract");
        assert!(contract.node("a").expect("node").effects.is_empty());
    }

    #[test]
    fn rejects_structural_errors() {
        let dup = Contract::new(
            "c",
            vec![
                node("a", NodeKind::Start, NodeColor::Red, &[]),
                node("a", NodeKind::Normal, NodeColor::Red, &[]),
            ],
        );
        assert_eq!(dup, Err(ContractError::DuplicateNode("a".to_string())));

        let dangling = Contract::new("c", vec![node("a", NodeKind::Start, NodeColor::Red, &["z"])]);
        assert_eq!(
            dangling,
            Err(ContractError::DanglingConnection {
                from: "a".to_string(),
                to: "z".to_string()
            })
        );

        let bad_id = Contract::new("c", vec![node("a b", NodeKind::Start, NodeColor::Red, &[])]);
        assert_eq!(bad_id, Err(ContractError::InvalidNodeId("a b".to_string())));
    }

    #[test]
    fn gate_only_applies_to_gate_nodes() {
        let mut normal = node("n", NodeKind::Normal, NodeColor::Red, &[]);
        normal.gate = Some("Node:x;0".to_string());
        let mut gate = node("g", NodeKind::Gate, NodeColor::Grey, &[]);
        gate.gate = Some("Node:n;0".to_string());
        let contract = Contract::new("c", vec![normal, gate]).expect("contract");

        assert!(contract.node("n").expect("n").active_gate().is_none());
        assert!(contract.node("g").expect("g").active_gate().is_some());
    }
}
