//! Gate rules: `Kind:Params;Threshold`.
//!
//! - `Node:<id1,id2,...>;T`: with `T = 0` every listed node must be selected;
//!   with `T > 0` at least `T` of them must be.
//! - `RunnerType:<type1,...>;T`: at least `T` non-Empty runners have a listed type.
//! - `RunnerStat:<stat1,...>;T`: the listed stats summed over non-Empty
//!   runners reach `T`.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::core::error::InvalidGateCondition;
use crate::graph::is_valid_node_id;
use crate::roster::{Roster, RunnerStat, RunnerType};

/// Gate parameters, one variant per gate kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "params")]
pub enum GateParams {
    Node(BTreeSet<String>),
    RunnerType(BTreeSet<RunnerType>),
    RunnerStat(BTreeSet<RunnerStat>),
}

/// Parsed gate rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateRule {
    #[serde(flatten)]
    pub params: GateParams,
    pub threshold: u32,
}

impl fmt::Display for GateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, params): (&str, Vec<&str>) = match &self.params {
            GateParams::Node(ids) => ("Node", ids.iter().map(String::as_str).collect()),
            GateParams::RunnerType(types) => {
                ("RunnerType", types.iter().map(|t| t.as_str()).collect())
            }
            GateParams::RunnerStat(stats) => {
                ("RunnerStat", stats.iter().map(|s| s.as_str()).collect())
            }
        };
        write!(f, "{kind}:{};{}", params.join(","), self.threshold)
    }
}

/// Parse a gate string.
pub fn parse_gate(raw: &str) -> Result<GateRule, InvalidGateCondition> {
    let raw = raw.trim();
    let fields: Vec<&str> = raw.split(';').collect();
    if fields.len() != 2 {
        return Err(InvalidGateCondition::FieldCount(raw.to_string()));
    }
    let head = fields[0].trim();
    let threshold = parse_threshold(fields[1].trim())?;

    let (kind, params) = head
        .split_once(':')
        .ok_or_else(|| InvalidGateCondition::MissingKind(head.to_string()))?;
    let kind = kind.trim();
    if kind.is_empty() {
        return Err(InvalidGateCondition::MissingKind(head.to_string()));
    }
    let params = params.trim();
    if params.is_empty() {
        return Err(InvalidGateCondition::EmptyParameters(head.to_string()));
    }
    let items: Vec<&str> = params.split(',').map(str::trim).collect();

    let params = if kind.eq_ignore_ascii_case("Node") {
        let mut ids = BTreeSet::new();
        for id in items {
            if !is_valid_node_id(id) {
                return Err(InvalidGateCondition::InvalidNodeId(id.to_string()));
            }
            // Duplicates would change what `T = 0` and at-least-T count.
            if !ids.insert(id.to_string()) {
                return Err(InvalidGateCondition::DuplicateNodeId(id.to_string()));
            }
        }
        GateParams::Node(ids)
    } else if kind.eq_ignore_ascii_case("RunnerType") {
        let types = items
            .into_iter()
            .map(|name| {
                name.parse::<RunnerType>()
                    .map_err(|_| InvalidGateCondition::UnknownRunnerType(name.to_string()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        GateParams::RunnerType(types)
    } else if kind.eq_ignore_ascii_case("RunnerStat") {
        let stats = items
            .into_iter()
            .map(|name| {
                name.parse::<RunnerStat>()
                    .map_err(|_| InvalidGateCondition::UnknownStat(name.to_string()))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        GateParams::RunnerStat(stats)
    } else {
        return Err(InvalidGateCondition::UnknownKind(kind.to_string()));
    };

    Ok(GateRule { params, threshold })
}

fn parse_threshold(raw: &str) -> Result<u32, InvalidGateCondition> {
    let value = raw
        .parse::<i64>()
        .map_err(|_| InvalidGateCondition::Threshold(raw.to_string()))?;
    if value < 0 {
        return Err(InvalidGateCondition::NegativeThreshold(raw.to_string()));
    }
    u32::try_from(value).map_err(|_| InvalidGateCondition::Threshold(raw.to_string()))
}

/// Decide whether `rule` holds for the given roster and selected node ids.
pub fn evaluate_gate(rule: &GateRule, roster: &Roster, selected: &BTreeSet<String>) -> bool {
    let threshold = u64::from(rule.threshold);
    match &rule.params {
        GateParams::Node(ids) => {
            let hits = ids.iter().filter(|id| selected.contains(*id)).count();
            if threshold == 0 {
                hits == ids.len()
            } else {
                hits as u64 >= threshold
            }
        }
        GateParams::RunnerType(types) => {
            let hits = roster
                .active()
                .filter(|runner| types.contains(&runner.kind))
                .count();
            hits as u64 >= threshold
        }
        GateParams::RunnerStat(stats) => {
            let total: i64 = stats.iter().map(|stat| roster.stat_total(*stat)).sum();
            total >= i64::from(rule.threshold)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{roster, runner};

    fn selected(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn parses_node_gate() {
        let rule = parse_gate("Node:A,B;0").expect("parse");
        assert_eq!(
            rule,
            GateRule {
                params: GateParams::Node(selected(&["A", "B"])),
                threshold: 0,
            }
        );
        assert_eq!(rule.to_string(), "Node:A,B;0");
    }

    #[test]
    fn parses_runner_gates_case_insensitively() {
        let rule = parse_gate("runnertype:hacker, Muscle;1").expect("parse");
        assert_eq!(
            rule.params,
            GateParams::RunnerType([RunnerType::Hacker, RunnerType::Muscle].into_iter().collect())
        );
        let rule = parse_gate("RunnerStat:Face,Ninja;6").expect("parse");
        assert_eq!(rule.threshold, 6);
    }

    /// Each failure names the exact fragment that broke.
    #[test]
    fn parse_errors_carry_the_offending_fragment() {
        let cases = [
            ("Node:A", InvalidGateCondition::FieldCount("Node:A".to_string())),
            ("Node:A;1;2", InvalidGateCondition::FieldCount("Node:A;1;2".to_string())),
            ("A,B;1", InvalidGateCondition::MissingKind("A,B".to_string())),
            (":A;1", InvalidGateCondition::MissingKind(":A".to_string())),
            ("  :A ;1", InvalidGateCondition::MissingKind(":A".to_string())),
            ("Color:Red;1", InvalidGateCondition::UnknownKind("Color".to_string())),
            ("Node:;1", InvalidGateCondition::EmptyParameters("Node:".to_string())),
            ("Node:A;one", InvalidGateCondition::Threshold("one".to_string())),
            ("Node:A;-1", InvalidGateCondition::NegativeThreshold("-1".to_string())),
            (
                "RunnerType:Hacker,Wizard;1",
                InvalidGateCondition::UnknownRunnerType("Wizard".to_string()),
            ),
            ("RunnerStat:Luck;3", InvalidGateCondition::UnknownStat("Luck".to_string())),
            ("Node:A,b c;1", InvalidGateCondition::InvalidNodeId("b c".to_string())),
            ("Node:A,,B;1", InvalidGateCondition::InvalidNodeId(String::new())),
            ("Node:A, A;2", InvalidGateCondition::DuplicateNodeId("A".to_string())),
        ];
        for (raw, expected) in cases {
            assert_eq!(parse_gate(raw), Err(expected), "gate {raw:?}");
        }
    }

    #[test]
    fn node_gate_zero_threshold_requires_all() {
        let rule = parse_gate("Node:A,B;0").expect("parse");
        let roster = Roster::default();
        assert!(!evaluate_gate(&rule, &roster, &selected(&["A"])));
        assert!(evaluate_gate(&rule, &roster, &selected(&["A", "B"])));
    }

    #[test]
    fn node_gate_positive_threshold_is_at_least() {
        let rule = parse_gate("Node:A,B;1").expect("parse");
        let roster = Roster::default();
        assert!(!evaluate_gate(&rule, &roster, &selected(&[])));
        assert!(evaluate_gate(&rule, &roster, &selected(&["B"])));
        assert!(evaluate_gate(&rule, &roster, &selected(&["A", "B", "C"])));
    }

    #[test]
    fn runner_type_gate_counts_non_empty_matches() {
        let roster = roster(vec![
            runner(0, RunnerType::Hacker),
            runner(1, RunnerType::Empty),
        ]);
        let one = parse_gate("RunnerType:Hacker,Muscle;1").expect("parse");
        let two = parse_gate("RunnerType:Hacker,Muscle;2").expect("parse");
        let zero = parse_gate("RunnerType:Ninja;0").expect("parse");

        assert!(evaluate_gate(&one, &roster, &selected(&[])));
        assert!(!evaluate_gate(&two, &roster, &selected(&[])));
        assert!(evaluate_gate(&zero, &roster, &selected(&[])));
    }

    #[test]
    fn runner_stat_gate_sums_listed_stats() {
        let mut face = runner(0, RunnerType::Face);
        face.face = 3;
        face.ninja = 1;
        let mut ghost = runner(1, RunnerType::Empty);
        ghost.face = 50;
        let roster = roster(vec![face, ghost]);

        let met = parse_gate("RunnerStat:Face,Ninja;4").expect("parse");
        let unmet = parse_gate("RunnerStat:Face;4").expect("parse");
        assert!(evaluate_gate(&met, &roster, &selected(&[])));
        assert!(!evaluate_gate(&unmet, &roster, &selected(&[])));
    }
}
