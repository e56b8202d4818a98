//! Effect conditions: grammar and evaluation.
//!
//! A condition is written `Type` or `Type:Value`:
//!
//! | Condition                       | Holds when                                            |
//! |---------------------------------|-------------------------------------------------------|
//! | `None`                          | always                                                |
//! | `RunnerType:<type>`             | some non-Empty runner has that type                   |
//! | `RunnerStat:<stat><op><n>`      | the stat summed over non-Empty runners compares to n  |
//! | `NodeColor:<color>`             | another selected node has that color                  |
//! | `NodeColorCombo:<c1,c2,...>`    | the selected nodes' colors cover every listed color   |
//!
//! `PrevDam`, `PrevRisk`, `RiskDamPair` and `ColorForEach` parse into
//! [`Condition::Extension`] and are resolved through [`ConditionExtensions`].
//! Without a resolver they evaluate to [`UnknownConditionKind`].

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::core::error::{EffectParseError, MalformedEffect, UnknownConditionKind};
use crate::graph::{Contract, NodeColor};
use crate::roster::{Roster, RunnerStat, RunnerType};

/// Comparison operator used by `RunnerStat` conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl Comparison {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            ">" => Some(Comparison::Greater),
            "<" => Some(Comparison::Less),
            "=" => Some(Comparison::Equal),
            ">=" => Some(Comparison::GreaterOrEqual),
            "<=" => Some(Comparison::LessOrEqual),
            _ => None,
        }
    }

    pub fn holds(self, left: i64, right: i64) -> bool {
        match self {
            Comparison::Greater => left > right,
            Comparison::Less => left < right,
            Comparison::Equal => left == right,
            Comparison::GreaterOrEqual => left >= right,
            Comparison::LessOrEqual => left <= right,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::Less => "<",
            Comparison::Equal => "=",
            Comparison::GreaterOrEqual => ">=",
            Comparison::LessOrEqual => "<=",
        }
    }
}

/// Condition kinds seen in contract data whose evaluation rule is supplied
/// by the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ExtensionKind {
    PrevDam,
    PrevRisk,
    RiskDamPair,
    ColorForEach,
}

impl ExtensionKind {
    pub const ALL: [ExtensionKind; 4] = [
        ExtensionKind::PrevDam,
        ExtensionKind::PrevRisk,
        ExtensionKind::RiskDamPair,
        ExtensionKind::ColorForEach,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExtensionKind::PrevDam => "PrevDam",
            ExtensionKind::PrevRisk => "PrevRisk",
            ExtensionKind::RiskDamPair => "RiskDamPair",
            ExtensionKind::ColorForEach => "ColorForEach",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
    }
}

/// Parsed effect condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    None,
    RunnerType {
        runner_type: RunnerType,
    },
    RunnerStat {
        stat: RunnerStat,
        comparison: Comparison,
        value: i64,
    },
    NodeColor {
        color: NodeColor,
    },
    NodeColorCombo {
        colors: BTreeSet<NodeColor>,
    },
    Extension {
        kind: ExtensionKind,
        argument: Option<String>,
    },
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::None => f.write_str("None"),
            Condition::RunnerType { runner_type } => write!(f, "RunnerType:{runner_type}"),
            Condition::RunnerStat {
                stat,
                comparison,
                value,
            } => write!(f, "RunnerStat:{stat}{}{value}", comparison.as_str()),
            Condition::NodeColor { color } => write!(f, "NodeColor:{color}"),
            Condition::NodeColorCombo { colors } => {
                let names: Vec<&str> = colors.iter().map(|color| color.as_str()).collect();
                write!(f, "NodeColorCombo:{}", names.join(","))
            }
            Condition::Extension { kind, argument } => match argument {
                Some(argument) => write!(f, "{}:{argument}", kind.as_str()),
                None => f.write_str(kind.as_str()),
            },
        }
    }
}

/// Parse the condition field of an effect string.
pub fn parse_condition(raw: &str) -> Result<Condition, EffectParseError> {
    let raw = raw.trim();
    let (kind, value) = match raw.split_once(':') {
        Some((kind, value)) => (kind.trim(), Some(value.trim())),
        None => (raw, None),
    };
    if kind.is_empty() {
        return Err(MalformedEffect::Condition(raw.to_string()).into());
    }

    if let Some(extension) = ExtensionKind::parse(kind) {
        return Ok(Condition::Extension {
            kind: extension,
            argument: value.filter(|v| !v.is_empty()).map(str::to_string),
        });
    }

    let malformed = || EffectParseError::from(MalformedEffect::Condition(raw.to_string()));

    if kind.eq_ignore_ascii_case("None") {
        return match value {
            None => Ok(Condition::None),
            Some(_) => Err(malformed()),
        };
    }

    let known = ["RunnerType", "RunnerStat", "NodeColor", "NodeColorCombo"];
    if !known.iter().any(|name| name.eq_ignore_ascii_case(kind)) {
        return Err(UnknownConditionKind {
            kind: kind.to_string(),
        }
        .into());
    }

    let value = value.filter(|v| !v.is_empty()).ok_or_else(malformed)?;
    if kind.eq_ignore_ascii_case("RunnerType") {
        let runner_type = value.parse::<RunnerType>().map_err(|_| malformed())?;
        Ok(Condition::RunnerType { runner_type })
    } else if kind.eq_ignore_ascii_case("RunnerStat") {
        parse_runner_stat(value).ok_or_else(malformed)
    } else if kind.eq_ignore_ascii_case("NodeColor") {
        let color = value.parse::<NodeColor>().map_err(|_| malformed())?;
        Ok(Condition::NodeColor { color })
    } else {
        let colors = value
            .split(',')
            .map(|part| part.parse::<NodeColor>())
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|_| malformed())?;
        Ok(Condition::NodeColorCombo { colors })
    }
}

/// Parse `<stat><op><n>`, e.g. `Hacker>=3`.
fn parse_runner_stat(value: &str) -> Option<Condition> {
    let op_start = value.find(['<', '>', '='])?;
    let rest = &value[op_start..];
    let op_len = rest
        .find(|c: char| !matches!(c, '<' | '>' | '='))
        .unwrap_or(rest.len());
    let stat = value[..op_start].parse::<RunnerStat>().ok()?;
    let comparison = Comparison::parse(&rest[..op_len])?;
    let amount = rest[op_len..].trim().parse::<i64>().ok()?;
    Some(Condition::RunnerStat {
        stat,
        comparison,
        value: amount,
    })
}

/// Resolves extension condition kinds.
pub trait ConditionExtensions {
    fn evaluate(
        &self,
        kind: ExtensionKind,
        argument: Option<&str>,
        subject: &str,
        ctx: &EvalContext<'_>,
    ) -> Result<bool, UnknownConditionKind>;
}

/// Resolver that knows no extension kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unresolved;

impl ConditionExtensions for Unresolved {
    fn evaluate(
        &self,
        kind: ExtensionKind,
        _argument: Option<&str>,
        _subject: &str,
        _ctx: &EvalContext<'_>,
    ) -> Result<bool, UnknownConditionKind> {
        Err(UnknownConditionKind {
            kind: kind.as_str().to_string(),
        })
    }
}

/// Read-only snapshot a condition is evaluated against.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub contract: &'a Contract,
    pub roster: &'a Roster,
    /// Effective selection, in id order.
    pub selected: &'a BTreeSet<String>,
    pub extensions: &'a dyn ConditionExtensions,
}

impl<'a> EvalContext<'a> {
    pub fn new(contract: &'a Contract, roster: &'a Roster, selected: &'a BTreeSet<String>) -> Self {
        Self {
            contract,
            roster,
            selected,
            extensions: &Unresolved,
        }
    }

    pub fn with_extensions(mut self, extensions: &'a dyn ConditionExtensions) -> Self {
        self.extensions = extensions;
        self
    }

    fn selected_colors<'s>(&'s self, skip: Option<&'s str>) -> impl Iterator<Item = NodeColor> + 's {
        self.selected
            .iter()
            .filter(move |id| Some(id.as_str()) != skip)
            .filter_map(|id| self.contract.node(id))
            .map(|node| node.color)
    }
}

/// Decide whether `condition` holds for the effect owned by node `subject`.
pub fn evaluate_condition(
    condition: &Condition,
    subject: &str,
    ctx: &EvalContext<'_>,
) -> Result<bool, UnknownConditionKind> {
    let holds = match condition {
        Condition::None => true,
        Condition::RunnerType { runner_type } => ctx.roster.has_type(*runner_type),
        Condition::RunnerStat {
            stat,
            comparison,
            value,
        } => comparison.holds(ctx.roster.stat_total(*stat), *value),
        Condition::NodeColor { color } => ctx
            .selected_colors(Some(subject))
            .any(|selected| selected == *color),
        Condition::NodeColorCombo { colors } => {
            let present: BTreeSet<NodeColor> = ctx.selected_colors(None).collect();
            colors.is_subset(&present)
        }
        Condition::Extension { kind, argument } => {
            return ctx
                .extensions
                .evaluate(*kind, argument.as_deref(), subject, ctx);
        }
    };
    Ok(holds)
}
