//! Engine error taxonomy.
//!
//! Parse errors block only the effect or gate they came from. Evaluation
//! errors are caught per effect by the pool pass and recorded in its trace.

use serde::Serialize;
use thiserror::Error;

/// A bad effect string (`Condition;Operator;Amount;Stat`).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "fragment", rename_all = "snake_case")]
pub enum MalformedEffect {
    #[error("expected 4 ';'-separated fields but found {found} in '{raw}'")]
    FieldCount { raw: String, found: usize },
    #[error("unknown operator '{0}' (expected one of + - * /)")]
    Operator(String),
    #[error("amount '{0}' is not an integer")]
    Amount(String),
    #[error("unknown stat '{0}' (expected Damage, Risk, Money, Grit or Veil)")]
    Stat(String),
    #[error("malformed condition '{0}'")]
    Condition(String),
}

impl MalformedEffect {
    /// The offending part of the effect string.
    pub fn fragment(&self) -> &str {
        match self {
            MalformedEffect::FieldCount { raw, .. } => raw,
            MalformedEffect::Operator(fragment)
            | MalformedEffect::Amount(fragment)
            | MalformedEffect::Stat(fragment)
            | MalformedEffect::Condition(fragment) => fragment,
        }
    }
}

/// A bad gate string (`Kind:Params;Threshold`).
///
/// Every variant carries the exact fragment that failed so editor-side
/// validation can highlight it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "fragment", rename_all = "snake_case")]
pub enum InvalidGateCondition {
    #[error("expected 'Kind:Params;Threshold' but got '{0}'")]
    FieldCount(String),
    #[error("missing ':' between kind and parameters in '{0}'")]
    MissingKind(String),
    #[error("unknown gate kind '{0}' (expected Node, RunnerType or RunnerStat)")]
    UnknownKind(String),
    #[error("empty parameter list in '{0}'")]
    EmptyParameters(String),
    #[error("threshold '{0}' is not an integer")]
    Threshold(String),
    #[error("threshold '{0}' must not be negative")]
    NegativeThreshold(String),
    #[error("unknown runner type '{0}'")]
    UnknownRunnerType(String),
    #[error("unknown runner stat '{0}'")]
    UnknownStat(String),
    #[error("invalid node id '{0}' (expected [A-Za-z0-9_-]+)")]
    InvalidNodeId(String),
    #[error("node id '{0}' is listed more than once")]
    DuplicateNodeId(String),
}

impl InvalidGateCondition {
    /// The offending part of the gate string.
    pub fn fragment(&self) -> &str {
        match self {
            InvalidGateCondition::FieldCount(fragment)
            | InvalidGateCondition::MissingKind(fragment)
            | InvalidGateCondition::UnknownKind(fragment)
            | InvalidGateCondition::EmptyParameters(fragment)
            | InvalidGateCondition::Threshold(fragment)
            | InvalidGateCondition::NegativeThreshold(fragment)
            | InvalidGateCondition::UnknownRunnerType(fragment)
            | InvalidGateCondition::UnknownStat(fragment)
            | InvalidGateCondition::InvalidNodeId(fragment)
            | InvalidGateCondition::DuplicateNodeId(fragment) => fragment,
        }
    }
}

/// A condition kind the evaluator cannot resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("unknown condition kind '{kind}'")]
pub struct UnknownConditionKind {
    pub kind: String,
}

/// Failure while applying a parsed effect to a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
}

/// Any per-effect failure, as recorded in a pool trace.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", content = "detail", rename_all = "snake_case")]
pub enum EngineError {
    #[error("malformed effect: {0}")]
    MalformedEffect(#[from] MalformedEffect),
    #[error("invalid gate condition: {0}")]
    InvalidGateCondition(#[from] InvalidGateCondition),
    #[error(transparent)]
    UnknownConditionKind(#[from] UnknownConditionKind),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Failure to parse an effect string: either its syntax or its condition kind.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(untagged)]
pub enum EffectParseError {
    #[error(transparent)]
    Malformed(#[from] MalformedEffect),
    #[error(transparent)]
    UnknownConditionKind(#[from] UnknownConditionKind),
}

impl From<EffectParseError> for EngineError {
    fn from(err: EffectParseError) -> Self {
        match err {
            EffectParseError::Malformed(inner) => EngineError::MalformedEffect(inner),
            EffectParseError::UnknownConditionKind(inner) => {
                EngineError::UnknownConditionKind(inner)
            }
        }
    }
}
