//! Validation for `contract validate` and the editor parse helpers.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::core::effect::{Effect, parse_effect};
use crate::core::error::{EffectParseError, InvalidGateCondition};
use crate::core::gate::{GateRule, parse_gate};
use crate::core::invariants::{ContractReport, validate_contract};
use crate::io::contract_store::load_contract;

/// Load a contract file and run semantic validation.
pub fn validate_file(path: &Path) -> Result<ContractReport> {
    let contract = load_contract(path).context("load contract for validation")?;
    let report = validate_contract(&contract);
    debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "contract validated"
    );
    Ok(report)
}

pub fn render_report(report: &ContractReport) -> String {
    let mut out = String::new();
    for error in &report.errors {
        let _ = writeln!(out, "error: {error}");
    }
    for warning in &report.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    let _ = writeln!(
        out,
        "validate: errors={} warnings={}",
        report.errors.len(),
        report.warnings.len()
    );
    out
}

/// Result of checking one rule string typed into an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuleCheck<T, E> {
    Valid { parsed: T, canonical: String },
    Invalid { message: String, fragment: String, error: E },
}

impl<T, E> RuleCheck<T, E> {
    pub fn is_valid(&self) -> bool {
        matches!(self, RuleCheck::Valid { .. })
    }
}

pub fn check_effect(raw: &str) -> RuleCheck<Effect, EffectParseError> {
    match parse_effect(raw) {
        Ok(effect) => RuleCheck::Valid {
            canonical: effect.to_string(),
            parsed: effect,
        },
        Err(error) => {
            let fragment = match &error {
                EffectParseError::Malformed(inner) => inner.fragment().to_string(),
                EffectParseError::UnknownConditionKind(inner) => inner.kind.clone(),
            };
            RuleCheck::Invalid {
                message: error.to_string(),
                fragment,
                error,
            }
        }
    }
}

pub fn check_gate(raw: &str) -> RuleCheck<GateRule, InvalidGateCondition> {
    match parse_gate(raw) {
        Ok(rule) => RuleCheck::Valid {
            canonical: rule.to_string(),
            parsed: rule,
        },
        Err(error) => RuleCheck::Invalid {
            message: error.to_string(),
            fragment: error.fragment().to_string(),
            error,
        },
    }
}
