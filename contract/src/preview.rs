//! Full recomputation for `contract preview`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::core::availability::{effective_selection, recompute_availability};
use crate::core::condition::Unresolved;
use crate::core::pools::{PoolOptions, recompute_pools_with};
use crate::core::types::{Availability, EffectOutcome, PoolReport, Stat};
use crate::graph::Contract;
use crate::io::config::EngineConfig;
use crate::io::contract_store::load_contract;
use crate::io::session_store::{Session, load_session};

/// Everything a renderer needs after one recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub contract: String,
    /// Effective selection in id order.
    pub selected: Vec<String>,
    pub availability: Availability,
    #[serde(flatten)]
    pub report: PoolReport,
}

/// Recompute availability and pools for an in-memory contract and session.
pub fn preview(contract: &Contract, session: &Session, config: &EngineConfig) -> Preview {
    let options = PoolOptions {
        ratios: config.prevention,
        extensions: &Unresolved,
    };
    let availability = recompute_availability(contract, &session.selection, &session.roster);
    let report = recompute_pools_with(contract, &session.selection, &session.roster, &options);
    let selected: Vec<String> =
        effective_selection(contract, &session.selection, &session.roster)
            .into_iter()
            .collect();
    debug!(
        contract = contract.name(),
        selected = selected.len(),
        trace = report.trace.len(),
        "recomputed preview"
    );
    Preview {
        contract: contract.name().to_string(),
        selected,
        availability,
        report,
    }
}

/// Load contract and session from disk, then recompute.
pub fn preview_from_files(
    contract_path: &Path,
    session_path: &Path,
    config: &EngineConfig,
) -> Result<Preview> {
    let contract = load_contract(contract_path).context("load contract for preview")?;
    let session = load_session(session_path).context("load session for preview")?;
    let preview = preview(&contract, &session, config);
    let failed = preview
        .report
        .trace
        .iter()
        .filter(|entry| matches!(entry.outcome, EffectOutcome::Failed { .. }))
        .count();
    if failed > 0 {
        info!(failed, "some effects failed and were skipped");
    }
    Ok(preview)
}

/// Human-readable rendering, one `key: value` fact per line.
pub fn render_text(preview: &Preview) -> String {
    let mut out = String::new();
    let report = &preview.report;
    let _ = writeln!(out, "contract: {}", preview.contract);
    let _ = writeln!(out, "selected: {}", preview.selected.join(","));
    for (id, state) in &preview.availability {
        let _ = writeln!(out, "node: {id} {state}");
    }
    for stat in Stat::ALL {
        let _ = writeln!(
            out,
            "pool: {} raw={} final={}",
            stat,
            report.raw.get(stat),
            report.pools.get(stat)
        );
    }
    let prevention = &report.prevention;
    let _ = writeln!(
        out,
        "prevention: damage={} grit_consumed={} grit_remaining={}",
        prevention.damage_prevented, prevention.grit_consumed, prevention.grit_remaining
    );
    let _ = writeln!(
        out,
        "prevention: risk={} veil_consumed={} veil_remaining={}",
        prevention.risk_prevented, prevention.veil_consumed, prevention.veil_remaining
    );
    for entry in &report.trace {
        let outcome = match &entry.outcome {
            EffectOutcome::Applied {
                stat,
                before,
                after,
            } => format!("applied {stat} {before}->{after}"),
            EffectOutcome::ConditionNotMet => "condition-not-met".to_string(),
            EffectOutcome::Failed { error } => format!("error {error}"),
        };
        let _ = writeln!(
            out,
            "trace: {} effect{} '{}' {}",
            entry.node_id, entry.slot, entry.raw, outcome
        );
    }
    out
}
