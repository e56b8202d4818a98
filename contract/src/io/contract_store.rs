//! Contract file load/save.
//!
//! Contract files hold the node records produced by the external loader:
//! `{ "name": "...", "nodes": [ { "id": ..., "kind": ..., ... } ] }`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::{Contract, NodeRecord};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractFile {
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<NodeRecord>,
}

/// Load a contract file and build the graph.
///
/// Structural errors fail the load. Effect and gate parse errors are kept on
/// their nodes and surface through validation and pool traces.
pub fn load_contract(path: &Path) -> Result<Contract> {
    debug!(path = %path.display(), "loading contract");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read contract {}", path.display()))?;
    let file: ContractFile = serde_json::from_str(&contents)
        .with_context(|| format!("parse contract {}", path.display()))?;
    let name = if file.name.is_empty() {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        file.name
    };
    let contract = Contract::new(name, file.nodes)
        .with_context(|| format!("build contract {}", path.display()))?;
    if contract.is_empty() {
        warn!(path = %path.display(), "contract has no nodes");
    }
    debug!(name = contract.name(), nodes = contract.len(), "contract loaded");
    Ok(contract)
}

/// Write a contract back out with nodes in id order.
pub fn write_contract(path: &Path, contract: &Contract) -> Result<()> {
    let file = ContractFile {
        name: contract.name().to_string(),
        nodes: contract.records(),
    };
    let mut buf = serde_json::to_string_pretty(&file).context("serialize contract")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
