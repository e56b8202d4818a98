//! Selection and roster changes for `contract select`, `deselect` and `roster`.
//!
//! Each command loads the contract and session, applies one transition, and
//! persists the session only if the transition was accepted.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::core::availability::{
    SelectionUpdate, TransitionError, deselect_node, prune_selection, select_node,
};
use crate::io::contract_store::load_contract;
use crate::io::session_store::{load_session, write_session};
use crate::roster::Runner;

/// Requested change to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Select(String),
    Deselect(String),
    /// Replace the runner in its slot.
    SetRunner(Runner),
}

/// Structured transition outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Session updated. `demoted` lists nodes dropped by cascading demotion.
    Applied { demoted: Vec<String> },
    /// Transition refused; the session was left untouched.
    Rejected(TransitionError),
}

/// Apply `transition` to the session stored at `session_path`.
pub fn apply_transition(
    contract_path: &Path,
    session_path: &Path,
    transition: Transition,
) -> Result<TransitionOutcome> {
    let contract = load_contract(contract_path).context("load contract for transition")?;
    let mut session = load_session(session_path).context("load session for transition")?;
    debug!(?transition, "applying transition");

    let result: Result<SelectionUpdate, TransitionError> = match &transition {
        Transition::Select(id) => select_node(&contract, &session.selection, &session.roster, id),
        Transition::Deselect(id) => {
            deselect_node(&contract, &session.selection, &session.roster, id)
        }
        Transition::SetRunner(runner) => {
            session
                .roster
                .set(runner.clone())
                .context("update roster")?;
            Ok(prune_selection(&contract, &session.selection, &session.roster))
        }
    };

    let update = match result {
        Ok(update) => update,
        Err(err) => {
            info!(%err, "transition rejected");
            return Ok(TransitionOutcome::Rejected(err));
        }
    };

    if !update.demoted.is_empty() {
        info!(demoted = ?update.demoted, "cascading demotion");
    }
    session.selection = update.selection;
    write_session(session_path, &session).context("persist session")?;
    Ok(TransitionOutcome::Applied {
        demoted: update.demoted,
    })
}
