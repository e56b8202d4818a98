//! Contract evaluation engine.
//!
//! A contract is a directed graph of perk nodes. The player selects nodes,
//! subject to edges, gate rules and the runner roster; selected nodes feed
//! five resource pools through their effects, and Grit/Veil then prevent
//! Damage/Risk. The crate is split the same way the work is:
//!
//! - **[`core`]**: Pure, deterministic logic (parsing, condition and gate
//!   evaluation, availability, pool aggregation, prevention). No I/O, and every
//!   result is recomputed from its inputs.
//! - **[`io`]**: Side-effecting adapters (config, contract and session files).
//!
//! Orchestration modules ([`preview`], [`select`], [`validate`]) coordinate
//! core logic with I/O to implement CLI commands.

pub mod core;
pub mod exit_codes;
pub mod graph;
pub mod io;
pub mod logging;
pub mod preview;
pub mod roster;
pub mod select;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
