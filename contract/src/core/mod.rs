//! Deterministic, pure engine logic.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! contracts, rosters and selections and return values suitable for tests.

pub mod availability;
pub mod condition;
pub mod effect;
pub mod error;
pub mod gate;
pub mod invariants;
pub mod pools;
pub mod prevention;
pub mod selection;
pub mod types;
