//! Stable exit codes for `contract` CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid input: unreadable files, bad config, contract errors, bad rule strings.
pub const INVALID: i32 = 1;
/// `contract select`/`deselect` refused the transition (node not available / not selected).
pub const REJECTED: i32 = 2;
