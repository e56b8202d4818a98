//! Session storage: the runner roster and the current selection.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::selection::Selection;
use crate::roster::Roster;

/// Player-owned state between recomputations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Session {
    pub roster: Roster,
    pub selection: Selection,
}

/// Load a session, or an empty one if the file does not exist yet.
pub fn load_session(path: &Path) -> Result<Session> {
    if !path.exists() {
        debug!(path = %path.display(), "session missing, starting empty");
        return Ok(Session::default());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read session {}", path.display()))?;
    let session: Session = serde_json::from_str(&contents)
        .with_context(|| format!("parse session {}", path.display()))?;
    debug!(path = %path.display(), selected = session.selection.len(), "session loaded");
    Ok(session)
}

/// Atomically write the session to disk (temp file + rename).
pub fn write_session(path: &Path, session: &Session) -> Result<()> {
    debug!(path = %path.display(), selected = session.selection.len(), "writing session");
    let mut buf = serde_json::to_string_pretty(session).context("serialize session")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RunnerType;
    use crate::test_support::{roster, runner, selection};

    #[test]
    fn session_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("session.json");
        let mut hacker = runner(1, RunnerType::Hacker);
        hacker.hacker = 4;
        let session = Session {
            roster: roster(vec![hacker]),
            selection: selection(&["start", "b", "a"]),
        };

        write_session(&path, &session).expect("write");
        let loaded = load_session(&path).expect("load");
        assert_eq!(loaded, session);
        assert_eq!(loaded.selection.iter().collect::<Vec<_>>(), vec!["start", "b", "a"]);
    }

    #[test]
    fn missing_session_is_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let session = load_session(&temp.path().join("none.json")).expect("load");
        assert!(session.selection.is_empty());
        assert_eq!(session.roster.active().count(), 0);
        assert_eq!(session.roster.runners().len(), 3);
    }

    #[test]
    fn rejects_bad_roster_slots() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("session.json");
        fs::write(
            &path,
            r#"{"roster":[{"slot":7,"type":"Face"}],"selection":[]}"#,
        )
        .expect("write");
        let err = load_session(&path).expect_err("bad slot");
        assert!(format!("{err:#}").contains("runner slot 7 out of range"));
    }
}
