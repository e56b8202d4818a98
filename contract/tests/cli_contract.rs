//! CLI tests for `contract` commands.
//!
//! Spawns the binary and verifies exit codes and persisted sessions for
//! accepted, rejected and invalid inputs.

use std::path::Path;
use std::process::{Command, Output};

use contract::exit_codes;
use contract::graph::{NodeColor, NodeKind};
use contract::io::contract_store::write_contract;
use contract::io::session_store::load_session;
use contract::test_support::{contract, gate_node, node, selection};

fn write_heist(dir: &Path) {
    let mut start = node("start", NodeKind::Start, NodeColor::Grey, &["a"]);
    start.effect1 = Some("None;+;50;Money".to_string());
    let mut a = node("a", NodeKind::Normal, NodeColor::Red, &["gate"]);
    a.effect1 = Some("None;+;5;Damage".to_string());
    a.effect2 = Some("None;+;7;Grit".to_string());
    let graph = contract(vec![
        start,
        a,
        gate_node("gate", "RunnerType:Ninja;1", &["end"]),
        node("end", NodeKind::End, NodeColor::Grey, &[]),
    ]);
    write_contract(&dir.join("heist.json"), &graph).expect("write contract");
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_contract"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run contract")
}

#[test]
fn select_then_preview_reports_pools() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_heist(temp.path());

    for id in ["start", "a"] {
        let out = run(temp.path(), &["select", "heist.json", id]);
        assert_eq!(out.status.code(), Some(exit_codes::OK), "select {id}");
    }
    let session = load_session(&temp.path().join("session.json")).expect("load session");
    assert_eq!(session.selection, selection(&["start", "a"]));

    let out = run(temp.path(), &["preview", "heist.json"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("pool: Money raw=50 final=50"), "{stdout}");
    assert!(stdout.contains("pool: Damage raw=5 final=2"), "{stdout}");
    assert!(stdout.contains("node: gate unavailable"), "{stdout}");
}

#[test]
fn select_locked_node_exits_with_rejected_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_heist(temp.path());

    let out = run(temp.path(), &["select", "heist.json", "a"]);
    assert_eq!(out.status.code(), Some(exit_codes::REJECTED));
    assert!(!temp.path().join("session.json").exists());
}

#[test]
fn roster_change_unlocks_gate() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_heist(temp.path());
    for id in ["start", "a"] {
        run(temp.path(), &["select", "heist.json", id]);
    }

    let out = run(temp.path(), &["select", "heist.json", "gate"]);
    assert_eq!(out.status.code(), Some(exit_codes::REJECTED));

    let out = run(
        temp.path(),
        &["roster", "heist.json", "--slot", "2", "--type", "Ninja", "--ninja", "3"],
    );
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    let out = run(temp.path(), &["select", "heist.json", "gate"]);
    assert_eq!(out.status.code(), Some(exit_codes::OK));
}

#[test]
fn validate_flags_broken_contract() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        temp.path().join("broken.json"),
        r#"{"nodes":[{"id":"start","kind":"Start","effect1":"None;+;five;Money"}]}"#,
    )
    .expect("write");

    let out = run(temp.path(), &["validate", "broken.json"]);
    assert_eq!(out.status.code(), Some(exit_codes::INVALID));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("amount 'five' is not an integer"), "{stdout}");
}

#[test]
fn parse_effect_prints_json_when_asked() {
    let temp = tempfile::tempdir().expect("tempdir");

    let out = run(
        temp.path(),
        &["parse-effect", "RunnerStat:Muscle>=3;*;2;Damage", "--format", "json"],
    );
    assert_eq!(out.status.code(), Some(exit_codes::OK));
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("json output");
    assert_eq!(value["status"], "valid");

    let out = run(temp.path(), &["parse-gate", "Node:a;-1"]);
    assert_eq!(out.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn missing_contract_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let out = run(temp.path(), &["preview", "nope.json"]);
    assert_eq!(out.status.code(), Some(exit_codes::INVALID));
}
