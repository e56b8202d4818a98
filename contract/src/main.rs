//! Contract evaluation engine CLI.
//!
//! Loads a contract graph and a session (roster + selection), applies one
//! command, and prints the recomputed state. Every command recomputes from
//! scratch; nothing but the session file is persisted.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use contract::exit_codes;
use contract::io::config::{DEFAULT_CONFIG_FILE, EngineConfig, OutputFormat, load_config};
use contract::logging;
use contract::preview::{preview_from_files, render_text};
use contract::roster::{Runner, RunnerType};
use contract::select::{Transition, TransitionOutcome, apply_transition};
use contract::validate::{RuleCheck, check_effect, check_gate, render_report, validate_file};

const DEFAULT_SESSION_FILE: &str = "session.json";

#[derive(Parser)]
#[command(
    name = "contract",
    version,
    about = "Evaluate contract perk graphs: availability, pools and prevention"
)]
struct Cli {
    /// Engine config (TOML). Missing file means default rules.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Session file holding the roster and selection.
    #[arg(long, global = true, default_value = DEFAULT_SESSION_FILE)]
    session: PathBuf,
    /// Override the configured output format.
    #[arg(long, global = true, value_parser = parse_format)]
    format: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a contract file for malformed rules and unreachable nodes.
    Validate { contract: PathBuf },
    /// Print availability, pools, prevention and the effect trace.
    Preview { contract: PathBuf },
    /// Select an available node and persist the session.
    Select { contract: PathBuf, node: String },
    /// Deselect a node, demoting anything that depended on it.
    Deselect { contract: PathBuf, node: String },
    /// Replace the runner in one roster slot.
    Roster {
        contract: PathBuf,
        #[arg(long)]
        slot: usize,
        #[arg(long = "type", value_parser = parse_runner_type)]
        kind: RunnerType,
        #[arg(long, default_value_t = 0)]
        face: u32,
        #[arg(long, default_value_t = 0)]
        muscle: u32,
        #[arg(long, default_value_t = 0)]
        hacker: u32,
        #[arg(long, default_value_t = 0)]
        ninja: u32,
    },
    /// Parse one effect string and print its canonical form.
    ParseEffect { raw: String },
    /// Parse one gate string and print its canonical form.
    ParseGate { raw: String },
}

fn parse_runner_type(raw: &str) -> Result<RunnerType, String> {
    raw.parse().map_err(|()| {
        let names: Vec<&str> = RunnerType::ALL.iter().map(|kind| kind.as_str()).collect();
        format!("unknown runner type '{raw}' (expected one of {})", names.join(", "))
    })
}

fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    match raw.to_ascii_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("unknown format '{raw}' (expected text or json)")),
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config).context("load config")?;
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    match cli.command {
        Command::Validate { contract } => cmd_validate(&contract, &config),
        Command::Preview { contract } => cmd_preview(&contract, &cli.session, &config),
        Command::Select { contract, node } => {
            cmd_transition(&contract, &cli.session, Transition::Select(node))
        }
        Command::Deselect { contract, node } => {
            cmd_transition(&contract, &cli.session, Transition::Deselect(node))
        }
        Command::Roster {
            contract,
            slot,
            kind,
            face,
            muscle,
            hacker,
            ninja,
        } => {
            let runner = Runner {
                slot,
                kind,
                face,
                muscle,
                hacker,
                ninja,
            };
            cmd_transition(&contract, &cli.session, Transition::SetRunner(runner))
        }
        Command::ParseEffect { raw } => cmd_check(check_effect(&raw), &config),
        Command::ParseGate { raw } => cmd_check(check_gate(&raw), &config),
    }
}

fn cmd_validate(path: &Path, config: &EngineConfig) -> Result<i32> {
    let report = validate_file(path)?;
    match config.output.format {
        OutputFormat::Text => print!("{}", render_report(&report)),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(if report.is_ok() {
        exit_codes::OK
    } else {
        exit_codes::INVALID
    })
}

fn cmd_preview(contract: &Path, session: &Path, config: &EngineConfig) -> Result<i32> {
    let preview = preview_from_files(contract, session, config)?;
    match config.output.format {
        OutputFormat::Text => print!("{}", render_text(&preview)),
        OutputFormat::Json => print_json(&preview)?,
    }
    Ok(exit_codes::OK)
}

fn cmd_transition(contract: &Path, session: &Path, transition: Transition) -> Result<i32> {
    let target = match &transition {
        Transition::Select(id) | Transition::Deselect(id) => id.clone(),
        Transition::SetRunner(runner) => format!("slot {}", runner.slot),
    };
    match apply_transition(contract, session, transition)? {
        TransitionOutcome::Applied { demoted } => {
            println!("ok: {target}");
            if !demoted.is_empty() {
                println!("demoted: {}", demoted.join(","));
            }
            Ok(exit_codes::OK)
        }
        TransitionOutcome::Rejected(err) => {
            eprintln!("rejected: {err}");
            Ok(exit_codes::REJECTED)
        }
    }
}

fn cmd_check<T, E>(check: RuleCheck<T, E>, config: &EngineConfig) -> Result<i32>
where
    T: Serialize,
    E: Serialize,
{
    if config.output.format == OutputFormat::Json {
        print_json(&check)?;
    } else {
        match &check {
            RuleCheck::Valid { canonical, .. } => println!("{canonical}"),
            RuleCheck::Invalid {
                message, fragment, ..
            } => println!("error: {message} (at '{fragment}')"),
        }
    }
    Ok(if check.is_valid() {
        exit_codes::OK
    } else {
        exit_codes::INVALID
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json output")?;
    println!("{payload}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_preview_with_defaults() {
        let cli = Cli::parse_from(["contract", "preview", "heist.json"]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(cli.session, PathBuf::from(DEFAULT_SESSION_FILE));
        assert!(cli.format.is_none());
        assert!(matches!(cli.command, Command::Preview { .. }));
    }

    #[test]
    fn parse_select_with_global_options() {
        let cli = Cli::parse_from([
            "contract",
            "select",
            "heist.json",
            "start",
            "--session",
            "run.json",
            "--format",
            "json",
        ]);
        assert_eq!(cli.session, PathBuf::from("run.json"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Command::Select { node, .. } => assert_eq!(node, "start"),
            _ => panic!("expected select"),
        }
    }

    #[test]
    fn parse_roster_runner() {
        let cli = Cli::parse_from([
            "contract", "roster", "heist.json", "--slot", "1", "--type", "ninja", "--ninja", "4",
        ]);
        match cli.command {
            Command::Roster {
                slot, kind, ninja, face, ..
            } => {
                assert_eq!(slot, 1);
                assert_eq!(kind, RunnerType::Ninja);
                assert_eq!(ninja, 4);
                assert_eq!(face, 0);
            }
            _ => panic!("expected roster"),
        }
    }

    #[test]
    fn rejects_unknown_runner_type() {
        let result = Cli::try_parse_from([
            "contract", "roster", "heist.json", "--slot", "0", "--type", "bard",
        ]);
        assert!(result.is_err());
    }
}
