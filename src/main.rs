use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::info;

use league_toolkit::config::ToolkitConfig;
use league_toolkit::diagnostics::{DiagnosticsEngine, ParamKind};
use league_toolkit::league::{League, LeagueManager};
use league_toolkit::logging;
use league_toolkit::results::ResultsLedger;
use league_toolkit::scheduler::{FixtureScheduler, RoundRobinMode, ScheduleOptions};

const DEFAULT_START: &str = "2024-12-01";

const DEMO_TEAMS: &[(&str, &str)] = &[
    ("Harbour City", "Dockside Park"),
    ("Northgate Rovers", "The Mill"),
    ("Eastfield Albion", "Eastfield Road"),
    ("Westbrook Town", "Riverside Ground"),
];

const DEMO_VALIDATOR: &str = "\
def validate_team(name, stadium):
    if not name.strip():
        return False
    elif len(name) > 255:
        raise ValueError(\"name too long\")
    if not stadium:
        return False
    return True
";

const USAGE: &str = "usage:
  league_toolkit demo [--double] [--start YYYY-MM-DD]
  league_toolkit schedule --teams A,B,C [--start YYYY-MM-DD] [--double]
  league_toolkit paths --file PATH --function NAME";

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init();

    let config = ToolkitConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first() else {
        println!("{USAGE}");
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "demo" => run_demo(&config, rest),
        "schedule" => run_schedule(&config, rest),
        "paths" => run_paths(&config, rest),
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(())
        }
        other => bail!("unknown command '{other}'\n{USAGE}"),
    }
}

fn run_demo(config: &ToolkitConfig, args: &[String]) -> Result<()> {
    let options = schedule_options(config, args);
    let start = arg_value(args, "start").unwrap_or_else(|| DEFAULT_START.to_string());

    let mut manager = LeagueManager::new();
    manager.create_league("Demo League", "2024/25")?;
    for (name, stadium) in DEMO_TEAMS {
        manager.add_team(name, stadium)?;
    }
    manager.validate_for_scheduling()?;
    let league = manager.into_league().context("league missing after validation")?;

    let mut scheduler = FixtureScheduler::with_options(&league, options);
    scheduler.generate_fixtures(&start)?;
    let validation = scheduler.validate_fixtures();
    if !validation.is_valid() {
        bail!("generated calendar failed validation: {:?}", validation.errors);
    }

    // Play the first half of the calendar with seeded scores.
    let mut ledger = ResultsLedger::new(scheduler.into_fixtures());
    let mut rng = StdRng::seed_from_u64(config.diagnostics.testgen_seed);
    let to_play: Vec<u32> = ledger
        .fixtures()
        .iter()
        .take(ledger.fixtures().len() / 2)
        .map(|f| f.match_id)
        .collect();
    for match_id in to_play {
        ledger.record_result(match_id, rng.gen_range(0..4), rng.gen_range(0..3))?;
    }

    let engine = DiagnosticsEngine::new(config.diagnostics.clone());
    let snapshot = ledger.snapshot(league.teams());
    let report = engine.run_all(&snapshot, false);
    let paths = engine.extract_symbolic_paths(DEMO_VALIDATOR, "validate_team", false)?;
    let params = BTreeMap::from([
        ("name".to_string(), ParamKind::String),
        ("stadium".to_string(), ParamKind::String),
    ]);
    let test_data = engine.generate_test_data("validate_team", &params, false);

    info!(league = league.name(), fixtures = ledger.fixtures().len(), "demo complete");
    print_json(&json!({
        "league": league_header(&league),
        "table": ledger.get_league_table(league.teams()),
        "diagnostics": report,
        "symbolic_paths": paths,
        "test_cases_generated": test_data.total_generated,
    }))
}

fn run_schedule(config: &ToolkitConfig, args: &[String]) -> Result<()> {
    let teams = arg_value(args, "teams").ok_or_else(|| anyhow!("--teams is required\n{USAGE}"))?;
    let start = arg_value(args, "start").unwrap_or_else(|| DEFAULT_START.to_string());

    let mut manager = LeagueManager::new();
    manager.create_league("League", "")?;
    for name in teams.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        manager.add_team(name, "")?;
    }
    manager.validate_for_scheduling()?;
    let league = manager.league().context("league missing after validation")?;

    let mut scheduler = FixtureScheduler::with_options(league, schedule_options(config, args));
    scheduler.generate_fixtures(&start)?;
    print_json(&json!({
        "rounds": scheduler.round_count(),
        "fixtures": scheduler.get_all_fixtures(),
    }))
}

fn run_paths(config: &ToolkitConfig, args: &[String]) -> Result<()> {
    let file = arg_value(args, "file")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("--file is required\n{USAGE}"))?;
    let function = arg_value(args, "function").ok_or_else(|| anyhow!("--function is required\n{USAGE}"))?;
    let source = fs::read_to_string(&file).with_context(|| format!("read {}", file.display()))?;

    let engine = DiagnosticsEngine::new(config.diagnostics.clone());
    let report = engine
        .extract_symbolic_paths(&source, &function, false)
        .with_context(|| format!("extract paths of {function} in {}", file.display()))?;
    print_json(&report)
}

fn schedule_options(config: &ToolkitConfig, args: &[String]) -> ScheduleOptions {
    let mut options = config.schedule;
    if args.iter().any(|a| a == "--double") {
        options.mode = RoundRobinMode::Double;
    }
    options
}

fn league_header(league: &League) -> serde_json::Value {
    json!({
        "name": league.name(),
        "season": league.season(),
        "teams": league.team_names(),
    })
}

/// Accepts `--name=value` and `--name value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let prefix = format!("--{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&prefix) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() && !next.starts_with("--") {
                return Some(next.trim().to_string());
            }
        }
    }
    None
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{out}");
    Ok(())
}
