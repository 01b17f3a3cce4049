mod audit;
mod input;
mod util;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use hiscore_core::{
    FormattedSnapshot, Metric, MetricLeaderboard, SentinelPolicy, Snapshot, SnapshotValidator,
    StoredEfficiency, average_with, format, get_metric_leaders,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use audit::{AuditSummary, MetricTable, audit_snapshots, leader_table, reports, snapshot_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Replay each player's history through the gain validator
    Audit,
    /// Find the leading player of every metric
    Leaders,
    /// Average all snapshots into one synthetic snapshot
    Average,
    /// Show every snapshot grouped by metric family
    Format,
}

#[derive(Debug, Parser)]
#[command(name = "hiscore-audit", version = "0.1.0")]
#[command(about = "Validate, rank and summarize hiscore snapshot exports")]
struct Args {
    /// What to compute from the snapshots
    #[arg(long, value_enum, default_value_t = Mode::Audit)]
    mode: Mode,

    /// JSON array of snapshot records
    #[arg(long)]
    snapshots: PathBuf,

    /// JSON array of player records used to name metric leaders
    #[arg(long)]
    players: Option<PathBuf>,

    /// Gain rules JSON overriding the built-in thresholds
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Average only ranked entries instead of counting unranked ones as -1
    #[arg(long)]
    exclude_unranked: bool,

    /// Metrics to show (comma-separated keys, e.g. overall,zulrah,ehp)
    #[arg(long)]
    metrics: Option<String>,

    /// Fixed clock (RFC 3339) used for unstamped snapshots and averages
    #[arg(long)]
    now: Option<String>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    const fn sentinel_policy(&self) -> SentinelPolicy {
        if self.exclude_unranked {
            SentinelPolicy::Exclude
        } else {
            SentinelPolicy::Include
        }
    }
}

/// Result of one run, serialized as-is for JSON reports.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Outcome {
    Audit(AuditSummary),
    Leaders(MetricLeaderboard),
    Average(FormattedSnapshot),
    Format(Vec<FormattedSnapshot>),
}

impl Outcome {
    fn has_rejections(&self) -> bool {
        matches!(self, Self::Audit(summary) if summary.has_rejections())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let now = input::resolve_now(args.now.as_deref())?;
    let metrics = input::parse_metrics(args.metrics.as_deref())?;
    let snapshots = input::load_snapshots(&args.snapshots)?;
    log::info!(
        "loaded {} snapshots from {}",
        snapshots.len(),
        args.snapshots.display()
    );

    let outcome = run_mode(&args, &snapshots, metrics.as_deref(), now)?;
    write_reports(&args, &outcome, metrics.as_deref())?;

    if outcome.has_rejections() {
        std::process::exit(1);
    }

    Ok(())
}

fn run_mode(
    args: &Args,
    snapshots: &[Snapshot],
    metrics: Option<&[Metric]>,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    match args.mode {
        Mode::Audit => {
            let rules = input::load_rules(args.rules.as_deref())?;
            let validator = SnapshotValidator::with_rules(rules, StoredEfficiency);
            Ok(Outcome::Audit(audit_snapshots(snapshots, &validator, now)))
        }
        Mode::Leaders => {
            let mut board =
                get_metric_leaders(snapshots).context("cannot resolve metric leaders")?;
            if let Some(path) = &args.players {
                let players = input::load_players(path)?;
                log::debug!(
                    "resolving {} leader ids against {} players",
                    board.distinct_leader_ids().len(),
                    players.len()
                );
                board = board.with_players(&players);
            }
            if let Some(metrics) = metrics {
                board.leaders.retain_metrics(metrics);
                board.leader_ids.retain(|metric, _| metrics.contains(metric));
            }
            Ok(Outcome::Leaders(board))
        }
        Mode::Average => {
            let average = average_with(snapshots, args.sentinel_policy(), now)
                .context("cannot average snapshots")?;
            let formatted = format(Some(&average), None).context("average produced no snapshot")?;
            Ok(Outcome::Average(formatted))
        }
        Mode::Format => Ok(Outcome::Format(
            snapshots
                .iter()
                .filter_map(|snapshot| format(Some(snapshot), None))
                .collect(),
        )),
    }
}

fn metric_tables(args: &Args, outcome: &Outcome, metrics: Option<&[Metric]>) -> Vec<MetricTable> {
    let tables = match outcome {
        Outcome::Audit(_) => Vec::new(),
        Outcome::Leaders(board) => vec![leader_table(&board.leaders)],
        Outcome::Average(average) => vec![snapshot_table("Average snapshot".to_string(), average)],
        Outcome::Format(formatted) => formatted
            .iter()
            .map(|snapshot| {
                let title = format!("Snapshot #{} (player {})", snapshot.id, snapshot.player_id);
                snapshot_table(title, snapshot)
            })
            .collect(),
    };
    tables
        .into_iter()
        .map(|table| table.filtered(metrics, args.verbose))
        .collect()
}

fn write_reports(args: &Args, outcome: &Outcome, metrics: Option<&[Metric]>) -> Result<()> {
    let mut out = open_output(args.output.as_deref())?;

    match (args.report.as_str(), outcome) {
        ("json", outcome) => reports::generate_json_report(&mut out, outcome)?,
        ("markdown", Outcome::Audit(summary)) => {
            reports::generate_audit_markdown_report(&mut out, summary)?;
        }
        ("markdown", outcome) => {
            let tables = metric_tables(args, outcome, metrics);
            reports::generate_table_markdown_report(&mut out, &tables)?;
        }
        (_, Outcome::Audit(summary)) => {
            reports::generate_audit_console_report(&mut out, summary, args.verbose)?;
        }
        (_, outcome) => {
            let tables = metric_tables(args, outcome, metrics);
            reports::generate_table_console_report(&mut out, &tables)?;
        }
    }

    out.flush().context("failed to flush report")?;
    Ok(())
}

/// Report destination: the `--output` file when given, stdout otherwise.
fn open_output(path: Option<&Path>) -> Result<BufWriter<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match path {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(stdout()),
    };
    Ok(BufWriter::new(sink))
}
