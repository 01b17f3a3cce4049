use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

use super::history::{AuditSummary, TransitionRecord};
use super::tables::MetricTable;

fn transition_flags(record: &TransitionRecord) -> String {
    let mut flags = Vec::new();
    if record.negative_gains {
        flags.push("negative gains");
    }
    if record.excessive_gains {
        flags.push("excessive gains");
    }
    if flags.is_empty() {
        "-".to_string()
    } else {
        flags.join(", ")
    }
}

fn created_label(record: &TransitionRecord) -> String {
    record
        .created_at
        .map_or_else(|| "unstamped".to_string(), |at| at.to_rfc3339())
}

pub fn generate_audit_console_report<W: Write + ?Sized>(
    out: &mut W,
    summary: &AuditSummary,
    verbose: bool,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Snapshot Audit Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=========================".cyan())?;
    writeln!(out, "Players: {}", summary.players)?;
    writeln!(out, "Snapshots: {}", summary.transitions.len())?;
    writeln!(out, "Accepted: {}", summary.accepted().to_string().green())?;
    writeln!(out, "Rejected: {}", summary.rejected().to_string().red())?;
    writeln!(out)?;

    for record in &summary.transitions {
        if record.accepted && !verbose {
            continue;
        }
        let status = if record.accepted {
            "✅ ACCEPT".green()
        } else {
            "❌ REJECT".red()
        };
        let baseline = record
            .baseline_id
            .map_or_else(|| "baseline".to_string(), |id| format!("vs #{id}"));
        writeln!(
            out,
            "{status} player {} snapshot #{} ({baseline}) at {}",
            record.player_id.to_string().bold(),
            record.snapshot_id,
            created_label(record)
        )?;
        if !record.accepted {
            writeln!(out, "   Flags: {}", transition_flags(record).red())?;
        }
        if verbose {
            writeln!(out, "   Build: {}  Changed: {}", record.build, record.changed)?;
        }
    }

    Ok(())
}

pub fn generate_audit_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    summary: &AuditSummary,
) -> Result<()> {
    writeln!(out, "# Snapshot Audit\n")?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Players**: {}", summary.players)?;
    writeln!(out, "- **Snapshots**: {}", summary.transitions.len())?;
    writeln!(out, "- **Accepted**: {}", summary.accepted())?;
    writeln!(out, "- **Rejected**: {}\n", summary.rejected())?;

    writeln!(out, "## Transitions\n")?;
    writeln!(
        out,
        "| Status | Player | Snapshot | Baseline | Created | Flags | Build |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for record in &summary.transitions {
        let status = if record.accepted { "✅" } else { "❌" };
        let baseline = record
            .baseline_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        writeln!(
            out,
            "| {status} | {} | {} | {baseline} | {} | {} | {} |",
            record.player_id,
            record.snapshot_id,
            created_label(record),
            transition_flags(record),
            record.build
        )?;
    }
    Ok(())
}

pub fn generate_table_console_report<W: Write + ?Sized>(
    out: &mut W,
    tables: &[MetricTable],
) -> Result<()> {
    for table in tables {
        writeln!(out)?;
        writeln!(out, "{}", table.title.bright_cyan().bold())?;
        writeln!(out, "{}", "=".repeat(table.title.chars().count()).cyan())?;
        if table.rows.is_empty() {
            writeln!(out, "No metrics to show.")?;
            continue;
        }
        for row in &table.rows {
            let mut line = format!(
                "{:<34} {:>14} {:>10}",
                row.metric.to_string(),
                row.display_value(),
                row.display_rank()
            );
            if row.level.is_some() {
                line.push_str(&format!(" {:>5}", row.display_level()));
            }
            if let Some(player) = &row.player {
                line.push_str(&format!("  {}", player.green()));
            }
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

pub fn generate_table_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    tables: &[MetricTable],
) -> Result<()> {
    for table in tables {
        writeln!(out, "## {}\n", table.title)?;
        writeln!(out, "| Metric | Value | Rank | Level | Player |")?;
        writeln!(out, "|---|---|---|---|---|")?;
        for row in &table.rows {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                row.metric,
                row.display_value(),
                row.display_rank(),
                row.display_level(),
                row.player.as_deref().unwrap_or("")
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized, T: Serialize + ?Sized>(
    out: &mut W,
    value: &T,
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}
