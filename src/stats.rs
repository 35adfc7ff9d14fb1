//! Markdown statistics report derived from the JSONL artifact.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::Result;

/// Minimal record info for the report.
#[derive(Debug, Clone)]
struct RecordInfo {
    name: String,
    uid_nr: Option<String>,
    anschrift: String,
    veroeffentlichung: Option<NaiveDate>,
}

/// One row of the monthly additions table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MonthRow {
    /// e.g. `2026-02`
    label: String,
    month_start: NaiveDate,
    additions: usize,
    /// Cumulative total through this month.
    total: usize,
}

/// Generate STATS.md from a written JSONL artifact. An empty artifact is
/// logged and skipped, not treated as a failure.
pub fn generate_stats(jsonl_path: &Path, output_path: &Path) -> Result<()> {
    info!(input = %jsonl_path.display(), "generating stats report");

    let (records, stand, total) = parse_jsonl_records(jsonl_path)?;
    if records.is_empty() {
        warn!(input = %jsonl_path.display(), "no records found, skipping stats");
        return Ok(());
    }

    let monthly = compute_monthly_stats(&records);
    let today = chrono::Local::now().date_naive();
    let recent = find_recent_additions(&records, 30, today);
    let oldest = monthly.first().map(|row| row.month_start);

    let md = render_stats_md(&monthly, &recent, &stand, total, oldest);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, md)?;
    info!(output = %output_path.display(), "wrote stats report");
    Ok(())
}

/// Read all records plus the Stand timestamp and total count from the
/// JSONL artifact.
fn parse_jsonl_records(jsonl_path: &Path) -> Result<(Vec<RecordInfo>, String, usize)> {
    let text = fs::read_to_string(jsonl_path)?;
    let mut records = Vec::new();
    let mut stand = String::from("?");
    let mut total = 0usize;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let obj: Value = serde_json::from_str(line)?;
        if let Some(meta) = obj.get("_metadata") {
            if let Some(s) = meta.get("stand").and_then(Value::as_str) {
                stand = s.to_string();
            }
            total = meta.get("count").and_then(Value::as_u64).unwrap_or(0) as usize;
            continue;
        }

        let veroeffentlichung = obj
            .get("veroeffentlichung")
            .and_then(Value::as_str)
            .and_then(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d").ok());

        records.push(RecordInfo {
            name: obj.get("name").and_then(Value::as_str).unwrap_or("").to_string(),
            uid_nr: obj
                .get("uid_nr")
                .and_then(Value::as_str)
                .map(str::to_string),
            anschrift: obj
                .get("anschrift")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            veroeffentlichung,
        });
    }

    if total == 0 {
        total = records.len();
    }
    Ok((records, stand, total))
}

/// Group records by calendar month of publication and compute cumulative
/// totals. Records without a publication date are skipped; rows come back
/// oldest first.
fn compute_monthly_stats(records: &[RecordInfo]) -> Vec<MonthRow> {
    let mut month_counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for rec in records {
        if let Some(date) = rec.veroeffentlichung {
            use chrono::Datelike;
            *month_counts.entry((date.year(), date.month())).or_default() += 1;
        }
    }

    let mut rows = Vec::new();
    let mut cumulative = 0usize;
    for ((year, month), additions) in month_counts {
        let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            continue;
        };
        cumulative += additions;
        rows.push(MonthRow {
            label: format!("{}-{:02}", year, month),
            month_start,
            additions,
            total: cumulative,
        });
    }
    rows
}

/// Records published in the last `days` days, sorted alphabetically.
fn find_recent_additions(records: &[RecordInfo], days: i64, today: NaiveDate) -> Vec<RecordInfo> {
    let cutoff = today - Duration::days(days);
    let mut recent: Vec<RecordInfo> = records
        .iter()
        .filter(|rec| rec.veroeffentlichung.is_some_and(|d| d > cutoff))
        .cloned()
        .collect();
    recent.sort_by(|a, b| a.name.cmp(&b.name));
    recent
}

/// Render the full Markdown report: title and totals, Mermaid chart of
/// the temporal progression, then the last-30-days table.
fn render_stats_md(
    monthly: &[MonthRow],
    recent: &[RecordInfo],
    stand: &str,
    total: usize,
    oldest_date: Option<NaiveDate>,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    let first_date = oldest_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "—".to_string());
    lines.push("# Scheinfirmen Österreich — Statistik\n".to_string());
    lines.push(format!(
        "> Stand: {} | Gesamt: {} | Erster Eintrag: {}\n",
        stand, total, first_date
    ));

    if monthly.len() >= 2 {
        use chrono::Datelike;
        lines.push("## Verlauf\n".to_string());

        // A numeric year axis avoids Mermaid zigzag artefacts with many
        // categorical entries.
        let first_year = monthly[0].month_start.year();
        let last_year = monthly[monthly.len() - 1].month_start.year();
        let y_values: Vec<String> = monthly.iter().map(|row| row.total.to_string()).collect();
        let y_max = monthly.iter().map(|row| row.total).max().unwrap_or(0) + 50;

        lines.push("```mermaid".to_string());
        lines.push("---".to_string());
        lines.push("config:".to_string());
        lines.push("  themeVariables:".to_string());
        lines.push("    xyChart:".to_string());
        lines.push("      plotColorPalette: \"#111111\"".to_string());
        lines.push("---".to_string());
        lines.push("xychart-beta".to_string());
        lines.push("    title \"Scheinfirmen: Gesamtanzahl\"".to_string());
        lines.push(format!("    x-axis \"Jahr\" {} --> {}", first_year, last_year));
        lines.push(format!("    y-axis \"Anzahl\" 0 --> {}", y_max));
        lines.push(format!("    line [{}]", y_values.join(", ")));
        lines.push("```\n".to_string());
    }

    lines.push("## Neueste Scheinfirmen (letzte 30 Tage)\n".to_string());
    if recent.is_empty() {
        lines.push("*Keine neuen Einträge in den letzten 30 Tagen.*\n".to_string());
    } else {
        lines.push("| Name | UID | Anschrift |".to_string());
        lines.push("|------|-----|-----------|".to_string());
        for rec in recent {
            let uid = rec.uid_nr.as_deref().unwrap_or("");
            lines.push(format!("| {} | {} | {} |", rec.name, uid, rec.anschrift));
        }
        lines.push(format!("\n*{} Einträge hinzugefügt.*\n", recent.len()));
    }

    lines.join("\n")
}
