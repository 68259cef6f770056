use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use mars_stats::{SortKey, SummaryRow};
use serde::Serialize;
use std::io::Write;

use crate::util::csv_field;

/// One ranked table ready for output.
#[derive(Debug, Clone, Serialize)]
pub struct ReportTable {
    pub title: &'static str,
    pub sorted_by: SortKey,
    pub rows: Vec<SummaryRow>,
}

impl ReportTable {
    pub const fn new(title: &'static str, sorted_by: SortKey, rows: Vec<SummaryRow>) -> Self {
        Self {
            title,
            sorted_by,
            rows,
        }
    }

    fn has_second_place(&self) -> bool {
        self.rows.iter().any(|row| row.second_place_wins.is_some())
    }
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    games: usize,
    tables: &'a [ReportTable],
}

pub fn generate_console_report(
    out: &mut dyn Write,
    tables: &[ReportTable],
    games: usize,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Terraforming Mars Statistics".bright_cyan().bold())?;
    writeln!(out, "{}", "===============================".cyan())?;
    writeln!(out, "Games analysed: {games}")?;

    for table in tables {
        writeln!(out)?;
        writeln!(
            out,
            "{} {}",
            table.title.bold(),
            format!("(sorted by {})", table.sorted_by).dimmed()
        )?;
        if table.rows.is_empty() {
            writeln!(out, "   {}", "no rows".yellow())?;
            continue;
        }
        let width = table
            .rows
            .iter()
            .map(|row| row.id.chars().count())
            .max()
            .unwrap_or(0)
            .max(4);
        let second = table.has_second_place();
        write!(
            out,
            "   {:width$}  {:>6}  {:>5}  {:>8}  {:>7}",
            "Name", "Plays", "Wins", "Win %", "WAP"
        )?;
        if second {
            write!(out, "  {:>9}  {:>9}", "2nd Wins", "2nd %")?;
        }
        writeln!(out)?;
        for row in &table.rows {
            let wap = format!("{:>7.3}", row.wap);
            let wap = if row.wap >= 0.0 { wap.green() } else { wap.red() };
            write!(
                out,
                "   {:width$}  {:>6}  {:>5}  {:>8.2}  {wap}",
                row.id, row.plays, row.wins, row.win_rate
            )?;
            if second {
                write!(
                    out,
                    "  {:>9}  {:>9.2}",
                    row.second_place_wins.unwrap_or(0),
                    row.second_place_rate.unwrap_or(0.0)
                )?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    tables: &[ReportTable],
    games: usize,
) -> Result<()> {
    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        games,
        tables,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    tables: &[ReportTable],
    games: usize,
) -> Result<()> {
    writeln!(out, "# Terraforming Mars Statistics\n")?;
    writeln!(out, "- **Games analysed**: {games}")?;
    writeln!(out, "- **Generated**: {}\n", Utc::now().format("%Y-%m-%d %H:%M UTC"))?;

    for table in tables {
        writeln!(out, "## {}\n", table.title)?;
        writeln!(out, "_Sorted by {}._\n", table.sorted_by)?;
        if table.rows.is_empty() {
            writeln!(out, "_No rows._\n")?;
            continue;
        }
        let second = table.has_second_place();
        if second {
            writeln!(
                out,
                "| Name | Plays | Wins | Win Rate (1st Place) | WAP | 2nd Place Wins | {} |",
                SortKey::SecondPlaceRate.label()
            )?;
            writeln!(out, "|---|---:|---:|---:|---:|---:|---:|")?;
        } else {
            writeln!(out, "| Name | Plays | Wins | Win Rate | WAP |")?;
            writeln!(out, "|---|---:|---:|---:|---:|")?;
        }
        for row in &table.rows {
            write!(
                out,
                "| {} | {} | {} | {:.2} | {:.3} |",
                row.id.replace('|', "\\|"),
                row.plays,
                row.wins,
                row.win_rate,
                row.wap
            )?;
            if second {
                write!(
                    out,
                    " {} | {:.2} |",
                    row.second_place_wins.unwrap_or(0),
                    row.second_place_rate.unwrap_or(0.0)
                )?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_csv_report(out: &mut dyn Write, tables: &[ReportTable]) -> Result<()> {
    writeln!(
        out,
        "table,id,plays,wins,win_rate,wap,second_place_wins,second_place_rate"
    )?;
    for table in tables {
        for row in &table.rows {
            writeln!(
                out,
                "{},{},{},{},{:.2},{:.3},{},{}",
                csv_field(table.title),
                csv_field(&row.id),
                row.plays,
                row.wins,
                row.win_rate,
                row.wap,
                row.second_place_wins
                    .map(|wins| wins.to_string())
                    .unwrap_or_default(),
                row.second_place_rate
                    .map(|rate| format!("{rate:.2}"))
                    .unwrap_or_default()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tables() -> Vec<ReportTable> {
        vec![
            ReportTable::new(
                "Corporations",
                SortKey::Wap,
                vec![SummaryRow {
                    id: "Mons Insurance, Inc".to_string(),
                    plays: 4,
                    wins: 2,
                    win_rate: 50.0,
                    wap: 0.125,
                    second_place_wins: None,
                    second_place_rate: None,
                }],
            ),
            ReportTable::new(
                "Award Scoring",
                SortKey::WinRate,
                vec![SummaryRow {
                    id: "Landlord".to_string(),
                    plays: 2,
                    wins: 1,
                    win_rate: 50.0,
                    wap: -0.25,
                    second_place_wins: Some(1),
                    second_place_rate: Some(50.0),
                }],
            ),
            ReportTable::new("Milestones", SortKey::WinRate, Vec::new()),
        ]
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn csv_report_quotes_ids_and_leaves_optional_columns_blank() {
        let csv = render(|out| generate_csv_report(out, &sample_tables()));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Corporations,\"Mons Insurance, Inc\",4,2,50.00,0.125,,");
        assert_eq!(lines[2], "Award Scoring,Landlord,2,1,50.00,-0.250,1,50.00");
    }

    #[test]
    fn json_report_keeps_empty_tables() {
        let json = render(|out| generate_json_report(out, &sample_tables(), 3));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["games"], 3);
        assert_eq!(value["tables"][2]["title"], "Milestones");
        assert_eq!(value["tables"][2]["rows"], serde_json::json!([]));
        assert_eq!(value["tables"][1]["sorted_by"], "win-rate");
        assert!(value["tables"][0]["rows"][0].get("second_place_wins").is_none());
    }

    #[test]
    fn markdown_report_adds_second_place_columns_only_where_present() {
        let markdown = render(|out| generate_markdown_report(out, &sample_tables(), 3));
        assert!(markdown.contains("| Name | Plays | Wins | Win Rate | WAP |"));
        assert!(markdown.contains("Win Rate (2nd Place)"));
        assert!(markdown.contains("| Landlord | 2 | 1 | 50.00 | -0.250 | 1 | 50.00 |"));
        assert!(markdown.contains("_No rows._"));
    }

    #[test]
    fn console_report_lists_every_table() {
        colored::control::set_override(false);
        let console = render(|out| generate_console_report(out, &sample_tables(), 3));
        assert!(console.contains("Games analysed: 3"));
        assert!(console.contains("Corporations (sorted by WAP)"));
        assert!(console.contains("2nd Wins"));
        assert!(console.contains("no rows"));
    }
}
