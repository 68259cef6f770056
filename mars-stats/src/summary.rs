//! Exported per-entity rows and the keys used to rank them.
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::StatsError;

/// Final record for one corporation, card, milestone or award.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub id: String,
    pub plays: u32,
    pub wins: u32,
    /// Percentage, two decimals.
    pub win_rate: f64,
    /// Mean score difference, three decimals.
    pub wap: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_place_wins: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_place_rate: Option<f64>,
}

/// Column a summary table is ranked by. Sorting is always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Plays,
    Wins,
    WinRate,
    #[default]
    Wap,
    SecondPlaceRate,
}

impl SortKey {
    #[must_use]
    pub fn value(self, row: &SummaryRow) -> f64 {
        match self {
            Self::Plays => f64::from(row.plays),
            Self::Wins => f64::from(row.wins),
            Self::WinRate => row.win_rate,
            Self::Wap => row.wap,
            Self::SecondPlaceRate => row.second_place_rate.unwrap_or(0.0),
        }
    }

    /// Column heading used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Plays => "Plays",
            Self::Wins => "Wins",
            Self::WinRate => "Win Rate",
            Self::Wap => "WAP",
            Self::SecondPlaceRate => "Win Rate (2nd Place)",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortKey {
    type Err = StatsError;

    /// Accepts kebab-case keys as well as the report column headings.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "plays" | "participation-count" => Ok(Self::Plays),
            "wins" => Ok(Self::Wins),
            "win-rate" | "win-rate-(1st-place)" => Ok(Self::WinRate),
            "wap" => Ok(Self::Wap),
            "second-place-rate" | "win-rate-(2nd-place)" => Ok(Self::SecondPlaceRate),
            _ => Err(StatsError::UnknownSortKey(raw.to_string())),
        }
    }
}

/// Stable descending sort: rows with equal keys keep their first-seen order.
///
/// `0.0` and `-0.0` compare equal.
pub fn sort_rows(rows: &mut [SummaryRow], key: SortKey) {
    rows.sort_by(|a, b| {
        key.value(b)
            .partial_cmp(&key.value(a))
            .unwrap_or(Ordering::Equal)
    });
}

/// Keep rows played more than `min_plays` times.
pub fn retain_played(rows: &mut Vec<SummaryRow>, min_plays: u32) {
    rows.retain(|row| row.plays > min_plays);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, plays: u32, win_rate: f64) -> SummaryRow {
        SummaryRow {
            id: id.to_string(),
            plays,
            wins: 0,
            win_rate,
            wap: 0.0,
            second_place_wins: None,
            second_place_rate: None,
        }
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut rows = vec![
            row("Helion", 2, 50.0),
            row("Ecoline", 3, 75.0),
            row("Credicor", 4, 50.0),
            row("Thorgate", 1, 0.0),
        ];
        sort_rows(&mut rows, SortKey::WinRate);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["Ecoline", "Helion", "Credicor", "Thorgate"]);
    }

    #[test]
    fn signed_zero_keys_tie() {
        let mut rows = vec![row("Shared", 2, 0.0), row("Neutral", 1, 0.0), row("Best", 1, 0.0)];
        rows[0].wap = -0.0;
        rows[2].wap = 0.5;
        sort_rows(&mut rows, SortKey::Wap);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["Best", "Shared", "Neutral"]);
    }

    #[test]
    fn retain_uses_exclusive_threshold() {
        let mut rows = vec![row("A", 0, 0.0), row("B", 1, 0.0), row("C", 2, 0.0)];
        retain_played(&mut rows, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "C");
    }

    #[test]
    fn parses_keys_and_column_headings() {
        assert_eq!("wap".parse::<SortKey>().unwrap(), SortKey::Wap);
        assert_eq!("Win Rate".parse::<SortKey>().unwrap(), SortKey::WinRate);
        assert_eq!("Participation Count".parse::<SortKey>().unwrap(), SortKey::Plays);
        assert_eq!(
            "Win Rate (2nd Place)".parse::<SortKey>().unwrap(),
            SortKey::SecondPlaceRate
        );
        assert!(matches!(
            "elo".parse::<SortKey>(),
            Err(StatsError::UnknownSortKey(key)) if key == "elo"
        ));
    }

    #[test]
    fn second_place_key_defaults_to_zero() {
        assert!(SortKey::SecondPlaceRate.value(&row("X", 1, 10.0)).abs() < f64::EPSILON);
    }
}
