//! Per-entity accumulators keyed by free-text identifiers.
use std::collections::HashMap;

use crate::numbers::{guarded_ratio, percentage, round_to};
use crate::summary::SummaryRow;

/// Running counters for one corporation, card, milestone or award.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EntityStats {
    pub plays: u32,
    pub wins: u32,
    pub score_diff_sum: f64,
    pub second_place_wins: u32,
}

impl EntityStats {
    /// Count one observation by a player who finished at `rank`.
    pub fn record_play(&mut self, rank: u32, score_diff: f64) {
        self.plays = self.plays.saturating_add(1);
        if rank == 1 {
            self.wins = self.wins.saturating_add(1);
        }
        self.score_diff_sum += score_diff;
    }

    /// Count a second-place award share scored by the game's winner.
    pub fn record_second_place_win(&mut self) {
        self.second_place_wins = self.second_place_wins.saturating_add(1);
    }

    pub fn absorb(&mut self, other: &Self) {
        self.plays = self.plays.saturating_add(other.plays);
        self.wins = self.wins.saturating_add(other.wins);
        self.score_diff_sum += other.score_diff_sum;
        self.second_place_wins = self.second_place_wins.saturating_add(other.second_place_wins);
    }

    #[must_use]
    pub fn win_rate(&self) -> f64 {
        percentage(self.wins, self.plays)
    }

    #[must_use]
    pub fn wap(&self) -> f64 {
        round_to(guarded_ratio(self.score_diff_sum, self.plays), 3)
    }

    #[must_use]
    pub fn second_place_rate(&self) -> f64 {
        percentage(self.second_place_wins, self.plays)
    }

    fn summarize(&self, id: &str, with_second_place: bool) -> SummaryRow {
        SummaryRow {
            id: id.to_string(),
            plays: self.plays,
            wins: self.wins,
            win_rate: self.win_rate(),
            wap: self.wap(),
            second_place_wins: with_second_place.then_some(self.second_place_wins),
            second_place_rate: with_second_place.then(|| self.second_place_rate()),
        }
    }
}

/// Insertion-ordered map from entity identifier to its accumulator.
///
/// Identifiers are trimmed before lookup, so `" Ecoline"` and `"Ecoline"`
/// share one entry.
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    entries: Vec<(String, EntityStats)>,
    index: HashMap<String, usize>,
}

impl EntityTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the accumulator for `id`, creating a zeroed one on first sight.
    pub fn entry(&mut self, id: &str) -> &mut EntityStats {
        let key = id.trim();
        let slot = if let Some(&slot) = self.index.get(key) {
            slot
        } else {
            self.index.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), EntityStats::default()));
            self.entries.len() - 1
        };
        &mut self.entries[slot].1
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EntityStats> {
        self.index
            .get(id.trim())
            .and_then(|&slot| self.entries.get(slot))
            .map(|(_, stats)| stats)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityStats)> {
        self.entries.iter().map(|(id, stats)| (id.as_str(), stats))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Key-wise sum of `other` into `self`. New keys keep `other`'s order after ours.
    pub fn merge(&mut self, other: &Self) {
        for (id, stats) in other.iter() {
            self.entry(id).absorb(stats);
        }
    }

    /// Rows in first-seen order.
    #[must_use]
    pub fn rows(&self) -> Vec<SummaryRow> {
        self.iter().map(|(id, stats)| stats.summarize(id, false)).collect()
    }

    /// Rows carrying second-place share columns, for award scoring.
    #[must_use]
    pub fn rows_with_second_place(&self) -> Vec<SummaryRow> {
        self.iter().map(|(id, stats)| stats.summarize(id, true)).collect()
    }
}
