//! Attribution of score differences to corporations, cards, milestones and awards.
//!
//! Every reduction walks the games in the order they were added to the
//! [`GameSet`], computes the game's [`GameOutcome`] once, and folds that
//! game's observations into [`EntityTable`]s owned by the call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::entity::EntityTable;
use crate::error::StatsError;
use crate::parser::{AwardShare, LogParser, ParsedLog};
use crate::record::{GameOutcome, GameRecord, PlayerOutcome};
use crate::summary::{SortKey, SummaryRow, retain_played, sort_rows};

/// Games to aggregate over, in caller order, with their raw logs.
#[derive(Debug, Clone, Default)]
pub struct GameSet {
    games: Vec<GameRecord>,
    logs: HashMap<String, String>,
}

impl GameSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a game; a log given here replaces any earlier log for the same id.
    pub fn push(&mut self, record: GameRecord, log: Option<String>) {
        if let Some(log) = log {
            self.logs.insert(record.id.clone(), log);
        }
        self.games.push(record);
    }

    #[must_use]
    pub fn records(&self) -> &[GameRecord] {
        &self.games
    }

    #[must_use]
    pub fn log_for(&self, game: &str) -> Option<&str> {
        self.logs.get(game).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Number of games that have a log attached.
    #[must_use]
    pub fn logged_count(&self) -> usize {
        self.games
            .iter()
            .filter(|record| self.logs.contains_key(&record.id))
            .count()
    }

    /// Games with a log, each validated and parsed from scratch.
    fn parsed_games(&self) -> impl Iterator<Item = Result<ParsedGame<'_>, StatsError>> {
        self.games.iter().filter_map(|record| {
            let Some(log) = self.log_for(&record.id) else {
                log::debug!("game {}: no log attached, skipping", record.id);
                return None;
            };
            Some(GameOutcome::from_record(record).map(|outcome| {
                let parsed = LogParser::new(&record.players).parse(log);
                log::debug!(
                    "game {}: {} events from {} generations",
                    record.id,
                    parsed.events.len(),
                    parsed.final_generation
                );
                ParsedGame {
                    record,
                    outcome,
                    parsed,
                }
            }))
        })
    }
}

impl FromIterator<(GameRecord, Option<String>)> for GameSet {
    fn from_iter<I: IntoIterator<Item = (GameRecord, Option<String>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (record, log) in iter {
            set.push(record, log);
        }
        set
    }
}

struct ParsedGame<'a> {
    record: &'a GameRecord,
    outcome: GameOutcome,
    parsed: ParsedLog,
}

impl ParsedGame<'_> {
    /// Players in record order, skipping any the outcome does not know.
    fn players(&self) -> impl Iterator<Item = &PlayerOutcome> {
        self.record
            .players
            .iter()
            .filter_map(|name| lookup_player(&self.outcome, name))
    }
}

fn lookup_player<'a>(outcome: &'a GameOutcome, name: &str) -> Option<&'a PlayerOutcome> {
    let player = outcome.player(name);
    if player.is_none() {
        log::warn!("game {}: event names unknown player {name:?}, skipping", outcome.game);
    }
    player
}

/// Summary tables derived from game logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStatistics {
    pub cards: Vec<SummaryRow>,
    pub milestones: Vec<SummaryRow>,
    pub awards: Vec<SummaryRow>,
    pub award_scoring: Vec<SummaryRow>,
}

#[derive(Debug, Default)]
struct LogTables {
    cards: EntityTable,
    milestones: EntityTable,
    awards: EntityTable,
    award_scoring: EntityTable,
}

impl LogTables {
    fn attribute(&mut self, game: &ParsedGame<'_>) {
        let index = &game.parsed.cards_by_generation;
        for player in game.players() {
            for generation in index.iter() {
                for card in generation.cards_for(&player.name) {
                    self.cards
                        .entry(card)
                        .record_play(player.rank, player.score_diff);
                }
            }
            for milestone in game.parsed.milestones_for(&player.name) {
                self.milestones
                    .entry(milestone)
                    .record_play(player.rank, player.score_diff);
            }
            for award in game.parsed.awards_for(&player.name) {
                self.awards
                    .entry(award)
                    .record_play(player.rank, player.score_diff);
            }
        }

        for result in game.parsed.award_results() {
            let Some(player) = lookup_player(&game.outcome, &result.player) else {
                continue;
            };
            match result.share {
                AwardShare::FirstPlace => self
                    .award_scoring
                    .entry(&result.award)
                    .record_play(player.rank, player.score_diff),
                AwardShare::SecondPlace if player.rank == 1 => self
                    .award_scoring
                    .entry(&result.award)
                    .record_second_place_win(),
                AwardShare::SecondPlace => {}
            }
        }
    }

    fn finish(self, card_sort: SortKey) -> LogStatistics {
        LogStatistics {
            cards: ranked(self.cards.rows(), card_sort, 0),
            milestones: ranked(self.milestones.rows(), SortKey::WinRate, 0),
            awards: ranked(self.awards.rows(), SortKey::WinRate, 0),
            award_scoring: ranked(
                self.award_scoring.rows_with_second_place(),
                SortKey::WinRate,
                0,
            ),
        }
    }
}

fn ranked(mut rows: Vec<SummaryRow>, sort_by: SortKey, min_plays: u32) -> Vec<SummaryRow> {
    retain_played(&mut rows, min_plays);
    sort_rows(&mut rows, sort_by);
    rows
}

/// Rank corporations by how their players performed against expectation.
///
/// # Errors
///
/// Returns an error if any game fails validation or carries a malformed Elo.
pub fn corporation_ranking(
    games: &GameSet,
    sort_by: SortKey,
) -> Result<Vec<SummaryRow>, StatsError> {
    let mut corporations = EntityTable::new();
    for record in games.records() {
        let outcome = GameOutcome::from_record(record)?;
        for player in &outcome.players {
            corporations
                .entry(&player.corporation)
                .record_play(player.rank, player.score_diff);
        }
    }
    let mut rows = corporations.rows();
    sort_rows(&mut rows, sort_by);
    Ok(rows)
}

/// Card, milestone, award and award-scoring tables from every logged game.
///
/// Cards are ranked by `card_sort`; milestones, awards and award scoring by
/// win rate (first-place win rate for award scoring).
///
/// # Errors
///
/// Returns an error if any logged game fails validation or carries a malformed Elo.
pub fn log_statistics(games: &GameSet, card_sort: SortKey) -> Result<LogStatistics, StatsError> {
    let mut tables = LogTables::default();
    for game in games.parsed_games() {
        tables.attribute(&game?);
    }
    Ok(tables.finish(card_sort))
}

/// Card table restricted to plays made in `generations`.
///
/// Only cards played more than `min_plays` times are kept.
///
/// # Errors
///
/// Returns an error if any logged game fails validation or carries a malformed Elo.
pub fn cards_by_generation(
    games: &GameSet,
    generations: &[u32],
    sort_by: SortKey,
    min_plays: u32,
) -> Result<Vec<SummaryRow>, StatsError> {
    let mut cards = EntityTable::new();
    for game in games.parsed_games() {
        let game = game?;
        let index = &game.parsed.cards_by_generation;
        for player in game.players() {
            for &generation in generations {
                for card in index.cards(generation, &player.name) {
                    cards
                        .entry(card)
                        .record_play(player.rank, player.score_diff);
                }
            }
        }
    }
    Ok(ranked(cards.rows(), sort_by, min_plays))
}

/// Every table, driven by one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub corporations: Vec<SummaryRow>,
    pub log: LogStatistics,
    pub cards_by_generation: Vec<SummaryRow>,
}

/// Run all three reductions with the sort keys and filters from `config`.
///
/// # Errors
///
/// Returns the first validation or Elo error met by any reduction.
pub fn analyze(games: &GameSet, config: &AnalysisConfig) -> Result<AnalysisReport, StatsError> {
    Ok(AnalysisReport {
        corporations: corporation_ranking(games, config.corporation_sort)?,
        log: log_statistics(games, config.card_sort)?,
        cards_by_generation: cards_by_generation(
            games,
            &config.generations,
            config.card_sort,
            config.min_plays,
        )?,
    })
}
