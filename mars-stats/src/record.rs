//! Game records as handed over by the loading side, and their validated form.
use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::expected::{ACTUAL_SCORES, ExpectedScores, PLAYERS_PER_GAME, expected_scores};
use crate::numbers::{i64_to_i32, truncate_f64_to_i32};

/// A raw Elo cell. Loaders hand over whatever the source table held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EloCell {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl EloCell {
    /// Integer rating, truncating floats toward zero. `None` when not convertible.
    #[must_use]
    pub fn to_rating(&self) -> Option<i32> {
        match self {
            Self::Integer(value) => i64_to_i32(*value),
            Self::Float(value) => truncate_f64_to_i32(*value),
            Self::Text(text) => text.trim().parse::<i64>().ok().and_then(i64_to_i32),
        }
    }
}

impl std::fmt::Display for EloCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text:?}"),
        }
    }
}

/// One completed game, column-oriented: every list is indexed by player slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(rename = "Game")]
    pub id: String,
    #[serde(rename = "Player Names")]
    pub players: Vec<String>,
    #[serde(rename = "Rank")]
    pub ranks: Vec<u32>,
    #[serde(rename = "VP total")]
    pub victory_points: Vec<i32>,
    #[serde(rename = "Elo", default)]
    pub elos: Vec<Option<EloCell>>,
    #[serde(rename = "Corporations")]
    pub corporations: Vec<String>,
    #[serde(rename = "Generations", default)]
    pub generations: u32,
}

/// Row-shaped input for building a [`GameRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntry {
    pub name: String,
    pub rank: u32,
    pub victory_points: i32,
    pub elo: i32,
    pub corporation: String,
}

impl PlayerEntry {
    #[must_use]
    pub fn new(name: &str, rank: u32, elo: i32, corporation: &str) -> Self {
        Self {
            name: name.to_string(),
            rank,
            victory_points: 0,
            elo,
            corporation: corporation.to_string(),
        }
    }
}

impl GameRecord {
    /// Assemble a record from per-player rows, keeping row order as slot order.
    #[must_use]
    pub fn from_entries(
        id: &str,
        generations: u32,
        entries: impl IntoIterator<Item = PlayerEntry>,
    ) -> Self {
        let mut record = Self {
            id: id.to_string(),
            players: Vec::new(),
            ranks: Vec::new(),
            victory_points: Vec::new(),
            elos: Vec::new(),
            corporations: Vec::new(),
            generations,
        };
        for entry in entries {
            record.players.push(entry.name);
            record.ranks.push(entry.rank);
            record.victory_points.push(entry.victory_points);
            record.elos.push(Some(EloCell::Integer(i64::from(entry.elo))));
            record.corporations.push(entry.corporation);
        }
        record
    }
}

/// A player's validated result within one game.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOutcome {
    pub name: String,
    pub rank: u32,
    pub corporation: String,
    pub victory_points: i32,
    pub elo: i32,
    pub score_diff: f64,
}

/// Per-game inner computation shared by every reduction.
///
/// Players are held in rank order, so `players[i]` finished in place `i + 1`
/// and `expected[i]` is their expected score.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub game: String,
    pub players: Vec<PlayerOutcome>,
    pub expected: ExpectedScores,
}

impl GameOutcome {
    /// Validate a record and compute every player's score difference.
    ///
    /// # Errors
    ///
    /// Returns an error when the game does not have exactly three players, when
    /// columns disagree in length, when ranks are not a permutation of 1..=3,
    /// or when any Elo cell is missing or non-numeric.
    pub fn from_record(record: &GameRecord) -> Result<Self, StatsError> {
        let count = record.players.len();
        if count != PLAYERS_PER_GAME {
            return Err(StatsError::PlayerCount {
                game: record.id.clone(),
                expected: PLAYERS_PER_GAME,
                count,
            });
        }
        check_column(record, "Rank", record.ranks.len())?;
        check_column(record, "VP total", record.victory_points.len())?;
        check_column(record, "Elo", record.elos.len())?;
        check_column(record, "Corporations", record.corporations.len())?;

        let mut sorted_ranks = record.ranks.clone();
        sorted_ranks.sort_unstable();
        if !sorted_ranks.iter().copied().eq(1..=3) {
            return Err(StatsError::RankPermutation {
                game: record.id.clone(),
                ranks: record.ranks.clone(),
                expected: PLAYERS_PER_GAME,
            });
        }

        let mut slots: Vec<usize> = (0..count).collect();
        slots.sort_by_key(|&slot| record.ranks[slot]);

        let mut elos = [0_i32; PLAYERS_PER_GAME];
        for (position, &slot) in slots.iter().enumerate() {
            elos[position] = parse_elo(record, slot)?;
        }
        let expected = expected_scores(elos);

        let players = slots
            .iter()
            .enumerate()
            .map(|(position, &slot)| PlayerOutcome {
                name: record.players[slot].clone(),
                rank: record.ranks[slot],
                corporation: record.corporations[slot].clone(),
                victory_points: record.victory_points[slot],
                elo: elos[position],
                score_diff: ACTUAL_SCORES[position] - expected[position],
            })
            .collect();

        Ok(Self {
            game: record.id.clone(),
            players,
            expected,
        })
    }

    /// Look up a player by name. The first slot wins when names repeat.
    #[must_use]
    pub fn player(&self, name: &str) -> Option<&PlayerOutcome> {
        self.players.iter().find(|player| player.name == name)
    }
}

fn check_column(
    record: &GameRecord,
    column: &'static str,
    actual: usize,
) -> Result<(), StatsError> {
    let expected = record.players.len();
    if actual == expected {
        Ok(())
    } else {
        Err(StatsError::ColumnLength {
            game: record.id.clone(),
            column,
            expected,
            actual,
        })
    }
}

fn parse_elo(record: &GameRecord, slot: usize) -> Result<i32, StatsError> {
    let cell = record.elos[slot].as_ref();
    cell.and_then(EloCell::to_rating)
        .ok_or_else(|| StatsError::MalformedElo {
            game: record.id.clone(),
            player: record.players[slot].clone(),
            value: cell.map_or_else(|| "missing".to_string(), ToString::to_string),
        })
}
