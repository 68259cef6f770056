//! Error taxonomy for aggregation passes.
//!
//! Only precondition violations coming from the loading side surface here.
//! Log lines that fail extraction, and events naming unknown players, are
//! skipped by the parser and aggregator and never become errors.

use thiserror::Error;

/// Errors raised when a game record cannot feed the expected-score model.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("game {game}: Elo for {player} is not an integer rating (got {value})")]
    MalformedElo {
        game: String,
        player: String,
        value: String,
    },
    #[error("game {game}: expected exactly {expected} players, found {count}")]
    PlayerCount {
        game: String,
        expected: usize,
        count: usize,
    },
    #[error("game {game}: column `{column}` has {actual} entries, expected {expected}")]
    ColumnLength {
        game: String,
        column: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("game {game}: ranks {ranks:?} are not a permutation of 1..={expected}")]
    RankPermutation {
        game: String,
        ranks: Vec<u32>,
        expected: usize,
    },
    #[error("unknown sort key `{0}`")]
    UnknownSortKey(String),
    #[error("invalid analysis config: {0}")]
    Config(#[from] serde_json::Error),
}
