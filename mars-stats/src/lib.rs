//! Mars Stats
//!
//! Turns Terraforming Mars game transcripts into ranked performance tables.
//! Game records carry each player's rank, Elo and corporation; logs carry the
//! cards, milestones and awards they touched. Every observation is credited
//! with the player's Elo-adjusted score difference for that game.
//! This crate has no I/O: loading games and logs is left to a [`GameSource`].

pub mod aggregate;
pub mod config;
pub mod entity;
pub mod error;
pub mod expected;
pub mod numbers;
pub mod parser;
pub mod record;
pub mod summary;

// Re-export commonly used types
pub use aggregate::{
    AnalysisReport, GameSet, LogStatistics, analyze, cards_by_generation, corporation_ranking,
    log_statistics,
};
pub use config::AnalysisConfig;
pub use entity::{EntityStats, EntityTable};
pub use error::StatsError;
pub use expected::{ExpectedScores, expected_scores, score_differences, win_probability};
pub use parser::{
    AwardFunding, AwardScoringResult, AwardShare, CardPlay, GenerationIndex, LogEvent, LogParser,
    MilestoneClaim, ParsedLog, parse_log,
};
pub use record::{EloCell, GameOutcome, GameRecord, PlayerEntry, PlayerOutcome};
pub use summary::{SortKey, SummaryRow, retain_played, sort_rows};

/// Trait for abstracting where game records and logs come from.
/// Platform-specific implementations should provide this
pub trait GameSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every game record, with logs attached where available
    ///
    /// # Errors
    ///
    /// Returns an error if the records or logs cannot be read or decoded.
    fn load_games(&self) -> Result<GameSet, Self::Error>;
}
