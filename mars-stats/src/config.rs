//! Sort keys and filters shared by the aggregation passes.

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::summary::SortKey;

/// Knobs shared by every reduction. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub corporation_sort: SortKey,
    #[serde(default)]
    pub card_sort: SortKey,
    /// Generations the per-generation card table is restricted to.
    #[serde(default = "default_generations")]
    pub generations: Vec<u32>,
    /// Cards need strictly more plays than this to stay in the per-generation table.
    #[serde(default)]
    pub min_plays: u32,
}

fn default_generations() -> Vec<u32> {
    vec![1]
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            corporation_sort: SortKey::default(),
            card_sort: SortKey::default(),
            generations: default_generations(),
            min_plays: 0,
        }
    }
}

impl AnalysisConfig {
    /// Parse a config from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::Config`] when the text is not valid config JSON.
    pub fn from_json(json: &str) -> Result<Self, StatsError> {
        Ok(serde_json::from_str(json)?)
    }
}
