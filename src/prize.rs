//! Prize catalog and the player's historical record
//!
//! Injected at session start; never mutated by the simulation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeDefinition {
    /// Monetary value of one unit
    pub size: f64,
    /// Units of this prize on offer
    pub count: u32,
    /// Probability of winning one unit on a play (<= 0 means never sampled)
    pub historical_odds: f64,
    /// Units the player has actually won
    #[serde(default)]
    pub historical_win_count: u32,
}

impl PrizeDefinition {
    pub fn new(size: f64, count: u32, historical_odds: f64, historical_win_count: u32) -> Self {
        Self {
            size,
            count,
            historical_odds,
            historical_win_count,
        }
    }

    /// Units still available to be drawn as near-misses
    pub fn unwon_units(&self) -> u32 {
        self.count.saturating_sub(self.historical_win_count)
    }

    /// Odds usable for sampling; degenerate odds are treated as never sampled
    pub fn sampling_odds(&self) -> Option<f64> {
        (self.historical_odds > 0.0).then_some(self.historical_odds)
    }
}

/// The player's prize record (index into `prizes` is the prize index)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrizeHistory {
    pub prizes: Vec<PrizeDefinition>,
}

impl PrizeHistory {
    pub fn new(prizes: Vec<PrizeDefinition>) -> Self {
        Self { prizes }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let history = Self::from_json_str(&json)?;
        log::info!("Loaded {} prize definitions from {}", history.prizes.len(), path.display());
        Ok(history)
    }

    /// Sample record used when no history is supplied
    pub fn sample() -> Self {
        Self::new(vec![
            PrizeDefinition::new(5.0, 20, 0.05, 2),
            PrizeDefinition::new(50.0, 5, 0.01, 1),
            PrizeDefinition::new(1000.0, 1, 0.001, 0),
        ])
    }

    /// Total units the player actually won
    pub fn total_won_units(&self) -> u32 {
        self.prizes.iter().map(|p| p.historical_win_count).sum()
    }

    /// Total value of the units the player actually won
    pub fn total_won_value(&self) -> f64 {
        self.prizes
            .iter()
            .map(|p| p.size * p.historical_win_count as f64)
            .sum()
    }

    /// Rarest positive odds in the catalog
    pub fn lowest_win_odds(&self) -> Option<f64> {
        self.prizes
            .iter()
            .filter_map(PrizeDefinition::sampling_odds)
            .min_by(|a, b| a.total_cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwon_units_saturates() {
        assert_eq!(PrizeDefinition::new(1.0, 3, 0.1, 1).unwon_units(), 2);
        assert_eq!(PrizeDefinition::new(1.0, 1, 0.1, 4).unwon_units(), 0);
    }

    #[test]
    fn test_degenerate_odds_never_sampled() {
        assert_eq!(PrizeDefinition::new(1.0, 3, 0.0, 0).sampling_odds(), None);
        assert_eq!(PrizeDefinition::new(1.0, 3, -0.5, 0).sampling_odds(), None);
    }

    #[test]
    fn test_lowest_win_odds_ignores_degenerate() {
        let history = PrizeHistory::new(vec![
            PrizeDefinition::new(1.0, 1, 0.2, 0),
            PrizeDefinition::new(1.0, 1, 0.0, 0),
            PrizeDefinition::new(1.0, 1, 0.001, 1),
        ]);
        assert_eq!(history.lowest_win_odds(), Some(0.001));
        assert_eq!(PrizeHistory::default().lowest_win_odds(), None);
    }

    #[test]
    fn test_totals() {
        let history = PrizeHistory::sample();
        assert_eq!(history.total_won_units(), 3);
        assert!((history.total_won_value() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_win_count_defaults_to_zero() {
        let history = PrizeHistory::from_json_str(
            r#"{ "prizes": [ { "size": 10.0, "count": 2, "historical_odds": 0.1 } ] }"#,
        )
        .unwrap();
        assert_eq!(history.prizes[0].historical_win_count, 0);
    }
}
