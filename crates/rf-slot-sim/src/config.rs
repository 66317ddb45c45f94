//! Simulation run configuration

use rf_slot_math::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Spins to play, free spins included
    pub spins: u64,

    /// Stake per paid spin
    pub base_bet: f64,

    /// Random seed for reproducibility (None = random, recorded in the result)
    pub seed: Option<u64>,

    /// Spins between progress callbacks (None = 1% of the run)
    pub progress_interval: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spins: 1_000_000,
            base_bet: 1.0,
            seed: None,
            progress_interval: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(spins: u64, base_bet: f64) -> Self {
        Self {
            spins,
            base_bet,
            ..Default::default()
        }
    }

    /// Short run for smoke checks
    pub fn quick() -> Self {
        Self {
            spins: 10_000,
            ..Default::default()
        }
    }

    /// Builder: set spin count
    pub fn with_spins(mut self, spins: u64) -> Self {
        self.spins = spins;
        self
    }

    /// Builder: set base bet
    pub fn with_bet(mut self, base_bet: f64) -> Self {
        self.base_bet = base_bet;
        self
    }

    /// Builder: set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: set progress cadence
    pub fn with_progress_interval(mut self, spins: u64) -> Self {
        self.progress_interval = Some(spins);
        self
    }

    /// Spins between progress callbacks, never 0
    pub fn effective_progress_interval(&self) -> u64 {
        self.progress_interval.unwrap_or(self.spins / 100).max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spins == 0 {
            return Err(ConfigError::InvalidSpinCount);
        }
        if !(self.base_bet.is_finite() && self.base_bet > 0.0) {
            return Err(ConfigError::InvalidBet(self.base_bet));
        }
        Ok(())
    }
}
