//! Simulation ledger

use rf_slot_math::{SettlementMeta, SpinMode};
use serde::{Deserialize, Serialize};

/// One simulated spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinResult {
    /// 0-based position in the run
    pub spin_index: u64,
    /// Amount wagered (0 on free spins)
    pub bet: f64,
    /// Reported win, multiplier applied
    pub win: f64,
    pub mode: SpinMode,
    pub multiplier: f64,
    pub scatter_count: u16,
    /// Entered free spins on this spin
    pub triggered: bool,
}

impl SpinResult {
    pub(crate) fn from_meta(spin_index: u64, base_bet: f64, meta: &SettlementMeta) -> Self {
        Self {
            spin_index,
            bet: match meta.phase {
                SpinMode::Base => base_bet,
                SpinMode::Free => 0.0,
            },
            win: meta.win,
            mode: meta.phase,
            multiplier: meta.multiplier,
            scatter_count: meta.scatter_count,
            triggered: meta.triggered_free_spins,
        }
    }

    /// Win minus wager
    #[inline]
    pub fn net(&self) -> f64 {
        self.win - self.bet
    }

    pub fn is_win(&self) -> bool {
        self.win > 0.0
    }

    pub fn is_paid(&self) -> bool {
        self.bet > 0.0
    }
}

/// Run outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// All requested spins played
    Completed,
    /// Stopped early on request; the ledger is a valid prefix
    Cancelled,
}

/// Full ledger plus run metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Spins in play order
    pub spins: Vec<SpinResult>,
    pub spins_requested: u64,
    pub spins_completed: u64,
    pub status: RunStatus,
    pub elapsed_ms: u64,
    /// Seed the RNG was started from
    pub seed: u64,
    pub base_bet: f64,
    /// Base spins that entered free spins
    pub free_spin_triggers: u64,
}

impl SimulationResult {
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn total_wagered(&self) -> f64 {
        self.spins.iter().map(|s| s.bet).sum()
    }

    pub fn total_won(&self) -> f64 {
        self.spins.iter().map(|s| s.win).sum()
    }

    /// Total won / total wagered, None when nothing was wagered
    pub fn rtp(&self) -> Option<f64> {
        let wagered = self.total_wagered();
        (wagered > 0.0).then(|| self.total_won() / wagered)
    }

    /// A run still in free spins when it stopped
    pub fn ended_in_bonus(&self) -> bool {
        self.spins.last().is_some_and(|s| s.mode == SpinMode::Free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin(index: u64, bet: f64, win: f64, mode: SpinMode) -> SpinResult {
        SpinResult {
            spin_index: index,
            bet,
            win,
            mode,
            multiplier: 1.0,
            scatter_count: 0,
            triggered: false,
        }
    }

    #[test]
    fn test_net() {
        assert_eq!(spin(0, 1.0, 3.5, SpinMode::Base).net(), 2.5);
        assert_eq!(spin(1, 0.0, 2.0, SpinMode::Free).net(), 2.0);
        assert!(!spin(2, 1.0, 0.0, SpinMode::Base).is_win());
    }

    #[test]
    fn test_result_totals() {
        let result = SimulationResult {
            spins: vec![
                spin(0, 1.0, 0.0, SpinMode::Base),
                spin(1, 1.0, 0.5, SpinMode::Base),
                spin(2, 0.0, 2.5, SpinMode::Free),
            ],
            spins_requested: 3,
            spins_completed: 3,
            status: RunStatus::Completed,
            elapsed_ms: 0,
            seed: 1,
            base_bet: 1.0,
            free_spin_triggers: 1,
        };
        assert_eq!(result.total_wagered(), 2.0);
        assert_eq!(result.total_won(), 3.0);
        assert_eq!(result.rtp(), Some(1.5));
        assert!(result.ended_in_bonus());
    }

    #[test]
    fn test_empty_rtp_is_none() {
        let result = SimulationResult {
            spins: Vec::new(),
            spins_requested: 10,
            spins_completed: 0,
            status: RunStatus::Cancelled,
            elapsed_ms: 0,
            seed: 1,
            base_bet: 1.0,
            free_spin_triggers: 0,
        };
        assert_eq!(result.rtp(), None);
        assert!(!result.is_complete());
    }
}
