//! Row shapes for tabular export (no file I/O here)

use rf_slot_math::SpinMode;
use serde::{Deserialize, Serialize};

use crate::ledger::SimulationResult;
use crate::stats::Statistics;

/// One ledger row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinRow {
    pub spin_index: u64,
    pub bet: f64,
    pub win: f64,
    pub net: f64,
    pub mode: SpinMode,
    pub multiplier: f64,
}

/// Aggregates flattened into one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub total_spins: u64,
    pub paid_spins: u64,
    pub free_spins: u64,
    pub total_wagered: f64,
    pub total_won: f64,
    pub base_win: f64,
    pub free_win: f64,
    pub rtp: Option<f64>,
    pub hit_count: u64,
    pub hit_frequency: Option<f64>,
    pub mean_win: Option<f64>,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
    pub max_win: f64,
    pub max_win_multiple: Option<f64>,
    pub free_spin_triggers: u64,
    pub trigger_frequency: Option<f64>,
    pub rtp_ci_lower: Option<f64>,
    pub rtp_ci_upper: Option<f64>,
}

/// Per-spin rows in spin order
pub fn detail_rows(result: &SimulationResult) -> impl Iterator<Item = SpinRow> + '_ {
    result.spins.iter().map(|spin| SpinRow {
        spin_index: spin.spin_index,
        bet: spin.bet,
        win: spin.win,
        net: spin.net(),
        mode: spin.mode,
        multiplier: spin.multiplier,
    })
}

pub fn summary_row(stats: &Statistics) -> SummaryRow {
    SummaryRow {
        total_spins: stats.total_spins,
        paid_spins: stats.paid_spins,
        free_spins: stats.free_spins,
        total_wagered: stats.total_wagered,
        total_won: stats.total_won,
        base_win: stats.base_win,
        free_win: stats.free_win,
        rtp: stats.rtp,
        hit_count: stats.hit_count,
        hit_frequency: stats.hit_frequency,
        mean_win: stats.mean_win,
        variance: stats.variance,
        std_dev: stats.std_dev,
        max_win: stats.max_win,
        max_win_multiple: stats.max_win_multiple,
        free_spin_triggers: stats.free_spin_triggers,
        trigger_frequency: stats.trigger_frequency,
        rtp_ci_lower: stats.rtp_confidence.map(|ci| ci.lower),
        rtp_ci_upper: stats.rtp_confidence.map(|ci| ci.upper),
    }
}
