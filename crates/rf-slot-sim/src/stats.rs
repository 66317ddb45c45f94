//! Statistics over a simulation ledger
//!
//! Everything here is a pure function of the ledger: computing twice gives
//! the same numbers, and a ledger prefix is as valid an input as a full run.

use rf_slot_math::{ConfigError, SpinMode};
use serde::{Deserialize, Serialize};

use crate::ledger::{SimulationResult, SpinResult};

/// z for a two-sided 95% interval
const Z_95: f64 = 1.959_963_984_540_054;

// ═══════════════════════════════════════════════════════════════════════════════
// RUNNING MOMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Single-pass mean and variance (Welford)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Population variance
    pub fn variance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.m2 / self.count as f64)
    }

    /// Sample variance (n - 1)
    pub fn sample_variance(&self) -> Option<f64> {
        (self.count > 1).then(|| self.m2 / (self.count - 1) as f64)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISTRIBUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Bucket lower edges, in multiples of the base bet.
///
/// `n` edges make `n` buckets: `[e0, e1)`, …, `[e(n-1), ∞)`. Values below
/// `e0` are counted separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct DistributionConfig {
    edges: Vec<f64>,
}

impl DistributionConfig {
    /// Edges must be finite and strictly ascending
    pub fn from_edges(edges: Vec<f64>) -> Result<Self, ConfigError> {
        if edges.is_empty() {
            return Err(ConfigError::InvalidBuckets("at least one edge is required"));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(ConfigError::InvalidBuckets("edges must be finite"));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::InvalidBuckets("edges must be strictly ascending"));
        }
        Ok(Self { edges })
    }

    /// `count` buckets of equal `width` starting at `start`
    pub fn linear(start: f64, width: f64, count: usize) -> Result<Self, ConfigError> {
        if !(width.is_finite() && width > 0.0) {
            return Err(ConfigError::InvalidBuckets("width must be positive"));
        }
        Self::from_edges((0..count).map(|i| start + width * i as f64).collect())
    }

    /// `count` edges spaced geometrically from `min` to `max` inclusive
    pub fn logarithmic(min: f64, max: f64, count: usize) -> Result<Self, ConfigError> {
        if !(min > 0.0 && max > min) {
            return Err(ConfigError::InvalidBuckets("need 0 < min < max"));
        }
        if count < 2 {
            return Err(ConfigError::InvalidBuckets("need at least two edges"));
        }
        let ratio = (max / min).ln() / (count - 1) as f64;
        let mut edges: Vec<f64> = (0..count).map(|i| min * (ratio * i as f64).exp()).collect();
        edges[count - 1] = max;
        Self::from_edges(edges)
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bucket for a value, None below the first edge
    #[inline]
    pub fn bucket_of(&self, value: f64) -> Option<usize> {
        self.edges.partition_point(|&e| e <= value).checked_sub(1)
    }
}

impl Default for DistributionConfig {
    /// 0×, 1×, 2×, 5×, 10×, 20×, 50×, 100×, 500×, 1000× bet
    fn default() -> Self {
        Self {
            edges: vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 500.0, 1000.0],
        }
    }
}

impl TryFrom<Vec<f64>> for DistributionConfig {
    type Error = ConfigError;

    fn try_from(edges: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_edges(edges)
    }
}

impl From<DistributionConfig> for Vec<f64> {
    fn from(config: DistributionConfig) -> Self {
        config.edges
    }
}

/// One histogram bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub lower: f64,
    /// None for the open-ended top bucket
    pub upper: Option<f64>,
    pub count: u64,
}

/// Win-size histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDistribution {
    /// Spins below the first edge
    pub below: u64,
    pub buckets: Vec<Bucket>,
    pub total: u64,
}

impl OutcomeDistribution {
    fn empty(config: &DistributionConfig) -> Self {
        let edges = config.edges();
        Self {
            below: 0,
            buckets: edges
                .iter()
                .enumerate()
                .map(|(i, &lower)| Bucket {
                    lower,
                    upper: edges.get(i + 1).copied(),
                    count: 0,
                })
                .collect(),
            total: 0,
        }
    }

    #[inline]
    fn add(&mut self, config: &DistributionConfig, multiple: f64) {
        match config.bucket_of(multiple) {
            Some(i) => self.buckets[i].count += 1,
            None => self.below += 1,
        }
        self.total += 1;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATISTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Two-sided confidence interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Aggregate metrics of a ledger. Ratios with a zero denominator are None.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_spins: u64,
    pub paid_spins: u64,
    pub free_spins: u64,
    pub total_wagered: f64,
    pub total_won: f64,
    pub base_win: f64,
    pub free_win: f64,
    /// Return to player (total won / total wagered)
    pub rtp: Option<f64>,
    pub hit_count: u64,
    /// Winning spins / all spins
    pub hit_frequency: Option<f64>,
    pub mean_win: Option<f64>,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
    pub max_win: f64,
    /// Max win in multiples of the base bet
    pub max_win_multiple: Option<f64>,
    pub free_spin_triggers: u64,
    /// Triggers per paid spin
    pub trigger_frequency: Option<f64>,
    /// 95% interval on RTP from per-paid-spin returns, bonus wins folded
    /// into the spin that triggered them
    pub rtp_confidence: Option<ConfidenceInterval>,
    pub distribution: OutcomeDistribution,
}

impl Statistics {
    /// Statistics of a whole run
    pub fn compute(result: &SimulationResult, distribution: &DistributionConfig) -> Self {
        Self::from_spins(&result.spins, result.base_bet, distribution)
    }

    /// Statistics of any run or prefix, bucketed by win ÷ `base_bet`
    pub fn from_spins(spins: &[SpinResult], base_bet: f64, distribution: &DistributionConfig) -> Self {
        let mut wins = RunningStats::new();
        let mut returns = RunningStats::new();
        let mut histogram = OutcomeDistribution::empty(distribution);

        let mut paid_spins = 0u64;
        let mut total_wagered = 0.0;
        let mut base_win = 0.0;
        let mut free_win = 0.0;
        let mut hit_count = 0u64;
        let mut max_win = 0.0f64;
        let mut free_spin_triggers = 0u64;
        // Return of the current paid spin plus the free spins it led to
        let mut round: Option<(f64, f64)> = None;

        for spin in spins {
            wins.push(spin.win);
            match spin.mode {
                SpinMode::Base => base_win += spin.win,
                SpinMode::Free => free_win += spin.win,
            }
            if spin.is_win() {
                hit_count += 1;
            }
            if spin.triggered {
                free_spin_triggers += 1;
            }
            max_win = max_win.max(spin.win);
            if base_bet > 0.0 {
                histogram.add(distribution, spin.win / base_bet);
            }

            if spin.is_paid() {
                paid_spins += 1;
                total_wagered += spin.bet;
                if let Some((won, bet)) = round.replace((spin.win, spin.bet)) {
                    returns.push(won / bet);
                }
            } else if let Some((won, _)) = round.as_mut() {
                *won += spin.win;
            }
        }
        if let Some((won, bet)) = round {
            returns.push(won / bet);
        }

        let total_spins = spins.len() as u64;
        let total_won = base_win + free_win;
        let ratio = |num: f64, den: f64| (den > 0.0).then(|| num / den);

        let rtp_confidence = match (returns.mean(), returns.sample_variance()) {
            (Some(mean), Some(var)) => {
                let half = Z_95 * (var / returns.count() as f64).sqrt();
                Some(ConfidenceInterval {
                    lower: mean - half,
                    upper: mean + half,
                })
            }
            _ => None,
        };

        let variance = wins.variance();
        Self {
            total_spins,
            paid_spins,
            free_spins: total_spins - paid_spins,
            total_wagered,
            total_won,
            base_win,
            free_win,
            rtp: ratio(total_won, total_wagered),
            hit_count,
            hit_frequency: ratio(hit_count as f64, total_spins as f64),
            mean_win: wins.mean(),
            variance,
            std_dev: variance.map(f64::sqrt),
            max_win,
            max_win_multiple: ratio(max_win, base_bet),
            free_spin_triggers,
            trigger_frequency: ratio(free_spin_triggers as f64, paid_spins as f64),
            rtp_confidence,
            distribution: histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spin(bet: f64, win: f64, mode: SpinMode, triggered: bool) -> SpinResult {
        SpinResult {
            spin_index: 0,
            bet,
            win,
            mode,
            multiplier: 1.0,
            scatter_count: 0,
            triggered,
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::new();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            stats.push(v);
        }
        assert_relative_eq!(stats.mean().unwrap(), 5.0, max_relative = 1e-12);
        assert_relative_eq!(stats.variance().unwrap(), 4.0, max_relative = 1e-12);
        assert_relative_eq!(stats.sample_variance().unwrap(), 32.0 / 7.0, max_relative = 1e-12);
        assert_eq!(RunningStats::new().mean(), None);
    }

    #[test]
    fn test_linear_and_log_edges() {
        let linear = DistributionConfig::linear(0.0, 5.0, 4).unwrap();
        assert_eq!(linear.edges(), &[0.0, 5.0, 10.0, 15.0]);
        assert_eq!(linear.bucket_of(-1.0), None);
        assert_eq!(linear.bucket_of(0.0), Some(0));
        assert_eq!(linear.bucket_of(5.0), Some(1));
        assert_eq!(linear.bucket_of(999.0), Some(3));

        let log = DistributionConfig::logarithmic(1.0, 1000.0, 4).unwrap();
        assert_relative_eq!(log.edges()[1], 10.0, max_relative = 1e-12);
        assert_relative_eq!(log.edges()[2], 100.0, max_relative = 1e-12);
        assert_eq!(log.edges()[3], 1000.0);
    }

    #[test]
    fn test_bad_edges_rejected() {
        assert!(DistributionConfig::from_edges(vec![]).is_err());
        assert!(DistributionConfig::from_edges(vec![1.0, 1.0]).is_err());
        assert!(DistributionConfig::from_edges(vec![0.0, f64::NAN]).is_err());
        assert!(DistributionConfig::linear(0.0, 0.0, 3).is_err());
        assert!(DistributionConfig::logarithmic(0.0, 10.0, 3).is_err());
        assert!(DistributionConfig::logarithmic(1.0, 10.0, 1).is_err());
    }

    #[test]
    fn test_empty_ledger_is_well_defined() {
        let stats = Statistics::from_spins(&[], 1.0, &DistributionConfig::default());
        assert_eq!(stats.total_spins, 0);
        assert_eq!(stats.total_wagered, 0.0);
        assert_eq!(stats.rtp, None);
        assert_eq!(stats.hit_frequency, None);
        assert_eq!(stats.mean_win, None);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.rtp_confidence, None);
        assert_eq!(stats.distribution.total, 0);

        let json = serde_json::to_value(&stats).unwrap();
        assert!(json["rtp"].is_null());
    }

    #[test]
    fn test_aggregates_with_bonus_round() {
        let spins = [
            spin(1.0, 0.0, SpinMode::Base, false),
            spin(1.0, 2.0, SpinMode::Base, true),
            spin(0.0, 4.0, SpinMode::Free, false),
            spin(0.0, 0.0, SpinMode::Free, false),
            spin(1.0, 0.0, SpinMode::Base, false),
        ];
        let stats = Statistics::from_spins(&spins, 1.0, &DistributionConfig::default());

        assert_eq!(stats.total_spins, 5);
        assert_eq!(stats.paid_spins, 3);
        assert_eq!(stats.free_spins, 2);
        assert_eq!(stats.total_wagered, 3.0);
        assert_eq!(stats.total_won, 6.0);
        assert_eq!(stats.base_win, 2.0);
        assert_eq!(stats.free_win, 4.0);
        assert_eq!(stats.rtp, Some(2.0));
        assert_eq!(stats.hit_count, 2);
        assert_eq!(stats.hit_frequency, Some(0.4));
        assert_eq!(stats.max_win, 4.0);
        assert_eq!(stats.max_win_multiple, Some(4.0));
        assert_eq!(stats.free_spin_triggers, 1);
        assert_relative_eq!(stats.trigger_frequency.unwrap(), 1.0 / 3.0);

        // Paid-spin returns are 0, 6, 0: mean 2
        let ci = stats.rtp_confidence.unwrap();
        assert_relative_eq!((ci.lower + ci.upper) / 2.0, 2.0, epsilon = 1e-12);
        assert!(ci.lower < 2.0 && ci.upper > 2.0);
    }

    #[test]
    fn test_distribution_counts_multiples_of_bet() {
        let spins = [
            spin(2.0, 0.0, SpinMode::Base, false),
            spin(2.0, 3.0, SpinMode::Base, false),
            spin(2.0, 30.0, SpinMode::Base, false),
        ];
        let config = DistributionConfig::from_edges(vec![0.0, 1.0, 10.0]).unwrap();
        let stats = Statistics::from_spins(&spins, 2.0, &config);

        let counts: Vec<u64> = stats.distribution.buckets.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1]);
        assert_eq!(stats.distribution.buckets[2].upper, None);
        assert_eq!(stats.distribution.total, 3);
    }

    #[test]
    fn test_idempotent() {
        let spins = [
            spin(1.0, 0.3, SpinMode::Base, false),
            spin(1.0, 0.0, SpinMode::Base, false),
            spin(1.0, 7.1, SpinMode::Base, false),
        ];
        let config = DistributionConfig::default();
        assert_eq!(
            Statistics::from_spins(&spins, 1.0, &config),
            Statistics::from_spins(&spins, 1.0, &config)
        );
    }
}
