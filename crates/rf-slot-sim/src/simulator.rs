//! Simulation loop and parallel batch runner

use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rf_slot_math::{ConfigError, FreeSpinState, SlotConfig, SlotResult, SpinEngine};

use crate::config::SimulationConfig;
use crate::ledger::{RunStatus, SimulationResult, SpinResult};
use crate::progress::{BatchMonitor, CancellationToken, ProgressCallback, ProgressUpdate};

/// Ledger slots reserved up front; longer runs grow from there
const MAX_PREALLOCATED_SPINS: u64 = 1 << 24;

/// Thread count for batch runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelConfig {
    pub threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
        }
    }
}

impl ParallelConfig {
    /// Set max parallel runs
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

/// Plays a validated ruleset at volume.
///
/// Every run owns its RNG, free spin state and ledger, so one simulator can
/// serve any number of concurrent runs.
#[derive(Debug, Clone)]
pub struct Simulator {
    engine: SpinEngine,
}

impl Simulator {
    pub fn new(engine: SpinEngine) -> Self {
        Self { engine }
    }

    /// Validate a ruleset and wrap its engine
    pub fn from_config(config: &SlotConfig) -> Result<Self, ConfigError> {
        config.build().map(Self::new)
    }

    pub fn engine(&self) -> &SpinEngine {
        &self.engine
    }

    /// Run to completion without progress reporting
    pub fn run(&self, config: &SimulationConfig) -> SlotResult<SimulationResult> {
        self.run_with(config, None, None)
    }

    /// Run with optional progress callback and cancellation.
    ///
    /// Cancellation is polled before each spin and never consumes randomness,
    /// so a cancelled ledger is an exact prefix of the uncancelled one.
    pub fn run_with(
        &self,
        config: &SimulationConfig,
        mut progress: Option<&mut ProgressCallback<'_>>,
        cancel: Option<&CancellationToken>,
    ) -> SlotResult<SimulationResult> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = FreeSpinState::new();
        let interval = config.effective_progress_interval();
        let base_bet = config.base_bet;

        log::info!(
            "Simulation started: {} spins, bet {}, seed {}",
            config.spins,
            base_bet,
            seed
        );

        let start = Instant::now();
        let mut spins = Vec::with_capacity(config.spins.min(MAX_PREALLOCATED_SPINS) as usize);
        let mut update = ProgressUpdate {
            completed: 0,
            requested: config.spins,
            total_wagered: 0.0,
            total_won: 0.0,
        };
        let mut free_spin_triggers = 0u64;
        let mut last_reported = 0u64;
        let mut status = RunStatus::Completed;

        for spin_index in 0..config.spins {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                status = RunStatus::Cancelled;
                break;
            }

            let meta = self.engine.play(&mut rng, &mut state, base_bet)?;
            let spin = SpinResult::from_meta(spin_index, base_bet, &meta);

            update.completed += 1;
            update.total_wagered += spin.bet;
            update.total_won += spin.win;
            if spin.triggered {
                free_spin_triggers += 1;
            }
            spins.push(spin);

            if update.completed % interval == 0 {
                if let Some(callback) = progress.as_deref_mut() {
                    callback(&update);
                }
                last_reported = update.completed;
            }
        }

        if last_reported != update.completed {
            if let Some(callback) = progress.as_deref_mut() {
                callback(&update);
            }
        }

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match status {
            RunStatus::Completed => log::info!(
                "Simulation finished: {} spins in {} ms, RTP {}",
                update.completed,
                elapsed_ms,
                update
                    .rtp()
                    .map_or_else(|| "n/a".to_string(), |rtp| format!("{:.4}", rtp))
            ),
            RunStatus::Cancelled => log::warn!(
                "Simulation cancelled after {} of {} spins",
                update.completed,
                config.spins
            ),
        }
        if state.is_free() {
            log::debug!(
                "Run ended inside free spins with {} remaining",
                state.remaining_spins
            );
        }

        Ok(SimulationResult {
            spins,
            spins_requested: config.spins,
            spins_completed: update.completed,
            status,
            elapsed_ms,
            seed,
            base_bet,
            free_spin_triggers,
        })
    }

    /// Independent runs in parallel, results in input order
    pub fn run_batch(
        &self,
        configs: &[SimulationConfig],
        parallel: &ParallelConfig,
    ) -> Vec<SlotResult<SimulationResult>> {
        let monitor = BatchMonitor::new(configs.len());
        self.run_batch_monitored(configs, parallel, &monitor, &CancellationToken::new())
    }

    /// Parallel runs reporting into `monitor`, all stopped by one `cancel`
    pub fn run_batch_monitored(
        &self,
        configs: &[SimulationConfig],
        parallel: &ParallelConfig,
        monitor: &BatchMonitor,
        cancel: &CancellationToken,
    ) -> Vec<SlotResult<SimulationResult>> {
        log::info!(
            "Batch of {} runs on {} threads",
            configs.len(),
            parallel.threads
        );

        let run_all = || {
            configs
                .par_iter()
                .enumerate()
                .map(|(i, config)| {
                    let mut report = |update: &ProgressUpdate| monitor.record(i, *update);
                    self.run_with(config, Some(&mut report), Some(cancel))
                })
                .collect()
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(parallel.threads)
            .build()
        {
            Ok(pool) => pool.install(run_all),
            Err(e) => {
                log::warn!("Falling back to the global thread pool: {}", e);
                run_all()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator() -> Simulator {
        Simulator::from_config(&SlotConfig::standard_5x3()).unwrap()
    }

    #[test]
    fn test_run_fills_ledger_in_order() {
        let result = simulator()
            .run(&SimulationConfig::new(2_000, 1.0).with_seed(3))
            .unwrap();

        assert!(result.is_complete());
        assert_eq!(result.spins.len(), 2_000);
        assert_eq!(result.spins_completed, 2_000);
        assert_eq!(result.seed, 3);
        assert!(result.spins.iter().enumerate().all(|(i, s)| s.spin_index == i as u64));
        assert!(result.spins.iter().all(|s| s.bet == 1.0 || s.bet == 0.0));
    }

    #[test]
    fn test_zero_spins_rejected() {
        let result = simulator().run(&SimulationConfig::new(0, 1.0));
        assert!(matches!(
            result,
            Err(rf_slot_math::SlotError::Config(ConfigError::InvalidSpinCount))
        ));
    }

    #[test]
    fn test_random_seed_is_recorded_and_replayable() {
        let sim = simulator();
        let first = sim.run(&SimulationConfig::new(300, 1.0)).unwrap();
        let replay = sim
            .run(&SimulationConfig::new(300, 1.0).with_seed(first.seed))
            .unwrap();
        assert_eq!(first.spins, replay.spins);
    }

    #[test]
    fn test_pre_cancelled_run_is_empty() {
        let token = CancellationToken::new();
        token.cancel();
        let result = simulator()
            .run_with(&SimulationConfig::new(100, 1.0).with_seed(1), None, Some(&token))
            .unwrap();
        assert_eq!(result.status, RunStatus::Cancelled);
        assert!(result.spins.is_empty());
        assert_eq!(result.spins_completed, 0);
    }

    #[test]
    fn test_parallel_config() {
        assert!(ParallelConfig::default().threads >= 1);
        assert_eq!(ParallelConfig::default().with_threads(0).threads, 1);
    }
}
