//! # rf-slot-sim — Monte Carlo Spin Simulator
//!
//! Drives an `rf-slot-math` [`SpinEngine`](rf_slot_math::SpinEngine) for
//! millions of spins and reduces the resulting ledger to RTP, hit frequency,
//! volatility and a win-size distribution.
//!
//! ## Features
//!
//! - **Reproducible runs**: one ChaCha8 stream per run, seed recorded
//! - **Cooperative control**: throttled progress callback, cancellation token
//! - **Batch runs**: independent seeds in parallel on a rayon pool
//! - **Statistics**: single-pass Welford moments, 95% RTP interval, caller-chosen buckets
//!
//! ## Example
//!
//! ```no_run
//! use rf_slot_math::SlotConfig;
//! use rf_slot_sim::{DistributionConfig, SimulationConfig, Simulator, Statistics};
//!
//! let simulator = Simulator::from_config(&SlotConfig::standard_5x3())?;
//! let result = simulator.run(&SimulationConfig::quick().with_seed(42))?;
//! let stats = Statistics::compute(&result, &DistributionConfig::default());
//! println!("RTP: {:?}", stats.rtp);
//! # Ok::<(), rf_slot_math::SlotError>(())
//! ```

pub mod config;
pub mod export;
pub mod ledger;
pub mod progress;
pub mod simulator;
pub mod stats;

pub use config::*;
pub use export::{SpinRow, SummaryRow, detail_rows, summary_row};
pub use ledger::*;
pub use progress::*;
pub use simulator::*;
pub use stats::*;
