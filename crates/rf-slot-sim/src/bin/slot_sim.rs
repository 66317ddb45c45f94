//! slot-sim: run a ruleset at volume and print a JSON summary
//!
//! Usage:
//!   slot-sim --spins 1000000 --seed 42
//!   slot-sim --rules game.yaml --runs 8 --buckets log:0.1:1000:12
//!
//! Progress is logged; set `RUST_LOG=info` to see it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rf_slot_math::SlotConfig;
use rf_slot_sim::{
    BatchMonitor, CancellationToken, DistributionConfig, ParallelConfig, ProgressUpdate, RunStatus,
    SimulationConfig, SimulationResult, Simulator, Statistics,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "slot-sim", about = "Monte Carlo simulator for slot rulesets")]
struct Cli {
    /// Ruleset file (.json, .yaml, .yml); built-in 5×3 preset when omitted
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Spins per run, free spins included
    #[arg(long, default_value_t = 100_000)]
    spins: u64,

    /// Base bet per paid spin
    #[arg(long, default_value_t = 1.0)]
    bet: f64,

    /// Seed of the first run; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Spins between progress reports
    #[arg(long)]
    progress: Option<u64>,

    /// Parallel runs, seeded seed, seed+1, ...
    #[arg(long, default_value_t = 1)]
    runs: u64,

    /// Worker threads for --runs > 1
    #[arg(long)]
    threads: Option<usize>,

    /// linear:<start>:<width>:<count> or log:<min>:<max>:<count>, in bet multiples
    #[arg(long, value_parser = parse_buckets)]
    buckets: Option<DistributionConfig>,
}

#[derive(Serialize)]
struct RunReport {
    seed: u64,
    status: RunStatus,
    spins_requested: u64,
    spins_completed: u64,
    elapsed_ms: u64,
    ended_in_bonus: bool,
    statistics: Statistics,
}

#[derive(Serialize)]
struct Report {
    rules: String,
    base_bet: f64,
    runs: Vec<RunReport>,
}

fn parse_buckets(spec: &str) -> Result<DistributionConfig, String> {
    let parts: Vec<&str> = spec.split(':').collect();
    let [kind, a, b, count] = parts.as_slice() else {
        return Err(format!("expected <kind>:<a>:<b>:<count>, got `{spec}`"));
    };
    let a: f64 = a.parse().map_err(|e| format!("bad number `{a}`: {e}"))?;
    let b: f64 = b.parse().map_err(|e| format!("bad number `{b}`: {e}"))?;
    let count: usize = count.parse().map_err(|e| format!("bad count `{count}`: {e}"))?;

    let config = match *kind {
        "linear" => DistributionConfig::linear(a, b, count),
        "log" => DistributionConfig::logarithmic(a, b, count),
        other => return Err(format!("unknown bucket kind `{other}`")),
    };
    config.map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.runs == 0 {
        bail!("--runs must be at least 1");
    }

    let (rules, slot_config) = match &cli.rules {
        Some(path) => (
            path.display().to_string(),
            SlotConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        ),
        None => ("standard_5x3".to_string(), SlotConfig::standard_5x3()),
    };
    let simulator = Simulator::from_config(&slot_config).context("invalid ruleset")?;
    let buckets = cli.buckets.clone().unwrap_or_default();

    let first_seed = cli.seed.unwrap_or_else(rand::random);
    let configs: Vec<SimulationConfig> = (0..cli.runs)
        .map(|i| {
            let mut config = SimulationConfig::new(cli.spins, cli.bet).with_seed(first_seed.wrapping_add(i));
            config.progress_interval = cli.progress;
            config
        })
        .collect();

    let results = if configs.len() == 1 {
        let mut log_progress = |update: &ProgressUpdate| {
            log::info!(
                "{}/{} spins ({:.0}%), RTP so far {:.4}",
                update.completed,
                update.requested,
                update.fraction() * 100.0,
                update.rtp().unwrap_or(0.0)
            );
        };
        vec![simulator.run_with(&configs[0], Some(&mut log_progress), None)]
    } else {
        run_parallel(&simulator, &configs, &cli)
    };

    let runs = results
        .into_iter()
        .map(|result| {
            let result = result.context("simulation failed")?;
            Ok(report(&result, &buckets))
        })
        .collect::<Result<Vec<_>>>()?;

    let report = Report {
        rules,
        base_bet: cli.bet,
        runs,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_parallel(
    simulator: &Simulator,
    configs: &[SimulationConfig],
    cli: &Cli,
) -> Vec<rf_slot_math::SlotResult<SimulationResult>> {
    let parallel = match cli.threads {
        Some(threads) => ParallelConfig::default().with_threads(threads),
        None => ParallelConfig::default(),
    };
    let monitor = BatchMonitor::new(configs.len());
    let cancel = CancellationToken::new();
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        scope.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(500));
                log::info!("Batch progress: {:.1}%", monitor.overall_fraction() * 100.0);
            }
        });
        let results = simulator.run_batch_monitored(configs, &parallel, &monitor, &cancel);
        done.store(true, Ordering::Relaxed);
        results
    })
}

fn report(result: &SimulationResult, buckets: &DistributionConfig) -> RunReport {
    RunReport {
        seed: result.seed,
        status: result.status,
        spins_requested: result.spins_requested,
        spins_completed: result.spins_completed,
        elapsed_ms: result.elapsed_ms,
        ended_in_bonus: result.ended_in_bonus(),
        statistics: Statistics::compute(result, buckets),
    }
}
