//! Spin engine: generate → evaluate → transition → compose

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::board::Board;
use crate::config::SlotConfig;
use crate::error::{ConfigError, SlotResult};
use crate::evaluator::{Evaluation, LineEvaluator};
use crate::free_spins::{FreeSpinState, SpinTransition};
use crate::reels::BoardGenerator;
use crate::settlement::{SettlementComposer, SettlementMeta, SpinPacket};

/// A validated ruleset ready to spin.
///
/// Construction checks the whole configuration; after that a
/// spin can only fail on a board this engine did not generate itself.
#[derive(Debug, Clone)]
pub struct SpinEngine {
    config: SlotConfig,
    generator: BoardGenerator,
    composer: SettlementComposer,
}

impl SpinEngine {
    pub fn new(config: SlotConfig) -> Result<Self, ConfigError> {
        config.board.validate()?;
        config.lines.validate(config.board)?;
        config.free_spins.validate()?;
        if config.free_spins.enabled && config.symbols.scatter_ids().is_empty() {
            return Err(ConfigError::InvalidFreeSpins("free spins need a scatter symbol"));
        }
        let generator = BoardGenerator::new(config.board, &config.reels, &config.symbols)?;

        log::debug!(
            "Spin engine ready: {}×{} board, {} lines, {} symbols, free spins {}",
            config.board.reels,
            config.board.rows,
            config.lines.len(),
            config.symbols.len(),
            if config.free_spins.enabled { "on" } else { "off" }
        );

        Ok(Self {
            composer: SettlementComposer::new(config.free_spins.enabled),
            generator,
            config,
        })
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    fn evaluator(&self) -> LineEvaluator<'_> {
        LineEvaluator::new(self.config.board, &self.config.lines, &self.config.symbols)
    }

    /// Score a board without touching any state
    pub fn evaluate_board(&self, board: &Board, bet: f64) -> SlotResult<Evaluation> {
        self.evaluator().evaluate(board, bet)
    }

    /// Draw a board and settle it
    pub fn spin<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        state: &mut FreeSpinState,
        bet: f64,
        visual: serde_json::Value,
        assets: Option<serde_json::Value>,
    ) -> SlotResult<SpinPacket> {
        check_bet(bet)?;
        let board = self.generator.generate(rng);
        self.settle(board, state, bet, visual, assets)
    }

    /// Draw a board and settle it to its metadata only.
    ///
    /// Consumes the RNG exactly like [`spin`](Self::spin).
    pub fn play<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        state: &mut FreeSpinState,
        bet: f64,
    ) -> SlotResult<SettlementMeta> {
        check_bet(bet)?;
        let board = self.generator.generate(rng);
        let (evaluation, transition) = self.advance(&board, state, bet)?;
        Ok(self.composer.meta(&board, evaluation, &transition))
    }

    /// Settle a given board: evaluate, advance `state`, build the packet
    pub fn settle(
        &self,
        board: Board,
        state: &mut FreeSpinState,
        bet: f64,
        visual: serde_json::Value,
        assets: Option<serde_json::Value>,
    ) -> SlotResult<SpinPacket> {
        check_bet(bet)?;
        let (evaluation, transition) = self.advance(&board, state, bet)?;
        Ok(self
            .composer
            .compose(board, evaluation, &transition, state, visual, assets))
    }

    fn advance(
        &self,
        board: &Board,
        state: &mut FreeSpinState,
        bet: f64,
    ) -> SlotResult<(Evaluation, SpinTransition)> {
        let evaluation = self.evaluate_board(board, bet)?;
        let transition = state.advance(&self.config.free_spins, evaluation.scatter.count, evaluation.total_win);
        Ok((evaluation, transition))
    }
}

fn check_bet(bet: f64) -> Result<(), ConfigError> {
    if bet.is_finite() && bet > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidBet(bet))
    }
}

/// Live play: one engine, one RNG stream, one free spin state
#[derive(Debug, Clone)]
pub struct SlotSession {
    engine: SpinEngine,
    rng: ChaCha8Rng,
    state: FreeSpinState,
    seed: Option<u64>,
}

impl SlotSession {
    /// Session on an OS-seeded RNG
    pub fn new(engine: SpinEngine) -> Self {
        Self {
            engine,
            rng: ChaCha8Rng::from_os_rng(),
            state: FreeSpinState::new(),
            seed: None,
        }
    }

    /// Reproducible session
    pub fn with_seed(engine: SpinEngine, seed: u64) -> Self {
        Self {
            engine,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state: FreeSpinState::new(),
            seed: Some(seed),
        }
    }

    pub fn spin(&mut self, bet: f64, visual: serde_json::Value) -> SlotResult<SpinPacket> {
        self.engine
            .spin(&mut self.rng, &mut self.state, bet, visual, None)
    }

    pub fn spin_with_assets(
        &mut self,
        bet: f64,
        visual: serde_json::Value,
        assets: serde_json::Value,
    ) -> SlotResult<SpinPacket> {
        self.engine
            .spin(&mut self.rng, &mut self.state, bet, visual, Some(assets))
    }

    pub fn state(&self) -> &FreeSpinState {
        &self.state
    }

    pub fn engine(&self) -> &SpinEngine {
        &self.engine
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Back to base mode; a seeded session also rewinds its RNG
    pub fn reset(&mut self) {
        self.state.reset();
        if let Some(seed) = self.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
    }
}
