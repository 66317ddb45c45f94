//! Free spins: static rules and the bonus-mode state machine
//!
//! The state is an explicitly owned value; callers thread it through every
//! spin of one session. Transitions are pure functions of the current state,
//! the spin's scatter count and its raw win.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Free Spins configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeSpinConfig {
    /// Feature switched on at all
    pub enabled: bool,
    /// Scatters needed to trigger (and retrigger)
    pub trigger_count: u16,
    /// Spins awarded on entry
    pub base_spins: u32,
    /// Can retrigger during feature
    pub retrigger_enabled: bool,
    /// Extra spins on retrigger
    pub retrigger_spins: u32,
    /// Apply `multiplier` to free spin wins
    pub multiplier_enabled: bool,
    /// Free spin win multiplier
    pub multiplier: f64,
}

impl Default for FreeSpinConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trigger_count: 3,
            base_spins: 10,
            retrigger_enabled: true,
            retrigger_spins: 5,
            multiplier_enabled: true,
            multiplier: 2.0,
        }
    }
}

impl FreeSpinConfig {
    /// Feature switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Multiplier that applies while in free mode
    pub fn effective_multiplier(&self) -> f64 {
        if self.multiplier_enabled {
            self.multiplier
        } else {
            1.0
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.trigger_count == 0 {
            return Err(ConfigError::InvalidFreeSpins("trigger_count must be at least 1"));
        }
        if self.base_spins == 0 {
            return Err(ConfigError::InvalidFreeSpins("base_spins must be positive"));
        }
        if self.retrigger_enabled && self.retrigger_spins == 0 {
            return Err(ConfigError::InvalidFreeSpins("retrigger_spins must be positive"));
        }
        if self.multiplier_enabled && !(self.multiplier.is_finite() && self.multiplier > 0.0) {
            return Err(ConfigError::InvalidFreeSpins("multiplier must be positive and finite"));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Game mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinMode {
    #[default]
    Base,
    Free,
}

impl SpinMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Free => "free",
        }
    }
}

impl std::fmt::Display for SpinMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free spins session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeSpinState {
    pub mode: SpinMode,
    pub remaining_spins: u32,
    /// Spins granted in the current bonus, retriggers included
    pub total_spins: u32,
    /// Free spin winnings so far, multiplier applied
    pub accumulated_win: f64,
    pub current_multiplier: f64,
    /// Scatters that (re)triggered on the latest spin, 0 if none
    pub trigger_count: u16,
}

impl Default for FreeSpinState {
    fn default() -> Self {
        Self {
            mode: SpinMode::Base,
            remaining_spins: 0,
            total_spins: 0,
            accumulated_win: 0.0,
            current_multiplier: 1.0,
            trigger_count: 0,
        }
    }
}

/// What happened to the state on one spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinTransition {
    /// Mode the spin was played in
    pub phase: SpinMode,
    /// Multiplier applied to this spin's win
    pub multiplier: f64,
    /// Raw win × multiplier
    pub win: f64,
    /// Base spin entered free mode
    pub triggered: bool,
    /// Free spin extended the bonus
    pub retriggered: bool,
    /// Bonus total, reported once on the spin that ends the round
    pub bonus_payout: Option<f64>,
}

impl FreeSpinState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_free(&self) -> bool {
        self.mode == SpinMode::Free
    }

    /// Multiplier the next spin is played with
    pub fn active_multiplier(&self) -> f64 {
        match self.mode {
            SpinMode::Base => 1.0,
            SpinMode::Free => self.current_multiplier,
        }
    }

    /// Back to base mode, bonus data dropped
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance by one completed spin
    pub fn advance(&mut self, config: &FreeSpinConfig, scatter_count: u16, raw_win: f64) -> SpinTransition {
        let phase = self.mode;
        let multiplier = self.active_multiplier();
        let win = raw_win * multiplier;
        let meets_trigger = config.enabled && scatter_count >= config.trigger_count;

        let mut transition = SpinTransition {
            phase,
            multiplier,
            win,
            triggered: false,
            retriggered: false,
            bonus_payout: None,
        };
        self.trigger_count = 0;

        match phase {
            SpinMode::Base => {
                if meets_trigger {
                    self.mode = SpinMode::Free;
                    self.remaining_spins = config.base_spins;
                    self.total_spins = config.base_spins;
                    self.accumulated_win = 0.0;
                    self.current_multiplier = config.effective_multiplier();
                    self.trigger_count = scatter_count;
                    transition.triggered = true;
                    log::debug!(
                        "Free spins triggered: {} spins at x{}",
                        self.remaining_spins,
                        self.current_multiplier
                    );
                }
            }
            SpinMode::Free => {
                self.remaining_spins = self.remaining_spins.saturating_sub(1);
                self.accumulated_win += win;

                if meets_trigger && config.retrigger_enabled {
                    self.remaining_spins = self.remaining_spins.saturating_add(config.retrigger_spins);
                    self.total_spins = self.total_spins.saturating_add(config.retrigger_spins);
                    self.trigger_count = scatter_count;
                    transition.retriggered = true;
                }

                if self.remaining_spins == 0 {
                    transition.bonus_payout = Some(self.accumulated_win);
                    log::debug!(
                        "Free spins finished after {} spins, paid {:.2}",
                        self.total_spins,
                        self.accumulated_win
                    );
                    self.reset();
                }
            }
        }

        debug_assert!(self.remaining_spins <= self.total_spins);
        debug_assert!(self.mode == SpinMode::Free || self.remaining_spins == 0);
        transition
    }
}
