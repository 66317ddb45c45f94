//! Ruleset configuration and loading

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::BoardConfig;
use crate::engine::SpinEngine;
use crate::error::ConfigError;
use crate::free_spins::FreeSpinConfig;
use crate::lines::LinesConfig;
use crate::reels::ReelSet;
use crate::symbols::SymbolTable;

/// Complete ruleset for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub board: BoardConfig,
    pub symbols: SymbolTable,
    pub lines: LinesConfig,
    pub reels: ReelSet,
    #[serde(default = "FreeSpinConfig::disabled")]
    pub free_spins: FreeSpinConfig,
}

impl SlotConfig {
    /// Classic 5×3, 20 lines, weighted reels, 10 free spins at ×2
    pub fn standard_5x3() -> Self {
        let board = BoardConfig::standard_5x3();
        let symbols = SymbolTable::standard();
        let reels = ReelSet::standard_weighted(&symbols, board.reels);
        Self {
            board,
            lines: LinesConfig::standard_20(),
            reels,
            symbols,
            free_spins: FreeSpinConfig::default(),
        }
    }

    /// Parse and validate a JSON ruleset
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML ruleset
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a ruleset file; `.yaml`/`.yml` is YAML, anything else JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config = if is_yaml {
            Self::from_yaml_str(&text)?
        } else {
            Self::from_json_str(&text)?
        };
        log::debug!("Loaded ruleset from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check cross-references the parts cannot check alone
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build().map(|_| ())
    }

    /// Validate and produce an engine
    pub fn build(&self) -> Result<SpinEngine, ConfigError> {
        SpinEngine::new(self.clone())
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self::standard_5x3()
    }
}
