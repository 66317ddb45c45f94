//! Error types for the spin engine

use thiserror::Error;

use crate::board::SymbolId;

/// Malformed or self-inconsistent ruleset. Fatal: nothing runs until fixed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid board: {reels} reels × {rows} rows")]
    InvalidBoard { reels: u8, rows: u8 },

    #[error("Symbol table is empty")]
    NoSymbols,

    #[error("Duplicate symbol id {0}")]
    DuplicateSymbol(SymbolId),

    #[error("Unknown symbol id {0} referenced by {1}")]
    UnknownSymbol(SymbolId, &'static str),

    #[error("Symbol {0} has an invalid pay table: {1}")]
    InvalidPayTable(SymbolId, String),

    #[error("Wild {wild} substitutes for non-normal symbol {target}")]
    InvalidSubstitution { wild: SymbolId, target: SymbolId },

    #[error("No paylines configured")]
    NoPaylines,

    #[error("Payline {line} has {actual} cells, board has {expected} reels")]
    LineLength { line: u16, expected: usize, actual: usize },

    #[error("Payline {line} coordinate ({reel}, {row}) is outside the board")]
    LineOutOfBounds { line: u16, reel: u8, row: u8 },

    #[error("Payline {line} does not walk reels left to right")]
    LineNotAscending { line: u16 },

    #[error("Reel set has {actual} reels, board has {expected}")]
    ReelCountMismatch { expected: usize, actual: usize },

    #[error("Reel {0} has no positive weight")]
    ZeroReelWeight(usize),

    #[error("Reel {0} weights sum past u32::MAX")]
    ReelWeightOverflow(usize),

    #[error("Reel strip {0} is empty")]
    EmptyReelStrip(usize),

    #[error("Invalid free spin config: {0}")]
    InvalidFreeSpins(&'static str),

    #[error("Spin count must be positive")]
    InvalidSpinCount,

    #[error("Base bet must be positive and finite, got {0}")]
    InvalidBet(f64),

    #[error("Invalid distribution buckets: {0}")]
    InvalidBuckets(&'static str),

    #[error("Failed to read ruleset: {0}")]
    Read(String),

    #[error("Failed to parse ruleset: {0}")]
    Parse(String),
}

/// Board and ruleset disagree at evaluation time. Indicates a generation or
/// configuration bug, never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Board is {actual_reels}×{actual_rows}, ruleset expects {expected_reels}×{expected_rows}")]
    BoardMismatch {
        expected_reels: u8,
        expected_rows: u8,
        actual_reels: u8,
        actual_rows: u8,
    },

    #[error("Payline {line} has {cells} cells for a {reels}-reel board")]
    LineLength { line: u16, cells: usize, reels: u8 },

    #[error("Payline {line} reads ({reel}, {row}) outside the board")]
    LineOutOfBounds { line: u16, reel: u8, row: u8 },

    #[error("Board holds unknown symbol {0}")]
    UnknownSymbol(SymbolId),
}

/// Engine error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
