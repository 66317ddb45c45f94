//! # rf-slot-math — Spin Evaluation Engine
//!
//! Deterministic per-spin pipeline for line slots: draw a board from weighted
//! reels or strips, score it against paylines and scatters, advance the free
//! spin state machine and settle the result into a versioned [`SpinPacket`].
//!
//! ## Architecture
//!
//! ```text
//! SlotConfig ──validate──▶ SpinEngine
//!                              │
//!     BoardGenerator ──▶ LineEvaluator ──▶ FreeSpinState::advance
//!                                                  │
//!                                                  v
//!                                   SettlementComposer → SpinPacket
//! ```
//!
//! The engine never owns randomness or session state: callers pass an RNG
//! and a [`FreeSpinState`] into every spin. [`SlotSession`] bundles both for
//! live play.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod free_spins;
pub mod lines;
pub mod reels;
pub mod settlement;
pub mod symbols;

pub use board::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use evaluator::*;
pub use free_spins::*;
pub use lines::*;
pub use reels::*;
pub use settlement::*;
pub use symbols::*;
