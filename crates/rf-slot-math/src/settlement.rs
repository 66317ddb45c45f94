//! Per-spin output contract
//!
//! [`SpinPacket`] is the only thing a runtime or the simulator sees of a
//! spin. `visual` and `assets` are carried through untouched.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::board::Board;
use crate::evaluator::{Evaluation, WinningLine};
use crate::free_spins::{FreeSpinState, SpinMode, SpinTransition};

/// Wire format version
pub const PACKET_VERSION: &str = "2";

/// Settlement of one spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementMeta {
    /// Traceability token, see [`outcome_id`]
    pub outcome_id: String,
    /// Mode the spin was played in
    pub phase: SpinMode,
    /// Reported win: raw win × multiplier
    pub win: f64,
    /// Line win + scatter win before multiplier
    pub raw_win: f64,
    pub multiplier: f64,
    pub winning_lines: Vec<WinningLine>,
    pub best_line: Option<WinningLine>,
    pub scatter_count: u16,
    pub scatter_win: f64,
    /// This spin entered free spins
    pub triggered_free_spins: bool,
    /// This spin extended running free spins
    #[serde(default)]
    pub retriggered: bool,
    /// Set on the spin that closes a bonus round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_payout: Option<f64>,
}

impl SettlementMeta {
    /// Win rebuilt from the recorded lines and scatter pay
    pub fn recomputed_win(&self) -> f64 {
        let line_win: f64 = self.winning_lines.iter().map(|l| l.payout).sum();
        (line_win + self.scatter_win) * self.multiplier
    }
}

/// Versioned spin output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinPacket {
    pub version: String,
    pub board: Board,
    pub visual: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<SettlementMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_spin_state: Option<FreeSpinState>,
}

impl SpinPacket {
    /// Reported win, 0 when nothing was settled
    pub fn win(&self) -> f64 {
        self.meta.as_ref().map_or(0.0, |m| m.win)
    }
}

/// Builds [`SpinPacket`]s. Never touches free spin state; the transition
/// must already have been applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementComposer {
    /// Attach a state snapshot to every packet
    pub include_free_spin_state: bool,
}

impl SettlementComposer {
    pub fn new(include_free_spin_state: bool) -> Self {
        Self {
            include_free_spin_state,
        }
    }

    pub fn compose(
        &self,
        board: Board,
        evaluation: Evaluation,
        transition: &SpinTransition,
        state: &FreeSpinState,
        visual: serde_json::Value,
        assets: Option<serde_json::Value>,
    ) -> SpinPacket {
        let meta = self.meta(&board, evaluation, transition);
        SpinPacket {
            version: PACKET_VERSION.to_string(),
            board,
            visual,
            assets,
            meta: Some(meta),
            free_spin_state: self.include_free_spin_state.then(|| state.clone()),
        }
    }

    /// Settlement record alone, without the packet around it
    pub fn meta(&self, board: &Board, evaluation: Evaluation, transition: &SpinTransition) -> SettlementMeta {
        let best_line = evaluation.best_line().cloned();
        SettlementMeta {
            outcome_id: outcome_id(board, transition.phase),
            phase: transition.phase,
            win: transition.win,
            raw_win: evaluation.total_win,
            multiplier: transition.multiplier,
            best_line,
            scatter_count: evaluation.scatter.count,
            scatter_win: evaluation.scatter.payout,
            winning_lines: evaluation.winning_lines,
            triggered_free_spins: transition.triggered,
            retriggered: transition.retriggered,
            bonus_payout: transition.bonus_payout,
        }
    }
}

/// `"{phase}-{16 hex}"` from a SHA-256 over board shape, cells and phase.
///
/// Same board in the same phase gives the same id.
pub fn outcome_id(board: &Board, phase: SpinMode) -> String {
    let mut hasher = Sha256::new();
    hasher.update([board.reels(), board.rows()]);
    for symbol in board.as_slice() {
        hasher.update(symbol.0.to_le_bytes());
    }
    hasher.update(phase.as_str().as_bytes());
    let digest = hasher.finalize();
    format!("{}-{}", phase, hex::encode(&digest[..8]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::SymbolId;
    use crate::evaluator::ScatterOutcome;

    fn board(cells: [u32; 3]) -> Board {
        Board::from_columns(cells.iter().map(|&c| vec![SymbolId(c)]).collect()).unwrap()
    }

    fn line(index: u16, payout: f64) -> WinningLine {
        WinningLine {
            line_index: index,
            positions: vec![(0, 0), (1, 0), (2, 0)],
            symbol: SymbolId(1),
            count: 3,
            payout,
            has_wild: false,
            wild_positions: Vec::new(),
        }
    }

    fn transition(phase: SpinMode, multiplier: f64, raw: f64) -> SpinTransition {
        SpinTransition {
            phase,
            multiplier,
            win: raw * multiplier,
            triggered: false,
            retriggered: false,
            bonus_payout: None,
        }
    }

    #[test]
    fn test_outcome_id_shape() {
        let id = outcome_id(&board([1, 2, 3]), SpinMode::Base);
        assert!(id.starts_with("base-"));
        assert_eq!(id.len(), "base-".len() + 16);
        assert!(id["base-".len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_outcome_id_depends_on_board_and_phase() {
        let a = board([1, 2, 3]);
        assert_eq!(outcome_id(&a, SpinMode::Base), outcome_id(&a.clone(), SpinMode::Base));
        assert_ne!(outcome_id(&a, SpinMode::Base), outcome_id(&board([3, 2, 1]), SpinMode::Base));
        assert_ne!(outcome_id(&a, SpinMode::Base), outcome_id(&a, SpinMode::Free));
    }

    #[test]
    fn test_compose_applies_multiplier_and_picks_best_line() {
        let evaluation = Evaluation {
            winning_lines: vec![line(0, 2.0), line(1, 5.0)],
            scatter: ScatterOutcome {
                count: 2,
                payout: 1.0,
                positions: vec![(0, 0), (2, 0)],
            },
            line_win: 7.0,
            total_win: 8.0,
        };
        let packet = SettlementComposer::new(true).compose(
            board([1, 1, 1]),
            evaluation,
            &transition(SpinMode::Free, 2.0, 8.0),
            &FreeSpinState::default(),
            serde_json::json!({ "theme": "neon" }),
            None,
        );

        let meta = packet.meta.as_ref().unwrap();
        assert_eq!(packet.version, "2");
        assert_eq!(meta.win, 16.0);
        assert_eq!(meta.raw_win, 8.0);
        assert_eq!(meta.recomputed_win(), meta.win);
        assert_eq!(meta.best_line.as_ref().map(|l| l.line_index), Some(1));
        assert_eq!(meta.scatter_count, 2);
        assert!(packet.free_spin_state.is_some());
        assert_eq!(packet.win(), 16.0);
    }

    #[test]
    fn test_packet_wire_shape() {
        let packet = SettlementComposer::new(false).compose(
            board([1, 2, 3]),
            Evaluation {
                winning_lines: Vec::new(),
                scatter: ScatterOutcome::default(),
                line_win: 0.0,
                total_win: 0.0,
            },
            &transition(SpinMode::Base, 1.0, 0.0),
            &FreeSpinState::default(),
            serde_json::Value::Null,
            Some(serde_json::json!({ "bg": "night.png" })),
        );

        let json = serde_json::to_value(&packet).unwrap();
        assert_eq!(json["version"], "2");
        assert_eq!(json["board"], serde_json::json!([[1], [2], [3]]));
        assert_eq!(json["assets"]["bg"], "night.png");
        assert_eq!(json["meta"]["winningLines"], serde_json::json!([]));
        assert!(json["meta"]["bestLine"].is_null());
        assert_eq!(json["meta"]["triggeredFreeSpins"], false);
        assert!(json.get("freeSpinState").is_none());

        let back: SpinPacket = serde_json::from_value(json).unwrap();
        assert_eq!(back, packet);
    }
}
