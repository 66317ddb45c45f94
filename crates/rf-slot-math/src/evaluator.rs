//! Payline and scatter evaluation

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardConfig, Position, SymbolId};
use crate::error::{ConfigError, EvaluationError, SlotResult};
use crate::lines::{LinePattern, LinesConfig};
use crate::symbols::{SymbolKind, SymbolTable};

/// A win result on a single payline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningLine {
    /// Payline index
    pub line_index: u16,
    /// Positions of the matched run (reel, row)
    pub positions: Vec<Position>,
    /// Symbol the run pays as
    pub symbol: SymbolId,
    /// Number of consecutive matching reels from the left
    pub count: u8,
    /// Win amount (pay multiplier × bet)
    pub payout: f64,
    /// At least one cell of the run was a wild
    pub has_wild: bool,
    /// Wild positions included in the run
    pub wild_positions: Vec<Position>,
}

/// Board-wide scatter result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterOutcome {
    /// Scatter cells anywhere on the board
    pub count: u16,
    /// Scatter pay (bet multiple × bet), independent of lines
    pub payout: f64,
    /// Positions of scatters
    pub positions: Vec<Position>,
}

/// Result of evaluating one board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub winning_lines: Vec<WinningLine>,
    pub scatter: ScatterOutcome,
    /// Sum of line payouts, in line order
    pub line_win: f64,
    /// Line win + scatter payout
    pub total_win: f64,
}

impl Evaluation {
    /// Check if this is a winning spin
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    /// Highest-paying line; ties go to the lowest line index
    pub fn best_line(&self) -> Option<&WinningLine> {
        self.winning_lines.iter().reduce(|best, line| {
            if line.payout > best.payout
                || (line.payout == best.payout && line.line_index < best.line_index)
            {
                line
            } else {
                best
            }
        })
    }
}

/// Scores boards against a ruleset
#[derive(Debug, Clone, Copy)]
pub struct LineEvaluator<'a> {
    board: BoardConfig,
    lines: &'a LinesConfig,
    symbols: &'a SymbolTable,
}

impl<'a> LineEvaluator<'a> {
    pub fn new(board: BoardConfig, lines: &'a LinesConfig, symbols: &'a SymbolTable) -> Self {
        Self { board, lines, symbols }
    }

    /// Evaluate wins on a board
    pub fn evaluate(&self, board: &Board, bet: f64) -> SlotResult<Evaluation> {
        if self.lines.is_empty() {
            return Err(ConfigError::NoPaylines.into());
        }
        if board.dimensions() != self.board {
            return Err(EvaluationError::BoardMismatch {
                expected_reels: self.board.reels,
                expected_rows: self.board.rows,
                actual_reels: board.reels(),
                actual_rows: board.rows(),
            }
            .into());
        }

        let mut winning_lines = Vec::new();
        for line in self.lines.iter() {
            if let Some(win) = self.evaluate_line(board, line, bet)? {
                winning_lines.push(win);
            }
        }

        let scatter = self.evaluate_scatter(board, bet)?;
        let line_win: f64 = winning_lines.iter().map(|w| w.payout).sum();

        Ok(Evaluation {
            total_win: line_win + scatter.payout,
            line_win,
            winning_lines,
            scatter,
        })
    }

    fn evaluate_line(&self, board: &Board, line: &LinePattern, bet: f64) -> SlotResult<Option<WinningLine>> {
        if line.cells.len() != board.reels() as usize {
            return Err(EvaluationError::LineLength {
                line: line.index,
                cells: line.cells.len(),
                reels: board.reels(),
            }
            .into());
        }

        let mut cells = Vec::with_capacity(line.cells.len());
        for &pos in &line.cells {
            let symbol = board.get(pos).ok_or(EvaluationError::LineOutOfBounds {
                line: line.index,
                reel: pos.0,
                row: pos.1,
            })?;
            let def = self
                .symbols
                .get(symbol)
                .ok_or(EvaluationError::UnknownSymbol(symbol))?;
            cells.push((pos, symbol, &def.kind));
        }

        // Leading wilds, then the first non-wild decides what the run pays as.
        let leading_wilds = cells
            .iter()
            .take_while(|(_, _, kind)| matches!(kind, SymbolKind::Wild { .. }))
            .count();

        let anchor = cells.get(leading_wilds).and_then(|&(_, symbol, kind)| {
            let substitutable = matches!(kind, SymbolKind::Normal { .. })
                && cells[..leading_wilds]
                    .iter()
                    .all(|&(_, _, wild)| wild_covers(wild, symbol));
            substitutable.then_some(symbol)
        });

        let (symbol, pays, run) = match anchor {
            Some(anchor) => {
                let run = cells
                    .iter()
                    .take_while(|&&(_, symbol, kind)| symbol == anchor || wild_covers(kind, anchor))
                    .count();
                let pays = self.symbols.get(anchor).map(|d| d.pays());
                (anchor, pays, run)
            }
            // Wild-only run: pays on the first wild's own table, if any.
            None if leading_wilds > 0 => {
                let (_, wild, kind) = cells[0];
                let pays = match kind {
                    SymbolKind::Wild { pays, .. } => Some(pays),
                    _ => None,
                };
                (wild, pays, leading_wilds)
            }
            None => return Ok(None),
        };

        let multiplier = pays.map_or(0.0, |p| p.pay(run as u8));
        if multiplier <= 0.0 {
            return Ok(None);
        }

        let matched = &cells[..run];
        let positions: Vec<Position> = matched.iter().map(|&(pos, _, _)| pos).collect();
        let wild_positions: Vec<Position> = matched
            .iter()
            .filter(|(_, _, kind)| matches!(kind, SymbolKind::Wild { .. }))
            .map(|&(pos, _, _)| pos)
            .collect();

        Ok(Some(WinningLine {
            line_index: line.index,
            positions,
            symbol,
            count: run as u8,
            payout: multiplier * bet,
            has_wild: !wild_positions.is_empty(),
            wild_positions,
        }))
    }

    fn evaluate_scatter(&self, board: &Board, bet: f64) -> SlotResult<ScatterOutcome> {
        let mut outcome = ScatterOutcome::default();
        let mut per_symbol: Vec<(SymbolId, u16)> = Vec::new();

        for (pos, symbol) in board.cells() {
            let def = self
                .symbols
                .get(symbol)
                .ok_or(EvaluationError::UnknownSymbol(symbol))?;
            if def.is_scatter() {
                outcome.positions.push(pos);
                match per_symbol.iter_mut().find(|(id, _)| *id == symbol) {
                    Some((_, n)) => *n += 1,
                    None => per_symbol.push((symbol, 1)),
                }
            }
        }

        outcome.count = u16::try_from(outcome.positions.len()).unwrap_or(u16::MAX);
        outcome.payout = per_symbol
            .iter()
            .filter_map(|&(id, n)| self.symbols.get(id).map(|d| d.pays().pay(saturate_count(n))))
            .sum::<f64>()
            * bet;

        Ok(outcome)
    }
}

/// Pay tables are keyed by `u8`; larger counts read the top entry
#[inline]
fn saturate_count(n: u16) -> u8 {
    u8::try_from(n).unwrap_or(u8::MAX)
}

#[inline]
fn wild_covers(kind: &SymbolKind, target: SymbolId) -> bool {
    match kind {
        SymbolKind::Wild { substitutes, .. } => substitutes.covers(target),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{PayoutTable, SymbolDefinition, WildSubstitution};

    const CHERRY: u32 = 1;
    const LEMON: u32 = 2;
    const WILD: u32 = 3;
    const STAR: u32 = 4;

    fn symbols() -> SymbolTable {
        SymbolTable::new(vec![
            SymbolDefinition::normal(CHERRY, "Cherry", PayoutTable::new(&[(3, 10.0)])),
            SymbolDefinition::normal(LEMON, "Lemon", PayoutTable::new(&[(2, 1.0), (3, 4.0)])),
            SymbolDefinition::wild(WILD, "Wild", PayoutTable::new(&[(3, 50.0)])),
            SymbolDefinition::scatter(STAR, "Star", PayoutTable::new(&[(2, 1.0), (3, 5.0)])),
        ])
        .unwrap()
    }

    fn board(columns: &[&[u32]]) -> Board {
        Board::from_columns(
            columns
                .iter()
                .map(|c| c.iter().copied().map(SymbolId).collect())
                .collect(),
        )
        .unwrap()
    }

    fn single_row_lines() -> LinesConfig {
        LinesConfig::from_row_patterns(&[&[0, 0, 0]])
    }

    #[test]
    fn test_three_cherries_pay() {
        let symbols = symbols();
        let lines = single_row_lines();
        let eval = LineEvaluator::new(BoardConfig::new(3, 1), &lines, &symbols)
            .evaluate(&board(&[&[CHERRY], &[CHERRY], &[CHERRY]]), 1.0)
            .unwrap();

        assert_eq!(eval.winning_lines.len(), 1);
        let line = &eval.winning_lines[0];
        assert_eq!(line.count, 3);
        assert_eq!(line.payout, 10.0);
        assert!(!line.has_wild);
        assert_eq!(eval.total_win, 10.0);
    }

    #[test]
    fn test_leading_wild_substitutes() {
        let symbols = symbols();
        let lines = single_row_lines();
        let eval = LineEvaluator::new(BoardConfig::new(3, 1), &lines, &symbols)
            .evaluate(&board(&[&[WILD], &[CHERRY], &[CHERRY]]), 1.0)
            .unwrap();

        let line = &eval.winning_lines[0];
        assert_eq!(line.symbol, SymbolId(CHERRY));
        assert_eq!(line.count, 3);
        assert_eq!(line.payout, 10.0);
        assert!(line.has_wild);
        assert_eq!(line.wild_positions, vec![(0, 0)]);
    }

    #[test]
    fn test_run_stops_at_first_mismatch() {
        let symbols = symbols();
        let lines = single_row_lines();
        let eval = LineEvaluator::new(BoardConfig::new(3, 1), &lines, &symbols)
            .evaluate(&board(&[&[CHERRY], &[LEMON], &[CHERRY]]), 1.0)
            .unwrap();
        assert!(eval.winning_lines.is_empty());
        assert_eq!(eval.total_win, 0.0);
        assert!(eval.best_line().is_none());
    }

    #[test]
    fn test_all_wild_line_pays_wild_table() {
        let symbols = symbols();
        let lines = single_row_lines();
        let eval = LineEvaluator::new(BoardConfig::new(3, 1), &lines, &symbols)
            .evaluate(&board(&[&[WILD], &[WILD], &[WILD]]), 2.0)
            .unwrap();
        let line = &eval.winning_lines[0];
        assert_eq!(line.symbol, SymbolId(WILD));
        assert_eq!(line.payout, 100.0);
        assert_eq!(line.wild_positions.len(), 3);
    }

    #[test]
    fn test_wild_does_not_extend_scatter() {
        let symbols = symbols();
        let lines = single_row_lines();
        let eval = LineEvaluator::new(BoardConfig::new(3, 1), &lines, &symbols)
            .evaluate(&board(&[&[WILD], &[STAR], &[STAR]]), 1.0)
            .unwrap();
        // One wild is below the wild table's minimum; the two stars pay as scatters only.
        assert!(eval.winning_lines.is_empty());
        assert_eq!(eval.scatter.count, 2);
        assert_eq!(eval.scatter.payout, 1.0);
        assert_eq!(eval.total_win, 1.0);
    }

    #[test]
    fn test_restricted_wild_only_covers_listed_symbols() {
        let symbols = SymbolTable::new(vec![
            SymbolDefinition::normal(CHERRY, "Cherry", PayoutTable::new(&[(3, 10.0)])),
            SymbolDefinition::normal(LEMON, "Lemon", PayoutTable::new(&[(3, 4.0)])),
            SymbolDefinition {
                id: SymbolId(WILD),
                name: "Wild".into(),
                kind: SymbolKind::Wild {
                    substitutes: WildSubstitution::Only(vec![SymbolId(LEMON)]),
                    pays: PayoutTable::default(),
                },
            },
        ])
        .unwrap();
        let lines = single_row_lines();
        let evaluator = LineEvaluator::new(BoardConfig::new(3, 1), &lines, &symbols);

        let cherry = evaluator
            .evaluate(&board(&[&[CHERRY], &[WILD], &[CHERRY]]), 1.0)
            .unwrap();
        assert!(cherry.winning_lines.is_empty());

        let lemon = evaluator
            .evaluate(&board(&[&[LEMON], &[WILD], &[LEMON]]), 1.0)
            .unwrap();
        assert_eq!(lemon.total_win, 4.0);
    }

    #[test]
    fn test_best_line_tie_breaks_on_index() {
        let symbols = symbols();
        let lines = LinesConfig::new(vec![
            LinePattern::from_rows(5, &[1, 1, 1]),
            LinePattern::from_rows(2, &[0, 0, 0]),
        ]);
        let eval = LineEvaluator::new(BoardConfig::new(3, 2), &lines, &symbols)
            .evaluate(&board(&[&[CHERRY, CHERRY], &[CHERRY, CHERRY], &[CHERRY, CHERRY]]), 1.0)
            .unwrap();
        assert_eq!(eval.winning_lines.len(), 2);
        assert_eq!(eval.best_line().map(|l| l.line_index), Some(2));
    }

    #[test]
    fn test_scatter_counts_whole_board() {
        let symbols = symbols();
        let lines = LinesConfig::from_row_patterns(&[&[1, 1, 1]]);
        let eval = LineEvaluator::new(BoardConfig::new(3, 2), &lines, &symbols)
            .evaluate(&board(&[&[STAR, LEMON], &[CHERRY, STAR], &[STAR, CHERRY]]), 2.0)
            .unwrap();
        assert_eq!(eval.scatter.count, 3);
        assert_eq!(eval.scatter.positions, vec![(0, 0), (1, 1), (2, 0)]);
        assert_eq!(eval.scatter.payout, 10.0);
    }

    #[test]
    fn test_scatter_count_past_u8_range() {
        let symbols = symbols();
        let lines = LinesConfig::new(vec![LinePattern::straight(0, 0, 16)]);
        let column = [STAR; 16];
        let columns: Vec<&[u32]> = vec![&column[..]; 16];
        let eval = LineEvaluator::new(BoardConfig::new(16, 16), &lines, &symbols)
            .evaluate(&board(&columns), 1.0)
            .unwrap();
        assert_eq!(eval.scatter.count, 256);
        assert_eq!(eval.scatter.positions.len(), 256);
        // Counts above the top key pay the top key
        assert_eq!(eval.scatter.payout, 5.0);
    }

    #[test]
    fn test_scatter_count_sums_symbols_on_large_board() {
        const MOON: u32 = 5;
        let symbols = SymbolTable::new(vec![
            SymbolDefinition::normal(CHERRY, "Cherry", PayoutTable::new(&[(3, 10.0)])),
            SymbolDefinition::scatter(STAR, "Star", PayoutTable::new(&[(3, 5.0)])),
            SymbolDefinition::scatter(MOON, "Moon", PayoutTable::new(&[(3, 2.0)])),
        ])
        .unwrap();
        let lines = LinesConfig::new(vec![LinePattern::straight(0, 0, 16)]);
        let stars = [STAR; 16];
        let moons = [MOON; 16];
        let columns: Vec<&[u32]> = (0..16).map(|i| if i < 8 { &stars[..] } else { &moons[..] }).collect();

        let eval = LineEvaluator::new(BoardConfig::new(16, 16), &lines, &symbols)
            .evaluate(&board(&columns), 1.0)
            .unwrap();
        assert_eq!(eval.scatter.count, 256);
        assert_eq!(eval.scatter.payout, 7.0);
    }

    #[test]
    fn test_dimension_mismatch_is_evaluation_error() {
        let symbols = symbols();
        let lines = single_row_lines();
        let result = LineEvaluator::new(BoardConfig::new(3, 1), &lines, &symbols)
            .evaluate(&board(&[&[CHERRY], &[CHERRY]]), 1.0);
        assert!(matches!(
            result,
            Err(crate::error::SlotError::Evaluation(EvaluationError::BoardMismatch { .. }))
        ));
    }

    #[test]
    fn test_no_lines_is_config_error() {
        let symbols = symbols();
        let lines = LinesConfig::default();
        let result = LineEvaluator::new(BoardConfig::new(3, 1), &lines, &symbols)
            .evaluate(&board(&[&[CHERRY], &[CHERRY], &[CHERRY]]), 1.0);
        assert!(matches!(
            result,
            Err(crate::error::SlotError::Config(ConfigError::NoPaylines))
        ));
    }
}
