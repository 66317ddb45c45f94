//! Payline patterns

use serde::{Deserialize, Serialize};

use crate::board::{BoardConfig, Position};
use crate::error::ConfigError;

/// A payline: one cell per reel, read left to right
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePattern {
    /// Payline index (0-based)
    pub index: u16,
    /// (reel, row) per reel, reel 0 first
    pub cells: Vec<Position>,
}

impl LinePattern {
    /// Line from row positions per reel (e.g., [1, 0, 0, 0, 1] for a "V" shape)
    pub fn from_rows(index: u16, rows: &[u8]) -> Self {
        Self {
            index,
            cells: rows
                .iter()
                .enumerate()
                .map(|(reel, &row)| (reel as u8, row))
                .collect(),
        }
    }

    /// Create a straight line (same row across all reels)
    pub fn straight(index: u16, row: u8, reel_count: u8) -> Self {
        Self::from_rows(index, &vec![row; reel_count as usize])
    }

    fn validate(&self, board: BoardConfig) -> Result<(), ConfigError> {
        if self.cells.len() != board.reels as usize {
            return Err(ConfigError::LineLength {
                line: self.index,
                expected: board.reels as usize,
                actual: self.cells.len(),
            });
        }
        for (i, &(reel, row)) in self.cells.iter().enumerate() {
            if !board.contains((reel, row)) {
                return Err(ConfigError::LineOutOfBounds {
                    line: self.index,
                    reel,
                    row,
                });
            }
            if reel as usize != i {
                return Err(ConfigError::LineNotAscending { line: self.index });
            }
        }
        Ok(())
    }
}

/// Ordered set of paylines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinesConfig {
    pub lines: Vec<LinePattern>,
}

impl LinesConfig {
    pub fn new(lines: Vec<LinePattern>) -> Self {
        Self { lines }
    }

    /// Lines from row patterns, indexed in order
    pub fn from_row_patterns(patterns: &[&[u8]]) -> Self {
        Self::new(
            patterns
                .iter()
                .enumerate()
                .map(|(i, rows)| LinePattern::from_rows(i as u16, rows))
                .collect(),
        )
    }

    /// Classic 20 paylines for a 5×3 grid
    pub fn standard_20() -> Self {
        Self::from_row_patterns(&[
            // Straight lines
            &[1, 1, 1, 1, 1],
            &[0, 0, 0, 0, 0],
            &[2, 2, 2, 2, 2],
            // V shapes
            &[0, 1, 2, 1, 0],
            &[2, 1, 0, 1, 2],
            // Zigzag
            &[0, 0, 1, 2, 2],
            &[2, 2, 1, 0, 0],
            &[1, 0, 0, 0, 1],
            &[1, 2, 2, 2, 1],
            // W shapes
            &[0, 1, 0, 1, 0],
            &[2, 1, 2, 1, 2],
            &[0, 1, 1, 1, 0],
            &[2, 1, 1, 1, 2],
            // Steps
            &[1, 1, 0, 1, 1],
            &[1, 1, 2, 1, 1],
            &[0, 2, 0, 2, 0],
            &[2, 0, 2, 0, 2],
            &[1, 0, 1, 0, 1],
            &[1, 2, 1, 2, 1],
            &[0, 0, 2, 0, 0],
        ])
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinePattern> {
        self.lines.iter()
    }

    /// Every line non-empty, in bounds and one cell per reel
    pub fn validate(&self, board: BoardConfig) -> Result<(), ConfigError> {
        if self.lines.is_empty() {
            return Err(ConfigError::NoPaylines);
        }
        self.lines.iter().try_for_each(|line| line.validate(board))
    }
}
