//! Board model: symbol identity and the reels × rows grid

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Symbol identifier as stored on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

impl From<u32> for SymbolId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A board cell address: (reel, row), reel 0 is leftmost, row 0 is top
pub type Position = (u8, u8);

/// Grid dimensions (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of reels (columns)
    pub reels: u8,
    /// Number of visible rows per reel
    pub rows: u8,
}

impl BoardConfig {
    pub fn new(reels: u8, rows: u8) -> Self {
        Self { reels, rows }
    }

    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self::new(5, 3)
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels as usize * self.rows as usize
    }

    /// Check a coordinate against the grid
    #[inline]
    pub fn contains(&self, (reel, row): Position) -> bool {
        reel < self.reels && row < self.rows
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reels == 0 || self.rows == 0 {
            return Err(ConfigError::InvalidBoard {
                reels: self.reels,
                rows: self.rows,
            });
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// One spin's symbol grid.
///
/// Cells are stored column-major in a flat buffer; serialised as a list of
/// reels, each a list of rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<SymbolId>>", try_from = "Vec<Vec<SymbolId>>")]
pub struct Board {
    reels: u8,
    rows: u8,
    cells: Vec<SymbolId>,
}

impl Board {
    /// Build from reel columns. All columns must have the same height.
    pub fn from_columns(columns: Vec<Vec<SymbolId>>) -> Result<Self, ConfigError> {
        let reels = columns.len();
        let rows = columns.first().map_or(0, Vec::len);
        if reels == 0
            || rows == 0
            || reels > u8::MAX as usize
            || rows > u8::MAX as usize
            || columns.iter().any(|c| c.len() != rows)
        {
            return Err(ConfigError::InvalidBoard {
                reels: reels.min(u8::MAX as usize) as u8,
                rows: rows.min(u8::MAX as usize) as u8,
            });
        }

        Ok(Self {
            reels: reels as u8,
            rows: rows as u8,
            cells: columns.into_iter().flatten().collect(),
        })
    }

    /// Build from a flat column-major buffer sized for `config`
    pub(crate) fn from_cells(config: BoardConfig, cells: Vec<SymbolId>) -> Self {
        debug_assert_eq!(cells.len(), config.total_positions());
        Self {
            reels: config.reels,
            rows: config.rows,
            cells,
        }
    }

    pub fn reels(&self) -> u8 {
        self.reels
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn dimensions(&self) -> BoardConfig {
        BoardConfig::new(self.reels, self.rows)
    }

    /// Symbol at (reel, row), `None` outside the grid
    #[inline]
    pub fn get(&self, (reel, row): Position) -> Option<SymbolId> {
        if reel < self.reels && row < self.rows {
            Some(self.cells[reel as usize * self.rows as usize + row as usize])
        } else {
            None
        }
    }

    /// All symbols on one reel, top to bottom
    pub fn column(&self, reel: u8) -> &[SymbolId] {
        let rows = self.rows as usize;
        let start = reel as usize * rows;
        self.cells.get(start..start + rows).unwrap_or(&[])
    }

    /// Iterate every cell with its position
    pub fn cells(&self) -> impl Iterator<Item = (Position, SymbolId)> + '_ {
        let rows = self.rows as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &s)| (((i / rows) as u8, (i % rows) as u8), s))
    }

    /// Raw column-major buffer
    pub fn as_slice(&self) -> &[SymbolId] {
        &self.cells
    }

    /// Grid of reels
    pub fn to_columns(&self) -> Vec<Vec<SymbolId>> {
        self.cells
            .chunks(self.rows as usize)
            .map(<[SymbolId]>::to_vec)
            .collect()
    }
}

impl From<Board> for Vec<Vec<SymbolId>> {
    fn from(board: Board) -> Self {
        board.to_columns()
    }
}

impl TryFrom<Vec<Vec<SymbolId>>> for Board {
    type Error = ConfigError;

    fn try_from(columns: Vec<Vec<SymbolId>>) -> Result<Self, Self::Error> {
        Self::from_columns(columns)
    }
}
