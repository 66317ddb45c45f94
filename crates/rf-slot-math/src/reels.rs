//! Reel sources and board generation

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::{Error as WeightError, WeightedIndex};
use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardConfig, SymbolId};
use crate::error::ConfigError;
use crate::symbols::SymbolTable;

/// One entry of a reel weight table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolWeight {
    pub symbol: SymbolId,
    pub weight: u32,
}

/// A physical reel strip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReelStrip {
    /// Symbol IDs in order
    pub symbols: Vec<SymbolId>,
}

impl ReelStrip {
    pub fn new(symbols: Vec<SymbolId>) -> Self {
        Self { symbols }
    }

    /// Get symbol at position (wraps around)
    #[inline]
    pub fn symbol_at(&self, position: usize) -> SymbolId {
        self.symbols[position % self.symbols.len()]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Where each reel's symbols come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReelSet {
    /// Every cell drawn independently from its reel's weight table
    Weighted { reels: Vec<Vec<SymbolWeight>> },
    /// One uniform stop per reel, visible window read downward with wraparound
    Strips { reels: Vec<ReelStrip> },
}

impl ReelSet {
    /// Same weight table on every reel, wilds kept off the first reel
    pub fn standard_weighted(symbols: &SymbolTable, reel_count: u8) -> Self {
        const WEIGHTS: [(u32, u32); 12] = [
            (1, 2),
            (2, 3),
            (3, 3),
            (4, 4),
            (5, 4),
            (6, 5),
            (7, 5),
            (8, 6),
            (9, 6),
            (10, 7),
            (11, 4),
            (12, 3),
        ];

        let reels = (0..reel_count)
            .map(|reel| {
                WEIGHTS
                    .iter()
                    .filter(|(id, _)| symbols.contains(SymbolId(*id)))
                    .map(|&(id, weight)| {
                        let is_wild = symbols.get(SymbolId(id)).is_some_and(|s| s.is_wild());
                        SymbolWeight {
                            symbol: SymbolId(id),
                            weight: if reel == 0 && is_wild { 0 } else { weight },
                        }
                    })
                    .collect()
            })
            .collect();

        Self::Weighted { reels }
    }

    pub fn reel_count(&self) -> usize {
        match self {
            Self::Weighted { reels } => reels.len(),
            Self::Strips { reels } => reels.len(),
        }
    }
}

#[derive(Debug, Clone)]
enum ReelSampler {
    Weighted {
        symbols: Vec<SymbolId>,
        index: WeightedIndex<u32>,
    },
    Strip(ReelStrip),
}

/// Draws boards from a validated reel set.
///
/// Output depends only on the RNG stream: the same seed and call sequence
/// reproduce the same boards bit for bit.
#[derive(Debug, Clone)]
pub struct BoardGenerator {
    board: BoardConfig,
    samplers: Vec<ReelSampler>,
}

impl BoardGenerator {
    pub fn new(board: BoardConfig, reels: &ReelSet, symbols: &SymbolTable) -> Result<Self, ConfigError> {
        board.validate()?;
        if reels.reel_count() != board.reels as usize {
            return Err(ConfigError::ReelCountMismatch {
                expected: board.reels as usize,
                actual: reels.reel_count(),
            });
        }

        let samplers = match reels {
            ReelSet::Weighted { reels } => reels
                .iter()
                .enumerate()
                .map(|(reel, table)| {
                    for entry in table {
                        if !symbols.contains(entry.symbol) {
                            return Err(ConfigError::UnknownSymbol(entry.symbol, "reel weights"));
                        }
                    }
                    let index = WeightedIndex::new(table.iter().map(|e| e.weight)).map_err(|e| match e {
                        WeightError::Overflow => ConfigError::ReelWeightOverflow(reel),
                        _ => ConfigError::ZeroReelWeight(reel),
                    })?;
                    Ok(ReelSampler::Weighted {
                        symbols: table.iter().map(|e| e.symbol).collect(),
                        index,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            ReelSet::Strips { reels } => reels
                .iter()
                .enumerate()
                .map(|(reel, strip)| {
                    if strip.is_empty() {
                        return Err(ConfigError::EmptyReelStrip(reel));
                    }
                    if let Some(&unknown) = strip.symbols.iter().find(|&&s| !symbols.contains(s)) {
                        return Err(ConfigError::UnknownSymbol(unknown, "reel strip"));
                    }
                    Ok(ReelSampler::Strip(strip.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Self { board, samplers })
    }

    pub fn board_config(&self) -> BoardConfig {
        self.board
    }

    /// Draw one board
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        let rows = self.board.rows as usize;
        let mut cells = Vec::with_capacity(self.board.total_positions());

        for sampler in &self.samplers {
            match sampler {
                ReelSampler::Weighted { symbols, index } => {
                    for _ in 0..rows {
                        cells.push(symbols[index.sample(rng)]);
                    }
                }
                ReelSampler::Strip(strip) => {
                    let stop = rng.random_range(0..strip.len());
                    for row in 0..rows {
                        cells.push(strip.symbol_at(stop + row));
                    }
                }
            }
        }

        Board::from_cells(self.board, cells)
    }
}
