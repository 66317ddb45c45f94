//! Symbol definitions and pay tables

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};

use crate::board::SymbolId;
use crate::error::ConfigError;

/// Pay multipliers keyed by run length (lines) or board count (scatters).
///
/// Lookup takes the greatest key not above the count, so `{3: 10}` also pays
/// a run of four unless four is listed separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PayoutTable(pub BTreeMap<u8, f64>);

// Counts arrive as integers from YAML and as strings from JSON object keys,
// and tagged symbol kinds are buffered before they reach us, which loses
// serde_json's numeric-key coercion.
impl<'de> Deserialize<'de> for PayoutTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize, PartialEq, Eq, Hash)]
        #[serde(untagged)]
        enum Count {
            Int(u8),
            Text(String),
        }

        let raw = HashMap::<Count, f64>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(count, pay)| match count {
                Count::Int(n) => Ok((n, pay)),
                Count::Text(text) => text
                    .trim()
                    .parse::<u8>()
                    .map(|n| (n, pay))
                    .map_err(|_| serde::de::Error::custom(format!("invalid pay count `{text}`"))),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }
}

impl PayoutTable {
    /// Table from (count, multiplier) pairs
    pub fn new(entries: &[(u8, f64)]) -> Self {
        Self(entries.iter().copied().collect())
    }

    /// Classic 3/4/5-of-a-kind table
    pub fn three_four_five(pays: [f64; 3]) -> Self {
        Self::new(&[(3, pays[0]), (4, pays[1]), (5, pays[2])])
    }

    /// Multiplier for a count, 0.0 below the minimum payable count
    #[inline]
    pub fn pay(&self, count: u8) -> f64 {
        self.0
            .range(..=count)
            .next_back()
            .map_or(0.0, |(_, &value)| value)
    }

    /// Smallest count that pays anything
    pub fn min_payable(&self) -> Option<u8> {
        self.0
            .iter()
            .find(|&(_, &value)| value > 0.0)
            .map(|(&count, _)| count)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(&self, owner: SymbolId) -> Result<(), ConfigError> {
        for (&count, &value) in &self.0 {
            if count == 0 {
                return Err(ConfigError::InvalidPayTable(owner, "count 0 is not payable".into()));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidPayTable(
                    owner,
                    format!("pay for {count} must be finite and non-negative, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Which normal symbols a wild may stand in for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildSubstitution {
    /// Any normal symbol
    #[default]
    All,
    /// Only the listed normal symbols
    Only(Vec<SymbolId>),
}

impl WildSubstitution {
    #[inline]
    pub fn covers(&self, symbol: SymbolId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(&symbol),
        }
    }
}

/// Symbol category together with the data that category needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolKind {
    /// Pays by contiguous run on a payline
    Normal { pays: PayoutTable },
    /// Substitutes for normal symbols; `pays` applies to all-wild runs
    Wild {
        #[serde(default)]
        substitutes: WildSubstitution,
        #[serde(default)]
        pays: PayoutTable,
    },
    /// Pays by board-wide count, independent of lines
    Scatter { pays: PayoutTable },
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDefinition {
    /// Unique symbol ID
    pub id: SymbolId,
    /// Symbol name (e.g., "HP1", "LP3", "WILD", "SCATTER")
    pub name: String,
    /// Category and payload
    #[serde(flatten)]
    pub kind: SymbolKind,
}

impl SymbolDefinition {
    /// Create a normal paying symbol
    pub fn normal(id: u32, name: impl Into<String>, pays: PayoutTable) -> Self {
        Self {
            id: SymbolId(id),
            name: name.into(),
            kind: SymbolKind::Normal { pays },
        }
    }

    /// Create a wild that substitutes for every normal symbol
    pub fn wild(id: u32, name: impl Into<String>, pays: PayoutTable) -> Self {
        Self {
            id: SymbolId(id),
            name: name.into(),
            kind: SymbolKind::Wild {
                substitutes: WildSubstitution::All,
                pays,
            },
        }
    }

    /// Create a scatter symbol
    pub fn scatter(id: u32, name: impl Into<String>, pays: PayoutTable) -> Self {
        Self {
            id: SymbolId(id),
            name: name.into(),
            kind: SymbolKind::Scatter { pays },
        }
    }

    pub fn is_wild(&self) -> bool {
        matches!(self.kind, SymbolKind::Wild { .. })
    }

    pub fn is_scatter(&self) -> bool {
        matches!(self.kind, SymbolKind::Scatter { .. })
    }

    /// Pay table regardless of category
    pub fn pays(&self) -> &PayoutTable {
        match &self.kind {
            SymbolKind::Normal { pays } | SymbolKind::Scatter { pays } => pays,
            SymbolKind::Wild { pays, .. } => pays,
        }
    }
}

/// Validated symbol table with O(1) lookup by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<SymbolDefinition>", try_from = "Vec<SymbolDefinition>")]
pub struct SymbolTable {
    symbols: Vec<SymbolDefinition>,
    index: HashMap<SymbolId, usize>,
}

impl SymbolTable {
    pub fn new(symbols: Vec<SymbolDefinition>) -> Result<Self, ConfigError> {
        if symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }

        let mut index = HashMap::with_capacity(symbols.len());
        for (i, symbol) in symbols.iter().enumerate() {
            if index.insert(symbol.id, i).is_some() {
                return Err(ConfigError::DuplicateSymbol(symbol.id));
            }
        }

        let table = Self { symbols, index };
        for symbol in &table.symbols {
            symbol.pays().validate(symbol.id)?;
            match &symbol.kind {
                SymbolKind::Normal { pays } | SymbolKind::Scatter { pays } if pays.is_empty() => {
                    return Err(ConfigError::InvalidPayTable(symbol.id, "pay table is empty".into()));
                }
                SymbolKind::Wild {
                    substitutes: WildSubstitution::Only(targets),
                    ..
                } => {
                    for &target in targets {
                        match table.get(target) {
                            None => return Err(ConfigError::UnknownSymbol(target, "wild substitution")),
                            Some(def) if !matches!(def.kind, SymbolKind::Normal { .. }) => {
                                return Err(ConfigError::InvalidSubstitution {
                                    wild: symbol.id,
                                    target,
                                });
                            }
                            Some(_) => {}
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(table)
    }

    /// Get symbol by ID
    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&SymbolDefinition> {
        self.index.get(&id).map(|&i| &self.symbols[i])
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolDefinition> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All normal symbol IDs
    pub fn normal_ids(&self) -> Vec<SymbolId> {
        self.ids_where(|s| matches!(s.kind, SymbolKind::Normal { .. }))
    }

    pub fn wild_ids(&self) -> Vec<SymbolId> {
        self.ids_where(SymbolDefinition::is_wild)
    }

    pub fn scatter_ids(&self) -> Vec<SymbolId> {
        self.ids_where(SymbolDefinition::is_scatter)
    }

    fn ids_where(&self, pred: impl Fn(&SymbolDefinition) -> bool) -> Vec<SymbolId> {
        self.symbols.iter().filter(|s| pred(s)).map(|s| s.id).collect()
    }

    /// Standard set for a classic 5-reel slot.
    /// HP = high paying, LP = low paying; HP1 is the top symbol.
    /// Pays are multiples of the total bet.
    pub fn standard() -> Self {
        let symbols = vec![
            SymbolDefinition::normal(1, "HP1", PayoutTable::three_four_five([1.0, 5.0, 25.0])),
            SymbolDefinition::normal(2, "HP2", PayoutTable::three_four_five([0.75, 3.75, 15.0])),
            SymbolDefinition::normal(3, "HP3", PayoutTable::three_four_five([0.5, 2.5, 10.0])),
            SymbolDefinition::normal(4, "HP4", PayoutTable::three_four_five([0.4, 2.0, 7.5])),
            SymbolDefinition::normal(5, "LP1", PayoutTable::three_four_five([0.25, 1.25, 5.0])),
            SymbolDefinition::normal(6, "LP2", PayoutTable::three_four_five([0.2, 1.0, 4.0])),
            SymbolDefinition::normal(7, "LP3", PayoutTable::three_four_five([0.15, 0.75, 3.0])),
            SymbolDefinition::normal(8, "LP4", PayoutTable::three_four_five([0.1, 0.5, 2.0])),
            SymbolDefinition::normal(9, "LP5", PayoutTable::three_four_five([0.05, 0.25, 1.0])),
            SymbolDefinition::normal(10, "LP6", PayoutTable::three_four_five([0.05, 0.25, 1.0])),
            SymbolDefinition::wild(11, "WILD", PayoutTable::three_four_five([2.5, 10.0, 50.0])),
            SymbolDefinition::scatter(12, "SCATTER", PayoutTable::three_four_five([2.0, 5.0, 20.0])),
        ];

        match Self::new(symbols) {
            Ok(table) => table,
            Err(e) => unreachable!("standard symbol set is valid: {e}"),
        }
    }
}

impl From<SymbolTable> for Vec<SymbolDefinition> {
    fn from(table: SymbolTable) -> Self {
        table.symbols
    }
}

impl TryFrom<Vec<SymbolDefinition>> for SymbolTable {
    type Error = ConfigError;

    fn try_from(symbols: Vec<SymbolDefinition>) -> Result<Self, Self::Error> {
        Self::new(symbols)
    }
}
