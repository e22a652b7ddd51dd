use serde::Deserialize;
use std::fmt;

use crate::error::{Result, UnloadError};

/// Trade flow direction as reported by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Import,
    Export,
}

impl Direction {
    /// Parse the portal's two-letter direction code.
    pub fn parse(code: &str) -> Result<Self> {
        match code.trim() {
            "ИМ" => Ok(Self::Import),
            "ЭК" => Ok(Self::Export),
            other => Err(UnloadError::UnknownDirection(other.to_string())),
        }
    }

    /// Fixed integer encoding written to the master store.
    pub fn code(self) -> i64 {
        match self {
            Self::Import => 1,
            Self::Export => 2,
        }
    }

    /// The portal's two-letter code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Import => "ИМ",
            Self::Export => "ЭК",
        }
    }
}

/// The three additive measures carried by every record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measures {
    /// Monetary value.
    pub value: f64,
    /// Net weight.
    pub net_weight: f64,
    /// Quantity in supplementary units.
    pub quantity: f64,
}

impl Measures {
    /// Add another record's measures to the running totals.
    pub fn add(&mut self, other: Measures) {
        self.value += other.value;
        self.net_weight += other.net_weight;
        self.quantity += other.quantity;
    }
}

/// One raw artifact row, every field still text.
///
/// Field names follow the artifact's column header; the measure columns carry
/// locale-formatted decimals with a comma fraction separator.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatRow {
    pub period: String,
    #[serde(rename = "napr")]
    pub direction: String,
    #[serde(rename = "strana")]
    pub country: String,
    #[serde(rename = "tnved")]
    pub classification_code: String,
    #[serde(rename = "Stoim")]
    pub value: String,
    #[serde(rename = "Netto")]
    pub net_weight: String,
    #[serde(rename = "Kol")]
    pub quantity: String,
}

/// A normalized record: measures summed over the unique
/// (period, direction, country, classification code) key.
#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub period: String,
    pub direction: Direction,
    /// Classification-system country code, e.g. `"643"`.
    pub country: String,
    /// 10-digit commodity classification code (padding happens downstream).
    pub classification_code: String,
    pub measures: Measures,
}

/// One row of the long-form dataset: annotated and tagged with a
/// granularity depth.
#[derive(Debug, Clone)]
pub struct StatRow {
    pub period: String,
    pub direction: Direction,
    pub country: String,
    /// Country-group annotation; `None` when the country has no dictionary
    /// entry.
    pub country_group: Option<String>,
    /// Branch annotation derived from the 4-digit code prefix; `None` on a
    /// dictionary miss.
    pub branch: Option<String>,
    /// Classification code truncated to `granularity_depth` digits.
    pub classification_code: String,
    pub measures: Measures,
    /// Number of leading code digits this row represents: 2, 4, 6 or 10.
    pub granularity_depth: u8,
}

/// A categorical cell after encoding: a dictionary code, or the original
/// label passed through when the dictionary has no entry for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Coded {
    Code(i64),
    Label(String),
}

impl Coded {
    /// `true` when the value was resolved to a dictionary code.
    pub fn is_code(&self) -> bool {
        matches!(self, Self::Code(_))
    }
}

impl fmt::Display for Coded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

/// Final master-store row with categorical columns encoded.
#[derive(Debug, Clone)]
pub struct EncodedRow {
    pub period: Coded,
    pub direction: i64,
    pub country: Coded,
    pub country_group: Option<Coded>,
    pub branch: Option<Coded>,
    pub classification_code: String,
    pub measures: Measures,
    pub granularity_depth: u8,
}
