//! Dictionary encoding of categorical columns.
//!
//! Replaces period, country, country-group and branch labels with their
//! dictionary codes and applies the fixed direction mapping. A label with no
//! dictionary entry is passed through unchanged and counted as a
//! data-quality signal; the stage never changes row count or measures.

use tracing::warn;
use unload_core::models::{Coded, EncodedRow, StatRow};
use unload_core::reference::{CodeTable, ReferenceSet};

// ── UnencodedCounts ───────────────────────────────────────────────────────────

/// Per-column counters of values left unencoded by a dictionary miss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnencodedCounts {
    pub period: u64,
    pub country: u64,
    pub country_group: u64,
    pub branch: u64,
}

impl UnencodedCounts {
    /// Total misses across all columns.
    pub fn total(&self) -> u64 {
        self.period + self.country + self.country_group + self.branch
    }
}

// ── EncodeOutcome ─────────────────────────────────────────────────────────────

/// Result of the encoding stage.
#[derive(Debug)]
pub struct EncodeOutcome {
    pub rows: Vec<EncodedRow>,
    pub unencoded: UnencodedCounts,
}

// ── encode ────────────────────────────────────────────────────────────────────

/// Encode the long-form dataset against the reference dictionaries.
pub fn encode(rows: Vec<StatRow>, refs: &ReferenceSet) -> EncodeOutcome {
    let mut unencoded = UnencodedCounts::default();

    let encoded: Vec<EncodedRow> = rows
        .into_iter()
        .map(|row| EncodedRow {
            period: lookup(&refs.period_codes, row.period, &mut unencoded.period),
            direction: row.direction.code(),
            country: lookup(&refs.country_codes, row.country, &mut unencoded.country),
            country_group: row
                .country_group
                .map(|g| lookup(&refs.group_codes, g, &mut unencoded.country_group)),
            branch: row
                .branch
                .map(|b| lookup(&refs.branch_codes, b, &mut unencoded.branch)),
            classification_code: row.classification_code,
            measures: row.measures,
            granularity_depth: row.granularity_depth,
        })
        .collect();

    if unencoded.total() > 0 {
        warn!(
            "Dictionary misses left values unencoded: period={}, country={}, country_group={}, branch={}",
            unencoded.period, unencoded.country, unencoded.country_group, unencoded.branch
        );
    }

    EncodeOutcome {
        rows: encoded,
        unencoded,
    }
}

/// Resolve one label against `table`, passing it through on a miss.
fn lookup(table: &CodeTable, label: String, misses: &mut u64) -> Coded {
    match table.get(&label) {
        Some(code) => Coded::Code(code),
        None => {
            *misses += 1;
            Coded::Label(label)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
