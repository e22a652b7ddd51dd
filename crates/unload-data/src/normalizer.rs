//! Raw-row normalization.
//!
//! Coerces the locale-formatted measure fields into numbers and collapses
//! duplicate (period, direction, country, code) rows by summing their
//! measures.

use std::collections::BTreeMap;

use tracing::debug;
use unload_core::error::{Result, UnloadError};
use unload_core::models::{Direction, Measures, RawStatRow, TradeRecord};

/// Grouping key of the normalized stage.
type RecordKey = (String, Direction, String, String);

/// Parse a decimal that uses a comma as the fraction separator.
///
/// Plain integers pass through; anything that still fails after the comma
/// swap is a fatal [`UnloadError::MalformedMeasure`]. There is no zero
/// fallback.
pub fn parse_measure(field: &'static str, raw: &str) -> Result<f64> {
    let cleaned = raw.trim().replace(',', ".");
    cleaned
        .parse::<f64>()
        .map_err(|_| UnloadError::MalformedMeasure {
            field,
            value: raw.to_string(),
        })
}

/// Normalize raw artifact rows into [`TradeRecord`]s.
///
/// Rows sharing the (period, direction, country, classification code) key
/// are summed into one record; the key is unique in the output. Output order
/// is the sorted key order and carries no meaning downstream.
pub fn normalize(rows: &[RawStatRow]) -> Result<Vec<TradeRecord>> {
    let mut groups: BTreeMap<RecordKey, Measures> = BTreeMap::new();

    for row in rows {
        let direction = Direction::parse(&row.direction)?;
        let measures = Measures {
            value: parse_measure("Stoim", &row.value)?,
            net_weight: parse_measure("Netto", &row.net_weight)?,
            quantity: parse_measure("Kol", &row.quantity)?,
        };

        let key = (
            row.period.trim().to_string(),
            direction,
            row.country.trim().to_string(),
            row.classification_code.trim().to_string(),
        );
        groups.entry(key).or_default().add(measures);
    }

    let records: Vec<TradeRecord> = groups
        .into_iter()
        .map(
            |((period, direction, country, classification_code), measures)| TradeRecord {
                period,
                direction,
                country,
                classification_code,
                measures,
            },
        )
        .collect();

    debug!("Normalized {} raw rows into {} records", rows.len(), records.len());
    Ok(records)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
