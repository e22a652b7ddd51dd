//! Hierarchical subtotal expansion over the classification code.
//!
//! Pads short codes to the canonical 10 digits, annotates each record with
//! its country group and branch, rolls the 10-digit rows up to 2-, 4- and
//! 6-digit subtotals and unions the four granularities into one long-form
//! dataset tagged with granularity depth.

use std::collections::BTreeMap;

use tracing::debug;
use unload_core::error::{Result, UnloadError};
use unload_core::models::{Direction, Measures, StatRow, TradeRecord};
use unload_core::reference::ReferenceSet;

/// Canonical classification-code length.
pub const FULL_CODE_LEN: usize = 10;

/// Depths the 10-digit rows are rolled up to.
const ROLLUP_DEPTHS: [u8; 3] = [2, 4, 6];

/// Grouping key of a rollup: everything but the measures, with the code
/// truncated to the rollup depth.
type GroupKey = (
    String,
    Direction,
    String,
    Option<String>,
    Option<String>,
    String,
);

/// Pad a classification code to the canonical 10 digits.
///
/// The portal drops the leading zero of chapter-01..09 codes, so 9-digit
/// codes gain one `'0'` on the left. Any other length, or any non-digit
/// character, is a fatal [`UnloadError::InvalidClassificationCode`].
pub fn pad_code(code: &str) -> Result<String> {
    let code = code.trim();
    let all_digits = !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit());
    if !all_digits || !(code.len() == FULL_CODE_LEN - 1 || code.len() == FULL_CODE_LEN) {
        return Err(UnloadError::InvalidClassificationCode(code.to_string()));
    }

    if code.len() == FULL_CODE_LEN - 1 {
        Ok(format!("0{code}"))
    } else {
        Ok(code.to_string())
    }
}

/// Expand normalized records into the annotated long-form dataset.
///
/// The output is the 10-digit rows (depth 10) followed by the 2-, 4- and
/// 6-digit rollups; row order within the output is unspecified. Total row
/// count equals rows(10) + rows(2) + rows(4) + rows(6).
pub fn expand(records: Vec<TradeRecord>, refs: &ReferenceSet) -> Result<Vec<StatRow>> {
    let mut detailed: Vec<StatRow> = Vec::with_capacity(records.len());
    for rec in records {
        let code = pad_code(&rec.classification_code)?;
        let country_group = refs.country_groups.get(&rec.country).map(str::to_string);
        let branch = refs.branches.get(&code[..4]).map(str::to_string);

        detailed.push(StatRow {
            period: rec.period,
            direction: rec.direction,
            country: rec.country,
            country_group,
            branch,
            classification_code: code,
            measures: rec.measures,
            granularity_depth: FULL_CODE_LEN as u8,
        });
    }

    let mut rows = detailed.clone();
    for depth in ROLLUP_DEPTHS {
        rows.extend(roll_up(&detailed, depth));
    }

    debug!(
        "Expanded {} detailed records into {} long-form rows",
        detailed.len(),
        rows.len()
    );
    Ok(rows)
}

/// Sum the 10-digit rows into one row per `depth`-digit prefix group.
///
/// The group carries period, direction, country and both annotations, so an
/// absent annotation forms its own group rather than merging into some
/// sentinel.
fn roll_up(detailed: &[StatRow], depth: u8) -> Vec<StatRow> {
    let mut groups: BTreeMap<GroupKey, Measures> = BTreeMap::new();

    for row in detailed {
        let prefix = row.classification_code[..depth as usize].to_string();
        let key = (
            row.period.clone(),
            row.direction,
            row.country.clone(),
            row.country_group.clone(),
            row.branch.clone(),
            prefix,
        );
        groups.entry(key).or_default().add(row.measures);
    }

    groups
        .into_iter()
        .map(
            |((period, direction, country, country_group, branch, code), measures)| StatRow {
                period,
                direction,
                country,
                country_group,
                branch,
                classification_code: code,
                measures,
                granularity_depth: depth,
            },
        )
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
