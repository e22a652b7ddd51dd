//! Reporting periods and period-selection parsing.
//!
//! A period is one calendar month of published statistics. The portal's
//! period filter wants the month spelled out in Russian (`"январь 2024 г."`),
//! while the reference dictionaries key periods by the compact
//! `{month}{year}` form.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::{Result, UnloadError};

/// Month names as the portal spells them in its period filter.
const MONTH_NAMES: [&str; 12] = [
    "январь",
    "февраль",
    "март",
    "апрель",
    "май",
    "июнь",
    "июль",
    "август",
    "сентябрь",
    "октябрь",
    "ноябрь",
    "декабрь",
];

// ── Period ────────────────────────────────────────────────────────────────────

/// One reporting month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    /// Build a period, validating the month number.
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(UnloadError::PeriodParse(format!(
                "month {month} is out of range"
            )));
        }
        Ok(Self { month, year })
    }

    /// The portal's period filter text, e.g. `"январь 2024 г."`.
    pub fn label(&self) -> String {
        format!("{} {} г.", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }

    /// Compact key used in dictionaries and artifact names, e.g. `"12024"`.
    pub fn key(&self) -> String {
        format!("{}{}", self.month, self.year)
    }

    /// The most recent period the portal has published.
    ///
    /// Statistics lag two months behind the calendar.
    pub fn latest_published(today: NaiveDate) -> Self {
        let month = today.month();
        if month > 2 {
            Self {
                month: month - 2,
                year: today.year(),
            }
        } else {
            Self {
                month: month + 10,
                year: today.year() - 1,
            }
        }
    }

    /// The next calendar month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                month: 1,
                year: self.year + 1,
            }
        } else {
            Self {
                month: self.month + 1,
                year: self.year,
            }
        }
    }

    fn ym(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

// ── PeriodSelection ───────────────────────────────────────────────────────────

/// A parsed `--periods` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSelection {
    /// The most recent published period.
    Latest,
    /// One or more explicitly named periods.
    Explicit(Vec<Period>),
    /// An inclusive month range.
    Range(Period, Period),
}

impl PeriodSelection {
    /// Parse a selection string.
    ///
    /// Accepted forms: `latest`, `M.YYYY`, a comma-separated list of
    /// `M.YYYY` items, or an inclusive range `M.YYYY-M.YYYY`.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(UnloadError::PeriodParse("empty selection".to_string()));
        }
        if input.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }

        if let Some((start, end)) = input.split_once('-') {
            return Ok(Self::Range(parse_one(start)?, parse_one(end)?));
        }

        if input.contains(',') {
            let periods = input
                .split(',')
                .map(parse_one)
                .collect::<Result<Vec<_>>>()?;
            return Ok(Self::Explicit(periods));
        }

        Ok(Self::Explicit(vec![parse_one(input)?]))
    }

    /// Resolve the selection into a concrete, ordered period list.
    ///
    /// `today` anchors the `latest` form; an inverted range is a
    /// [`UnloadError::PeriodParse`] error.
    pub fn expand(&self, today: NaiveDate) -> Result<Vec<Period>> {
        match self {
            Self::Latest => Ok(vec![Period::latest_published(today)]),
            Self::Explicit(periods) => Ok(periods.clone()),
            Self::Range(start, end) => {
                if end.ym() < start.ym() {
                    return Err(UnloadError::PeriodParse(format!(
                        "range end {} precedes start {}",
                        end.key(),
                        start.key()
                    )));
                }
                let mut periods = Vec::new();
                let mut current = *start;
                while current.ym() <= end.ym() {
                    periods.push(current);
                    current = current.succ();
                }
                Ok(periods)
            }
        }
    }
}

/// Parse a single `M.YYYY` item.
fn parse_one(item: &str) -> Result<Period> {
    static ITEM_RE: OnceLock<Regex> = OnceLock::new();
    let re = ITEM_RE.get_or_init(|| Regex::new(r"^(\d{1,2})\.(\d{4})$").expect("static regex"));

    let item = item.trim();
    let caps = re
        .captures(item)
        .ok_or_else(|| UnloadError::PeriodParse(format!("expected M.YYYY, got {item:?}")))?;

    let month: u32 = caps[1].parse().expect("digits");
    let year: i32 = caps[2].parse().expect("digits");
    Period::new(month, year)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── Period ────────────────────────────────────────────────────────────────

    #[test]
    fn test_label_formatting() {
        let p = Period::new(1, 2024).unwrap();
        assert_eq!(p.label(), "январь 2024 г.");
        let p = Period::new(12, 2023).unwrap();
        assert_eq!(p.label(), "декабрь 2023 г.");
    }

    #[test]
    fn test_key_has_no_month_padding() {
        assert_eq!(Period::new(1, 2024).unwrap().key(), "12024");
        assert_eq!(Period::new(11, 2024).unwrap().key(), "112024");
    }

    #[test]
    fn test_new_rejects_bad_month() {
        assert!(Period::new(0, 2024).is_err());
        assert!(Period::new(13, 2024).is_err());
    }

    #[test]
    fn test_latest_published_mid_year() {
        let p = Period::latest_published(date(2024, 5, 10));
        assert_eq!(p, Period { month: 3, year: 2024 });
    }

    #[test]
    fn test_latest_published_january_rolls_over() {
        let p = Period::latest_published(date(2024, 1, 10));
        assert_eq!(p, Period { month: 11, year: 2023 });
    }

    #[test]
    fn test_latest_published_february_rolls_over() {
        let p = Period::latest_published(date(2024, 2, 10));
        assert_eq!(p, Period { month: 12, year: 2023 });
    }

    #[test]
    fn test_succ_year_boundary() {
        let p = Period::new(12, 2023).unwrap().succ();
        assert_eq!(p, Period { month: 1, year: 2024 });
    }

    // ── PeriodSelection::parse ────────────────────────────────────────────────

    #[test]
    fn test_parse_latest() {
        assert_eq!(
            PeriodSelection::parse("latest").unwrap(),
            PeriodSelection::Latest
        );
        assert_eq!(
            PeriodSelection::parse("Latest").unwrap(),
            PeriodSelection::Latest
        );
    }

    #[test]
    fn test_parse_single() {
        let sel = PeriodSelection::parse("3.2024").unwrap();
        assert_eq!(
            sel,
            PeriodSelection::Explicit(vec![Period { month: 3, year: 2024 }])
        );
    }

    #[test]
    fn test_parse_list() {
        let sel = PeriodSelection::parse("1.2024, 3.2024").unwrap();
        assert_eq!(
            sel,
            PeriodSelection::Explicit(vec![
                Period { month: 1, year: 2024 },
                Period { month: 3, year: 2024 },
            ])
        );
    }

    #[test]
    fn test_parse_range() {
        let sel = PeriodSelection::parse("11.2023-2.2024").unwrap();
        assert_eq!(
            sel,
            PeriodSelection::Range(
                Period { month: 11, year: 2023 },
                Period { month: 2, year: 2024 },
            )
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PeriodSelection::parse("").is_err());
        assert!(PeriodSelection::parse("2024.1").is_err());
        assert!(PeriodSelection::parse("13.2024").is_err());
        assert!(PeriodSelection::parse("jan 2024").is_err());
    }

    // ── PeriodSelection::expand ───────────────────────────────────────────────

    #[test]
    fn test_expand_latest() {
        let periods = PeriodSelection::Latest.expand(date(2024, 5, 1)).unwrap();
        assert_eq!(periods, vec![Period { month: 3, year: 2024 }]);
    }

    #[test]
    fn test_expand_range_crosses_year() {
        let sel = PeriodSelection::parse("11.2023-2.2024").unwrap();
        let periods = sel.expand(date(2024, 6, 1)).unwrap();
        let keys: Vec<String> = periods.iter().map(Period::key).collect();
        assert_eq!(keys, vec!["112023", "122023", "12024", "22024"]);
    }

    #[test]
    fn test_expand_rejects_inverted_range() {
        let sel = PeriodSelection::parse("3.2024-1.2024").unwrap();
        let err = sel.expand(date(2024, 6, 1)).unwrap_err();
        assert!(matches!(err, UnloadError::PeriodParse(_)));
    }
}
