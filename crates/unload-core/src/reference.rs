//! Reference-dictionary loading.
//!
//! Every run loads six two-column CSV dictionaries fresh from the reference
//! directory: two annotation tables (name → name) and four code tables
//! (name → integer code).

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, UnloadError};

// ── LookupTable ───────────────────────────────────────────────────────────────

/// A name → name dictionary loaded from a two-column CSV file.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    map: HashMap<String, String>,
}

impl LookupTable {
    /// Load the table from `path`. The first row is a header.
    pub fn load(path: &Path) -> Result<Self> {
        let mut map = HashMap::new();
        for (key, value) in read_two_columns(path)? {
            map.insert(key, value);
        }
        debug!("Loaded {} entries from {}", map.len(), path.display());
        Ok(Self { map })
    }

    /// Look a key up, returning the mapped name when present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ── CodeTable ─────────────────────────────────────────────────────────────────

/// A name → integer-code dictionary loaded from a two-column CSV file.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    map: HashMap<String, i64>,
}

impl CodeTable {
    /// Load the table from `path`, parsing the code column as `i64`.
    ///
    /// A non-integer code is a fatal [`UnloadError::Config`] at load time so
    /// bad dictionaries surface before any data is processed.
    pub fn load(path: &Path) -> Result<Self> {
        let mut map = HashMap::new();
        for (key, value) in read_two_columns(path)? {
            let code: i64 = value.parse().map_err(|_| {
                UnloadError::Config(format!(
                    "{}: code {value:?} for key {key:?} is not an integer",
                    path.display()
                ))
            })?;
            map.insert(key, code);
        }
        debug!("Loaded {} codes from {}", map.len(), path.display());
        Ok(Self { map })
    }

    /// Look a key up, returning the integer code when present.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.map.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ── ReferenceSet ──────────────────────────────────────────────────────────────

/// All dictionaries one pipeline run needs, loaded from conventional file
/// names inside the reference directory.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    /// Country code → country-group name (annotation stage).
    pub country_groups: LookupTable,
    /// 4-digit classification prefix → branch name (annotation stage).
    pub branches: LookupTable,
    /// Country code → integer code (encoding stage).
    pub country_codes: CodeTable,
    /// Country-group name → integer code.
    pub group_codes: CodeTable,
    /// Branch name → integer code.
    pub branch_codes: CodeTable,
    /// Period key → integer code.
    pub period_codes: CodeTable,
}

impl ReferenceSet {
    pub const COUNTRY_GROUPS_FILE: &'static str = "country_groups.csv";
    pub const BRANCHES_FILE: &'static str = "branches.csv";
    pub const COUNTRY_CODES_FILE: &'static str = "country_codes.csv";
    pub const GROUP_CODES_FILE: &'static str = "group_codes.csv";
    pub const BRANCH_CODES_FILE: &'static str = "branch_codes.csv";
    pub const PERIOD_CODES_FILE: &'static str = "periods.csv";

    /// Load all six dictionaries from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            country_groups: LookupTable::load(&dir.join(Self::COUNTRY_GROUPS_FILE))?,
            branches: LookupTable::load(&dir.join(Self::BRANCHES_FILE))?,
            country_codes: CodeTable::load(&dir.join(Self::COUNTRY_CODES_FILE))?,
            group_codes: CodeTable::load(&dir.join(Self::GROUP_CODES_FILE))?,
            branch_codes: CodeTable::load(&dir.join(Self::BRANCH_CODES_FILE))?,
            period_codes: CodeTable::load(&dir.join(Self::PERIOD_CODES_FILE))?,
        })
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Read a headered two-column CSV into (key, value) pairs, trimming both.
fn read_two_columns(path: &Path) -> Result<Vec<(String, String)>> {
    let file = std::fs::File::open(path).map_err(|source| UnloadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    if rdr.headers()?.len() < 2 {
        return Err(UnloadError::Config(format!(
            "{}: expected two columns",
            path.display()
        )));
    }

    let mut pairs = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let key = record.get(0).unwrap_or("").trim();
        let value = record.get(1).unwrap_or("").trim();
        if key.is_empty() {
            continue;
        }
        pairs.push((key.to_string(), value.to_string()));
    }
    Ok(pairs)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
