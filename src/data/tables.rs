use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

/// Book-ban counts per state
const BUILTIN_BANS: &[(&str, u64)] = &[
    ("Florida", 8837),
    ("Iowa", 3798),
    ("Texas", 3745),
    ("Tennessee", 2016),
    ("Pennsylvania", 737),
    ("Wisconsin", 482),
    ("Missouri", 419),
    ("Utah", 351),
    ("Virginia", 312),
    ("Idaho", 213),
    ("South Carolina", 197),
    ("Georgia", 153),
    ("North Carolina", 137),
    ("Kentucky", 103),
    ("Maine", 97),
    ("New York", 84),
    ("Michigan", 80),
    ("Maryland", 71),
    ("Wyoming", 65),
    ("Oregon", 61),
    ("Alaska", 57),
    ("Oklahoma", 45),
    ("Montana", 43),
    ("Kansas", 38),
    ("Colorado", 28),
    ("North Dakota", 27),
    ("Indiana", 24),
    ("Mississippi", 22),
    ("Minnesota", 19),
    ("Illinois", 7),
    ("Ohio", 7),
    ("South Dakota", 7),
    ("Nebraska", 6),
    ("New Jersey", 6),
    ("Arkansas", 5),
    ("Washington", 5),
    ("California", 3),
    ("Arizona", 2),
    ("Massachusetts", 2),
    ("New Hampshire", 2),
    ("West Virginia", 2),
    ("Louisiana", 1),
    ("Rhode Island", 1),
    ("Vermont", 1),
];

const BUILTIN_FIPS: &[(&str, &str)] = &[
    ("Alabama", "01"),
    ("Alaska", "02"),
    ("Arizona", "04"),
    ("Arkansas", "05"),
    ("California", "06"),
    ("Colorado", "08"),
    ("Connecticut", "09"),
    ("Delaware", "10"),
    ("Florida", "12"),
    ("Georgia", "13"),
    ("Hawaii", "15"),
    ("Idaho", "16"),
    ("Illinois", "17"),
    ("Indiana", "18"),
    ("Iowa", "19"),
    ("Kansas", "20"),
    ("Kentucky", "21"),
    ("Louisiana", "22"),
    ("Maine", "23"),
    ("Maryland", "24"),
    ("Massachusetts", "25"),
    ("Michigan", "26"),
    ("Minnesota", "27"),
    ("Mississippi", "28"),
    ("Missouri", "29"),
    ("Montana", "30"),
    ("Nebraska", "31"),
    ("Nevada", "32"),
    ("New Hampshire", "33"),
    ("New Jersey", "34"),
    ("New Mexico", "35"),
    ("New York", "36"),
    ("North Carolina", "37"),
    ("North Dakota", "38"),
    ("Ohio", "39"),
    ("Oklahoma", "40"),
    ("Oregon", "41"),
    ("Pennsylvania", "42"),
    ("Rhode Island", "44"),
    ("South Carolina", "45"),
    ("South Dakota", "46"),
    ("Tennessee", "47"),
    ("Texas", "48"),
    ("Utah", "49"),
    ("Vermont", "50"),
    ("Virginia", "51"),
    ("Washington", "53"),
    ("West Virginia", "54"),
    ("Wisconsin", "55"),
    ("Wyoming", "56"),
];

/// State name -> book-ban count
#[derive(Clone, Debug, Default)]
pub struct BanTable(HashMap<String, u64>);

impl BanTable {
    pub fn new(entries: impl IntoIterator<Item = (String, u64)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_BANS.iter().map(|&(name, n)| (name.to_string(), n)))
    }

    /// States without data count as zero
    pub fn get(&self, state: &str) -> u64 {
        self.0.get(state).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// State name -> two-digit FIPS code
#[derive(Clone, Debug, Default)]
pub struct FipsTable(HashMap<String, String>);

impl FipsTable {
    /// Codes that aren't two ASCII digits are dropped with a warning
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self(
            entries
                .into_iter()
                .filter(|(state, code)| {
                    let ok = code.len() == 2 && code.bytes().all(|b| b.is_ascii_digit());
                    if !ok {
                        warn!(state = %state, code = %code, "ignoring malformed state FIPS code");
                    }
                    ok
                })
                .collect(),
        )
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_FIPS
                .iter()
                .map(|&(name, code)| (name.to_string(), code.to_string())),
        )
    }

    pub fn get(&self, state: &str) -> Option<&str> {
        self.0.get(state).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only lookup tables handed to the app at startup
#[derive(Clone, Debug)]
pub struct Tables {
    pub bans: BanTable,
    pub fips: FipsTable,
}

/// On-disk override; either table may be omitted to keep the built-in one
#[derive(Debug, Default, Deserialize)]
struct TablesFile {
    #[serde(default)]
    bans: Option<HashMap<String, u64>>,
    #[serde(default)]
    fips: Option<HashMap<String, String>>,
}

impl Tables {
    pub fn builtin() -> Self {
        Self {
            bans: BanTable::builtin(),
            fips: FipsTable::builtin(),
        }
    }

    /// Built-in tables with whatever the JSON file at `path` replaces
    pub fn load(path: &Path) -> Result<Self> {
        let mut bytes = fs::read(path).with_context(|| format!("reading tables from {}", path.display()))?;
        Self::from_json(&mut bytes).with_context(|| format!("parsing tables in {}", path.display()))
    }

    /// simd-json parses in place, hence the mutable buffer
    pub fn from_json(bytes: &mut [u8]) -> Result<Self> {
        let file: TablesFile = simd_json::serde::from_slice(bytes)?;
        let mut tables = Self::builtin();
        if let Some(bans) = file.bans {
            info!(states = bans.len(), "using ban counts from file");
            tables.bans = BanTable::new(bans);
        }
        if let Some(fips) = file.fips {
            info!(states = fips.len(), "using FIPS codes from file");
            tables.fips = FipsTable::new(fips);
        }
        Ok(tables)
    }
}
