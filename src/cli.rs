use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tui_bookbans::alloc::FallbackPolicy;

/// Browse US book bans by state, then drill into area-weighted county estimates
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Directory holding the GeoJSON files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// State polygons, relative to the data directory
    #[arg(long, default_value = "us-states.json")]
    pub states: PathBuf,

    /// County polygons keyed by FIPS code, relative to the data directory
    #[arg(long, default_value = "geojson-counties-fips.json")]
    pub counties: PathBuf,

    /// JSON file overriding the built-in ban counts and/or FIPS codes
    #[arg(long)]
    pub tables: Option<PathBuf>,

    /// How to split a state's total when its counties have no area
    #[arg(long, value_enum, default_value_t = Fallback::LargestRemainder)]
    pub fallback: Fallback,

    /// Log destination; the terminal belongs to the map
    #[arg(long, default_value = "bookban-map.log")]
    pub log_file: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Fallback {
    /// Equal weights through the normal apportionment, keeping the total
    LargestRemainder,
    /// round(total / n) each, may drift from the total
    RoundedSplit,
}

impl From<Fallback> for FallbackPolicy {
    fn from(value: Fallback) -> Self {
        match value {
            Fallback::LargestRemainder => FallbackPolicy::LargestRemainder,
            Fallback::RoundedSplit => FallbackPolicy::RoundedEqualSplit,
        }
    }
}

impl Cli {
    pub fn states_path(&self) -> PathBuf {
        self.data_dir.join(&self.states)
    }

    pub fn counties_path(&self) -> PathBuf {
        self.data_dir.join(&self.counties)
    }
}
