//! Response shapes shared by the console, the CLI, and the HTTP API.
//!
//! The JSON field names match the API served by earlier releases, so the
//! bundled web page keeps working.

use serde::Serialize;
use std::str::FromStr;

use pokedex_core::{CatalogIndex, ProgressEntry, ProgressTracker, Record};

/// A record joined with its progress flags.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecordView {
    pub id: u32,
    pub name: String,
    pub type1: String,
    pub type2: String,
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
    pub ability1: String,
    pub ability2: String,
    pub description: String,
    pub encountered: bool,
    pub caught: bool,
}

impl RecordView {
    pub fn new(record: &Record, progress: &ProgressTracker) -> Self {
        let entry = progress.entry(record.id).unwrap_or_default();
        Self {
            id: record.id,
            name: record.name.clone(),
            type1: record.type1.clone(),
            type2: record.type2.clone(),
            hp: record.hp,
            attack: record.attack,
            defense: record.defense,
            sp_attack: record.sp_attack,
            sp_defense: record.sp_defense,
            speed: record.speed,
            ability1: record.ability1.clone(),
            ability2: record.ability2.clone(),
            description: record.description.clone(),
            encountered: entry.encountered,
            caught: entry.caught,
        }
    }
}

/// Aggregate progress, `GET /api/progress`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total_seen: u32,
    pub total_caught: u32,
    pub total: usize,
}

impl ProgressSummary {
    pub fn new(progress: &ProgressTracker) -> Self {
        Self {
            total_seen: progress.total_encountered(),
            total_caught: progress.total_caught(),
            total: progress.capacity(),
        }
    }

    pub fn seen_percent(&self) -> f64 {
        percent(self.total_seen, self.total)
    }

    pub fn caught_percent(&self) -> f64 {
        percent(self.total_caught, self.total)
    }
}

fn percent(count: u32, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Which records a listing includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    All,
    /// Caught records.
    Caught,
    /// Encountered but not yet caught.
    Seen,
    /// Encountered, caught or not.
    Encountered,
}

impl ListFilter {
    pub fn matches(self, entry: ProgressEntry) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Caught => entry.caught,
            ListFilter::Seen => entry.encountered && !entry.caught,
            ListFilter::Encountered => entry.encountered,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ListFilter::All => "ALL POKEMON",
            ListFilter::Caught => "CAUGHT POKEMON",
            ListFilter::Seen => "SEEN POKEMON",
            ListFilter::Encountered => "ENCOUNTERED POKEMON",
        }
    }
}

impl FromStr for ListFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(ListFilter::All),
            "caught" => Ok(ListFilter::Caught),
            "seen" => Ok(ListFilter::Seen),
            "encountered" => Ok(ListFilter::Encountered),
            other => Err(format!(
                "unknown filter '{}': expected all, caught, seen, or encountered",
                other
            )),
        }
    }
}

/// Records matching `filter`, in load order.
pub fn list_records(
    catalog: &CatalogIndex,
    progress: &ProgressTracker,
    filter: ListFilter,
) -> Vec<RecordView> {
    catalog
        .iter()
        .filter(|r| filter.matches(progress.entry(r.id).unwrap_or_default()))
        .map(|r| RecordView::new(r, progress))
        .collect()
}
