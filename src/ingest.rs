//! Catalog ingestion.
//!
//! Reads the catalog CSV (header row, then one record per line) and builds
//! the [`CatalogIndex`]. Quoted fields, `""` escapes, and embedded commas are
//! handled by the `csv` reader; every field is trimmed.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use tracing::{debug, info, warn};

use pokedex_core::{CatalogIndex, Record};

use crate::config::Config;

/// Column order of the catalog CSV.
pub const CSV_HEADER: [&str; 13] = [
    "id",
    "name",
    "type1",
    "type2",
    "hp",
    "attack",
    "defense",
    "sp_attack",
    "sp_defense",
    "speed",
    "ability1",
    "ability2",
    "description",
];

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    type1: String,
    #[serde(default)]
    type2: String,
    hp: u8,
    attack: u8,
    defense: u8,
    sp_attack: u8,
    sp_defense: u8,
    speed: u8,
    ability1: String,
    #[serde(default)]
    ability2: String,
    #[serde(default)]
    description: String,
}

impl CsvRow {
    fn into_record(self, id: u32) -> Record {
        Record {
            id,
            name: self.name,
            type1: self.type1,
            type2: self.type2,
            hp: self.hp,
            attack: self.attack,
            defense: self.defense,
            sp_attack: self.sp_attack,
            sp_defense: self.sp_defense,
            speed: self.speed,
            ability1: self.ability1,
            ability2: self.ability2,
            description: self.description,
        }
    }
}

/// Parses catalog CSV into records, in file order.
///
/// Rows whose id is missing, non-numeric, or zero are skipped. Any other
/// malformed row fails the whole parse.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .context("Failed to read catalog header")?
        .clone();

    let mut records = Vec::new();
    let mut raw = csv::StringRecord::new();
    while reader.read_record(&mut raw)? {
        // Where the record starts; quoted fields may span lines.
        let line = raw.position().map_or(0, |p| p.line());
        let row: CsvRow = raw
            .deserialize(Some(&headers))
            .with_context(|| format!("Malformed catalog row on line {}", line))?;

        match row.id.parse::<u32>() {
            Ok(id) if id > 0 => records.push(row.into_record(id)),
            _ => warn!(line, id = %row.id, "skipping catalog row with invalid id"),
        }
    }

    Ok(records)
}

/// Loads the configured catalog file and builds the index.
pub fn load_catalog(config: &Config) -> Result<CatalogIndex> {
    let path = &config.catalog.path;
    let file = File::open(path)
        .with_context(|| format!("Failed to open catalog file: {}", path.display()))?;

    let records = parse_records(file)
        .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;
    if records.is_empty() {
        bail!("Catalog file contains no records: {}", path.display());
    }

    let index = CatalogIndex::build(records, config.catalog.capacity)
        .with_context(|| format!("Failed to index catalog file: {}", path.display()))?;

    let missing = index.missing_ids();
    if !missing.is_empty() {
        warn!(count = missing.len(), ids = ?missing, "catalog has gaps");
    }
    let shadowed = index.shadowed_names();
    if shadowed > 0 {
        warn!(count = shadowed, "duplicate names are only reachable by id");
    }

    info!(records = index.len(), path = %path.display(), "catalog loaded");
    debug!(capacity = index.capacity(), "catalog capacity");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,name,type1,type2,hp,attack,defense,sp_attack,sp_defense,speed,ability1,ability2,description\n";

    #[test]
    fn test_parse_basic_rows() {
        let csv = format!(
            "{}1,Bulbasaur,Grass,Poison,45,49,49,65,65,45,Overgrow,Chlorophyll,A strange seed was planted on its back at birth.\n\
             4,Charmander,Fire,,39,52,43,60,50,65,Blaze,Solar Power,Obviously prefers hot places.\n",
            HEADER
        );
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Bulbasaur");
        assert_eq!(records[0].type2, "Poison");
        assert_eq!(records[1].id, 4);
        assert_eq!(records[1].type2, "");
        assert_eq!(records[1].secondary_type(), None);
        assert_eq!(records[1].speed, 65);
    }

    #[test]
    fn test_parse_quoted_description() {
        let csv = format!(
            "{}25,Pikachu,Electric,,35,55,40,50,50,90,Static,Lightning Rod,\"When several of these gather, their \"\"electricity\"\" could build.\"\n",
            HEADER
        );
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(
            records[0].description,
            "When several of these gather, their \"electricity\" could build."
        );
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let csv = format!("{}7,Squirtle ,Water,,44,48,65,50,64,43,Torrent,,Shell.  \r\n", HEADER);
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].name, "Squirtle");
        assert_eq!(records[0].description, "Shell.");
    }

    #[test]
    fn test_skips_invalid_ids() {
        let csv = format!(
            "{}0,Missingno,Bird,Normal,33,136,0,6,6,29,,,\n\
             x,Glitch,Normal,,1,1,1,1,1,1,,,\n\
             1,Bulbasaur,Grass,Poison,45,49,49,65,65,45,Overgrow,Chlorophyll,Seed.\n",
            HEADER
        );
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
    }

    #[test]
    fn test_missing_trailing_fields_default() {
        let csv = format!("{}1,Bulbasaur,Grass,Poison,45,49,49,65,65,45,Overgrow\n", HEADER);
        let records = parse_records(csv.as_bytes()).unwrap();
        assert_eq!(records[0].ability2, "");
        assert_eq!(records[0].description, "");
    }

    #[test]
    fn test_out_of_range_stat_is_error() {
        let csv = format!("{}1,Blissey,Normal,,300,10,10,75,135,55,Natural Cure,,Egg.\n", HEADER);
        let err = parse_records(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);
    }

    #[test]
    fn test_error_line_counts_multiline_fields() {
        let csv = format!(
            "{}1,Bulbasaur,Grass,Poison,45,49,49,65,65,45,Overgrow,,\"A strange seed.\nIt grows.\"\n\
             2,Ivysaur,Grass,Poison,sixty,62,63,80,80,60,Overgrow,,Bud.\n",
            HEADER
        );
        let err = parse_records(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 4"), "{}", err);
    }
}
