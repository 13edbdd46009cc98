//! Catalog download from PokeAPI.
//!
//! `dex fetch` builds the catalog CSV from `/pokemon/{id}` and the species
//! resource it links to, for ids `1..=capacity`. The conversion from API
//! JSON to [`Record`] is a pure function so it can be tested offline.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use pokedex_core::Record;

use crate::config::Config;
use crate::report::{FetchEvent, FetchReporter};

#[derive(Debug, Deserialize)]
pub struct ApiPokemon {
    pub id: u32,
    pub name: String,
    pub species: NamedResource,
    pub types: Vec<ApiType>,
    pub stats: Vec<ApiStat>,
    pub abilities: Vec<ApiAbility>,
}

#[derive(Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiType {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiStat {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiAbility {
    pub ability: NamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiSpecies {
    pub flavor_text_entries: Vec<FlavorText>,
}

#[derive(Debug, Deserialize)]
pub struct FlavorText {
    pub flavor_text: String,
    pub language: NamedResource,
}

/// Converts API resources into a catalog record.
pub fn record_from_api(pokemon: &ApiPokemon, species: &ApiSpecies) -> Result<Record> {
    let mut types: Vec<&ApiType> = pokemon.types.iter().collect();
    types.sort_by_key(|t| t.slot);
    let type1 = types
        .first()
        .map(|t| capitalize(&t.kind.name))
        .with_context(|| format!("{} has no types", pokemon.name))?;
    let type2 = types
        .get(1)
        .map(|t| capitalize(&t.kind.name))
        .unwrap_or_default();

    let stat = |name: &str| -> Result<u8> {
        let entry = pokemon
            .stats
            .iter()
            .find(|s| s.stat.name == name)
            .with_context(|| format!("{} has no {} stat", pokemon.name, name))?;
        u8::try_from(entry.base_stat)
            .with_context(|| format!("{} {} stat out of range", pokemon.name, name))
    };

    let ability = |index: usize| {
        pokemon
            .abilities
            .get(index)
            .map(|a| title_case(&a.ability.name.replace('-', " ")))
            .unwrap_or_default()
    };
    let ability1 = ability(0);
    if ability1.is_empty() {
        bail!("{} has no abilities", pokemon.name);
    }

    let description = species
        .flavor_text_entries
        .iter()
        .find(|f| f.language.name == "en")
        .map(|f| f.flavor_text.replace(['\n', '\u{c}'], " "))
        .unwrap_or_default();

    Ok(Record {
        id: pokemon.id,
        name: capitalize(&pokemon.name),
        type1,
        type2,
        hp: stat("hp")?,
        attack: stat("attack")?,
        defense: stat("defense")?,
        sp_attack: stat("special-attack")?,
        sp_defense: stat("special-defense")?,
        speed: stat("speed")?,
        ability1,
        ability2: ability(1),
        description,
    })
}

/// First character uppercased, the rest lowercased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn title_case(s: &str) -> String {
    s.split(' ').map(capitalize).collect::<Vec<_>>().join(" ")
}

/// Writes records as catalog CSV, header first.
pub fn write_csv<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

async fn get_json<T: serde::de::DeserializeOwned>(client: &reqwest::Client, url: &str) -> Result<T> {
    debug!(url, "GET");
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request failed: {}", url))?;
    if !resp.status().is_success() {
        bail!("{} returned {}", url, resp.status());
    }
    resp.json::<T>()
        .await
        .with_context(|| format!("Unexpected response from {}", url))
}

async fn fetch_record(client: &reqwest::Client, base_url: &str, id: u32) -> Result<Record> {
    let pokemon: ApiPokemon = get_json(client, &format!("{}/pokemon/{}", base_url, id)).await?;
    let species_url = if pokemon.species.url.is_empty() {
        format!("{}/pokemon-species/{}", base_url, pokemon.species.name)
    } else {
        pokemon.species.url.clone()
    };
    let species: ApiSpecies = get_json(client, &species_url).await?;
    record_from_api(&pokemon, &species)
}

/// Downloads the whole catalog and writes it to `out`.
pub async fn run_fetch(config: &Config, out: &Path, reporter: &dyn FetchReporter) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch.timeout_secs))
        .build()?;
    let base_url = config.fetch.base_url.trim_end_matches('/');
    let total = config.catalog.capacity as u64;

    let mut records = Vec::with_capacity(config.catalog.capacity);
    for id in 1..=config.catalog.capacity as u32 {
        let record = fetch_record(&client, base_url, id)
            .await
            .with_context(|| format!("Failed to fetch record {}", id))?;
        reporter.report(FetchEvent::Fetched {
            id,
            name: record.name.clone(),
            n: id as u64,
            total,
        });
        records.push(record);
    }

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(out)
        .with_context(|| format!("Failed to create {}", out.display()))?;
    write_csv(file, &records)?;

    reporter.report(FetchEvent::Written {
        path: out.display().to_string(),
        records: records.len() as u64,
    });
    Ok(())
}
