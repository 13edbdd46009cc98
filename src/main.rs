//! # Pokedex CLI (`dex`)
//!
//! ## Usage
//!
//! ```bash
//! dex --config ./config/dex.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dex serve` | Start the JSON HTTP API |
//! | `dex console` | Interactive menu |
//! | `dex show <ID\|NAME>` | Print one record with its status |
//! | `dex list` | List records, optionally filtered |
//! | `dex stats` | Seen / caught statistics |
//! | `dex encounter <ID>` | Mark a record as seen |
//! | `dex catch <ID>` | Mark a record as caught |
//! | `dex reset [--id ID]` | Reset one record or all progress |
//! | `dex fetch` | Download the catalog CSV from PokeAPI |

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pokedex::config::{self, Config};
use pokedex::console::Console;
use pokedex::display;
use pokedex::fetch;
use pokedex::report::ProgressMode;
use pokedex::server;
use pokedex::session::{Action, Dex};
use pokedex::views::{list_records, ListFilter, ProgressSummary, RecordView};

const DEFAULT_CONFIG: &str = "./config/dex.toml";

/// Pokedex: catalog lookup and catch tracking.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Without one, `./config/dex.toml` is used if present, otherwise
/// built-in defaults.
#[derive(Parser)]
#[command(name = "dex", about = "Kanto Pokedex: look up records and track your catches", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Log filter for stderr diagnostics (overridden by `RUST_LOG`).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON HTTP API.
    ///
    /// Binds to `[server].bind` and serves `/api/*` plus the configured page.
    Serve,

    /// Run the interactive console.
    Console,

    /// Print one record and its status.
    Show {
        /// Dex number or name (case-insensitive).
        query: String,
    },

    /// List records.
    List {
        /// Which records to include: all, caught, seen (not caught), encountered.
        #[arg(long, default_value = "all")]
        filter: ListFilter,

        /// Order by name instead of dex number.
        #[arg(long)]
        by_name: bool,
    },

    /// Print seen / caught statistics.
    Stats,

    /// Mark a record as encountered.
    Encounter { id: u32 },

    /// Mark a record as caught (and encountered).
    Catch { id: u32 },

    /// Reset progress for one record, or for all records.
    Reset {
        /// Only reset this record.
        #[arg(long)]
        id: Option<u32>,
    },

    /// Download the catalog CSV from PokeAPI.
    Fetch {
        /// Output path; defaults to `[catalog].path`.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Progress output on stderr; defaults to human when stderr is a TTY.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(path: &Path) -> Result<Config> {
    if path == Path::new(DEFAULT_CONFIG) && !path.exists() {
        tracing::debug!("no config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    config::load_config(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let cfg = resolve_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Console => {
            let dex = Dex::open(&cfg)?;
            let stdin = std::io::stdin();
            Console::new(&dex, stdin.lock(), std::io::stdout()).run()?;
        }
        Commands::Show { query } => {
            let dex = Dex::open(&cfg)?;
            let catalog = dex.catalog();
            let record = match query.trim().parse::<u32>() {
                Ok(id) => catalog.lookup_by_id(id),
                Err(_) => catalog.lookup_by_name(query.trim()),
            };
            let Some(record) = record else {
                bail!("Pokemon not found: {}", query);
            };
            let entry = dex
                .read(|progress| progress.entry(record.id))
                .unwrap_or_default();
            display::write_details(&mut std::io::stdout().lock(), record, entry)?;
        }
        Commands::List { filter, by_name } => {
            let dex = Dex::open(&cfg)?;
            let catalog = dex.catalog();
            let views: Vec<RecordView> = if by_name {
                dex.read(|progress| {
                    catalog
                        .iter_by_name()
                        .filter(|r| filter.matches(progress.entry(r.id).unwrap_or_default()))
                        .map(|r| RecordView::new(r, progress))
                        .collect()
                })
            } else {
                dex.read(|progress| list_records(catalog, progress, filter))
            };
            display::write_listing(&mut std::io::stdout().lock(), filter, &views)?;
        }
        Commands::Stats => {
            let dex = Dex::open(&cfg)?;
            let summary = dex.read(ProgressSummary::new);
            display::write_statistics(&mut std::io::stdout().lock(), &summary)?;
        }
        Commands::Encounter { id } => {
            apply(&cfg, Action::Encounter, id)?;
        }
        Commands::Catch { id } => {
            apply(&cfg, Action::Catch, id)?;
        }
        Commands::Reset { id: Some(id) } => {
            apply(&cfg, Action::Reset, id)?;
        }
        Commands::Reset { id: None } => {
            let dex = Dex::open(&cfg)?;
            dex.reset_all()?;
            println!("All progress reset.");
        }
        Commands::Fetch { out, progress } => {
            let out = out.unwrap_or_else(|| cfg.catalog.path.clone());
            let reporter = progress
                .unwrap_or_else(ProgressMode::default_for_tty)
                .reporter();
            fetch::run_fetch(&cfg, &out, reporter.as_ref()).await?;
            println!("Catalog written to {}", out.display());
        }
    }

    std::io::stdout().flush()?;
    Ok(())
}

/// Applies a single-record command and reports the new status.
fn apply(cfg: &Config, action: Action, id: u32) -> Result<()> {
    let dex = Dex::open(cfg)?;
    let Some(record) = dex.catalog().lookup_by_id(id) else {
        bail!("Pokemon not found: #{}", id);
    };

    let changed = dex.apply(action, id)?;
    let verb = match action {
        Action::Encounter => "encountered",
        Action::Catch => "caught",
        Action::Reset => "reset",
    };
    if changed {
        println!("#{:03} {} marked as {}.", record.id, record.name, verb);
    } else {
        println!("#{:03} {} was already {}.", record.id, record.name, verb);
    }
    Ok(())
}
