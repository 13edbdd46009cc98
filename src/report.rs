//! Fetch progress reporting.
//!
//! `dex fetch` reports each downloaded record on **stderr**, so stdout stays
//! clean for scripts. Lines are either human text or one JSON object each.

use serde::Serialize;
use std::io::Write;

/// A single progress event for a catalog download.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FetchEvent {
    /// Record `id` was downloaded; `n` of `total` done.
    Fetched {
        id: u32,
        name: String,
        n: u64,
        total: u64,
    },
    /// The CSV was written.
    Written { path: String, records: u64 },
}

impl FetchEvent {
    /// `fetch  #025 Pikachu       25/151`
    pub fn human_line(&self) -> String {
        match self {
            FetchEvent::Fetched { id, name, n, total } => {
                format!("fetch  #{:03} {:<12}  {}/{}", id, name, n, total)
            }
            FetchEvent::Written { path, records } => {
                format!("fetch  wrote {} records to {}", records, path)
            }
        }
    }
}

/// Receives download progress.
pub trait FetchReporter: Send + Sync {
    fn report(&self, event: FetchEvent);
}

/// Output format for [`FetchReporter`]s that write to stderr.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Human lines when stderr is a terminal, nothing otherwise.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(self) -> Box<dyn FetchReporter> {
        Box::new(StderrReporter { mode: self })
    }

    /// The line written for `event`, or `None` when progress is off.
    pub fn render(self, event: &FetchEvent) -> Option<String> {
        match self {
            ProgressMode::Off => None,
            ProgressMode::Human => Some(event.human_line()),
            ProgressMode::Json => serde_json::to_string(event).ok(),
        }
    }
}

struct StderrReporter {
    mode: ProgressMode,
}

impl FetchReporter for StderrReporter {
    fn report(&self, event: FetchEvent) {
        if let Some(line) = self.mode.render(&event) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}
