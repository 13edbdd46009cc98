//! # Pokedex Core
//!
//! I/O-free logic for the Pokedex service: record types, the catalog index
//! (id slots plus a case-insensitive name tree), the progress tracker, and
//! the fixed-layout snapshot codec.
//!
//! This crate does no file, network, or terminal I/O and never logs. The
//! `pokedex` application crate supplies ingestion, persistence, and the
//! console and HTTP front ends.

pub mod catalog;
pub mod error;
pub mod models;
pub mod progress;
pub mod snapshot;

pub use catalog::CatalogIndex;
pub use error::{CatalogError, ProgressError, SnapshotError};
pub use models::{ProgressEntry, Record, Status};
pub use progress::ProgressTracker;

/// Number of records in the Kanto catalog; the default capacity.
pub const DEFAULT_CAPACITY: usize = 151;
