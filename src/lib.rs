//! # Pokedex
//!
//! A Kanto Pokedex: look records up by number or name and track which ones
//! you have seen and caught, from an interactive console or a JSON HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │ Catalog CSV │──▶│ CatalogIndex         │   │ progress.dat │
//! └─────────────┘   │ (id slots + name BST)│   └──────▲───────┘
//!                   ├──────────────────────┤          │ snapshot
//!                   │ ProgressTracker      │──────────┘ after every write
//!                   └──────────┬───────────┘
//!                      ┌───────┴────────┐
//!                      ▼                ▼
//!                 ┌──────────┐     ┌──────────┐
//!                 │ Console  │     │   HTTP   │
//!                 │  (dex)   │     │  (axum)  │
//!                 └──────────┘     └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dex fetch                     # download pokemon_data.csv
//! dex console                   # interactive menu
//! dex catch 25                  # one-shot update
//! dex serve                     # HTTP API on 127.0.0.1:8080
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`ingest`] | Catalog CSV loading |
//! | [`store`] | Progress snapshot file |
//! | [`session`] | Catalog + progress shared by all front ends |
//! | [`views`] | Response shapes and list filters |
//! | [`display`] | Text rendering |
//! | [`console`] | Interactive console |
//! | [`server`] | JSON HTTP API |
//! | [`fetch`] | PokeAPI catalog download |
//! | [`report`] | Download progress on stderr |

pub mod config;
pub mod console;
pub mod display;
pub mod fetch;
pub mod ingest;
pub mod report;
pub mod server;
pub mod session;
pub mod store;
pub mod views;
