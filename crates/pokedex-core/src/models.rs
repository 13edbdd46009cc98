//! Core data types shared by the catalog, the progress tracker, and the
//! front ends.

use serde::Serialize;

/// One immutable catalog entry.
///
/// `id` is the record's identity and its national dex number. Empty
/// `type2` / `ability2` mean the record has only one. Serializes in catalog
/// CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
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
}

impl Record {
    /// Secondary type, if the record has one.
    pub fn secondary_type(&self) -> Option<&str> {
        (!self.type2.is_empty()).then_some(self.type2.as_str())
    }

    /// Secondary ability, if the record has one.
    pub fn secondary_ability(&self) -> Option<&str> {
        (!self.ability2.is_empty()).then_some(self.ability2.as_str())
    }

    /// The six base stats as `(label, value)` pairs, in display order.
    pub fn stats(&self) -> [(&'static str, u8); 6] {
        [
            ("HP", self.hp),
            ("Attack", self.attack),
            ("Defense", self.defense),
            ("Sp. Atk", self.sp_attack),
            ("Sp. Def", self.sp_defense),
            ("Speed", self.speed),
        ]
    }
}

/// Per-record progress flags. `caught` implies `encountered`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressEntry {
    pub encountered: bool,
    pub caught: bool,
}

impl ProgressEntry {
    pub fn status(&self) -> Status {
        if self.caught {
            Status::Caught
        } else if self.encountered {
            Status::Seen
        } else {
            Status::Unseen
        }
    }
}

/// The three reachable per-record states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unseen,
    Seen,
    Caught,
}
