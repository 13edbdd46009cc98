use thiserror::Error;

/// Structural failures while building a [`CatalogIndex`](crate::CatalogIndex).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog capacity of {capacity} records exceeded")]
    CapacityExceeded { capacity: usize },

    #[error("record id {id} is outside 1..={capacity}")]
    IdOutOfRange { id: u32, capacity: usize },

    #[error("record id {id} appears more than once")]
    DuplicateId { id: u32 },
}

/// Rejected progress state on the restore path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("entry for id {id} is caught but not encountered")]
    CaughtNotEncountered { id: u32 },

    #[error("total_{counter} is {stored} but {actual} entries are flagged")]
    CounterMismatch {
        counter: &'static str,
        stored: u32,
        actual: u32,
    },
}

/// Failures decoding a progress snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot is {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    #[error("slot {slot} holds id {found}")]
    IdMismatch { slot: usize, found: i32 },

    #[error("slot {slot} has invalid flag byte {value:#04x}")]
    InvalidFlag { slot: usize, value: u8 },

    #[error("negative counter {0}")]
    NegativeCounter(i32),

    #[error(transparent)]
    Progress(#[from] ProgressError),
}
