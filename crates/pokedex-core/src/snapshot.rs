//! Fixed-layout progress snapshot codec.
//!
//! The layout matches the progress file written by earlier releases, so
//! existing `user_progress.dat` files keep loading. All integers are
//! little-endian:
//!
//! ```text
//! entry × capacity:  id: i32 | encountered: u8 | caught: u8 | pad: [u8; 2]
//! trailer:           total_encountered: i32 | total_caught: i32
//! ```

use crate::error::SnapshotError;
use crate::models::ProgressEntry;
use crate::progress::ProgressTracker;

const ENTRY_LEN: usize = 8;
const TRAILER_LEN: usize = 8;

/// Encoded size of a snapshot for `capacity` entries.
pub fn snapshot_len(capacity: usize) -> usize {
    capacity * ENTRY_LEN + TRAILER_LEN
}

/// Encodes the tracker in the fixed layout.
pub fn encode(progress: &ProgressTracker) -> Vec<u8> {
    let mut buf = Vec::with_capacity(snapshot_len(progress.capacity()));
    for (slot, entry) in progress.entries().iter().enumerate() {
        buf.extend_from_slice(&(slot as i32 + 1).to_le_bytes());
        buf.push(entry.encountered as u8);
        buf.push(entry.caught as u8);
        buf.extend_from_slice(&[0, 0]);
    }
    buf.extend_from_slice(&(progress.total_encountered() as i32).to_le_bytes());
    buf.extend_from_slice(&(progress.total_caught() as i32).to_le_bytes());
    buf
}

/// Decodes a snapshot for a catalog of `capacity` records.
///
/// Padding bytes are ignored. Everything else is checked: the length, each
/// slot's id, the flag bytes, and the tracker invariants.
pub fn decode(bytes: &[u8], capacity: usize) -> Result<ProgressTracker, SnapshotError> {
    let expected = snapshot_len(capacity);
    if bytes.len() != expected {
        return Err(SnapshotError::Length {
            expected,
            actual: bytes.len(),
        });
    }

    let (body, trailer) = bytes.split_at(capacity * ENTRY_LEN);
    let mut entries = Vec::with_capacity(capacity);
    for (slot, chunk) in body.chunks_exact(ENTRY_LEN).enumerate() {
        let id = read_i32(&chunk[0..4]);
        if id != slot as i32 + 1 {
            return Err(SnapshotError::IdMismatch { slot, found: id });
        }
        entries.push(ProgressEntry {
            encountered: read_flag(chunk[4], slot)?,
            caught: read_flag(chunk[5], slot)?,
        });
    }

    let total_encountered = read_counter(&trailer[0..4])?;
    let total_caught = read_counter(&trailer[4..8])?;

    Ok(ProgressTracker::from_parts(
        entries,
        total_encountered,
        total_caught,
    )?)
}

fn read_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_counter(bytes: &[u8]) -> Result<u32, SnapshotError> {
    let value = read_i32(bytes);
    u32::try_from(value).map_err(|_| SnapshotError::NegativeCounter(value))
}

fn read_flag(value: u8, slot: usize) -> Result<bool, SnapshotError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(SnapshotError::InvalidFlag { slot, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProgressError;

    #[test]
    fn test_layout_size() {
        assert_eq!(snapshot_len(151), 1216);
        assert_eq!(encode(&ProgressTracker::new(151)).len(), 1216);
    }

    #[test]
    fn test_encode_layout() {
        let mut p = ProgressTracker::new(2);
        p.mark_caught(2);
        let bytes = encode(&p);
        assert_eq!(
            bytes,
            vec![
                1, 0, 0, 0, 0, 0, 0, 0, // id 1, unseen
                2, 0, 0, 0, 1, 1, 0, 0, // id 2, caught
                1, 0, 0, 0, // total_encountered
                1, 0, 0, 0, // total_caught
            ]
        );
    }

    #[test]
    fn test_decode_restores_state() {
        let mut p = ProgressTracker::new(151);
        p.mark_caught(25);
        p.mark_encountered(150);
        let restored = decode(&encode(&p), 151).unwrap();
        assert_eq!(restored, p);
    }

    #[test]
    fn test_decode_ignores_padding() {
        let mut bytes = encode(&ProgressTracker::new(2));
        bytes[6] = 0xAB;
        bytes[15] = 0xCD;
        assert!(decode(&bytes, 2).is_ok());
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let bytes = encode(&ProgressTracker::new(151));
        let err = decode(&bytes[..100], 151).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::Length {
                expected: 1216,
                actual: 100
            }
        );
        assert!(matches!(
            decode(&bytes, 150),
            Err(SnapshotError::Length { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_bad_id() {
        let mut bytes = encode(&ProgressTracker::new(3));
        bytes[8] = 7;
        assert_eq!(
            decode(&bytes, 3).unwrap_err(),
            SnapshotError::IdMismatch { slot: 1, found: 7 }
        );
    }

    #[test]
    fn test_decode_rejects_bad_flag() {
        let mut bytes = encode(&ProgressTracker::new(3));
        bytes[4] = 2;
        assert_eq!(
            decode(&bytes, 3).unwrap_err(),
            SnapshotError::InvalidFlag { slot: 0, value: 2 }
        );
    }

    #[test]
    fn test_decode_rejects_inconsistent_counters() {
        let mut p = ProgressTracker::new(3);
        p.mark_encountered(1);
        let mut bytes = encode(&p);
        let trailer = 3 * 8;
        bytes[trailer] = 3;
        assert!(matches!(
            decode(&bytes, 3).unwrap_err(),
            SnapshotError::Progress(ProgressError::CounterMismatch { .. })
        ));

        bytes[trailer..trailer + 4].copy_from_slice(&(-1i32).to_le_bytes());
        assert_eq!(
            decode(&bytes, 3).unwrap_err(),
            SnapshotError::NegativeCounter(-1)
        );
    }

    #[test]
    fn test_decode_rejects_caught_without_encounter() {
        let mut bytes = encode(&ProgressTracker::new(2));
        bytes[5] = 1;
        bytes[2 * 8 + 4] = 1;
        assert_eq!(
            decode(&bytes, 2).unwrap_err(),
            SnapshotError::Progress(ProgressError::CaughtNotEncountered { id: 1 })
        );
    }
}
