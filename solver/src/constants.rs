//! Combat constants and dense-table indexing.
//!
//! The round probability table is a dense `[3, 2, 3]` array:
//! - axis 0: attacker dice rolled (1..=3), index = dice - 1
//! - axis 1: defender dice rolled (1..=2), index = dice - 1
//! - axis 2: attacker losses in the round (0..=2)
//!
//! [`table_index`] flattens that shape in row-major order, which is also the
//! on-disk order used by [`crate::storage`].

/// Attacker rolls at most this many dice, regardless of army size.
pub const MAX_ATTACKER_DICE: u32 = 3;

/// Defender rolls at most this many dice, regardless of army size.
pub const MAX_DEFENDER_DICE: u32 = 2;

/// Outcome slots per dice pairing: attacker loses 0, 1 or 2.
/// A round never has more than `MAX_DEFENDER_DICE` comparisons.
pub const OUTCOME_SLOTS: usize = 3;

/// Total entries in the dense table: 3 * 2 * 3 = 18.
pub const TABLE_ENTRIES: usize =
    MAX_ATTACKER_DICE as usize * MAX_DEFENDER_DICE as usize * OUTCOME_SLOTS;

/// Smallest meaningful die.
pub const MIN_FACE_COUNT: u32 = 2;

/// Largest supported die. Exact tallies for 3-vs-2 rounds are F^5, which must
/// stay inside u128 ((2^24)^5 = 2^120).
pub const MAX_FACE_COUNT: u32 = 1 << 24;

/// Face counts offered by the dashboard: the Platonic solids.
pub const STANDARD_FACE_COUNTS: [u32; 5] = [4, 6, 8, 12, 20];

/// Standard game die.
pub const DEFAULT_FACE_COUNT: u32 = 6;

/// Win-grid bound built in the background for lookups (30x30 chart).
pub const DEFAULT_GRID_SIZE: u32 = 30;

/// Largest win-grid bound: (4096 + 1)^2 cells, about 134 MB.
pub const MAX_GRID_SIZE: u32 = 4096;

/// Largest army size accepted through the HTTP API.
pub const MAX_API_ARMY_SIZE: i64 = 100;

/// Largest die accepted through the HTTP API.
pub const MAX_API_FACE_COUNT: i64 = 1000;

/// Tolerance for "probabilities sum to 1" checks.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Round-table file magic number: "RSKP" in little-endian hex.
pub const TABLE_FILE_MAGIC: u32 = 0x504B_5352;

/// Round-table file format version.
pub const TABLE_FILE_VERSION: u32 = 1;

/// Flat index into the dense `[3, 2, 3]` table.
///
/// `attacker_dice` in 1..=3, `defender_dice` in 1..=2, `attacker_losses` in 0..=2.
#[inline(always)]
pub fn table_index(attacker_dice: u32, defender_dice: u32, attacker_losses: usize) -> usize {
    ((attacker_dice as usize - 1) * MAX_DEFENDER_DICE as usize + (defender_dice as usize - 1))
        * OUTCOME_SLOTS
        + attacker_losses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_index_is_dense() {
        let mut seen = [false; TABLE_ENTRIES];
        for a in 1..=MAX_ATTACKER_DICE {
            for d in 1..=MAX_DEFENDER_DICE {
                for k in 0..OUTCOME_SLOTS {
                    let idx = table_index(a, d, k);
                    assert!(!seen[idx], "duplicate index {idx}");
                    seen[idx] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(table_index(1, 1, 0), 0);
        assert_eq!(table_index(3, 2, 2), TABLE_ENTRIES - 1);
    }

    #[test]
    fn test_magic_spells_rskp() {
        assert_eq!(&TABLE_FILE_MAGIC.to_le_bytes(), b"RSKP");
    }
}
