//! Round probability table: P(attacker loses k | dice pairing) for one die size.
//!
//! Built once per face count from exact integer tallies
//! ([`crate::dice_mechanics::count_round_outcomes`]) and immutable afterwards,
//! so a table can be cached for the life of the process and shared across
//! threads.
//!
//! Storage is the dense `[3, 2, 3]` array described in [`crate::constants`].
//! Slot 2 of every one-comparison pairing is 0.

use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::constants::*;
use crate::dice_mechanics::{count_round_outcomes, enumerate_round_outcomes};
use crate::error::{Result, RiskError};
use crate::selector::{select_dice, DiceSelection};
use crate::types;

#[derive(Clone, Debug, PartialEq)]
pub struct RoundProbabilityTable {
    face_count: u32,
    probs: [f64; TABLE_ENTRIES],
}

/// Build the table for `faces`-sided dice using combinatorial counting.
pub fn build_round_probability_table(faces: u32) -> Result<RoundProbabilityTable> {
    build_with(faces, count_round_outcomes)
}

/// Build the table by enumerating every ordered roll. Slow for large dice;
/// kept as the reference the counting path is checked against.
pub fn build_round_probability_table_enumerated(faces: u32) -> Result<RoundProbabilityTable> {
    build_with(faces, enumerate_round_outcomes)
}

fn build_with(
    faces: u32,
    tally: fn(u32, u32, u32) -> [u128; OUTCOME_SLOTS],
) -> Result<RoundProbabilityTable> {
    let faces = types::face_count(faces as i64)?;
    let start = Instant::now();

    let mut probs = [0.0f64; TABLE_ENTRIES];
    for a in 1..=MAX_ATTACKER_DICE {
        for d in 1..=MAX_DEFENDER_DICE {
            let counts = tally(faces, a, d);
            let total = (faces as u128).pow(a) * (faces as u128).pow(d);
            for (k, &count) in counts.iter().enumerate() {
                probs[table_index(a, d, k)] = count as f64 / total as f64;
            }
        }
    }

    debug!(
        faces,
        elapsed_us = start.elapsed().as_micros() as u64,
        "built round probability table"
    );
    Ok(RoundProbabilityTable {
        face_count: faces,
        probs,
    })
}

/// Build tables for several face counts in parallel. Output order matches `faces`.
pub fn build_tables(faces: &[u32]) -> Result<Vec<RoundProbabilityTable>> {
    faces
        .par_iter()
        .map(|&f| build_round_probability_table(f))
        .collect()
}

/// Tables for every face count in [`STANDARD_FACE_COUNTS`].
pub fn build_standard_tables() -> Result<Vec<RoundProbabilityTable>> {
    build_tables(&STANDARD_FACE_COUNTS)
}

impl RoundProbabilityTable {
    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    /// Outcome probabilities for a dice pairing, indexed by attacker losses.
    ///
    /// Length is `comparisons + 1`: 2 for one-comparison rounds, 3 otherwise.
    #[inline]
    pub fn outcome_probs(&self, selection: DiceSelection) -> &[f64] {
        let base = table_index(selection.attacker_dice, selection.defender_dice, 0);
        &self.probs[base..=base + selection.comparisons() as usize]
    }

    /// Outcome probabilities for the dice two armies of these sizes roll.
    pub fn probs_for_armies(&self, attackers: u32, defenders: u32) -> &[f64] {
        self.outcome_probs(select_dice(attackers, defenders))
    }

    /// Probability the attacker wins every comparison in one round.
    pub fn attacker_round_win_probability(&self, attacker_dice: u32, defender_dice: u32) -> f64 {
        self.probs[table_index(attacker_dice, defender_dice, 0)]
    }

    /// Dense `[3, 2, 3]` array in row-major order.
    pub fn to_dense_array(&self) -> [f64; TABLE_ENTRIES] {
        self.probs
    }

    /// Rebuild a table from its dense array, checking that it is a valid table.
    pub fn from_dense_array(faces: u32, probs: [f64; TABLE_ENTRIES]) -> Result<Self> {
        let faces = types::face_count(faces as i64)?;
        for a in 1..=MAX_ATTACKER_DICE {
            for d in 1..=MAX_DEFENDER_DICE {
                let base = table_index(a, d, 0);
                let used = a.min(d) as usize + 1;
                let row = &probs[base..base + OUTCOME_SLOTS];

                if let Some(p) = row.iter().find(|p| !(0.0..=1.0).contains(*p)) {
                    return Err(RiskError::MalformedTable {
                        reason: format!("{a}v{d} has probability {p} outside [0, 1]"),
                    });
                }
                if row[used..].iter().any(|&p| p != 0.0) {
                    return Err(RiskError::MalformedTable {
                        reason: format!("{a}v{d} has mass in an impossible outcome slot"),
                    });
                }
                let sum: f64 = row.iter().sum();
                if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                    return Err(RiskError::MalformedTable {
                        reason: format!("{a}v{d} outcomes sum to {sum}"),
                    });
                }
            }
        }
        Ok(Self {
            face_count: faces,
            probs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_six_sided_one_vs_one() {
        let t = build_round_probability_table(6).unwrap();
        assert!(close(t.attacker_round_win_probability(1, 1), 15.0 / 36.0));
        assert_eq!(t.probs_for_armies(1, 1).len(), 2);
    }

    #[test]
    fn test_four_sided_scenarios() {
        let t = build_round_probability_table(4).unwrap();
        assert!(close(t.attacker_round_win_probability(1, 1), 0.375));
        assert!(close(t.attacker_round_win_probability(2, 1), 0.53125));
    }

    #[test]
    fn test_rows_sum_to_one() {
        for faces in [2, 3, 4, 6, 8, 12, 20, 100] {
            let t = build_round_probability_table(faces).unwrap();
            for a in 1..=MAX_ATTACKER_DICE {
                for d in 1..=MAX_DEFENDER_DICE {
                    let sel = DiceSelection {
                        attacker_dice: a,
                        defender_dice: d,
                    };
                    let sum: f64 = t.outcome_probs(sel).iter().sum();
                    assert!((sum - 1.0).abs() < 1e-12, "faces={faces} {a}v{d} sum={sum}");
                }
            }
        }
    }

    #[test]
    fn test_outcome_slice_lengths() {
        let t = build_round_probability_table(6).unwrap();
        assert_eq!(t.probs_for_armies(10, 1).len(), 2);
        assert_eq!(t.probs_for_armies(1, 10).len(), 2);
        assert_eq!(t.probs_for_armies(2, 2).len(), 3);
        assert_eq!(t.probs_for_armies(10, 10).len(), 3);
    }

    #[test]
    fn test_counting_and_enumeration_tables_identical() {
        for faces in [2, 4, 6, 8] {
            assert_eq!(
                build_round_probability_table(faces).unwrap(),
                build_round_probability_table_enumerated(faces).unwrap()
            );
        }
    }

    #[test]
    fn test_rebuild_is_identical() {
        let a = build_round_probability_table(12).unwrap();
        let b = build_round_probability_table(12).unwrap();
        assert_eq!(a.to_dense_array(), b.to_dense_array());
    }

    #[test]
    fn test_rejects_invalid_face_counts() {
        assert!(matches!(
            build_round_probability_table(1),
            Err(RiskError::InvalidFaceCount { faces: 1 })
        ));
        assert!(matches!(
            build_round_probability_table(0),
            Err(RiskError::InvalidFaceCount { faces: 0 })
        ));
    }

    #[test]
    fn test_standard_tables_in_order() {
        let tables = build_standard_tables().unwrap();
        let faces: Vec<u32> = tables.iter().map(|t| t.face_count()).collect();
        assert_eq!(faces, STANDARD_FACE_COUNTS.to_vec());
    }

    #[test]
    fn test_dense_array_validation() {
        let t = build_round_probability_table(8).unwrap();
        let dense = t.to_dense_array();
        assert_eq!(RoundProbabilityTable::from_dense_array(8, dense).unwrap(), t);

        let mut bad = dense;
        bad[table_index(1, 1, 2)] = 0.1;
        assert!(matches!(
            RoundProbabilityTable::from_dense_array(8, bad),
            Err(RiskError::MalformedTable { .. })
        ));

        let mut bad = dense;
        bad[table_index(3, 2, 0)] += 0.01;
        assert!(matches!(
            RoundProbabilityTable::from_dense_array(8, bad),
            Err(RiskError::MalformedTable { .. })
        ));
    }
    #[test]
    fn test_large_die_table() {
        let t = build_round_probability_table(2048).unwrap();
        assert!(close(t.attacker_round_win_probability(1, 1), 2047.0 / 4096.0));
        let dense = t.to_dense_array();
        assert_eq!(RoundProbabilityTable::from_dense_array(2048, dense).unwrap(), t);
    }
}
