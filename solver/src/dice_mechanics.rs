//! Round model: how one roll of attacker and defender dice resolves.
//!
//! Both sides sort their dice descending and compare position by position, up
//! to `min(attacker_dice, defender_dice)` comparisons. The attacker loses a
//! comparison unless its die is strictly greater, so ties go to the defender.
//!
//! Two ways to tally outcomes over all `F^a * F^d` equally likely rolls:
//!
//! - [`enumerate_round_outcomes`] walks every ordered tuple. Cost `F^(a+d)`.
//! - [`count_round_outcomes`] only looks at the top one or two dice of each side,
//!   weighting each sorted top by how many ordered tuples produce it, and sums
//!   attacker weights one row at a time. Cost `O(F^2)` time, `O(F)` memory.
//!
//! Both return the same exact integer tallies, so any table built from either is
//! bit-identical.

use crate::constants::{MAX_ATTACKER_DICE, MAX_DEFENDER_DICE, OUTCOME_SLOTS};

/// Sort dice in place, highest first.
pub fn sort_dice_descending(dice: &mut [u32]) {
    dice.sort_unstable_by(|a, b| b.cmp(a));
}

/// Compare two descending-sorted rolls. Returns `(attacker_losses, defender_losses)`.
pub fn compare_dice(attacker: &[u32], defender: &[u32]) -> (u32, u32) {
    let mut attacker_losses = 0;
    let mut defender_losses = 0;
    for (a, d) in attacker.iter().zip(defender) {
        if a > d {
            defender_losses += 1;
        } else {
            attacker_losses += 1;
        }
    }
    (attacker_losses, defender_losses)
}

/// Number of comparisons in a round.
#[inline(always)]
pub fn comparisons(attacker_dice: u32, defender_dice: u32) -> u32 {
    attacker_dice.min(defender_dice)
}

/// Decode the `index`-th ordered tuple of `n` dice (base-`faces` digits) into `out`.
fn decode_roll(mut index: u64, faces: u32, out: &mut [u32]) {
    for die in out.iter_mut() {
        *die = (index % faces as u64) as u32 + 1;
        index /= faces as u64;
    }
}

/// Tally attacker losses over every ordered roll.
///
/// Returns counts indexed by attacker losses (0..=2). The counts sum to
/// `faces^attacker_dice * faces^defender_dice`, which is why they are `u128`.
pub fn enumerate_round_outcomes(
    faces: u32,
    attacker_dice: u32,
    defender_dice: u32,
) -> [u128; OUTCOME_SLOTS] {
    debug_assert!((1..=MAX_ATTACKER_DICE).contains(&attacker_dice));
    debug_assert!((1..=MAX_DEFENDER_DICE).contains(&defender_dice));

    let a_n = attacker_dice as usize;
    let d_n = defender_dice as usize;
    let a_combs = (faces as u64).pow(attacker_dice);
    let d_combs = (faces as u64).pow(defender_dice);

    // Pre-sort every defender roll once; reused for each attacker roll.
    let mut defender_rolls = Vec::with_capacity(d_combs as usize);
    for d in 0..d_combs {
        let mut roll = [0u32; MAX_DEFENDER_DICE as usize];
        decode_roll(d, faces, &mut roll[..d_n]);
        sort_dice_descending(&mut roll[..d_n]);
        defender_rolls.push(roll);
    }

    let mut tally = [0u128; OUTCOME_SLOTS];
    let mut attacker_roll = [0u32; MAX_ATTACKER_DICE as usize];
    for a in 0..a_combs {
        decode_roll(a, faces, &mut attacker_roll[..a_n]);
        sort_dice_descending(&mut attacker_roll[..a_n]);
        for defender_roll in &defender_rolls {
            let (attacker_losses, _) = compare_dice(&attacker_roll[..a_n], &defender_roll[..d_n]);
            tally[attacker_losses as usize] += 1;
        }
    }
    tally
}

/// Ordered rolls of `n` dice whose highest die is exactly `top`.
#[inline]
fn top_one_weight(top: u32, n: u32) -> u128 {
    (top as u128).pow(n) - (top as u128 - 1).pow(n)
}

/// Ordered rolls of `n` dice (2 or 3) whose two highest dice, sorted, are `(hi, lo)`.
///
/// Requires `hi >= lo >= 1`. For three dice the third die ranges over `1..=lo`:
/// - `hi > lo`: `6(lo - 1)` rolls with a smaller third die, plus 3 with a third `lo`.
/// - `hi == lo`: `3(lo - 1)` rolls with a smaller third die, plus 1 triple.
#[inline]
fn top_two_weight(hi: u32, lo: u32, n: u32) -> u128 {
    debug_assert!(hi >= lo && lo >= 1);
    let lo = lo as u128;
    match (n, hi as u128 == lo) {
        (2, true) => 1,
        (2, false) => 2,
        (3, true) => 3 * lo - 2,
        (3, false) => 6 * lo - 3,
        _ => unreachable!("top-two weights are only defined for 2 or 3 dice"),
    }
}

/// Tally attacker losses by counting sorted tops instead of enumerating rolls.
///
/// Same contract and identical results as [`enumerate_round_outcomes`].
pub fn count_round_outcomes(
    faces: u32,
    attacker_dice: u32,
    defender_dice: u32,
) -> [u128; OUTCOME_SLOTS] {
    debug_assert!((1..=MAX_ATTACKER_DICE).contains(&attacker_dice));
    debug_assert!((1..=MAX_DEFENDER_DICE).contains(&defender_dice));

    let f = faces as u128;
    let total = f.pow(attacker_dice) * f.pow(defender_dice);
    let mut tally = [0u128; OUTCOME_SLOTS];

    if comparisons(attacker_dice, defender_dice) == 1 {
        // Only the two highest dice meet. The attacker beats a defender top `v`
        // with every roll except the `v^a` rolls that stay at or below `v`.
        let attacker_rolls = f.pow(attacker_dice);
        let wins: u128 = (1..=faces)
            .map(|v| top_one_weight(v, defender_dice) * (attacker_rolls - (v as u128).pow(attacker_dice)))
            .sum();
        tally[0] = wins;
        tally[1] = total - wins;
        return tally;
    }

    // Two comparisons. With W(hi, lo) the attacker top-two weights, the
    // attacker loses nothing iff a_hi > d_hi and a_lo > d_lo, and loses both
    // iff a_hi <= d_hi and a_lo <= d_lo. `column[lo]` accumulates W over the
    // attacker `hi` rows seen so far; a running sum across it gives the 2D
    // corner sums one defender row at a time.
    let n = faces as usize;
    let mut column = vec![0u128; n + 2];

    // Rows hi > d_hi, walking d_hi down.
    for d_hi in (1..=faces).rev() {
        let hi = d_hi + 1;
        if hi <= faces {
            for lo in 1..=hi {
                column[lo as usize] += top_two_weight(hi, lo, attacker_dice);
            }
        }
        let mut above = 0u128;
        for lo in (2..=n + 1).rev() {
            above += column[lo];
            let d_lo = lo as u32 - 1;
            if d_lo <= d_hi {
                tally[0] += top_two_weight(d_hi, d_lo, defender_dice) * above;
            }
        }
    }

    // Rows hi <= d_hi, walking d_hi up.
    column.iter_mut().for_each(|c| *c = 0);
    for d_hi in 1..=faces {
        for lo in 1..=d_hi {
            column[lo as usize] += top_two_weight(d_hi, lo, attacker_dice);
        }
        let mut below = 0u128;
        for d_lo in 1..=d_hi {
            below += column[d_lo as usize];
            tally[2] += top_two_weight(d_hi, d_lo, defender_dice) * below;
        }
    }

    tally[1] = total - tally[0] - tally[2];
    tally
}
