//! Property-based tests for round tables, the win grid and outcome distributions.

use proptest::prelude::*;

use risk_odds::constants::{MAX_ATTACKER_DICE, MAX_DEFENDER_DICE, PROBABILITY_TOLERANCE};
use risk_odds::dice_mechanics::{compare_dice, sort_dice_descending};
use risk_odds::distribution::{compute_battle_outcome_distribution, DistributionCache};
use risk_odds::round_table::build_round_probability_table;
use risk_odds::selector::{select_dice, DiceSelection};
use risk_odds::win_grid::build_battle_win_grid;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < PROBABILITY_TOLERANCE
}

proptest! {
    // 1. Every pairing's outcome row sums to 1 and has no negative entry
    #[test]
    fn round_rows_are_distributions(faces in 2u32..=30) {
        let table = build_round_probability_table(faces).unwrap();
        for attacker_dice in 1..=MAX_ATTACKER_DICE {
            for defender_dice in 1..=MAX_DEFENDER_DICE {
                let sel = DiceSelection { attacker_dice, defender_dice };
                let row = table.outcome_probs(sel);
                prop_assert_eq!(row.len() as u32, sel.comparisons() + 1);
                prop_assert!(row.iter().all(|&p| p >= 0.0));
                let sum: f64 = row.iter().sum();
                prop_assert!(close(sum, 1.0), "faces={} {}v{} sum={}", faces, attacker_dice, defender_dice, sum);
            }
        }
    }

    // 2. Selector caps at 3 and 2 and never rolls more dice than armies
    #[test]
    fn selector_caps(a in 1u32..500, d in 1u32..500) {
        let sel = select_dice(a, d);
        prop_assert_eq!(sel.attacker_dice, a.min(3));
        prop_assert_eq!(sel.defender_dice, d.min(2));
        prop_assert_eq!(sel.comparisons(), sel.attacker_dice.min(sel.defender_dice));
    }

    // 3. A round always removes exactly min(a, d) armies in total
    #[test]
    fn compare_removes_comparisons(
        att in prop::collection::vec(1u32..=6, 1..=3),
        def in prop::collection::vec(1u32..=6, 1..=2),
    ) {
        let (lost_a, lost_d) = compare_dice(&att, &def);
        prop_assert_eq!(lost_a + lost_d, att.len().min(def.len()) as u32);
    }

    // 4. Sorting dice is idempotent
    #[test]
    fn sort_idempotent(dice in prop::collection::vec(1u32..=20, 1..=3)) {
        let mut once = dice.clone();
        sort_dice_descending(&mut once);
        let mut twice = once.clone();
        sort_dice_descending(&mut twice);
        prop_assert_eq!(once, twice);
    }

    // 5. Outcome distribution mass is 1 for every start
    #[test]
    fn distribution_mass_is_one(faces in 2u32..=12, a in 0u32..=15, d in 0u32..=15) {
        prop_assume!(a + d > 0);
        let table = build_round_probability_table(faces).unwrap();
        let dist = compute_battle_outcome_distribution(&table, a, d).unwrap();
        prop_assert!(close(dist.total_probability(), 1.0), "mass={}", dist.total_probability());
        prop_assert!(close(dist.attacker_survivors[0], 0.0));
        prop_assert!(close(dist.defender_survivors[0], 0.0));
    }

    // 6. Grid and distribution agree on P(attacker wins)
    #[test]
    fn grid_matches_distribution(faces in 2u32..=10, a in 1u32..=12, d in 1u32..=12) {
        let table = build_round_probability_table(faces).unwrap();
        let grid = build_battle_win_grid(&table, 12).unwrap();
        let dist = compute_battle_outcome_distribution(&table, a, d).unwrap();
        let from_grid = grid.get(a, d).unwrap();
        prop_assert!(close(from_grid, dist.attacker_win_probability()),
            "faces={} ({},{}) grid={} dist={}", faces, a, d, from_grid, dist.attacker_win_probability());
    }

    // 7. More attackers never hurt, more defenders never help
    #[test]
    fn grid_is_monotone(faces in 2u32..=10, a in 1u32..20, d in 1u32..20) {
        let table = build_round_probability_table(faces).unwrap();
        let grid = build_battle_win_grid(&table, 20).unwrap();
        let p = grid.get(a, d).unwrap();
        prop_assert!(grid.get(a + 1, d).unwrap() >= p - PROBABILITY_TOLERANCE);
        prop_assert!(grid.get(a, d + 1).unwrap() <= p + PROBABILITY_TOLERANCE);
    }

    // 8. A shared memo gives the same answer as a fresh one, in any order
    #[test]
    fn memo_order_independent(starts in prop::collection::vec((0u32..=10, 1u32..=10), 1..6)) {
        let table = build_round_probability_table(6).unwrap();
        let mut cache = DistributionCache::new(6);
        for &(a, d) in &starts {
            let shared = cache.distribution(&table, a, d).unwrap();
            let fresh = compute_battle_outcome_distribution(&table, a, d).unwrap();
            prop_assert_eq!(shared, fresh);
        }
    }
}

#[test]
fn standard_scenarios() {
    let d6 = build_round_probability_table(6).unwrap();
    assert!(close(d6.attacker_round_win_probability(1, 1), 15.0 / 36.0));
    let d4 = build_round_probability_table(4).unwrap();
    assert!(close(d4.attacker_round_win_probability(1, 1), 6.0 / 16.0));
    assert!(close(d4.attacker_round_win_probability(2, 1), 34.0 / 64.0));

    let grid = build_battle_win_grid(&d6, 10).unwrap();
    assert!((grid.get(2, 1).unwrap() - 0.754244).abs() < 1e-6);
    assert!((grid.get(10, 10).unwrap() - 0.567593).abs() < 1e-6);
}

#[test]
fn rebuilt_tables_are_identical() {
    let first = build_round_probability_table(8).unwrap();
    let second = build_round_probability_table(8).unwrap();
    assert_eq!(first, second);
    let g1 = build_battle_win_grid(&first, 15).unwrap();
    let g2 = build_battle_win_grid(&second, 15).unwrap();
    assert_eq!(g1.to_rows(15).unwrap(), g2.to_rows(15).unwrap());
}
