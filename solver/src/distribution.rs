//! Battle outcome distribution: how many armies the winner has left.
//!
//! For a start `(A, D)` this computes two exact distributions:
//! - `attacker_survivors[k]` = P(attacker wins with `k` armies left), `k in 0..=A`
//! - `defender_survivors[k]` = P(defender wins with `k` armies left), `k in 0..=D`
//!
//! Together they carry all probability mass. Entry 0 of each is always 0
//! because a side with no armies left has not won.
//!
//! ## Recursion
//!
//! The battle is a Markov chain on [`BattleState`]. A state's distribution is
//! the `p_k`-weighted sum of the distributions of the states one round later,
//! with terminal states as base cases. Memoizing per state makes this
//! O(A * D) states with O(1) branches each; without the memo the branching is
//! exponential in `A + D`.
//!
//! The memo lives in a [`DistributionCache`] owned by the caller and tied to a
//! single face count. Mixing a cache with a table for different dice would
//! silently return wrong numbers, so it is rejected.
//!
//! ## Size
//!
//! Every solved state keeps both survivor vectors, so a memo for `(A, D)`
//! holds about `A * D * (A + D)` floats. `(100, 100)` is a few MB; `(15000, 1)`
//! is close to 2 GB. Stack use does not grow with the battle length.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, RiskError};
use crate::round_table::RoundProbabilityTable;
use crate::selector::select_dice;
use crate::types::BattleState;

/// Final survivor distributions for one starting state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutcomeDistribution {
    pub start: BattleState,
    pub attacker_survivors: Vec<f64>,
    pub defender_survivors: Vec<f64>,
}

impl OutcomeDistribution {
    pub fn attacker_win_probability(&self) -> f64 {
        self.attacker_survivors.iter().sum()
    }

    pub fn defender_win_probability(&self) -> f64 {
        self.defender_survivors.iter().sum()
    }

    pub fn total_probability(&self) -> f64 {
        self.attacker_win_probability() + self.defender_win_probability()
    }

    /// Mean attackers left given the attacker wins. `None` if it never does.
    pub fn expected_attackers_if_win(&self) -> Option<f64> {
        conditional_mean(&self.attacker_survivors)
    }

    /// Mean defenders left given the defender wins. `None` if it never does.
    pub fn expected_defenders_if_win(&self) -> Option<f64> {
        conditional_mean(&self.defender_survivors)
    }

    /// `(survivors, probability)` for every attacker win with non-zero probability.
    pub fn attacker_outcomes(&self) -> Vec<(u32, f64)> {
        nonzero_outcomes(&self.attacker_survivors)
    }

    /// `(survivors, probability)` for every defender win with non-zero probability.
    pub fn defender_outcomes(&self) -> Vec<(u32, f64)> {
        nonzero_outcomes(&self.defender_survivors)
    }
}

fn conditional_mean(survivors: &[f64]) -> Option<f64> {
    let mass: f64 = survivors.iter().sum();
    if mass <= 0.0 {
        return None;
    }
    let weighted: f64 = survivors
        .iter()
        .enumerate()
        .map(|(k, &p)| k as f64 * p)
        .sum();
    Some(weighted / mass)
}

fn nonzero_outcomes(survivors: &[f64]) -> Vec<(u32, f64)> {
    survivors
        .iter()
        .enumerate()
        .filter(|&(_, &p)| p > 0.0)
        .map(|(k, &p)| (k as u32, p))
        .collect()
}

/// Survivor vectors for one memoized state.
#[derive(Clone, Debug)]
struct Survivors {
    attacker: Vec<f64>,
    defender: Vec<f64>,
}

/// Memo of solved battle states for one die face count.
///
/// Reusing a cache across queries makes later queries that pass through
/// already-solved states cheap. It is not shared across face counts.
#[derive(Debug)]
pub struct DistributionCache {
    face_count: u32,
    memo: HashMap<BattleState, Survivors>,
}

impl DistributionCache {
    pub fn new(face_count: u32) -> Self {
        Self {
            face_count,
            memo: HashMap::new(),
        }
    }

    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    /// Number of memoized states.
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    pub fn clear(&mut self) {
        self.memo.clear();
    }

    /// Outcome distribution for `(attackers, defenders)`, filling the memo as needed.
    pub fn distribution(
        &mut self,
        table: &RoundProbabilityTable,
        attackers: u32,
        defenders: u32,
    ) -> Result<OutcomeDistribution> {
        if table.face_count() != self.face_count {
            return Err(RiskError::FaceCountMismatch {
                expected: self.face_count,
                found: table.face_count(),
            });
        }
        if attackers == 0 && defenders == 0 {
            return Err(RiskError::EmptyBattle);
        }

        let start = BattleState::new(attackers, defenders);
        let before = self.memo.len();
        self.solve(table, start);
        debug!(
            faces = self.face_count,
            attackers,
            defenders,
            new_states = self.memo.len() - before,
            "computed outcome distribution"
        );

        let solved = &self.memo[&start];
        Ok(OutcomeDistribution {
            start,
            attacker_survivors: solved.attacker.clone(),
            defender_survivors: solved.defender.clone(),
        })
    }

    /// Solve `start` and every state it can reach, successors first.
    ///
    /// Uses an explicit work stack, so the call depth stays constant however
    /// long the battle can last.
    fn solve(&mut self, table: &RoundProbabilityTable, start: BattleState) {
        let mut pending = vec![start];
        while let Some(&state) = pending.last() {
            if self.memo.contains_key(&state) {
                pending.pop();
                continue;
            }

            let selection = (!state.is_terminal())
                .then(|| select_dice(state.attackers, state.defenders));
            if let Some(selection) = selection {
                let c = selection.comparisons();
                let waiting = pending.len();
                for k in 0..=c {
                    let next = state.after_round(k, c - k);
                    if !self.memo.contains_key(&next) {
                        pending.push(next);
                    }
                }
                if pending.len() > waiting {
                    continue;
                }
            }

            let a = state.attackers as usize;
            let d = state.defenders as usize;
            let mut attacker = vec![0.0f64; a + 1];
            let mut defender = vec![0.0f64; d + 1];
            match selection {
                None if state.attackers == 0 => defender[d] = 1.0,
                None => attacker[a] = 1.0,
                Some(selection) => {
                    let c = selection.comparisons();
                    // A successor never has more armies than this state, so
                    // its vectors fit inside ours.
                    for (k, &p_k) in table.outcome_probs(selection).iter().enumerate() {
                        let next = state.after_round(k as u32, c - k as u32);
                        let sub = &self.memo[&next];
                        for (acc, &p) in attacker.iter_mut().zip(&sub.attacker) {
                            *acc += p_k * p;
                        }
                        for (acc, &p) in defender.iter_mut().zip(&sub.defender) {
                            *acc += p_k * p;
                        }
                    }
                }
            }

            pending.pop();
            self.memo.insert(state, Survivors { attacker, defender });
        }
    }
}

/// Outcome distribution for one battle with a fresh, private memo.
pub fn compute_battle_outcome_distribution(
    table: &RoundProbabilityTable,
    attackers: u32,
    defenders: u32,
) -> Result<OutcomeDistribution> {
    DistributionCache::new(table.face_count()).distribution(table, attackers, defenders)
}
