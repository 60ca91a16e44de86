//! Monte Carlo battle simulation, used to cross-check the exact results.
//!
//! Plays battles by rolling real dice with the same capping and tie rules as
//! the exact model. Trial `i` uses `SmallRng::seed_from_u64(seed + i)`, so a
//! batch is reproducible regardless of how rayon schedules it.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::constants::{MAX_ATTACKER_DICE, MAX_DEFENDER_DICE};
use crate::dice_mechanics::{compare_dice, sort_dice_descending};
use crate::error::{Result, RiskError};
use crate::selector::select_dice;
use crate::types::{self, BattleState};

/// Roll `out.len()` dice and sort them descending.
#[inline(always)]
fn roll_dice(rng: &mut SmallRng, faces: u32, out: &mut [u32]) {
    for d in out.iter_mut() {
        *d = rng.random_range(1..=faces);
    }
    sort_dice_descending(out);
}

/// Play one battle to the end and return the terminal state.
pub fn simulate_battle(rng: &mut SmallRng, faces: u32, start: BattleState) -> BattleState {
    let mut state = start;
    let mut attacker_roll = [0u32; MAX_ATTACKER_DICE as usize];
    let mut defender_roll = [0u32; MAX_DEFENDER_DICE as usize];

    while !state.is_terminal() {
        let selection = select_dice(state.attackers, state.defenders);
        let a = &mut attacker_roll[..selection.attacker_dice as usize];
        let d = &mut defender_roll[..selection.defender_dice as usize];
        roll_dice(rng, faces, a);
        roll_dice(rng, faces, d);
        let (attacker_losses, defender_losses) = compare_dice(a, d);
        state = state.after_round(attacker_losses, defender_losses);
    }
    state
}

/// Survivor histograms from a batch of simulated battles.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub start: BattleState,
    pub trials: usize,
    /// `attacker_survivors[k]` = battles the attacker won with `k` armies left.
    pub attacker_survivors: Vec<u64>,
    /// `defender_survivors[k]` = battles the defender won with `k` armies left.
    pub defender_survivors: Vec<u64>,
}

impl SimulationSummary {
    fn empty(start: BattleState) -> Self {
        Self {
            start,
            trials: 0,
            attacker_survivors: vec![0; start.attackers as usize + 1],
            defender_survivors: vec![0; start.defenders as usize + 1],
        }
    }

    fn record(mut self, end: BattleState) -> Self {
        self.trials += 1;
        if end.defenders == 0 {
            self.attacker_survivors[end.attackers as usize] += 1;
        } else {
            self.defender_survivors[end.defenders as usize] += 1;
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.trials += other.trials;
        for (a, b) in self.attacker_survivors.iter_mut().zip(&other.attacker_survivors) {
            *a += b;
        }
        for (a, b) in self.defender_survivors.iter_mut().zip(&other.defender_survivors) {
            *a += b;
        }
        self
    }

    pub fn attacker_wins(&self) -> u64 {
        self.attacker_survivors.iter().sum()
    }

    pub fn attacker_win_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.attacker_wins() as f64 / self.trials as f64
    }
}

/// Simulate `trials` battles from `(attackers, defenders)` in parallel.
pub fn estimate_outcomes(
    faces: u32,
    attackers: u32,
    defenders: u32,
    trials: usize,
    seed: u64,
) -> Result<SimulationSummary> {
    let faces = types::face_count(faces as i64)?;
    if attackers == 0 && defenders == 0 {
        return Err(RiskError::EmptyBattle);
    }
    let start = BattleState::new(attackers, defenders);
    let timer = Instant::now();

    let summary = (0..trials)
        .into_par_iter()
        .map(|i| {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(i as u64));
            simulate_battle(&mut rng, faces, start)
        })
        .fold(|| SimulationSummary::empty(start), SimulationSummary::record)
        .reduce(|| SimulationSummary::empty(start), SimulationSummary::merge);

    debug!(
        faces,
        attackers,
        defenders,
        trials,
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "simulated battles"
    );
    Ok(summary)
}
