//! Battle win grid: P(attacker eventually wins) for every starting pair up to N.
//!
//! Bottom-up DP over `(attackers, defenders)` in `[0, N] x [0, N]`.
//!
//! Boundaries are fixed values, not recurrence results:
//! - `grid[i][0] = 1` for `i >= 1` (defender already gone)
//! - `grid[0][j] = 0` for `j >= 1`
//!
//! For `i, j >= 1` with `c` comparisons and round probabilities `p_k`:
//!
//! ```text
//! grid[i][j] = sum_{k=0..=c} p_k * grid[i - k][j - (c - k)]
//! ```
//!
//! Since `c <= min(i, j)` after dice capping, every referenced state is inside
//! the grid. States are filled ring by ring in increasing `max(i, j)`; within
//! ring `m`, the row `j = m` (for `i < m`) goes first and then the column
//! `i = m` in ascending `j`, which resolves the in-ring references
//! `(m, j - 2)` and `(m - 2, m)` before they are read.

use std::time::Instant;

use tracing::debug;

use crate::constants::MAX_GRID_SIZE;
use crate::error::{Result, RiskError};
use crate::round_table::RoundProbabilityTable;

#[derive(Clone, Debug)]
pub struct BattleWinGrid {
    face_count: u32,
    max_size: u32,
    /// Row-major, `cells[attackers * (max_size + 1) + defenders]`.
    cells: Vec<f64>,
}

/// Build the grid for all starting pairs in `[0, max_size] x [0, max_size]`.
///
/// `max_size` above [`MAX_GRID_SIZE`] is rejected before anything is allocated.
pub fn build_battle_win_grid(table: &RoundProbabilityTable, max_size: u32) -> Result<BattleWinGrid> {
    if max_size > MAX_GRID_SIZE {
        return Err(RiskError::GridTooLarge {
            size: max_size,
            limit: MAX_GRID_SIZE,
        });
    }
    let start = Instant::now();
    let n = max_size as usize;
    let stride = n + 1;
    let mut cells = vec![0.0f64; stride * stride];

    for i in 1..=n {
        cells[i * stride] = 1.0;
    }

    let fill = |cells: &mut Vec<f64>, i: usize, j: usize| {
        let probs = table.probs_for_armies(i as u32, j as u32);
        let c = probs.len() - 1;
        let mut p = 0.0;
        for (k, &p_k) in probs.iter().enumerate() {
            p += p_k * cells[(i - k) * stride + (j - (c - k))];
        }
        cells[i * stride + j] = p.clamp(0.0, 1.0);
    };

    for m in 1..=n {
        for i in 1..m {
            fill(&mut cells, i, m);
        }
        for j in 1..=m {
            fill(&mut cells, m, j);
        }
    }

    debug!(
        faces = table.face_count(),
        max_size,
        elapsed_us = start.elapsed().as_micros() as u64,
        "built battle win grid"
    );
    Ok(BattleWinGrid {
        face_count: table.face_count(),
        max_size,
        cells,
    })
}

impl BattleWinGrid {
    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    #[inline(always)]
    fn index(&self, attackers: u32, defenders: u32) -> usize {
        attackers as usize * (self.max_size as usize + 1) + defenders as usize
    }

    fn check_bounds(&self, attackers: u32, defenders: u32) -> Result<()> {
        if attackers > self.max_size || defenders > self.max_size {
            return Err(RiskError::GridOutOfRange {
                attackers,
                defenders,
                max_size: self.max_size,
            });
        }
        Ok(())
    }

    /// P(attacker eventually wins) starting from `(attackers, defenders)`.
    ///
    /// `(0, 0)` is not a battle and is rejected.
    pub fn get(&self, attackers: u32, defenders: u32) -> Result<f64> {
        self.check_bounds(attackers, defenders)?;
        if attackers == 0 && defenders == 0 {
            return Err(RiskError::EmptyBattle);
        }
        Ok(self.cells[self.index(attackers, defenders)])
    }

    /// All win probabilities for a fixed attacker count, indexed by defenders `0..=N`.
    /// Entry 0 of row 0 is a placeholder with no meaning.
    pub fn row(&self, attackers: u32) -> Result<&[f64]> {
        self.check_bounds(attackers, 0)?;
        let start = self.index(attackers, 0);
        Ok(&self.cells[start..start + self.max_size as usize + 1])
    }

    /// The displayed part of the grid: attackers `1..=size` by defenders `1..=size`.
    pub fn to_rows(&self, size: u32) -> Result<Vec<Vec<f64>>> {
        self.check_bounds(size, size)?;
        (1..=size)
            .map(|a| Ok(self.row(a)?[1..=size as usize].to_vec()))
            .collect()
    }
}
