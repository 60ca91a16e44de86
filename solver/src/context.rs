//! Process-lifetime caches, keyed by die face count.
//!
//! [`RiskContext`] is what long-running consumers (the HTTP server) hold
//! behind an `Arc`. Everything in it is derived from a
//! [`RoundProbabilityTable`], and every cache is keyed by face count so a
//! result for one die is never served for another.
//!
//! Only the [`STANDARD_FACE_COUNTS`] are retained, which keeps the caches
//! bounded no matter which dice callers ask for. Any other face count is
//! computed for the query and dropped afterwards.
//!
//! - Round tables: built (or loaded from the data dir) on first use, then kept.
//! - Win grids: built at `grid_size`, rebuilt larger when a query exceeds it.
//! - Distribution memos: one [`DistributionCache`] per face count, behind a
//!   mutex since a memo is written during a query.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info};

use crate::constants::{DEFAULT_GRID_SIZE, STANDARD_FACE_COUNTS};
use crate::distribution::{DistributionCache, OutcomeDistribution};
use crate::error::Result;
use crate::round_table::{build_round_probability_table, build_tables, RoundProbabilityTable};
use crate::storage::load_or_build_round_table;
use crate::types;
use crate::win_grid::{build_battle_win_grid, BattleWinGrid};

fn is_standard(faces: u32) -> bool {
    STANDARD_FACE_COUNTS.contains(&faces)
}

pub struct RiskContext {
    data_dir: Option<PathBuf>,
    grid_size: u32,
    tables: RwLock<HashMap<u32, Arc<RoundProbabilityTable>>>,
    grids: RwLock<HashMap<u32, Arc<BattleWinGrid>>>,
    distributions: Mutex<HashMap<u32, DistributionCache>>,
}

impl Default for RiskContext {
    fn default() -> Self {
        Self::new(None, DEFAULT_GRID_SIZE)
    }
}

impl RiskContext {
    /// `data_dir`: where stored round tables are looked up (never written).
    /// `grid_size`: bound of the win grid built on first use per face count.
    pub fn new(data_dir: Option<PathBuf>, grid_size: u32) -> Self {
        Self {
            data_dir,
            grid_size,
            tables: RwLock::new(HashMap::new()),
            grids: RwLock::new(HashMap::new()),
            distributions: Mutex::new(HashMap::new()),
        }
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Face counts holding any cached table, grid or memo, ascending.
    pub fn cached_face_counts(&self) -> Vec<u32> {
        let mut faces: Vec<u32> = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .chain(self.grids.read().unwrap_or_else(PoisonError::into_inner).keys())
            .chain(
                self.distributions
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .keys(),
            )
            .copied()
            .collect();
        faces.sort_unstable();
        faces.dedup();
        faces
    }

    /// Build every standard table in parallel and cache them.
    pub fn warm_standard_tables(&self) -> Result<()> {
        let missing: Vec<u32> = {
            let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
            STANDARD_FACE_COUNTS
                .iter()
                .copied()
                .filter(|f| !tables.contains_key(f))
                .collect()
        };
        if missing.is_empty() {
            return Ok(());
        }

        let built = match &self.data_dir {
            Some(dir) => missing
                .iter()
                .map(|&f| load_or_build_round_table(dir, f, false))
                .collect::<Result<Vec<_>>>()?,
            None => build_tables(&missing)?,
        };
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        for table in built {
            tables.entry(table.face_count()).or_insert_with(|| Arc::new(table));
        }
        info!(face_counts = ?missing, "warmed round tables");
        Ok(())
    }

    /// Round table for `faces`, built or loaded on first use.
    pub fn round_table(&self, faces: u32) -> Result<Arc<RoundProbabilityTable>> {
        types::face_count(faces as i64)?;
        if let Some(table) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&faces)
        {
            return Ok(Arc::clone(table));
        }

        let table = match &self.data_dir {
            Some(dir) => load_or_build_round_table(dir, faces, false)?,
            None => build_round_probability_table(faces)?,
        };
        if !is_standard(faces) {
            debug!(faces, "built uncached round table");
            return Ok(Arc::new(table));
        }
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            tables.entry(faces).or_insert_with(|| Arc::new(table)),
        ))
    }

    /// Win grid for `faces` covering at least `min_size` on both axes.
    pub fn win_grid(&self, faces: u32, min_size: u32) -> Result<Arc<BattleWinGrid>> {
        if let Some(grid) = self
            .grids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&faces)
        {
            if grid.max_size() >= min_size {
                return Ok(Arc::clone(grid));
            }
        }

        let table = self.round_table(faces)?;
        if !is_standard(faces) {
            return Ok(Arc::new(build_battle_win_grid(&table, min_size)?));
        }
        let size = min_size.max(self.grid_size);
        let grid = Arc::new(build_battle_win_grid(&table, size)?);
        info!(faces, size, "built win grid");

        let mut grids = self.grids.write().unwrap_or_else(PoisonError::into_inner);
        let entry = grids.entry(faces).or_insert_with(|| Arc::clone(&grid));
        if entry.max_size() < size {
            *entry = Arc::clone(&grid);
        }
        Ok(Arc::clone(entry))
    }

    /// P(attacker eventually wins) from `(attackers, defenders)` with `faces`-sided dice.
    pub fn win_probability(&self, faces: u32, attackers: u32, defenders: u32) -> Result<f64> {
        self.win_grid(faces, attackers.max(defenders))?
            .get(attackers, defenders)
    }

    /// Survivor distributions for one battle. Memoized for standard dice,
    /// solved with a private memo otherwise.
    pub fn outcome_distribution(
        &self,
        faces: u32,
        attackers: u32,
        defenders: u32,
    ) -> Result<OutcomeDistribution> {
        let table = self.round_table(faces)?;
        if !is_standard(faces) {
            return DistributionCache::new(faces).distribution(&table, attackers, defenders);
        }
        let mut caches = self
            .distributions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        caches
            .entry(faces)
            .or_insert_with(|| DistributionCache::new(faces))
            .distribution(&table, attackers, defenders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;

    #[test]
    fn test_tables_are_cached_per_face_count() {
        let ctx = RiskContext::default();
        let a = ctx.round_table(6).unwrap();
        let b = ctx.round_table(6).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = ctx.round_table(8).unwrap();
        assert_eq!(c.face_count(), 8);
        assert!(matches!(
            ctx.round_table(1),
            Err(RiskError::InvalidFaceCount { .. })
        ));
    }

    #[test]
    fn test_grid_grows_on_demand() {
        let ctx = RiskContext::new(None, 10);
        let small = ctx.win_grid(6, 5).unwrap();
        assert_eq!(small.max_size(), 10);
        let big = ctx.win_grid(6, 25).unwrap();
        assert_eq!(big.max_size(), 25);
        assert!((ctx.win_probability(6, 40, 3).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(ctx.win_grid(6, 1).unwrap().max_size(), 40);
    }

    #[test]
    fn test_face_counts_do_not_share_results() {
        let ctx = RiskContext::default();
        let six = ctx.win_probability(6, 1, 1).unwrap();
        let four = ctx.win_probability(4, 1, 1).unwrap();
        assert!((six - 15.0 / 36.0).abs() < 1e-12);
        assert!((four - 0.375).abs() < 1e-12);

        let d6 = ctx.outcome_distribution(6, 1, 1).unwrap();
        let d4 = ctx.outcome_distribution(4, 1, 1).unwrap();
        assert!((d6.attacker_win_probability() - six).abs() < 1e-12);
        assert!((d4.attacker_win_probability() - four).abs() < 1e-12);
    }

    #[test]
    fn test_warm_standard_tables() {
        let ctx = RiskContext::default();
        ctx.warm_standard_tables().unwrap();
        for f in STANDARD_FACE_COUNTS {
            assert_eq!(ctx.round_table(f).unwrap().face_count(), f);
        }
    }
    #[test]
    fn test_only_standard_dice_are_retained() {
        let ctx = RiskContext::new(None, 10);
        for faces in [5, 7, 100] {
            ctx.outcome_distribution(faces, 20, 20).unwrap();
            ctx.win_probability(faces, 15, 3).unwrap();
        }
        assert!(ctx.cached_face_counts().is_empty());

        let fresh = ctx.round_table(7).unwrap();
        assert!(!Arc::ptr_eq(&fresh, &ctx.round_table(7).unwrap()));

        ctx.outcome_distribution(6, 20, 20).unwrap();
        ctx.win_probability(12, 2, 2).unwrap();
        assert_eq!(ctx.cached_face_counts(), vec![6, 12]);
    }

    #[test]
    fn test_oversized_grid_is_an_error() {
        let ctx = RiskContext::new(None, 10);
        assert!(matches!(
            ctx.win_grid(6, u32::MAX),
            Err(RiskError::GridTooLarge { .. })
        ));
        assert_eq!(ctx.win_grid(6, 5).unwrap().max_size(), 10);
    }
}
