//! # risk-odds: exact odds for Risk-style dice battles
//!
//! An attacker rolls up to 3 dice and a defender up to 2. Both sort their dice
//! highest first and compare position by position; each comparison costs the
//! loser one army, and ties go to the defender. A battle repeats rounds until
//! one side has no armies left.
//!
//! Everything here is exact: probabilities come from integer tallies over all
//! equally likely rolls, not from sampling.
//!
//! ## Pipeline
//!
//! | Step | Module | Description |
//! |------|--------|-------------|
//! | 1 | [`dice_mechanics`] | Tally attacker losses over every roll for one dice pairing |
//! | 2 | [`round_table`] | Normalize tallies for all 6 pairings into a `[3, 2, 3]` table per face count |
//! | 3 | [`selector`] | Cap army sizes to dice rolled (attacker ≤ 3, defender ≤ 2) |
//! | 4a | [`win_grid`] | Bottom-up DP: P(attacker wins) for every start up to N |
//! | 4b | [`distribution`] | Memoized recursion: full survivor distribution for one start |
//!
//! Steps 4a and 4b are independent but must agree:
//! `win_grid[A][D] == sum(attacker survivors of (A, D))`.
//!
//! ## Around the core
//!
//! - [`storage`]: one 160-byte binary file per face count, loaded instead of rebuilt.
//! - [`context`]: process-lifetime caches keyed by face count.
//! - [`server`]: axum API over the context.
//! - [`report`]: display strings and a text heatmap.
//! - [`simulation`]: Monte Carlo battles for cross-checking.

pub mod constants;
pub mod context;
pub mod dice_mechanics;
pub mod distribution;
pub mod env_config;
pub mod error;
pub mod report;
pub mod round_table;
pub mod selector;
pub mod server;
pub mod simulation;
pub mod storage;
pub mod types;
pub mod win_grid;

pub use distribution::{compute_battle_outcome_distribution, DistributionCache, OutcomeDistribution};
pub use error::{Result, RiskError};
pub use round_table::{build_round_probability_table, RoundProbabilityTable};
pub use win_grid::{build_battle_win_grid, BattleWinGrid};
