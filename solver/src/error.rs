//! Error type shared by every fallible operation in the crate.
//!
//! All computations are deterministic, so every error is a caller or
//! configuration mistake. Nothing here is worth retrying.

use std::path::PathBuf;

use thiserror::Error;

use crate::constants::{MAX_FACE_COUNT, MIN_FACE_COUNT};
use crate::types::ArmySide;

#[derive(Debug, Error)]
pub enum RiskError {
    #[error("die face count must be in {}..={}, got {faces}", MIN_FACE_COUNT, MAX_FACE_COUNT)]
    InvalidFaceCount { faces: i64 },

    #[error("die face count {faces} exceeds the limit of {limit}")]
    FaceCountTooLarge { faces: i64, limit: i64 },

    #[error("{side} army size must be non-negative, got {value}")]
    NegativeArmySize { side: ArmySide, value: i64 },

    #[error("{side} army size {value} exceeds the limit of {limit}")]
    ArmySizeTooLarge {
        side: ArmySide,
        value: i64,
        limit: i64,
    },

    #[error(
        "win grid lookup ({attackers}, {defenders}) is outside the built bound {max_size}; \
         rebuild the grid with a larger size"
    )]
    GridOutOfRange {
        attackers: u32,
        defenders: u32,
        max_size: u32,
    },

    #[error("win grid size {size} exceeds the limit of {limit}")]
    GridTooLarge { size: u32, limit: u32 },

    #[error("a battle needs at least one army on some side, got 0 vs 0")]
    EmptyBattle,

    #[error("table built for {found}-sided dice used where {expected}-sided dice were expected")]
    FaceCountMismatch { expected: u32, found: u32 },

    #[error("malformed round table: {reason}")]
    MalformedTable { reason: String },

    #[error("invalid round table file {}: {reason}", path.display())]
    InvalidTableFile { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RiskError>;
