//! Battle state and validation of untyped inputs.
//!
//! The numeric core takes `u32` army sizes and face counts, so invalid values
//! cannot reach it. Inputs that arrive as signed integers (query strings, CLI
//! flags) go through [`army_size`] and [`face_count`] first.

use std::fmt;

use serde::Serialize;

use crate::constants::{MAX_FACE_COUNT, MIN_FACE_COUNT};
use crate::error::{Result, RiskError};

/// Which side of a battle a value refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmySide {
    Attacker,
    Defender,
}

impl fmt::Display for ArmySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmySide::Attacker => f.write_str("attacker"),
            ArmySide::Defender => f.write_str("defender"),
        }
    }
}

/// Armies remaining on each side. Terminal when either side is 0.
///
/// Only the current pair matters for how a battle continues, which is what
/// makes it a valid memoization key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct BattleState {
    pub attackers: u32,
    pub defenders: u32,
}

impl BattleState {
    pub fn new(attackers: u32, defenders: u32) -> Self {
        Self {
            attackers,
            defenders,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.attackers == 0 || self.defenders == 0
    }

    /// The side left standing, if the battle is over.
    ///
    /// `(0, 0)` is not a reachable state and has no winner.
    pub fn winner(&self) -> Option<ArmySide> {
        match (self.attackers, self.defenders) {
            (0, 0) => None,
            (_, 0) => Some(ArmySide::Attacker),
            (0, _) => Some(ArmySide::Defender),
            _ => None,
        }
    }

    /// State after one round with the given losses.
    #[inline]
    pub fn after_round(&self, attacker_losses: u32, defender_losses: u32) -> Self {
        debug_assert!(attacker_losses <= self.attackers);
        debug_assert!(defender_losses <= self.defenders);
        Self {
            attackers: self.attackers - attacker_losses,
            defenders: self.defenders - defender_losses,
        }
    }
}

/// Validate a signed army size.
pub fn army_size(side: ArmySide, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(RiskError::NegativeArmySize { side, value });
    }
    u32::try_from(value).map_err(|_| RiskError::ArmySizeTooLarge {
        side,
        value,
        limit: u32::MAX as i64,
    })
}

/// Validate a signed die face count.
pub fn face_count(value: i64) -> Result<u32> {
    if value < MIN_FACE_COUNT as i64 || value > MAX_FACE_COUNT as i64 {
        return Err(RiskError::InvalidFaceCount { faces: value });
    }
    Ok(value as u32)
}
