//! Dice-count selector: how many dice each side actually rolls.

use serde::Serialize;

use crate::constants::{MAX_ATTACKER_DICE, MAX_DEFENDER_DICE};
use crate::dice_mechanics;

/// Dice rolled in one round, after capping by army size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DiceSelection {
    pub attacker_dice: u32,
    pub defender_dice: u32,
}

impl DiceSelection {
    /// Positional comparisons in the round: `min(attacker_dice, defender_dice)`.
    #[inline(always)]
    pub fn comparisons(&self) -> u32 {
        dice_mechanics::comparisons(self.attacker_dice, self.defender_dice)
    }
}

/// Cap army sizes to the dice rolled: attacker at most 3, defender at most 2.
///
/// Both sides must have at least one army. A side with 0 armies never rolls;
/// callers treat that state as terminal before getting here.
#[inline]
pub fn select_dice(attackers: u32, defenders: u32) -> DiceSelection {
    debug_assert!(
        attackers >= 1 && defenders >= 1,
        "select_dice called on terminal state ({attackers}, {defenders})"
    );
    DiceSelection {
        attacker_dice: attackers.min(MAX_ATTACKER_DICE),
        defender_dice: defenders.min(MAX_DEFENDER_DICE),
    }
}
