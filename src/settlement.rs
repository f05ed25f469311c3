//! Settlement engine: turns a roll and the held bet into a payout decision.
//!
//! Even money: a winning bet returns twice its stake (stake plus profit).
//! Triples lose for both sides. The stake was debited at placement, so a
//! loss needs no further balance change.

use crate::{
    dice::{
        DiceSource,
        Roll,
        Side,
    },
    ledger::Bet,
};

pub const PAYOUT_MULTIPLIER: u64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BetOutcome {
    Won { payout: u64, profit: u64 },
    Lost { stake: u64 },
}

impl BetOutcome {
    pub fn is_win(&self) -> bool {
        matches!(self, BetOutcome::Won { .. })
    }

    /// Amount credited back to the balance.
    pub fn payout(&self) -> u64 {
        match self {
            BetOutcome::Won { payout, .. } => *payout,
            BetOutcome::Lost { .. } => 0,
        }
    }

    /// Signed change relative to the balance before the bet was placed.
    pub fn net(&self) -> i64 {
        match *self {
            BetOutcome::Won { profit, .. } => clamp_i64(profit as i128),
            BetOutcome::Lost { stake } => clamp_i64(-(stake as i128)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub roll: Roll,
    pub total: u8,
    /// Display label; see [`Roll::label`].
    pub label: Side,
    pub triple: bool,
    pub bet: Option<Bet>,
    /// `None` when no bet was held.
    pub outcome: Option<BetOutcome>,
}

impl Settlement {
    pub fn won(&self) -> Option<bool> {
        self.outcome.map(|o| o.is_win())
    }

    pub fn payout(&self) -> u64 {
        self.outcome.map_or(0, |o| o.payout())
    }

    pub fn net(&self) -> Option<i64> {
        self.outcome.map(|o| o.net())
    }
}

pub fn settle(roll: Roll, bet: Option<Bet>) -> Settlement {
    let outcome = bet.map(|bet| {
        if roll.winning_side() == Some(bet.side) {
            let payout = bet.amount.saturating_mul(PAYOUT_MULTIPLIER);
            BetOutcome::Won {
                payout,
                profit: payout - bet.amount,
            }
        } else {
            BetOutcome::Lost { stake: bet.amount }
        }
    });
    Settlement {
        roll,
        total: roll.total(),
        label: roll.label(),
        triple: roll.is_triple(),
        bet,
        outcome,
    }
}

/// Draws three fresh dice and settles the held bet against them.
pub fn draw_and_settle<D: DiceSource + ?Sized>(dice: &mut D, bet: Option<Bet>) -> Settlement {
    settle(dice.roll(), bet)
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
