use crate::{
    dice::Side,
    error::BetError,
    round::Phase,
};

/// The player's stake for the current round. One side per round; repeated
/// placements on that side add up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bet {
    pub side: Side,
    pub amount: u64,
}

/// Balance plus the single held bet. The stake leaves the balance the moment
/// it is placed; settlement only ever credits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BetLedger {
    balance: u64,
    held: Option<Bet>,
}

impl BetLedger {
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            held: None,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn held(&self) -> Option<Bet> {
        self.held
    }

    /// Everything `place` checks except the amount.
    pub fn check(&self, phase: Phase, side: Side) -> Result<(), BetError> {
        if !phase.accepts_bets() {
            return Err(BetError::PhaseNotOpen { phase });
        }
        match self.held {
            Some(held) if held.side != side => Err(BetError::ConflictingSide {
                held: held.side,
                attempted: side,
            }),
            _ => Ok(()),
        }
    }

    /// Debits `amount` and adds it to the held bet. Returns the new balance.
    /// On error nothing changes.
    pub fn place(&mut self, phase: Phase, side: Side, amount: u64) -> Result<u64, BetError> {
        self.check(phase, side)?;
        if amount == 0 {
            return Err(BetError::ZeroAmount);
        }
        if amount > self.balance {
            return Err(BetError::InsufficientBalance {
                requested: amount,
                available: self.balance,
            });
        }
        let stake = self.held.map_or(0, |b| b.amount).saturating_add(amount);
        self.balance -= amount;
        self.held = Some(Bet {
            side,
            amount: stake,
        });
        Ok(self.balance)
    }

    pub fn credit(&mut self, amount: u64) -> u64 {
        self.balance = self.balance.saturating_add(amount);
        self.balance
    }

    /// Drops the held bet without touching the balance.
    pub fn clear(&mut self) -> Option<Bet> {
        self.held.take()
    }

    /// Drops the held bet and returns its stake to the balance.
    pub fn refund(&mut self) -> Option<Bet> {
        let bet = self.held.take()?;
        self.credit(bet.amount);
        Some(bet)
    }
}
