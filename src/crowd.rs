//! Simulated table activity from other players. Purely cosmetic: none of it
//! feeds into settlement.

use crate::{
    dice::Side,
    ledger::Bet,
};
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};

const OPENING_TAI_AMOUNT: u64 = 391_504_490;
const OPENING_XIU_AMOUNT: u64 = 381_204_100;
const OPENING_TAI_PLAYERS: u64 = 2_137;
const OPENING_XIU_PLAYERS: u64 = 1_385;

const ROUND_BASE_AMOUNT: u64 = 300_000_000;
const ROUND_AMOUNT_SPREAD: u64 = 10_000_000;
const ROUND_BASE_PLAYERS: u64 = 1_000;
const ROUND_PLAYER_SPREAD: u64 = 500;

const FLUCTUATE_PROBABILITY: f64 = 0.7;
const MAX_TICK_AMOUNT: u64 = 500_000;
const NEW_PLAYER_PROBABILITY: f64 = 0.2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SideTotals {
    pub amount: u64,
    pub players: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CrowdTotals {
    pub tai: SideTotals,
    pub xiu: SideTotals,
}

impl CrowdTotals {
    pub fn side(&self, side: Side) -> SideTotals {
        match side {
            Side::Tai => self.tai,
            Side::Xiu => self.xiu,
        }
    }

    /// Folds the player's own bet into the displayed figures.
    pub fn with_bet(mut self, bet: Option<Bet>) -> Self {
        if let Some(bet) = bet {
            let totals = match bet.side {
                Side::Tai => &mut self.tai,
                Side::Xiu => &mut self.xiu,
            };
            totals.amount = totals.amount.saturating_add(bet.amount);
            totals.players += 1;
        }
        self
    }
}

#[derive(Clone, Debug)]
pub struct Crowd {
    totals: CrowdTotals,
    rng: StdRng,
}

impl Crowd {
    pub fn new(rng: StdRng) -> Self {
        Self {
            totals: CrowdTotals {
                tai: SideTotals {
                    amount: OPENING_TAI_AMOUNT,
                    players: OPENING_TAI_PLAYERS,
                },
                xiu: SideTotals {
                    amount: OPENING_XIU_AMOUNT,
                    players: OPENING_XIU_PLAYERS,
                },
            },
            rng,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn totals(&self) -> CrowdTotals {
        self.totals
    }

    /// One betting second worth of activity.
    pub fn fluctuate(&mut self) {
        if !self.rng.random_bool(FLUCTUATE_PROBABILITY) {
            return;
        }
        for totals in [&mut self.totals.tai, &mut self.totals.xiu] {
            totals.amount = totals
                .amount
                .saturating_add(self.rng.random_range(0..MAX_TICK_AMOUNT));
        }
        for totals in [&mut self.totals.tai, &mut self.totals.xiu] {
            if self.rng.random_bool(NEW_PLAYER_PROBABILITY) {
                totals.players += 1;
            }
        }
    }

    /// Fresh table for a new round.
    pub fn reseed(&mut self) {
        for totals in [&mut self.totals.tai, &mut self.totals.xiu] {
            totals.amount = ROUND_BASE_AMOUNT + self.rng.random_range(0..ROUND_AMOUNT_SPREAD);
            totals.players = ROUND_BASE_PLAYERS + self.rng.random_range(0..ROUND_PLAYER_SPREAD);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn fluctuate__never_shrinks_totals() {
        let mut crowd = Crowd::seeded(1);
        let mut prev = crowd.totals();
        for _ in 0..200 {
            crowd.fluctuate();
            let now = crowd.totals();
            assert!(now.tai.amount >= prev.tai.amount);
            assert!(now.xiu.amount >= prev.xiu.amount);
            assert!(now.tai.amount - prev.tai.amount < MAX_TICK_AMOUNT);
            assert!(now.tai.players - prev.tai.players <= 1);
            prev = now;
        }
    }

    #[test]
    fn reseed__lands_in_round_ranges() {
        let mut crowd = Crowd::seeded(9);
        for _ in 0..50 {
            crowd.reseed();
            for side in [Side::Tai, Side::Xiu] {
                let t = crowd.totals().side(side);
                assert!((ROUND_BASE_AMOUNT..ROUND_BASE_AMOUNT + ROUND_AMOUNT_SPREAD)
                    .contains(&t.amount));
                assert!((ROUND_BASE_PLAYERS..ROUND_BASE_PLAYERS + ROUND_PLAYER_SPREAD)
                    .contains(&t.players));
            }
        }
    }

    #[test]
    fn with_bet__adds_player_and_amount_to_backed_side() {
        // given
        let totals = CrowdTotals {
            tai: SideTotals {
                amount: 100,
                players: 2,
            },
            xiu: SideTotals {
                amount: 50,
                players: 1,
            },
        };

        // when
        let merged = totals.with_bet(Some(Bet {
            side: Side::Xiu,
            amount: 25,
        }));

        // then
        assert_eq!(merged.tai, totals.tai);
        assert_eq!(
            merged.xiu,
            SideTotals {
                amount: 75,
                players: 2
            }
        );
    }
}
