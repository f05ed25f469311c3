//! The table: one owned context holding the round machine, the ledger, the
//! history and the dice source.
//!
//! Nothing in here sleeps or spawns. Ticks, fired timers and player commands
//! come in; [`Effect`]s describing timers to arm or cancel and events for the
//! presentation layer go out. The host decides how time passes.

use crate::{
    config::GameConfig,
    crowd::{
        Crowd,
        CrowdTotals,
    },
    dice::{
        DiceSource,
        Roll,
        Side,
    },
    error::BetError,
    history::RoundHistory,
    ledger::{
        Bet,
        BetLedger,
    },
    round::{
        Phase,
        RoundMachine,
        RoundState,
        Transition,
    },
    settlement::{
        Settlement,
        draw_and_settle,
    },
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};
use std::time::Duration;
use tracing::{
    debug,
    info,
    warn,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    /// Ends the shake and draws the dice.
    FinalizeRoll,
    /// Credits the payout and records the total once the bowl is lifted.
    Reveal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Schedule { timer: TimerKind, after: Duration },
    Cancel(TimerKind),
    Emit(GameEvent),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    RoundStarted {
        round_id: u64,
    },
    RollFinalized {
        round_id: u64,
        settlement: Settlement,
    },
    Settled {
        round_id: u64,
        settlement: Settlement,
        balance: u64,
    },
    RoundVoided {
        round_id: u64,
        refunded: Option<Bet>,
    },
}

/// Everything the presentation layer needs for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    pub round_id: u64,
    pub phase: Phase,
    /// `None` while rolling.
    pub time_left: Option<u32>,
    pub dice: Roll,
    pub balance: u64,
    pub held_bet: Option<Bet>,
    pub last_outcome: Option<Side>,
    pub last_total: Option<u8>,
    pub last_triple: bool,
    pub last_win: Option<bool>,
    /// Published once the reveal delay has passed.
    pub last_net_amount: Option<i64>,
    pub history: Vec<u8>,
    /// Other players, with the held bet folded in.
    pub crowd: CrowdTotals,
}

pub struct TaiXiu<D> {
    config: GameConfig,
    round: RoundMachine,
    ledger: BetLedger,
    history: RoundHistory,
    dice_source: D,
    crowd: Crowd,
    round_id: u64,
    dice: Roll,
    result: Option<Settlement>,
    net_amount: Option<i64>,
    pending_reveal: bool,
}

impl<D: DiceSource> TaiXiu<D> {
    pub fn new(config: GameConfig, dice_source: D) -> Self {
        let history = if config.prefill_history {
            RoundHistory::prefilled(config.history_window)
        } else {
            RoundHistory::new(config.history_window)
        };
        let crowd = match config.crowd_seed {
            Some(seed) => Crowd::seeded(seed),
            None => Crowd::new(StdRng::from_os_rng()),
        };
        Self {
            round: RoundMachine::new(config.timing),
            ledger: BetLedger::new(config.initial_balance),
            history,
            dice_source,
            crowd,
            round_id: 1,
            dice: Roll::default(),
            result: None,
            net_amount: None,
            pending_reveal: false,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    pub fn state(&self) -> RoundState {
        self.round.state()
    }

    pub fn phase(&self) -> Phase {
        self.round.phase()
    }

    pub fn time_left(&self) -> Option<u32> {
        self.round.time_left()
    }

    pub fn balance(&self) -> u64 {
        self.ledger.balance()
    }

    pub fn held_bet(&self) -> Option<Bet> {
        self.ledger.held()
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn last_settlement(&self) -> Option<&Settlement> {
        self.result.as_ref()
    }

    /// One elapsed second of the round clock.
    pub fn tick(&mut self) -> Vec<Effect> {
        if self.round.phase() == Phase::Betting {
            self.crowd.fluctuate();
        }
        let mut effects = Vec::new();
        for transition in self.round.tick() {
            self.on_transition(transition, &mut effects);
        }
        effects
    }

    /// A timer armed through [`Effect::Schedule`] has elapsed.
    pub fn fire(&mut self, timer: TimerKind) -> Vec<Effect> {
        let mut effects = Vec::new();
        match timer {
            TimerKind::FinalizeRoll => match self.round.finish_roll() {
                Some(transition) => self.on_transition(transition, &mut effects),
                None => warn!(phase = %self.phase(), "finalize timer fired outside ROLLING"),
            },
            TimerKind::Reveal => {
                if self.pending_reveal {
                    self.reveal(&mut effects);
                } else {
                    warn!(round_id = self.round_id, "reveal timer fired with nothing to reveal");
                }
            }
        }
        effects
    }

    /// Pre-flight check used before asking the player for an amount.
    pub fn check_bet(&self, side: Side) -> Result<(), BetError> {
        self.ledger.check(self.phase(), side)
    }

    /// Returns the balance left after the stake is debited.
    pub fn place_bet(&mut self, side: Side, amount: u64) -> Result<u64, BetError> {
        match self.ledger.place(self.phase(), side, amount) {
            Ok(balance) => {
                info!(round_id = self.round_id, %side, amount, balance, "bet placed");
                Ok(balance)
            }
            Err(err) => {
                warn!(round_id = self.round_id, %side, amount, %err, "bet rejected");
                Err(err)
            }
        }
    }

    /// Demo hook: credits the balance unconditionally. Not part of the
    /// betting rules.
    pub fn request_balance_top_up(&mut self, amount: u64) -> u64 {
        let balance = self.ledger.credit(amount);
        info!(amount, balance, "balance topped up");
        balance
    }

    /// Abandons the current round and opens a new betting window. An
    /// unsettled stake is refunded; a settled but unrevealed round is
    /// revealed first.
    pub fn void_round(&mut self) -> Vec<Effect> {
        let mut effects = vec![
            Effect::Cancel(TimerKind::FinalizeRoll),
            Effect::Cancel(TimerKind::Reveal),
        ];
        let refunded = if self.phase() == Phase::Result {
            if self.pending_reveal {
                self.reveal(&mut effects);
            }
            None
        } else {
            self.ledger.refund()
        };
        let voided = self.round_id;
        info!(round_id = voided, ?refunded, "round voided");
        let transition = self.round.restart();
        effects.push(Effect::Emit(GameEvent::PhaseChanged {
            from: transition.from,
            to: transition.to,
        }));
        self.begin_round(&mut effects);
        // reported after the replacement round has started
        effects.push(Effect::Emit(GameEvent::RoundVoided {
            round_id: voided,
            refunded,
        }));
        effects
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let held_bet = self.ledger.held();
        GameSnapshot {
            round_id: self.round_id,
            phase: self.phase(),
            time_left: self.time_left(),
            dice: self.dice,
            balance: self.ledger.balance(),
            held_bet,
            last_outcome: self.result.map(|s| s.label),
            last_total: self.result.map(|s| s.total),
            last_triple: self.result.is_some_and(|s| s.triple),
            last_win: self.result.and_then(|s| s.won()),
            last_net_amount: self.net_amount,
            history: self.history.to_vec(),
            crowd: self.crowd.totals().with_bet(held_bet),
        }
    }

    fn on_transition(&mut self, transition: Transition, effects: &mut Vec<Effect>) {
        let Transition { from, to } = transition;
        effects.push(Effect::Emit(GameEvent::PhaseChanged { from, to }));
        match to {
            Phase::Lock => debug!(round_id = self.round_id, "betting locked"),
            Phase::Rolling => effects.push(Effect::Schedule {
                timer: TimerKind::FinalizeRoll,
                after: self.config.timing.rolling(),
            }),
            Phase::Result => self.finalize_roll(effects),
            Phase::Betting => self.begin_round(effects),
        }
    }

    fn finalize_roll(&mut self, effects: &mut Vec<Effect>) {
        let settlement = draw_and_settle(&mut self.dice_source, self.ledger.held());
        info!(
            round_id = self.round_id,
            roll = %settlement.roll,
            total = settlement.total,
            label = %settlement.label,
            triple = settlement.triple,
            won = ?settlement.won(),
            "roll finalized"
        );
        self.dice = settlement.roll;
        self.result = Some(settlement);
        self.net_amount = None;
        self.pending_reveal = true;
        effects.push(Effect::Schedule {
            timer: TimerKind::Reveal,
            after: self.config.timing.reveal_delay(),
        });
        effects.push(Effect::Emit(GameEvent::RollFinalized {
            round_id: self.round_id,
            settlement,
        }));
    }

    fn reveal(&mut self, effects: &mut Vec<Effect>) {
        self.pending_reveal = false;
        let Some(settlement) = self.result else {
            return;
        };
        let payout = settlement.payout();
        if payout > 0 {
            self.ledger.credit(payout);
        }
        self.net_amount = settlement.net();
        self.history.push(settlement.total);
        let balance = self.ledger.balance();
        info!(
            round_id = self.round_id,
            payout,
            net = ?self.net_amount,
            balance,
            "round settled"
        );
        effects.push(Effect::Emit(GameEvent::Settled {
            round_id: self.round_id,
            settlement,
            balance,
        }));
    }

    fn begin_round(&mut self, effects: &mut Vec<Effect>) {
        if self.pending_reveal {
            effects.push(Effect::Cancel(TimerKind::Reveal));
            self.reveal(effects);
        }
        self.ledger.clear();
        self.result = None;
        self.net_amount = None;
        self.crowd.reseed();
        self.round_id += 1;
        info!(round_id = self.round_id, "round started");
        effects.push(Effect::Emit(GameEvent::RoundStarted {
            round_id: self.round_id,
        }));
    }
}
