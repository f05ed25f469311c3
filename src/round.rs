//! Round state machine.
//!
//! A round cycles BETTING -> LOCK -> ROLLING -> RESULT -> BETTING. Each phase
//! carries its own countdown in its variant: BETTING and LOCK share the betting
//! window (entering LOCK keeps the remaining seconds), ROLLING is ended by the
//! finalize timer rather than by ticks, and RESULT starts its own countdown.

use serde::Deserialize;
use std::{
    fmt,
    time::Duration,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Betting,
    Lock,
    Rolling,
    Result,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::Betting => Phase::Lock,
            Phase::Lock => Phase::Rolling,
            Phase::Rolling => Phase::Result,
            Phase::Result => Phase::Betting,
        }
    }

    pub fn accepts_bets(self) -> bool {
        self == Phase::Betting
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Betting => "BETTING",
            Phase::Lock => "LOCK",
            Phase::Rolling => "ROLLING",
            Phase::Result => "RESULT",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoundTiming {
    /// Whole betting window in seconds, lock window included.
    pub betting_secs: u32,
    /// Final seconds of the betting window during which bets are refused.
    pub lock_secs: u32,
    /// How long the bowl shakes before the dice are drawn.
    pub rolling_ms: u64,
    pub result_secs: u32,
    /// Delay between the dice reveal and the payout/history update.
    pub reveal_delay_ms: u64,
}

impl Default for RoundTiming {
    fn default() -> Self {
        Self {
            betting_secs: 45,
            lock_secs: 5,
            rolling_ms: 2_000,
            result_secs: 10,
            reveal_delay_ms: 1_000,
        }
    }
}

impl RoundTiming {
    pub fn rolling(&self) -> Duration {
        Duration::from_millis(self.rolling_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    Betting { remaining: u32 },
    Lock { remaining: u32 },
    Rolling,
    Result { remaining: u32 },
}

impl RoundState {
    pub fn phase(&self) -> Phase {
        match self {
            RoundState::Betting { .. } => Phase::Betting,
            RoundState::Lock { .. } => Phase::Lock,
            RoundState::Rolling => Phase::Rolling,
            RoundState::Result { .. } => Phase::Result,
        }
    }

    /// Seconds left on the current countdown. ROLLING has no countdown.
    pub fn time_left(&self) -> Option<u32> {
        match *self {
            RoundState::Betting { remaining }
            | RoundState::Lock { remaining }
            | RoundState::Result { remaining } => Some(remaining),
            RoundState::Rolling => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

#[derive(Clone, Debug)]
pub struct RoundMachine {
    timing: RoundTiming,
    state: RoundState,
}

impl RoundMachine {
    pub fn new(timing: RoundTiming) -> Self {
        Self {
            timing,
            state: RoundState::Betting {
                remaining: timing.betting_secs,
            },
        }
    }

    pub fn timing(&self) -> &RoundTiming {
        &self.timing
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn time_left(&self) -> Option<u32> {
        self.state.time_left()
    }

    /// One elapsed second. Returns every transition the tick caused, in order.
    pub fn tick(&mut self) -> Vec<Transition> {
        let mut transitions = Vec::new();
        match self.state {
            RoundState::Betting { remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.state = RoundState::Betting { remaining };
                if remaining <= self.timing.lock_secs {
                    transitions.push(self.enter(Phase::Lock));
                }
            }
            RoundState::Lock { remaining } => {
                self.state = RoundState::Lock {
                    remaining: remaining.saturating_sub(1),
                };
            }
            RoundState::Rolling => {}
            RoundState::Result { remaining } => {
                let remaining = remaining.saturating_sub(1);
                self.state = RoundState::Result { remaining };
                if remaining == 0 {
                    transitions.push(self.enter(Phase::Betting));
                }
            }
        }
        if self.state == (RoundState::Lock { remaining: 0 }) {
            transitions.push(self.enter(Phase::Rolling));
        }
        transitions
    }

    /// Ends the shake. `None` when the machine is not rolling, which happens
    /// when a finalize timer outlives the round it was armed for.
    pub fn finish_roll(&mut self) -> Option<Transition> {
        match self.state {
            RoundState::Rolling => Some(self.enter(Phase::Result)),
            _ => None,
        }
    }

    /// Abandons whatever phase is active and opens a fresh betting window.
    pub fn restart(&mut self) -> Transition {
        let from = self.phase();
        self.state = RoundState::Betting {
            remaining: self.timing.betting_secs,
        };
        Transition {
            from,
            to: Phase::Betting,
        }
    }

    fn enter(&mut self, to: Phase) -> Transition {
        let from = self.phase();
        debug_assert_eq!(from.next(), to, "round phases must advance in order");
        self.state = match to {
            Phase::Betting => RoundState::Betting {
                remaining: self.timing.betting_secs,
            },
            Phase::Lock => RoundState::Lock {
                remaining: self.state.time_left().unwrap_or(0),
            },
            Phase::Rolling => RoundState::Rolling,
            Phase::Result => RoundState::Result {
                remaining: self.timing.result_secs,
            },
        };
        tracing::debug!(%from, %to, time_left = ?self.time_left(), "round transition");
        Transition { from, to }
    }
}
