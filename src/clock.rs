//! Wall-clock plumbing for the table: the 1 s round clock and the one-shot
//! timers requested through [`Effect::Schedule`].

use crate::game::{
    Effect,
    TimerKind,
};
use std::{
    collections::HashMap,
    time::Duration,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{
        Interval,
        MissedTickBehavior,
    },
};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct RoundClock {
    interval: Interval,
}

impl RoundClock {
    /// First tick lands one period from now, not immediately.
    pub fn new(period: Duration) -> Self {
        let start = tokio::time::Instant::now() + period;
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

impl Default for RoundClock {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer {
    pub kind: TimerKind,
    id: u64,
}

/// At most one pending timer per [`TimerKind`]. Re-scheduling a kind replaces
/// the earlier timer, and a fire is only accepted while its id is current.
pub struct Scheduler {
    tx: mpsc::UnboundedSender<FiredTimer>,
    pending: HashMap<TimerKind, (u64, JoinHandle<()>)>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FiredTimer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            pending: HashMap::new(),
            next_id: 0,
        };
        (scheduler, rx)
    }

    pub fn schedule(&mut self, kind: TimerKind, after: Duration) {
        self.cancel(kind);
        self.next_id += 1;
        let fired = FiredTimer {
            kind,
            id: self.next_id,
        };
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // receiver gone means the app is shutting down
            let _ = tx.send(fired);
        });
        self.pending.insert(kind, (fired.id, handle));
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if let Some((_, handle)) = self.pending.remove(&kind) {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, (_, handle)) in self.pending.drain() {
            handle.abort();
        }
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Arms and cancels timers; returns the effects meant for the UI.
    pub fn apply(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        effects
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Schedule { timer, after } => {
                    self.schedule(timer, after);
                    None
                }
                Effect::Cancel(timer) => {
                    self.cancel(timer);
                    None
                }
                emit @ Effect::Emit(_) => Some(emit),
            })
            .collect()
    }

    /// `true` if `fired` is the current timer of its kind. Consumes it.
    pub fn accept(&mut self, fired: &FiredTimer) -> bool {
        match self.pending.get(&fired.kind) {
            Some((id, _)) if *id == fired.id => {
                self.pending.remove(&fired.kind);
                true
            }
            _ => {
                tracing::debug!(kind = ?fired.kind, "dropping stale timer");
                false
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
