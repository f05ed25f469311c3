pub mod app;

pub mod clock;

pub mod config;

pub mod crowd;

pub mod dice;

pub mod error;

pub mod game;

pub mod history;

pub mod ledger;

pub mod logging;

pub mod round;

pub mod settlement;

pub mod test_helpers;

pub mod ui;

pub use game::{
    Effect,
    GameEvent,
    GameSnapshot,
    TaiXiu,
    TimerKind,
};
