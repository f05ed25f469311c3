use crate::{
    error::ConfigError,
    history::DEFAULT_WINDOW,
    round::RoundTiming,
};
use serde::Deserialize;
use std::{
    fs,
    path::Path,
};

pub const DEFAULT_INITIAL_BALANCE: u64 = 10_000_000;
pub const DEFAULT_TOP_UP_AMOUNT: u64 = 10_000_000;
pub const DEFAULT_QUICK_AMOUNTS: [u64; 5] =
    [100_000, 500_000, 1_000_000, 5_000_000, 10_000_000];

/// Table settings. Every field has a default, so a config file only needs
/// the values it overrides.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub timing: RoundTiming,
    pub initial_balance: u64,
    /// Credited by the demo top-up hook.
    pub top_up_amount: u64,
    pub history_window: usize,
    /// Start with the demo board instead of an empty history.
    pub prefill_history: bool,
    /// Quick-add buttons of the bet dialog.
    pub quick_amounts: Vec<u64>,
    /// Seed for the simulated crowd; random when absent.
    pub crowd_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            timing: RoundTiming::default(),
            initial_balance: DEFAULT_INITIAL_BALANCE,
            top_up_amount: DEFAULT_TOP_UP_AMOUNT,
            history_window: DEFAULT_WINDOW,
            prefill_history: true,
            quick_amounts: DEFAULT_QUICK_AMOUNTS.to_vec(),
            crowd_seed: None,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let timing = &self.timing;
        if timing.betting_secs == 0 {
            return Err(ConfigError::Invalid(
                "timing.betting_secs must be at least 1".to_string(),
            ));
        }
        if timing.lock_secs >= timing.betting_secs {
            return Err(ConfigError::Invalid(format!(
                "timing.lock_secs ({}) must be shorter than timing.betting_secs ({})",
                timing.lock_secs, timing.betting_secs
            )));
        }
        if self.history_window == 0 {
            return Err(ConfigError::Invalid(
                "history_window must be at least 1".to_string(),
            ));
        }
        if self.quick_amounts.is_empty() || self.quick_amounts.contains(&0) {
            return Err(ConfigError::Invalid(
                "quick_amounts must be non-empty and positive".to_string(),
            ));
        }
        Ok(())
    }
}
