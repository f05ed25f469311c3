use std::collections::VecDeque;

pub const DEFAULT_WINDOW: usize = 18;

/// Board shown before any round has been played.
pub const SEED_BOARD: [u8; DEFAULT_WINDOW] =
    [11, 4, 15, 8, 12, 5, 17, 9, 10, 6, 14, 7, 3, 16, 5, 11, 13, 8];

/// Fixed-size window of past totals, oldest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundHistory {
    window: usize,
    totals: VecDeque<u8>,
}

impl RoundHistory {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            totals: VecDeque::with_capacity(window),
        }
    }

    /// Starts full, using the most recent entries of [`SEED_BOARD`] and
    /// padding with its oldest entries when the window is wider.
    pub fn prefilled(window: usize) -> Self {
        let mut history = Self::new(window);
        let skip = SEED_BOARD.len().saturating_sub(window);
        history
            .totals
            .extend(SEED_BOARD.iter().copied().cycle().skip(skip).take(window));
        history
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Appends `total`, evicting the oldest entry once the window is full.
    pub fn push(&mut self, total: u8) {
        if self.window == 0 {
            return;
        }
        if self.totals.len() == self.window {
            self.totals.pop_front();
        }
        self.totals.push_back(total);
    }

    pub fn latest(&self) -> Option<u8> {
        self.totals.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.totals.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }
}
