//! Dice primitives: a validated face, the three-dice roll and the sources
//! that produce them.

use crate::error::DiceError;
use rand::{
    Rng,
    SeedableRng,
    rngs::StdRng,
};
use std::fmt;

pub const MIN_TOTAL: u8 = 3;
pub const MAX_TOTAL: u8 = 18;

/// Inclusive range of totals that label a roll TÀI.
pub const TAI_TOTALS: std::ops::RangeInclusive<u8> = 11..=17;
/// Inclusive range of totals that can win a XỈU bet.
pub const XIU_TOTALS: std::ops::RangeInclusive<u8> = 4..=10;

/// A single die face, always in `1..=6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Die(u8);

impl Die {
    pub fn new(face: u8) -> Result<Self, DiceError> {
        if (1..=6).contains(&face) {
            Ok(Die(face))
        } else {
            Err(DiceError::FaceOutOfRange(face))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// The two sides a player can back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Over: 11..=17.
    Tai,
    /// Under: 4..=10.
    Xiu,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Tai => "TÀI",
            Side::Xiu => "XỈU",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An ordered triple of dice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Roll {
    faces: [Die; 3],
}

impl Roll {
    pub fn new(faces: [Die; 3]) -> Self {
        Self { faces }
    }

    pub fn from_faces(a: u8, b: u8, c: u8) -> Result<Self, DiceError> {
        Ok(Self::new([Die::new(a)?, Die::new(b)?, Die::new(c)?]))
    }

    pub fn faces(&self) -> [Die; 3] {
        self.faces
    }

    pub fn total(&self) -> u8 {
        self.faces.iter().map(|d| d.value()).sum()
    }

    pub fn is_triple(&self) -> bool {
        self.faces[0] == self.faces[1] && self.faces[1] == self.faces[2]
    }

    /// Label shown to players. Derived from the total alone, so a triple
    /// still carries a TÀI or XỈU label even though it pays neither side.
    pub fn label(&self) -> Side {
        if TAI_TOTALS.contains(&self.total()) {
            Side::Tai
        } else {
            Side::Xiu
        }
    }

    /// The side that gets paid, if any. Triples are a house win.
    pub fn winning_side(&self) -> Option<Side> {
        if self.is_triple() {
            return None;
        }
        let total = self.total();
        if TAI_TOTALS.contains(&total) {
            Some(Side::Tai)
        } else if XIU_TOTALS.contains(&total) {
            Some(Side::Xiu)
        } else {
            None
        }
    }
}

impl Default for Roll {
    /// The dice sitting under the bowl before the first round is rolled.
    fn default() -> Self {
        Self::new([Die(3), Die(1), Die(1)])
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.faces;
        write!(f, "{}-{}-{}", a.value(), b.value(), c.value())
    }
}

impl std::str::FromStr for Roll {
    type Err = DiceError;

    /// Parses `"4,5,6"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let faces = s
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| DiceError::MalformedRoll(s.to_string()))?;
        match faces.as_slice() {
            [a, b, c] => Roll::from_faces(*a, *b, *c),
            _ => Err(DiceError::MalformedRoll(s.to_string())),
        }
    }
}

/// Anything that can throw a die. The dice draw is the only randomness the
/// round engine depends on, so tests swap in a scripted source.
pub trait DiceSource {
    fn roll_die(&mut self) -> Die;

    fn roll(&mut self) -> Roll {
        Roll::new([self.roll_die(), self.roll_die(), self.roll_die()])
    }
}

impl<T: DiceSource + ?Sized> DiceSource for Box<T> {
    fn roll_die(&mut self) -> Die {
        (**self).roll_die()
    }

    fn roll(&mut self) -> Roll {
        (**self).roll()
    }
}

/// Uniform dice backed by any `rand` generator.
#[derive(Clone, Debug)]
pub struct RandomDice<R = StdRng> {
    rng: R,
}

impl RandomDice<StdRng> {
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> DiceSource for RandomDice<R> {
    fn roll_die(&mut self) -> Die {
        Die(self.rng.random_range(1..=6))
    }
}

/// Replays a fixed list of rolls face by face, wrapping around when
/// exhausted. Whole rolls stay aligned with the script as long as faces are
/// only drawn three at a time.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    faces: Vec<Die>,
    next: usize,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = Roll>) -> Result<Self, DiceError> {
        let faces: Vec<Die> = rolls.into_iter().flat_map(|roll| roll.faces()).collect();
        if faces.is_empty() {
            return Err(DiceError::EmptyScript);
        }
        Ok(Self { faces, next: 0 })
    }

    /// Parses `"4,5,6;2,2,2"`.
    pub fn parse(script: &str) -> Result<Self, DiceError> {
        let rolls = script
            .split(';')
            .filter(|chunk| !chunk.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Roll>, _>>()?;
        Self::new(rolls)
    }
}

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self) -> Die {
        let face = self.faces[self.next];
        self.next = (self.next + 1) % self.faces.len();
        face
    }
}
