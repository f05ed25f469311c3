use crate::{
    config::GameConfig,
    dice::{
        Roll,
        ScriptedDice,
        Side,
    },
    game::{
        Effect,
        GameEvent,
        TaiXiu,
        TimerKind,
    },
    round::Phase,
};

/// A table with scripted dice and a fixed crowd seed, plus shortcuts for
/// walking a round through its phases without a clock.
pub struct TestContext {
    game: TaiXiu<ScriptedDice>,
    events: Vec<GameEvent>,
}

impl TestContext {
    pub fn new(rolls: &[Roll]) -> Self {
        Self::with_config(GameConfig::default(), rolls)
    }

    pub fn with_config(config: GameConfig, rolls: &[Roll]) -> Self {
        let config = GameConfig {
            crowd_seed: config.crowd_seed.or(Some(42)),
            ..config
        };
        let dice = ScriptedDice::new(rolls.iter().copied()).unwrap();
        Self {
            game: TaiXiu::new(config, dice),
            events: Vec::new(),
        }
    }

    pub fn roll(a: u8, b: u8, c: u8) -> Roll {
        Roll::from_faces(a, b, c).unwrap()
    }

    pub fn game(&self) -> &TaiXiu<ScriptedDice> {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut TaiXiu<ScriptedDice> {
        &mut self.game
    }

    /// Every event emitted so far, oldest first.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn bet(&mut self, side: Side, amount: u64) -> u64 {
        self.game.place_bet(side, amount).unwrap()
    }

    pub fn tick(&mut self) -> Vec<Effect> {
        let effects = self.game.tick();
        self.record(&effects);
        effects
    }

    pub fn fire(&mut self, timer: TimerKind) -> Vec<Effect> {
        let effects = self.game.fire(timer);
        self.record(&effects);
        effects
    }

    pub fn void_round(&mut self) -> Vec<Effect> {
        let effects = self.game.void_round();
        self.record(&effects);
        effects
    }

    pub fn tick_until(&mut self, phase: Phase) {
        for _ in 0..10_000 {
            if self.game.phase() == phase {
                return;
            }
            self.tick();
        }
        panic!("never reached {phase}");
    }

    pub fn advance_to_lock(&mut self) {
        self.tick_until(Phase::Lock);
    }

    pub fn advance_to_rolling(&mut self) {
        self.tick_until(Phase::Rolling);
    }

    /// Rolling through to RESULT with the dice drawn but not yet revealed.
    pub fn finalize(&mut self) {
        self.advance_to_rolling();
        self.fire(TimerKind::FinalizeRoll);
    }

    /// Finalize plus the delayed reveal.
    pub fn reveal(&mut self) {
        self.finalize();
        self.fire(TimerKind::Reveal);
    }

    /// A full round ending back in BETTING of the next round.
    pub fn run_full_round(&mut self) {
        self.reveal();
        self.tick_until(Phase::Betting);
    }

    fn record(&mut self, effects: &[Effect]) {
        self.events.extend(effects.iter().filter_map(|effect| match effect {
            Effect::Emit(event) => Some(event.clone()),
            _ => None,
        }));
    }
}
