#![allow(non_snake_case)]
use std::time::Duration;
use tai_xiu::{
    Effect,
    GameEvent,
    TimerKind,
    config::GameConfig,
    dice::Side,
    history::DEFAULT_WINDOW,
    round::{
        Phase,
        RoundState,
        RoundTiming,
    },
    test_helpers::TestContext,
};

#[test]
fn round_cycle__full_cycle_clears_bet_and_resets_timer() {
    // given
    let mut ctx = TestContext::new(&[TestContext::roll(4, 5, 6)]);
    ctx.bet(Side::Tai, 1_000);

    // when
    ctx.run_full_round();

    // then
    assert_eq!(ctx.game().state(), RoundState::Betting { remaining: 45 });
    assert_eq!(ctx.game().held_bet(), None);
    assert_eq!(ctx.game().round_id(), 2);
    let snap = ctx.game().snapshot();
    assert_eq!(snap.last_total, None);
    assert_eq!(snap.last_win, None);
    assert_eq!(snap.last_net_amount, None);
}

#[test]
fn round_cycle__lock_entered_at_threshold_of_shared_countdown() {
    let mut ctx = TestContext::new(&[TestContext::roll(4, 5, 6)]);
    for expected in (6..45).rev() {
        ctx.tick();
        assert_eq!(
            ctx.game().state(),
            RoundState::Betting {
                remaining: expected
            }
        );
    }
    ctx.tick();
    assert_eq!(ctx.game().state(), RoundState::Lock { remaining: 5 });
}

#[test]
fn round_cycle__phases_advance_in_order() {
    // given
    let mut ctx = TestContext::new(&[TestContext::roll(2, 3, 4)]);

    // when
    ctx.run_full_round();

    // then
    let phases: Vec<(Phase, Phase)> = ctx
        .events()
        .iter()
        .filter_map(|e| match e {
            GameEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            (Phase::Betting, Phase::Lock),
            (Phase::Lock, Phase::Rolling),
            (Phase::Rolling, Phase::Result),
            (Phase::Result, Phase::Betting),
        ]
    );
}

#[test]
fn round_cycle__winning_tai_scenario() {
    // given
    let mut ctx = TestContext::new(&[TestContext::roll(4, 5, 6)]);
    assert_eq!(ctx.bet(Side::Tai, 1_000_000), 9_000_000);

    // when
    ctx.finalize();

    // then
    let snap = ctx.game().snapshot();
    assert_eq!(snap.last_total, Some(15));
    assert_eq!(snap.last_outcome, Some(Side::Tai));
    assert_eq!(snap.last_win, Some(true));
    assert_eq!(snap.balance, 9_000_000);

    ctx.fire(TimerKind::Reveal);
    let snap = ctx.game().snapshot();
    assert_eq!(snap.balance, 11_000_000);
    assert_eq!(snap.last_net_amount, Some(1_000_000));
}

#[test]
fn round_cycle__triple_loses_regardless_of_side() {
    for side in [Side::Tai, Side::Xiu] {
        // given
        let mut ctx = TestContext::new(&[TestContext::roll(2, 2, 2)]);
        ctx.bet(side, 500);

        // when
        ctx.run_full_round();

        // then
        assert_eq!(ctx.game().balance(), 10_000_000 - 500);
        let settled = ctx.events().iter().find_map(|e| match e {
            GameEvent::Settled { settlement, .. } => Some(*settlement),
            _ => None,
        });
        let settlement = settled.unwrap();
        assert!(settlement.triple);
        assert_eq!(settlement.total, 6);
        assert_eq!(settlement.won(), Some(false));
    }
}

#[test]
fn round_cycle__history_length_constant_once_full() {
    // given
    let mut ctx = TestContext::new(&[
        TestContext::roll(1, 2, 3),
        TestContext::roll(6, 6, 5),
        TestContext::roll(3, 3, 3),
    ]);
    assert_eq!(ctx.game().history().len(), DEFAULT_WINDOW);

    // when
    let mut drawn = Vec::new();
    for _ in 0..(DEFAULT_WINDOW + 2) {
        ctx.run_full_round();
        drawn.push(ctx.game().history().latest().unwrap());
        assert_eq!(ctx.game().history().len(), DEFAULT_WINDOW);
    }

    // then
    let history = ctx.game().history().to_vec();
    assert_eq!(history, drawn[drawn.len() - DEFAULT_WINDOW..].to_vec());
    assert_eq!(&drawn[..3], &[6, 17, 9]);
}

#[test]
fn round_cycle__empty_history_grows_to_window() {
    let config = GameConfig {
        history_window: 3,
        prefill_history: false,
        ..GameConfig::default()
    };
    let mut ctx = TestContext::with_config(config, &[TestContext::roll(1, 2, 3)]);
    assert!(ctx.game().history().is_empty());
    for expected in [1, 2, 3, 3] {
        ctx.run_full_round();
        assert_eq!(ctx.game().history().len(), expected);
    }
}

#[test]
fn round_cycle__settles_exactly_once_when_result_ends_before_reveal() {
    // given
    let mut ctx = TestContext::new(&[TestContext::roll(4, 5, 6)]);
    ctx.bet(Side::Tai, 1_000);
    ctx.finalize();

    // when the RESULT countdown runs out before the reveal timer is delivered
    ctx.tick_until(Phase::Betting);
    let late = ctx.fire(TimerKind::Reveal);

    // then
    assert!(late.is_empty());
    let settled = ctx
        .events()
        .iter()
        .filter(|e| matches!(e, GameEvent::Settled { .. }))
        .count();
    assert_eq!(settled, 1);
    assert_eq!(ctx.game().balance(), 10_000_000 + 1_000);
}

#[test]
fn round_cycle__effects_request_the_configured_delays() {
    let config = GameConfig {
        timing: RoundTiming {
            betting_secs: 3,
            lock_secs: 1,
            rolling_ms: 750,
            result_secs: 2,
            reveal_delay_ms: 250,
        },
        ..GameConfig::default()
    };
    let mut ctx = TestContext::with_config(config, &[TestContext::roll(1, 5, 6)]);
    let mut effects = Vec::new();
    while ctx.game().phase() != Phase::Rolling {
        effects.extend(ctx.tick());
    }
    effects.extend(ctx.fire(TimerKind::FinalizeRoll));
    assert!(effects.contains(&Effect::Schedule {
        timer: TimerKind::FinalizeRoll,
        after: Duration::from_millis(750),
    }));
    assert!(effects.contains(&Effect::Schedule {
        timer: TimerKind::Reveal,
        after: Duration::from_millis(250),
    }));
    assert_eq!(ctx.game().time_left(), Some(2));
}

#[test]
fn round_cycle__void_during_lock_refunds_and_restarts() {
    // given
    let mut ctx = TestContext::new(&[TestContext::roll(4, 5, 6)]);
    ctx.bet(Side::Xiu, 2_000);
    ctx.advance_to_lock();

    // when
    ctx.void_round();

    // then
    assert_eq!(ctx.game().balance(), 10_000_000);
    assert_eq!(ctx.game().held_bet(), None);
    assert_eq!(ctx.game().state(), RoundState::Betting { remaining: 45 });
    assert!(ctx.events().iter().any(|e| matches!(
        e,
        GameEvent::RoundVoided {
            round_id: 1,
            refunded: Some(_)
        }
    )));
}
