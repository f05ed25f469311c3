#![allow(non_snake_case)]
use proptest::prelude::*;
use tai_xiu::{
    dice::Side,
    error::BetError,
    ledger::{
        Bet,
        BetLedger,
    },
    round::Phase,
    test_helpers::TestContext,
};

fn ctx() -> TestContext {
    TestContext::new(&[TestContext::roll(4, 5, 6)])
}

#[test]
fn place_bet__debits_balance_and_holds_bet() {
    // given
    let mut ctx = ctx();

    // when
    let balance = ctx.game_mut().place_bet(Side::Tai, 1_000_000);

    // then
    assert_eq!(balance, Ok(9_000_000));
    assert_eq!(
        ctx.game().held_bet(),
        Some(Bet {
            side: Side::Tai,
            amount: 1_000_000
        })
    );
}

#[test]
fn place_bet__same_side_twice_accumulates() {
    // given
    let mut ctx = ctx();
    ctx.bet(Side::Xiu, 300);

    // when
    ctx.bet(Side::Xiu, 200);

    // then
    assert_eq!(ctx.game().held_bet().map(|b| b.amount), Some(500));
    assert_eq!(ctx.game().balance(), 10_000_000 - 500);
}

#[test]
fn place_bet__opposite_side_is_rejected_without_change() {
    // given
    let mut ctx = ctx();
    ctx.bet(Side::Tai, 1_000);
    let balance = ctx.game().balance();

    // when
    let result = ctx.game_mut().place_bet(Side::Xiu, 500);

    // then
    assert_eq!(
        result,
        Err(BetError::ConflictingSide {
            held: Side::Tai,
            attempted: Side::Xiu
        })
    );
    assert_eq!(ctx.game().balance(), balance);
    assert_eq!(
        ctx.game().held_bet(),
        Some(Bet {
            side: Side::Tai,
            amount: 1_000
        })
    );
}

#[test]
fn place_bet__more_than_balance_is_rejected() {
    let mut ctx = ctx();
    let result = ctx.game_mut().place_bet(Side::Tai, 10_000_001);
    assert_eq!(
        result,
        Err(BetError::InsufficientBalance {
            requested: 10_000_001,
            available: 10_000_000
        })
    );
    assert_eq!(ctx.game().balance(), 10_000_000);
    assert_eq!(ctx.game().held_bet(), None);
}

#[test]
fn place_bet__refused_once_locked() {
    // given
    let mut ctx = ctx();
    ctx.advance_to_lock();

    // when
    let result = ctx.game_mut().place_bet(Side::Tai, 1);

    // then
    assert_eq!(
        result,
        Err(BetError::PhaseNotOpen { phase: Phase::Lock })
    );
    assert_eq!(ctx.game().check_bet(Side::Xiu), result.map(|_| ()));
}

#[test]
fn place_bet__refused_while_rolling_and_showing_result() {
    let mut ctx = ctx();
    ctx.advance_to_rolling();
    assert!(matches!(
        ctx.game_mut().place_bet(Side::Tai, 1),
        Err(BetError::PhaseNotOpen {
            phase: Phase::Rolling
        })
    ));
    ctx.fire(tai_xiu::TimerKind::FinalizeRoll);
    assert!(matches!(
        ctx.game_mut().place_bet(Side::Tai, 1),
        Err(BetError::PhaseNotOpen {
            phase: Phase::Result
        })
    ));
}

#[test]
fn check_bet__flags_conflicting_side_before_amount_is_chosen() {
    let mut ctx = ctx();
    assert_eq!(ctx.game().check_bet(Side::Tai), Ok(()));
    ctx.bet(Side::Tai, 10);
    assert_eq!(ctx.game().check_bet(Side::Tai), Ok(()));
    assert!(matches!(
        ctx.game().check_bet(Side::Xiu),
        Err(BetError::ConflictingSide { .. })
    ));
}

#[test]
fn request_balance_top_up__credits_unconditionally() {
    let mut ctx = ctx();
    ctx.advance_to_rolling();
    assert_eq!(ctx.game_mut().request_balance_top_up(10_000_000), 20_000_000);
}

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Tai), Just(Side::Xiu)]
}

proptest! {
    #[test]
    fn place__debits_exactly_or_changes_nothing(
        balance in 0u64..1_000_000,
        amount in 0u64..2_000_000,
        side in side(),
    ) {
        let mut ledger = BetLedger::new(balance);
        match ledger.place(Phase::Betting, side, amount) {
            Ok(after) => {
                prop_assert!(amount > 0 && amount <= balance);
                prop_assert_eq!(after, balance - amount);
                prop_assert_eq!(ledger.held(), Some(Bet { side, amount }));
            }
            Err(_) => {
                prop_assert!(amount == 0 || amount > balance);
                prop_assert_eq!(ledger.balance(), balance);
                prop_assert_eq!(ledger.held(), None);
            }
        }
    }

    #[test]
    fn place__stake_plus_balance_is_conserved(
        amounts in proptest::collection::vec(1u64..5_000, 1..20),
    ) {
        let start = 50_000;
        let mut ledger = BetLedger::new(start);
        for amount in amounts {
            let _ = ledger.place(Phase::Betting, Side::Tai, amount);
            let held = ledger.held().map_or(0, |b| b.amount);
            prop_assert_eq!(ledger.balance() + held, start);
        }
    }
}
