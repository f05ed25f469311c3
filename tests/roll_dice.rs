#![allow(non_snake_case)]
use proptest::prelude::*;
use tai_xiu::{
    dice::{
        DiceSource,
        MAX_TOTAL,
        MIN_TOTAL,
        RandomDice,
        Roll,
        Side,
    },
    game::GameEvent,
    ledger::Bet,
    settlement::settle,
    test_helpers::TestContext,
};

fn any_roll() -> impl Strategy<Value = Roll> {
    (1u8..=6, 1u8..=6, 1u8..=6).prop_map(|(a, b, c)| Roll::from_faces(a, b, c).unwrap())
}

proptest! {
    #[test]
    fn roll__total_stays_in_range(roll in any_roll()) {
        prop_assert!((MIN_TOTAL..=MAX_TOTAL).contains(&roll.total()));
    }

    #[test]
    fn roll__winning_side_follows_total_and_excludes_triples(roll in any_roll()) {
        let total = roll.total();
        let expected = if roll.is_triple() {
            None
        } else if (11..=17).contains(&total) {
            Some(Side::Tai)
        } else if (4..=10).contains(&total) {
            Some(Side::Xiu)
        } else {
            None
        };
        prop_assert_eq!(roll.winning_side(), expected);
    }

    #[test]
    fn settle__triples_never_pay(face in 1u8..=6, amount in 1u64..1_000_000) {
        let roll = Roll::from_faces(face, face, face).unwrap();
        for side in [Side::Tai, Side::Xiu] {
            let s = settle(roll, Some(Bet { side, amount }));
            prop_assert_eq!(s.won(), Some(false));
            prop_assert_eq!(s.payout(), 0);
        }
    }

    #[test]
    fn random_dice__faces_are_valid(seed in any::<u64>()) {
        let mut dice = RandomDice::seeded(seed);
        for _ in 0..16 {
            let roll = dice.roll();
            for die in roll.faces() {
                prop_assert!((1..=6).contains(&die.value()));
            }
        }
    }
}

#[test]
fn roll_dice__draw_happens_at_finalize_not_at_lock() {
    // given
    let mut ctx = TestContext::new(&[TestContext::roll(6, 5, 4), TestContext::roll(1, 1, 2)]);
    ctx.advance_to_lock();
    assert_eq!(ctx.game().snapshot().dice, Roll::default());

    // when
    ctx.finalize();

    // then
    assert_eq!(ctx.game().snapshot().dice, TestContext::roll(6, 5, 4));
    let finalized = ctx
        .events()
        .iter()
        .filter(|e| matches!(e, GameEvent::RollFinalized { .. }))
        .count();
    assert_eq!(finalized, 1);
}

#[test]
fn roll_dice__result_without_bet_has_no_win_flag() {
    // given
    let mut ctx = TestContext::new(&[TestContext::roll(1, 2, 3)]);

    // when
    ctx.reveal();

    // then
    let snap = ctx.game().snapshot();
    assert_eq!(snap.last_total, Some(6));
    assert_eq!(snap.last_outcome, Some(Side::Xiu));
    assert_eq!(snap.last_win, None);
    assert_eq!(snap.last_net_amount, None);
    assert_eq!(snap.balance, 10_000_000);
    assert_eq!(snap.history.last(), Some(&6));
}

#[test]
fn roll_dice__triple_keeps_display_label_from_total() {
    let mut ctx = TestContext::new(&[TestContext::roll(4, 4, 4)]);
    ctx.bet(Side::Tai, 100);
    ctx.reveal();
    let snap = ctx.game().snapshot();
    assert_eq!(snap.last_total, Some(12));
    assert_eq!(snap.last_outcome, Some(Side::Tai));
    assert!(snap.last_triple);
    assert_eq!(snap.last_win, Some(false));
    assert_eq!(snap.last_net_amount, Some(-100));
}
