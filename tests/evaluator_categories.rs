use poker_tuner::cards::{parse_cards, Card};
use poker_tuner::evaluator::{evaluate, evaluate_holdem, EvalError, HandCategory};
use poker_tuner::hand::{Board, HandError, HoleCards};

fn seven(s: &str) -> [Card; 7] {
    parse_cards(s).unwrap().try_into().unwrap()
}

#[test]
fn category_royal_flush() {
    assert_eq!(evaluate(&seven("As Ks Qs Js Ts 2d 3c")), HandCategory::RoyalFlush);
}

#[test]
fn category_straight_flush() {
    assert_eq!(evaluate(&seven("9h 8h 7h 6h 5h Ad Ac")), HandCategory::StraightFlush);
    // Steel wheel is a straight flush, not a royal.
    assert_eq!(evaluate(&seven("Ad 2d 3d 4d 5d Kd Kc")), HandCategory::StraightFlush);
}

#[test]
fn category_four_of_a_kind() {
    assert_eq!(evaluate(&seven("9c 9d 9h 9s Ac Ad Ah")), HandCategory::FourOfAKind);
}

#[test]
fn category_full_house() {
    assert_eq!(evaluate(&seven("3c 3d 3h Js Jc 2d 7h")), HandCategory::FullHouse);
    // Two sets make a full house.
    assert_eq!(evaluate(&seven("3c 3d 3h Js Jc Jd 7h")), HandCategory::FullHouse);
}

#[test]
fn category_flush() {
    assert_eq!(evaluate(&seven("Kh Th 8h 6h 3h 2c 2d")), HandCategory::Flush);
}

#[test]
fn category_straight() {
    assert_eq!(evaluate(&seven("Ac 5c 4d 3h 2s Kd Kh")), HandCategory::Straight);
    assert_eq!(evaluate(&seven("Ac Kc Qd Jh Ts 2d 2h")), HandCategory::Straight);
}

#[test]
fn category_three_of_a_kind() {
    assert_eq!(evaluate(&seven("Qc Qd Qh Ts 2c 7d 5s")), HandCategory::ThreeOfAKind);
}

#[test]
fn category_two_pair() {
    assert_eq!(evaluate(&seven("Jc Jd 9c 9h 2s 2d Ah")), HandCategory::TwoPair);
}

#[test]
fn category_pair() {
    assert_eq!(evaluate(&seven("Ah Ad Ts 9c 2d 4h 6s")), HandCategory::OnePair);
}

#[test]
fn category_high_card() {
    assert_eq!(evaluate(&seven("Ah Kd 7s 5c 2d 9h 3s")), HandCategory::HighCard);
}

#[test]
fn wrap_around_is_not_a_straight() {
    assert_eq!(evaluate(&seven("Qc Kd Ah 2s 3c 8d 9h")), HandCategory::HighCard);
}

#[test]
fn ordinals_run_zero_to_nine() {
    for (i, c) in HandCategory::ALL.iter().enumerate() {
        assert_eq!(c.ordinal() as usize, i);
    }
    assert_eq!(HandCategory::RoyalFlush.to_string(), "royal flush");
}

#[test]
fn holdem_requires_a_full_board() {
    let hole: HoleCards = "As Ah".parse().unwrap();
    let flop: Board = "Kc Qd Jh".parse().unwrap();
    assert!(matches!(evaluate_holdem(&hole, &flop), Err(EvalError::NotEnoughCards(3))));

    let overlapping: Board = "As Qd Jh 3s 2c".parse().unwrap();
    assert!(matches!(
        evaluate_holdem(&hole, &overlapping),
        Err(EvalError::InvalidHand(HandError::Overlap))
    ));
}
