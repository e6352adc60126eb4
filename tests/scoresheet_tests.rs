//! Integration tests for whole-game scoring

use tenpin::core::{Deliveries, Frame, Scoresheet, ScoresheetError};
use tenpin::types::Leave;

fn leave(numbers: &[u8]) -> Leave {
    Leave::from_numbers(numbers).unwrap()
}

fn play(deliveries: &[Leave]) -> Scoresheet {
    let mut sheet = Scoresheet::new();
    for (i, &l) in deliveries.iter().enumerate() {
        sheet
            .record_delivery(l)
            .unwrap_or_else(|e| panic!("delivery {} ({}) rejected: {}", i + 1, l, e));
    }
    sheet.update_running_score();
    sheet
}

fn running_scores(sheet: &Scoresheet) -> Vec<u32> {
    sheet.frames().iter().map(Frame::running_score).collect()
}

#[test]
fn test_perfect_game() {
    let sheet = play(&[Leave::EMPTY; 12]);

    assert!(sheet.is_complete());
    assert_eq!(sheet.total_score(), 300);
    for (i, score) in running_scores(&sheet).into_iter().enumerate() {
        assert_eq!(score, 30 * (i as u32 + 1));
    }
    assert_eq!(sheet.frame(10).unwrap().line(), "X X X");
}

#[test]
fn test_dutch_200() {
    let five = leave(&[6, 7, 8, 9, 10]);
    let mut deliveries = Vec::new();
    for _ in 0..5 {
        deliveries.extend([five, Leave::EMPTY, Leave::EMPTY]);
    }
    deliveries.extend([five, Leave::EMPTY]);

    let sheet = play(&deliveries);

    assert!(sheet.is_complete());
    assert_eq!(sheet.total_score(), 200);
    for (i, score) in running_scores(&sheet).into_iter().enumerate() {
        assert_eq!(score, 20 * (i as u32 + 1));
    }
    assert_eq!(sheet.frame(1).unwrap().line(), "5 /");
    assert_eq!(sheet.frame(2).unwrap().line(), "X");
    assert_eq!(sheet.frame(10).unwrap().line(), "X 5 /");
}

#[test]
fn test_mixed_game_162() {
    let sheet = play(&[
        leave(&[1, 2, 3, 5, 6, 9, 10]),
        leave(&[10]),
        leave(&[10]),
        leave(&[10]),
        Leave::EMPTY,
        Leave::EMPTY,
        Leave::FULL,
        Leave::EMPTY,
        Leave::EMPTY,
        leave(&[10]),
        leave(&[10]),
        Leave::EMPTY,
        Leave::EMPTY,
        leave(&[7, 10]),
        leave(&[7]),
    ]);

    assert!(sheet.is_complete());
    assert_eq!(
        running_scores(&sheet),
        vec![9, 18, 38, 58, 78, 97, 106, 134, 153, 162]
    );
    assert_eq!(sheet.total_score(), 162);

    let tenth = sheet.frame(10).unwrap();
    assert!(tenth.is_split());
    assert_eq!(tenth.line(), "8 1");
    assert_eq!(sheet.frame(5).unwrap().line(), "- /");
}

#[test]
fn test_tenth_frame_triple() {
    let sheet = play(&[Leave::EMPTY; 12]);
    let tenth = sheet.frame(10).unwrap();

    assert_eq!(
        tenth.deliveries(),
        Deliveries::Three(Leave::EMPTY, Leave::EMPTY, Leave::EMPTY)
    );
    assert!(tenth.is_complete());
    assert!(tenth.is_strike());
    assert!(!tenth.is_spare());
    assert!(!tenth.is_double());
    assert!(tenth.is_triple());
}

#[test]
fn test_finished_game_rejects_delivery_unchanged() {
    let mut sheet = play(&[Leave::EMPTY; 12]);
    let before = sheet.clone();

    assert_eq!(
        sheet.record_delivery(Leave::EMPTY),
        Err(ScoresheetError::GameCompleted)
    );
    assert_eq!(sheet, before);
}

#[test]
fn test_unsequenced_delivery_leaves_state_unchanged() {
    let mut sheet = play(&[Leave::EMPTY; 4]);

    // Re-bowling frame 2 walks the cursor into frame 3, which is still complete.
    sheet.reset_frame(Some(2)).unwrap();
    sheet.record_delivery(Leave::EMPTY).unwrap();
    assert_eq!(sheet.current_number(), Some(3));
    let before = sheet.clone();

    assert_eq!(
        sheet.record_delivery(Leave::EMPTY),
        Err(ScoresheetError::UnsequencedDelivery { frame: 3 })
    );
    assert_eq!(sheet, before);
}

#[test]
fn test_tenth_frame_strike_in_progress_score() {
    // Nine gutter frames, then a strike and a 6 in the tenth.
    let mut deliveries = vec![Leave::FULL; 18];
    deliveries.extend([Leave::EMPTY, leave(&[1, 2, 4, 7])]);
    let sheet = play(&deliveries);

    let tenth = sheet.frame(10).unwrap();
    assert!(!tenth.is_complete());
    assert_eq!(tenth.line(), "X 6");
    // both balls count toward the in-progress tenth
    assert_eq!(tenth.total_count(), 16);
    assert_eq!(tenth.running_score(), 16);
    assert_eq!(sheet.total_score(), 16);
    assert_eq!(sheet.current_number(), Some(10));
}

#[test]
fn test_reset_game_range() {
    let mut sheet = play(&[Leave::EMPTY; 12]);
    let before = sheet.clone();

    sheet.reset_game(4).unwrap();

    for n in 1..=3u8 {
        assert_eq!(sheet.frame(n), before.frame(n));
    }
    for n in 4..=10u8 {
        let frame = sheet.frame(n).unwrap();
        assert_eq!(frame.number(), n);
        assert_eq!(frame.deliveries(), Deliveries::None);
    }
    // The cursor stays where it was; a frame reset is needed to re-enter play.
    assert_eq!(sheet.current_number(), None);
    sheet.reset_frame(Some(4)).unwrap();
    assert_eq!(sheet.current_number(), Some(4));

    sheet.update_running_score();
    assert_eq!(sheet.total_score(), 60);
}

#[test]
fn test_edit_then_rescore() {
    let mut sheet = play(&[leave(&[10]), leave(&[10]), Leave::EMPTY]);
    assert_eq!(sheet.total_score(), 19);

    // The 10 pin was actually converted.
    sheet.record_delivery_at(1, 2, Leave::EMPTY).unwrap();
    sheet.update_running_score();

    assert!(sheet.frame(1).unwrap().is_spare());
    assert_eq!(sheet.frame(1).unwrap().running_score(), 20);
    assert_eq!(sheet.total_score(), 30);
    assert_eq!(sheet.current_number(), Some(3));
}

#[test]
fn test_edit_first_ball_to_strike_drops_second() {
    let mut sheet = play(&[leave(&[3, 6]), leave(&[6])]);

    sheet.record_delivery_at(1, 1, Leave::EMPTY).unwrap();

    assert_eq!(sheet.frame(1).unwrap().deliveries(), Deliveries::One(Leave::EMPTY));
}

#[test]
fn test_invalid_edits_are_rejected() {
    let mut sheet = play(&[Leave::EMPTY]);
    let before = sheet.clone();

    assert_eq!(
        sheet.record_delivery_at(1, 2, leave(&[1])),
        Err(ScoresheetError::InvalidDelivery { frame: 1, slot: 2 })
    );
    assert_eq!(
        sheet.record_delivery_at(2, 2, leave(&[1])),
        Err(ScoresheetError::InvalidDelivery { frame: 2, slot: 2 })
    );
    assert_eq!(
        sheet.record_delivery_at(3, 3, leave(&[1])),
        Err(ScoresheetError::InvalidDelivery { frame: 3, slot: 3 })
    );
    assert_eq!(sheet, before);
}

#[test]
fn test_tenth_frame_open_takes_no_fill_ball() {
    let mut deliveries = vec![Leave::EMPTY; 9];
    deliveries.extend([leave(&[4, 7]), leave(&[7])]);
    let mut sheet = play(&deliveries);

    assert!(sheet.is_complete());
    assert_eq!(
        sheet.record_delivery(Leave::EMPTY),
        Err(ScoresheetError::GameCompleted)
    );
    // 238 through eight, ninth = 10 + 8 + 1
    assert_eq!(sheet.frame(9).unwrap().running_score(), 257);
    assert_eq!(sheet.total_score(), 266);
}
