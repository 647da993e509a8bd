use super::*;
use crate::logic::activity::{ClickAction, Event, WINDOW_MS};

const T: i64 = 1_700_000_000_000;

#[test]
fn test_base_score_and_normalization() {
    let events = vec![
        Event::open_thread(T, None),
        Event::click(T + 1, ClickAction::Reply),
        Event::reopen(T + 2, None),
        Event::undo(T + 3),
        Event::context_switch(T + 4, None),
    ];

    let raw = compute_raw_score(&events, T + 4);
    // Near-zero ages: 2 + 1 + 3 + 4 + 2
    assert!(raw > 11.99 && raw <= 12.0, "raw = {}", raw);

    let score = compute_dls(&events, T + 4);
    assert_eq!(score.dls, 48);
    assert_eq!(score.state(), DlsState::Amber);
}

#[test]
fn test_indecision_capped_at_ten() {
    let events = vec![Event::hover(T, 9999.0)];

    assert_eq!(compute_raw_score(&events, T), 10.0);
    let score = compute_dls(&events, T);
    assert_eq!(score.dls, 40);
    assert_eq!(score.state(), DlsState::Amber);
}

#[test]
fn test_indecision_below_cap_scales() {
    // 100 s of hovering → 5 points
    let events = vec![Event::hover(T, 60.0), Event::hover(T, 40.0)];
    assert!((compute_raw_score(&events, T) - 5.0).abs() < 1e-9);
}

#[test]
fn test_indecision_cap_is_per_window_not_per_event() {
    let events = vec![Event::hover(T, 9999.0), Event::hover(T, 9999.0), Event::undo(T)];
    assert_eq!(compute_raw_score(&events, T), 14.0);
}

#[test]
fn test_decay_halves_contribution() {
    let events = vec![Event::undo(T)];
    let raw = compute_raw_score(&events, T + HALF_LIFE_MS);
    assert!((raw - 2.0).abs() < 1e-9);
}

#[test]
fn test_events_outside_window_ignored() {
    let events = vec![Event::undo(T - WINDOW_MS - 1), Event::click(T, ClickAction::Archive)];
    assert!((compute_raw_score(&events, T) - 1.0).abs() < 1e-9);
}

#[test]
fn test_empty_log_is_green() {
    let score = compute_dls(&[], T);
    assert_eq!(score.dls, 0);
    assert_eq!(score.raw, 0.0);
    assert_eq!(score.state(), DlsState::Green);
}

#[test]
fn test_dls_saturates_at_100() {
    let events: Vec<Event> = (0..200).map(|i| Event::undo(T + i)).collect();
    let score = compute_dls(&events, T + 200);
    assert_eq!(score.dls, 100);
    assert_eq!(score.state(), DlsState::Red);
}

#[test]
fn test_dls_always_in_range_and_state_consistent() {
    let kinds: [fn(i64) -> Event; 7] = [
        |t| Event::open_thread(t, None),
        |t| Event::click(t, ClickAction::Delete),
        |t| Event::reopen(t, None),
        |t| Event::undo(t),
        |t| Event::context_switch(t, None),
        |t| Event::hover(t, 7.0),
        |t| Event::time_to_first_action(t, 3.0),
    ];

    for n in 0..60i64 {
        let events: Vec<Event> = (0..n)
            .map(|i| kinds[(i as usize * 3 + n as usize) % kinds.len()](T + i * 17_000))
            .collect();
        let now = T + n * 17_000;
        let score = compute_dls(&events, now);
        assert!(score.dls <= 100);
        let expected = match score.dls {
            0..=29 => DlsState::Green,
            30..=60 => DlsState::Amber,
            _ => DlsState::Red,
        };
        assert_eq!(score.state(), expected);
    }
}

#[test]
fn test_scoring_is_deterministic() {
    let events = vec![
        Event::open_thread(T, None),
        Event::hover(T + 30_000, 25.0),
        Event::undo(T + 60_000),
    ];
    let a = compute_dls(&events, T + 90_000);
    let b = compute_dls(&events, T + 90_000);
    assert_eq!(a, b);
}
