//! Feature extraction tests over realistic event windows

use super::*;
use crate::logic::activity::{ClickAction, Event, EventData, WINDOW_MS};

const T: i64 = 1_700_000_000_000;

fn sample_window() -> Vec<Event> {
    vec![
        Event::open_thread(T, None),
        Event::click(T + 1, ClickAction::Reply),
        Event::click(T + 2, ClickAction::Archive),
        Event::undo(T + 3),
        Event::context_switch(T + 4, None),
        Event::hover(T + 5, 10.0),
        Event::time_to_first_action(T + 6, 5.0),
    ]
}

#[test]
fn test_key_rates_and_variety() {
    let raw = compute_raw_features(&sample_window(), T + 10);

    assert_eq!(raw.decision_variety_count, 2.0);
    assert_eq!(raw.avg_time_to_action, 5.0);
    assert!((raw.undo_rate - 0.5).abs() < 1e-12);
    assert!(raw.indecision_time_ratio > 0.0);
    assert_eq!(raw.reopen_rate, 0.0);
    // 6 substantive events over 30 minutes
    assert!((raw.events_per_minute - 6.0 / 30.0).abs() < 1e-12);
    assert!((raw.context_switch_rate - 1.0 / 30.0).abs() < 1e-12);

    let vector = normalize(&raw);
    assert_eq!(vector.values.len(), FEATURE_COUNT);
    for v in vector.values {
        assert!((0.0..=1.0).contains(&v));
    }
    assert!(vector.validate().is_ok());
}

#[test]
fn test_empty_window_is_all_zero() {
    let vector = compute_feature_vector(&[], T);
    assert_eq!(vector.values, [0.0; FEATURE_COUNT]);
}

#[test]
fn test_stale_events_excluded() {
    let events = vec![Event::undo(T - WINDOW_MS - 1), Event::click(T, ClickAction::Reply)];
    let raw = compute_raw_features(&events, T);
    assert_eq!(raw.undo_rate, 0.0);
    assert!((raw.events_per_minute - 1.0 / 30.0).abs() < 1e-12);
}

#[test]
fn test_reopen_rate() {
    let events = vec![
        Event::open_thread(T, None),
        Event::open_thread(T + 1, None),
        Event::reopen(T + 2, None),
    ];
    let raw = compute_raw_features(&events, T + 3);
    assert!((raw.reopen_rate - 0.5).abs() < 1e-12);
}

#[test]
fn test_variety_counts_distinct_non_empty_actions_order_independent() {
    let mut events = vec![
        Event::click(T, ClickAction::Reply),
        Event::click(T + 1, ClickAction::Reply),
        Event::click(T + 2, ClickAction::Delete),
        Event::new(T + 3, EventData::ClickAction { action: None, label: None, thread_id: None }),
        Event::click(T + 4, ClickAction::Forward),
    ];
    let forward = compute_raw_features(&events, T + 5).decision_variety_count;

    events.reverse();
    // keep timestamps ascending for the window scan
    for (i, e) in events.iter_mut().enumerate() {
        e.timestamp = T + i as i64;
    }
    let reversed = compute_raw_features(&events, T + 5).decision_variety_count;

    assert_eq!(forward, 3.0);
    assert_eq!(forward, reversed);
}

#[test]
fn test_variety_keeps_custom_actions_apart() {
    let events: Vec<Event> = ["snooze", "mute", "label", "mute"]
        .iter()
        .enumerate()
        .map(|(i, name)| serde_json::from_value(serde_json::json!({
            "type": "click_action",
            "ts": T + i as i64,
            "action": name,
        })))
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(compute_raw_features(&events, T + 10).decision_variety_count, 3.0);
}

#[test]
fn test_normalization_clamps_large_inputs() {
    let raw = RawFeatures {
        events_per_minute: 1e9,
        reopen_rate: 50.0,
        avg_time_to_action: 3600.0,
        undo_rate: 4.0,
        context_switch_rate: 99.0,
        indecision_time_ratio: 1.0,
        decision_variety_count: 6.0,
    };
    assert_eq!(normalize(&raw).values, [1.0; FEATURE_COUNT]);
}

#[test]
fn test_normalization_in_unit_range_for_non_negative_inputs() {
    for step in 0..200 {
        let x = step as f64 * 0.37;
        let raw = RawFeatures {
            events_per_minute: x,
            reopen_rate: x / 10.0,
            avg_time_to_action: x * 3.0,
            undo_rate: x / 20.0,
            context_switch_rate: x / 5.0,
            indecision_time_ratio: (x / 100.0).min(1.0),
            decision_variety_count: (step % 7) as f64,
        };
        for v in normalize(&raw).values {
            assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
        }
    }
}

#[test]
fn test_normalization_scales() {
    let raw = RawFeatures {
        events_per_minute: 6.0,
        reopen_rate: 0.4,
        avg_time_to_action: 30.0,
        undo_rate: 0.15,
        context_switch_rate: 1.0,
        indecision_time_ratio: 0.5,
        decision_variety_count: 2.5,
    };
    for v in normalize(&raw).values {
        assert!((v - 0.5).abs() < 1e-6);
    }
}

#[test]
fn test_indecision_ratio_bounded() {
    let events = vec![Event::hover(T, 1e7)];
    let raw = compute_raw_features(&events, T);
    assert_eq!(raw.indecision_time_ratio, 1.0);
}

#[test]
fn test_get_by_name_follows_layout() {
    let vector = compute_feature_vector(&sample_window(), T + 10);
    assert_eq!(vector.get_by_name("undo_rate"), Some(vector.values[3]));
    assert_eq!(vector.get_by_name("nonexistent"), None);
}
