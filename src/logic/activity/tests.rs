use super::*;

const T: i64 = 1_700_000_000_000;

fn ts(events: &[Event]) -> Vec<i64> {
    events.iter().map(|e| e.timestamp).collect()
}

#[test]
fn test_prune_drops_stale_prefix() {
    let events = vec![
        Event::undo(T - WINDOW_MS - 1),
        Event::undo(T - WINDOW_MS),
        Event::undo(T - 1_000),
        Event::undo(T),
    ];

    let window = prune_window(&events, T);
    assert_eq!(ts(window), vec![T - WINDOW_MS, T - 1_000, T]);
}

#[test]
fn test_prune_is_idempotent() {
    let events: Vec<Event> = (0..50)
        .map(|i| Event::click(T - WINDOW_MS * 2 + i * 120_000, ClickAction::Reply))
        .collect();

    let once = prune_window(&events, T);
    let twice = prune_window(once, T);
    assert_eq!(once, twice);
}

#[test]
fn test_event_log_prune_in_place() {
    let mut log = EventLog::new();
    log.append(Event::undo(T - WINDOW_MS - 5));
    log.append(Event::undo(T - 10));
    log.append(Event::undo(T));

    assert_eq!(log.prune(T), 1);
    assert_eq!(log.len(), 2);
    assert_eq!(log.prune(T), 0);
    assert_eq!(log.window(T).len(), 2);
}

#[test]
fn test_last_matching_scans_from_tail() {
    let mut log = EventLog::new();
    log.append(Event::open_thread(T, Some("a".into())));
    log.append(Event::open_thread(T + 5, Some("b".into())));
    log.append(Event::open_thread(T + 9, Some("a".into())));

    let last_a = log.last_matching(|e| e.thread_id() == Some("a")).unwrap();
    assert_eq!(last_a.timestamp, T + 9);
    assert!(log.last_matching(|e| e.thread_id() == Some("zzz")).is_none());
}

#[test]
fn test_event_wire_format() {
    let event: Event = serde_json::from_str(
        r#"{"type":"hover_indecision","ts":1700000000000,"seconds":12.5}"#,
    )
    .unwrap();
    assert_eq!(event.kind(), EventKind::HoverIndecision);
    assert_eq!(event.data, EventData::HoverIndecision { seconds: 12.5 });

    let json = serde_json::to_value(Event::click(T, ClickAction::ReplyAll)).unwrap();
    assert_eq!(json["type"], "click_action");
    assert_eq!(json["ts"], T);
    assert_eq!(json["action"], "reply_all");
    assert!(json.get("label").is_none());
}

#[test]
fn test_malformed_payload_defaults() {
    let hover: Event =
        serde_json::from_str(r#"{"type":"hover_indecision","ts":1,"seconds":"lots"}"#).unwrap();
    assert_eq!(hover.data, EventData::HoverIndecision { seconds: 0.0 });

    let negative: Event =
        serde_json::from_str(r#"{"type":"time_to_first_action","ts":1,"seconds":-4}"#).unwrap();
    assert_eq!(negative.data, EventData::TimeToFirstAction { seconds: 0.0 });

    let missing: Event = serde_json::from_str(r#"{"type":"hover_indecision","ts":1}"#).unwrap();
    assert_eq!(missing.data, EventData::HoverIndecision { seconds: 0.0 });

    let click: Event = serde_json::from_str(
        r#"{"type":"click_action","ts":1,"action":42,"label":"","thread_id":null}"#,
    )
    .unwrap();
    assert_eq!(
        click.data,
        EventData::ClickAction { action: None, label: None, thread_id: None }
    );

    let switch: Event =
        serde_json::from_str(r#"{"type":"context_switch","ts":1,"kind":"teleport"}"#).unwrap();
    assert_eq!(switch.data, EventData::ContextSwitch { kind: None });

    let overload: Event =
        serde_json::from_str(r#"{"type":"manual_overload","ts":1,"overloaded":"yes"}"#).unwrap();
    assert_eq!(overload.data, EventData::ManualOverload { overloaded: false });
}

#[test]
fn test_unit_kinds_ignore_extra_fields() {
    let event: Event =
        serde_json::from_str(r#"{"type":"back_to_inbox","ts":7,"from":"thread"}"#).unwrap();
    assert_eq!(event.kind(), EventKind::BackToInbox);
    assert_eq!(event.timestamp, 7);
}

#[test]
fn test_unknown_kind_is_rejected() {
    let result = serde_json::from_str::<Event>(r#"{"type":"scroll","ts":1}"#);
    assert!(result.is_err());
}

#[test]
fn test_click_action_parsing() {
    assert_eq!(ClickAction::parse("archive"), Some(ClickAction::Archive));
    assert_eq!(ClickAction::parse(" snooze "), Some(ClickAction::Other("snooze".to_string())));
    assert_eq!(ClickAction::parse("  "), None);

    assert_eq!(ClickAction::infer_from_label("Reply all"), ClickAction::ReplyAll);
    assert_eq!(ClickAction::infer_from_label("Reply"), ClickAction::Reply);
    assert_eq!(ClickAction::infer_from_label("Move to Archive"), ClickAction::Archive);
    assert_eq!(ClickAction::infer_from_label("Star"), ClickAction::Other(OTHER_ACTION.to_string()));
}

#[test]
fn test_custom_action_names_survive_the_wire() {
    let event: Event =
        serde_json::from_str(r#"{"type":"click_action","ts":1,"action":"mute","threadId":"t9"}"#).unwrap();
    assert_eq!(
        event.data,
        EventData::ClickAction {
            action: Some(ClickAction::Other("mute".to_string())),
            label: None,
            thread_id: Some("t9".to_string()),
        }
    );

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["action"], "mute");
    assert_eq!(json["thread_id"], "t9");
}

#[test]
fn test_camel_case_thread_id_accepted() {
    let open: Event = serde_json::from_str(r#"{"type":"open_thread","ts":1,"threadId":"abc"}"#).unwrap();
    assert_eq!(open.thread_id(), Some("abc"));

    let reopen: Event =
        serde_json::from_str(r#"{"type":"reopen_same_thread","ts":2,"threadId":"abc"}"#).unwrap();
    assert_eq!(reopen.thread_id(), Some("abc"));
}

#[test]
fn test_substantive_kinds() {
    assert!(EventKind::ClickAction.is_substantive());
    assert!(EventKind::HoverIndecision.is_substantive());
    assert!(!EventKind::TimeToFirstAction.is_substantive());
    assert!(!EventKind::DeferThread.is_substantive());
    assert!(!EventKind::ManualOverload.is_substantive());
}
