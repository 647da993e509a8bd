//! Wire-format and dispatch tests

use super::*;
use crate::logic::activity::EventKind;
use crate::logic::config::GuardConfig;
use crate::logic::events::Emitter;
use crate::logic::session::{DeferSource, Session};
use crate::logic::storage::MemoryStore;

const T: i64 = 1_700_000_000_000;

fn parse(json: &str) -> Command {
    serde_json::from_str(json).unwrap()
}

fn session_on(store: &MemoryStore) -> Session {
    Session::open(GuardConfig::default(), Box::new(store.clone()), Emitter::new(), T)
}

#[test]
fn test_parse_commands() {
    assert_eq!(parse(r#"{"kind":"get_state"}"#), Command::GetState);
    assert_eq!(parse(r#"{"kind":"train_now"}"#), Command::TrainNow);
    assert_eq!(parse(r#"{"kind":"simulate_overload"}"#), Command::SimulateOverload { count: None });
    assert_eq!(
        parse(r#"{"kind":"manual_overload","overloaded":true}"#),
        Command::ManualOverload { overloaded: true }
    );

    match parse(r#"{"kind":"defer_thread","thread":{"hash":"abc"}}"#) {
        Command::DeferThread { thread } => {
            assert_eq!(thread.reference, "abc");
            assert_eq!(thread.ts, None);
            assert_eq!(thread.source, DeferSource::Inbox);
        }
        other => panic!("unexpected {:?}", other),
    }

    match parse(r#"{"kind":"event","event":{"type":"hover_indecision","ts":5,"seconds":"oops"}}"#) {
        Command::Event { event } => {
            assert_eq!(event.kind(), EventKind::HoverIndecision);
            assert_eq!(event.timestamp, 5);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unknown_event_type_rejected() {
    let result: Result<Command, _> =
        serde_json::from_str(r#"{"kind":"event","event":{"type":"scroll","ts":1}}"#);
    assert!(result.is_err());

    let result: Result<Command, _> = serde_json::from_str(r#"{"kind":"launch_rockets"}"#);
    assert!(result.is_err());
}

#[test]
fn test_reply_wire_format() {
    let json = serde_json::to_value(Reply::Ack).unwrap();
    assert_eq!(json, serde_json::json!({"kind": "ack"}));

    let json = serde_json::to_value(Reply::error("boom")).unwrap();
    assert_eq!(json, serde_json::json!({"kind": "error", "message": "boom"}));
}

#[test]
fn test_dispatch_event_and_state() {
    let store = MemoryStore::new();
    let mut session = session_on(&store);

    let reply = dispatch(
        &mut session,
        parse(r#"{"kind":"event","event":{"type":"undo_action","ts":1700000000000}}"#),
        T,
    );
    match reply {
        Reply::State { state } => {
            assert_eq!(state.window_event_count, 1);
            assert_eq!(state.dls, 16);
        }
        other => panic!("unexpected {:?}", other),
    }

    match dispatch(&mut session, Command::GetState, T + 1) {
        Reply::State { state } => assert_eq!(state.now, T),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_dispatch_deferred_round_trip() {
    let mut session = session_on(&MemoryStore::new());
    let reply = dispatch(
        &mut session,
        parse(r#"{"kind":"defer_thread","thread":{"reference":"m1","source":"thread"}}"#),
        T,
    );
    assert!(matches!(reply, Reply::Deferred { ref threads } if threads.len() == 1));

    match dispatch(&mut session, Command::GetDeferred, T) {
        Reply::Deferred { threads } => assert_eq!(threads[0].reference, "#m1"),
        other => panic!("unexpected {:?}", other),
    }

    let reply = dispatch(&mut session, Command::RemoveDeferred { reference: "#m1".to_string() }, T);
    assert!(matches!(reply, Reply::Deferred { ref threads } if threads.is_empty()));
}

#[test]
fn test_dispatch_status() {
    let mut session = session_on(&MemoryStore::new());
    dispatch(&mut session, Command::SimulateOverload { count: Some(2) }, T);

    match dispatch(&mut session, Command::GetStatus, T) {
        Reply::Status { status } => {
            assert_eq!(status.feature_count, 7);
            assert_eq!(status.window_event_count, session.events().len());
            assert_eq!(status.model.kind, "logistic_regression");
            assert!(!status.model.available);
            assert!(status.storage_pending_keys > 0);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_train_now_acks_and_parks_job() {
    let mut session = session_on(&MemoryStore::new());
    assert!(matches!(dispatch(&mut session, Command::TrainNow, T), Reply::Ack));
    assert!(session.take_job().is_some());
    // Second request while in flight is still acknowledged
    assert!(matches!(dispatch(&mut session, Command::TrainNow, T), Reply::Ack));
    assert!(session.take_job().is_none());
}

#[test]
fn test_clear_all_reports_storage_failure() {
    let store = MemoryStore::new();
    let mut session = session_on(&store);
    dispatch(&mut session, Command::ManualOverload { overloaded: true }, T);

    store.set_failing(true);
    match dispatch(&mut session, Command::ClearAll, T + 1) {
        Reply::Error { message } => assert!(message.contains("unavailable")),
        other => panic!("unexpected {:?}", other),
    }
    assert!(session.events().is_empty());

    store.set_failing(false);
    assert!(matches!(dispatch(&mut session, Command::ClearAll, T + 2), Reply::Ack));
}
