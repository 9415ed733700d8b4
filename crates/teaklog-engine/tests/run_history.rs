use serde_json::json;
use teaklog_engine::{DiagnosticKind, Error, EventStream, RunHistory};
use teaklog_testing::LogBuilder;
use teaklog_testing::assertions::{
    assert_attribution_has, assert_sdk_state, assert_session_state,
    assert_session_transitioned_from,
};

const INIT: &str = r#"D Teak: Teak@1a2b: {"android":"2.1.0"}"#;
const INITIALIZED: &str =
    r#"D Teak: State@1a2b: {"previousState":"Allocated","state":"Initialized"}"#;

#[test]
fn init_sets_version_and_keeps_allocated() {
    let (history, stream) = RunHistory::from_log(INIT).unwrap();

    assert_eq!(history.sdk_version(), Some("2.1.0"));
    assert_eq!(history.current_state(), "Allocated");
    assert_eq!(stream.len(), 1);
}

#[test]
fn replayed_transition_is_rejected() {
    let mut history = RunHistory::new();
    let mut stream = history.process(INIT, None).unwrap();
    history.process_line(INITIALIZED, &mut stream).unwrap();
    assert_eq!(history.current_state(), "Initialized");

    let err = history.process_line(INITIALIZED, &mut stream).unwrap_err();
    assert!(matches!(err, Error::StateMismatch { .. }));
    assert_eq!(
        err.to_string(),
        "Teak state transition consistency failed, current state is 'Initialized', expected 'Allocated'"
    );
    assert_eq!(history.current_state(), "Initialized");
    assert_eq!(history.state_transitions().len(), 2);
    assert_eq!(stream.len(), 2);
}

#[test]
fn heartbeat_for_other_session_is_fatal() {
    let log = LogBuilder::new()
        .session_created("ff01", 1_500_000_000)
        .heartbeat("ff02", 1_500_000_060)
        .build();

    let err = RunHistory::from_log(&log).unwrap_err();
    assert!(matches!(
        err,
        Error::NonCurrentSession { ref current, ref found, .. } if current == "ff01" && found == "ff02"
    ));
}

#[test]
fn state_line_for_unknown_session_is_fatal() {
    let mut history = RunHistory::new();
    let log = LogBuilder::new()
        .session_created("ff01", 1_500_000_000)
        .build();
    let mut stream = history.process(&log, None).unwrap();
    let before = history.snapshot();

    let line = LogBuilder::new()
        .session_state("ff09", "Allocated", "Created")
        .build();
    let err = history.process_line(line.trim_end(), &mut stream).unwrap_err();

    assert!(matches!(err, Error::UnknownSession { ref id } if id == "ff09"));
    assert_eq!(history.snapshot(), before);
    assert_eq!(stream.len(), 1);
}

#[test]
fn mismatched_transition_on_superseded_session_is_fatal() {
    let mut history = RunHistory::new();
    let log = LogBuilder::new()
        .session_created("ff01", 1_500_000_000)
        .session_state("ff01", "Allocated", "Created")
        .session_created("ff02", 1_500_000_100)
        .build();
    let mut stream = history.process(&log, None).unwrap();
    let before = history.snapshot();

    let line = LogBuilder::new()
        .session_state("ff01", "Allocated", "Expiring")
        .build();
    let err = history.process_line(line.trim_end(), &mut stream).unwrap_err();

    assert!(matches!(err, Error::StateMismatch { .. }));
    assert_eq!(history.session("ff01").unwrap().current_state(), "Created");
    assert_eq!(history.current_session().unwrap().id(), "ff02");
    assert_eq!(history.snapshot(), before);
    assert_eq!(stream.len(), 3);
}

#[test]
fn payload_ids_survive_narration() {
    let log = LogBuilder::new()
        .session_created("ff01", 1_500_000_000)
        .request("r1", "ff01", "/me/events", json!({"id": "user-42"}))
        .build();
    let (_, stream) = RunHistory::from_log(&log).unwrap();

    let text = stream.last().unwrap().render();
    assert!(text.contains(r#""id": "user-42""#), "{}", text);
}

#[test]
fn unrecognized_line_is_reported_and_skipped() {
    let log = format!("Z Frobnicator: whatever\n{}\n", INIT);
    let (history, stream) = RunHistory::from_log(&log).unwrap();

    assert_eq!(stream.diagnostics().len(), 1);
    assert_eq!(stream.diagnostics()[0].kind, DiagnosticKind::UnrecognizedLine);
    assert_eq!(stream.diagnostics()[0].text, "Z Frobnicator: whatever");
    assert_eq!(history.id(), Some("1a2b"));
}

#[test]
fn every_state_machine_ends_at_last_accepted_transition() {
    let log = LogBuilder::new()
        .init("1a2b", "2.1.0")
        .sdk_state("1a2b", "Allocated", "Created")
        .sdk_state("1a2b", "Created", "Configured")
        .session_created("ff01", 1_500_000_000)
        .session_state("ff01", "Allocated", "Created")
        .session_state("ff01", "Created", "Expired")
        .session_created("ff02", 1_500_000_300)
        .session_state("ff02", "Allocated", "Created")
        .session_state("ff01", "Expired", "Disposed")
        .build();
    let (history, _) = RunHistory::from_log(&log).unwrap();

    assert_sdk_state(&history, "Configured").unwrap();
    assert_session_state(&history, "Created").unwrap();
    assert_session_transitioned_from(&history, "Allocated").unwrap();
    assert_eq!(history.session("ff01").unwrap().current_state(), "Disposed");
    assert_eq!(history.session("ff01").unwrap().previous_state(), Some("Expired"));
}

#[test]
fn failing_line_keeps_earlier_narrative() {
    let log = LogBuilder::new()
        .init("1a2b", "2.1.0")
        .sdk_state("1a2b", "Allocated", "Created")
        .sdk_state("1a2b", "Allocated", "Created")
        .lifecycle("1a2b", "onActivityResumed")
        .build();

    let mut history = RunHistory::new();
    let mut stream = EventStream::new();
    let mut failure = None;
    for line in log.lines() {
        if let Err(err) = history.process_line(line, &mut stream) {
            failure = Some(err);
            break;
        }
    }

    assert!(failure.is_some());
    assert_eq!(stream.len(), 2);
    assert!(history.lifecycle_events().is_empty());
}

#[test]
fn duplicate_configuration_is_fatal_even_when_equal() {
    let log = LogBuilder::new()
        .init("1a2b", "2.1.0")
        .app_configuration("c0ffee", json!({"appId": "1"}))
        .app_configuration("c0ffee", json!({"appId": "1"}))
        .build();

    let err = RunHistory::from_log(&log).unwrap_err();
    assert_eq!(err.to_string(), "Duplicate app configuration created: c0ffee");
}

#[test]
fn registration_before_init_is_fatal() {
    let log = LogBuilder::new()
        .app_configuration("c0ffee", json!({"appId": "1"}))
        .init("1a2b", "2.1.0")
        .build();

    let err = RunHistory::from_log(&log).unwrap_err();
    assert!(matches!(err, Error::NotInitialized { ref found } if found == "c0ffee"));
}

#[test]
fn configuration_cannot_be_assigned_twice() {
    let log = LogBuilder::new()
        .init("1a2b", "2.1.0")
        .app_configuration("c0ffee", json!({"appId": "1"}))
        .device_configuration("beef", json!({"deviceId": "d"}))
        .activity_created("1a2b", "c0ffee", "beef")
        .activity_created("1a2b", "c0ffee", "beef")
        .build();

    let err = RunHistory::from_log(&log).unwrap_err();
    assert_eq!(err.to_string(), "Device configuration already assigned");
}

#[test]
fn recreated_instance_is_fatal() {
    let log = LogBuilder::new()
        .init("1a2b", "2.1.0")
        .lifecycle("9f9f", "onActivityResumed")
        .build();

    let err = RunHistory::from_log(&log).unwrap_err();
    assert_eq!(err.to_string(), "Teak got re-created 1a2b -> 9f9f");
}

#[test]
fn reply_rules_hold_through_the_pipeline() {
    let base = LogBuilder::new()
        .session_created("ff01", 1_500_000_000)
        .request("r1", "ff01", "/me/events", json!({}));

    let unknown = base.clone().reply("r2", "ff01", json!({})).build();
    assert!(matches!(
        RunHistory::from_log(&unknown).unwrap_err(),
        Error::UnknownRequest { .. }
    ));

    let twice = base
        .reply("r1", "ff01", json!({}))
        .reply("r1", "ff01", json!({}))
        .build();
    assert!(matches!(
        RunHistory::from_log(&twice).unwrap_err(),
        Error::DuplicateReply { .. }
    ));
}

#[test]
fn attribution_follows_do_not_track_sequence() {
    let registration = "/games/1136371193060244/users.json";
    let base = LogBuilder::new()
        .session_created("ff01", 1_500_000_000)
        .request("r1", "ff01", registration, json!({"referrer": "first"}));

    let accepted = base
        .clone()
        .request(
            "r2",
            "ff01",
            registration,
            json!({"referrer": "second", "do_not_track_event": true}),
        )
        .build();
    let (history, _) = RunHistory::from_log(&accepted).unwrap();
    let session = history.current_session().unwrap();
    assert_attribution_has(session, "referrer", &json!("first")).unwrap();
    assert_eq!(session.requests().len(), 2);

    let rejected = base
        .request("r2", "ff01", registration, json!({"referrer": "second"}))
        .build();
    assert!(matches!(
        RunHistory::from_log(&rejected).unwrap_err(),
        Error::Attribution { .. }
    ));
}

#[test]
fn request_without_request_id_uses_object_id() {
    let log = LogBuilder::new()
        .session_created("ff01", 1_500_000_000)
        .request_object(
            "Request",
            "7e57",
            json!({"endpoint": "/me/events", "session": "ff01", "payload": {}}),
        )
        .build();
    let (history, _) = RunHistory::from_log(&log).unwrap();
    assert!(history.current_session().unwrap().request("7e57").is_some());
}

#[test]
fn malformed_payload_is_a_decode_error() {
    let err = RunHistory::from_log("D Teak: Teak@1a2b: {not json").unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

#[test]
fn rendering_is_repeatable() {
    let log = LogBuilder::new()
        .init("1a2b", "2.1.0")
        .sdk_state("1a2b", "Allocated", "Created")
        .build();
    let (_, stream) = RunHistory::from_log(&log).unwrap();
    assert_eq!(stream.render(), stream.render());
    assert_eq!(stream.clone().render(), stream.render());
}

#[test]
fn narrative_describes_each_change() {
    let log = LogBuilder::new()
        .init("1a2b", "2.1.0")
        .sdk_state("1a2b", "Allocated", "Created")
        .session_created("ff01", 1_500_000_000)
        .heartbeat("ff01", 1_500_000_060)
        .build();
    let (_, stream) = RunHistory::from_log(&log).unwrap();

    insta::assert_snapshot!(stream.render(), @r#"
    [Teak] Teak@1a2b initialized (SDK 2.1.0)
      sdk_version assigned '2.1.0'
    [Teak] State transition Allocated -> Created
      + [
          "Allocated",
          "Created"
        ]
    [Teak.Session] Session ff01 created
      + {
          "attribution_payload": null,
          "heartbeats": [],
          "requests": {},
          "start_date": "2017-07-14T02:40:00Z",
          "state_transitions": [
            [
              null,
              "Allocated"
            ]
          ]
        }
    [Teak.Session] Session ff01 heartbeat at 2017-07-14T02:41:00Z
      + "2017-07-14T02:41:00Z"
    "#);
}
