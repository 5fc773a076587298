use cmdrig_core::{ControlKind, FieldStore, FormSession};
use schema::{ConnectorRegistry, ConnectorSchema, FieldSchema, SubSchema};
use std::path::Path;

fn ffmpeg_registry() -> ConnectorRegistry {
    let mut registry = ConnectorRegistry::new();
    registry.insert(
        "ffmpeg",
        ConnectorSchema {
            globals: vec![FieldSchema::text("threads", "4")],
            subs: vec![
                SubSchema {
                    key: "scale".to_string(),
                    extras: vec![FieldSchema::new("width", "str", None)],
                    doc: None,
                },
                SubSchema {
                    key: "mux".to_string(),
                    extras: vec![FieldSchema::new("container", "str", None)],
                    doc: Some("Remux without re-encoding".to_string()),
                },
            ],
        },
    );
    registry
}

fn session_at(dir: &Path) -> FormSession {
    FormSession::new(ffmpeg_registry(), FieldStore::open(dir.join("fields.json")))
}

fn set_text(session: &mut FormSession, extras: bool, name: &str, value: &str) {
    let controls = if extras {
        session.extras_mut()
    } else {
        session.globals_mut()
    };
    let control = controls
        .iter_mut()
        .find(|control| control.name == name)
        .expect("control present");
    control.kind = ControlKind::Text(value.to_string());
}

#[test]
fn select_seeds_defaults_and_issues_preview() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_at(dir.path());

    let ticket = session
        .select("ffmpeg", "scale")
        .expect("select")
        .expect("ticket");

    assert_eq!(session.globals()[0].kind, ControlKind::Text("4".to_string()));
    assert_eq!(session.extras()[0].kind, ControlKind::Text(String::new()));

    let body = serde_json::to_value(&ticket.snapshot).expect("serialize");
    assert_eq!(
        body,
        serde_json::json!({
            "__connector": "ffmpeg",
            "__sub": "scale",
            "threads": "4",
        })
    );
}

#[test]
fn edit_persists_and_requests_preview_with_full_body() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_at(dir.path());
    session.select("ffmpeg", "scale").expect("select");

    set_text(&mut session, true, "width", "720");
    let ticket = session
        .form_changed()
        .expect("form changed")
        .expect("ticket");

    let body = serde_json::to_value(&ticket.snapshot).expect("serialize");
    assert_eq!(
        body,
        serde_json::json!({
            "__connector": "ffmpeg",
            "__sub": "scale",
            "threads": "4",
            "width": "720",
        })
    );

    let raw: serde_json::Value = serde_json::from_slice(
        &std::fs::read(dir.path().join("fields.json")).expect("read store"),
    )
    .expect("parse store");
    assert_eq!(raw["field_width"], serde_json::json!("720"));
}

#[test]
fn restart_reproduces_rendered_state_and_request_body() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first_body;
    {
        let mut session = session_at(dir.path());
        session.select("ffmpeg", "scale").expect("select");
        set_text(&mut session, true, "width", "720");
        let ticket = session.form_changed().expect("form changed").expect("ticket");
        first_body = serde_json::to_value(&ticket.snapshot).expect("serialize");
    }

    let mut restarted = session_at(dir.path());
    let ticket = restarted
        .restore_last_selection()
        .expect("restore")
        .expect("ticket");

    assert_eq!(
        restarted.globals()[0].kind,
        ControlKind::Text("4".to_string())
    );
    assert_eq!(
        restarted.extras()[0].kind,
        ControlKind::Text("720".to_string())
    );
    assert_eq!(
        serde_json::to_value(&ticket.snapshot).expect("serialize"),
        first_body
    );
}

#[test]
fn restore_without_record_leaves_no_selection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_at(dir.path());
    let ticket = session.restore_last_selection().expect("restore");
    assert!(ticket.is_none());
    assert!(session.selection().connector.is_none());
    assert!(session.globals().is_empty());
    assert!(session.extras().is_empty());
}

#[test]
fn sub_switch_keeps_live_global_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_at(dir.path());
    session.select("ffmpeg", "scale").expect("select");

    // A live, not-yet-persisted edit to a global survives the sub switch.
    set_text(&mut session, false, "threads", "16");
    session.select("ffmpeg", "mux").expect("select");

    assert_eq!(
        session.globals()[0].kind,
        ControlKind::Text("16".to_string())
    );
    assert_eq!(session.extras()[0].name, "container");
}

#[test]
fn unknown_connector_or_sub_renders_empty_sets() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_at(dir.path());

    let ticket = session
        .select("nonexistent", "whatever")
        .expect("select")
        .expect("ticket");
    assert!(session.globals().is_empty());
    assert!(session.extras().is_empty());
    assert_eq!(
        serde_json::to_value(&ticket.snapshot).expect("serialize"),
        serde_json::json!({"__connector": "nonexistent", "__sub": "whatever"})
    );

    // Known connector, vanished sub: the extras half is empty, globals stay.
    session.select("ffmpeg", "gone").expect("select");
    assert_eq!(session.globals().len(), 1);
    assert!(session.extras().is_empty());
}

#[test]
fn select_rebuilds_controls_even_when_persist_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    // A regular file where the store expects its parent directory makes
    // every write fail.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").expect("write blocker");

    let mut session = FormSession::new(
        ffmpeg_registry(),
        FieldStore::open(blocker.join("fields.json")),
    );
    assert!(session.select("ffmpeg", "scale").is_err());

    // The in-memory state stays self-consistent: the new pair's controls
    // are rendered even though the selection could not be persisted.
    assert_eq!(session.selection().connector.as_deref(), Some("ffmpeg"));
    assert_eq!(session.selection().sub.as_deref(), Some("scale"));
    assert_eq!(session.globals()[0].name, "threads");
    assert_eq!(session.extras()[0].name, "width");
}

#[test]
fn no_request_without_selection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_at(dir.path());
    let ticket = session.form_changed().expect("form changed");
    assert!(ticket.is_none());
}

#[test]
fn stale_preview_response_never_overwrites_newer_display() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_at(dir.path());
    session.select("ffmpeg", "scale").expect("select");

    set_text(&mut session, true, "width", "72");
    let r1 = session.form_changed().expect("changed").expect("ticket");
    set_text(&mut session, true, "width", "720");
    let r2 = session.form_changed().expect("changed").expect("ticket");

    // R2 resolves first, R1 arrives late and must be discarded.
    assert!(session.resolve_preview(r2.seq, "ffmpeg -vf scale=720:-1".to_string()));
    assert!(!session.resolve_preview(r1.seq, "ffmpeg -vf scale=72:-1".to_string()));
    assert_eq!(session.preview().display(), "ffmpeg -vf scale=720:-1");
}

#[test]
fn doc_follows_active_sub() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_at(dir.path());
    session.select("ffmpeg", "scale").expect("select");
    assert!(session.doc().is_none());
    session.select("ffmpeg", "mux").expect("select");
    assert_eq!(session.doc(), Some("Remux without re-encoding"));
}

#[test]
fn values_ghost_until_a_field_of_the_same_name_renders_again() {
    let mut registry = ffmpeg_registry();
    registry.insert(
        "x264",
        ConnectorSchema {
            globals: vec![FieldSchema::text("threads", "1")],
            subs: vec![SubSchema {
                key: "encode".to_string(),
                extras: Vec::new(),
                doc: None,
            }],
        },
    );

    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = FormSession::new(
        registry,
        FieldStore::open(dir.path().join("fields.json")),
    );

    session.select("ffmpeg", "scale").expect("select");
    set_text(&mut session, false, "threads", "8");
    session.form_changed().expect("changed");

    // The other connector's same-named global picks up the stored value.
    session.select("x264", "encode").expect("select");
    assert_eq!(session.globals()[0].kind, ControlKind::Text("8".to_string()));
}
