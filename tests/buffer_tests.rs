use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};

use schemaform::{Model, Snapshot};

fn settings_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "server": {
                "type": "object",
                "properties": {
                    "host": {"type": "string", "default": "localhost"},
                    "port": {"type": "integer", "default": 8080}
                }
            },
            "serverless": {"type": "boolean"},
            "label": {"type": "string"}
        }
    })
}

#[test]
fn revert_field_restores_pristine_and_is_idempotent() {
    let mut model = Model::new(settings_schema()).expect("model");
    model.set_value("server.host", json!("example.org"));
    assert!(model.field("server.host").expect("host").dirty);

    assert!(model.revert_field("server.host"));
    assert_eq!(model.field("server.host").expect("host").value, json!("localhost"));
    assert!(!model.field("server.host").expect("host").dirty);

    // second revert leaves the exact same state
    assert!(model.revert_field("server.host"));
    assert_eq!(model.field("server.host").expect("host").value, json!("localhost"));
    assert!(!model.has_unsaved_changes());

    assert!(!model.revert_field("server.nope"));
}

#[test]
fn revert_branch_covers_prefix_and_descendants_only() {
    let mut model = Model::new(settings_schema()).expect("model");
    model.set_value("server.host", json!("a"));
    model.set_value("server.port", json!(1));
    model.set_value("serverless", json!(true));

    assert!(model.revert_branch("server"));
    assert_eq!(model.field("server.host").expect("host").value, json!("localhost"));
    assert_eq!(model.field("server.port").expect("port").value, json!(8080));
    // prefix matching is segment-aware: `serverless` is not under `server`
    assert_eq!(model.field("serverless").expect("serverless").value, json!(true));

    assert!(!model.revert_branch("does.not.exist"));
}

#[test]
fn revert_all_clears_every_edit_in_one_notification() {
    let mut model = Model::new(settings_schema()).expect("model");
    let count = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&count);
    model.add_listener(move |_| *sink.borrow_mut() += 1);

    model.set_value("server.host", json!("a"));
    model.set_value("label", json!("x"));
    assert_eq!(*count.borrow(), 2);

    model.revert_all();
    assert_eq!(*count.borrow(), 3, "revert_all batches into one cycle");
    assert!(!model.has_unsaved_changes());
}

#[test]
fn set_pristine_values_adopts_the_current_state() {
    let mut model = Model::new(settings_schema()).expect("model");
    model.set_value("server.host", json!("example.org"));
    assert!(model.has_unsaved_changes());

    model.set_pristine_values();
    assert!(!model.has_unsaved_changes());

    // reverting now returns to the adopted baseline, not the schema default
    model.set_value("server.host", json!("other"));
    model.revert_field("server.host");
    assert_eq!(model.field("server.host").expect("host").value, json!("example.org"));
}

#[test]
fn changed_views_list_dirty_fields_only() {
    let mut model = Model::new(settings_schema()).expect("model");
    model.set_value("server.host", json!("a"));
    model.set_value("label", json!("x"));

    let paths = model.changed_paths();
    assert_eq!(paths, vec!["server.host".to_string(), "label".to_string()]);
    assert_eq!(model.changed_fields().len(), 2);

    model.revert_field("label");
    assert_eq!(model.changed_paths(), vec!["server.host".to_string()]);
}

#[test]
fn snapshot_round_trip_restores_live_values() {
    let mut model = Model::new(settings_schema()).expect("model");
    model.set_value("server.host", json!("example.org"));

    let snapshot = model.create_snapshot();
    assert_eq!(snapshot.len(), 5, "snapshots cover every field");
    assert!(!snapshot.is_empty());
    assert_eq!(snapshot.get("server.host"), Some(&json!("example.org")));

    model.set_value("server.host", json!("other"));
    model.set_value("label", json!("scratch"));
    model.restore_from_snapshot(&snapshot);

    assert_eq!(model.field("server.host").expect("host").value, json!("example.org"));
    assert_eq!(model.field("label").expect("label").value, json!(""));
    // restoring live values does not touch the pristine baseline
    assert!(model.field("server.host").expect("host").dirty);
}

#[test]
fn snapshot_ignores_paths_the_collection_no_longer_has() {
    let mut model = Model::new(settings_schema()).expect("model");
    let snapshot: Snapshot =
        serde_json::from_value(json!({"values": {"ghost.path": 7, "label": "kept"}}))
            .expect("snapshot");
    model.restore_from_snapshot(&snapshot);
    assert_eq!(model.field("label").expect("label").value, json!("kept"));
    assert!(model.field("ghost.path").is_none());
}

#[test]
fn snapshots_serialize_for_external_storage() {
    let mut model = Model::new(settings_schema()).expect("model");
    model.set_value("label", json!("persisted"));
    let snapshot = model.create_snapshot();

    let raw = serde_json::to_string(&snapshot).expect("serialized");
    let reloaded: Snapshot = serde_json::from_str(&raw).expect("deserialized");
    assert_eq!(reloaded, snapshot);

    model.set_value("label", json!("discarded"));
    model.restore_from_snapshot(&reloaded);
    assert_eq!(model.field("label").expect("label").value, json!("persisted"));
}

#[test]
fn statistics_distinguish_touched_from_currently_dirty() {
    let mut model = Model::new(settings_schema()).expect("model");
    let initial = model.change_statistics();
    assert_eq!(initial.total_fields, 5);
    assert_eq!(initial.changed_fields, 0);
    assert_eq!(initial.dirty_fields, 0);
    assert!(!initial.has_unsaved_changes);

    model.set_value("server.host", json!("a"));
    model.set_value("label", json!("x"));
    model.revert_field("label");

    let stats = model.change_statistics();
    assert_eq!(stats.changed_fields, 2, "label was touched, then reverted");
    assert_eq!(stats.dirty_fields, 1);
    assert!(stats.has_unsaved_changes);
}

#[test]
fn unsaved_changes_lifecycle() {
    let mut model = Model::new(settings_schema()).expect("model");
    assert!(!model.has_unsaved_changes());

    model.set_value("serverless", json!(true));
    assert!(model.has_unsaved_changes());

    model.set_pristine_values();
    assert!(!model.has_unsaved_changes());
}
