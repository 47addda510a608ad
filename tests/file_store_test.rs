//! Tests for FileNodeStore and the wired-up services on top of it

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use breakertree::application::services::{CascadeEngine, HierarchyManager};
use breakertree::config::Settings;
use breakertree::domain::{Node, NodeId, DEFAULT_KIND};
use breakertree::infrastructure::di::ServiceContainer;
use breakertree::infrastructure::traits::{NodeStore, StoreError};
use breakertree::infrastructure::FileNodeStore;
use breakertree::util::testing::{ids, init_test_setup};

const PANEL: &str = r#"
[[node]]
id = "main"
state = true

[[node]]
id = "kitchen"
parent = "main"
state = true

[[node]]
id = "oven"
parent = "kitchen"
state = true
online = false

[[node]]
id = "meter"
kind = "meter"
parent = "main"
state = true
"#;

fn panel_file(dir: &TempDir) -> PathBuf {
    init_test_setup();
    let path = dir.path().join("nodes.toml");
    fs::write(&path, PANEL).unwrap();
    path
}

#[test]
fn given_store_file_when_listing_then_filters_by_kind_in_file_order() {
    let dir = TempDir::new().unwrap();
    let store = FileNodeStore::open(panel_file(&dir));

    let breakers = store.list_nodes(DEFAULT_KIND).unwrap();
    let meters = store.list_nodes("meter").unwrap();

    let listed: Vec<NodeId> = breakers.into_iter().map(|n| n.id).collect();
    assert_eq!(listed, ids(&["main", "kitchen", "oven"]));
    assert_eq!(meters.len(), 1);
}

#[test]
fn given_missing_file_when_listing_then_unavailable() {
    let dir = TempDir::new().unwrap();
    let store = FileNodeStore::open(dir.path().join("absent.toml"));

    assert!(matches!(
        store.list_nodes(DEFAULT_KIND),
        Err(StoreError::Unavailable(_))
    ));
}

#[test]
fn given_garbage_file_when_listing_then_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nodes.toml");
    fs::write(&path, "[[node]\nid = ").unwrap();
    let store = FileNodeStore::open(path);

    assert!(matches!(
        store.list_nodes(DEFAULT_KIND),
        Err(StoreError::Unavailable(_))
    ));
}

#[test]
fn given_offline_node_when_writing_state_then_write_failed() {
    let dir = TempDir::new().unwrap();
    let store = FileNodeStore::open(panel_file(&dir));

    let err = store.set_node_state(&"oven".into(), false).unwrap_err();

    assert!(matches!(err, StoreError::WriteFailed { .. }));
}

#[test]
fn given_unknown_node_when_writing_then_not_found() {
    let dir = TempDir::new().unwrap();
    let store = FileNodeStore::open(panel_file(&dir));

    assert_eq!(
        store.set_node_state(&"ghost".into(), true),
        Err(StoreError::NotFound("ghost".into()))
    );
    assert_eq!(
        store.set_node_parent(&"ghost".into(), None),
        Err(StoreError::NotFound("ghost".into()))
    );
}

#[test]
fn given_state_write_when_reloading_then_change_is_durable_and_others_untouched() {
    let dir = TempDir::new().unwrap();
    let path = panel_file(&dir);
    let store = FileNodeStore::open(&path);

    store.set_node_state(&"kitchen".into(), false).unwrap();

    let reopened = FileNodeStore::open(&path).load().unwrap();
    let kitchen = reopened.nodes.iter().find(|r| r.id.as_str() == "kitchen").unwrap();
    let oven = reopened.nodes.iter().find(|r| r.id.as_str() == "oven").unwrap();
    assert!(!kitchen.state);
    assert!(!oven.online);
    assert_eq!(reopened.nodes.len(), 4);
}

#[test]
fn given_new_path_when_init_then_creates_empty_store_once() {
    let dir = TempDir::new().unwrap();
    let store = FileNodeStore::open(dir.path().join("nested/dir/nodes.toml"));

    assert!(store.init().unwrap());
    assert!(!store.init().unwrap());
    assert!(store.list_nodes(DEFAULT_KIND).unwrap().is_empty());
}

#[test]
fn given_existing_id_when_inserting_then_rejected() {
    let dir = TempDir::new().unwrap();
    let store = FileNodeStore::open(panel_file(&dir));

    let err = store.insert(Node::new("main")).unwrap_err();

    assert!(matches!(err, StoreError::WriteFailed { .. }));
}

#[test]
fn given_node_when_removing_then_returns_it_and_listing_shrinks() {
    let dir = TempDir::new().unwrap();
    let store = FileNodeStore::open(panel_file(&dir));

    let removed = store.remove(&"oven".into()).unwrap();

    assert_eq!(removed.parent_id, Some("kitchen".into()));
    assert_eq!(store.list_nodes(DEFAULT_KIND).unwrap().len(), 2);
    assert!(matches!(
        store.remove(&"oven".into()),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn given_file_store_when_cascading_off_then_offline_node_is_reported_and_rest_persisted() {
    let dir = TempDir::new().unwrap();
    let path = panel_file(&dir);
    let store = Arc::new(FileNodeStore::open(&path));
    let hierarchy = Arc::new(HierarchyManager::new(store.clone(), DEFAULT_KIND));
    let engine = CascadeEngine::new(hierarchy);

    let result = engine.switch(&"main".into(), false).unwrap();

    assert_eq!(result.success_count, 1);
    assert_eq!(result.failure_count, 1);
    assert_eq!(result.failures[0].node_id, NodeId::from("oven"));
    let states: Vec<(String, bool)> = store
        .load()
        .unwrap()
        .nodes
        .into_iter()
        .map(|r| (r.id.to_string(), r.state))
        .collect();
    assert_eq!(
        states,
        vec![
            ("main".to_string(), false),
            ("kitchen".to_string(), false),
            ("oven".to_string(), true),
            // other kinds are never touched
            ("meter".to_string(), true),
        ]
    );
}

#[test]
fn given_settings_when_building_container_then_services_share_the_store() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        store_path: panel_file(&dir),
        batch_threads: Some(2),
        ..Settings::default()
    };

    let container = ServiceContainer::new(settings).unwrap();
    container
        .topology
        .reparent(&"oven".into(), Some(&"main".into()))
        .unwrap();
    let result = container
        .cascade
        .update_many(&ids(&["kitchen", "main"]), false)
        .unwrap();

    assert_eq!(result.success_count, 2);
    assert_eq!(
        container.hierarchy.get_children(&"main".into()).unwrap(),
        ids(&["kitchen", "oven"])
    );
}

#[cfg(unix)]
#[test]
fn given_store_file_mode_when_writing_state_then_mode_is_kept() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = panel_file(&dir);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();
    let store = FileNodeStore::open(&path);

    store.set_node_state(&"main".into(), false).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}
