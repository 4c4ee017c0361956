//! Tests for loading record files and walking the focus state machine over them

use std::path::PathBuf;

use radial_bubbles::demo::demo_records;
use radial_bubbles::{FocusState, Tier, build, load_records, pack};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write record file");
    path
}

#[test]
fn given_record_file_when_loading_then_builds_tree() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_file(
        &temp,
        "records.json",
        r#"[
            {"name": "Kusama", "level": 1},
            {"name": "Bio", "level": 2, "parent": "Kusama"},
            {"name": "Art", "level": 2, "parent": "Kusama"},
            {"name": "Style", "level": 3, "parent": "Art"}
        ]"#,
    );

    // Act
    let records = load_records(&path).unwrap();
    let tree = build(&records).unwrap();

    // Assert
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.grandchild_count(tree.find("Kusama").unwrap()), 1);
}

#[test]
fn given_missing_file_when_loading_then_error_names_the_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");

    let error = load_records(&path).unwrap_err();

    assert!(format!("{error:#}").contains("absent.json"));
}

#[test]
fn given_malformed_json_when_loading_then_fails() {
    let temp = TempDir::new().unwrap();
    let path = write_file(&temp, "broken.json", "[{\"name\": \"A\", \"level\": ");

    assert!(load_records(&path).is_err());
}

#[test]
fn given_demo_dataset_when_drilling_down_and_up_then_returns_to_root_view() {
    let records = demo_records().unwrap();
    let tree = build(&records).unwrap();
    let mut state = FocusState::root_view(&tree);

    let kusama = tree.find("Kusama").unwrap();
    let bubbles = pack(&tree, state.focus, 900.0);
    let kusama_bubble = bubbles.iter().find(|bubble| bubble.node == kusama).unwrap();
    assert_eq!(kusama_bubble.tier, Tier::Child);

    state = state.on_bubble_click(&tree, kusama_bubble);
    assert_eq!(state.focus, kusama);

    let art = tree.find("Art").unwrap();
    state = state.drill_down(&tree, art);
    assert_eq!(state.focus, art);

    let bubbles = pack(&tree, state.focus, 900.0);
    assert_eq!(bubbles.len(), 1 + 4 + 2);

    let focus_bubble = bubbles.iter().find(|bubble| bubble.tier == Tier::Focus).unwrap();
    state = state.on_bubble_click(&tree, focus_bubble);
    state = state.drill_up(&tree);
    assert!(state.is_root_view());
}

#[test]
fn given_search_jump_to_leaf_when_focusing_then_overlay_shows_leaf() {
    let tree = build(&demo_records().unwrap()).unwrap();
    let store = tree.find("Store").unwrap();

    let state = FocusState::root_view(&tree).focus_on(&tree, store);

    assert_eq!(state.focus, tree.find("Tokyo Store").unwrap());
    assert_eq!(state.overlay_node(), Some(store));
}
