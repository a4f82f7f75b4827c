//! Tests for longer mutation sequences
//!
//! This tests:
//! - Scripts of serialized mutations
//! - Interleaved live and committed edits
//! - Page operations mixed with element operations
//! - Linked option elements through history

use customfly_editor::{
    link_status, AssetLibrary, Composer, EditSession, ElementPatch, LinkStatus, Mutation, OptionSet,
    ReorderDirection, SessionConfig,
};
use customfly_model::{default_pages, CanvasElement, DropdownProps, ElementKind};
use std::time::{Duration, Instant};

#[test]
fn test_script_from_json() {
    let script = r#"[
        { "op": "add_element", "element": { "id": "title", "type": "text", "text": "Hello" } },
        { "op": "add_element", "element": { "id": "logo", "type": "image", "src": "https://cdn/logo.png" } },
        { "op": "update_element", "id": "title", "patch": { "x": 40, "y": 12 } },
        { "op": "commit" },
        { "op": "reorder_element", "id": "title", "direction": "bring_to_front" },
        { "op": "delete_element", "id": "missing" }
    ]"#;
    let mutations: Vec<Mutation> = serde_json::from_str(script).unwrap();

    let mut composer = Composer::new(default_pages());
    let applied: Vec<bool> = mutations
        .into_iter()
        .map(|m| composer.apply(m).is_applied())
        .collect();

    assert_eq!(applied, vec![true, true, true, true, true, false]);
    let order: Vec<&str> = composer.active_page().paint_order().iter().map(|e| e.id()).collect();
    assert_eq!(order, vec!["logo", "title"]);
    assert_eq!(composer.history().undo_levels(), 4);
}

#[test]
fn test_interleaved_live_and_committed_edits() {
    let mut session = EditSession::new(default_pages(), SessionConfig::default());
    let t0 = Instant::now();

    session.apply(Mutation::AddElement {
        element: CanvasElement::text("a", "A"),
    });

    // Drag: three live moves, then a discrete toggle
    for (i, x) in [10, 20, 30].iter().enumerate() {
        session.update_live("a", &ElementPatch::new().set("x", *x), t0 + Duration::from_millis(i as u64 * 16));
    }
    session.apply(Mutation::CommitUpdate {
        id: "a".to_string(),
        patch: ElementPatch::new().set("isRequired", true),
    });

    // add, drag, toggle
    assert_eq!(session.composer().history().undo_levels(), 3);

    session.undo();
    let a = session.composer().active_page().element("a").unwrap();
    assert_eq!(a.base.x, 30.0);
    assert_eq!(a.base.is_required, None);

    session.undo();
    assert_eq!(session.composer().active_page().element("a").unwrap().base.x, 0.0);
}

#[test]
fn test_duplicate_then_reorder_then_undo_all() {
    let mut composer = Composer::new(default_pages());
    composer.add_element(CanvasElement::text("a", "A").with_z_index(1));
    composer.add_element(CanvasElement::text("b", "B").with_z_index(2));
    let baseline = composer.pages().to_vec();

    composer.duplicate_element("a");
    let copy_id = composer.selected_element_id().unwrap().to_string();
    composer.reorder_element(&copy_id, ReorderDirection::SendToBack);
    composer.reorder_element("b", ReorderDirection::SendBackward);

    let order: Vec<&str> = composer.active_page().paint_order().iter().map(|e| e.id()).collect();
    assert_eq!(order, vec![copy_id.as_str(), "b", "a"]);

    for _ in 0..3 {
        assert!(composer.undo());
    }
    assert_eq!(composer.pages(), baseline.as_slice());
}

#[test]
fn test_pages_and_elements_together() {
    let mut composer = Composer::new(default_pages());
    composer.add_element(CanvasElement::text("front-title", "Front"));
    composer.add_page(Some("Back".to_string()));
    composer.add_element(CanvasElement::text("back-title", "Back"));

    let back = composer.active_page_id().to_string();
    composer.set_active_page("default");
    assert_eq!(composer.selected_element_id(), None);
    assert!(!composer.active_page().contains("back-title"));

    // Element ids are per page: the same id may live on both sides
    assert!(composer.add_element(CanvasElement::text("back-title", "Again")).is_applied());

    composer.delete_page(&back);
    assert_eq!(composer.pages().len(), 1);
    composer.undo();
    assert_eq!(composer.pages().len(), 2);
    assert!(composer.page(&back).unwrap().contains("back-title"));
}

#[test]
fn test_linked_dropdown_through_history() {
    let mut library = AssetLibrary {
        option_sets: vec![OptionSet {
            id: "finish".to_string(),
            name: "Finish".to_string(),
            options: vec!["Matte".to_string(), "Gloss".to_string()],
        }],
        ..AssetLibrary::default()
    };

    let mut composer = Composer::new(default_pages());
    composer.add_element(CanvasElement::new("d1", ElementKind::Dropdown(DropdownProps::default())));
    assert!(composer.link_options("d1", "finish", &library).is_applied());

    let linked = composer.active_page().element("d1").unwrap();
    assert_eq!(link_status(linked, &library), LinkStatus::Synced);

    library.option_sets[0].options.push("Satin".to_string());
    assert_eq!(link_status(linked, &library), LinkStatus::Stale);

    library.option_sets.clear();
    assert_eq!(link_status(linked, &library), LinkStatus::Orphaned);
    assert_eq!(linked.kind.options().unwrap().len(), 2);

    assert!(composer.unlink_options("d1").is_applied());
    composer.undo();
    assert_eq!(composer.active_page().element("d1").unwrap().kind.linked_asset_id(), Some("finish"));
}
