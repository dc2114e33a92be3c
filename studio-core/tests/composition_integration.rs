//! Composition Integration Tests
//!
//! Exercises the public API end to end:
//! - Layer creation and deletion
//! - Element defaults and stacking order
//! - Drag/drop placement under zoom
//! - Freehand drawing and erasing
//! - Pen-tool vector paths

use proptest::prelude::*;
use studio_core::{
    CanvasRect, ClientPoint, Composition, DesignDocument, ElementDraft, ElementId, LayerId,
    PaintTarget, PaletteItem, PointerEvent, Position, StudioError, SubTool,
};

fn image(id: &str) -> ElementDraft {
    ElementDraft::new(id, "image")
}

fn z_of(composition: &Composition, id: &ElementId) -> i32 {
    composition
        .element(id)
        .map(|e| e.z_index)
        .expect("element exists")
}

// ============================================================================
// Layers
// ============================================================================

#[test]
fn test_added_layers_are_named_in_sequence_and_become_active() {
    let mut composition = Composition::new();
    assert_eq!(composition.layers().len(), 1);

    composition.add_layer();
    let last = composition.add_layer();

    let names: Vec<_> = composition.layers().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Layer 1", "Layer 2", "Layer 3"]);
    assert!(composition.layers().iter().all(|l| l.visible && !l.locked));
    assert_eq!(composition.active_layer(), &last);
}

#[test]
fn test_only_layer_cannot_be_deleted() {
    let mut composition = Composition::new();
    let only = composition.active_layer().clone();

    assert!(matches!(
        composition.delete_layer(&only),
        Err(StudioError::LastLayer(_))
    ));
    assert_eq!(composition.layers().len(), 1);
}

#[test]
fn test_deleting_active_layer_falls_back_to_first() {
    let mut composition = Composition::new();
    let first = composition.active_layer().clone();
    let second = composition.add_layer();
    let id = composition.add_element(image("a")).expect("add");

    composition.delete_layer(&second).expect("delete");

    assert_eq!(composition.active_layer(), &first);
    assert_eq!(
        composition.layer_stack().owner_of(&id).map(|l| l.id.clone()),
        Some(first)
    );
    assert!(composition.element(&id).is_some());
}

#[test]
fn test_deleting_unknown_layer_is_a_no_op() {
    let mut composition = Composition::new();
    composition.add_layer();
    composition
        .delete_layer(&LayerId::new("ghost"))
        .expect("unknown ids are ignored");
    assert_eq!(composition.layers().len(), 2);
}

// ============================================================================
// Elements
// ============================================================================

#[test]
fn test_explicit_position_kept_and_garment_defaults_to_center() {
    let mut composition = Composition::new();
    let x = composition
        .add_element(image("x").with_position(Position::new(10.0, 10.0)))
        .expect("add");
    let garment = composition
        .add_element(ElementDraft::new("ignored", "garment"))
        .expect("add");

    assert_eq!(
        composition.element(&x).map(|e| e.position),
        Some(Position::new(10.0, 10.0))
    );
    assert_eq!(
        composition.element(&garment).map(|e| e.position),
        Some(Position::new(50.0, 50.0))
    );
    assert!(garment.as_str().starts_with("gmt-"));
}

#[test]
fn test_add_after_select_wins_z_order() {
    let mut composition = Composition::new();
    let a = composition.add_element(image("a")).expect("add");
    for id in ["b", "c", "d"] {
        composition.add_element(image(id)).expect("add");
    }

    assert!(composition.select_element(Some(&a)));
    let z_a = z_of(&composition, &a);
    assert_eq!(z_a, 5);

    let b2 = composition.add_element(image("e")).expect("add");
    assert_eq!(z_of(&composition, &b2), z_a + 1);
    assert_eq!(composition.selected_element().map(|e| &e.id), Some(&b2));
}

#[test]
fn test_garments_stagger_along_x() {
    let mut composition = Composition::new();
    let xs: Vec<f32> = (0..3)
        .map(|_| {
            let id = composition
                .add_element(ElementDraft::new("tee", "garment"))
                .expect("add");
            composition.element(&id).map(|e| e.position.x).expect("exists")
        })
        .collect();
    assert_eq!(xs, vec![50.0, 90.0, 130.0]);
}

// ============================================================================
// Drag and drop
// ============================================================================

#[test]
fn test_drop_position_accounts_for_zoom() {
    let mut composition = Composition::new();
    composition.set_canvas_rect(Some(CanvasRect::new(0.0, 0.0, 500.0, 500.0)));
    composition.set_zoom(200.0);

    let item = PaletteItem::new("sleeve-patch", "Sleeve Patch", "patches", "image");
    let id = composition
        .drop_item(&item, ClientPoint::new(125.0, 250.0))
        .expect("drop")
        .expect("canvas measured");

    let element = composition.element(&id).expect("element");
    assert!((element.position.x - 12.5).abs() < 1e-4);
    assert!((element.position.y - 25.0).abs() < 1e-4);
    assert!(id.as_str().starts_with("canvas-"));
    assert_eq!(element.name, "Sleeve Patch");
}

#[test]
fn test_drop_into_locked_layer_fails() {
    let mut composition = Composition::new();
    composition.set_canvas_rect(Some(CanvasRect::new(0.0, 0.0, 100.0, 100.0)));
    let layer = composition.active_layer().clone();
    composition.set_layer_locked(&layer, true);

    let item = PaletteItem::new("logo", "Logo", "logos", "image");
    assert!(matches!(
        composition.drop_item(&item, ClientPoint::new(10.0, 10.0)),
        Err(StudioError::LayerLocked(_))
    ));
    assert!(composition.elements().is_empty());
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_single_click_draw_commits_nothing() {
    let mut composition = Composition::new();
    composition.set_canvas_rect(Some(CanvasRect::new(0.0, 0.0, 200.0, 200.0)));
    composition.set_tool(SubTool::Draw);

    composition.handle_pointer(PointerEvent::down(5.0, 5.0));
    composition.handle_pointer(PointerEvent::up(5.0, 5.0));
    assert!(composition.visible_strokes().is_empty());
}

#[test]
fn test_erased_stroke_stays_erased() {
    let mut composition = Composition::new();
    composition.set_canvas_rect(Some(CanvasRect::new(0.0, 0.0, 200.0, 200.0)));
    composition.set_tool(SubTool::Draw);
    composition.handle_pointer(PointerEvent::down(10.0, 10.0));
    composition.handle_pointer(PointerEvent::moved(12.0, 12.0));
    composition.handle_pointer(PointerEvent::up(12.0, 12.0));
    assert_eq!(composition.visible_strokes().len(), 1);

    composition.set_tool(SubTool::Eraser);
    composition.handle_pointer(PointerEvent::down(10.0, 10.0));
    composition.handle_pointer(PointerEvent::moved(150.0, 150.0));
    composition.handle_pointer(PointerEvent::up(150.0, 150.0));

    assert!(composition.visible_strokes().is_empty());
    assert_eq!(composition.drawing().all_strokes().len(), 1);
}

// ============================================================================
// Vector paths
// ============================================================================

#[test]
fn test_pen_shape_on_hidden_layer_is_not_filled() {
    let mut composition = Composition::new();
    composition.set_canvas_rect(Some(CanvasRect::new(0.0, 0.0, 400.0, 400.0)));
    composition.set_tool(SubTool::Vector);
    for (x, y) in [(0.0, 0.0), (300.0, 0.0), (300.0, 300.0), (0.0, 300.0)] {
        composition.handle_pointer(PointerEvent::down(x, y));
    }
    let outer = composition.finish_vector_path(true).expect("outer");

    let upper = composition.add_layer();
    for (x, y) in [(100.0, 100.0), (200.0, 100.0), (150.0, 200.0)] {
        composition.handle_pointer(PointerEvent::down(x, y));
    }
    let inner = composition.finish_vector_path(true).expect("inner");

    let point = ClientPoint::new(150.0, 130.0);
    assert_eq!(
        composition
            .fill_vector_area(point, "#111111", PaintTarget::Fill)
            .expect("fill"),
        Some(inner)
    );

    composition.set_layer_visibility(&upper, false);
    assert_eq!(
        composition
            .fill_vector_area(point, "#222222", PaintTarget::Fill)
            .expect("fill"),
        Some(outer)
    );
}

// ============================================================================
// Documents
// ============================================================================

#[test]
fn test_document_with_overflowing_z_accepts_new_elements() {
    let mut composition = Composition::new();
    let a = composition.add_element(image("a")).expect("add");
    let mut document = composition.to_document();
    document.elements[0].z_index = i32::MAX;

    let mut restored = Composition::from_document(document).expect("restore");
    let b = restored.add_element(image("b")).expect("add");
    assert!(z_of(&restored, &b) > z_of(&restored, &a));
    assert!(restored.select_element(Some(&a)));
    assert!(z_of(&restored, &a) > z_of(&restored, &b));
}

#[test]
fn test_document_json_roundtrip_preserves_layers() {
    let mut composition = Composition::new();
    composition.add_element(image("a")).expect("add");
    composition.add_layer();
    composition.add_element(image("b")).expect("add");

    let json = composition.to_document().to_json_pretty().expect("json");
    let restored = Composition::from_document(DesignDocument::from_json(&json).expect("parse"))
        .expect("restore");

    assert_eq!(restored.layers(), composition.layers());
    assert_eq!(restored.elements().len(), 2);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_each_add_stacks_above_all_previous(
        selects in prop::collection::vec(prop::option::of(0usize..16), 1..16)
    ) {
        let mut composition = Composition::new();
        let mut added: Vec<ElementId> = Vec::new();

        for (i, select) in selects.iter().enumerate() {
            if let Some(index) = select {
                if let Some(id) = added.get(index % added.len().max(1)) {
                    composition.select_element(Some(id));
                }
            }
            let max_before = composition.elements().iter().map(|e| e.z_index).max();
            let id = composition.add_element(image(&format!("el-{i}"))).expect("add");
            let z = z_of(&composition, &id);
            if let Some(max_before) = max_before {
                prop_assert!(z > max_before);
            }
            added.push(id);
        }
    }

    #[test]
    fn prop_select_promotes_only_the_target(
        count in 1usize..12,
        picks in prop::collection::vec(0usize..12, 1..8)
    ) {
        let mut composition = Composition::new();
        let ids: Vec<ElementId> = (0..count)
            .map(|i| composition.add_element(image(&format!("el-{i}"))).expect("add"))
            .collect();

        for pick in picks {
            let target = &ids[pick % count];
            let before: Vec<(ElementId, i32)> = composition
                .elements()
                .iter()
                .map(|e| (e.id.clone(), e.z_index))
                .collect();

            prop_assert!(composition.select_element(Some(target)));

            let max = composition.elements().iter().map(|e| e.z_index).max();
            prop_assert_eq!(Some(z_of(&composition, target)), max);
            for (id, z) in before {
                if &id != target {
                    prop_assert_eq!(z_of(&composition, &id), z);
                }
            }
        }
    }
}
