//! Document Integration Tests
//!
//! Tests the editing flow through `CanvasState`:
//! - Layer ordering and the layer panel
//! - Confirm snapshots and stale live edits
//! - Pointer sessions end to end
//! - Document persistence

use canvas_core::text::FixedAdvance;
use canvas_core::{
    CanvasState, ElementKind, MeasureHandle, PointerEvent, ReorderTarget, ShapeKind, Viewport,
};

/// A document whose text layout does not depend on installed fonts.
fn document() -> CanvasState {
    let mut state = CanvasState::new();
    state.set_text_measure(MeasureHandle::new(FixedAdvance(10.0)));
    state
}

fn drag(state: &mut CanvasState, from: (f32, f32), to: (f32, f32)) {
    state.handle_pointer(&PointerEvent::press(from.0, from.1));
    state.handle_pointer(&PointerEvent::moved(to.0, to.1));
    state.handle_pointer(&PointerEvent::release(to.0, to.1));
}

// ============================================================================
// Layering
// ============================================================================

#[test]
fn test_panel_matches_paint_order_after_edits() {
    let mut state = document();
    let text = state.add_text("Title").expect("add text");
    let square = state.add_shape(ShapeKind::Rectangle);
    let circle = state.add_shape(ShapeKind::Circle);

    state.select(text).expect("select");
    state.reorder_selected(ReorderTarget::Front).expect("front");
    state.set_visible(square, false).expect("hide");

    let panel: Vec<_> = state.layer_panel().iter().map(|row| row.id).collect();
    assert_eq!(panel, vec![text, circle, square]);

    let layers: Vec<u32> = state.layers().paint_order().map(|e| e.layer).collect();
    assert_eq!(layers, vec![1, 2, 3]);

    let hidden = state.layer_panel().into_iter().find(|row| row.id == square);
    assert!(hidden.is_some_and(|row| !row.visible));
}

#[test]
fn test_delete_then_add_keeps_order_strict() {
    let mut state = document();
    state.add_shape(ShapeKind::Rectangle);
    let middle = state.add_shape(ShapeKind::Triangle);
    state.add_shape(ShapeKind::Circle);

    state.select(middle).expect("select");
    state.delete_selected().expect("delete");
    let newest = state.add_shape(ShapeKind::Rectangle);

    let layers: Vec<u32> = state.layers().paint_order().map(|e| e.layer).collect();
    assert_eq!(layers, vec![1, 3, 4]);
    assert_eq!(state.layer_panel()[0].id, newest);
}

#[test]
fn test_topmost_element_wins_hit_test() {
    let mut state = document();
    let below = state.add_shape(ShapeKind::Rectangle);
    let above = state.add_shape(ShapeKind::Circle);
    state.deselect();

    state.handle_pointer(&PointerEvent::press(150.0, 150.0));
    assert_eq!(state.layers().selected_id(), Some(above));
    state.handle_pointer(&PointerEvent::release(150.0, 150.0));

    state.reorder(below, ReorderTarget::Front).expect("front");
    state.deselect();
    state.handle_pointer(&PointerEvent::press(150.0, 150.0));
    assert_eq!(state.layers().selected_id(), Some(below));
}

// ============================================================================
// Confirm snapshots
// ============================================================================

#[test]
fn test_dragging_confirmed_element_keeps_snapshot() {
    let mut state = document();
    let id = state.add_shape(ShapeKind::Rectangle);
    state.confirm_selected().expect("confirm");

    drag(&mut state, (150.0, 150.0), (350.0, 250.0));

    let element = state.layers().get(id).expect("element");
    assert!((element.bounds.x - 300.0).abs() < f32::EPSILON);
    assert!(element.is_snapshot_stale());
    assert!((element.resolved().bounds.x - 100.0).abs() < f32::EPSILON);

    // Re-confirming picks up the new position.
    state.confirm(id).expect("confirm");
    let element = state.layers().get(id).expect("element");
    assert!((element.resolved().bounds.x - 300.0).abs() < f32::EPSILON);
    assert_eq!(state.stats().confirmed, 1);
}

#[test]
fn test_snapshot_records_viewport() {
    let mut state = document();
    state.set_viewport(400.0, 300.0).expect("viewport");
    let id = state.add_shape(ShapeKind::Rectangle);
    state.confirm(id).expect("confirm");

    let snapshot = state
        .layers()
        .get(id)
        .and_then(|e| e.snapshot().cloned())
        .expect("snapshot");
    assert_eq!(
        snapshot.viewport,
        Viewport {
            width: 400.0,
            height: 300.0
        }
    );
}

#[test]
fn test_style_edit_after_confirm_does_not_leak() {
    let mut state = document();
    let id = state.add_text("Frozen").expect("add");
    state.confirm(id).expect("confirm");
    state
        .edit_text(id, |content, style| {
            content.push_str(" and changed");
            style.font_size = 80.0;
        })
        .expect("edit");

    let element = state.layers().get(id).expect("element");
    let ElementKind::Text { content, style } = element.resolved().kind else {
        panic!("expected text");
    };
    assert_eq!(content, "Frozen");
    assert!((style.font_size - 24.0).abs() < f32::EPSILON);
}

#[test]
fn test_refit_after_confirm_changes_only_live_box() {
    let mut state = document();
    let id = state.add_text("Hello World").expect("add");
    state.confirm(id).expect("confirm");
    let confirmed_height = state.layers().get(id).expect("element").bounds.height;

    state.set_text_width(id, 60.0).expect("width");

    let element = state.layers().get(id).expect("element");
    assert!(element.bounds.height > confirmed_height);
    let resolved = element.resolved();
    assert!((resolved.bounds.height - confirmed_height).abs() < f32::EPSILON);
    assert!((resolved.bounds.width - 200.0).abs() < f32::EPSILON);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_document_json_preserves_layers_and_selection() {
    let mut state = document();
    state.add_text("One").expect("add");
    let shape = state.add_shape(ShapeKind::Triangle);
    state.reorder(shape, ReorderTarget::Back).expect("back");

    let json = state.to_json().expect("to json");
    let restored = CanvasState::from_json(&json).expect("from json");

    let before: Vec<_> = state.layer_panel();
    let after: Vec<_> = restored.layer_panel();
    assert_eq!(before, after);
    assert_eq!(restored.layers().selected_id(), Some(shape));
}

#[test]
fn test_document_json_rejects_bad_canvas() {
    let mut state = document();
    state.add_shape(ShapeKind::Circle);
    let json = state.to_json().expect("to json");
    let broken = json.replacen("\"width\": 800", "\"width\": 5", 1);
    assert!(CanvasState::from_json(&broken).is_err());
}

fn layers_json(state: &CanvasState) -> serde_json::Value {
    serde_json::from_str(&state.to_json().expect("to json")).expect("parse")
}

fn layer_values(state: &CanvasState) -> Vec<u32> {
    state.layers().paint_order().map(|e| e.layer).collect()
}

#[test]
fn test_document_json_restores_paint_order() {
    let mut state = document();
    state.add_shape(ShapeKind::Rectangle);
    state.add_shape(ShapeKind::Circle);

    let mut json = layers_json(&state);
    json["layers"]["elements"]
        .as_array_mut()
        .expect("elements")
        .reverse();
    json["layers"]["layer_counter"] = 0.into();

    let mut loaded = CanvasState::from_json(&json.to_string()).expect("load");
    assert_eq!(layer_values(&loaded), vec![1, 2]);

    loaded.add_shape(ShapeKind::Triangle);
    assert_eq!(layer_values(&loaded), vec![1, 2, 3]);
}

#[test]
fn test_document_json_rejects_duplicate_or_zero_layers() {
    let mut state = document();
    state.add_shape(ShapeKind::Rectangle);
    state.add_shape(ShapeKind::Circle);

    let mut duplicate = layers_json(&state);
    duplicate["layers"]["elements"][1]["layer"] = 1.into();
    assert!(CanvasState::from_json(&duplicate.to_string()).is_err());

    let mut zero = layers_json(&state);
    zero["layers"]["elements"][0]["layer"] = 0.into();
    assert!(CanvasState::from_json(&zero.to_string()).is_err());
}

#[test]
fn test_document_json_drops_dangling_selection() {
    let mut state = document();
    let id = state.add_shape(ShapeKind::Rectangle);
    let other = state.add_shape(ShapeKind::Circle);
    state.select(id).expect("select");

    let mut json = layers_json(&state);
    json["layers"]["selected"] = serde_json::to_value(other).expect("id");
    json["layers"]["elements"]
        .as_array_mut()
        .expect("elements")
        .retain(|e| e["id"] != serde_json::to_value(other).expect("id"));

    let loaded = CanvasState::from_json(&json.to_string()).expect("load");
    assert_eq!(loaded.layers().len(), 1);
    assert!(loaded.layers().selected().is_none());
}
