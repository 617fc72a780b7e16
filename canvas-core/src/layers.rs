//! Ordered element storage with z-order, visibility and selection.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult, Element, ElementId};

/// Where [`LayerStore::reorder`] moves an element in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderTarget {
    /// Paint last (on top of everything).
    Front,
    /// Paint first (below everything).
    Back,
    /// Swap with the element painted just after it.
    Up,
    /// Swap with the element painted just before it.
    Down,
}

/// One row of the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    /// Element the row refers to.
    pub id: ElementId,
    /// Paint order key.
    pub layer: u32,
    /// Kind label (`text`, `rectangle`, ...).
    pub kind: String,
    /// Display name.
    pub name: String,
    /// Whether the element has a confirmed snapshot.
    pub confirmed: bool,
    /// Whether the element is painted.
    pub visible: bool,
    /// Whether the element is the current selection.
    pub selected: bool,
}

/// All elements of a document, kept in paint order (ascending `layer`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawLayerStore")]
pub struct LayerStore {
    /// Elements sorted by ascending layer.
    elements: Vec<Element>,
    /// Last layer value handed out.
    layer_counter: u32,
    /// Currently selected element.
    selected: Option<ElementId>,
}

/// Stored form of a [`LayerStore`], validated before use.
#[derive(Deserialize)]
struct RawLayerStore {
    elements: Vec<Element>,
    #[serde(default)]
    layer_counter: u32,
    #[serde(default)]
    selected: Option<ElementId>,
}

impl TryFrom<RawLayerStore> for LayerStore {
    type Error = CanvasError;

    fn try_from(raw: RawLayerStore) -> CanvasResult<Self> {
        let mut elements = raw.elements;
        elements.sort_by_key(|e| e.layer);

        if let Some(e) = elements.iter().find(|e| e.layer == 0) {
            return Err(CanvasError::InvalidLayers(format!(
                "element {} has layer 0",
                e.id
            )));
        }
        if let Some(pair) = elements.windows(2).find(|w| w[0].layer == w[1].layer) {
            return Err(CanvasError::InvalidLayers(format!(
                "layer {} is used twice",
                pair[0].layer
            )));
        }
        let mut ids = HashSet::with_capacity(elements.len());
        if let Some(e) = elements.iter().find(|e| !ids.insert(e.id)) {
            return Err(CanvasError::InvalidLayers(format!(
                "element {} is stored twice",
                e.id
            )));
        }

        let top = elements.last().map_or(0, |e| e.layer);
        let selected = raw
            .selected
            .filter(|id| elements.iter().any(|e| e.id == *id));
        if raw.selected.is_some() && selected.is_none() {
            tracing::warn!("Dropping selection of a missing element");
        }

        Ok(Self {
            elements,
            layer_counter: raw.layer_counter.max(top),
            selected,
        })
    }
}

impl LayerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element on top, assigning the next layer value.
    pub fn add(&mut self, mut element: Element) -> ElementId {
        self.layer_counter += 1;
        element.layer = self.layer_counter;
        let id = element.id;
        tracing::debug!("Layer {} assigned to {id}", element.layer);
        self.elements.push(element);
        id
    }

    /// Remove an element. Remaining layer values are left as they are.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove(&mut self, id: ElementId) -> CanvasResult<Element> {
        let index = self.index_of(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(self.elements.remove(index))
    }

    /// Remove every element and reset the layer counter.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.layer_counter = 0;
        self.selected = None;
    }

    /// Move an element in paint order and renumber all layers to `1..=N`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn reorder(&mut self, id: ElementId, target: ReorderTarget) -> CanvasResult<()> {
        let current = self.index_of(id)?;
        let last = self.elements.len() - 1;
        let new_index = match target {
            ReorderTarget::Front => last,
            ReorderTarget::Back => 0,
            ReorderTarget::Up => (current + 1).min(last),
            ReorderTarget::Down => current.saturating_sub(1),
        };

        let element = self.elements.remove(current);
        self.elements.insert(new_index, element);

        for (rank, element) in (1u32..).zip(self.elements.iter_mut()) {
            element.layer = rank;
        }
        self.layer_counter = self.layer_counter.max(self.rank_count());

        tracing::debug!("Reordered {id} {target:?}: index {current} -> {new_index}");
        Ok(())
    }

    /// Show or hide an element without affecting its order.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> CanvasResult<()> {
        self.get_mut(id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))?
            .visible = visible;
        Ok(())
    }

    /// Select an element, replacing any previous selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn select(&mut self, id: ElementId) -> CanvasResult<()> {
        self.index_of(id)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Currently selected element ID.
    #[must_use]
    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    /// Currently selected element.
    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Elements in paint order (bottom first).
    pub fn paint_order(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Text elements in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_text())
    }

    /// Shape elements in paint order.
    pub fn shapes(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_shape())
    }

    /// Rows for the layer panel, topmost first.
    #[must_use]
    pub fn panel(&self) -> Vec<LayerEntry> {
        self.elements
            .iter()
            .rev()
            .map(|e| LayerEntry {
                id: e.id,
                layer: e.layer,
                kind: e.kind.label().to_string(),
                name: e.display_name(),
                confirmed: e.is_confirmed(),
                visible: e.visible,
                selected: self.selected == Some(e.id),
            })
            .collect()
    }

    /// Topmost visible element whose live box contains the point.
    #[must_use]
    pub fn element_at(&self, x: f32, y: f32) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.visible && e.contains_point(x, y))
            .map(|e| e.id)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the store holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn rank_count(&self) -> u32 {
        u32::try_from(self.elements.len()).unwrap_or(u32::MAX)
    }

    fn index_of(&self, id: ElementId) -> CanvasResult<usize> {
        self.elements
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CanvasError::ElementNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rect, ShapeStyle};
    use proptest::prelude::*;

    fn shape() -> Element {
        Element::shape(ShapeStyle::default(), Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    fn layers(store: &LayerStore) -> Vec<u32> {
        store.paint_order().map(|e| e.layer).collect()
    }

    #[test]
    fn test_add_assigns_increasing_layers() {
        let mut store = LayerStore::new();
        store.add(shape());
        store.add(shape());
        store.add(shape());
        assert_eq!(layers(&store), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_leaves_gaps() {
        let mut store = LayerStore::new();
        store.add(shape());
        let middle = store.add(shape());
        store.add(shape());
        store.remove(middle).expect("should remove");
        assert_eq!(layers(&store), vec![1, 3]);

        // New elements still land on top.
        store.add(shape());
        assert_eq!(layers(&store), vec![1, 3, 4]);
    }

    #[test]
    fn test_reorder_compacts() {
        let mut store = LayerStore::new();
        let a = store.add(shape());
        store.add(shape());
        let c = store.add(shape());
        store.remove(c).expect("should remove");

        store.reorder(a, ReorderTarget::Front).expect("reorder");
        assert_eq!(layers(&store), vec![1, 2]);
        assert_eq!(store.paint_order().last().map(|e| e.id), Some(a));
    }

    #[test]
    fn test_reorder_up_down_at_edges() {
        let mut store = LayerStore::new();
        let a = store.add(shape());
        let b = store.add(shape());

        store.reorder(b, ReorderTarget::Up).expect("reorder");
        assert_eq!(store.paint_order().last().map(|e| e.id), Some(b));

        store.reorder(a, ReorderTarget::Down).expect("reorder");
        assert_eq!(store.paint_order().next().map(|e| e.id), Some(a));

        store.reorder(a, ReorderTarget::Up).expect("reorder");
        assert_eq!(store.paint_order().last().map(|e| e.id), Some(a));
    }

    #[test]
    fn test_single_selection() {
        let mut store = LayerStore::new();
        let a = store.add(shape());
        let b = store.add(shape());
        store.select(a).expect("select");
        store.select(b).expect("select");
        assert_eq!(store.selected_id(), Some(b));
        assert_eq!(store.panel().iter().filter(|row| row.selected).count(), 1);

        store.remove(b).expect("remove");
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn test_select_unknown_fails() {
        let mut store = LayerStore::new();
        assert!(store.select(ElementId::new()).is_err());
    }

    #[test]
    fn test_visibility_keeps_order() {
        let mut store = LayerStore::new();
        let a = store.add(shape());
        store.add(shape());
        store.set_visible(a, false).expect("hide");
        assert_eq!(layers(&store), vec![1, 2]);
        assert!(!store.get(a).unwrap().visible);
        assert_eq!(store.element_at(5.0, 5.0), store.paint_order().nth(1).map(|e| e.id));
    }

    #[test]
    fn test_panel_is_reverse_paint_order() {
        let mut store = LayerStore::new();
        let ids: Vec<_> = (0..4).map(|_| store.add(shape())).collect();
        store.reorder(ids[0], ReorderTarget::Front).expect("reorder");

        let panel: Vec<_> = store.panel().iter().map(|row| row.id).collect();
        let mut paint: Vec<_> = store.paint_order().map(|e| e.id).collect();
        paint.reverse();
        assert_eq!(panel, paint);
    }

    #[test]
    fn test_derived_views() {
        let mut store = LayerStore::new();
        store.add(shape());
        store.add(Element::text(
            "hello",
            crate::TextStyle::default(),
            Rect::new(0.0, 0.0, 10.0, 10.0),
        ));
        assert_eq!(store.texts().count(), 1);
        assert_eq!(store.shapes().count(), 1);
    }

    fn target() -> impl Strategy<Value = ReorderTarget> {
        prop_oneof![
            Just(ReorderTarget::Front),
            Just(ReorderTarget::Back),
            Just(ReorderTarget::Up),
            Just(ReorderTarget::Down),
        ]
    }

    proptest! {
        #[test]
        fn prop_reorder_renumbers(count in 1usize..12, removals in prop::collection::vec(any::<prop::sample::Index>(), 0..4), moves in prop::collection::vec((any::<prop::sample::Index>(), target()), 1..10)) {
            let mut store = LayerStore::new();
            let mut ids: Vec<_> = (0..count).map(|_| store.add(shape())).collect();
            for removal in removals {
                if ids.len() > 1 {
                    let id = ids.remove(removal.index(ids.len()));
                    store.remove(id).unwrap();
                }
            }
            for (pick, target) in moves {
                let id = ids[pick.index(ids.len())];
                store.reorder(id, target).unwrap();
                let expected: Vec<u32> = (1..=u32::try_from(ids.len()).unwrap()).collect();
                prop_assert_eq!(layers(&store), expected);
            }
            let fresh = store.add(shape());
            prop_assert_eq!(store.paint_order().last().map(|e| e.id), Some(fresh));
            let all = layers(&store);
            prop_assert!(all.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
