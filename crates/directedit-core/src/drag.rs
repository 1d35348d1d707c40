//! Re-parenting a selected flex item by dragging it between flex containers.
//!
//! Idle -> Dragging -> (Committed | Cancelled). The only DOM writes are the
//! dragged element's inline opacity, restored on every exit, and the final
//! `insert_before` on commit.

use crate::dom::{DomHost, DomResult, ElementId};
use crate::input::{ModifierKey, Modifiers};
use crate::properties::{Display, FlexDirection};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Thickness of the drop indicator bar.
pub const DROP_INDICATOR_THICKNESS: f64 = 2.0;

/// Where the dragged element would land.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropTarget {
    pub container: ElementId,
    /// Sibling to insert before; `None` appends.
    pub insert_before: Option<ElementId>,
    /// Resulting index among the container's children.
    pub index: usize,
    /// Bar drawn at the insertion seam.
    pub indicator: Rect,
}

/// Transient drag state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    pub is_dragging: bool,
    pub dragged_element: Option<ElementId>,
    pub original_parent: Option<ElementId>,
    pub original_next_sibling: Option<ElementId>,
    /// Top-left of the ghost box.
    pub ghost_position: Point,
    pub ghost_size: Size,
    /// Pointer position relative to the element's top-left at drag start.
    pub drag_offset: Vec2,
    pub drop_target: Option<DropTarget>,
    original_opacity: Option<String>,
    left_original_parent: bool,
}

impl DragState {
    pub fn ghost_rect(&self) -> Rect {
        Rect::from_origin_size(self.ghost_position, self.ghost_size)
    }
}

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Committed {
        element: ElementId,
        parent: ElementId,
        index: usize,
    },
    Cancelled,
}

fn is_flex_container<D: DomHost + ?Sized>(dom: &D, el: ElementId) -> bool {
    Display::parse(&dom.computed_style(el, "display")).is_flex()
}

/// Main-axis interval of a box.
fn main_range(rect: Rect, row: bool) -> (f64, f64) {
    if row { (rect.x0, rect.x1) } else { (rect.y0, rect.y1) }
}

/// Drives a single drag at a time.
#[derive(Debug, Clone)]
pub struct DragEngine {
    state: DragState,
    opacity: String,
}

impl DragEngine {
    /// `opacity` is written to the dragged element while in motion.
    pub fn new(opacity: impl Into<String>) -> Self {
        Self {
            state: DragState::default(),
            opacity: opacity.into(),
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    /// A drag may start on the selected element (or inside it) when it is a
    /// flex item and the drag modifier is held.
    pub fn can_start<D: DomHost + ?Sized>(
        &self,
        dom: &D,
        target: ElementId,
        selected: Option<ElementId>,
        modifiers: Modifiers,
        modifier: ModifierKey,
    ) -> bool {
        let Some(selected) = selected else {
            return false;
        };
        !self.state.is_dragging
            && modifiers.is_held(modifier)
            && dom.is_inclusive_descendant(selected, target)
            && dom
                .parent(selected)
                .is_some_and(|parent| is_flex_container(dom, parent))
    }

    pub fn start<D: DomHost + ?Sized>(
        &mut self,
        dom: &mut D,
        element: ElementId,
        pointer: Point,
    ) -> DomResult<()> {
        let rect = dom.bounding_rect(element);
        let original_opacity = dom.inline_style(element, "opacity");
        dom.set_inline_style(element, "opacity", &self.opacity)?;

        self.state = DragState {
            is_dragging: true,
            dragged_element: Some(element),
            original_parent: dom.parent(element),
            original_next_sibling: dom.next_sibling(element),
            ghost_position: rect.origin(),
            ghost_size: rect.size(),
            drag_offset: pointer - rect.origin(),
            drop_target: None,
            original_opacity,
            left_original_parent: false,
        };
        log::debug!("Drag started on {}", element);
        Ok(())
    }

    /// Track the pointer and recompute the drop target.
    pub fn update<D: DomHost + ?Sized>(&mut self, dom: &mut D, pointer: Point) -> Option<&DropTarget> {
        let dragged = self.state.dragged_element.filter(|_| self.state.is_dragging)?;
        self.state.ghost_position = pointer - self.state.drag_offset;

        if let Some(parent) = self.state.original_parent {
            if !dom.bounding_rect(parent).contains(pointer) {
                self.state.left_original_parent = true;
            }
        }

        self.state.drop_target = self.find_target(dom, dragged, pointer);
        self.state.drop_target.as_ref()
    }

    fn find_target<D: DomHost + ?Sized>(
        &self,
        dom: &mut D,
        dragged: ElementId,
        pointer: Point,
    ) -> Option<DropTarget> {
        dom.set_overlays_hit_testable(false);
        let hits = dom.elements_from_point(pointer);
        dom.set_overlays_hit_testable(true);

        let container = hits.into_iter().find(|&el| {
            !dom.is_overlay(el)
                && !dom.is_inclusive_descendant(dragged, el)
                && is_flex_container(&*dom, el)
        })?;

        // The original parent only becomes a target once the pointer has
        // left it and come back.
        if Some(container) == self.state.original_parent && !self.state.left_original_parent {
            return None;
        }

        Some(compute_drop_target(&*dom, container, dragged, pointer))
    }

    /// Finish the drag. Moves the element if the target differs from where
    /// it started and calls `on_complete` with it.
    pub fn commit<D, F>(&mut self, dom: &mut D, on_complete: F) -> DomResult<DragOutcome>
    where
        D: DomHost + ?Sized,
        F: FnOnce(ElementId),
    {
        let state = std::mem::take(&mut self.state);
        let Some(dragged) = state.dragged_element.filter(|_| state.is_dragging) else {
            return Ok(DragOutcome::Cancelled);
        };
        restore_opacity(dom, dragged, state.original_opacity.as_deref())?;

        let Some(target) = state.drop_target else {
            log::debug!("Drag ended without a drop target");
            return Ok(DragOutcome::Cancelled);
        };
        let unchanged = Some(target.container) == state.original_parent
            && target.insert_before == state.original_next_sibling;
        if unchanged {
            log::debug!("Drag ended at its original position");
            return Ok(DragOutcome::Cancelled);
        }

        dom.insert_before(target.container, dragged, target.insert_before)?;
        log::debug!("Moved {} into {} at {}", dragged, target.container, target.index);
        on_complete(dragged);
        Ok(DragOutcome::Committed {
            element: dragged,
            parent: target.container,
            index: target.index,
        })
    }

    /// Abort the drag, leaving the tree untouched.
    pub fn cancel<D: DomHost + ?Sized>(&mut self, dom: &mut D) -> DomResult<()> {
        let state = std::mem::take(&mut self.state);
        if let Some(dragged) = state.dragged_element.filter(|_| state.is_dragging) {
            restore_opacity(dom, dragged, state.original_opacity.as_deref())?;
            log::debug!("Drag cancelled");
        }
        Ok(())
    }
}

impl Default for DragEngine {
    fn default() -> Self {
        Self::new("0.5")
    }
}

fn restore_opacity<D: DomHost + ?Sized>(dom: &mut D, el: ElementId, original: Option<&str>) -> DomResult<()> {
    match original {
        Some(value) => dom.set_inline_style(el, "opacity", value),
        None => dom.remove_inline_style(el, "opacity"),
    }
}

/// Insertion point in `container` for a pointer position.
///
/// Children are compared by their midpoint along the main axis; the element
/// lands before the first child the pointer has not passed.
pub fn compute_drop_target<D: DomHost + ?Sized>(
    dom: &D,
    container: ElementId,
    dragged: ElementId,
    pointer: Point,
) -> DropTarget {
    let direction = FlexDirection::parse(&dom.computed_style(container, "flex-direction"));
    let row = direction.is_row();
    let reverse = direction.is_reverse();
    let coord = if row { pointer.x } else { pointer.y };

    let siblings: Vec<(ElementId, Rect)> = dom
        .children(container)
        .into_iter()
        .filter(|&c| c != dragged && !dom.is_overlay(c))
        .map(|c| (c, dom.bounding_rect(c)))
        .collect();

    let index = siblings
        .iter()
        .position(|&(_, rect)| {
            let (start, end) = main_range(rect, row);
            let mid = (start + end) / 2.0;
            if reverse { coord > mid } else { coord < mid }
        })
        .unwrap_or(siblings.len());

    let container_rect = dom.bounding_rect(container);
    let seam = seam_position(&siblings, index, container_rect, row, reverse);
    let half = DROP_INDICATOR_THICKNESS / 2.0;
    let indicator = if row {
        Rect::new(seam - half, container_rect.y0, seam + half, container_rect.y1)
    } else {
        Rect::new(container_rect.x0, seam - half, container_rect.x1, seam + half)
    };

    DropTarget {
        container,
        insert_before: siblings.get(index).map(|&(el, _)| el),
        index,
        indicator,
    }
}

/// Main-axis coordinate of the gap the element would occupy.
fn seam_position(siblings: &[(ElementId, Rect)], index: usize, container: Rect, row: bool, reverse: bool) -> f64 {
    // In reverse directions DOM order runs from the main end to the start.
    let leading = |rect: Rect| {
        let (start, end) = main_range(rect, row);
        if reverse { end } else { start }
    };
    let trailing = |rect: Rect| {
        let (start, end) = main_range(rect, row);
        if reverse { start } else { end }
    };

    let before = index.checked_sub(1).and_then(|i| siblings.get(i));
    match (before, siblings.get(index)) {
        (Some(&(_, prev)), Some(&(_, next))) => (trailing(prev) + leading(next)) / 2.0,
        (None, Some(&(_, next))) => leading(next),
        (Some(&(_, prev)), None) => trailing(prev),
        (None, None) => leading(container),
    }
}
