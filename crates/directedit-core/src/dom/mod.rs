//! DOM host abstraction.
//!
//! Core logic never touches platform DOM nodes directly. Elements are opaque
//! [`ElementId`] handles, and every read or write goes through [`DomHost`].
//! A browser adapter implements it over `web-sys`; [`MemoryDom`] implements
//! it in memory for native use and tests.

mod fixture;
mod memory;

pub use fixture::{NodeFixture, PageFixture};
pub use memory::MemoryDom;

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Data attribute carried by every overlay node so hit-testing can skip it.
pub const OVERLAY_ATTRIBUTE: &str = "data-direct-edit-overlay";

/// Opaque handle to an element in a [`DomHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a fresh, unique handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// DOM errors.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),
    #[error("Cannot insert {child} into its own subtree")]
    HierarchyRequest { child: ElementId },
    #[error("Reference node {0} is not a child of the target parent")]
    NotAChild(ElementId),
    #[error("Invalid page fixture: {0}")]
    Fixture(String),
    /// The host document rejected an operation.
    #[error("DOM operation failed: {0}")]
    Host(String),
}

/// Result type for DOM operations.
pub type DomResult<T> = Result<T, DomError>;

/// Read and write access to a live document.
///
/// Queries on unknown handles return empty values rather than errors; only
/// mutations report failures.
pub trait DomHost {
    /// Whether the handle refers to a live element.
    fn contains(&self, el: ElementId) -> bool;

    /// Lowercase tag name.
    fn tag_name(&self, el: ElementId) -> String;

    /// The `id` attribute.
    fn element_id(&self, el: ElementId) -> Option<String>;

    /// Class names in attribute order.
    fn class_list(&self, el: ElementId) -> Vec<String>;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    /// Element children in document order.
    fn children(&self, el: ElementId) -> Vec<ElementId>;

    /// Concatenated text of the element and its descendants.
    fn text_content(&self, el: ElementId) -> String;

    /// Resolved value of a CSS property (`getComputedStyle`).
    fn computed_style(&self, el: ElementId, property: &str) -> String;

    /// Value of a property in the element's inline `style` attribute.
    fn inline_style(&self, el: ElementId, property: &str) -> Option<String>;

    fn set_inline_style(&mut self, el: ElementId, property: &str, value: &str) -> DomResult<()>;

    fn remove_inline_style(&mut self, el: ElementId, property: &str) -> DomResult<()>;

    /// Border box in viewport coordinates (`getBoundingClientRect`).
    fn bounding_rect(&self, el: ElementId) -> Rect;

    /// Elements under a viewport point, topmost first
    /// (`document.elementsFromPoint`). Elements with `pointer-events: none`
    /// are skipped.
    fn elements_from_point(&self, point: Point) -> Vec<ElementId>;

    /// Topmost element under a viewport point.
    fn element_from_point(&self, point: Point) -> Option<ElementId> {
        self.elements_from_point(point).into_iter().next()
    }

    /// Whether the element carries [`OVERLAY_ATTRIBUTE`].
    fn is_overlay(&self, el: ElementId) -> bool;

    /// Toggle `pointer-events` on every overlay node.
    fn set_overlays_hit_testable(&mut self, enabled: bool);

    /// Insert `child` into `parent` before `reference`, or append when
    /// `reference` is `None`. Moves the node if it is already attached.
    fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> DomResult<()>;

    /// Size of the viewport.
    fn viewport(&self) -> Size;

    /// Next element sibling.
    fn next_sibling(&self, el: ElementId) -> Option<ElementId> {
        let parent = self.parent(el)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&s| s == el)?;
        siblings.get(index + 1).copied()
    }

    /// Whether `el` is `ancestor` or one of its descendants.
    fn is_inclusive_descendant(&self, ancestor: ElementId, el: ElementId) -> bool {
        let mut current = Some(el);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }
}

/// Hit-test a point while overlays are transparent to the pointer.
///
/// Overlay nodes sit above the page; their pointer events are switched off
/// for the duration of the query so they cannot occlude the element beneath.
pub fn element_under_pointer<D: DomHost + ?Sized>(dom: &mut D, point: Point) -> Option<ElementId> {
    dom.set_overlays_hit_testable(false);
    let hit = dom.element_from_point(point);
    dom.set_overlays_hit_testable(true);

    let mut current = hit;
    while let Some(el) = current {
        if !dom.is_overlay(el) {
            return Some(el);
        }
        current = dom.parent(el);
    }
    None
}
