//! In-memory DOM used for native runs and tests.
//!
//! Layout is not computed: every element carries an explicit border box.
//! Style resolution is a small cascade of inline declarations, then
//! stylesheet declarations, then inheritance and initial values.

use super::{DomError, DomHost, DomResult, ElementId};
use crate::css::format_number;
use kurbo::{Point, Rect, Size};
use std::collections::{BTreeMap, HashMap};

/// Properties whose value is inherited from the parent when undeclared.
const INHERITED_PROPERTIES: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "line-height",
    "letter-spacing",
    "text-align",
    "pointer-events",
];

/// Tags whose default `display` is `inline`.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "code", "em", "i", "img", "label", "small", "span", "strong", "sub", "sup",
];

fn initial_value(property: &str) -> &'static str {
    match property {
        "padding-top" | "padding-right" | "padding-bottom" | "padding-left" => "0px",
        "margin-top" | "margin-right" | "margin-bottom" | "margin-left" => "0px",
        "border-top-left-radius"
        | "border-top-right-radius"
        | "border-bottom-right-radius"
        | "border-bottom-left-radius" => "0px",
        "gap" => "normal",
        "flex-direction" => "row",
        "justify-content" => "normal",
        "align-items" => "normal",
        "flex-wrap" => "nowrap",
        "flex-grow" => "0",
        "font-family" => "Times New Roman",
        "font-size" => "16px",
        "font-weight" => "400",
        "line-height" => "normal",
        "letter-spacing" => "normal",
        "text-align" => "start",
        "color" => "rgb(0, 0, 0)",
        "background-color" => "rgba(0, 0, 0, 0)",
        "pointer-events" => "auto",
        "opacity" => "1",
        _ => "",
    }
}

fn default_display(tag: &str) -> &'static str {
    if INLINE_TAGS.contains(&tag) {
        "inline"
    } else if tag == "button" {
        "inline-block"
    } else if tag == "li" {
        "list-item"
    } else {
        "block"
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    tag: String,
    id_attr: Option<String>,
    classes: Vec<String>,
    /// Text directly inside this element.
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    /// Declarations from stylesheets.
    declared: BTreeMap<String, String>,
    /// Declarations from the `style` attribute.
    inline: BTreeMap<String, String>,
    rect: Rect,
    overlay: bool,
}

impl MemoryNode {
    fn new(tag: &str, rect: Rect) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id_attr: None,
            classes: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            declared: BTreeMap::new(),
            inline: BTreeMap::new(),
            rect,
            overlay: false,
        }
    }
}

/// A document held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: HashMap<ElementId, MemoryNode>,
    root: ElementId,
    viewport: Size,
    overlays_hit_testable: bool,
}

impl MemoryDom {
    /// Create a document whose `<body>` fills the viewport.
    pub fn new(viewport: Size) -> Self {
        let root = ElementId::new();
        let mut nodes = HashMap::new();
        nodes.insert(root, MemoryNode::new("body", viewport.to_rect()));
        Self {
            nodes,
            root,
            viewport,
            overlays_hit_testable: true,
        }
    }

    /// The `<body>` element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Create an element and append it to `parent`.
    pub fn create_element(&mut self, parent: ElementId, tag: &str, rect: Rect) -> ElementId {
        let id = ElementId::new();
        let mut node = MemoryNode::new(tag, rect);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
            node.parent = Some(parent);
        }
        self.nodes.insert(id, node);
        id
    }

    /// Create an overlay node on top of the page.
    pub fn create_overlay(&mut self, rect: Rect) -> ElementId {
        let id = self.create_element(self.root, "div", rect);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.overlay = true;
        }
        id
    }

    pub fn set_id_attribute(&mut self, el: ElementId, id: &str) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.id_attr = Some(id.to_string());
        }
    }

    pub fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.classes.push(class.to_string());
        }
    }

    pub fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.text = text.to_string();
        }
    }

    /// Declare a property as if it came from a stylesheet rule.
    pub fn set_style(&mut self, el: ElementId, property: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.declared.insert(property.to_string(), value.to_string());
        }
    }

    pub fn set_rect(&mut self, el: ElementId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.rect = rect;
        }
    }

    /// Remove an element and its subtree from the document.
    pub fn remove_element(&mut self, el: ElementId) {
        if el == self.root {
            return;
        }
        let Some(node) = self.nodes.remove(&el) else {
            return;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != el);
        }
        let mut stack = node.children;
        while let Some(child) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                stack.extend(removed.children);
            }
        }
    }

    /// Shift every element by `delta`, as scrolling the page would.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        for (id, node) in self.nodes.iter_mut() {
            if *id != self.root && !node.overlay {
                node.rect = node.rect + kurbo::Vec2::new(-dx, -dy);
            }
        }
    }

    /// Position of the element among its parent's children.
    pub fn child_index(&self, el: ElementId) -> Option<usize> {
        let parent = self.nodes.get(&el)?.parent?;
        self.nodes
            .get(&parent)?
            .children
            .iter()
            .position(|&c| c == el)
    }

    /// Inline declarations of an element.
    pub fn inline_styles(&self, el: ElementId) -> BTreeMap<String, String> {
        self.nodes
            .get(&el)
            .map(|n| n.inline.clone())
            .unwrap_or_default()
    }

    /// First element whose `id` attribute matches.
    pub fn find_by_id(&self, id: &str) -> Option<ElementId> {
        self.preorder()
            .into_iter()
            .find(|el| self.nodes[el].id_attr.as_deref() == Some(id))
    }

    /// All elements in document order, root first.
    pub fn preorder(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(el) = stack.pop() {
            out.push(el);
            if let Some(node) = self.nodes.get(&el) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn resolve(&self, el: ElementId, property: &str) -> String {
        let Some(node) = self.nodes.get(&el) else {
            return String::new();
        };
        if let Some(value) = node.inline.get(property).or_else(|| node.declared.get(property)) {
            if value != "inherit" {
                return value.clone();
            }
            if let Some(parent) = node.parent {
                return self.resolve(parent, property);
            }
        }
        if INHERITED_PROPERTIES.contains(&property) {
            if let Some(parent) = node.parent {
                return self.resolve(parent, property);
            }
        }
        match property {
            "display" => default_display(&node.tag).to_string(),
            "width" => format!("{}px", format_number(node.rect.width())),
            "height" => format!("{}px", format_number(node.rect.height())),
            "border-color" => self.resolve(el, "color"),
            other => initial_value(other).to_string(),
        }
    }
}

impl DomHost for MemoryDom {
    fn contains(&self, el: ElementId) -> bool {
        self.nodes.contains_key(&el)
    }

    fn tag_name(&self, el: ElementId) -> String {
        self.nodes.get(&el).map(|n| n.tag.clone()).unwrap_or_default()
    }

    fn element_id(&self, el: ElementId) -> Option<String> {
        self.nodes.get(&el).and_then(|n| n.id_attr.clone())
    }

    fn class_list(&self, el: ElementId) -> Vec<String> {
        self.nodes
            .get(&el)
            .map(|n| n.classes.clone())
            .unwrap_or_default()
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.nodes.get(&el).and_then(|n| n.parent)
    }

    fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.nodes
            .get(&el)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn text_content(&self, el: ElementId) -> String {
        let Some(node) = self.nodes.get(&el) else {
            return String::new();
        };
        let mut text = node.text.clone();
        for child in &node.children {
            text.push_str(&self.text_content(*child));
        }
        text
    }

    fn computed_style(&self, el: ElementId, property: &str) -> String {
        self.resolve(el, property)
    }

    fn inline_style(&self, el: ElementId, property: &str) -> Option<String> {
        self.nodes
            .get(&el)
            .and_then(|n| n.inline.get(property).cloned())
    }

    fn set_inline_style(&mut self, el: ElementId, property: &str, value: &str) -> DomResult<()> {
        let node = self
            .nodes
            .get_mut(&el)
            .ok_or(DomError::UnknownElement(el))?;
        node.inline.insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn remove_inline_style(&mut self, el: ElementId, property: &str) -> DomResult<()> {
        let node = self
            .nodes
            .get_mut(&el)
            .ok_or(DomError::UnknownElement(el))?;
        node.inline.remove(property);
        Ok(())
    }

    fn bounding_rect(&self, el: ElementId) -> Rect {
        self.nodes.get(&el).map(|n| n.rect).unwrap_or(Rect::ZERO)
    }

    fn elements_from_point(&self, point: Point) -> Vec<ElementId> {
        let mut hits: Vec<ElementId> = self
            .preorder()
            .into_iter()
            .filter(|el| {
                let node = &self.nodes[el];
                if node.overlay && !self.overlays_hit_testable {
                    return false;
                }
                node.rect.contains(point) && self.resolve(*el, "pointer-events") != "none"
            })
            .collect();
        // Later in document order paints on top.
        hits.reverse();
        hits
    }

    fn is_overlay(&self, el: ElementId) -> bool {
        self.nodes.get(&el).is_some_and(|n| n.overlay)
    }

    fn set_overlays_hit_testable(&mut self, enabled: bool) {
        self.overlays_hit_testable = enabled;
    }

    fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> DomResult<()> {
        if !self.nodes.contains_key(&parent) {
            return Err(DomError::UnknownElement(parent));
        }
        if !self.nodes.contains_key(&child) {
            return Err(DomError::UnknownElement(child));
        }
        if self.is_inclusive_descendant(child, parent) {
            return Err(DomError::HierarchyRequest { child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) || reference == child {
                return Err(DomError::NotAChild(reference));
            }
        }

        if let Some(old_parent) = self.nodes[&child].parent {
            if let Some(node) = self.nodes.get_mut(&old_parent) {
                node.children.retain(|&c| c != child);
            }
        }

        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(DomError::UnknownElement(parent))?;
        let index = reference
            .and_then(|r| parent_node.children.iter().position(|&c| c == r))
            .unwrap_or(parent_node.children.len());
        parent_node.children.insert(index, child);

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom_with_row() -> (MemoryDom, ElementId, ElementId, ElementId) {
        let mut dom = MemoryDom::new(Size::new(800.0, 600.0));
        let row = dom.create_element(dom.root(), "div", Rect::new(0.0, 0.0, 400.0, 100.0));
        dom.set_style(row, "display", "flex");
        let a = dom.create_element(row, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = dom.create_element(row, "div", Rect::new(100.0, 0.0, 200.0, 100.0));
        (dom, row, a, b)
    }

    #[test]
    fn test_cascade_order() {
        let (mut dom, row, a, _) = dom_with_row();
        assert_eq!(dom.computed_style(a, "padding-top"), "0px");
        dom.set_style(a, "padding-top", "16px");
        assert_eq!(dom.computed_style(a, "padding-top"), "16px");
        dom.set_inline_style(a, "padding-top", "24px").unwrap();
        assert_eq!(dom.computed_style(a, "padding-top"), "24px");
        dom.remove_inline_style(a, "padding-top").unwrap();
        assert_eq!(dom.computed_style(a, "padding-top"), "16px");
        assert_eq!(dom.computed_style(row, "display"), "flex");
    }

    #[test]
    fn test_inherited_properties() {
        let (mut dom, row, a, _) = dom_with_row();
        dom.set_style(row, "color", "rgb(255, 0, 0)");
        assert_eq!(dom.computed_style(a, "color"), "rgb(255, 0, 0)");
        assert_eq!(dom.computed_style(a, "border-color"), "rgb(255, 0, 0)");
        assert_eq!(dom.computed_style(a, "padding-left"), "0px");
    }

    #[test]
    fn test_width_resolves_to_rect() {
        let (dom, _, a, _) = dom_with_row();
        assert_eq!(dom.computed_style(a, "width"), "100px");
    }

    #[test]
    fn test_elements_from_point_topmost_first() {
        let (dom, row, a, _) = dom_with_row();
        let hits = dom.elements_from_point(Point::new(50.0, 50.0));
        assert_eq!(hits[0], a);
        assert_eq!(hits[1], row);
        assert_eq!(hits[2], dom.root());
    }

    #[test]
    fn test_overlays_can_be_made_transparent() {
        let (mut dom, _, a, _) = dom_with_row();
        let overlay = dom.create_overlay(Rect::new(0.0, 0.0, 800.0, 600.0));
        assert_eq!(dom.element_from_point(Point::new(50.0, 50.0)), Some(overlay));
        assert_eq!(super::super::element_under_pointer(&mut dom, Point::new(50.0, 50.0)), Some(a));
        // Hit testing is restored afterwards.
        assert_eq!(dom.element_from_point(Point::new(50.0, 50.0)), Some(overlay));
    }

    #[test]
    fn test_insert_before_moves_node() {
        let (mut dom, row, a, b) = dom_with_row();
        dom.insert_before(row, b, Some(a)).unwrap();
        assert_eq!(dom.children(row), vec![b, a]);
        dom.insert_before(row, b, None).unwrap();
        assert_eq!(dom.children(row), vec![a, b]);
        assert_eq!(dom.next_sibling(a), Some(b));
    }

    #[test]
    fn test_insert_into_own_subtree_fails() {
        let (mut dom, row, a, _) = dom_with_row();
        let result = dom.insert_before(a, row, None);
        assert!(matches!(result, Err(DomError::HierarchyRequest { .. })));
    }

    #[test]
    fn test_text_content_and_find_by_id() {
        let (mut dom, _, a, b) = dom_with_row();
        dom.set_text(a, "Hello");
        dom.set_id_attribute(b, "cta");
        assert_eq!(dom.text_content(a), "Hello");
        assert_eq!(dom.find_by_id("cta"), Some(b));
    }
}
