//! Serializable page fixtures for building a [`MemoryDom`].

use super::{DomError, DomHost, DomResult, ElementId, MemoryDom};
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_viewport() -> [f64; 2] {
    [1280.0, 800.0]
}

/// A whole page: viewport size and the `<body>` subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default = "default_viewport")]
    pub viewport: [f64; 2],
    pub body: NodeFixture,
}

/// One element and its subtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeFixture {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub text: String,
    /// Border box as `[x, y, width, height]`.
    #[serde(default)]
    pub rect: [f64; 4],
    /// Stylesheet declarations.
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    /// Inline `style` attribute declarations.
    #[serde(default)]
    pub inline: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<NodeFixture>,
}

impl NodeFixture {
    fn rect(&self) -> Rect {
        let [x, y, w, h] = self.rect;
        Rect::new(x, y, x + w, y + h)
    }

    fn apply(&self, dom: &mut MemoryDom, el: ElementId) -> DomResult<()> {
        if let Some(id) = &self.id {
            dom.set_id_attribute(el, id);
        }
        for class in &self.classes {
            dom.add_class(el, class);
        }
        if !self.text.is_empty() {
            dom.set_text(el, &self.text);
        }
        for (property, value) in &self.style {
            dom.set_style(el, property, value);
        }
        for (property, value) in &self.inline {
            dom.set_inline_style(el, property, value)?;
        }
        for child in &self.children {
            let child_el = dom.create_element(el, &child.tag, child.rect());
            child.apply(dom, child_el)?;
        }
        Ok(())
    }
}

impl MemoryDom {
    /// Build a document from a fixture.
    pub fn from_fixture(fixture: &PageFixture) -> DomResult<Self> {
        let [width, height] = fixture.viewport;
        let mut dom = MemoryDom::new(Size::new(width, height));
        let root = dom.root();
        if fixture.body.rect != [0.0; 4] {
            dom.set_rect(root, fixture.body.rect());
        }
        fixture.body.apply(&mut dom, root)?;
        Ok(dom)
    }

    /// Build a document from a JSON fixture.
    pub fn from_json(json: &str) -> DomResult<Self> {
        let fixture: PageFixture =
            serde_json::from_str(json).map_err(|e| DomError::Fixture(e.to_string()))?;
        Self::from_fixture(&fixture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{
        "viewport": [1024, 768],
        "body": {
            "tag": "body",
            "children": [
                {
                    "tag": "nav",
                    "id": "nav",
                    "classes": ["flex", "gap-4"],
                    "rect": [0, 0, 1024, 64],
                    "style": { "display": "flex" },
                    "children": [
                        { "tag": "a", "id": "home", "text": "Home", "rect": [16, 16, 60, 32] },
                        { "tag": "a", "id": "work", "text": "Work", "rect": [92, 16, 60, 32],
                          "inline": { "color": "red" } }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_from_json() {
        let dom = MemoryDom::from_json(PAGE).unwrap();
        assert_eq!(dom.viewport(), Size::new(1024.0, 768.0));

        let nav = dom.find_by_id("nav").unwrap();
        assert_eq!(dom.class_list(nav), vec!["flex", "gap-4"]);
        assert_eq!(dom.children(nav).len(), 2);
        assert_eq!(dom.computed_style(nav, "display"), "flex");

        let work = dom.find_by_id("work").unwrap();
        assert_eq!(dom.inline_style(work, "color").as_deref(), Some("red"));
        assert_eq!(dom.bounding_rect(work), Rect::new(92.0, 16.0, 152.0, 48.0));
        assert_eq!(dom.text_content(nav), "HomeWork");
    }

    #[test]
    fn test_malformed_fixture() {
        let result = MemoryDom::from_json("{ not json");
        assert!(matches!(result, Err(DomError::Fixture(_))));
    }
}
