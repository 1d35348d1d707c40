//! Export summaries of pending edits.

use crate::inspector::ElementInfo;
use crate::properties::PendingStyles;
use crate::tailwind::styles_to_tailwind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Element identity plus the CSS diff and its Tailwind translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Selector-like label, `tag#id.class`.
    pub element: String,
    pub tag_name: String,
    pub id: Option<String>,
    pub class_list: Vec<String>,
    pub styles: PendingStyles,
    pub tailwind: String,
}

impl ExportSummary {
    pub fn new(info: &ElementInfo, styles: &PendingStyles) -> Self {
        Self {
            element: info.label(),
            tag_name: info.tag_name.clone(),
            id: info.id.clone(),
            class_list: info.class_list.clone(),
            styles: styles.clone(),
            tailwind: styles_to_tailwind(styles),
        }
    }

    /// Plain-text form written to the clipboard.
    pub fn to_text(&self) -> String {
        format!(
            "{}\n{}\n\nTailwind: {}",
            self.element,
            self.styles.to_css(),
            self.tailwind
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementId;

    fn info() -> ElementInfo {
        ElementInfo {
            element: ElementId::new(),
            tag_name: "div".to_string(),
            id: Some("hero".to_string()),
            class_list: vec!["card".to_string(), "shadow".to_string()],
            is_flex_container: false,
            is_flex_item: false,
            is_text_element: false,
            parent: None,
            child_count: 0,
        }
    }

    #[test]
    fn test_text_format() {
        let styles: PendingStyles = [("padding-top", "24px"), ("border-top-left-radius", "9999px")]
            .into_iter()
            .collect();
        let summary = ExportSummary::new(&info(), &styles);
        assert_eq!(
            summary.to_text(),
            "div#hero.card.shadow\npadding-top: 24px;\nborder-top-left-radius: 9999px;\n\nTailwind: pt-6 rounded-tl-full"
        );
    }

    #[test]
    fn test_json_format() {
        let styles: PendingStyles = [("padding-top", "24px")].into_iter().collect();
        let summary = ExportSummary::new(&info(), &styles);
        let value: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(value["element"], "div#hero.card.shadow");
        assert_eq!(value["styles"][0][0], "padding-top");
        assert_eq!(value["tailwind"], "pt-6");
    }
}
