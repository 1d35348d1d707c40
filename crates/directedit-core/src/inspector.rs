//! Element inspection: structural metadata and computed style bundles.

use crate::css::{CssUnit, CssValue, parse_color_value, parse_property_value};
use crate::dom::{DomHost, ElementId};
use crate::properties::{
    AlignItems, BorderRadiusProperties, ColorKey, ColorProperties, Display, EDITABLE_PROPERTIES,
    FlexDirection, FlexProperties, FlexWrap, JustifyContent, OriginalStyles, RadiusKey, SizingKey,
    SizingProperties, SizingValue, SpacingKey, SpacingProperties, TextAlign, TypographyProperties,
    VerticalAlign,
};
use serde::{Deserialize, Serialize};

/// Tags treated as text regardless of their content.
const TEXT_TAGS: &[&str] = &[
    "p", "span", "h1", "h2", "h3", "h4", "h5", "h6", "a", "label", "strong", "em", "b", "i",
    "small", "code", "li", "button", "blockquote",
];

/// Structural snapshot of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub element: ElementId,
    pub tag_name: String,
    pub id: Option<String>,
    pub class_list: Vec<String>,
    pub is_flex_container: bool,
    pub is_flex_item: bool,
    pub is_text_element: bool,
    pub parent: Option<ElementId>,
    pub child_count: usize,
}

impl ElementInfo {
    /// Selector-like label: `tag#id.class1.class2`.
    pub fn label(&self) -> String {
        let mut label = self.tag_name.clone();
        if let Some(id) = &self.id {
            label.push('#');
            label.push_str(id);
        }
        for class in &self.class_list {
            label.push('.');
            label.push_str(class);
        }
        label
    }
}

/// All computed style bundles of an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyles {
    pub spacing: SpacingProperties,
    pub border_radius: BorderRadiusProperties,
    pub flex: FlexProperties,
    pub sizing: SizingProperties,
    pub typography: TypographyProperties,
    pub colors: ColorProperties,
}

fn is_flex_display(display: &str) -> bool {
    matches!(display.trim(), "flex" | "inline-flex")
}

/// Extract structural metadata from an element.
pub fn get_element_info<D: DomHost + ?Sized>(dom: &D, el: ElementId) -> ElementInfo {
    let tag_name = dom.tag_name(el);
    let parent = dom.parent(el);
    let children = dom.children(el);

    let is_flex_container = is_flex_display(&dom.computed_style(el, "display"));
    let is_flex_item = parent.is_some_and(|p| is_flex_display(&dom.computed_style(p, "display")));
    let is_text_element = TEXT_TAGS.contains(&tag_name.as_str())
        || (children.is_empty() && !dom.text_content(el).trim().is_empty());

    ElementInfo {
        element: el,
        tag_name,
        id: dom.element_id(el),
        class_list: dom.class_list(el),
        is_flex_container,
        is_flex_item,
        is_text_element,
        parent,
        child_count: children.len(),
    }
}

/// Everything sizing inference looks at for one axis.
#[derive(Debug, Clone, Copy)]
pub struct SizingInputs<'a> {
    /// Inline style value for the axis, if any.
    pub inline: Option<&'a str>,
    /// Computed value for the axis.
    pub computed: &'a str,
    /// Computed `display` of the element.
    pub display: &'a str,
    pub parent_is_flex: bool,
    pub flex_grow: f64,
    /// Rendered size along the axis from the bounding box.
    pub rendered: f64,
}

/// Infer how an element is sized along one axis.
///
/// This is a best-effort classification over computed style; rules are
/// checked in priority order and the first match wins.
pub fn detect_sizing_mode(axis: SizingKey, inputs: &SizingInputs<'_>) -> SizingValue {
    let inline = inputs.inline.map(str::trim).filter(|v| !v.is_empty());

    match inline {
        Some("100%") => return SizingValue::fill(),
        Some("auto") | Some("fit-content") => return SizingValue::fit(),
        _ => {}
    }

    match inputs.computed.trim() {
        "100%" => return SizingValue::fill(),
        "auto" | "fit-content" | "max-content" => return SizingValue::fit(),
        _ => {}
    }

    if inputs.parent_is_flex && inputs.flex_grow != 0.0 {
        return SizingValue::fill();
    }

    if inline.is_none() {
        match axis {
            SizingKey::Width => match inputs.display.trim() {
                "block" => return SizingValue::fill(),
                "inline-block" | "inline-flex" | "inline" => return SizingValue::fit(),
                _ => {}
            },
            SizingKey::Height => return SizingValue::fit(),
        }
    }

    SizingValue::fixed(CssValue::px(inputs.rendered.round()))
}

fn sizing_for<D: DomHost + ?Sized>(dom: &D, el: ElementId, axis: SizingKey) -> SizingValue {
    let property = axis.css_name();
    let inline = dom.inline_style(el, property);
    let computed = dom.computed_style(el, property);
    let display = dom.computed_style(el, "display");
    let parent_is_flex = dom
        .parent(el)
        .is_some_and(|p| is_flex_display(&dom.computed_style(p, "display")));
    let flex_grow = dom
        .computed_style(el, "flex-grow")
        .trim()
        .parse::<f64>()
        .unwrap_or(0.0);
    let rect = dom.bounding_rect(el);
    let rendered = match axis {
        SizingKey::Width => rect.width(),
        SizingKey::Height => rect.height(),
    };

    detect_sizing_mode(
        axis,
        &SizingInputs {
            inline: inline.as_deref(),
            computed: &computed,
            display: &display,
            parent_is_flex,
            flex_grow,
            rendered,
        },
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn extract_typography<D: DomHost + ?Sized>(dom: &D, el: ElementId) -> TypographyProperties {
    let font_size = parse_property_value(&dom.computed_style(el, "font-size"));
    let size_px = if font_size.unit == CssUnit::Px && font_size.numeric_value > 0.0 {
        font_size.numeric_value
    } else {
        16.0
    };

    let line_height_raw = dom.computed_style(el, "line-height");
    let line_height = match line_height_raw.trim() {
        "normal" | "" => CssValue::px((size_px * 1.2).round()),
        raw if raw.ends_with(|c: char| c.is_ascii_digit()) => {
            // Unitless multiplier.
            let factor = parse_property_value(raw).numeric_value;
            CssValue::px((factor * size_px).round())
        }
        raw => parse_property_value(raw),
    };

    let letter_spacing_raw = dom.computed_style(el, "letter-spacing");
    let letter_spacing = match letter_spacing_raw.trim() {
        "normal" | "" => CssValue::new(0.0, CssUnit::Em),
        raw => {
            let parsed = parse_property_value(raw);
            if parsed.unit == CssUnit::Px {
                CssValue::new(round2(parsed.numeric_value / size_px), CssUnit::Em)
            } else {
                parsed
            }
        }
    };

    let family = dom.computed_style(el, "font-family");
    let font_family = family
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .to_string();

    let display = dom.computed_style(el, "display");
    let text_vertical_align = if is_flex_display(&display) {
        VerticalAlign::from_align_items(AlignItems::parse(&dom.computed_style(el, "align-items")))
    } else {
        VerticalAlign::Top
    };

    TypographyProperties {
        font_family,
        font_weight: dom.computed_style(el, "font-weight").trim().to_string(),
        font_size,
        line_height,
        letter_spacing,
        text_align: TextAlign::parse(&dom.computed_style(el, "text-align")),
        text_vertical_align,
    }
}

/// Derive every computed style bundle for an element.
pub fn get_computed_styles<D: DomHost + ?Sized>(dom: &D, el: ElementId) -> ComputedStyles {
    let mut spacing = SpacingProperties::default();
    for key in SpacingKey::ALL {
        let raw = dom.computed_style(el, key.css_name());
        // `gap: normal` on non-flex boxes means no gap.
        let value = if raw.trim() == "normal" {
            CssValue::px(0.0)
        } else {
            parse_property_value(&raw)
        };
        spacing.set(key, value);
    }

    let mut border_radius = BorderRadiusProperties::default();
    for key in RadiusKey::ALL {
        border_radius.set(key, parse_property_value(&dom.computed_style(el, key.css_name())));
    }

    let flex = FlexProperties {
        display: Display::parse(&dom.computed_style(el, "display")),
        flex_direction: FlexDirection::parse(&dom.computed_style(el, "flex-direction")),
        justify_content: JustifyContent::parse(&dom.computed_style(el, "justify-content")),
        align_items: AlignItems::parse(&dom.computed_style(el, "align-items")),
        flex_wrap: FlexWrap::parse(&dom.computed_style(el, "flex-wrap")),
    };

    let sizing = SizingProperties {
        width: sizing_for(dom, el, SizingKey::Width),
        height: sizing_for(dom, el, SizingKey::Height),
    };

    let mut colors = ColorProperties::default();
    for key in ColorKey::ALL {
        colors.set(key, parse_color_value(&dom.computed_style(el, key.css_name())));
    }

    ComputedStyles {
        spacing,
        border_radius,
        flex,
        sizing,
        typography: extract_typography(dom, el),
        colors,
    }
}

/// Snapshot the inline values of every property the editor may touch.
pub fn capture_original_styles<D: DomHost + ?Sized>(dom: &D, el: ElementId) -> OriginalStyles {
    EDITABLE_PROPERTIES
        .iter()
        .filter_map(|&property| {
            dom.inline_style(el, property)
                .map(|value| (property.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;
    use crate::properties::SizingMode;
    use kurbo::{Rect, Size};

    fn inputs<'a>(inline: Option<&'a str>, computed: &'a str, display: &'a str) -> SizingInputs<'a> {
        SizingInputs {
            inline,
            computed,
            display,
            parent_is_flex: false,
            flex_grow: 0.0,
            rendered: 120.4,
        }
    }

    #[test]
    fn test_sizing_fixture_table() {
        let cases: &[(SizingKey, SizingInputs<'_>, SizingMode)] = &[
            (SizingKey::Width, inputs(Some("100%"), "640px", "block"), SizingMode::Fill),
            (SizingKey::Width, inputs(Some("auto"), "640px", "block"), SizingMode::Fit),
            (SizingKey::Width, inputs(Some("fit-content"), "80px", "block"), SizingMode::Fit),
            (SizingKey::Width, inputs(None, "100%", "block"), SizingMode::Fill),
            (SizingKey::Width, inputs(None, "max-content", "block"), SizingMode::Fit),
            (SizingKey::Width, inputs(None, "640px", "block"), SizingMode::Fill),
            (SizingKey::Width, inputs(None, "80px", "inline-block"), SizingMode::Fit),
            (SizingKey::Width, inputs(None, "80px", "inline-flex"), SizingMode::Fit),
            (SizingKey::Width, inputs(None, "80px", "flex"), SizingMode::Fixed),
            (SizingKey::Width, inputs(Some("120px"), "120px", "block"), SizingMode::Fixed),
            (SizingKey::Height, inputs(None, "48px", "block"), SizingMode::Fit),
            (SizingKey::Height, inputs(Some("48px"), "48px", "block"), SizingMode::Fixed),
            (SizingKey::Height, inputs(Some("100%"), "48px", "block"), SizingMode::Fill),
        ];
        for (axis, input, expected) in cases {
            assert_eq!(
                detect_sizing_mode(*axis, input).mode,
                *expected,
                "{:?} {:?}",
                axis,
                input
            );
        }
    }

    #[test]
    fn test_flex_grow_fills() {
        let mut input = inputs(Some("120px"), "120px", "block");
        input.parent_is_flex = true;
        input.flex_grow = 1.0;
        assert_eq!(detect_sizing_mode(SizingKey::Width, &input).mode, SizingMode::Fill);
    }

    #[test]
    fn test_fixed_uses_rendered_size() {
        let value = detect_sizing_mode(SizingKey::Width, &inputs(Some("120px"), "999px", "block"));
        assert_eq!(value.mode, SizingMode::Fixed);
        assert_eq!(value.value.raw, "120px");
    }

    fn page() -> (MemoryDom, ElementId, ElementId) {
        let mut dom = MemoryDom::new(Size::new(800.0, 600.0));
        let row = dom.create_element(dom.root(), "div", Rect::new(0.0, 0.0, 400.0, 100.0));
        dom.set_style(row, "display", "flex");
        let label = dom.create_element(row, "span", Rect::new(0.0, 0.0, 80.0, 20.0));
        dom.set_text(label, "Hello");
        dom.add_class(label, "title");
        dom.set_id_attribute(label, "greeting");
        (dom, row, label)
    }

    #[test]
    fn test_element_info_flags() {
        let (dom, row, label) = page();
        let row_info = get_element_info(&dom, row);
        assert!(row_info.is_flex_container);
        assert!(!row_info.is_flex_item);
        assert!(!row_info.is_text_element);
        assert_eq!(row_info.child_count, 1);

        let info = get_element_info(&dom, label);
        assert!(info.is_flex_item);
        assert!(info.is_text_element);
        assert_eq!(info.parent, Some(row));
        assert_eq!(info.label(), "span#greeting.title");
    }

    #[test]
    fn test_leaf_div_with_text_is_text_element() {
        let mut dom = MemoryDom::new(Size::new(800.0, 600.0));
        let div = dom.create_element(dom.root(), "div", Rect::new(0.0, 0.0, 100.0, 20.0));
        dom.set_text(div, "  ");
        assert!(!get_element_info(&dom, div).is_text_element);
        dom.set_text(div, "Copy");
        assert!(get_element_info(&dom, div).is_text_element);
    }

    #[test]
    fn test_typography_normalization() {
        let (mut dom, _, label) = page();
        dom.set_style(label, "font-size", "20px");
        dom.set_style(label, "letter-spacing", "1px");
        dom.set_style(label, "font-family", "\"Inter\", sans-serif");

        let typography = get_computed_styles(&dom, label).typography;
        assert_eq!(typography.font_family, "Inter");
        assert_eq!(typography.line_height.raw, "24px");
        assert_eq!(typography.letter_spacing.raw, "0.05em");
        assert_eq!(typography.font_weight, "400");
    }

    #[test]
    fn test_letter_spacing_normal_is_zero_em() {
        let (dom, _, label) = page();
        let typography = get_computed_styles(&dom, label).typography;
        assert_eq!(typography.letter_spacing.raw, "0em");
        assert_eq!(typography.line_height.raw, "19px");
    }

    #[test]
    fn test_unitless_line_height() {
        let (mut dom, _, label) = page();
        dom.set_style(label, "line-height", "1.5");
        let typography = get_computed_styles(&dom, label).typography;
        assert_eq!(typography.line_height.raw, "24px");
    }

    #[test]
    fn test_colors_and_spacing() {
        let (mut dom, row, _) = page();
        dom.set_style(row, "background-color", "rgba(16, 185, 129, 0.5)");
        dom.set_style(row, "padding-top", "16px");
        let styles = get_computed_styles(&dom, row);
        assert_eq!(styles.colors.background_color.hex, "#10b981");
        assert_eq!(styles.colors.background_color.alpha, 50);
        assert_eq!(styles.spacing.padding_top.raw, "16px");
        assert_eq!(styles.spacing.gap.raw, "0px");
        assert!(styles.flex.display.is_flex());
    }

    #[test]
    fn test_vertical_align_from_flex() {
        let (mut dom, row, _) = page();
        dom.set_style(row, "align-items", "center");
        let styles = get_computed_styles(&dom, row);
        assert_eq!(styles.typography.text_vertical_align, VerticalAlign::Center);
    }

    #[test]
    fn test_capture_original_styles() {
        let (mut dom, row, _) = page();
        dom.set_inline_style(row, "padding-top", "4px").unwrap();
        dom.set_inline_style(row, "transform", "scale(2)").unwrap();
        let original = capture_original_styles(&dom, row);
        assert_eq!(original.len(), 1);
        assert_eq!(original.get("padding-top").map(String::as_str), Some("4px"));
    }
}
