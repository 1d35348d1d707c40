//! Panel chrome view model.

use directedit_core::panel::PANEL_WIDTH;
use directedit_core::{
    DirectEditState, PanelPosition, PanelSection, RadiusKey, SectionState, SizingMode, SizingValue,
    SpacingKey, VerticalAlign, format_property_value,
};
use kurbo::{Rect, Size};

const HEADER_HEIGHT: f64 = 40.0;
const SECTION_HEADER_HEIGHT: f64 = 28.0;
const ROW_HEIGHT: f64 = 22.0;
const FOOTER_HEIGHT: f64 = 44.0;

/// One `label: value` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub label: String,
    pub value: String,
    /// Declaration a control on this row edits, if it is editable.
    pub property: Option<&'static str>,
}

impl PanelRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            property: None,
        }
    }

    pub fn editable(label: impl Into<String>, property: &'static str, value: impl Into<String>) -> Self {
        Self {
            property: Some(property),
            ..Self::new(label, value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSectionView {
    pub section: PanelSection,
    pub open: bool,
    pub rows: Vec<PanelRow>,
}

/// What the floating panel shows for the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub rect: Rect,
    /// Selector-like label of the selected element.
    pub title: String,
    pub sections: Vec<PanelSectionView>,
    /// Tailwind preview of the pending edits.
    pub tailwind: String,
    pub has_pending: bool,
}

fn sizing_text(value: &SizingValue) -> String {
    match value.mode {
        SizingMode::Fill => "fill".to_string(),
        SizingMode::Fit => "fit".to_string(),
        SizingMode::Fixed => format_property_value(&value.value),
    }
}

fn vertical_text(align: VerticalAlign) -> &'static str {
    match align {
        VerticalAlign::Top => "top",
        VerticalAlign::Center => "center",
        VerticalAlign::Bottom => "bottom",
    }
}

fn spacing_label(key: SpacingKey) -> &'static str {
    match key {
        SpacingKey::PaddingTop => "Padding top",
        SpacingKey::PaddingRight => "Padding right",
        SpacingKey::PaddingBottom => "Padding bottom",
        SpacingKey::PaddingLeft => "Padding left",
        SpacingKey::MarginTop => "Margin top",
        SpacingKey::MarginRight => "Margin right",
        SpacingKey::MarginBottom => "Margin bottom",
        SpacingKey::MarginLeft => "Margin left",
        SpacingKey::Gap => "Gap",
    }
}

fn radius_label(key: RadiusKey) -> &'static str {
    match key {
        RadiusKey::TopLeft => "Top left",
        RadiusKey::TopRight => "Top right",
        RadiusKey::BottomRight => "Bottom right",
        RadiusKey::BottomLeft => "Bottom left",
    }
}

fn section_rows(state: &DirectEditState, section: PanelSection) -> Option<Vec<PanelRow>> {
    let info = state.element_info.as_ref()?;
    let computed = &state.computed;
    let rows = match section {
        PanelSection::Layout => {
            let flex = &computed.flex;
            let mut rows = vec![PanelRow::editable("Display", "display", flex.display.as_css())];
            if info.is_flex_container {
                rows.push(PanelRow::editable(
                    "Direction",
                    "flex-direction",
                    flex.flex_direction.as_css(),
                ));
                rows.push(PanelRow::editable(
                    "Justify",
                    "justify-content",
                    flex.justify_content.as_css(),
                ));
                rows.push(PanelRow::editable("Align", "align-items", flex.align_items.as_css()));
                rows.push(PanelRow::editable("Wrap", "flex-wrap", flex.flex_wrap.as_css()));
            }
            rows
        }
        PanelSection::Sizing => vec![
            PanelRow::editable("Width", "width", sizing_text(&computed.sizing.width)),
            PanelRow::editable("Height", "height", sizing_text(&computed.sizing.height)),
        ],
        PanelSection::Spacing => SpacingKey::ALL
            .iter()
            .filter(|&&key| key != SpacingKey::Gap || info.is_flex_container)
            .map(|&key| {
                PanelRow::editable(
                    spacing_label(key),
                    key.css_name(),
                    format_property_value(computed.spacing.get(key)),
                )
            })
            .collect(),
        PanelSection::Radius => RadiusKey::ALL
            .iter()
            .map(|&key| {
                PanelRow::editable(
                    radius_label(key),
                    key.css_name(),
                    format_property_value(computed.border_radius.get(key)),
                )
            })
            .collect(),
        PanelSection::Typography => {
            // Text controls only make sense on text.
            if !info.is_text_element {
                return None;
            }
            let t = &computed.typography;
            vec![
                PanelRow::editable("Font", "font-family", t.font_family.clone()),
                PanelRow::editable("Weight", "font-weight", t.font_weight.clone()),
                PanelRow::editable("Size", "font-size", format_property_value(&t.font_size)),
                PanelRow::editable("Line height", "line-height", format_property_value(&t.line_height)),
                PanelRow::editable(
                    "Letter spacing",
                    "letter-spacing",
                    format_property_value(&t.letter_spacing),
                ),
                PanelRow::editable("Align", "text-align", t.text_align.as_css()),
                PanelRow::editable(
                    "Vertical",
                    "text-vertical-align",
                    vertical_text(t.text_vertical_align),
                ),
            ]
        }
        PanelSection::Colors => vec![
            PanelRow::editable("Background", "background-color", computed.colors.background_color.to_css()),
            PanelRow::editable("Text", "color", computed.colors.text_color.to_css()),
            PanelRow::editable("Border", "border-color", computed.colors.border_color.to_css()),
        ],
    };
    Some(rows)
}

impl PanelView {
    /// Panel for the current selection, or `None` when closed or empty.
    pub fn from_state(
        state: &DirectEditState,
        position: PanelPosition,
        sections: SectionState,
        viewport: Size,
    ) -> Option<Self> {
        if !state.is_open {
            return None;
        }
        let info = state.element_info.as_ref()?;

        let sections: Vec<PanelSectionView> = PanelSection::ALL
            .iter()
            .filter_map(|&section| {
                let rows = section_rows(state, section)?;
                Some(PanelSectionView {
                    section,
                    open: sections.is_open(section),
                    rows,
                })
            })
            .collect();

        let height = HEADER_HEIGHT
            + FOOTER_HEIGHT
            + sections
                .iter()
                .map(|s| SECTION_HEADER_HEIGHT + if s.open { s.rows.len() as f64 * ROW_HEIGHT } else { 0.0 })
                .sum::<f64>();
        let size = Size::new(PANEL_WIDTH, height.min(viewport.height));
        let origin = position.clamp_to(viewport, size).to_point();

        Some(Self {
            rect: Rect::from_origin_size(origin, size),
            title: info.label(),
            sections,
            tailwind: directedit_core::styles_to_tailwind(&state.pending_styles),
            has_pending: !state.pending_styles.is_empty(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use directedit_core::{CssValue, DirectEditConfig, DirectEditor, DomHost, MemoryDom};

    fn editor() -> DirectEditor<MemoryDom> {
        let mut dom = MemoryDom::new(Size::new(1280.0, 800.0));
        let root = dom.root();
        let card = dom.create_element(root, "div", Rect::new(0.0, 0.0, 200.0, 100.0));
        dom.set_id_attribute(card, "card");
        let mut editor = DirectEditor::new(dom, DirectEditConfig::default().enabled());
        editor.set_edit_mode(true);
        let card = editor.dom().children(root)[0];
        editor.select_element(card);
        editor
    }

    #[test]
    fn test_panel_view_sections() {
        let editor = editor();
        let view = PanelView::from_state(
            editor.state(),
            PanelPosition::new(16.0, 16.0),
            SectionState::default(),
            Size::new(1280.0, 800.0),
        )
        .unwrap();

        assert_eq!(view.title, "div#card");
        let kinds: Vec<_> = view.sections.iter().map(|s| s.section).collect();
        // A plain block has no typography section.
        assert_eq!(
            kinds,
            vec![
                PanelSection::Layout,
                PanelSection::Sizing,
                PanelSection::Spacing,
                PanelSection::Radius,
                PanelSection::Colors,
            ]
        );
        let sizing = &view.sections[1];
        assert_eq!(sizing.rows[0], PanelRow::editable("Width", "width", "fill"));
        assert!(!view.has_pending);
    }

    #[test]
    fn test_collapsed_section_and_pending_preview() {
        let mut editor = editor();
        editor.update_padding_all(CssValue::px(16.0)).unwrap();
        let mut sections = SectionState::default();
        sections.spacing = false;

        let open = PanelView::from_state(
            editor.state(),
            PanelPosition::new(0.0, 0.0),
            SectionState::default(),
            Size::new(1280.0, 800.0),
        )
        .unwrap();
        let collapsed = PanelView::from_state(
            editor.state(),
            PanelPosition::new(0.0, 0.0),
            sections,
            Size::new(1280.0, 800.0),
        )
        .unwrap();

        assert_eq!(collapsed.tailwind, "p-4");
        assert!(collapsed.has_pending);
        assert_eq!(open.rect.height() - collapsed.rect.height(), 8.0 * ROW_HEIGHT);
    }

    #[test]
    fn test_closed_panel_has_no_view() {
        let mut editor = editor();
        editor.close_panel();
        assert!(
            PanelView::from_state(
                editor.state(),
                PanelPosition::new(0.0, 0.0),
                SectionState::default(),
                Size::new(1280.0, 800.0),
            )
            .is_none()
        );
    }
}
