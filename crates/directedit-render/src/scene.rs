//! Builds the overlay scene for one frame from editor state and page geometry.

use crate::overlay::{OverlayKind, OverlayPrimitive, OverlayScene, Stroke};
use crate::panel::PanelView;
use crate::renderer::{OverlayStyle, RenderContext};
use directedit_core::{DirectEditor, DomHost, ElementId, SizingMode};
use kurbo::{Point, Rect, Size};
use peniko::Color;

const LABEL_CHAR_WIDTH: f64 = 7.0;
const LABEL_PADDING: f64 = 8.0;
const LABEL_HEIGHT: f64 = 18.0;
const LABEL_GAP: f64 = 4.0;

fn label_size(text: &str) -> Size {
    Size::new(
        text.chars().count() as f64 * LABEL_CHAR_WIDTH + LABEL_PADDING,
        LABEL_HEIGHT,
    )
}

/// `tag.class1.class2` of the hovered element.
fn hover_text<D: DomHost>(dom: &D, el: ElementId) -> String {
    let mut text = dom.tag_name(el);
    for class in dom.class_list(el) {
        text.push('.');
        text.push_str(&class);
    }
    text
}

/// `W × H`, with `Fit` after each fit-content axis.
fn dimension_text<D: DomHost>(editor: &DirectEditor<D>, rect: Rect) -> String {
    let sizing = &editor.state().computed.sizing;
    let axis = |value: f64, mode: SizingMode| {
        let rounded = value.round() as i64;
        if mode == SizingMode::Fit {
            format!("{} Fit", rounded)
        } else {
            rounded.to_string()
        }
    };
    format!(
        "{} × {}",
        axis(rect.width(), sizing.width.mode),
        axis(rect.height(), sizing.height.mode)
    )
}

fn label(text: String, rect: Rect, background: Color, style: &OverlayStyle) -> OverlayPrimitive {
    OverlayPrimitive::Label {
        rect,
        text,
        background,
        foreground: style.label_text,
    }
}

fn push_hover<D: DomHost>(scene: &mut OverlayScene, editor: &DirectEditor<D>, style: &OverlayStyle) {
    let state = editor.state();
    let Some(hovered) = state.hovered_element else {
        return;
    };
    if Some(hovered) == state.selected_element || editor.is_dragging() {
        return;
    }
    let dom = editor.dom();
    if !dom.contains(hovered) {
        return;
    }
    let rect = dom.bounding_rect(hovered);
    scene.push(
        OverlayKind::Hover,
        OverlayPrimitive::Box {
            rect,
            stroke: Some(Stroke::solid(style.hover, style.hover_width)),
            fill: None,
        },
    );

    let text = hover_text(dom, hovered);
    let size = label_size(&text);
    // Above the element, or tucked inside when that would leave the viewport.
    let y = if rect.y0 - LABEL_GAP - size.height >= 0.0 {
        rect.y0 - LABEL_GAP - size.height
    } else {
        rect.y0 + LABEL_GAP
    };
    let label_rect = Rect::from_origin_size(Point::new(rect.x0, y), size);
    scene.push(OverlayKind::Hover, label(text, label_rect, style.hover, style));
}

fn push_selection<D: DomHost>(scene: &mut OverlayScene, editor: &DirectEditor<D>, style: &OverlayStyle) {
    let Some(selected) = editor.state().selected_element else {
        return;
    };
    let dom = editor.dom();
    if !dom.contains(selected) {
        return;
    }
    let rect = dom.bounding_rect(selected);
    scene.push(
        OverlayKind::Selection,
        OverlayPrimitive::Box {
            rect,
            stroke: Some(Stroke::solid(style.selection, style.selection_width)),
            fill: None,
        },
    );

    let text = dimension_text(editor, rect);
    let size = label_size(&text);
    let origin = Point::new(rect.center().x - size.width / 2.0, rect.y1 + LABEL_GAP);
    scene.push(
        OverlayKind::Selection,
        label(text, Rect::from_origin_size(origin, size), style.selection, style),
    );

    let is_flex = editor
        .state()
        .element_info
        .as_ref()
        .is_some_and(|info| info.is_flex_container);
    if is_flex {
        for child in dom.children(selected) {
            scene.push(
                OverlayKind::FlexChildren,
                OverlayPrimitive::Box {
                    rect: dom.bounding_rect(child),
                    stroke: Some(Stroke::dashed(style.flex_children, 1.0)),
                    fill: None,
                },
            );
        }
    }
}

fn push_measurement<D: DomHost>(scene: &mut OverlayScene, editor: &DirectEditor<D>, style: &OverlayStyle) {
    if !editor.is_measuring() {
        return;
    }
    if let Some(target) = editor.measurement_target() {
        scene.push(
            OverlayKind::Measurement,
            OverlayPrimitive::Box {
                rect: editor.dom().bounding_rect(target),
                stroke: Some(Stroke::solid(style.measurement, 1.0)),
                fill: None,
            },
        );
    }
    for line in editor.measurement_lines() {
        scene.push(
            OverlayKind::Measurement,
            OverlayPrimitive::Line {
                from: line.start(),
                to: line.end(),
                stroke: Stroke::solid(style.measurement, 1.0),
            },
        );
        scene.push(
            OverlayKind::Measurement,
            label(line.label(), line.label_rect(), style.measurement, style),
        );
    }
}

fn push_drag<D: DomHost>(scene: &mut OverlayScene, editor: &DirectEditor<D>, style: &OverlayStyle) {
    let drag = editor.drag_state();
    if !drag.is_dragging {
        return;
    }
    scene.push(
        OverlayKind::Drag,
        OverlayPrimitive::Box {
            rect: drag.ghost_rect(),
            stroke: Some(Stroke::dashed(style.selection, 1.0)),
            fill: Some(style.ghost_fill),
        },
    );
    if let Some(target) = &drag.drop_target {
        scene.push(
            OverlayKind::Drag,
            OverlayPrimitive::Box {
                rect: target.indicator,
                stroke: None,
                fill: Some(style.drop_indicator),
            },
        );
    }
}

/// Collect every overlay for the current frame.
///
/// Nothing is drawn outside edit mode.
pub fn build_scene<D: DomHost>(ctx: &RenderContext<'_, D>) -> OverlayScene {
    let editor = ctx.editor;
    let viewport = editor.dom().viewport();
    let mut scene = OverlayScene::new(viewport);
    if !editor.state().is_edit_mode {
        return scene;
    }

    push_selection(&mut scene, editor, &ctx.style);
    push_hover(&mut scene, editor, &ctx.style);
    push_measurement(&mut scene, editor, &ctx.style);
    push_drag(&mut scene, editor, &ctx.style);

    if let Some(position) = ctx.panel_position {
        if let Some(view) = PanelView::from_state(editor.state(), position, ctx.sections, viewport) {
            scene.push(OverlayKind::Panel, OverlayPrimitive::Panel(view));
        }
    }
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use directedit_core::{DirectEditConfig, KeyInput, MemoryDom, Modifiers, PanelPosition, SectionState};

    struct Page {
        editor: DirectEditor<MemoryDom>,
        row: ElementId,
        first: ElementId,
        second: ElementId,
    }

    fn page() -> Page {
        let mut dom = MemoryDom::new(Size::new(1280.0, 800.0));
        let root = dom.root();
        let row = dom.create_element(root, "div", Rect::new(100.0, 100.0, 500.0, 200.0));
        dom.set_style(row, "display", "flex");
        let first = dom.create_element(row, "div", Rect::new(100.0, 100.0, 200.0, 200.0));
        dom.add_class(first, "card");
        let second = dom.create_element(row, "div", Rect::new(220.0, 100.0, 320.0, 200.0));
        let mut editor = DirectEditor::new(dom, DirectEditConfig::default().enabled());
        editor.set_edit_mode(true);
        Page {
            editor,
            row,
            first,
            second,
        }
    }

    #[test]
    fn test_empty_outside_edit_mode() {
        let mut page = page();
        page.editor.select_element(page.row);
        page.editor.set_edit_mode(false);
        let scene = build_scene(&RenderContext::new(&page.editor));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_selection_of_flex_container() {
        let mut page = page();
        page.editor.select_element(page.row);
        let scene = build_scene(&RenderContext::new(&page.editor));

        let selection = scene.layer(OverlayKind::Selection).unwrap();
        assert_eq!(selection.primitives.len(), 2);
        match &selection.primitives[1] {
            OverlayPrimitive::Label { text, rect, .. } => {
                assert_eq!(text, "400 × 100 Fit");
                assert!(rect.y0 > 200.0);
            }
            other => panic!("expected label, got {:?}", other),
        }

        let children = scene.layer(OverlayKind::FlexChildren).unwrap();
        assert_eq!(children.primitives.len(), 2);
        assert!(matches!(
            children.primitives[0],
            OverlayPrimitive::Box { stroke: Some(Stroke { dashed: true, .. }), .. }
        ));
        // No panel without a position.
        assert!(scene.layer(OverlayKind::Panel).is_none());
    }

    #[test]
    fn test_hover_label_and_fit_annotation() {
        let mut page = page();
        page.editor.select_element(page.second);
        page.editor.set_hovered(Some(page.first));
        let scene = build_scene(&RenderContext::new(&page.editor));

        let hover = scene.layer(OverlayKind::Hover).unwrap();
        match &hover.primitives[1] {
            OverlayPrimitive::Label { text, rect, .. } => {
                assert_eq!(text, "div.card");
                assert!(rect.y1 <= 100.0);
            }
            other => panic!("expected label, got {:?}", other),
        }

        // Height without an inline value reads as fit.
        let selection = scene.layer(OverlayKind::Selection).unwrap();
        match &selection.primitives[1] {
            OverlayPrimitive::Label { text, .. } => assert_eq!(text, "100 × 100 Fit"),
            other => panic!("expected label, got {:?}", other),
        }
    }

    #[test]
    fn test_hovering_selection_draws_no_hover() {
        let mut page = page();
        page.editor.select_element(page.first);
        page.editor.set_hovered(Some(page.first));
        let scene = build_scene(&RenderContext::new(&page.editor));
        assert!(scene.layer(OverlayKind::Hover).is_none());
    }

    #[test]
    fn test_measurement_and_panel_layers() {
        let mut page = page();
        page.editor.select_element(page.first);
        page.editor
            .pointer_moved(Point::new(250.0, 150.0), Modifiers::NONE);
        page.editor
            .handle_key(&KeyInput::pressed("Alt", Modifiers::alt()));
        assert!(page.editor.flush_frame());

        let ctx = RenderContext::new(&page.editor)
            .with_panel(PanelPosition::new(900.0, 16.0), SectionState::default());
        let scene = build_scene(&ctx);

        let measurement = scene.layer(OverlayKind::Measurement).unwrap();
        assert!(
            measurement
                .primitives
                .iter()
                .any(|p| matches!(p, OverlayPrimitive::Line { .. }))
        );
        let panel = scene.layer(OverlayKind::Panel).unwrap();
        assert!(matches!(panel.primitives[0], OverlayPrimitive::Panel(_)));

        let kinds: Vec<_> = scene.layers().iter().map(|l| l.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        assert_eq!(kinds, sorted);
    }
}
