//! SVG/HTML markup renderer.
//!
//! Emits one fixed-position `<div>` per overlay band. The host mounts the
//! markup at the end of `<body>`; every root carries the overlay data
//! attribute so hit-testing and inspection can skip it.
//!
//! Markup is kept per band. After each frame [`SvgRenderer::changed_layers`]
//! names the bands whose markup differs from the previous frame, so a host
//! can leave untouched bands (and the panel's inputs) alone.

use crate::overlay::{OverlayKind, OverlayLayer, OverlayPrimitive, OverlayScene, Stroke};
use crate::panel::PanelView;
use crate::renderer::{RenderResult, Renderer, RendererError};
use directedit_core::{OVERLAY_ATTRIBUTE, PanelSection};
use directedit_core::css::format_number;
use peniko::Color;
use std::collections::BTreeMap;
use std::fmt::Write;

const FONT_STACK: &str = "ui-monospace, SFMono-Regular, Menlo, monospace";
const LABEL_FONT_SIZE: f64 = 11.0;

/// `data-action` values of the panel footer buttons.
pub const PANEL_ACTIONS: [(&str, &str); 3] = [
    ("copy-tailwind", "Copy Tailwind"),
    ("export", "Copy edits"),
    ("reset", "Reset"),
];

/// Format a color as CSS `rgba()`.
pub fn css_color(color: Color) -> String {
    let rgba = color.to_rgba8();
    let alpha = (rgba.a as f64 / 255.0 * 100.0).round() / 100.0;
    format!("rgba({}, {}, {}, {})", rgba.r, rgba.g, rgba.b, format_number(alpha))
}

/// Escape text for HTML content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#"stroke="{}" stroke-width="{}""#,
        css_color(stroke.color),
        format_number(stroke.width)
    );
    if stroke.dashed {
        attrs.push_str(r#" stroke-dasharray="4 3""#);
    }
    attrs
}

/// Renderer producing a markup string.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    layers: BTreeMap<OverlayKind, String>,
    markup: String,
    changed: Vec<OverlayKind>,
    frames: u64,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup of the last rendered frame.
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Markup of one band in the last frame; empty when the band drew nothing.
    pub fn layer_markup(&self, kind: OverlayKind) -> &str {
        self.layers.get(&kind).map(String::as_str).unwrap_or("")
    }

    /// Bands whose markup changed with the last `render` or `clear`, in z order.
    pub fn changed_layers(&self) -> &[OverlayKind] {
        &self.changed
    }

    /// Number of frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    fn write_layer(out: &mut String, layer: &OverlayLayer, scene: &OverlayScene) -> std::fmt::Result {
        let kind = layer.kind;
        if kind == OverlayKind::Panel {
            for primitive in &layer.primitives {
                if let OverlayPrimitive::Panel(view) = primitive {
                    Self::write_panel(out, view)?;
                }
            }
            return Ok(());
        }

        write!(
            out,
            r#"<div {}="{}" style="position:fixed;left:0;top:0;width:{}px;height:{}px;z-index:{};pointer-events:none">"#,
            OVERLAY_ATTRIBUTE,
            kind.name(),
            format_number(scene.viewport.width),
            format_number(scene.viewport.height),
            kind.z_index(),
        )?;
        write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{1}" viewBox="0 0 {0} {1}">"#,
            format_number(scene.viewport.width),
            format_number(scene.viewport.height),
        )?;
        for primitive in &layer.primitives {
            Self::write_primitive(out, primitive)?;
        }
        out.push_str("</svg></div>");
        Ok(())
    }

    fn write_primitive(out: &mut String, primitive: &OverlayPrimitive) -> std::fmt::Result {
        match primitive {
            OverlayPrimitive::Box { rect, stroke, fill } => {
                write!(
                    out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                    format_number(rect.x0),
                    format_number(rect.y0),
                    format_number(rect.width()),
                    format_number(rect.height()),
                    fill.map(css_color).unwrap_or_else(|| "none".to_string()),
                )?;
                if let Some(stroke) = stroke {
                    write!(out, " {}", stroke_attrs(stroke))?;
                }
                out.push_str("/>");
            }
            OverlayPrimitive::Line { from, to, stroke } => {
                write!(
                    out,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}/>"#,
                    format_number(from.x),
                    format_number(from.y),
                    format_number(to.x),
                    format_number(to.y),
                    stroke_attrs(stroke),
                )?;
            }
            OverlayPrimitive::Label {
                rect,
                text,
                background,
                foreground,
            } => {
                write!(
                    out,
                    r#"<g><rect x="{}" y="{}" width="{}" height="{}" rx="3" fill="{}"/>"#,
                    format_number(rect.x0),
                    format_number(rect.y0),
                    format_number(rect.width()),
                    format_number(rect.height()),
                    css_color(*background),
                )?;
                let center = rect.center();
                write!(
                    out,
                    r#"<text x="{}" y="{}" fill="{}" font-family="{}" font-size="{}" text-anchor="middle" dominant-baseline="central">{}</text></g>"#,
                    format_number(center.x),
                    format_number(center.y),
                    css_color(*foreground),
                    FONT_STACK,
                    format_number(LABEL_FONT_SIZE),
                    escape(text),
                )?;
            }
            // Panels live in their own band.
            OverlayPrimitive::Panel(_) => {}
        }
        Ok(())
    }

    fn write_panel(out: &mut String, view: &PanelView) -> std::fmt::Result {
        let kind = OverlayKind::Panel;
        write!(
            out,
            r#"<div {}="{}" style="position:fixed;left:{}px;top:{}px;width:{}px;max-height:{}px;overflow:auto;z-index:{};pointer-events:auto;background:#fff;border-radius:8px;box-shadow:0 4px 16px rgba(0, 0, 0, 0.15);font:12px {}">"#,
            OVERLAY_ATTRIBUTE,
            kind.name(),
            format_number(view.rect.x0),
            format_number(view.rect.y0),
            format_number(view.rect.width()),
            format_number(view.rect.height()),
            kind.z_index(),
            FONT_STACK,
        )?;
        write!(
            out,
            r#"<header data-drag-handle>{}<button data-action="close">×</button></header>"#,
            escape(&view.title)
        )?;
        for section in &view.sections {
            let key = section_key(section.section);
            write!(
                out,
                r#"<section data-section="{0}" data-open="{1}"><h3 data-toggle-section="{0}">{2}</h3>"#,
                key,
                section.open,
                section.section.title(),
            )?;
            if section.open {
                out.push_str("<dl>");
                for row in &section.rows {
                    write!(out, "<dt>{}</dt><dd>", escape(&row.label))?;
                    match row.property {
                        Some(property) => write!(
                            out,
                            r#"<input data-property="{}" value="{}">"#,
                            property,
                            escape(&row.value)
                        )?,
                        None => out.push_str(&escape(&row.value)),
                    }
                    out.push_str("</dd>");
                }
                out.push_str("</dl>");
            }
            out.push_str("</section>");
        }
        write!(
            out,
            r#"<footer data-pending="{}"><code>{}</code>"#,
            view.has_pending,
            escape(&view.tailwind),
        )?;
        // Actions on pending edits are disabled until there is something to act on.
        let disabled = if view.has_pending { "" } else { " disabled" };
        for (action, text) in PANEL_ACTIONS {
            write!(out, r#"<button data-action="{}"{}>{}</button>"#, action, disabled, text)?;
        }
        out.push_str("</footer></div>");
        Ok(())
    }
}

/// Matches the serialized section names used by the stored preferences.
fn section_key(section: PanelSection) -> &'static str {
    match section {
        PanelSection::Layout => "layout",
        PanelSection::Sizing => "sizing",
        PanelSection::Spacing => "spacing",
        PanelSection::Radius => "radius",
        PanelSection::Typography => "typography",
        PanelSection::Colors => "colors",
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, scene: &OverlayScene) -> RenderResult<()> {
        let mut layers = BTreeMap::new();
        for kind in OverlayKind::ALL {
            let mut out = String::new();
            if let Some(layer) = scene.layer(kind) {
                Self::write_layer(&mut out, layer, scene)
                    .map_err(|e| RendererError::RenderFailed(e.to_string()))?;
            }
            layers.insert(kind, out);
        }

        self.changed = OverlayKind::ALL
            .into_iter()
            .filter(|kind| layers.get(kind).map(String::as_str).unwrap_or("") != self.layer_markup(*kind))
            .collect();
        self.markup = layers.values().map(String::as_str).collect();
        self.layers = layers;
        self.frames += 1;
        log::trace!(
            "Rendered {} overlay layers, {} changed",
            scene.layers().len(),
            self.changed.len()
        );
        Ok(())
    }

    fn clear(&mut self) {
        self.changed = self
            .layers
            .iter()
            .filter(|(_, markup)| !markup.is_empty())
            .map(|(kind, _)| *kind)
            .collect();
        self.layers.clear();
        self.markup.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect, Size};

    fn blue() -> Color {
        Color::from_rgba8(59, 130, 246, 255)
    }

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(blue()), "rgba(59, 130, 246, 1)");
        assert_eq!(css_color(Color::from_rgba8(0, 0, 0, 128)), "rgba(0, 0, 0, 0.5)");
    }

    #[test]
    fn test_layers_are_tagged_and_inert() {
        let mut scene = OverlayScene::new(Size::new(800.0, 600.0));
        scene.push(
            OverlayKind::Measurement,
            OverlayPrimitive::Line {
                from: Point::new(0.0, 10.0),
                to: Point::new(20.0, 10.0),
                stroke: Stroke::solid(blue(), 1.0),
            },
        );
        scene.push(
            OverlayKind::Selection,
            OverlayPrimitive::Box {
                rect: Rect::new(10.0, 10.0, 110.0, 60.0),
                stroke: Some(Stroke::dashed(blue(), 2.0)),
                fill: None,
            },
        );

        let mut renderer = SvgRenderer::new();
        renderer.render(&scene).unwrap();
        let markup = renderer.markup();

        let selection = markup.find(r#"data-direct-edit-overlay="selection""#).unwrap();
        let measurement = markup.find(r#"data-direct-edit-overlay="measurement""#).unwrap();
        assert!(selection < measurement);
        assert!(markup.contains("z-index:99990"));
        assert!(markup.contains("z-index:99993"));
        assert_eq!(markup.matches("pointer-events:none").count(), 2);
        assert!(markup.contains(r#"stroke-dasharray="4 3""#));
        assert!(markup.contains(r#"<line x1="0" y1="10" x2="20" y2="10""#));
    }

    #[test]
    fn test_label_text_is_escaped() {
        let mut scene = OverlayScene::new(Size::new(100.0, 100.0));
        scene.push(
            OverlayKind::Hover,
            OverlayPrimitive::Label {
                rect: Rect::new(0.0, 0.0, 40.0, 18.0),
                text: "div.<b>".to_string(),
                background: blue(),
                foreground: Color::from_rgba8(255, 255, 255, 255),
            },
        );
        let mut renderer = SvgRenderer::new();
        renderer.render(&scene).unwrap();
        assert!(renderer.markup().contains("div.&lt;b&gt;"));
    }

    #[test]
    fn test_clear_and_frame_count() {
        let mut renderer = SvgRenderer::new();
        let mut scene = OverlayScene::new(Size::new(100.0, 100.0));
        scene.push(
            OverlayKind::Drag,
            OverlayPrimitive::Box {
                rect: Rect::new(0.0, 0.0, 10.0, 2.0),
                stroke: None,
                fill: Some(blue()),
            },
        );
        renderer.render(&scene).unwrap();
        renderer.render(&OverlayScene::new(Size::new(100.0, 100.0))).unwrap();
        assert_eq!(renderer.frame_count(), 2);
        assert!(renderer.markup().is_empty());

        renderer.render(&scene).unwrap();
        renderer.clear();
        assert!(renderer.markup().is_empty());
        assert_eq!(renderer.changed_layers(), &[OverlayKind::Drag]);
        assert_eq!(renderer.layer_markup(OverlayKind::Drag), "");
    }

    #[test]
    fn test_only_changed_layers_are_reported() {
        use crate::panel::PanelSectionView;

        let view = PanelView {
            rect: Rect::new(900.0, 16.0, 1200.0, 216.0),
            title: "div#card".to_string(),
            sections: vec![PanelSectionView {
                section: PanelSection::Layout,
                open: true,
                rows: Vec::new(),
            }],
            tailwind: String::new(),
            has_pending: false,
        };
        let frame = |hover_x: f64| {
            let mut scene = OverlayScene::new(Size::new(1280.0, 800.0));
            scene.push(
                OverlayKind::Hover,
                OverlayPrimitive::Box {
                    rect: Rect::new(hover_x, 0.0, hover_x + 10.0, 10.0),
                    stroke: Some(Stroke::solid(blue(), 1.0)),
                    fill: None,
                },
            );
            scene.push(OverlayKind::Panel, OverlayPrimitive::Panel(view.clone()));
            scene
        };

        let mut renderer = SvgRenderer::new();
        renderer.render(&frame(0.0)).unwrap();
        assert_eq!(renderer.changed_layers(), &[OverlayKind::Hover, OverlayKind::Panel]);
        let panel = renderer.layer_markup(OverlayKind::Panel).to_string();
        assert!(panel.contains(r#"data-direct-edit-overlay="panel""#));

        renderer.render(&frame(40.0)).unwrap();
        assert_eq!(renderer.changed_layers(), &[OverlayKind::Hover]);
        assert_eq!(renderer.layer_markup(OverlayKind::Panel), panel);
        assert!(renderer.markup().ends_with(&panel));

        renderer.render(&frame(40.0)).unwrap();
        assert!(renderer.changed_layers().is_empty());
    }

    #[test]
    fn test_panel_is_interactive_and_collapsible() {
        use crate::panel::{PanelRow, PanelSectionView};

        let view = PanelView {
            rect: Rect::new(900.0, 16.0, 1200.0, 216.0),
            title: "div#card".to_string(),
            sections: vec![
                PanelSectionView {
                    section: PanelSection::Sizing,
                    open: true,
                    rows: vec![PanelRow::editable("Width", "width", "fill")],
                },
                PanelSectionView {
                    section: PanelSection::Colors,
                    open: false,
                    rows: vec![PanelRow::new("Background", "#ffffff")],
                },
            ],
            tailwind: "p-4".to_string(),
            has_pending: true,
        };
        let mut scene = OverlayScene::new(Size::new(1280.0, 800.0));
        scene.push(OverlayKind::Panel, OverlayPrimitive::Panel(view));

        let mut renderer = SvgRenderer::new();
        renderer.render(&scene).unwrap();
        let markup = renderer.markup();

        assert!(markup.contains(r#"data-direct-edit-overlay="panel""#));
        assert!(markup.contains("pointer-events:auto"));
        assert!(markup.contains("z-index:99995"));
        assert!(markup.contains(r#"data-section="sizing" data-open="true""#));
        assert!(markup.contains(r#"<dt>Width</dt><dd><input data-property="width" value="fill"></dd>"#));
        // Collapsed sections keep their header only.
        assert!(!markup.contains("Background"));
        assert!(markup.contains("<code>p-4</code>"));
        assert!(markup.contains(r#"<button data-action="copy-tailwind">"#));
        assert!(markup.contains(r#"data-toggle-section="colors""#));
    }
}
