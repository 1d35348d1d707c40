//! Renderer trait abstraction.

use crate::overlay::OverlayScene;
use directedit_core::{DirectEditor, DomHost, OverlayColors, PanelPosition, SectionState};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Mount failed: {0}")]
    Mount(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Colors and metrics of the overlays.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    pub selection: Color,
    pub hover: Color,
    pub flex_children: Color,
    pub measurement: Color,
    pub drop_indicator: Color,
    /// Fill of the drag ghost box.
    pub ghost_fill: Color,
    pub label_text: Color,
    pub panel_background: Color,
    pub selection_width: f64,
    pub hover_width: f64,
}

impl OverlayStyle {
    pub fn from_colors(colors: &OverlayColors) -> Self {
        let selection: Color = colors.selection.into();
        let rgba = selection.to_rgba8();
        Self {
            selection,
            hover: colors.hover.into(),
            flex_children: colors.flex_children.into(),
            measurement: colors.measurement.into(),
            drop_indicator: colors.drop_indicator.into(),
            ghost_fill: Color::from_rgba8(rgba.r, rgba.g, rgba.b, 38),
            label_text: Color::from_rgba8(255, 255, 255, 255),
            panel_background: Color::from_rgba8(255, 255, 255, 255),
            selection_width: 2.0,
            hover_width: 1.0,
        }
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from_colors(&OverlayColors::default())
    }
}

/// Context for building one frame of overlays.
pub struct RenderContext<'a, D: DomHost> {
    pub editor: &'a DirectEditor<D>,
    pub style: OverlayStyle,
    /// Panel placement; the panel is omitted without it.
    pub panel_position: Option<PanelPosition>,
    pub sections: SectionState,
}

impl<'a, D: DomHost> RenderContext<'a, D> {
    pub fn new(editor: &'a DirectEditor<D>) -> Self {
        Self {
            editor,
            style: OverlayStyle::from_colors(&editor.config().colors),
            panel_position: None,
            sections: SectionState::default(),
        }
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_panel(mut self, position: PanelPosition, sections: SectionState) -> Self {
        self.panel_position = Some(position);
        self.sections = sections;
        self
    }
}

/// Trait for overlay backends.
pub trait Renderer {
    /// Draw a scene, replacing whatever the previous frame drew.
    fn render(&mut self, scene: &OverlayScene) -> RenderResult<()>;

    /// Remove everything this renderer drew.
    fn clear(&mut self);
}
