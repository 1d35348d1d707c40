//! Overlay scene primitives and z-index bands.

use crate::panel::PanelView;
use kurbo::{Point, Rect, Size};
use peniko::Color;

/// Overlay layers, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverlayKind {
    Selection,
    Hover,
    FlexChildren,
    Measurement,
    Drag,
    Panel,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 6] = [
        OverlayKind::Selection,
        OverlayKind::Hover,
        OverlayKind::FlexChildren,
        OverlayKind::Measurement,
        OverlayKind::Drag,
        OverlayKind::Panel,
    ];

    /// Fixed z-index band of this layer.
    pub fn z_index(self) -> i32 {
        match self {
            OverlayKind::Selection => 99990,
            OverlayKind::Hover => 99991,
            OverlayKind::FlexChildren => 99992,
            OverlayKind::Measurement => 99993,
            OverlayKind::Drag => 99994,
            OverlayKind::Panel => 99995,
        }
    }

    /// Value of the overlay data attribute.
    pub fn name(self) -> &'static str {
        match self {
            OverlayKind::Selection => "selection",
            OverlayKind::Hover => "hover",
            OverlayKind::FlexChildren => "flex-children",
            OverlayKind::Measurement => "measurement",
            OverlayKind::Drag => "drag",
            OverlayKind::Panel => "panel",
        }
    }

    /// Only the panel receives pointer events.
    pub fn is_interactive(self) -> bool {
        self == OverlayKind::Panel
    }
}

/// Outline style.
#[derive(Debug, Clone, Copy)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    pub dashed: bool,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self { color, width, dashed: false }
    }

    pub fn dashed(color: Color, width: f64) -> Self {
        Self { color, width, dashed: true }
    }
}

/// One drawable item.
#[derive(Debug, Clone)]
pub enum OverlayPrimitive {
    Box {
        rect: Rect,
        stroke: Option<Stroke>,
        fill: Option<Color>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Label {
        rect: Rect,
        text: String,
        background: Color,
        foreground: Color,
    },
    Panel(PanelView),
}

/// All primitives of one band.
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    pub kind: OverlayKind,
    pub primitives: Vec<OverlayPrimitive>,
}

/// Everything drawn over the page for one frame.
#[derive(Debug, Clone, Default)]
pub struct OverlayScene {
    pub viewport: Size,
    layers: Vec<OverlayLayer>,
}

impl OverlayScene {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            layers: Vec::new(),
        }
    }

    /// Append a primitive to its band, creating the band on first use.
    pub fn push(&mut self, kind: OverlayKind, primitive: OverlayPrimitive) {
        match self.layers.iter_mut().find(|l| l.kind == kind) {
            Some(layer) => layer.primitives.push(primitive),
            None => {
                self.layers.push(OverlayLayer {
                    kind,
                    primitives: vec![primitive],
                });
                self.layers.sort_by_key(|l| l.kind);
            }
        }
    }

    /// Non-empty layers in stacking order.
    pub fn layers(&self) -> &[OverlayLayer] {
        &self.layers
    }

    pub fn layer(&self, kind: OverlayKind) -> Option<&OverlayLayer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_bands_strictly_increase() {
        let z: Vec<i32> = OverlayKind::ALL.iter().map(|k| k.z_index()).collect();
        assert_eq!(z, vec![99990, 99991, 99992, 99993, 99994, 99995]);
        assert!(z.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_layers_sorted_by_band() {
        let mut scene = OverlayScene::new(Size::new(100.0, 100.0));
        let dot = || OverlayPrimitive::Box {
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            stroke: None,
            fill: Some(Color::from_rgba8(0, 0, 0, 255)),
        };
        scene.push(OverlayKind::Measurement, dot());
        scene.push(OverlayKind::Selection, dot());
        scene.push(OverlayKind::Measurement, dot());

        let kinds: Vec<_> = scene.layers().iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![OverlayKind::Selection, OverlayKind::Measurement]);
        assert_eq!(scene.layer(OverlayKind::Measurement).unwrap().primitives.len(), 2);
        assert!(scene.layer(OverlayKind::Hover).is_none());
    }
}
