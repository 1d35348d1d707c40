//! Direct Edit Render Library
//!
//! Turns editor state into a z-ordered overlay scene and draws it. The
//! default backend emits fixed-position SVG/HTML markup for the host page to
//! mount.

mod overlay;
mod panel;
mod renderer;
mod scene;
mod svg;
mod tracker;

pub use overlay::{OverlayKind, OverlayLayer, OverlayPrimitive, OverlayScene, Stroke};
pub use panel::{PanelRow, PanelSectionView, PanelView};
pub use renderer::{OverlayStyle, RenderContext, RenderResult, Renderer, RendererError};
pub use scene::build_scene;
pub use svg::SvgRenderer;
pub use tracker::{EventSource, OverlayTracker, Subscription};
