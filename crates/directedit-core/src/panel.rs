//! Floating panel preferences: screen position and collapsed sections.
//!
//! These are the only values that survive a page reload. Both are stored as
//! JSON under fixed keys; anything unreadable falls back to defaults.

use crate::config::DirectEditConfig;
use crate::storage::{PrefsStorage, StorageError, load_json, save_json};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Panel width in px.
pub const PANEL_WIDTH: f64 = 300.0;
/// Distance kept between the panel and the viewport edge.
pub const PANEL_MARGIN: f64 = 16.0;

/// Top-left corner of the panel in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelPosition {
    pub x: f64,
    pub y: f64,
}

impl PanelPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Docked to the top-right corner of the viewport.
    pub fn default_for(viewport: Size) -> Self {
        Self::new((viewport.width - PANEL_WIDTH - PANEL_MARGIN).max(0.0), PANEL_MARGIN)
    }

    /// Keep a panel of `panel` size fully inside the viewport.
    pub fn clamp_to(self, viewport: Size, panel: Size) -> Self {
        let max_x = (viewport.width - panel.width).max(0.0);
        let max_y = (viewport.height - panel.height).max(0.0);
        Self::new(self.x.clamp(0.0, max_x), self.y.clamp(0.0, max_y))
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Collapsible sections of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelSection {
    Layout,
    Sizing,
    Spacing,
    Radius,
    Typography,
    Colors,
}

impl PanelSection {
    pub const ALL: [PanelSection; 6] = [
        PanelSection::Layout,
        PanelSection::Sizing,
        PanelSection::Spacing,
        PanelSection::Radius,
        PanelSection::Typography,
        PanelSection::Colors,
    ];

    pub fn title(self) -> &'static str {
        match self {
            PanelSection::Layout => "Layout",
            PanelSection::Sizing => "Size",
            PanelSection::Spacing => "Spacing",
            PanelSection::Radius => "Radius",
            PanelSection::Typography => "Typography",
            PanelSection::Colors => "Colors",
        }
    }
}

fn open() -> bool {
    true
}

/// Open/closed flag per section. Every section starts open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionState {
    #[serde(default = "open")]
    pub layout: bool,
    #[serde(default = "open")]
    pub sizing: bool,
    #[serde(default = "open")]
    pub spacing: bool,
    #[serde(default = "open")]
    pub radius: bool,
    #[serde(default = "open")]
    pub typography: bool,
    #[serde(default = "open")]
    pub colors: bool,
}

impl Default for SectionState {
    fn default() -> Self {
        Self {
            layout: true,
            sizing: true,
            spacing: true,
            radius: true,
            typography: true,
            colors: true,
        }
    }
}

impl SectionState {
    pub fn is_open(&self, section: PanelSection) -> bool {
        match section {
            PanelSection::Layout => self.layout,
            PanelSection::Sizing => self.sizing,
            PanelSection::Spacing => self.spacing,
            PanelSection::Radius => self.radius,
            PanelSection::Typography => self.typography,
            PanelSection::Colors => self.colors,
        }
    }

    pub fn set_open(&mut self, section: PanelSection, open: bool) {
        let flag = match section {
            PanelSection::Layout => &mut self.layout,
            PanelSection::Sizing => &mut self.sizing,
            PanelSection::Spacing => &mut self.spacing,
            PanelSection::Radius => &mut self.radius,
            PanelSection::Typography => &mut self.typography,
            PanelSection::Colors => &mut self.colors,
        };
        *flag = open;
    }

    pub fn toggle(&mut self, section: PanelSection) {
        self.set_open(section, !self.is_open(section));
    }
}

/// Persists panel preferences in a [`PrefsStorage`].
pub struct PanelPrefs<S: PrefsStorage> {
    storage: S,
    position_key: String,
    sections_key: String,
}

impl<S: PrefsStorage> PanelPrefs<S> {
    pub fn new(storage: S, config: &DirectEditConfig) -> Self {
        Self {
            storage,
            position_key: config.position_storage_key.clone(),
            sections_key: config.sections_storage_key.clone(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stored position, or `None` when nothing usable is stored.
    pub fn load_position(&self) -> Option<PanelPosition> {
        match load_json::<PanelPosition, _>(&self.storage, &self.position_key) {
            Ok(position) if position.x.is_finite() && position.y.is_finite() => Some(position),
            Ok(_) => {
                log::warn!("Ignoring non-finite panel position");
                None
            }
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                log::warn!("Failed to load panel position: {}", e);
                None
            }
        }
    }

    /// Stored position clamped to the viewport, or the docked default.
    pub fn position_in(&self, viewport: Size, panel: Size) -> PanelPosition {
        self.load_position()
            .unwrap_or_else(|| PanelPosition::default_for(viewport))
            .clamp_to(viewport, panel)
    }

    pub fn save_position(&self, position: PanelPosition) {
        if let Err(e) = save_json(&self.storage, &self.position_key, &position) {
            log::warn!("Failed to save panel position: {}", e);
        }
    }

    pub fn load_sections(&self) -> SectionState {
        match load_json(&self.storage, &self.sections_key) {
            Ok(sections) => sections,
            Err(StorageError::NotFound(_)) => SectionState::default(),
            Err(e) => {
                log::warn!("Failed to load panel sections: {}", e);
                SectionState::default()
            }
        }
    }

    pub fn save_sections(&self, sections: &SectionState) {
        if let Err(e) = save_json(&self.storage, &self.sections_key, sections) {
            log::warn!("Failed to save panel sections: {}", e);
        }
    }

    /// Flip one section and persist the result.
    pub fn toggle_section(&self, section: PanelSection) -> SectionState {
        let mut sections = self.load_sections();
        sections.toggle(section);
        self.save_sections(&sections);
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPrefs;

    fn prefs() -> PanelPrefs<MemoryPrefs> {
        PanelPrefs::new(MemoryPrefs::new(), &DirectEditConfig::default())
    }

    #[test]
    fn test_position_roundtrip() {
        let prefs = prefs();
        assert_eq!(prefs.load_position(), None);

        prefs.save_position(PanelPosition::new(40.0, 120.0));
        assert_eq!(prefs.load_position(), Some(PanelPosition::new(40.0, 120.0)));
        assert_eq!(
            prefs.storage().get("direct-edit-panel-position").unwrap().as_deref(),
            Some(r#"{"x":40.0,"y":120.0}"#)
        );
    }

    #[test]
    fn test_malformed_position_falls_back() {
        let prefs = prefs();
        prefs.storage().set("direct-edit-panel-position", "[1, 2").unwrap();
        assert_eq!(prefs.load_position(), None);

        let viewport = Size::new(1280.0, 800.0);
        let position = prefs.position_in(viewport, Size::new(PANEL_WIDTH, 400.0));
        assert_eq!(position, PanelPosition::new(964.0, 16.0));
    }

    #[test]
    fn test_clamp_to_viewport() {
        let viewport = Size::new(800.0, 600.0);
        let panel = Size::new(300.0, 400.0);
        assert_eq!(
            PanelPosition::new(700.0, -20.0).clamp_to(viewport, panel),
            PanelPosition::new(500.0, 0.0)
        );
        assert_eq!(
            PanelPosition::new(10.0, 10.0).clamp_to(viewport, panel),
            PanelPosition::new(10.0, 10.0)
        );
    }

    #[test]
    fn test_sections_default_open() {
        let prefs = prefs();
        let sections = prefs.load_sections();
        assert!(PanelSection::ALL.iter().all(|&s| sections.is_open(s)));
    }

    #[test]
    fn test_toggle_section_persists() {
        let prefs = prefs();
        let sections = prefs.toggle_section(PanelSection::Typography);
        assert!(!sections.typography);
        assert!(!prefs.load_sections().typography);

        prefs.toggle_section(PanelSection::Typography);
        assert!(prefs.load_sections().typography);
    }

    #[test]
    fn test_partial_sections_json() {
        let prefs = prefs();
        prefs.storage().set("direct-edit-sections", r#"{"colors": false}"#).unwrap();
        let sections = prefs.load_sections();
        assert!(!sections.colors);
        assert!(sections.spacing);
    }

    #[test]
    fn test_malformed_sections_fall_back() {
        let prefs = prefs();
        prefs.storage().set("direct-edit-sections", "not json").unwrap();
        assert_eq!(prefs.load_sections(), SectionState::default());
    }
}
