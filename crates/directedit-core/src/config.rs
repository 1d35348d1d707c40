//! Toolkit configuration.

use crate::input::ModifierKey;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Default storage key for the panel position.
pub const PANEL_POSITION_KEY: &str = "direct-edit-panel-position";
/// Default storage key for the collapsible section flags.
pub const SECTIONS_KEY: &str = "direct-edit-sections";

/// Serializable RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccentColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl AccentColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb` or `rgba(...)` when translucent.
    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = f64::from(self.a) / 255.0;
            format!("rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, alpha)
        }
    }
}

impl From<Color> for AccentColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<AccentColor> for Color {
    fn from(color: AccentColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Accent colors of the overlay layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayColors {
    pub selection: AccentColor,
    pub hover: AccentColor,
    pub flex_children: AccentColor,
    pub measurement: AccentColor,
    pub drop_indicator: AccentColor,
}

impl Default for OverlayColors {
    fn default() -> Self {
        Self {
            selection: AccentColor::new(59, 130, 246, 255),
            hover: AccentColor::new(59, 130, 246, 128),
            flex_children: AccentColor::new(168, 85, 247, 255),
            measurement: AccentColor::new(244, 63, 94, 255),
            drop_indicator: AccentColor::new(59, 130, 246, 255),
        }
    }
}

/// Toolkit configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectEditConfig {
    /// Development-mode gate. When off the toolkit installs nothing.
    pub enabled: bool,
    /// Key that toggles edit mode together with the primary modifier.
    pub toggle_key: String,
    /// Modifier that shows measurements while held.
    pub measure_modifier: ModifierKey,
    /// Modifier that must be held on pointer-down to start a drag.
    pub drag_modifier: ModifierKey,
    /// Opacity of the dragged element while in motion.
    pub drag_opacity: f64,
    pub colors: OverlayColors,
    pub position_storage_key: String,
    pub sections_storage_key: String,
}

impl Default for DirectEditConfig {
    fn default() -> Self {
        Self {
            enabled: cfg!(debug_assertions),
            toggle_key: ".".to_string(),
            measure_modifier: ModifierKey::Alt,
            drag_modifier: ModifierKey::Shift,
            drag_opacity: 0.5,
            colors: OverlayColors::default(),
            position_storage_key: PANEL_POSITION_KEY.to_string(),
            sections_storage_key: SECTIONS_KEY.to_string(),
        }
    }
}

impl DirectEditConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Same configuration with the gate forced on.
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Opacity formatted for a `style.opacity` write.
    pub fn drag_opacity_css(&self) -> String {
        crate::css::format_number(self.drag_opacity.clamp(0.0, 1.0))
    }
}
