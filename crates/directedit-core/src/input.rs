//! Keyboard and pointer input types.

use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self { shift: true, ..Self::NONE }
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::NONE }
    }

    pub fn alt() -> Self {
        Self { alt: true, ..Self::NONE }
    }

    pub fn meta() -> Self {
        Self { meta: true, ..Self::NONE }
    }

    /// Ctrl on Windows/Linux, Cmd on macOS. Either counts.
    pub fn is_primary(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn is_held(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Shift => self.shift,
            ModifierKey::Ctrl => self.ctrl,
            ModifierKey::Alt => self.alt,
            ModifierKey::Meta => self.meta,
            ModifierKey::Primary => self.is_primary(),
        }
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A single modifier, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
    Shift,
    Ctrl,
    Alt,
    Meta,
    /// Ctrl or Meta.
    Primary,
}

impl ModifierKey {
    /// The `KeyboardEvent.key` value reported when this modifier itself is
    /// pressed or released.
    pub fn matches_key(self, key: &str) -> bool {
        match self {
            ModifierKey::Shift => key == "Shift",
            ModifierKey::Ctrl => key == "Control",
            ModifierKey::Alt => key == "Alt",
            ModifierKey::Meta => key == "Meta",
            ModifierKey::Primary => key == "Control" || key == "Meta",
        }
    }
}

/// A keyboard event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    /// `KeyboardEvent.key` value (`"."`, `"Escape"`, `"Alt"`).
    pub key: String,
    /// Modifier state after the event.
    pub modifiers: Modifiers,
    /// `true` for keydown, `false` for keyup.
    pub pressed: bool,
}

impl KeyInput {
    pub fn pressed(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            pressed: true,
        }
    }

    pub fn released(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            pressed: false,
        }
    }

    pub fn is_escape(&self) -> bool {
        self.pressed && self.key == "Escape"
    }
}
