//! Keyboard shortcut registry and documentation.

use directedit_core::{DirectEditConfig, ModifierKey};

/// A keyboard or pointer gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub keys: String,
    pub description: &'static str,
}

impl Shortcut {
    pub fn new(keys: impl Into<String>, description: &'static str) -> Self {
        Self {
            keys: keys.into(),
            description,
        }
    }
}

fn modifier_name(key: ModifierKey) -> &'static str {
    match key {
        ModifierKey::Shift => "Shift",
        ModifierKey::Ctrl => "Ctrl",
        ModifierKey::Alt => "Alt",
        ModifierKey::Meta => "Cmd",
        ModifierKey::Primary => "Ctrl/Cmd",
    }
}

/// Registry of the gestures the editor responds to.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Gestures for a configuration.
    pub fn all(config: &DirectEditConfig) -> Vec<Shortcut> {
        vec![
            Shortcut::new(
                format!("{}+{}", modifier_name(ModifierKey::Primary), config.toggle_key),
                "Toggle edit mode",
            ),
            Shortcut::new("Click", "Select element"),
            Shortcut::new(
                format!("Hold {}", modifier_name(config.measure_modifier)),
                "Measure distances",
            ),
            Shortcut::new(
                format!("{}+Drag", modifier_name(config.drag_modifier)),
                "Move element within flex layouts",
            ),
            Shortcut::new(
                "Escape",
                "Cancel drag, stop measuring, close panel, exit edit mode",
            ),
        ]
    }

    /// Print all shortcuts to the console.
    pub fn print_all(config: &DirectEditConfig) {
        println!("\n=== Direct Edit Shortcuts ===");
        for shortcut in Self::all(config) {
            println!("  {:20} {}", shortcut.keys, shortcut.description);
        }
        println!();
    }
}
