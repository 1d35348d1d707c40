//! Direct Edit Application
//!
//! The toolkit shell: activation gate, event dispatch, system clipboard and
//! platform entry points.

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
mod clipboard;
mod shortcuts;
mod toolkit;

pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use toolkit::{EventResponse, PanelAction, Toolkit, ToolkitError, ToolkitEvent};

#[cfg(feature = "native")]
pub use clipboard::SystemClipboard;

#[cfg(target_arch = "wasm32")]
pub use clipboard::WebClipboard;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{WebDom, run_wasm};
