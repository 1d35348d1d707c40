//! Direct Edit Core Library
//!
//! Platform-agnostic inspection, style model and interaction logic for the
//! Direct Edit toolkit. Everything here talks to the page through the
//! [`DomHost`] trait, so the same code runs against a browser DOM adapter or
//! the in-memory [`MemoryDom`].

pub mod clipboard;
pub mod config;
pub mod css;
pub mod dom;
pub mod drag;
pub mod editor;
pub mod export;
pub mod input;
pub mod inspector;
pub mod measure;
pub mod panel;
pub mod properties;
pub mod scheduler;
pub mod storage;
pub mod tailwind;

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard};
pub use config::{AccentColor, DirectEditConfig, OverlayColors};
pub use css::{
    ColorValue, CssUnit, CssValue, format_property_value, parse_color_value, parse_property_value,
};
pub use dom::{
    DomError, DomHost, DomResult, ElementId, MemoryDom, NodeFixture, OVERLAY_ATTRIBUTE, PageFixture,
    element_under_pointer,
};
pub use drag::{DragEngine, DragOutcome, DragState, DropTarget};
pub use editor::{DirectEditState, DirectEditor, KeyOutcome, PointerOutcome};
pub use export::ExportSummary;
pub use input::{KeyInput, ModifierKey, Modifiers, MouseButton};
pub use inspector::{
    ComputedStyles, ElementInfo, SizingInputs, capture_original_styles, detect_sizing_mode,
    get_computed_styles, get_element_info,
};
pub use measure::{
    LineDirection, MeasurementLine, MeasurementSession, measure_between, measure_to_parent,
};
pub use panel::{PanelPosition, PanelPrefs, PanelSection, SectionState};
pub use properties::{
    AlignItems, BorderRadiusProperties, ColorKey, ColorProperties, Display, FlexDirection,
    FlexProperties, FlexUpdate, FlexWrap, JustifyContent, OriginalStyles, PendingStyles, RadiusKey,
    SizingKey, SizingMode, SizingProperties, SizingValue, SpacingKey, SpacingProperties, TextAlign,
    TypographyProperties, TypographyUpdate, VerticalAlign,
};
pub use scheduler::{FrameHandle, FrameRequest, FrameScheduler};
pub use storage::{MemoryPrefs, PrefsStorage, StorageError, StorageResult};
pub use tailwind::{styles_to_tailwind, tailwind_classes};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FilePrefs;

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStoragePrefs;
