//! Interaction state coordinator.
//!
//! [`DirectEditor`] owns the document handle and every piece of interaction
//! state: edit mode, hover, selection, derived style bundles, pending edits,
//! drag and measurement. Style writes hit the DOM first and only then update
//! the in-memory bundles, so the two never disagree after a failed write.

use crate::clipboard::Clipboard;
use crate::config::DirectEditConfig;
use crate::css::{
    ColorValue, CssValue, format_property_value, parse_color_value, parse_property_value,
};
use crate::dom::{DomHost, DomResult, ElementId, element_under_pointer};
use crate::drag::{DragEngine, DragOutcome, DragState};
use crate::export::ExportSummary;
use crate::input::{KeyInput, Modifiers};
use crate::inspector::{
    ComputedStyles, ElementInfo, capture_original_styles, get_computed_styles, get_element_info,
};
use crate::measure::{MeasurementLine, MeasurementSession};
use crate::properties::{
    AlignItems, ColorKey, Display, EDITABLE_PROPERTIES, FlexDirection, FlexUpdate, FlexWrap,
    JustifyContent, OriginalStyles, PendingStyles, RadiusKey, SizingKey, SizingValue, SpacingKey,
    TextAlign, TypographyUpdate, VerticalAlign,
};
use crate::scheduler::{FrameHandle, FrameRequest};
use crate::tailwind::styles_to_tailwind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Everything the panel and overlays render from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectEditState {
    pub is_open: bool,
    pub is_edit_mode: bool,
    pub selected_element: Option<ElementId>,
    pub hovered_element: Option<ElementId>,
    pub element_info: Option<ElementInfo>,
    pub computed: ComputedStyles,
    /// Inline values present when the element was selected.
    pub original_styles: OriginalStyles,
    pub pending_styles: PendingStyles,
}

/// What a key press did. Anything but `Ignored` should be swallowed by the
/// host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    EditModeToggled(bool),
    DragCancelled,
    MeasurementStarted,
    MeasurementStopped,
    PanelClosed,
    EditModeExited,
}

impl KeyOutcome {
    pub fn is_handled(self) -> bool {
        self != KeyOutcome::Ignored
    }
}

/// What a pointer press did. Anything but `Ignored` should be swallowed by
/// the host so the page never sees the click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    Selected(ElementId),
    DragStarted(ElementId),
}

/// The interaction state machine over a [`DomHost`].
pub struct DirectEditor<D: DomHost> {
    dom: D,
    config: DirectEditConfig,
    state: DirectEditState,
    drag: DragEngine,
    measurement: MeasurementSession,
    pointer: Option<Point>,
}

impl<D: DomHost> DirectEditor<D> {
    pub fn new(dom: D, config: DirectEditConfig) -> Self {
        let drag = DragEngine::new(config.drag_opacity_css());
        Self {
            dom,
            config,
            state: DirectEditState::default(),
            drag,
            measurement: MeasurementSession::new(),
            pointer: None,
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn into_dom(self) -> D {
        self.dom
    }

    pub fn config(&self) -> &DirectEditConfig {
        &self.config
    }

    pub fn state(&self) -> &DirectEditState {
        &self.state
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn is_measuring(&self) -> bool {
        self.measurement.is_active()
    }

    pub fn measurement_lines(&self) -> &[MeasurementLine] {
        self.measurement.lines()
    }

    pub fn measurement_target(&self) -> Option<ElementId> {
        self.measurement.target()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select an element and snapshot everything derived from it.
    ///
    /// Pending edits are discarded and the panel opens, even if the user
    /// had closed it. Read-only on the DOM.
    pub fn select_element(&mut self, el: ElementId) {
        if !self.dom.contains(el) {
            log::warn!("Ignoring selection of detached element {}", el);
            return;
        }
        let info = get_element_info(&self.dom, el);
        log::debug!("Selected {}", info.label());

        self.state.computed = get_computed_styles(&self.dom, el);
        self.state.original_styles = capture_original_styles(&self.dom, el);
        self.state.element_info = Some(info);
        self.state.selected_element = Some(el);
        self.state.pending_styles.clear();
        self.state.is_open = true;
    }

    /// Re-derive info and bundles for the current selection, keeping pending
    /// edits and the original snapshot.
    pub fn refresh_selection(&mut self) {
        let Some(el) = self.state.selected_element else {
            return;
        };
        if !self.dom.contains(el) {
            log::warn!("Selected element {} was removed from the document", el);
            self.clear_selection();
            return;
        }
        self.state.element_info = Some(get_element_info(&self.dom, el));
        self.state.computed = get_computed_styles(&self.dom, el);
    }

    pub fn clear_selection(&mut self) {
        self.cancel_drag();
        self.measurement.deactivate();
        self.state.selected_element = None;
        self.state.element_info = None;
        self.state.computed = ComputedStyles::default();
        self.state.original_styles.clear();
        self.state.pending_styles.clear();
        self.state.is_open = false;
    }

    pub fn set_hovered(&mut self, el: Option<ElementId>) {
        self.state.hovered_element = el;
    }

    pub fn open_panel(&mut self) {
        self.state.is_open = true;
    }

    pub fn close_panel(&mut self) {
        self.state.is_open = false;
    }

    // ------------------------------------------------------------------
    // Edit mode
    // ------------------------------------------------------------------

    pub fn toggle_edit_mode(&mut self) -> bool {
        let enabled = !self.state.is_edit_mode;
        self.set_edit_mode(enabled);
        enabled
    }

    /// Leaving edit mode drops the selection and hover.
    pub fn set_edit_mode(&mut self, enabled: bool) {
        if self.state.is_edit_mode == enabled {
            return;
        }
        self.state.is_edit_mode = enabled;
        if !enabled {
            self.clear_selection();
            self.state.hovered_element = None;
        }
        log::info!("Edit mode {}", if enabled { "on" } else { "off" });
    }

    // ------------------------------------------------------------------
    // Style edits
    // ------------------------------------------------------------------

    /// Write one inline declaration on the selection and record it.
    /// Returns `false` without a selection.
    fn write_style(&mut self, property: &str, value: &str) -> DomResult<bool> {
        let Some(el) = self.state.selected_element else {
            return Ok(false);
        };
        self.dom.set_inline_style(el, property, value)?;
        self.state.pending_styles.insert(property, value);
        log::debug!("Set {}: {}", property, value);
        Ok(true)
    }

    pub fn update_spacing_property(&mut self, key: SpacingKey, value: CssValue) -> DomResult<()> {
        if self.write_style(key.css_name(), &format_property_value(&value))? {
            self.state.computed.spacing.set(key, value);
        }
        Ok(())
    }

    pub fn update_border_radius_property(&mut self, key: RadiusKey, value: CssValue) -> DomResult<()> {
        if self.write_style(key.css_name(), &format_property_value(&value))? {
            self.state.computed.border_radius.set(key, value);
        }
        Ok(())
    }

    pub fn update_flex_property(&mut self, update: FlexUpdate) -> DomResult<()> {
        if !self.write_style(update.css_name(), &update.css_value())? {
            return Ok(());
        }
        update.apply(&mut self.state.computed.flex);
        if let FlexUpdate::Display(display) = &update {
            if let Some(info) = self.state.element_info.as_mut() {
                info.is_flex_container = display.is_flex();
            }
        }
        Ok(())
    }

    /// Fill writes `100%`, fit writes `fit-content`, fixed writes the value.
    pub fn update_sizing_property(&mut self, key: SizingKey, value: SizingValue) -> DomResult<()> {
        if self.write_style(key.css_name(), &value.css_value())? {
            self.state.computed.sizing.set(key, value);
        }
        Ok(())
    }

    pub fn update_typography_property(&mut self, update: TypographyUpdate) -> DomResult<()> {
        match update {
            TypographyUpdate::FontFamily(family) => {
                if self.write_style("font-family", &family)? {
                    self.state.computed.typography.font_family = family;
                }
            }
            TypographyUpdate::FontWeight(weight) => {
                if self.write_style("font-weight", &weight)? {
                    self.state.computed.typography.font_weight = weight;
                }
            }
            TypographyUpdate::FontSize(size) => {
                if self.write_style("font-size", &format_property_value(&size))? {
                    self.state.computed.typography.font_size = size;
                }
            }
            TypographyUpdate::LineHeight(height) => {
                if self.write_style("line-height", &format_property_value(&height))? {
                    self.state.computed.typography.line_height = height;
                }
            }
            TypographyUpdate::LetterSpacing(spacing) => {
                if self.write_style("letter-spacing", &format_property_value(&spacing))? {
                    self.state.computed.typography.letter_spacing = spacing;
                }
            }
            TypographyUpdate::TextAlign(align) => {
                if self.write_style("text-align", align.as_css())? {
                    self.state.computed.typography.text_align = align;
                }
            }
            TypographyUpdate::VerticalAlign(align) => {
                let Some(el) = self.state.selected_element else {
                    return Ok(());
                };
                // Vertical alignment needs a flex box; keep inline-level
                // elements inline-level.
                let current = Display::parse(&self.dom.computed_style(el, "display"));
                let display = if current.is_inline_level() {
                    Display::InlineFlex
                } else {
                    Display::Flex
                };
                let align_items = align.to_align_items();
                self.write_style("display", display.as_css())?;
                self.write_style("align-items", align_items.as_css())?;

                let computed = &mut self.state.computed;
                computed.typography.text_vertical_align = align;
                computed.flex.display = display;
                computed.flex.align_items = align_items;
                if let Some(info) = self.state.element_info.as_mut() {
                    info.is_flex_container = true;
                }
            }
        }
        Ok(())
    }

    pub fn update_color_property(&mut self, key: ColorKey, value: ColorValue) -> DomResult<()> {
        if self.write_style(key.css_name(), &value.to_css())? {
            self.state.computed.colors.set(key, value);
        }
        Ok(())
    }

    pub fn update_padding_all(&mut self, value: CssValue) -> DomResult<()> {
        for key in SpacingKey::PADDING {
            self.update_spacing_property(key, value.clone())?;
        }
        Ok(())
    }

    pub fn update_margin_all(&mut self, value: CssValue) -> DomResult<()> {
        for key in SpacingKey::MARGIN {
            self.update_spacing_property(key, value.clone())?;
        }
        Ok(())
    }

    pub fn update_radius_all(&mut self, value: CssValue) -> DomResult<()> {
        for key in RadiusKey::ALL {
            self.update_border_radius_property(key, value.clone())?;
        }
        Ok(())
    }

    /// Apply one `property: value` declaration through the typed updates.
    ///
    /// `text-vertical-align` (`top`, `center`, `bottom`) stands in for the
    /// synthesized vertical alignment. Returns `false` for properties the
    /// panel does not edit, unreadable vertical alignments, or without a
    /// selection.
    pub fn apply_declaration(&mut self, property: &str, value: &str) -> DomResult<bool> {
        if self.state.selected_element.is_none() {
            return Ok(false);
        }
        let property = property.trim();
        let value = value.trim();

        if let Some(key) = SpacingKey::ALL.into_iter().find(|k| k.css_name() == property) {
            self.update_spacing_property(key, parse_property_value(value))?;
            return Ok(true);
        }
        if let Some(key) = RadiusKey::ALL.into_iter().find(|k| k.css_name() == property) {
            self.update_border_radius_property(key, parse_property_value(value))?;
            return Ok(true);
        }
        if let Some(key) = ColorKey::ALL.into_iter().find(|k| k.css_name() == property) {
            self.update_color_property(key, parse_color_value(value))?;
            return Ok(true);
        }

        match property {
            "padding" => self.update_padding_all(parse_property_value(value))?,
            "margin" => self.update_margin_all(parse_property_value(value))?,
            "border-radius" => self.update_radius_all(parse_property_value(value))?,
            "width" => self.update_sizing_property(SizingKey::Width, SizingValue::parse(value))?,
            "height" => self.update_sizing_property(SizingKey::Height, SizingValue::parse(value))?,
            "display" => self.update_flex_property(FlexUpdate::Display(Display::parse(value)))?,
            "flex-direction" => {
                self.update_flex_property(FlexUpdate::Direction(FlexDirection::parse(value)))?
            }
            "justify-content" => {
                self.update_flex_property(FlexUpdate::Justify(JustifyContent::parse(value)))?
            }
            "align-items" => self.update_flex_property(FlexUpdate::Align(AlignItems::parse(value)))?,
            "flex-wrap" => self.update_flex_property(FlexUpdate::Wrap(FlexWrap::parse(value)))?,
            "font-family" => {
                self.update_typography_property(TypographyUpdate::FontFamily(value.to_string()))?
            }
            "font-weight" => {
                self.update_typography_property(TypographyUpdate::FontWeight(value.to_string()))?
            }
            "font-size" => {
                self.update_typography_property(TypographyUpdate::FontSize(parse_property_value(value)))?
            }
            "line-height" => self
                .update_typography_property(TypographyUpdate::LineHeight(parse_property_value(value)))?,
            "letter-spacing" => self.update_typography_property(TypographyUpdate::LetterSpacing(
                parse_property_value(value),
            ))?,
            "text-align" => {
                self.update_typography_property(TypographyUpdate::TextAlign(TextAlign::parse(value)))?
            }
            "text-vertical-align" => match VerticalAlign::parse(value) {
                Some(align) => self.update_typography_property(TypographyUpdate::VerticalAlign(align))?,
                None => return Ok(false),
            },
            _ => {
                log::debug!("Ignoring unsupported property {}", property);
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Restore the inline style captured at selection and drop pending
    /// edits. Running it twice changes nothing the second time.
    pub fn reset_to_original(&mut self) -> DomResult<()> {
        let Some(el) = self.state.selected_element else {
            return Ok(());
        };
        for property in EDITABLE_PROPERTIES {
            self.dom.remove_inline_style(el, property)?;
        }
        for (property, value) in &self.state.original_styles {
            self.dom.set_inline_style(el, property, value)?;
        }
        self.state.pending_styles.clear();
        self.refresh_selection();
        log::debug!("Reset {} to its original styles", el);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Summary of the pending edits, if there are any.
    pub fn export_summary(&self) -> Option<ExportSummary> {
        if self.state.pending_styles.is_empty() {
            return None;
        }
        let info = self.state.element_info.as_ref()?;
        Some(ExportSummary::new(info, &self.state.pending_styles))
    }

    /// Tailwind classes for the pending edits (may be empty).
    pub fn tailwind(&self) -> String {
        styles_to_tailwind(&self.state.pending_styles)
    }

    /// Text of the export summary; `None` when there is nothing to export.
    pub fn export_text(&self) -> Option<String> {
        self.export_summary().map(|summary| summary.to_text())
    }

    /// Space-joined Tailwind classes; `None` without pending edits.
    pub fn tailwind_text(&self) -> Option<String> {
        if self.state.pending_styles.is_empty() {
            return None;
        }
        Some(self.tailwind())
    }

    /// Copy the export summary. `false` when there is nothing to export or
    /// the clipboard refused the write.
    pub fn export_edits(&self, clipboard: &mut dyn Clipboard) -> bool {
        let Some(text) = self.export_text() else {
            return false;
        };
        write_clipboard(clipboard, &text, "export")
    }

    /// Copy the space-joined Tailwind classes. `false` when there is nothing
    /// to copy or the clipboard refused the write.
    pub fn copy_as_tailwind(&self, clipboard: &mut dyn Clipboard) -> bool {
        let Some(text) = self.tailwind_text() else {
            return false;
        };
        write_clipboard(clipboard, &text, "Tailwind classes")
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    pub fn handle_key(&mut self, key: &KeyInput) -> KeyOutcome {
        if key.pressed && key.modifiers.is_primary() && key.key == self.config.toggle_key {
            return KeyOutcome::EditModeToggled(self.toggle_edit_mode());
        }
        if !self.state.is_edit_mode {
            return KeyOutcome::Ignored;
        }

        if key.is_escape() {
            return self.dismiss();
        }

        if self.config.measure_modifier.matches_key(&key.key) {
            return if key.pressed {
                self.start_measuring()
            } else if self.measurement.is_active() {
                self.measurement.deactivate();
                KeyOutcome::MeasurementStopped
            } else {
                KeyOutcome::Ignored
            };
        }
        KeyOutcome::Ignored
    }

    /// Escape: cancel drag, then measurement, then the panel, then edit
    /// mode. One level per press.
    fn dismiss(&mut self) -> KeyOutcome {
        if self.drag.is_dragging() {
            self.cancel_drag();
            KeyOutcome::DragCancelled
        } else if self.measurement.is_active() {
            self.measurement.deactivate();
            KeyOutcome::MeasurementStopped
        } else if self.state.is_open {
            self.close_panel();
            KeyOutcome::PanelClosed
        } else {
            self.set_edit_mode(false);
            KeyOutcome::EditModeExited
        }
    }

    fn start_measuring(&mut self) -> KeyOutcome {
        if self.state.selected_element.is_none() || self.drag.is_dragging() {
            return KeyOutcome::Ignored;
        }
        if self.measurement.is_active() {
            // Key repeat.
            return KeyOutcome::MeasurementStarted;
        }
        self.measurement.activate(self.pointer);
        KeyOutcome::MeasurementStarted
    }

    fn cancel_drag(&mut self) {
        if let Err(e) = self.drag.cancel(&mut self.dom) {
            log::warn!("Failed to restore dragged element: {}", e);
        }
    }

    // ------------------------------------------------------------------
    // Pointer and window events
    // ------------------------------------------------------------------

    /// Track the pointer. Returns a frame the host should request when
    /// measurement needs recomputing.
    pub fn pointer_moved(&mut self, point: Point, modifiers: Modifiers) -> Option<FrameRequest> {
        if !self.state.is_edit_mode {
            return None;
        }
        self.pointer = Some(point);

        if self.drag.is_dragging() {
            self.drag.update(&mut self.dom, point);
            return None;
        }

        self.state.hovered_element = element_under_pointer(&mut self.dom, point);

        // The modifier may have changed while focus was elsewhere.
        let held = modifiers.is_held(self.config.measure_modifier);
        if held && !self.measurement.is_active() && self.state.selected_element.is_some() {
            return self.measurement.activate(Some(point));
        }
        if !held && self.measurement.is_active() {
            self.measurement.deactivate();
            return None;
        }
        self.measurement.pointer_moved(point)
    }

    /// Click to select, or start a drag on the selection with the drag
    /// modifier held.
    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers) -> PointerOutcome {
        if !self.state.is_edit_mode || self.drag.is_dragging() {
            return PointerOutcome::Ignored;
        }
        self.pointer = Some(point);

        // Presses on interactive toolkit chrome belong to the chrome.
        if self.dom.element_from_point(point).is_some_and(|el| self.dom.is_overlay(el)) {
            return PointerOutcome::Ignored;
        }
        let Some(target) = element_under_pointer(&mut self.dom, point) else {
            return PointerOutcome::Ignored;
        };

        let selected = self.state.selected_element;
        if self
            .drag
            .can_start(&self.dom, target, selected, modifiers, self.config.drag_modifier)
        {
            if let Some(el) = selected {
                self.measurement.deactivate();
                match self.drag.start(&mut self.dom, el, point) {
                    Ok(()) => return PointerOutcome::DragStarted(el),
                    Err(e) => log::warn!("Failed to start drag: {}", e),
                }
            }
        }

        self.select_element(target);
        PointerOutcome::Selected(target)
    }

    /// Finish a drag, if one is running.
    pub fn pointer_up(&mut self, point: Point) -> Option<DragOutcome> {
        if !self.drag.is_dragging() {
            return None;
        }
        self.pointer = Some(point);
        self.drag.update(&mut self.dom, point);

        let mut moved = None;
        let outcome = match self.drag.commit(&mut self.dom, |el| moved = Some(el)) {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!("Failed to move element: {}", e);
                DragOutcome::Cancelled
            }
        };
        if moved.is_some() {
            self.refresh_selection();
        }
        Some(outcome)
    }

    /// Run a frame previously requested through a [`FrameRequest`].
    pub fn on_animation_frame(&mut self, handle: FrameHandle) -> bool {
        self.measurement
            .run_frame(&mut self.dom, handle, self.state.selected_element)
    }

    /// Run any pending frame immediately.
    pub fn flush_frame(&mut self) -> bool {
        self.measurement.flush(&mut self.dom, self.state.selected_element)
    }

    /// Scroll anywhere in the document (listened for in the capture phase).
    pub fn on_scroll(&mut self) -> Option<FrameRequest> {
        self.measurement.invalidate()
    }

    pub fn on_resize(&mut self) -> Option<FrameRequest> {
        self.measurement.invalidate()
    }

    /// The measured subtree changed.
    pub fn on_mutation(&mut self) -> Option<FrameRequest> {
        if let Some(el) = self.state.selected_element {
            if !self.dom.contains(el) {
                self.clear_selection();
                return None;
            }
        }
        self.measurement.invalidate()
    }

    /// Window lost focus. Returns a frame the host should cancel.
    pub fn on_blur(&mut self) -> Option<FrameHandle> {
        self.measurement.deactivate()
    }

    /// Tab visibility changed.
    pub fn on_visibility_change(&mut self, hidden: bool) -> Option<FrameHandle> {
        if hidden { self.measurement.deactivate() } else { None }
    }
}

fn write_clipboard(clipboard: &mut dyn Clipboard, text: &str, what: &str) -> bool {
    match clipboard.write_text(text) {
        Ok(()) => {
            log::info!("Copied {} to clipboard", what);
            true
        }
        Err(e) => {
            log::error!("Failed to copy {}: {}", what, e);
            false
        }
    }
}
