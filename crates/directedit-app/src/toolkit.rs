//! Toolkit shell: activation gate and event dispatch.
//!
//! A [`Toolkit`] wraps one [`DirectEditor`] together with the pieces that
//! live outside core logic: preference storage, the system clipboard, the
//! overlay renderer and the subscription tracker. When the configuration
//! gate is off the toolkit is inert and every event passes through.

use directedit_core::panel::PANEL_WIDTH;
use directedit_core::{
    Clipboard, DirectEditConfig, DirectEditor, DomError, DomHost, FrameHandle, FrameRequest,
    KeyInput, Modifiers, MouseButton, PanelPosition, PanelPrefs, PanelSection, PointerOutcome,
    PrefsStorage, SectionState,
};
use directedit_render::{
    OverlayTracker, RenderContext, Renderer, RendererError, Subscription, build_scene,
};
use kurbo::{Point, Size};
use thiserror::Error;

/// Toolkit errors.
#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("Direct Edit is not active")]
    Inactive,
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Render(#[from] RendererError),
}

/// Something the user did in the panel chrome.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    /// The panel was dragged to a new position.
    Move(PanelPosition),
    ToggleSection(PanelSection),
    /// A control changed one declaration.
    SetProperty { property: String, value: String },
    CopyTailwind,
    Export,
    Reset,
    Close,
}

impl PanelAction {
    /// Parse a `data-action` attribute value.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "copy-tailwind" => Some(PanelAction::CopyTailwind),
            "export" => Some(PanelAction::Export),
            "reset" => Some(PanelAction::Reset),
            "close" => Some(PanelAction::Close),
            _ => None,
        }
    }
}

/// Input from the host page.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolkitEvent {
    PointerMove {
        point: Point,
        modifiers: Modifiers,
    },
    PointerDown {
        point: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    PointerUp {
        point: Point,
    },
    Key(KeyInput),
    Scroll,
    Resize,
    Mutation,
    AnimationFrame(FrameHandle),
    Blur,
    VisibilityChange {
        hidden: bool,
    },
    Panel(PanelAction),
    /// An asynchronous clipboard write handed out in
    /// [`EventResponse::clipboard_write`] settled.
    ClipboardWritten {
        ok: bool,
    },
}

/// What the host must do after an event.
#[derive(Debug, Default)]
pub struct EventResponse {
    /// Stop the event from reaching the page.
    pub consumed: bool,
    /// Request an animation frame for this handle.
    pub request_frame: Option<FrameHandle>,
    /// Cancel a previously requested frame.
    pub cancel_frame: Option<FrameHandle>,
    pub subscriptions: Vec<Subscription>,
    /// Result of a clipboard action, if one ran to completion.
    pub copied: Option<bool>,
    /// Text the host must write to an asynchronous clipboard, then report
    /// back with [`ToolkitEvent::ClipboardWritten`].
    pub clipboard_write: Option<String>,
}

impl EventResponse {
    fn frame(&mut self, request: Option<FrameRequest>) {
        if let Some(request) = request {
            self.request_frame = Some(request.handle);
            self.cancel_frame = request.cancel;
        }
    }

    /// Defer a copy to the host; nothing to copy fails right away.
    fn defer_copy(&mut self, text: Option<String>) {
        match text {
            Some(text) => self.clipboard_write = Some(text),
            None => {
                log::warn!("Nothing to copy");
                self.copied = Some(false);
            }
        }
    }
}

struct Active<D: DomHost> {
    editor: DirectEditor<D>,
    panel_position: PanelPosition,
    sections: SectionState,
}

/// The Direct Edit toolkit mounted on one document.
pub struct Toolkit<D: DomHost, S: PrefsStorage, C: Clipboard, R: Renderer> {
    active: Option<Active<D>>,
    prefs: PanelPrefs<S>,
    clipboard: C,
    renderer: R,
    tracker: OverlayTracker,
}

impl<D: DomHost, S: PrefsStorage, C: Clipboard, R: Renderer> Toolkit<D, S, C, R> {
    /// Mount on a document. Inert unless `config.enabled`.
    pub fn new(dom: D, config: DirectEditConfig, storage: S, clipboard: C, renderer: R) -> Self {
        let prefs = PanelPrefs::new(storage, &config);
        let active = if config.enabled {
            let viewport = dom.viewport();
            let panel_position = prefs.position_in(viewport, Size::new(PANEL_WIDTH, 0.0));
            let sections = prefs.load_sections();
            log::info!("Direct Edit ready; press Ctrl/Cmd+{} to edit", config.toggle_key);
            Some(Active {
                editor: DirectEditor::new(dom, config),
                panel_position,
                sections,
            })
        } else {
            log::debug!("Direct Edit disabled");
            None
        };
        Self {
            active,
            prefs,
            clipboard,
            renderer,
            tracker: OverlayTracker::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The editor.
    ///
    /// # Panics
    ///
    /// Panics if the toolkit is inert. Use [`Toolkit::try_editor`] when the
    /// gate may be off.
    pub fn editor(&self) -> &DirectEditor<D> {
        match &self.active {
            Some(active) => &active.editor,
            None => panic!("Direct Edit toolkit is not active; check DirectEditConfig::enabled"),
        }
    }

    /// Mutable access to the editor.
    ///
    /// # Panics
    ///
    /// Panics if the toolkit is inert.
    pub fn editor_mut(&mut self) -> &mut DirectEditor<D> {
        match &mut self.active {
            Some(active) => &mut active.editor,
            None => panic!("Direct Edit toolkit is not active; check DirectEditConfig::enabled"),
        }
    }

    pub fn try_editor(&self) -> Result<&DirectEditor<D>, ToolkitError> {
        self.active
            .as_ref()
            .map(|a| &a.editor)
            .ok_or(ToolkitError::Inactive)
    }

    pub fn try_editor_mut(&mut self) -> Result<&mut DirectEditor<D>, ToolkitError> {
        self.active
            .as_mut()
            .map(|a| &mut a.editor)
            .ok_or(ToolkitError::Inactive)
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn prefs(&self) -> &PanelPrefs<S> {
        &self.prefs
    }

    pub fn panel_position(&self) -> Option<PanelPosition> {
        self.active.as_ref().map(|a| a.panel_position)
    }

    pub fn sections(&self) -> Option<SectionState> {
        self.active.as_ref().map(|a| a.sections)
    }

    /// Dispatch one event and redraw the overlays.
    pub fn handle_event(&mut self, event: ToolkitEvent) -> EventResponse {
        let mut response = EventResponse::default();
        let Some(active) = self.active.as_mut() else {
            return response;
        };
        let editor = &mut active.editor;

        match event {
            ToolkitEvent::PointerMove { point, modifiers } => {
                response.frame(editor.pointer_moved(point, modifiers));
            }
            ToolkitEvent::PointerDown {
                point,
                button,
                modifiers,
            } => {
                if button == MouseButton::Left {
                    let outcome = editor.pointer_down(point, modifiers);
                    response.consumed = outcome != PointerOutcome::Ignored;
                }
            }
            ToolkitEvent::PointerUp { point } => {
                response.consumed = editor.pointer_up(point).is_some();
            }
            ToolkitEvent::Key(key) => {
                response.consumed = editor.handle_key(&key).is_handled();
            }
            ToolkitEvent::Scroll => response.frame(editor.on_scroll()),
            ToolkitEvent::Resize => {
                response.frame(editor.on_resize());
                let viewport = editor.dom().viewport();
                active.panel_position = active
                    .panel_position
                    .clamp_to(viewport, Size::new(PANEL_WIDTH, 0.0));
            }
            ToolkitEvent::Mutation => response.frame(editor.on_mutation()),
            ToolkitEvent::AnimationFrame(handle) => {
                editor.on_animation_frame(handle);
            }
            ToolkitEvent::Blur => response.cancel_frame = editor.on_blur(),
            ToolkitEvent::VisibilityChange { hidden } => {
                response.cancel_frame = editor.on_visibility_change(hidden);
            }
            ToolkitEvent::ClipboardWritten { ok } => {
                if ok {
                    log::info!("Copied to clipboard");
                } else {
                    log::error!("Clipboard write was rejected");
                }
                response.copied = Some(ok);
            }
            ToolkitEvent::Panel(action) => {
                response.consumed = true;
                match action {
                    PanelAction::Move(position) => {
                        let viewport = editor.dom().viewport();
                        let position = position.clamp_to(viewport, Size::new(PANEL_WIDTH, 0.0));
                        active.panel_position = position;
                        self.prefs.save_position(position);
                    }
                    PanelAction::ToggleSection(section) => {
                        active.sections = self.prefs.toggle_section(section);
                    }
                    PanelAction::SetProperty { property, value } => {
                        if let Err(e) = editor.apply_declaration(&property, &value) {
                            log::warn!("Failed to set {}: {}", property, e);
                        }
                    }
                    PanelAction::CopyTailwind => {
                        if self.clipboard.is_async() {
                            response.defer_copy(editor.tailwind_text());
                        } else {
                            response.copied = Some(editor.copy_as_tailwind(&mut self.clipboard));
                        }
                    }
                    PanelAction::Export => {
                        if self.clipboard.is_async() {
                            response.defer_copy(editor.export_text());
                        } else {
                            response.copied = Some(editor.export_edits(&mut self.clipboard));
                        }
                    }
                    PanelAction::Reset => {
                        if let Err(e) = editor.reset_to_original() {
                            log::warn!("Failed to reset styles: {}", e);
                        }
                    }
                    PanelAction::Close => editor.close_panel(),
                }
            }
        }

        response.subscriptions = self.redraw();
        response
    }

    /// Re-render the overlays from the current state. Returns the
    /// subscription changes for the host.
    pub fn redraw(&mut self) -> Vec<Subscription> {
        let Some(active) = self.active.as_ref() else {
            return Vec::new();
        };
        let ctx = RenderContext::new(&active.editor).with_panel(active.panel_position, active.sections);
        if let Err(e) = self.renderer.render(&build_scene(&ctx)) {
            log::error!("Failed to render overlays: {}", e);
        }
        self.tracker.sync(&active.editor)
    }

    /// Tear down overlays and subscriptions.
    pub fn shutdown(&mut self) -> Vec<Subscription> {
        if let Some(active) = self.active.as_mut() {
            active.editor.set_edit_mode(false);
        }
        self.renderer.clear();
        self.tracker.cleanup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use directedit_core::{
        ClipboardError, CssValue, MemoryClipboard, MemoryDom, MemoryPrefs, SpacingKey,
        panel::PANEL_MARGIN,
    };
    use directedit_render::OverlayKind;
    use directedit_render::SvgRenderer;
    use kurbo::Rect;

    type TestToolkit = Toolkit<MemoryDom, MemoryPrefs, MemoryClipboard, SvgRenderer>;

    fn dom() -> MemoryDom {
        let mut dom = MemoryDom::new(Size::new(1280.0, 800.0));
        let root = dom.root();
        let card = dom.create_element(root, "div", Rect::new(100.0, 100.0, 300.0, 200.0));
        dom.set_id_attribute(card, "card");
        dom
    }

    fn toolkit(enabled: bool) -> TestToolkit {
        let mut config = DirectEditConfig::default();
        config.enabled = enabled;
        Toolkit::new(dom(), config, MemoryPrefs::new(), MemoryClipboard::new(), SvgRenderer::new())
    }

    fn key(key: &str, modifiers: Modifiers) -> ToolkitEvent {
        ToolkitEvent::Key(KeyInput::pressed(key, modifiers))
    }

    fn click(point: Point) -> ToolkitEvent {
        ToolkitEvent::PointerDown {
            point,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn test_inert_toolkit_passes_everything_through() {
        let mut toolkit = toolkit(false);
        assert!(!toolkit.is_active());
        let response = toolkit.handle_event(key(".", Modifiers::ctrl()));
        assert!(!response.consumed);
        assert!(response.subscriptions.is_empty());
        assert!(matches!(toolkit.try_editor(), Err(ToolkitError::Inactive)));
        assert!(toolkit.renderer().markup().is_empty());
    }

    #[test]
    #[should_panic(expected = "not active")]
    fn test_editor_panics_when_inert() {
        let toolkit = toolkit(false);
        toolkit.editor();
    }

    #[test]
    fn test_toggle_select_and_render() {
        let mut toolkit = toolkit(true);
        assert!(toolkit.handle_event(key(".", Modifiers::meta())).consumed);
        assert!(toolkit.editor().state().is_edit_mode);

        let response = toolkit.handle_event(click(Point::new(150.0, 150.0)));
        assert!(response.consumed);
        assert!(
            response
                .subscriptions
                .iter()
                .all(|s| matches!(s, Subscription::Subscribe(_)))
        );
        assert!(!response.subscriptions.is_empty());

        let markup = toolkit.renderer().markup();
        assert!(markup.contains(r#"data-direct-edit-overlay="selection""#));
        assert!(markup.contains(r#"data-direct-edit-overlay="panel""#));
        assert!(markup.contains("div#card"));
        assert_eq!(
            toolkit.panel_position(),
            Some(PanelPosition::new(1280.0 - PANEL_WIDTH - PANEL_MARGIN, PANEL_MARGIN))
        );
    }

    #[test]
    fn test_panel_actions() {
        let mut toolkit = toolkit(true);
        toolkit.handle_event(key(".", Modifiers::ctrl()));
        toolkit.handle_event(click(Point::new(150.0, 150.0)));

        let response = toolkit.handle_event(ToolkitEvent::Panel(PanelAction::CopyTailwind));
        assert_eq!(response.copied, Some(false));

        toolkit.handle_event(ToolkitEvent::Panel(PanelAction::SetProperty {
            property: "padding-top".to_string(),
            value: "24px".to_string(),
        }));
        assert_eq!(
            toolkit.editor().state().computed.spacing.get(SpacingKey::PaddingTop),
            &CssValue::px(24.0)
        );
        let response = toolkit.handle_event(ToolkitEvent::Panel(PanelAction::CopyTailwind));
        assert_eq!(response.copied, Some(true));
        assert_eq!(toolkit.clipboard().contents(), Some("pt-6"));

        toolkit.handle_event(ToolkitEvent::Panel(PanelAction::ToggleSection(PanelSection::Colors)));
        assert!(!toolkit.sections().unwrap().is_open(PanelSection::Colors));
        assert!(!toolkit.prefs().load_sections().is_open(PanelSection::Colors));

        toolkit.handle_event(ToolkitEvent::Panel(PanelAction::Move(PanelPosition::new(-50.0, 40.0))));
        assert_eq!(toolkit.panel_position(), Some(PanelPosition::new(0.0, 40.0)));
        assert_eq!(toolkit.prefs().load_position(), Some(PanelPosition::new(0.0, 40.0)));

        toolkit.handle_event(ToolkitEvent::Panel(PanelAction::Reset));
        assert!(toolkit.editor().state().pending_styles.is_empty());

        toolkit.handle_event(ToolkitEvent::Panel(PanelAction::Close));
        assert!(!toolkit.renderer().markup().contains("data-direct-edit-overlay=\"panel\""));
    }

    /// Clipboard that only accepts deferred writes.
    struct DeferredClipboard;

    impl Clipboard for DeferredClipboard {
        fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("writes are deferred".to_string()))
        }

        fn is_async(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_async_clipboard_reports_settled_result() {
        let mut config = DirectEditConfig::default();
        config.enabled = true;
        let mut toolkit = Toolkit::new(
            dom(),
            config,
            MemoryPrefs::new(),
            DeferredClipboard,
            SvgRenderer::new(),
        );
        toolkit.handle_event(key(".", Modifiers::ctrl()));
        toolkit.handle_event(click(Point::new(150.0, 150.0)));

        // Nothing pending fails without touching the clipboard.
        let response = toolkit.handle_event(ToolkitEvent::Panel(PanelAction::CopyTailwind));
        assert_eq!(response.copied, Some(false));
        assert!(response.clipboard_write.is_none());

        toolkit.handle_event(ToolkitEvent::Panel(PanelAction::SetProperty {
            property: "padding-top".to_string(),
            value: "24px".to_string(),
        }));
        let response = toolkit.handle_event(ToolkitEvent::Panel(PanelAction::CopyTailwind));
        assert_eq!(response.copied, None);
        assert_eq!(response.clipboard_write.as_deref(), Some("pt-6"));

        let response = toolkit.handle_event(ToolkitEvent::Panel(PanelAction::Export));
        assert_eq!(response.copied, None);
        assert!(response.clipboard_write.unwrap().contains("padding-top"));

        let response = toolkit.handle_event(ToolkitEvent::ClipboardWritten { ok: false });
        assert_eq!(response.copied, Some(false));
        let response = toolkit.handle_event(ToolkitEvent::ClipboardWritten { ok: true });
        assert_eq!(response.copied, Some(true));
    }

    #[test]
    fn test_pointer_move_leaves_panel_layer_untouched() {
        let mut toolkit = toolkit(true);
        toolkit.handle_event(key(".", Modifiers::ctrl()));
        toolkit.handle_event(click(Point::new(150.0, 150.0)));
        assert!(toolkit.renderer().changed_layers().contains(&OverlayKind::Panel));
        let panel = toolkit.renderer().layer_markup(OverlayKind::Panel).to_string();
        assert!(!panel.is_empty());

        for x in [20.0, 40.0, 160.0] {
            toolkit.handle_event(ToolkitEvent::PointerMove {
                point: Point::new(x, 50.0),
                modifiers: Modifiers::NONE,
            });
            assert!(!toolkit.renderer().changed_layers().contains(&OverlayKind::Panel));
            assert_eq!(toolkit.renderer().layer_markup(OverlayKind::Panel), panel);
        }

        toolkit.handle_event(ToolkitEvent::Panel(PanelAction::SetProperty {
            property: "padding-top".to_string(),
            value: "24px".to_string(),
        }));
        assert!(toolkit.renderer().changed_layers().contains(&OverlayKind::Panel));
    }

    #[test]
    fn test_mutation_and_visibility_route_to_editor() {
        let mut toolkit = toolkit(true);
        toolkit.handle_event(key(".", Modifiers::ctrl()));
        toolkit.handle_event(click(Point::new(150.0, 150.0)));
        let response = toolkit.handle_event(ToolkitEvent::PointerMove {
            point: Point::new(600.0, 400.0),
            modifiers: Modifiers::alt(),
        });
        let first = response.request_frame.unwrap();

        // A mutation while measuring supersedes the pending frame.
        let response = toolkit.handle_event(ToolkitEvent::Mutation);
        let second = response.request_frame.unwrap();
        assert_eq!(response.cancel_frame, Some(first));
        assert!(toolkit.editor().is_measuring());

        let response = toolkit.handle_event(ToolkitEvent::VisibilityChange { hidden: false });
        assert!(response.cancel_frame.is_none());
        assert!(toolkit.editor().is_measuring());

        let response = toolkit.handle_event(ToolkitEvent::VisibilityChange { hidden: true });
        assert_eq!(response.cancel_frame, Some(second));
        assert!(!toolkit.editor().is_measuring());
    }

    #[test]
    fn test_measurement_frames_round_trip_through_host() {
        let mut toolkit = toolkit(true);
        toolkit.handle_event(key(".", Modifiers::ctrl()));
        toolkit.handle_event(click(Point::new(150.0, 150.0)));

        let response = toolkit.handle_event(ToolkitEvent::PointerMove {
            point: Point::new(600.0, 400.0),
            modifiers: Modifiers::alt(),
        });
        let handle = response.request_frame.unwrap();
        toolkit.handle_event(ToolkitEvent::AnimationFrame(handle));
        assert!(!toolkit.editor().measurement_lines().is_empty());
        assert!(
            toolkit
                .renderer()
                .markup()
                .contains(r#"data-direct-edit-overlay="measurement""#)
        );

        let response = toolkit.handle_event(ToolkitEvent::Blur);
        assert!(response.cancel_frame.is_none());
        assert!(!toolkit.editor().is_measuring());
    }

    #[test]
    fn test_shutdown_cleans_up() {
        let mut toolkit = toolkit(true);
        toolkit.handle_event(key(".", Modifiers::ctrl()));
        toolkit.handle_event(click(Point::new(150.0, 150.0)));
        let commands = toolkit.shutdown();
        assert!(!commands.is_empty());
        assert!(commands.iter().all(|c| matches!(c, Subscription::Unsubscribe(_))));
        assert!(toolkit.renderer().markup().is_empty());
        assert!(!toolkit.editor().state().is_edit_mode);
    }
}
