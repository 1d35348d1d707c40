//! Browser adapter: a [`DomHost`] over `web-sys` and the event wiring that
//! drives the toolkit from page events.

use crate::clipboard::WebClipboard;
use crate::toolkit::{EventResponse, PanelAction, Toolkit, ToolkitEvent};
use directedit_core::{
    DirectEditConfig, DomError, DomHost, DomResult, ElementId, FrameHandle, KeyInput,
    LocalStoragePrefs, MemoryPrefs, Modifiers, MouseButton, OVERLAY_ATTRIBUTE, PanelPosition,
    PanelSection, PrefsStorage, StorageResult,
};
use directedit_render::{
    EventSource, OverlayKind, OverlayScene, RenderResult, Renderer, Subscription, SvgRenderer,
};
use kurbo::{Point, Rect, Size, Vec2};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, KeyboardEvent,
    MouseEvent, MutationObserver, MutationObserverInit, MutationRecord, ResizeObserver, Window,
};

/// Global holding an optional JSON configuration override.
const CONFIG_GLOBAL: &str = "DIRECT_EDIT_CONFIG";

fn host_error(e: JsValue) -> DomError {
    DomError::Host(format!("{:?}", e))
}

fn overlay_selector() -> String {
    format!("[{}]", OVERLAY_ATTRIBUTE)
}

struct Registry {
    /// Element -> handle key; weak so detached nodes can be collected.
    keys: js_sys::WeakMap,
    by_key: HashMap<String, ElementId>,
    elements: HashMap<ElementId, Element>,
}

/// [`DomHost`] over the live document.
///
/// Elements get a stable [`ElementId`] the first time the toolkit sees them.
pub struct WebDom {
    window: Window,
    document: Document,
    registry: RefCell<Registry>,
}

impl WebDom {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        Ok(Self {
            window,
            document,
            registry: RefCell::new(Registry {
                keys: js_sys::WeakMap::new(),
                by_key: HashMap::new(),
                elements: HashMap::new(),
            }),
        })
    }

    /// Handle for an element, registering it if needed.
    pub fn handle(&self, element: Element) -> ElementId {
        let mut registry = self.registry.borrow_mut();
        if let Some(key) = registry.keys.get(&element).as_string() {
            if let Some(id) = registry.by_key.get(&key) {
                return *id;
            }
        }
        let id = ElementId::new();
        let key = id.to_string();
        registry.keys.set(&element, &JsValue::from_str(&key));
        registry.by_key.insert(key, id);
        registry.elements.insert(id, element);
        id
    }

    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.registry.borrow().elements.get(&id).cloned()
    }

    fn html_element(&self, id: ElementId) -> DomResult<HtmlElement> {
        self.element(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or(DomError::UnknownElement(id))
    }

    /// Forget elements that have left the document.
    pub fn prune(&self) {
        let mut registry = self.registry.borrow_mut();
        let detached: Vec<ElementId> = registry
            .elements
            .iter()
            .filter(|(_, el)| !el.is_connected())
            .map(|(id, _)| *id)
            .collect();
        for id in detached {
            if let Some(el) = registry.elements.remove(&id) {
                registry.keys.delete(&el);
            }
            registry.by_key.remove(&id.to_string());
        }
    }
}

impl DomHost for WebDom {
    fn contains(&self, el: ElementId) -> bool {
        self.element(el).is_some_and(|e| e.is_connected())
    }

    fn tag_name(&self, el: ElementId) -> String {
        self.element(el)
            .map(|e| e.tag_name().to_lowercase())
            .unwrap_or_default()
    }

    fn element_id(&self, el: ElementId) -> Option<String> {
        let id = self.element(el)?.id();
        (!id.is_empty()).then_some(id)
    }

    fn class_list(&self, el: ElementId) -> Vec<String> {
        let Some(element) = self.element(el) else {
            return Vec::new();
        };
        let list = element.class_list();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        let parent = self.element(el)?.parent_element()?;
        Some(self.handle(parent))
    }

    fn children(&self, el: ElementId) -> Vec<ElementId> {
        let Some(element) = self.element(el) else {
            return Vec::new();
        };
        let children = element.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|child| self.handle(child))
            .collect()
    }

    fn text_content(&self, el: ElementId) -> String {
        self.element(el)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn computed_style(&self, el: ElementId, property: &str) -> String {
        self.element(el)
            .and_then(|e| self.window.get_computed_style(&e).ok().flatten())
            .and_then(|style| style.get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn inline_style(&self, el: ElementId, property: &str) -> Option<String> {
        let element = self.html_element(el).ok()?;
        element
            .style()
            .get_property_value(property)
            .ok()
            .filter(|value| !value.is_empty())
    }

    fn set_inline_style(&mut self, el: ElementId, property: &str, value: &str) -> DomResult<()> {
        self.html_element(el)?
            .style()
            .set_property(property, value)
            .map_err(host_error)
    }

    fn remove_inline_style(&mut self, el: ElementId, property: &str) -> DomResult<()> {
        self.html_element(el)?
            .style()
            .remove_property(property)
            .map(|_| ())
            .map_err(host_error)
    }

    fn bounding_rect(&self, el: ElementId) -> Rect {
        match self.element(el) {
            Some(element) => {
                let r = element.get_bounding_client_rect();
                Rect::new(r.left(), r.top(), r.right(), r.bottom())
            }
            None => Rect::ZERO,
        }
    }

    fn elements_from_point(&self, point: Point) -> Vec<ElementId> {
        self.document
            .elements_from_point(point.x as f32, point.y as f32)
            .iter()
            .filter_map(|value| value.dyn_into::<Element>().ok())
            .map(|element| self.handle(element))
            .collect()
    }

    fn is_overlay(&self, el: ElementId) -> bool {
        self.element(el)
            .and_then(|e| e.closest(&overlay_selector()).ok().flatten())
            .is_some()
    }

    fn set_overlays_hit_testable(&mut self, enabled: bool) {
        let Ok(nodes) = self.document.query_selector_all(&overlay_selector()) else {
            return;
        };
        for i in 0..nodes.length() {
            let Some(node) = nodes.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            // Only the panel takes pointer input; the other layers never do.
            let is_panel = node.get_attribute(OVERLAY_ATTRIBUTE).as_deref() == Some("panel");
            let value = if enabled && is_panel { "auto" } else { "none" };
            if let Err(e) = node.style().set_property("pointer-events", value) {
                log::warn!("Failed to toggle overlay hit-testing: {:?}", e);
            }
        }
    }

    fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> DomResult<()> {
        let parent_el = self.element(parent).ok_or(DomError::UnknownElement(parent))?;
        let child_el = self.element(child).ok_or(DomError::UnknownElement(child))?;
        let reference_el = match reference {
            Some(r) => Some(self.element(r).ok_or(DomError::UnknownElement(r))?),
            None => None,
        };
        parent_el
            .insert_before(&child_el, reference_el.as_deref())
            .map(|_| ())
            .map_err(host_error)
    }

    fn viewport(&self) -> Size {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64());
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64());
        Size::new(width.unwrap_or(0.0), height.unwrap_or(0.0))
    }
}

/// Panel preferences in `localStorage`, or in memory when it is blocked.
pub enum WebPrefs {
    Local(LocalStoragePrefs),
    Memory(MemoryPrefs),
}

impl WebPrefs {
    fn open() -> Self {
        match LocalStoragePrefs::new() {
            Ok(prefs) => WebPrefs::Local(prefs),
            Err(e) => {
                log::warn!("Panel preferences will not persist: {}", e);
                WebPrefs::Memory(MemoryPrefs::new())
            }
        }
    }
}

impl PrefsStorage for WebPrefs {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match self {
            WebPrefs::Local(s) => s.get(key),
            WebPrefs::Memory(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        match self {
            WebPrefs::Local(s) => s.set(key, value),
            WebPrefs::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match self {
            WebPrefs::Local(s) => s.remove(key),
            WebPrefs::Memory(s) => s.remove(key),
        }
    }
}

/// [`SvgRenderer`] whose markup is mounted into the page.
///
/// Each overlay band gets its own `display:contents` root; only bands whose
/// markup changed are rewritten. The panel is left alone while one of its
/// inputs has focus and refreshed on the first frame after it loses focus.
pub struct MountedRenderer {
    inner: SvgRenderer,
    document: Document,
    container: Element,
    roots: HashMap<OverlayKind, Element>,
    panel_stale: bool,
}

impl MountedRenderer {
    fn new(document: &Document) -> Result<Self, JsValue> {
        let container = document.create_element("div")?;
        container.set_id("direct-edit-root");
        container.set_attribute("style", "display:contents")?;
        let mut roots = HashMap::new();
        for kind in OverlayKind::ALL {
            let root = document.create_element("div")?;
            root.set_attribute("style", "display:contents")?;
            root.set_attribute("data-direct-edit-root", kind.name())?;
            container.append_child(&root)?;
            roots.insert(kind, root);
        }
        document
            .body()
            .ok_or("No body")?
            .append_child(&container)?;
        Ok(Self {
            inner: SvgRenderer::new(),
            document: document.clone(),
            container,
            roots,
            panel_stale: false,
        })
    }

    fn unmount(&self) {
        self.container.remove();
    }

    /// Whether an input inside the mounted panel has focus.
    fn panel_has_focus(&self) -> bool {
        let Some(root) = self.roots.get(&OverlayKind::Panel) else {
            return false;
        };
        match self.document.active_element() {
            Some(active) => {
                let node: &web_sys::Node = active.as_ref();
                active.dyn_ref::<HtmlInputElement>().is_some() && root.contains(Some(node))
            }
            None => false,
        }
    }

    fn write_root(&self, kind: OverlayKind) {
        if let Some(root) = self.roots.get(&kind) {
            root.set_inner_html(self.inner.layer_markup(kind));
        }
    }
}

impl Renderer for MountedRenderer {
    fn render(&mut self, scene: &OverlayScene) -> RenderResult<()> {
        self.inner.render(scene)?;
        let mut panel_due = self.panel_stale;
        for &kind in self.inner.changed_layers() {
            if kind == OverlayKind::Panel {
                panel_due = true;
            } else {
                self.write_root(kind);
            }
        }
        if panel_due {
            if self.panel_has_focus() {
                self.panel_stale = true;
            } else {
                self.write_root(OverlayKind::Panel);
                self.panel_stale = false;
            }
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.inner.clear();
        for root in self.roots.values() {
            root.set_inner_html("");
        }
        self.panel_stale = false;
    }
}

type WebToolkit = Toolkit<WebDom, WebPrefs, WebClipboard, MountedRenderer>;

/// An event listener removed from its target on drop.
struct EventListener {
    target: EventTarget,
    name: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    fn add(
        target: &EventTarget,
        name: &'static str,
        capture: bool,
        shell: &Weak<RefCell<Shell>>,
        handler: fn(&Rc<RefCell<Shell>>, &Event),
    ) -> Result<Self, JsValue> {
        let shell = shell.clone();
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(shell) = shell.upgrade() {
                handler(&shell, &event);
            }
        });
        target.add_event_listener_with_callback_and_bool(
            name,
            callback.as_ref().unchecked_ref(),
            capture,
        )?;
        Ok(Self {
            target: target.clone(),
            name,
            capture,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.name,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        );
    }
}

/// A live subscription requested by the overlay tracker.
enum Subscribed {
    Listener(EventListener),
    Resize {
        observer: ResizeObserver,
        _callback: Closure<dyn FnMut(js_sys::Array)>,
    },
    Mutation {
        observer: MutationObserver,
        _callback: Closure<dyn FnMut(js_sys::Array)>,
    },
}

impl Drop for Subscribed {
    fn drop(&mut self) {
        match self {
            Subscribed::Listener(_) => {}
            Subscribed::Resize { observer, .. } => observer.disconnect(),
            Subscribed::Mutation { observer, .. } => observer.disconnect(),
        }
    }
}

struct Shell {
    toolkit: WebToolkit,
    window: Window,
    document: Document,
    /// Pending animation frames by toolkit handle.
    frames: HashMap<FrameHandle, i32>,
    subscriptions: HashMap<EventSource, Subscribed>,
    /// Pointer offset from the panel origin while the header is dragged.
    panel_drag: Option<Vec2>,
    /// Swallow the click that follows a consumed pointerdown.
    swallow_click: bool,
}

impl Shell {
    fn apply(&mut self, weak: &Weak<RefCell<Shell>>, response: EventResponse) -> bool {
        if let Some(handle) = response.cancel_frame {
            if let Some(id) = self.frames.remove(&handle) {
                let _ = self.window.cancel_animation_frame(id);
            }
        }
        if let Some(handle) = response.request_frame {
            self.request_frame(weak, handle);
        }
        for subscription in response.subscriptions {
            match subscription {
                Subscription::Subscribe(source) => match self.subscribe(weak, source) {
                    Ok(subscribed) => {
                        self.subscriptions.insert(source, subscribed);
                    }
                    Err(e) => log::error!("Failed to subscribe to {:?}: {:?}", source, e),
                },
                Subscription::Unsubscribe(source) => {
                    self.subscriptions.remove(&source);
                }
            }
        }
        if let Some(text) = response.clipboard_write {
            let weak = weak.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ok = match WebClipboard::write(text).await {
                    Ok(()) => true,
                    Err(e) => {
                        log::error!("{}", e);
                        false
                    }
                };
                if let Some(shell) = weak.upgrade() {
                    dispatch(&shell, ToolkitEvent::ClipboardWritten { ok });
                }
            });
        }
        response.consumed
    }

    fn request_frame(&mut self, weak: &Weak<RefCell<Shell>>, handle: FrameHandle) {
        let weak = weak.clone();
        let callback = Closure::once_into_js(move || {
            if let Some(shell) = weak.upgrade() {
                dispatch(&shell, ToolkitEvent::AnimationFrame(handle));
            }
        });
        match self.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(id) => {
                self.frames.insert(handle, id);
            }
            Err(e) => log::error!("Failed to request animation frame: {:?}", e),
        }
    }

    fn subscribe(&self, weak: &Weak<RefCell<Shell>>, source: EventSource) -> Result<Subscribed, JsValue> {
        let capture = source.capture();
        match source {
            EventSource::Scroll => {
                let listener = EventListener::add(&self.document, "scroll", capture, weak, |shell, _| {
                    dispatch(shell, ToolkitEvent::Scroll);
                })?;
                Ok(Subscribed::Listener(listener))
            }
            EventSource::Resize => {
                let listener = EventListener::add(&self.window, "resize", capture, weak, |shell, _| {
                    dispatch(shell, ToolkitEvent::Resize);
                })?;
                Ok(Subscribed::Listener(listener))
            }
            EventSource::ResizeObserver(id) => {
                let element = self.tracked_element(id)?;
                let weak = weak.clone();
                let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| {
                    if let Some(shell) = weak.upgrade() {
                        dispatch(&shell, ToolkitEvent::Mutation);
                    }
                });
                let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
                observer.observe(&element);
                Ok(Subscribed::Resize {
                    observer,
                    _callback: callback,
                })
            }
            EventSource::MutationObserver(id) => {
                let element = self.tracked_element(id)?;
                let weak = weak.clone();
                let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |records: js_sys::Array| {
                    if !touches_page(&records) {
                        return;
                    }
                    if let Some(shell) = weak.upgrade() {
                        dispatch(&shell, ToolkitEvent::Mutation);
                    }
                });
                let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
                let init = MutationObserverInit::new();
                init.set_attributes(true);
                init.set_child_list(true);
                init.set_subtree(true);
                init.set_character_data(true);
                observer.observe_with_options(&element, &init)?;
                Ok(Subscribed::Mutation {
                    observer,
                    _callback: callback,
                })
            }
        }
    }

    fn tracked_element(&self, id: ElementId) -> Result<Element, JsValue> {
        self.toolkit
            .try_editor()
            .ok()
            .and_then(|editor| editor.dom().element(id))
            .ok_or_else(|| JsValue::from_str("Tracked element is gone"))
    }
}

/// Overlay redraws must not count as page mutations.
fn touches_page(records: &js_sys::Array) -> bool {
    let selector = overlay_selector();
    records.iter().any(|record| {
        let Some(target) = record
            .dyn_into::<MutationRecord>()
            .ok()
            .and_then(|r| r.target())
        else {
            return false;
        };
        let element = match target.dyn_into::<Element>() {
            Ok(element) => Some(element),
            Err(node) => node.parent_element(),
        };
        element.is_some_and(|el| el.closest(&selector).ok().flatten().is_none())
    })
}

fn dispatch(shell: &Rc<RefCell<Shell>>, event: ToolkitEvent) -> bool {
    let Ok(mut guard) = shell.try_borrow_mut() else {
        log::warn!("Dropped re-entrant {:?}", event);
        return false;
    };
    match &event {
        ToolkitEvent::AnimationFrame(handle) => {
            guard.frames.remove(handle);
        }
        ToolkitEvent::Mutation => {
            if let Ok(editor) = guard.toolkit.try_editor() {
                editor.dom().prune();
            }
        }
        _ => {}
    }
    let response = guard.toolkit.handle_event(event);
    guard.apply(&Rc::downgrade(shell), response)
}

fn target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

fn in_overlay(event: &Event) -> bool {
    target_element(event).is_some_and(|el| closest(&el, &overlay_selector()).is_some())
}

fn mouse_point(event: &MouseEvent) -> Point {
    Point::new(event.client_x() as f64, event.client_y() as f64)
}

fn mouse_modifiers(event: &MouseEvent) -> Modifiers {
    Modifiers {
        shift: event.shift_key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        meta: event.meta_key(),
    }
}

fn swallow(event: &Event) {
    event.prevent_default();
    event.stop_propagation();
}

fn on_pointer_move(shell: &Rc<RefCell<Shell>>, event: &Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let point = mouse_point(mouse);
    let drag = shell.try_borrow().ok().and_then(|s| s.panel_drag);
    match drag {
        Some(offset) => {
            let origin = point - offset;
            dispatch(shell, ToolkitEvent::Panel(PanelAction::Move(PanelPosition::new(origin.x, origin.y))));
        }
        None => {
            dispatch(
                shell,
                ToolkitEvent::PointerMove {
                    point,
                    modifiers: mouse_modifiers(mouse),
                },
            );
        }
    }
}

fn on_pointer_down(shell: &Rc<RefCell<Shell>>, event: &Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let point = mouse_point(mouse);
    let on_handle = target_element(event).is_some_and(|el| closest(&el, "[data-drag-handle]").is_some());
    if on_handle {
        if let Ok(mut s) = shell.try_borrow_mut() {
            if let Some(position) = s.toolkit.panel_position() {
                s.panel_drag = Some(point - position.to_point());
                swallow(event);
            }
        }
        return;
    }

    let button = match mouse.button() {
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::Left,
    };
    let consumed = dispatch(
        shell,
        ToolkitEvent::PointerDown {
            point,
            button,
            modifiers: mouse_modifiers(mouse),
        },
    );
    if consumed {
        swallow(event);
        if let Ok(mut s) = shell.try_borrow_mut() {
            s.swallow_click = true;
        }
    }
}

fn on_pointer_up(shell: &Rc<RefCell<Shell>>, event: &Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let dragging_panel = shell
        .try_borrow_mut()
        .ok()
        .and_then(|mut s| s.panel_drag.take())
        .is_some();
    if dragging_panel {
        return;
    }
    if dispatch(shell, ToolkitEvent::PointerUp { point: mouse_point(mouse) }) {
        swallow(event);
    }
}

fn on_click(shell: &Rc<RefCell<Shell>>, event: &Event) {
    let swallowed = shell
        .try_borrow_mut()
        .map(|mut s| std::mem::take(&mut s.swallow_click))
        .unwrap_or(false);
    if swallowed {
        swallow(event);
        return;
    }
    let Some(target) = target_element(event) else {
        return;
    };
    if let Some(button) = closest(&target, "[data-action]") {
        let action = button
            .get_attribute("data-action")
            .and_then(|name| PanelAction::from_name(&name));
        if let Some(action) = action {
            dispatch(shell, ToolkitEvent::Panel(action));
            swallow(event);
        }
    } else if let Some(header) = closest(&target, "[data-toggle-section]") {
        let section = header
            .get_attribute("data-toggle-section")
            .and_then(|name| serde_json::from_value::<PanelSection>(serde_json::Value::String(name)).ok());
        if let Some(section) = section {
            dispatch(shell, ToolkitEvent::Panel(PanelAction::ToggleSection(section)));
            swallow(event);
        }
    }
}

fn on_change(shell: &Rc<RefCell<Shell>>, event: &Event) {
    let Some(input) = event
        .target()
        .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
    else {
        return;
    };
    if let Some(property) = input.get_attribute("data-property") {
        dispatch(
            shell,
            ToolkitEvent::Panel(PanelAction::SetProperty {
                property,
                value: input.value(),
            }),
        );
    }
}

fn on_key(shell: &Rc<RefCell<Shell>>, event: &Event) {
    let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
        return;
    };
    // Typing into a panel field is not a shortcut.
    if in_overlay(event) && key.key() != "Escape" {
        return;
    }
    let input = KeyInput {
        key: key.key(),
        modifiers: Modifiers {
            shift: key.shift_key(),
            ctrl: key.ctrl_key(),
            alt: key.alt_key(),
            meta: key.meta_key(),
        },
        pressed: event.type_() == "keydown",
    };
    if dispatch(shell, ToolkitEvent::Key(input)) {
        event.prevent_default();
    }
}

fn on_blur(shell: &Rc<RefCell<Shell>>, _event: &Event) {
    dispatch(shell, ToolkitEvent::Blur);
}

fn on_visibility_change(shell: &Rc<RefCell<Shell>>, _event: &Event) {
    let hidden = match shell.try_borrow() {
        Ok(s) => s.document.hidden(),
        Err(_) => return,
    };
    dispatch(shell, ToolkitEvent::VisibilityChange { hidden });
}

struct Mounted {
    shell: Rc<RefCell<Shell>>,
    _listeners: Vec<EventListener>,
}

thread_local! {
    static MOUNTED: RefCell<Option<Mounted>> = const { RefCell::new(None) };
}

/// Configuration from `window.DIRECT_EDIT_CONFIG`, as a JSON string or object.
fn page_config(window: &Window) -> DirectEditConfig {
    let Ok(value) = js_sys::Reflect::get(window, &JsValue::from_str(CONFIG_GLOBAL)) else {
        return DirectEditConfig::default();
    };
    if value.is_undefined() || value.is_null() {
        return DirectEditConfig::default();
    }
    let json = value
        .as_string()
        .or_else(|| js_sys::JSON::stringify(&value).ok().and_then(|s| s.as_string()));
    match json.map(|json| DirectEditConfig::from_json(&json)) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            log::warn!("Ignoring invalid {}: {}", CONFIG_GLOBAL, e);
            DirectEditConfig::default()
        }
        None => DirectEditConfig::default(),
    }
}

fn mount(config: DirectEditConfig) -> Result<(), JsValue> {
    if !config.enabled {
        log::debug!("Direct Edit disabled");
        return Ok(());
    }
    if MOUNTED.with(|m| m.borrow().is_some()) {
        log::warn!("Direct Edit is already mounted");
        return Ok(());
    }

    let dom = WebDom::new()?;
    let window = dom.window.clone();
    let document = dom.document.clone();
    let renderer = MountedRenderer::new(&document)?;
    let toolkit = Toolkit::new(dom, config, WebPrefs::open(), WebClipboard, renderer);

    let shell = Rc::new(RefCell::new(Shell {
        toolkit,
        window: window.clone(),
        document: document.clone(),
        frames: HashMap::new(),
        subscriptions: HashMap::new(),
        panel_drag: None,
        swallow_click: false,
    }));
    let weak = Rc::downgrade(&shell);

    let listeners = vec![
        EventListener::add(&document, "pointermove", false, &weak, on_pointer_move)?,
        EventListener::add(&document, "pointerdown", true, &weak, on_pointer_down)?,
        EventListener::add(&document, "pointerup", true, &weak, on_pointer_up)?,
        EventListener::add(&document, "click", true, &weak, on_click)?,
        EventListener::add(&document, "change", true, &weak, on_change)?,
        EventListener::add(&window, "keydown", false, &weak, on_key)?,
        EventListener::add(&window, "keyup", false, &weak, on_key)?,
        EventListener::add(&window, "blur", false, &weak, on_blur)?,
        EventListener::add(&document, "visibilitychange", false, &weak, on_visibility_change)?,
    ];

    MOUNTED.with(|m| {
        *m.borrow_mut() = Some(Mounted {
            shell,
            _listeners: listeners,
        })
    });
    Ok(())
}

/// Mount with an explicit JSON configuration.
#[wasm_bindgen(js_name = mountDirectEdit)]
pub fn mount_direct_edit(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(json) => DirectEditConfig::from_json(&json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?,
        None => DirectEditConfig::default().enabled(),
    };
    mount(config)
}

/// Remove overlays and every listener.
#[wasm_bindgen(js_name = unmountDirectEdit)]
pub fn unmount_direct_edit() {
    let Some(mounted) = MOUNTED.with(|m| m.borrow_mut().take()) else {
        return;
    };
    if let Ok(mut shell) = mounted.shell.try_borrow_mut() {
        shell.toolkit.shutdown();
        shell.toolkit.renderer().unmount();
        shell.subscriptions.clear();
        let frames: Vec<i32> = shell.frames.drain().map(|(_, id)| id).collect();
        for id in frames {
            let _ = shell.window.cancel_animation_frame(id);
        }
    }
    log::info!("Direct Edit unmounted");
}

#[wasm_bindgen(start)]
pub fn run_wasm() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialised: {}", e).into());
    }
    let window = web_sys::window().ok_or("No window")?;
    mount(page_config(&window))
}
