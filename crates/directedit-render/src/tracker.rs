//! Keeps overlays glued to their elements.
//!
//! The tracker does not touch the page itself. It emits [`Subscription`]
//! commands that the host adapter turns into listeners and observers, and
//! the host calls back into the editor when one of them fires.

use directedit_core::{DirectEditor, DomHost, ElementId};

/// Something the host must listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// Document scroll, in the capture phase so nested scrollers count.
    Scroll,
    /// Window resize.
    Resize,
    /// `ResizeObserver` on one element.
    ResizeObserver(ElementId),
    /// Subtree `MutationObserver` on one element.
    MutationObserver(ElementId),
}

impl EventSource {
    /// Whether the listener must be registered in the capture phase.
    pub fn capture(self) -> bool {
        matches!(self, EventSource::Scroll)
    }
}

/// Command for the host adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscription {
    Subscribe(EventSource),
    Unsubscribe(EventSource),
}

#[derive(Debug, Default)]
pub struct OverlayTracker {
    targets: Vec<ElementId>,
    active: Vec<EventSource>,
}

impl OverlayTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[ElementId] {
        &self.targets
    }

    /// Sources currently subscribed.
    pub fn active(&self) -> &[EventSource] {
        &self.active
    }

    pub fn is_subscribed(&self, source: EventSource) -> bool {
        self.active.contains(&source)
    }

    /// Track a new set of elements.
    ///
    /// Any change tears down every subscription and subscribes afresh.
    /// An unchanged set produces no commands.
    pub fn set_targets(&mut self, targets: impl IntoIterator<Item = ElementId>) -> Vec<Subscription> {
        let mut next: Vec<ElementId> = Vec::new();
        for target in targets {
            if !next.contains(&target) {
                next.push(target);
            }
        }
        if next == self.targets {
            return Vec::new();
        }

        let mut commands = self.cleanup();
        self.targets = next;
        if self.targets.is_empty() {
            return commands;
        }

        self.active.push(EventSource::Scroll);
        self.active.push(EventSource::Resize);
        for &target in &self.targets {
            self.active.push(EventSource::ResizeObserver(target));
            self.active.push(EventSource::MutationObserver(target));
        }
        commands.extend(self.active.iter().copied().map(Subscription::Subscribe));
        log::debug!("Tracking {} overlay targets", self.targets.len());
        commands
    }

    /// Follow whatever the editor currently draws overlays for.
    pub fn sync<D: DomHost>(&mut self, editor: &DirectEditor<D>) -> Vec<Subscription> {
        let state = editor.state();
        let targets = state
            .selected_element
            .into_iter()
            .chain(state.hovered_element)
            .chain(editor.measurement_target())
            .filter(|&el| editor.dom().contains(el));
        self.set_targets(targets)
    }

    /// Unsubscribe everything.
    pub fn cleanup(&mut self) -> Vec<Subscription> {
        self.targets.clear();
        self.active.drain(..).map(Subscription::Unsubscribe).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use directedit_core::{DirectEditConfig, MemoryDom};
    use kurbo::{Rect, Size};

    #[test]
    fn test_subscribes_on_first_target() {
        let el = ElementId::new();
        let mut tracker = OverlayTracker::new();
        let commands = tracker.set_targets([el]);
        assert_eq!(
            commands,
            vec![
                Subscription::Subscribe(EventSource::Scroll),
                Subscription::Subscribe(EventSource::Resize),
                Subscription::Subscribe(EventSource::ResizeObserver(el)),
                Subscription::Subscribe(EventSource::MutationObserver(el)),
            ]
        );
        assert!(EventSource::Scroll.capture());
        assert!(!EventSource::Resize.capture());
    }

    #[test]
    fn test_target_change_resubscribes() {
        let a = ElementId::new();
        let b = ElementId::new();
        let mut tracker = OverlayTracker::new();
        tracker.set_targets([a]);

        // Same set, duplicates ignored.
        assert!(tracker.set_targets([a, a]).is_empty());

        let commands = tracker.set_targets([b]);
        let unsubscribed = commands
            .iter()
            .filter(|c| matches!(c, Subscription::Unsubscribe(_)))
            .count();
        assert_eq!(unsubscribed, 4);
        assert!(commands.contains(&Subscription::Unsubscribe(EventSource::ResizeObserver(a))));
        assert!(commands.contains(&Subscription::Subscribe(EventSource::ResizeObserver(b))));
        assert!(!tracker.is_subscribed(EventSource::MutationObserver(a)));
        assert!(tracker.is_subscribed(EventSource::MutationObserver(b)));
    }

    #[test]
    fn test_cleanup_unsubscribes_all() {
        let mut tracker = OverlayTracker::new();
        tracker.set_targets([ElementId::new(), ElementId::new()]);
        let commands = tracker.cleanup();
        assert_eq!(commands.len(), 6);
        assert!(commands.iter().all(|c| matches!(c, Subscription::Unsubscribe(_))));
        assert!(tracker.active().is_empty());
        assert!(tracker.cleanup().is_empty());
    }

    #[test]
    fn test_sync_follows_selection() {
        let mut dom = MemoryDom::new(Size::new(800.0, 600.0));
        let root = dom.root();
        let card = dom.create_element(root, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut editor = DirectEditor::new(dom, DirectEditConfig::default().enabled());
        editor.set_edit_mode(true);

        let mut tracker = OverlayTracker::new();
        assert!(tracker.sync(&editor).is_empty());

        editor.select_element(card);
        tracker.sync(&editor);
        assert_eq!(tracker.targets(), &[card]);

        editor.clear_selection();
        let commands = tracker.sync(&editor);
        assert!(commands.iter().all(|c| matches!(c, Subscription::Unsubscribe(_))));
        assert!(tracker.targets().is_empty());
    }
}
