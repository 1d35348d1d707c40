//! Distance measurement between boxes.
//!
//! Lines are transient: they are recomputed from live bounding rects on every
//! frame while measuring and never stored past the current render.

use crate::dom::{DomHost, ElementId, element_under_pointer};
use crate::scheduler::{FrameHandle, FrameRequest, FrameScheduler};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Width of one label digit in px.
pub const LABEL_DIGIT_WIDTH: f64 = 7.0;
/// Horizontal padding of a label in px.
pub const LABEL_PADDING: f64 = 8.0;
pub const LABEL_HEIGHT: f64 = 16.0;
/// Gap between a line and its label.
pub const LABEL_OFFSET: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDirection {
    Horizontal,
    Vertical,
}

/// A measured distance, drawn as a line with a numeric label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub distance: f64,
    pub direction: LineDirection,
    /// Center of the label.
    pub label_position: Point,
}

impl MeasurementLine {
    /// Horizontal line at `y` spanning `from..to`.
    pub fn horizontal(y: f64, from: f64, to: f64) -> Self {
        let (x1, x2) = (from.min(to), from.max(to));
        let distance = x2 - x1;
        let size = label_size(distance);
        Self {
            x1,
            y1: y,
            x2,
            y2: y,
            distance,
            direction: LineDirection::Horizontal,
            label_position: Point::new((x1 + x2) / 2.0, y - LABEL_OFFSET - size.height / 2.0),
        }
    }

    /// Vertical line at `x` spanning `from..to`.
    pub fn vertical(x: f64, from: f64, to: f64) -> Self {
        let (y1, y2) = (from.min(to), from.max(to));
        let distance = y2 - y1;
        let size = label_size(distance);
        Self {
            x1: x,
            y1,
            x2: x,
            y2,
            distance,
            direction: LineDirection::Vertical,
            label_position: Point::new(x + LABEL_OFFSET + size.width / 2.0, (y1 + y2) / 2.0),
        }
    }

    /// Label text: the distance in whole pixels.
    pub fn label(&self) -> String {
        format!("{}", self.distance.round() as i64)
    }

    pub fn label_size(&self) -> Size {
        label_size(self.distance)
    }

    pub fn label_rect(&self) -> Rect {
        Rect::from_center_size(self.label_position, self.label_size())
    }

    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }
}

/// Label box for a distance: 7px per digit plus 8px padding.
pub fn label_size(distance: f64) -> Size {
    let digits = (distance.round() as i64).to_string().len() as f64;
    Size::new(digits * LABEL_DIGIT_WIDTH + LABEL_PADDING, LABEL_HEIGHT)
}

/// Distances from `child` to each edge of `parent`.
///
/// Lines run from the middle of each child edge. Non-positive distances
/// produce no line.
pub fn measure_to_parent(child: Rect, parent: Rect) -> Vec<MeasurementLine> {
    let center = child.center();
    let mut lines = Vec::with_capacity(4);

    if child.y0 - parent.y0 > 0.0 {
        lines.push(MeasurementLine::vertical(center.x, parent.y0, child.y0));
    }
    if parent.x1 - child.x1 > 0.0 {
        lines.push(MeasurementLine::horizontal(center.y, child.x1, parent.x1));
    }
    if parent.y1 - child.y1 > 0.0 {
        lines.push(MeasurementLine::vertical(center.x, child.y1, parent.y1));
    }
    if child.x0 - parent.x0 > 0.0 {
        lines.push(MeasurementLine::horizontal(center.y, parent.x0, child.x0));
    }
    lines
}

fn contains_rect(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

/// Midpoint of the overlap of two intervals, or of the first interval.
fn shared_mid(a: (f64, f64), b: (f64, f64)) -> f64 {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    if lo <= hi { (lo + hi) / 2.0 } else { (a.0 + a.1) / 2.0 }
}

/// Gaps between two boxes.
///
/// When one box contains the other this measures the inner box against the
/// outer one. Otherwise each axis yields a line only if the boxes are
/// separated along it.
pub fn measure_between(selected: Rect, target: Rect) -> Vec<MeasurementLine> {
    if contains_rect(target, selected) {
        return measure_to_parent(selected, target);
    }
    if contains_rect(selected, target) {
        return measure_to_parent(target, selected);
    }

    let mut lines = Vec::with_capacity(2);

    let y = shared_mid((selected.y0, selected.y1), (target.y0, target.y1));
    if selected.x1 < target.x0 {
        lines.push(MeasurementLine::horizontal(y, selected.x1, target.x0));
    } else if target.x1 < selected.x0 {
        lines.push(MeasurementLine::horizontal(y, target.x1, selected.x0));
    }

    let x = shared_mid((selected.x0, selected.x1), (target.x0, target.x1));
    if selected.y1 < target.y0 {
        lines.push(MeasurementLine::vertical(x, selected.y1, target.y0));
    } else if target.y1 < selected.y0 {
        lines.push(MeasurementLine::vertical(x, target.y1, selected.y0));
    }

    lines
}

/// Live measurement while the measure modifier is held.
///
/// Pointer moves are coalesced to one recompute per frame. Scroll, resize
/// and mutation mark the lines stale and request a frame at the last known
/// pointer position.
#[derive(Debug, Default)]
pub struct MeasurementSession {
    active: bool,
    frames: FrameScheduler<Point>,
    pointer: Option<Point>,
    target: Option<ElementId>,
    lines: Vec<MeasurementLine>,
}

impl MeasurementSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start measuring. Requests a frame if the pointer position is known.
    pub fn activate(&mut self, pointer: Option<Point>) -> Option<FrameRequest> {
        if !self.active {
            log::debug!("Measurement started");
        }
        self.active = true;
        if pointer.is_some() {
            self.pointer = pointer;
        }
        self.pointer.map(|p| self.frames.schedule(p))
    }

    /// Stop measuring and drop all lines. Returns a pending frame the host
    /// should cancel.
    pub fn deactivate(&mut self) -> Option<FrameHandle> {
        if self.active {
            log::debug!("Measurement stopped");
        }
        self.active = false;
        self.target = None;
        self.lines.clear();
        self.frames.cancel()
    }

    pub fn pointer_moved(&mut self, point: Point) -> Option<FrameRequest> {
        self.pointer = Some(point);
        self.active.then(|| self.frames.schedule(point))
    }

    /// Layout changed under the lines (scroll, resize, mutation).
    pub fn invalidate(&mut self) -> Option<FrameRequest> {
        if !self.active {
            return None;
        }
        self.pointer.map(|p| self.frames.schedule(p))
    }

    /// Run a fired frame. Returns `true` if the lines were recomputed.
    pub fn run_frame<D: DomHost + ?Sized>(
        &mut self,
        dom: &mut D,
        handle: FrameHandle,
        selected: Option<ElementId>,
    ) -> bool {
        match self.frames.fire(handle) {
            Some(point) if self.active => {
                self.recompute(dom, point, selected);
                true
            }
            _ => false,
        }
    }

    /// Run whatever frame is pending, for hosts without a frame clock.
    pub fn flush<D: DomHost + ?Sized>(&mut self, dom: &mut D, selected: Option<ElementId>) -> bool {
        match self.frames.flush() {
            Some(point) if self.active => {
                self.recompute(dom, point, selected);
                true
            }
            _ => false,
        }
    }

    fn recompute<D: DomHost + ?Sized>(&mut self, dom: &mut D, point: Point, selected: Option<ElementId>) {
        self.lines.clear();
        self.target = None;

        let Some(selected) = selected.filter(|&el| dom.contains(el)) else {
            return;
        };
        let selected_rect = dom.bounding_rect(selected);

        let hovered = element_under_pointer(dom, point).filter(|&el| el != selected);
        match hovered {
            Some(target) => {
                self.target = Some(target);
                self.lines = measure_between(selected_rect, dom.bounding_rect(target));
            }
            None => {
                if let Some(parent) = dom.parent(selected) {
                    self.target = Some(parent);
                    self.lines = measure_to_parent(selected_rect, dom.bounding_rect(parent));
                }
            }
        }
    }

    pub fn lines(&self) -> &[MeasurementLine] {
        &self.lines
    }

    /// Element the lines measure against.
    pub fn target(&self) -> Option<ElementId> {
        self.target
    }

    pub fn has_pending_frame(&self) -> bool {
        self.frames.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn test_measure_to_parent() {
        let parent = Rect::new(0.0, 0.0, 200.0, 100.0);
        let child = Rect::new(20.0, 10.0, 150.0, 60.0);
        let lines = measure_to_parent(child, parent);
        let distances: Vec<f64> = lines.iter().map(|l| l.distance).collect();
        assert_eq!(distances, vec![10.0, 50.0, 40.0, 20.0]);

        let top = lines[0];
        assert_eq!(top.direction, LineDirection::Vertical);
        assert_eq!((top.x1, top.y1, top.x2, top.y2), (85.0, 0.0, 85.0, 10.0));
    }

    #[test]
    fn test_flush_edges_suppressed() {
        let parent = Rect::new(0.0, 0.0, 200.0, 100.0);
        let child = Rect::new(0.0, 0.0, 200.0, 60.0);
        let lines = measure_to_parent(child, parent);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].distance, 40.0);

        // Overflowing child: negative distances are dropped too.
        let overflow = Rect::new(-10.0, -10.0, 210.0, 110.0);
        assert!(measure_to_parent(overflow, parent).is_empty());
    }

    #[test]
    fn test_measure_between_horizontal_gap() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(124.0, 20.0, 200.0, 80.0);
        let lines = measure_between(a, b);
        assert_eq!(lines.len(), 1);
        let line = lines[0];
        assert_eq!(line.direction, LineDirection::Horizontal);
        assert_eq!(line.distance, 24.0);
        // Drawn through the middle of the vertical overlap.
        assert_eq!(line.y1, 35.0);
    }

    #[test]
    fn test_measure_between_diagonal() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(150.0, 80.0, 200.0, 120.0);
        let lines = measure_between(b, a);
        let mut directions: Vec<_> = lines.iter().map(|l| (l.direction, l.distance)).collect();
        directions.sort_by(|x, y| x.1.total_cmp(&y.1));
        assert_eq!(
            directions,
            vec![(LineDirection::Vertical, 30.0), (LineDirection::Horizontal, 50.0)]
        );
    }

    #[test]
    fn test_measure_between_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(50.0, 25.0, 150.0, 75.0);
        assert!(measure_between(a, b).is_empty());
    }

    #[test]
    fn test_measure_between_containment() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(10.0, 10.0, 90.0, 90.0);
        assert_eq!(measure_between(inner, outer).len(), 4);
        assert_eq!(measure_between(outer, inner).len(), 4);
    }

    #[test]
    fn test_label_geometry() {
        assert_eq!(label_size(8.0).width, 15.0);
        assert_eq!(label_size(24.0).width, 22.0);
        assert_eq!(label_size(128.4).width, 29.0);

        let line = MeasurementLine::horizontal(40.0, 0.0, 24.0);
        assert_eq!(line.label(), "24");
        assert_eq!(line.label_position.x, 12.0);
        // Above the line, clear of it.
        assert!(line.label_rect().y1 <= 40.0 - LABEL_OFFSET);

        let line = MeasurementLine::vertical(10.0, 0.0, 100.0);
        assert!(line.label_rect().x0 >= 10.0 + LABEL_OFFSET);
    }

    fn sample_dom() -> (MemoryDom, ElementId, ElementId, ElementId) {
        let mut dom = MemoryDom::new(Size::new(800.0, 600.0));
        let root = dom.root();
        let parent = dom.create_element(root, "div", Rect::new(0.0, 0.0, 400.0, 200.0));
        let a = dom.create_element(parent, "div", Rect::new(20.0, 20.0, 120.0, 80.0));
        let b = dom.create_element(parent, "div", Rect::new(160.0, 20.0, 260.0, 80.0));
        (dom, parent, a, b)
    }

    #[test]
    fn test_session_coalesces_pointer_moves() {
        let (mut dom, _, a, b) = sample_dom();
        let mut session = MeasurementSession::new();
        assert!(session.pointer_moved(Point::new(5.0, 5.0)).is_none());

        session.activate(None);
        let first = session.pointer_moved(Point::new(300.0, 150.0)).unwrap();
        let second = session.pointer_moved(Point::new(200.0, 50.0)).unwrap();
        assert_eq!(second.cancel, Some(first.handle));

        assert!(!session.run_frame(&mut dom, first.handle, Some(a)));
        assert!(session.run_frame(&mut dom, second.handle, Some(a)));
        assert_eq!(session.target(), Some(b));
        assert_eq!(session.lines().len(), 1);
        assert_eq!(session.lines()[0].distance, 40.0);
    }

    #[test]
    fn test_session_measures_parent_when_not_hovering() {
        let (mut dom, parent, a, _) = sample_dom();
        let mut session = MeasurementSession::new();
        session.activate(Some(Point::new(50.0, 50.0)));
        assert!(session.flush(&mut dom, Some(a)));
        assert_eq!(session.target(), Some(parent));
        assert_eq!(session.lines().len(), 4);
    }

    #[test]
    fn test_session_skips_overlays() {
        let (mut dom, _, a, b) = sample_dom();
        dom.create_overlay(Rect::new(150.0, 0.0, 300.0, 100.0));
        let mut session = MeasurementSession::new();
        session.activate(Some(Point::new(200.0, 50.0)));
        session.flush(&mut dom, Some(a));
        assert_eq!(session.target(), Some(b));
    }

    #[test]
    fn test_invalidate_and_deactivate() {
        let (mut dom, _, a, _) = sample_dom();
        let mut session = MeasurementSession::new();
        assert!(session.invalidate().is_none());

        session.activate(Some(Point::new(50.0, 50.0)));
        session.flush(&mut dom, Some(a));
        let request = session.invalidate().unwrap();
        assert!(session.has_pending_frame());

        assert_eq!(session.deactivate(), Some(request.handle));
        assert!(session.lines().is_empty());
        assert!(!session.is_active());
        assert!(!session.run_frame(&mut dom, request.handle, Some(a)));
    }
}
