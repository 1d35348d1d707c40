//! Animation-frame coalescing.
//!
//! High-frequency events (pointer moves) are folded into at most one unit of
//! work per frame. Scheduling while a frame is pending cancels it and requests
//! a new one with the latest value; a host that fires a cancelled handle gets
//! nothing back.

/// Identifier of a requested frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A frame the host should request, and the frame it replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    pub handle: FrameHandle,
    /// Previously requested frame the host should cancel.
    pub cancel: Option<FrameHandle>,
}

/// Latest-value-wins frame scheduler.
#[derive(Debug, Clone)]
pub struct FrameScheduler<T> {
    next_id: u64,
    pending: Option<(FrameHandle, T)>,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            pending: None,
        }
    }
}

impl<T> FrameScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a frame carrying `value`, cancelling any pending one.
    ///
    /// The returned request names the replaced frame, so a host can call
    /// `cancelAnimationFrame` on it.
    pub fn schedule(&mut self, value: T) -> FrameRequest {
        let cancel = self.pending.take().map(|(handle, _)| handle);
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some((handle, value));
        FrameRequest { handle, cancel }
    }

    /// Drop the pending frame, if any.
    pub fn cancel(&mut self) -> Option<FrameHandle> {
        self.pending.take().map(|(handle, _)| handle)
    }

    /// Consume the value for a fired frame. Stale handles yield `None`.
    pub fn fire(&mut self, handle: FrameHandle) -> Option<T> {
        match &self.pending {
            Some((pending, _)) if *pending == handle => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }

    /// Consume whatever is pending regardless of handle.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_handle(&self) -> Option<FrameHandle> {
        self.pending.as_ref().map(|(handle, _)| *handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_and_fire() {
        let mut scheduler = FrameScheduler::new();
        let request = scheduler.schedule(1);
        let handle = request.handle;
        assert!(request.cancel.is_none());
        assert!(scheduler.is_pending());
        assert_eq!(scheduler.fire(handle), Some(1));
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn test_reschedule_cancels_previous() {
        let mut scheduler = FrameScheduler::new();
        let first = scheduler.schedule("a").handle;
        let request = scheduler.schedule("b");
        let second = request.handle;
        assert_eq!(request.cancel, Some(first));
        assert_ne!(first, second);

        // The stale frame does nothing; only the latest value survives.
        assert_eq!(scheduler.fire(first), None);
        assert_eq!(scheduler.fire(second), Some("b"));
    }

    #[test]
    fn test_many_schedules_coalesce_to_one() {
        let mut scheduler = FrameScheduler::new();
        let mut last = None;
        for i in 0..50 {
            last = Some(scheduler.schedule(i).handle);
        }
        assert_eq!(scheduler.fire(last.unwrap()), Some(49));
        assert_eq!(scheduler.flush(), None);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.schedule(()).handle;
        assert_eq!(scheduler.cancel(), Some(handle));
        assert_eq!(scheduler.fire(handle), None);
        assert_eq!(scheduler.cancel(), None);
    }
}
