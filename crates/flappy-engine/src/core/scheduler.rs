//! Frame scheduling contract.
//!
//! The host owns the clock. It hands the engine a `FrameScheduler`; the engine
//! asks for a frame every time it ticks and the host calls `Engine::tick` when
//! that frame fires. In the browser this is `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::types::FrameHandle;

/// Host-provided "call me on the next frame" service.
/// Must tolerate being asked every frame indefinitely.
pub trait FrameScheduler {
    /// Ask for one callback on the next frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending request. Cancelling a fired or unknown handle is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    next_handle: i32,
    pending: Option<FrameHandle>,
    requested: u32,
    cancelled: u32,
}

/// Scheduler for native hosts and tests: records requests and lets the
/// caller decide when a frame fires.
///
/// Clones share state, so a host can keep one clone after handing the
/// other to `Engine::new`.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding (requested, not cancelled, not fired) frame, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.state.borrow().pending
    }

    /// Mark the outstanding frame as fired. Returns its handle.
    /// The host calls `Engine::tick` right after this.
    pub fn fire(&self) -> Option<FrameHandle> {
        self.state.borrow_mut().pending.take()
    }

    /// Total frames requested so far.
    pub fn requested(&self) -> u32 {
        self.state.borrow().requested
    }

    /// Total cancellations that hit an outstanding frame.
    pub fn cancelled(&self) -> u32 {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        state.requested += 1;
        let handle = FrameHandle(state.next_handle);
        state.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if state.pending == Some(handle) {
            state.pending = None;
            state.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_then_fire() {
        let observer = ManualScheduler::new();
        let mut scheduler = observer.clone();
        let handle = scheduler.request_frame();
        assert_eq!(observer.pending(), Some(handle));
        assert_eq!(observer.fire(), Some(handle));
        assert_eq!(observer.pending(), None);
        assert_eq!(observer.requested(), 1);
    }

    #[test]
    fn handles_are_unique() {
        let mut scheduler = ManualScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        assert_ne!(a, b);
    }

    #[test]
    fn cancel_stale_handle_is_noop() {
        let observer = ManualScheduler::new();
        let mut scheduler = observer.clone();
        let stale = scheduler.request_frame();
        let current = scheduler.request_frame();
        scheduler.cancel_frame(stale);
        assert_eq!(observer.pending(), Some(current));
        assert_eq!(observer.cancelled(), 0);
        scheduler.cancel_frame(current);
        assert_eq!(observer.pending(), None);
        assert_eq!(observer.cancelled(), 1);
    }
}
