//! Explicit frame loop with a cancellation handle
//!
//! The host drives the loop (a winit `RedrawRequested`, a test, a timer);
//! the loop only decides whether the next tick renders and numbers frames.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cloneable handle that stops a running [`FrameLoop`]
#[derive(Debug, Clone, Default)]
pub struct FrameHandle {
    cancelled: Arc<AtomicBool>,
}

impl FrameHandle {
    /// Requests the loop to stop; takes effect on the next tick
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// A frame was drawn
    Rendered { frame: u64 },
    /// The loop has not been started yet
    Idle,
    /// The loop was cancelled; the host should stop ticking
    Stopped,
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    handle: Option<FrameHandle>,
    frame: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the loop, or returns the handle of the loop already running
    pub fn start(&mut self) -> FrameHandle {
        match &self.handle {
            Some(handle) if !handle.is_cancelled() => handle.clone(),
            _ => {
                let handle = FrameHandle::default();
                self.handle = Some(handle.clone());
                handle
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_cancelled())
    }

    /// Stops the loop from the owning side
    pub fn stop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.cancel();
        }
    }

    /// Decides the fate of the next tick without drawing anything
    ///
    /// Returns `Rendered` with the number the frame should carry when the
    /// caller must draw.
    pub fn begin_frame(&mut self) -> TickStatus {
        match &self.handle {
            None => TickStatus::Idle,
            Some(handle) if handle.is_cancelled() => TickStatus::Stopped,
            Some(_) => {
                self.frame += 1;
                TickStatus::Rendered { frame: self.frame }
            }
        }
    }

    /// Frames started since construction
    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_started() {
        let mut frame_loop = FrameLoop::new();
        assert_eq!(frame_loop.begin_frame(), TickStatus::Idle);
        frame_loop.start();
        assert_eq!(frame_loop.begin_frame(), TickStatus::Rendered { frame: 1 });
        assert_eq!(frame_loop.begin_frame(), TickStatus::Rendered { frame: 2 });
    }

    #[test]
    fn cloned_handle_cancels() {
        let mut frame_loop = FrameLoop::new();
        let handle = frame_loop.start();
        let remote = handle.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();

        assert!(handle.is_cancelled());
        assert!(!frame_loop.is_running());
        assert_eq!(frame_loop.begin_frame(), TickStatus::Stopped);
        assert_eq!(frame_loop.frame_count(), 0);
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let mut frame_loop = FrameLoop::new();
        let a = frame_loop.start();
        let b = frame_loop.start();
        b.cancel();
        assert!(a.is_cancelled());

        let c = frame_loop.start();
        assert!(!c.is_cancelled());
        assert!(frame_loop.is_running());
    }
}
