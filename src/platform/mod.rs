//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling (animation frames on web, manual pumping elsewhere)
//! - Loop cancellation
//! - Wall-clock time
//! - Messages to and from an embedding page

use std::cell::Cell;
use std::rc::Rc;

pub mod messages;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::AnimationFrameSource;

/// One frame of work. Returns whether the loop should keep running.
pub type FrameStep = Box<dyn FnMut() -> bool>;

/// Cancellation handle for a running frame loop.
///
/// Clones share the same loop. Cancelling more than once is a no-op.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    running: Rc<Cell<bool>>,
    /// Platform token of the next scheduled frame, if any
    pending_frame: Rc<Cell<Option<i32>>>,
}

impl LoopHandle {
    pub(crate) fn new_running() -> Self {
        Self {
            running: Rc::new(Cell::new(true)),
            pending_frame: Rc::new(Cell::new(None)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Stop the loop. Returns true if this call stopped it.
    pub fn cancel(&self) -> bool {
        let was_running = self.running.replace(false);
        if let Some(frame) = self.pending_frame.take() {
            cancel_scheduled_frame(frame);
        }
        was_running
    }

    pub(crate) fn set_pending_frame(&self, frame: Option<i32>) {
        self.pending_frame.set(frame);
    }
}

#[cfg(target_arch = "wasm32")]
fn cancel_scheduled_frame(frame: i32) {
    if let Some(window) = web_sys::window() {
        let _ = window.cancel_animation_frame(frame);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn cancel_scheduled_frame(_frame: i32) {}

/// Something that calls a step once per displayed frame
pub trait TickSource {
    /// Begin calling `step` every frame until it returns false or the handle is cancelled
    fn start(&mut self, step: FrameStep) -> LoopHandle;
}

/// Tick source driven explicitly by the caller (native runs and tests)
#[derive(Default)]
pub struct ManualTickSource {
    step: Option<FrameStep>,
    handle: LoopHandle,
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run up to `frames` frames. Returns how many frames actually ran.
    pub fn pump(&mut self, frames: usize) -> usize {
        let Some(step) = self.step.as_mut() else {
            return 0;
        };
        let mut ran = 0;
        while ran < frames && self.handle.is_running() {
            ran += 1;
            if !step() {
                self.handle.cancel();
            }
        }
        if !self.handle.is_running() {
            self.step = None;
        }
        ran
    }

    pub fn is_running(&self) -> bool {
        self.step.is_some() && self.handle.is_running()
    }
}

impl TickSource for ManualTickSource {
    fn start(&mut self, step: FrameStep) -> LoopHandle {
        // Only one loop at a time
        self.handle.cancel();
        self.handle = LoopHandle::new_running();
        self.step = Some(step);
        self.handle.clone()
    }
}

/// Current time as Unix milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Current time as Unix milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
