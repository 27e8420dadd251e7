//! `requestAnimationFrame` tick source

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{FrameStep, LoopHandle, TickSource};

/// Calls the step once per display refresh
#[derive(Debug, Default)]
pub struct AnimationFrameSource {
    handle: LoopHandle,
}

impl AnimationFrameSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for AnimationFrameSource {
    fn start(&mut self, step: FrameStep) -> LoopHandle {
        self.handle.cancel();
        self.handle = LoopHandle::new_running();
        schedule(self.handle.clone(), Rc::new(RefCell::new(step)));
        self.handle.clone()
    }
}

fn schedule(handle: LoopHandle, step: Rc<RefCell<FrameStep>>) {
    let Some(window) = web_sys::window() else {
        log::warn!("No window, frame loop stopped");
        handle.cancel();
        return;
    };

    let frame_handle = handle.clone();
    let closure = Closure::once(move |_time: f64| {
        frame_handle.set_pending_frame(None);
        if !frame_handle.is_running() {
            return;
        }
        let keep_going = (step.borrow_mut())();
        if keep_going && frame_handle.is_running() {
            schedule(frame_handle, step);
        } else {
            frame_handle.cancel();
        }
    });

    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(id) => handle.set_pending_frame(Some(id)),
        Err(e) => {
            log::warn!("requestAnimationFrame failed: {:?}", e);
            handle.cancel();
        }
    }
    closure.forget();
}
