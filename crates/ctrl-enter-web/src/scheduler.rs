use ctrl_enter_core::{Scheduler, Task};
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

use crate::convert::describe;

/// `window.setTimeout`.
pub struct WindowScheduler {
    window: Window,
}

impl WindowScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for WindowScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) {
        let callback = Closure::once_into_js(move || task());
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            tracing::warn!(error = %describe(&err), "setTimeout failed");
        }
    }
}
