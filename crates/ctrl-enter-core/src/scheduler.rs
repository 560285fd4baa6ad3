//! Timer abstraction.
//!
//! Everything runs on one event loop; a scheduled task runs later on that same loop.

use std::time::Duration;

/// A deferred task.
pub type Task = Box<dyn FnOnce()>;

/// One-shot timers on the host event loop.
pub trait Scheduler {
    /// Run `task` once, no earlier than `delay` from now.
    fn set_timeout(&self, delay: Duration, task: Task);
}
