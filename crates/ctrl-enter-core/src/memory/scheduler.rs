use crate::scheduler::{Scheduler, Task};
use std::cell::{Cell, RefCell};
use std::time::Duration;

struct Scheduled {
    due: Duration,
    seq: u64,
    task: Task,
}

/// A virtual clock. Tasks run only when the test advances time.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    seq: Cell<u64>,
    queue: RefCell<Vec<Scheduled>>,
}

impl ManualScheduler {
    /// A clock at time zero with no pending tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed virtual time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of tasks not yet run.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run every task that is due now, including tasks scheduled by those tasks with no delay.
    pub fn run_due(&self) {
        self.advance(Duration::ZERO);
    }

    /// Move the clock forward by `by`, running due tasks in (due time, scheduling order).
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(next) = self.pop_due(target) {
            if next.due > self.now.get() {
                self.now.set(next.due);
            }
            (next.task)();
        }
        self.now.set(target);
    }

    fn pop_due(&self, target: Duration) -> Option<Scheduled> {
        let mut queue = self.queue.borrow_mut();
        let index = queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= target)
            .min_by_key(|(_, s)| (s.due, s.seq))
            .map(|(i, _)| i)?;
        Some(queue.remove(index))
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.queue.borrow_mut().push(Scheduled {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }
}
