use super::ManualScheduler;
use crate::error::ChannelError;
use crate::scheduler::Scheduler;
use crate::state::{
    ChangeListener, ENABLED_KEY, Reply, StateChannel, StateRequest, StateResponse, StorageChange,
    ValueChange, stored_enabled,
};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

/// An in-memory feature-state store answering the `getState` / `toggle` protocol.
///
/// Replies and change notifications are posted to the [`ManualScheduler`] with no delay, so
/// they arrive on a later turn, as they would from a background process.
pub struct MemoryStateStore {
    scheduler: Rc<ManualScheduler>,
    stored: RefCell<Option<Value>>,
    listeners: RefCell<Vec<Rc<dyn Fn(&StorageChange)>>>,
    connected: Cell<bool>,
    requests: RefCell<Vec<StateRequest>>,
    this: Weak<Self>,
}

impl MemoryStateStore {
    /// An empty store (the flag reads as enabled).
    pub fn new(scheduler: Rc<ManualScheduler>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            scheduler,
            stored: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            connected: Cell::new(true),
            requests: RefCell::new(Vec::new()),
            this: this.clone(),
        })
    }

    /// Raw stored value under [`ENABLED_KEY`].
    pub fn stored(&self) -> Option<Value> {
        self.stored.borrow().clone()
    }

    /// Effective flag.
    pub fn enabled(&self) -> bool {
        stored_enabled(self.stored.borrow().as_ref())
    }

    /// Write the stored value (as the toggle UI would) and notify listeners.
    pub fn write(&self, value: Option<Value>) {
        let old_value = self.stored.replace(value.clone());
        tracing::trace!(key = ENABLED_KEY, ?old_value, new_value = ?value, "store write");
        let change = StorageChange {
            enabled: Some(ValueChange {
                old_value,
                new_value: value,
            }),
        };
        let listeners = self.listeners.borrow().clone();
        self.scheduler.set_timeout(
            Duration::ZERO,
            Box::new(move || {
                for listener in listeners {
                    listener(&change);
                }
            }),
        );
    }

    /// Make requests fail with [`ChannelError::Disconnected`].
    pub fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<StateRequest> {
        self.requests.borrow().clone()
    }

    fn answer(&self, request: StateRequest) -> Result<StateResponse, ChannelError> {
        if !self.connected.get() {
            return Err(ChannelError::Disconnected);
        }
        match request {
            StateRequest::GetState => Ok(StateResponse {
                enabled: self.enabled(),
            }),
            StateRequest::Toggle => {
                let enabled = !self.enabled();
                self.write(Some(Value::Bool(enabled)));
                Ok(StateResponse { enabled })
            }
        }
    }
}

impl StateChannel for MemoryStateStore {
    fn send(&self, request: StateRequest, reply: Reply) {
        self.requests.borrow_mut().push(request);
        let this = self.this.clone();
        self.scheduler.set_timeout(
            Duration::ZERO,
            Box::new(move || match this.upgrade() {
                Some(store) => reply(store.answer(request)),
                None => reply(Err(ChannelError::Disconnected)),
            }),
        );
    }

    fn on_changed(&self, listener: ChangeListener) {
        self.listeners.borrow_mut().push(Rc::from(listener));
    }
}
