use crate::config::Config;
use crate::dom::Dom;
use crate::scheduler::Scheduler;
use crate::state::{EnabledState, StateChannel};
use std::rc::Rc;

/// Handles shared by every component of a session.
pub struct Host<D: Dom> {
    /// Page document.
    pub dom: Rc<D>,
    /// Event-loop timers.
    pub scheduler: Rc<dyn Scheduler>,
    /// Feature-state store.
    pub channel: Rc<dyn StateChannel>,
    /// Cached enabled flag.
    pub enabled: EnabledState,
    /// Session configuration.
    pub config: Rc<Config>,
}

impl<D: Dom> Host<D> {
    /// Bundle the host handles.
    pub fn new(
        dom: Rc<D>,
        scheduler: Rc<dyn Scheduler>,
        channel: Rc<dyn StateChannel>,
        config: Config,
    ) -> Self {
        Self {
            dom,
            scheduler,
            channel,
            enabled: EnabledState::default(),
            config: Rc::new(config),
        }
    }
}

// Manual impl: `D` itself need not be `Clone`.
impl<D: Dom> Clone for Host<D> {
    fn clone(&self) -> Self {
        Self {
            dom: Rc::clone(&self.dom),
            scheduler: Rc::clone(&self.scheduler),
            channel: Rc::clone(&self.channel),
            enabled: self.enabled.clone(),
            config: Rc::clone(&self.config),
        }
    }
}
