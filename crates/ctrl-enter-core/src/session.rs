//! Wiring a complete session onto a page.

use crate::config::Config;
use crate::dom::Dom;
use crate::error::DomError;
use crate::host::Host;
use crate::scheduler::Scheduler;
use crate::state::{EnabledState, StateChannel};
use crate::watcher::AttachmentWatcher;
use std::rc::Rc;

/// A running engine instance for one page.
///
/// The structure subscription keeps the watcher alive for the lifetime of the page; dropping
/// the session handle does not detach anything.
pub struct Session<D: Dom> {
    host: Host<D>,
    watcher: Rc<AttachmentWatcher<D>>,
}

impl<D: Dom> Session<D> {
    /// Sync the enabled flag with the store, attach to the editor if it is already present,
    /// and subscribe to structural changes of `body` (or the document element).
    pub fn start(
        dom: Rc<D>,
        scheduler: Rc<dyn Scheduler>,
        channel: Rc<dyn StateChannel>,
        config: Config,
    ) -> Result<Self, DomError> {
        let host = Host::new(dom, scheduler, channel, config);
        host.enabled.follow(&*host.channel);
        host.enabled.initialize(&*host.channel);

        let watcher = AttachmentWatcher::new(host.clone());
        tracing::debug!(
            family = ?host.config.family(),
            policy = ?watcher.policy(),
            "session starting"
        );
        if watcher.check().is_none() {
            tracing::debug!("editor not found yet, waiting");
        }

        let root = host
            .dom
            .body()
            .unwrap_or_else(|| host.dom.document_element());
        let subscriber = Rc::clone(&watcher);
        host.dom
            .observe_structure(&root, Rc::new(move || subscriber.notify()))?;

        Ok(Self { host, watcher })
    }

    /// Cached enabled flag.
    pub fn enabled(&self) -> &EnabledState {
        &self.host.enabled
    }

    /// The attachment watcher.
    pub fn watcher(&self) -> &Rc<AttachmentWatcher<D>> {
        &self.watcher
    }

    /// Shared host handles.
    pub fn host(&self) -> &Host<D> {
        &self.host
    }
}
