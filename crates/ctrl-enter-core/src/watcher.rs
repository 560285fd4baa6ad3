//! Keeping interceptors attached to the current editor.
//!
//! Single-page apps replace the composer element on navigation. The watcher is driven by a
//! stream of "structure changed" signals ([`AttachmentWatcher::notify`]); on each signal it
//! re-runs the [`EditorLocator`] and instruments a candidate that does not yet carry the
//! attachment marker. A marked node is never instrumented twice.
//!
//! With [`WatchPolicy::Debounced`] a burst of signals collapses into one recheck per interval.
//! Both policies converge to the same attached state.

use crate::dom::Dom;
use crate::host::Host;
use crate::intercept::{BeforeInputInterceptor, KeyEventInterceptor};
use crate::locator::{Editor, EditorKind, EditorLocator};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

/// How structure-change signals are turned into rechecks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WatchPolicy {
    /// Recheck synchronously on every signal.
    Immediate,
    /// Recheck at most once per `interval`; signals arriving while a recheck is pending are
    /// dropped.
    Debounced {
        /// Delay between the first signal of a burst and the recheck.
        #[serde(rename = "interval_ms", with = "millis")]
        interval: Duration,
    },
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Re-attaches interceptors as the page mutates.
pub struct AttachmentWatcher<D: Dom> {
    host: Host<D>,
    locator: EditorLocator,
    policy: WatchPolicy,
    recheck_pending: Cell<bool>,
    current: RefCell<Option<Editor<D::Node>>>,
    this: Weak<Self>,
}

impl<D: Dom> AttachmentWatcher<D> {
    /// A watcher using the host's configured table and policy.
    pub fn new(host: Host<D>) -> Rc<Self> {
        let locator = EditorLocator::new(host.config.pattern_table());
        let policy = host.config.watch_policy();
        Rc::new_cyclic(|this| Self {
            host,
            locator,
            policy,
            recheck_pending: Cell::new(false),
            current: RefCell::new(None),
            this: this.clone(),
        })
    }

    /// Active policy.
    pub fn policy(&self) -> WatchPolicy {
        self.policy
    }

    /// The most recently attached editor.
    pub fn current(&self) -> Option<Editor<D::Node>> {
        self.current.borrow().clone()
    }

    /// Whether a debounced recheck is scheduled.
    pub fn is_recheck_pending(&self) -> bool {
        self.recheck_pending.get()
    }

    /// Signal that the document structure changed.
    pub fn notify(&self) {
        match self.policy {
            WatchPolicy::Immediate => {
                self.check();
            }
            WatchPolicy::Debounced { interval } => {
                if self.recheck_pending.replace(true) {
                    return;
                }
                let this = self.this.clone();
                self.host.scheduler.set_timeout(
                    interval,
                    Box::new(move || {
                        if let Some(watcher) = this.upgrade() {
                            watcher.recheck_pending.set(false);
                            watcher.check();
                        }
                    }),
                );
            }
        }
    }

    /// Locate the editor and attach to it if needed. Returns the editor when this call
    /// instrumented it.
    pub fn check(&self) -> Option<Editor<D::Node>> {
        let Some(node) = self.locator.locate(&*self.host.dom) else {
            tracing::trace!("editor not found yet");
            return None;
        };
        self.attach(node)
    }

    /// Whether `node` carries the attachment marker.
    pub fn is_attached(&self, node: &D::Node) -> bool {
        self.host
            .dom
            .attribute(node, &self.host.config.attachment_marker)
            .is_some()
    }

    /// Install both interceptors on `node` unless it is already marked. The marker is set once
    /// the key-down interceptor is in place. Nodes that are not editors, or whose key-down
    /// listener could not be installed, are left unmarked so a later check can pick them up.
    pub fn attach(&self, node: D::Node) -> Option<Editor<D::Node>> {
        if self.is_attached(&node) {
            return None;
        }

        let dom = &*self.host.dom;
        let kind = EditorKind::classify(dom, &node, &self.host.config.framework_marker_class)?;

        let editor = Editor { node, kind };

        // An uninstrumented node stays unmarked.
        let keys = KeyEventInterceptor::new(self.host.clone(), editor.clone());
        if let Err(err) = dom.listen_key_down(&editor.node, Rc::new(move |input| keys.handle(input)))
        {
            tracing::warn!(%err, "keydown listener not installed");
            return None;
        }

        let intents = BeforeInputInterceptor::new(self.host.clone(), editor.clone());
        if let Err(err) =
            dom.listen_before_input(&editor.node, Rc::new(move |input| intents.handle(input)))
        {
            tracing::warn!(%err, "beforeinput listener not installed");
        }

        if let Err(err) = dom.set_attribute(&editor.node, &self.host.config.attachment_marker, "true")
        {
            tracing::warn!(%err, "could not mark editor");
        }

        tracing::debug!(
            tag = dom.tag_name(&editor.node).unwrap_or_default(),
            id = dom.attribute(&editor.node, "id").unwrap_or_default(),
            class = dom.attribute(&editor.node, "class").unwrap_or_default(),
            ?kind,
            "attached to editor"
        );

        *self.current.borrow_mut() = Some(editor.clone());
        Some(editor)
    }
}
