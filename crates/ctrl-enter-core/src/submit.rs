//! Submitting the composer on Ctrl/Cmd+Enter.
//!
//! [`SubmitDispatcher`] looks for a send control near the editor and clicks it. When none is
//! found, [`NativeEnterFallback`] lets the page's own Enter binding submit: it clears the cached
//! enabled flag, re-emits a native Enter on the editor (which the interceptor now ignores), and
//! after a fixed delay restores the flag from the store.

use crate::dom::{Dom, SyntheticEvent};
use crate::host::Host;
use crate::selector::Selector;
use crate::site::SubmitPatterns;
use std::slice;
use std::sync::LazyLock;

static FORM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("valid form selector"));

/// Result of a submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<N> {
    /// A control was found and clicked.
    Activated(N),
    /// No enabled control near the editor.
    NotFound,
}

/// Finds and activates a submission control.
pub struct SubmitDispatcher<'a, D: Dom> {
    dom: &'a D,
    patterns: &'a SubmitPatterns,
}

impl<'a, D: Dom> SubmitDispatcher<'a, D> {
    /// A dispatcher searching with `patterns`.
    pub fn new(dom: &'a D, patterns: &'a SubmitPatterns) -> Self {
        Self { dom, patterns }
    }

    /// Search the enclosing form, then the enclosing composer container, and click the first
    /// enabled match.
    pub fn submit(&self, editor: &D::Node) -> SubmitOutcome<D::Node> {
        match self.find(editor) {
            Some(control) => {
                tracing::debug!(?control, "clicking submit control");
                self.dom.click(&control);
                SubmitOutcome::Activated(control)
            }
            None => SubmitOutcome::NotFound,
        }
    }

    /// The control [`submit`](Self::submit) would click.
    pub fn find(&self, editor: &D::Node) -> Option<D::Node> {
        let in_form = self
            .dom
            .closest(editor, slice::from_ref(&*FORM))
            .and_then(|form| self.enabled_match(&form, &self.patterns.form_controls));
        if in_form.is_some() {
            return in_form;
        }

        self.dom
            .closest(editor, &self.patterns.containers)
            .and_then(|container| self.enabled_match(&container, &self.patterns.container_controls))
    }

    fn enabled_match(&self, scope: &D::Node, controls: &[Selector]) -> Option<D::Node> {
        self.dom
            .query_first(Some(scope), controls)
            .filter(|control| !self.dom.is_disabled(control))
    }
}

/// Submission through the page's native Enter binding.
pub struct NativeEnterFallback<'a, D: Dom> {
    host: &'a Host<D>,
}

impl<'a, D: Dom> NativeEnterFallback<'a, D> {
    /// A fallback bound to `host`.
    pub fn new(host: &'a Host<D>) -> Self {
        Self { host }
    }

    /// Disable interception, emit a native Enter on `editor`, and schedule the flag's
    /// reconciliation with the store.
    pub fn run(&self, editor: &D::Node) {
        tracing::debug!("no submit control found; re-emitting native Enter");
        self.host.enabled.set(false);

        if let Err(err) = self
            .host
            .dom
            .dispatch(editor, SyntheticEvent::native_enter())
        {
            tracing::warn!(%err, "native Enter dispatch failed");
        }

        let enabled = self.host.enabled.clone();
        let channel = self.host.channel.clone();
        self.host.scheduler.set_timeout(
            self.host.config.fallback_delay(),
            Box::new(move || enabled.refresh(&*channel)),
        );
    }
}
