//! Capture-phase interceptors installed on the editor.
//!
//! | event | action |
//! |---|---|
//! | feature disabled | proceed |
//! | Ctrl/Cmd+Enter | cancel, submit (or native-Enter fallback) |
//! | bare Enter, not composing | cancel, insert newline |
//! | Shift+Enter, composing Enter, other keys | proceed |
//! | before-input `insertParagraph`, cancelable, not composing | cancel, insert newline |
//!
//! A bare Enter is canceled before newline insertion runs, so it never reaches the page's
//! submit binding even when the insertion fails.

use crate::dom::Dom;
use crate::event::{BeforeInput, Disposition, InputType, KeyAction, KeyInput};
use crate::host::Host;
use crate::locator::Editor;
use crate::newline::NewlineInserter;
use crate::submit::{NativeEnterFallback, SubmitDispatcher, SubmitOutcome};

/// Key-down interceptor for one editor.
pub struct KeyEventInterceptor<D: Dom> {
    host: Host<D>,
    editor: Editor<D::Node>,
}

impl<D: Dom> KeyEventInterceptor<D> {
    /// An interceptor for `editor`.
    pub fn new(host: Host<D>, editor: Editor<D::Node>) -> Self {
        Self { host, editor }
    }

    /// Handle one key-down.
    pub fn handle(&self, input: &KeyInput) -> Disposition {
        tracing::trace!(
            key = %input.key,
            code = %input.code,
            ctrl = input.ctrl,
            meta = input.meta,
            composing = input.composing,
            "keydown"
        );

        if !self.host.enabled.get() {
            return Disposition::Proceed;
        }

        match KeyAction::classify(input) {
            KeyAction::Submit => {
                self.submit();
                Disposition::Cancel
            }
            KeyAction::Newline => {
                let inserter = NewlineInserter::new(&*self.host.dom);
                if let Err(err) = inserter.insert(&self.editor, &[]) {
                    tracing::debug!(%err, "newline insertion aborted");
                }
                Disposition::Cancel
            }
            KeyAction::Native => Disposition::Proceed,
        }
    }

    fn submit(&self) {
        let dispatcher = SubmitDispatcher::new(&*self.host.dom, &self.host.config.submit);
        if let SubmitOutcome::NotFound = dispatcher.submit(&self.editor.node) {
            NativeEnterFallback::new(&self.host).run(&self.editor.node);
        }
    }
}

/// Before-input interceptor for one editor, covering on-screen keyboards that never send a
/// key-down for Enter.
pub struct BeforeInputInterceptor<D: Dom> {
    host: Host<D>,
    editor: Editor<D::Node>,
}

impl<D: Dom> BeforeInputInterceptor<D> {
    /// An interceptor for `editor`.
    pub fn new(host: Host<D>, editor: Editor<D::Node>) -> Self {
        Self { host, editor }
    }

    /// Handle one before-input.
    pub fn handle(&self, input: &BeforeInput<D::Node>) -> Disposition {
        if !self.host.enabled.get()
            || input.input_type != InputType::InsertParagraph
            || input.composing
            || !input.cancelable
        {
            return Disposition::Proceed;
        }

        tracing::debug!("beforeinput insertParagraph intercepted");
        let inserter = NewlineInserter::new(&*self.host.dom);
        if let Err(err) = inserter.insert(&self.editor, &input.target_ranges) {
            tracing::debug!(%err, "newline insertion aborted");
        }
        Disposition::Cancel
    }
}
