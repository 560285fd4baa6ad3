//! Newline insertion strategies, one per [`EditorKind`].
//!
//! - **Plain field**: splice `'\n'` into the value at the cursor, move the cursor after it and
//!   dispatch `input`.
//! - **Generic editable**: resolve a range (see [`RangeResolver`]), delete its contents, insert a
//!   `<br>`, add a zero-width placeholder when the break would otherwise be trailing, collapse
//!   the caret after the break and dispatch `input`.
//! - **Framework editable**: dispatch a synthetic Shift+Enter and let the framework insert its
//!   own hard break. The document is never touched directly.
//!
//! The generic strategy is not atomic: if inserting the break fails after the range contents
//! were deleted, the deletion stays. The event has already been canceled at that point, so the
//! user sees the selection disappear without a newline.
//!
//! Once the edit itself has landed, a failed `input` dispatch is logged and the insertion
//! still counts as applied.

use crate::dom::{Dom, DomRange, SyntheticEvent};
use crate::error::InsertError;
use crate::locator::{Editor, EditorKind};
use crate::range::RangeResolver;
use crate::text::splice_line_break;

/// Placeholder that keeps the caret after a trailing `<br>` on some mobile engines.
pub const ZERO_WIDTH_SPACE: &str = "\u{200B}";

/// Performs the edit that yields one visual line break.
pub struct NewlineInserter<'a, D: Dom> {
    dom: &'a D,
}

impl<'a, D: Dom> NewlineInserter<'a, D> {
    /// An inserter over `dom`.
    pub fn new(dom: &'a D) -> Self {
        Self { dom }
    }

    /// Insert a line break into `editor`. `target_ranges` are the platform's target ranges, if
    /// the triggering event carried any.
    pub fn insert(
        &self,
        editor: &Editor<D::Node>,
        target_ranges: &[DomRange<D::Node>],
    ) -> Result<(), InsertError> {
        match editor.kind {
            EditorKind::PlainField => self.insert_into_field(&editor.node),
            EditorKind::GenericEditable => self.insert_into_editable(&editor.node, target_ranges),
            EditorKind::FrameworkEditable => self.insert_via_framework(&editor.node),
        }
    }

    fn insert_into_field(&self, node: &D::Node) -> Result<(), InsertError> {
        let (start, end) = self
            .dom
            .field_selection(node)
            .ok_or(InsertError::NoFieldSelection)?;
        let value = self
            .dom
            .field_value(node)
            .ok_or(InsertError::NoFieldSelection)?;

        let (value, caret) = splice_line_break(&value, start, end);
        self.dom.set_field_value(node, &value)?;
        self.dom.set_field_selection(node, caret, caret)?;
        self.notify_changed(node, false);
        Ok(())
    }

    fn insert_into_editable(
        &self,
        node: &D::Node,
        target_ranges: &[DomRange<D::Node>],
    ) -> Result<(), InsertError> {
        if !self.dom.is_content_editable(node) {
            return Err(InsertError::NotEditable);
        }

        let range = RangeResolver::new(self.dom)
            .resolve(node, target_ranges)
            .ok_or(InsertError::RangeUnresolved)?;

        self.ensure_focus(node);

        let point = self.dom.delete_contents(&range)?;
        let line_break = self.dom.create_element("br")?;
        self.dom.insert_at(&point, &line_break)?;

        // A following `<br>` has no text content either.
        let trailing = self
            .dom
            .next_sibling(&line_break)
            .is_none_or(|next| self.dom.text_content(&next).is_empty());
        if trailing {
            let placeholder = self.dom.create_text(ZERO_WIDTH_SPACE)?;
            self.dom.insert_after(&line_break, &placeholder)?;
        }

        self.dom.collapse_selection_after(&line_break)?;
        self.notify_changed(node, true);
        Ok(())
    }

    fn insert_via_framework(&self, node: &D::Node) -> Result<(), InsertError> {
        if !self.dom.is_content_editable(node) {
            return Err(InsertError::NotEditable);
        }
        self.ensure_focus(node);
        self.dom.dispatch(node, SyntheticEvent::shift_enter())?;
        Ok(())
    }

    fn notify_changed(&self, node: &D::Node, bubbles: bool) {
        if let Err(err) = self.dom.dispatch(node, SyntheticEvent::input(bubbles)) {
            tracing::warn!(%err, "input event not delivered after newline insertion");
        }
    }

    fn ensure_focus(&self, node: &D::Node) {
        if !self.dom.is_focused(node)
            && let Err(err) = self.dom.focus(node)
        {
            tracing::debug!(%err, "focus failed before newline insertion");
        }
    }
}
