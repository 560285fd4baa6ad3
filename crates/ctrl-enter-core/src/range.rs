//! Resolving the edit position inside an editor.
//!
//! A resolved range is always contained in the editor subtree. There is no "end of content"
//! fallback: inserting at a guessed position is worse than not inserting at all.

use crate::dom::{Dom, DomRange};

/// Picks the authoritative edit range for an editor.
pub struct RangeResolver<'a, D: Dom> {
    dom: &'a D,
}

impl<'a, D: Dom> RangeResolver<'a, D> {
    /// A resolver over `dom`.
    pub fn new(dom: &'a D) -> Self {
        Self { dom }
    }

    /// Resolve in order: the first platform target range, then the live selection.
    pub fn resolve(
        &self,
        editor: &D::Node,
        target_ranges: &[DomRange<D::Node>],
    ) -> Option<DomRange<D::Node>> {
        if let Some(range) = target_ranges.first()
            && self.is_inside(editor, range)
        {
            return Some(range.clone());
        }

        self.dom
            .selection_range()
            .filter(|range| self.is_inside(editor, range))
    }

    fn is_inside(&self, editor: &D::Node, range: &DomRange<D::Node>) -> bool {
        match self.dom.common_ancestor(range) {
            Ok(ancestor) => self.dom.contains(editor, &ancestor),
            Err(err) => {
                tracing::debug!(%err, "discarding invalid range");
                false
            }
        }
    }
}
