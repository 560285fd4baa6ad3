//! Finding and classifying the composer editor.

use crate::dom::Dom;
use crate::site::PatternTable;
use std::slice;

/// How newlines are inserted into an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    /// `textarea` / `input`: splice the value string.
    PlainField,
    /// Editable region the engine may edit structurally.
    GenericEditable,
    /// Editable region owned by a rich-text framework; edited only through its key bindings.
    FrameworkEditable,
}

impl EditorKind {
    /// Classify `node`. Returns `None` when it is neither a text field nor editable.
    pub fn classify<D: Dom>(dom: &D, node: &D::Node, framework_marker: &str) -> Option<Self> {
        match dom.tag_name(node).as_deref() {
            Some("textarea") | Some("input") => return Some(Self::PlainField),
            Some(_) => {}
            None => return None,
        }
        if !dom.is_content_editable(node) {
            return None;
        }
        if dom.has_class(node, framework_marker) {
            Some(Self::FrameworkEditable)
        } else {
            Some(Self::GenericEditable)
        }
    }
}

/// An editor node together with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Editor<N> {
    /// The element receiving input.
    pub node: N,
    /// Its insertion strategy.
    pub kind: EditorKind,
}

/// Returns the best editor candidate on a page by walking a [`PatternTable`] in order.
#[derive(Debug, Clone)]
pub struct EditorLocator {
    table: PatternTable,
}

impl EditorLocator {
    /// A locator over `table`.
    pub fn new(table: PatternTable) -> Self {
        Self { table }
    }

    /// The table in use.
    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// The first document-wide match of the highest-priority pattern that matches anything.
    pub fn locate<D: Dom>(&self, dom: &D) -> Option<D::Node> {
        self.table
            .patterns
            .iter()
            .find_map(|pattern| dom.query_first(None, slice::from_ref(pattern)))
    }
}
