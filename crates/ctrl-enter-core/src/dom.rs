//! Host document abstraction.
//!
//! The engine never talks to a browser directly. Everything it needs from the page is expressed
//! by the [`Dom`] trait, which the web bridge implements over `web-sys` and
//! [`MemoryDom`](crate::memory::MemoryDom) implements in memory for tests.
//!
//! All methods take `&self`: like the platform DOM, hosts use interior mutability, and handlers
//! installed through [`Dom::listen_key_down`] may call back into the same host while an event is
//! being dispatched.

use crate::error::DomError;
use crate::event::{BeforeInput, Disposition, KeyInput};
use crate::selector::Selector;
use std::fmt;
use std::rc::Rc;

/// A container + offset pair. Offsets are UTF-16 code units for text nodes and child indices
/// for elements, as on the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPoint<N> {
    /// Container node.
    pub node: N,
    /// Offset inside `node`.
    pub offset: u32,
}

impl<N> BoundaryPoint<N> {
    /// Create a boundary point.
    pub fn new(node: N, offset: u32) -> Self {
        Self { node, offset }
    }
}

/// A start/end pair of boundary points (static or live range snapshot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomRange<N> {
    /// Range start.
    pub start: BoundaryPoint<N>,
    /// Range end.
    pub end: BoundaryPoint<N>,
}

impl<N: Clone> DomRange<N> {
    /// A range from `start` to `end`.
    pub fn new(start: BoundaryPoint<N>, end: BoundaryPoint<N>) -> Self {
        Self { start, end }
    }

    /// A collapsed range at `node`/`offset`.
    pub fn caret(node: N, offset: u32) -> Self {
        Self {
            start: BoundaryPoint::new(node.clone(), offset),
            end: BoundaryPoint::new(node, offset),
        }
    }
}

impl<N: PartialEq> DomRange<N> {
    /// Start and end are the same point.
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Keyboard event synthesized into the page. Always `Enter`, bubbling and cancelable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticKey {
    /// Shift modifier.
    pub shift: bool,
    /// Crosses shadow roots.
    pub composed: bool,
}

impl SyntheticKey {
    /// `KeyboardEvent.key` / `code`.
    pub const KEY: &'static str = "Enter";
    /// Legacy `keyCode` / `which`.
    pub const KEY_CODE: u32 = 13;
}

/// Events the engine dispatches into the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticEvent {
    /// `input`, bubbling; sent after every successful edit so the page's bindings resync.
    Input {
        /// Crosses shadow roots.
        composed: bool,
    },
    /// `keydown` for Enter.
    KeyDown(SyntheticKey),
}

impl SyntheticEvent {
    /// A native Enter used by the submission fallback.
    pub fn native_enter() -> Self {
        Self::KeyDown(SyntheticKey {
            shift: false,
            composed: false,
        })
    }

    /// Shift+Enter, the line-break binding of framework-managed editors.
    pub fn shift_enter() -> Self {
        Self::KeyDown(SyntheticKey {
            shift: true,
            composed: true,
        })
    }

    /// `input` notification.
    pub fn input(composed: bool) -> Self {
        Self::Input { composed }
    }

    /// As the [`KeyInput`] a listener would observe, for key-down variants.
    pub fn as_key_input(&self) -> Option<KeyInput> {
        match self {
            Self::KeyDown(key) => {
                let input = KeyInput::key(SyntheticKey::KEY);
                Some(if key.shift { input.with_shift() } else { input })
            }
            Self::Input { .. } => None,
        }
    }
}

/// Capture-phase key-down handler.
pub type KeyDownHandler = Rc<dyn Fn(&KeyInput) -> Disposition>;

/// Capture-phase before-input handler.
pub type BeforeInputHandler<N> = Rc<dyn Fn(&BeforeInput<N>) -> Disposition>;

/// Structural-change callback.
pub type MutationCallback = Rc<dyn Fn()>;

/// The page document as seen by the engine.
pub trait Dom: 'static {
    /// Node handle. Equality is node identity.
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// The root element (`documentElement`).
    fn document_element(&self) -> Self::Node;

    /// `document.body`, if present.
    fn body(&self) -> Option<Self::Node>;

    /// First element in document order under `scope` (the whole document when `None`) matching
    /// any of `selectors`. `scope` itself is not a candidate.
    fn query_first(&self, scope: Option<&Self::Node>, selectors: &[Selector])
    -> Option<Self::Node>;

    /// Nearest inclusive ancestor of `node` matching any of `selectors`.
    fn closest(&self, node: &Self::Node, selectors: &[Selector]) -> Option<Self::Node>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    /// Lowercase tag name, `None` for non-elements.
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    /// Attribute value.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// Set an attribute value.
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    /// Whether the element's class list contains `class`.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// `HTMLElement.isContentEditable` (inherited from ancestors).
    fn is_content_editable(&self, node: &Self::Node) -> bool;

    /// Disabled form control.
    fn is_disabled(&self, node: &Self::Node) -> bool;

    /// Activate a control as a user click would.
    fn click(&self, node: &Self::Node);

    /// Whether `node` is the active element.
    fn is_focused(&self, node: &Self::Node) -> bool;

    /// Move focus to `node`.
    fn focus(&self, node: &Self::Node) -> Result<(), DomError>;

    /// Current value of a text field (`textarea` / `input`).
    fn field_value(&self, node: &Self::Node) -> Option<String>;

    /// `selectionStart` / `selectionEnd` of a text field, in UTF-16 units.
    fn field_selection(&self, node: &Self::Node) -> Option<(u32, u32)>;

    /// Replace a text field's value.
    fn set_field_value(&self, node: &Self::Node, value: &str) -> Result<(), DomError>;

    /// Set a text field's selection offsets.
    fn set_field_selection(&self, node: &Self::Node, start: u32, end: u32)
    -> Result<(), DomError>;

    /// A snapshot of the first range of the document selection.
    fn selection_range(&self) -> Option<DomRange<Self::Node>>;

    /// Collapse the document selection to the point right after `node`.
    fn collapse_selection_after(&self, node: &Self::Node) -> Result<(), DomError>;

    /// Validate `range` against the live document and return its common ancestor container.
    fn common_ancestor(&self, range: &DomRange<Self::Node>) -> Result<Self::Node, DomError>;

    /// `Range.deleteContents()`. Returns the point the range collapsed to.
    fn delete_contents(
        &self,
        range: &DomRange<Self::Node>,
    ) -> Result<BoundaryPoint<Self::Node>, DomError>;

    /// `Range.insertNode()` on a collapsed range at `point`, splitting a text container.
    fn insert_at(&self, point: &BoundaryPoint<Self::Node>, node: &Self::Node)
    -> Result<(), DomError>;

    /// Insert `node` immediately after `reference`.
    fn insert_after(&self, reference: &Self::Node, node: &Self::Node) -> Result<(), DomError>;

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

    /// Create a detached text node.
    fn create_text(&self, data: &str) -> Result<Self::Node, DomError>;

    /// `Node.nextSibling`.
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// `Node.textContent` (empty string when absent).
    fn text_content(&self, node: &Self::Node) -> String;

    /// Dispatch a synthetic event on `target`.
    fn dispatch(&self, target: &Self::Node, event: SyntheticEvent) -> Result<(), DomError>;

    /// Install a capture-phase key-down listener on `node`.
    fn listen_key_down(&self, node: &Self::Node, handler: KeyDownHandler) -> Result<(), DomError>;

    /// Install a capture-phase before-input listener on `node`.
    fn listen_before_input(
        &self,
        node: &Self::Node,
        handler: BeforeInputHandler<Self::Node>,
    ) -> Result<(), DomError>;

    /// Subscribe to child-list changes anywhere under `root`.
    fn observe_structure(
        &self,
        root: &Self::Node,
        callback: MutationCallback,
    ) -> Result<(), DomError>;
}
