use crate::dom::{
    BeforeInputHandler, BoundaryPoint, Dom, DomRange, KeyDownHandler, MutationCallback,
    SyntheticEvent,
};
use crate::error::DomError;
use crate::event::{BeforeInput, Disposition, KeyInput};
use crate::selector::{ElementView, Selector};
use crate::text::{utf16_len, utf16_to_byte};
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Node handle of a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An event dispatched through [`Dom::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchedEvent {
    /// Dispatch target.
    pub target: NodeId,
    /// The event.
    pub event: SyntheticEvent,
}

/// Bubble-phase key-down handler registered by the "page".
pub type PageKeyHandler = Rc<dyn Fn(&KeyInput)>;

#[derive(Debug, Clone)]
struct FieldState {
    value: String,
    selection: (u32, u32),
}

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        field: Option<FieldState>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct ElementRef<'a> {
    tag: &'a str,
    attributes: &'a BTreeMap<String, String>,
}

impl ElementView for ElementRef<'_> {
    fn tag(&self) -> &str {
        self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

struct Tree {
    nodes: Vec<Slot>,
    root: NodeId,
    body: NodeId,
    selection: Option<DomRange<NodeId>>,
    focused: Option<NodeId>,
    clicks: Vec<NodeId>,
    events: Vec<DispatchedEvent>,
    structure_changed: bool,
}

#[derive(Default)]
struct Listeners {
    key_down: Vec<(NodeId, KeyDownHandler)>,
    before_input: Vec<(NodeId, BeforeInputHandler<NodeId>)>,
    page_key_down: Vec<(NodeId, PageKeyHandler)>,
    observers: Vec<(NodeId, MutationCallback)>,
}

/// An in-memory document implementing [`Dom`].
///
/// Models just enough of the platform for the engine: an element/text tree with attributes,
/// text-field values, one selection range, focus, clicks, capture listeners, bubble-phase page
/// handlers for key-down, and structural-change observers. Dispatched events and clicks are
/// recorded for assertions.
///
/// Mutation observers are not called synchronously: structural changes set a flag and
/// [`MemoryDom::flush_mutations`] delivers one notification, like the platform's microtask
/// batching.
pub struct MemoryDom {
    tree: RefCell<Tree>,
    listeners: RefCell<Listeners>,
    fault: Cell<Option<Fault>>,
}

/// A host operation [`MemoryDom`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `listen_key_down` and `listen_before_input` fail.
    ListenerInstall,
    /// `insert_at` and `insert_after` fail.
    NodeInsertion,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// A document with `<html><body></body></html>`.
    pub fn new() -> Self {
        let root = Slot {
            data: NodeData::Element {
                tag: "html".to_string(),
                attributes: BTreeMap::new(),
                field: None,
            },
            parent: None,
            children: vec![NodeId(1)],
        };
        let body = Slot {
            data: NodeData::Element {
                tag: "body".to_string(),
                attributes: BTreeMap::new(),
                field: None,
            },
            parent: Some(NodeId(0)),
            children: Vec::new(),
        };
        Self {
            tree: RefCell::new(Tree {
                nodes: vec![root, body],
                root: NodeId(0),
                body: NodeId(1),
                selection: None,
                focused: None,
                clicks: Vec::new(),
                events: Vec::new(),
                structure_changed: false,
            }),
            listeners: RefCell::new(Listeners::default()),
            fault: Cell::new(None),
        }
    }

    /// The `body` element.
    pub fn body_id(&self) -> NodeId {
        self.tree.borrow().body
    }

    /// Append an element with `attributes` to `parent`. `textarea` and `input` get an empty
    /// field value.
    pub fn append_element(&self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let node = tree.create_element(tag);
        if let NodeData::Element { attributes: attrs, .. } = &mut tree.slot_mut(node).data {
            for (name, value) in attributes {
                attrs.insert(name.to_ascii_lowercase(), value.to_string());
            }
        }
        tree.insert_child(parent, node, None);
        node
    }

    /// Append a text node to `parent`.
    pub fn append_text(&self, parent: NodeId, text: &str) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let node = tree.create_text(text);
        tree.insert_child(parent, node, None);
        node
    }

    /// Detach `node` from its parent.
    pub fn remove(&self, node: NodeId) {
        self.tree.borrow_mut().detach(node);
    }

    /// Set or remove an attribute (test setup; never fails).
    pub fn put_attribute(&self, node: NodeId, name: &str, value: Option<&str>) {
        let mut tree = self.tree.borrow_mut();
        if let NodeData::Element { attributes, .. } = &mut tree.slot_mut(node).data {
            match value {
                Some(value) => attributes.insert(name.to_string(), value.to_string()),
                None => attributes.remove(name),
            };
        }
    }

    /// Set a text field's value and selection.
    pub fn set_field(&self, node: NodeId, value: &str, start: u32, end: u32) {
        let mut tree = self.tree.borrow_mut();
        if let NodeData::Element { field: Some(field), .. } = &mut tree.slot_mut(node).data {
            field.value = value.to_string();
            field.selection = (start, end);
        }
    }

    /// Make `fault` fail from now on, or clear it with `None`.
    pub fn inject_fault(&self, fault: Option<Fault>) {
        self.fault.set(fault);
    }

    fn check_fault(&self, operation: Fault) -> Result<(), DomError> {
        if self.fault.get() == Some(operation) {
            return Err(DomError::Host(format!("{operation:?} failed")));
        }
        Ok(())
    }

    /// Replace the document selection.
    pub fn set_selection(&self, range: Option<DomRange<NodeId>>) {
        self.tree.borrow_mut().selection = range;
    }

    /// Collapse the document selection at `node`/`offset`.
    pub fn set_caret(&self, node: NodeId, offset: u32) {
        self.set_selection(Some(DomRange::caret(node, offset)));
    }

    /// Currently focused node.
    pub fn focused(&self) -> Option<NodeId> {
        self.tree.borrow().focused
    }

    /// Children of `node`.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree.borrow().slot(node).children.clone()
    }

    /// Parent of `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().slot(node).parent
    }

    /// Serialized children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let tree = self.tree.borrow();
        let mut out = String::new();
        for &child in &tree.slot(node).children {
            tree.serialize(child, &mut out);
        }
        out
    }

    /// Every event dispatched so far.
    pub fn events(&self) -> Vec<DispatchedEvent> {
        self.tree.borrow().events.clone()
    }

    /// Events dispatched on `target`.
    pub fn events_on(&self, target: NodeId) -> Vec<SyntheticEvent> {
        self.tree
            .borrow()
            .events
            .iter()
            .filter(|e| e.target == target)
            .map(|e| e.event)
            .collect()
    }

    /// Number of `input` events dispatched on `target`.
    pub fn input_event_count(&self, target: NodeId) -> usize {
        self.events_on(target)
            .iter()
            .filter(|e| matches!(e, SyntheticEvent::Input { .. }))
            .count()
    }

    /// Forget recorded events and clicks.
    pub fn clear_log(&self) {
        let mut tree = self.tree.borrow_mut();
        tree.events.clear();
        tree.clicks.clear();
    }

    /// Every clicked node, in order.
    pub fn clicks(&self) -> Vec<NodeId> {
        self.tree.borrow().clicks.clone()
    }

    /// Capture listeners installed on `node` as `(key_down, before_input)`.
    pub fn listener_count(&self, node: NodeId) -> (usize, usize) {
        let listeners = self.listeners.borrow();
        (
            listeners.key_down.iter().filter(|(n, _)| *n == node).count(),
            listeners
                .before_input
                .iter()
                .filter(|(n, _)| *n == node)
                .count(),
        )
    }

    /// Register a bubble-phase key-down handler, standing in for the page's own bindings.
    pub fn on_page_key_down(&self, node: NodeId, handler: impl Fn(&KeyInput) + 'static) {
        self.listeners
            .borrow_mut()
            .page_key_down
            .push((node, Rc::new(handler)));
    }

    /// Simulate a user key-down on `node`: capture listeners first, then page handlers unless
    /// a capture listener canceled the event.
    pub fn key_down(&self, node: NodeId, input: &KeyInput) -> Disposition {
        let capture: Vec<KeyDownHandler> = self
            .listeners
            .borrow()
            .key_down
            .iter()
            .filter(|(n, _)| *n == node)
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in capture {
            if handler(input).is_cancel() {
                return Disposition::Cancel;
            }
        }

        let page: Vec<PageKeyHandler> = {
            let tree = self.tree.borrow();
            self.listeners
                .borrow()
                .page_key_down
                .iter()
                .filter(|(n, _)| tree.is_inclusive_ancestor(*n, node))
                .map(|(_, h)| Rc::clone(h))
                .collect()
        };
        for handler in page {
            handler(input);
        }
        Disposition::Proceed
    }

    /// Simulate a before-input notification on `node`.
    pub fn before_input(&self, node: NodeId, input: &BeforeInput<NodeId>) -> Disposition {
        let capture: Vec<BeforeInputHandler<NodeId>> = self
            .listeners
            .borrow()
            .before_input
            .iter()
            .filter(|(n, _)| *n == node)
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in capture {
            if handler(input).is_cancel() {
                return Disposition::Cancel;
            }
        }
        Disposition::Proceed
    }

    /// Deliver one structural-change notification to every observer if the tree changed since
    /// the last flush. Returns whether observers ran.
    pub fn flush_mutations(&self) -> bool {
        if !std::mem::take(&mut self.tree.borrow_mut().structure_changed) {
            return false;
        }
        let observers: Vec<MutationCallback> = self
            .listeners
            .borrow()
            .observers
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for observer in observers {
            observer();
        }
        true
    }
}

impl Tree {
    fn slot(&self, node: NodeId) -> &Slot {
        &self.nodes[node.0]
    }

    fn slot_mut(&mut self, node: NodeId) -> &mut Slot {
        &mut self.nodes[node.0]
    }

    fn get(&self, node: NodeId) -> Result<&Slot, DomError> {
        self.nodes.get(node.0).ok_or(DomError::Detached)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let field = matches!(tag.as_str(), "textarea" | "input").then(|| FieldState {
            value: String::new(),
            selection: (0, 0),
        });
        self.push(NodeData::Element {
            tag,
            attributes: BTreeMap::new(),
            field,
        })
    }

    fn create_text(&mut self, data: &str) -> NodeId {
        self.push(NodeData::Text(data.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn element(&self, node: NodeId) -> Option<ElementRef<'_>> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Element {
                tag, attributes, ..
            } => Some(ElementRef { tag, attributes }),
            NodeData::Text(_) => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.0)?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    fn field_mut(&mut self, node: NodeId) -> Result<&mut FieldState, DomError> {
        match &mut self.nodes.get_mut(node.0).ok_or(DomError::Detached)?.data {
            NodeData::Element {
                field: Some(field), ..
            } => Ok(field),
            _ => Err(DomError::InvalidNode("not a text field")),
        }
    }

    fn length(&self, node: NodeId) -> u32 {
        match &self.slot(node).data {
            NodeData::Text(text) => utf16_len(text),
            NodeData::Element { .. } => self.slot(node).children.len() as u32,
        }
    }

    fn index_of(&self, node: NodeId) -> Option<usize> {
        let parent = self.slot(node).parent?;
        self.slot(parent).children.iter().position(|&c| c == node)
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.slot(n).parent;
        }
        false
    }

    fn is_connected(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len() && self.is_inclusive_ancestor(self.root, node)
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.slot(node).parent {
            self.slot_mut(parent).children.retain(|&c| c != node);
            self.slot_mut(node).parent = None;
            self.structure_changed = true;
        }
    }

    fn insert_child(&mut self, parent: NodeId, node: NodeId, index: Option<usize>) {
        self.detach(node);
        let children = &mut self.slot_mut(parent).children;
        let index = index.unwrap_or(children.len()).min(children.len());
        children.insert(index, node);
        self.slot_mut(node).parent = Some(parent);
        self.structure_changed = true;
    }

    fn text_content(&self, node: NodeId) -> String {
        match &self.slot(node).data {
            NodeData::Text(text) => text.clone(),
            NodeData::Element { .. } => self
                .slot(node)
                .children
                .iter()
                .map(|&c| self.text_content(c))
                .collect(),
        }
    }

    fn preorder_from(&self, start: NodeId, include_start: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if node != start || include_start {
                out.push(node);
            }
            stack.extend(self.slot(node).children.iter().rev());
        }
        out
    }

    fn matches_any(&self, node: NodeId, selectors: &[Selector]) -> bool {
        self.element(node)
            .is_some_and(|el| selectors.iter().any(|s| s.matches(&el)))
    }

    fn validate(&self, point: &BoundaryPoint<NodeId>) -> Result<(), DomError> {
        if !self.is_connected(point.node) {
            return Err(DomError::Detached);
        }
        let length = self.length(point.node);
        if point.offset > length {
            return Err(DomError::IndexSize {
                offset: point.offset,
                length,
            });
        }
        Ok(())
    }

    fn common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let mut current = Some(b);
        while let Some(n) = current {
            if self.is_inclusive_ancestor(n, a) {
                return n;
            }
            current = self.slot(n).parent;
        }
        self.root
    }

    /// Tree-order comparison of two boundary points, following the DOM algorithm.
    fn compare_points(&self, a: &BoundaryPoint<NodeId>, b: &BoundaryPoint<NodeId>) -> Ordering {
        if a.node == b.node {
            return a.offset.cmp(&b.offset);
        }
        if self.is_inclusive_ancestor(a.node, b.node) {
            // Child of `a.node` containing `b.node`.
            let mut child = b.node;
            while self.slot(child).parent != Some(a.node) {
                match self.slot(child).parent {
                    Some(p) => child = p,
                    None => break,
                }
            }
            let index = self.index_of(child).unwrap_or(0) as u32;
            return if index < a.offset {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        if self.is_inclusive_ancestor(b.node, a.node) {
            return self.compare_points(b, a).reverse();
        }
        // Neither contains the other: compare the positions of the diverging ancestors.
        let common = self.common_ancestor(a.node, b.node);
        let order = self.preorder_from(common, true);
        let pos = |n: NodeId| order.iter().position(|&o| o == n).unwrap_or(0);
        pos(a.node).cmp(&pos(b.node))
    }

    fn fully_contained(&self, node: NodeId, range: &DomRange<NodeId>) -> bool {
        let (Some(parent), Some(index)) = (self.slot(node).parent, self.index_of(node)) else {
            return false;
        };
        let before = BoundaryPoint::new(parent, index as u32);
        let after = BoundaryPoint::new(parent, index as u32 + 1);
        self.compare_points(&before, &range.start) != Ordering::Less
            && self.compare_points(&after, &range.end) != Ordering::Greater
    }

    fn serialize(&self, node: NodeId, out: &mut String) {
        match &self.slot(node).data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element {
                tag, attributes, ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                out.push('>');
                if matches!(tag.as_str(), "br" | "input") {
                    return;
                }
                for &child in &self.slot(node).children {
                    self.serialize(child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn document_element(&self) -> NodeId {
        self.tree.borrow().root
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.tree.borrow().body)
    }

    fn query_first(&self, scope: Option<&NodeId>, selectors: &[Selector]) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let candidates = match scope {
            Some(&scope) => tree.preorder_from(scope, false),
            None => tree.preorder_from(tree.root, true),
        };
        candidates
            .into_iter()
            .find(|&n| tree.matches_any(n, selectors))
    }

    fn closest(&self, node: &NodeId, selectors: &[Selector]) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let mut current = Some(*node);
        while let Some(n) = current {
            if tree.matches_any(n, selectors) {
                return Some(n);
            }
            current = tree.slot(n).parent;
        }
        None
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.tree.borrow().is_inclusive_ancestor(*ancestor, *node)
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        self.tree.borrow().element(*node).map(|el| el.tag.to_string())
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        tree.element(*node)
            .and_then(|el| el.attribute(name).map(str::to_string))
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        match &mut tree
            .nodes
            .get_mut(node.0)
            .ok_or(DomError::Detached)?
            .data
        {
            NodeData::Element { attributes, .. } => {
                attributes.insert(name.to_ascii_lowercase(), value.to_string());
                Ok(())
            }
            NodeData::Text(_) => Err(DomError::InvalidNode("text nodes have no attributes")),
        }
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    fn is_content_editable(&self, node: &NodeId) -> bool {
        let tree = self.tree.borrow();
        let mut current = Some(*node);
        while let Some(n) = current {
            if let Some(value) = tree
                .element(n)
                .and_then(|el| el.attributes.get("contenteditable").map(String::as_str))
            {
                return matches!(value, "" | "true" | "plaintext-only");
            }
            current = tree.slot(n).parent;
        }
        false
    }

    fn is_disabled(&self, node: &NodeId) -> bool {
        self.attribute(node, "disabled").is_some()
    }

    fn click(&self, node: &NodeId) {
        self.tree.borrow_mut().clicks.push(*node);
    }

    fn is_focused(&self, node: &NodeId) -> bool {
        self.tree.borrow().focused == Some(*node)
    }

    fn focus(&self, node: &NodeId) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        if !tree.is_connected(*node) {
            return Err(DomError::Detached);
        }
        tree.focused = Some(*node);
        Ok(())
    }

    fn field_value(&self, node: &NodeId) -> Option<String> {
        self.tree.borrow_mut().field_mut(*node).ok().map(|f| f.value.clone())
    }

    fn field_selection(&self, node: &NodeId) -> Option<(u32, u32)> {
        self.tree.borrow_mut().field_mut(*node).ok().map(|f| f.selection)
    }

    fn set_field_value(&self, node: &NodeId, value: &str) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        let field = tree.field_mut(*node)?;
        field.value = value.to_string();
        // Assigning a value moves the cursor to the end, as on the platform.
        let end = utf16_len(value);
        field.selection = (end, end);
        Ok(())
    }

    fn set_field_selection(&self, node: &NodeId, start: u32, end: u32) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        let field = tree.field_mut(*node)?;
        let len = utf16_len(&field.value);
        let end = end.min(len);
        field.selection = (start.min(end), end);
        Ok(())
    }

    fn selection_range(&self) -> Option<DomRange<NodeId>> {
        self.tree.borrow().selection.clone()
    }

    fn collapse_selection_after(&self, node: &NodeId) -> Result<(), DomError> {
        let mut tree = self.tree.borrow_mut();
        let parent = tree.get(*node)?.parent.ok_or(DomError::Detached)?;
        let index = tree.index_of(*node).ok_or(DomError::Detached)?;
        tree.selection = Some(DomRange::caret(parent, index as u32 + 1));
        Ok(())
    }

    fn common_ancestor(&self, range: &DomRange<NodeId>) -> Result<NodeId, DomError> {
        let tree = self.tree.borrow();
        tree.validate(&range.start)?;
        tree.validate(&range.end)?;
        Ok(tree.common_ancestor(range.start.node, range.end.node))
    }

    fn delete_contents(&self, range: &DomRange<NodeId>) -> Result<BoundaryPoint<NodeId>, DomError> {
        let mut tree = self.tree.borrow_mut();
        tree.validate(&range.start)?;
        tree.validate(&range.end)?;
        let (start, end) = (&range.start, &range.end);

        if start.node == end.node {
            let node = start.node;
            if let NodeData::Text(text) = &mut tree.slot_mut(node).data {
                let from = utf16_to_byte(text, start.offset);
                let to = utf16_to_byte(text, end.offset).max(from);
                text.replace_range(from..to, "");
            } else {
                let children: Vec<NodeId> = tree.slot(node).children
                    [start.offset as usize..(end.offset as usize).max(start.offset as usize)]
                    .to_vec();
                for child in children {
                    tree.detach(child);
                }
            }
            return Ok(start.clone());
        }

        let common = tree.common_ancestor(start.node, end.node);
        let contained: Vec<NodeId> = tree
            .preorder_from(common, false)
            .into_iter()
            .filter(|&n| tree.fully_contained(n, range))
            .collect();
        let outermost: Vec<NodeId> = contained
            .iter()
            .copied()
            .filter(|&n| {
                tree.slot(n)
                    .parent
                    .is_none_or(|p| !contained.contains(&p))
            })
            .collect();

        let collapsed = if tree.is_inclusive_ancestor(start.node, end.node) {
            start.clone()
        } else {
            let mut reference = start.node;
            while let Some(parent) = tree.slot(reference).parent {
                if tree.is_inclusive_ancestor(parent, end.node) {
                    break;
                }
                reference = parent;
            }
            let parent = tree.slot(reference).parent.ok_or(DomError::Detached)?;
            let index = tree.index_of(reference).ok_or(DomError::Detached)? as u32;
            // Text containers stay in place (truncated), so the point lands after them.
            BoundaryPoint::new(parent, index + 1)
        };

        if let NodeData::Text(text) = &mut tree.slot_mut(start.node).data {
            let from = utf16_to_byte(text, start.offset);
            text.truncate(from);
        }
        if let NodeData::Text(text) = &mut tree.slot_mut(end.node).data {
            let to = utf16_to_byte(text, end.offset);
            text.replace_range(..to, "");
        }
        for node in outermost {
            tree.detach(node);
        }

        Ok(collapsed)
    }

    fn insert_at(&self, point: &BoundaryPoint<NodeId>, node: &NodeId) -> Result<(), DomError> {
        self.check_fault(Fault::NodeInsertion)?;
        let mut tree = self.tree.borrow_mut();
        tree.validate(point)?;
        tree.get(*node)?;

        if let Some(text) = tree.text(point.node) {
            // Split the text container and insert between the halves.
            let at = utf16_to_byte(text, point.offset);
            let tail = text[at..].to_string();
            let parent = tree.slot(point.node).parent.ok_or(DomError::Detached)?;
            let index = tree.index_of(point.node).ok_or(DomError::Detached)?;
            if let NodeData::Text(text) = &mut tree.slot_mut(point.node).data {
                text.truncate(at);
            }
            let tail = tree.create_text(&tail);
            tree.insert_child(parent, tail, Some(index + 1));
            tree.insert_child(parent, *node, Some(index + 1));
        } else {
            tree.insert_child(point.node, *node, Some(point.offset as usize));
        }
        Ok(())
    }

    fn insert_after(&self, reference: &NodeId, node: &NodeId) -> Result<(), DomError> {
        self.check_fault(Fault::NodeInsertion)?;
        let mut tree = self.tree.borrow_mut();
        let parent = tree.get(*reference)?.parent.ok_or(DomError::Detached)?;
        let index = tree.index_of(*reference).ok_or(DomError::Detached)?;
        tree.insert_child(parent, *node, Some(index + 1));
        Ok(())
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        Ok(self.tree.borrow_mut().create_element(tag))
    }

    fn create_text(&self, data: &str) -> Result<NodeId, DomError> {
        Ok(self.tree.borrow_mut().create_text(data))
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let parent = tree.slot(*node).parent?;
        let index = tree.index_of(*node)?;
        tree.slot(parent).children.get(index + 1).copied()
    }

    fn text_content(&self, node: &NodeId) -> String {
        self.tree.borrow().text_content(*node)
    }

    fn dispatch(&self, target: &NodeId, event: SyntheticEvent) -> Result<(), DomError> {
        {
            let mut tree = self.tree.borrow_mut();
            if !tree.is_connected(*target) {
                return Err(DomError::Detached);
            }
            tree.events.push(DispatchedEvent {
                target: *target,
                event,
            });
        }
        if let Some(input) = event.as_key_input() {
            self.key_down(*target, &input);
        }
        Ok(())
    }

    fn listen_key_down(&self, node: &NodeId, handler: KeyDownHandler) -> Result<(), DomError> {
        self.check_fault(Fault::ListenerInstall)?;
        self.listeners.borrow_mut().key_down.push((*node, handler));
        Ok(())
    }

    fn listen_before_input(
        &self,
        node: &NodeId,
        handler: BeforeInputHandler<NodeId>,
    ) -> Result<(), DomError> {
        self.check_fault(Fault::ListenerInstall)?;
        self.listeners
            .borrow_mut()
            .before_input
            .push((*node, handler));
        Ok(())
    }

    fn observe_structure(&self, root: &NodeId, callback: MutationCallback) -> Result<(), DomError> {
        self.listeners.borrow_mut().observers.push((*root, callback));
        Ok(())
    }
}
