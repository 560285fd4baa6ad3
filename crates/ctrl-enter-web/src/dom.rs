//! [`Dom`] over `web-sys`.

use crate::convert::{self, describe, dictionary, host_error};
use ctrl_enter_core::selector::to_css_list;
use ctrl_enter_core::{
    BeforeInputHandler, BoundaryPoint, Dom, DomError, DomRange, KeyDownHandler, MutationCallback,
    Selector, SyntheticEvent, SyntheticKey,
};
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventInit, HtmlButtonElement, HtmlElement, HtmlInputElement,
    HtmlTextAreaElement, InputEvent, KeyboardEvent, KeyboardEventInit, MutationObserver,
    MutationObserverInit, Node, Range, Selection, Window,
};

enum Field {
    Area(HtmlTextAreaElement),
    Input(HtmlInputElement),
}

impl Field {
    fn of(node: &Node) -> Option<Self> {
        if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            Some(Self::Area(area.clone()))
        } else {
            node.dyn_ref::<HtmlInputElement>()
                .map(|input| Self::Input(input.clone()))
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Area(area) => area.value(),
            Self::Input(input) => input.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            Self::Area(area) => area.set_value(value),
            Self::Input(input) => input.set_value(value),
        }
    }

    // `input` types without a text cursor (checkbox, number, ...) report null.
    fn selection(&self) -> Option<(u32, u32)> {
        let (start, end) = match self {
            Self::Area(area) => (area.selection_start(), area.selection_end()),
            Self::Input(input) => (input.selection_start(), input.selection_end()),
        };
        Some((start.ok()??, end.ok()??))
    }

    fn set_selection(&self, start: u32, end: u32) -> Result<(), JsValue> {
        match self {
            Self::Area(area) => area.set_selection_range(start, end),
            Self::Input(input) => input.set_selection_range(start, end),
        }
    }
}

/// The live page document.
pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    /// The current window's document.
    pub fn new() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or(DomError::Host("no window".to_string()))?;
        let document = window
            .document()
            .ok_or(DomError::Host("no document".to_string()))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn selection(&self) -> Option<Selection> {
        self.window.get_selection().ok().flatten()
    }

    fn live_range(&self, range: &DomRange<Node>) -> Result<Range, DomError> {
        for point in [&range.start, &range.end] {
            if !point.node.is_connected() {
                return Err(DomError::Detached);
            }
        }
        let live = self.document.create_range().map_err(host_error)?;
        live.set_start(&range.start.node, range.start.offset)
            .map_err(host_error)?;
        live.set_end(&range.end.node, range.end.offset)
            .map_err(host_error)?;
        Ok(live)
    }

    fn build_event(&self, event: SyntheticEvent) -> Result<Event, JsValue> {
        match event {
            SyntheticEvent::Input { composed } => {
                let init = dictionary(&[
                    ("bubbles", JsValue::TRUE),
                    ("composed", JsValue::from_bool(composed)),
                ])?;
                Event::new_with_event_init_dict("input", init.unchecked_ref::<EventInit>())
            }
            SyntheticEvent::KeyDown(key) => {
                let init = dictionary(&[
                    ("key", JsValue::from_str(SyntheticKey::KEY)),
                    ("code", JsValue::from_str(SyntheticKey::KEY)),
                    ("keyCode", JsValue::from(SyntheticKey::KEY_CODE)),
                    ("which", JsValue::from(SyntheticKey::KEY_CODE)),
                    ("shiftKey", JsValue::from_bool(key.shift)),
                    ("bubbles", JsValue::TRUE),
                    ("cancelable", JsValue::TRUE),
                    ("composed", JsValue::from_bool(key.composed)),
                ])?;
                KeyboardEvent::new_with_keyboard_event_init_dict(
                    "keydown",
                    init.unchecked_ref::<KeyboardEventInit>(),
                )
                .map(Event::from)
            }
        }
    }
}

fn element(node: &Node) -> Option<&Element> {
    node.dyn_ref::<Element>()
}

fn html_element(node: &Node) -> Result<&HtmlElement, DomError> {
    node.dyn_ref::<HtmlElement>()
        .ok_or(DomError::InvalidNode("not an HTML element"))
}

impl Dom for WebDom {
    type Node = Node;

    fn document_element(&self) -> Node {
        self.document
            .document_element()
            .map(Node::from)
            .unwrap_or_else(|| self.document.clone().into())
    }

    fn body(&self) -> Option<Node> {
        self.document.body().map(Node::from)
    }

    fn query_first(&self, scope: Option<&Node>, selectors: &[Selector]) -> Option<Node> {
        if selectors.is_empty() {
            return None;
        }
        let css = to_css_list(selectors);
        let found = match scope {
            Some(scope) => element(scope)?.query_selector(&css),
            None => self.document.query_selector(&css),
        };
        match found {
            Ok(found) => found.map(Node::from),
            Err(err) => {
                tracing::debug!(%css, error = %describe(&err), "querySelector rejected selector");
                None
            }
        }
    }

    fn closest(&self, node: &Node, selectors: &[Selector]) -> Option<Node> {
        if selectors.is_empty() {
            return None;
        }
        let start = match element(node) {
            Some(el) => el.clone(),
            None => node.parent_element()?,
        };
        start
            .closest(&to_css_list(selectors))
            .ok()
            .flatten()
            .map(Node::from)
    }

    fn contains(&self, ancestor: &Node, node: &Node) -> bool {
        ancestor.contains(Some(node))
    }

    fn tag_name(&self, node: &Node) -> Option<String> {
        element(node).map(|el| el.tag_name().to_ascii_lowercase())
    }

    fn attribute(&self, node: &Node, name: &str) -> Option<String> {
        element(node)?.get_attribute(name)
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) -> Result<(), DomError> {
        element(node)
            .ok_or(DomError::InvalidNode("not an element"))?
            .set_attribute(name, value)
            .map_err(host_error)
    }

    fn has_class(&self, node: &Node, class: &str) -> bool {
        element(node).is_some_and(|el| el.class_list().contains(class))
    }

    fn is_content_editable(&self, node: &Node) -> bool {
        node.dyn_ref::<HtmlElement>()
            .is_some_and(HtmlElement::is_content_editable)
    }

    fn is_disabled(&self, node: &Node) -> bool {
        if let Some(button) = node.dyn_ref::<HtmlButtonElement>() {
            return button.disabled();
        }
        element(node).is_some_and(|el| el.has_attribute("disabled"))
    }

    fn click(&self, node: &Node) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            el.click();
        }
    }

    fn is_focused(&self, node: &Node) -> bool {
        self.document
            .active_element()
            .is_some_and(|active| Node::from(active) == *node)
    }

    fn focus(&self, node: &Node) -> Result<(), DomError> {
        html_element(node)?.focus().map_err(host_error)
    }

    fn field_value(&self, node: &Node) -> Option<String> {
        Field::of(node).map(|field| field.value())
    }

    fn field_selection(&self, node: &Node) -> Option<(u32, u32)> {
        Field::of(node)?.selection()
    }

    fn set_field_value(&self, node: &Node, value: &str) -> Result<(), DomError> {
        Field::of(node)
            .ok_or(DomError::InvalidNode("not a text field"))?
            .set_value(value);
        Ok(())
    }

    fn set_field_selection(&self, node: &Node, start: u32, end: u32) -> Result<(), DomError> {
        Field::of(node)
            .ok_or(DomError::InvalidNode("not a text field"))?
            .set_selection(start, end)
            .map_err(host_error)
    }

    fn selection_range(&self) -> Option<DomRange<Node>> {
        let selection = self.selection()?;
        if selection.range_count() == 0 {
            return None;
        }
        let range = selection.get_range_at(0).ok()?;
        Some(DomRange::new(
            BoundaryPoint::new(range.start_container().ok()?, range.start_offset().ok()?),
            BoundaryPoint::new(range.end_container().ok()?, range.end_offset().ok()?),
        ))
    }

    fn collapse_selection_after(&self, node: &Node) -> Result<(), DomError> {
        let range = self.document.create_range().map_err(host_error)?;
        range.set_start_after(node).map_err(host_error)?;
        range.collapse_with_to_start(true);
        let selection = self
            .selection()
            .ok_or(DomError::Host("no selection".to_string()))?;
        selection.remove_all_ranges().map_err(host_error)?;
        selection.add_range(&range).map_err(host_error)
    }

    fn common_ancestor(&self, range: &DomRange<Node>) -> Result<Node, DomError> {
        self.live_range(range)?
            .common_ancestor_container()
            .map_err(host_error)
    }

    fn delete_contents(&self, range: &DomRange<Node>) -> Result<BoundaryPoint<Node>, DomError> {
        let live = self.live_range(range)?;
        live.delete_contents().map_err(host_error)?;
        Ok(BoundaryPoint::new(
            live.start_container().map_err(host_error)?,
            live.start_offset().map_err(host_error)?,
        ))
    }

    fn insert_at(&self, point: &BoundaryPoint<Node>, node: &Node) -> Result<(), DomError> {
        let live = self.live_range(&DomRange::caret(point.node.clone(), point.offset))?;
        live.insert_node(node).map_err(host_error)
    }

    fn insert_after(&self, reference: &Node, node: &Node) -> Result<(), DomError> {
        let parent = reference.parent_node().ok_or(DomError::Detached)?;
        parent
            .insert_before(node, reference.next_sibling().as_ref())
            .map(|_| ())
            .map_err(host_error)
    }

    fn create_element(&self, tag: &str) -> Result<Node, DomError> {
        self.document
            .create_element(tag)
            .map(Node::from)
            .map_err(host_error)
    }

    fn create_text(&self, data: &str) -> Result<Node, DomError> {
        Ok(self.document.create_text_node(data).into())
    }

    fn next_sibling(&self, node: &Node) -> Option<Node> {
        node.next_sibling()
    }

    fn text_content(&self, node: &Node) -> String {
        node.text_content().unwrap_or_default()
    }

    fn dispatch(&self, target: &Node, event: SyntheticEvent) -> Result<(), DomError> {
        let event = self.build_event(event).map_err(host_error)?;
        target.dispatch_event(&event).map(|_| ()).map_err(host_error)
    }

    fn listen_key_down(&self, node: &Node, handler: KeyDownHandler) -> Result<(), DomError> {
        let listener = Closure::<dyn Fn(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if handler(&convert::key_input(&event)).is_cancel() {
                convert::cancel(&event);
            }
        });
        node.add_event_listener_with_callback_and_bool(
            "keydown",
            listener.as_ref().unchecked_ref(),
            true,
        )
        .map_err(host_error)?;
        // Lives as long as the element.
        listener.forget();
        Ok(())
    }

    fn listen_before_input(
        &self,
        node: &Node,
        handler: BeforeInputHandler<Node>,
    ) -> Result<(), DomError> {
        let listener = Closure::<dyn Fn(InputEvent)>::new(move |event: InputEvent| {
            if handler(&convert::before_input(&event)).is_cancel() {
                convert::cancel(&event);
            }
        });
        node.add_event_listener_with_callback_and_bool(
            "beforeinput",
            listener.as_ref().unchecked_ref(),
            true,
        )
        .map_err(host_error)?;
        listener.forget();
        Ok(())
    }

    fn observe_structure(&self, root: &Node, callback: MutationCallback) -> Result<(), DomError> {
        let listener = Closure::<dyn Fn()>::new(move || callback());
        let observer =
            MutationObserver::new(listener.as_ref().unchecked_ref()).map_err(host_error)?;
        let options = dictionary(&[("childList", JsValue::TRUE), ("subtree", JsValue::TRUE)])
            .map_err(host_error)?;
        observer
            .observe_with_options(root, options.unchecked_ref::<MutationObserverInit>())
            .map_err(host_error)?;
        listener.forget();
        Ok(())
    }
}
