//! Platform events to engine event data, and JS value plumbing.

use ctrl_enter_core::{BeforeInput, BoundaryPoint, DomError, DomRange, InputType, KeyInput};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, InputEvent, KeyboardEvent, Node};

pub fn key_input(event: &KeyboardEvent) -> KeyInput {
    KeyInput {
        key: event.key(),
        code: event.code(),
        ctrl: event.ctrl_key(),
        meta: event.meta_key(),
        shift: event.shift_key(),
        composing: event.is_composing(),
    }
}

pub fn before_input(event: &InputEvent) -> BeforeInput<Node> {
    BeforeInput {
        input_type: InputType::parse(&event.input_type()),
        composing: event.is_composing(),
        cancelable: event.cancelable(),
        target_ranges: target_ranges(event),
    }
}

/// `InputEvent.getTargetRanges()`, empty where the method is missing.
fn target_ranges(event: &InputEvent) -> Vec<DomRange<Node>> {
    let Ok(method) = Reflect::get(event, &JsValue::from_str("getTargetRanges")) else {
        return Vec::new();
    };
    let Some(method) = method.dyn_ref::<Function>() else {
        return Vec::new();
    };
    let ranges = match method.call0(event) {
        Ok(ranges) => ranges,
        Err(err) => {
            tracing::debug!(error = %describe(&err), "getTargetRanges failed");
            return Vec::new();
        }
    };
    match ranges.dyn_into::<Array>() {
        Ok(ranges) => ranges.iter().filter_map(|r| static_range(&r)).collect(),
        Err(_) => Vec::new(),
    }
}

fn static_range(range: &JsValue) -> Option<DomRange<Node>> {
    Some(DomRange::new(
        boundary(range, "startContainer", "startOffset")?,
        boundary(range, "endContainer", "endOffset")?,
    ))
}

fn boundary(range: &JsValue, container: &str, offset: &str) -> Option<BoundaryPoint<Node>> {
    let node = Reflect::get(range, &JsValue::from_str(container))
        .ok()?
        .dyn_into::<Node>()
        .ok()?;
    let offset = Reflect::get(range, &JsValue::from_str(offset)).ok()?.as_f64()?;
    Some(BoundaryPoint::new(node, offset as u32))
}

/// Full cancellation: the page's own listeners never see the event.
pub fn cancel(event: &Event) {
    event.prevent_default();
    event.stop_propagation();
    event.stop_immediate_propagation();
}

/// A plain object with the given properties, for event and observer init dictionaries.
pub fn dictionary(entries: &[(&str, JsValue)]) -> Result<Object, JsValue> {
    let object = Object::new();
    for (name, value) in entries {
        Reflect::set(&object, &JsValue::from_str(name), value)?;
    }
    Ok(object)
}

/// Best-effort message of a thrown JS value.
pub fn describe(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

pub fn host_error(err: JsValue) -> DomError {
    DomError::Host(describe(&err))
}
