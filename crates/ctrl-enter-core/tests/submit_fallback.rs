mod common;

use common::Harness;
use ctrl_enter_core::memory::MemoryDom;
use ctrl_enter_core::{
    Disposition, Dom, KeyInput, SiteFamily, StateRequest, SubmitDispatcher, SubmitOutcome,
    SubmitPatterns, SyntheticEvent,
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::time::Duration;

#[test]
fn test_form_control_is_preferred() {
    let dom = MemoryDom::new();
    let container = dom.append_element(dom.body_id(), "div", &[("class", "composer")]);
    let form = dom.append_element(container, "form", &[]);
    let textarea = dom.append_element(form, "textarea", &[]);
    let in_form = dom.append_element(form, "button", &[("type", "submit")]);
    dom.append_element(container, "button", &[("class", "send")]);
    let patterns = SubmitPatterns::default();

    let outcome = SubmitDispatcher::new(&dom, &patterns).submit(&textarea);

    assert_eq!(outcome, SubmitOutcome::Activated(in_form));
    assert_eq!(dom.clicks(), vec![in_form]);
}

#[test]
fn test_disabled_form_control_falls_through_to_container() {
    let dom = MemoryDom::new();
    let container = dom.append_element(dom.body_id(), "div", &[("class", "chat-panel")]);
    let form = dom.append_element(container, "form", &[]);
    let textarea = dom.append_element(form, "textarea", &[]);
    dom.append_element(form, "button", &[("type", "submit"), ("disabled", "")]);
    let send = dom.append_element(container, "button", &[("class", "send-btn")]);
    let patterns = SubmitPatterns::default();
    let dispatcher = SubmitDispatcher::new(&dom, &patterns);

    // The container step finds the disabled form button first, in document order.
    assert_eq!(dispatcher.find(&textarea), None);

    dom.remove(form);
    let editor = dom.append_element(container, "textarea", &[]);
    assert_eq!(dispatcher.find(&editor), Some(send));
}

#[test]
fn test_container_controls_include_send_classes() {
    let dom = MemoryDom::new();
    let main = dom.append_element(dom.body_id(), "main", &[]);
    let editor = dom.append_element(main, "div", &[("contenteditable", "true")]);
    let send = dom.append_element(main, "button", &[("class", "btn-submit")]);
    let patterns = SubmitPatterns::default();

    assert_eq!(SubmitDispatcher::new(&dom, &patterns).find(&editor), Some(send));
}

#[test]
fn test_nearest_container_is_searched() {
    let dom = MemoryDom::new();
    let main = dom.append_element(dom.body_id(), "main", &[]);
    dom.append_element(main, "button", &[("aria-label", "Send")]);
    let composer = dom.append_element(main, "div", &[("class", "composer")]);
    let editor = dom.append_element(composer, "textarea", &[]);
    let patterns = SubmitPatterns::default();

    // The composer has no control of its own; the outer button is never reached.
    assert_eq!(SubmitDispatcher::new(&dom, &patterns).find(&editor), None);
}

#[test]
fn test_missing_control_uses_native_enter_fallback() {
    let h = Harness::new();
    let textarea = h.textarea(h.body());
    let submits = h.native_submits(h.body());
    let session = h.start(SiteFamily::ContentEditable);

    assert_eq!(
        h.dom.key_down(textarea, &KeyInput::enter().with_ctrl()),
        Disposition::Cancel
    );

    assert_eq!(h.dom.events_on(textarea), vec![SyntheticEvent::native_enter()]);
    assert_eq!(submits.get(), 1);
    assert!(h.dom.clicks().is_empty());
    assert!(!session.enabled().get());
    // The re-emitted Enter was not turned into a newline.
    assert_eq!(h.dom.field_value(&textarea).as_deref(), Some(""));

    h.scheduler.advance(Duration::from_millis(99));
    assert!(!session.enabled().get());
    h.scheduler.advance(Duration::from_millis(1));
    assert!(session.enabled().get());
    assert_eq!(
        h.store.requests(),
        vec![StateRequest::GetState, StateRequest::GetState]
    );
}

#[test]
fn test_fallback_adopts_a_toggle_made_in_the_window() {
    let h = Harness::new();
    let textarea = h.textarea(h.body());
    let session = h.start(SiteFamily::ContentEditable);

    h.dom.key_down(textarea, &KeyInput::enter().with_meta());
    h.store.write(Some(Value::Bool(false)));
    h.scheduler.advance(Duration::from_millis(100));

    assert!(!session.enabled().get());
    assert_eq!(h.dom.key_down(textarea, &KeyInput::enter()), Disposition::Proceed);
}

#[test]
fn test_fallback_restores_enabled_when_store_is_unreachable() {
    let h = Harness::new();
    let textarea = h.textarea(h.body());
    let session = h.start(SiteFamily::ContentEditable);

    h.store.set_connected(false);
    h.dom.key_down(textarea, &KeyInput::enter().with_ctrl());
    assert!(!session.enabled().get());
    h.scheduler.advance(Duration::from_millis(100));

    assert!(session.enabled().get());
}

#[test]
fn test_fallback_delay_is_configurable() {
    let h = Harness::new();
    let textarea = h.textarea(h.body());
    let mut config = ctrl_enter_core::Config::for_family(SiteFamily::ContentEditable);
    config.fallback_delay_ms = 250;
    let session = h.start_with(config);

    h.dom.key_down(textarea, &KeyInput::enter().with_ctrl());
    h.scheduler.advance(Duration::from_millis(249));
    assert!(!session.enabled().get());
    h.scheduler.advance(Duration::from_millis(1));
    assert!(session.enabled().get());
}
