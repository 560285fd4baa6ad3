mod common;

use common::Harness;
use ctrl_enter_core::config::DEFAULT_ATTACHMENT_MARKER;
use ctrl_enter_core::memory::Fault;
use ctrl_enter_core::{Disposition, Dom, EditorKind, KeyInput, SiteFamily, WatchPolicy};
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn test_editor_present_at_start_is_attached_once() {
    let h = Harness::new();
    let textarea = h.textarea(h.body());
    let session = h.start(SiteFamily::ContentEditable);

    assert_eq!(
        h.dom.attribute(&textarea, DEFAULT_ATTACHMENT_MARKER).as_deref(),
        Some("true")
    );
    assert_eq!(h.dom.listener_count(textarea), (1, 1));

    for _ in 0..5 {
        session.watcher().notify();
    }
    assert!(session.watcher().check().is_none());
    assert!(session.watcher().attach(textarea).is_none());
    assert_eq!(h.dom.listener_count(textarea), (1, 1));

    h.dom.key_down(textarea, &KeyInput::enter());
    assert_eq!(h.dom.input_event_count(textarea), 1);
}

#[test]
fn test_late_mounted_editor_is_picked_up() {
    let h = Harness::new();
    let session = h.start(SiteFamily::ContentEditable);
    assert!(session.watcher().current().is_none());

    let wrapper = h.dom.append_element(h.body(), "div", &[("class", "composer")]);
    let editor = h.editable(wrapper);
    assert!(h.dom.flush_mutations());

    let current = session.watcher().current().expect("attached");
    assert_eq!(current.node, editor);
    assert_eq!(current.kind, EditorKind::GenericEditable);
}

#[test]
fn test_remounted_editor_is_reattached() {
    let h = Harness::new();
    let first = h.textarea(h.body());
    let session = h.start(SiteFamily::ContentEditable);
    assert_eq!(session.watcher().current().map(|e| e.node), Some(first));

    h.dom.remove(first);
    h.dom.flush_mutations();
    let second = h.textarea(h.body());
    h.dom.flush_mutations();

    assert_eq!(session.watcher().current().map(|e| e.node), Some(second));
    assert_eq!(h.dom.listener_count(first), (1, 1));
    assert_eq!(h.dom.listener_count(second), (1, 1));
}

#[test]
fn test_non_editable_candidate_is_left_unmarked() {
    let h = Harness::new();
    let prompt = h
        .dom
        .append_element(h.body(), "div", &[("id", "prompt-textarea")]);
    let session = h.start(SiteFamily::ChatGpt);

    assert!(session.watcher().current().is_none());
    assert!(!session.watcher().is_attached(&prompt));
    assert_eq!(h.dom.listener_count(prompt), (0, 0));

    h.dom.put_attribute(prompt, "contenteditable", Some("true"));
    h.dom.append_element(h.body(), "span", &[]);
    h.dom.flush_mutations();

    assert!(session.watcher().is_attached(&prompt));
    assert_eq!(
        session.watcher().current().map(|e| e.kind),
        Some(EditorKind::GenericEditable)
    );
}

#[test]
fn test_editor_is_retried_when_listener_install_fails() {
    let h = Harness::new();
    let textarea = h.textarea(h.body());
    h.dom.inject_fault(Some(Fault::ListenerInstall));
    let session = h.start(SiteFamily::ContentEditable);

    assert!(!session.watcher().is_attached(&textarea));
    assert!(session.watcher().current().is_none());
    assert_eq!(h.dom.listener_count(textarea), (0, 0));

    h.dom.inject_fault(None);
    h.dom.append_element(h.body(), "span", &[]);
    h.dom.flush_mutations();

    assert!(session.watcher().is_attached(&textarea));
    assert_eq!(h.dom.listener_count(textarea), (1, 1));
    assert_eq!(h.dom.key_down(textarea, &KeyInput::enter()), Disposition::Cancel);
}

#[test]
fn test_table_order_beats_document_order() {
    let h = Harness::new();
    h.editable(h.body());
    let framework = h.prosemirror(h.body());
    let session = h.start(SiteFamily::Universal);

    let current = session.watcher().current().expect("attached");
    assert_eq!(current.node, framework);
    assert_eq!(current.kind, EditorKind::FrameworkEditable);
}

#[test]
fn test_debounced_burst_collapses_into_one_recheck() {
    let h = Harness::new();
    let session = h.start(SiteFamily::Universal);
    assert_eq!(
        session.watcher().policy(),
        WatchPolicy::Debounced {
            interval: Duration::from_millis(200)
        }
    );
    assert_eq!(h.scheduler.pending(), 0);

    let editor = h.textarea(h.body());
    h.dom.flush_mutations();
    for _ in 0..10 {
        h.dom.append_element(h.body(), "span", &[]);
        h.dom.flush_mutations();
    }

    assert!(session.watcher().is_recheck_pending());
    assert_eq!(h.scheduler.pending(), 1);
    assert!(session.watcher().current().is_none());

    h.scheduler.advance(Duration::from_millis(199));
    assert!(session.watcher().current().is_none());
    h.scheduler.advance(Duration::from_millis(1));

    assert!(!session.watcher().is_recheck_pending());
    assert_eq!(session.watcher().current().map(|e| e.node), Some(editor));
    assert_eq!(h.dom.listener_count(editor), (1, 1));
}

#[test]
fn test_both_policies_converge_to_the_same_editor() {
    let build = |h: &Harness| {
        let main = h.dom.append_element(h.body(), "main", &[]);
        h.dom.append_element(main, "textarea", &[]);
        let chat = h
            .dom
            .append_element(main, "textarea", &[("class", "chat-box"), ("placeholder", "Ask")]);
        h.dom.append_element(main, "div", &[("contenteditable", "true")]);
        chat
    };

    let immediate = Harness::new();
    let mut config = ctrl_enter_core::Config::for_family(SiteFamily::Universal);
    config.watch = Some(WatchPolicy::Immediate);
    let eager = immediate.start_with(config);
    let expected = build(&immediate);
    immediate.dom.flush_mutations();

    let debounced = Harness::new();
    let lazy = debounced.start(SiteFamily::Universal);
    let chat = build(&debounced);
    debounced.dom.flush_mutations();
    debounced.scheduler.advance(Duration::from_millis(200));

    assert_eq!(eager.watcher().current().map(|e| e.node), Some(expected));
    assert_eq!(lazy.watcher().current().map(|e| e.node), Some(chat));
    assert_eq!(expected, chat);
}
