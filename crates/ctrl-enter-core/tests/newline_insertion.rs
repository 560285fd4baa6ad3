mod common;

use common::Harness;
use ctrl_enter_core::memory::{Fault, MemoryDom, NodeId};
use ctrl_enter_core::{
    BeforeInput, BoundaryPoint, Disposition, Dom, DomRange, Editor, EditorKind, InputType,
    InsertError, KeyInput, NewlineInserter, SiteFamily, SyntheticEvent,
};
use pretty_assertions::assert_eq;

fn editor(node: NodeId, kind: EditorKind) -> Editor<NodeId> {
    Editor { node, kind }
}

#[test]
fn test_field_newline_at_cursor() {
    let dom = MemoryDom::new();
    let textarea = dom.append_element(dom.body_id(), "textarea", &[]);
    dom.set_field(textarea, "ab", 1, 1);

    NewlineInserter::new(&dom)
        .insert(&editor(textarea, EditorKind::PlainField), &[])
        .unwrap();

    assert_eq!(dom.field_value(&textarea).as_deref(), Some("a\nb"));
    assert_eq!(dom.field_selection(&textarea), Some((2, 2)));
    assert_eq!(dom.events_on(textarea), vec![SyntheticEvent::input(false)]);
}

#[test]
fn test_field_newline_replaces_selection() {
    let dom = MemoryDom::new();
    let input = dom.append_element(dom.body_id(), "input", &[("type", "text")]);
    dom.set_field(input, "hello world", 5, 6);

    NewlineInserter::new(&dom)
        .insert(&editor(input, EditorKind::PlainField), &[])
        .unwrap();

    assert_eq!(dom.field_value(&input).as_deref(), Some("hello\nworld"));
    assert_eq!(dom.field_selection(&input), Some((6, 6)));
}

#[test]
fn test_field_offsets_count_utf16_units() {
    let dom = MemoryDom::new();
    let textarea = dom.append_element(dom.body_id(), "textarea", &[]);
    // The emoji is two UTF-16 units.
    dom.set_field(textarea, "😀x", 2, 2);

    NewlineInserter::new(&dom)
        .insert(&editor(textarea, EditorKind::PlainField), &[])
        .unwrap();

    assert_eq!(dom.field_value(&textarea).as_deref(), Some("😀\nx"));
    assert_eq!(dom.field_selection(&textarea), Some((3, 3)));
}

#[test]
fn test_editable_break_in_the_middle_has_no_placeholder() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    let text = dom.append_text(node, "ab");
    dom.set_caret(text, 1);

    NewlineInserter::new(&dom)
        .insert(&editor(node, EditorKind::GenericEditable), &[])
        .unwrap();

    assert_eq!(dom.inner_html(node), "a<br>b");
    assert_eq!(dom.selection_range(), Some(DomRange::caret(node, 2)));
    assert_eq!(dom.events_on(node), vec![SyntheticEvent::input(true)]);
    assert_eq!(dom.focused(), Some(node));
}

#[test]
fn test_editable_trailing_break_gets_placeholder() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    let text = dom.append_text(node, "ab");
    dom.set_caret(text, 2);

    NewlineInserter::new(&dom)
        .insert(&editor(node, EditorKind::GenericEditable), &[])
        .unwrap();

    assert_eq!(dom.inner_html(node), "ab<br>\u{200B}");
    assert_eq!(dom.selection_range(), Some(DomRange::caret(node, 2)));
}

#[test]
fn test_editable_empty_region() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    dom.set_caret(node, 0);

    NewlineInserter::new(&dom)
        .insert(&editor(node, EditorKind::GenericEditable), &[])
        .unwrap();

    assert_eq!(dom.inner_html(node), "<br>\u{200B}");
    assert_eq!(dom.selection_range(), Some(DomRange::caret(node, 1)));
}

#[test]
fn test_editable_selection_is_deleted_first() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    let text = dom.append_text(node, "hello world");
    dom.set_selection(Some(DomRange::new(
        BoundaryPoint::new(text, 5),
        BoundaryPoint::new(text, 6),
    )));

    NewlineInserter::new(&dom)
        .insert(&editor(node, EditorKind::GenericEditable), &[])
        .unwrap();

    assert_eq!(dom.inner_html(node), "hello<br>world");
}

#[test]
fn test_editable_selection_across_elements() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    let first = dom.append_text(node, "ab");
    let bold = dom.append_element(node, "b", &[]);
    dom.append_text(bold, "cd");
    let last = dom.append_text(node, "ef");
    dom.set_selection(Some(DomRange::new(
        BoundaryPoint::new(first, 1),
        BoundaryPoint::new(last, 1),
    )));

    NewlineInserter::new(&dom)
        .insert(&editor(node, EditorKind::GenericEditable), &[])
        .unwrap();

    assert_eq!(dom.inner_html(node), "a<br>f");
}

#[test]
fn test_editable_unresolvable_range_leaves_content_untouched() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    let text = dom.append_text(node, "ab");
    let other = dom.append_element(dom.body_id(), "p", &[]);
    let outside = dom.append_text(other, "zz");
    let inserter = NewlineInserter::new(&dom);
    let target = editor(node, EditorKind::GenericEditable);

    dom.set_caret(outside, 1);
    assert!(matches!(
        inserter.insert(&target, &[]),
        Err(InsertError::RangeUnresolved)
    ));

    dom.set_selection(None);
    assert!(matches!(
        inserter.insert(&target, &[]),
        Err(InsertError::RangeUnresolved)
    ));

    // Offset past the end of the text node.
    dom.set_caret(text, 9);
    assert!(matches!(
        inserter.insert(&target, &[]),
        Err(InsertError::RangeUnresolved)
    ));

    // A range that only partly overlaps the editor.
    dom.set_selection(Some(DomRange::new(
        BoundaryPoint::new(text, 1),
        BoundaryPoint::new(outside, 1),
    )));
    assert!(matches!(
        inserter.insert(&target, &[]),
        Err(InsertError::RangeUnresolved)
    ));

    assert_eq!(dom.inner_html(node), "ab");
    assert_eq!(dom.inner_html(other), "zz");
    assert!(dom.events().is_empty());
}

#[test]
fn test_editable_that_lost_editability_is_rejected() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    let text = dom.append_text(node, "ab");
    dom.set_caret(text, 1);
    dom.put_attribute(node, "contenteditable", Some("false"));

    let result = NewlineInserter::new(&dom).insert(&editor(node, EditorKind::GenericEditable), &[]);

    assert!(matches!(result, Err(InsertError::NotEditable)));
    assert_eq!(dom.inner_html(node), "ab");
}

#[test]
fn test_target_range_wins_over_selection() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    let text = dom.append_text(node, "abcd");
    dom.set_caret(text, 4);

    NewlineInserter::new(&dom)
        .insert(
            &editor(node, EditorKind::GenericEditable),
            &[DomRange::caret(text, 1)],
        )
        .unwrap();

    assert_eq!(dom.inner_html(node), "a<br>bcd");
}

#[test]
fn test_foreign_target_range_falls_back_to_selection() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    let text = dom.append_text(node, "abcd");
    let other = dom.append_element(dom.body_id(), "p", &[]);
    let outside = dom.append_text(other, "zz");
    dom.set_caret(text, 3);

    NewlineInserter::new(&dom)
        .insert(
            &editor(node, EditorKind::GenericEditable),
            &[DomRange::caret(outside, 1)],
        )
        .unwrap();

    assert_eq!(dom.inner_html(node), "abc<br>d");
    assert_eq!(dom.inner_html(other), "zz");
}

#[test]
fn test_framework_editor_is_never_mutated() {
    let dom = MemoryDom::new();
    let node = dom.append_element(
        dom.body_id(),
        "div",
        &[("contenteditable", "true"), ("class", "ProseMirror")],
    );
    let text = dom.append_text(node, "ab");
    dom.set_caret(text, 1);

    NewlineInserter::new(&dom)
        .insert(&editor(node, EditorKind::FrameworkEditable), &[])
        .unwrap();

    assert_eq!(dom.inner_html(node), "ab");
    assert_eq!(dom.events_on(node), vec![SyntheticEvent::shift_enter()]);
    assert_eq!(dom.input_event_count(node), 0);
}

#[test]
fn test_framework_editor_that_lost_editability_is_rejected() {
    let dom = MemoryDom::new();
    let node = dom.append_element(
        dom.body_id(),
        "div",
        &[("contenteditable", "false"), ("class", "ProseMirror")],
    );

    let result =
        NewlineInserter::new(&dom).insert(&editor(node, EditorKind::FrameworkEditable), &[]);

    assert!(matches!(result, Err(InsertError::NotEditable)));
    assert!(dom.events().is_empty());
    assert_eq!(dom.focused(), None);
}

#[test]
fn test_host_failure_mid_edit_surfaces_as_dom_error() {
    let dom = MemoryDom::new();
    let node = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true")]);
    let text = dom.append_text(node, "ab");
    dom.set_selection(Some(DomRange::new(
        BoundaryPoint::new(text, 0),
        BoundaryPoint::new(text, 1),
    )));
    dom.inject_fault(Some(Fault::NodeInsertion));

    let result = NewlineInserter::new(&dom).insert(&editor(node, EditorKind::GenericEditable), &[]);

    assert!(matches!(result, Err(InsertError::Dom(_))));
    // The deletion is not rolled back.
    assert_eq!(dom.inner_html(node), "b");
    assert_eq!(dom.input_event_count(node), 0);
}

#[test]
fn test_host_failure_mid_edit_keeps_enter_canceled() {
    let h = Harness::new();
    let node = h.editable(h.body());
    let text = h.dom.append_text(node, "ab");
    let submits = h.native_submits(h.body());
    let _session = h.start(SiteFamily::ContentEditable);
    h.dom.set_caret(text, 1);
    h.dom.inject_fault(Some(Fault::NodeInsertion));

    assert_eq!(h.dom.key_down(node, &KeyInput::enter()), Disposition::Cancel);

    assert_eq!(h.dom.inner_html(node), "ab");
    assert_eq!(h.dom.input_event_count(node), 0);
    assert_eq!(submits.get(), 0);

    h.dom.inject_fault(None);
    assert_eq!(h.dom.key_down(node, &KeyInput::enter()), Disposition::Cancel);
    assert_eq!(h.dom.inner_html(node), "a<br>b");
}

#[test]
fn test_field_edit_stands_when_input_event_cannot_be_delivered() {
    let h = Harness::new();
    let textarea = h.textarea(h.body());
    h.dom.set_field(textarea, "ab", 1, 1);
    let submits = h.native_submits(textarea);
    let _session = h.start(SiteFamily::ContentEditable);

    // A detached node rejects dispatch but still holds its value.
    h.dom.remove(textarea);
    let result =
        NewlineInserter::new(&*h.dom).insert(&editor(textarea, EditorKind::PlainField), &[]);
    assert_eq!(result, Ok(()));
    assert_eq!(h.dom.field_value(&textarea).as_deref(), Some("a\nb"));

    assert_eq!(h.dom.key_down(textarea, &KeyInput::enter()), Disposition::Cancel);
    assert_eq!(h.dom.field_value(&textarea).as_deref(), Some("a\n\nb"));
    assert_eq!(h.dom.input_event_count(textarea), 0);
    assert_eq!(submits.get(), 0);
}

#[test]
fn test_before_input_paragraph_uses_target_range() {
    let h = Harness::new();
    let node = h.editable(h.body());
    let text = h.dom.append_text(node, "abcd");
    h.dom.set_caret(text, 4);
    let _session = h.start(SiteFamily::ContentEditable);

    let intent = BeforeInput::insert_paragraph(vec![DomRange::caret(text, 2)]);
    assert_eq!(h.dom.before_input(node, &intent), Disposition::Cancel);

    assert_eq!(h.dom.inner_html(node), "ab<br>cd");
    assert_eq!(h.dom.input_event_count(node), 1);
}

#[test]
fn test_before_input_left_alone_when_not_applicable() {
    let h = Harness::new();
    let node = h.editable(h.body());
    let text = h.dom.append_text(node, "abcd");
    h.dom.set_caret(text, 2);
    let _session = h.start(SiteFamily::ContentEditable);

    let line_break = BeforeInput {
        input_type: InputType::InsertLineBreak,
        ..BeforeInput::insert_paragraph(Vec::new())
    };
    let composing = BeforeInput {
        composing: true,
        ..BeforeInput::insert_paragraph(Vec::new())
    };
    let not_cancelable = BeforeInput {
        cancelable: false,
        ..BeforeInput::insert_paragraph(Vec::new())
    };
    let typing = BeforeInput {
        input_type: InputType::parse("insertText"),
        ..BeforeInput::insert_paragraph(Vec::new())
    };

    for intent in [line_break, composing, not_cancelable, typing] {
        assert_eq!(h.dom.before_input(node, &intent), Disposition::Proceed);
    }
    assert_eq!(h.dom.inner_html(node), "abcd");
    assert!(h.dom.events().is_empty());
}
