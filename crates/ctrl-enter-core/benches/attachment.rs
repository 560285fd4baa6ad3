use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use ctrl_enter_core::memory::{ManualScheduler, MemoryDom, MemoryStateStore, NodeId};
use ctrl_enter_core::{
    Config, Editor, EditorKind, EditorLocator, NewlineInserter, Session, SiteFamily,
};
use std::rc::Rc;

/// A chat-like page: `sections` message blocks followed by a composer textarea.
fn large_page(sections: usize) -> (MemoryDom, NodeId) {
    let dom = MemoryDom::new();
    let main = dom.append_element(dom.body_id(), "main", &[]);
    for i in 0..sections {
        let block = dom.append_element(main, "div", &[("class", "message")]);
        let p = dom.append_element(block, "p", &[]);
        dom.append_text(p, &format!("message {i:05} with some text"));
        dom.append_element(block, "button", &[("class", "copy")]);
    }
    let composer = dom.append_element(main, "textarea", &[("rows", "1")]);
    (dom, composer)
}

fn bench_locate_worst_case(c: &mut Criterion) {
    // Only the last pattern that can match ("textarea") does, so every pattern scans the page.
    let (dom, composer) = large_page(2_000);
    let locator = EditorLocator::new(SiteFamily::Universal.table());
    assert_eq!(locator.locate(&dom), Some(composer));

    c.bench_function("locate/universal_2k_blocks", |b| {
        b.iter(|| black_box(locator.locate(black_box(&dom))))
    });
}

fn bench_recheck_after_attach(c: &mut Criterion) {
    let (dom, composer) = large_page(2_000);
    let dom = Rc::new(dom);
    let scheduler = Rc::new(ManualScheduler::new());
    let store = MemoryStateStore::new(scheduler.clone());
    let session = Session::start(
        dom.clone(),
        scheduler.clone(),
        store,
        Config::for_family(SiteFamily::ContentEditable),
    )
    .unwrap();
    assert_eq!(session.watcher().current().map(|e| e.node), Some(composer));

    c.bench_function("watcher/recheck_attached_2k_blocks", |b| {
        b.iter(|| black_box(session.watcher().check()))
    });
}

fn bench_field_newline(c: &mut Criterion) {
    let value = "lorem ipsum dolor sit amet ".repeat(4_000);
    let middle = (value.len() / 2) as u32;

    c.bench_function("newline/field_100k_chars", |b| {
        b.iter_batched(
            || {
                let dom = MemoryDom::new();
                let node = dom.append_element(dom.body_id(), "textarea", &[]);
                dom.set_field(node, &value, middle, middle);
                (dom, node)
            },
            |(dom, node)| {
                let editor = Editor {
                    node,
                    kind: EditorKind::PlainField,
                };
                NewlineInserter::new(&dom).insert(&editor, &[]).unwrap();
                black_box(dom);
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_locate_worst_case,
    bench_recheck_after_attach,
    bench_field_newline
);
criterion_main!(benches);
