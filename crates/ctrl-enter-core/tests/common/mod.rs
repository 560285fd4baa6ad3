#![allow(dead_code)]

use ctrl_enter_core::memory::{ManualScheduler, MemoryDom, MemoryStateStore, NodeId};
use ctrl_enter_core::{Config, KeyInput, Session, SiteFamily};
use std::cell::Cell;
use std::rc::Rc;

pub struct Harness {
    pub dom: Rc<MemoryDom>,
    pub scheduler: Rc<ManualScheduler>,
    pub store: Rc<MemoryStateStore>,
}

impl Harness {
    pub fn new() -> Self {
        let scheduler = Rc::new(ManualScheduler::new());
        Self {
            dom: Rc::new(MemoryDom::new()),
            store: MemoryStateStore::new(scheduler.clone()),
            scheduler,
        }
    }

    pub fn body(&self) -> NodeId {
        self.dom.body_id()
    }

    /// Start a session and let the initial state query settle.
    pub fn start(&self, family: SiteFamily) -> Session<MemoryDom> {
        self.start_with(Config::for_family(family))
    }

    pub fn start_with(&self, config: Config) -> Session<MemoryDom> {
        let session = Session::start(
            self.dom.clone(),
            self.scheduler.clone(),
            self.store.clone(),
            config,
        )
        .expect("session starts");
        self.scheduler.run_due();
        session
    }

    /// Count bare Enter presses that reach the page's own (bubble-phase) submit binding on `node`.
    pub fn native_submits(&self, node: NodeId) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        self.dom.on_page_key_down(node, move |input: &KeyInput| {
            if input.is_enter() && !input.shift && !input.ctrl && !input.meta {
                seen.set(seen.get() + 1);
            }
        });
        count
    }

    pub fn textarea(&self, parent: NodeId) -> NodeId {
        self.dom
            .append_element(parent, "textarea", &[("placeholder", "Message")])
    }

    pub fn editable(&self, parent: NodeId) -> NodeId {
        self.dom.append_element(
            parent,
            "div",
            &[("contenteditable", "true"), ("role", "textbox")],
        )
    }

    pub fn prosemirror(&self, parent: NodeId) -> NodeId {
        self.dom.append_element(
            parent,
            "div",
            &[("contenteditable", "true"), ("class", "ProseMirror")],
        )
    }
}
