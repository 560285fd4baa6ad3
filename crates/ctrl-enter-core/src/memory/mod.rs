//! In-memory host: a document, a manual clock and a feature-state store.
//!
//! These implement the host traits without a browser so the whole engine can be driven from
//! tests and benchmarks.
//!
//! ```rust
//! use ctrl_enter_core::memory::{ManualScheduler, MemoryDom, MemoryStateStore};
//! use ctrl_enter_core::{Config, KeyInput, SiteFamily, Session};
//! use std::rc::Rc;
//!
//! let dom = Rc::new(MemoryDom::new());
//! let scheduler = Rc::new(ManualScheduler::new());
//! let store = MemoryStateStore::new(scheduler.clone());
//!
//! let field = dom.append_element(dom.body_id(), "textarea", &[("placeholder", "Ask")]);
//! dom.set_field(field, "ab", 1, 1);
//!
//! let _session = Session::start(
//!     dom.clone(),
//!     scheduler.clone(),
//!     store.clone(),
//!     Config::for_family(SiteFamily::ContentEditable),
//! )
//! .unwrap();
//!
//! dom.key_down(field, &KeyInput::enter());
//! assert_eq!(ctrl_enter_core::Dom::field_value(&*dom, &field).as_deref(), Some("a\nb"));
//! ```

mod dom;
mod scheduler;
mod store;

pub use dom::{DispatchedEvent, Fault, MemoryDom, NodeId, PageKeyHandler};
pub use scheduler::ManualScheduler;
pub use store::MemoryStateStore;
