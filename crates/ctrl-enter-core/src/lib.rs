#![warn(missing_docs)]
//! Ctrl-Enter Core - headless Enter/Ctrl+Enter inversion for chat composers
//!
//! # Overview
//!
//! `ctrl-enter-core` intercepts keyboard input on web chat/text composers so that a plain Enter
//! inserts a newline and Ctrl/Cmd+Enter submits. It is headless: the page is reached only
//! through the [`Dom`], [`Scheduler`] and [`StateChannel`] traits, implemented over `web-sys` by
//! `ctrl-enter-web` and in memory by the [`memory`] module.
//!
//! The one invariant everything is built around is **fail-closed**: a bare Enter is always
//! canceled before the page sees it, whether or not a newline can be inserted.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Session / AttachmentWatcher                │  ← structure-change driven attachment
//! ├─────────────────────────────────────────────┤
//! │  EditorLocator (per-family PatternTable)    │  ← which element is the composer
//! ├─────────────────────────────────────────────┤
//! │  KeyEventInterceptor / BeforeInput...       │  ← capture-phase routing
//! ├─────────────────────────────────────────────┤
//! │  NewlineInserter / SubmitDispatcher         │  ← edits and submission
//! ├─────────────────────────────────────────────┤
//! │  RangeResolver                              │  ← where an edit may happen
//! ├─────────────────────────────────────────────┤
//! │  Dom / Scheduler / StateChannel             │  ← host traits
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use ctrl_enter_core::memory::{ManualScheduler, MemoryDom, MemoryStateStore};
//! use ctrl_enter_core::{Config, Disposition, KeyInput, Session};
//! use std::rc::Rc;
//!
//! let dom = Rc::new(MemoryDom::new());
//! let scheduler = Rc::new(ManualScheduler::new());
//! let store = MemoryStateStore::new(scheduler.clone());
//!
//! let session = Session::start(dom.clone(), scheduler.clone(), store.clone(), Config::for_host("claude.ai")).unwrap();
//!
//! // The composer mounts after the session started.
//! let editor = dom.append_element(dom.body_id(), "div", &[("contenteditable", "true"), ("role", "textbox")]);
//! let text = dom.append_text(editor, "hello");
//! dom.flush_mutations();
//! assert!(session.watcher().current().is_some());
//!
//! dom.set_caret(text, 5);
//! assert_eq!(dom.key_down(editor, &KeyInput::enter()), Disposition::Cancel);
//! assert_eq!(dom.inner_html(editor), "hello<br>\u{200B}");
//! ```
//!
//! # Module Description
//!
//! - [`dom`] - host document trait and range/event value types
//! - [`event`] - key and before-input event data, key classification
//! - [`selector`] - compound selector patterns
//! - [`site`] - site families, pattern tables, submit patterns
//! - [`locator`] - editor lookup and classification
//! - [`range`] - edit range resolution
//! - [`newline`] - newline insertion strategies
//! - [`submit`] - submit control activation and the native-Enter fallback
//! - [`intercept`] - capture-phase interceptors
//! - [`watcher`] - attachment watcher
//! - [`state`] - enabled-state cache and store protocol
//! - [`session`] - wiring everything onto a page
//! - [`memory`] - in-memory host

pub mod config;
pub mod dom;
pub mod error;
pub mod event;
mod host;
pub mod intercept;
pub mod locator;
pub mod memory;
pub mod newline;
pub mod range;
pub mod scheduler;
pub mod selector;
pub mod session;
pub mod site;
pub mod state;
pub mod submit;
mod text;
pub mod watcher;

pub use config::Config;
pub use dom::{
    BeforeInputHandler, BoundaryPoint, Dom, DomRange, KeyDownHandler, MutationCallback,
    SyntheticEvent, SyntheticKey,
};
pub use error::{ChannelError, ConfigError, DomError, InsertError, SelectorError};
pub use event::{BeforeInput, Disposition, InputType, KeyAction, KeyInput};
pub use host::Host;
pub use intercept::{BeforeInputInterceptor, KeyEventInterceptor};
pub use locator::{Editor, EditorKind, EditorLocator};
pub use newline::{NewlineInserter, ZERO_WIDTH_SPACE};
pub use range::RangeResolver;
pub use scheduler::{Scheduler, Task};
pub use selector::{ElementView, Selector};
pub use session::Session;
pub use site::{PatternTable, SiteFamily, SubmitPatterns};
pub use state::{
    EnabledState, StateChannel, StateRequest, StateResponse, StorageChange, stored_enabled,
};
pub use submit::{NativeEnterFallback, SubmitDispatcher, SubmitOutcome};
pub use watcher::{AttachmentWatcher, WatchPolicy};
