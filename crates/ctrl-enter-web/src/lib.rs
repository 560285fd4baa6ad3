//! Ctrl-Enter Web - content-script bridge for `ctrl-enter-core`
//!
//! Implements the engine's host traits over the browser:
//!
//! - [`WebDom`]: `Dom` over `web-sys` (capture-phase listeners, `MutationObserver`, live ranges)
//! - [`WindowScheduler`]: `window.setTimeout`
//! - [`ExtensionChannel`]: `browser.runtime.sendMessage` / `browser.storage.onChanged`
//!
//! The content script loader calls [`start`] (or [`start_with_config`]) once per page.

mod channel;
mod convert;
mod dom;
mod scheduler;

pub use channel::ExtensionChannel;
pub use dom::WebDom;
pub use scheduler::WindowScheduler;

use ctrl_enter_core::{Config, Session};
use std::rc::Rc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_wasm::{WASMLayer, WASMLayerConfigBuilder};
use wasm_bindgen::prelude::*;

/// Start on the current page with the defaults for its hostname.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    init_logging();
    when_ready(None)
}

/// Start with a JSON [`Config`]; fields left out keep the hostname defaults.
#[wasm_bindgen(js_name = startWithConfig)]
pub fn start_with_config(json: &str) -> Result<(), JsValue> {
    init_logging();
    let config = Config::from_json(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
    when_ready(Some(config))
}

/// Route engine diagnostics to the page console. A second start keeps the first subscriber.
fn init_logging() {
    let config = WASMLayerConfigBuilder::new()
        .set_max_level(tracing::Level::DEBUG)
        .set_report_logs_in_timings(false)
        .build();
    let _ = tracing_subscriber::registry()
        .with(WASMLayer::new(config))
        .try_init();
}

fn when_ready(config: Option<Config>) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let ready_state = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))?;
    if ready_state.as_string().as_deref() != Some("loading") {
        return run(config);
    }
    let init = Closure::once_into_js(move || {
        if let Err(err) = run(config) {
            tracing::warn!(error = %convert::describe(&err), "ctrl-enter failed to start");
        }
    });
    document.add_event_listener_with_callback("DOMContentLoaded", init.unchecked_ref())
}

fn run(config: Option<Config>) -> Result<(), JsValue> {
    let dom = Rc::new(WebDom::new().map_err(|err| JsValue::from_str(&err.to_string()))?);
    let window = dom.window().clone();
    let hostname = window.location().hostname()?;

    let config = match config {
        Some(config) if config.family.is_some() => config,
        Some(config) => Config {
            family: Some(ctrl_enter_core::SiteFamily::for_host(&hostname)),
            ..config
        },
        None => Config::for_host(&hostname),
    };

    // The structure observer owns the watcher; the session handle itself can go.
    let _session = Session::start(
        dom,
        Rc::new(WindowScheduler::new(window)),
        Rc::new(ExtensionChannel),
        config,
    )
    .map_err(|err| JsValue::from_str(&err.to_string()))?;

    tracing::debug!(%hostname, "ctrl-enter started");
    Ok(())
}
