//! The feature-state store behind the WebExtension messaging and storage APIs.
//!
//! Requests go to the extension's background script through `browser.runtime.sendMessage`;
//! the background answers from `browser.storage.local`. Change notifications come from
//! `browser.storage.onChanged`.

use ctrl_enter_core::state::{ChangeListener, Reply};
use ctrl_enter_core::{ChannelError, StateChannel, StateRequest, StateResponse, StorageChange};
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use crate::convert::describe;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["browser", "runtime"], js_name = sendMessage)]
    fn send_message(message: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["browser", "storage", "onChanged"], js_name = addListener)]
    fn add_storage_listener(listener: &js_sys::Function) -> Result<(), JsValue>;
}

/// [`StateChannel`] over the extension runtime.
#[derive(Debug, Default)]
pub struct ExtensionChannel;

impl ExtensionChannel {
    async fn request(request: StateRequest) -> Result<StateResponse, ChannelError> {
        let message = to_js(&request)?;
        let promise = send_message(&message).map_err(disconnected)?;
        let response = JsFuture::from(promise).await.map_err(disconnected)?;
        from_js(&response)
    }
}

impl StateChannel for ExtensionChannel {
    fn send(&self, request: StateRequest, reply: Reply) {
        spawn_local(async move {
            reply(Self::request(request).await);
        });
    }

    fn on_changed(&self, listener: ChangeListener) {
        let callback =
            Closure::<dyn Fn(JsValue, JsValue)>::new(move |changes: JsValue, _area: JsValue| {
                match from_js::<StorageChange>(&changes) {
                    Ok(change) => listener(&change),
                    Err(err) => tracing::debug!(%err, "ignoring storage change"),
                }
            });
        if let Err(err) = add_storage_listener(callback.as_ref().unchecked_ref()) {
            tracing::warn!(error = %describe(&err), "storage.onChanged unavailable");
        }
        callback.forget();
    }
}

fn disconnected(err: JsValue) -> ChannelError {
    tracing::debug!(error = %describe(&err), "runtime message failed");
    ChannelError::Disconnected
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, ChannelError> {
    let json = serde_json::to_string(value).map_err(|e| ChannelError::Malformed(e.to_string()))?;
    js_sys::JSON::parse(&json).map_err(|e| ChannelError::Malformed(describe(&e)))
}

fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, ChannelError> {
    if value.is_undefined() {
        return Err(ChannelError::Malformed("no response".to_string()));
    }
    let json: String = js_sys::JSON::stringify(value)
        .map_err(|e| ChannelError::Malformed(describe(&e)))?
        .into();
    serde_json::from_str(&json).map_err(|e| ChannelError::Malformed(e.to_string()))
}
