//! Feature enabled/disabled state.
//!
//! The persisted flag lives in an external store reached through a [`StateChannel`]. The engine
//! keeps a local cache, [`EnabledState`], which every interceptor reads synchronously:
//!
//! - initialized once with a `getState` request ([`EnabledState::initialize`])
//! - invalidated by storage change notifications ([`EnabledState::follow`])
//! - written only through the store ([`EnabledState::request_toggle`]), except for the bounded
//!   disable window of the submission fallback, which is reconciled against the store afterwards
//!
//! # Wire format
//!
//! ```text
//! request:  {"type":"getState"} | {"type":"toggle"}
//! response: {"enabled":true}
//! change:   {"enabled":{"newValue":false}}
//! ```

use crate::error::ChannelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::Cell;
use std::rc::Rc;

/// Storage key of the persisted flag.
pub const ENABLED_KEY: &str = "enabled";

/// Request sent to the feature-state store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateRequest {
    /// Read the current value.
    GetState,
    /// Flip the current value.
    Toggle,
}

/// Answer to a [`StateRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Effective value after the request.
    pub enabled: bool,
}

/// One changed key of a storage change notification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChange {
    /// Value before the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    /// Value after the change (`None` when the key was removed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// A storage change notification, keyed like the persisted store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageChange {
    /// Change of the enabled flag, if it changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<ValueChange>,
}

impl StorageChange {
    /// A change setting the flag to `value`.
    pub fn enabled(value: bool) -> Self {
        Self {
            enabled: Some(ValueChange {
                old_value: None,
                new_value: Some(Value::Bool(value)),
            }),
        }
    }
}

/// Callback receiving a request's answer.
pub type Reply = Box<dyn FnOnce(Result<StateResponse, ChannelError>)>;

/// Callback receiving storage change notifications.
pub type ChangeListener = Box<dyn Fn(&StorageChange)>;

/// Request/response + push channel to the external feature-state store.
///
/// Replies and notifications are delivered asynchronously, on a later turn of the event loop.
pub trait StateChannel {
    /// Send a request; `reply` runs once with the answer.
    fn send(&self, request: StateRequest, reply: Reply);

    /// Register a listener for storage change notifications.
    fn on_changed(&self, listener: ChangeListener);
}

/// Interpret a stored value: enabled unless it is exactly `false`.
pub fn stored_enabled(value: Option<&Value>) -> bool {
    !matches!(value, Some(Value::Bool(false)))
}

/// Local cache of the enabled flag. Cloning shares the same cell.
#[derive(Debug, Clone)]
pub struct EnabledState {
    cell: Rc<Cell<bool>>,
}

impl Default for EnabledState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EnabledState {
    /// A cache holding `initial`.
    pub fn new(initial: bool) -> Self {
        Self {
            cell: Rc::new(Cell::new(initial)),
        }
    }

    /// Current cached value.
    pub fn get(&self) -> bool {
        self.cell.get()
    }

    /// Overwrite the cached value.
    pub fn set(&self, enabled: bool) {
        self.cell.set(enabled);
    }

    /// Ask the store once and adopt its answer. A failed request keeps the current value.
    pub fn initialize(&self, channel: &dyn StateChannel) {
        let state = self.clone();
        channel.send(
            StateRequest::GetState,
            Box::new(move |reply| match reply {
                Ok(response) => state.set(response.enabled),
                Err(err) => tracing::debug!(%err, "initial state query failed"),
            }),
        );
    }

    /// Apply one change notification.
    pub fn apply_change(&self, change: &StorageChange) {
        if let Some(change) = &change.enabled {
            self.set(stored_enabled(change.new_value.as_ref()));
        }
    }

    /// Keep the cache in sync with store change notifications.
    pub fn follow(&self, channel: &dyn StateChannel) {
        let state = self.clone();
        channel.on_changed(Box::new(move |change| state.apply_change(change)));
    }

    /// Re-query the store and adopt its answer, falling back to enabled if the query fails.
    pub fn refresh(&self, channel: &dyn StateChannel) {
        let state = self.clone();
        channel.send(
            StateRequest::GetState,
            Box::new(move |reply| {
                let enabled = reply.map(|r| r.enabled).unwrap_or(true);
                state.set(enabled);
            }),
        );
    }

    /// Flip the persisted flag. The cache follows through the change notification.
    pub fn request_toggle(&self, channel: &dyn StateChannel) {
        channel.send(
            StateRequest::Toggle,
            Box::new(|reply| match reply {
                Ok(response) => tracing::debug!(enabled = response.enabled, "toggled"),
                Err(err) => tracing::warn!(%err, "toggle request failed"),
            }),
        );
    }
}
