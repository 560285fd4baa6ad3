//! Error types shared across the engine.
//!
//! None of these ever reach the end user: interceptors log and swallow them so that a failing
//! edit cannot break the host page's own event handling.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors reported by a [`Dom`](crate::Dom) host operation.
pub enum DomError {
    #[error("node is not attached to the document")]
    /// The node is detached (or was never part of the document).
    Detached,

    #[error("offset {offset} is out of bounds for a node of length {length}")]
    /// A range boundary offset exceeds its container's length.
    IndexSize {
        /// The requested offset.
        offset: u32,
        /// The container's length (UTF-16 units for text, child count for elements).
        length: u32,
    },

    #[error("operation is not valid for this node: {0}")]
    /// The node type does not support the requested operation.
    InvalidNode(&'static str),

    #[error("host rejected the operation: {0}")]
    /// The platform threw while performing the operation.
    Host(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Reasons a newline could not be inserted.
pub enum InsertError {
    #[error("no insertion point inside the editor")]
    /// Neither the event's target ranges nor the live selection resolve inside the editor.
    RangeUnresolved,

    #[error("plain field has no cursor offsets")]
    /// The field did not report selection offsets.
    NoFieldSelection,

    #[error("editor is no longer editable")]
    /// The node lost its editable state after classification.
    NotEditable,

    #[error(transparent)]
    /// A structural edit failed on the host.
    Dom(#[from] DomError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced while parsing a selector pattern.
pub enum SelectorError {
    #[error("empty selector")]
    /// The pattern contained no simple selectors.
    Empty,

    #[error("unexpected input at byte {position} in selector '{selector}'")]
    /// The tokenizer could not consume the pattern.
    Unexpected {
        /// The full pattern.
        selector: String,
        /// Byte offset of the first unparsed character.
        position: usize,
    },
}

#[derive(Debug, Error)]
/// Errors produced while loading a [`Config`](crate::Config).
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    /// The config document is not valid JSON for the schema.
    Json(#[from] serde_json::Error),

    #[error("invalid selector: {0}")]
    /// A configured pattern failed to parse.
    Selector(#[from] SelectorError),

    #[error("debounce interval must be greater than zero")]
    /// A debounced watch policy was configured with a zero interval.
    ZeroDebounce,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors from the external feature-state channel.
pub enum ChannelError {
    #[error("feature-state store is unreachable")]
    /// No receiver answered the request.
    Disconnected,

    #[error("malformed response: {0}")]
    /// The receiver answered with something that is not a state response.
    Malformed(String),
}
