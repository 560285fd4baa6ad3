//! Incoming event data and key classification.

use crate::dom::DomRange;

/// Key name reported for the Enter/Return key.
pub const ENTER: &str = "Enter";

/// A key-down notification, reduced to what the interceptor inspects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// `KeyboardEvent.key`.
    pub key: String,
    /// `KeyboardEvent.code`.
    pub code: String,
    /// Control modifier.
    pub ctrl: bool,
    /// Meta (Cmd) modifier.
    pub meta: bool,
    /// Shift modifier.
    pub shift: bool,
    /// An IME composition is in progress.
    pub composing: bool,
}

impl KeyInput {
    /// A plain key press without modifiers.
    pub fn key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            code: key.to_string(),
            ctrl: false,
            meta: false,
            shift: false,
            composing: false,
        }
    }

    /// Bare Enter.
    pub fn enter() -> Self {
        Self::key(ENTER)
    }

    /// Set Ctrl.
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    /// Set Meta.
    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Set Shift.
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Mark as mid-composition.
    pub fn composing(mut self) -> Self {
        self.composing = true;
        self
    }

    /// Whether this is the Enter key.
    pub fn is_enter(&self) -> bool {
        self.key == ENTER
    }
}

/// What the key-down interceptor does with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Ctrl/Cmd+Enter: cancel and submit.
    Submit,
    /// Bare Enter: cancel and insert a newline.
    Newline,
    /// Leave the event to the page (Shift+Enter, composition, other keys).
    Native,
}

impl KeyAction {
    /// Classify a key-down. Ctrl/Cmd is checked before Shift.
    pub fn classify(input: &KeyInput) -> Self {
        if !input.is_enter() {
            return Self::Native;
        }
        if input.ctrl || input.meta {
            Self::Submit
        } else if !input.shift && !input.composing {
            Self::Newline
        } else {
            Self::Native
        }
    }
}

/// `InputEvent.inputType`, restricted to the variants the engine distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    /// `insertParagraph` (what Enter produces on editable regions).
    InsertParagraph,
    /// `insertLineBreak` (Shift+Enter).
    InsertLineBreak,
    /// Anything else.
    Other(String),
}

impl InputType {
    /// Parse the platform string.
    pub fn parse(value: &str) -> Self {
        match value {
            "insertParagraph" => Self::InsertParagraph,
            "insertLineBreak" => Self::InsertLineBreak,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A before-input (input intent) notification.
#[derive(Debug, Clone, PartialEq)]
pub struct BeforeInput<N> {
    /// Intended edit.
    pub input_type: InputType,
    /// An IME composition is in progress.
    pub composing: bool,
    /// The event can be canceled.
    pub cancelable: bool,
    /// Platform-supplied target ranges (may be empty).
    pub target_ranges: Vec<DomRange<N>>,
}

impl<N> BeforeInput<N> {
    /// A cancelable `insertParagraph` intent with the given target ranges.
    pub fn insert_paragraph(target_ranges: Vec<DomRange<N>>) -> Self {
        Self {
            input_type: InputType::InsertParagraph,
            composing: false,
            cancelable: true,
            target_ranges,
        }
    }
}

/// Result of running a capture-phase handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the event continue to the page.
    Proceed,
    /// Prevent default, stop propagation and stop immediate propagation.
    Cancel,
}

impl Disposition {
    /// `true` for [`Disposition::Cancel`].
    pub fn is_cancel(self) -> bool {
        matches!(self, Self::Cancel)
    }
}
