//! Site families and their pattern tables.
//!
//! Each supported site family owns one ordered [`PatternTable`]. Order is the tie-break used by
//! [`EditorLocator`](crate::EditorLocator): specific, known patterns (framework marker classes,
//! known ids) come before generic catch-alls, so a framework-managed region is never picked up
//! by a plain `div[contenteditable="true"]` rule first.
//!
//! Adding a site family means adding a variant and its table; adding a pattern to an existing
//! family means bumping that table's `version`.

use crate::selector::Selector;
use crate::watcher::WatchPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHATGPT_PATTERNS: &[&str] = &[
    "#prompt-textarea",
    r#"div[contenteditable="true"][id="prompt-textarea"]"#,
    r#"div[contenteditable="true"].ProseMirror"#,
    r#"div[contenteditable="true"][role="textbox"]"#,
    r#"textarea[data-id="root"]"#,
    "textarea[placeholder]",
    r#"div[contenteditable="true"]"#,
    "textarea",
];

const CONTENTEDITABLE_PATTERNS: &[&str] = &[
    r#"div[contenteditable="true"].ProseMirror"#,
    r#"div[contenteditable="true"][aria-label]"#,
    r#"div[contenteditable="true"][role="textbox"]"#,
    "textarea[placeholder]",
    "textarea#chat-input",
    r#"textarea[name="q"]"#,
    "textarea",
    r#"div[contenteditable="true"]"#,
];

const UNIVERSAL_PATTERNS: &[&str] = &[
    r#"div[contenteditable="true"].ProseMirror"#,
    r#"div[contenteditable="true"][aria-label]"#,
    r#"div[contenteditable="true"][role="textbox"]"#,
    r#"textarea[class*="chat"]"#,
    r#"textarea[class*="input"]"#,
    "textarea[placeholder]",
    "textarea#chat-input",
    r#"textarea[name="q"]"#,
    "textarea",
    r#"div[contenteditable="true"]"#,
];

const FORM_SUBMIT_PATTERNS: &[&str] = &[
    r#"button[data-testid="send-button"]"#,
    r#"button[type="submit"]"#,
    r#"button[aria-label="Send"]"#,
    r#"button[aria-label="送信"]"#,
];

const CONTAINER_PATTERNS: &[&str] = &[
    r#"[role="presentation"]"#,
    r#"[class*="chat"]"#,
    r#"[class*="composer"]"#,
    "main",
    r#"[class*="input"]"#,
];

const CONTAINER_EXTRA_SUBMIT_PATTERNS: &[&str] =
    &[r#"button[class*="send"]"#, r#"button[class*="submit"]"#];

const CHATGPT_HOSTS: &[&str] = &["chatgpt.com", "chat.openai.com"];

const CONTENTEDITABLE_HOSTS: &[&str] = &[
    "claude.ai",
    "gemini.google.com",
    "perplexity.ai",
    "chat.deepseek.com",
    "grok.com",
    "github.com",
    "phind.com",
];

const UNIVERSAL_DEBOUNCE: Duration = Duration::from_millis(200);

fn builtin(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .map(|p| Selector::parse(p).expect("built-in pattern is a valid selector"))
        .collect()
}

/// A family of sites sharing one editor pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteFamily {
    /// ChatGPT (`#prompt-textarea`, ProseMirror composer).
    #[serde(rename = "chatgpt")]
    ChatGpt,
    /// Chat sites built on editable regions (Claude, Gemini, Perplexity, DeepSeek, Grok, ...).
    #[serde(rename = "contenteditable")]
    ContentEditable,
    /// Any other site.
    #[serde(rename = "universal")]
    Universal,
}

impl SiteFamily {
    /// Pick the family for a page hostname. Subdomains of a known host match that host.
    pub fn for_host(host: &str) -> Self {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        let matches = |known: &&str| {
            host == *known
                || host
                    .strip_suffix(*known)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        };

        if CHATGPT_HOSTS.iter().any(matches) {
            Self::ChatGpt
        } else if CONTENTEDITABLE_HOSTS.iter().any(matches) {
            Self::ContentEditable
        } else {
            Self::Universal
        }
    }

    /// The built-in pattern table for this family.
    pub fn table(self) -> PatternTable {
        let patterns = match self {
            Self::ChatGpt => CHATGPT_PATTERNS,
            Self::ContentEditable => CONTENTEDITABLE_PATTERNS,
            Self::Universal => UNIVERSAL_PATTERNS,
        };
        PatternTable {
            family: self,
            version: 1,
            patterns: builtin(patterns),
        }
    }

    /// How the attachment watcher reacts to structural-change bursts on these sites.
    pub fn default_watch_policy(self) -> WatchPolicy {
        match self {
            Self::ChatGpt | Self::ContentEditable => WatchPolicy::Immediate,
            Self::Universal => WatchPolicy::Debounced {
                interval: UNIVERSAL_DEBOUNCE,
            },
        }
    }
}

/// Ordered editor patterns for one site family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTable {
    /// Family this table belongs to.
    pub family: SiteFamily,
    /// Incremented whenever the order or content changes.
    pub version: u32,
    /// Patterns in priority order (first match wins).
    pub patterns: Vec<Selector>,
}

/// Patterns used to find a submission control near an editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitPatterns {
    /// Submit controls searched inside the enclosing `form`.
    pub form_controls: Vec<Selector>,
    /// Composer/chat containers searched when the form step finds nothing (nearest ancestor wins).
    pub containers: Vec<Selector>,
    /// Submit controls searched inside the enclosing container.
    pub container_controls: Vec<Selector>,
}

impl Default for SubmitPatterns {
    fn default() -> Self {
        let form_controls = builtin(FORM_SUBMIT_PATTERNS);
        let mut container_controls = form_controls.clone();
        container_controls.extend(builtin(CONTAINER_EXTRA_SUBMIT_PATTERNS));
        Self {
            form_controls,
            containers: builtin(CONTAINER_PATTERNS),
            container_controls,
        }
    }
}
