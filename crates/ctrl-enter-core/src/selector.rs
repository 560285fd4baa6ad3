//! Compound selector patterns.
//!
//! Pattern tables are written as the familiar CSS strings (`div[contenteditable="true"].ProseMirror`),
//! but only the compound subset is supported:
//!
//! - an optional leading tag name
//! - `#id`
//! - `.class`
//! - `[attr]`, `[attr="value"]`, `[attr*="value"]`
//!
//! A [`Selector`] can be matched against any [`ElementView`] (used by the in-memory host) and
//! rendered back to CSS with [`Selector::to_css`] (used by hosts that delegate to `querySelector`).

use crate::error::SelectorError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*").expect("valid tag regex"));

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:#(?P<id>[\w-]+)|\.(?P<class>[\w-]+)|\[(?P<name>[\w-]+)(?:(?P<op>\*?=)"(?P<value>[^"]*)")?\])"#,
    )
    .expect("valid token regex")
});

/// Read-only view of an element, enough to evaluate a [`Selector`].
pub trait ElementView {
    /// Tag name (any case).
    fn tag(&self) -> &str;
    /// Attribute value by (lowercase) name.
    fn attribute(&self, name: &str) -> Option<&str>;
}

/// How an attribute selector compares the attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeMatch {
    /// `[name]`
    Present,
    /// `[name="value"]`
    Equals(String),
    /// `[name*="value"]`
    Contains(String),
}

/// One `[...]` clause of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name (lowercased).
    pub name: String,
    /// Comparison applied to the value.
    pub matcher: AttributeMatch,
}

impl AttributeSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        match (&self.matcher, value) {
            (_, None) => false,
            (AttributeMatch::Present, Some(_)) => true,
            (AttributeMatch::Equals(expected), Some(actual)) => actual == expected,
            // `[a*=""]` never matches in CSS.
            (AttributeMatch::Contains(needle), Some(actual)) => {
                !needle.is_empty() && actual.contains(needle.as_str())
            }
        }
    }
}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

impl Selector {
    /// Parse a compound selector.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut selector = Selector {
            tag: None,
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
        };

        let mut pos = 0;
        if let Some(m) = TAG.find(source) {
            selector.tag = Some(m.as_str().to_ascii_lowercase());
            pos = m.end();
        }

        while pos < source.len() {
            let rest = &source[pos..];
            let Some(caps) = TOKEN.captures(rest) else {
                return Err(SelectorError::Unexpected {
                    selector: source.to_string(),
                    position: pos,
                });
            };

            if let Some(id) = caps.name("id") {
                selector.id = Some(id.as_str().to_string());
            } else if let Some(class) = caps.name("class") {
                selector.classes.push(class.as_str().to_string());
            } else if let Some(name) = caps.name("name") {
                let value = caps.name("value").map(|v| v.as_str().to_string());
                let matcher = match (caps.name("op").map(|op| op.as_str()), value) {
                    (Some("*="), Some(value)) => AttributeMatch::Contains(value),
                    (Some(_), Some(value)) => AttributeMatch::Equals(value),
                    _ => AttributeMatch::Present,
                };
                selector.attributes.push(AttributeSelector {
                    name: name.as_str().to_ascii_lowercase(),
                    matcher,
                });
            }

            pos += caps.get(0).map_or(0, |m| m.end());
        }

        Ok(selector)
    }

    /// Tag constraint, if any (lowercase).
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Whether `element` satisfies every clause.
    pub fn matches<E: ElementView + ?Sized>(&self, element: &E) -> bool {
        if let Some(tag) = &self.tag
            && !element.tag().eq_ignore_ascii_case(tag)
        {
            return false;
        }

        if let Some(id) = &self.id
            && element.attribute("id") != Some(id.as_str())
        {
            return false;
        }

        if !self.classes.is_empty() {
            let class_attr = element.attribute("class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|class| class_attr.split_ascii_whitespace().any(|c| c == class))
            {
                return false;
            }
        }

        self.attributes
            .iter()
            .all(|attr| attr.matches(element.attribute(&attr.name)))
    }

    /// Render back to a CSS selector string.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        if let Some(tag) = &self.tag {
            out.push_str(tag);
        }
        if let Some(id) = &self.id {
            out.push('#');
            out.push_str(id);
        }
        for class in &self.classes {
            out.push('.');
            out.push_str(class);
        }
        for attr in &self.attributes {
            out.push('[');
            out.push_str(&attr.name);
            match &attr.matcher {
                AttributeMatch::Present => {}
                AttributeMatch::Equals(value) => {
                    out.push_str("=\"");
                    out.push_str(value);
                    out.push('"');
                }
                AttributeMatch::Contains(value) => {
                    out.push_str("*=\"");
                    out.push_str(value);
                    out.push('"');
                }
            }
            out.push(']');
        }
        out
    }
}

/// Join selectors into a CSS selector list (`a, b, c`).
pub fn to_css_list(selectors: &[Selector]) -> String {
    selectors
        .iter()
        .map(Selector::to_css)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a list of selector strings, failing on the first invalid entry.
pub fn parse_all<'a, I>(patterns: I) -> Result<Vec<Selector>, SelectorError>
where
    I: IntoIterator<Item = &'a str>,
{
    patterns.into_iter().map(Selector::parse).collect()
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Selector> for String {
    fn from(value: Selector) -> Self {
        value.to_css()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}
