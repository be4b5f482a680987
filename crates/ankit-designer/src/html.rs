//! Minimal HTML helpers: escaping and a tag scanner.
//!
//! Templates are HTML fragments that may be deliberately unbalanced (a
//! conditional can open inside one `<div>` and close in another), so they
//! are never run through a DOM parser. The scanner only finds start tags,
//! end tags and comments, and leaves every other byte where it is.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::grammar::Span;

/// Elements that never have content or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)(<!--.*?-->)",
        r#"|<([a-zA-Z][a-zA-Z0-9:-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*(/?)>"#,
        r"|</([a-zA-Z][a-zA-Z0-9:-]*)\s*>",
    ))
    .expect("valid markup pattern")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute pattern")
});

/// A parsed attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, lowercase.
    pub name: String,
    /// Unescaped value, `None` for bare attributes like `hidden`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Attribute {
    /// Create an attribute with a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Render as `name="value"` with the value escaped.
    pub fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("{}=\"{}\"", self.name, escape_attr(value)),
            None => self.name.clone(),
        }
    }
}

/// An attribute as it appears in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute<'a> {
    /// The parsed attribute.
    pub attribute: Attribute,
    /// The attribute's source text, quotes included.
    pub raw: &'a str,
}

/// A start tag found by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// Tag name, lowercase.
    pub name: String,
    /// Tag name as written.
    pub raw_name: &'a str,
    /// Attributes in source order.
    pub attributes: Vec<RawAttribute<'a>>,
    /// Written as `<tag ... />`.
    pub self_closing: bool,
    /// Position of the whole tag.
    pub span: Span,
}

impl StartTag<'_> {
    /// Value of the first attribute called `name`.
    ///
    /// Bare attributes yield `Some("")`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.attribute.name == name)
            .map(|a| a.attribute.value.as_deref().unwrap_or(""))
    }

    /// True if the tag has no closing counterpart.
    pub fn is_void(&self) -> bool {
        self.self_closing || VOID_ELEMENTS.contains(&self.name.as_str())
    }
}

/// A piece of markup found by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup<'a> {
    /// `<name ...>`
    Start(StartTag<'a>),
    /// `</name>`
    End {
        /// Tag name, lowercase.
        name: String,
        /// Position of the tag.
        span: Span,
    },
    /// `<!-- ... -->`
    Comment {
        /// Position of the comment.
        span: Span,
    },
}

impl Markup<'_> {
    /// Position of this markup in the scanned text.
    pub fn span(&self) -> Span {
        match self {
            Markup::Start(tag) => tag.span,
            Markup::End { span, .. } | Markup::Comment { span } => *span,
        }
    }
}

/// Find every start tag, end tag and comment in `text`, in order.
pub fn scan(text: &str) -> impl Iterator<Item = Markup<'_>> {
    MARKUP.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let span = Span::new(whole.start(), whole.end());

        if caps.get(1).is_some() {
            return Some(Markup::Comment { span });
        }
        if let Some(name) = caps.get(5) {
            return Some(Markup::End {
                name: name.as_str().to_ascii_lowercase(),
                span,
            });
        }

        let raw_name = caps.get(2)?.as_str();
        let attributes = caps
            .get(3)
            .map(|m| parse_attributes(m.as_str()))
            .unwrap_or_default();
        let self_closing = caps.get(4).is_some_and(|m| !m.as_str().is_empty());

        Some(Markup::Start(StartTag {
            name: raw_name.to_ascii_lowercase(),
            raw_name,
            attributes,
            self_closing,
            span,
        }))
    })
}

fn parse_attributes(text: &str) -> Vec<RawAttribute<'_>> {
    ATTRIBUTE
        .captures_iter(text)
        .filter_map(|caps| {
            let raw = caps.get(0)?.as_str();
            let name = caps.get(1)?.as_str().to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| unescape_attr(m.as_str()));
            Some(RawAttribute {
                attribute: Attribute { name, value },
                raw,
            })
        })
        .collect()
}

/// Render a start tag from its parts.
pub fn render_start_tag<'a>(
    name: &str,
    attributes: impl IntoIterator<Item = &'a str>,
    self_closing: bool,
) -> String {
    let mut out = format!("<{}", name);
    for attribute in attributes {
        out.push(' ');
        out.push_str(attribute);
    }
    if self_closing {
        out.push_str(" /");
    }
    out.push('>');
    out
}

/// Escape a string for use inside a double-quoted attribute value.
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a string for use as element text.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Undo attribute escaping for the entities browsers emit in attributes.
pub fn unescape_attr(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    value
        .replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
