//! Editor-only markup that must never reach a saved template.
//!
//! The builder HTML tags every node with a handful of attributes. They are
//! listed once in [`MARKERS`]; [`strip_markers`] removes exactly those and
//! nothing else.
//!
//! # Example
//!
//! ```
//! use ankit_designer::markers::strip_markers;
//!
//! let html = r#"<div class="" data-anki-id="anki-node-4" id="anki-node-4">x</div>"#;
//! assert_eq!(strip_markers(html), "<div>x</div>");
//! assert_eq!(strip_markers(&strip_markers(html)), "<div>x</div>");
//! ```

use crate::html::{self, Attribute, Markup};

/// Attribute carrying a node's type tag.
pub const TYPE_ATTRIBUTE: &str = "data-anki-type";
/// Attribute carrying a node's field parameter.
pub const FIELD_ATTRIBUTE: &str = "data-anki-field";
/// Attribute carrying a conditional's direction.
pub const NEGATED_ATTRIBUTE: &str = "data-anki-negated";
/// Attribute carrying a node's generated identifier.
pub const ID_ATTRIBUTE: &str = "data-anki-id";
/// Prefix of generated node identifiers.
pub const AUTO_ID_PREFIX: &str = "anki-node-";

/// When an attribute counts as editor residue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRule {
    /// Always.
    Always,
    /// When its value equals the given string.
    Value(&'static str),
    /// When its value starts with the given prefix.
    Prefix(&'static str),
    /// When it is present but empty.
    Empty,
}

/// Every attribute the editor may leave behind.
pub const MARKERS: &[(&str, MarkerRule)] = &[
    (TYPE_ATTRIBUTE, MarkerRule::Always),
    (FIELD_ATTRIBUTE, MarkerRule::Always),
    (NEGATED_ATTRIBUTE, MarkerRule::Always),
    (ID_ATTRIBUTE, MarkerRule::Always),
    ("contenteditable", MarkerRule::Value("false")),
    ("draggable", MarkerRule::Value("false")),
    ("id", MarkerRule::Prefix(AUTO_ID_PREFIX)),
    ("class", MarkerRule::Empty),
    ("style", MarkerRule::Empty),
];

/// True if `attribute` is editor residue according to [`MARKERS`].
pub fn is_marker(attribute: &Attribute) -> bool {
    let value = attribute.value.as_deref().unwrap_or("");
    MARKERS.iter().any(|(name, rule)| {
        *name == attribute.name
            && match rule {
                MarkerRule::Always => true,
                MarkerRule::Value(expected) => value == *expected,
                MarkerRule::Prefix(prefix) => value.starts_with(prefix),
                MarkerRule::Empty => value.trim().is_empty(),
            }
    })
}

/// Remove editor markers from every start tag in `text`.
///
/// Tags without markers, and all text between tags, are copied byte for
/// byte. Running this twice gives the same result as running it once.
pub fn strip_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;

    for markup in html::scan(text) {
        let Markup::Start(tag) = markup else {
            continue;
        };
        if !tag.attributes.iter().any(|a| is_marker(&a.attribute)) {
            continue;
        }

        out.push_str(&text[copied..tag.span.start]);
        let kept = tag
            .attributes
            .iter()
            .filter(|a| !is_marker(&a.attribute))
            .map(|a| a.raw);
        out.push_str(&html::render_start_tag(tag.raw_name, kept, tag.self_closing));
        copied = tag.span.end;
    }

    out.push_str(&text[copied..]);
    out
}
