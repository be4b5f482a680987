//! Lossless conversion between Anki card templates and a structured
//! visual-editor document model.
//!
//! A card template is Anki's Mustache-like markup (`{{Front}}`,
//! `{{#Extra}}...{{/Extra}}`, `{{cloze:Text}}`, ...) embedded in HTML. This
//! crate turns that text into a [`Document`] a visual editor can manipulate,
//! and turns an edited document back into template text:
//!
//! - [`forward::convert`] - template text to [`Document`], never fails
//! - [`reverse::convert`] - [`Document`] to template text, never fails
//! - [`builder_html`] - the element markup an HTML editing surface works on
//! - [`markers::strip_markers`] - remove editor-only attributes from markup
//!
//! Malformed input is never an error. An orphaned `{{#Front}}` or a stray
//! `{{/Back}}` stays in the document as literal text so the user can see and
//! fix it, and the round trip still reproduces it.
//!
//! # Example
//!
//! ```
//! use ankit_designer::{forward, reverse};
//!
//! let template = "{{Front}}<hr>{{#Extra}}{{Extra}}{{/Extra}}";
//!
//! let document = forward::convert(template);
//! assert_eq!(document.referenced_fields(), vec!["Front", "Extra"]);
//!
//! assert_eq!(reverse::convert(&document), template);
//! ```
//!
//! # Template definition files
//!
//! ```no_run
//! use ankit_designer::{DesignDefinition, Side};
//!
//! # fn main() -> ankit_designer::Result<()> {
//! let definition = DesignDefinition::from_file("basic.toml")?;
//! let template = definition.select_template(Some("Card 1"))?;
//! let conversion = definition.convert_side(template, Side::Back);
//! for diagnostic in &conversion.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder_html;
pub mod document;
pub mod error;
pub mod forward;
pub mod grammar;
pub mod html;
pub mod markers;
pub mod reverse;
pub mod schema;

pub use builder_html::{from_builder_html, to_builder_html};
pub use document::{Content, Document, EditorNode, NodeKind, Side, Template};
pub use error::{Error, Result};
pub use forward::{Conversion, ConvertOptions, Diagnostic};
pub use markers::strip_markers;
pub use schema::{DesignDefinition, ModelInfo, TemplateDef};

/// Result of checking that a template survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTrip {
    /// Text produced by converting to a document and back.
    pub output: String,
    /// Text produced by additionally passing through builder HTML.
    pub via_builder_html: String,
    /// Everything the forward conversion left as text.
    pub diagnostics: Vec<Diagnostic>,
}

impl RoundTrip {
    /// True if both paths reproduced `input` exactly.
    pub fn is_lossless(&self, input: &str) -> bool {
        self.output == input && self.via_builder_html == input
    }
}

/// Convert `text` to a document and back, directly and through builder
/// HTML.
///
/// # Example
///
/// ```
/// let text = "{{^Extra}}none{{/Extra}}";
/// let check = ankit_designer::round_trip(text, &Default::default());
/// assert!(check.is_lossless(text));
/// assert!(check.diagnostics.is_empty());
/// ```
pub fn round_trip(text: &str, options: &ConvertOptions) -> RoundTrip {
    let conversion = forward::convert_with(text, options);
    let output = reverse::convert(&conversion.document);
    let html = to_builder_html(&conversion.document);
    let via_builder_html = reverse::convert(&from_builder_html(&html));

    RoundTrip {
        output,
        via_builder_html,
        diagnostics: conversion.diagnostics,
    }
}
