//! [`Document`] back to Anki template text.
//!
//! Output is composed from the tree, children before their parent, and is
//! never parsed again. Literal text runs go through
//! [`strip_markers`](crate::markers::strip_markers) so editor residue the
//! surface may have left in plain markup is dropped.
//!
//! | Type tag            | Output                                     |
//! |---------------------|--------------------------------------------|
//! | `anki-field`        | `{{field}}`                                |
//! | `anki-cloze`        | `{{cloze:field}}`                          |
//! | `anki-hint`         | `{{hint:field}}`                           |
//! | `anki-type-answer`  | `{{type:field}}`                           |
//! | `anki-frontside`    | `{{FrontSide}}`                            |
//! | `anki-tags`         | `{{Tags}}`                                 |
//! | `anki-conditional`  | `{{#field}}children{{/field}}` (`^` if negated) |
//! | anything else       | host element without markers, and children |
//!
//! Stripping applies to every start tag in a text run, user-authored ones
//! included. An attribute that matches a [`MARKERS`](crate::markers::MARKERS)
//! rule is dropped even if the template author wrote it, so
//! `<b class="" style="" draggable="false">` is saved as `<b>`. Attributes
//! that carry a value other than the marker's survive unchanged.

use tracing::debug;

use crate::document::{Content, Document, EditorNode, Element, NodeKind, Template};
use crate::grammar;
use crate::html::{self, VOID_ELEMENTS};
use crate::markers::{self, strip_markers};

/// Serialize a document to Anki template text.
pub fn convert(document: &Document) -> String {
    let text = render_content(&document.content);
    debug!(
        nodes = document.node_count(),
        bytes = text.len(),
        "Converted document to template"
    );
    text
}

/// Serialize both sides of a template, returning `(front, back, css)`.
///
/// The stylesheet is returned unchanged.
pub fn convert_template(template: &Template) -> (String, String, String) {
    (
        convert(&template.front),
        convert(&template.back),
        template.css.clone(),
    )
}

fn render_content(content: &[Content]) -> String {
    let mut out = String::new();
    for item in content {
        match item {
            Content::Text(text) => out.push_str(&strip_markers(text)),
            Content::Node(node) => out.push_str(&node_text(node)),
        }
    }
    out
}

/// Anki text of a single node, children included.
pub(crate) fn node_text(node: &EditorNode) -> String {
    match &node.kind {
        NodeKind::Field => grammar::field(field_name(node)),
        NodeKind::Cloze => grammar::cloze(field_name(node)),
        NodeKind::Hint => grammar::hint(field_name(node)),
        NodeKind::TypeAnswer => grammar::type_answer(field_name(node)),
        NodeKind::FrontSide => grammar::front_side(),
        NodeKind::Tags => grammar::tags(),
        NodeKind::Conditional => {
            let body = render_content(&node.children);
            let name = field_name(node);
            format!(
                "{}{}{}",
                grammar::open_conditional(name, node.negated),
                body,
                grammar::close_conditional(name)
            )
        }
        NodeKind::Other(_) => {
            let body = render_content(&node.children);
            match &node.element {
                Some(element) => render_element(element, &body),
                None => body,
            }
        }
    }
}

fn field_name(node: &EditorNode) -> &str {
    let name = node.field_or_default().unwrap_or_default();
    if node.field.as_deref().is_none_or(str::is_empty) {
        debug!(
            node = node.kind.type_tag(),
            default = name,
            "Node has no field, using default"
        );
    }
    name
}

fn render_element(element: &Element, body: &str) -> String {
    let attributes: Vec<String> = element
        .attributes
        .iter()
        .filter(|a| !markers::is_marker(a))
        .map(|a| a.render())
        .collect();
    let is_void = VOID_ELEMENTS.contains(&element.name.as_str());
    let open = html::render_start_tag(
        &element.name,
        attributes.iter().map(String::as_str),
        element.self_closing && !is_void,
    );

    if (is_void || element.self_closing) && body.is_empty() {
        open
    } else {
        format!("{}{}</{}>", open, body, element.name)
    }
}
