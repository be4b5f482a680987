//! Anki template text to [`Document`].
//!
//! Conversion never fails. The text is lexed once, conditional tags are
//! paired with a stack, and the paired token stream is folded into a tree.
//! Anything that cannot be paired (an orphaned `{{#Front}}`, a stray
//! `{{/Back}}`, a block nested past [`ConvertOptions::max_depth`]) stays in
//! the document as literal text, so the user still sees and can fix it.
//!
//! # Example
//!
//! ```
//! use ankit_designer::document::{Content, NodeKind};
//! use ankit_designer::forward;
//!
//! let doc = forward::convert("{{Front}}<hr>{{#Extra}}{{Extra}}{{/Extra}}");
//! assert_eq!(doc.content.len(), 3);
//!
//! let Content::Node(block) = &doc.content[2] else { unreachable!() };
//! assert_eq!(block.kind, NodeKind::Conditional);
//! assert_eq!(block.field.as_deref(), Some("Extra"));
//! assert_eq!(block.children.len(), 1);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::{self, Content, Document, EditorNode, NodeKind};
use crate::grammar::{self, Spanned, Token};

/// Nesting depth used when no configuration says otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Upper bound on [`ConvertOptions::max_depth`], whatever is configured.
pub const DEPTH_LIMIT: usize = 512;

/// Options for the forward conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Deepest conditional nesting turned into containers. Deeper opening
    /// tags are left as text.
    pub max_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConvertOptions {
    fn effective_depth(&self) -> usize {
        self.max_depth.min(DEPTH_LIMIT)
    }
}

/// A place where the input could not be converted and was kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An opening tag with no closing tag for the same field.
    UnmatchedOpen {
        /// Field named by the tag.
        field: String,
        /// True for `{{^field}}`.
        negated: bool,
        /// Byte offset of the tag.
        offset: usize,
    },
    /// A closing tag with no opening tag for the same field.
    UnmatchedClose {
        /// Field named by the tag.
        field: String,
        /// Byte offset of the tag.
        offset: usize,
    },
    /// An opening tag nested deeper than the configured limit.
    DepthExceeded {
        /// Field named by the tag.
        field: String,
        /// Byte offset of the tag.
        offset: usize,
    },
}

impl Diagnostic {
    /// Byte offset of the offending tag.
    pub fn offset(&self) -> usize {
        match self {
            Diagnostic::UnmatchedOpen { offset, .. }
            | Diagnostic::UnmatchedClose { offset, .. }
            | Diagnostic::DepthExceeded { offset, .. } => *offset,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnmatchedOpen {
                field,
                negated,
                offset,
            } => write!(
                f,
                "offset {}: '{}' has no matching {}",
                offset,
                grammar::open_conditional(field, *negated),
                grammar::close_conditional(field)
            ),
            Diagnostic::UnmatchedClose { field, offset } => write!(
                f,
                "offset {}: '{}' closes a block that is not open",
                offset,
                grammar::close_conditional(field)
            ),
            Diagnostic::DepthExceeded { field, offset } => write!(
                f,
                "offset {}: block '{}' is nested too deeply",
                offset, field
            ),
        }
    }
}

/// Result of [`convert_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversion {
    /// The converted document.
    pub document: Document,
    /// Everything that was left as text, ordered by offset.
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// True if every token was converted.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Convert Anki template text with default options.
pub fn convert(text: &str) -> Document {
    convert_with(text, &ConvertOptions::default()).document
}

/// Convert Anki template text and report what was left as text.
pub fn convert_with(text: &str, options: &ConvertOptions) -> Conversion {
    let tokens = grammar::lex(text);
    let mut diagnostics = Vec::new();
    let partners = pair_conditionals(&tokens, options.effective_depth(), &mut diagnostics);
    diagnostics.sort_by_key(Diagnostic::offset);

    for diagnostic in &diagnostics {
        warn!(%diagnostic, "Template tag left as text");
    }

    let document = Document {
        content: build(text, &tokens, &partners, 0, tokens.len()),
    };

    debug!(
        bytes = text.len(),
        tokens = tokens.len(),
        nodes = document.node_count(),
        degraded = diagnostics.len(),
        "Converted template to document"
    );

    Conversion {
        document,
        diagnostics,
    }
}

/// Pair each opening tag with the closing tag for the same field.
///
/// Returns, for every token index, the index of its partner. A closing tag
/// whose field matches an opening tag further down the stack closes that
/// one; the opening tags above it stay unpaired.
fn pair_conditionals(
    tokens: &[Spanned<'_>],
    max_depth: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Option<usize>> {
    let mut partners = vec![None; tokens.len()];
    let mut stack: Vec<usize> = Vec::new();

    let open_of = |index: usize| match tokens[index].token {
        Token::Open { field, negated } => (field, negated),
        _ => unreachable!("only opening tags are pushed"),
    };

    for (index, spanned) in tokens.iter().enumerate() {
        match spanned.token {
            Token::Open { field, .. } => {
                if stack.len() >= max_depth {
                    diagnostics.push(Diagnostic::DepthExceeded {
                        field: field.to_string(),
                        offset: spanned.span.start,
                    });
                } else {
                    stack.push(index);
                }
            }
            Token::Close { field } => {
                match stack.iter().rposition(|&open| open_of(open).0 == field) {
                    Some(position) => {
                        for &orphan in &stack[position + 1..] {
                            let (field, negated) = open_of(orphan);
                            diagnostics.push(Diagnostic::UnmatchedOpen {
                                field: field.to_string(),
                                negated,
                                offset: tokens[orphan].span.start,
                            });
                        }
                        let open = stack[position];
                        stack.truncate(position);
                        partners[open] = Some(index);
                        partners[index] = Some(open);
                    }
                    None => diagnostics.push(Diagnostic::UnmatchedClose {
                        field: field.to_string(),
                        offset: spanned.span.start,
                    }),
                }
            }
            _ => {}
        }
    }

    for orphan in stack {
        let (field, negated) = open_of(orphan);
        diagnostics.push(Diagnostic::UnmatchedOpen {
            field: field.to_string(),
            negated,
            offset: tokens[orphan].span.start,
        });
    }

    partners
}

fn build(
    text: &str,
    tokens: &[Spanned<'_>],
    partners: &[Option<usize>],
    start: usize,
    end: usize,
) -> Vec<Content> {
    let mut content = Vec::new();
    let mut index = start;

    while index < end {
        let spanned = &tokens[index];
        match spanned.token {
            Token::Open { field, negated } => {
                if let Some(close) = partners[index] {
                    let children = build(text, tokens, partners, index + 1, close);
                    content.push(Content::Node(EditorNode::conditional(
                        field, negated, children,
                    )));
                    index = close + 1;
                    continue;
                }
                document::push_text(&mut content, spanned.span.slice(text));
            }
            // Paired closing tags are consumed by their opening tag.
            Token::Close { .. } => document::push_text(&mut content, spanned.span.slice(text)),
            Token::Text(literal) => document::push_text(&mut content, literal),
            Token::Field(name) => content.push(leaf(NodeKind::Field, name)),
            Token::Cloze(name) => content.push(leaf(NodeKind::Cloze, name)),
            Token::Hint(name) => content.push(leaf(NodeKind::Hint, name)),
            Token::TypeAnswer(name) => content.push(leaf(NodeKind::TypeAnswer, name)),
            Token::FrontSide => content.push(Content::Node(EditorNode::bare(NodeKind::FrontSide))),
            Token::Tags => content.push(Content::Node(EditorNode::bare(NodeKind::Tags))),
        }
        index += 1;
    }

    content
}

fn leaf(kind: NodeKind, name: &str) -> Content {
    Content::Node(EditorNode::leaf(kind, name))
}
