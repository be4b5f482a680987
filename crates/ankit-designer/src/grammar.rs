//! The Anki template mini-language: token forms, recognition order, and
//! the canonical text of each token.
//!
//! Anki templates embed "handlebars" in otherwise arbitrary HTML:
//!
//! ```text
//! {{FieldName}}
//! {{cloze:FieldName}}
//! {{hint:FieldName}}
//! {{type:FieldName}}
//! {{#FieldName}} ... {{/FieldName}}
//! {{^FieldName}} ... {{/FieldName}}
//! {{FrontSide}}
//! {{Tags}}
//! ```
//!
//! A handle is classified in this order: conditional open/close, then the
//! prefixed forms (`cloze:`, `hint:`, `type:`), then the fixed names
//! `FrontSide` and `Tags`, and finally the generic field. Whitespace around
//! a handle is trimmed, the way Anki's own renderer reads `{{ Front }}`.
//!
//! # Example
//!
//! ```
//! use ankit_designer::grammar::{self, Token};
//!
//! let tokens: Vec<_> = grammar::lex("{{#Extra}}{{hint:Extra}}{{/Extra}}")
//!     .into_iter()
//!     .map(|t| t.token)
//!     .collect();
//!
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::Open { field: "Extra", negated: false },
//!         Token::Hint("Extra"),
//!         Token::Close { field: "Extra" },
//!     ]
//! );
//!
//! assert_eq!(grammar::cloze("Text"), "{{cloze:Text}}");
//! assert_eq!(grammar::open_conditional("Extra", true), "{{^Extra}}");
//! ```

use serde::{Deserialize, Serialize};

/// Opening delimiter of every token.
pub const OPEN_DELIMITER: &str = "{{";

/// Closing delimiter of every token.
pub const CLOSE_DELIMITER: &str = "}}";

/// Prefix of cloze tokens.
pub const CLOZE_PREFIX: &str = "cloze:";

/// Prefix of hint tokens.
pub const HINT_PREFIX: &str = "hint:";

/// Prefix of type-answer tokens.
pub const TYPE_PREFIX: &str = "type:";

/// Name of the token that inlines the rendered front side.
pub const FRONT_SIDE: &str = "FrontSide";

/// Name of the token that renders the note's tags.
pub const TAGS: &str = "Tags";

/// Byte range of a token in its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Create a span covering `start..end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Slice `text` with this span.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// A recognized unit of Anki template markup.
///
/// Names borrow from the source text. They are opaque: the grammar does not
/// check them against any note type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text between tokens.
    Text(&'a str),
    /// `{{name}}`
    Field(&'a str),
    /// `{{cloze:name}}`
    Cloze(&'a str),
    /// `{{hint:name}}`
    Hint(&'a str),
    /// `{{type:name}}`
    TypeAnswer(&'a str),
    /// `{{FrontSide}}`
    FrontSide,
    /// `{{Tags}}`
    Tags,
    /// `{{#name}}` or, when negated, `{{^name}}`
    Open {
        /// Field the block depends on.
        field: &'a str,
        /// True for `^` (show when empty).
        negated: bool,
    },
    /// `{{/name}}`
    Close {
        /// Field named by the closing tag.
        field: &'a str,
    },
}

/// A token together with its position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spanned<'a> {
    /// The token.
    pub token: Token<'a>,
    /// Where it was found.
    pub span: Span,
}

/// Split template text into tokens in a single left-to-right pass.
///
/// Text that is not a well-formed token, including `{{}}`, `{{#}}` and a
/// trailing `{{` with no `}}`, is returned as [`Token::Text`]. Adjacent text
/// is always merged into one run, and concatenating every span reproduces
/// the input exactly.
pub fn lex(text: &str) -> Vec<Spanned<'_>> {
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(OPEN_DELIMITER) {
        let mut open = cursor + found;
        let Some(found_close) = text[open + OPEN_DELIMITER.len()..].find(CLOSE_DELIMITER) else {
            break;
        };
        let handle_end = open + OPEN_DELIMITER.len() + found_close;

        // `{{a{{Front}}` tokenizes the inner handlebar; the prefix is text.
        if let Some(inner) = text[open + OPEN_DELIMITER.len()..handle_end].rfind(OPEN_DELIMITER) {
            open += OPEN_DELIMITER.len() + inner;
        }

        let handle = &text[open + OPEN_DELIMITER.len()..handle_end];
        let end = handle_end + CLOSE_DELIMITER.len();

        match classify(handle) {
            Some(token) => {
                if open > literal_start {
                    tokens.push(Spanned {
                        token: Token::Text(&text[literal_start..open]),
                        span: Span::new(literal_start, open),
                    });
                }
                tokens.push(Spanned {
                    token,
                    span: Span::new(open, end),
                });
                literal_start = end;
                cursor = end;
            }
            None => cursor = end,
        }
    }

    if literal_start < text.len() {
        tokens.push(Spanned {
            token: Token::Text(&text[literal_start..]),
            span: Span::new(literal_start, text.len()),
        });
    }

    tokens
}

/// Classify the text between `{{` and `}}`.
///
/// Returns `None` for handles that are not tokens at all (empty names).
pub fn classify(handle: &str) -> Option<Token<'_>> {
    let handle = handle.trim();
    if handle.is_empty() {
        return None;
    }

    if let Some(name) = handle.strip_prefix('#') {
        return non_empty(name.trim_start()).map(|field| Token::Open {
            field,
            negated: false,
        });
    }
    if let Some(name) = handle.strip_prefix('^') {
        return non_empty(name.trim_start()).map(|field| Token::Open {
            field,
            negated: true,
        });
    }
    if let Some(name) = handle.strip_prefix('/') {
        return non_empty(name.trim_start()).map(|field| Token::Close { field });
    }

    if let Some(name) = handle.strip_prefix(CLOZE_PREFIX) {
        return non_empty(name).map(Token::Cloze);
    }
    if let Some(name) = handle.strip_prefix(HINT_PREFIX) {
        return non_empty(name).map(Token::Hint);
    }
    if let Some(name) = handle.strip_prefix(TYPE_PREFIX) {
        return non_empty(name).map(Token::TypeAnswer);
    }

    match handle {
        FRONT_SIDE => Some(Token::FrontSide),
        TAGS => Some(Token::Tags),
        name => Some(Token::Field(name)),
    }
}

fn non_empty(name: &str) -> Option<&str> {
    if name.is_empty() { None } else { Some(name) }
}

/// Render a plain field substitution.
///
/// ```
/// assert_eq!(ankit_designer::grammar::field("Front"), "{{Front}}");
/// ```
pub fn field(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

/// Render a cloze token.
pub fn cloze(name: &str) -> String {
    format!("{{{{{}{}}}}}", CLOZE_PREFIX, name)
}

/// Render a hint token.
pub fn hint(name: &str) -> String {
    format!("{{{{{}{}}}}}", HINT_PREFIX, name)
}

/// Render a type-answer token.
pub fn type_answer(name: &str) -> String {
    format!("{{{{{}{}}}}}", TYPE_PREFIX, name)
}

/// Render the `{{FrontSide}}` token.
pub fn front_side() -> String {
    field(FRONT_SIDE)
}

/// Render the `{{Tags}}` token.
pub fn tags() -> String {
    field(TAGS)
}

/// Render the opening tag of a conditional block.
///
/// ```
/// use ankit_designer::grammar::open_conditional;
///
/// assert_eq!(open_conditional("Extra", false), "{{#Extra}}");
/// assert_eq!(open_conditional("Extra", true), "{{^Extra}}");
/// ```
pub fn open_conditional(name: &str, negated: bool) -> String {
    let sigil = if negated { '^' } else { '#' };
    format!("{{{{{}{}}}}}", sigil, name)
}

/// Render the closing tag of a conditional block.
pub fn close_conditional(name: &str) -> String {
    format!("{{{{/{}}}}}", name)
}
