//! The markup the visual editor renders and edits ("builder HTML").
//!
//! Every node becomes an element tagged with marker attributes from
//! [`markers`](crate::markers): leaves are non-editable `<span>`s showing
//! their token, conditionals are `<div>` containers holding their body.
//!
//! ```text
//! <span data-anki-type="anki-field" data-anki-field="Front"
//!       data-anki-id="anki-node-1" contenteditable="false">{{Front}}</span>
//! <div data-anki-type="anki-conditional" data-anki-field="Extra"
//!      data-anki-negated="false" data-anki-id="anki-node-2">...</div>
//! ```
//!
//! Reading builder HTML back never fails. A marker element whose closing
//! tag cannot be found, or that is nested more than
//! [`DEPTH_LIMIT`](crate::forward::DEPTH_LIMIT) containers deep, stays in
//! the document as literal markup.
//!
//! Tokens inside a tag, a comment or the body of `<script>`, `<style>`,
//! `<textarea>` or `<title>` cannot become elements there. They are written
//! as plain token text and read back as literal text.
//!
//! Builder HTML is a DOM, so a conditional whose body is not balanced HTML
//! (`<div>{{#A}}</div><div>{{/A}}</div>`) cannot survive it intact. Such
//! templates still round-trip losslessly through the [`Document`] itself.
//!
//! # Example
//!
//! ```
//! use ankit_designer::{builder_html, forward, reverse};
//!
//! let doc = forward::convert("<b>{{Front}}</b>");
//! let html = builder_html::to_builder_html(&doc);
//! assert!(html.contains(r#"data-anki-type="anki-field""#));
//!
//! let edited = builder_html::from_builder_html(&html);
//! assert_eq!(reverse::convert(&edited), "<b>{{Front}}</b>");
//! ```

use tracing::debug;

use crate::document::{self, Content, Document, EditorNode, Element, NodeKind};
use crate::forward::DEPTH_LIMIT;
use crate::html::{self, Attribute, Markup, StartTag, escape_attr, escape_text};
use crate::markers::{
    AUTO_ID_PREFIX, FIELD_ATTRIBUTE, ID_ATTRIBUTE, NEGATED_ATTRIBUTE, TYPE_ATTRIBUTE,
};
use crate::reverse;

/// Render a document as builder HTML.
///
/// Node identifiers are numbered from 1 on every call.
pub fn to_builder_html(document: &Document) -> String {
    let mut writer = Writer::default();
    writer.write_content(&document.content);
    writer.out
}

#[derive(Default)]
struct Writer {
    out: String,
    next_id: usize,
    tag: TagState,
}

/// Elements whose body is raw text: markup inside them is not parsed.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Where the writer is relative to the markup in literal text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Between tags, where elements may be written.
    #[default]
    Text,
    /// Inside `<name ...>` or `</name ...>`.
    Tag,
    /// Inside `<!-- ... -->`.
    Comment,
    /// Inside the body of a raw text element.
    RawText(&'static str),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct TagState {
    context: Context,
    /// Lowercase name of the tag being read.
    name: String,
    reading_name: bool,
    closing: bool,
    quote: Option<char>,
}

impl TagState {
    /// True if an element written here would not become a DOM element.
    fn is_literal(&self) -> bool {
        self.context != Context::Text
    }

    fn advance(&mut self, text: &str) {
        let mut rest = text;
        while !rest.is_empty() {
            match self.context {
                Context::Text => {
                    let Some(at) = rest.find('<') else {
                        return;
                    };
                    rest = &rest[at + 1..];
                    if let Some(after) = rest.strip_prefix("!--") {
                        self.context = Context::Comment;
                        rest = after;
                    } else if rest.starts_with(|c: char| c.is_ascii_alphabetic() || c == '/') {
                        self.context = Context::Tag;
                        self.closing = rest.starts_with('/');
                        if self.closing {
                            rest = &rest[1..];
                        }
                        self.name.clear();
                        self.reading_name = true;
                        self.quote = None;
                    }
                }
                Context::Comment => {
                    let Some(at) = rest.find("-->") else {
                        return;
                    };
                    rest = &rest[at + 3..];
                    self.context = Context::Text;
                }
                Context::RawText(name) => {
                    let Some(at) = find_end_tag(rest, name) else {
                        return;
                    };
                    rest = &rest[at..];
                    self.context = Context::Text;
                }
                Context::Tag => {
                    let mut consumed = rest.len();
                    for (i, c) in rest.char_indices() {
                        if self.reading_name {
                            if c.is_ascii_alphanumeric() || c == '-' || c == ':' {
                                self.name.push(c.to_ascii_lowercase());
                                continue;
                            }
                            self.reading_name = false;
                        }
                        match (self.quote, c) {
                            (None, '"' | '\'') => self.quote = Some(c),
                            (Some(q), c) if c == q => self.quote = None,
                            (None, '>') => {
                                consumed = i + 1;
                                self.context = self.after_tag();
                                break;
                            }
                            _ => {}
                        }
                    }
                    rest = &rest[consumed..];
                }
            }
        }
    }

    fn after_tag(&self) -> Context {
        if self.closing {
            return Context::Text;
        }
        RAW_TEXT_ELEMENTS
            .iter()
            .find(|name| **name == self.name)
            .copied()
            .map_or(Context::Text, Context::RawText)
    }
}

/// Offset of the first `</name` in `text`, ignoring case.
fn find_end_tag(text: &str, name: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(at) = text[from..].find("</") {
        let start = from + at;
        let after = &text[start + 2..];
        if after
            .get(..name.len())
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name))
        {
            return Some(start);
        }
        from = start + 2;
    }
    None
}

impl Writer {
    fn write_content(&mut self, content: &[Content]) {
        for item in content {
            match item {
                Content::Text(text) => {
                    self.tag.advance(text);
                    self.out.push_str(text);
                }
                Content::Node(node) => self.write_node(node),
            }
        }
    }

    fn write_node(&mut self, node: &EditorNode) {
        // Inside a tag (`<img src="{{Front}}">`), a comment or a raw text
        // body an element would not survive, so the token is written as text.
        if self.tag.is_literal() {
            let text = reverse::node_text(node);
            self.tag.advance(&text);
            self.out.push_str(&text);
            return;
        }

        self.next_id += 1;
        let id = format!("{}{}", AUTO_ID_PREFIX, self.next_id);

        let mut markers = vec![Attribute::new(TYPE_ATTRIBUTE, node.kind.type_tag())];
        if let Some(field) = &node.field {
            markers.push(Attribute::new(FIELD_ATTRIBUTE, field.as_str()));
        }

        match &node.kind {
            NodeKind::Conditional => {
                markers.push(Attribute::new(NEGATED_ATTRIBUTE, node.negated.to_string()));
                markers.push(Attribute::new(ID_ATTRIBUTE, id));
                self.open("div", &markers);
                self.write_content(&node.children);
                self.out.push_str("</div>");
            }
            NodeKind::Other(_) => {
                let element = node.element.clone().unwrap_or_else(|| Element {
                    name: "div".to_string(),
                    attributes: Vec::new(),
                    self_closing: false,
                });
                markers.push(Attribute::new(ID_ATTRIBUTE, id));
                let mut attributes: Vec<Attribute> = element
                    .attributes
                    .into_iter()
                    .filter(|a| !markers.iter().any(|m| m.name == a.name))
                    .collect();
                attributes.extend(markers);

                let is_void = html::VOID_ELEMENTS.contains(&element.name.as_str());
                if (is_void || element.self_closing) && node.children.is_empty() {
                    let rendered: Vec<String> = attributes.iter().map(Attribute::render).collect();
                    self.out.push_str(&html::render_start_tag(
                        &element.name,
                        rendered.iter().map(String::as_str),
                        element.self_closing && !is_void,
                    ));
                } else {
                    self.open(&element.name, &attributes);
                    self.write_content(&node.children);
                    self.out.push_str(&format!("</{}>", element.name));
                }
            }
            _ => {
                markers.push(Attribute::new(ID_ATTRIBUTE, id));
                markers.push(Attribute::new("contenteditable", "false"));
                self.open("span", &markers);
                self.out.push_str(&escape_text(&reverse::node_text(node)));
                self.out.push_str("</span>");
            }
        }
    }

    fn open(&mut self, name: &str, attributes: &[Attribute]) {
        self.out.push('<');
        self.out.push_str(name);
        for attribute in attributes {
            self.out.push(' ');
            self.out.push_str(&attribute.name);
            if let Some(value) = &attribute.value {
                self.out.push_str("=\"");
                self.out.push_str(&escape_attr(value));
                self.out.push('"');
            }
        }
        self.out.push('>');
    }
}

/// Read builder HTML back into a document.
///
/// Marker elements nested deeper than [`DEPTH_LIMIT`] are kept as text.
pub fn from_builder_html(html: &str) -> Document {
    let markup: Vec<Markup<'_>> = html::scan(html).collect();
    let partners = pair_elements(&markup);
    let reader = Reader {
        html,
        markup: &markup,
        partners: &partners,
    };
    let content = reader.build(0, html.len(), 0, markup.len(), 0);
    let document = Document { content };
    debug!(
        bytes = html.len(),
        nodes = document.node_count(),
        "Read builder HTML"
    );
    document
}

/// For every non-void start tag, the index of its end tag.
fn pair_elements(markup: &[Markup<'_>]) -> Vec<Option<usize>> {
    let mut partners = vec![None; markup.len()];
    let mut stack: Vec<(usize, &str)> = Vec::new();

    for (index, item) in markup.iter().enumerate() {
        match item {
            Markup::Start(tag) if !tag.is_void() => stack.push((index, tag.name.as_str())),
            Markup::End { name, .. } => {
                if let Some(position) = stack.iter().rposition(|(_, open)| open == name) {
                    partners[stack[position].0] = Some(index);
                    stack.truncate(position);
                }
            }
            _ => {}
        }
    }

    partners
}

struct Reader<'a> {
    html: &'a str,
    markup: &'a [Markup<'a>],
    partners: &'a [Option<usize>],
}

impl Reader<'_> {
    /// Content of `html[byte_start..byte_end]`, whose markup is
    /// `markup[start..end]`, nested `depth` containers deep.
    fn build(
        &self,
        byte_start: usize,
        byte_end: usize,
        start: usize,
        end: usize,
        depth: usize,
    ) -> Vec<Content> {
        let mut content = Vec::new();
        let mut cursor = byte_start;
        let mut index = start;

        while index < end {
            let Markup::Start(tag) = &self.markup[index] else {
                index += 1;
                continue;
            };
            let Some(type_tag) = tag.get(TYPE_ATTRIBUTE) else {
                index += 1;
                continue;
            };
            let kind = NodeKind::from_type_tag(type_tag);

            if tag.is_void() {
                document::push_text(&mut content, &self.html[cursor..tag.span.start]);
                content.push(Content::Node(node_from_tag(tag, kind, Vec::new())));
                cursor = tag.span.end;
                index += 1;
                continue;
            }

            let Some(close) = self.partners[index] else {
                debug!(
                    type_tag,
                    offset = tag.span.start,
                    "Marker element is never closed, keeping it as text"
                );
                index += 1;
                continue;
            };

            let container = matches!(kind, NodeKind::Conditional | NodeKind::Other(_));
            if container && depth >= DEPTH_LIMIT {
                debug!(
                    type_tag,
                    offset = tag.span.start,
                    depth,
                    "Marker element is nested too deeply, keeping it as text"
                );
                index += 1;
                continue;
            }

            document::push_text(&mut content, &self.html[cursor..tag.span.start]);
            let close_span = self.markup[close].span();
            let children = if container {
                self.build(tag.span.end, close_span.start, index + 1, close, depth + 1)
            } else {
                // Leaf content is only a label.
                Vec::new()
            };
            content.push(Content::Node(node_from_tag(tag, kind, children)));
            cursor = close_span.end;
            index = close + 1;
        }

        document::push_text(&mut content, &self.html[cursor..byte_end]);
        content
    }
}

fn node_from_tag(tag: &StartTag<'_>, kind: NodeKind, children: Vec<Content>) -> EditorNode {
    let negated = tag.get(NEGATED_ATTRIBUTE).is_some_and(|value| {
        let value = value.trim();
        value.is_empty() || value.eq_ignore_ascii_case("true") || value == "1"
    });
    let element = match kind {
        NodeKind::Other(_) => Some(Element {
            name: tag.name.clone(),
            attributes: tag.attributes.iter().map(|a| a.attribute.clone()).collect(),
            self_closing: tag.self_closing,
        }),
        _ => None,
    };

    EditorNode {
        field: tag.get(FIELD_ATTRIBUTE).map(str::to_string),
        negated: negated && kind == NodeKind::Conditional,
        kind,
        children,
        element,
    }
}
