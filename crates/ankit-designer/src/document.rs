//! The structured document the visual editor works on.
//!
//! A [`Document`] is one side of a card template: literal text runs
//! interleaved with [`EditorNode`]s. Each node kind has one stable type tag
//! (`anki-field`, `anki-conditional`, ...) shared by the converters and the
//! builder HTML.
//!
//! # Example
//!
//! ```
//! use ankit_designer::document::{Content, Document, EditorNode, NodeKind};
//!
//! let mut doc = Document::new();
//! doc.push_node(EditorNode::leaf(NodeKind::Field, "Front"));
//! doc.push_text("<hr>");
//! doc.push_node(EditorNode::conditional(
//!     "Extra",
//!     false,
//!     vec![Content::Node(EditorNode::leaf(NodeKind::Field, "Extra"))],
//! ));
//!
//! assert_eq!(doc.referenced_fields(), vec!["Front", "Extra"]);
//! assert_eq!(
//!     ankit_designer::reverse::convert(&doc),
//!     "{{Front}}<hr>{{#Extra}}{{Extra}}{{/Extra}}"
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::html::Attribute;

/// Type tag of plain field nodes.
pub const FIELD_TAG: &str = "anki-field";
/// Type tag of cloze nodes.
pub const CLOZE_TAG: &str = "anki-cloze";
/// Type tag of hint nodes.
pub const HINT_TAG: &str = "anki-hint";
/// Type tag of type-answer nodes.
pub const TYPE_ANSWER_TAG: &str = "anki-type-answer";
/// Type tag of the front-side node.
pub const FRONT_SIDE_TAG: &str = "anki-frontside";
/// Type tag of the tags node.
pub const TAGS_TAG: &str = "anki-tags";
/// Type tag of conditional containers.
pub const CONDITIONAL_TAG: &str = "anki-conditional";

/// Kind of an editor node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `{{field}}`
    Field,
    /// `{{cloze:field}}`
    Cloze,
    /// `{{hint:field}}`
    Hint,
    /// `{{type:field}}`
    TypeAnswer,
    /// `{{FrontSide}}`
    FrontSide,
    /// `{{Tags}}`
    Tags,
    /// `{{#field}}...{{/field}}` or `{{^field}}...{{/field}}`
    Conditional,
    /// A type tag this crate does not know. Preserved, never dropped.
    Other(String),
}

impl NodeKind {
    /// The stable type tag of this kind.
    pub fn type_tag(&self) -> &str {
        match self {
            NodeKind::Field => FIELD_TAG,
            NodeKind::Cloze => CLOZE_TAG,
            NodeKind::Hint => HINT_TAG,
            NodeKind::TypeAnswer => TYPE_ANSWER_TAG,
            NodeKind::FrontSide => FRONT_SIDE_TAG,
            NodeKind::Tags => TAGS_TAG,
            NodeKind::Conditional => CONDITIONAL_TAG,
            NodeKind::Other(tag) => tag,
        }
    }

    /// Look up a kind by type tag. Unknown tags map to [`NodeKind::Other`].
    pub fn from_type_tag(tag: &str) -> Self {
        match tag {
            FIELD_TAG => NodeKind::Field,
            CLOZE_TAG => NodeKind::Cloze,
            HINT_TAG => NodeKind::Hint,
            TYPE_ANSWER_TAG => NodeKind::TypeAnswer,
            FRONT_SIDE_TAG => NodeKind::FrontSide,
            TAGS_TAG => NodeKind::Tags,
            CONDITIONAL_TAG => NodeKind::Conditional,
            other => NodeKind::Other(other.to_string()),
        }
    }

    /// Field name substituted when a node of this kind has none.
    ///
    /// These match the names the editor uses when it creates a fresh node,
    /// so a node that lost its attribute still produces a valid token.
    pub fn default_field(&self) -> Option<&'static str> {
        match self {
            NodeKind::Field | NodeKind::Conditional => Some("Front"),
            NodeKind::Cloze => Some("Text"),
            NodeKind::Hint => Some("Extra"),
            NodeKind::TypeAnswer => Some("Back"),
            NodeKind::FrontSide | NodeKind::Tags | NodeKind::Other(_) => None,
        }
    }

    /// Whether nodes of this kind carry a field name.
    pub fn takes_field(&self) -> bool {
        self.default_field().is_some()
    }
}

impl Serialize for NodeKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.type_tag())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(NodeKind::from_type_tag(&tag))
    }
}

/// Host markup of a node that was read back from builder HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Tag name, lowercase.
    pub name: String,
    /// Attributes in source order, markers included.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Written as `<name ... />`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub self_closing: bool,
}

/// Structural counterpart of a template token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorNode {
    /// Node kind, serialized as its type tag.
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Field parameter, exactly as captured from the template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Conditional direction: true for `{{^field}}`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,

    /// Conditional body, or the content of an unknown container.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Content>,

    /// Host element, set when the node came from builder HTML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
}

impl EditorNode {
    /// Create a leaf node with a field parameter.
    pub fn leaf(kind: NodeKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: Some(field.into()),
            negated: false,
            children: Vec::new(),
            element: None,
        }
    }

    /// Create a node without a field parameter (`FrontSide`, `Tags`).
    pub fn bare(kind: NodeKind) -> Self {
        Self {
            kind,
            field: None,
            negated: false,
            children: Vec::new(),
            element: None,
        }
    }

    /// Create a conditional container.
    pub fn conditional(field: impl Into<String>, negated: bool, children: Vec<Content>) -> Self {
        Self {
            kind: NodeKind::Conditional,
            field: Some(field.into()),
            negated,
            children,
            element: None,
        }
    }

    /// The field name to emit: the stored one, or the kind's default when
    /// it is missing or empty.
    pub fn field_or_default(&self) -> Option<&str> {
        match self.field.as_deref() {
            Some(name) if !name.is_empty() => Some(name),
            _ => self.kind.default_field(),
        }
    }
}

/// One item of a document: literal text or a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Content {
    /// Text preserved verbatim.
    Text(String),
    /// A structural node.
    Node(EditorNode),
}

/// One side of a card template in editable form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Content in document order.
    pub content: Vec<Content>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from content, merging adjacent text runs.
    pub fn from_content(content: Vec<Content>) -> Self {
        let mut doc = Self::new();
        for item in content {
            match item {
                Content::Text(text) => doc.push_text(text),
                Content::Node(node) => doc.push_node(node),
            }
        }
        doc
    }

    /// Append text, extending the last run if it is text too.
    pub fn push_text(&mut self, text: impl AsRef<str>) {
        push_text(&mut self.content, text.as_ref());
    }

    /// Append a node.
    pub fn push_node(&mut self, node: EditorNode) {
        self.content.push(Content::Node(node));
    }

    /// True if the document holds nothing.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// True if the document holds only literal text.
    pub fn is_literal(&self) -> bool {
        self.content.iter().all(|c| matches!(c, Content::Text(_)))
    }

    /// Total number of nodes, nested ones included.
    pub fn node_count(&self) -> usize {
        fn count(content: &[Content]) -> usize {
            content
                .iter()
                .map(|c| match c {
                    Content::Text(_) => 0,
                    Content::Node(node) => 1 + count(&node.children),
                })
                .sum()
        }
        count(&self.content)
    }

    /// Field names referenced by nodes, in first-use order without repeats.
    pub fn referenced_fields(&self) -> Vec<&str> {
        fn walk<'a>(content: &'a [Content], out: &mut Vec<&'a str>) {
            for item in content {
                if let Content::Node(node) = item {
                    let name = node.field.as_deref().filter(|name| !name.is_empty());
                    if let Some(name) = name {
                        if node.kind.takes_field() && !out.contains(&name) {
                            out.push(name);
                        }
                    }
                    walk(&node.children, out);
                }
            }
        }

        let mut fields = Vec::new();
        walk(&self.content, &mut fields);
        fields
    }

    /// Serialize to JSON for the editing surface.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a document the editing surface sent back as JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub(crate) fn push_text(content: &mut Vec<Content>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Content::Text(last)) = content.last_mut() {
        last.push_str(text);
    } else {
        content.push(Content::Text(text.to_string()));
    }
}

/// Which side of a card a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Question side.
    #[default]
    Front,
    /// Answer side.
    Back,
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" => Ok(Side::Front),
            "back" => Ok(Side::Back),
            _ => Err(format!("Invalid side: {}. Use 'front' or 'back'", s)),
        }
    }
}

/// A card template in editable form: both sides plus the shared stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Question side.
    pub front: Document,
    /// Answer side.
    pub back: Document,
    /// Stylesheet, passed through untouched.
    #[serde(default)]
    pub css: String,
}

impl Template {
    /// Convert the Anki text of both sides.
    pub fn from_anki(front: &str, back: &str, css: &str) -> Self {
        Self {
            front: crate::forward::convert(front),
            back: crate::forward::convert(back),
            css: css.to_string(),
        }
    }

    /// Serialize both sides back to Anki text, returning `(front, back, css)`.
    pub fn to_anki(&self) -> (String, String, String) {
        crate::reverse::convert_template(self)
    }

    /// The document for one side.
    pub fn side(&self, side: Side) -> &Document {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }

    /// Mutable access to one side.
    pub fn side_mut(&mut self, side: Side) -> &mut Document {
        match side {
            Side::Front => &mut self.front,
            Side::Back => &mut self.back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_mapping() {
        let kinds = [
            NodeKind::Field,
            NodeKind::Cloze,
            NodeKind::Hint,
            NodeKind::TypeAnswer,
            NodeKind::FrontSide,
            NodeKind::Tags,
            NodeKind::Conditional,
        ];
        for kind in kinds {
            assert_eq!(NodeKind::from_type_tag(kind.type_tag()), kind);
        }
        assert_eq!(
            NodeKind::from_type_tag("anki-image"),
            NodeKind::Other("anki-image".to_string())
        );
    }

    #[test]
    fn test_field_or_default() {
        let mut node = EditorNode::leaf(NodeKind::Hint, "");
        assert!(node.kind.takes_field());
        assert_eq!(node.field_or_default(), Some("Extra"));
        node.field = None;
        assert_eq!(node.field_or_default(), Some("Extra"));
        node.field = Some("Notes".to_string());
        assert_eq!(node.field_or_default(), Some("Notes"));
        assert_eq!(EditorNode::bare(NodeKind::Tags).field_or_default(), None);
    }

    #[test]
    fn test_push_text_merges() {
        let mut doc = Document::new();
        doc.push_text("a");
        doc.push_text("");
        doc.push_text("b");
        doc.push_node(EditorNode::bare(NodeKind::Tags));
        doc.push_text("c");
        assert_eq!(
            doc.content,
            vec![
                Content::Text("ab".to_string()),
                Content::Node(EditorNode::bare(NodeKind::Tags)),
                Content::Text("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_referenced_fields_dedup() {
        let doc = Document::from_content(vec![
            Content::Node(EditorNode::leaf(NodeKind::Field, "Front")),
            Content::Node(EditorNode::conditional(
                "Extra",
                true,
                vec![
                    Content::Node(EditorNode::leaf(NodeKind::Field, "Front")),
                    Content::Node(EditorNode::leaf(NodeKind::Hint, "Extra")),
                    Content::Node(EditorNode::bare(NodeKind::FrontSide)),
                ],
            )),
        ]);
        assert_eq!(doc.referenced_fields(), vec!["Front", "Extra"]);
        assert_eq!(doc.node_count(), 5);
        assert!(!doc.is_literal());
    }

    #[test]
    fn test_json_shape() {
        let doc = Document::from_content(vec![
            Content::Text("<hr>".to_string()),
            Content::Node(EditorNode::conditional("Extra", true, vec![])),
        ]);
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["content"][0]["text"], "<hr>");
        assert_eq!(json["content"][1]["node"]["type"], "anki-conditional");
        assert_eq!(json["content"][1]["node"]["field"], "Extra");
        assert_eq!(json["content"][1]["node"]["negated"], true);

        let back = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_side_from_str() {
        assert_eq!("front".parse::<Side>().unwrap(), Side::Front);
        assert_eq!("BACK".parse::<Side>().unwrap(), Side::Back);
        assert!("middle".parse::<Side>().is_err());
    }
}
