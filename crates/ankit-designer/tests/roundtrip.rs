//! Integration tests for the template -> document -> template round trip.
//!
//! Every well-formed template must come back byte for byte, and malformed
//! templates must never lose content.

use ankit_designer::document::{Content, NodeKind};
use ankit_designer::{ConvertOptions, Diagnostic, forward, reverse, round_trip, strip_markers};

fn roundtrip(text: &str) -> String {
    reverse::convert(&forward::convert(text))
}

const WELL_FORMED: &[&str] = &[
    "",
    "plain text without tokens",
    "{{Front}}",
    "{{Front}}<hr>{{#Extra}}{{Extra}}{{/Extra}}",
    "{{FrontSide}}<hr id=answer>{{Back}}",
    "{{cloze:Text}}<br>{{#Back Extra}}{{Back Extra}}{{/Back Extra}}",
    "{{type:Back}}",
    "{{type:cloze:Text}}",
    "{{hint:Extra}}",
    "<div class=\"tags\">{{Tags}}</div>",
    "{{#A}}x{{#B}}y{{/B}}z{{/A}}",
    "{{^Extra}}<i>no extra</i>{{/Extra}}{{#Extra}}{{Extra}}{{/Extra}}",
    "{{#A}}{{/A}}",
    "{{#A}}{{#A}}nested same{{/A}}{{/A}}",
    "{{text:Front}} {{furigana:Reading}} {{kanji:Reading}}",
    "<img src=\"{{Picture}}\">",
    "<style>.x{color:red}</style>{{Front}}",
    "<!-- {{Front}} -->{{Back}}",
    "<script>show(\"{{Front}}\")</script><textarea>{{Back}}</textarea>",
    "unicode: {{Vorderseite}} {{表}} {{#Ελληνικά}}α{{/Ελληνικά}}",
    "{{#Front}}\n  <div>\n    {{Front}}\n  </div>\n{{/Front}}\n",
];

#[test]
fn test_well_formed_templates_roundtrip() {
    for template in WELL_FORMED {
        assert_eq!(&roundtrip(template), template);
    }
}

#[test]
fn test_well_formed_templates_survive_builder_html() {
    for template in WELL_FORMED {
        let check = round_trip(template, &ConvertOptions::default());
        assert!(
            check.is_lossless(template),
            "{:?} became {:?}",
            template,
            check.via_builder_html
        );
    }
}

#[test]
fn test_end_to_end_example() {
    let input = "{{Front}}<hr>{{#Extra}}{{Extra}}{{/Extra}}";
    assert_eq!(roundtrip(input), input);
}

#[test]
fn test_nested_conditional_structure() {
    let doc = forward::convert("{{#A}}x{{#B}}y{{/B}}z{{/A}}");
    assert_eq!(doc.content.len(), 1);

    let Content::Node(outer) = &doc.content[0] else {
        panic!("expected conditional");
    };
    assert_eq!(outer.kind, NodeKind::Conditional);
    assert_eq!(outer.field.as_deref(), Some("A"));
    assert_eq!(outer.children.len(), 3);

    let Content::Node(inner) = &outer.children[1] else {
        panic!("expected nested conditional");
    };
    assert_eq!(inner.kind, NodeKind::Conditional);
    assert_eq!(inner.field.as_deref(), Some("B"));
    assert_eq!(inner.children, vec![Content::Text("y".to_string())]);

    assert_eq!(reverse::convert(&doc), "{{#A}}x{{#B}}y{{/B}}z{{/A}}");
}

#[test]
fn test_negation_preserved() {
    let negated = forward::convert("{{^Extra}}none{{/Extra}}");
    let plain = forward::convert("{{#Extra}}none{{/Extra}}");

    let (Content::Node(n), Content::Node(p)) = (&negated.content[0], &plain.content[0]) else {
        panic!("expected conditionals");
    };
    assert!(n.negated);
    assert!(!p.negated);
    assert_ne!(negated, plain);

    assert_eq!(reverse::convert(&negated), "{{^Extra}}none{{/Extra}}");
    assert_eq!(reverse::convert(&plain), "{{#Extra}}none{{/Extra}}");
}

#[test]
fn test_unbalanced_input_survives() {
    let doc = forward::convert("{{#Front}}orphaned");
    assert!(reverse::convert(&doc).contains("{{#Front}}orphaned"));
}

#[test]
fn test_malformed_inputs_keep_all_text() {
    let inputs = [
        "{{/Back}}stray close",
        "{{#A}}x{{/B}}",
        "{{#A}}{{#B}}{{/A}}{{/B}}",
        "{{#A}}{{^A}}{{/A}}",
        "{{}}{{ }}{{#}}{{/}}{{cloze:}}",
        "{{Front",
        "}}{{",
        "{{a{{Front}}",
        "{{#A}}<div>{{/A}}</div>",
    ];
    for input in inputs {
        assert_eq!(roundtrip(input), input, "input {:?}", input);
    }
}

#[test]
fn test_unknown_field_names_pass_through() {
    let doc = forward::convert("{{NonexistentField}}");
    let Content::Node(node) = &doc.content[0] else {
        panic!("expected field node");
    };
    assert_eq!(node.kind, NodeKind::Field);
    assert_eq!(node.field.as_deref(), Some("NonexistentField"));
    assert_eq!(reverse::convert(&doc), "{{NonexistentField}}");
}

#[test]
fn test_whitespace_in_tokens_is_normalized() {
    assert_eq!(roundtrip("{{ Front }}"), "{{Front}}");
    assert_eq!(roundtrip("{{# Extra }}x{{/Extra}}"), "{{#Extra}}x{{/Extra}}");
}

#[test]
fn test_degraded_conversion_reports_offsets() {
    let text = "<p>{{#Front}}</p>{{/Back}}";
    let result = forward::convert_with(text, &ConvertOptions::default());
    assert_eq!(
        result.diagnostics,
        vec![
            Diagnostic::UnmatchedOpen {
                field: "Front".to_string(),
                negated: false,
                offset: 3,
            },
            Diagnostic::UnmatchedClose {
                field: "Back".to_string(),
                offset: 17,
            },
        ]
    );
    assert!(result.document.is_literal());
}

#[test]
fn test_depth_cap_is_not_an_error() {
    let text = format!("{}core{}", "{{#A}}".repeat(300), "{{/A}}".repeat(300));
    let result = forward::convert_with(&text, &ConvertOptions { max_depth: 50 });
    assert!(!result.is_clean());
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::DepthExceeded { .. }))
    );
    assert_eq!(reverse::convert(&result.document), text);
}

#[test]
fn test_marker_stripping_is_idempotent() {
    let residue = concat!(
        r#"<div data-anki-type="anki-conditional" data-anki-field="A" "#,
        r#"data-anki-negated="false" data-anki-id="anki-node-1" class="">"#,
        r#"<span id="anki-node-2" contenteditable="false" style="">{{A}}</span></div>"#
    );
    let once = strip_markers(residue);
    assert_eq!(once, "<div><span>{{A}}</span></div>");
    assert_eq!(strip_markers(&once), once);
}
