//! Integration tests for the builder HTML used by the editing surface.

use ankit_designer::document::{Content, EditorNode, NodeKind};
use ankit_designer::{
    ConvertOptions, Document, from_builder_html, forward, reverse, round_trip, to_builder_html,
};

#[test]
fn test_templates_survive_builder_html() {
    let templates = [
        "{{Front}}<hr>{{#Extra}}{{Extra}}{{/Extra}}",
        "<div class=\"front\">{{cloze:Text}}</div>{{^Extra}}<br>{{/Extra}}",
        "{{FrontSide}}<hr id=answer>{{type:Back}}<p>{{Tags}}</p>",
        "{{#A}}<ul><li>{{#B}}{{hint:B}}{{/B}}</li></ul>{{/A}}",
        "<a href=\"https://example.com/{{Word}}\">{{Word}}</a>",
        "{{#Front}}orphaned",
    ];
    for template in templates {
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
fn test_tokens_in_html_context_survive_builder_html() {
    let templates = [
        "<!-- {{Front}} -->{{Back}}",
        "<!--\n{{#Extra}}{{Extra}}{{/Extra}}\n-->{{Front}}",
        "<script>var word = \"{{Front}}\"; if (1 < 2) { show({{Back}}); }</script>{{Back}}",
        "<style>.card::after { content: \"{{Tags}}\"; }</style><p>{{Tags}}</p>",
        "<textarea>{{type:Back}} <b>{{Front}}</b></textarea>{{Front}}",
        "<title>{{Front}}</title><SCRIPT>{{#A}}x{{/A}}</SCRIPT>{{#A}}{{A}}{{/A}}",
    ];
    for template in templates {
        let check = round_trip(template, &ConvertOptions::default());
        assert!(
            check.is_lossless(template),
            "{:?} became {:?}",
            template,
            check.via_builder_html
        );
        assert!(!check.via_builder_html.contains("data-anki"));
    }
}

#[test]
fn test_only_text_context_tokens_become_elements() {
    let doc = forward::convert("<!-- {{Front}} --><script>{{Front}}</script>{{Front}}");
    let html = to_builder_html(&doc);
    assert_eq!(html.matches("data-anki-type").count(), 1);
    assert!(html.starts_with("<!-- {{Front}} --><script>{{Front}}</script><span"));
}

#[test]
fn test_editing_surface_changes_are_saved() {
    let doc = forward::convert("{{Front}}");
    let html = to_builder_html(&doc);

    // The user wraps the field in bold and adds a conditional after it.
    let edited = format!(
        "<b>{}</b>{}",
        html,
        r#"<div data-anki-type="anki-conditional" data-anki-field="Extra" data-anki-negated="false"><i>extra</i></div>"#
    );

    assert_eq!(
        reverse::convert(&from_builder_html(&edited)),
        "<b>{{Front}}</b>{{#Extra}}<i>extra</i>{{/Extra}}"
    );
}

#[test]
fn test_node_missing_field_attribute_gets_default() {
    let html = concat!(
        r#"<span data-anki-type="anki-field">?</span>"#,
        r#"<span data-anki-type="anki-hint" data-anki-field="">?</span>"#,
        r#"<span data-anki-type="anki-cloze">?</span>"#,
    );
    assert_eq!(
        reverse::convert(&from_builder_html(html)),
        "{{Front}}{{hint:Extra}}{{cloze:Text}}"
    );
}

#[test]
fn test_unknown_node_type_is_preserved() {
    let html = r#"<figure data-anki-type="anki-media" data-anki-id="anki-node-7" class="media"><span data-anki-type="anki-field" data-anki-field="Audio">x</span><figcaption>caption</figcaption></figure>"#;
    let doc = from_builder_html(html);

    let Content::Node(node) = &doc.content[0] else {
        panic!("expected node");
    };
    assert_eq!(node.kind, NodeKind::Other("anki-media".to_string()));

    assert_eq!(
        reverse::convert(&doc),
        r#"<figure class="media">{{Audio}}<figcaption>caption</figcaption></figure>"#
    );
}

#[test]
fn test_document_json_exchange() {
    let doc = forward::convert("{{#Extra}}{{hint:Extra}}{{/Extra}}");
    let json = doc.to_json().unwrap();
    let mut edited = Document::from_json(&json).unwrap();

    edited.push_node(EditorNode::leaf(NodeKind::TypeAnswer, "Back"));
    assert_eq!(
        reverse::convert(&edited),
        "{{#Extra}}{{hint:Extra}}{{/Extra}}{{type:Back}}"
    );
}

#[test]
fn test_surface_json_without_optional_keys() {
    let json = r#"{"content":[{"text":"<hr>"},{"node":{"type":"anki-conditional","field":"Back","children":[{"node":{"type":"anki-field"}}]}}]}"#;
    let doc = Document::from_json(json).unwrap();
    assert_eq!(reverse::convert(&doc), "<hr>{{#Back}}{{Front}}{{/Back}}");
}
