//! Integration tests for template definition files.

use ankit_designer::{DesignDefinition, Error, Side};
use tempfile::tempdir;

const DEFINITION_TOML: &str = r#"
[model]
name = "Basic (optional reversed card)"
fields = ["Front", "Back", "Add Reverse"]
css = """
.card {
  font-family: arial;
  font-size: 20px;
}
"""

[[templates]]
name = "Card 1"
front = "{{Front}}"
back = "{{FrontSide}}\n\n<hr id=answer>\n\n{{Back}}"

[[templates]]
name = "Card 2"
front = "{{#Add Reverse}}{{Back}}{{/Add Reverse}}"
back = "{{FrontSide}}\n\n<hr id=answer>\n\n{{Front}}"
"#;

#[test]
fn test_every_template_roundtrips() {
    let def = DesignDefinition::parse(DEFINITION_TOML).unwrap();
    let documents = def.templates_as_documents();
    assert_eq!(documents.len(), 2);

    for (name, template) in &documents {
        let original = def.get_template(name).unwrap();
        let (front, back, css) = template.to_anki();
        assert_eq!(front, original.front);
        assert_eq!(back, original.back);
        assert_eq!(Some(css), def.model.css);
    }
    assert!(def.unknown_fields().is_empty());
}

#[test]
fn test_edit_and_write_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("basic.toml");
    std::fs::write(&path, DEFINITION_TOML).unwrap();

    let mut def = DesignDefinition::from_file(&path).unwrap();
    let (name, mut template) = def.templates_as_documents().remove(1);
    template
        .side_mut(Side::Back)
        .push_text("<br><small>reversed</small>");
    def.update_template(&name, &template).unwrap();
    def.write_toml(&path).unwrap();

    let reloaded = DesignDefinition::from_file(&path).unwrap();
    let card2 = reloaded.get_template("Card 2").unwrap();
    assert_eq!(card2.front, "{{#Add Reverse}}{{Back}}{{/Add Reverse}}");
    assert_eq!(
        card2.back,
        "{{FrontSide}}\n\n<hr id=answer>\n\n{{Front}}<br><small>reversed</small>"
    );
    assert_eq!(reloaded.model.css, def.model.css);
}

#[test]
fn test_convert_side_uses_converter_options() {
    let toml = r#"
[model]
name = "Shallow"

[converter]
max_depth = 1

[[templates]]
name = "Card 1"
front = "{{#A}}{{#B}}x{{/B}}{{/A}}"
"#;
    let def = DesignDefinition::parse(toml).unwrap();
    let template = def.select_template(None).unwrap();
    let conversion = def.convert_side(template, Side::Front);
    assert!(!conversion.is_clean());
    assert_eq!(conversion.document.node_count(), 1);
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let result = DesignDefinition::from_file(dir.path().join("missing.toml"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn test_invalid_toml() {
    let result = DesignDefinition::parse("[model\nname = ");
    assert!(matches!(result, Err(Error::TomlParse(_))));
}
