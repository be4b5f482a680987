//! Example: Edit a card template through builder HTML
//!
//! This example demonstrates how to use ankit-designer to:
//! 1. Parse a TOML template definition
//! 2. Render a template side as builder HTML
//! 3. Read edited builder HTML back and save it as Anki template text
//!
//! Run with: cargo run -p ankit-designer --example edit_template

use ankit_designer::{DesignDefinition, Side, builder_html, reverse};

const EXAMPLE_TOML: &str = r#"
[model]
name = "Vocabulary"
fields = ["Word", "Meaning", "Example"]
css = ".card { font-family: serif; }"

[[templates]]
name = "Recognition"
front = "<div class=\"word\">{{Word}}</div>"
back = """
{{FrontSide}}
<hr id=answer>
{{Meaning}}
{{#Example}}<br><i>{{Example}}</i>{{/Example}}
"""

[[templates]]
name = "Recall"
front = "{{Meaning}}{{^Example}} (no example){{/Example}}"
back = "{{FrontSide}}<hr id=answer>{{type:Word}}"
"#;

fn main() -> ankit_designer::Result<()> {
    println!("Parsing TOML template definition...");

    let mut definition = DesignDefinition::parse(EXAMPLE_TOML)?;
    println!("  Model: {}", definition.model.name);
    println!("  Templates: {}", definition.templates.len());

    let template = definition.select_template(Some("Recognition"))?;
    let conversion = definition.convert_side(template, Side::Back);
    println!(
        "  Back side: {} nodes, {} diagnostics",
        conversion.document.node_count(),
        conversion.diagnostics.len()
    );

    let html = builder_html::to_builder_html(&conversion.document);
    println!("\nBuilder HTML:\n{}", html);

    // Simulate an edit: bold the first two tokens
    let edited = html.replacen("<span", "<b><span", 2).replacen("</span>", "</span></b>", 2);
    let document = builder_html::from_builder_html(&edited);
    println!("\nEdited template:\n{}", reverse::convert(&document));

    let (name, mut documents) = definition.templates_as_documents().remove(0);
    documents.back = document;
    definition.update_template(&name, &documents)?;

    println!("\nUpdated definition:\n{}", definition.to_toml()?);

    Ok(())
}
