//! TOML schema types for template definition files.
//!
//! # Example TOML
//!
//! ```toml
//! [model]
//! name = "Basic (optional reversed card)"
//! fields = ["Front", "Back", "Extra"]
//! css = ".card { font-family: arial; }"
//!
//! # Optional: converter settings
//! [converter]
//! max_depth = 100
//!
//! [[templates]]
//! name = "Card 1"
//! front = "{{Front}}"
//! back = "{{FrontSide}}<hr id=answer>{{Back}}{{#Extra}}<br>{{Extra}}{{/Extra}}"
//!
//! [[templates]]
//! name = "Card 2"
//! front = "{{#Extra}}{{Back}}{{/Extra}}"
//! back = "{{FrontSide}}<hr id=answer>{{Front}}"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::document::{Side, Template};
use crate::error::{Error, Result};
use crate::forward::{self, Conversion, ConvertOptions};
use crate::grammar;

/// Root structure for a template definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignDefinition {
    /// The note type the templates belong to.
    pub model: ModelInfo,

    /// Converter settings.
    #[serde(default)]
    pub converter: ConvertOptions,

    /// Card templates.
    #[serde(default)]
    pub templates: Vec<TemplateDef>,
}

impl DesignDefinition {
    /// Load a template definition from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a template definition from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let def: DesignDefinition = toml::from_str(content)?;
        def.validate()?;
        Ok(def)
    }

    /// Validate the definition for consistency.
    ///
    /// Field names used by the templates are not checked: unknown names are
    /// legal and pass through conversion unchanged. See
    /// [`unknown_fields()`](Self::unknown_fields).
    pub fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(Error::InvalidDefinition("model name is empty".to_string()));
        }

        let mut names = HashSet::new();
        for template in &self.templates {
            if template.name.trim().is_empty() {
                return Err(Error::InvalidDefinition(format!(
                    "template name is empty in model '{}'",
                    self.model.name
                )));
            }
            if !names.insert(template.name.as_str()) {
                return Err(Error::DuplicateTemplate(template.name.clone()));
            }
        }

        Ok(())
    }

    /// Get a template by name.
    pub fn get_template(&self, name: &str) -> Option<&TemplateDef> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Get a template by name, or the first one when `name` is `None`.
    pub fn select_template(&self, name: Option<&str>) -> Result<&TemplateDef> {
        match name {
            Some(name) => self
                .get_template(name)
                .ok_or_else(|| Error::TemplateNotFound(name.to_string())),
            None => self
                .templates
                .first()
                .ok_or_else(|| Error::TemplateNotFound("(no templates defined)".to_string())),
        }
    }

    /// Convert one side of a template with the configured options.
    pub fn convert_side(&self, template: &TemplateDef, side: Side) -> Conversion {
        forward::convert_with(template.side(side), &self.converter)
    }

    /// Convert every template into editable form.
    ///
    /// The model's stylesheet is shared by all of them.
    pub fn templates_as_documents(&self) -> Vec<(String, Template)> {
        self.templates
            .iter()
            .map(|t| {
                let template = Template {
                    front: self.convert_side(t, Side::Front).document,
                    back: self.convert_side(t, Side::Back).document,
                    css: self.model.css.clone().unwrap_or_default(),
                };
                (t.name.clone(), template)
            })
            .collect()
    }

    /// Replace a template's text from an edited [`Template`].
    ///
    /// The edited stylesheet replaces the model's.
    pub fn update_template(&mut self, name: &str, template: &Template) -> Result<()> {
        let (front, back, css) = template.to_anki();
        let def = self
            .templates
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;
        def.front = front;
        def.back = back;
        self.model.css = if css.is_empty() { None } else { Some(css) };
        debug!(template = name, "Updated template from document");
        Ok(())
    }

    /// Field names the templates reference that the model does not declare.
    ///
    /// Returns nothing when the model lists no fields at all.
    pub fn unknown_fields(&self) -> Vec<String> {
        if self.model.fields.is_empty() {
            return Vec::new();
        }

        let mut unknown = Vec::new();
        for (_, template) in self.templates_as_documents() {
            for doc in [&template.front, &template.back] {
                for field in doc.referenced_fields() {
                    let base = field.rsplit(':').next().unwrap_or(field);
                    if !self.model.fields.iter().any(|f| f == base)
                        && !unknown.iter().any(|u| u == field)
                    {
                        unknown.push(field.to_string());
                    }
                }
            }
        }
        unknown
    }

    /// Serialize the definition to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::TomlSerialize(e.to_string()))
    }

    /// Write the definition to a TOML file.
    pub fn write_toml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Note type metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name.
    pub name: String,

    /// Field names in order (optional, used for reporting only).
    #[serde(default)]
    pub fields: Vec<String>,

    /// CSS shared by all templates, passed through untouched.
    #[serde(default)]
    pub css: Option<String>,
}

/// Card template definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDef {
    /// Template name.
    pub name: String,

    /// Front template (question side).
    #[serde(default)]
    pub front: String,

    /// Back template (answer side).
    #[serde(default = "default_back")]
    pub back: String,
}

fn default_back() -> String {
    format!("{}<hr id=answer>", grammar::front_side())
}

impl TemplateDef {
    /// The text of one side.
    pub fn side(&self, side: Side) -> &str {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_TOML: &str = r#"
[model]
name = "Basic"
fields = ["Front", "Back", "Extra"]
css = ".card { color: black; }"

[[templates]]
name = "Card 1"
front = "{{Front}}"
back = "{{FrontSide}}<hr>{{Back}}{{#Extra}}{{hint:Extra}}{{/Extra}}"
"#;

    #[test]
    fn test_parse_basic_definition() {
        let def = DesignDefinition::parse(BASIC_TOML).unwrap();
        assert_eq!(def.model.name, "Basic");
        assert_eq!(def.model.fields, vec!["Front", "Back", "Extra"]);
        assert_eq!(def.converter, ConvertOptions::default());
        assert_eq!(def.templates.len(), 1);
        assert_eq!(def.templates[0].front, "{{Front}}");
    }

    #[test]
    fn test_converter_section() {
        let toml = r#"
[model]
name = "Deep"

[converter]
max_depth = 3
"#;
        let def = DesignDefinition::parse(toml).unwrap();
        assert_eq!(def.converter.max_depth, 3);
        assert!(def.templates.is_empty());
    }

    #[test]
    fn test_default_back() {
        let toml = r#"
[model]
name = "Basic"

[[templates]]
name = "Card 1"
front = "{{Front}}"
"#;
        let def = DesignDefinition::parse(toml).unwrap();
        assert_eq!(def.templates[0].back, "{{FrontSide}}<hr id=answer>");
    }

    #[test]
    fn test_duplicate_template_names() {
        let toml = r#"
[model]
name = "Basic"

[[templates]]
name = "Card 1"
front = "{{Front}}"

[[templates]]
name = "Card 1"
front = "{{Back}}"
"#;
        let result = DesignDefinition::parse(toml);
        assert!(matches!(result, Err(Error::DuplicateTemplate(name)) if name == "Card 1"));
    }

    #[test]
    fn test_empty_names_rejected() {
        let toml = r#"
[model]
name = " "
"#;
        assert!(matches!(
            DesignDefinition::parse(toml),
            Err(Error::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_select_template() {
        let def = DesignDefinition::parse(BASIC_TOML).unwrap();
        assert_eq!(def.select_template(None).unwrap().name, "Card 1");
        assert_eq!(def.select_template(Some("Card 1")).unwrap().name, "Card 1");
        assert!(matches!(
            def.select_template(Some("Card 9")),
            Err(Error::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_fields() {
        let toml = r#"
[model]
name = "Basic"
fields = ["Front", "Back"]

[[templates]]
name = "Card 1"
front = "{{Front}}{{text:Back}}{{Nonexistent}}"
back = "{{#Missing}}{{Front}}{{/Missing}}{{FrontSide}}{{Tags}}"
"#;
        let def = DesignDefinition::parse(toml).unwrap();
        assert_eq!(def.unknown_fields(), vec!["Nonexistent", "Missing"]);
    }

    #[test]
    fn test_update_template() {
        let mut def = DesignDefinition::parse(BASIC_TOML).unwrap();
        let (name, mut template) = def.templates_as_documents().remove(0);
        template.front.push_text("<br>");
        template.css.clear();
        def.update_template(&name, &template).unwrap();
        assert_eq!(def.templates[0].front, "{{Front}}<br>");
        assert_eq!(def.model.css, None);

        assert!(matches!(
            def.update_template("Nope", &template),
            Err(Error::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip() {
        let def = DesignDefinition::parse(BASIC_TOML).unwrap();
        let again = DesignDefinition::parse(&def.to_toml().unwrap()).unwrap();
        assert_eq!(again.templates[0].back, def.templates[0].back);
        assert_eq!(again.model.css, def.model.css);
    }
}
