//! Command-line front end for ankit-designer.
//!
//! Converts Anki card templates to the builder HTML a visual editor works
//! on and back, inspects the document model, and checks that templates
//! survive the round trip.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ankit_designer::{
    ConvertOptions, DesignDefinition, Document, ModelInfo, Side, TemplateDef, reverse,
    round_trip, strip_markers, to_builder_html,
};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

// ============================================================================
// CLI Arguments
// ============================================================================

/// Convert Anki card templates to and from visual-editor markup.
#[derive(Parser, Debug)]
#[command(name = "ankit-designer")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the builder HTML for a template
    ToBuilder {
        /// Template definition (.toml) or raw template text ("-" for stdin)
        file: PathBuf,
        /// Template name (default: first template)
        #[arg(long)]
        template: Option<String>,
        /// Card side
        #[arg(long, default_value = "front")]
        side: Side,
    },

    /// Print the Anki template text for builder HTML or a JSON document
    ToAnki {
        /// Builder HTML, or a document as .json ("-" for stdin)
        file: PathBuf,
    },

    /// Print the document model as JSON
    Inspect {
        /// Template definition (.toml) or raw template text ("-" for stdin)
        file: PathBuf,
        /// Template name (default: every template)
        #[arg(long)]
        template: Option<String>,
    },

    /// Check that templates survive conversion unchanged
    Check {
        /// Template definition (.toml) or raw template text ("-" for stdin)
        file: PathBuf,
    },

    /// Print markup with editor-only attributes removed
    Strip {
        /// Markup to clean ("-" for stdin)
        file: PathBuf,
    },
}

// ============================================================================
// Input
// ============================================================================

fn read_input(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        std::fs::read_to_string(path)
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Load a definition file, or wrap raw template text in a single-template
/// definition so every command can treat both the same way.
fn load_definition(path: &Path) -> ankit_designer::Result<DesignDefinition> {
    if has_extension(path, "toml") {
        debug!(path = %path.display(), "Loading template definition");
        return DesignDefinition::from_file(path);
    }

    let definition = DesignDefinition {
        model: ModelInfo {
            name: path.display().to_string(),
            fields: Vec::new(),
            css: None,
        },
        converter: ConvertOptions::default(),
        templates: vec![TemplateDef {
            name: "Card 1".to_string(),
            front: read_input(path)?,
            back: String::new(),
        }],
    };
    definition.validate()?;
    Ok(definition)
}

// ============================================================================
// Commands
// ============================================================================

fn to_builder(path: &Path, template: Option<&str>, side: Side) -> ankit_designer::Result<()> {
    let definition = load_definition(path)?;
    let template = definition.select_template(template)?;
    let conversion = definition.convert_side(template, side);
    for diagnostic in &conversion.diagnostics {
        warn!(template = %template.name, %diagnostic, "Left as text");
    }
    println!("{}", to_builder_html(&conversion.document));
    Ok(())
}

fn to_anki(path: &Path) -> ankit_designer::Result<()> {
    let input = read_input(path)?;
    let document = if has_extension(path, "json") {
        Document::from_json(&input)?
    } else {
        ankit_designer::from_builder_html(&input)
    };
    println!("{}", reverse::convert(&document));
    Ok(())
}

fn inspect(path: &Path, template: Option<&str>) -> ankit_designer::Result<()> {
    let definition = load_definition(path)?;
    if let Some(name) = template {
        definition.select_template(Some(name))?;
    }

    let map = definition
        .templates_as_documents()
        .into_iter()
        .filter(|(name, _)| template.is_none_or(|t| t == name))
        .map(|(name, template)| Ok((name, serde_json::to_value(template)?)))
        .collect::<ankit_designer::Result<serde_json::Map<String, serde_json::Value>>>()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(map))?
    );
    Ok(())
}

/// Returns true if every template round-trips losslessly.
fn check(path: &Path) -> ankit_designer::Result<bool> {
    let definition = load_definition(path)?;
    let options: &ConvertOptions = &definition.converter;
    let mut lossless = true;

    for template in &definition.templates {
        for side in [Side::Front, Side::Back] {
            let text = template.side(side);
            let result = round_trip(text, options);
            let label = format!("{} ({:?})", template.name, side);

            for diagnostic in &result.diagnostics {
                println!("{}: {}", label, diagnostic);
            }
            if result.is_lossless(text) {
                info!(template = %label, "Round trip ok");
            } else {
                lossless = false;
                println!("{}: round trip changed the template", label);
                if result.output != text {
                    println!("  via document:     {:?}", result.output);
                }
                if result.via_builder_html != text {
                    println!("  via builder HTML: {:?}", result.via_builder_html);
                }
            }
        }
    }

    for field in definition.unknown_fields() {
        println!("note: field '{}' is not declared by the model", field);
    }

    println!(
        "{} template(s) checked: {}",
        definition.templates.len(),
        if lossless { "ok" } else { "FAILED" }
    );
    Ok(lossless)
}

fn strip(path: &Path) -> ankit_designer::Result<()> {
    let input = read_input(path)?;
    print!("{}", strip_markers(&input));
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing; RUST_LOG directives refine the -v level
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(log_level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(command = ?args.command, "Starting ankit-designer");

    match args.command {
        Command::ToBuilder {
            file,
            template,
            side,
        } => to_builder(&file, template.as_deref(), side)?,
        Command::ToAnki { file } => to_anki(&file)?,
        Command::Inspect { file, template } => inspect(&file, template.as_deref())?,
        Command::Check { file } => {
            if !check(&file)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Strip { file } => strip(&file)?,
    }

    Ok(ExitCode::SUCCESS)
}
