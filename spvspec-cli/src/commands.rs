// CLI command handlers
use anyhow::{bail, Context, Result};
use spvspec_core::extractor::{
    classifier::{classify_with, matching_rule, Classification},
    config::ExtractConfig,
    document::Document,
    pipeline::{ExtendedSource, Extraction},
};
use spvspec_core::ExtractionPipeline;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub fn extract_spec(
    spec: &Path,
    extended: &[String],
    config: Option<&Path>,
    output: &Path,
    compact: bool,
) -> Result<()> {
    let extraction = run_pipeline(spec, extended, config)?;

    let json = if compact {
        serde_json::to_string(&extraction.specification)
    } else {
        serde_json::to_string_pretty(&extraction.specification)
    }
    .context("Failed to serialize specification")?;
    fs::write(output, json)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;

    println!("Specification written to: {}", output.display());
    println!("  Instructions: {}", extraction.stats.instructions);
    println!("  Enumerations: {}", extraction.stats.enums);
    println!("  Extended instructions: {}", extraction.stats.extended_instructions);
    if !extraction.report.is_clean() {
        println!(
            "  Needs review: {} unclassified cells, {} skipped entries (run `spvspec inspect`)",
            extraction.report.unclassified.len(),
            extraction.report.skipped.len()
        );
    }
    Ok(())
}

/// Run an extraction and render its statistics and report.
pub fn inspect_spec(spec: &Path, extended: &[String], config: Option<&Path>) -> Result<String> {
    let extraction = run_pipeline(spec, extended, config)?;
    let spec = &extraction.specification;

    let mut out = String::new();
    writeln!(out, "{} (revision {})", spec.metadata.title, spec.metadata.revnumber)?;
    writeln!(out, "  Last update: {}", spec.metadata.last_update)?;
    let stats =
        serde_json::to_string_pretty(&extraction.stats).context("Failed to serialize stats")?;
    writeln!(out, "Statistics:\n{}", stats)?;

    if extraction.report.unclassified.is_empty() {
        writeln!(out, "All operand cells classified")?;
    } else {
        writeln!(out, "Unclassified cells:")?;
        for cell in &extraction.report.unclassified {
            writeln!(out, "  {} column {}: {:?}", cell.anchor, cell.column, cell.text)?;
        }
    }
    if !extraction.report.skipped.is_empty() {
        writeln!(out, "Skipped entries:")?;
        for entry in &extraction.report.skipped {
            writeln!(
                out,
                "  {} {} ({}): {:?}",
                entry.set, entry.name, entry.category, entry.reason
            )?;
        }
    }
    Ok(out)
}

pub fn classify_cell(text: &str, link: bool) {
    let config = ExtractConfig::default().classifier;
    let text = text.replace("\\n", "\n");

    match classify_with(&config, &text, link) {
        Classification::Operand(classified) => {
            let rule = matching_rule(&config, &text, link).unwrap_or("none");
            println!("Rule: {}", rule);
            println!("  Name: {}", classified.operand.name);
            println!("  Type: {}", classified.operand.operand_type);
            println!("  Role: {:?}", classified.role);
        }
        Classification::Unclassified => println!("Unclassified"),
    }
}

pub fn write_default_config(output: &Path) -> Result<()> {
    ExtractConfig::default().save(output)?;
    println!("Default config written to: {}", output.display());
    Ok(())
}

fn run_pipeline(spec: &Path, extended: &[String], config: Option<&Path>) -> Result<Extraction> {
    let config = match config {
        Some(path) => ExtractConfig::load(path)?,
        None => ExtractConfig::default(),
    };

    let doc = load_document(spec)?;
    let sources = extended
        .iter()
        .map(|arg| -> Result<ExtendedSource> {
            let (name, path) = parse_extended_arg(arg)?;
            let layout = config
                .layout(name)
                .with_context(|| format!("No layout configured for extended set '{}'", name))?
                .clone();
            Ok(ExtendedSource::new(layout, load_document(&path)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let extraction = ExtractionPipeline::run(&doc, &sources, &config)
        .with_context(|| format!("Failed to extract {}", spec.display()))?;
    Ok(extraction)
}

fn load_document(path: &Path) -> Result<Document> {
    log::info!("Reading {}", path.display());
    let html = fs::read_to_string(path)
        .with_context(|| format!("Failed to read HTML file: {}", path.display()))?;
    Document::parse_html(&html)
        .with_context(|| format!("Failed to parse HTML file: {}", path.display()))
}

/// Split `<layout>=<path>`.
fn parse_extended_arg(arg: &str) -> Result<(&str, PathBuf)> {
    match arg.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name, PathBuf::from(path)))
        }
        _ => bail!("Expected <layout>=<html>, got '{}'", arg),
    }
}
